//! Sample codec implementations.
//!
//! These exercise the [`Transformer`] contract end to end: a plain text
//! encoding (`base64`), a structured-value serializer (`json`), and an
//! AES-256-GCM codec for encrypted-at-rest fields.
//!
//! All three are pure functions of their input. The AES codec derives its
//! nonce from the key and plaintext instead of sampling a random one, so the
//! same plaintext always maps to the same ciphertext; the coordinator's cache
//! protocol requires this determinism.

use super::{Direction, Transformer};
use crate::error::{TransformError, TransformResult};
use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Key, Nonce,
};
use base64::{engine::general_purpose, Engine as _};
use serde_json::Value;
use sha2::{Digest, Sha256};

/// Size of an AES-256 key in bytes.
pub const AES_KEY_SIZE: usize = 32;

/// Size of an AES-GCM nonce in bytes.
pub const AES_NONCE_SIZE: usize = 12;

/// Size of the AES-GCM authentication tag in bytes.
pub const AES_TAG_SIZE: usize = 16;

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn expect_string<'a>(
    value: &'a Value,
    codec: &str,
    direction: Direction,
) -> TransformResult<&'a str> {
    value.as_str().ok_or_else(|| {
        TransformError::execution(
            codec,
            direction,
            format!("expected string value, got {}", value_kind(value)),
        )
    })
}

/// Plain string to base64 text and back.
#[derive(Debug, Clone, Copy, Default)]
pub struct Base64Codec;

impl Transformer for Base64Codec {
    fn transform(&self, plain: &Value) -> TransformResult<Value> {
        let text = expect_string(plain, "base64", Direction::Forward)?;
        Ok(Value::String(general_purpose::STANDARD.encode(text)))
    }

    fn reverse_transform(&self, transformed: &Value) -> TransformResult<Value> {
        let encoded = expect_string(transformed, "base64", Direction::Reverse)?;
        let bytes = general_purpose::STANDARD
            .decode(encoded)
            .map_err(|e| TransformError::execution("base64", Direction::Reverse, e.to_string()))?;
        let text = String::from_utf8(bytes)
            .map_err(|e| TransformError::execution("base64", Direction::Reverse, e.to_string()))?;
        Ok(Value::String(text))
    }
}

/// Structured value to a compact JSON string and back.
///
/// Lets hosts persist arrays and objects in a plain text column.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonStringCodec;

impl Transformer for JsonStringCodec {
    fn transform(&self, plain: &Value) -> TransformResult<Value> {
        let text = serde_json::to_string(plain)
            .map_err(|e| TransformError::execution("json", Direction::Forward, e.to_string()))?;
        Ok(Value::String(text))
    }

    fn reverse_transform(&self, transformed: &Value) -> TransformResult<Value> {
        let text = expect_string(transformed, "json", Direction::Reverse)?;
        serde_json::from_str(text)
            .map_err(|e| TransformError::execution("json", Direction::Reverse, e.to_string()))
    }
}

/// AES-256-GCM codec producing `base64(nonce || ciphertext || tag)`.
///
/// The nonce is the first 12 bytes of `SHA-256(key || plaintext)`. Reusing a
/// nonce therefore only happens when the same plaintext is encrypted under the
/// same key, which yields the identical ciphertext. This trades the usual
/// random-nonce hygiene for the determinism the transform cache depends on.
#[derive(Clone)]
pub struct AesGcmCodec {
    key: [u8; AES_KEY_SIZE],
    cipher: Aes256Gcm,
}

impl AesGcmCodec {
    /// Creates a codec from a raw 256-bit key.
    pub fn new(key: [u8; AES_KEY_SIZE]) -> Self {
        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key));
        Self { key, cipher }
    }

    fn derive_nonce(&self, plaintext: &[u8]) -> [u8; AES_NONCE_SIZE] {
        let mut hasher = Sha256::new();
        hasher.update(self.key);
        hasher.update(plaintext);
        let digest = hasher.finalize();
        let mut nonce = [0u8; AES_NONCE_SIZE];
        nonce.copy_from_slice(&digest[..AES_NONCE_SIZE]);
        nonce
    }
}

impl Transformer for AesGcmCodec {
    fn transform(&self, plain: &Value) -> TransformResult<Value> {
        let text = expect_string(plain, "aes-gcm", Direction::Forward)?;
        let nonce_bytes = self.derive_nonce(text.as_bytes());
        let ciphertext = self
            .cipher
            .encrypt(Nonce::from_slice(&nonce_bytes), text.as_bytes())
            .map_err(|_| {
                TransformError::execution("aes-gcm", Direction::Forward, "encryption failed")
            })?;

        let mut envelope = Vec::with_capacity(AES_NONCE_SIZE + ciphertext.len());
        envelope.extend_from_slice(&nonce_bytes);
        envelope.extend_from_slice(&ciphertext);
        Ok(Value::String(general_purpose::STANDARD.encode(envelope)))
    }

    fn reverse_transform(&self, transformed: &Value) -> TransformResult<Value> {
        let encoded = expect_string(transformed, "aes-gcm", Direction::Reverse)?;
        let envelope = general_purpose::STANDARD
            .decode(encoded)
            .map_err(|e| TransformError::execution("aes-gcm", Direction::Reverse, e.to_string()))?;
        if envelope.len() < AES_NONCE_SIZE + AES_TAG_SIZE {
            return Err(TransformError::execution(
                "aes-gcm",
                Direction::Reverse,
                format!("ciphertext too short: {} bytes", envelope.len()),
            ));
        }

        let (nonce_bytes, ciphertext) = envelope.split_at(AES_NONCE_SIZE);
        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
            .map_err(|_| {
                TransformError::execution(
                    "aes-gcm",
                    Direction::Reverse,
                    "decryption failed: wrong key or corrupted ciphertext",
                )
            })?;
        let text = String::from_utf8(plaintext)
            .map_err(|e| TransformError::execution("aes-gcm", Direction::Reverse, e.to_string()))?;
        Ok(Value::String(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn test_key() -> [u8; AES_KEY_SIZE] {
        let mut key = [0u8; AES_KEY_SIZE];
        for (i, byte) in key.iter_mut().enumerate() {
            *byte = i as u8;
        }
        key
    }

    #[test]
    fn test_base64_round_trip() {
        let codec = Base64Codec;
        for text in ["", "hello", "päivää", "line\nbreak"] {
            let plain = Value::String(text.to_string());
            let transformed = codec.transform(&plain).unwrap();
            assert_eq!(codec.reverse_transform(&transformed).unwrap(), plain);
        }
    }

    #[test]
    fn test_base64_rejects_non_string() {
        let codec = Base64Codec;
        assert!(codec.transform(&json!(12)).is_err());
        assert!(codec.transform(&json!({"a": 1})).is_err());
        assert!(codec.reverse_transform(&json!(null)).is_err());
    }

    #[test]
    fn test_base64_rejects_malformed_input() {
        let codec = Base64Codec;
        let err = codec
            .reverse_transform(&Value::String("not base64 at all!!".to_string()))
            .unwrap_err();
        match err {
            TransformError::Execution { direction, .. } => {
                assert_eq!(direction, Direction::Reverse)
            }
            other => panic!("expected Execution, got {other:?}"),
        }
    }

    #[test]
    fn test_json_round_trip_structured_values() {
        let codec = JsonStringCodec;
        let values = [
            json!({"name": "ada", "tags": ["a", "b"]}),
            json!([1, 2, 3]),
            json!("already a string"),
            json!(null),
        ];
        for plain in values {
            let transformed = codec.transform(&plain).unwrap();
            assert!(transformed.is_string());
            assert_eq!(codec.reverse_transform(&transformed).unwrap(), plain);
        }
    }

    #[test]
    fn test_json_rejects_malformed_input() {
        let codec = JsonStringCodec;
        assert!(codec
            .reverse_transform(&Value::String("{broken".to_string()))
            .is_err());
        assert!(codec.reverse_transform(&json!(7)).is_err());
    }

    #[test]
    fn test_aes_round_trip() {
        let codec = AesGcmCodec::new(test_key());
        for text in ["", "xyz", "a much longer secret with spaces and ümlauts"] {
            let plain = Value::String(text.to_string());
            let transformed = codec.transform(&plain).unwrap();
            assert_ne!(transformed, plain);
            assert_eq!(codec.reverse_transform(&transformed).unwrap(), plain);
        }
    }

    #[test]
    fn test_aes_is_deterministic() {
        // Purity requirement: same input, same output.
        let codec = AesGcmCodec::new(test_key());
        let plain = Value::String("secret".to_string());
        assert_eq!(codec.transform(&plain).unwrap(), codec.transform(&plain).unwrap());
    }

    #[test]
    fn test_aes_rejects_wrong_key() {
        let codec = AesGcmCodec::new(test_key());
        let transformed = codec.transform(&Value::String("secret".to_string())).unwrap();

        let other = AesGcmCodec::new([7u8; AES_KEY_SIZE]);
        assert!(other.reverse_transform(&transformed).is_err());
    }

    #[test]
    fn test_aes_rejects_truncated_ciphertext() {
        let codec = AesGcmCodec::new(test_key());
        let short = general_purpose::STANDARD.encode([0u8; AES_NONCE_SIZE]);
        let err = codec
            .reverse_transform(&Value::String(short))
            .unwrap_err();
        assert!(err.to_string().contains("too short"));
    }

    #[test]
    fn test_aes_rejects_tampered_ciphertext() {
        let codec = AesGcmCodec::new(test_key());
        let transformed = codec.transform(&Value::String("secret".to_string())).unwrap();
        let mut envelope = general_purpose::STANDARD
            .decode(transformed.as_str().unwrap())
            .unwrap();
        let last = envelope.len() - 1;
        envelope[last] ^= 0xff;
        let tampered = Value::String(general_purpose::STANDARD.encode(envelope));
        assert!(codec.reverse_transform(&tampered).is_err());
    }
}
