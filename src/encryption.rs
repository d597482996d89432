// Outbound payload encryption
// Request bodies pass through a PayloadEncryptor before serialization; the
// default seals JSON with AES-256-GCM into a `secureContent` envelope:
// {"secureContent":{"iv":"<base64 nonce>","content":"<base64 ciphertext>"}}

use aes_gcm::aead::{Aead, AeadCore, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{PaylocityError, Result};

/// Transforms a request body before it goes on the wire
pub trait PayloadEncryptor: Send + Sync {
    fn encrypt(&self, body: &Value) -> Result<Value>;
}

/// Sealed body as sent to the API
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecureEnvelope {
    pub secure_content: SecureContent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecureContent {
    pub iv: String,
    pub content: String,
}

/// AES-256-GCM encryptor keyed from a base64 32-byte key
pub struct SecureContentEncryptor {
    cipher: Aes256Gcm,
}

impl std::fmt::Debug for SecureContentEncryptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecureContentEncryptor")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

impl SecureContentEncryptor {
    /// Create from a raw 32-byte key
    pub fn new(key: &[u8]) -> Result<Self> {
        if key.len() != 32 {
            return Err(PaylocityError::Config(
                "Encryption key must be exactly 32 bytes".to_string(),
            ));
        }
        let cipher = Aes256Gcm::new_from_slice(key)
            .map_err(|e| PaylocityError::Config(format!("Failed to create cipher: {e}")))?;
        Ok(Self { cipher })
    }

    /// Create from the base64 form stored in configuration
    pub fn from_base64(encoded: &str) -> Result<Self> {
        let key = BASE64
            .decode(encoded.trim())
            .map_err(|e| PaylocityError::Config(format!("Encryption key is not base64: {e}")))?;
        Self::new(&key)
    }

    /// Reverse of [`PayloadEncryptor::encrypt`]
    pub fn decrypt(&self, envelope: &SecureEnvelope) -> Result<Value> {
        let nonce_bytes = BASE64
            .decode(&envelope.secure_content.iv)
            .map_err(|e| PaylocityError::Encryption(format!("Invalid iv: {e}")))?;
        if nonce_bytes.len() != 12 {
            return Err(PaylocityError::Encryption(
                "Invalid nonce length for AES-256-GCM payload".to_string(),
            ));
        }
        let ciphertext = BASE64
            .decode(&envelope.secure_content.content)
            .map_err(|e| PaylocityError::Encryption(format!("Invalid content: {e}")))?;

        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(&nonce_bytes), ciphertext.as_ref())
            .map_err(|e| PaylocityError::Encryption(format!("Decryption failed: {e}")))?;

        Ok(serde_json::from_slice(&plaintext)?)
    }
}

impl PayloadEncryptor for SecureContentEncryptor {
    fn encrypt(&self, body: &Value) -> Result<Value> {
        let plaintext = serde_json::to_vec(body)
            .map_err(|e| PaylocityError::Encryption(format!("Failed to serialize body: {e}")))?;

        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = self
            .cipher
            .encrypt(&nonce, plaintext.as_ref())
            .map_err(|e| PaylocityError::Encryption(format!("Encryption failed: {e}")))?;

        let envelope = SecureEnvelope {
            secure_content: SecureContent {
                iv: BASE64.encode(nonce),
                content: BASE64.encode(ciphertext),
            },
        };
        serde_json::to_value(envelope)
            .map_err(|e| PaylocityError::Encryption(format!("Failed to build envelope: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn key_b64() -> String {
        BASE64.encode([7u8; 32])
    }

    #[test]
    fn test_envelope_shape() {
        let encryptor = SecureContentEncryptor::from_base64(&key_b64()).unwrap();
        let sealed = encryptor.encrypt(&json!({"a": 1})).unwrap();

        let content = &sealed["secureContent"];
        assert!(content["iv"].is_string());
        assert!(content["content"].is_string());
        assert!(!sealed.to_string().contains("\"a\":1"));
    }

    #[test]
    fn test_decrypt_restores_body() {
        let encryptor = SecureContentEncryptor::from_base64(&key_b64()).unwrap();
        let body = json!({"firstName": "Ada", "rate": 12.5});
        let sealed = encryptor.encrypt(&body).unwrap();

        let envelope: SecureEnvelope = serde_json::from_value(sealed).unwrap();
        assert_eq!(encryptor.decrypt(&envelope).unwrap(), body);
    }

    #[test]
    fn test_nonce_differs_per_call() {
        let encryptor = SecureContentEncryptor::from_base64(&key_b64()).unwrap();
        let a = encryptor.encrypt(&json!({"a": 1})).unwrap();
        let b = encryptor.encrypt(&json!({"a": 1})).unwrap();
        assert_ne!(a["secureContent"]["iv"], b["secureContent"]["iv"]);
    }

    #[test]
    fn test_wrong_key_length() {
        let err = SecureContentEncryptor::new(&[0u8; 16]).unwrap_err();
        assert!(matches!(err, PaylocityError::Config(_)));

        let err = SecureContentEncryptor::from_base64("not base64!").unwrap_err();
        assert!(matches!(err, PaylocityError::Config(_)));
    }

    #[test]
    fn test_debug_hides_key() {
        let encryptor = SecureContentEncryptor::from_base64(&key_b64()).unwrap();
        assert!(format!("{:?}", encryptor).contains("[REDACTED]"));
    }
}
