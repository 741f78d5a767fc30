//! Self-describing payload frames
//!
//! A frame is a JSON object whose fields are base64url strings. The JSON's
//! UTF-8 bytes are base64url-encoded once more, giving the single opaque
//! string that is handed to storage:
//!
//! - keyless: `{"iv": …, "ciphertext": …}`
//! - password: `{"salt": …, "text_iv": …, "wrapped_iv": …, "wrapped_data_key": …, "ciphertext": …}`

use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::crypto::codec::{base64url_to_bytes, bytes_to_base64url, bytes_to_text, text_to_bytes};
use crate::crypto::{EncryptedData, Salt, SALT_SIZE};
use crate::error::{Result, SnippetError};

/// Frame for content encrypted under an out-of-band data key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeylessFrame {
    pub iv: String,
    pub ciphertext: String,
}

/// Frame for content whose data key is wrapped under a password-derived key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordFrame {
    pub salt: String,
    pub text_iv: String,
    pub wrapped_iv: String,
    pub wrapped_data_key: String,
    pub ciphertext: String,
}

/// Either kind of frame, detected from its fields
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Frame {
    Password(PasswordFrame),
    Keyless(KeylessFrame),
}

impl Frame {
    /// Parse an opaque payload without knowing which flow produced it
    pub fn decode(payload: &str) -> Result<Self> {
        decode_frame(payload)
    }

    /// Whether decrypting this frame needs a password rather than a key
    pub fn is_password_protected(&self) -> bool {
        matches!(self, Frame::Password(_))
    }
}

impl KeylessFrame {
    /// Build a frame from the content encryption output
    pub fn new(content: &EncryptedData) -> Self {
        Self {
            iv: bytes_to_base64url(&content.iv),
            ciphertext: bytes_to_base64url(&content.ciphertext),
        }
    }

    /// Recover the encrypted content
    pub fn content(&self) -> Result<EncryptedData> {
        Ok(EncryptedData {
            iv: decode_fixed("iv", &self.iv)?,
            ciphertext: base64url_to_bytes(&self.ciphertext)?,
        })
    }

    /// Serialize to the opaque transport string
    pub fn encode(&self) -> Result<String> {
        encode_frame(self)
    }

    /// Parse the opaque transport string
    pub fn decode(payload: &str) -> Result<Self> {
        decode_frame(payload)
    }
}

impl PasswordFrame {
    /// Build a frame from the salt, the content encryption and the key wrap
    pub fn new(salt: &Salt, content: &EncryptedData, wrapped_key: &EncryptedData) -> Self {
        Self {
            salt: bytes_to_base64url(salt.as_bytes()),
            text_iv: bytes_to_base64url(&content.iv),
            wrapped_iv: bytes_to_base64url(&wrapped_key.iv),
            wrapped_data_key: bytes_to_base64url(&wrapped_key.ciphertext),
            ciphertext: bytes_to_base64url(&content.ciphertext),
        }
    }

    pub fn salt(&self) -> Result<Salt> {
        decode_fixed::<SALT_SIZE>("salt", &self.salt).map(Salt::from_bytes)
    }

    /// Encrypted content (`text_iv` + `ciphertext`)
    pub fn content(&self) -> Result<EncryptedData> {
        Ok(EncryptedData {
            iv: decode_fixed("text_iv", &self.text_iv)?,
            ciphertext: base64url_to_bytes(&self.ciphertext)?,
        })
    }

    /// Wrapped data key (`wrapped_iv` + `wrapped_data_key`)
    pub fn wrapped_key(&self) -> Result<EncryptedData> {
        Ok(EncryptedData {
            iv: decode_fixed("wrapped_iv", &self.wrapped_iv)?,
            ciphertext: base64url_to_bytes(&self.wrapped_data_key)?,
        })
    }

    /// Serialize to the opaque transport string
    pub fn encode(&self) -> Result<String> {
        encode_frame(self)
    }

    /// Parse the opaque transport string
    pub fn decode(payload: &str) -> Result<Self> {
        decode_frame(payload)
    }
}

fn encode_frame<T: Serialize>(frame: &T) -> Result<String> {
    let json = serde_json::to_string(frame)?;
    Ok(bytes_to_base64url(&text_to_bytes(&json)))
}

fn decode_frame<T: DeserializeOwned>(payload: &str) -> Result<T> {
    let json = bytes_to_text(base64url_to_bytes(payload.trim())?)?;
    serde_json::from_str(&json)
        .map_err(|e| SnippetError::DecodeError(format!("Invalid frame: {}", e)))
}

fn decode_fixed<const N: usize>(field: &str, value: &str) -> Result<[u8; N]> {
    let bytes = base64url_to_bytes(value)?;
    let len = bytes.len();
    bytes.try_into().map_err(|_| {
        SnippetError::DecodeError(format!(
            "Invalid {} length: expected {}, got {}",
            field, N, len
        ))
    })
}
