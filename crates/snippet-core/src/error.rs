//! Error types for snippet-core

use thiserror::Error;

/// Result type alias for snippet operations
pub type Result<T> = std::result::Result<T, SnippetError>;

/// Snippet error types
///
/// The crypto flows only ever surface `DecodeError`, `KeyFormatError`,
/// `DecryptionError` or `EncryptionError`. The remaining variants belong to
/// the settings layer.
#[derive(Error, Debug)]
pub enum SnippetError {
    #[error("Malformed payload: {0}")]
    DecodeError(String),

    #[error("Invalid key length: expected {expected} bytes, got {actual}")]
    KeyFormatError { expected: usize, actual: usize },

    /// Authentication failed. Wrong key, wrong password and tampered data
    /// are deliberately indistinguishable.
    #[error("Decryption failed")]
    DecryptionError,

    #[error("Encryption failed: {0}")]
    EncryptionError(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl SnippetError {
    /// Whether the payload itself is unusable (as opposed to the key or password)
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            SnippetError::DecodeError(_) | SnippetError::KeyFormatError { .. }
        )
    }
}
