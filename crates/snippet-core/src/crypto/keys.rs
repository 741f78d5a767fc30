//! Data key generation and portable export/import

use rand::{rngs::OsRng, RngCore};

use super::codec::{base64url_to_bytes, bytes_to_base64url};
use super::{SymmetricKey, KEY_SIZE};
use crate::error::{Result, SnippetError};

/// Generate a uniformly random 256-bit data key from the OS RNG
pub fn generate_data_key() -> SymmetricKey {
    let mut bytes = [0u8; KEY_SIZE];
    OsRng.fill_bytes(&mut bytes);
    let key = SymmetricKey::new(bytes);
    zeroize::Zeroize::zeroize(&mut bytes);
    key
}

/// Export raw key bytes as unpadded base64url (43 characters)
pub fn export_key(key: &SymmetricKey) -> String {
    bytes_to_base64url(key.as_bytes())
}

/// Import a key previously produced by [`export_key`]
pub fn import_key(encoded: &str) -> Result<SymmetricKey> {
    let mut bytes = base64url_to_bytes(encoded.trim())?;
    let key = SymmetricKey::from_slice(&bytes).ok_or(SnippetError::KeyFormatError {
        expected: KEY_SIZE,
        actual: bytes.len(),
    });
    zeroize::Zeroize::zeroize(&mut bytes);
    key
}
