//! AES-256-GCM authenticated encryption
//!
//! Every call to [`encrypt`] draws a fresh 12-byte IV from the OS RNG. The
//! ciphertext keeps the 16-byte auth tag appended, the layout WebCrypto
//! produces, so frames stay compatible with browser clients.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Key, Nonce,
};
use rand::{rngs::OsRng, RngCore};
use tracing::trace;

use super::SymmetricKey;
use crate::error::{Result, SnippetError};

/// IV length for GCM (96 bits)
pub const IV_SIZE: usize = 12;

/// Auth tag length appended to every ciphertext
pub const TAG_SIZE: usize = 16;

/// Output of one AEAD encryption
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedData {
    /// Initialization vector used for this encryption only
    pub iv: [u8; IV_SIZE],
    /// Ciphertext with the auth tag appended
    pub ciphertext: Vec<u8>,
}

/// Generate a random IV
pub fn generate_iv() -> [u8; IV_SIZE] {
    let mut iv = [0u8; IV_SIZE];
    OsRng.fill_bytes(&mut iv);
    iv
}

/// Encrypt plaintext using AES-256-GCM under a fresh random IV
///
/// # Arguments
/// * `plaintext` - The data to encrypt
/// * `key` - The 256-bit encryption key
///
/// # Returns
/// The IV and the tagged ciphertext
pub fn encrypt(plaintext: &[u8], key: &SymmetricKey) -> Result<EncryptedData> {
    encrypt_with_iv(plaintext, key, generate_iv())
}

/// Encrypt under a caller-chosen IV. Only reachable from this crate so that
/// public callers cannot reuse an IV.
pub(crate) fn encrypt_with_iv(
    plaintext: &[u8],
    key: &SymmetricKey,
    iv: [u8; IV_SIZE],
) -> Result<EncryptedData> {
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes()));

    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&iv), plaintext)
        .map_err(|e| SnippetError::EncryptionError(e.to_string()))?;

    trace!(
        plaintext_len = plaintext.len(),
        ciphertext_len = ciphertext.len(),
        "AES-GCM encrypt"
    );

    Ok(EncryptedData { iv, ciphertext })
}

/// Decrypt ciphertext using AES-256-GCM
///
/// Fails with [`SnippetError::DecryptionError`] when the tag does not verify;
/// no plaintext is returned in that case.
pub fn decrypt(encrypted: &EncryptedData, key: &SymmetricKey) -> Result<Vec<u8>> {
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes()));

    cipher
        .decrypt(Nonce::from_slice(&encrypted.iv), encrypted.ciphertext.as_slice())
        .map_err(|_| SnippetError::DecryptionError)
}
