//! Password-based key derivation using PBKDF2-HMAC-SHA256

use pbkdf2::pbkdf2_hmac;
use rand::{rngs::OsRng, RngCore};
use sha2::Sha256;
use tracing::debug;

use super::{SymmetricKey, KEY_SIZE};

/// Iteration count shared with every existing password frame
pub const PBKDF2_ITERATIONS: u32 = 100_000;

/// Salt length in bytes
pub const SALT_SIZE: usize = 16;

/// Per-payload random salt. Not secret; stored in the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Salt([u8; SALT_SIZE]);

impl Salt {
    /// Wrap existing salt bytes
    pub fn from_bytes(bytes: [u8; SALT_SIZE]) -> Self {
        Self(bytes)
    }

    /// Get the salt bytes
    pub fn as_bytes(&self) -> &[u8; SALT_SIZE] {
        &self.0
    }
}

/// Generate a cryptographically secure random salt
pub fn generate_salt() -> Salt {
    let mut bytes = [0u8; SALT_SIZE];
    OsRng.fill_bytes(&mut bytes);
    Salt(bytes)
}

/// Derive a 256-bit wrapping key from a password
///
/// # Arguments
/// * `password` - The user's password (UTF-8 bytes are hashed as-is)
/// * `salt` - The payload's salt (use `generate_salt()` to create one)
///
/// # Returns
/// A 32-byte key suitable for wrapping a data key with AES-256-GCM
pub fn derive_wrapping_key(password: &str, salt: &Salt) -> SymmetricKey {
    let mut key_bytes = [0u8; KEY_SIZE];
    pbkdf2_hmac::<Sha256>(
        password.as_bytes(),
        salt.as_bytes(),
        PBKDF2_ITERATIONS,
        &mut key_bytes,
    );
    debug!(iterations = PBKDF2_ITERATIONS, "Derived wrapping key");

    let key = SymmetricKey::new(key_bytes);
    zeroize::Zeroize::zeroize(&mut key_bytes);
    key
}
