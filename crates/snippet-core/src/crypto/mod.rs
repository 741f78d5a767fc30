//! Cryptographic primitives for client-side snippet encryption
//!
//! This module provides:
//! - UTF-8 / base64url codecs
//! - Random data keys with base64url export/import
//! - AES-256-GCM authenticated encryption
//! - PBKDF2-HMAC-SHA256 wrapping-key derivation
//! - Data key wrapping
//! - Secure memory handling with zeroize

pub mod codec;
mod encryption;
mod key_derivation;
mod key_wrap;
mod keys;
mod secure_memory;

pub use encryption::{decrypt, encrypt, generate_iv, EncryptedData, IV_SIZE, TAG_SIZE};
#[cfg(test)]
pub(crate) use encryption::encrypt_with_iv;
pub use key_derivation::{derive_wrapping_key, generate_salt, Salt, PBKDF2_ITERATIONS, SALT_SIZE};
pub use key_wrap::{unwrap_key, wrap_key};
pub use keys::{export_key, generate_data_key, import_key};
pub use secure_memory::{SecretString, SymmetricKey, KEY_SIZE};
