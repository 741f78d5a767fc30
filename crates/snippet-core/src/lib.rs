//! # snippet-core
//!
//! Client-side envelope encryption for Secure Snippet including:
//! - AES-256-GCM content encryption under random data keys
//! - PBKDF2-HMAC-SHA256 password key derivation and data key wrapping
//! - Base64url payload frames that the backend stores as opaque strings
//! - A viewer state machine with password attempt counting
//!
//! The backend never sees plaintext, keys or passwords.

pub mod crypto;
pub mod envelope;
pub mod error;
pub mod frame;
pub mod settings;
pub mod view;

pub use crypto::{
    export_key, generate_data_key, import_key, EncryptedData, Salt, SecretString, SymmetricKey,
};
pub use envelope::{
    decrypt_keyless, decrypt_with_password, encrypt_keyless, encrypt_with_password,
    KeylessEnvelope,
};
pub use error::{Result, SnippetError};
pub use frame::{Frame, KeylessFrame, PasswordFrame};
pub use settings::{Settings, SettingsManager};
pub use view::{SnippetViewer, ViewFailure, ViewState};
