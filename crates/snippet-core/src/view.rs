//! Viewer state machine for opening a shared snippet
//!
//! Drives the retrieval side: the host reports what the API returned and what
//! the user typed, and the viewer runs the matching decrypt flow and moves to
//! the next state. Password attempts are counted here, not in the crypto core.

use tracing::{debug, warn};

use crate::crypto::SecretString;
use crate::envelope::{decrypt_keyless, decrypt_with_password};
use crate::error::SnippetError;

/// Password attempts allowed before the viewer blocks
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Why a snippet cannot be shown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewFailure {
    /// Retrieval failed: expired, deleted, view limit reached or never existed
    Unavailable,
    /// Keyless snippet opened without a key in the link
    MissingKey,
    /// Payload or key is structurally broken
    Corrupt,
    /// Key in the link does not decrypt the payload
    WrongKey,
}

/// Current viewer state
#[derive(Debug, PartialEq, Eq)]
pub enum ViewState {
    Loading,
    AwaitingPassword {
        attempts: u32,
        wrong_password: bool,
    },
    Decrypting,
    Ready(SecretString),
    /// Too many wrong passwords. Terminal.
    Blocked,
    Error(ViewFailure),
}

impl ViewState {
    /// Whether no further event can change this state
    pub fn is_terminal(&self) -> bool {
        matches!(self, ViewState::Ready(_) | ViewState::Blocked | ViewState::Error(_))
    }
}

/// Snippet viewer driven by retrieval and password events
pub struct SnippetViewer {
    key: Option<String>,
    max_attempts: u32,
    payload: Option<String>,
    state: ViewState,
}

impl std::fmt::Debug for SnippetViewer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnippetViewer")
            .field("key", &self.key.as_ref().map(|_| "[REDACTED]"))
            .field("max_attempts", &self.max_attempts)
            .field("payload", &self.payload.as_ref().map(String::len))
            .field("state", &self.state)
            .finish()
    }
}

impl SnippetViewer {
    /// Create a viewer for a link, with the key from its fragment if any
    pub fn new(key: Option<String>, max_attempts: u32) -> Self {
        Self {
            key: key.filter(|k| !k.is_empty()),
            max_attempts: max_attempts.max(1),
            payload: None,
            state: ViewState::Loading,
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Attempts left before blocking, if a password is being awaited
    pub fn remaining_attempts(&self) -> Option<u32> {
        match self.state {
            ViewState::AwaitingPassword { attempts, .. } => {
                Some(self.max_attempts.saturating_sub(attempts))
            }
            _ => None,
        }
    }

    /// Consume the viewer, returning the plaintext if it was decrypted
    pub fn into_plaintext(self) -> Option<SecretString> {
        match self.state {
            ViewState::Ready(plaintext) => Some(plaintext),
            _ => None,
        }
    }

    /// The API returned the stored payload
    pub fn on_fetched(&mut self, payload: String, password_protected: bool) -> &ViewState {
        if self.state != ViewState::Loading {
            warn!("Ignoring fetched payload outside of loading state");
            return &self.state;
        }

        if password_protected {
            self.payload = Some(payload);
            self.state = ViewState::AwaitingPassword {
                attempts: 0,
                wrong_password: false,
            };
            return &self.state;
        }

        let Some(key) = self.key.as_deref() else {
            self.state = ViewState::Error(ViewFailure::MissingKey);
            return &self.state;
        };

        self.state = ViewState::Decrypting;
        self.state = match decrypt_keyless(&payload, key) {
            Ok(plaintext) => ViewState::Ready(SecretString::new(plaintext)),
            Err(SnippetError::DecryptionError) => ViewState::Error(ViewFailure::WrongKey),
            Err(e) => {
                debug!("Keyless payload unusable: {}", e);
                ViewState::Error(ViewFailure::Corrupt)
            }
        };
        &self.state
    }

    /// Retrieval failed for any reason
    pub fn on_fetch_failed(&mut self) -> &ViewState {
        if self.state == ViewState::Loading {
            self.state = ViewState::Error(ViewFailure::Unavailable);
        }
        &self.state
    }

    /// The user submitted a password
    pub fn submit_password(&mut self, password: &str) -> &ViewState {
        let ViewState::AwaitingPassword { attempts, .. } = self.state else {
            warn!("Ignoring password outside of awaiting-password state");
            return &self.state;
        };
        let Some(payload) = self.payload.as_deref() else {
            self.state = ViewState::Error(ViewFailure::Corrupt);
            return &self.state;
        };

        self.state = ViewState::Decrypting;
        let attempts = attempts + 1;

        self.state = match decrypt_with_password(payload, password) {
            Ok(plaintext) => {
                self.payload = None;
                ViewState::Ready(SecretString::new(plaintext))
            }
            Err(SnippetError::DecryptionError) if attempts >= self.max_attempts => {
                warn!(attempts, "Maximum password attempts exceeded");
                self.payload = None;
                ViewState::Blocked
            }
            Err(SnippetError::DecryptionError) => {
                debug!(attempts, "Wrong password");
                ViewState::AwaitingPassword {
                    attempts,
                    wrong_password: true,
                }
            }
            Err(e) => {
                debug!("Password payload unusable: {}", e);
                self.payload = None;
                ViewState::Error(ViewFailure::Corrupt)
            }
        };
        &self.state
    }
}
