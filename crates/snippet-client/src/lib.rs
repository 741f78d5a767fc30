//! # snippet-client
//!
//! Client for the Secure Snippet API.
//! Encrypts locally via `snippet-core`, stores only opaque frames, and builds
//! share links that keep keyless data keys in the URL fragment.

mod api;
mod error;
mod expiry;
mod link;
mod share;
mod types;

pub use api::{HttpSnippetApi, SnippetApi};
pub use error::{ClientError, ClientResult};
pub use expiry::{Expiry, ExpiryUnit, PRESETS};
pub use link::ShareLink;
pub use share::{open_snippet, share_snippet, submit_password, ShareOptions, SharedSnippet};
pub use types::{CreateSnippetRequest, CreateSnippetResponse, SnippetRecord};
