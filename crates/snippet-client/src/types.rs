//! Wire types of the snippet API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Body of `POST /api/v1/snippet`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSnippetRequest {
    /// Opaque encrypted frame
    pub ciphertext: String,
    pub password_protected: bool,
    pub expires_at: DateTime<Utc>,
    pub max_views: u32,
}

/// Response of `POST /api/v1/snippet`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSnippetResponse {
    pub id: String,
    /// Secret that authorizes deleting the snippet early
    pub revocation_token: String,
}

/// Response of `GET /api/v1/snippet/{id}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnippetRecord {
    pub ciphertext: String,
    pub password_protected: bool,
    pub expires_at: DateTime<Utc>,
    pub views_remaining: u32,
}

/// Error body returned by the API on rejected requests
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiErrorBody {
    pub error: Option<String>,
}
