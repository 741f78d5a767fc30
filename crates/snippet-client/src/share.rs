//! End-to-end share and open flows on top of a [`SnippetApi`]

use chrono::{DateTime, Utc};
use snippet_core::{encrypt_keyless, encrypt_with_password, SnippetViewer};
use tracing::debug;

use crate::api::SnippetApi;
use crate::error::{ClientError, ClientResult};
use crate::expiry::Expiry;
use crate::link::ShareLink;
use crate::types::CreateSnippetRequest;

/// Options for sharing a snippet
#[derive(Clone, Default)]
pub struct ShareOptions {
    /// Password for the password flow. Blank selects the keyless flow.
    pub password: Option<String>,
    pub expiry: Expiry,
    /// Allowed views; `None` means one
    pub max_views: Option<u32>,
}

/// Result of sharing a snippet
#[derive(Debug, Clone)]
pub struct SharedSnippet {
    pub link: ShareLink,
    pub revocation_token: String,
    pub expires_at: DateTime<Utc>,
    pub max_views: u32,
}

impl SharedSnippet {
    pub fn is_password_protected(&self) -> bool {
        self.link.key.is_none()
    }
}

/// Encrypt `content` on this side and store only the frame
pub async fn share_snippet<A>(
    api: &A,
    content: String,
    options: &ShareOptions,
) -> ClientResult<SharedSnippet>
where
    A: SnippetApi + ?Sized,
{
    if content.trim().is_empty() {
        return Err(ClientError::EmptyContent);
    }

    let password = options
        .password
        .clone()
        .filter(|password| !password.trim().is_empty());
    let password_protected = password.is_some();

    // PBKDF2 runs off the async workers
    let (ciphertext, key) = tokio::task::spawn_blocking(move || match password {
        Some(password) => encrypt_with_password(&content, &password).map(|frame| (frame, None)),
        None => encrypt_keyless(&content).map(|envelope| (envelope.frame, Some(envelope.key))),
    })
    .await??;

    let expires_at = options.expiry.expires_at(Utc::now());
    let max_views = options.max_views.unwrap_or(1).max(1);

    let request = CreateSnippetRequest {
        ciphertext,
        password_protected,
        expires_at,
        max_views,
    };
    let created = api.create(&request).await?;
    debug!(
        password_protected,
        "Shared snippet {} expiring at {}", created.id, expires_at
    );

    Ok(SharedSnippet {
        link: ShareLink::new(created.id, key),
        revocation_token: created.revocation_token,
        expires_at,
        max_views,
    })
}

/// Fetch the snippet behind a link and feed it to a fresh viewer
///
/// Unavailable snippets (expired, deleted, view limit reached, unknown id)
/// put the viewer into its error state; transport failures are returned.
pub async fn open_snippet<A>(
    api: &A,
    link: &ShareLink,
    max_attempts: u32,
) -> ClientResult<SnippetViewer>
where
    A: SnippetApi + ?Sized,
{
    let mut viewer = SnippetViewer::new(link.key.clone(), max_attempts);

    match api.fetch(&link.id).await {
        Ok(record) if record.password_protected => {
            viewer.on_fetched(record.ciphertext, true);
        }
        Ok(record) => {
            viewer = tokio::task::spawn_blocking(move || {
                viewer.on_fetched(record.ciphertext, false);
                viewer
            })
            .await?;
        }
        Err(e) if e.is_unavailable() => {
            debug!("Snippet {} unavailable: {}", link.id, e);
            viewer.on_fetch_failed();
        }
        Err(e) => return Err(e),
    }

    Ok(viewer)
}

/// Submit a password without blocking the async runtime
pub async fn submit_password(
    mut viewer: SnippetViewer,
    password: String,
) -> ClientResult<SnippetViewer> {
    let viewer = tokio::task::spawn_blocking(move || {
        viewer.submit_password(&password);
        viewer
    })
    .await?;
    Ok(viewer)
}
