//! Share links: `{origin}/view/{id}` plus the data key in the fragment
//!
//! Browsers never send the fragment to the server, so the key in a keyless
//! link stays on the client. Nothing in this module logs the key.

use url::Url;

use crate::error::{ClientError, ClientResult};

/// Parsed share link
#[derive(Clone, PartialEq, Eq)]
pub struct ShareLink {
    pub id: String,
    /// Exported data key for keyless snippets
    pub key: Option<String>,
}

impl std::fmt::Debug for ShareLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShareLink")
            .field("id", &self.id)
            .field("key", &self.key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl ShareLink {
    pub fn new(id: impl Into<String>, key: Option<String>) -> Self {
        Self { id: id.into(), key }
    }

    /// Build the full link under the given app origin
    pub fn to_url(&self, app_base_url: &str) -> ClientResult<Url> {
        let mut url = Url::parse(app_base_url)?;
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidLink(format!("'{}' cannot be a base", app_base_url)))?
            .pop_if_empty()
            .extend(["view", self.id.as_str()]);
        url.set_fragment(self.key.as_deref());
        Ok(url)
    }

    /// Parse a link produced by [`ShareLink::to_url`]
    pub fn parse(link: &str) -> ClientResult<Self> {
        let url = Url::parse(link.trim())?;

        let mut segments: Vec<&str> = url
            .path_segments()
            .map(|s| s.filter(|segment| !segment.is_empty()).collect())
            .unwrap_or_default();
        let id = match (segments.pop(), segments.pop()) {
            (Some(id), Some("view")) => id.to_string(),
            _ => {
                return Err(ClientError::InvalidLink(
                    "expected a /view/{id} path".to_string(),
                ))
            }
        };

        let key = url
            .fragment()
            .filter(|fragment| !fragment.is_empty())
            .map(str::to_string);

        Ok(Self { id, key })
    }
}
