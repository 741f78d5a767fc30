//! Snippet API backends

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

use crate::error::{ClientError, ClientResult};
use crate::types::{ApiErrorBody, CreateSnippetRequest, CreateSnippetResponse, SnippetRecord};

/// Storage backend for encrypted snippets
///
/// Implementations only ever see opaque frames; keys and passwords never
/// cross this boundary.
#[async_trait]
pub trait SnippetApi: Send + Sync {
    /// Store a new snippet
    async fn create(&self, request: &CreateSnippetRequest) -> ClientResult<CreateSnippetResponse>;

    /// Retrieve a snippet (consumes one view on the server)
    async fn fetch(&self, id: &str) -> ClientResult<SnippetRecord>;

    /// Delete a snippet before it expires
    async fn delete(&self, id: &str, revocation_token: &str) -> ClientResult<()>;
}

/// REST backend under `{base}/api/v1/snippet`
pub struct HttpSnippetApi {
    base_url: Url,
    client: Client,
}

impl HttpSnippetApi {
    /// Create a client for the given API base URL
    pub fn new(base_url: &str) -> ClientResult<Self> {
        let parsed = Url::parse(base_url)
            .map_err(|e| ClientError::InvalidBaseUrl(format!("{}: {}", base_url, e)))?;
        if parsed.cannot_be_a_base() {
            return Err(ClientError::InvalidBaseUrl(base_url.to_string()));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            base_url: parsed,
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// `{base}/api/v1/snippet[/{id}]`, with the id escaped as one path segment
    fn snippet_url(&self, id: Option<&str>) -> ClientResult<Url> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| ClientError::InvalidBaseUrl(self.base_url.to_string()))?;
            segments.pop_if_empty().extend(["api", "v1", "snippet"]);
            if let Some(id) = id {
                segments.push(id);
            }
        }
        Ok(url)
    }

    async fn rejection_message(response: Response) -> String {
        response
            .json::<ApiErrorBody>()
            .await
            .ok()
            .and_then(|body| body.error)
            .unwrap_or_else(|| "Failed to create snippet".to_string())
    }
}

#[async_trait]
impl SnippetApi for HttpSnippetApi {
    async fn create(&self, request: &CreateSnippetRequest) -> ClientResult<CreateSnippetResponse> {
        let response = self
            .client
            .post(self.snippet_url(None)?)
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let message = Self::rejection_message(response).await;
            debug!("Create rejected with HTTP {}: {}", status, message);
            return Err(ClientError::Rejected(message));
        }

        let created: CreateSnippetResponse = response
            .json()
            .await
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))?;
        info!("Created snippet {}", created.id);
        Ok(created)
    }

    async fn fetch(&self, id: &str) -> ClientResult<SnippetRecord> {
        let response = self
            .client
            .get(self.snippet_url(Some(id))?)
            .send()
            .await?;

        match response.status() {
            StatusCode::GONE => return Err(ClientError::Gone),
            status if !status.is_success() => return Err(ClientError::NotFound(status)),
            _ => {}
        }

        let record: SnippetRecord = response
            .json()
            .await
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))?;
        debug!(
            "Fetched snippet {} ({} views remaining)",
            id, record.views_remaining
        );
        Ok(record)
    }

    async fn delete(&self, id: &str, revocation_token: &str) -> ClientResult<()> {
        let response = self
            .client
            .delete(self.snippet_url(Some(id))?)
            .query(&[("revocation_token", revocation_token)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::DeleteFailed(status));
        }

        info!("Deleted snippet {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snippet_url_keeps_base_path() {
        let api = HttpSnippetApi::new("https://example.com/prefix/").unwrap();
        assert_eq!(
            api.snippet_url(None).unwrap().as_str(),
            "https://example.com/prefix/api/v1/snippet"
        );
        assert_eq!(
            api.snippet_url(Some("abc")).unwrap().as_str(),
            "https://example.com/prefix/api/v1/snippet/abc"
        );
    }

    #[test]
    fn test_snippet_url_escapes_id() {
        let api = HttpSnippetApi::new("http://localhost:8080").unwrap();
        let url = api.snippet_url(Some("a/b?c#d")).unwrap();

        assert_eq!(url.path(), "/api/v1/snippet/a%2Fb%3Fc%23d");
        assert_eq!(url.query(), None);
        assert_eq!(url.fragment(), None);
    }

    #[test]
    fn test_rejects_unusable_base_url() {
        assert!(matches!(
            HttpSnippetApi::new("not a url"),
            Err(ClientError::InvalidBaseUrl(_))
        ));
        assert!(matches!(
            HttpSnippetApi::new("mailto:someone@example.com"),
            Err(ClientError::InvalidBaseUrl(_))
        ));
    }
}
