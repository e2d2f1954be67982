//! HTTP transport for the indexer client.

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use url::Url;

use super::IndexerError;

/// Issues a single GET and returns the decoded JSON body.
///
/// Implementations return the body for any JSON response, including
/// error statuses; the client inspects it for the `_status` envelope.
#[async_trait]
pub trait IndexerTransport: Send + Sync {
    async fn get(&self, url: Url) -> Result<serde_json::Value, IndexerError>;
}

/// `reqwest`-backed transport.
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    http: reqwest::Client,
}

impl HttpTransport {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl IndexerTransport for HttpTransport {
    async fn get(&self, url: Url) -> Result<serde_json::Value, IndexerError> {
        tracing::debug!(url = %url, "Indexer GET");

        let response = self
            .http
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;

        match serde_json::from_str(&body) {
            Ok(value) => Ok(value),
            Err(_) if !status.is_success() => Err(IndexerError::Status {
                status: status.as_u16(),
                body,
            }),
            Err(e) => Err(IndexerError::Decode(e)),
        }
    }
}
