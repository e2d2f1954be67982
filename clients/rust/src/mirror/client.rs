//! Single-page and cursor-following reads against the mirror node.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use url::Url;

use super::query::{parse_query_params, Query};
use super::transport::{HttpTransport, IndexerTransport};
use super::types::{ErrorEnvelope, Paginated};
use super::IndexerError;
use crate::rpc::{with_retry, RetryPolicy};

/// Read-only client for a versioned mirror node REST API.
///
/// Cheap to clone; clones share the transport.
#[derive(Clone)]
pub struct IndexerClient {
    base_url: Url,
    transport: Arc<dyn IndexerTransport>,
    retry: RetryPolicy<IndexerError>,
}

impl std::fmt::Debug for IndexerClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexerClient")
            .field("base_url", &self.base_url.as_str())
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl IndexerClient {
    /// Create a client that talks HTTP to `base_url`.
    pub fn new(base_url: &str) -> Result<Self, IndexerError> {
        Self::with_transport(base_url, Arc::new(HttpTransport::default()))
    }

    /// Create a client over a custom transport.
    pub fn with_transport(
        base_url: &str,
        transport: Arc<dyn IndexerTransport>,
    ) -> Result<Self, IndexerError> {
        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| IndexerError::InvalidUrl(format!("{base_url}: {e}")))?;

        Ok(Self {
            base_url,
            transport,
            retry: RetryPolicy::new(),
        })
    }

    /// Replace the default retry policy applied to every request.
    pub fn with_retry_policy(mut self, retry: RetryPolicy<IndexerError>) -> Self {
        self.retry = retry;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Start a request against `path` (e.g. `/api/v1/transactions`).
    pub fn request(&self, path: impl Into<String>) -> IndexerRequest<'_> {
        IndexerRequest {
            client: self,
            path: path.into(),
            query: Query::new(),
            retry: None,
        }
    }

    fn url_for(&self, path: &str, query: &Query) -> Result<Url, IndexerError> {
        let raw = format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        let mut url = Url::parse(&raw).map_err(|e| IndexerError::InvalidUrl(format!("{raw}: {e}")))?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query.iter());
        }
        Ok(url)
    }

    /// One GET, retried as a unit. An error envelope in the body fails the
    /// attempt with [`IndexerError::Api`].
    async fn fetch<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &Query,
        retry: &RetryPolicy<IndexerError>,
    ) -> Result<T, IndexerError> {
        let url = self.url_for(path, query)?;

        with_retry(
            || {
                let url = url.clone();
                async move {
                    let body = self.transport.get(url).await?;
                    if body.get("_status").is_some() {
                        let envelope: ErrorEnvelope = serde_json::from_value(body)?;
                        return Err(IndexerError::Api {
                            messages: envelope
                                .status
                                .messages
                                .into_iter()
                                .map(|m| m.message)
                                .collect(),
                        });
                    }
                    Ok(serde_json::from_value(body)?)
                }
            },
            retry,
        )
        .await
    }
}

/// A pending indexer request. Built with [`IndexerClient::request`].
#[derive(Debug)]
pub struct IndexerRequest<'a> {
    client: &'a IndexerClient,
    path: String,
    query: Query,
    retry: Option<RetryPolicy<IndexerError>>,
}

impl IndexerRequest<'_> {
    /// Set a query parameter.
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.set(key, value);
        self
    }

    /// Replace all query parameters.
    pub fn with_query(mut self, query: Query) -> Self {
        self.query = query;
        self
    }

    /// Override the client's retry policy for this request.
    pub fn retry(mut self, retry: RetryPolicy<IndexerError>) -> Self {
        self.retry = Some(retry);
        self
    }

    /// Fetch a single page.
    pub async fn get<T: DeserializeOwned>(self) -> Result<T, IndexerError> {
        let retry = self.retry.as_ref().unwrap_or(&self.client.retry);
        self.client.fetch(&self.path, &self.query, retry).await
    }

    /// Fetch a single page and pass it through `transform`.
    pub async fn get_with<T, R>(self, transform: impl FnOnce(T) -> R) -> Result<R, IndexerError>
    where
        T: DeserializeOwned,
    {
        self.get().await.map(transform)
    }

    /// Follow `links.next` until exhausted, collecting one value per page.
    ///
    /// Each page is retried independently. The first page that fails
    /// aborts the whole walk and nothing collected so far is returned.
    pub async fn get_paginated<T: DeserializeOwned + Paginated>(self) -> Result<Vec<T>, IndexerError> {
        self.get_paginated_with(|page| page).await
    }

    /// Like [`get_paginated`](Self::get_paginated), transforming each page.
    pub async fn get_paginated_with<T, R>(
        self,
        mut transform: impl FnMut(T) -> R,
    ) -> Result<Vec<R>, IndexerError>
    where
        T: DeserializeOwned + Paginated,
    {
        let retry = self.retry.as_ref().unwrap_or(&self.client.retry);
        let mut query = self.query.clone();
        let mut pages = Vec::new();

        loop {
            let page: T = self.client.fetch(&self.path, &query, retry).await?;
            let next = page.next_link().map(parse_query_params);
            pages.push(transform(page));

            match next {
                Some(next_query) => query = next_query,
                None => break,
            }
        }

        tracing::debug!(path = %self.path, pages = pages.len(), "Indexer pagination complete");
        Ok(pages)
    }
}
