//! HTTP client for the document store REST API.
//!
//! This module provides `HttpDocumentStore`, which counts documents with
//! `GET {endpoint}/databases/{db}/collections/{collection}/documents`.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::{Result, StoreError};
use crate::query::Query;
use crate::{StoreLocation, VoteStore};

/// Header carrying the store project id.
pub const PROJECT_HEADER: &str = "X-Appwrite-Project";

/// Header carrying the store API key.
pub const KEY_HEADER: &str = "X-Appwrite-Key";

/// Document list returned by the store.
#[derive(Debug, Deserialize)]
struct DocumentList {
    total: u64,
}

/// Error body returned by the store.
#[derive(Debug, Deserialize)]
struct StoreErrorResponse {
    message: String,
    #[serde(rename = "type", default)]
    kind: Option<String>,
}

/// HTTP client for the document store.
///
/// Idle connections are not kept between requests, so every invocation talks
/// to the store over fresh connections.
#[derive(Debug, Clone)]
pub struct HttpDocumentStore {
    client: reqwest::Client,
}

impl HttpDocumentStore {
    /// Create a new document store client.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be created.
    #[must_use]
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(5))
            .pool_max_idle_per_host(0)
            .build()
            .expect("Failed to create HTTP client");

        Self { client }
    }

    async fn error_from_response(response: reqwest::Response) -> StoreError {
        let status = response.status();
        let message = match response.json::<StoreErrorResponse>().await {
            Ok(body) => match body.kind {
                Some(kind) => format!("{} ({kind})", body.message),
                None => body.message,
            },
            Err(_) => status
                .canonical_reason()
                .unwrap_or("unknown error")
                .to_string(),
        };
        StoreError::Status {
            status: status.as_u16(),
            message,
        }
    }
}

impl Default for HttpDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VoteStore for HttpDocumentStore {
    async fn count(&self, location: &StoreLocation, queries: &[Query]) -> Result<u64> {
        let url = location.documents_url();
        let params = queries
            .iter()
            .map(|q| q.to_param().map(|p| ("queries[]", p)))
            .collect::<Result<Vec<_>>>()?;

        let response = self
            .client
            .get(&url)
            .header(PROJECT_HEADER, &location.project_id)
            .header(KEY_HEADER, &location.api_key)
            .query(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            let err = Self::error_from_response(response).await;
            tracing::warn!(
                collection_id = %location.collection_id,
                error = %err,
                "Document count query rejected"
            );
            return Err(err);
        }

        let list: DocumentList = response.json().await?;
        tracing::debug!(
            collection_id = %location.collection_id,
            total = list.total,
            "Document count query succeeded"
        );
        Ok(list.total)
    }
}
