//! Security configuration document access.
//!
//! Rule documents live in an external document store keyed by
//! `(doc_type, doc_id)`. The store is authoritative; the gateway reads
//! through it and owns no long-term state of its own.

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::PermissionConfig;
use crate::error::GatewayError;

/// Read-through source for configuration documents.
#[async_trait]
pub trait ConfigDocumentSource: Send + Sync {
    /// Fetch a document. `Ok(None)` means the document does not exist;
    /// transport failures are `MalformedConfiguration` since they leave
    /// the permission model unreadable (operator error, not a denial).
    async fn fetch(
        &self,
        doc_type: &str,
        doc_id: &str,
    ) -> Result<Option<serde_json::Value>, GatewayError>;
}

#[derive(Deserialize)]
struct StoredDocument {
    #[serde(rename = "_source")]
    source: serde_json::Value,
}

/// Client for the document store's HTTP API.
pub struct HttpDocumentStore {
    client: reqwest::Client,
    base_url: String,
    index: String,
}

impl HttpDocumentStore {
    pub fn from_config(config: &PermissionConfig) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GatewayError::MalformedConfiguration(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.document_store_endpoint.trim_end_matches('/').to_string(),
            index: config.security_index.clone(),
        })
    }
}

#[async_trait]
impl ConfigDocumentSource for HttpDocumentStore {
    async fn fetch(
        &self,
        doc_type: &str,
        doc_id: &str,
    ) -> Result<Option<serde_json::Value>, GatewayError> {
        let url = format!("{}/{}/{}/{}", self.base_url, self.index, doc_type, doc_id);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| GatewayError::MalformedConfiguration(e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(GatewayError::MalformedConfiguration(format!(
                "document store answered {} for {}/{}",
                response.status(),
                doc_type,
                doc_id
            )));
        }

        let stored: StoredDocument = response
            .json()
            .await
            .map_err(|e| GatewayError::MalformedConfiguration(e.to_string()))?;

        Ok(Some(stored.source))
    }
}
