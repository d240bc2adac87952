use crate::envelope::LogEnvelope;
use async_trait::async_trait;
use serde::Deserialize;
use std::error::Error;

/// Failure reported by a [`SearchClient`].
#[derive(thiserror::Error, Debug)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Request(#[source] Box<dyn Error + Send + Sync>),

    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("could not decode response: {0}")]
    Decode(#[source] Box<dyn Error + Send + Sync>),
}

/// Reply to an index creation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct CreateIndexResponse {
    #[serde(default)]
    pub acknowledged: bool,
}

/// Transport to the search store that log documents are written to.
///
/// Implementations are shared between every thread that logs, so they must
/// be safe for concurrent use and manage their own connection pooling. The
/// hook awaits these futures on its own executor; callers never poll them
/// directly.
#[async_trait]
pub trait SearchClient: Send + Sync {
    /// Whether `index` already exists in the store.
    async fn index_exists(&self, index: &str) -> Result<bool, TransportError>;

    /// Create `index` with the store's default settings.
    async fn create_index(&self, index: &str) -> Result<CreateIndexResponse, TransportError>;

    /// Write a single document to `index`.
    ///
    /// `doc_type` is the legacy mapping type some clusters still tag log
    /// documents with; `None` uses the store's default document endpoint.
    async fn index_document(
        &self,
        index: &str,
        doc_type: Option<&str>,
        document: &LogEnvelope,
    ) -> Result<(), TransportError>;
}
