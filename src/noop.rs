use crate::client::{CreateIndexResponse, SearchClient, TransportError};
use crate::envelope::LogEnvelope;
use async_trait::async_trait;

/// A client that reports every index as present and drops all documents.
///
/// Useful for measuring the overhead of the hook itself without any
/// network I/O.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopClient;

#[async_trait]
impl SearchClient for NoopClient {
    async fn index_exists(&self, _index: &str) -> Result<bool, TransportError> {
        Ok(true)
    }

    async fn create_index(&self, _index: &str) -> Result<CreateIndexResponse, TransportError> {
        Ok(CreateIndexResponse { acknowledged: true })
    }

    async fn index_document(
        &self,
        _index: &str,
        _doc_type: Option<&str>,
        _document: &LogEnvelope,
    ) -> Result<(), TransportError> {
        Ok(())
    }
}
