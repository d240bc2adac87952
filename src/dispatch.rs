use chrono::Utc;
use std::fmt;
use std::sync::Arc;

use crate::client::{SearchClient, TransportError};
use crate::envelope::LogEnvelope;
use crate::lifecycle::{Interrupted, Lifecycle};

/// Where documents are written.
///
/// `Dynamic` is evaluated on every dispatch, which lets the target roll over
/// with time. The callback should be cheap and must not block.
#[derive(Clone)]
pub enum IndexName {
    Fixed(String),
    Dynamic(Arc<dyn Fn() -> String + Send + Sync>),
}

impl IndexName {
    pub fn dynamic<F>(f: F) -> Self
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        IndexName::Dynamic(Arc::new(f))
    }

    /// One index per UTC day: `{prefix}-YYYY.MM.DD`.
    pub fn daily(prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        IndexName::dynamic(move || format!("{}-{}", prefix, Utc::now().format("%Y.%m.%d")))
    }

    pub fn resolve(&self) -> String {
        match self {
            IndexName::Fixed(name) => name.clone(),
            IndexName::Dynamic(f) => f(),
        }
    }
}

impl From<String> for IndexName {
    fn from(name: String) -> Self {
        IndexName::Fixed(name)
    }
}

impl From<&str> for IndexName {
    fn from(name: &str) -> Self {
        IndexName::Fixed(name.to_string())
    }
}

impl fmt::Debug for IndexName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexName::Fixed(name) => f.debug_tuple("Fixed").field(name).finish(),
            IndexName::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

/// Per-record failure. The hook stays usable after `Transport` and `Aborted`.
#[derive(thiserror::Error, Debug)]
pub enum DispatchError {
    #[error("failed to index log document: {0}")]
    Transport(#[from] TransportError),

    #[error("log hook has been shut down")]
    Cancelled,

    #[error("transport call panicked")]
    Aborted,
}

impl From<Interrupted> for DispatchError {
    fn from(interrupted: Interrupted) -> Self {
        match interrupted {
            Interrupted::Cancelled => DispatchError::Cancelled,
            Interrupted::Panicked => DispatchError::Aborted,
        }
    }
}

/// Sends envelopes to the store, one request per envelope.
#[derive(Clone)]
pub struct Dispatcher {
    client: Arc<dyn SearchClient>,
    index: IndexName,
    doc_type: Option<String>,
}

impl Dispatcher {
    pub fn new(client: Arc<dyn SearchClient>, index: IndexName, doc_type: Option<String>) -> Self {
        Self { client, index, doc_type }
    }

    pub fn index(&self) -> &IndexName {
        &self.index
    }

    /// Index `envelope` and wait for the store's answer.
    ///
    /// The transport outcome is returned as is; nothing is retried.
    pub fn dispatch(&self, envelope: LogEnvelope, lifecycle: &Lifecycle) -> Result<(), DispatchError> {
        lifecycle.block_on(self.request(envelope))??;
        Ok(())
    }

    /// Schedule the request and return without waiting. Failures are only
    /// reported through `tracing`.
    pub fn dispatch_detached(&self, envelope: LogEnvelope, lifecycle: &Lifecycle) -> Result<(), DispatchError> {
        let request = self.request(envelope);
        lifecycle.spawn(async move {
            if let Err(e) = request.await {
                tracing::warn!(error = %e, "failed to index log document");
            }
        })?;
        Ok(())
    }

    fn request(
        &self,
        envelope: LogEnvelope,
    ) -> impl std::future::Future<Output = Result<(), TransportError>> + Send + 'static {
        let client = Arc::clone(&self.client);
        let index = self.index.resolve();
        let doc_type = self.doc_type.clone();
        async move { client.index_document(&index, doc_type.as_deref(), &envelope).await }
    }
}
