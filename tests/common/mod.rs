#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing_elastic_hook::{CreateIndexResponse, LogEnvelope, SearchClient, TransportError};

/// In-memory store standing in for a cluster.
#[derive(Default)]
pub struct MemoryStore {
    pub(crate) indices: Mutex<BTreeSet<String>>,
    pub(crate) docs: Mutex<BTreeMap<String, Vec<(Option<String>, LogEnvelope)>>>,
    pub exists_calls: AtomicUsize,
    pub create_calls: AtomicUsize,
    pub acknowledge: bool,
    pub fail_exists: bool,
    pub fail_create: bool,
    /// Reject documents whose message contains this text.
    pub reject_containing: Option<String>,
    /// Delay applied to every document write.
    pub write_delay: Option<Duration>,
    /// Never answer document writes.
    pub hang: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self { acknowledge: true, ..Default::default() }
    }

    pub fn with_index(self, index: &str) -> Self {
        self.indices.lock().unwrap().insert(index.to_string());
        self
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn has_index(&self, index: &str) -> bool {
        self.indices.lock().unwrap().contains(index)
    }

    pub fn documents(&self, index: &str) -> Vec<LogEnvelope> {
        self.docs
            .lock()
            .unwrap()
            .get(index)
            .map(|docs| docs.iter().map(|(_, doc)| doc.clone()).collect())
            .unwrap_or_default()
    }

    pub fn doc_types(&self, index: &str) -> Vec<Option<String>> {
        self.docs
            .lock()
            .unwrap()
            .get(index)
            .map(|docs| docs.iter().map(|(t, _)| t.clone()).collect())
            .unwrap_or_default()
    }

    /// Equivalent of a term query on `Host`.
    pub fn search_by_host(&self, index: &str, host: &str) -> Vec<LogEnvelope> {
        self.documents(index).into_iter().filter(|doc| doc.host == host).collect()
    }

    pub fn total_documents(&self) -> usize {
        self.docs.lock().unwrap().values().map(Vec::len).sum()
    }
}

#[async_trait]
impl SearchClient for MemoryStore {
    async fn index_exists(&self, index: &str) -> Result<bool, TransportError> {
        self.exists_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_exists {
            return Err(TransportError::Status { status: 503, body: "unavailable".into() });
        }
        Ok(self.has_index(index))
    }

    async fn create_index(&self, index: &str) -> Result<CreateIndexResponse, TransportError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_create {
            return Err(TransportError::Status { status: 400, body: "bad settings".into() });
        }
        if self.acknowledge {
            self.indices.lock().unwrap().insert(index.to_string());
        }
        Ok(CreateIndexResponse { acknowledged: self.acknowledge })
    }

    async fn index_document(
        &self,
        index: &str,
        doc_type: Option<&str>,
        document: &LogEnvelope,
    ) -> Result<(), TransportError> {
        if self.hang {
            std::future::pending::<()>().await;
        }
        if let Some(delay) = self.write_delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(needle) = &self.reject_containing {
            if document.message.contains(needle.as_str()) {
                return Err(TransportError::Status { status: 429, body: "rejected".into() });
            }
        }
        self.docs
            .lock()
            .unwrap()
            .entry(index.to_string())
            .or_default()
            .push((doc_type.map(str::to_string), document.clone()));
        Ok(())
    }
}
