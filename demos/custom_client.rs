use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, info};
use tracing_elastic_hook::init::init_tracing;
use tracing_elastic_hook::{CreateIndexResponse, ElasticHook, LogEnvelope, SearchClient, Severity, TransportError};

/// Example of plugging in a different transport by implementing
/// `SearchClient` directly. This one prints documents instead of sending
/// them anywhere.
struct StdoutClient;

#[async_trait]
impl SearchClient for StdoutClient {
    async fn index_exists(&self, _index: &str) -> Result<bool, TransportError> {
        Ok(false)
    }

    async fn create_index(&self, index: &str) -> Result<CreateIndexResponse, TransportError> {
        println!("[stdout-store] create {}", index);
        Ok(CreateIndexResponse { acknowledged: true })
    }

    async fn index_document(
        &self,
        index: &str,
        _doc_type: Option<&str>,
        document: &LogEnvelope,
    ) -> Result<(), TransportError> {
        let body = serde_json::to_string(document).map_err(|e| TransportError::Request(Box::new(e)))?;
        println!("[stdout-store] {} <- {}", index, body);
        Ok(())
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let hook = Arc::new(ElasticHook::new(Arc::new(StdoutClient), "demo", Severity::Debug, "demo-logs")?);

    init_tracing(hook.clone())?;

    info!("custom client example started");
    error!(db = "orders", "simulated error sent via custom client");

    hook.shutdown();
    Ok(())
}
