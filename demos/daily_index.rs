use std::sync::Arc;

use tracing::{error, info};
use tracing_elastic_hook::init::init_tracing;
use tracing_elastic_hook::{ElasticClient, ElasticHook, HookConfig, IndexName, Severity};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // One index per day, e.g. `app-2024.03.01`. Only today's index is
    // created up front; the cluster has to auto-create the following ones.
    let client = Arc::new(ElasticClient::new("http://localhost:9200"));
    let config = HookConfig::new(client, "web-1", Severity::Info, IndexName::daily("app"));
    let hook = Arc::new(ElasticHook::from_config(config)?);

    init_tracing(hook.clone())?;

    info!("daily index example started");
    let err = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "upstream refused connection");
    error!(error = &err as &(dyn std::error::Error + 'static), "request failed");

    hook.shutdown();
    Ok(())
}
