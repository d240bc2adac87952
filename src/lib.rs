//! Forward `tracing` events to Elasticsearch / OpenSearch.
//!
//! An [`ElasticHook`] makes sure its index exists when it is created, then
//! turns every accepted [`LogRecord`] into a [`LogEnvelope`] and indexes it
//! with one request per record. [`HookLayer`] plugs hooks into a
//! `tracing_subscriber` stack.
//!
//! ```no_run
//! use std::sync::Arc;
//! use tracing_elastic_hook::{init::init_tracing, ElasticClient, ElasticHook, Severity};
//!
//! let client = Arc::new(ElasticClient::new("http://localhost:9200"));
//! let hook = Arc::new(ElasticHook::new(client, "web-1", Severity::Info, "app-logs")?);
//! init_tracing(hook.clone())?;
//!
//! tracing::info!(user_id = 42, "signed in");
//! hook.shutdown();
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod backend;
pub mod client;
pub mod dispatch;
pub mod env;
pub mod envelope;
pub mod hook;
pub mod init;
pub mod layer;
pub mod lifecycle;
pub mod noop;
pub mod provision;
pub mod record;
pub mod registry;
pub mod severity;

#[cfg(feature = "elasticsearch")]
pub mod elastic;

pub use client::{CreateIndexResponse, SearchClient, TransportError};
pub use dispatch::{DispatchError, IndexName};
pub use envelope::LogEnvelope;
pub use hook::{DispatchMode, ElasticHook, Hook, HookConfig};
pub use layer::HookLayer;
pub use provision::ProvisionError;
pub use record::{FieldValue, LogRecord, ERROR_KEY};
pub use registry::HookRegistry;
pub use severity::{Severity, SeverityFilter};

#[cfg(feature = "elasticsearch")]
pub use elastic::ElasticClient;
