use std::error::Error;
use std::sync::Arc;

use crate::client::SearchClient;
use crate::dispatch::{DispatchError, Dispatcher, IndexName};
use crate::envelope::LogEnvelope;
use crate::env::{env_or, ELASTIC_HOOK_DOC_TYPE_ENV, ELASTIC_HOOK_HOST_ENV, ELASTIC_HOOK_LEVEL_ENV};
use crate::lifecycle::Lifecycle;
use crate::provision::{IndexProvisioner, ProvisionError};
use crate::record::LogRecord;
use crate::severity::{ParseSeverityError, Severity, SeverityFilter};

/// Receiver of log records registered with the logging framework.
///
/// The framework only calls [`Hook::receive`] for records whose severity is
/// listed in [`Hook::levels`].
pub trait Hook: Send + Sync {
    /// Severities this hook wants to see. Fixed for the hook's lifetime.
    fn levels(&self) -> &[Severity];

    /// Handle one record.
    ///
    /// **Returns**
    /// - `Ok(())` if the record was delivered.
    /// - `Err(..)` if delivery failed. The framework decides whether the
    ///   failure is surfaced anywhere else.
    fn receive(&self, record: &LogRecord) -> Result<(), Box<dyn Error + Send + Sync>>;
}

/// How `receive` waits for the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DispatchMode {
    /// Block the logging thread until the store answers.
    #[default]
    Sync,
    /// Hand the request to the dispatch executor and return immediately.
    Async,
}

/// Construction parameters for [`ElasticHook`].
///
/// **Fields**
/// - `client`: shared transport; the hook only reads it and never closes it.
/// - `host`: identity written into every document's `Host` field.
/// - `level`: least severe level that is still forwarded.
/// - `index`: fixed or per-dispatch index name.
/// - `doc_type`: legacy mapping type to tag documents with, e.g. `"log"`.
/// - `mode`: see [`DispatchMode`].
/// - `worker_threads`: size of the executor driving transport calls.
#[derive(Clone)]
pub struct HookConfig {
    pub client: Arc<dyn SearchClient>,
    pub host: String,
    pub level: Severity,
    pub index: IndexName,
    pub doc_type: Option<String>,
    pub mode: DispatchMode,
    pub worker_threads: usize,
}

impl HookConfig {
    pub fn new(
        client: Arc<dyn SearchClient>,
        host: impl Into<String>,
        level: Severity,
        index: impl Into<IndexName>,
    ) -> Self {
        Self {
            client,
            host: host.into(),
            level,
            index: index.into(),
            doc_type: None,
            mode: DispatchMode::Sync,
            worker_threads: 2,
        }
    }

    /// Build a config from `ELASTIC_HOOK_*` environment variables.
    ///
    /// The host defaults to the machine's hostname and the level to `info`.
    pub fn from_env(client: Arc<dyn SearchClient>, index: impl Into<IndexName>) -> Result<Self, ParseSeverityError> {
        let default_host = hostname::get()
            .map(|h| h.to_string_lossy().into_owned())
            .unwrap_or_else(|_| "localhost".to_string());
        let host = env_or(ELASTIC_HOOK_HOST_ENV, &default_host);
        let level = env_or(ELASTIC_HOOK_LEVEL_ENV, "info").parse()?;

        let mut config = Self::new(client, host, level, index);
        config.doc_type = std::env::var(ELASTIC_HOOK_DOC_TYPE_ENV).ok().filter(|t| !t.is_empty());
        Ok(config)
    }
}

/// Hook that indexes every accepted record as a JSON document.
///
/// Safe to share between threads; every call builds its own document and the
/// only shared state is the read-only configuration and the cancellation
/// scope.
pub struct ElasticHook {
    host: String,
    filter: SeverityFilter,
    dispatcher: Dispatcher,
    mode: DispatchMode,
    lifecycle: Lifecycle,
}

impl ElasticHook {
    /// Create a hook writing to a fixed index, creating the index if needed.
    pub fn new(
        client: Arc<dyn SearchClient>,
        host: impl Into<String>,
        level: Severity,
        index: impl Into<String>,
    ) -> Result<Self, ProvisionError> {
        Self::from_config(HookConfig::new(client, host, level, IndexName::Fixed(index.into())))
    }

    /// Create a hook whose index name is computed by `index_fn` on every
    /// dispatch, e.g. to roll over daily.
    ///
    /// Only the name returned during construction is provisioned.
    pub fn with_index_fn<F>(
        client: Arc<dyn SearchClient>,
        host: impl Into<String>,
        level: Severity,
        index_fn: F,
    ) -> Result<Self, ProvisionError>
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        Self::from_config(HookConfig::new(client, host, level, IndexName::dynamic(index_fn)))
    }

    pub fn from_config(config: HookConfig) -> Result<Self, ProvisionError> {
        let lifecycle = Lifecycle::new(config.worker_threads)?;

        IndexProvisioner::new(&config.client, &lifecycle).ensure(&config.index.resolve())?;

        Ok(Self {
            host: config.host,
            filter: SeverityFilter::new(config.level),
            dispatcher: Dispatcher::new(config.client, config.index, config.doc_type),
            mode: config.mode,
            lifecycle,
        })
    }

    /// Forward `record` to the store.
    ///
    /// In [`DispatchMode::Sync`] this blocks until the store answers or the
    /// hook is shut down. The level is not checked here; that is the
    /// framework's job via [`Hook::levels`].
    pub fn receive(&self, record: &LogRecord) -> Result<(), DispatchError> {
        let envelope = LogEnvelope::build(record, &self.host);
        match self.mode {
            DispatchMode::Sync => self.dispatcher.dispatch(envelope, &self.lifecycle),
            DispatchMode::Async => self.dispatcher.dispatch_detached(envelope, &self.lifecycle),
        }
    }

    /// Abort in-flight dispatches and fail every later one with
    /// [`DispatchError::Cancelled`]. Idempotent.
    pub fn shutdown(&self) {
        self.lifecycle.shutdown();
    }

    pub fn is_shut_down(&self) -> bool {
        self.lifecycle.is_cancelled()
    }

    pub fn host(&self) -> &str {
        &self.host
    }
}

impl Hook for ElasticHook {
    fn levels(&self) -> &[Severity] {
        self.filter.levels()
    }

    fn receive(&self, record: &LogRecord) -> Result<(), Box<dyn Error + Send + Sync>> {
        ElasticHook::receive(self, record).map_err(Into::into)
    }
}

impl std::fmt::Debug for ElasticHook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElasticHook")
            .field("host", &self.host)
            .field("levels", &self.filter.levels())
            .field("index", self.dispatcher.index())
            .field("mode", &self.mode)
            .field("lifecycle", &self.lifecycle)
            .finish()
    }
}
