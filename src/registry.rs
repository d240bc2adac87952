use std::collections::BTreeMap;
use std::error::Error;
use std::sync::Arc;

use crate::hook::Hook;
use crate::record::LogRecord;

/// A hook failed to handle a record.
#[derive(thiserror::Error, Debug)]
#[error("hook `{hook}` failed: {source}")]
pub struct HookError {
    pub hook: String,
    #[source]
    pub source: Box<dyn Error + Send + Sync>,
}

/// Set of hooks, keyed by a caller-chosen name.
///
/// This is the registration point the logging side consults: a record is
/// handed to a hook only when its severity is in that hook's
/// [`Hook::levels`].
#[derive(Clone, Default)]
pub struct HookRegistry {
    hooks: BTreeMap<String, Arc<dyn Hook>>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `hook` under `name`, returning the hook it replaces.
    pub fn register(&mut self, name: impl Into<String>, hook: Arc<dyn Hook>) -> Option<Arc<dyn Hook>> {
        self.hooks.insert(name.into(), hook)
    }

    pub fn unregister(&mut self, name: &str) -> Option<Arc<dyn Hook>> {
        self.hooks.remove(name)
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Whether any hook wants records of this severity.
    pub fn wants(&self, record: &LogRecord) -> bool {
        self.hooks.values().any(|hook| hook.levels().contains(&record.level))
    }

    /// Hand `record` to every interested hook.
    ///
    /// All hooks are fired even when one fails; the first failure is returned.
    pub fn fire(&self, record: &LogRecord) -> Result<(), HookError> {
        let mut first_err = None;
        for (name, hook) in &self.hooks {
            if !hook.levels().contains(&record.level) {
                continue;
            }
            if let Err(source) = hook.receive(record) {
                first_err.get_or_insert(HookError { hook: name.clone(), source });
            }
        }
        first_err.map_or(Ok(()), Err)
    }
}

impl std::fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.hooks.keys()).finish()
    }
}
