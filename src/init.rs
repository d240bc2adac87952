use crate::hook::Hook;
use crate::layer::HookLayer;
use crate::registry::HookRegistry;
use std::sync::Arc;
use tracing::subscriber::SetGlobalDefaultError;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Registry;

/// Configuration of the installed subscriber.
///
/// **Fields**
/// - `enable_stdout`: if `true`, a `tracing_subscriber::fmt::Layer` is added
///   next to the [`HookLayer`] so events are also printed to the console.
#[derive(Clone, Debug)]
pub struct LayerConfig {
    pub enable_stdout: bool,
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self { enable_stdout: true }
    }
}

/// Install a global `tracing` subscriber that forwards events to `hooks`.
///
/// **Parameters**
/// - `hooks`: registry of hooks that receive matching [`LogRecord`]s.
/// - `config`: [`LayerConfig`] controlling console output.
///
/// **Returns**
/// - `Err(..)` if a global subscriber was already installed.
///
/// [`LogRecord`]: crate::record::LogRecord
pub fn init_tracing_with_config(hooks: HookRegistry, config: LayerConfig) -> Result<(), SetGlobalDefaultError> {
    let layer = HookLayer::new(hooks);

    // The two subscriber stacks have different types, so each branch installs
    // its own.
    if config.enable_stdout {
        let fmt_layer = tracing_subscriber::fmt::layer();
        let subscriber = Registry::default().with(layer).with(fmt_layer);
        tracing::subscriber::set_global_default(subscriber)
    } else {
        let subscriber = Registry::default().with(layer);
        tracing::subscriber::set_global_default(subscriber)
    }
}

/// Install a global subscriber forwarding to a single hook, with console
/// output enabled.
///
/// This is the recommended entrypoint for typical services.
pub fn init_tracing(hook: Arc<dyn Hook>) -> Result<(), SetGlobalDefaultError> {
    let mut hooks = HookRegistry::new();
    hooks.register("elastic", hook);
    init_tracing_with_config(hooks, LayerConfig::default())
}
