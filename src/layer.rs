use crate::lifecycle::on_dispatch_thread;
use crate::record::{FieldValue, LogRecord};
use crate::registry::HookRegistry;
use crate::severity::Severity;
use serde_json::Value;
use std::cell::Cell;
use std::collections::BTreeMap;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

thread_local! {
    static IN_HOOK: Cell<bool> = const { Cell::new(false) };
}

/// `tracing_subscriber` layer that turns events into [`LogRecord`]s and hands
/// them to the hooks of a [`HookRegistry`] on the emitting thread.
///
/// Events are skipped when
/// - their level has no [`Severity`] (`TRACE`) or no hook wants it,
/// - they come from this crate or from a hook's dispatch executor,
/// - they are emitted while a hook is already running on the same thread.
///
/// The last two keep the transport's own diagnostics from looping back into
/// the store.
pub struct HookLayer {
    hooks: HookRegistry,
    /// Events handed to the registry.
    pub fired_events: Arc<AtomicU64>,
    /// Events for which at least one hook reported a failure.
    pub failed_events: Arc<AtomicU64>,
}

impl HookLayer {
    pub fn new(hooks: HookRegistry) -> Self {
        Self {
            hooks,
            fired_events: Arc::new(AtomicU64::new(0)),
            failed_events: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn hooks(&self) -> &HookRegistry {
        &self.hooks
    }
}

struct HookGuard;

impl HookGuard {
    fn enter() -> Option<Self> {
        IN_HOOK.with(|flag| {
            if flag.replace(true) {
                None
            } else {
                Some(HookGuard)
            }
        })
    }
}

impl Drop for HookGuard {
    fn drop(&mut self) {
        IN_HOOK.with(|flag| flag.set(false));
    }
}

impl<S> Layer<S> for HookLayer
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let meta = event.metadata();
        let Some(level) = Severity::from_tracing(meta.level()) else {
            return;
        };
        if meta.target().starts_with(env!("CARGO_CRATE_NAME")) || on_dispatch_thread() {
            return;
        }
        let Some(_guard) = HookGuard::enter() else {
            return;
        };

        let mut record = LogRecord::new(level, String::new());
        if !self.hooks.wants(&record) {
            return;
        }

        let mut visitor = FieldVisitor { fields: &mut record.fields, message: &mut record.message };
        event.record(&mut visitor);

        self.fired_events.fetch_add(1, Ordering::Relaxed);
        if let Err(e) = self.hooks.fire(&record) {
            self.failed_events.fetch_add(1, Ordering::Relaxed);
            tracing::warn!(hook = %e.hook, error = %e.source, "failed to forward log record");
        }
    }
}

/// Collects event fields into a [`LogRecord`]'s field map and message.
pub struct FieldVisitor<'a> {
    pub fields: &'a mut BTreeMap<String, FieldValue>,
    pub message: &'a mut String,
}

impl<'a> FieldVisitor<'a> {
    fn insert(&mut self, field: &Field, value: Value) {
        self.fields.insert(field.name().to_string(), FieldValue::Value(value));
    }
}

impl<'a> Visit for FieldVisitor<'a> {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            *self.message = value.to_string();
        } else {
            self.insert(field, Value::String(value.to_string()));
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.insert(field, Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.insert(field, Value::from(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.insert(field, Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.insert(field, Value::from(value));
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.fields.insert(field.name().to_string(), FieldValue::error(value));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            *self.message = format!("{:?}", value);
        } else {
            self.insert(field, Value::String(format!("{:?}", value)));
        }
    }
}
