use chrono::{DateTime, FixedOffset, Local};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::error::Error;

use crate::severity::Severity;

/// Field key whose error value is flattened into text when the record is
/// turned into a document.
pub const ERROR_KEY: &str = "error";

/// Text rendering of an error captured from a log call, with its `source()`
/// chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorValue {
    pub message: String,
    pub sources: Vec<String>,
}

impl ErrorValue {
    pub fn from_error(err: &dyn Error) -> Self {
        let mut sources = Vec::new();
        let mut next = err.source();
        while let Some(source) = next {
            sources.push(source.to_string());
            next = source.source();
        }
        Self { message: err.to_string(), sources }
    }
}

impl From<&ErrorValue> for Value {
    fn from(err: &ErrorValue) -> Self {
        serde_json::json!({
            "message": err.message,
            "sources": err.sources,
        })
    }
}

/// Value attached to a record field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Value(Value),
    Error(ErrorValue),
}

impl FieldValue {
    pub fn error(err: &dyn Error) -> Self {
        FieldValue::Error(ErrorValue::from_error(err))
    }

    /// The error rendering, if this value carries one.
    pub fn as_error(&self) -> Option<&ErrorValue> {
        match self {
            FieldValue::Error(err) => Some(err),
            FieldValue::Value(_) => None,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Value(value) => value.clone(),
            FieldValue::Error(err) => Value::from(err),
        }
    }
}

impl From<Value> for FieldValue {
    fn from(value: Value) -> Self {
        FieldValue::Value(value)
    }
}

impl From<ErrorValue> for FieldValue {
    fn from(err: ErrorValue) -> Self {
        FieldValue::Error(err)
    }
}

/// One log call as handed over by the logging framework.
#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    pub level: Severity,
    pub message: String,
    pub fields: BTreeMap<String, FieldValue>,
    pub time: DateTime<FixedOffset>,
}

impl LogRecord {
    /// Record stamped with the current local time and no fields.
    pub fn new(level: Severity, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            fields: BTreeMap::new(),
            time: Local::now().fixed_offset(),
        }
    }

    pub fn with_time(mut self, time: DateTime<FixedOffset>) -> Self {
        self.time = time;
        self
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), FieldValue::Value(value.into()));
        self
    }

    /// Attach `err` under [`ERROR_KEY`].
    pub fn with_error(mut self, err: &dyn Error) -> Self {
        self.fields.insert(ERROR_KEY.to_string(), FieldValue::error(err));
        self
    }
}
