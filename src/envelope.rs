use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::record::{FieldValue, LogRecord, ERROR_KEY};

/// Document indexed for every forwarded record.
///
/// Field names are part of the index mapping existing dashboards query, so
/// they are serialized in PascalCase: `Host`, `Timestamp`, `Message`, `Data`,
/// `Level`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct LogEnvelope {
    pub host: String,
    pub timestamp: String,
    pub message: String,
    pub data: BTreeMap<String, Value>,
    pub level: String,
}

impl LogEnvelope {
    /// Build the document for `record`.
    ///
    /// The timestamp is converted to UTC and always carries nine fractional
    /// digits. An error under [`ERROR_KEY`] is replaced by its message; every
    /// other field is copied as is.
    pub fn build(record: &LogRecord, host: &str) -> Self {
        let data = record
            .fields
            .iter()
            .map(|(key, value)| {
                let json = match value {
                    FieldValue::Error(err) if key == ERROR_KEY => Value::String(err.message.clone()),
                    other => other.to_json(),
                };
                (key.clone(), json)
            })
            .collect();

        LogEnvelope {
            host: host.to_string(),
            timestamp: record
                .time
                .with_timezone(&Utc)
                .to_rfc3339_opts(SecondsFormat::Nanos, true),
            message: record.message.clone(),
            data,
            level: record.level.as_str().to_uppercase(),
        }
    }
}
