use std::fmt;
use std::str::FromStr;

/// Urgency of a log record.
///
/// Variants are declared from most to least severe, so the derived ordering
/// reads as "`a <= b` means `a` is at least as severe as `b`".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Panic,
    Fatal,
    Error,
    Warn,
    Info,
    Debug,
}

impl Severity {
    /// Every severity, most severe first.
    pub const ALL: [Severity; 6] = [
        Severity::Panic,
        Severity::Fatal,
        Severity::Error,
        Severity::Warn,
        Severity::Info,
        Severity::Debug,
    ];

    /// Canonical lower-case name. `Warn` renders as `warning`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Panic => "panic",
            Severity::Fatal => "fatal",
            Severity::Error => "error",
            Severity::Warn => "warning",
            Severity::Info => "info",
            Severity::Debug => "debug",
        }
    }

    /// Map a `tracing` level. `TRACE` has no counterpart and is never forwarded.
    pub fn from_tracing(level: &tracing::Level) -> Option<Severity> {
        match *level {
            tracing::Level::ERROR => Some(Severity::Error),
            tracing::Level::WARN => Some(Severity::Warn),
            tracing::Level::INFO => Some(Severity::Info),
            tracing::Level::DEBUG => Some(Severity::Debug),
            _ => None,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a severity name cannot be parsed.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
#[error("unknown severity: {0}")]
pub struct ParseSeverityError(String);

impl FromStr for Severity {
    type Err = ParseSeverityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "panic" => Ok(Severity::Panic),
            "fatal" => Ok(Severity::Fatal),
            "error" => Ok(Severity::Error),
            "warn" | "warning" => Ok(Severity::Warn),
            "info" => Ok(Severity::Info),
            "debug" => Ok(Severity::Debug),
            other => Err(ParseSeverityError(other.to_string())),
        }
    }
}

/// Fixed set of severities a hook accepts, derived once from a threshold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeverityFilter {
    accepted: Vec<Severity>,
}

impl SeverityFilter {
    /// Accept every severity at least as severe as `threshold`.
    pub fn new(threshold: Severity) -> Self {
        let accepted = Severity::ALL
            .iter()
            .copied()
            .filter(|level| *level <= threshold)
            .collect();
        Self { accepted }
    }

    pub fn levels(&self) -> &[Severity] {
        &self.accepted
    }

    pub fn accepts(&self, level: Severity) -> bool {
        self.accepted.contains(&level)
    }
}
