//! Structured JSON logger
//!
//! One line per event on stderr, since stdout belongs to the CLI's
//! responses. `event` and `severity` come first and the remaining fields
//! follow in key order, so two lines for the same event diff cleanly.
//!
//! `MULTIREV_LOG` sets the minimum severity (`info`, `warn`, `error`,
//! `fatal` or `off`) and is read once per process; default `info`.

use std::io::{self, Write};
use std::sync::OnceLock;

use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warn,
    Error,
    /// The store can no longer be trusted
    Fatal,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
            Severity::Fatal => "FATAL",
        }
    }

    /// `None` turns logging off. Unknown values fall back to `Info`.
    fn threshold_from(value: &str) -> Option<Severity> {
        match value.trim().to_ascii_lowercase().as_str() {
            "warn" => Some(Severity::Warn),
            "error" => Some(Severity::Error),
            "fatal" => Some(Severity::Fatal),
            "off" | "none" => None,
            _ => Some(Severity::Info),
        }
    }
}

static THRESHOLD: OnceLock<Option<Severity>> = OnceLock::new();

fn threshold() -> Option<Severity> {
    *THRESHOLD.get_or_init(|| {
        std::env::var("MULTIREV_LOG")
            .map(|v| Severity::threshold_from(&v))
            .unwrap_or(Some(Severity::Info))
    })
}

pub struct Logger;

impl Logger {
    pub fn log(severity: Severity, event: &str, fields: &[(&str, &str)]) {
        if threshold().is_some_and(|min| severity >= min) {
            let line = Self::render(severity, event, fields);
            // a lost log line must never fail the write path
            let _ = io::stderr().lock().write_all(line.as_bytes());
        }
    }

    fn render(severity: Severity, event: &str, fields: &[(&str, &str)]) -> String {
        let mut sorted: Vec<&(&str, &str)> = fields.iter().collect();
        sorted.sort_by_key(|(key, _)| *key);

        let mut line = format!(
            "{{\"event\":{},\"severity\":\"{}\"",
            quoted(event),
            severity.as_str()
        );
        for (key, value) in sorted {
            line.push(',');
            line.push_str(&quoted(key));
            line.push(':');
            line.push_str(&quoted(value));
        }
        line.push_str("}\n");
        line
    }
}

fn quoted(s: &str) -> String {
    Value::from(s).to_string()
}
