use serde::{Deserialize, Serialize};
use std::error::Error as StdError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub message: String,
    pub context: Option<String>,
    pub payload: Option<serde_json::Value>,
}

impl LogEntry {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Default::default()
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = Some(payload);
        self
    }
}

impl From<&str> for LogEntry {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<String> for LogEntry {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

/// Everything the logger needs to report a failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub name: String,
    pub message: String,
    pub status: u16,
    pub context: Option<String>,
    pub trace_id: Option<String>,
    /// Outermost error first, then each `source()` in turn.
    pub stack: Vec<String>,
}

impl ErrorRecord {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            name: name.into(),
            stack: vec![message.clone()],
            message,
            status: 500,
            context: None,
            trace_id: None,
        }
    }

    pub fn from_error(err: &(dyn StdError + 'static)) -> Self {
        let mut record = Self::new("Error", err.to_string());
        record.stack = source_chain(err);
        record
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_trace_id(mut self, trace_id: impl Into<String>) -> Self {
        self.trace_id = Some(trace_id.into());
        self
    }
}

pub fn source_chain(err: &(dyn StdError + 'static)) -> Vec<String> {
    let mut chain = vec![err.to_string()];
    let mut current = err.source();
    while let Some(source) = current {
        chain.push(source.to_string());
        current = source.source();
    }
    chain
}

/// Summary of one served request, handed to the logger's per-request hook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpLogRecord {
    pub trace_id: String,
    pub method: String,
    pub path: String,
    pub status: u16,
    pub time_taken_ms: u128,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("outer failure")]
    struct Outer(#[source] std::io::Error);

    #[test]
    fn from_error_walks_sources() {
        let err = Outer(std::io::Error::new(std::io::ErrorKind::Other, "disk gone"));
        let record = ErrorRecord::from_error(&err);
        assert_eq!(record.message, "outer failure");
        assert_eq!(record.status, 500);
        assert_eq!(record.stack, vec!["outer failure", "disk gone"]);
    }

    #[test]
    fn log_entry_builders() {
        let entry = LogEntry::new("hello")
            .with_context("Boot")
            .with_payload(serde_json::json!({ "port": 3000 }));
        assert_eq!(entry.context.as_deref(), Some("Boot"));
        assert_eq!(entry.payload.unwrap()["port"], 3000);
    }
}
