use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Inbound header carrying the correlation token.
pub const TRACE_HEADER: &str = "traceid";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TraceId(String);

impl TraceId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Keeps a non-empty inbound value verbatim, otherwise generates a new one.
    pub fn from_inbound(value: Option<&str>) -> Self {
        match value {
            Some(v) if !v.is_empty() => Self(v.to_string()),
            _ => Self::generate(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TraceId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
