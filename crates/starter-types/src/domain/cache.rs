use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Any JSON-serializable payload can be cached.
pub type CacheValue = serde_json::Value;

/// Cache keys are strings or integers; both render to the same textual key
/// inside a store, so `CacheKey::from(7)` and `CacheKey::from("7")` collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CacheKey {
    Str(String),
    Num(i64),
}

impl CacheKey {
    pub fn as_key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheKey::Str(s) => f.write_str(s),
            CacheKey::Num(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for CacheKey {
    fn from(value: &str) -> Self {
        CacheKey::Str(value.to_string())
    }
}

impl From<String> for CacheKey {
    fn from(value: String) -> Self {
        CacheKey::Str(value)
    }
}

impl From<i64> for CacheKey {
    fn from(value: i64) -> Self {
        CacheKey::Num(value)
    }
}

impl From<i32> for CacheKey {
    fn from(value: i32) -> Self {
        CacheKey::Num(value.into())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetOptions {
    /// `None` falls back to the store default; `Some(Duration::ZERO)` never expires.
    pub ttl: Option<Duration>,
    pub only_if_absent: bool,
}

impl SetOptions {
    pub fn ttl(ttl: Duration) -> Self {
        Self {
            ttl: Some(ttl),
            only_if_absent: false,
        }
    }

    pub fn only_if_absent(mut self) -> Self {
        self.only_if_absent = true;
        self
    }
}

/// One entry of a multi-key write.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub key: CacheKey,
    pub value: CacheValue,
    pub ttl: Option<Duration>,
}

impl CacheEntry {
    pub fn new(key: impl Into<CacheKey>, value: CacheValue) -> Self {
        Self {
            key: key.into(),
            value,
            ttl: None,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_and_numeric_keys_render_the_same() {
        assert_eq!(CacheKey::from(42).as_key(), CacheKey::from("42").as_key());
        assert_eq!(CacheKey::from("user:1").to_string(), "user:1");
    }

    #[test]
    fn set_options_builders() {
        let opts = SetOptions::ttl(Duration::from_millis(250)).only_if_absent();
        assert_eq!(opts.ttl, Some(Duration::from_millis(250)));
        assert!(opts.only_if_absent);
        assert_eq!(SetOptions::default().ttl, None);
    }
}
