use std::collections::HashMap;
use std::env::{self, VarError};
use std::str::FromStr;
use std::sync::Arc;

use starter_types::ports::config::ConfigError;

/// Named-value lookup over the process environment. Every call reads the
/// source again; nothing is cached and nothing is defaulted.
#[derive(Clone, Debug)]
pub struct ConfigService {
    source: Source,
}

#[derive(Clone, Debug)]
enum Source {
    Process,
    Fixed(Arc<HashMap<String, String>>),
}

impl ConfigService {
    pub fn from_env() -> Self {
        Self {
            source: Source::Process,
        }
    }

    pub fn from_map<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let map = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            source: Source::Fixed(Arc::new(map)),
        }
    }

    /// Empty values count as missing.
    pub fn get(&self, key: impl AsRef<str>) -> Result<String, ConfigError> {
        let name = key.as_ref();
        self.lookup(name)?
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ConfigError::Missing(name.to_string()))
    }

    pub fn get_as<T: FromStr>(&self, key: impl AsRef<str>) -> Result<T, ConfigError> {
        let name = key.as_ref();
        let value = self.get(name)?;
        value.parse::<T>().map_err(|_| ConfigError::Invalid {
            name: name.to_string(),
            value,
        })
    }

    pub fn get_opt(&self, key: impl AsRef<str>) -> Option<String> {
        self.get(key).ok()
    }

    fn lookup(&self, name: &str) -> Result<Option<String>, ConfigError> {
        match &self.source {
            Source::Process => match env::var(name) {
                Ok(value) => Ok(Some(value)),
                Err(VarError::NotPresent) => Ok(None),
                Err(VarError::NotUnicode(raw)) => Err(ConfigError::Invalid {
                    name: name.to_string(),
                    value: raw.to_string_lossy().into_owned(),
                }),
            },
            Source::Fixed(map) => Ok(map.get(name).cloned()),
        }
    }
}
