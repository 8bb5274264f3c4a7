use starter_types::ports::cache::CacheError;
use starter_types::ports::config::ConfigError;
use starter_types::ports::database::DatabaseError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InfraError {
    #[error(transparent)]
    Configuration(#[from] ConfigError),
    #[error(transparent)]
    Cache(#[from] CacheError),
    #[error(transparent)]
    Database(#[from] DatabaseError),
    #[error("telemetry initialization failed: {0}")]
    Telemetry(String),
}

impl InfraError {
    pub fn telemetry(message: impl Into<String>) -> Self {
        Self::Telemetry(message.into())
    }
}
