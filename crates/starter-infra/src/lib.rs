//! starter-infra: adapters over config, logging, caches and databases, plus
//! the infra aggregate that bundles them for request handlers.

pub mod aggregate;
pub mod cache;
pub mod config;
pub mod database;
pub mod error;
pub mod logger;
pub mod telemetry;

pub use aggregate::{Infra, InfraBuilder};
pub use cache::Cache;
pub use config::ConfigService;
pub use error::InfraError;
pub use logger::{LogBuffer, LoggerService};
pub use starter_client::HttpService;
