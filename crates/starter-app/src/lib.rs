//! starter-app: wiring from environment to running server.

use starter_hex::application::health_service::{AppInfo, HealthService};
use starter_hex::config::AppConfig;
use starter_hex::inbound::http::routes::HealthRoute;
use starter_hex::inbound::http::Routes;
use starter_infra::cache::MemoryCacheService;
use starter_infra::{Cache, ConfigService, Infra, InfraError, LoggerService};
use starter_types::domain::log::LogEntry;
use std::sync::Arc;

#[cfg(feature = "redis")]
use starter_infra::cache::RedisCacheService;
#[cfg(feature = "mongo")]
use starter_infra::database::MongoService;
#[cfg(feature = "sqlite")]
use starter_infra::database::SqliteService;
#[cfg(any(feature = "mongo", feature = "sqlite"))]
use starter_types::ports::database::DatabaseService;
#[cfg(feature = "mongo")]
use starter_types::ports::database::ConnectionString;

pub fn app_info() -> AppInfo {
    AppInfo::new(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}

/// Route modules served by the binary.
pub fn routes(info: AppInfo) -> Vec<Box<dyn Routes>> {
    vec![Box::new(HealthRoute::new(HealthService::new(info)))]
}

/// Connects every compiled-in adapter once and bundles them. Any failed
/// connection aborts startup.
pub async fn build_infra(
    config: &AppConfig,
    env: ConfigService,
    logger: LoggerService,
) -> Result<Arc<Infra>, InfraError> {
    logger.trace(LogEntry::new(format!("ENV: {}", config.env)));

    let memory = Cache::from(MemoryCacheService::new(logger.clone()));
    memory.connect().await?;
    #[allow(unused_mut)]
    let mut builder = Infra::builder(env, logger.clone()).with_memory(memory);

    #[cfg(feature = "redis")]
    {
        let redis = Cache::from(RedisCacheService::new(&config.redis_url, logger.clone())?);
        redis.connect().await?;
        builder = builder.with_redis(redis);
    }

    #[cfg(feature = "mongo")]
    {
        let mongo = MongoService::new(logger.clone());
        mongo
            .connect(&MongoService::connection_string(&config.mongo))
            .await?;
        builder = builder.with_mongo(mongo);
    }

    #[cfg(feature = "sqlite")]
    {
        let sqlite = SqliteService::new(logger.clone());
        sqlite.connect(&config.database_url).await?;
        builder = builder.with_sqlite(sqlite);
    }

    Ok(builder.build())
}
