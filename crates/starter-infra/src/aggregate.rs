use starter_client::HttpService;
use std::sync::Arc;

use crate::cache::Cache;
use crate::config::ConfigService;
use crate::logger::LoggerService;

#[cfg(feature = "mongo")]
use crate::database::MongoService;
#[cfg(feature = "sqlite")]
use crate::database::SqliteService;

/// Shared bundle handed to every request. Built once; the fields are never
/// reassigned afterwards, and every adapter it holds is safe to use from
/// concurrent requests.
pub struct Infra {
    pub config: ConfigService,
    pub logger: LoggerService,
    pub http: HttpService,
    pub memory: Option<Cache>,
    pub redis: Option<Cache>,
    #[cfg(feature = "mongo")]
    pub mongo: Option<Arc<MongoService>>,
    #[cfg(feature = "sqlite")]
    pub sqlite: Option<Arc<SqliteService>>,
}

pub struct InfraBuilder {
    infra: Infra,
}

impl Infra {
    pub fn builder(config: ConfigService, logger: LoggerService) -> InfraBuilder {
        InfraBuilder {
            infra: Infra {
                config,
                logger,
                http: HttpService::new(),
                memory: None,
                redis: None,
                #[cfg(feature = "mongo")]
                mongo: None,
                #[cfg(feature = "sqlite")]
                sqlite: None,
            },
        }
    }
}

impl InfraBuilder {
    pub fn with_http(mut self, http: HttpService) -> Self {
        self.infra.http = http;
        self
    }

    pub fn with_memory(mut self, cache: impl Into<Cache>) -> Self {
        self.infra.memory = Some(cache.into());
        self
    }

    pub fn with_redis(mut self, cache: impl Into<Cache>) -> Self {
        self.infra.redis = Some(cache.into());
        self
    }

    #[cfg(feature = "mongo")]
    pub fn with_mongo(mut self, mongo: MongoService) -> Self {
        self.infra.mongo = Some(Arc::new(mongo));
        self
    }

    #[cfg(feature = "sqlite")]
    pub fn with_sqlite(mut self, sqlite: SqliteService) -> Self {
        self.infra.sqlite = Some(Arc::new(sqlite));
        self
    }

    pub fn build(self) -> Arc<Infra> {
        Arc::new(self.infra)
    }
}

impl std::fmt::Debug for Infra {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut out = f.debug_struct("Infra");
        out.field("logger", &self.logger)
            .field("memory", &self.memory)
            .field("redis", &self.redis);
        #[cfg(feature = "mongo")]
        out.field("mongo", &self.mongo.is_some());
        #[cfg(feature = "sqlite")]
        out.field("sqlite", &self.sqlite.is_some());
        out.finish()
    }
}
