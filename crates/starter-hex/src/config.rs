use axum::http::{HeaderName, HeaderValue};
use starter_infra::ConfigService;
use starter_types::domain::trace::TRACE_HEADER;
use starter_types::ports::config::{ConfigError, Secrets};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};

#[cfg(feature = "mongo")]
use starter_infra::database::ConnectionModel;

/// Default request body limit (100 KiB).
pub const DEFAULT_BODY_LIMIT: usize = 100 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub body_limit: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorsConfig {
    /// `*` or a comma-separated list of origins.
    pub origin: String,
    pub credentials: bool,
}

impl CorsConfig {
    pub fn layer(&self) -> Result<CorsLayer, ConfigError> {
        let origin = if self.origin.trim() == "*" {
            if self.credentials {
                // Browsers refuse `*` together with credentials.
                AllowOrigin::mirror_request()
            } else {
                AllowOrigin::any()
            }
        } else {
            let origins = self
                .origin
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(|o| {
                    HeaderValue::from_str(o).map_err(|_| ConfigError::Invalid {
                        name: Secrets::Origin.as_str().to_string(),
                        value: self.origin.clone(),
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            AllowOrigin::list(origins)
        };

        Ok(CorsLayer::new()
            .allow_origin(origin)
            .allow_methods(AllowMethods::mirror_request())
            .allow_headers(AllowHeaders::mirror_request())
            .allow_credentials(self.credentials)
            .expose_headers([HeaderName::from_static(TRACE_HEADER)]))
    }
}

/// Everything the service reads from the environment at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: String,
    pub server: ServerConfig,
    pub cors: CorsConfig,
    #[cfg(feature = "redis")]
    pub redis_url: String,
    #[cfg(feature = "mongo")]
    pub mongo: ConnectionModel,
    #[cfg(feature = "sqlite")]
    pub database_url: String,
}

impl AppConfig {
    /// Fails on the first required key that is missing or malformed.
    pub fn load(config: &ConfigService) -> Result<Self, ConfigError> {
        Ok(Self {
            env: config.get(Secrets::Env)?,
            server: ServerConfig {
                host: config.get(Secrets::Host)?,
                port: config.get_as(Secrets::Port)?,
                body_limit: DEFAULT_BODY_LIMIT,
            },
            cors: CorsConfig {
                origin: config.get(Secrets::Origin)?,
                credentials: config.get_as(Secrets::Credentials)?,
            },
            #[cfg(feature = "redis")]
            redis_url: config.get(Secrets::RedisUrl)?,
            #[cfg(feature = "mongo")]
            mongo: ConnectionModel {
                host: config.get(Secrets::MongoHost)?,
                port: config.get_as(Secrets::MongoPort)?,
                user: config.get(Secrets::MongoUser)?,
                pass: config.get(Secrets::MongoPassword)?,
                db_name: config.get(Secrets::MongoDatabase)?,
            },
            #[cfg(feature = "sqlite")]
            database_url: config.get(Secrets::DatabaseUrl)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Vec<(&'static str, &'static str)> {
        vec![
            ("PORT", "3000"),
            ("HOST", "127.0.0.1"),
            ("ENV", "test"),
            ("ORIGIN", "*"),
            ("CREDENTIALS", "false"),
            ("REDIS_URL", "redis://127.0.0.1:6379"),
            ("MONGO_HOST", "localhost"),
            ("MONGO_PORT", "27017"),
            ("MONGO_USER", "root"),
            ("MONGO_PASSWORD", "secret"),
            ("MONGO_DATABASE", "starter"),
            ("DATABASE_URL", "sqlite://data/starter.db"),
        ]
    }

    #[test]
    fn loads_required_values() {
        let config = AppConfig::load(&ConfigService::from_map(base())).unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.body_limit, DEFAULT_BODY_LIMIT);
        assert_eq!(config.env, "test");
        assert!(!config.cors.credentials);
    }

    #[test]
    fn missing_key_is_named() {
        let vars = base().into_iter().filter(|(k, _)| *k != "ORIGIN");
        let err = AppConfig::load(&ConfigService::from_map(vars)).unwrap_err();
        assert_eq!(err, ConfigError::Missing("ORIGIN".into()));
        assert_eq!(
            err.to_string(),
            "ORIGIN is not defined in environment variables"
        );
    }

    #[test]
    fn malformed_port_is_invalid() {
        let vars = base()
            .into_iter()
            .map(|(k, v)| if k == "PORT" { (k, "http") } else { (k, v) });
        let err = AppConfig::load(&ConfigService::from_map(vars)).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref name, .. } if name == "PORT"));
    }

    #[test]
    fn origin_list_builds_layer() {
        let cors = CorsConfig {
            origin: "http://a.test, http://b.test".into(),
            credentials: true,
        };
        assert!(cors.layer().is_ok());

        let wildcard = CorsConfig {
            origin: "*".into(),
            credentials: true,
        };
        assert!(wildcard.layer().is_ok());
    }

    #[test]
    fn unusable_origin_is_rejected() {
        let cors = CorsConfig {
            origin: "http://a.test,\u{7f}bad".into(),
            credentials: false,
        };
        assert!(matches!(cors.layer(), Err(ConfigError::Invalid { .. })));
    }
}
