use starter_app::{app_info, build_infra, routes};
use starter_hex::config::AppConfig;
use starter_hex::errors::ApiError;
use starter_hex::inbound::http::{HttpServer, HttpServerConfig};
use starter_infra::telemetry::{self, LogFormat};
use starter_infra::{ConfigService, LoggerService};
use starter_types::ports::config::Secrets;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env for PORT / HOST / ORIGIN etc. when present.
    let _ = dotenvy::dotenv();

    let env = ConfigService::from_env();
    let format = match env.get_opt(Secrets::LogFormat) {
        Some(value) => value.parse::<LogFormat>()?,
        None => LogFormat::default(),
    };
    telemetry::init(format, "debug")?;

    let info = app_info();
    let logger = LoggerService::new(info.name.clone());

    let config = match AppConfig::load(&env) {
        Ok(config) => config,
        Err(err) => logger.fatal(ApiError::from(err).to_record()),
    };

    let infra = match build_infra(&config, env, logger.clone()).await {
        Ok(infra) => infra,
        Err(err) => logger.fatal(ApiError::from_error(&err).with_name("InfraError").to_record()),
    };

    let server = HttpServer::new(infra, HttpServerConfig::from(&config), routes(info))?;
    server.run().await
}
