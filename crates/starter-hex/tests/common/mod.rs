#![allow(dead_code)]

use starter_hex::application::health_service::{AppInfo, HealthService};
use starter_hex::config::{CorsConfig, ServerConfig, DEFAULT_BODY_LIMIT};
use starter_hex::inbound::http::routes::HealthRoute;
use starter_hex::inbound::http::{HttpServer, HttpServerConfig, Routes};
use starter_infra::cache::MemoryCacheService;
use starter_infra::{Cache, ConfigService, Infra, LogBuffer, LoggerService};
use std::sync::Arc;
use tracing::level_filters::LevelFilter;

pub const ALLOWED_ORIGIN: &str = "http://allowed.test";

pub fn find_free_port() -> u16 {
    std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}

pub struct TestApp {
    pub base: String,
    pub logs: LogBuffer,
    pub infra: Arc<Infra>,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    /// JSON log lines whose message contains `needle`.
    pub fn log_events(&self, needle: &str) -> Vec<serde_json::Value> {
        self.logs
            .lines()
            .iter()
            .filter_map(|line| serde_json::from_str::<serde_json::Value>(line).ok())
            .filter(|event| {
                event["fields"]["message"]
                    .as_str()
                    .is_some_and(|m| m.contains(needle))
            })
            .collect()
    }
}

pub async fn spawn_app(extra: Vec<Box<dyn Routes>>) -> TestApp {
    let port = find_free_port();
    let logs = LogBuffer::new();
    let logger = LoggerService::with_writer("starter-test", logs.clone(), LevelFilter::TRACE);

    let memory = Cache::from(MemoryCacheService::new(logger.clone()));
    memory.connect().await.unwrap();
    let infra = Infra::builder(ConfigService::from_map(Vec::<(String, String)>::new()), logger)
        .with_memory(memory)
        .build();

    let mut routes: Vec<Box<dyn Routes>> = vec![Box::new(HealthRoute::new(HealthService::new(
        AppInfo::new("starter", "0.1.0"),
    )))];
    routes.extend(extra);

    let config = HttpServerConfig {
        server: ServerConfig {
            host: "127.0.0.1".into(),
            port,
            body_limit: DEFAULT_BODY_LIMIT,
        },
        cors: CorsConfig {
            origin: ALLOWED_ORIGIN.into(),
            credentials: true,
        },
        env: "test".into(),
    };
    let server = HttpServer::new(infra.clone(), config, routes).unwrap();
    tokio::spawn(async move {
        server.run().await.expect("server run");
    });

    // Give the server a moment to start.
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;

    TestApp {
        base: format!("http://127.0.0.1:{}", port),
        logs,
        infra,
    }
}
