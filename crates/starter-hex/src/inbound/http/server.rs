use axum::extract::DefaultBodyLimit;
use axum::extract::Request;
use axum::http::Method;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::{serve, Router};
use starter_infra::Infra;
use starter_types::domain::log::LogEntry;
use starter_types::domain::trace::TRACE_HEADER;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::{AppConfig, CorsConfig, ServerConfig};
use crate::errors::ApiError;
use crate::inbound::http::middleware::{
    inject_infra, normalize_errors, panic_response, trace_requests,
};
use crate::inbound::http::routes::Routes;

#[derive(Debug, Clone)]
pub struct HttpServerConfig {
    pub server: ServerConfig,
    pub cors: CorsConfig,
    pub env: String,
}

impl From<&AppConfig> for HttpServerConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            server: config.server.clone(),
            cors: config.cors.clone(),
            env: config.env.clone(),
        }
    }
}

pub struct HttpServer {
    infra: Arc<Infra>,
    config: HttpServerConfig,
    cors: CorsLayer,
    routes: Vec<Box<dyn Routes>>,
}

impl HttpServer {
    pub fn new(
        infra: Arc<Infra>,
        config: HttpServerConfig,
        routes: Vec<Box<dyn Routes>>,
    ) -> anyhow::Result<Self> {
        let cors = config.cors.layer()?;
        Ok(Self {
            infra,
            config,
            cors,
            routes,
        })
    }

    /// Route modules wrapped in the request pipeline.
    pub fn router(&self) -> Router {
        let trace_layer = TraceLayer::new_for_http()
            .make_span_with(|request: &Request| {
                let traceid = request
                    .headers()
                    .get(TRACE_HEADER)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default();
                tracing::info_span!(
                    "http_request",
                    traceid,
                    method = %request.method(),
                    uri = %request.uri()
                )
            })
            // The logger's per-request hook reports responses.
            .on_request(())
            .on_response(())
            .on_failure(());

        let app = self
            .routes
            .iter()
            .fold(Router::new(), |app, routes| app.merge(routes.router()));

        // Last layer added runs first.
        app.fallback(not_found)
            .layer(CatchPanicLayer::custom(panic_response))
            .layer(from_fn(normalize_errors))
            .layer(trace_layer)
            .layer(from_fn(trace_requests))
            .layer(from_fn_with_state(self.infra.clone(), inject_infra))
            .layer(self.cors.clone())
            .layer(DefaultBodyLimit::max(self.config.server.body_limit))
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let server = &self.config.server;
        let listener = tokio::net::TcpListener::bind((server.host.as_str(), server.port)).await?;
        let addr = listener.local_addr()?;
        self.infra.logger.info(
            LogEntry::new(format!("App listening on the port {}", self.config.server.port))
                .with_payload(serde_json::json!({ "env": self.config.env, "addr": addr.to_string() })),
        );
        let app = self.router();
        serve(listener, app.into_make_service())
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        self.infra.logger.info(LogEntry::new("server stopped"));
        Ok(())
    }
}

async fn not_found(method: Method, req: Request) -> ApiError {
    ApiError::not_found(format!("Cannot {} {}", method, req.uri().path()))
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "ctrl-c handler unavailable; running until killed");
        std::future::pending::<()>().await;
    }
}
