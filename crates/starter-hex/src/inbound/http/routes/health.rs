use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use starter_types::domain::log::LogEntry;
use std::sync::Arc;

use super::Routes;
use crate::application::health_service::HealthService;
use crate::inbound::http::context::RequestContext;

pub struct HealthController {
    service: HealthService,
}

impl HealthController {
    pub fn new(service: HealthService) -> Self {
        Self { service }
    }

    pub fn health(&self, ctx: &RequestContext) -> Json<String> {
        let message = self.service.get_health();
        ctx.infra.logger.info(LogEntry::new(message.clone()));
        Json(message)
    }
}

/// `GET /` and `GET /health`.
pub struct HealthRoute {
    controller: Arc<HealthController>,
}

impl HealthRoute {
    pub fn new(service: HealthService) -> Self {
        Self {
            controller: Arc::new(HealthController::new(service)),
        }
    }
}

impl Routes for HealthRoute {
    fn router(&self) -> Router {
        Router::new()
            .route("/", get(health))
            .route("/health", get(health))
            .with_state(self.controller.clone())
    }
}

async fn health(
    State(controller): State<Arc<HealthController>>,
    ctx: RequestContext,
) -> Json<String> {
    controller.health(&ctx)
}
