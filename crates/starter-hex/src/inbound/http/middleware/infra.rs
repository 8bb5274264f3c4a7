use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use starter_infra::Infra;
use std::sync::Arc;

/// Attaches the shared infra aggregate to every request.
pub async fn inject_infra(State(infra): State<Arc<Infra>>, mut req: Request, next: Next) -> Response {
    req.extensions_mut().insert(infra);
    next.run(req).await
}
