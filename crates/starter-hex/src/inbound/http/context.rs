use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use starter_infra::Infra;
use starter_types::domain::trace::TraceId;
use std::sync::Arc;

use crate::errors::ApiError;

/// Per-request view handed to handlers: the shared infra, the trace id and
/// the request path. Requires the infra and trace middlewares upstream.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub infra: Arc<Infra>,
    pub trace_id: TraceId,
    pub path: String,
}

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let infra = parts
            .extensions
            .get::<Arc<Infra>>()
            .cloned()
            .ok_or_else(|| ApiError::internal("infra is not attached to the request"))?;
        let trace_id = parts
            .extensions
            .get::<TraceId>()
            .cloned()
            .unwrap_or_else(TraceId::generate);
        Ok(Self {
            infra,
            trace_id,
            path: parts.uri.path().to_string(),
        })
    }
}
