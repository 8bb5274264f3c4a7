use axum::body::Body;
use axum::extract::Request;
use axum::http::header::CONTENT_TYPE;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use starter_infra::Infra;
use starter_types::domain::trace::TraceId;
use std::any::Any;
use std::sync::Arc;

use crate::errors::ApiError;

/// Upper bound when reading a plain-text error body back in.
const TEXT_ERROR_LIMIT: usize = 64 * 1024;

/// Turns every failed response into the normalized error body and logs it.
///
/// Handler errors arrive as an [`ApiError`] stashed in the response
/// extensions. Plain-text failures produced by extractors or the framework
/// (bad JSON, oversized body) are wrapped into one first.
pub async fn normalize_errors(req: Request, next: Next) -> Response {
    let infra = req.extensions().get::<Arc<Infra>>().cloned();
    let trace_id = req.extensions().get::<TraceId>().cloned();
    let path = req.uri().path().to_string();

    let mut response = next.run(req).await;

    let error = match response.extensions_mut().remove::<ApiError>() {
        Some(error) => error,
        None if is_plain_failure(&response) => from_plain(response).await,
        None => return response,
    };

    let trace = trace_id.as_ref().map(TraceId::as_str);
    if let Some(infra) = &infra {
        let mut record = error.to_record();
        if let Some(trace) = trace {
            record = record.with_trace_id(trace);
        }
        infra.logger.error(record);
    }
    tracing::debug!(status = %error.status_code(), path = %path, "request failed");

    (error.status_code(), Json(error.body(trace, Some(&path)))).into_response()
}

fn is_plain_failure(response: &Response) -> bool {
    let status = response.status();
    if !(status.is_client_error() || status.is_server_error()) {
        return false;
    }
    !response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/json"))
}

async fn from_plain(response: Response) -> ApiError {
    let status = response.status();
    let text = axum::body::to_bytes(response.into_body(), TEXT_ERROR_LIMIT)
        .await
        .map(|bytes| String::from_utf8_lossy(&bytes).trim().to_string())
        .unwrap_or_default();
    let message = if text.is_empty() {
        status.canonical_reason().unwrap_or_default().to_string()
    } else {
        text
    };
    ApiError::new(message)
        .with_name("HttpError")
        .with_status(status.as_u16())
}

/// Response for a handler that panicked.
pub fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response<Body> {
    let message = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "handler panicked".to_string()
    };
    ApiError::internal(message)
        .with_name("PanicError")
        .into_response()
}
