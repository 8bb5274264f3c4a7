use axum::extract::Request;
use axum::http::header::HOST;
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::Response;
use starter_infra::Infra;
use starter_types::domain::log::HttpLogRecord;
use starter_types::domain::trace::{TraceId, TRACE_HEADER};
use std::sync::Arc;
use std::time::Instant;

/// Ensures every request carries a `traceid` header, echoes it on the
/// response and reports the finished request through the logger.
pub async fn trace_requests(mut req: Request, next: Next) -> Response {
    let inbound = req
        .headers()
        .get(TRACE_HEADER)
        .and_then(|v| v.to_str().ok());
    let trace_id = TraceId::from_inbound(inbound);
    let header = HeaderValue::from_str(trace_id.as_str()).ok();
    if let Some(value) = &header {
        req.headers_mut().insert(TRACE_HEADER, value.clone());
    }
    req.extensions_mut().insert(trace_id.clone());

    let infra = req.extensions().get::<Arc<Infra>>().cloned();
    let method = req.method().to_string();
    let host = req
        .headers()
        .get(HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost")
        .to_string();
    let path = format!("http://{}{}", host, req.uri());
    let started = Instant::now();

    let mut response = next.run(req).await;

    if let Some(value) = header {
        response.headers_mut().insert(TRACE_HEADER, value);
    }
    if let Some(infra) = infra {
        infra.logger.http(&HttpLogRecord {
            trace_id: trace_id.to_string(),
            method,
            path,
            status: response.status().as_u16(),
            time_taken_ms: started.elapsed().as_millis(),
        });
    }
    response
}
