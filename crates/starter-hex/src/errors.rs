use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use starter_types::domain::log::{source_chain, ErrorRecord};
use starter_types::ports::cache::CacheError;
use starter_types::ports::config::ConfigError;
use starter_types::ports::database::DatabaseError;
use std::error::Error as StdError;
use std::fmt;

/// Error crossing the HTTP boundary.
///
/// The response status is the first usable value of: the numeric `code`,
/// the `status`, 500. The normalization middleware adds trace id, path and
/// timestamp to the body and logs the error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    name: String,
    message: String,
    code: Option<String>,
    status: Option<u16>,
    context: Option<String>,
    stack: Vec<String>,
}

impl ApiError {
    pub fn new(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            name: "ApiError".into(),
            stack: vec![message.clone()],
            message,
            code: None,
            status: None,
            context: None,
        }
    }

    /// Wraps any error, keeping its source chain as the stack.
    pub fn from_error(err: &(dyn StdError + 'static)) -> Self {
        Self {
            name: "Error".into(),
            message: err.to_string(),
            code: None,
            status: None,
            context: None,
            stack: source_chain(err),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(message)
            .with_name("BadRequestError")
            .with_status(StatusCode::BAD_REQUEST.as_u16())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(message)
            .with_name("NotFoundError")
            .with_status(StatusCode::NOT_FOUND.as_u16())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(message).with_status(StatusCode::INTERNAL_SERVER_ERROR.as_u16())
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The message, or the name when the message is empty.
    pub fn message(&self) -> &str {
        if self.message.is_empty() {
            &self.name
        } else {
            &self.message
        }
    }

    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    pub fn stack(&self) -> &[String] {
        &self.stack
    }

    pub fn status_code(&self) -> StatusCode {
        let from_code = self.code.as_deref().and_then(|c| c.trim().parse::<u16>().ok());
        [from_code, self.status]
            .into_iter()
            .flatten()
            .filter(|n| *n != 0)
            .find_map(|n| StatusCode::from_u16(n).ok())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    pub fn to_record(&self) -> ErrorRecord {
        let mut record = ErrorRecord::new(self.name.clone(), self.message())
            .with_status(self.status_code().as_u16());
        if let Some(context) = &self.context {
            record = record.with_context(context.clone());
        }
        if !self.stack.is_empty() {
            record.stack = self.stack.clone();
        }
        record
    }

    /// Normalized response body.
    pub fn body(&self, trace_id: Option<&str>, path: Option<&str>) -> ErrorEnvelope {
        ErrorEnvelope {
            error: ErrorBody {
                name: self.name.clone(),
                message: self.message().to_string(),
                trace_id: trace_id.map(str::to_string),
                path: path.map(str::to_string),
                timestamp: chrono::Local::now().to_rfc3339(),
            },
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl StdError for ApiError {}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub name: String,
    pub message: String,
    pub trace_id: Option<String>,
    pub path: Option<String>,
    pub timestamp: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let mut response = (status, Json(self.body(None, None))).into_response();
        // Picked up by the normalization middleware, which knows the request.
        response.extensions_mut().insert(self);
        response
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        Self::from_error(&err)
            .with_name("ConfigError")
            .with_context("ConfigService")
    }
}

impl From<CacheError> for ApiError {
    fn from(err: CacheError) -> Self {
        let store = err.store();
        let mut api = Self::from_error(&err)
            .with_name("CacheError")
            .with_status(StatusCode::INTERNAL_SERVER_ERROR.as_u16());
        if let Some(store) = store {
            api = api.with_context(store);
        }
        api
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        Self::from_error(&err)
            .with_name("DatabaseError")
            .with_status(StatusCode::INTERNAL_SERVER_ERROR.as_u16())
            .with_context("Database")
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        let mut api = Self::new(err.to_string()).with_name("Error");
        api.stack = err.chain().map(|e| e.to_string()).collect();
        api
    }
}
