//! Request pipeline stages, outermost first:
//! infra injection, trace id and request logging, error normalization.

pub mod error;
pub mod infra;
pub mod trace;

pub use error::{normalize_errors, panic_response};
pub use infra::inject_infra;
pub use trace::trace_requests;
