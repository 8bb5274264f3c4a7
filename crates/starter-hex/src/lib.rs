//! starter-hex: application core and inbound HTTP adapter (pipeline + routes)

pub mod config;
pub mod errors;

pub mod application;

pub use starter_types::{domain, ports};

pub mod inbound; // HTTP adapter (server, middlewares, route modules)
