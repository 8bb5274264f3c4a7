use axum::Router;

pub mod health;

pub use health::{HealthController, HealthRoute};

/// A route module: a controller plus the router exposing it.
pub trait Routes: Send + Sync {
    fn router(&self) -> Router;
}
