pub mod context;
pub mod middleware;
pub mod routes;
mod server;

pub use context::RequestContext;
pub use routes::Routes;
pub use server::{HttpServer, HttpServerConfig};
