//! Database adapters. Only the document store composes its own URI, so only
//! it implements [`ConnectionString`](starter_types::ports::database::ConnectionString).

#[cfg(feature = "mongo")]
pub mod mongo;
#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "mongo")]
pub use mongo::{ConnectionModel, MongoRepository, MongoService};
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteService;
