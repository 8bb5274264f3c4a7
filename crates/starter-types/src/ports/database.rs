use async_trait::async_trait;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DatabaseError {
    #[error("{database} connection failed: {message}")]
    Connection { database: String, message: String },

    #[error("db {database} disconnected")]
    Disconnected { database: String },

    #[error("db error: {0}")]
    Query(String),
}

#[async_trait]
pub trait DatabaseService: Send + Sync + 'static {
    type Client: Clone + Send + Sync;

    fn name(&self) -> &'static str;

    /// Single best-effort connect; there is no retry.
    async fn connect(&self, uri: &str) -> Result<Self::Client, DatabaseError>;

    fn client(&self) -> Result<Self::Client, DatabaseError>;

    async fn is_connected(&self) -> Result<(), DatabaseError>;

    async fn disconnect(&self) -> Result<(), DatabaseError>;
}

/// Only stores addressed by a composed URI implement this.
pub trait ConnectionString {
    type Params;

    fn connection_string(params: &Self::Params) -> String;
}
