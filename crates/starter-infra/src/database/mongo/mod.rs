pub mod repository;

use async_trait::async_trait;
use mongodb::bson::doc;
use mongodb::{Client, Database};
use serde::{Deserialize, Serialize};
use starter_types::domain::log::LogEntry;
use starter_types::ports::database::{ConnectionString, DatabaseError, DatabaseService};
use std::sync::OnceLock;

use crate::logger::LoggerService;

pub use repository::{CreatedModel, MongoRepository, RemovedModel, UpdatedModel};

const NAME: &str = "Mongo";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionModel {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub pass: String,
    pub db_name: String,
}

pub struct MongoService {
    logger: LoggerService,
    client: OnceLock<Client>,
}

impl MongoService {
    pub fn new(logger: LoggerService) -> Self {
        Self {
            logger,
            client: OnceLock::new(),
        }
    }

    /// Database named in the connection URI.
    pub fn database(&self) -> Result<Database, DatabaseError> {
        self.client()?
            .default_database()
            .ok_or_else(|| DatabaseError::Query("connection uri names no database".into()))
    }

    async fn ping(client: &Client) -> Result<(), mongodb::error::Error> {
        client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await
            .map(|_| ())
    }
}

impl ConnectionString for MongoService {
    type Params = ConnectionModel;

    fn connection_string(config: &ConnectionModel) -> String {
        format!(
            "mongodb://{}:{}@{}:{}/{}?serverSelectionTimeoutMS=5000&connectTimeoutMS=5000&authSource=admin&authMechanism=SCRAM-SHA-256",
            config.user, config.pass, config.host, config.port, config.db_name
        )
    }
}

#[async_trait]
impl DatabaseService for MongoService {
    type Client = Client;

    fn name(&self) -> &'static str {
        NAME
    }

    async fn connect(&self, uri: &str) -> Result<Client, DatabaseError> {
        if let Some(client) = self.client.get() {
            return Ok(client.clone());
        }
        let connection_error = |e: mongodb::error::Error| DatabaseError::Connection {
            database: NAME.to_string(),
            message: e.to_string(),
        };
        let client = Client::with_uri_str(uri).await.map_err(connection_error)?;
        Self::ping(&client).await.map_err(connection_error)?;

        let client = self.client.get_or_init(|| client).clone();
        self.logger.trace(LogEntry::new("Mongo Connected!"));
        Ok(client)
    }

    fn client(&self) -> Result<Client, DatabaseError> {
        self.client
            .get()
            .cloned()
            .ok_or_else(|| DatabaseError::Disconnected {
                database: NAME.to_string(),
            })
    }

    async fn is_connected(&self) -> Result<(), DatabaseError> {
        let client = self.client()?;
        Self::ping(&client)
            .await
            .map_err(|_| DatabaseError::Disconnected {
                database: NAME.to_string(),
            })
    }

    async fn disconnect(&self) -> Result<(), DatabaseError> {
        self.client()?.shutdown().await;
        Ok(())
    }
}
