use async_trait::async_trait;
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::SqlitePool;
use starter_types::domain::log::LogEntry;
use starter_types::ports::database::{DatabaseError, DatabaseService};
use std::str::FromStr;
use std::sync::OnceLock;

use crate::logger::LoggerService;

const NAME: &str = "Sqlite";

pub struct SqliteService {
    logger: LoggerService,
    pool: OnceLock<SqlitePool>,
}

fn connection_error(message: impl ToString) -> DatabaseError {
    DatabaseError::Connection {
        database: NAME.to_string(),
        message: message.to_string(),
    }
}

impl SqliteService {
    pub fn new(logger: LoggerService) -> Self {
        Self {
            logger,
            pool: OnceLock::new(),
        }
    }
}

#[async_trait]
impl DatabaseService for SqliteService {
    type Client = SqlitePool;

    fn name(&self) -> &'static str {
        NAME
    }

    async fn connect(&self, uri: &str) -> Result<SqlitePool, DatabaseError> {
        if let Some(pool) = self.pool.get() {
            return Ok(pool.clone());
        }

        // On-disk targets need their directory; in-memory urls skip this.
        if let Some(path) = uri.strip_prefix("sqlite://") {
            if path != ":memory:" {
                let p = std::path::Path::new(path);
                if let Some(parent) = p.parent() {
                    if !parent.as_os_str().is_empty() {
                        tokio::fs::create_dir_all(parent)
                            .await
                            .map_err(connection_error)?;
                    }
                }
            }
        }

        let options = SqliteConnectOptions::from_str(uri)
            .map_err(connection_error)?
            .create_if_missing(true);
        let pool = SqlitePool::connect_with(options)
            .await
            .map_err(connection_error)?;

        let pool = self.pool.get_or_init(|| pool).clone();
        self.logger.trace(LogEntry::new("Sqlite connected!"));
        Ok(pool)
    }

    fn client(&self) -> Result<SqlitePool, DatabaseError> {
        self.pool
            .get()
            .cloned()
            .ok_or_else(|| DatabaseError::Disconnected {
                database: NAME.to_string(),
            })
    }

    async fn is_connected(&self) -> Result<(), DatabaseError> {
        let pool = self.client()?;
        sqlx::query("SELECT 1")
            .execute(&pool)
            .await
            .map(|_| ())
            .map_err(|_| DatabaseError::Disconnected {
                database: NAME.to_string(),
            })
    }

    async fn disconnect(&self) -> Result<(), DatabaseError> {
        let pool = self.client()?;
        pool.close().await;
        Ok(())
    }
}
