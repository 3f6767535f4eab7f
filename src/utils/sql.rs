use std::str::FromStr;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use crate::core::domain::Configuration;
use crate::core::library::{LibraryError, LibraryResult};
use crate::core::repository::RepositoryStore;

// SQLite result codes that mean another connection holds the database.
const SQLITE_BUSY: &str = "5";
const SQLITE_LOCKED: &str = "6";

pub(crate) async fn create_table(pool: &SqlitePool, table_name: &str) -> LibraryResult<()> {
    let ddl = format!(
        r#"
        CREATE TABLE IF NOT EXISTS {} (
            isbn TEXT PRIMARY KEY,
            amazon_url TEXT,
            author TEXT,
            language TEXT,
            pages INTEGER,
            publisher TEXT,
            title TEXT NOT NULL,
            year INTEGER
        )
        "#, table_name);
    sqlx::query(ddl.as_str())
        .execute(pool)
        .await
        .map(|_| ())
        .map_err(|err| LibraryError::database(
            format!("failed to create {} table due to {}", table_name, err).as_str(), None, false))
}

#[cfg(test)]
pub(crate) async fn delete_table(pool: &SqlitePool, table_name: &str) -> LibraryResult<()> {
    sqlx::query(format!("DROP TABLE IF EXISTS {}", table_name).as_str())
        .execute(pool)
        .await
        .map(|_| ())
        .map_err(|err| LibraryError::database(
            format!("failed to delete {} table due to {}", table_name, err).as_str(), None, false))
}

// helper method to build the connection pool for the configured store
pub async fn build_pool(store: RepositoryStore, config: &Configuration) -> LibraryResult<SqlitePool> {
    match store {
        RepositoryStore::Sqlite => {
            let url = config.database_url.as_deref().ok_or_else(|| LibraryError::runtime(
                "DATABASE_URL is required for the sqlite store", None))?;
            let options = SqliteConnectOptions::from_str(url)?
                .create_if_missing(true);
            SqlitePoolOptions::new()
                .max_connections(config.max_connections)
                .connect_with(options)
                .await
                .map_err(LibraryError::from)
        }
        RepositoryStore::LocalSqlite => {
            // every connection to :memory: opens its own database, so the pool must keep
            // exactly one connection alive for the lifetime of the process
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect("sqlite::memory:")
                .await
                .map_err(LibraryError::from)
        }
    }
}

// JSON logs with level from configuration, no module targets or ANSI colors
pub fn setup_tracing(level: tracing::Level) {
    tracing_subscriber::fmt()
        .with_max_level(level)
        // disable printing the name of the module in every log line.
        .with_target(false)
        // this needs to be set to false, otherwise ANSI color codes will
        // show up in a confusing manner in collected logs.
        .with_ansi(false)
        .json()
        .init();
}

impl From<sqlx::Error> for LibraryError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => {
                LibraryError::not_found("row not found")
            }
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                LibraryError::duplicate_key(format!("duplicate key {}", db_err.message()).as_str())
            }
            sqlx::Error::Database(ref db_err) => {
                let code = db_err.code().map(|c| c.to_string());
                let busy = matches!(code.as_deref(), Some(SQLITE_BUSY) | Some(SQLITE_LOCKED));
                if busy {
                    LibraryError::unavailable(
                        format!("database busy {}", db_err.message()).as_str(), code, true)
                } else {
                    LibraryError::database(
                        format!("database error {}", db_err.message()).as_str(), code, false)
                }
            }
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                LibraryError::unavailable(
                    format!("database unavailable {:?}", err).as_str(), None, true)
            }
            sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) |
            sqlx::Error::ColumnNotFound(_) | sqlx::Error::TypeNotFound { .. } => {
                LibraryError::serialization(
                    format!("failed to decode row {:?}", err).as_str())
            }
            _ => {
                LibraryError::database(
                    format!("database error {:?}", err).as_str(), None, false)
            }
        }
    }
}
