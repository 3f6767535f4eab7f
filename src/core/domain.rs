use std::net::SocketAddr;
use serde::{Deserialize, Serialize};
use crate::core::repository::RepositoryStore;

// Identifiable defines common traits that can be shared by persistent objects
pub trait Identifiable: Sync + Send {
    fn id(&self) -> String;
}

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

// Configuration abstracts config options for the catalog service
#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
pub struct Configuration {
    pub branch_id: String,
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub bind_addr: SocketAddr,
    pub log_level: String,
}

impl Configuration {
    pub fn new(branch_id: &str) -> Self {
        Configuration {
            branch_id: branch_id.to_string(),
            database_url: None,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            bind_addr: default_bind_addr(),
            log_level: "info".to_string(),
        }
    }

    pub fn from_env() -> (Self, Vec<String>) {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    // from_lookup reads every option through `lookup`, falling back to defaults for
    // missing or unparsable values. Rejected values come back as warnings for the caller
    // to log once tracing is installed.
    pub fn from_lookup<F>(lookup: F) -> (Self, Vec<String>)
        where F: Fn(&str) -> Option<String> {
        let mut warnings = vec![];
        let mut config = Configuration::new(
            lookup("BOOKS_BRANCH").unwrap_or_else(|| "dev".to_string()).as_str());
        config.database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());
        if let Some(max) = lookup("BOOKS_MAX_CONNECTIONS") {
            match max.parse::<u32>() {
                Ok(n) if n > 0 => config.max_connections = n,
                _ => warnings.push(format!("ignoring invalid BOOKS_MAX_CONNECTIONS {:?}", max)),
            }
        }
        if let Some(addr) = lookup("BOOKS_BIND_ADDR") {
            match addr.parse::<SocketAddr>() {
                Ok(parsed) => config.bind_addr = parsed,
                Err(err) => warnings.push(format!("ignoring invalid BOOKS_BIND_ADDR {:?}: {}", addr, err)),
            }
        }
        if let Some(level) = lookup("BOOKS_LOG_LEVEL") {
            config.log_level = level.to_lowercase();
        }
        (config, warnings)
    }

    pub fn store(&self) -> RepositoryStore {
        match self.database_url {
            Some(_) => RepositoryStore::Sqlite,
            None => RepositoryStore::LocalSqlite,
        }
    }

    pub fn tracing_level(&self) -> tracing::Level {
        match self.log_level.as_str() {
            "trace" => tracing::Level::TRACE,
            "debug" => tracing::Level::DEBUG,
            "warn" => tracing::Level::WARN,
            "error" => tracing::Level::ERROR,
            _ => tracing::Level::INFO,
        }
    }
}

fn default_bind_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 3000))
}
