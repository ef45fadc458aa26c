use std::env;

use crate::error::{AppError, Result};

// Environment variables
const DATABASE_URL: &str = "DATABASE_URL";
const DATABASE_TABLE: &str = "DATABASE_TABLE";
const AZURE_STORAGE_ACCOUNT: &str = "AZURE_STORAGE_ACCOUNT";
const AZURE_STORAGE_ACCESS_KEY: &str = "AZURE_STORAGE_ACCESS_KEY";
const STORAGE_BACKEND: &str = "STORAGE_BACKEND";
const STORAGE_CONTAINER: &str = "STORAGE_CONTAINER";
const STORAGE_LOCAL_PATH: &str = "STORAGE_LOCAL_PATH";
const LISTEN_PORT: &str = "FUNCTIONS_CUSTOMHANDLER_PORT";

const DOTENV_FILE: &str = ".env.local";

/// Application configuration, built once at startup and passed into each
/// collaborator constructor.
#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub record_store: RecordStoreConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct RecordStoreConfig {
    /// Connection string for the record store.
    pub url: String,
    /// Table holding one row per uploaded file.
    pub table: String,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub backend: StorageBackend,
}

#[derive(Debug, Clone)]
pub enum StorageBackend {
    Azure(AzureStorageConfig),
    Local(LocalStorageConfig),
}

#[derive(Debug, Clone)]
pub struct AzureStorageConfig {
    pub account: String,
    pub access_key: String,
    pub container: String,
}

#[derive(Debug, Clone)]
pub struct LocalStorageConfig {
    pub base_path: String,
}

fn default_port() -> u16 {
    8080
}

fn default_container() -> String {
    "filer".to_string()
}

fn default_local_path() -> String {
    "data/uploads".to_string()
}

impl Config {
    /// Load configuration: read the local env file, then the environment.
    /// A missing env file is fatal, matching the original deployment setup.
    pub fn load() -> Result<Self> {
        dotenvy::from_filename(DOTENV_FILE)
            .map_err(|e| AppError::Config(format!("failed to load {}: {}", DOTENV_FILE, e)))?;
        Self::from_env()
    }

    /// Build configuration from environment variables alone.
    pub fn from_env() -> Result<Self> {
        let port = match env::var(LISTEN_PORT) {
            Ok(val) => val
                .parse()
                .map_err(|_| AppError::Config(format!("invalid {}: {}", LISTEN_PORT, val)))?,
            Err(_) => default_port(),
        };

        let record_store = RecordStoreConfig {
            url: required(DATABASE_URL)?,
            table: required(DATABASE_TABLE)?,
        };

        let backend = match env::var(STORAGE_BACKEND).as_deref() {
            Ok("local") => StorageBackend::Local(LocalStorageConfig {
                base_path: env::var(STORAGE_LOCAL_PATH).unwrap_or_else(|_| default_local_path()),
            }),
            Ok("azure") | Err(_) => StorageBackend::Azure(AzureStorageConfig {
                account: required(AZURE_STORAGE_ACCOUNT)?,
                access_key: required(AZURE_STORAGE_ACCESS_KEY)?,
                container: env::var(STORAGE_CONTAINER).unwrap_or_else(|_| default_container()),
            }),
            Ok(other) => {
                return Err(AppError::Config(format!(
                    "unknown {}: {}",
                    STORAGE_BACKEND, other
                )))
            }
        };

        Ok(Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port,
            },
            record_store,
            storage: StorageConfig { backend },
        })
    }
}

fn required(name: &str) -> Result<String> {
    env::var(name)
        .ok()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::Config(format!("missing environment variable: {}", name)))
}
