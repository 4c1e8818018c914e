//! Service configuration
//!
//! Loaded from an optional TOML file; every key has a default, and the CLI
//! overrides individual values afterwards.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use contacts_core::{CheckOptions, UntypedListPolicy};

use crate::error::{ServerError, ServerResult};

/// Runtime configuration of the contacts service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// JSON file holding the schema document
    #[serde(default = "default_schema_path")]
    pub schema_path: PathBuf,

    /// Directory receiving uploaded files
    #[serde(default = "default_upload_dir")]
    pub upload_dir: PathBuf,

    /// sled database directory
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,

    /// Handling of list fields declared without `inner_type`
    #[serde(default)]
    pub untyped_lists: UntypedListPolicy,

    /// Maximum request body size in bytes, uploads included
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_schema_path() -> PathBuf {
    PathBuf::from("config.json")
}

fn default_upload_dir() -> PathBuf {
    PathBuf::from("uploads")
}

fn default_database_path() -> PathBuf {
    PathBuf::from("contacts.db")
}

fn default_max_upload_bytes() -> usize {
    16 * 1024 * 1024 // 16MB
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            schema_path: default_schema_path(),
            upload_dir: default_upload_dir(),
            database_path: default_database_path(),
            untyped_lists: UntypedListPolicy::default(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

impl AppConfig {
    /// Parse a TOML configuration file
    pub fn from_file(path: impl AsRef<Path>) -> ServerResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> ServerResult<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn socket_addr(&self) -> ServerResult<SocketAddr> {
        let addr = format!("{}:{}", self.host, self.port);
        addr.parse()
            .map_err(|_| ServerError::InvalidAddress(addr))
    }

    /// Options applied to every record check
    pub fn check_options(&self) -> CheckOptions {
        CheckOptions::default().with_untyped_lists(self.untyped_lists)
    }
}
