//! Server configuration from environment variables.

use std::path::PathBuf;

/// Runtime configuration, resolved once at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Root of the flat-file data tree.
    pub data_dir: PathBuf,

    /// Bind address for the HTTP listener.
    pub addr: String,
}

impl ServerConfig {
    /// Read configuration from `LIFEOS_DATA_DIR` and `LIFEOS_ADDR`.
    pub fn from_env() -> Self {
        Self {
            data_dir: std::env::var("LIFEOS_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data")),
            addr: std::env::var("LIFEOS_ADDR")
                .unwrap_or_else(|_| "127.0.0.1:4000".to_string()),
        }
    }
}
