//! Server configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub listen_addr: String,
    pub data_dir: PathBuf,
    pub bcrypt_cost: u32,
    pub min_password_len: usize,
    /// Fixed seed for quest templates; random when unset.
    pub quest_seed: Option<u64>,
    pub session_ttl_days: i64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:3000".to_string(),
            data_dir: PathBuf::from("data"),
            bcrypt_cost: bcrypt::DEFAULT_COST,
            min_password_len: 6,
            quest_seed: None,
            session_ttl_days: crate::user_storage::DEFAULT_SESSION_TTL_DAYS,
        }
    }
}

impl AppConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::days(self.session_ttl_days)
    }

    /// Reads `path` when it exists, otherwise falls back to defaults.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::info!("No config file at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }
}
