use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Config {
    /// Listen address for the HTTP server
    pub bind_addr: String,
    /// SQLite connection string; overridden by the DATABASE_URL env var
    pub database_url: String,
    /// Page size used when the client does not request one
    pub default_limit: i64,
    /// Upper clamp on client-requested page sizes
    pub max_limit: i64,
    /// Per-store-call budget in seconds
    pub query_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3000".to_string(),
            database_url: "sqlite:newsfeed.db?mode=rwc".to_string(),
            default_limit: 12,
            max_limit: 100,
            query_timeout_secs: 5,
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Parse config from a TOML string (useful for testing)
    pub fn from_str(content: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }
}
