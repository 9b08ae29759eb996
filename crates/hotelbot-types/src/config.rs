//! Store configuration types.
//!
//! `StoreConfig` represents the top-level `config.toml` in the data directory.

use serde::{Deserialize, Serialize};

/// Top-level configuration. All fields have sensible defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
}

/// SQLite connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Explicit sqlx URL (e.g. `sqlite:///var/lib/hotelbot/store.db`).
    /// When unset the database lives in the data directory.
    #[serde(default)]
    pub url: Option<String>,

    /// Size of the read-only connection pool.
    #[serde(default = "default_max_read_connections")]
    pub max_read_connections: u32,

    /// How long a connection waits on a locked database before failing.
    #[serde(default = "default_busy_timeout_secs")]
    pub busy_timeout_secs: u64,
}

fn default_max_read_connections() -> u32 {
    8
}

fn default_busy_timeout_secs() -> u64 {
    5
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_read_connections: default_max_read_connections(),
            busy_timeout_secs: default_busy_timeout_secs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_config_default_values() {
        let config = StoreConfig::default();
        assert!(config.database.url.is_none());
        assert_eq!(config.database.max_read_connections, 8);
        assert_eq!(config.database.busy_timeout_secs, 5);
    }

    #[test]
    fn test_store_config_deserialize_empty() {
        let config: StoreConfig = toml::from_str("").unwrap();
        assert_eq!(config.database.max_read_connections, 8);
    }

    #[test]
    fn test_store_config_deserialize_with_values() {
        let toml_str = r#"
[database]
url = "sqlite:///tmp/hotelbot.db"
busy_timeout_secs = 10
"#;
        let config: StoreConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.database.url.as_deref(), Some("sqlite:///tmp/hotelbot.db"));
        assert_eq!(config.database.busy_timeout_secs, 10);
        assert_eq!(config.database.max_read_connections, 8);
    }
}
