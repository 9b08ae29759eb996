//! Configuration loader.
//!
//! Reads `config.toml` from the data directory (`~/.hotelbot/` by default,
//! overridable with `HOTELBOT_DATA_DIR`) and deserializes it into
//! [`StoreConfig`]. Falls back to defaults when the file is missing or
//! malformed.

use std::path::{Path, PathBuf};

use hotelbot_types::config::StoreConfig;

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "HOTELBOT_DATA_DIR";

/// File name of the SQLite database inside the data directory.
pub const DATABASE_FILE: &str = "hotelbot.db";

/// Resolve the data directory: `$HOTELBOT_DATA_DIR`, then `~/.hotelbot`,
/// then `./.hotelbot`.
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        return PathBuf::from(dir);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".hotelbot");
    }

    PathBuf::from(".hotelbot")
}

/// Load configuration from `{data_dir}/config.toml`.
///
/// - If the file does not exist, returns [`StoreConfig::default()`].
/// - If the file exists but fails to read or parse, logs a warning and returns the default.
pub async fn load_store_config(data_dir: &Path) -> StoreConfig {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return StoreConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return StoreConfig::default();
        }
    };

    match toml::from_str::<StoreConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            StoreConfig::default()
        }
    }
}

/// The sqlx URL to open: the configured one, or the database file in `data_dir`.
pub fn database_url(config: &StoreConfig, data_dir: &Path) -> String {
    match &config.database.url {
        Some(url) => url.clone(),
        None => format!("sqlite://{}?mode=rwc", data_dir.join(DATABASE_FILE).display()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn load_store_config_missing_file_returns_default() {
        let tmp = TempDir::new().unwrap();
        let config = load_store_config(tmp.path()).await;
        assert!(config.database.url.is_none());
        assert_eq!(config.database.max_read_connections, 8);
    }

    #[tokio::test]
    async fn load_store_config_valid_toml_returns_parsed() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(
            tmp.path().join("config.toml"),
            r#"
[database]
max_read_connections = 2
busy_timeout_secs = 30
"#,
        )
        .await
        .unwrap();

        let config = load_store_config(tmp.path()).await;
        assert_eq!(config.database.max_read_connections, 2);
        assert_eq!(config.database.busy_timeout_secs, 30);
    }

    #[tokio::test]
    async fn load_store_config_invalid_toml_returns_default() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(tmp.path().join("config.toml"), "this is not { valid toml !!!")
            .await
            .unwrap();

        let config = load_store_config(tmp.path()).await;
        assert_eq!(config.database.busy_timeout_secs, 5);
    }

    #[test]
    fn database_url_defaults_to_data_dir() {
        let config = StoreConfig::default();
        let url = database_url(&config, Path::new("/srv/hotelbot"));
        assert_eq!(url, "sqlite:///srv/hotelbot/hotelbot.db?mode=rwc");
    }

    #[test]
    fn database_url_prefers_configured() {
        let mut config = StoreConfig::default();
        config.database.url = Some("sqlite::memory:".to_string());
        assert_eq!(database_url(&config, Path::new("/unused")), "sqlite::memory:");
    }
}
