//! Runtime configuration
//!
//! Values come from environment variables; the CLI layers its flags on top.

use std::path::PathBuf;

use crate::error::{Error, Result};

pub const DB_PATH_ENV: &str = "HEALTH_DB_PATH";
pub const DEFAULT_USER_ENV: &str = "HEALTH_DEFAULT_USER";
pub const ATOMIC_INGEST_ENV: &str = "HEALTH_ATOMIC_INGEST";

/// User id recorded when the caller does not supply one
pub const DEFAULT_USER_ID: &str = "anonymous";

/// Ingestion settings
#[derive(Debug, Clone)]
pub struct IngestConfig {
    pub db_path: PathBuf,
    pub default_user_id: String,
    /// Wrap each ingestion call in a single transaction
    pub atomic: bool,
}

impl IngestConfig {
    /// Build the configuration from the process environment
    pub fn from_env() -> Result<Self> {
        let default_user_id = std::env::var(DEFAULT_USER_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_USER_ID.to_string());

        let atomic = match std::env::var(ATOMIC_INGEST_ENV) {
            Ok(v) => parse_flag(&v).ok_or_else(|| {
                Error::config(format!("{} must be true/false, got '{}'", ATOMIC_INGEST_ENV, v))
            })?,
            Err(_) => false,
        };

        Ok(Self {
            db_path: get_db_path()?,
            default_user_id,
            atomic,
        })
    }

    /// Resolve the user id for a call, falling back to the configured default
    pub fn resolve_user_id(&self, user_id: Option<&str>) -> String {
        user_id
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .unwrap_or(&self.default_user_id)
            .to_string()
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

/// Get database file path
/// Priority: HEALTH_DB_PATH env var > default app data directory
pub fn get_db_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        return Ok(PathBuf::from(path));
    }

    let dirs = directories::ProjectDirs::from("me", "centralhardware", "HealthAutoExport")
        .ok_or_else(|| Error::config("Could not determine project directories"))?;

    Ok(dirs.data_dir().join("health.db"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Mutex to ensure env var tests don't run in parallel
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    #[test]
    fn test_get_db_path_default() {
        let _lock = ENV_MUTEX.lock().unwrap();
        std::env::remove_var(DB_PATH_ENV);
        let path = get_db_path().unwrap();
        assert!(path.to_string_lossy().ends_with("health.db"));
    }

    #[test]
    fn test_get_db_path_env_override() {
        let _lock = ENV_MUTEX.lock().unwrap();
        std::env::set_var(DB_PATH_ENV, "/tmp/test_health.db");
        let path = get_db_path().unwrap();
        assert_eq!(path.to_string_lossy(), "/tmp/test_health.db");
        std::env::remove_var(DB_PATH_ENV);
    }

    #[test]
    fn test_from_env_defaults_and_invalid_flag() {
        let _lock = ENV_MUTEX.lock().unwrap();
        std::env::set_var(DB_PATH_ENV, "/tmp/test_health.db");
        std::env::remove_var(DEFAULT_USER_ENV);
        std::env::remove_var(ATOMIC_INGEST_ENV);
        let config = IngestConfig::from_env().unwrap();
        assert_eq!(config.default_user_id, DEFAULT_USER_ID);
        assert!(!config.atomic);

        std::env::set_var(ATOMIC_INGEST_ENV, "maybe");
        assert!(matches!(IngestConfig::from_env(), Err(Error::Config(_))));

        std::env::set_var(ATOMIC_INGEST_ENV, "TRUE");
        std::env::set_var(DEFAULT_USER_ENV, "alice");
        let config = IngestConfig::from_env().unwrap();
        assert!(config.atomic);
        assert_eq!(config.default_user_id, "alice");

        std::env::remove_var(ATOMIC_INGEST_ENV);
        std::env::remove_var(DEFAULT_USER_ENV);
        std::env::remove_var(DB_PATH_ENV);
    }

    #[test]
    fn test_resolve_user_id() {
        let config = IngestConfig {
            db_path: PathBuf::from("/tmp/x.db"),
            default_user_id: "anonymous".to_string(),
            atomic: false,
        };
        assert_eq!(config.resolve_user_id(Some("bob")), "bob");
        assert_eq!(config.resolve_user_id(Some("  ")), "anonymous");
        assert_eq!(config.resolve_user_id(None), "anonymous");
    }
}
