//! Connection configuration read from the environment.
//!
//! The CLI loads `.env` (via dotenvy) before this runs; the library itself
//! only reads the process environment. A missing `MONGO_URI` is not an error
//! here - it becomes a [`DbError::Configuration`] when the connector first
//! needs the string, matching where the original check lived.

use std::env;

use crate::error::{DbError, Result};

/// Environment variable holding the store's connection URI.
pub const MONGO_URI_VAR: &str = "MONGO_URI";

/// Environment variable overriding the application name sent to the store.
pub const APP_NAME_VAR: &str = "MONGO_APP_NAME";

const DEFAULT_APP_NAME: &str = "devflow";

/// Connection settings for the document store.
#[derive(Debug, Clone)]
pub struct DbConfig {
    uri: Option<String>,
    app_name: String,
}

impl DbConfig {
    /// Read `MONGO_URI` and `MONGO_APP_NAME` from the environment.
    pub fn from_env() -> Self {
        Self {
            uri: env::var(MONGO_URI_VAR).ok().filter(|v| !v.is_empty()),
            app_name: env::var(APP_NAME_VAR)
                .ok()
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| DEFAULT_APP_NAME.to_string()),
        }
    }

    /// Build a config with an explicit URI. Tests use this instead of
    /// mutating the process environment.
    pub fn with_uri(uri: impl Into<String>) -> Self {
        Self {
            uri: Some(uri.into()),
            ..Self::default()
        }
    }

    /// The connection URI, or a fatal configuration error if unset.
    pub fn uri(&self) -> Result<&str> {
        self.uri
            .as_deref()
            .ok_or_else(|| DbError::configuration(format!("{MONGO_URI_VAR} must be set")))
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            uri: None,
            app_name: DEFAULT_APP_NAME.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Serializes tests that touch the process environment.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn explicit_uri_is_returned() {
        let config = DbConfig::with_uri("mongodb://localhost:27017/devflow");
        assert_eq!(config.uri().unwrap(), "mongodb://localhost:27017/devflow");
        assert_eq!(config.app_name(), "devflow");
    }

    #[test]
    fn missing_uri_is_a_configuration_error() {
        let config = DbConfig::default();
        let err = config.uri().unwrap_err();
        assert_eq!(
            err,
            DbError::configuration("MONGO_URI must be set"),
        );
    }

    #[test]
    fn from_env_picks_up_uri_and_app_name() {
        let _guard = ENV_LOCK.lock().unwrap();
        env::set_var(MONGO_URI_VAR, "mongodb://db.example.com:27018/devflow");
        env::set_var(APP_NAME_VAR, "devflow-test");

        let config = DbConfig::from_env();
        assert_eq!(config.uri().unwrap(), "mongodb://db.example.com:27018/devflow");
        assert_eq!(config.app_name(), "devflow-test");

        env::remove_var(MONGO_URI_VAR);
        env::remove_var(APP_NAME_VAR);
    }

    #[test]
    fn empty_uri_counts_as_unset() {
        let _guard = ENV_LOCK.lock().unwrap();
        env::set_var(MONGO_URI_VAR, "");

        let config = DbConfig::from_env();
        assert!(config.uri().is_err());

        env::remove_var(MONGO_URI_VAR);
    }
}
