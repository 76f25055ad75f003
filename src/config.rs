//! Server configuration loaded from environment variables.

use std::path::PathBuf;

use anyhow::Result;

use crate::db::Database;
use crate::nonce::{Nonces, DEFAULT_LIFETIME_SECS};

#[derive(Clone, Debug, Default)]
pub struct ServerConfig {
    /// Database file (from REI_DATABASE). Platform data dir when unset.
    pub database: Option<PathBuf>,
    /// Nonce signing key (from REI_NONCE_SECRET). Random per process when unset,
    /// which invalidates open forms on restart.
    pub nonce_secret: Option<String>,
    /// Nonce lifetime in seconds (from REI_NONCE_LIFETIME).
    pub nonce_lifetime: Option<u64>,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let database = std::env::var("REI_DATABASE").ok().map(PathBuf::from);
        let nonce_secret = std::env::var("REI_NONCE_SECRET")
            .ok()
            .filter(|s| !s.is_empty());
        let nonce_lifetime = std::env::var("REI_NONCE_LIFETIME")
            .ok()
            .and_then(|s| s.parse::<u64>().ok());

        Self {
            database,
            nonce_secret,
            nonce_lifetime,
        }
    }

    /// Command-line path wins over the environment.
    pub fn with_database(mut self, path: Option<PathBuf>) -> Self {
        if path.is_some() {
            self.database = path;
        }
        self
    }

    pub fn open_database(&self) -> Result<Database> {
        let db = match &self.database {
            Some(path) => Database::open(path.clone())?,
            None => Database::open_default()?,
        };
        db.migrate()?;
        Ok(db)
    }

    pub fn nonces(&self) -> Nonces {
        let lifetime = self.nonce_lifetime.unwrap_or(DEFAULT_LIFETIME_SECS);
        match &self.nonce_secret {
            Some(secret) => Nonces::new(secret.as_bytes(), lifetime),
            None => {
                tracing::warn!("REI_NONCE_SECRET is not set, using a per-process nonce key");
                Nonces::random(lifetime)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_line_database_overrides_environment() {
        let config = ServerConfig {
            database: Some(PathBuf::from("/env/rei.db")),
            ..Default::default()
        }
        .with_database(Some(PathBuf::from("/cli/rei.db")));
        assert_eq!(config.database, Some(PathBuf::from("/cli/rei.db")));
    }

    #[test]
    fn missing_command_line_database_keeps_environment() {
        let config = ServerConfig {
            database: Some(PathBuf::from("/env/rei.db")),
            ..Default::default()
        }
        .with_database(None);
        assert_eq!(config.database, Some(PathBuf::from("/env/rei.db")));
    }

    #[test]
    fn configured_secret_gives_stable_nonces() {
        let config = ServerConfig {
            nonce_secret: Some("shared-secret".to_string()),
            nonce_lifetime: Some(600),
            ..Default::default()
        };
        let nonce = config.nonces().create("action", 1);
        assert!(config.nonces().verify(&nonce, "action", 1).is_ok());
        assert_eq!(config.nonces().lifetime_secs(), 600);
    }
}
