use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{anyhow, bail, Context, Result};

use crate::analysis::engine::IdScheme;
use crate::history::DEFAULT_HISTORY_KEY;

/// Where the analysis history is persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryBackend {
    Memory,
    File(PathBuf),
    Redis(String),
}

/// Application configuration loaded from environment variables.
/// Startup fails if a selected backend is missing its settings.
#[derive(Debug, Clone)]
pub struct Config {
    pub history_backend: HistoryBackend,
    pub history_key: String,
    pub id_scheme: IdScheme,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let require = |key: &str| {
            lookup(key).with_context(|| format!("Required environment variable '{key}' is not set"))
        };

        let backend = lookup("HISTORY_BACKEND").unwrap_or_else(|| "memory".to_string());
        let history_backend = match backend.trim().to_ascii_lowercase().as_str() {
            "memory" => HistoryBackend::Memory,
            "file" => HistoryBackend::File(PathBuf::from(require("HISTORY_FILE")?)),
            "redis" => HistoryBackend::Redis(require("REDIS_URL")?),
            other => bail!("HISTORY_BACKEND must be memory, file or redis (got '{other}')"),
        };

        let id_scheme = match lookup("ID_SCHEME") {
            Some(raw) => IdScheme::from_str(&raw).map_err(|e| anyhow!(e))?,
            None => IdScheme::default(),
        };

        Ok(Config {
            history_backend,
            history_key: lookup("HISTORY_KEY").unwrap_or_else(|| DEFAULT_HISTORY_KEY.to_string()),
            id_scheme,
            port: lookup("PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}
