use std::path::Path;

use anyhow::{Context, ensure};
use serde::Deserialize;
use tracing::Level;

use crate::http::connection::{ConnectionConfig, READ_CHUNK_SIZE};
use crate::http::parser::MAX_HEADER;
use crate::http::writer::FLUSH_THRESHOLD;

/// Environment variable naming a YAML config file.
pub const CONFIG_ENV: &str = "TIDEWAY_CONFIG";

/// Environment variable overriding `listen_addr`.
pub const LISTEN_ENV: &str = "LISTEN";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub listen_addr: String,
    pub read_chunk_size: usize,
    pub flush_threshold: usize,
    pub max_header_size: usize,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:8080".to_string(),
            read_chunk_size: READ_CHUNK_SIZE,
            flush_threshold: FLUSH_THRESHOLD,
            max_header_size: MAX_HEADER,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Loads the file named by `TIDEWAY_CONFIG` if set, otherwise the
    /// defaults, then applies `LISTEN`.
    pub fn load() -> anyhow::Result<Self> {
        let mut cfg = match std::env::var(CONFIG_ENV) {
            Ok(path) => Self::from_file(path)?,
            Err(_) => Self::default(),
        };

        if let Ok(listen_addr) = std::env::var(LISTEN_ENV) {
            cfg.listen_addr = listen_addr;
        }

        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_yaml(&raw).with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn from_yaml(raw: &str) -> anyhow::Result<Self> {
        let cfg: Config = serde_yaml::from_str(raw).context("failed to parse yaml")?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(self.read_chunk_size > 0, "read_chunk_size must be positive");
        ensure!(self.flush_threshold > 0, "flush_threshold must be positive");
        ensure!(self.max_header_size > 0, "max_header_size must be positive");
        self.level()?;
        Ok(())
    }

    pub fn level(&self) -> anyhow::Result<Level> {
        self.log_level
            .parse::<Level>()
            .with_context(|| format!("unknown log level {:?}", self.log_level))
    }

    pub fn connection(&self) -> ConnectionConfig {
        ConnectionConfig {
            read_chunk_size: self.read_chunk_size,
            flush_threshold: self.flush_threshold,
            max_header_size: self.max_header_size,
        }
    }
}
