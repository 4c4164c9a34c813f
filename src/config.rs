// Runtime configuration from environment variables

use crate::ingest::DEFAULT_BATCH_SIZE;
use anyhow::{bail, Context, Result};
use std::net::SocketAddr;
use std::path::PathBuf;

pub const DEFAULT_DATABASE_PATH: &str = "swift_codes.db";
pub const DEFAULT_DATA_CSV: &str = "data/swift_code_data.csv";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub database_path: PathBuf,
    pub data_csv: PathBuf,
    pub host: String,
    pub port: u16,
    pub batch_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
            data_csv: PathBuf::from(DEFAULT_DATA_CSV),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset keys fall back to defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(path) = lookup("DATABASE_PATH") {
            config.database_path = PathBuf::from(path);
        }
        if let Some(path) = lookup("SWIFT_DATA_CSV") {
            config.data_csv = PathBuf::from(path);
        }
        if let Some(host) = lookup("HOST") {
            config.host = host;
        }
        if let Some(port) = lookup("PORT") {
            config.port = port
                .trim()
                .parse()
                .with_context(|| format!("PORT must be a valid port number, got '{}'", port))?;
        }
        if let Some(size) = lookup("INGEST_BATCH_SIZE") {
            let batch_size: usize = size
                .trim()
                .parse()
                .with_context(|| format!("INGEST_BATCH_SIZE must be a number, got '{}'", size))?;
            if batch_size == 0 {
                bail!("INGEST_BATCH_SIZE must be at least 1");
            }
            config.batch_size = batch_size;
        }

        Ok(config)
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("Invalid bind address {}:{}", self.host, self.port))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.socket_addr().unwrap().port(), 8080);
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_PATH", ":memory:"),
            ("SWIFT_DATA_CSV", "/tmp/codes.csv"),
            ("HOST", "127.0.0.1"),
            ("PORT", "3000"),
            ("INGEST_BATCH_SIZE", "250"),
        ]))
        .unwrap();

        assert_eq!(config.database_path, PathBuf::from(":memory:"));
        assert_eq!(config.data_csv, PathBuf::from("/tmp/codes.csv"));
        assert_eq!(config.port, 3000);
        assert_eq!(config.batch_size, 250);
        assert_eq!(config.socket_addr().unwrap().to_string(), "127.0.0.1:3000");
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(Config::from_lookup(lookup_from(&[("PORT", "eighty")])).is_err());
        assert!(Config::from_lookup(lookup_from(&[("PORT", "70000")])).is_err());
        assert!(Config::from_lookup(lookup_from(&[("INGEST_BATCH_SIZE", "0")])).is_err());
    }
}
