//! Service configuration from the environment

use anyhow::{bail, Context, Result};

/// Default cap on one `POST /add` body, in MiB
pub const DEFAULT_MAX_UPLOAD_MB: usize = 1024;

/// Backing store for blocks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    S3,
    Memory,
}

/// Settings read at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateConfig {
    /// Bucket holding the blocks
    pub bucket: String,
    pub host: String,
    pub port: u16,
    pub store: StoreKind,
    pub max_upload_mb: usize,
}

impl GateConfig {
    /// Read `MERKL_BUCKET`, `GATE_HOST`, `GATE_PORT`, `GATE_STORE` and
    /// `GATE_MAX_UPLOAD_MB`
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let port = match lookup("GATE_PORT") {
            Some(port) => port
                .parse()
                .with_context(|| format!("GATE_PORT is not a valid port: {port}"))?,
            None => 3000,
        };

        let store = match lookup("GATE_STORE").as_deref() {
            None | Some("s3") => StoreKind::S3,
            Some("memory") => StoreKind::Memory,
            Some(other) => bail!("GATE_STORE must be 's3' or 'memory', got '{other}'"),
        };

        let max_upload_mb = match lookup("GATE_MAX_UPLOAD_MB") {
            Some(mb) => mb
                .parse()
                .with_context(|| format!("GATE_MAX_UPLOAD_MB is not a size: {mb}"))?,
            None => DEFAULT_MAX_UPLOAD_MB,
        };

        Ok(Self {
            bucket: lookup("MERKL_BUCKET").unwrap_or_else(|| "merkl".to_string()),
            host: lookup("GATE_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            store,
            max_upload_mb,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Body limit for `POST /add`
    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb.saturating_mul(1024 * 1024)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<GateConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        GateConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]).unwrap();
        assert_eq!(config.bucket, "merkl");
        assert_eq!(config.bind_addr(), "0.0.0.0:3000");
        assert_eq!(config.store, StoreKind::S3);
        assert_eq!(config.max_upload_bytes(), 1024 * 1024 * 1024);
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("MERKL_BUCKET", "blocks"),
            ("GATE_PORT", "8080"),
            ("GATE_STORE", "memory"),
            ("GATE_MAX_UPLOAD_MB", "8"),
        ])
        .unwrap();
        assert_eq!(config.bucket, "blocks");
        assert_eq!(config.port, 8080);
        assert_eq!(config.store, StoreKind::Memory);
        assert_eq!(config.max_upload_bytes(), 8 * 1024 * 1024);
    }

    #[test]
    fn test_bad_values() {
        assert!(config(&[("GATE_PORT", "http")]).is_err());
        assert!(config(&[("GATE_STORE", "disk")]).is_err());
        assert!(config(&[("GATE_MAX_UPLOAD_MB", "lots")]).is_err());
    }
}
