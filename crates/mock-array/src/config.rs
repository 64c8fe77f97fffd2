use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

pub const DEFAULT_ARRAY: &str = "000197900046";
pub const SECONDARY_ARRAY: &str = "000197900047";
pub const REMOTE_ARRAY: &str = "000000000013";

/// Configuration for a mock array instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MockConfig {
    /// Listen address
    pub listen_addr: String,
    /// Listen port, 0 picks a free one
    pub port: u16,
    /// Basic-auth credentials checked by the version endpoint
    pub username: String,
    pub password: String,
    /// Arrays this mock manages
    pub arrays: Vec<String>,
    /// Partner array of the seeded RDF group
    pub remote_array: String,
    /// Volume listings longer than this come back as an iterator
    pub page_size: usize,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1".to_string(),
            port: 8443,
            username: "username".to_string(),
            password: "password".to_string(),
            arrays: vec![
                DEFAULT_ARRAY.to_string(),
                SECONDARY_ARRAY.to_string(),
                REMOTE_ARRAY.to_string(),
            ],
            remote_array: REMOTE_ARRAY.to_string(),
            page_size: 10,
        }
    }
}

impl MockConfig {
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading mock config {}", path.display()))?;
        serde_yaml::from_str(&raw).with_context(|| format!("parsing mock config {}", path.display()))
    }

    /// Overlay `MOCK_ARRAY_*` environment variables.
    pub fn with_env(mut self) -> Result<Self> {
        if let Ok(addr) = env::var("MOCK_ARRAY_LISTEN_ADDR") {
            self.listen_addr = addr;
        }
        if let Ok(port) = env::var("MOCK_ARRAY_PORT") {
            self.port = port
                .parse()
                .with_context(|| format!("MOCK_ARRAY_PORT={port} is not a port"))?;
        }
        if let Ok(user) = env::var("MOCK_ARRAY_USERNAME") {
            self.username = user;
        }
        if let Ok(password) = env::var("MOCK_ARRAY_PASSWORD") {
            self.password = password;
        }
        if let Ok(arrays) = env::var("MOCK_ARRAY_ARRAYS") {
            self.arrays = arrays
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Ok(remote) = env::var("MOCK_ARRAY_REMOTE_ARRAY") {
            self.remote_array = remote;
        }
        if let Ok(size) = env::var("MOCK_ARRAY_PAGE_SIZE") {
            self.page_size = size
                .parse()
                .with_context(|| format!("MOCK_ARRAY_PAGE_SIZE={size} is not a number"))?;
        }
        Ok(self)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.listen_addr, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yaml_fills_missing_fields_from_defaults() {
        let cfg: MockConfig = serde_yaml::from_str("port: 9000\npage_size: 3\n").unwrap();
        assert_eq!(cfg.port, 9000);
        assert_eq!(cfg.page_size, 3);
        assert_eq!(cfg.username, "username");
        assert!(cfg.arrays.contains(&DEFAULT_ARRAY.to_string()));
    }

    #[test]
    fn bind_addr_joins_host_and_port() {
        let cfg = MockConfig {
            port: 0,
            ..Default::default()
        };
        assert_eq!(cfg.bind_addr(), "127.0.0.1:0");
    }
}
