use common::ApiVersion;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{ClientError, Result};

pub const ENV_ENDPOINT: &str = "CSI_POWERMAX_ENDPOINT";
pub const ENV_APPLICATION_NAME: &str = "CSI_APPLICATION_NAME";
pub const ENV_INSECURE: &str = "CSI_POWERMAX_INSECURE";
pub const ENV_USE_CERTS: &str = "CSI_POWERMAX_USECERTS";
/// Directory of PEM root certificates used when certificates are enabled.
pub const ENV_CERT_DIR: &str = "X509_CERT_DIR";

pub const DEFAULT_APPLICATION_NAME: &str = "pmax-client";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);
pub const DEFAULT_JOB_RETRY_INTERVAL: Duration = Duration::from_secs(3);
pub const DEFAULT_MAX_JOB_RETRIES: u32 = 30;

/// Connection settings for one Unisphere endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL, e.g. `https://unisphere:8443`
    pub endpoint: String,
    /// Sent as the `Application-Type` header
    pub application_name: String,
    /// Skip server certificate verification
    pub insecure: bool,
    /// Trust the PEM certificates found in `cert_dir`
    pub use_certs: bool,
    pub cert_dir: Option<PathBuf>,
    pub username: String,
    pub password: String,
    pub version: ApiVersion,
    /// Deadline for each request
    pub timeout: Duration,
    /// Sleep between job polls
    pub job_retry_interval: Duration,
    pub max_job_retries: u32,
    /// Arrays the client may touch; empty allows all
    pub allowed_arrays: Vec<String>,
}

impl ClientConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            application_name: DEFAULT_APPLICATION_NAME.to_string(),
            insecure: false,
            use_certs: false,
            cert_dir: None,
            username: String::new(),
            password: String::new(),
            version: ApiVersion::default(),
            timeout: DEFAULT_TIMEOUT,
            job_retry_interval: DEFAULT_JOB_RETRY_INTERVAL,
            max_job_retries: DEFAULT_MAX_JOB_RETRIES,
            allowed_arrays: Vec::new(),
        }
    }

    /// Read the `CSI_POWERMAX_*` environment.
    pub fn from_env(username: &str, password: &str) -> Result<Self> {
        Self::from_lookup(username, password, |key| env::var(key).ok())
    }

    /// Like [`ClientConfig::from_env`] with an injectable variable source.
    pub fn from_lookup(
        username: &str,
        password: &str,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let endpoint = lookup(ENV_ENDPOINT)
            .filter(|e| !e.trim().is_empty())
            .ok_or_else(|| ClientError::Config(format!("{ENV_ENDPOINT} is not set")))?;

        let mut config = Self::new(endpoint).with_credentials(username, password);
        if let Some(name) = lookup(ENV_APPLICATION_NAME).filter(|n| !n.is_empty()) {
            config.application_name = name;
        }
        if let Some(raw) = lookup(ENV_INSECURE) {
            config.insecure = parse_flag(ENV_INSECURE, &raw)?;
        }
        if let Some(raw) = lookup(ENV_USE_CERTS) {
            config.use_certs = parse_flag(ENV_USE_CERTS, &raw)?;
        }
        config.cert_dir = lookup(ENV_CERT_DIR).map(PathBuf::from);
        Ok(config)
    }

    pub fn with_credentials(mut self, username: &str, password: &str) -> Self {
        self.username = username.to_string();
        self.password = password.to_string();
        self
    }

    pub fn with_application_name(mut self, name: impl Into<String>) -> Self {
        self.application_name = name.into();
        self
    }

    pub fn with_version(mut self, version: ApiVersion) -> Self {
        self.version = version;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_job_polling(mut self, interval: Duration, max_retries: u32) -> Self {
        self.job_retry_interval = interval;
        self.max_job_retries = max_retries;
        self
    }

    pub fn with_allowed_arrays<S: AsRef<str>>(mut self, arrays: &[S]) -> Self {
        self.allowed_arrays = arrays.iter().map(|a| a.as_ref().to_string()).collect();
        self
    }

    pub fn insecure(mut self, insecure: bool) -> Self {
        self.insecure = insecure;
        self
    }

    pub fn with_certs(mut self, cert_dir: impl Into<PathBuf>) -> Self {
        self.use_certs = true;
        self.cert_dir = Some(cert_dir.into());
        self
    }

    /// Endpoint without a trailing slash, ready for route paths.
    pub(crate) fn base_url(&self) -> &str {
        self.endpoint.trim_end_matches('/')
    }
}

fn parse_flag(key: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" | "" => Ok(false),
        other => Err(ClientError::Config(format!("{key}={other} is not a boolean"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn reads_csi_environment() {
        let env = vars(&[
            (ENV_ENDPOINT, "https://unisphere:8443/"),
            (ENV_APPLICATION_NAME, "csi-powermax"),
            (ENV_INSECURE, "true"),
            (ENV_USE_CERTS, "false"),
        ]);
        let config = ClientConfig::from_lookup("admin", "secret", |k| env.get(k).cloned()).unwrap();
        assert_eq!(config.base_url(), "https://unisphere:8443");
        assert_eq!(config.application_name, "csi-powermax");
        assert!(config.insecure);
        assert!(!config.use_certs);
        assert_eq!(config.username, "admin");
        assert_eq!(config.version, ApiVersion::V100);
    }

    #[test]
    fn endpoint_is_required() {
        let env = vars(&[(ENV_INSECURE, "true")]);
        let err = ClientConfig::from_lookup("u", "p", |k| env.get(k).cloned()).unwrap_err();
        assert!(matches!(err, ClientError::Config(msg) if msg.contains(ENV_ENDPOINT)));
    }

    #[test]
    fn flags_must_be_booleans() {
        let env = vars(&[(ENV_ENDPOINT, "https://u:8443"), (ENV_INSECURE, "maybe")]);
        assert!(ClientConfig::from_lookup("u", "p", |k| env.get(k).cloned()).is_err());
    }

    #[test]
    fn builder_overrides() {
        let config = ClientConfig::new("http://127.0.0.1:8443")
            .with_version(ApiVersion::V91)
            .with_job_polling(Duration::from_millis(5), 4)
            .with_allowed_arrays(&["000197900046"]);
        assert_eq!(config.version, ApiVersion::V91);
        assert_eq!(config.max_job_retries, 4);
        assert_eq!(config.allowed_arrays, vec!["000197900046".to_string()]);
    }
}
