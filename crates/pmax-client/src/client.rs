use common::{Job, Route};
use reqwest::header::{HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};

const APPLICATION_TYPE: &str = "Application-Type";
const MAX_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Typed client for one Unisphere endpoint.
///
/// Cloning is cheap and clones share the connection pool.
#[derive(Debug, Clone)]
pub struct Client {
    config: ClientConfig,
    http: reqwest::Client,
    allowed_arrays: Vec<String>,
}

/// Status and raw body of a 2xx response.
pub(crate) struct Reply {
    pub status: StatusCode,
    pub body: Vec<u8>,
    pub url: String,
}

impl Reply {
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body).map_err(|source| ClientError::Decode {
            url: self.url.clone(),
            source,
        })
    }

    /// The job behind a 202, or `None` for a synchronous empty answer.
    pub fn job(&self) -> Result<Option<Job>> {
        if self.status == StatusCode::NO_CONTENT || self.body.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        self.decode().map(Some)
    }
}

impl Client {
    pub fn new(config: ClientConfig) -> Result<Self> {
        if config.base_url().is_empty() {
            return Err(ClientError::Config("endpoint must not be empty".to_string()));
        }

        let mut builder = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.timeout.min(MAX_CONNECT_TIMEOUT))
            .danger_accept_invalid_certs(config.insecure);

        if config.use_certs {
            let dir = config.cert_dir.as_deref().ok_or_else(|| {
                ClientError::Config("certificates enabled but no certificate directory set".to_string())
            })?;
            for cert in load_certificates(dir)? {
                builder = builder.add_root_certificate(cert);
            }
        }

        let http = builder
            .build()
            .map_err(|e| ClientError::Config(format!("failed to build http client: {e}")))?;

        info!(
            endpoint = %config.base_url(),
            version = %config.version,
            insecure = config.insecure,
            "unisphere client created"
        );

        let allowed_arrays = config.allowed_arrays.clone();
        Ok(Self {
            config,
            http,
            allowed_arrays,
        })
    }

    /// Build a client from the `CSI_POWERMAX_*` environment.
    pub fn from_env(username: &str, password: &str) -> Result<Self> {
        Self::new(ClientConfig::from_env(username, password)?)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// API version tag used in request paths.
    pub fn version(&self) -> &'static str {
        self.config.version.tag()
    }

    pub fn allowed_arrays(&self) -> &[String] {
        &self.allowed_arrays
    }

    pub fn set_allowed_arrays<S: AsRef<str>>(&mut self, arrays: &[S]) {
        self.allowed_arrays = arrays.iter().map(|a| a.as_ref().to_string()).collect();
    }

    /// An empty allow-list admits every array.
    pub fn is_allowed_array(&self, symid: &str) -> bool {
        self.allowed_arrays.is_empty() || self.allowed_arrays.iter().any(|a| a == symid)
    }

    pub(crate) fn check_array(&self, symid: &str) -> Result<()> {
        if self.is_allowed_array(symid) {
            Ok(())
        } else {
            Err(ClientError::ArrayNotAllowed(symid.to_string()))
        }
    }

    /// Absolute URL for `route`. The configured version fills `{version}`;
    /// `params` fill the remaining placeholders in order.
    pub(crate) fn url(&self, route: Route, params: &[&str]) -> String {
        let path = if route.template.contains("{version}") {
            let mut all = Vec::with_capacity(params.len() + 1);
            all.push(self.version());
            all.extend_from_slice(params);
            route.expand(&all)
        } else {
            route.expand(params)
        };
        format!("{}{}", self.config.base_url(), path)
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.http
            .request(method, url)
            .basic_auth(&self.config.username, Some(&self.config.password))
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .header(APPLICATION_TYPE, self.config.application_name.as_str())
    }

    async fn send(&self, method: Method, url: String, builder: RequestBuilder) -> Result<Reply> {
        let started = Instant::now();
        let response = builder
            .send()
            .await
            .map_err(|e| ClientError::from_reqwest(&url, e))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| ClientError::from_reqwest(&url, e))?
            .to_vec();

        debug!(
            %method,
            %url,
            status = status.as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "unisphere request"
        );

        if !status.is_success() {
            let err = ClientError::from_response(status.as_u16(), &body);
            warn!(%method, %url, status = status.as_u16(), error = %err, "unisphere request failed");
            return Err(err);
        }
        Ok(Reply { status, body, url })
    }

    pub(crate) async fn execute(
        &self,
        method: Method,
        url: String,
        query: &[(&str, &str)],
    ) -> Result<Reply> {
        let mut builder = self.request(method.clone(), &url);
        if !query.is_empty() {
            builder = builder.query(query);
        }
        self.send(method, url, builder).await
    }

    pub(crate) async fn execute_json<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: String,
        body: &B,
    ) -> Result<Reply> {
        let builder = self.request(method.clone(), &url).json(body);
        self.send(method, url, builder).await
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, url: String) -> Result<T> {
        self.execute(Method::GET, url, &[]).await?.decode()
    }

    pub(crate) async fn get_query<T: DeserializeOwned>(
        &self,
        url: String,
        query: &[(&str, &str)],
    ) -> Result<T> {
        self.execute(Method::GET, url, query).await?.decode()
    }

    pub(crate) async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        url: String,
        body: &B,
    ) -> Result<T> {
        self.execute_json(Method::POST, url, body).await?.decode()
    }

    pub(crate) async fn put<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        url: String,
        body: &B,
    ) -> Result<T> {
        self.execute_json(Method::PUT, url, body).await?.decode()
    }

    pub(crate) async fn delete(&self, url: String) -> Result<()> {
        self.execute(Method::DELETE, url, &[]).await.map(|_| ())
    }
}

/// Read every `.pem`/`.crt` file in `dir` as a trusted root.
fn load_certificates(dir: &Path) -> Result<Vec<reqwest::Certificate>> {
    let entries = fs::read_dir(dir).map_err(|e| {
        ClientError::Config(format!("cannot read certificate directory {}: {e}", dir.display()))
    })?;

    let mut certs = Vec::new();
    for entry in entries {
        let path = entry
            .map_err(|e| ClientError::Config(format!("cannot list {}: {e}", dir.display())))?
            .path();
        let is_cert = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("pem") | Some("crt")
        );
        if !is_cert {
            continue;
        }
        let pem = fs::read(&path)
            .map_err(|e| ClientError::Config(format!("cannot read {}: {e}", path.display())))?;
        let cert = reqwest::Certificate::from_pem(&pem)
            .map_err(|e| ClientError::Config(format!("invalid certificate {}: {e}", path.display())))?;
        debug!(path = %path.display(), "loaded root certificate");
        certs.push(cert);
    }

    if certs.is_empty() {
        return Err(ClientError::Config(format!(
            "no certificates found in {}",
            dir.display()
        )));
    }
    Ok(certs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{routes, ApiVersion};

    fn client(allowed: &[&str]) -> Client {
        let config = ClientConfig::new("http://127.0.0.1:8443/")
            .with_credentials("u", "p")
            .with_version(ApiVersion::V91)
            .with_allowed_arrays(allowed);
        Client::new(config).unwrap()
    }

    #[test]
    fn url_prefixes_the_version() {
        let c = client(&[]);
        assert_eq!(
            c.url(routes::VOLUME, &["000197900046", "0001A"]),
            "http://127.0.0.1:8443/univmax/restapi/91/sloprovisioning/symmetrix/000197900046/volume/0001A"
        );
        assert_eq!(
            c.url(routes::VERSION, &[]),
            "http://127.0.0.1:8443/univmax/restapi/version"
        );
    }

    #[test]
    fn allow_list_gates_arrays() {
        let open = client(&[]);
        assert!(open.is_allowed_array("000197900099"));

        let mut gated = client(&["000197900046"]);
        assert!(gated.is_allowed_array("000197900046"));
        assert!(matches!(
            gated.check_array("000197900047"),
            Err(ClientError::ArrayNotAllowed(id)) if id == "000197900047"
        ));

        gated.set_allowed_arrays::<&str>(&[]);
        assert!(gated.check_array("000197900047").is_ok());
    }

    #[test]
    fn empty_endpoint_is_rejected() {
        assert!(matches!(
            Client::new(ClientConfig::new("")),
            Err(ClientError::Config(_))
        ));
    }

    #[test]
    fn missing_cert_dir_is_a_config_error() {
        let mut config = ClientConfig::new("https://unisphere:8443");
        config.use_certs = true;
        assert!(matches!(Client::new(config), Err(ClientError::Config(_))));
    }

    #[test]
    fn empty_reply_has_no_job() {
        let reply = Reply {
            status: StatusCode::NO_CONTENT,
            body: Vec::new(),
            url: "u".to_string(),
        };
        assert!(reply.job().unwrap().is_none());
    }
}
