use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    response::Response,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use common::system::{DirectorIdList, PortKeyList, SymmetrixIdList, VersionDetails};
use common::provisioning::PortKey;
use common::{JobIdList, JobStatus};
use serde::Deserialize;
use tracing::{debug, info};

use super::{ok, AppState, ArrayPath, ResourcePath};
use crate::error::{MockError, MockResult};
use crate::faults::FaultKind;
use crate::fixtures;

pub const UNISPHERE_VERSION: &str = "V10.1.0.0";

#[derive(Debug, Deserialize)]
pub struct DirectorPath {
    pub version: String,
    pub symid: String,
    pub director: String,
}

#[derive(Debug, Deserialize)]
pub struct PortPath {
    pub version: String,
    pub symid: String,
    pub director: String,
    pub port: String,
}

#[derive(Debug, Deserialize)]
pub struct JobQuery {
    pub status: Option<String>,
}

/// `(user, password)` from an `Authorization: Basic` header.
fn basic_credentials(headers: &HeaderMap) -> Option<(String, String)> {
    let value = headers.get(axum::http::header::AUTHORIZATION)?.to_str().ok()?;
    let encoded = value.strip_prefix("Basic ")?;
    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let text = String::from_utf8(decoded).ok()?;
    let (user, password) = text.split_once(':')?;
    Some((user.to_string(), password.to_string()))
}

/// GET /univmax/restapi/version
///
/// The only endpoint that checks credentials.
pub async fn version(State(app): State<AppState>, headers: HeaderMap) -> MockResult<Response> {
    let config = app.config();
    match basic_credentials(&headers) {
        Some((user, password)) if user == config.username && password == config.password => {
            info!(%user, "authenticated");
            Ok(ok(VersionDetails {
                version: UNISPHERE_VERSION.to_string(),
            }))
        }
        _ => Err(MockError::Unauthorized(
            "Unauthorized: invalid username or password".to_string(),
        )),
    }
}

pub async fn symmetrix_list(
    State(app): State<AppState>,
    Path(version): Path<String>,
) -> MockResult<Response> {
    let mut state = app.lock();
    state.faults.check(FaultKind::GetSymmetrixError)?;
    super::api_version(&version)?;
    Ok(ok(SymmetrixIdList {
        symmetrix_ids: state.store.arrays.clone(),
    }))
}

pub async fn symmetrix(
    State(app): State<AppState>,
    Path((version, symid)): Path<(String, String)>,
) -> MockResult<Response> {
    let mut state = app.lock();
    state.faults.check(FaultKind::GetSymmetrixError)?;
    super::check_array(&state, &version, &symid)?;
    Ok(ok(fixtures::symmetrix(&symid)?))
}

pub async fn director_list(
    State(app): State<AppState>,
    Path(path): Path<ArrayPath>,
) -> MockResult<Response> {
    let mut state = app.lock();
    state.faults.check(FaultKind::GetDirectorError)?;
    path.check(&state)?;
    Ok(ok(DirectorIdList {
        director_ids: state.store.directors.keys().cloned().collect(),
    }))
}

pub async fn port_list(
    State(app): State<AppState>,
    Path(path): Path<DirectorPath>,
) -> MockResult<Response> {
    let mut state = app.lock();
    state.faults.check(FaultKind::GetPortError)?;
    super::check_array(&state, &path.version, &path.symid)?;
    let ports = state
        .store
        .directors
        .get(&path.director)
        .ok_or_else(|| MockError::not_found("Director", &path.director))?;
    Ok(ok(PortKeyList {
        port_keys: ports
            .iter()
            .map(|p| PortKey::new(path.director.as_str(), p.port.as_str()))
            .collect(),
    }))
}

pub async fn port(State(app): State<AppState>, Path(path): Path<PortPath>) -> MockResult<Response> {
    let mut state = app.lock();
    state.faults.check(FaultKind::GetPortError)?;
    super::check_array(&state, &path.version, &path.symid)?;
    let port = state
        .store
        .directors
        .get(&path.director)
        .and_then(|ports| ports.iter().find(|p| p.port == path.port))
        .ok_or_else(|| MockError::not_found("Port", format!("{}:{}", path.director, path.port)))?;
    Ok(ok(fixtures::port(&path.director, port)?))
}

pub async fn job_list(
    State(app): State<AppState>,
    Path(path): Path<ArrayPath>,
    Query(query): Query<JobQuery>,
) -> MockResult<Response> {
    let mut state = app.lock();
    state.faults.check(FaultKind::GetJobError)?;
    path.check(&state)?;
    let status = match query.status {
        Some(raw) => Some(
            serde_json::from_value::<JobStatus>(serde_json::Value::String(raw.clone()))
                .map_err(|_| MockError::invalid(format!("unknown job status {raw}")))?,
        ),
        None => None,
    };
    Ok(ok(JobIdList {
        job_ids: state.jobs.ids(status),
    }))
}

/// Every read advances the job one step of its replay.
pub async fn job(State(app): State<AppState>, Path(path): Path<ResourcePath>) -> MockResult<Response> {
    let mut state = app.lock();
    state.faults.check(FaultKind::GetJobError)?;
    state.faults.check(FaultKind::GetJobCannotFindRoleForUser)?;
    path.check(&state)?;
    let job = state
        .jobs
        .poll(&path.id)
        .ok_or_else(|| MockError::not_found("Job", &path.id))?;
    debug!(job = %job.job_id, status = %job.status, "job polled");
    Ok(ok(job))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn basic_credentials_decode() {
        let mut headers = HeaderMap::new();
        let encoded = STANDARD.encode("admin:secret:with:colons");
        headers.insert(
            axum::http::header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Basic {encoded}")).unwrap(),
        );
        assert_eq!(
            basic_credentials(&headers),
            Some(("admin".to_string(), "secret:with:colons".to_string()))
        );
    }

    #[test]
    fn missing_or_malformed_credentials() {
        let mut headers = HeaderMap::new();
        assert!(basic_credentials(&headers).is_none());
        headers.insert(
            axum::http::header::AUTHORIZATION,
            HeaderValue::from_static("Bearer token"),
        );
        assert!(basic_credentials(&headers).is_none());
    }
}
