//! Request handlers, one module per Unisphere resource family.
//!
//! Handlers follow the same shape: take the lock, fire the fault that guards
//! the endpoint, validate the path, then delegate to the store. Nothing in a
//! handler awaits while the lock is held.

use axum::{
    async_trait,
    extract::{FromRequest, Request},
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use common::ApiVersion;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{MockError, MockResult};
use crate::{ArrayState, Completion, MockArray};

pub mod admin;
pub mod file;
pub mod performance;
pub mod provisioning;
pub mod replication;
pub mod system;

pub type AppState = MockArray;

/// `/{version}/.../symmetrix/{symid}` prefix shared by array-scoped routes.
#[derive(Debug, Deserialize)]
pub struct ArrayPath {
    pub version: String,
    pub symid: String,
}

/// Array-scoped route ending in a single resource id.
#[derive(Debug, Deserialize)]
pub struct ResourcePath {
    pub version: String,
    pub symid: String,
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct VersionPath {
    pub version: String,
}

pub(crate) fn api_version(tag: &str) -> MockResult<ApiVersion> {
    tag.parse()
        .map_err(|e: common::UnsupportedVersion| MockError::invalid(e.to_string()))
}

/// Check the version tag and that `symid` is managed by this mock.
pub(crate) fn check_array(state: &ArrayState, version: &str, symid: &str) -> MockResult<ApiVersion> {
    let version = api_version(version)?;
    state.store.check_array(symid)?;
    Ok(version)
}

impl ArrayPath {
    pub(crate) fn check(&self, state: &ArrayState) -> MockResult<ApiVersion> {
        check_array(state, &self.version, &self.symid)
    }
}

impl ResourcePath {
    pub(crate) fn check(&self, state: &ArrayState) -> MockResult<ApiVersion> {
        check_array(state, &self.version, &self.symid)
    }
}

/// JSON request body whose decode failures come back as a 400 envelope.
#[derive(Debug)]
pub struct Payload<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for Payload<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = MockError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| MockError::invalid(rejection.body_text()))?;
        Ok(Payload(value))
    }
}

pub(crate) fn ok<T: Serialize>(value: T) -> Response {
    Json(value).into_response()
}

pub(crate) fn no_content() -> Response {
    StatusCode::NO_CONTENT.into_response()
}

/// 200 with the result, or 202 with the job that will produce it.
pub(crate) fn completed<T: Serialize>(outcome: Completion<T>) -> Response {
    match outcome {
        Completion::Done(value) => Json(value).into_response(),
        Completion::Deferred(job) => (StatusCode::ACCEPTED, Json(job)).into_response(),
    }
}

/// Like [`completed`] for operations with no synchronous body.
pub(crate) fn completed_empty(outcome: Completion<()>) -> Response {
    match outcome {
        Completion::Done(()) => no_content(),
        Completion::Deferred(job) => (StatusCode::ACCEPTED, Json(job)).into_response(),
    }
}

/// Catch-all for paths the mock does not serve.
pub async fn fallback(uri: Uri) -> MockError {
    warn!(%uri, "no route");
    MockError::NotFound(format!("URL {uri} not found"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_tags() {
        assert_eq!(api_version("100").unwrap(), ApiVersion::V100);
        assert!(matches!(api_version("84"), Err(MockError::InvalidInput(_))));
    }

    #[test]
    fn array_must_be_managed() {
        let array = MockArray::default();
        let state = array.lock();
        assert!(check_array(&state, "91", "000197900046").is_ok());
        assert!(matches!(
            check_array(&state, "91", "000000000999"),
            Err(MockError::NotFound(_))
        ));
    }

    #[test]
    fn deferred_outcome_is_accepted() {
        let array = MockArray::default();
        let job = array.lock().jobs.create(
            "000197900046",
            "op",
            "",
            common::JobStatus::Running,
            common::JobStatus::Succeeded,
        );
        let response = completed::<()>(Completion::Deferred(job));
        assert_eq!(response.status(), StatusCode::ACCEPTED);
        assert_eq!(completed_empty(Completion::Done(())).status(), StatusCode::NO_CONTENT);
    }
}
