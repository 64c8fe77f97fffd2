//! Test-control surface under `/mock`.
//!
//! These routes sit outside the transport-fault layer so a test can always
//! disarm what it armed.

use axum::{
    extract::{Path, State},
    response::Response,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{no_content, ok, AppState, Payload};
use crate::error::MockResult;
use crate::faults::FaultKind;

pub const RESET: &str = "/mock/reset";
pub const FAULTS: &str = "/mock/faults";
pub const FAULT: &str = "/mock/faults/:kind";

/// Optional knobs when arming one fault.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InduceFault {
    /// Replace the fault's default status.
    pub status: Option<u16>,
    /// Fire this many times, then disarm.
    pub times: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FaultSettings {
    pub reset_after_first: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FaultStatus {
    pub armed: Vec<String>,
    pub reset_after_first: bool,
}

/// POST /mock/reset
pub async fn reset(State(app): State<AppState>) -> Response {
    app.reset();
    no_content()
}

/// GET /mock/faults
pub async fn list_faults(State(app): State<AppState>) -> Response {
    let state = app.lock();
    ok(FaultStatus {
        armed: state.faults.armed().iter().map(|k| k.to_string()).collect(),
        reset_after_first: state.faults.reset_after_first(),
    })
}

/// PUT /mock/faults
pub async fn configure_faults(
    State(app): State<AppState>,
    Payload(settings): Payload<FaultSettings>,
) -> Response {
    app.set_reset_after_first(settings.reset_after_first);
    info!(reset_after_first = settings.reset_after_first, "fault settings updated");
    no_content()
}

/// DELETE /mock/faults
pub async fn clear_faults(State(app): State<AppState>) -> Response {
    app.lock().faults.reset();
    info!("all faults cleared");
    no_content()
}

/// PUT /mock/faults/{kind}, with an optional [`InduceFault`] body.
pub async fn induce_fault(
    State(app): State<AppState>,
    Path(kind): Path<String>,
    body: Option<Payload<InduceFault>>,
) -> MockResult<Response> {
    let kind: FaultKind = kind.parse()?;
    let options = body.map(|Payload(options)| options).unwrap_or_default();
    let mut state = app.lock();
    match (options.status, options.times) {
        (Some(status), _) => state.faults.induce_status(kind, status),
        (None, Some(times)) => state.faults.induce_times(kind, times),
        (None, None) => state.faults.induce(kind),
    }
    info!(fault = %kind, status = ?options.status, times = ?options.times, "fault armed");
    Ok(no_content())
}

/// DELETE /mock/faults/{kind}
pub async fn clear_fault(
    State(app): State<AppState>,
    Path(kind): Path<String>,
) -> MockResult<Response> {
    let kind: FaultKind = kind.parse()?;
    app.clear_fault(kind);
    Ok(no_content())
}
