//! SRDF, SnapVX and snapshot policy endpoints.

use axum::{
    extract::{Path, State},
    response::Response,
};
use common::replication::{
    CreateSgSrdf, CreateSnapshotPolicyParam, CreateVolumesSnapshot, DeleteVolumeSnapshot,
    ModifySgRdfGroup, ModifyVolumeSnapshot, SnapshotAction, SnapshotPolicyAction,
    SnapshotPolicyList, UpdateSnapshotPolicyParam, VolumeName,
};
use common::routes;
use serde::Deserialize;
use tracing::info;

use super::{
    check_array, completed, completed_empty, no_content, ok, AppState, ArrayPath, Payload,
    ResourcePath,
};
use crate::error::{MockError, MockResult};
use crate::faults::FaultKind;

#[derive(Debug, Deserialize)]
pub struct RdfGroupPath {
    pub version: String,
    pub symid: String,
    pub rdfg: String,
}

#[derive(Debug, Deserialize)]
pub struct DevicePairPath {
    pub version: String,
    pub symid: String,
    pub rdfg: String,
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct SgRdfPath {
    pub version: String,
    pub symid: String,
    pub id: String,
    pub rdfg: String,
}

#[derive(Debug, Deserialize)]
pub struct VolumePath {
    pub version: String,
    pub symid: String,
    pub volid: String,
}

#[derive(Debug, Deserialize)]
pub struct VolumeSnapshotPath {
    pub version: String,
    pub symid: String,
    pub volid: String,
    pub id: String,
}

/// RDF group numbers that do not parse are as unknown as missing ones.
fn rdf_group_number(raw: &str) -> MockResult<u32> {
    raw.parse().map_err(|_| MockError::invalid_ra_group())
}

fn names(volumes: &[VolumeName]) -> Vec<String> {
    volumes.iter().map(|v| v.name.clone()).collect()
}

// SRDF

pub async fn capabilities(
    State(app): State<AppState>,
    Path(version): Path<String>,
) -> MockResult<Response> {
    let mut state = app.lock();
    state.faults.check(FaultKind::GetReplicationCapabilitiesError)?;
    super::api_version(&version)?;
    Ok(ok(state.store.replication_capabilities()))
}

pub async fn list_rdf_groups(
    State(app): State<AppState>,
    Path(path): Path<ArrayPath>,
) -> MockResult<Response> {
    let mut state = app.lock();
    state.faults.check(FaultKind::GetRdfGroupError)?;
    path.check(&state)?;
    Ok(ok(state.store.rdf_group_list()))
}

pub async fn get_rdf_group(
    State(app): State<AppState>,
    Path(path): Path<RdfGroupPath>,
) -> MockResult<Response> {
    let mut state = app.lock();
    state.faults.check(FaultKind::GetRdfGroupError)?;
    check_array(&state, &path.version, &path.symid)?;
    let rdfg = rdf_group_number(&path.rdfg)?;
    Ok(ok(state.store.rdf_group(rdfg)?))
}

pub async fn get_rdf_device_pair(
    State(app): State<AppState>,
    Path(path): Path<DevicePairPath>,
) -> MockResult<Response> {
    let mut state = app.lock();
    state.faults.check(FaultKind::GetRdfDevicePairError)?;
    check_array(&state, &path.version, &path.symid)?;
    let rdfg = rdf_group_number(&path.rdfg)?;
    Ok(ok(state.store.rdf_device_pair(rdfg, &path.id)?))
}

pub async fn get_rdf_storage_group(
    State(app): State<AppState>,
    Path(path): Path<ResourcePath>,
) -> MockResult<Response> {
    let mut state = app.lock();
    state.faults.check(FaultKind::GetSrdfStorageGroupError)?;
    path.check(&state)?;
    Ok(ok(state.store.rdf_storage_group(&path.symid, &path.id)?))
}

pub async fn list_sg_rdf_groups(
    State(app): State<AppState>,
    Path(path): Path<ResourcePath>,
) -> MockResult<Response> {
    let mut state = app.lock();
    state.faults.check(FaultKind::GetSrdfStorageGroupError)?;
    path.check(&state)?;
    Ok(ok(state.store.sg_rdf_groups(&path.id)?))
}

/// Protect a storage group. The response is the new SG RDF info.
pub async fn protect_storage_group(
    State(app): State<AppState>,
    Path(path): Path<ResourcePath>,
    Payload(param): Payload<CreateSgSrdf>,
) -> MockResult<Response> {
    let mut state = app.lock();
    state.faults.check(FaultKind::CreateSgReplicaError)?;
    path.check(&state)?;

    let rdfg = param.rdfg_number.to_string();
    let link = routes::SG_RDF_GROUP.expand(&[&path.version, &path.symid, &path.id, &rdfg]);
    let (symid, sg) = (path.symid.clone(), path.id.clone());
    let outcome = state.execute(
        &path.symid,
        "Protect Storage Group",
        &link,
        param.execution_option,
        |store| {
            store.protect_storage_group(&symid, &sg, &param)?;
            store.sg_rdf_info(&sg, param.rdfg_number).cloned()
        },
    )?;
    info!(storage_group = %path.id, rdfg = param.rdfg_number, mode = %param.replication_mode, "srdf protection requested");
    Ok(completed(outcome))
}

pub async fn get_sg_rdf_group(
    State(app): State<AppState>,
    Path(path): Path<SgRdfPath>,
) -> MockResult<Response> {
    let mut state = app.lock();
    state.faults.check(FaultKind::GetSrdfStorageGroupError)?;
    check_array(&state, &path.version, &path.symid)?;
    let rdfg = rdf_group_number(&path.rdfg)?;
    Ok(ok(state.store.sg_rdf_info(&path.id, rdfg)?))
}

/// Run an SRDF action (`Establish`, `Suspend`, `Failover`...) on a group.
pub async fn modify_sg_rdf_group(
    State(app): State<AppState>,
    Path(path): Path<SgRdfPath>,
    Payload(param): Payload<ModifySgRdfGroup>,
) -> MockResult<Response> {
    let mut state = app.lock();
    state.faults.check(FaultKind::ExecuteActionError)?;
    check_array(&state, &path.version, &path.symid)?;
    let rdfg = rdf_group_number(&path.rdfg)?;

    let link = routes::SG_RDF_GROUP.expand(&[&path.version, &path.symid, &path.id, &path.rdfg]);
    let sg = path.id.clone();
    let outcome = state.execute(
        &path.symid,
        &format!("{} Storage Group", param.action),
        &link,
        param.execution_option,
        |store| {
            store.rdf_action(&sg, rdfg, &param.action)?;
            store.sg_rdf_info(&sg, rdfg).cloned()
        },
    )?;
    info!(storage_group = %path.id, rdfg, action = %param.action, "srdf action");
    Ok(completed(outcome))
}

pub async fn unprotect_storage_group(
    State(app): State<AppState>,
    Path(path): Path<SgRdfPath>,
) -> MockResult<Response> {
    let mut state = app.lock();
    state.faults.check(FaultKind::DeleteSgReplicaError)?;
    check_array(&state, &path.version, &path.symid)?;
    let rdfg = rdf_group_number(&path.rdfg)?;
    state.store.unprotect_storage_group(&path.id, rdfg)?;
    Ok(no_content())
}

pub async fn free_rdf_group_numbers(
    State(app): State<AppState>,
    Path(path): Path<ArrayPath>,
) -> MockResult<Response> {
    let mut state = app.lock();
    state.faults.check(FaultKind::GetFreeRdfGroupError)?;
    path.check(&state)?;
    Ok(ok(state.store.free_rdf_group_numbers()))
}

// SnapVX

pub async fn create_snapshot(
    State(app): State<AppState>,
    Path(path): Path<ResourcePath>,
    Payload(param): Payload<CreateVolumesSnapshot>,
) -> MockResult<Response> {
    let mut state = app.lock();
    state.faults.check(FaultKind::CreateSnapshotError)?;
    path.check(&state)?;

    let sources = names(&param.source_volumes);
    if sources.is_empty() {
        return Err(MockError::invalid("no source volumes specified"));
    }
    let link = routes::SNAPSHOT.expand(&[&path.version, &path.symid, &path.id]);
    let name = path.id.clone();
    let outcome = state.execute(&path.symid, "Create Snapshot", &link, param.execution_option, |store| {
        store.create_snapshot(&name, &sources)
    })?;
    info!(snapshot = %path.id, sources = sources.len(), "snapshot created");
    Ok(completed_empty(outcome))
}

/// Link, unlink, rename or restore a snapshot across its source volumes.
pub async fn modify_snapshot(
    State(app): State<AppState>,
    Path(path): Path<ResourcePath>,
    Payload(param): Payload<ModifyVolumeSnapshot>,
) -> MockResult<Response> {
    let mut state = app.lock();
    let fault = match param.action {
        SnapshotAction::Link => FaultKind::LinkSnapshotError,
        SnapshotAction::Unlink => FaultKind::UnlinkSnapshotError,
        SnapshotAction::Rename => FaultKind::RenameSnapshotError,
        SnapshotAction::Restore => FaultKind::RestoreSnapshotError,
    };
    state.faults.check(fault)?;
    path.check(&state)?;

    let sources = names(&param.source_volumes);
    let targets = names(&param.target_volumes);
    if sources.is_empty() {
        return Err(MockError::invalid("no source volumes specified"));
    }
    let link = routes::SNAPSHOT.expand(&[&path.version, &path.symid, &path.id]);
    let name = path.id.clone();
    let action = param.action;
    let outcome = state.execute(
        &path.symid,
        &format!("{action:?} Snapshot"),
        &link,
        param.execution_option,
        |store| match action {
            SnapshotAction::Link => store.link_snapshot(&name, &sources, &targets, param.generation),
            SnapshotAction::Unlink => store.unlink_snapshot(&name, &sources, &targets),
            SnapshotAction::Rename => {
                store.rename_snapshot(&name, &param.new_snapshot_name, &sources)
            }
            SnapshotAction::Restore => store.restore_snapshot(&name, &sources, param.generation),
        },
    )?;
    info!(snapshot = %path.id, ?action, "snapshot modified");
    Ok(completed_empty(outcome))
}

pub async fn delete_snapshot(
    State(app): State<AppState>,
    Path(path): Path<ResourcePath>,
    Payload(param): Payload<DeleteVolumeSnapshot>,
) -> MockResult<Response> {
    let mut state = app.lock();
    state.faults.check(FaultKind::DeleteSnapshotError)?;
    path.check(&state)?;

    let sources = names(&param.source_volumes);
    let link = routes::SNAPSHOT.expand(&[&path.version, &path.symid, &path.id]);
    let name = path.id.clone();
    let outcome = state.execute(&path.symid, "Delete Snapshot", &link, param.execution_option, |store| {
        store.delete_snapshot(&name, &sources, param.generation)
    })?;
    info!(snapshot = %path.id, generation = param.generation, "snapshot deleted");
    Ok(completed_empty(outcome))
}

pub async fn list_volume_snapshots(
    State(app): State<AppState>,
    Path(path): Path<VolumePath>,
) -> MockResult<Response> {
    let mut state = app.lock();
    state.faults.check(FaultKind::GetSnapshotError)?;
    check_array(&state, &path.version, &path.symid)?;
    Ok(ok(state.store.volume_snapshot_names(&path.volid)?))
}

pub async fn get_volume_snapshot(
    State(app): State<AppState>,
    Path(path): Path<VolumeSnapshotPath>,
) -> MockResult<Response> {
    let mut state = app.lock();
    state.faults.check(FaultKind::GetSnapshotError)?;
    check_array(&state, &path.version, &path.symid)?;
    Ok(ok(state.store.volume_snapshot(&path.volid, &path.id)?))
}

pub async fn list_snapshot_generations(
    State(app): State<AppState>,
    Path(path): Path<VolumeSnapshotPath>,
) -> MockResult<Response> {
    let mut state = app.lock();
    state.faults.check(FaultKind::GetSnapshotGenerationError)?;
    check_array(&state, &path.version, &path.symid)?;
    Ok(ok(state.store.volume_snapshot_generations(&path.volid, &path.id)?))
}

pub async fn get_sym_volume(
    State(app): State<AppState>,
    Path(path): Path<VolumePath>,
) -> MockResult<Response> {
    let mut state = app.lock();
    state.faults.check(FaultKind::GetSymVolumeError)?;
    check_array(&state, &path.version, &path.symid)?;
    Ok(ok(state.store.sym_volume(&path.volid)?))
}

// Snapshot policies

pub async fn list_snapshot_policies(
    State(app): State<AppState>,
    Path(path): Path<ArrayPath>,
) -> MockResult<Response> {
    let mut state = app.lock();
    state.faults.check(FaultKind::GetSnapshotPolicyError)?;
    path.check(&state)?;
    Ok(ok(SnapshotPolicyList {
        names: state.store.snapshot_policies.keys().cloned().collect(),
    }))
}

pub async fn get_snapshot_policy(
    State(app): State<AppState>,
    Path(path): Path<ResourcePath>,
) -> MockResult<Response> {
    let mut state = app.lock();
    state.faults.check(FaultKind::GetSnapshotPolicyError)?;
    path.check(&state)?;
    Ok(ok(state.store.snapshot_policy(&path.id)?))
}

pub async fn create_snapshot_policy(
    State(app): State<AppState>,
    Path(path): Path<ArrayPath>,
    Payload(param): Payload<CreateSnapshotPolicyParam>,
) -> MockResult<Response> {
    let mut state = app.lock();
    state.faults.check(FaultKind::CreateSnapshotPolicyError)?;
    path.check(&state)?;
    state.store.create_snapshot_policy(&path.symid, &param)?;
    info!(policy = %param.name, interval = %param.interval, "snapshot policy created");
    Ok(ok(state.store.snapshot_policy(&param.name)?))
}

pub async fn update_snapshot_policy(
    State(app): State<AppState>,
    Path(path): Path<ResourcePath>,
    Payload(param): Payload<UpdateSnapshotPolicyParam>,
) -> MockResult<Response> {
    let mut state = app.lock();
    state.faults.check(FaultKind::ModifySnapshotPolicyError)?;
    path.check(&state)?;
    state.store.update_snapshot_policy(&path.id, &param)?;

    let renamed = match (&param.action, &param.modify) {
        (SnapshotPolicyAction::Modify, Some(modify)) => modify.new_name.clone(),
        _ => None,
    };
    let name = renamed.unwrap_or_else(|| path.id.clone());
    Ok(ok(state.store.snapshot_policy(&name)?))
}

pub async fn delete_snapshot_policy(
    State(app): State<AppState>,
    Path(path): Path<ResourcePath>,
) -> MockResult<Response> {
    let mut state = app.lock();
    state.faults.check(FaultKind::DeleteSnapshotPolicyError)?;
    path.check(&state)?;
    state.store.delete_snapshot_policy(&path.id)?;
    info!(policy = %path.id, "snapshot policy deleted");
    Ok(no_content())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unparsable_group_numbers_are_invalid_ra_groups() {
        assert_eq!(rdf_group_number("10").unwrap(), 10);
        let err = rdf_group_number("ten").unwrap_err();
        assert_eq!(err.status(), 404);
        assert_eq!(err.to_string(), crate::error::INVALID_RA_GROUP);
    }
}
