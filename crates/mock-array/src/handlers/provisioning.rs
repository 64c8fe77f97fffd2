//! sloprovisioning endpoints plus the volume iterator.

use axum::{
    extract::{Path, Query, State},
    response::Response,
};
use common::provisioning::{
    CreateHostGroupParam, CreateHostParam, CreatePortGroupParam, CreateStorageGroupParam,
    EditMaskingViewParam, EditPortGroupParam, EditVolumeParam, HostGroupList, HostList,
    InitiatorList, MaskingViewConnections, MaskingViewCreateParam, MaskingViewList,
    PortGroupList, ServiceLevelList, StorageGroupIdList, StoragePoolList, UpdateHostGroupParam,
    UpdateHostParam, UpdateStorageGroupPayload,
};
use common::routes;
use serde::Deserialize;
use tracing::info;

use super::{completed, no_content, ok, AppState, ArrayPath, Payload, ResourcePath};
use crate::error::{MockError, MockResult};
use crate::faults::FaultKind;

#[derive(Debug, Deserialize)]
pub struct VolumeListQuery {
    pub volume_identifier: Option<String>,
    #[serde(rename = "storageGroupId")]
    pub storage_group_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct IteratorPath {
    pub version: String,
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub from: usize,
    pub to: usize,
}

fn parse_size(raw: &str) -> MockResult<u64> {
    raw.trim()
        .parse()
        .map_err(|_| MockError::invalid(format!("invalid volume size '{raw}'")))
}

// Volumes

/// Listings longer than the configured page size come back as an iterator.
pub async fn list_volumes(
    State(app): State<AppState>,
    Path(path): Path<ArrayPath>,
    Query(query): Query<VolumeListQuery>,
) -> MockResult<Response> {
    let page_size = app.config().page_size;
    let mut state = app.lock();
    state.faults.check(FaultKind::GetVolumeIteratorError)?;
    path.check(&state)?;
    let ids = state.store.volume_ids(
        query.volume_identifier.as_deref(),
        query.storage_group_id.as_deref(),
    );
    Ok(ok(state.iterators.open(ids, page_size)))
}

pub async fn get_volume(
    State(app): State<AppState>,
    Path(path): Path<ResourcePath>,
) -> MockResult<Response> {
    let mut state = app.lock();
    state.faults.check(FaultKind::GetVolumeError)?;
    path.check(&state)?;
    Ok(ok(state.store.volume(&path.id)?))
}

pub async fn get_private_volume(
    State(app): State<AppState>,
    Path(path): Path<ResourcePath>,
) -> MockResult<Response> {
    let mut state = app.lock();
    state.faults.check(FaultKind::GetPrivateVolumeError)?;
    path.check(&state)?;
    Ok(ok(state.store.private_volume(&path.id)?))
}

/// Rename or expand, whichever the action carries.
pub async fn update_volume(
    State(app): State<AppState>,
    Path(path): Path<ResourcePath>,
    Payload(param): Payload<EditVolumeParam>,
) -> MockResult<Response> {
    let mut state = app.lock();
    let action = param.action;
    if action.expand.is_some() {
        state.faults.check(FaultKind::ExpandVolumeError)?;
    } else {
        state.faults.check(FaultKind::UpdateVolumeError)?;
    }
    path.check(&state)?;
    if action.expand.is_none() && action.modify_identifier.is_none() {
        return Err(MockError::invalid("no volume action specified"));
    }

    let link = routes::VOLUME.expand(&[&path.version, &path.symid, &path.id]);
    let id = path.id.clone();
    let outcome = state.execute(&path.symid, "Modify Volume", &link, param.execution_option, |store| {
        if let Some(modify) = &action.modify_identifier {
            let name = modify.volume_identifier.identifier_name.clone().unwrap_or_default();
            store.rename_volume(&id, &name)?;
        }
        if let Some(expand) = &action.expand {
            let attr = &expand.volume_attribute;
            store.expand_volume(&id, parse_size(&attr.volume_size)?, attr.capacity_unit)?;
        }
        store.volume(&id).cloned()
    })?;
    info!(volume = %path.id, "volume updated");
    Ok(completed(outcome))
}

pub async fn delete_volume(
    State(app): State<AppState>,
    Path(path): Path<ResourcePath>,
) -> MockResult<Response> {
    let mut state = app.lock();
    state.faults.check(FaultKind::DeleteVolumeError)?;
    path.check(&state)?;
    state.store.delete_volume(&path.id)?;
    info!(volume = %path.id, "volume deleted");
    Ok(no_content())
}

// Iterators

pub async fn iterator_page(
    State(app): State<AppState>,
    Path(path): Path<IteratorPath>,
    Query(page): Query<PageQuery>,
) -> MockResult<Response> {
    let mut state = app.lock();
    state.faults.check(FaultKind::GetVolumeIteratorError)?;
    super::api_version(&path.version)?;
    Ok(ok(state.iterators.page(&path.id, page.from, page.to)?))
}

pub async fn delete_iterator(
    State(app): State<AppState>,
    Path(path): Path<IteratorPath>,
) -> MockResult<Response> {
    let mut state = app.lock();
    super::api_version(&path.version)?;
    state.iterators.delete(&path.id)?;
    Ok(no_content())
}

// Storage groups

pub async fn list_storage_groups(
    State(app): State<AppState>,
    Path(path): Path<ArrayPath>,
) -> MockResult<Response> {
    let mut state = app.lock();
    state.faults.check(FaultKind::GetStorageGroupError)?;
    path.check(&state)?;
    Ok(ok(StorageGroupIdList {
        storage_group_ids: state.store.storage_groups.keys().cloned().collect(),
    }))
}

pub async fn get_storage_group(
    State(app): State<AppState>,
    Path(path): Path<ResourcePath>,
) -> MockResult<Response> {
    let mut state = app.lock();
    state.faults.check(FaultKind::GetStorageGroupError)?;
    path.check(&state)?;
    Ok(ok(state.store.storage_group(&path.id)?))
}

pub async fn create_storage_group(
    State(app): State<AppState>,
    Path(path): Path<ArrayPath>,
    Payload(param): Payload<CreateStorageGroupParam>,
) -> MockResult<Response> {
    let mut state = app.lock();
    state.faults.check(FaultKind::CreateStorageGroupError)?;
    path.check(&state)?;

    let id = param.storage_group_id.clone();
    let slo = param
        .slo_based_params
        .first()
        .map(|p| p.slo_id.clone())
        .unwrap_or_else(|| "None".to_string());
    let link = routes::STORAGE_GROUP.expand(&[&path.version, &path.symid, &id]);
    let outcome = state.execute(
        &path.symid,
        "Create Storage Group",
        &link,
        param.execution_option,
        |store| {
            store.add_storage_group(&id, &param.srp_id, &slo)?;
            store.storage_group(&id).cloned()
        },
    )?;
    info!(storage_group = %id, srp = %param.srp_id, %slo, "storage group created");
    Ok(completed(outcome))
}

/// Applies the one edit the action carries. The response is the group under
/// its (possibly new) name.
pub async fn update_storage_group(
    State(app): State<AppState>,
    Path(path): Path<ResourcePath>,
    Payload(payload): Payload<UpdateStorageGroupPayload>,
) -> MockResult<Response> {
    let mut state = app.lock();
    let action = payload.action;
    let fault = if action.expand.is_some() {
        FaultKind::AddVolumeToStorageGroupError
    } else if action.remove_volume.is_some() {
        FaultKind::RemoveVolumeFromStorageGroupError
    } else {
        FaultKind::UpdateStorageGroupError
    };
    state.faults.check(fault)?;
    let version = path.check(&state)?;
    state.store.storage_group(&path.id)?;

    let new_volumes = match action.expand.as_ref().and_then(|e| e.add_volume.as_ref()) {
        Some(add) => add
            .new_volumes_for(version)
            .map_err(|e| MockError::invalid(e.to_string()))?,
        None => Vec::new(),
    };

    let sg = path.id.clone();
    let target = action
        .rename
        .as_ref()
        .map(|r| r.new_name.clone())
        .unwrap_or_else(|| sg.clone());
    let link = routes::STORAGE_GROUP.expand(&[&path.version, &path.symid, &target]);
    let outcome = state.execute(
        &path.symid,
        "Modify Storage Group",
        &link,
        payload.execution_option,
        |store| {
            if let Some(expand) = &action.expand {
                if !new_volumes.is_empty() {
                    store.create_volumes(&new_volumes, Some(&sg))?;
                }
                if let Some(specific) = &expand.add_specific_volume {
                    for volume in &specific.volume_ids {
                        store.add_volume_to_storage_group(volume, &sg)?;
                    }
                }
            } else if let Some(remove) = &action.remove_volume {
                for volume in &remove.volume_ids {
                    store.remove_volume_from_storage_group(volume, &sg)?;
                }
            } else if let Some(slo) = &action.edit_slo {
                store.set_storage_group_slo(&sg, &slo.slo_id)?;
            } else if let Some(srp) = &action.edit_srp {
                store.set_storage_group_srp(&sg, &srp.srp_id)?;
            } else if let Some(limits) = &action.host_io_limits {
                store.set_host_io_limits(&sg, limits.clone())?;
            } else if let Some(rename) = &action.rename {
                store.rename_storage_group(&sg, &rename.new_name)?;
            } else {
                return Err(MockError::invalid("no storage group action specified"));
            }
            store.storage_group(&target).cloned()
        },
    )?;
    info!(storage_group = %path.id, "storage group updated");
    Ok(completed(outcome))
}

pub async fn delete_storage_group(
    State(app): State<AppState>,
    Path(path): Path<ResourcePath>,
) -> MockResult<Response> {
    let mut state = app.lock();
    state.faults.check(FaultKind::DeleteStorageGroupError)?;
    path.check(&state)?;
    state.store.delete_storage_group(&path.id)?;
    info!(storage_group = %path.id, "storage group deleted");
    Ok(no_content())
}

// Pools and service levels

pub async fn list_srps(
    State(app): State<AppState>,
    Path(path): Path<ArrayPath>,
) -> MockResult<Response> {
    let mut state = app.lock();
    state.faults.check(FaultKind::GetStoragePoolError)?;
    path.check(&state)?;
    Ok(ok(StoragePoolList {
        srp_ids: state.store.srps.keys().cloned().collect(),
    }))
}

pub async fn get_srp(
    State(app): State<AppState>,
    Path(path): Path<ResourcePath>,
) -> MockResult<Response> {
    let mut state = app.lock();
    state.faults.check(FaultKind::GetStoragePoolError)?;
    path.check(&state)?;
    let srp = state
        .store
        .srps
        .get(&path.id)
        .ok_or_else(|| MockError::not_found("Storage Resource Pool", &path.id))?;
    Ok(ok(srp))
}

pub async fn list_service_levels(
    State(app): State<AppState>,
    Path(path): Path<ArrayPath>,
) -> MockResult<Response> {
    let mut state = app.lock();
    state.faults.check(FaultKind::GetServiceLevelError)?;
    path.check(&state)?;
    Ok(ok(ServiceLevelList {
        slo_ids: state.store.service_levels.clone(),
    }))
}

// Masking views

pub async fn list_masking_views(
    State(app): State<AppState>,
    Path(path): Path<ArrayPath>,
) -> MockResult<Response> {
    let mut state = app.lock();
    state.faults.check(FaultKind::GetMaskingViewError)?;
    path.check(&state)?;
    Ok(ok(MaskingViewList {
        masking_view_ids: state.store.masking_views.keys().cloned().collect(),
    }))
}

pub async fn get_masking_view(
    State(app): State<AppState>,
    Path(path): Path<ResourcePath>,
) -> MockResult<Response> {
    let mut state = app.lock();
    state.faults.check(FaultKind::GetMaskingViewError)?;
    path.check(&state)?;
    Ok(ok(state.store.masking_view(&path.id)?))
}

pub async fn create_masking_view(
    State(app): State<AppState>,
    Path(path): Path<ArrayPath>,
    Payload(param): Payload<MaskingViewCreateParam>,
) -> MockResult<Response> {
    let mut state = app.lock();
    state.faults.check(FaultKind::CreateMaskingViewError)?;
    path.check(&state)?;

    let selection = &param.host_or_host_group;
    let (initiator_group, is_host) = match (&selection.use_existing_host, &selection.use_existing_host_group) {
        (Some(host), _) => (host.host_id.as_str(), true),
        (None, Some(group)) => (group.host_group_id.as_str(), false),
        (None, None) => return Err(MockError::invalid("a host or host group is required")),
    };
    state.store.add_masking_view(
        &param.masking_view_id,
        &param.storage_group.use_existing.storage_group_id,
        initiator_group,
        is_host,
        &param.port_group.use_existing.port_group_id,
    )?;
    info!(masking_view = %param.masking_view_id, "masking view created");
    Ok(ok(state.store.masking_view(&param.masking_view_id)?))
}

pub async fn rename_masking_view(
    State(app): State<AppState>,
    Path(path): Path<ResourcePath>,
    Payload(param): Payload<EditMaskingViewParam>,
) -> MockResult<Response> {
    let mut state = app.lock();
    state.faults.check(FaultKind::UpdateMaskingViewError)?;
    path.check(&state)?;
    let new_name = &param.action.rename.new_name;
    state.store.rename_masking_view(&path.id, new_name)?;
    Ok(ok(state.store.masking_view(new_name)?))
}

pub async fn delete_masking_view(
    State(app): State<AppState>,
    Path(path): Path<ResourcePath>,
) -> MockResult<Response> {
    let mut state = app.lock();
    state.faults.check(FaultKind::DeleteMaskingViewError)?;
    path.check(&state)?;
    state.store.delete_masking_view(&path.id)?;
    info!(masking_view = %path.id, "masking view deleted");
    Ok(no_content())
}

pub async fn masking_view_connections(
    State(app): State<AppState>,
    Path(path): Path<ResourcePath>,
) -> MockResult<Response> {
    let mut state = app.lock();
    state.faults.check(FaultKind::GetMaskingViewConnectionsError)?;
    path.check(&state)?;
    Ok(ok(MaskingViewConnections {
        connections: state.store.masking_view_connections(&path.id)?,
    }))
}

// Hosts

pub async fn list_hosts(
    State(app): State<AppState>,
    Path(path): Path<ArrayPath>,
) -> MockResult<Response> {
    let mut state = app.lock();
    state.faults.check(FaultKind::GetHostError)?;
    path.check(&state)?;
    Ok(ok(HostList {
        host_ids: state.store.hosts.keys().cloned().collect(),
    }))
}

pub async fn get_host(
    State(app): State<AppState>,
    Path(path): Path<ResourcePath>,
) -> MockResult<Response> {
    let mut state = app.lock();
    state.faults.check(FaultKind::GetHostError)?;
    path.check(&state)?;
    Ok(ok(state.store.host(&path.id)?))
}

pub async fn create_host(
    State(app): State<AppState>,
    Path(path): Path<ArrayPath>,
    Payload(param): Payload<CreateHostParam>,
) -> MockResult<Response> {
    let mut state = app.lock();
    state.faults.check(FaultKind::CreateHostError)?;
    path.check(&state)?;

    let link = routes::HOST.expand(&[&path.version, &path.symid, &param.host_id]);
    let outcome = state.execute(&path.symid, "Create Host", &link, param.execution_option, |store| {
        store.add_host(&param.host_id, &param.initiator_ids, param.host_flags.as_ref())?;
        store.host(&param.host_id).cloned()
    })?;
    info!(host = %param.host_id, initiators = param.initiator_ids.len(), "host created");
    Ok(completed(outcome))
}

pub async fn update_host(
    State(app): State<AppState>,
    Path(path): Path<ResourcePath>,
    Payload(param): Payload<UpdateHostParam>,
) -> MockResult<Response> {
    let mut state = app.lock();
    state.faults.check(FaultKind::UpdateHostError)?;
    path.check(&state)?;

    let action = param.action;
    let host = path.id.clone();
    let target = action
        .rename
        .as_ref()
        .map(|r| r.new_name.clone())
        .unwrap_or_else(|| host.clone());
    let link = routes::HOST.expand(&[&path.version, &path.symid, &target]);
    let outcome = state.execute(&path.symid, "Modify Host", &link, param.execution_option, |store| {
        if let Some(add) = &action.add_initiator {
            store.add_initiators_to_host(&host, &add.initiators)?;
        } else if let Some(remove) = &action.remove_initiator {
            store.remove_initiators_from_host(&host, &remove.initiators)?;
        } else if let Some(flags) = &action.set_host_flags {
            store.set_host_flags(&host, &flags.host_flags)?;
        } else if let Some(rename) = &action.rename {
            store.rename_host(&host, &rename.new_name)?;
        } else {
            return Err(MockError::invalid("no host action specified"));
        }
        store.host(&target).cloned()
    })?;
    Ok(completed(outcome))
}

pub async fn delete_host(
    State(app): State<AppState>,
    Path(path): Path<ResourcePath>,
) -> MockResult<Response> {
    let mut state = app.lock();
    state.faults.check(FaultKind::DeleteHostError)?;
    path.check(&state)?;
    state.store.delete_host(&path.id)?;
    info!(host = %path.id, "host deleted");
    Ok(no_content())
}

// Host groups

pub async fn list_host_groups(
    State(app): State<AppState>,
    Path(path): Path<ArrayPath>,
) -> MockResult<Response> {
    let mut state = app.lock();
    state.faults.check(FaultKind::GetHostGroupError)?;
    path.check(&state)?;
    Ok(ok(HostGroupList {
        host_group_ids: state.store.host_groups.keys().cloned().collect(),
    }))
}

pub async fn get_host_group(
    State(app): State<AppState>,
    Path(path): Path<ResourcePath>,
) -> MockResult<Response> {
    let mut state = app.lock();
    state.faults.check(FaultKind::GetHostGroupError)?;
    path.check(&state)?;
    Ok(ok(state.store.host_group(&path.id)?))
}

pub async fn create_host_group(
    State(app): State<AppState>,
    Path(path): Path<ArrayPath>,
    Payload(param): Payload<CreateHostGroupParam>,
) -> MockResult<Response> {
    let mut state = app.lock();
    state.faults.check(FaultKind::CreateHostGroupError)?;
    path.check(&state)?;

    let id = param.host_group_id.clone();
    let link = routes::HOST_GROUP.expand(&[&path.version, &path.symid, &id]);
    let outcome = state.execute(
        &path.symid,
        "Create Host Group",
        &link,
        param.execution_option,
        |store| {
            store.add_host_group(&id, &param.host_ids, param.host_flags.as_ref())?;
            store.host_group(&id).cloned()
        },
    )?;
    info!(host_group = %param.host_group_id, "host group created");
    Ok(completed(outcome))
}

pub async fn update_host_group(
    State(app): State<AppState>,
    Path(path): Path<ResourcePath>,
    Payload(param): Payload<UpdateHostGroupParam>,
) -> MockResult<Response> {
    let mut state = app.lock();
    state.faults.check(FaultKind::UpdateHostGroupError)?;
    path.check(&state)?;

    let action = param.action;
    let group = path.id.clone();
    let target = action
        .rename
        .as_ref()
        .map(|r| r.new_name.clone())
        .unwrap_or_else(|| group.clone());
    let link = routes::HOST_GROUP.expand(&[&path.version, &path.symid, &target]);
    let outcome = state.execute(
        &path.symid,
        "Modify Host Group",
        &link,
        param.execution_option,
        |store| {
            if let Some(add) = &action.add_host {
                store.add_hosts_to_host_group(&group, &add.hosts)?;
            } else if let Some(remove) = &action.remove_host {
                store.remove_hosts_from_host_group(&group, &remove.hosts)?;
            } else if let Some(flags) = &action.set_flags {
                store.set_host_group_flags(&group, &flags.host_flags)?;
            } else if let Some(rename) = &action.rename {
                store.rename_host_group(&group, &rename.new_name)?;
            } else {
                return Err(MockError::invalid("no host group action specified"));
            }
            store.host_group(&target).cloned()
        },
    )?;
    Ok(completed(outcome))
}

pub async fn delete_host_group(
    State(app): State<AppState>,
    Path(path): Path<ResourcePath>,
) -> MockResult<Response> {
    let mut state = app.lock();
    state.faults.check(FaultKind::DeleteHostGroupError)?;
    path.check(&state)?;
    state.store.delete_host_group(&path.id)?;
    info!(host_group = %path.id, "host group deleted");
    Ok(no_content())
}

// Initiators

pub async fn list_initiators(
    State(app): State<AppState>,
    Path(path): Path<ArrayPath>,
) -> MockResult<Response> {
    let mut state = app.lock();
    state.faults.check(FaultKind::GetInitiatorError)?;
    path.check(&state)?;
    Ok(ok(InitiatorList {
        initiator_ids: state.store.initiators.keys().cloned().collect(),
    }))
}

pub async fn get_initiator(
    State(app): State<AppState>,
    Path(path): Path<ResourcePath>,
) -> MockResult<Response> {
    let mut state = app.lock();
    state.faults.check(FaultKind::GetInitiatorError)?;
    path.check(&state)?;
    Ok(ok(state.store.initiator(&path.id)?))
}

// Port groups

pub async fn list_port_groups(
    State(app): State<AppState>,
    Path(path): Path<ArrayPath>,
) -> MockResult<Response> {
    let mut state = app.lock();
    state.faults.check(FaultKind::GetPortGroupError)?;
    path.check(&state)?;
    Ok(ok(PortGroupList {
        port_group_ids: state.store.port_groups.keys().cloned().collect(),
    }))
}

pub async fn get_port_group(
    State(app): State<AppState>,
    Path(path): Path<ResourcePath>,
) -> MockResult<Response> {
    let mut state = app.lock();
    state.faults.check(FaultKind::GetPortGroupError)?;
    path.check(&state)?;
    Ok(ok(state.store.port_group(&path.id)?))
}

pub async fn create_port_group(
    State(app): State<AppState>,
    Path(path): Path<ArrayPath>,
    Payload(param): Payload<CreatePortGroupParam>,
) -> MockResult<Response> {
    let mut state = app.lock();
    state.faults.check(FaultKind::CreatePortGroupError)?;
    path.check(&state)?;

    let id = param.port_group_id.clone();
    let link = routes::PORT_GROUP.expand(&[&path.version, &path.symid, &id]);
    let outcome = state.execute(
        &path.symid,
        "Create Port Group",
        &link,
        param.execution_option,
        |store| {
            store.add_port_group(&id, &param.symmetrix_port_keys, &param.protocol)?;
            store.port_group(&id).cloned()
        },
    )?;
    info!(port_group = %param.port_group_id, ports = param.symmetrix_port_keys.len(), "port group created");
    Ok(completed(outcome))
}

pub async fn update_port_group(
    State(app): State<AppState>,
    Path(path): Path<ResourcePath>,
    Payload(param): Payload<EditPortGroupParam>,
) -> MockResult<Response> {
    let mut state = app.lock();
    state.faults.check(FaultKind::UpdatePortGroupError)?;
    path.check(&state)?;

    let action = param.action;
    let group = path.id.clone();
    let target = action
        .rename
        .as_ref()
        .map(|r| r.new_name.clone())
        .unwrap_or_else(|| group.clone());
    let link = routes::PORT_GROUP.expand(&[&path.version, &path.symid, &target]);
    let outcome = state.execute(
        &path.symid,
        "Modify Port Group",
        &link,
        param.execution_option,
        |store| {
            let mut touched = false;
            if let Some(add) = &action.add_port {
                store.add_ports_to_port_group(&group, &add.ports)?;
                touched = true;
            }
            if let Some(remove) = &action.remove_port {
                store.remove_ports_from_port_group(&group, &remove.ports)?;
                touched = true;
            }
            if let Some(rename) = &action.rename {
                store.rename_port_group(&group, &rename.new_name)?;
                touched = true;
            }
            if !touched {
                return Err(MockError::invalid("no port group action specified"));
            }
            store.port_group(&target).cloned()
        },
    )?;
    Ok(completed(outcome))
}

pub async fn delete_port_group(
    State(app): State<AppState>,
    Path(path): Path<ResourcePath>,
) -> MockResult<Response> {
    let mut state = app.lock();
    state.faults.check(FaultKind::DeletePortGroupError)?;
    path.check(&state)?;
    state.store.delete_port_group(&path.id)?;
    info!(port_group = %path.id, "port group deleted");
    Ok(no_content())
}

