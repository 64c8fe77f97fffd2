//! File services: file systems, NFS exports, NAS servers and their interfaces.
//!
//! Every file call is synchronous on the array, so none of these handlers
//! goes through the job engine.

use axum::{
    extract::{Path, State},
    response::Response,
};
use common::file::{
    CreateFileInterface, CreateFileSystem, CreateNfsExport, ModifyFileSystem, ModifyNasServer,
    ModifyNfsExport,
};
use tracing::info;

use super::{no_content, ok, AppState, ArrayPath, Payload, ResourcePath};
use crate::error::MockResult;
use crate::faults::FaultKind;

// File systems

pub async fn list_file_systems(
    State(app): State<AppState>,
    Path(path): Path<ArrayPath>,
) -> MockResult<Response> {
    let mut state = app.lock();
    state.faults.check(FaultKind::GetFileSystemError)?;
    path.check(&state)?;
    Ok(ok(state.store.file_system_list()))
}

pub async fn get_file_system(
    State(app): State<AppState>,
    Path(path): Path<ResourcePath>,
) -> MockResult<Response> {
    let mut state = app.lock();
    state.faults.check(FaultKind::GetFileSystemError)?;
    path.check(&state)?;
    Ok(ok(state.store.file_system(&path.id)?))
}

pub async fn create_file_system(
    State(app): State<AppState>,
    Path(path): Path<ArrayPath>,
    Payload(param): Payload<CreateFileSystem>,
) -> MockResult<Response> {
    let mut state = app.lock();
    state.faults.check(FaultKind::CreateFileSystemError)?;
    path.check(&state)?;
    let fs = state.store.create_file_system(&param)?;
    info!(id = %fs.id, name = %fs.name, nas_server = %fs.nas_server, "file system created");
    Ok(ok(fs))
}

pub async fn modify_file_system(
    State(app): State<AppState>,
    Path(path): Path<ResourcePath>,
    Payload(param): Payload<ModifyFileSystem>,
) -> MockResult<Response> {
    let mut state = app.lock();
    state.faults.check(FaultKind::UpdateFileSystemError)?;
    path.check(&state)?;
    state.store.modify_file_system(&path.id, &param)?;
    Ok(ok(state.store.file_system(&path.id)?))
}

pub async fn delete_file_system(
    State(app): State<AppState>,
    Path(path): Path<ResourcePath>,
) -> MockResult<Response> {
    let mut state = app.lock();
    state.faults.check(FaultKind::DeleteFileSystemError)?;
    path.check(&state)?;
    state.store.delete_file_system(&path.id)?;
    info!(id = %path.id, "file system deleted");
    Ok(no_content())
}

// NFS exports

pub async fn list_nfs_exports(
    State(app): State<AppState>,
    Path(path): Path<ArrayPath>,
) -> MockResult<Response> {
    let mut state = app.lock();
    state.faults.check(FaultKind::GetNfsExportError)?;
    path.check(&state)?;
    Ok(ok(state.store.nfs_export_list()))
}

pub async fn get_nfs_export(
    State(app): State<AppState>,
    Path(path): Path<ResourcePath>,
) -> MockResult<Response> {
    let mut state = app.lock();
    state.faults.check(FaultKind::GetNfsExportError)?;
    path.check(&state)?;
    Ok(ok(state.store.nfs_export(&path.id)?))
}

pub async fn create_nfs_export(
    State(app): State<AppState>,
    Path(path): Path<ArrayPath>,
    Payload(param): Payload<CreateNfsExport>,
) -> MockResult<Response> {
    let mut state = app.lock();
    state.faults.check(FaultKind::CreateNfsExportError)?;
    path.check(&state)?;
    let export = state.store.create_nfs_export(&param)?;
    info!(id = %export.id, file_system = %export.file_system, "nfs export created");
    Ok(ok(export))
}

pub async fn modify_nfs_export(
    State(app): State<AppState>,
    Path(path): Path<ResourcePath>,
    Payload(param): Payload<ModifyNfsExport>,
) -> MockResult<Response> {
    let mut state = app.lock();
    state.faults.check(FaultKind::UpdateNfsExportError)?;
    path.check(&state)?;
    state.store.modify_nfs_export(&path.id, &param)?;
    Ok(ok(state.store.nfs_export(&path.id)?))
}

pub async fn delete_nfs_export(
    State(app): State<AppState>,
    Path(path): Path<ResourcePath>,
) -> MockResult<Response> {
    let mut state = app.lock();
    state.faults.check(FaultKind::DeleteNfsExportError)?;
    path.check(&state)?;
    state.store.delete_nfs_export(&path.id)?;
    info!(id = %path.id, "nfs export deleted");
    Ok(no_content())
}

// NAS servers

pub async fn list_nas_servers(
    State(app): State<AppState>,
    Path(path): Path<ArrayPath>,
) -> MockResult<Response> {
    let mut state = app.lock();
    state.faults.check(FaultKind::GetNasServerError)?;
    path.check(&state)?;
    Ok(ok(state.store.nas_server_list()))
}

pub async fn get_nas_server(
    State(app): State<AppState>,
    Path(path): Path<ResourcePath>,
) -> MockResult<Response> {
    let mut state = app.lock();
    state.faults.check(FaultKind::GetNasServerError)?;
    path.check(&state)?;
    Ok(ok(state.store.nas_server(&path.id)?))
}

pub async fn modify_nas_server(
    State(app): State<AppState>,
    Path(path): Path<ResourcePath>,
    Payload(param): Payload<ModifyNasServer>,
) -> MockResult<Response> {
    let mut state = app.lock();
    state.faults.check(FaultKind::UpdateNasServerError)?;
    path.check(&state)?;
    state.store.modify_nas_server(&path.id, &param)?;
    Ok(ok(state.store.nas_server(&path.id)?))
}

pub async fn delete_nas_server(
    State(app): State<AppState>,
    Path(path): Path<ResourcePath>,
) -> MockResult<Response> {
    let mut state = app.lock();
    state.faults.check(FaultKind::DeleteNasServerError)?;
    path.check(&state)?;
    state.store.delete_nas_server(&path.id)?;
    info!(id = %path.id, "nas server deleted");
    Ok(no_content())
}

// File interfaces

pub async fn list_file_interfaces(
    State(app): State<AppState>,
    Path(path): Path<ArrayPath>,
) -> MockResult<Response> {
    let mut state = app.lock();
    state.faults.check(FaultKind::GetFileInterfaceError)?;
    path.check(&state)?;
    Ok(ok(state.store.file_interface_list()))
}

pub async fn get_file_interface(
    State(app): State<AppState>,
    Path(path): Path<ResourcePath>,
) -> MockResult<Response> {
    let mut state = app.lock();
    state.faults.check(FaultKind::GetFileInterfaceError)?;
    path.check(&state)?;
    Ok(ok(state.store.file_interface(&path.id)?))
}

pub async fn create_file_interface(
    State(app): State<AppState>,
    Path(path): Path<ArrayPath>,
    Payload(param): Payload<CreateFileInterface>,
) -> MockResult<Response> {
    let mut state = app.lock();
    state.faults.check(FaultKind::CreateFileInterfaceError)?;
    path.check(&state)?;
    let interface = state.store.create_file_interface(&param)?;
    info!(id = %interface.id, ip = %interface.ip_address, "file interface created");
    Ok(ok(interface))
}
