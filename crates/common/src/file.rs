//! Unified file (NAS) objects: file systems, NFS exports, NAS servers and
//! file interfaces.

use serde::{Deserialize, Serialize};

/// Entry of every file-family list response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileObjectRef {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileObjectList {
    #[serde(rename = "entries", default)]
    pub entries: Vec<FileObjectRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileSystem {
    pub id: String,
    pub name: String,
    #[serde(rename = "parent_oid", default)]
    pub parent_oid: String,
    #[serde(rename = "storage_wwn", default)]
    pub storage_wwn: String,
    #[serde(rename = "export_fsid", default)]
    pub export_fsid: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "size_total")]
    pub size_total: u64,
    #[serde(rename = "size_used", default)]
    pub size_used: u64,
    #[serde(rename = "service_level", default)]
    pub service_level: String,
    #[serde(rename = "access_policy", default)]
    pub access_policy: String,
    #[serde(rename = "locking_policy", default)]
    pub locking_policy: String,
    #[serde(rename = "nas_server")]
    pub nas_server: String,
    #[serde(rename = "data_reduction", default)]
    pub data_reduction: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateFileSystem {
    pub name: String,
    #[serde(rename = "size_total")]
    pub size_total: u64,
    #[serde(rename = "nas_server")]
    pub nas_server: String,
    #[serde(rename = "service_level", default)]
    pub service_level: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifyFileSystem {
    #[serde(rename = "size_total", default, skip_serializing_if = "Option::is_none")]
    pub size_total: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NfsExport {
    pub id: String,
    pub name: String,
    #[serde(rename = "file_system")]
    pub file_system: String,
    #[serde(default)]
    pub path: String,
    #[serde(rename = "default_access", default)]
    pub default_access: String,
    #[serde(rename = "min_security", default)]
    pub min_security: String,
    #[serde(rename = "read_write_hosts", default)]
    pub read_write_hosts: Vec<String>,
    #[serde(rename = "read_only_hosts", default)]
    pub read_only_hosts: Vec<String>,
    #[serde(rename = "read_write_root_hosts", default)]
    pub read_write_root_hosts: Vec<String>,
    #[serde(rename = "no_access_hosts", default)]
    pub no_access_hosts: Vec<String>,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateNfsExport {
    #[serde(rename = "storageResource")]
    pub file_system: String,
    pub path: String,
    pub name: String,
    #[serde(rename = "default_access", default)]
    pub default_access: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifyNfsExport {
    #[serde(rename = "add_read_write_hosts", default, skip_serializing_if = "Vec::is_empty")]
    pub add_read_write_hosts: Vec<String>,
    #[serde(rename = "remove_read_write_hosts", default, skip_serializing_if = "Vec::is_empty")]
    pub remove_read_write_hosts: Vec<String>,
    #[serde(rename = "add_read_only_hosts", default, skip_serializing_if = "Vec::is_empty")]
    pub add_read_only_hosts: Vec<String>,
    #[serde(rename = "remove_read_only_hosts", default, skip_serializing_if = "Vec::is_empty")]
    pub remove_read_only_hosts: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NasServer {
    pub id: String,
    pub name: String,
    #[serde(rename = "storage_resource_pool", default)]
    pub storage_resource_pool: String,
    #[serde(rename = "operational_status", default)]
    pub operational_status: String,
    #[serde(rename = "primary_node", default)]
    pub primary_node: String,
    #[serde(rename = "backup_node", default)]
    pub backup_node: String,
    #[serde(rename = "file_interfaces", default)]
    pub file_interfaces: Vec<String>,
    #[serde(rename = "preferred_interface_settings", default)]
    pub preferred_interface: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifyNasServer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInterface {
    pub id: String,
    pub name: String,
    #[serde(rename = "nas_server")]
    pub nas_server: String,
    #[serde(rename = "ip_address")]
    pub ip_address: String,
    #[serde(rename = "netmask", default)]
    pub netmask: String,
    #[serde(rename = "gateway", default)]
    pub gateway: String,
    #[serde(rename = "role", default)]
    pub role: String,
    #[serde(rename = "is_disabled", default)]
    pub is_disabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateFileInterface {
    pub name: String,
    #[serde(rename = "nas_server")]
    pub nas_server: String,
    #[serde(rename = "ip_address")]
    pub ip_address: String,
    #[serde(rename = "netmask", default)]
    pub netmask: String,
    #[serde(rename = "gateway", default)]
    pub gateway: String,
}
