//! SRDF replication, SnapVX snapshots and snapshot policies.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::version::ExecutionOption;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RdfMode {
    Asynchronous,
    Active,
    Synchronous,
}

impl RdfMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RdfMode::Asynchronous => "Asynchronous",
            RdfMode::Active => "Active",
            RdfMode::Synchronous => "Synchronous",
        }
    }
}

impl fmt::Display for RdfMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pair state as reported in `states` / `rdfpairState`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RdfPairState {
    Consistent,
    Suspended,
    #[serde(rename = "Failed Over")]
    FailedOver,
}

impl RdfPairState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RdfPairState::Consistent => "Consistent",
            RdfPairState::Suspended => "Suspended",
            RdfPairState::FailedOver => "Failed Over",
        }
    }
}

impl fmt::Display for RdfPairState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Named actions accepted by the SG RDF modify call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RdfAction {
    Establish,
    Suspend,
    Resume,
    Failback,
    Failover,
    Swap,
}

impl RdfAction {
    /// Pair state the array settles in after this action.
    pub fn resulting_state(&self) -> RdfPairState {
        match self {
            RdfAction::Establish
            | RdfAction::Resume
            | RdfAction::Failback
            | RdfAction::Swap => RdfPairState::Consistent,
            RdfAction::Suspend => RdfPairState::Suspended,
            RdfAction::Failover => RdfPairState::FailedOver,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RdfAction::Establish => "Establish",
            RdfAction::Suspend => "Suspend",
            RdfAction::Resume => "Resume",
            RdfAction::Failback => "Failback",
            RdfAction::Failover => "Failover",
            RdfAction::Swap => "Swap",
        }
    }
}

impl FromStr for RdfAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Establish" => Ok(RdfAction::Establish),
            "Suspend" => Ok(RdfAction::Suspend),
            "Resume" => Ok(RdfAction::Resume),
            "Failback" => Ok(RdfAction::Failback),
            "Failover" => Ok(RdfAction::Failover),
            "Swap" => Ok(RdfAction::Swap),
            other => Err(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RdfGroup {
    #[serde(rename = "rdfgNumber")]
    pub rdfg_number: u32,
    #[serde(default)]
    pub label: String,
    #[serde(rename = "remoteRdfgNumber")]
    pub remote_rdfg_number: u32,
    #[serde(rename = "remoteSymmetrix")]
    pub remote_symmetrix: String,
    #[serde(rename = "numDevices", default)]
    pub num_devices: usize,
    #[serde(rename = "totalDeviceCapacity", default)]
    pub total_device_capacity: f64,
    #[serde(rename = "localPorts", default)]
    pub local_ports: Vec<String>,
    #[serde(rename = "remotePorts", default)]
    pub remote_ports: Vec<String>,
    #[serde(default)]
    pub modes: Vec<String>,
    #[serde(rename = "type", default)]
    pub group_type: String,
    #[serde(default)]
    pub metro: bool,
    #[serde(rename = "async", default)]
    pub async_mode: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RdfGroupEntry {
    #[serde(rename = "rdfgNumber")]
    pub rdfg_number: u32,
    #[serde(default)]
    pub label: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RdfGroupList {
    #[serde(rename = "rdfGroupCount", default)]
    pub count: usize,
    #[serde(rename = "rdfGroupID", default)]
    pub groups: Vec<RdfGroupEntry>,
}

/// The replication facet of a storage group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RdfStorageGroup {
    pub name: String,
    #[serde(rename = "symmetrixId")]
    pub symmetrix_id: String,
    #[serde(rename = "snapVXSnapShots", default)]
    pub snapvx_snapshots: Vec<String>,
    #[serde(rename = "numSnapVXSnapshots", default)]
    pub num_snapvx_snapshots: usize,
    #[serde(default)]
    pub rdf: bool,
    #[serde(rename = "numDevicesNonGk", default)]
    pub num_devices_non_gk: usize,
    #[serde(rename = "capacity_gb", default)]
    pub capacity_gb: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SgRdfInfo {
    #[serde(rename = "storageGroupName", default)]
    pub storage_group_name: String,
    #[serde(rename = "symmetrixId", default)]
    pub symmetrix_id: String,
    #[serde(rename = "rdfGroupNumber")]
    pub rdf_group_number: u32,
    #[serde(rename = "volumeRdfTypes", default)]
    pub volume_rdf_types: Vec<String>,
    #[serde(default)]
    pub states: Vec<String>,
    #[serde(default)]
    pub modes: Vec<String>,
    #[serde(rename = "largerRdfSides", default)]
    pub larger_rdf_sides: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SgRdfGroupList {
    #[serde(rename = "rdfgs", default)]
    pub rdf_groups: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RdfDevicePair {
    #[serde(rename = "remoteVolumeName")]
    pub remote_volume_name: String,
    #[serde(rename = "localVolumeName")]
    pub local_volume_name: String,
    #[serde(rename = "remoteSymmetrixId")]
    pub remote_symmetrix_id: String,
    #[serde(rename = "localSymmetrixId")]
    pub local_symmetrix_id: String,
    #[serde(rename = "localRdfGroupNumber")]
    pub local_rdf_group_number: u32,
    #[serde(rename = "remoteRdfGroupNumber")]
    pub remote_rdf_group_number: u32,
    #[serde(rename = "rdfMode")]
    pub rdf_mode: String,
    #[serde(rename = "rdfpairState")]
    pub rdf_pair_state: String,
    #[serde(rename = "localVolumeState", default)]
    pub local_volume_state: String,
    #[serde(rename = "remoteVolumeState", default)]
    pub remote_volume_state: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateSgSrdf {
    #[serde(rename = "remoteSymmId")]
    pub remote_symmetrix_id: String,
    #[serde(rename = "replicationMode")]
    pub replication_mode: RdfMode,
    #[serde(rename = "remoteStorageGroupName", default)]
    pub remote_storage_group_name: String,
    #[serde(rename = "remoteSLO", default)]
    pub remote_slo: String,
    #[serde(rename = "rdfgNumber")]
    pub rdfg_number: u32,
    #[serde(default)]
    pub establish: bool,
    #[serde(rename = "executionOption", default)]
    pub execution_option: ExecutionOption,
}

/// `action` is kept as a string so an unrecognised action reaches the array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifySgRdfGroup {
    pub action: String,
    #[serde(rename = "executionOption", default)]
    pub execution_option: ExecutionOption,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreeRdfGroupNumbers {
    #[serde(rename = "freeRdfgNumbersLocal", default)]
    pub local: Vec<u32>,
    #[serde(rename = "freeRdfgNumbersRemote", default)]
    pub remote: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymmetrixCapability {
    #[serde(rename = "symmetrixId")]
    pub symmetrix_id: String,
    #[serde(rename = "snapVxCapable")]
    pub snapvx_capable: bool,
    #[serde(rename = "rdfCapable")]
    pub rdf_capable: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymReplicationCapabilities {
    #[serde(rename = "symmetrixCapability", default)]
    pub capabilities: Vec<SymmetrixCapability>,
}

// SnapVX

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeName {
    pub name: String,
}

impl VolumeName {
    pub fn list<S: AsRef<str>>(ids: &[S]) -> Vec<VolumeName> {
        ids.iter()
            .map(|id| VolumeName {
                name: id.as_ref().to_string(),
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateVolumesSnapshot {
    #[serde(rename = "deviceNameListSource")]
    pub source_volumes: Vec<VolumeName>,
    #[serde(rename = "bothSides", default)]
    pub both_sides: bool,
    #[serde(default)]
    pub star: bool,
    #[serde(default)]
    pub force: bool,
    #[serde(rename = "timeToLive", default)]
    pub time_to_live: u32,
    #[serde(rename = "timeInHours", default)]
    pub time_in_hours: bool,
    #[serde(rename = "executionOption", default)]
    pub execution_option: ExecutionOption,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SnapshotAction {
    Link,
    Unlink,
    Rename,
    Restore,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifyVolumeSnapshot {
    #[serde(rename = "deviceNameListSource")]
    pub source_volumes: Vec<VolumeName>,
    #[serde(rename = "deviceNameListTarget", default)]
    pub target_volumes: Vec<VolumeName>,
    #[serde(default)]
    pub force: bool,
    #[serde(default)]
    pub star: bool,
    #[serde(default)]
    pub exact: bool,
    #[serde(default)]
    pub copy: bool,
    #[serde(default)]
    pub remote: bool,
    #[serde(default)]
    pub symforce: bool,
    pub action: SnapshotAction,
    #[serde(rename = "newsnapshotname", default)]
    pub new_snapshot_name: String,
    #[serde(default)]
    pub generation: u32,
    #[serde(rename = "executionOption", default)]
    pub execution_option: ExecutionOption,
}

impl ModifyVolumeSnapshot {
    pub fn new(action: SnapshotAction, sources: &[String], targets: &[String]) -> Self {
        Self {
            source_volumes: VolumeName::list(sources),
            target_volumes: VolumeName::list(targets),
            force: false,
            star: false,
            exact: false,
            copy: false,
            remote: false,
            symforce: false,
            action,
            new_snapshot_name: String::new(),
            generation: 0,
            execution_option: ExecutionOption::Synchronous,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteVolumeSnapshot {
    #[serde(rename = "deviceNameListSource")]
    pub source_volumes: Vec<VolumeName>,
    #[serde(default)]
    pub symforce: bool,
    #[serde(default)]
    pub star: bool,
    #[serde(default)]
    pub force: bool,
    #[serde(default)]
    pub restore: bool,
    #[serde(default)]
    pub generation: u32,
    #[serde(rename = "executionOption", default)]
    pub execution_option: ExecutionOption,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeSnapshotLink {
    #[serde(rename = "targetDevice")]
    pub target_device: String,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub defined: bool,
    #[serde(default)]
    pub copy: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeSnapshotSource {
    #[serde(rename = "snapshotName")]
    pub snapshot_name: String,
    pub generation: u32,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub state: String,
    #[serde(rename = "linkedDevices", default)]
    pub linked_volumes: Vec<VolumeSnapshotLink>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeSnapshot {
    #[serde(rename = "deviceName")]
    pub device_name: String,
    #[serde(rename = "snapshotName")]
    pub snapshot_name: String,
    #[serde(rename = "snapshotSrc", default)]
    pub sources: Vec<VolumeSnapshotSource>,
    #[serde(rename = "snapshotLnk", default)]
    pub links: Vec<VolumeSnapshotLink>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotNameList {
    #[serde(rename = "deviceName")]
    pub device_name: String,
    #[serde(rename = "snapshotName", default)]
    pub snapshot_names: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotGenerationList {
    #[serde(rename = "deviceName")]
    pub device_name: String,
    #[serde(rename = "snapshotName")]
    pub snapshot_name: String,
    #[serde(rename = "generation", default)]
    pub generations: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotRef {
    pub name: String,
    pub generation: u32,
}

/// Private-API summary of a volume's SnapVX role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymVolume {
    pub name: String,
    #[serde(rename = "snapshot", default)]
    pub snapshots: Vec<SnapshotRef>,
    #[serde(rename = "snapvx_source", default)]
    pub snapvx_source: bool,
    #[serde(rename = "snapvx_target", default)]
    pub snapvx_target: bool,
}

// Snapshot policies

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotPolicy {
    #[serde(rename = "snapshot_policy_name")]
    pub name: String,
    #[serde(rename = "symmetrixID", default)]
    pub symmetrix_id: String,
    #[serde(rename = "interval_minutes")]
    pub interval_minutes: u32,
    #[serde(rename = "offset_minutes", default)]
    pub offset_minutes: u32,
    #[serde(rename = "snapshot_count")]
    pub snapshot_count: u32,
    #[serde(rename = "compliance_count_warning", default)]
    pub compliance_count_warning: u32,
    #[serde(rename = "compliance_count_critical", default)]
    pub compliance_count_critical: u32,
    #[serde(default)]
    pub secure: bool,
    #[serde(default)]
    pub suspended: bool,
    #[serde(rename = "storage_group_count", default)]
    pub storage_group_count: usize,
    #[serde(rename = "storage_groups", default)]
    pub storage_groups: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotPolicyList {
    #[serde(rename = "name", default)]
    pub names: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateSnapshotPolicyParam {
    #[serde(rename = "snapshot_policy_name")]
    pub name: String,
    #[serde(rename = "interval")]
    pub interval: String,
    #[serde(rename = "offset_mins", default)]
    pub offset_minutes: u32,
    #[serde(rename = "snapshot_count")]
    pub snapshot_count: u32,
    #[serde(rename = "compliance_count_warning", default)]
    pub compliance_count_warning: u32,
    #[serde(rename = "compliance_count_critical", default)]
    pub compliance_count_critical: u32,
    #[serde(default)]
    pub secure: bool,
}

/// Parse the Unisphere interval strings (`10 Minutes`, `1 Hour`, `1 Day`...).
pub fn parse_interval_minutes(raw: &str) -> Option<u32> {
    let mut parts = raw.split_whitespace();
    let value: u32 = parts.next()?.parse().ok()?;
    let unit = parts.next()?.to_ascii_lowercase();
    let factor = match unit.trim_end_matches('s') {
        "minute" => 1,
        "hour" => 60,
        "day" => 24 * 60,
        "week" => 7 * 24 * 60,
        _ => return None,
    };
    Some(value * factor)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SnapshotPolicyAction {
    Modify,
    Suspend,
    Resume,
    AssociateToStorageGroups,
    DisassociateFromStorageGroups,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifySnapshotPolicyParam {
    #[serde(rename = "snapshot_policy_name", default, skip_serializing_if = "Option::is_none")]
    pub new_name: Option<String>,
    #[serde(rename = "interval", default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<String>,
    #[serde(rename = "snapshot_count", default, skip_serializing_if = "Option::is_none")]
    pub snapshot_count: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageGroupNameListParam {
    #[serde(rename = "storage_group_name")]
    pub storage_group_names: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateSnapshotPolicyParam {
    pub action: SnapshotPolicyAction,
    #[serde(rename = "modify", default, skip_serializing_if = "Option::is_none")]
    pub modify: Option<ModifySnapshotPolicyParam>,
    #[serde(rename = "associate_to_storage_group_param", default, skip_serializing_if = "Option::is_none")]
    pub associate: Option<StorageGroupNameListParam>,
    #[serde(rename = "disassociate_from_storage_group_param", default, skip_serializing_if = "Option::is_none")]
    pub disassociate: Option<StorageGroupNameListParam>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn action_table() {
        assert_eq!(RdfAction::Establish.resulting_state(), RdfPairState::Consistent);
        assert_eq!(RdfAction::Suspend.resulting_state(), RdfPairState::Suspended);
        assert_eq!(RdfAction::Resume.resulting_state(), RdfPairState::Consistent);
        assert_eq!(RdfAction::Failback.resulting_state(), RdfPairState::Consistent);
        assert_eq!(RdfAction::Failover.resulting_state(), RdfPairState::FailedOver);
        assert_eq!(RdfAction::Swap.resulting_state(), RdfPairState::Consistent);
        assert!("Pause".parse::<RdfAction>().is_err());
    }

    #[test]
    fn failed_over_serializes_with_space() {
        assert_eq!(
            serde_json::to_value(RdfPairState::FailedOver).unwrap(),
            json!("Failed Over")
        );
    }

    #[test]
    fn intervals() {
        assert_eq!(parse_interval_minutes("10 Minutes"), Some(10));
        assert_eq!(parse_interval_minutes("1 Hour"), Some(60));
        assert_eq!(parse_interval_minutes("2 Days"), Some(2880));
        assert_eq!(parse_interval_minutes("soon"), None);
    }
}
