//! sloprovisioning resources and request payloads.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::version::{AddVolumeParam, ExecutionOption, VolumeIdentifier};

pub const VOLUME_TYPE_TDEV: &str = "TDEV";
pub const VOLUME_TYPE_RDF1_TDEV: &str = "RDF1+TDEV";

/// `director:port` pair identifying a front-end port.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PortKey {
    #[serde(rename = "directorId")]
    pub director_id: String,
    #[serde(rename = "portId")]
    pub port_id: String,
}

impl PortKey {
    pub fn new(director_id: impl Into<String>, port_id: impl Into<String>) -> Self {
        Self {
            director_id: director_id.into(),
            port_id: port_id.into(),
        }
    }

    /// Parse `FA-1D:4`.
    pub fn parse(raw: &str) -> Option<Self> {
        let (dir, port) = raw.split_once(':')?;
        if dir.is_empty() || port.is_empty() {
            return None;
        }
        Some(Self::new(dir, port))
    }
}

impl fmt::Display for PortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.director_id, self.port_id)
    }
}

/// Split the change from `current` to `desired` into ports to add and
/// ports to remove, each in the order they appear in their source list.
pub fn diff_port_keys(current: &[PortKey], desired: &[PortKey]) -> (Vec<PortKey>, Vec<PortKey>) {
    let to_add = desired
        .iter()
        .filter(|k| !current.contains(k))
        .cloned()
        .collect();
    let to_remove = current
        .iter()
        .filter(|k| !desired.contains(k))
        .cloned()
        .collect();
    (to_add, to_remove)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RdfGroupRef {
    #[serde(rename = "rdf_group_number")]
    pub rdf_group_number: u32,
    #[serde(default)]
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Volume {
    #[serde(rename = "volumeId")]
    pub volume_id: String,
    #[serde(rename = "type", default)]
    pub volume_type: String,
    #[serde(default)]
    pub emulation: String,
    #[serde(default)]
    pub ssid: String,
    #[serde(rename = "allocated_percent", default)]
    pub allocated_percent: u32,
    #[serde(rename = "cap_gb", default)]
    pub capacity_gb: f64,
    #[serde(rename = "cap_mb", default)]
    pub capacity_mb: f64,
    #[serde(rename = "cap_cyl", default)]
    pub capacity_cyl: u64,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub reserved: bool,
    #[serde(default)]
    pub pinned: bool,
    #[serde(rename = "volume_identifier", default)]
    pub volume_identifier: String,
    #[serde(default)]
    pub wwn: String,
    #[serde(default)]
    pub encapsulated: bool,
    #[serde(rename = "num_of_storage_groups", default)]
    pub number_of_storage_groups: usize,
    #[serde(rename = "num_of_front_end_paths", default)]
    pub number_of_front_end_paths: usize,
    #[serde(rename = "storageGroupId", default)]
    pub storage_group_ids: Vec<String>,
    #[serde(rename = "rdfGroupId", default)]
    pub rdf_group_ids: Vec<RdfGroupRef>,
    #[serde(rename = "symmetrixPortKey", default)]
    pub symmetrix_port_keys: Vec<PortKey>,
    #[serde(rename = "snapvx_source", default)]
    pub snapvx_source: bool,
    #[serde(rename = "snapvx_target", default)]
    pub snapvx_target: bool,
    #[serde(rename = "mobility_id_enabled", default)]
    pub mobility_id_enabled: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeIdEntry {
    #[serde(rename = "volumeId")]
    pub volume_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeResultList {
    #[serde(rename = "result", default)]
    pub volumes: Vec<VolumeIdEntry>,
    pub from: usize,
    pub to: usize,
}

/// First page of a volume listing plus the handle for the rest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeIterator {
    #[serde(rename = "resultList")]
    pub result_list: VolumeResultList,
    #[serde(default)]
    pub id: String,
    pub count: usize,
    #[serde(rename = "expirationTime", default)]
    pub expiration_time: i64,
    #[serde(rename = "maxPageSize")]
    pub max_page_size: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeHeader {
    #[serde(rename = "volumeId")]
    pub volume_id: String,
    #[serde(rename = "NameModifier", default)]
    pub name_modifier: String,
    #[serde(rename = "FormattedName", default)]
    pub formatted_name: String,
    #[serde(rename = "CapGB", default)]
    pub capacity_gb: f64,
    #[serde(rename = "CapMB", default)]
    pub capacity_mb: f64,
    #[serde(rename = "CapCYL", default)]
    pub capacity_cyl: u64,
    #[serde(rename = "EmulationType", default)]
    pub emulation_type: String,
    #[serde(rename = "Status", default)]
    pub status: String,
    #[serde(rename = "Mapped", default)]
    pub mapped: bool,
    #[serde(rename = "WWN", default)]
    pub wwn: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapVxSession {
    #[serde(rename = "sourceSnapshotGenInfo", default)]
    pub source_snapshots: Vec<SnapshotGenInfo>,
    #[serde(rename = "tgtSrcSnapshotGenInfo", default, skip_serializing_if = "Option::is_none")]
    pub target_source: Option<SnapshotGenInfo>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotGenInfo {
    #[serde(rename = "snapshotHeader")]
    pub header: SnapshotHeader,
    #[serde(rename = "lnkSnapshotGenInfo", default)]
    pub links: Vec<LinkedSnapshotGenInfo>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotHeader {
    pub device: String,
    #[serde(rename = "snapshotName")]
    pub snapshot_name: String,
    pub generation: u32,
    #[serde(rename = "timestamp", default)]
    pub timestamp: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkedSnapshotGenInfo {
    #[serde(rename = "targetDevice")]
    pub target_device: String,
    #[serde(default)]
    pub defined: bool,
    #[serde(default)]
    pub copy: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeFinderInfo {
    #[serde(rename = "snapVXSrc", default)]
    pub snapvx_source: bool,
    #[serde(rename = "snapVXTgt", default)]
    pub snapvx_target: bool,
    #[serde(rename = "snapVXSession", default)]
    pub sessions: Vec<SnapVxSession>,
}

/// Private-API view of a volume with its SnapVX relationships.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeResultPrivate {
    #[serde(rename = "volumeHeader")]
    pub volume_header: VolumeHeader,
    #[serde(rename = "timeFinderInfo")]
    pub time_finder_info: TimeFinderInfo,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostIoLimits {
    #[serde(rename = "host_io_limit_mb_sec", default)]
    pub host_io_limit_mb_sec: String,
    #[serde(rename = "host_io_limit_io_sec", default)]
    pub host_io_limit_io_sec: String,
    #[serde(rename = "dynamicDistribution", default)]
    pub dynamic_distribution: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageGroup {
    #[serde(rename = "storageGroupId")]
    pub storage_group_id: String,
    #[serde(default)]
    pub slo: String,
    #[serde(rename = "service_level", default)]
    pub service_level: String,
    #[serde(rename = "base_slo_name", default)]
    pub base_slo_name: String,
    #[serde(default)]
    pub srp: String,
    #[serde(default)]
    pub workload: String,
    #[serde(rename = "slo_compliance", default)]
    pub slo_compliance: String,
    #[serde(rename = "num_of_vols", default)]
    pub num_of_volumes: usize,
    #[serde(rename = "num_of_child_sgs", default)]
    pub num_of_child_sgs: usize,
    #[serde(rename = "num_of_parent_sgs", default)]
    pub num_of_parent_sgs: usize,
    #[serde(rename = "num_of_masking_views", default)]
    pub num_of_masking_views: usize,
    #[serde(rename = "num_of_snapshots", default)]
    pub num_of_snapshots: usize,
    #[serde(rename = "cap_gb", default)]
    pub capacity_gb: f64,
    #[serde(rename = "device_emulation", default)]
    pub device_emulation: String,
    #[serde(rename = "type", default)]
    pub sg_type: String,
    #[serde(default)]
    pub unprotected: bool,
    #[serde(rename = "child_storage_group", default)]
    pub child_storage_groups: Vec<String>,
    #[serde(rename = "parent_storage_group", default)]
    pub parent_storage_groups: Vec<String>,
    #[serde(rename = "maskingview", default)]
    pub masking_views: Vec<String>,
    #[serde(rename = "hostIOLimit", default, skip_serializing_if = "Option::is_none")]
    pub host_io_limit: Option<HostIoLimits>,
    #[serde(default)]
    pub compression: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageGroupIdList {
    #[serde(rename = "storageGroupId", default)]
    pub storage_group_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SloBasedStorageGroupParam {
    #[serde(rename = "sloId")]
    pub slo_id: String,
    #[serde(rename = "workloadSelection", default)]
    pub workload_selection: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateStorageGroupParam {
    #[serde(rename = "storageGroupId")]
    pub storage_group_id: String,
    #[serde(rename = "srpId")]
    pub srp_id: String,
    #[serde(rename = "sloBasedStorageGroupParam", default)]
    pub slo_based_params: Vec<SloBasedStorageGroupParam>,
    #[serde(rename = "create_empty_storage_group", default)]
    pub create_empty_storage_group: bool,
    #[serde(default)]
    pub emulation: String,
    #[serde(rename = "executionOption", default)]
    pub execution_option: ExecutionOption,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeIdListParam {
    #[serde(rename = "volumeId")]
    pub volume_ids: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpandStorageGroupParam {
    #[serde(rename = "addVolumeParam", default, skip_serializing_if = "Option::is_none")]
    pub add_volume: Option<AddVolumeParam>,
    #[serde(rename = "addSpecificVolumeParam", default, skip_serializing_if = "Option::is_none")]
    pub add_specific_volume: Option<VolumeIdListParam>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditSloParam {
    #[serde(rename = "sloId")]
    pub slo_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditSrpParam {
    #[serde(rename = "srpId")]
    pub srp_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameStorageGroupParam {
    #[serde(rename = "new_storage_group_name")]
    pub new_name: String,
}

/// Exactly one field is expected to be set per request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditStorageGroupActionParam {
    #[serde(rename = "expandStorageGroupParam", default, skip_serializing_if = "Option::is_none")]
    pub expand: Option<ExpandStorageGroupParam>,
    #[serde(rename = "removeVolumeParam", default, skip_serializing_if = "Option::is_none")]
    pub remove_volume: Option<VolumeIdListParam>,
    #[serde(rename = "editStorageGroupSLOParam", default, skip_serializing_if = "Option::is_none")]
    pub edit_slo: Option<EditSloParam>,
    #[serde(rename = "editStorageGroupSRPParam", default, skip_serializing_if = "Option::is_none")]
    pub edit_srp: Option<EditSrpParam>,
    #[serde(rename = "setHostIOLimitsParam", default, skip_serializing_if = "Option::is_none")]
    pub host_io_limits: Option<HostIoLimits>,
    #[serde(rename = "renameStorageGroupParam", default, skip_serializing_if = "Option::is_none")]
    pub rename: Option<RenameStorageGroupParam>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateStorageGroupPayload {
    #[serde(rename = "editStorageGroupActionParam")]
    pub action: EditStorageGroupActionParam,
    #[serde(rename = "executionOption", default)]
    pub execution_option: ExecutionOption,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifyVolumeIdentifierParam {
    #[serde(rename = "volumeIdentifier")]
    pub volume_identifier: VolumeIdentifier,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpandVolumeParam {
    #[serde(rename = "volumeAttribute")]
    pub volume_attribute: crate::version::VolumeAttribute,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditVolumeActionParam {
    #[serde(rename = "modifyVolumeIdentifierParam", default, skip_serializing_if = "Option::is_none")]
    pub modify_identifier: Option<ModifyVolumeIdentifierParam>,
    #[serde(rename = "expandVolumeParam", default, skip_serializing_if = "Option::is_none")]
    pub expand: Option<ExpandVolumeParam>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditVolumeParam {
    #[serde(rename = "editVolumeActionParam")]
    pub action: EditVolumeActionParam,
    #[serde(rename = "executionOption", default)]
    pub execution_option: ExecutionOption,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoragePool {
    #[serde(rename = "srpId")]
    pub srp_id: String,
    #[serde(rename = "total_usable_cap_gb", default)]
    pub usable_capacity_gb: f64,
    #[serde(rename = "total_allocated_cap_gb", default)]
    pub allocated_capacity_gb: f64,
    #[serde(rename = "total_subscribed_cap_gb", default)]
    pub subscribed_capacity_gb: f64,
    #[serde(rename = "reserved_cap_percent", default)]
    pub reserved_cap_percent: u32,
    #[serde(default)]
    pub emulation: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoragePoolList {
    #[serde(rename = "srpId", default)]
    pub srp_ids: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceLevelList {
    #[serde(rename = "sloId", default)]
    pub slo_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaskingView {
    #[serde(rename = "maskingViewId")]
    pub masking_view_id: String,
    #[serde(rename = "hostId", default)]
    pub host_id: String,
    #[serde(rename = "hostGroupId", default)]
    pub host_group_id: String,
    #[serde(rename = "portGroupId")]
    pub port_group_id: String,
    #[serde(rename = "storageGroupId")]
    pub storage_group_id: String,
}

impl MaskingView {
    /// The host or host group this view grants access to.
    pub fn initiator_group(&self) -> &str {
        if self.host_id.is_empty() {
            &self.host_group_id
        } else {
            &self.host_id
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaskingViewList {
    #[serde(rename = "maskingViewId", default)]
    pub masking_view_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UseExistingHostParam {
    #[serde(rename = "hostId")]
    pub host_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UseExistingHostGroupParam {
    #[serde(rename = "hostGroupId")]
    pub host_group_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostOrHostGroupSelection {
    #[serde(rename = "useExistingHostParam", default, skip_serializing_if = "Option::is_none")]
    pub use_existing_host: Option<UseExistingHostParam>,
    #[serde(rename = "useExistingHostGroupParam", default, skip_serializing_if = "Option::is_none")]
    pub use_existing_host_group: Option<UseExistingHostGroupParam>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UseExistingPortGroupParam {
    #[serde(rename = "portGroupId")]
    pub port_group_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortGroupSelection {
    #[serde(rename = "useExistingPortGroupParam")]
    pub use_existing: UseExistingPortGroupParam,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UseExistingStorageGroupParam {
    #[serde(rename = "storageGroupId")]
    pub storage_group_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageGroupSelection {
    #[serde(rename = "useExistingStorageGroupParam")]
    pub use_existing: UseExistingStorageGroupParam,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaskingViewCreateParam {
    #[serde(rename = "maskingViewId")]
    pub masking_view_id: String,
    #[serde(rename = "hostOrHostGroupSelection")]
    pub host_or_host_group: HostOrHostGroupSelection,
    #[serde(rename = "portGroupSelection")]
    pub port_group: PortGroupSelection,
    #[serde(rename = "storageGroupSelection")]
    pub storage_group: StorageGroupSelection,
}

impl MaskingViewCreateParam {
    /// `is_host` selects between a host and a host group for `host_or_group`.
    pub fn new(
        masking_view_id: &str,
        storage_group_id: &str,
        host_or_group: &str,
        is_host: bool,
        port_group_id: &str,
    ) -> Self {
        let host_or_host_group = if is_host {
            HostOrHostGroupSelection {
                use_existing_host: Some(UseExistingHostParam {
                    host_id: host_or_group.to_string(),
                }),
                use_existing_host_group: None,
            }
        } else {
            HostOrHostGroupSelection {
                use_existing_host: None,
                use_existing_host_group: Some(UseExistingHostGroupParam {
                    host_group_id: host_or_group.to_string(),
                }),
            }
        };
        Self {
            masking_view_id: masking_view_id.to_string(),
            host_or_host_group,
            port_group: PortGroupSelection {
                use_existing: UseExistingPortGroupParam {
                    port_group_id: port_group_id.to_string(),
                },
            },
            storage_group: StorageGroupSelection {
                use_existing: UseExistingStorageGroupParam {
                    storage_group_id: storage_group_id.to_string(),
                },
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameMaskingViewParam {
    #[serde(rename = "new_masking_view_name")]
    pub new_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditMaskingViewActionParam {
    #[serde(rename = "renameMaskingViewParam")]
    pub rename: RenameMaskingViewParam,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditMaskingViewParam {
    #[serde(rename = "editMaskingViewActionParam")]
    pub action: EditMaskingViewActionParam,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaskingViewConnection {
    #[serde(rename = "volumeId")]
    pub volume_id: String,
    #[serde(rename = "host_lun_address")]
    pub host_lun_address: String,
    #[serde(rename = "cap_gb")]
    pub capacity_gb: f64,
    #[serde(rename = "initiatorId")]
    pub initiator_id: String,
    #[serde(rename = "alias", default)]
    pub alias: String,
    #[serde(rename = "dir_port")]
    pub dir_port: String,
    #[serde(rename = "logged_in")]
    pub logged_in: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MaskingViewConnections {
    #[serde(rename = "maskingViewConnection", default)]
    pub connections: Vec<MaskingViewConnection>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostFlag {
    #[serde(default)]
    pub enabled: bool,
    #[serde(rename = "override", default)]
    pub override_: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostFlags {
    #[serde(rename = "volume_set_addressing", default)]
    pub volume_set_addressing: HostFlag,
    #[serde(rename = "disable_q_reset_on_ua", default)]
    pub disable_q_reset_on_ua: HostFlag,
    #[serde(rename = "environ_set", default)]
    pub environ_set: HostFlag,
    #[serde(rename = "avoid_reset_broadcast", default)]
    pub avoid_reset_broadcast: HostFlag,
    #[serde(default)]
    pub openvms: HostFlag,
    #[serde(rename = "scsi_3", default)]
    pub scsi_3: HostFlag,
    #[serde(rename = "spc2_protocol_version", default)]
    pub spc2_protocol_version: HostFlag,
    #[serde(rename = "scsi_support1", default)]
    pub scsi_support1: HostFlag,
    #[serde(rename = "consistent_lun", default)]
    pub consistent_lun: bool,
}

impl HostFlags {
    fn named(&self) -> [(&'static str, HostFlag); 8] {
        [
            ("Volume_Set_Addressing(V)", self.volume_set_addressing),
            ("Disable_Q_Reset_on_UA(D)", self.disable_q_reset_on_ua),
            ("Environ_Set(E)", self.environ_set),
            ("Avoid_Reset_Broadcast(ARB)", self.avoid_reset_broadcast),
            ("OpenVMS(OVMS)", self.openvms),
            ("SCSI_3(SC3)", self.scsi_3),
            ("SPC2_Protocol_Version(SPC2)", self.spc2_protocol_version),
            ("SCSI_Support1(OS2007)", self.scsi_support1),
        ]
    }

    /// Comma separated names of overridden flags that are switched on.
    pub fn enabled_flags(&self) -> String {
        self.named()
            .iter()
            .filter(|(_, f)| f.override_ && f.enabled)
            .map(|(n, _)| *n)
            .collect::<Vec<_>>()
            .join(",")
    }

    pub fn disabled_flags(&self) -> String {
        self.named()
            .iter()
            .filter(|(_, f)| f.override_ && !f.enabled)
            .map(|(n, _)| *n)
            .collect::<Vec<_>>()
            .join(",")
    }

    pub fn any_override(&self) -> bool {
        self.named().iter().any(|(_, f)| f.override_)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Host {
    #[serde(rename = "hostId")]
    pub host_id: String,
    #[serde(rename = "num_of_masking_views", default)]
    pub num_of_masking_views: usize,
    #[serde(rename = "num_of_initiators", default)]
    pub num_of_initiators: usize,
    #[serde(rename = "num_of_host_groups", default)]
    pub num_of_host_groups: usize,
    #[serde(rename = "port_flags_override", default)]
    pub port_flags_override: bool,
    #[serde(rename = "consistent_lun", default)]
    pub consistent_lun: bool,
    #[serde(rename = "enabled_flags", default)]
    pub enabled_flags: String,
    #[serde(rename = "disabled_flags", default)]
    pub disabled_flags: String,
    #[serde(rename = "type", default)]
    pub host_type: String,
    #[serde(rename = "initiator", default)]
    pub initiators: Vec<String>,
    #[serde(rename = "maskingview", default)]
    pub masking_views: Vec<String>,
    #[serde(rename = "hostGroup", default)]
    pub host_groups: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostList {
    #[serde(rename = "hostId", default)]
    pub host_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateHostParam {
    #[serde(rename = "hostId")]
    pub host_id: String,
    #[serde(rename = "initiatorId", default)]
    pub initiator_ids: Vec<String>,
    #[serde(rename = "hostFlags", default, skip_serializing_if = "Option::is_none")]
    pub host_flags: Option<HostFlags>,
    #[serde(rename = "executionOption", default)]
    pub execution_option: ExecutionOption,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitiatorListParam {
    #[serde(rename = "initiator")]
    pub initiators: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetHostFlagsParam {
    #[serde(rename = "hostFlags")]
    pub host_flags: HostFlags,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameHostParam {
    #[serde(rename = "new_host_name")]
    pub new_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditHostActionParam {
    #[serde(rename = "addInitiatorParam", default, skip_serializing_if = "Option::is_none")]
    pub add_initiator: Option<InitiatorListParam>,
    #[serde(rename = "removeInitiatorParam", default, skip_serializing_if = "Option::is_none")]
    pub remove_initiator: Option<InitiatorListParam>,
    #[serde(rename = "setHostFlagsParam", default, skip_serializing_if = "Option::is_none")]
    pub set_host_flags: Option<SetHostFlagsParam>,
    #[serde(rename = "renameHostParam", default, skip_serializing_if = "Option::is_none")]
    pub rename: Option<RenameHostParam>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateHostParam {
    #[serde(rename = "editHostActionParam")]
    pub action: EditHostActionParam,
    #[serde(rename = "executionOption", default)]
    pub execution_option: ExecutionOption,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostSummary {
    #[serde(rename = "hostId")]
    pub host_id: String,
    #[serde(rename = "initiator", default)]
    pub initiators: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostGroup {
    #[serde(rename = "hostGroupId")]
    pub host_group_id: String,
    #[serde(rename = "num_of_hosts", default)]
    pub num_of_hosts: usize,
    #[serde(rename = "num_of_initiators", default)]
    pub num_of_initiators: usize,
    #[serde(rename = "num_of_masking_views", default)]
    pub num_of_masking_views: usize,
    #[serde(rename = "port_flags_override", default)]
    pub port_flags_override: bool,
    #[serde(rename = "consistent_lun", default)]
    pub consistent_lun: bool,
    #[serde(rename = "enabled_flags", default)]
    pub enabled_flags: String,
    #[serde(rename = "disabled_flags", default)]
    pub disabled_flags: String,
    #[serde(rename = "type", default)]
    pub host_group_type: String,
    #[serde(rename = "host", default)]
    pub hosts: Vec<HostSummary>,
    #[serde(rename = "maskingview", default)]
    pub masking_views: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostGroupList {
    #[serde(rename = "hostGroupId", default)]
    pub host_group_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateHostGroupParam {
    #[serde(rename = "hostGroupId")]
    pub host_group_id: String,
    #[serde(rename = "hostId", default)]
    pub host_ids: Vec<String>,
    #[serde(rename = "hostFlags", default, skip_serializing_if = "Option::is_none")]
    pub host_flags: Option<HostFlags>,
    #[serde(rename = "executionOption", default)]
    pub execution_option: ExecutionOption,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostListParam {
    #[serde(rename = "host")]
    pub hosts: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameHostGroupParam {
    #[serde(rename = "new_host_group_name")]
    pub new_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditHostGroupActionParam {
    #[serde(rename = "addHostParam", default, skip_serializing_if = "Option::is_none")]
    pub add_host: Option<HostListParam>,
    #[serde(rename = "removeHostParam", default, skip_serializing_if = "Option::is_none")]
    pub remove_host: Option<HostListParam>,
    #[serde(rename = "renameHostGroupParam", default, skip_serializing_if = "Option::is_none")]
    pub rename: Option<RenameHostGroupParam>,
    #[serde(rename = "setHostGroupFlagsParam", default, skip_serializing_if = "Option::is_none")]
    pub set_flags: Option<SetHostFlagsParam>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateHostGroupParam {
    #[serde(rename = "editHostGroupActionParam")]
    pub action: EditHostGroupActionParam,
    #[serde(rename = "executionOption", default)]
    pub execution_option: ExecutionOption,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Initiator {
    #[serde(rename = "initiatorId")]
    pub initiator_id: String,
    #[serde(rename = "symmetrixPortKey", default)]
    pub symmetrix_port_keys: Vec<PortKey>,
    #[serde(rename = "type", default)]
    pub initiator_type: String,
    #[serde(rename = "fcid", default)]
    pub fcid: String,
    #[serde(rename = "ip_address", default)]
    pub ip_address: String,
    #[serde(default)]
    pub host: String,
    #[serde(rename = "hostGroup", default)]
    pub host_groups: Vec<String>,
    #[serde(rename = "maskingview", default)]
    pub masking_views: Vec<String>,
    #[serde(rename = "num_of_masking_views", default)]
    pub num_of_masking_views: usize,
    #[serde(rename = "num_of_host_groups", default)]
    pub num_of_host_groups: usize,
    #[serde(rename = "logged_in", default)]
    pub logged_in: bool,
    #[serde(rename = "on_fabric", default)]
    pub on_fabric: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitiatorList {
    #[serde(rename = "initiatorId", default)]
    pub initiator_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortGroup {
    #[serde(rename = "portGroupId")]
    pub port_group_id: String,
    #[serde(rename = "symmetrixPortKey", default)]
    pub symmetrix_port_keys: Vec<PortKey>,
    #[serde(rename = "num_of_ports", default)]
    pub num_of_ports: usize,
    #[serde(rename = "num_of_masking_views", default)]
    pub num_of_masking_views: usize,
    #[serde(rename = "type", default)]
    pub port_group_type: String,
    #[serde(rename = "maskingview", default)]
    pub masking_views: Vec<String>,
    #[serde(rename = "port_group_protocol", default)]
    pub protocol: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortGroupList {
    #[serde(rename = "portGroupId", default)]
    pub port_group_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatePortGroupParam {
    #[serde(rename = "portGroupId")]
    pub port_group_id: String,
    #[serde(rename = "symmetrixPortKey", default)]
    pub symmetrix_port_keys: Vec<PortKey>,
    #[serde(rename = "port_group_protocol", default)]
    pub protocol: String,
    #[serde(rename = "executionOption", default)]
    pub execution_option: ExecutionOption,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortListParam {
    #[serde(rename = "port")]
    pub ports: Vec<PortKey>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenamePortGroupParam {
    #[serde(rename = "new_port_group_name")]
    pub new_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditPortGroupActionParam {
    #[serde(rename = "addPortParam", default, skip_serializing_if = "Option::is_none")]
    pub add_port: Option<PortListParam>,
    #[serde(rename = "removePortParam", default, skip_serializing_if = "Option::is_none")]
    pub remove_port: Option<PortListParam>,
    #[serde(rename = "renamePortGroupParam", default, skip_serializing_if = "Option::is_none")]
    pub rename: Option<RenamePortGroupParam>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditPortGroupParam {
    #[serde(rename = "editPortGroupActionParam")]
    pub action: EditPortGroupActionParam,
    #[serde(rename = "executionOption", default)]
    pub execution_option: ExecutionOption,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_key_parse_and_display() {
        let key = PortKey::parse("FA-1D:4").unwrap();
        assert_eq!(key, PortKey::new("FA-1D", "4"));
        assert_eq!(key.to_string(), "FA-1D:4");
        assert!(PortKey::parse("FA-1D").is_none());
        assert!(PortKey::parse(":4").is_none());
    }

    #[test]
    fn diff_port_keys_splits_adds_and_removes() {
        let current = vec![PortKey::new("FA-1D", "4"), PortKey::new("FA-2D", "4")];
        let desired = vec![PortKey::new("FA-2D", "4"), PortKey::new("FA-1D", "5")];
        let (add, remove) = diff_port_keys(&current, &desired);
        assert_eq!(add, vec![PortKey::new("FA-1D", "5")]);
        assert_eq!(remove, vec![PortKey::new("FA-1D", "4")]);

        let (add, remove) = diff_port_keys(&desired, &desired);
        assert!(add.is_empty() && remove.is_empty());
    }

    #[test]
    fn host_flag_strings_only_list_overrides() {
        let flags = HostFlags {
            volume_set_addressing: HostFlag {
                enabled: true,
                override_: true,
            },
            scsi_3: HostFlag {
                enabled: false,
                override_: true,
            },
            openvms: HostFlag {
                enabled: true,
                override_: false,
            },
            ..HostFlags::default()
        };
        assert_eq!(flags.enabled_flags(), "Volume_Set_Addressing(V)");
        assert_eq!(flags.disabled_flags(), "SCSI_3(SC3)");
        assert!(flags.any_override());
    }

    #[test]
    fn masking_view_param_selects_host_or_group() {
        let by_host = MaskingViewCreateParam::new("mv1", "sg1", "h1", true, "pg1");
        let json = serde_json::to_value(&by_host).unwrap();
        assert_eq!(json["hostOrHostGroupSelection"]["useExistingHostParam"]["hostId"], "h1");
        assert!(json["hostOrHostGroupSelection"]
            .get("useExistingHostGroupParam")
            .is_none());

        let by_group = MaskingViewCreateParam::new("mv1", "sg1", "hg1", false, "pg1");
        assert_eq!(
            by_group
                .host_or_host_group
                .use_existing_host_group
                .unwrap()
                .host_group_id,
            "hg1"
        );
    }
}
