use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionDetails {
    pub version: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymmetrixIdList {
    #[serde(rename = "symmetrixId", default)]
    pub symmetrix_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Symmetrix {
    #[serde(rename = "symmetrixId")]
    pub symmetrix_id: String,
    #[serde(rename = "device_count", default)]
    pub device_count: u64,
    #[serde(default)]
    pub ucode: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub local: bool,
    #[serde(rename = "disk_count", default)]
    pub disk_count: u64,
    #[serde(rename = "cache_size_mb", default)]
    pub cache_size_mb: u64,
    #[serde(rename = "system_capacity", default)]
    pub system_capacity: Option<SystemCapacity>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SystemCapacity {
    #[serde(rename = "usable_total_tb", default)]
    pub usable_total_tb: f64,
    #[serde(rename = "usable_used_tb", default)]
    pub usable_used_tb: f64,
    #[serde(rename = "subscribed_total_tb", default)]
    pub subscribed_total_tb: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectorIdList {
    #[serde(rename = "directorId", default)]
    pub director_ids: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortKeyList {
    #[serde(rename = "symmetrixPortKey", default)]
    pub port_keys: Vec<crate::provisioning::PortKey>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymmetrixPort {
    #[serde(rename = "symmetrixPortKey")]
    pub port_key: crate::provisioning::PortKey,
    #[serde(rename = "port_status", default)]
    pub port_status: String,
    #[serde(rename = "type", default)]
    pub port_type: String,
    #[serde(default)]
    pub identifier: String,
    #[serde(rename = "num_of_cores", default)]
    pub num_of_cores: u32,
    #[serde(rename = "ip_addresses", default)]
    pub ip_addresses: Vec<String>,
    #[serde(rename = "num_of_masking_views", default)]
    pub num_of_masking_views: usize,
    #[serde(rename = "num_of_port_groups", default)]
    pub num_of_port_groups: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Port {
    #[serde(rename = "symmetrixPort")]
    pub symmetrix_port: SymmetrixPort,
}
