//! REST API versions and the payloads whose shape depends on them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ApiVersion {
    V90,
    V91,
    V100,
}

impl ApiVersion {
    /// Path tag as it appears in `/univmax/restapi/{version}/...`.
    pub fn tag(&self) -> &'static str {
        match self {
            ApiVersion::V90 => "90",
            ApiVersion::V91 => "91",
            ApiVersion::V100 => "100",
        }
    }

    /// V91 and later put the volume identifier inside each volume attribute.
    pub fn uses_attribute_list(&self) -> bool {
        *self >= ApiVersion::V91
    }
}

impl Default for ApiVersion {
    fn default() -> Self {
        ApiVersion::V100
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported API version: {0}")]
pub struct UnsupportedVersion(pub String);

impl FromStr for ApiVersion {
    type Err = UnsupportedVersion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "90" => Ok(ApiVersion::V90),
            "91" => Ok(ApiVersion::V91),
            "100" => Ok(ApiVersion::V100),
            other => Err(UnsupportedVersion(other.to_string())),
        }
    }
}

/// How the array should run a mutating request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionOption {
    #[default]
    Synchronous,
    Asynchronous,
}

impl ExecutionOption {
    pub fn is_async(&self) -> bool {
        matches!(self, ExecutionOption::Asynchronous)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CapacityUnit {
    #[default]
    #[serde(rename = "CYL")]
    Cyl,
    #[serde(rename = "MB")]
    Mb,
    #[serde(rename = "GB")]
    Gb,
    #[serde(rename = "TB")]
    Tb,
}

/// One cylinder is 15 tracks of 128 KiB.
pub const MB_PER_CYL: f64 = 1.875;

impl CapacityUnit {
    /// Convert `size` in this unit to whole cylinders, rounding up.
    pub fn to_cylinders(&self, size: u64) -> u64 {
        let mb = match self {
            CapacityUnit::Cyl => return size,
            CapacityUnit::Mb => size as f64,
            CapacityUnit::Gb => size as f64 * 1024.0,
            CapacityUnit::Tb => size as f64 * 1024.0 * 1024.0,
        };
        (mb / MB_PER_CYL).ceil() as u64
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeIdentifier {
    #[serde(rename = "volumeIdentifierChoice")]
    pub choice: String,
    #[serde(rename = "identifier_name", default, skip_serializing_if = "Option::is_none")]
    pub identifier_name: Option<String>,
}

impl VolumeIdentifier {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            choice: "identifier_name".to_string(),
            identifier_name: Some(name.into()),
        }
    }
}

/// `volumeAttribute` entry of an add-volume request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeAttribute {
    #[serde(rename = "num_of_vols", default, skip_serializing_if = "Option::is_none")]
    pub num_of_vols: Option<u32>,
    #[serde(rename = "volumeIdentifier", default, skip_serializing_if = "Option::is_none")]
    pub volume_identifier: Option<VolumeIdentifier>,
    #[serde(rename = "capacityUnit")]
    pub capacity_unit: CapacityUnit,
    /// Sent as a string by Unisphere.
    pub volume_size: String,
}

/// V90 shape: one attribute, identifier and count at the top level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddVolumeParamV90 {
    #[serde(rename = "num_of_vols")]
    pub num_of_vols: u32,
    #[serde(rename = "volumeAttribute")]
    pub volume_attribute: VolumeAttribute,
    #[serde(default)]
    pub create_new_volumes: bool,
    #[serde(default = "default_emulation")]
    pub emulation: String,
    #[serde(rename = "volumeIdentifier", default, skip_serializing_if = "Option::is_none")]
    pub volume_identifier: Option<VolumeIdentifier>,
}

/// V91+ shape: a list of attributes, each carrying its own identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddVolumeParamV91 {
    #[serde(rename = "volumeAttributes")]
    pub volume_attributes: Vec<VolumeAttribute>,
    #[serde(default)]
    pub create_new_volumes: bool,
    #[serde(default = "default_emulation")]
    pub emulation: String,
}

fn default_emulation() -> String {
    "FBA".to_string()
}

/// Versioned add-volume payload. The client picks the variant from its API
/// version; the mock accepts either and checks it against the path tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AddVolumeParam {
    V91(AddVolumeParamV91),
    V90(AddVolumeParamV90),
}

/// Flattened description of volumes to create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewVolumeSpec {
    pub identifier: Option<String>,
    pub size: u64,
    pub unit: CapacityUnit,
    pub count: u32,
    pub emulation: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PayloadError {
    #[error("invalid volume size '{0}'")]
    InvalidSize(String),
    #[error("add volume payload shape does not match API version {0}")]
    VersionMismatch(ApiVersion),
}

impl AddVolumeParam {
    /// Build a single-volume request in the shape `version` expects.
    pub fn single(version: ApiVersion, identifier: &str, size: u64, unit: CapacityUnit) -> Self {
        let identifier = (!identifier.is_empty()).then(|| VolumeIdentifier::named(identifier));
        if version.uses_attribute_list() {
            AddVolumeParam::V91(AddVolumeParamV91 {
                volume_attributes: vec![VolumeAttribute {
                    num_of_vols: Some(1),
                    volume_identifier: identifier,
                    capacity_unit: unit,
                    volume_size: size.to_string(),
                }],
                create_new_volumes: true,
                emulation: default_emulation(),
            })
        } else {
            AddVolumeParam::V90(AddVolumeParamV90 {
                num_of_vols: 1,
                volume_attribute: VolumeAttribute {
                    num_of_vols: None,
                    volume_identifier: None,
                    capacity_unit: unit,
                    volume_size: size.to_string(),
                },
                create_new_volumes: true,
                emulation: default_emulation(),
                volume_identifier: identifier,
            })
        }
    }

    pub fn matches(&self, version: ApiVersion) -> bool {
        match self {
            AddVolumeParam::V90(_) => !version.uses_attribute_list(),
            AddVolumeParam::V91(_) => version.uses_attribute_list(),
        }
    }

    /// Check the shape against `version` and flatten it.
    pub fn new_volumes_for(&self, version: ApiVersion) -> Result<Vec<NewVolumeSpec>, PayloadError> {
        if !self.matches(version) {
            return Err(PayloadError::VersionMismatch(version));
        }
        self.new_volumes()
    }

    pub fn new_volumes(&self) -> Result<Vec<NewVolumeSpec>, PayloadError> {
        match self {
            AddVolumeParam::V90(p) => {
                let size = parse_size(&p.volume_attribute.volume_size)?;
                Ok(vec![NewVolumeSpec {
                    identifier: p
                        .volume_identifier
                        .as_ref()
                        .and_then(|id| id.identifier_name.clone()),
                    size,
                    unit: p.volume_attribute.capacity_unit,
                    count: p.num_of_vols.max(1),
                    emulation: p.emulation.clone(),
                }])
            }
            AddVolumeParam::V91(p) => p
                .volume_attributes
                .iter()
                .map(|attr| {
                    Ok(NewVolumeSpec {
                        identifier: attr
                            .volume_identifier
                            .as_ref()
                            .and_then(|id| id.identifier_name.clone()),
                        size: parse_size(&attr.volume_size)?,
                        unit: attr.capacity_unit,
                        count: attr.num_of_vols.unwrap_or(1).max(1),
                        emulation: p.emulation.clone(),
                    })
                })
                .collect(),
        }
    }
}

fn parse_size(raw: &str) -> Result<u64, PayloadError> {
    raw.trim()
        .parse::<u64>()
        .map_err(|_| PayloadError::InvalidSize(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn version_tags_round_trip() {
        for v in [ApiVersion::V90, ApiVersion::V91, ApiVersion::V100] {
            assert_eq!(v.tag().parse::<ApiVersion>().unwrap(), v);
        }
        assert!("92".parse::<ApiVersion>().is_err());
    }

    #[test]
    fn v90_payload_keeps_identifier_at_top_level() {
        let param = AddVolumeParam::single(ApiVersion::V90, "vol1", 10, CapacityUnit::Gb);
        let json = serde_json::to_value(&param).unwrap();
        assert_eq!(json["volumeIdentifier"]["identifier_name"], "vol1");
        assert_eq!(json["volumeAttribute"]["volume_size"], "10");
        assert!(json.get("volumeAttributes").is_none());
    }

    #[test]
    fn v91_payload_nests_identifier() {
        let param = AddVolumeParam::single(ApiVersion::V100, "vol1", 10, CapacityUnit::Gb);
        let json = serde_json::to_value(&param).unwrap();
        assert_eq!(
            json["volumeAttributes"][0]["volumeIdentifier"]["identifier_name"],
            "vol1"
        );
    }

    #[test]
    fn decoding_picks_shape_and_checks_version() {
        let body = json!({
            "num_of_vols": 2,
            "volumeAttribute": {"capacityUnit": "CYL", "volume_size": "547"},
            "create_new_volumes": true,
            "emulation": "FBA",
            "volumeIdentifier": {"volumeIdentifierChoice": "identifier_name", "identifier_name": "pv"}
        });
        let param: AddVolumeParam = serde_json::from_value(body).unwrap();
        assert!(matches!(param, AddVolumeParam::V90(_)));

        let specs = param.new_volumes_for(ApiVersion::V90).unwrap();
        assert_eq!(specs[0].count, 2);
        assert_eq!(specs[0].identifier.as_deref(), Some("pv"));
        assert_eq!(
            param.new_volumes_for(ApiVersion::V100),
            Err(PayloadError::VersionMismatch(ApiVersion::V100))
        );
    }

    #[test]
    fn invalid_size_is_rejected() {
        let body = json!({
            "volumeAttributes": [{"capacityUnit": "GB", "volume_size": "ten"}]
        });
        let param: AddVolumeParam = serde_json::from_value(body).unwrap();
        assert!(matches!(param.new_volumes(), Err(PayloadError::InvalidSize(_))));
    }

    #[test]
    fn capacity_conversion_rounds_up() {
        assert_eq!(CapacityUnit::Cyl.to_cylinders(547), 547);
        assert_eq!(CapacityUnit::Mb.to_cylinders(2), 2);
        assert_eq!(CapacityUnit::Gb.to_cylinders(1), 547);
    }
}
