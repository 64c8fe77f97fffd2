//! Performance metric queries. Metric values are open-ended, so results keep
//! them in a name to value map.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DATA_FORMAT_AVERAGE: &str = "Average";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageGroupMetricsParam {
    #[serde(rename = "symmetrixId")]
    pub symmetrix_id: String,
    #[serde(rename = "storageGroupId")]
    pub storage_group_id: String,
    #[serde(rename = "startDate")]
    pub start_date: i64,
    #[serde(rename = "endDate")]
    pub end_date: i64,
    #[serde(rename = "dataFormat", default)]
    pub data_format: String,
    pub metrics: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSample {
    pub timestamp: i64,
    #[serde(flatten)]
    pub values: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricResultList {
    #[serde(default)]
    pub result: Vec<MetricSample>,
    #[serde(default)]
    pub from: usize,
    #[serde(default)]
    pub to: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageGroupMetricsIterator {
    #[serde(rename = "resultList")]
    pub result_list: MetricResultList,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub count: usize,
    #[serde(rename = "expirationTime", default)]
    pub expiration_time: i64,
    #[serde(rename = "maxPageSize", default)]
    pub max_page_size: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeMetricsParam {
    #[serde(rename = "systemId")]
    pub system_id: String,
    #[serde(rename = "commaSeparatedStorageGroupList")]
    pub storage_groups: String,
    #[serde(rename = "startDate")]
    pub start_date: i64,
    #[serde(rename = "endDate")]
    pub end_date: i64,
    #[serde(rename = "dataFormat", default)]
    pub data_format: String,
    pub metrics: Vec<String>,
}

impl VolumeMetricsParam {
    pub fn storage_group_ids(&self) -> impl Iterator<Item = &str> {
        self.storage_groups
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeMetricsResult {
    #[serde(rename = "volumeId")]
    pub volume_id: String,
    #[serde(rename = "storageGroups", default)]
    pub storage_groups: String,
    #[serde(rename = "volumeResult", default)]
    pub samples: Vec<MetricSample>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VolumeResultList {
    #[serde(default)]
    pub result: Vec<VolumeMetricsResult>,
    #[serde(default)]
    pub from: usize,
    #[serde(default)]
    pub to: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VolumeMetricsIterator {
    #[serde(rename = "resultList")]
    pub result_list: VolumeResultList,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub count: usize,
    #[serde(rename = "expirationTime", default)]
    pub expiration_time: i64,
    #[serde(rename = "maxPageSize", default)]
    pub max_page_size: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageGroupKeysParam {
    #[serde(rename = "symmetrixId")]
    pub symmetrix_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageGroupKeyInfo {
    #[serde(rename = "storageGroupId")]
    pub storage_group_id: String,
    #[serde(rename = "firstAvailableDate")]
    pub first_available_date: i64,
    #[serde(rename = "lastAvailableDate")]
    pub last_available_date: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageGroupKeysResult {
    #[serde(rename = "storageGroupInfo", default)]
    pub storage_groups: Vec<StorageGroupKeyInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArrayKeyInfo {
    #[serde(rename = "symmetrixId")]
    pub symmetrix_id: String,
    #[serde(rename = "firstAvailableDate")]
    pub first_available_date: i64,
    #[serde(rename = "lastAvailableDate")]
    pub last_available_date: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArrayKeysResult {
    #[serde(rename = "arrayInfo", default)]
    pub arrays: Vec<ArrayKeyInfo>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn samples_flatten_metric_names() {
        let sample: MetricSample =
            serde_json::from_value(json!({"timestamp": 10, "HostIOs": 2.5, "HostMBs": 1.0}))
                .unwrap();
        assert_eq!(sample.values.get("HostIOs"), Some(&2.5));
        assert_eq!(sample.values.len(), 2);
    }

    #[test]
    fn storage_group_list_is_split() {
        let param = VolumeMetricsParam {
            system_id: "000197900046".into(),
            storage_groups: "sg1, sg2,".into(),
            start_date: 0,
            end_date: 1,
            data_format: DATA_FORMAT_AVERAGE.into(),
            metrics: vec!["MBRead".into()],
        };
        assert_eq!(param.storage_group_ids().collect::<Vec<_>>(), vec!["sg1", "sg2"]);
    }
}
