//! Performance metrics queries.

use common::performance::{
    ArrayKeysResult, StorageGroupKeysParam, StorageGroupKeysResult, StorageGroupMetricsIterator,
    StorageGroupMetricsParam, VolumeMetricsIterator, VolumeMetricsParam, DATA_FORMAT_AVERAGE,
};
use common::routes;

use crate::error::{ClientError, Result};
use crate::Client;

fn check_window(start: i64, end: i64) -> Result<()> {
    if end < start {
        return Err(ClientError::InvalidArgument(format!(
            "metrics window ends ({end}) before it starts ({start})"
        )));
    }
    Ok(())
}

impl Client {
    /// Averaged `metrics` for one storage group between two epoch-millisecond
    /// timestamps.
    pub async fn get_storage_group_metrics<S: AsRef<str>>(
        &self,
        symid: &str,
        sg: &str,
        metrics: &[S],
        start: i64,
        end: i64,
    ) -> Result<StorageGroupMetricsIterator> {
        self.check_array(symid)?;
        check_window(start, end)?;
        let param = StorageGroupMetricsParam {
            symmetrix_id: symid.to_string(),
            storage_group_id: sg.to_string(),
            start_date: start,
            end_date: end,
            data_format: DATA_FORMAT_AVERAGE.to_string(),
            metrics: metrics.iter().map(|m| m.as_ref().to_string()).collect(),
        };
        self.post(self.url(routes::PERF_STORAGE_GROUP_METRICS, &[]), &param)
            .await
    }

    /// Per-volume metrics for the volumes of the given storage groups.
    pub async fn get_volume_metrics<S: AsRef<str>>(
        &self,
        symid: &str,
        storage_groups: &[S],
        metrics: &[S],
        start: i64,
        end: i64,
    ) -> Result<VolumeMetricsIterator> {
        self.check_array(symid)?;
        check_window(start, end)?;
        let param = VolumeMetricsParam {
            system_id: symid.to_string(),
            storage_groups: storage_groups
                .iter()
                .map(|s| s.as_ref())
                .collect::<Vec<_>>()
                .join(","),
            start_date: start,
            end_date: end,
            data_format: DATA_FORMAT_AVERAGE.to_string(),
            metrics: metrics.iter().map(|m| m.as_ref().to_string()).collect(),
        };
        self.post(self.url(routes::PERF_VOLUME_METRICS, &[]), &param)
            .await
    }

    /// Storage groups with recorded metrics, and the time range available.
    pub async fn get_storage_group_perf_keys(&self, symid: &str) -> Result<StorageGroupKeysResult> {
        self.check_array(symid)?;
        let param = StorageGroupKeysParam {
            symmetrix_id: symid.to_string(),
        };
        self.post(self.url(routes::PERF_STORAGE_GROUP_KEYS, &[]), &param)
            .await
    }

    pub async fn get_array_perf_keys(&self) -> Result<ArrayKeysResult> {
        let mut keys: ArrayKeysResult = self
            .execute(
                reqwest::Method::POST,
                self.url(routes::PERF_ARRAY_KEYS, &[]),
                &[],
            )
            .await?
            .decode()?;
        keys.arrays.retain(|a| self.is_allowed_array(&a.symmetrix_id));
        Ok(keys)
    }
}
