//! Performance metrics.
//!
//! Values are synthetic but deterministic: each sample is derived from the
//! size of the storage group and the position of the metric in the request,
//! so repeated queries over the same window return the same numbers.

use axum::{extract::State, response::Response};
use common::performance::{
    ArrayKeyInfo, ArrayKeysResult, MetricResultList, MetricSample, StorageGroupKeyInfo,
    StorageGroupKeysParam, StorageGroupKeysResult, StorageGroupMetricsIterator,
    StorageGroupMetricsParam, VolumeMetricsIterator, VolumeMetricsParam, VolumeMetricsResult,
    VolumeResultList,
};
use std::collections::BTreeMap;
use time::OffsetDateTime;

use super::{ok, AppState, Payload};
use crate::error::{MockError, MockResult};
use crate::faults::FaultKind;

/// Diagnostic interval between samples, in milliseconds.
pub const SAMPLE_INTERVAL_MS: i64 = 5 * 60 * 1000;
/// Upper bound on samples per series.
pub const MAX_SAMPLES: usize = 288;
/// How far back the performance keys report data as available.
const RETENTION_MS: i64 = 7 * 24 * 60 * 60 * 1000;

fn timestamps(start: i64, end: i64) -> MockResult<Vec<i64>> {
    if end < start {
        return Err(MockError::invalid(format!(
            "end date {end} is before start date {start}"
        )));
    }
    let mut out = Vec::new();
    let mut ts = start;
    while ts <= end && out.len() < MAX_SAMPLES {
        out.push(ts);
        ts += SAMPLE_INTERVAL_MS;
    }
    Ok(out)
}

fn samples(times: &[i64], metrics: &[String], weight: usize) -> Vec<MetricSample> {
    times
        .iter()
        .enumerate()
        .map(|(n, ts)| MetricSample {
            timestamp: *ts,
            values: metrics
                .iter()
                .enumerate()
                .map(|(i, metric)| {
                    let value = (weight as f64 + 1.0) * (i as f64 + 1.0) + (n % 4) as f64 * 0.5;
                    (metric.clone(), value)
                })
                .collect::<BTreeMap<_, _>>(),
        })
        .collect()
}

fn now_ms() -> i64 {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}

pub async fn storage_group_metrics(
    State(app): State<AppState>,
    Payload(param): Payload<StorageGroupMetricsParam>,
) -> MockResult<Response> {
    let mut state = app.lock();
    state.faults.check(FaultKind::GetStorageGroupMetricsError)?;
    state.store.check_array(&param.symmetrix_id)?;
    let group = state.store.storage_group(&param.storage_group_id)?;

    let times = timestamps(param.start_date, param.end_date)?;
    let result = samples(&times, &param.metrics, group.num_of_volumes);
    let count = result.len();
    Ok(ok(StorageGroupMetricsIterator {
        result_list: MetricResultList {
            result,
            from: usize::from(count > 0),
            to: count,
        },
        id: String::new(),
        count,
        expiration_time: 0,
        max_page_size: MAX_SAMPLES,
    }))
}

pub async fn volume_metrics(
    State(app): State<AppState>,
    Payload(param): Payload<VolumeMetricsParam>,
) -> MockResult<Response> {
    let mut state = app.lock();
    state.faults.check(FaultKind::GetVolumeMetricsError)?;
    state.store.check_array(&param.system_id)?;

    let times = timestamps(param.start_date, param.end_date)?;
    let mut result = Vec::new();
    for sg in param.storage_group_ids() {
        state.store.storage_group(sg)?;
        for (n, volume_id) in state.store.volumes_in(sg).iter().enumerate() {
            result.push(VolumeMetricsResult {
                volume_id: volume_id.clone(),
                storage_groups: sg.to_string(),
                samples: samples(&times, &param.metrics, n),
            });
        }
    }
    let count = result.len();
    Ok(ok(VolumeMetricsIterator {
        result_list: VolumeResultList {
            result,
            from: usize::from(count > 0),
            to: count,
        },
        id: String::new(),
        count,
        expiration_time: 0,
        max_page_size: count.max(1),
    }))
}

pub async fn storage_group_keys(
    State(app): State<AppState>,
    Payload(param): Payload<StorageGroupKeysParam>,
) -> MockResult<Response> {
    let mut state = app.lock();
    state.faults.check(FaultKind::GetStorageGroupPerfKeysError)?;
    state.store.check_array(&param.symmetrix_id)?;
    let last = now_ms();
    Ok(ok(StorageGroupKeysResult {
        storage_groups: state
            .store
            .storage_groups
            .keys()
            .map(|id| StorageGroupKeyInfo {
                storage_group_id: id.clone(),
                first_available_date: last - RETENTION_MS,
                last_available_date: last,
            })
            .collect(),
    }))
}

pub async fn array_keys(State(app): State<AppState>) -> MockResult<Response> {
    let mut state = app.lock();
    state.faults.check(FaultKind::GetArrayPerfKeysError)?;
    let last = now_ms();
    Ok(ok(ArrayKeysResult {
        arrays: state
            .store
            .arrays
            .iter()
            .map(|symid| ArrayKeyInfo {
                symmetrix_id: symid.clone(),
                first_available_date: last - RETENTION_MS,
                last_available_date: last,
            })
            .collect(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_timestamps_step_by_interval() {
        let times = timestamps(0, 2 * SAMPLE_INTERVAL_MS).unwrap();
        assert_eq!(times, vec![0, SAMPLE_INTERVAL_MS, 2 * SAMPLE_INTERVAL_MS]);
        assert!(timestamps(10, 0).is_err());
        assert_eq!(timestamps(0, i64::MAX / 2).unwrap().len(), MAX_SAMPLES);
    }

    #[test]
    fn samples_are_deterministic() {
        let metrics = vec!["HostIOs".to_string(), "HostMBs".to_string()];
        let a = samples(&[0, 1], &metrics, 3);
        let b = samples(&[0, 1], &metrics, 3);
        assert_eq!(a, b);
        assert_eq!(a[0].values["HostIOs"], 4.0);
        assert_eq!(a[0].values["HostMBs"], 8.0);
    }
}
