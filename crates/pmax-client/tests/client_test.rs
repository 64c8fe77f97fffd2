//! End-to-end tests of the client against an in-process mock array.

use std::time::Duration;

use common::file::{CreateFileSystem, CreateNfsExport};
use common::provisioning::PortKey;
use common::replication::{CreateSnapshotPolicyParam, RdfAction, RdfMode};
use mock_array::{FaultKind, MockArray, MockConfig, MockServer};
use pmax_client::{CapacityUnit, Client, ClientConfig, ClientError, ErrorKind, JobStatus, ProtectionTarget};
use tracing_test::traced_test;

const SYMID: &str = "000197900046";
const REMOTE: &str = "000000000013";

async fn start(config: MockConfig) -> (Client, MockArray) {
    let (addr, array, _handle) = MockServer::spawn(config).await.unwrap();
    let client = Client::new(
        ClientConfig::new(format!("http://{addr}"))
            .with_credentials("username", "password")
            .with_job_polling(Duration::from_millis(10), 5),
    )
    .unwrap();
    (client, array)
}

async fn start_default() -> (Client, MockArray) {
    start(MockConfig::default()).await
}

fn api_kind(err: &ClientError) -> Option<ErrorKind> {
    match err {
        ClientError::Api { kind, .. } => Some(*kind),
        _ => None,
    }
}

#[tokio::test]
async fn test_authenticate() {
    println!("\n🔑 Authenticating against the mock array");
    let (client, _array) = start_default().await;

    let version = client.authenticate().await.unwrap();
    assert_eq!(version.version, mock_array::handlers::system::UNISPHERE_VERSION);
    println!("  ✓ Version {}", version.version);

    let (addr, _array, _handle) = MockServer::spawn(MockConfig::default()).await.unwrap();
    let wrong = Client::new(
        ClientConfig::new(format!("http://{addr}")).with_credentials("username", "nope"),
    )
    .unwrap();
    let err = wrong.authenticate().await.unwrap_err();
    assert_eq!(api_kind(&err), Some(ErrorKind::Unauthorized));
    println!("  ✓ Bad password rejected");
}

#[tokio::test]
async fn test_allow_list_gates_arrays() {
    println!("\n🚧 Testing the array allow-list");
    let (mut client, _array) = start_default().await;

    let all = client.get_symmetrix_id_list().await.unwrap();
    assert_eq!(all.symmetrix_ids.len(), 3);

    client.set_allowed_arrays(&[SYMID]);
    let visible = client.get_symmetrix_id_list().await.unwrap();
    assert_eq!(visible.symmetrix_ids, vec![SYMID.to_string()]);

    let err = client.get_symmetrix("000197900047").await.unwrap_err();
    assert!(matches!(err, ClientError::ArrayNotAllowed(ref id) if id == "000197900047"));
    assert!(client.get_symmetrix(SYMID).await.is_ok());
    println!("  ✓ Only {SYMID} is reachable");
}

#[tokio::test]
async fn test_volume_lifecycle() {
    println!("\n💾 Testing the volume lifecycle");
    let (client, _array) = start_default().await;

    let sg = client
        .create_storage_group(SYMID, "sg1", "SRP_1", "Diamond")
        .await
        .unwrap();
    assert_eq!(sg.storage_group_id, "sg1");
    assert_eq!(sg.num_of_volumes, 0);

    let vol = client
        .create_volume_in_storage_group(SYMID, "sg1", "vol-a", 1, CapacityUnit::Gb)
        .await
        .unwrap();
    assert_eq!(vol.volume_identifier, "vol-a");
    println!("  ✓ Created volume {}", vol.volume_id);

    let renamed = client
        .rename_volume(SYMID, &vol.volume_id, "vol-b")
        .await
        .unwrap();
    assert_eq!(renamed.volume_identifier, "vol-b");

    let expanded = client
        .expand_volume(SYMID, &vol.volume_id, 2, CapacityUnit::Gb)
        .await
        .unwrap();
    assert!(expanded.capacity_gb > 1.9, "capacity {}", expanded.capacity_gb);
    println!("  ✓ Renamed and expanded to {} GB", expanded.capacity_gb);

    let like = client.get_volume_id_list(SYMID, "vol", true).await.unwrap();
    assert_eq!(like, vec![vol.volume_id.clone()]);
    let exact = client.get_volume_id_list(SYMID, "vol", false).await.unwrap();
    assert!(exact.is_empty());

    let in_sg = client
        .get_volume_ids_in_storage_group(SYMID, "sg1")
        .await
        .unwrap();
    assert_eq!(in_sg, vec![vol.volume_id.clone()]);

    let sg = client
        .remove_volumes_from_storage_group(SYMID, "sg1", &[vol.volume_id.as_str()])
        .await
        .unwrap();
    assert_eq!(sg.num_of_volumes, 0);
    client.delete_volume(SYMID, &vol.volume_id).await.unwrap();

    let err = client.get_volume_by_id(SYMID, &vol.volume_id).await.unwrap_err();
    assert!(err.is_not_found());
    println!("  ✓ Volume removed and deleted");

    let long = "x".repeat(pmax_client::MAX_VOLUME_IDENTIFIER_LEN + 1);
    let err = client
        .create_volume_in_storage_group(SYMID, "sg1", &long, 1, CapacityUnit::Gb)
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::InvalidArgument(_)));
}

#[tokio::test]
async fn test_volume_listing_pages_through_iterator() {
    println!("\n📄 Testing iterator paging");
    let (client, array) = start(MockConfig {
        page_size: 3,
        ..MockConfig::default()
    })
    .await;

    client
        .create_storage_group(SYMID, "sg-paged", "SRP_1", "Gold")
        .await
        .unwrap();
    for n in 0..7 {
        client
            .create_volume_in_storage_group(SYMID, "sg-paged", &format!("paged-{n}"), 10, CapacityUnit::Mb)
            .await
            .unwrap();
    }

    let ids = client.get_volume_id_list(SYMID, "", false).await.unwrap();
    assert_eq!(ids.len(), 7);
    let mut unique = ids.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), 7);
    assert!(array.lock().iterators.is_empty(), "iterator left behind");
    println!("  ✓ Listed {} volumes across pages, iterator deleted", ids.len());
}

#[tokio::test]
async fn test_async_job_reaches_success() {
    println!("\n⏳ Testing async job polling");
    let (client, _array) = start_default().await;
    client
        .create_storage_group(SYMID, "sg-async", "SRP_1", "Diamond")
        .await
        .unwrap();

    let job = client
        .create_volume_in_storage_group_async(SYMID, "sg-async", "async-vol", 1, CapacityUnit::Gb)
        .await
        .unwrap();
    let done = client.wait_on_job_completion(SYMID, &job.job_id).await.unwrap();
    assert_eq!(done.status, JobStatus::Succeeded);

    let ids = client
        .get_volume_id_list(SYMID, "async-vol", false)
        .await
        .unwrap();
    assert_eq!(ids.len(), 1);

    let listed = client
        .get_job_id_list(SYMID, Some(JobStatus::Succeeded))
        .await
        .unwrap();
    assert!(listed.job_ids.contains(&job.job_id));
    println!("  ✓ Job {} succeeded", job.job_id);
}

#[tokio::test]
async fn test_failed_job_is_an_error() {
    println!("\n💥 Testing a failed job");
    let (client, array) = start_default().await;
    client
        .create_storage_group(SYMID, "sg-fail", "SRP_1", "Diamond")
        .await
        .unwrap();

    array.induce(FaultKind::JobFailedError);
    let job = client
        .create_volume_in_storage_group_async(SYMID, "sg-fail", "never", 1, CapacityUnit::Gb)
        .await
        .unwrap();
    array.clear_fault(FaultKind::JobFailedError);

    let err = client.wait_on_job_success(SYMID, &job.job_id).await.unwrap_err();
    assert!(matches!(err, ClientError::JobFailed(_)), "{err}");

    let ids = client.get_volume_id_list(SYMID, "never", false).await.unwrap();
    assert!(ids.is_empty());
    println!("  ✓ Failed job surfaced, no volume created");
}

#[tokio::test]
#[traced_test]
async fn test_role_lookup_failure_is_retried() {
    let (client, array) = start_default().await;
    client
        .create_storage_group(SYMID, "sg-role", "SRP_1", "Diamond")
        .await
        .unwrap();
    let job = client
        .create_volume_in_storage_group_async(SYMID, "sg-role", "role-vol", 1, CapacityUnit::Gb)
        .await
        .unwrap();

    array
        .lock()
        .faults
        .induce_times(FaultKind::GetJobCannotFindRoleForUser, 1);
    let fetched = client.get_job_by_id(SYMID, &job.job_id).await.unwrap();
    assert_eq!(fetched.job_id, job.job_id);
    assert!(logs_contain("retrying"));

    array.induce(FaultKind::GetJobError);
    let err = client.get_job_by_id(SYMID, &job.job_id).await.unwrap_err();
    assert_eq!(api_kind(&err), Some(ErrorKind::Server));
}

#[tokio::test]
async fn test_job_wait_gives_up() {
    println!("\n⌛ Testing job wait with no retries left");
    let (addr, _array, _handle) = MockServer::spawn(MockConfig::default()).await.unwrap();
    let client = Client::new(
        ClientConfig::new(format!("http://{addr}"))
            .with_credentials("username", "password")
            .with_job_polling(Duration::from_millis(1), 0),
    )
    .unwrap();

    let err = client.wait_on_job_completion(SYMID, "1").await.unwrap_err();
    match err {
        ClientError::JobTimedOut { job_id, attempts, .. } => {
            assert_eq!(job_id, "1");
            assert_eq!(attempts, 0);
        }
        other => panic!("expected timeout, got {other}"),
    }
    println!("  ✓ Timed out without polling");
}

#[tokio::test]
async fn test_port_group_update_applies_diff() {
    println!("\n🔌 Testing port group membership updates");
    let (client, _array) = start_default().await;

    let ports = client.get_all_port_keys(SYMID).await.unwrap();
    assert!(ports.contains(&PortKey::new("FA-1D", "4")));

    let pg = client
        .create_port_group(
            SYMID,
            "pg1",
            &[PortKey::new("FA-1D", "4"), PortKey::new("FA-2D", "4")],
            "SCSI_FC",
        )
        .await
        .unwrap();
    assert_eq!(pg.symmetrix_port_keys.len(), 2);

    let desired = [PortKey::new("FA-2D", "4"), PortKey::new("FA-1D", "5")];
    let pg = client.update_port_group(SYMID, "pg1", &desired).await.unwrap();
    let mut got = pg.symmetrix_port_keys.clone();
    got.sort_by(|a, b| (&a.director_id, &a.port_id).cmp(&(&b.director_id, &b.port_id)));
    assert_eq!(got, vec![PortKey::new("FA-1D", "5"), PortKey::new("FA-2D", "4")]);

    let unchanged = client.update_port_group(SYMID, "pg1", &desired).await.unwrap();
    assert_eq!(unchanged.symmetrix_port_keys.len(), 2);
    println!("  ✓ Port group now {:?}", got);

    client.delete_port_group(SYMID, "pg1").await.unwrap();
    assert!(client.get_port_group(SYMID, "pg1").await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_hosts_and_masking_views() {
    println!("\n🖥️  Testing hosts and masking views");
    let (client, _array) = start_default().await;

    client
        .create_host(SYMID, "host1", &["10000090fa66060a"], None)
        .await
        .unwrap();
    let host = client
        .update_host_initiators(SYMID, "host1", &["10000090fa66060b"])
        .await
        .unwrap();
    assert_eq!(host.initiators, vec!["10000090fa66060b".to_string()]);
    println!("  ✓ Initiators swapped");

    client
        .create_storage_group(SYMID, "sg-mv", "SRP_1", "Diamond")
        .await
        .unwrap();
    client
        .create_port_group(SYMID, "pg-mv", &[PortKey::new("FA-1D", "4")], "SCSI_FC")
        .await
        .unwrap();
    let mv = client
        .create_masking_view(SYMID, "mv1", "sg-mv", "host1", true, "pg-mv")
        .await
        .unwrap();
    assert_eq!(mv.host_id, "host1");
    assert_eq!(mv.storage_group_id, "sg-mv");

    let mv = client.rename_masking_view(SYMID, "mv1", "mv2").await.unwrap();
    assert_eq!(mv.masking_view_id, "mv2");
    assert!(client.get_masking_view(SYMID, "mv1").await.unwrap_err().is_not_found());

    let err = client.delete_host(SYMID, "host1").await.unwrap_err();
    assert!(err.is_conflict(), "{err}");
    println!("  ✓ Masked host cannot be deleted");

    client.delete_masking_view(SYMID, "mv2").await.unwrap();
    client.delete_host(SYMID, "host1").await.unwrap();
    println!("  ✓ Host deleted after its view");
}

#[tokio::test]
async fn test_srdf_protection() {
    println!("\n🔁 Testing SRDF protection");
    let (client, _array) = start_default().await;
    client
        .create_storage_group(SYMID, "sg-rdf", "SRP_1", "Diamond")
        .await
        .unwrap();
    client
        .create_volume_in_storage_group(SYMID, "sg-rdf", "rdf-vol", 1, CapacityUnit::Gb)
        .await
        .unwrap();

    let target = ProtectionTarget {
        remote_symmetrix_id: REMOTE.to_string(),
        rdfg_number: 10,
        mode: RdfMode::Asynchronous,
        remote_storage_group: "sg-rdf".to_string(),
        remote_slo: "Diamond".to_string(),
        establish: false,
    };
    let info = client
        .protect_storage_group(SYMID, "sg-rdf", &target)
        .await
        .unwrap();
    assert_eq!(info.states, vec!["Suspended".to_string()]);

    let groups = client
        .get_storage_group_rdf_groups(SYMID, "sg-rdf")
        .await
        .unwrap();
    assert_eq!(groups.rdf_groups, vec![10]);

    let info = client
        .execute_replication_action(SYMID, "sg-rdf", 10, RdfAction::Resume)
        .await
        .unwrap();
    assert_eq!(info.states, vec!["Consistent".to_string()]);
    println!("  ✓ Protected and resumed");

    let err = client
        .unprotect_storage_group(SYMID, "sg-rdf", 10)
        .await
        .unwrap_err();
    assert!(err.is_conflict(), "{err}");

    client
        .execute_replication_action(SYMID, "sg-rdf", 10, RdfAction::Suspend)
        .await
        .unwrap();
    client.unprotect_storage_group(SYMID, "sg-rdf", 10).await.unwrap();
    println!("  ✓ Unprotected after suspend");

    let err = client.get_rdf_group(SYMID, 42).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_snapshot_link_and_unlink() {
    println!("\n📸 Testing SnapVX snapshots");
    let (client, _array) = start_default().await;
    client
        .create_storage_group(SYMID, "sg-snap", "SRP_1", "Diamond")
        .await
        .unwrap();
    let source = client
        .create_volume_in_storage_group(SYMID, "sg-snap", "snap-src", 1, CapacityUnit::Gb)
        .await
        .unwrap();
    let target = client
        .create_volume_in_storage_group(SYMID, "sg-snap", "snap-tgt", 1, CapacityUnit::Gb)
        .await
        .unwrap();
    let sources = [source.volume_id.as_str()];
    let targets = [target.volume_id.as_str()];

    client.create_snapshot(SYMID, "snap1", &sources, 0).await.unwrap();
    let names = client.get_snapshot_list(SYMID, &source.volume_id).await.unwrap();
    assert_eq!(names.snapshot_names, vec!["snap1".to_string()]);

    client
        .link_snapshot(SYMID, "snap1", &sources, &targets, 0, false)
        .await
        .unwrap();
    let err = client
        .link_snapshot(SYMID, "snap1", &sources, &targets, 0, false)
        .await
        .unwrap_err();
    assert!(err.is_conflict(), "{err}");
    println!("  ✓ Linked once, second link refused");

    let sym = client.get_sym_volume(SYMID, &target.volume_id).await.unwrap();
    assert!(sym.snapvx_target);

    client
        .unlink_snapshot(SYMID, "snap1", &sources, &targets)
        .await
        .unwrap();
    client.delete_snapshot(SYMID, "snap1", &sources, 0).await.unwrap();
    let names = client.get_snapshot_list(SYMID, &source.volume_id).await.unwrap();
    assert!(names.snapshot_names.is_empty());
    println!("  ✓ Unlinked and deleted");

    let err = client
        .link_snapshot(SYMID, "snap1", &sources, &[], 0, false)
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::InvalidArgument(_)));
}

#[tokio::test]
async fn test_transport_faults() {
    println!("\n📡 Testing transport faults");
    let (client, array) = start_default().await;

    array.induce(FaultKind::InvalidJson);
    let err = client.get_symmetrix_id_list().await.unwrap_err();
    assert!(matches!(err, ClientError::Decode { .. }), "{err}");
    array.clear_fault(FaultKind::InvalidJson);
    println!("  ✓ Invalid JSON is a decode error");

    array.induce(FaultKind::BadHttpStatus);
    let err = client.get_symmetrix_id_list().await.unwrap_err();
    assert_eq!(api_kind(&err), Some(ErrorKind::BadRequest));
    array.clear_fault(FaultKind::BadHttpStatus);
    println!("  ✓ Bad status is an API error");

    assert!(client.get_symmetrix_id_list().await.is_ok());
}

#[tokio::test]
async fn test_performance_metrics() {
    println!("\n📈 Testing performance queries");
    let (client, _array) = start_default().await;
    client
        .create_storage_group(SYMID, "sg-perf", "SRP_1", "Diamond")
        .await
        .unwrap();

    let metrics = client
        .get_storage_group_metrics(SYMID, "sg-perf", &["HostIOs", "HostMBs"], 0, 600_000)
        .await
        .unwrap();
    assert_eq!(metrics.result_list.result.len(), 3);
    assert!(metrics.result_list.result[0].values.contains_key("HostIOs"));

    let err = client
        .get_storage_group_metrics(SYMID, "sg-perf", &["HostIOs"], 10, 5)
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::InvalidArgument(_)));

    let keys = client.get_storage_group_perf_keys(SYMID).await.unwrap();
    assert!(keys.storage_groups.iter().any(|k| k.storage_group_id == "sg-perf"));
    let arrays = client.get_array_perf_keys().await.unwrap();
    assert!(arrays.arrays.iter().any(|a| a.symmetrix_id == SYMID));
    println!("  ✓ Metrics and keys returned");
}

#[tokio::test]
async fn test_file_systems_and_exports() {
    println!("\n📁 Testing file systems and NFS exports");
    let (client, _array) = start_default().await;

    let param = CreateFileSystem {
        name: "fs1".to_string(),
        size_total: 1024,
        nas_server: "nas-00000001".to_string(),
        service_level: "Diamond".to_string(),
        description: String::new(),
    };
    let fs = client.create_file_system(SYMID, &param).await.unwrap();
    assert_eq!(fs.name, "fs1");
    let err = client.create_file_system(SYMID, &param).await.unwrap_err();
    assert!(err.is_conflict(), "{err}");
    println!("  ✓ File system {} created once", fs.id);

    let export = client
        .create_nfs_export(
            SYMID,
            &CreateNfsExport {
                file_system: fs.id.clone(),
                path: "/fs1".to_string(),
                name: "export1".to_string(),
                default_access: "ReadWrite".to_string(),
                description: String::new(),
            },
        )
        .await
        .unwrap();
    let exports = client.get_nfs_export_list(SYMID).await.unwrap();
    assert!(exports.entries.iter().any(|e| e.id == export.id));

    client.delete_nfs_export(SYMID, &export.id).await.unwrap();
    client.delete_file_system(SYMID, &fs.id).await.unwrap();
    assert!(client.get_file_system(SYMID, &fs.id).await.unwrap_err().is_not_found());
    println!("  ✓ Export and file system removed");
}

#[tokio::test]
async fn test_snapshot_policy() {
    println!("\n🗓️  Testing snapshot policies");
    let (client, _array) = start_default().await;
    client
        .create_storage_group(SYMID, "sg-pol", "SRP_1", "Diamond")
        .await
        .unwrap();

    let policy = client
        .create_snapshot_policy(
            SYMID,
            &CreateSnapshotPolicyParam {
                name: "daily".to_string(),
                interval: "1 Day".to_string(),
                offset_minutes: 0,
                snapshot_count: 3,
                compliance_count_warning: 0,
                compliance_count_critical: 0,
                secure: false,
            },
        )
        .await
        .unwrap();
    assert_eq!(policy.name, "daily");

    let policy = client
        .associate_snapshot_policy(SYMID, "daily", &["sg-pol"])
        .await
        .unwrap();
    assert_eq!(policy.storage_group_count, 1);
    println!("  ✓ Policy associated with sg-pol");

    let list = client.get_snapshot_policy_list(SYMID).await.unwrap();
    assert_eq!(list.names, vec!["daily".to_string()]);
}

#[tokio::test]
async fn test_concurrent_storage_group_creation() {
    println!("\n🧵 Testing concurrent requests through one client");
    let (client, _array) = start_default().await;

    let names: Vec<String> = (0..6).map(|n| format!("sg-par-{n}")).collect();
    let creates = names
        .iter()
        .map(|name| client.create_storage_group(SYMID, name, "SRP_1", "Gold"));
    for result in futures::future::join_all(creates).await {
        result.unwrap();
    }

    let listed = client.get_storage_group_id_list(SYMID).await.unwrap();
    for name in &names {
        assert!(listed.storage_group_ids.contains(name), "{name} missing");
    }
    println!("  ✓ {} storage groups created in parallel", names.len());
}
