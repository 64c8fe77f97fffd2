use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use common::provisioning::{
    CreateHostParam, CreatePortGroupParam, CreateStorageGroupParam, EditStorageGroupActionParam,
    ExpandStorageGroupParam, MaskingViewCreateParam, PortKey, SloBasedStorageGroupParam,
    UpdateStorageGroupPayload,
};
use common::replication::{CreateSgSrdf, CreateVolumesSnapshot, ModifyVolumeSnapshot, RdfMode, SnapshotAction, VolumeName};
use common::version::{AddVolumeParamV91, VolumeAttribute};
use common::{AddVolumeParam, ApiVersion, CapacityUnit, ExecutionOption};
use mock_array::{build_router, MockArray, MockConfig};
use serde::Serialize;
use serde_json::{json, Value};
use tower::ServiceExt;
use tracing_test::traced_test;

const SYMID: &str = "000197900046";
const REMOTE: &str = "000000000013";

fn base() -> String {
    format!("/univmax/restapi/100/sloprovisioning/symmetrix/{SYMID}")
}

fn replication() -> String {
    format!("/univmax/restapi/100/replication/symmetrix/{SYMID}")
}

async fn send(router: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };
    let response = router
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, value)
}

async fn get(router: &Router, uri: &str) -> (StatusCode, Value) {
    send(router, Method::GET, uri, None).await
}

fn to_json<T: Serialize>(value: &T) -> Option<Value> {
    Some(serde_json::to_value(value).unwrap())
}

async fn create_storage_group(router: &Router, id: &str) {
    let param = CreateStorageGroupParam {
        storage_group_id: id.to_string(),
        srp_id: "SRP_1".to_string(),
        slo_based_params: vec![SloBasedStorageGroupParam {
            slo_id: "Diamond".to_string(),
            workload_selection: "None".to_string(),
        }],
        create_empty_storage_group: true,
        emulation: "FBA".to_string(),
        execution_option: ExecutionOption::Synchronous,
    };
    let (status, body) = send(router, Method::POST, &format!("{}/storagegroup", base()), to_json(&param)).await;
    assert_eq!(status, StatusCode::OK, "{body}");
}

fn add_volumes(count: u32, execution: ExecutionOption) -> UpdateStorageGroupPayload {
    UpdateStorageGroupPayload {
        action: EditStorageGroupActionParam {
            expand: Some(ExpandStorageGroupParam {
                add_volume: Some(AddVolumeParam::V91(AddVolumeParamV91 {
                    volume_attributes: vec![VolumeAttribute {
                        num_of_vols: Some(count),
                        volume_identifier: None,
                        capacity_unit: CapacityUnit::Gb,
                        volume_size: "1".to_string(),
                    }],
                    create_new_volumes: true,
                    emulation: "FBA".to_string(),
                })),
                add_specific_volume: None,
            }),
            ..Default::default()
        },
        execution_option: execution,
    }
}

async fn storage_group_with_volumes(router: &Router, id: &str, count: u32) {
    create_storage_group(router, id).await;
    let (status, body) = send(
        router,
        Method::PUT,
        &format!("{}/storagegroup/{id}", base()),
        to_json(&add_volumes(count, ExecutionOption::Synchronous)),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
}

async fn arm(router: &Router, fault: &str, body: Option<Value>) {
    let (status, _) = send(router, Method::PUT, &format!("/mock/faults/{fault}"), body).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn version_checks_basic_auth() {
    let router = build_router(MockArray::default());

    let (status, body) = get(&router, "/univmax/restapi/version").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["httpStatusCode"], 401);

    let credentials = STANDARD.encode("username:password");
    let request = Request::builder()
        .uri("/univmax/restapi/version")
        .header(header::AUTHORIZATION, format!("Basic {credentials}"))
        .body(Body::empty())
        .unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["version"], "V10.1.0.0");
}

#[tokio::test]
async fn unknown_paths_and_arrays_are_not_found() {
    let router = build_router(MockArray::default());

    let (status, body) = get(&router, "/univmax/restapi/100/nothing/here").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["message"].as_str().unwrap().contains("not found"));

    let (status, _) = get(
        &router,
        "/univmax/restapi/100/sloprovisioning/symmetrix/000000000999/storagegroup",
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = get(&router, &format!("/univmax/restapi/84/sloprovisioning/symmetrix/{SYMID}/storagegroup")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn storage_group_and_volume_membership_agree() {
    let router = build_router(MockArray::default());
    storage_group_with_volumes(&router, "sg1", 2).await;

    let (status, sg) = get(&router, &format!("{}/storagegroup/sg1", base())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(sg["num_of_vols"], 2);

    let (_, listing) = get(&router, &format!("{}/volume?storageGroupId=sg1", base())).await;
    let volumes = listing["resultList"]["result"].as_array().unwrap();
    assert_eq!(volumes.len(), 2);
    for entry in volumes {
        let id = entry["volumeId"].as_str().unwrap();
        let (_, volume) = get(&router, &format!("{}/volume/{id}", base())).await;
        assert_eq!(volume["storageGroupId"], json!(["sg1"]));
    }

    // A group with volumes cannot be deleted.
    let (status, _) = send(&router, Method::DELETE, &format!("{}/storagegroup/sg1", base()), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn async_update_returns_job_that_alternates() {
    let array = MockArray::default();
    let router = build_router(array.clone());
    create_storage_group(&router, "sg1").await;

    let (status, job) = send(
        &router,
        Method::PUT,
        &format!("{}/storagegroup/sg1", base()),
        to_json(&add_volumes(1, ExecutionOption::Asynchronous)),
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(job["status"], "SCHEDULED");
    let job_id = job["jobId"].as_str().unwrap().to_string();
    let job_uri = format!("/univmax/restapi/100/system/symmetrix/{SYMID}/job/{job_id}");

    let (_, first) = get(&router, &job_uri).await;
    let (_, second) = get(&router, &job_uri).await;
    let (_, third) = get(&router, &job_uri).await;
    assert_eq!(first["status"], "SUCCEEDED");
    assert_eq!(second["status"], "RUNNING");
    assert_eq!(third["status"], "SUCCEEDED");

    let (_, sg) = get(&router, &format!("{}/storagegroup/sg1", base())).await;
    assert_eq!(sg["num_of_vols"], 1);
}

#[tokio::test]
async fn failed_job_leaves_state_untouched() {
    let router = build_router(MockArray::default());
    create_storage_group(&router, "sg1").await;
    arm(&router, "JobFailedError", None).await;

    let (status, job) = send(
        &router,
        Method::PUT,
        &format!("{}/storagegroup/sg1", base()),
        to_json(&add_volumes(1, ExecutionOption::Asynchronous)),
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED);
    let job_id = job["jobId"].as_str().unwrap();
    let (_, polled) = get(
        &router,
        &format!("/univmax/restapi/100/system/symmetrix/{SYMID}/job/{job_id}"),
    )
    .await;
    assert_eq!(polled["status"], "FAILED");

    let (_, sg) = get(&router, &format!("{}/storagegroup/sg1", base())).await;
    assert_eq!(sg["num_of_vols"], 0);
}

#[tokio::test]
async fn induced_faults_fire_and_clear() {
    let router = build_router(MockArray::default());

    arm(&router, "GetStorageGroupError", None).await;
    let uri = format!("{}/storagegroup", base());
    let (status, body) = get(&router, &uri).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["message"].as_str().unwrap().contains("induced error"));
    let (status, _) = get(&router, &uri).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let (status, _) = send(&router, Method::DELETE, "/mock/faults/GetStorageGroupError", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = get(&router, &uri).await;
    assert_eq!(status, StatusCode::OK);

    // Status override.
    arm(&router, "GetVolumeError", Some(json!({"status": 409}))).await;
    let (status, _) = get(&router, &format!("{}/volume/00001", base())).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(&router, Method::PUT, "/mock/faults/NoSuchFault", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn reset_after_first_disarms_every_fault() {
    let router = build_router(MockArray::default());
    let (status, _) = send(&router, Method::PUT, "/mock/faults", Some(json!({"resetAfterFirst": true}))).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    arm(&router, "GetHostError", None).await;

    let uri = format!("{}/host", base());
    assert_eq!(get(&router, &uri).await.0, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(get(&router, &uri).await.0, StatusCode::OK);

    let (_, faults) = get(&router, "/mock/faults").await;
    assert_eq!(faults["armed"], json!([]));
    assert_eq!(faults["resetAfterFirst"], true);
}

#[tokio::test]
async fn transport_faults_spare_admin_routes() {
    let router = build_router(MockArray::default());
    let uri = format!("{}/storagegroup", base());

    arm(&router, "NoConnection", None).await;
    assert_eq!(get(&router, &uri).await.0, StatusCode::SERVICE_UNAVAILABLE);
    let (_, faults) = get(&router, "/mock/faults").await;
    assert_eq!(faults["armed"], json!(["NoConnection"]));
    assert_eq!(send(&router, Method::DELETE, "/mock/faults", None).await.0, StatusCode::NO_CONTENT);

    arm(&router, "InvalidJson", Some(json!({"times": 1}))).await;
    let (status, body) = get(&router, &uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::String("{invalid json".to_string()));
    assert!(get(&router, &uri).await.1.get("storageGroupId").is_some());
}

#[tokio::test]
async fn volume_listing_pages_through_iterator() {
    let config = MockConfig {
        page_size: 2,
        ..MockConfig::default()
    };
    let array = MockArray::new(config);
    let router = build_router(array.clone());
    storage_group_with_volumes(&router, "sg1", 5).await;

    let (_, listing) = get(&router, &format!("{}/volume", base())).await;
    assert_eq!(listing["count"], 5);
    assert_eq!(listing["maxPageSize"], 2);
    assert_eq!(listing["resultList"]["result"].as_array().unwrap().len(), 2);
    let id = listing["id"].as_str().unwrap().to_string();
    assert!(!id.is_empty());

    let page_uri = format!("/univmax/restapi/100/common/Iterator/{id}/page?from=3&to=4");
    let (status, page) = get(&router, &page_uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["result"][0]["volumeId"], "00003");
    assert_eq!(page["result"][1]["volumeId"], "00004");

    let (status, _) = send(&router, Method::DELETE, &format!("/univmax/restapi/100/common/Iterator/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(get(&router, &page_uri).await.0, StatusCode::NOT_FOUND);
    assert!(array.lock().iterators.is_empty());
}

#[tokio::test]
async fn deleting_masking_view_unwinds_bookkeeping() {
    let router = build_router(MockArray::default());
    storage_group_with_volumes(&router, "sg1", 1).await;

    let host = CreateHostParam {
        host_id: "host1".to_string(),
        initiator_ids: vec!["10000090fa66060a".to_string()],
        host_flags: None,
        execution_option: ExecutionOption::Synchronous,
    };
    assert_eq!(send(&router, Method::POST, &format!("{}/host", base()), to_json(&host)).await.0, StatusCode::OK);

    let port_group = CreatePortGroupParam {
        port_group_id: "pg1".to_string(),
        symmetrix_port_keys: vec![PortKey::new("FA-1D", "4")],
        protocol: "SCSI_FC".to_string(),
        execution_option: ExecutionOption::Synchronous,
    };
    assert_eq!(
        send(&router, Method::POST, &format!("{}/portgroup", base()), to_json(&port_group)).await.0,
        StatusCode::OK
    );

    let view = MaskingViewCreateParam::new("mv1", "sg1", "host1", true, "pg1");
    let (status, body) = send(&router, Method::POST, &format!("{}/maskingview", base()), to_json(&view)).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let (_, volume) = get(&router, &format!("{}/volume/00001", base())).await;
    assert_eq!(volume["num_of_front_end_paths"], 1);

    // A masked host cannot go away.
    assert_eq!(send(&router, Method::DELETE, &format!("{}/host/host1", base()), None).await.0, StatusCode::CONFLICT);

    let (status, _) = send(&router, Method::DELETE, &format!("{}/maskingview/mv1", base()), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, host) = get(&router, &format!("{}/host/host1", base())).await;
    assert_eq!(host["num_of_masking_views"], 0);
    let (_, sg) = get(&router, &format!("{}/storagegroup/sg1", base())).await;
    assert_eq!(sg["num_of_masking_views"], 0);
    let (_, volume) = get(&router, &format!("{}/volume/00001", base())).await;
    assert_eq!(volume["num_of_front_end_paths"], 0);
}

#[tokio::test]
async fn srdf_protection_follows_actions() {
    let router = build_router(MockArray::default());
    storage_group_with_volumes(&router, "sg1", 1).await;

    let protect = CreateSgSrdf {
        remote_symmetrix_id: REMOTE.to_string(),
        replication_mode: RdfMode::Asynchronous,
        remote_storage_group_name: "sg1".to_string(),
        remote_slo: "Diamond".to_string(),
        rdfg_number: 10,
        establish: false,
        execution_option: ExecutionOption::Synchronous,
    };
    let (status, info) = send(
        &router,
        Method::POST,
        &format!("{}/storagegroup/sg1/rdf_group", replication()),
        to_json(&protect),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{info}");
    assert_eq!(info["states"], json!(["Suspended"]));

    let (_, volume) = get(&router, &format!("{}/volume/00001", base())).await;
    assert_eq!(volume["type"], "RDF1+TDEV");

    let group_uri = format!("{}/storagegroup/sg1/rdf_group/10", replication());
    let (status, info) = send(&router, Method::PUT, &group_uri, Some(json!({"action": "Resume"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(info["states"], json!(["Consistent"]));
    let (_, pair) = get(&router, &format!("{}/rdf_group/10/volume/00001", replication())).await;
    assert_eq!(pair["rdfpairState"], "Consistent");

    // Consistent pairs must be suspended first.
    assert_eq!(send(&router, Method::DELETE, &group_uri, None).await.0, StatusCode::CONFLICT);

    let (status, body) = send(&router, Method::PUT, &group_uri, Some(json!({"action": "Teleport"}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "specified RA group is not valid");
    let (status, _) = send(
        &router,
        Method::PUT,
        &format!("{}/storagegroup/sg1/rdf_group/42", replication()),
        Some(json!({"action": "Suspend"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    assert_eq!(send(&router, Method::PUT, &group_uri, Some(json!({"action": "Suspend"}))).await.0, StatusCode::OK);
    assert_eq!(send(&router, Method::DELETE, &group_uri, None).await.0, StatusCode::NO_CONTENT);
    let (_, volume) = get(&router, &format!("{}/volume/00001", base())).await;
    assert_eq!(volume["type"], "TDEV");
}

#[tokio::test]
async fn snapshot_links_are_not_repeated() {
    let router = build_router(MockArray::default());
    storage_group_with_volumes(&router, "sg1", 2).await;
    let snapshot_uri = format!("/univmax/restapi/private/100/replication/symmetrix/{SYMID}/snapshot/snap1");

    let create = CreateVolumesSnapshot {
        source_volumes: VolumeName::list(&["00001"]),
        both_sides: false,
        star: false,
        force: false,
        time_to_live: 0,
        time_in_hours: false,
        execution_option: ExecutionOption::Synchronous,
    };
    let (status, body) = send(&router, Method::POST, &snapshot_uri, to_json(&create)).await;
    assert_eq!(status, StatusCode::NO_CONTENT, "{body}");

    let sources = vec!["00001".to_string()];
    let targets = vec!["00002".to_string()];
    let link = ModifyVolumeSnapshot::new(SnapshotAction::Link, &sources, &targets);
    let unlink = ModifyVolumeSnapshot::new(SnapshotAction::Unlink, &sources, &targets);

    assert_eq!(send(&router, Method::PUT, &snapshot_uri, to_json(&link)).await.0, StatusCode::NO_CONTENT);
    let (status, body) = send(&router, Method::PUT, &snapshot_uri, to_json(&link)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "devices already in desired state");

    assert_eq!(send(&router, Method::PUT, &snapshot_uri, to_json(&unlink)).await.0, StatusCode::NO_CONTENT);
    assert_eq!(send(&router, Method::PUT, &snapshot_uri, to_json(&unlink)).await.0, StatusCode::CONFLICT);

    let (_, names) = get(
        &router,
        &format!("/univmax/restapi/private/100/replication/symmetrix/{SYMID}/volume/00001/snapshot"),
    )
    .await;
    assert_eq!(names["snapshotName"], json!(["snap1"]));
}

#[tokio::test]
async fn reset_restores_seeded_inventory() {
    let array = MockArray::default();
    let router = build_router(array.clone());
    storage_group_with_volumes(&router, "sg1", 1).await;
    arm(&router, "GetHostError", None).await;

    assert_eq!(send(&router, Method::POST, "/mock/reset", None).await.0, StatusCode::NO_CONTENT);
    let (_, groups) = get(&router, &format!("{}/storagegroup", base())).await;
    assert_eq!(groups["storageGroupId"], json!([]));
    assert_eq!(get(&router, &format!("{}/host", base())).await.0, StatusCode::OK);
    assert!(array.lock().store.volumes.is_empty());
}

#[tokio::test]
async fn single_volume_payload_must_match_version() {
    let router = build_router(MockArray::default());
    create_storage_group(&router, "sg1").await;
    let payload = UpdateStorageGroupPayload {
        action: EditStorageGroupActionParam {
            expand: Some(ExpandStorageGroupParam {
                add_volume: Some(AddVolumeParam::single(ApiVersion::V90, "vol", 1, CapacityUnit::Gb)),
                add_specific_volume: None,
            }),
            ..Default::default()
        },
        execution_option: ExecutionOption::Synchronous,
    };
    let (status, _) = send(&router, Method::PUT, &format!("{}/storagegroup/sg1", base()), to_json(&payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn concurrent_volume_creation_allocates_unique_ids() {
    let array = MockArray::default();
    let router = build_router(array.clone());
    create_storage_group(&router, "sg1").await;

    let uri = format!("{}/storagegroup/sg1", base());
    let requests = (0..8).map(|_| {
        send(&router, Method::PUT, &uri, to_json(&add_volumes(1, ExecutionOption::Synchronous)))
    });
    for (status, body) in futures::future::join_all(requests).await {
        assert_eq!(status, StatusCode::OK, "{body}");
    }

    let state = array.lock();
    assert_eq!(state.store.volumes.len(), 8);
    assert!(state.store.volumes.contains_key("00008"));
}

#[tokio::test]
#[traced_test]
async fn unknown_route_is_an_enveloped_404() {
    let router = build_router(MockArray::default());

    let (status, body) = get(&router, "/univmax/restapi/100/nowhere").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["httpStatusCode"], 404);
    assert!(logs_contain("no route"));
    assert!(logs_contain("/univmax/restapi/100/nowhere"));
}
