use anyhow::Result;
use axum::{
    extract::{Request, State},
    http::header::CONTENT_TYPE,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Router,
};
use common::routes;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::faults::{FaultKind, FaultRegistry};
use crate::handlers::{admin, fallback, file, performance, provisioning, replication, system};
use crate::{MockArray, MockConfig};

/// Faults that break the exchange itself rather than one endpoint.
const TRANSPORT_FAULTS: [FaultKind; 4] = [
    FaultKind::NoConnection,
    FaultKind::BadHttpStatus,
    FaultKind::InvalidJson,
    FaultKind::InvalidResponse,
];

async fn transport_faults(State(app): State<MockArray>, request: Request, next: Next) -> Response {
    let fired = {
        let mut state = app.lock();
        TRANSPORT_FAULTS
            .iter()
            .find_map(|kind| state.faults.trigger(*kind).map(|value| (*kind, value)))
    };

    match fired {
        None => next.run(request).await,
        Some((FaultKind::InvalidJson, _)) => {
            warn!(uri = %request.uri(), "answering with malformed json");
            ([(CONTENT_TYPE, "application/json")], "{invalid json").into_response()
        }
        Some((FaultKind::InvalidResponse, _)) => {
            warn!(uri = %request.uri(), "answering with unexpected body");
            ([(CONTENT_TYPE, "application/json")], "\"invalid response\"").into_response()
        }
        Some((kind, value)) => {
            warn!(uri = %request.uri(), fault = %kind, "transport fault");
            FaultRegistry::error_for(kind, value).into_response()
        }
    }
}

fn system_routes() -> Router<MockArray> {
    Router::new()
        .route(&routes::VERSION.axum_path(), get(system::version))
        .route(&routes::SYMMETRIX_LIST.axum_path(), get(system::symmetrix_list))
        .route(&routes::SYMMETRIX.axum_path(), get(system::symmetrix))
        .route(&routes::DIRECTOR_LIST.axum_path(), get(system::director_list))
        .route(&routes::PORT_LIST.axum_path(), get(system::port_list))
        .route(&routes::PORT.axum_path(), get(system::port))
        .route(&routes::JOB_LIST.axum_path(), get(system::job_list))
        .route(&routes::JOB.axum_path(), get(system::job))
}

fn provisioning_routes() -> Router<MockArray> {
    use provisioning::*;

    Router::new()
        .route(&routes::VOLUME_LIST.axum_path(), get(list_volumes))
        .route(
            &routes::VOLUME.axum_path(),
            get(get_volume).put(update_volume).delete(delete_volume),
        )
        .route(&routes::PRIVATE_VOLUME.axum_path(), get(get_private_volume))
        .route(&routes::ITERATOR.axum_path(), delete(delete_iterator))
        .route(&routes::ITERATOR_PAGE.axum_path(), get(iterator_page))
        .route(
            &routes::STORAGE_GROUP_LIST.axum_path(),
            get(list_storage_groups).post(create_storage_group),
        )
        .route(
            &routes::STORAGE_GROUP.axum_path(),
            get(get_storage_group)
                .put(update_storage_group)
                .delete(delete_storage_group),
        )
        .route(&routes::SRP_LIST.axum_path(), get(list_srps))
        .route(&routes::SRP.axum_path(), get(get_srp))
        .route(&routes::SLO_LIST.axum_path(), get(list_service_levels))
        .route(
            &routes::MASKING_VIEW_LIST.axum_path(),
            get(list_masking_views).post(create_masking_view),
        )
        .route(
            &routes::MASKING_VIEW.axum_path(),
            get(get_masking_view)
                .put(rename_masking_view)
                .delete(delete_masking_view),
        )
        .route(
            &routes::MASKING_VIEW_CONNECTIONS.axum_path(),
            get(masking_view_connections),
        )
        .route(&routes::HOST_LIST.axum_path(), get(list_hosts).post(create_host))
        .route(
            &routes::HOST.axum_path(),
            get(get_host).put(update_host).delete(delete_host),
        )
        .route(
            &routes::HOST_GROUP_LIST.axum_path(),
            get(list_host_groups).post(create_host_group),
        )
        .route(
            &routes::HOST_GROUP.axum_path(),
            get(get_host_group)
                .put(update_host_group)
                .delete(delete_host_group),
        )
        .route(&routes::INITIATOR_LIST.axum_path(), get(list_initiators))
        .route(&routes::INITIATOR.axum_path(), get(get_initiator))
        .route(
            &routes::PORT_GROUP_LIST.axum_path(),
            get(list_port_groups).post(create_port_group),
        )
        .route(
            &routes::PORT_GROUP.axum_path(),
            get(get_port_group)
                .put(update_port_group)
                .delete(delete_port_group),
        )
}

fn replication_routes() -> Router<MockArray> {
    use replication::*;

    Router::new()
        .route(&routes::REPLICATION_CAPABILITIES.axum_path(), get(capabilities))
        .route(&routes::RDF_GROUP_LIST.axum_path(), get(list_rdf_groups))
        .route(&routes::RDF_GROUP.axum_path(), get(get_rdf_group))
        .route(&routes::RDF_DEVICE_PAIR.axum_path(), get(get_rdf_device_pair))
        .route(&routes::RDF_STORAGE_GROUP.axum_path(), get(get_rdf_storage_group))
        .route(
            &routes::SG_RDF_GROUP_LIST.axum_path(),
            get(list_sg_rdf_groups).post(protect_storage_group),
        )
        .route(
            &routes::SG_RDF_GROUP.axum_path(),
            get(get_sg_rdf_group)
                .put(modify_sg_rdf_group)
                .delete(unprotect_storage_group),
        )
        .route(
            &routes::FREE_RDF_GROUP_NUMBERS.axum_path(),
            get(free_rdf_group_numbers),
        )
        .route(
            &routes::SNAPSHOT.axum_path(),
            post(create_snapshot)
                .put(modify_snapshot)
                .delete(delete_snapshot),
        )
        .route(
            &routes::VOLUME_SNAPSHOT_LIST.axum_path(),
            get(list_volume_snapshots),
        )
        .route(&routes::VOLUME_SNAPSHOT.axum_path(), get(get_volume_snapshot))
        .route(
            &routes::VOLUME_SNAPSHOT_GENERATION_LIST.axum_path(),
            get(list_snapshot_generations),
        )
        .route(&routes::SYM_VOLUME.axum_path(), get(get_sym_volume))
        .route(
            &routes::SNAPSHOT_POLICY_LIST.axum_path(),
            get(list_snapshot_policies).post(create_snapshot_policy),
        )
        .route(
            &routes::SNAPSHOT_POLICY.axum_path(),
            get(get_snapshot_policy)
                .put(update_snapshot_policy)
                .delete(delete_snapshot_policy),
        )
}

fn performance_routes() -> Router<MockArray> {
    Router::new()
        .route(
            &routes::PERF_STORAGE_GROUP_METRICS.axum_path(),
            post(performance::storage_group_metrics),
        )
        .route(
            &routes::PERF_VOLUME_METRICS.axum_path(),
            post(performance::volume_metrics),
        )
        .route(
            &routes::PERF_STORAGE_GROUP_KEYS.axum_path(),
            post(performance::storage_group_keys),
        )
        .route(
            &routes::PERF_ARRAY_KEYS.axum_path(),
            post(performance::array_keys),
        )
}

fn file_routes() -> Router<MockArray> {
    use file::*;

    Router::new()
        .route(
            &routes::FILE_SYSTEM_LIST.axum_path(),
            get(list_file_systems).post(create_file_system),
        )
        .route(
            &routes::FILE_SYSTEM.axum_path(),
            get(get_file_system)
                .put(modify_file_system)
                .delete(delete_file_system),
        )
        .route(
            &routes::NFS_EXPORT_LIST.axum_path(),
            get(list_nfs_exports).post(create_nfs_export),
        )
        .route(
            &routes::NFS_EXPORT.axum_path(),
            get(get_nfs_export)
                .put(modify_nfs_export)
                .delete(delete_nfs_export),
        )
        .route(&routes::NAS_SERVER_LIST.axum_path(), get(list_nas_servers))
        .route(
            &routes::NAS_SERVER.axum_path(),
            get(get_nas_server)
                .put(modify_nas_server)
                .delete(delete_nas_server),
        )
        .route(
            &routes::FILE_INTERFACE_LIST.axum_path(),
            get(list_file_interfaces).post(create_file_interface),
        )
        .route(&routes::FILE_INTERFACE.axum_path(), get(get_file_interface))
}

fn admin_routes() -> Router<MockArray> {
    Router::new()
        .route(admin::RESET, post(admin::reset))
        .route(
            admin::FAULTS,
            get(admin::list_faults)
                .put(admin::configure_faults)
                .delete(admin::clear_faults),
        )
        .route(
            admin::FAULT,
            put(admin::induce_fault).delete(admin::clear_fault),
        )
}

/// Every Unisphere route plus the `/mock` control routes, bound to `app`.
pub fn build_router(app: MockArray) -> Router {
    let api = Router::new()
        .merge(system_routes())
        .merge(provisioning_routes())
        .merge(replication_routes())
        .merge(performance_routes())
        .merge(file_routes())
        .route_layer(middleware::from_fn_with_state(app.clone(), transport_faults));

    api.merge(admin_routes())
        .fallback(fallback)
        .with_state(app)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

pub struct MockServer {
    array: MockArray,
    addr: String,
}

impl MockServer {
    pub fn new(config: MockConfig) -> Self {
        let addr = config.bind_addr();
        Self {
            array: MockArray::new(config),
            addr,
        }
    }

    /// Handle to the state this server serves, for in-process test drivers.
    pub fn array(&self) -> MockArray {
        self.array.clone()
    }

    /// Serve until `shutdown` resolves.
    pub async fn run(self, shutdown: impl std::future::Future<Output = ()> + Send + 'static) -> Result<()> {
        let listener = TcpListener::bind(&self.addr).await?;
        let local = listener.local_addr()?;
        info!(
            addr = %local,
            arrays = ?self.array.config().arrays,
            "mock Unisphere listening on http://{}/univmax/restapi",
            local
        );

        axum::serve(listener, build_router(self.array))
            .with_graceful_shutdown(shutdown)
            .await?;
        info!("mock Unisphere stopped");
        Ok(())
    }

    /// Bind an ephemeral port on loopback and serve in the background.
    pub async fn spawn(config: MockConfig) -> Result<(SocketAddr, MockArray, JoinHandle<()>)> {
        let array = MockArray::new(config);
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let router = build_router(array.clone());
        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                warn!(error = %e, "mock server exited");
            }
        });
        info!(%addr, "mock Unisphere spawned");
        Ok((addr, array, handle))
    }
}
