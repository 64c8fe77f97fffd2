//! Path templates shared by the client and the mock router.
//!
//! Every endpoint is declared exactly once. The client expands a template with
//! positional arguments, the mock converts the same template into the router's
//! `:param` syntax, so the two sides cannot drift apart.

/// A REST endpoint path template using `{param}` placeholders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub name: &'static str,
    pub template: &'static str,
}

impl Route {
    pub const fn new(name: &'static str, template: &'static str) -> Self {
        Self { name, template }
    }

    /// Number of `{param}` placeholders in the template.
    pub fn arity(&self) -> usize {
        self.template.matches('{').count()
    }

    /// Fill placeholders left to right with `params`.
    pub fn expand(&self, params: &[&str]) -> String {
        debug_assert_eq!(
            self.arity(),
            params.len(),
            "route {} expects {} parameters",
            self.name,
            self.arity()
        );

        let mut out = String::with_capacity(self.template.len() + 32);
        let mut params = params.iter();
        let mut rest = self.template;
        while let Some(start) = rest.find('{') {
            out.push_str(&rest[..start]);
            let Some(end) = rest[start..].find('}') else {
                break;
            };
            if let Some(value) = params.next() {
                out.push_str(value);
            }
            rest = &rest[start + end + 1..];
        }
        out.push_str(rest);
        out
    }

    /// Template rewritten for the axum router (`{id}` becomes `:id`).
    pub fn axum_path(&self) -> String {
        self.template.replace('{', ":").replace('}', "")
    }
}

pub const UNIVMAX: &str = "/univmax/restapi";

macro_rules! public {
    ($tail:literal) => {
        concat!("/univmax/restapi/{version}", $tail)
    };
}

macro_rules! private {
    ($tail:literal) => {
        concat!("/univmax/restapi/private/{version}", $tail)
    };
}

macro_rules! internal {
    ($tail:literal) => {
        concat!("/univmax/restapi/internal/{version}", $tail)
    };
}

// Unversioned
pub const VERSION: Route = Route::new("version", "/univmax/restapi/version");

// system
pub const SYMMETRIX_LIST: Route = Route::new("symmetrix_list", public!("/system/symmetrix"));
pub const SYMMETRIX: Route = Route::new("symmetrix", public!("/system/symmetrix/{symid}"));
pub const DIRECTOR_LIST: Route = Route::new(
    "director_list",
    public!("/system/symmetrix/{symid}/director"),
);
pub const PORT_LIST: Route = Route::new(
    "port_list",
    public!("/system/symmetrix/{symid}/director/{director}/port"),
);
pub const PORT: Route = Route::new(
    "port",
    public!("/system/symmetrix/{symid}/director/{director}/port/{port}"),
);
pub const JOB_LIST: Route = Route::new("job_list", public!("/system/symmetrix/{symid}/job"));
pub const JOB: Route = Route::new("job", public!("/system/symmetrix/{symid}/job/{id}"));

// sloprovisioning
pub const VOLUME_LIST: Route = Route::new(
    "volume_list",
    public!("/sloprovisioning/symmetrix/{symid}/volume"),
);
pub const VOLUME: Route = Route::new(
    "volume",
    public!("/sloprovisioning/symmetrix/{symid}/volume/{id}"),
);
pub const PRIVATE_VOLUME: Route = Route::new(
    "private_volume",
    private!("/sloprovisioning/symmetrix/{symid}/volume/{id}"),
);
pub const STORAGE_GROUP_LIST: Route = Route::new(
    "storage_group_list",
    public!("/sloprovisioning/symmetrix/{symid}/storagegroup"),
);
pub const STORAGE_GROUP: Route = Route::new(
    "storage_group",
    public!("/sloprovisioning/symmetrix/{symid}/storagegroup/{id}"),
);
pub const SRP_LIST: Route = Route::new("srp_list", public!("/sloprovisioning/symmetrix/{symid}/srp"));
pub const SRP: Route = Route::new("srp", public!("/sloprovisioning/symmetrix/{symid}/srp/{id}"));
pub const SLO_LIST: Route = Route::new("slo_list", public!("/sloprovisioning/symmetrix/{symid}/slo"));
pub const MASKING_VIEW_LIST: Route = Route::new(
    "masking_view_list",
    public!("/sloprovisioning/symmetrix/{symid}/maskingview"),
);
pub const MASKING_VIEW: Route = Route::new(
    "masking_view",
    public!("/sloprovisioning/symmetrix/{symid}/maskingview/{id}"),
);
pub const MASKING_VIEW_CONNECTIONS: Route = Route::new(
    "masking_view_connections",
    public!("/sloprovisioning/symmetrix/{symid}/maskingview/{id}/connections"),
);
pub const HOST_LIST: Route = Route::new("host_list", public!("/sloprovisioning/symmetrix/{symid}/host"));
pub const HOST: Route = Route::new("host", public!("/sloprovisioning/symmetrix/{symid}/host/{id}"));
pub const HOST_GROUP_LIST: Route = Route::new(
    "host_group_list",
    public!("/sloprovisioning/symmetrix/{symid}/hostgroup"),
);
pub const HOST_GROUP: Route = Route::new(
    "host_group",
    public!("/sloprovisioning/symmetrix/{symid}/hostgroup/{id}"),
);
pub const INITIATOR_LIST: Route = Route::new(
    "initiator_list",
    public!("/sloprovisioning/symmetrix/{symid}/initiator"),
);
pub const INITIATOR: Route = Route::new(
    "initiator",
    public!("/sloprovisioning/symmetrix/{symid}/initiator/{id}"),
);
pub const PORT_GROUP_LIST: Route = Route::new(
    "port_group_list",
    public!("/sloprovisioning/symmetrix/{symid}/portgroup"),
);
pub const PORT_GROUP: Route = Route::new(
    "port_group",
    public!("/sloprovisioning/symmetrix/{symid}/portgroup/{id}"),
);

// replication
pub const REPLICATION_CAPABILITIES: Route = Route::new(
    "replication_capabilities",
    public!("/replication/capabilities/symmetrix"),
);
pub const RDF_GROUP_LIST: Route = Route::new(
    "rdf_group_list",
    public!("/replication/symmetrix/{symid}/rdf_group"),
);
pub const RDF_GROUP: Route = Route::new(
    "rdf_group",
    public!("/replication/symmetrix/{symid}/rdf_group/{rdfg}"),
);
pub const RDF_DEVICE_PAIR: Route = Route::new(
    "rdf_device_pair",
    public!("/replication/symmetrix/{symid}/rdf_group/{rdfg}/volume/{id}"),
);
pub const RDF_STORAGE_GROUP: Route = Route::new(
    "rdf_storage_group",
    public!("/replication/symmetrix/{symid}/storagegroup/{id}"),
);
pub const SG_RDF_GROUP_LIST: Route = Route::new(
    "sg_rdf_group_list",
    public!("/replication/symmetrix/{symid}/storagegroup/{id}/rdf_group"),
);
pub const SG_RDF_GROUP: Route = Route::new(
    "sg_rdf_group",
    public!("/replication/symmetrix/{symid}/storagegroup/{id}/rdf_group/{rdfg}"),
);
pub const FREE_RDF_GROUP_NUMBERS: Route = Route::new(
    "free_rdf_group_numbers",
    internal!("/replication/symmetrix/{symid}/rdf_group_numbers_free"),
);
pub const SNAPSHOT_POLICY_LIST: Route = Route::new(
    "snapshot_policy_list",
    public!("/replication/symmetrix/{symid}/snapshot_policy"),
);
pub const SNAPSHOT_POLICY: Route = Route::new(
    "snapshot_policy",
    public!("/replication/symmetrix/{symid}/snapshot_policy/{id}"),
);
pub const SNAPSHOT: Route = Route::new(
    "snapshot",
    private!("/replication/symmetrix/{symid}/snapshot/{id}"),
);
pub const VOLUME_SNAPSHOT_LIST: Route = Route::new(
    "volume_snapshot_list",
    private!("/replication/symmetrix/{symid}/volume/{volid}/snapshot"),
);
pub const VOLUME_SNAPSHOT: Route = Route::new(
    "volume_snapshot",
    private!("/replication/symmetrix/{symid}/volume/{volid}/snapshot/{id}"),
);
pub const VOLUME_SNAPSHOT_GENERATION_LIST: Route = Route::new(
    "volume_snapshot_generation_list",
    private!("/replication/symmetrix/{symid}/volume/{volid}/snapshot/{id}/generation"),
);
pub const SYM_VOLUME: Route = Route::new(
    "sym_volume",
    private!("/replication/symmetrix/{symid}/volume/{volid}"),
);

// performance (unversioned under the api root)
pub const PERF_STORAGE_GROUP_METRICS: Route = Route::new(
    "perf_storage_group_metrics",
    "/univmax/restapi/performance/StorageGroup/metrics",
);
pub const PERF_VOLUME_METRICS: Route = Route::new(
    "perf_volume_metrics",
    "/univmax/restapi/performance/Volume/metrics",
);
pub const PERF_STORAGE_GROUP_KEYS: Route = Route::new(
    "perf_storage_group_keys",
    "/univmax/restapi/performance/StorageGroup/keys",
);
pub const PERF_ARRAY_KEYS: Route = Route::new(
    "perf_array_keys",
    "/univmax/restapi/performance/Array/keys",
);

// file
pub const FILE_SYSTEM_LIST: Route = Route::new(
    "file_system_list",
    public!("/file/symmetrix/{symid}/file_system"),
);
pub const FILE_SYSTEM: Route = Route::new(
    "file_system",
    public!("/file/symmetrix/{symid}/file_system/{id}"),
);
pub const NFS_EXPORT_LIST: Route = Route::new(
    "nfs_export_list",
    public!("/file/symmetrix/{symid}/nfs_export"),
);
pub const NFS_EXPORT: Route = Route::new(
    "nfs_export",
    public!("/file/symmetrix/{symid}/nfs_export/{id}"),
);
pub const NAS_SERVER_LIST: Route = Route::new(
    "nas_server_list",
    public!("/file/symmetrix/{symid}/nas_server"),
);
pub const NAS_SERVER: Route = Route::new(
    "nas_server",
    public!("/file/symmetrix/{symid}/nas_server/{id}"),
);
pub const FILE_INTERFACE_LIST: Route = Route::new(
    "file_interface_list",
    public!("/file/symmetrix/{symid}/file_interface"),
);
pub const FILE_INTERFACE: Route = Route::new(
    "file_interface",
    public!("/file/symmetrix/{symid}/file_interface/{id}"),
);

// iterators
pub const ITERATOR: Route = Route::new("iterator", public!("/common/Iterator/{id}"));
pub const ITERATOR_PAGE: Route = Route::new("iterator_page", public!("/common/Iterator/{id}/page"));

/// Every route, for the mock's registration check and for tests.
pub const ALL: &[Route] = &[
    VERSION,
    SYMMETRIX_LIST,
    SYMMETRIX,
    DIRECTOR_LIST,
    PORT_LIST,
    PORT,
    JOB_LIST,
    JOB,
    VOLUME_LIST,
    VOLUME,
    PRIVATE_VOLUME,
    STORAGE_GROUP_LIST,
    STORAGE_GROUP,
    SRP_LIST,
    SRP,
    SLO_LIST,
    MASKING_VIEW_LIST,
    MASKING_VIEW,
    MASKING_VIEW_CONNECTIONS,
    HOST_LIST,
    HOST,
    HOST_GROUP_LIST,
    HOST_GROUP,
    INITIATOR_LIST,
    INITIATOR,
    PORT_GROUP_LIST,
    PORT_GROUP,
    REPLICATION_CAPABILITIES,
    RDF_GROUP_LIST,
    RDF_GROUP,
    RDF_DEVICE_PAIR,
    RDF_STORAGE_GROUP,
    SG_RDF_GROUP_LIST,
    SG_RDF_GROUP,
    FREE_RDF_GROUP_NUMBERS,
    SNAPSHOT_POLICY_LIST,
    SNAPSHOT_POLICY,
    SNAPSHOT,
    VOLUME_SNAPSHOT_LIST,
    VOLUME_SNAPSHOT,
    VOLUME_SNAPSHOT_GENERATION_LIST,
    SYM_VOLUME,
    PERF_STORAGE_GROUP_METRICS,
    PERF_VOLUME_METRICS,
    PERF_STORAGE_GROUP_KEYS,
    PERF_ARRAY_KEYS,
    FILE_SYSTEM_LIST,
    FILE_SYSTEM,
    NFS_EXPORT_LIST,
    NFS_EXPORT,
    NAS_SERVER_LIST,
    NAS_SERVER,
    FILE_INTERFACE_LIST,
    FILE_INTERFACE,
    ITERATOR,
    ITERATOR_PAGE,
];
