//! In-memory object graph of the mock array.
//!
//! Every entity lives in an id-keyed map owned by [`Store`]. Mutators live in
//! the submodules, one per resource family, and keep the denormalised counts
//! and membership lists in step as they go.

use common::file::{FileInterface, FileSystem, NasServer, NfsExport};
use common::provisioning::{
    Host, HostGroup, Initiator, MaskingView, PortGroup, PortKey, StorageGroup, StoragePool,
    Volume,
};
use common::replication::{
    RdfDevicePair, RdfGroup, RdfMode, RdfStorageGroup, SgRdfInfo, SnapshotPolicy,
};
use std::collections::{BTreeMap, BTreeSet};

use crate::config::MockConfig;
use crate::error::{MockError, MockResult};

mod file;
mod hosts;
mod masking;
mod port_groups;
mod replication;
mod snapshots;
mod storage_groups;
mod volumes;

pub use snapshots::{SnapshotGeneration, SnapshotLink};

pub const DEFAULT_SRP: &str = "SRP_1";
pub const SERVICE_LEVELS: &[&str] = &[
    "Diamond",
    "Platinum",
    "Gold",
    "Silver",
    "Bronze",
    "Optimized",
    "None",
];
pub const DEFAULT_RDF_GROUP: u32 = 10;
pub const DEFAULT_NAS_SERVER: &str = "nas-1";

/// Front-end port of a director, rendered through the port fixture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectorPort {
    pub port: String,
    pub port_type: &'static str,
    pub identifier: String,
}

#[derive(Debug)]
pub struct Store {
    pub arrays: Vec<String>,
    pub remote_array: String,

    pub volumes: BTreeMap<String, Volume>,
    pub storage_groups: BTreeMap<String, StorageGroup>,
    /// Storage group id to member volume ids, in insertion order.
    pub storage_group_volumes: BTreeMap<String, Vec<String>>,
    pub srps: BTreeMap<String, StoragePool>,
    pub service_levels: Vec<String>,
    pub directors: BTreeMap<String, Vec<DirectorPort>>,

    pub masking_views: BTreeMap<String, MaskingView>,
    pub hosts: BTreeMap<String, Host>,
    pub host_groups: BTreeMap<String, HostGroup>,
    pub initiators: BTreeMap<String, Initiator>,
    pub port_groups: BTreeMap<String, PortGroup>,

    pub rdf_groups: BTreeMap<u32, RdfGroup>,
    pub rdf_storage_groups: BTreeMap<String, RdfStorageGroup>,
    /// Replication state per protected storage group.
    pub sg_rdf: BTreeMap<String, SgRdfInfo>,
    /// Local volume id to its device pair.
    pub rdf_pairs: BTreeMap<String, RdfDevicePair>,

    /// (source volume, snapshot name) to generations, newest first.
    pub snapshots: BTreeMap<(String, String), Vec<SnapshotGeneration>>,
    pub links: BTreeSet<SnapshotLink>,
    pub snapshot_policies: BTreeMap<String, SnapshotPolicy>,

    pub file_systems: BTreeMap<String, FileSystem>,
    pub nfs_exports: BTreeMap<String, NfsExport>,
    pub nas_servers: BTreeMap<String, NasServer>,
    pub file_interfaces: BTreeMap<String, FileInterface>,

    next_volume: u32,
    next_file_object: u32,
}

impl Store {
    /// Empty store with only the static inventory of `config` seeded.
    pub fn new(config: &MockConfig) -> Self {
        let mut store = Self {
            arrays: config.arrays.clone(),
            remote_array: config.remote_array.clone(),
            volumes: BTreeMap::new(),
            storage_groups: BTreeMap::new(),
            storage_group_volumes: BTreeMap::new(),
            srps: BTreeMap::new(),
            service_levels: SERVICE_LEVELS.iter().map(|s| s.to_string()).collect(),
            directors: BTreeMap::new(),
            masking_views: BTreeMap::new(),
            hosts: BTreeMap::new(),
            host_groups: BTreeMap::new(),
            initiators: BTreeMap::new(),
            port_groups: BTreeMap::new(),
            rdf_groups: BTreeMap::new(),
            rdf_storage_groups: BTreeMap::new(),
            sg_rdf: BTreeMap::new(),
            rdf_pairs: BTreeMap::new(),
            snapshots: BTreeMap::new(),
            links: BTreeSet::new(),
            snapshot_policies: BTreeMap::new(),
            file_systems: BTreeMap::new(),
            nfs_exports: BTreeMap::new(),
            nas_servers: BTreeMap::new(),
            file_interfaces: BTreeMap::new(),
            next_volume: 1,
            next_file_object: 1,
        };
        store.seed();
        store
    }

    fn seed(&mut self) {
        self.srps.insert(
            DEFAULT_SRP.to_string(),
            StoragePool {
                srp_id: DEFAULT_SRP.to_string(),
                usable_capacity_gb: 102_400.0,
                allocated_capacity_gb: 0.0,
                subscribed_capacity_gb: 0.0,
                reserved_cap_percent: 10,
                emulation: "FBA".to_string(),
            },
        );

        let seeded_ports: [(&str, &[&str], &'static str); 6] = [
            ("FA-1D", &["4", "5"], "FibreChannel"),
            ("FA-2D", &["4", "5"], "FibreChannel"),
            ("SE-1E", &["0", "1"], "GigE"),
            ("SE-2E", &["0", "1"], "GigE"),
            ("OR-1C", &["0"], "RDF"),
            ("OR-2C", &["0"], "RDF"),
        ];
        for (n, (director, ports, port_type)) in seeded_ports.iter().enumerate() {
            let ports = ports
                .iter()
                .map(|port| DirectorPort {
                    port: port.to_string(),
                    port_type: *port_type,
                    identifier: port_identifier(port_type, n, port),
                })
                .collect();
            self.directors.insert(director.to_string(), ports);
        }

        let seeded_initiators: [(&str, &str, &str); 6] = [
            ("FA-1D", "4", "10000090fa66060a"),
            ("FA-2D", "4", "10000090fa66060a"),
            ("FA-1D", "4", "10000090fa66060b"),
            ("FA-2D", "4", "10000090fa66060b"),
            ("SE-1E", "0", "iqn.1993-08.org.debian:01:5ae293b352a2"),
            ("SE-2E", "0", "iqn.1993-08.org.debian:01:5ae293b352a2"),
        ];
        for (director, port, name) in seeded_initiators {
            let initiator_type = if director.starts_with("SE") {
                "GigE"
            } else {
                "Fibre"
            };
            self.add_initiator(&format!("{director}:{port}:{name}"), initiator_type);
        }

        self.rdf_groups.insert(
            DEFAULT_RDF_GROUP,
            RdfGroup {
                rdfg_number: DEFAULT_RDF_GROUP,
                label: format!("mock_async_{DEFAULT_RDF_GROUP}"),
                remote_rdfg_number: DEFAULT_RDF_GROUP,
                remote_symmetrix: self.remote_array.clone(),
                num_devices: 0,
                total_device_capacity: 0.0,
                local_ports: vec!["OR-1C:0".to_string()],
                remote_ports: vec!["OR-1C:0".to_string()],
                modes: vec![RdfMode::Asynchronous.to_string()],
                group_type: "Dynamic".to_string(),
                metro: false,
                async_mode: true,
            },
        );

        self.seed_nas_server(DEFAULT_NAS_SERVER, "192.168.1.50");
    }

    /// Fail with 404 unless `symid` is one of the managed arrays.
    pub fn check_array(&self, symid: &str) -> MockResult<()> {
        if self.arrays.iter().any(|a| a == symid) {
            Ok(())
        } else {
            Err(MockError::not_found("Symmetrix", symid))
        }
    }

    pub fn port_exists(&self, key: &PortKey) -> bool {
        self.directors
            .get(&key.director_id)
            .is_some_and(|ports| ports.iter().any(|p| p.port == key.port_id))
    }

    /// Volume ids of a storage group, empty when it has none or does not exist.
    pub fn volumes_in(&self, storage_group: &str) -> &[String] {
        self.storage_group_volumes
            .get(storage_group)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn allocate_volume_id(&mut self) -> String {
        loop {
            let id = format!("{:05X}", self.next_volume);
            self.next_volume += 1;
            if !self.volumes.contains_key(&id) {
                return id;
            }
        }
    }

    fn allocate_file_object_id(&mut self, prefix: &str) -> String {
        let id = format!("{prefix}-{:08x}", self.next_file_object);
        self.next_file_object += 1;
        id
    }
}

fn port_identifier(port_type: &str, director_index: usize, port: &str) -> String {
    match port_type {
        "GigE" => format!("iqn.1992-04.com.emc:600009700bcbb70e3287017400000{director_index}{port}"),
        _ => format!("5000097380{:02}{:04}", director_index, port.parse::<u32>().unwrap_or(0)),
    }
}

#[cfg(test)]
pub(crate) fn test_store() -> Store {
    Store::new(&MockConfig::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_inventory() {
        let store = test_store();
        assert!(store.srps.contains_key(DEFAULT_SRP));
        assert_eq!(store.service_levels.len(), 7);
        assert_eq!(store.directors.len(), 6);
        assert!(store.port_exists(&PortKey::new("FA-1D", "4")));
        assert!(!store.port_exists(&PortKey::new("FA-1D", "9")));
        assert!(store.rdf_groups.contains_key(&DEFAULT_RDF_GROUP));
        assert_eq!(store.initiators.len(), 6);
        assert_eq!(store.nas_servers.len(), 1);
    }

    #[test]
    fn array_check() {
        let store = test_store();
        assert!(store.check_array("000197900046").is_ok());
        assert!(matches!(
            store.check_array("000000000001"),
            Err(MockError::NotFound(_))
        ));
    }
}
