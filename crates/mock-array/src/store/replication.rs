use common::replication::{
    CreateSgSrdf, FreeRdfGroupNumbers, RdfAction, RdfDevicePair, RdfGroup, RdfGroupEntry,
    RdfGroupList, RdfPairState, RdfStorageGroup, SgRdfGroupList, SgRdfInfo,
    SymReplicationCapabilities, SymmetrixCapability,
};
use tracing::{debug, info};

use super::Store;
use crate::error::{MockError, MockResult};

/// Highest RDF group number the array hands out.
const MAX_RDF_GROUP: u32 = 250;

fn volume_states(state: RdfPairState) -> (&'static str, &'static str) {
    match state {
        RdfPairState::FailedOver => ("Write Disabled", "Ready"),
        RdfPairState::Consistent | RdfPairState::Suspended => ("Ready", "Write Disabled"),
    }
}

impl Store {
    pub fn rdf_group(&self, rdfg: u32) -> MockResult<&RdfGroup> {
        self.rdf_groups
            .get(&rdfg)
            .ok_or_else(|| MockError::not_found("RDF Group", rdfg))
    }

    pub fn rdf_group_list(&self) -> RdfGroupList {
        RdfGroupList {
            count: self.rdf_groups.len(),
            groups: self
                .rdf_groups
                .values()
                .map(|g| RdfGroupEntry {
                    rdfg_number: g.rdfg_number,
                    label: g.label.clone(),
                })
                .collect(),
        }
    }

    pub fn replication_capabilities(&self) -> SymReplicationCapabilities {
        SymReplicationCapabilities {
            capabilities: self
                .arrays
                .iter()
                .map(|symid| SymmetrixCapability {
                    symmetrix_id: symid.clone(),
                    snapvx_capable: true,
                    rdf_capable: true,
                })
                .collect(),
        }
    }

    /// Replication facet of a storage group. Unprotected groups get a
    /// facet with `rdf` unset.
    pub fn rdf_storage_group(&self, symid: &str, sg_id: &str) -> MockResult<RdfStorageGroup> {
        let group = self.storage_group(sg_id)?;
        if let Some(rdf_sg) = self.rdf_storage_groups.get(sg_id) {
            return Ok(rdf_sg.clone());
        }
        Ok(RdfStorageGroup {
            name: sg_id.to_string(),
            symmetrix_id: symid.to_string(),
            snapvx_snapshots: Vec::new(),
            num_snapvx_snapshots: 0,
            rdf: false,
            num_devices_non_gk: group.num_of_volumes,
            capacity_gb: group.capacity_gb,
        })
    }

    pub fn sg_rdf_groups(&self, sg_id: &str) -> MockResult<SgRdfGroupList> {
        self.storage_group(sg_id)?;
        Ok(SgRdfGroupList {
            rdf_groups: self
                .sg_rdf
                .get(sg_id)
                .map(|info| vec![info.rdf_group_number])
                .unwrap_or_default(),
        })
    }

    pub fn sg_rdf_info(&self, sg_id: &str, rdfg: u32) -> MockResult<&SgRdfInfo> {
        self.storage_group(sg_id)?;
        self.sg_rdf
            .get(sg_id)
            .filter(|info| info.rdf_group_number == rdfg)
            .ok_or_else(MockError::invalid_ra_group)
    }

    pub fn rdf_device_pair(&self, rdfg: u32, volume_id: &str) -> MockResult<&RdfDevicePair> {
        self.rdf_group(rdfg)?;
        self.rdf_pairs
            .get(volume_id)
            .filter(|pair| pair.local_rdf_group_number == rdfg)
            .ok_or_else(|| MockError::not_found("RDF device pair for volume", volume_id))
    }

    /// Group numbers in use on neither side.
    pub fn free_rdf_group_numbers(&self) -> FreeRdfGroupNumbers {
        let local: Vec<u32> = (1..=MAX_RDF_GROUP)
            .filter(|n| !self.rdf_groups.contains_key(n))
            .collect();
        let remote: Vec<u32> = (1..=MAX_RDF_GROUP)
            .filter(|n| !self.rdf_groups.values().any(|g| g.remote_rdfg_number == *n))
            .collect();
        FreeRdfGroupNumbers { local, remote }
    }

    /// Create the device pair of a volume joining the protected group `sg_id`.
    pub(crate) fn pair_volume(&mut self, volume_id: &str, sg_id: &str) {
        let Some(info) = self.sg_rdf.get(sg_id) else {
            return;
        };
        let rdfg = info.rdf_group_number;
        let state = info
            .states
            .first()
            .cloned()
            .unwrap_or_else(|| RdfPairState::Suspended.to_string());
        let mode = info.modes.first().cloned().unwrap_or_default();
        let (local_state, remote_state) = match state.as_str() {
            "Failed Over" => volume_states(RdfPairState::FailedOver),
            _ => volume_states(RdfPairState::Consistent),
        };
        let remote_rdfg = self
            .rdf_groups
            .get(&rdfg)
            .map(|g| g.remote_rdfg_number)
            .unwrap_or(rdfg);
        let capacity = self.volumes.get(volume_id).map_or(0.0, |v| v.capacity_gb);

        let pair = RdfDevicePair {
            remote_volume_name: volume_id.to_string(),
            local_volume_name: volume_id.to_string(),
            remote_symmetrix_id: self.remote_array.clone(),
            local_symmetrix_id: self.arrays.first().cloned().unwrap_or_default(),
            local_rdf_group_number: rdfg,
            remote_rdf_group_number: remote_rdfg,
            rdf_mode: mode,
            rdf_pair_state: state,
            local_volume_state: local_state.to_string(),
            remote_volume_state: remote_state.to_string(),
        };
        if self.rdf_pairs.insert(volume_id.to_string(), pair).is_none() {
            if let Some(group) = self.rdf_groups.get_mut(&rdfg) {
                group.num_devices += 1;
                group.total_device_capacity += capacity;
            }
        }
    }

    pub(crate) fn unpair_volume(&mut self, volume_id: &str) {
        let Some(pair) = self.rdf_pairs.remove(volume_id) else {
            return;
        };
        let capacity = self.volumes.get(volume_id).map_or(0.0, |v| v.capacity_gb);
        if let Some(group) = self.rdf_groups.get_mut(&pair.local_rdf_group_number) {
            group.num_devices = group.num_devices.saturating_sub(1);
            group.total_device_capacity = (group.total_device_capacity - capacity).max(0.0);
        }
    }

    /// Protect a storage group with SRDF through group `param.rdfg_number`.
    ///
    /// Pairs start `Consistent` when `establish` is set and `Suspended`
    /// otherwise.
    pub fn protect_storage_group(
        &mut self,
        symid: &str,
        sg_id: &str,
        param: &CreateSgSrdf,
    ) -> MockResult<()> {
        let group = self.storage_group(sg_id)?;
        let capacity = group.capacity_gb;
        let rdf_group = self
            .rdf_groups
            .get(&param.rdfg_number)
            .ok_or_else(MockError::invalid_ra_group)?;
        if !param.remote_symmetrix_id.is_empty()
            && param.remote_symmetrix_id != rdf_group.remote_symmetrix
        {
            return Err(MockError::invalid(format!(
                "RDF group {} does not connect to array {}",
                param.rdfg_number, param.remote_symmetrix_id
            )));
        }
        if self.rdf_storage_groups.contains_key(sg_id) {
            return Err(MockError::conflict(format!(
                "Storage group {sg_id} is already protected by SRDF"
            )));
        }

        let state = if param.establish {
            RdfPairState::Consistent
        } else {
            RdfPairState::Suspended
        };
        let members = self.volumes_in(sg_id).to_vec();
        self.rdf_storage_groups.insert(
            sg_id.to_string(),
            RdfStorageGroup {
                name: sg_id.to_string(),
                symmetrix_id: symid.to_string(),
                snapvx_snapshots: Vec::new(),
                num_snapvx_snapshots: 0,
                rdf: true,
                num_devices_non_gk: members.len(),
                capacity_gb: capacity,
            },
        );
        self.sg_rdf.insert(
            sg_id.to_string(),
            SgRdfInfo {
                storage_group_name: sg_id.to_string(),
                symmetrix_id: symid.to_string(),
                rdf_group_number: param.rdfg_number,
                volume_rdf_types: vec!["R1".to_string()],
                states: vec![state.to_string()],
                modes: vec![param.replication_mode.to_string()],
                larger_rdf_sides: vec!["Equal".to_string()],
            },
        );
        if let Some(group) = self.storage_groups.get_mut(sg_id) {
            group.unprotected = false;
        }
        for volume_id in &members {
            self.refresh_replication(volume_id);
            self.pair_volume(volume_id, sg_id);
        }
        info!(
            storage_group = sg_id,
            rdfg = param.rdfg_number,
            mode = %param.replication_mode,
            state = %state,
            "storage group protected"
        );
        Ok(())
    }

    /// Apply a named SRDF action to a protected group.
    pub fn rdf_action(&mut self, sg_id: &str, rdfg: u32, action: &str) -> MockResult<RdfPairState> {
        self.storage_group(sg_id)?;
        let action: RdfAction = action.parse().map_err(|_| MockError::invalid_ra_group())?;
        let info = self
            .sg_rdf
            .get_mut(sg_id)
            .filter(|info| info.rdf_group_number == rdfg)
            .ok_or_else(MockError::invalid_ra_group)?;

        let state = action.resulting_state();
        info.states = vec![state.to_string()];
        if action == RdfAction::Swap {
            for side in info.volume_rdf_types.iter_mut() {
                *side = if side.as_str() == "R1" { "R2" } else { "R1" }.to_string();
            }
        }

        let (local_state, remote_state) = volume_states(state);
        for volume_id in self.volumes_in(sg_id).to_vec() {
            if let Some(pair) = self.rdf_pairs.get_mut(&volume_id) {
                pair.rdf_pair_state = state.to_string();
                pair.local_volume_state = local_state.to_string();
                pair.remote_volume_state = remote_state.to_string();
            }
        }
        debug!(storage_group = sg_id, rdfg, action = action.as_str(), %state, "rdf action applied");
        Ok(state)
    }

    /// Remove SRDF protection. The pairs must not be `Consistent`.
    pub fn unprotect_storage_group(&mut self, sg_id: &str, rdfg: u32) -> MockResult<()> {
        let info = self.sg_rdf_info(sg_id, rdfg)?;
        if info
            .states
            .iter()
            .any(|s| s == RdfPairState::Consistent.as_str())
        {
            return Err(MockError::conflict(format!(
                "Storage group {sg_id} must be suspended before its SRDF protection is removed"
            )));
        }

        self.sg_rdf.remove(sg_id);
        self.rdf_storage_groups.remove(sg_id);
        if let Some(group) = self.storage_groups.get_mut(sg_id) {
            group.unprotected = true;
        }
        for volume_id in self.volumes_in(sg_id).to_vec() {
            self.refresh_replication(&volume_id);
        }
        info!(storage_group = sg_id, rdfg, "storage group unprotected");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::{test_store, DEFAULT_RDF_GROUP};
    use super::*;
    use crate::error::INVALID_RA_GROUP;
    use common::provisioning::{VOLUME_TYPE_RDF1_TDEV, VOLUME_TYPE_TDEV};
    use common::replication::RdfMode;
    use common::ExecutionOption;

    const SYMID: &str = "000197900046";

    fn protect_param(establish: bool) -> CreateSgSrdf {
        CreateSgSrdf {
            remote_symmetrix_id: "000000000013".into(),
            replication_mode: RdfMode::Asynchronous,
            remote_storage_group_name: "sg1".into(),
            remote_slo: "Diamond".into(),
            rdfg_number: DEFAULT_RDF_GROUP,
            establish,
            execution_option: ExecutionOption::Synchronous,
        }
    }

    fn protected_store(establish: bool) -> Store {
        let mut store = test_store();
        store.add_storage_group("sg1", "SRP_1", "Diamond").unwrap();
        store.add_new_volume("00001", "vol1", 10, Some("sg1")).unwrap();
        store
            .protect_storage_group(SYMID, "sg1", &protect_param(establish))
            .unwrap();
        store
    }

    #[test]
    fn protect_marks_volumes_r1() {
        let store = protected_store(true);
        let v = store.volume("00001").unwrap();
        assert_eq!(v.volume_type, VOLUME_TYPE_RDF1_TDEV);
        assert_eq!(v.rdf_group_ids[0].rdf_group_number, DEFAULT_RDF_GROUP);
        assert!(!store.storage_group("sg1").unwrap().unprotected);

        let pair = store.rdf_device_pair(DEFAULT_RDF_GROUP, "00001").unwrap();
        assert_eq!(pair.rdf_pair_state, "Consistent");
        assert_eq!(store.rdf_group(DEFAULT_RDF_GROUP).unwrap().num_devices, 1);
    }

    #[test]
    fn volumes_follow_group_protection() {
        let mut store = protected_store(false);
        store.add_new_volume("00002", "vol2", 10, Some("sg1")).unwrap();
        assert_eq!(store.volume("00002").unwrap().volume_type, VOLUME_TYPE_RDF1_TDEV);
        assert_eq!(store.rdf_storage_group(SYMID, "sg1").unwrap().num_devices_non_gk, 2);

        store.remove_volume_from_storage_group("00002", "sg1").unwrap();
        let v = store.volume("00002").unwrap();
        assert_eq!(v.volume_type, VOLUME_TYPE_TDEV);
        assert!(v.rdf_group_ids.is_empty());
        assert!(store.rdf_device_pair(DEFAULT_RDF_GROUP, "00002").is_err());
    }

    #[test]
    fn suspend_then_resume_is_consistent() {
        let mut store = protected_store(true);
        assert_eq!(
            store.rdf_action("sg1", DEFAULT_RDF_GROUP, "Suspend").unwrap(),
            RdfPairState::Suspended
        );
        assert_eq!(
            store.rdf_action("sg1", DEFAULT_RDF_GROUP, "Resume").unwrap(),
            RdfPairState::Consistent
        );
        let info = store.sg_rdf_info("sg1", DEFAULT_RDF_GROUP).unwrap();
        assert_eq!(info.states, vec!["Consistent".to_string()]);

        store.rdf_action("sg1", DEFAULT_RDF_GROUP, "Failover").unwrap();
        let pair = store.rdf_device_pair(DEFAULT_RDF_GROUP, "00001").unwrap();
        assert_eq!(pair.rdf_pair_state, "Failed Over");
        assert_eq!(pair.local_volume_state, "Write Disabled");
    }

    #[test]
    fn unknown_group_or_action_is_invalid_ra_group() {
        let mut store = protected_store(true);
        let err = store.rdf_action("sg1", 99, "Suspend").unwrap_err();
        assert_eq!(err, MockError::NotFound(INVALID_RA_GROUP.to_string()));
        let err = store.rdf_action("sg1", DEFAULT_RDF_GROUP, "Pause").unwrap_err();
        assert_eq!(err.to_string(), INVALID_RA_GROUP);
    }

    #[test]
    fn unprotect_requires_suspended_pairs() {
        let mut store = protected_store(true);
        assert!(matches!(
            store.unprotect_storage_group("sg1", DEFAULT_RDF_GROUP),
            Err(MockError::Conflict(_))
        ));
        assert!(matches!(
            store.delete_storage_group("sg1"),
            Err(MockError::Conflict(_))
        ));

        store.rdf_action("sg1", DEFAULT_RDF_GROUP, "Suspend").unwrap();
        store.unprotect_storage_group("sg1", DEFAULT_RDF_GROUP).unwrap();
        assert_eq!(store.volume("00001").unwrap().volume_type, VOLUME_TYPE_TDEV);
        assert!(store.storage_group("sg1").unwrap().unprotected);
        assert!(store.rdf_pairs.is_empty());
        assert_eq!(store.rdf_group(DEFAULT_RDF_GROUP).unwrap().num_devices, 0);
        assert!(store.sg_rdf_groups("sg1").unwrap().rdf_groups.is_empty());
    }

    #[test]
    fn double_protect_conflicts() {
        let mut store = protected_store(false);
        assert!(matches!(
            store.protect_storage_group(SYMID, "sg1", &protect_param(false)),
            Err(MockError::Conflict(_))
        ));
    }

    #[test]
    fn free_numbers_skip_used_groups() {
        let store = test_store();
        let free = store.free_rdf_group_numbers();
        assert!(!free.local.contains(&DEFAULT_RDF_GROUP));
        assert!(free.local.contains(&1));
        assert_eq!(free.local.len(), 249);
        assert!(!free.remote.contains(&DEFAULT_RDF_GROUP));
    }
}
