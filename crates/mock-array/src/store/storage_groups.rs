use common::provisioning::{
    HostIoLimits, RdfGroupRef, StorageGroup, VOLUME_TYPE_RDF1_TDEV, VOLUME_TYPE_TDEV,
};
use tracing::debug;

use super::Store;
use crate::error::{MockError, MockResult};

impl Store {
    pub fn add_storage_group(&mut self, id: &str, srp: &str, slo: &str) -> MockResult<()> {
        if id.is_empty() {
            return Err(MockError::invalid("storage group id is required"));
        }
        if self.storage_groups.contains_key(id) {
            return Err(MockError::already_exists("Storage Group", id));
        }
        if !srp.is_empty() && srp != "None" && !self.srps.contains_key(srp) {
            return Err(MockError::not_found("SRP", srp));
        }
        if !slo.is_empty() && !self.service_levels.iter().any(|s| s == slo) {
            return Err(MockError::not_found("Service Level", slo));
        }

        let group = StorageGroup {
            storage_group_id: id.to_string(),
            slo: slo.to_string(),
            service_level: slo.to_string(),
            base_slo_name: slo.to_string(),
            srp: srp.to_string(),
            workload: "None".to_string(),
            slo_compliance: "STABLE".to_string(),
            num_of_volumes: 0,
            num_of_child_sgs: 0,
            num_of_parent_sgs: 0,
            num_of_masking_views: 0,
            num_of_snapshots: 0,
            capacity_gb: 0.0,
            device_emulation: "FBA".to_string(),
            sg_type: "Standalone".to_string(),
            unprotected: true,
            child_storage_groups: Vec::new(),
            parent_storage_groups: Vec::new(),
            masking_views: Vec::new(),
            host_io_limit: None,
            compression: true,
        };
        self.storage_groups.insert(id.to_string(), group);
        self.storage_group_volumes.insert(id.to_string(), Vec::new());
        debug!(storage_group = id, srp, slo, "storage group created");
        Ok(())
    }

    pub fn storage_group(&self, id: &str) -> MockResult<&StorageGroup> {
        self.storage_groups
            .get(id)
            .ok_or_else(|| MockError::not_found("Storage Group", id))
    }

    fn storage_group_mut(&mut self, id: &str) -> MockResult<&mut StorageGroup> {
        self.storage_groups
            .get_mut(id)
            .ok_or_else(|| MockError::not_found("Storage Group", id))
    }

    /// Link a volume and a storage group in both directions and propagate
    /// the group's replication and masking state onto the volume.
    pub fn add_volume_to_storage_group(&mut self, volume_id: &str, sg_id: &str) -> MockResult<()> {
        self.storage_group(sg_id)?;
        let volume = self.volume(volume_id)?;
        if volume.storage_group_ids.iter().any(|s| s == sg_id) {
            return Err(MockError::conflict(format!(
                "Volume {volume_id} is already a member of storage group {sg_id}"
            )));
        }

        let Some(volume) = self.volumes.get_mut(volume_id) else {
            return Err(MockError::not_found("Volume", volume_id));
        };
        volume.storage_group_ids.push(sg_id.to_string());
        volume.number_of_storage_groups = volume.storage_group_ids.len();
        let capacity = volume.capacity_gb;

        let members = self
            .storage_group_volumes
            .entry(sg_id.to_string())
            .or_default();
        members.push(volume_id.to_string());
        let count = members.len();

        let group = self.storage_group_mut(sg_id)?;
        group.num_of_volumes = count;
        group.capacity_gb += capacity;

        self.refresh_front_end_paths(volume_id);
        self.refresh_replication(volume_id);
        if self.rdf_storage_groups.contains_key(sg_id) {
            self.pair_volume(volume_id, sg_id);
            if let Some(rdf_sg) = self.rdf_storage_groups.get_mut(sg_id) {
                rdf_sg.num_devices_non_gk = count;
                rdf_sg.capacity_gb += capacity;
            }
        }
        Ok(())
    }

    /// Inverse of [`Store::add_volume_to_storage_group`].
    pub fn remove_volume_from_storage_group(
        &mut self,
        volume_id: &str,
        sg_id: &str,
    ) -> MockResult<()> {
        self.storage_group(sg_id)?;
        let volume = self.volume(volume_id)?;
        if !volume.storage_group_ids.iter().any(|s| s == sg_id) {
            return Err(MockError::invalid(format!(
                "Volume {volume_id} is not a member of storage group {sg_id}"
            )));
        }

        let Some(volume) = self.volumes.get_mut(volume_id) else {
            return Err(MockError::not_found("Volume", volume_id));
        };
        volume.storage_group_ids.retain(|s| s != sg_id);
        volume.number_of_storage_groups = volume.storage_group_ids.len();
        let capacity = volume.capacity_gb;

        let members = self
            .storage_group_volumes
            .entry(sg_id.to_string())
            .or_default();
        members.retain(|v| v != volume_id);
        let count = members.len();

        let group = self.storage_group_mut(sg_id)?;
        group.num_of_volumes = count;
        group.capacity_gb = (group.capacity_gb - capacity).max(0.0);

        if let Some(rdf_sg) = self.rdf_storage_groups.get_mut(sg_id) {
            rdf_sg.num_devices_non_gk = count;
            rdf_sg.capacity_gb = (rdf_sg.capacity_gb - capacity).max(0.0);
        }
        self.refresh_front_end_paths(volume_id);
        self.refresh_replication(volume_id);
        Ok(())
    }

    /// A volume has a front-end path while any of its groups is masked.
    pub(crate) fn refresh_front_end_paths(&mut self, volume_id: &str) {
        let Some(volume) = self.volumes.get(volume_id) else {
            return;
        };
        let masked = volume.storage_group_ids.iter().any(|sg| {
            self.storage_groups
                .get(sg)
                .is_some_and(|g| g.num_of_masking_views > 0)
        });
        if let Some(volume) = self.volumes.get_mut(volume_id) {
            volume.number_of_front_end_paths = usize::from(masked);
        }
    }

    /// Recompute a volume's RDF type from the groups that own it. The
    /// volume is R1 exactly while some owning group is protected.
    pub(crate) fn refresh_replication(&mut self, volume_id: &str) {
        let Some(volume) = self.volumes.get(volume_id) else {
            return;
        };
        let refs: Vec<RdfGroupRef> = volume
            .storage_group_ids
            .iter()
            .filter_map(|sg| self.sg_rdf.get(sg))
            .map(|info| RdfGroupRef {
                rdf_group_number: info.rdf_group_number,
                label: self
                    .rdf_groups
                    .get(&info.rdf_group_number)
                    .map(|g| g.label.clone())
                    .unwrap_or_default(),
            })
            .collect();

        let protected = !refs.is_empty();
        if let Some(volume) = self.volumes.get_mut(volume_id) {
            if protected {
                volume.volume_type = VOLUME_TYPE_RDF1_TDEV.to_string();
                volume.rdf_group_ids = refs;
            } else {
                volume.volume_type = VOLUME_TYPE_TDEV.to_string();
                volume.rdf_group_ids.clear();
            }
        }
        if !protected {
            self.unpair_volume(volume_id);
        }
    }

    pub fn set_storage_group_slo(&mut self, sg_id: &str, slo: &str) -> MockResult<()> {
        if !self.service_levels.iter().any(|s| s == slo) {
            return Err(MockError::not_found("Service Level", slo));
        }
        let group = self.storage_group_mut(sg_id)?;
        group.slo = slo.to_string();
        group.service_level = slo.to_string();
        group.base_slo_name = slo.to_string();
        Ok(())
    }

    pub fn set_storage_group_srp(&mut self, sg_id: &str, srp: &str) -> MockResult<()> {
        if srp != "None" && !self.srps.contains_key(srp) {
            return Err(MockError::not_found("SRP", srp));
        }
        self.storage_group_mut(sg_id)?.srp = srp.to_string();
        Ok(())
    }

    pub fn set_host_io_limits(&mut self, sg_id: &str, limits: HostIoLimits) -> MockResult<()> {
        self.storage_group_mut(sg_id)?.host_io_limit = Some(limits);
        Ok(())
    }

    /// Rename a group and every reference to it.
    pub fn rename_storage_group(&mut self, sg_id: &str, new_id: &str) -> MockResult<()> {
        if new_id.is_empty() {
            return Err(MockError::invalid("new storage group name is required"));
        }
        if self.storage_groups.contains_key(new_id) {
            return Err(MockError::already_exists("Storage Group", new_id));
        }
        let Some(mut group) = self.storage_groups.remove(sg_id) else {
            return Err(MockError::not_found("Storage Group", sg_id));
        };
        group.storage_group_id = new_id.to_string();
        self.storage_groups.insert(new_id.to_string(), group);

        let members = self.storage_group_volumes.remove(sg_id).unwrap_or_default();
        for volume_id in &members {
            if let Some(volume) = self.volumes.get_mut(volume_id) {
                for sg in volume.storage_group_ids.iter_mut().filter(|s| s.as_str() == sg_id) {
                    *sg = new_id.to_string();
                }
            }
        }
        self.storage_group_volumes.insert(new_id.to_string(), members);

        for view in self.masking_views.values_mut() {
            if view.storage_group_id == sg_id {
                view.storage_group_id = new_id.to_string();
            }
        }
        if let Some(mut rdf_sg) = self.rdf_storage_groups.remove(sg_id) {
            rdf_sg.name = new_id.to_string();
            self.rdf_storage_groups.insert(new_id.to_string(), rdf_sg);
        }
        if let Some(mut info) = self.sg_rdf.remove(sg_id) {
            info.storage_group_name = new_id.to_string();
            self.sg_rdf.insert(new_id.to_string(), info);
        }
        for policy in self.snapshot_policies.values_mut() {
            for sg in policy.storage_groups.iter_mut().filter(|s| s.as_str() == sg_id) {
                *sg = new_id.to_string();
            }
        }
        Ok(())
    }

    /// Delete an empty, unmasked, unprotected group.
    pub fn delete_storage_group(&mut self, sg_id: &str) -> MockResult<()> {
        let group = self.storage_group(sg_id)?;
        if group.num_of_masking_views > 0 {
            return Err(MockError::conflict(format!(
                "Storage group {sg_id} is part of masking view(s) {}",
                group.masking_views.join(",")
            )));
        }
        if !self.volumes_in(sg_id).is_empty() {
            return Err(MockError::conflict(format!(
                "Storage group {sg_id} still contains {} volume(s)",
                self.volumes_in(sg_id).len()
            )));
        }
        if self.rdf_storage_groups.contains_key(sg_id) {
            return Err(MockError::conflict(format!(
                "Storage group {sg_id} is protected by SRDF"
            )));
        }
        self.storage_groups.remove(sg_id);
        self.storage_group_volumes.remove(sg_id);
        for policy in self.snapshot_policies.values_mut() {
            policy.storage_groups.retain(|s| s != sg_id);
            policy.storage_group_count = policy.storage_groups.len();
        }
        Ok(())
    }
}
