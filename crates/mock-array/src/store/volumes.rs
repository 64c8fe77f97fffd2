use common::provisioning::{Volume, VOLUME_TYPE_TDEV};
use common::version::{CapacityUnit, NewVolumeSpec, MB_PER_CYL};
use tracing::debug;

use super::Store;
use crate::error::{MockError, MockResult};

fn fill_capacity(volume: &mut Volume, cylinders: u64) {
    let mb = cylinders as f64 * MB_PER_CYL;
    volume.capacity_cyl = cylinders;
    volume.capacity_mb = mb;
    volume.capacity_gb = (mb / 1024.0 * 100.0).round() / 100.0;
}

impl Store {
    /// Create a volume with an explicit id and, optionally, place it in a
    /// storage group. `size` is in cylinders.
    pub fn add_new_volume(
        &mut self,
        volume_id: &str,
        identifier: &str,
        size: u64,
        storage_group: Option<&str>,
    ) -> MockResult<()> {
        if volume_id.is_empty() {
            return Err(MockError::invalid("volume id is required"));
        }
        if self.volumes.contains_key(volume_id) {
            return Err(MockError::already_exists("Volume", volume_id));
        }
        if let Some(sg) = storage_group {
            if !self.storage_groups.contains_key(sg) {
                return Err(MockError::not_found("Storage Group", sg));
            }
        }

        let symid = self.arrays.first().cloned().unwrap_or_default();
        let mut volume = Volume {
            volume_id: volume_id.to_string(),
            volume_type: VOLUME_TYPE_TDEV.to_string(),
            emulation: "FBA".to_string(),
            ssid: "FFFFFFFF".to_string(),
            allocated_percent: 0,
            capacity_gb: 0.0,
            capacity_mb: 0.0,
            capacity_cyl: 0,
            status: "Ready".to_string(),
            reserved: false,
            pinned: false,
            volume_identifier: identifier.to_string(),
            wwn: format!("60000970000{symid}5330{volume_id}"),
            encapsulated: false,
            number_of_storage_groups: 0,
            number_of_front_end_paths: 0,
            storage_group_ids: Vec::new(),
            rdf_group_ids: Vec::new(),
            symmetrix_port_keys: Vec::new(),
            snapvx_source: false,
            snapvx_target: false,
            mobility_id_enabled: false,
        };
        fill_capacity(&mut volume, size);
        self.volumes.insert(volume_id.to_string(), volume);
        debug!(volume = volume_id, identifier, size, "volume created");

        if let Some(sg) = storage_group {
            self.add_volume_to_storage_group(volume_id, sg)?;
        }
        Ok(())
    }

    /// Create volumes described by an add-volume payload, returning their ids.
    pub fn create_volumes(
        &mut self,
        specs: &[NewVolumeSpec],
        storage_group: Option<&str>,
    ) -> MockResult<Vec<String>> {
        if let Some(sg) = storage_group {
            if !self.storage_groups.contains_key(sg) {
                return Err(MockError::not_found("Storage Group", sg));
            }
        }
        if specs.iter().any(|s| s.size == 0) {
            return Err(MockError::invalid("volume size must be greater than zero"));
        }

        let mut created = Vec::new();
        for spec in specs {
            let cylinders = spec.unit.to_cylinders(spec.size);
            for _ in 0..spec.count {
                let id = self.allocate_volume_id();
                let identifier = spec.identifier.clone().unwrap_or_default();
                self.add_new_volume(&id, &identifier, cylinders, storage_group)?;
                if let Some(v) = self.volumes.get_mut(&id) {
                    v.emulation = spec.emulation.clone();
                }
                created.push(id);
            }
        }
        Ok(created)
    }

    pub fn volume(&self, volume_id: &str) -> MockResult<&Volume> {
        self.volumes
            .get(volume_id)
            .ok_or_else(|| MockError::not_found("Volume", volume_id))
    }

    fn volume_mut(&mut self, volume_id: &str) -> MockResult<&mut Volume> {
        self.volumes
            .get_mut(volume_id)
            .ok_or_else(|| MockError::not_found("Volume", volume_id))
    }

    pub fn rename_volume(&mut self, volume_id: &str, identifier: &str) -> MockResult<()> {
        self.volume_mut(volume_id)?.volume_identifier = identifier.to_string();
        Ok(())
    }

    /// Grow a volume. Shrinking is rejected.
    pub fn expand_volume(&mut self, volume_id: &str, size: u64, unit: CapacityUnit) -> MockResult<()> {
        let cylinders = unit.to_cylinders(size);
        let volume = self.volume_mut(volume_id)?;
        if cylinders < volume.capacity_cyl {
            return Err(MockError::invalid(format!(
                "new size {cylinders} CYL is smaller than current size {} CYL of volume {volume_id}",
                volume.capacity_cyl
            )));
        }
        let old_gb = volume.capacity_gb;
        fill_capacity(volume, cylinders);
        let delta = volume.capacity_gb - old_gb;
        let groups = volume.storage_group_ids.clone();
        for sg in groups {
            if let Some(group) = self.storage_groups.get_mut(&sg) {
                group.capacity_gb += delta;
            }
        }
        Ok(())
    }

    /// Delete a volume that is in no storage group and takes part in no
    /// snapshot.
    pub fn delete_volume(&mut self, volume_id: &str) -> MockResult<()> {
        let volume = self.volume(volume_id)?;
        if volume.number_of_storage_groups > 0 {
            return Err(MockError::conflict(format!(
                "Volume {volume_id} is a member of storage group(s) {}",
                volume.storage_group_ids.join(",")
            )));
        }
        if volume.snapvx_source || volume.snapvx_target {
            return Err(MockError::conflict(format!(
                "Volume {volume_id} is in a SnapVX session"
            )));
        }
        self.volumes.remove(volume_id);
        Ok(())
    }

    /// Volume ids matching the list filters.
    pub fn volume_ids(&self, identifier: Option<&str>, storage_group: Option<&str>) -> Vec<String> {
        self.volumes
            .values()
            .filter(|v| match identifier {
                Some(filter) => match filter.strip_prefix("<like>") {
                    Some(part) => v.volume_identifier.contains(part),
                    None => v.volume_identifier == filter,
                },
                None => true,
            })
            .filter(|v| storage_group.map_or(true, |sg| v.storage_group_ids.iter().any(|s| s == sg)))
            .map(|v| v.volume_id.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_store;
    use super::*;

    #[test]
    fn capacity_is_derived_from_cylinders() {
        let mut store = test_store();
        store.add_new_volume("00001", "vol1", 547, None).unwrap();
        let v = store.volume("00001").unwrap();
        assert_eq!(v.capacity_cyl, 547);
        assert!((v.capacity_gb - 1.0).abs() < 0.01);
        assert_eq!(v.volume_type, VOLUME_TYPE_TDEV);
    }

    #[test]
    fn duplicate_and_missing_group() {
        let mut store = test_store();
        store.add_new_volume("00001", "vol1", 10, None).unwrap();
        assert!(matches!(
            store.add_new_volume("00001", "vol1", 10, None),
            Err(MockError::Conflict(_))
        ));
        assert!(matches!(
            store.add_new_volume("00002", "vol2", 10, Some("nope")),
            Err(MockError::NotFound(_))
        ));
        assert!(!store.volumes.contains_key("00002"));
    }

    #[test]
    fn create_from_specs_allocates_ids() {
        let mut store = test_store();
        let spec = NewVolumeSpec {
            identifier: Some("pv".into()),
            size: 1,
            unit: CapacityUnit::Gb,
            count: 2,
            emulation: "FBA".into(),
        };
        let ids = store.create_volumes(&[spec], None).unwrap();
        assert_eq!(ids, vec!["00001".to_string(), "00002".to_string()]);
        assert_eq!(store.volume_ids(Some("pv"), None).len(), 2);
        assert_eq!(store.volume_ids(Some("<like>p"), None).len(), 2);
        assert!(store.volume_ids(Some("other"), None).is_empty());
    }

    #[test]
    fn expand_rejects_shrink() {
        let mut store = test_store();
        store.add_new_volume("00001", "vol1", 547, None).unwrap();
        assert!(store.expand_volume("00001", 10, CapacityUnit::Cyl).is_err());
        store.expand_volume("00001", 2, CapacityUnit::Gb).unwrap();
        assert_eq!(store.volume("00001").unwrap().capacity_cyl, 1093);
    }

    #[test]
    fn delete_requires_no_membership() {
        let mut store = test_store();
        store.add_storage_group("sg1", "SRP_1", "Diamond").unwrap();
        store.add_new_volume("00001", "vol1", 10, Some("sg1")).unwrap();
        assert!(matches!(
            store.delete_volume("00001"),
            Err(MockError::Conflict(_))
        ));
        store.remove_volume_from_storage_group("00001", "sg1").unwrap();
        store.delete_volume("00001").unwrap();
        assert!(store.volume("00001").is_err());
    }
}
