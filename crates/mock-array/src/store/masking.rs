use common::provisioning::{MaskingView, MaskingViewConnection};
use tracing::{debug, warn};

use super::Store;
use crate::error::{MockError, MockResult};

impl Store {
    /// Bind a storage group, a host (or host group) and a port group.
    ///
    /// Every referenced object gains the view in its list and count, and
    /// every volume of the storage group gets a front-end path.
    pub fn add_masking_view(
        &mut self,
        view_id: &str,
        storage_group: &str,
        host_or_group: &str,
        is_host: bool,
        port_group: &str,
    ) -> MockResult<()> {
        if view_id.is_empty() {
            return Err(MockError::invalid("masking view id is required"));
        }
        if self.masking_views.contains_key(view_id) {
            return Err(MockError::already_exists("Masking View", view_id));
        }
        self.storage_group(storage_group)?;
        self.port_group(port_group)?;
        if is_host {
            self.host(host_or_group)?;
        } else {
            self.host_group(host_or_group)?;
        }

        let view = MaskingView {
            masking_view_id: view_id.to_string(),
            host_id: if is_host { host_or_group.to_string() } else { String::new() },
            host_group_id: if is_host { String::new() } else { host_or_group.to_string() },
            port_group_id: port_group.to_string(),
            storage_group_id: storage_group.to_string(),
        };
        self.masking_views.insert(view_id.to_string(), view);

        if is_host {
            if let Some(host) = self.hosts.get_mut(host_or_group) {
                host.masking_views.push(view_id.to_string());
                host.num_of_masking_views += 1;
            }
        } else if let Some(group) = self.host_groups.get_mut(host_or_group) {
            group.masking_views.push(view_id.to_string());
            group.num_of_masking_views += 1;
        }
        if let Some(pg) = self.port_groups.get_mut(port_group) {
            pg.masking_views.push(view_id.to_string());
            pg.num_of_masking_views += 1;
        }
        if let Some(sg) = self.storage_groups.get_mut(storage_group) {
            sg.masking_views.push(view_id.to_string());
            sg.num_of_masking_views += 1;
        }
        for volume_id in self.volumes_in(storage_group).to_vec() {
            if let Some(volume) = self.volumes.get_mut(&volume_id) {
                volume.number_of_front_end_paths = 1;
            }
        }
        debug!(view = view_id, storage_group, host_or_group, port_group, "masking view created");
        Ok(())
    }

    pub fn masking_view(&self, view_id: &str) -> MockResult<&MaskingView> {
        self.masking_views
            .get(view_id)
            .ok_or_else(|| MockError::not_found("Masking View", view_id))
    }

    /// Remove a view and undo its bookkeeping.
    ///
    /// The steps run in order and are not rolled back: if a referenced
    /// object has vanished, the earlier steps stay applied and the error is
    /// returned.
    pub fn delete_masking_view(&mut self, view_id: &str) -> MockResult<()> {
        let Some(view) = self.masking_views.remove(view_id) else {
            return Err(MockError::not_found("Masking View", view_id));
        };

        if !view.host_id.is_empty() {
            let host = self.hosts.get_mut(&view.host_id).ok_or_else(|| {
                MockError::Internal(format!(
                    "host {} of masking view {view_id} is missing",
                    view.host_id
                ))
            })?;
            host.masking_views.retain(|v| v != view_id);
            host.num_of_masking_views = host.num_of_masking_views.saturating_sub(1);
        } else {
            let group = self.host_groups.get_mut(&view.host_group_id).ok_or_else(|| {
                MockError::Internal(format!(
                    "host group {} of masking view {view_id} is missing",
                    view.host_group_id
                ))
            })?;
            group.masking_views.retain(|v| v != view_id);
            group.num_of_masking_views = group.num_of_masking_views.saturating_sub(1);
        }

        let pg = self.port_groups.get_mut(&view.port_group_id).ok_or_else(|| {
            MockError::Internal(format!(
                "port group {} of masking view {view_id} is missing",
                view.port_group_id
            ))
        })?;
        pg.masking_views.retain(|v| v != view_id);
        pg.num_of_masking_views = pg.num_of_masking_views.saturating_sub(1);

        let sg = self
            .storage_groups
            .get_mut(&view.storage_group_id)
            .ok_or_else(|| {
                MockError::Internal(format!(
                    "storage group {} of masking view {view_id} is missing",
                    view.storage_group_id
                ))
            })?;
        sg.masking_views.retain(|v| v != view_id);
        sg.num_of_masking_views = sg.num_of_masking_views.saturating_sub(1);

        for volume_id in self.volumes_in(&view.storage_group_id).to_vec() {
            if !self.volumes.contains_key(&volume_id) {
                warn!(volume = %volume_id, view = view_id, "volume vanished during masking view removal");
                return Err(MockError::Internal(format!(
                    "volume {volume_id} of storage group {} is missing",
                    view.storage_group_id
                )));
            }
            self.refresh_front_end_paths(&volume_id);
        }
        Ok(())
    }

    pub fn rename_masking_view(&mut self, view_id: &str, new_id: &str) -> MockResult<()> {
        if new_id.is_empty() {
            return Err(MockError::invalid("new masking view name is required"));
        }
        if self.masking_views.contains_key(new_id) {
            return Err(MockError::already_exists("Masking View", new_id));
        }
        let Some(mut view) = self.masking_views.remove(view_id) else {
            return Err(MockError::not_found("Masking View", view_id));
        };
        view.masking_view_id = new_id.to_string();

        let rename = |list: &mut Vec<String>| {
            for v in list.iter_mut().filter(|v| v.as_str() == view_id) {
                *v = new_id.to_string();
            }
        };
        if let Some(host) = self.hosts.get_mut(&view.host_id) {
            rename(&mut host.masking_views);
        }
        if let Some(group) = self.host_groups.get_mut(&view.host_group_id) {
            rename(&mut group.masking_views);
        }
        if let Some(pg) = self.port_groups.get_mut(&view.port_group_id) {
            rename(&mut pg.masking_views);
        }
        if let Some(sg) = self.storage_groups.get_mut(&view.storage_group_id) {
            rename(&mut sg.masking_views);
        }
        self.masking_views.insert(new_id.to_string(), view);
        Ok(())
    }

    /// One row per (volume, initiator) pair the view exposes.
    pub fn masking_view_connections(&self, view_id: &str) -> MockResult<Vec<MaskingViewConnection>> {
        let view = self.masking_view(view_id)?;
        let initiator_names: Vec<String> = if view.host_id.is_empty() {
            self.host_group(&view.host_group_id)?
                .hosts
                .iter()
                .flat_map(|h| h.initiators.clone())
                .collect()
        } else {
            self.host(&view.host_id)?.initiators.clone()
        };
        let owner = view.initiator_group();
        let initiators: Vec<_> = self
            .initiators
            .values()
            .filter(|i| {
                initiator_names
                    .iter()
                    .any(|n| i.initiator_id.ends_with(n.as_str()))
                    && (i.host == owner || !view.host_group_id.is_empty())
            })
            .collect();
        let ports = &self.port_group(&view.port_group_id)?.symmetrix_port_keys;

        let mut rows = Vec::new();
        for (lun, volume_id) in self.volumes_in(&view.storage_group_id).iter().enumerate() {
            let volume = self.volume(volume_id)?;
            for initiator in &initiators {
                let dir_port = initiator
                    .symmetrix_port_keys
                    .iter()
                    .find(|k| ports.contains(k))
                    .map(ToString::to_string);
                let Some(dir_port) = dir_port else {
                    continue;
                };
                rows.push(MaskingViewConnection {
                    volume_id: volume_id.clone(),
                    host_lun_address: format!("{lun:04x}"),
                    capacity_gb: volume.capacity_gb,
                    initiator_id: initiator.initiator_id.clone(),
                    alias: String::new(),
                    dir_port,
                    logged_in: initiator.logged_in,
                });
            }
        }
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_store;
    use super::*;
    use common::provisioning::PortKey;

    fn masked_store() -> Store {
        let mut store = test_store();
        store.add_storage_group("sg1", "SRP_1", "Diamond").unwrap();
        store.add_new_volume("00001", "vol1", 10, Some("sg1")).unwrap();
        store.add_new_volume("00002", "vol2", 10, Some("sg1")).unwrap();
        store
            .add_host("h1", &["10000090fa66060a".to_string()], None)
            .unwrap();
        store
            .add_port_group("pg1", &[PortKey::new("FA-1D", "4")], "")
            .unwrap();
        store
    }

    #[test]
    fn create_cascades_counts_and_paths() {
        let mut store = masked_store();
        store.add_masking_view("mv1", "sg1", "h1", true, "pg1").unwrap();

        assert_eq!(store.host("h1").unwrap().num_of_masking_views, 1);
        assert_eq!(store.storage_group("sg1").unwrap().num_of_masking_views, 1);
        assert_eq!(store.port_group("pg1").unwrap().num_of_masking_views, 1);
        for id in ["00001", "00002"] {
            assert_eq!(store.volume(id).unwrap().number_of_front_end_paths, 1);
        }

        store.add_new_volume("00003", "vol3", 10, Some("sg1")).unwrap();
        assert_eq!(store.volume("00003").unwrap().number_of_front_end_paths, 1);
    }

    #[test]
    fn delete_reverses_cascade() {
        let mut store = masked_store();
        store.add_masking_view("mv1", "sg1", "h1", true, "pg1").unwrap();
        store.delete_masking_view("mv1").unwrap();

        assert_eq!(store.host("h1").unwrap().num_of_masking_views, 0);
        assert_eq!(store.storage_group("sg1").unwrap().num_of_masking_views, 0);
        for id in ["00001", "00002"] {
            assert_eq!(store.volume(id).unwrap().number_of_front_end_paths, 0);
        }
        assert!(matches!(
            store.delete_masking_view("mv1"),
            Err(MockError::NotFound(_))
        ));
    }

    #[test]
    fn volumes_covered_by_another_view_keep_their_path() {
        let mut store = masked_store();
        store.add_storage_group("sg2", "SRP_1", "Gold").unwrap();
        store.add_volume_to_storage_group("00001", "sg2").unwrap();
        store.add_masking_view("mv1", "sg1", "h1", true, "pg1").unwrap();
        store.add_masking_view("mv2", "sg2", "h1", true, "pg1").unwrap();

        store.delete_masking_view("mv1").unwrap();
        assert_eq!(store.volume("00001").unwrap().number_of_front_end_paths, 1);
        assert_eq!(store.volume("00002").unwrap().number_of_front_end_paths, 0);
    }

    #[test]
    fn removal_does_not_roll_back_on_missing_reference() {
        let mut store = masked_store();
        store.add_masking_view("mv1", "sg1", "h1", true, "pg1").unwrap();
        store.port_groups.remove("pg1");

        assert!(matches!(
            store.delete_masking_view("mv1"),
            Err(MockError::Internal(_))
        ));
        assert!(store.masking_view("mv1").is_err());
        assert_eq!(store.host("h1").unwrap().num_of_masking_views, 0);
        assert_eq!(store.storage_group("sg1").unwrap().num_of_masking_views, 1);
    }

    #[test]
    fn masked_objects_cannot_be_deleted() {
        let mut store = masked_store();
        store.add_masking_view("mv1", "sg1", "h1", true, "pg1").unwrap();
        assert!(matches!(store.delete_host("h1"), Err(MockError::Conflict(_))));
        assert!(matches!(
            store.delete_port_group("pg1"),
            Err(MockError::Conflict(_))
        ));
        assert!(matches!(
            store.delete_storage_group("sg1"),
            Err(MockError::Conflict(_))
        ));
    }

    #[test]
    fn rename_and_connections() {
        let mut store = masked_store();
        store.add_masking_view("mv1", "sg1", "h1", true, "pg1").unwrap();
        store.rename_masking_view("mv1", "mv-renamed").unwrap();
        assert_eq!(
            store.storage_group("sg1").unwrap().masking_views,
            vec!["mv-renamed".to_string()]
        );

        let rows = store.masking_view_connections("mv-renamed").unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.dir_port == "FA-1D:4"));
    }

    #[test]
    fn missing_references() {
        let mut store = masked_store();
        assert!(matches!(
            store.add_masking_view("mv1", "sg1", "nohost", true, "pg1"),
            Err(MockError::NotFound(_))
        ));
        assert!(matches!(
            store.add_masking_view("mv1", "sg1", "h1", true, "nopg"),
            Err(MockError::NotFound(_))
        ));
        assert!(store.masking_views.is_empty());
    }
}
