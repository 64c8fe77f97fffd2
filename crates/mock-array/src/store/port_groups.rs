use common::provisioning::{PortGroup, PortKey};

use super::Store;
use crate::error::{MockError, MockResult};

impl Store {
    fn check_ports(&self, ports: &[PortKey]) -> MockResult<()> {
        match ports.iter().find(|k| !self.port_exists(k)) {
            Some(missing) => Err(MockError::not_found("Port", missing)),
            None => Ok(()),
        }
    }

    pub fn add_port_group(&mut self, id: &str, ports: &[PortKey], protocol: &str) -> MockResult<()> {
        if id.is_empty() {
            return Err(MockError::invalid("port group id is required"));
        }
        if self.port_groups.contains_key(id) {
            return Err(MockError::already_exists("Port Group", id));
        }
        self.check_ports(ports)?;

        let iscsi = ports.iter().any(|k| k.director_id.starts_with("SE"));
        let protocol = match protocol {
            "" if iscsi => "iSCSI",
            "" => "SCSI_FC",
            other => other,
        };
        self.port_groups.insert(
            id.to_string(),
            PortGroup {
                port_group_id: id.to_string(),
                symmetrix_port_keys: ports.to_vec(),
                num_of_ports: ports.len(),
                num_of_masking_views: 0,
                port_group_type: if iscsi { "iSCSI" } else { "Fibre" }.to_string(),
                masking_views: Vec::new(),
                protocol: protocol.to_string(),
            },
        );
        Ok(())
    }

    pub fn port_group(&self, id: &str) -> MockResult<&PortGroup> {
        self.port_groups
            .get(id)
            .ok_or_else(|| MockError::not_found("Port Group", id))
    }

    fn port_group_mut(&mut self, id: &str) -> MockResult<&mut PortGroup> {
        self.port_groups
            .get_mut(id)
            .ok_or_else(|| MockError::not_found("Port Group", id))
    }

    pub fn add_ports_to_port_group(&mut self, id: &str, ports: &[PortKey]) -> MockResult<()> {
        self.check_ports(ports)?;
        let group = self.port_group_mut(id)?;
        if let Some(dup) = ports.iter().find(|k| group.symmetrix_port_keys.contains(k)) {
            return Err(MockError::conflict(format!(
                "Port {dup} is already in port group {id}"
            )));
        }
        group.symmetrix_port_keys.extend(ports.iter().cloned());
        group.num_of_ports = group.symmetrix_port_keys.len();
        Ok(())
    }

    pub fn remove_ports_from_port_group(&mut self, id: &str, ports: &[PortKey]) -> MockResult<()> {
        let group = self.port_group_mut(id)?;
        if let Some(missing) = ports.iter().find(|k| !group.symmetrix_port_keys.contains(k)) {
            return Err(MockError::invalid(format!(
                "Port {missing} is not in port group {id}"
            )));
        }
        group.symmetrix_port_keys.retain(|k| !ports.contains(k));
        group.num_of_ports = group.symmetrix_port_keys.len();
        Ok(())
    }

    pub fn rename_port_group(&mut self, id: &str, new_id: &str) -> MockResult<()> {
        if new_id.is_empty() {
            return Err(MockError::invalid("new port group name is required"));
        }
        if self.port_groups.contains_key(new_id) {
            return Err(MockError::already_exists("Port Group", new_id));
        }
        let Some(mut group) = self.port_groups.remove(id) else {
            return Err(MockError::not_found("Port Group", id));
        };
        group.port_group_id = new_id.to_string();
        self.port_groups.insert(new_id.to_string(), group);
        for view in self.masking_views.values_mut() {
            if view.port_group_id == id {
                view.port_group_id = new_id.to_string();
            }
        }
        Ok(())
    }

    pub fn delete_port_group(&mut self, id: &str) -> MockResult<()> {
        let group = self.port_group(id)?;
        if group.num_of_masking_views > 0 {
            return Err(MockError::conflict(format!(
                "Port group {id} is part of masking view(s) {}",
                group.masking_views.join(",")
            )));
        }
        self.port_groups.remove(id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_store;
    use super::*;

    #[test]
    fn ports_must_exist() {
        let mut store = test_store();
        assert!(matches!(
            store.add_port_group("pg1", &[PortKey::new("FA-9Z", "1")], ""),
            Err(MockError::NotFound(_))
        ));
        store
            .add_port_group("pg1", &[PortKey::new("FA-1D", "4")], "")
            .unwrap();
        let pg = store.port_group("pg1").unwrap();
        assert_eq!(pg.protocol, "SCSI_FC");
        assert_eq!(pg.num_of_ports, 1);
    }

    #[test]
    fn iscsi_groups_are_typed() {
        let mut store = test_store();
        store
            .add_port_group("pg1", &[PortKey::new("SE-1E", "0")], "")
            .unwrap();
        assert_eq!(store.port_group("pg1").unwrap().protocol, "iSCSI");
    }

    #[test]
    fn add_and_remove_ports() {
        let mut store = test_store();
        store
            .add_port_group("pg1", &[PortKey::new("FA-1D", "4")], "")
            .unwrap();
        store
            .add_ports_to_port_group("pg1", &[PortKey::new("FA-2D", "4")])
            .unwrap();
        assert!(store
            .add_ports_to_port_group("pg1", &[PortKey::new("FA-2D", "4")])
            .is_err());
        store
            .remove_ports_from_port_group("pg1", &[PortKey::new("FA-1D", "4")])
            .unwrap();
        assert_eq!(
            store.port_group("pg1").unwrap().symmetrix_port_keys,
            vec![PortKey::new("FA-2D", "4")]
        );
        assert!(store
            .remove_ports_from_port_group("pg1", &[PortKey::new("FA-1D", "4")])
            .is_err());
    }
}
