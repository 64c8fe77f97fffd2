use common::provisioning::{Host, HostFlags, HostGroup, HostSummary, Initiator, PortKey};
use tracing::debug;

use super::Store;
use crate::error::{MockError, MockResult};

const HOST_TYPE_FIBRE: &str = "Fibre";
const HOST_TYPE_ISCSI: &str = "iSCSI";

impl Store {
    /// Register an initiator seen on `director:port:name`.
    pub fn add_initiator(&mut self, initiator_id: &str, initiator_type: &str) {
        let mut parts = initiator_id.splitn(3, ':');
        let port_keys = match (parts.next(), parts.next()) {
            (Some(dir), Some(port)) => vec![PortKey::new(dir, port)],
            _ => Vec::new(),
        };
        self.initiators.insert(
            initiator_id.to_string(),
            Initiator {
                initiator_id: initiator_id.to_string(),
                symmetrix_port_keys: port_keys,
                initiator_type: initiator_type.to_string(),
                fcid: String::new(),
                ip_address: String::new(),
                host: String::new(),
                host_groups: Vec::new(),
                masking_views: Vec::new(),
                num_of_masking_views: 0,
                num_of_host_groups: 0,
                logged_in: true,
                on_fabric: true,
            },
        );
    }

    pub fn initiator(&self, id: &str) -> MockResult<&Initiator> {
        self.initiators
            .get(id)
            .ok_or_else(|| MockError::not_found("Initiator", id))
    }

    /// Ids of initiator records carrying the WWN or IQN `name`.
    fn initiators_named(&self, name: &str) -> Vec<String> {
        self.initiators
            .keys()
            .filter(|id| *id == name || id.rsplit_once(':').is_some_and(|(_, n)| n == name))
            .cloned()
            .collect()
    }

    /// Resolve host initiator names, failing if any is unknown or belongs
    /// to another host.
    fn claimable_initiators(&self, host_id: &str, names: &[String]) -> MockResult<Vec<String>> {
        let mut ids = Vec::new();
        for name in names {
            let matches = self.initiators_named(name);
            if matches.is_empty() {
                return Err(MockError::not_found("Initiator", name));
            }
            for id in matches {
                let owner = &self.initiators[&id].host;
                if !owner.is_empty() && owner != host_id {
                    return Err(MockError::conflict(format!(
                        "Initiator {name} is already in use by host {owner}"
                    )));
                }
                ids.push(id);
            }
        }
        Ok(ids)
    }

    fn host_type_of(&self, initiator_ids: &[String]) -> &'static str {
        let iscsi = initiator_ids
            .iter()
            .filter_map(|id| self.initiators.get(id))
            .any(|i| i.initiator_type == "GigE");
        if iscsi {
            HOST_TYPE_ISCSI
        } else {
            HOST_TYPE_FIBRE
        }
    }

    pub fn add_host(
        &mut self,
        host_id: &str,
        initiators: &[String],
        flags: Option<&HostFlags>,
    ) -> MockResult<()> {
        if host_id.is_empty() {
            return Err(MockError::invalid("host id is required"));
        }
        if self.hosts.contains_key(host_id) || self.host_groups.contains_key(host_id) {
            return Err(MockError::already_exists("Host", host_id));
        }
        let claimed = self.claimable_initiators(host_id, initiators)?;
        let host_type = self.host_type_of(&claimed);
        for id in &claimed {
            if let Some(initiator) = self.initiators.get_mut(id) {
                initiator.host = host_id.to_string();
            }
        }

        let mut host = Host {
            host_id: host_id.to_string(),
            num_of_masking_views: 0,
            num_of_initiators: initiators.len(),
            num_of_host_groups: 0,
            port_flags_override: false,
            consistent_lun: false,
            enabled_flags: String::new(),
            disabled_flags: String::new(),
            host_type: host_type.to_string(),
            initiators: initiators.to_vec(),
            masking_views: Vec::new(),
            host_groups: Vec::new(),
        };
        if let Some(flags) = flags {
            apply_flags(&mut host, flags);
        }
        self.hosts.insert(host_id.to_string(), host);
        debug!(host = host_id, initiators = initiators.len(), "host created");
        Ok(())
    }

    pub fn host(&self, host_id: &str) -> MockResult<&Host> {
        self.hosts
            .get(host_id)
            .ok_or_else(|| MockError::not_found("Host", host_id))
    }

    fn host_mut(&mut self, host_id: &str) -> MockResult<&mut Host> {
        self.hosts
            .get_mut(host_id)
            .ok_or_else(|| MockError::not_found("Host", host_id))
    }

    pub fn add_initiators_to_host(&mut self, host_id: &str, names: &[String]) -> MockResult<()> {
        let host = self.host(host_id)?;
        if let Some(dup) = names.iter().find(|n| host.initiators.contains(n)) {
            return Err(MockError::conflict(format!(
                "Initiator {dup} is already in host {host_id}"
            )));
        }
        let claimed = self.claimable_initiators(host_id, names)?;
        for id in &claimed {
            if let Some(initiator) = self.initiators.get_mut(id) {
                initiator.host = host_id.to_string();
            }
        }
        let host = self.host_mut(host_id)?;
        host.initiators.extend(names.iter().cloned());
        host.num_of_initiators = host.initiators.len();
        self.refresh_host_group_summaries(host_id);
        Ok(())
    }

    pub fn remove_initiators_from_host(&mut self, host_id: &str, names: &[String]) -> MockResult<()> {
        let host = self.host(host_id)?;
        if let Some(missing) = names.iter().find(|n| !host.initiators.contains(n)) {
            return Err(MockError::invalid(format!(
                "Initiator {missing} is not in host {host_id}"
            )));
        }
        for name in names {
            for id in self.initiators_named(name) {
                if let Some(initiator) = self.initiators.get_mut(&id) {
                    if initiator.host == host_id {
                        initiator.host.clear();
                    }
                }
            }
        }
        let host = self.host_mut(host_id)?;
        host.initiators.retain(|i| !names.contains(i));
        host.num_of_initiators = host.initiators.len();
        self.refresh_host_group_summaries(host_id);
        Ok(())
    }

    pub fn set_host_flags(&mut self, host_id: &str, flags: &HostFlags) -> MockResult<()> {
        apply_flags(self.host_mut(host_id)?, flags);
        Ok(())
    }

    pub fn rename_host(&mut self, host_id: &str, new_id: &str) -> MockResult<()> {
        if new_id.is_empty() {
            return Err(MockError::invalid("new host name is required"));
        }
        if self.hosts.contains_key(new_id) {
            return Err(MockError::already_exists("Host", new_id));
        }
        let Some(mut host) = self.hosts.remove(host_id) else {
            return Err(MockError::not_found("Host", host_id));
        };
        host.host_id = new_id.to_string();
        self.hosts.insert(new_id.to_string(), host);

        for initiator in self.initiators.values_mut() {
            if initiator.host == host_id {
                initiator.host = new_id.to_string();
            }
        }
        for view in self.masking_views.values_mut() {
            if view.host_id == host_id {
                view.host_id = new_id.to_string();
            }
        }
        for group in self.host_groups.values_mut() {
            for member in group.hosts.iter_mut().filter(|h| h.host_id == host_id) {
                member.host_id = new_id.to_string();
            }
        }
        Ok(())
    }

    /// Delete a host that is neither masked nor grouped. Its initiators
    /// become free for reuse.
    pub fn delete_host(&mut self, host_id: &str) -> MockResult<()> {
        let host = self.host(host_id)?;
        if host.num_of_masking_views > 0 {
            return Err(MockError::conflict(format!(
                "Host {host_id} is part of masking view(s) {}",
                host.masking_views.join(",")
            )));
        }
        if host.num_of_host_groups > 0 {
            return Err(MockError::conflict(format!(
                "Host {host_id} is part of host group(s) {}",
                host.host_groups.join(",")
            )));
        }
        self.hosts.remove(host_id);
        for initiator in self.initiators.values_mut() {
            if initiator.host == host_id {
                initiator.host.clear();
            }
        }
        Ok(())
    }

    // Host groups

    pub fn add_host_group(
        &mut self,
        group_id: &str,
        host_ids: &[String],
        flags: Option<&HostFlags>,
    ) -> MockResult<()> {
        if group_id.is_empty() {
            return Err(MockError::invalid("host group id is required"));
        }
        if self.host_groups.contains_key(group_id) || self.hosts.contains_key(group_id) {
            return Err(MockError::already_exists("Host Group", group_id));
        }
        for id in host_ids {
            self.host(id)?;
        }

        let mut group = HostGroup {
            host_group_id: group_id.to_string(),
            num_of_hosts: 0,
            num_of_initiators: 0,
            num_of_masking_views: 0,
            port_flags_override: false,
            consistent_lun: false,
            enabled_flags: String::new(),
            disabled_flags: String::new(),
            host_group_type: String::new(),
            hosts: Vec::new(),
            masking_views: Vec::new(),
        };
        if let Some(flags) = flags {
            group.port_flags_override = flags.any_override();
            group.consistent_lun = flags.consistent_lun;
            group.enabled_flags = flags.enabled_flags();
            group.disabled_flags = flags.disabled_flags();
        }
        self.host_groups.insert(group_id.to_string(), group);
        self.link_hosts(group_id, host_ids);
        Ok(())
    }

    pub fn host_group(&self, group_id: &str) -> MockResult<&HostGroup> {
        self.host_groups
            .get(group_id)
            .ok_or_else(|| MockError::not_found("Host Group", group_id))
    }

    fn link_hosts(&mut self, group_id: &str, host_ids: &[String]) {
        for id in host_ids {
            if let Some(host) = self.hosts.get_mut(id) {
                host.host_groups.push(group_id.to_string());
                host.num_of_host_groups = host.host_groups.len();
            }
        }
        let summaries: Vec<HostSummary> = host_ids
            .iter()
            .filter_map(|id| self.hosts.get(id))
            .map(|h| HostSummary {
                host_id: h.host_id.clone(),
                initiators: h.initiators.clone(),
            })
            .collect();
        if let Some(group) = self.host_groups.get_mut(group_id) {
            group.hosts.extend(summaries);
            group.num_of_hosts = group.hosts.len();
            group.num_of_initiators = group.hosts.iter().map(|h| h.initiators.len()).sum();
        }
    }

    fn refresh_host_group_summaries(&mut self, host_id: &str) {
        let Some(initiators) = self.hosts.get(host_id).map(|h| h.initiators.clone()) else {
            return;
        };
        for group in self.host_groups.values_mut() {
            let mut touched = false;
            for member in group.hosts.iter_mut().filter(|h| h.host_id == host_id) {
                member.initiators = initiators.clone();
                touched = true;
            }
            if touched {
                group.num_of_initiators = group.hosts.iter().map(|h| h.initiators.len()).sum();
            }
        }
    }

    pub fn add_hosts_to_host_group(&mut self, group_id: &str, host_ids: &[String]) -> MockResult<()> {
        let group = self.host_group(group_id)?;
        if let Some(dup) = host_ids
            .iter()
            .find(|id| group.hosts.iter().any(|h| &h.host_id == *id))
        {
            return Err(MockError::conflict(format!(
                "Host {dup} is already in host group {group_id}"
            )));
        }
        for id in host_ids {
            self.host(id)?;
        }
        self.link_hosts(group_id, host_ids);
        Ok(())
    }

    pub fn remove_hosts_from_host_group(
        &mut self,
        group_id: &str,
        host_ids: &[String],
    ) -> MockResult<()> {
        let group = self.host_group(group_id)?;
        if let Some(missing) = host_ids
            .iter()
            .find(|id| !group.hosts.iter().any(|h| &h.host_id == *id))
        {
            return Err(MockError::invalid(format!(
                "Host {missing} is not in host group {group_id}"
            )));
        }
        for id in host_ids {
            if let Some(host) = self.hosts.get_mut(id) {
                host.host_groups.retain(|g| g != group_id);
                host.num_of_host_groups = host.host_groups.len();
            }
        }
        if let Some(group) = self.host_groups.get_mut(group_id) {
            group.hosts.retain(|h| !host_ids.contains(&h.host_id));
            group.num_of_hosts = group.hosts.len();
            group.num_of_initiators = group.hosts.iter().map(|h| h.initiators.len()).sum();
        }
        Ok(())
    }

    pub fn set_host_group_flags(&mut self, group_id: &str, flags: &HostFlags) -> MockResult<()> {
        let group = self
            .host_groups
            .get_mut(group_id)
            .ok_or_else(|| MockError::not_found("Host Group", group_id))?;
        group.port_flags_override = flags.any_override();
        group.consistent_lun = flags.consistent_lun;
        group.enabled_flags = flags.enabled_flags();
        group.disabled_flags = flags.disabled_flags();
        Ok(())
    }

    pub fn rename_host_group(&mut self, group_id: &str, new_id: &str) -> MockResult<()> {
        if new_id.is_empty() {
            return Err(MockError::invalid("new host group name is required"));
        }
        if self.host_groups.contains_key(new_id) {
            return Err(MockError::already_exists("Host Group", new_id));
        }
        let Some(mut group) = self.host_groups.remove(group_id) else {
            return Err(MockError::not_found("Host Group", group_id));
        };
        group.host_group_id = new_id.to_string();
        self.host_groups.insert(new_id.to_string(), group);

        for host in self.hosts.values_mut() {
            for g in host.host_groups.iter_mut().filter(|g| g.as_str() == group_id) {
                *g = new_id.to_string();
            }
        }
        for view in self.masking_views.values_mut() {
            if view.host_group_id == group_id {
                view.host_group_id = new_id.to_string();
            }
        }
        Ok(())
    }

    pub fn delete_host_group(&mut self, group_id: &str) -> MockResult<()> {
        let group = self.host_group(group_id)?;
        if group.num_of_masking_views > 0 {
            return Err(MockError::conflict(format!(
                "Host group {group_id} is part of masking view(s) {}",
                group.masking_views.join(",")
            )));
        }
        let members: Vec<String> = group.hosts.iter().map(|h| h.host_id.clone()).collect();
        for id in &members {
            if let Some(host) = self.hosts.get_mut(id) {
                host.host_groups.retain(|g| g != group_id);
                host.num_of_host_groups = host.host_groups.len();
            }
        }
        self.host_groups.remove(group_id);
        Ok(())
    }
}

fn apply_flags(host: &mut Host, flags: &HostFlags) {
    host.port_flags_override = flags.any_override();
    host.consistent_lun = flags.consistent_lun;
    host.enabled_flags = flags.enabled_flags();
    host.disabled_flags = flags.disabled_flags();
}

#[cfg(test)]
mod tests {
    use super::super::test_store;
    use super::*;
    use common::provisioning::HostFlag;

    const WWN_A: &str = "10000090fa66060a";
    const WWN_B: &str = "10000090fa66060b";

    #[test]
    fn host_claims_every_matching_initiator() {
        let mut store = test_store();
        store.add_host("h1", &[WWN_A.to_string()], None).unwrap();
        let owned: Vec<_> = store
            .initiators
            .values()
            .filter(|i| i.host == "h1")
            .map(|i| i.initiator_id.clone())
            .collect();
        assert_eq!(owned.len(), 2);
        assert_eq!(store.host("h1").unwrap().host_type, "Fibre");
    }

    #[test]
    fn initiator_belongs_to_one_host() {
        let mut store = test_store();
        store.add_host("h1", &[WWN_A.to_string()], None).unwrap();
        assert!(matches!(
            store.add_host("h2", &[WWN_A.to_string()], None),
            Err(MockError::Conflict(_))
        ));
        assert!(store.host("h2").is_err());

        store.add_host("h2", &[WWN_B.to_string()], None).unwrap();
        assert!(matches!(
            store.add_initiators_to_host("h2", &[WWN_A.to_string()]),
            Err(MockError::Conflict(_))
        ));
    }

    #[test]
    fn unknown_initiator() {
        let mut store = test_store();
        assert!(matches!(
            store.add_host("h1", &["deadbeef".to_string()], None),
            Err(MockError::NotFound(_))
        ));
    }

    #[test]
    fn remove_initiator_frees_it() {
        let mut store = test_store();
        store
            .add_host("h1", &[WWN_A.to_string(), WWN_B.to_string()], None)
            .unwrap();
        store
            .remove_initiators_from_host("h1", &[WWN_A.to_string()])
            .unwrap();
        assert_eq!(store.host("h1").unwrap().num_of_initiators, 1);
        store.add_host("h2", &[WWN_A.to_string()], None).unwrap();
    }

    #[test]
    fn flags_render_to_strings() {
        let mut store = test_store();
        let flags = HostFlags {
            volume_set_addressing: HostFlag {
                enabled: true,
                override_: true,
            },
            ..Default::default()
        };
        store.add_host("h1", &[WWN_A.to_string()], Some(&flags)).unwrap();
        let host = store.host("h1").unwrap();
        assert!(host.port_flags_override);
        assert_eq!(host.enabled_flags, "Volume_Set_Addressing(V)");
    }

    #[test]
    fn host_group_membership() {
        let mut store = test_store();
        store.add_host("h1", &[WWN_A.to_string()], None).unwrap();
        store.add_host("h2", &[WWN_B.to_string()], None).unwrap();
        store
            .add_host_group("hg1", &["h1".to_string()], None)
            .unwrap();
        store
            .add_hosts_to_host_group("hg1", &["h2".to_string()])
            .unwrap();
        let group = store.host_group("hg1").unwrap();
        assert_eq!(group.num_of_hosts, 2);
        assert_eq!(group.num_of_initiators, 2);
        assert_eq!(store.host("h1").unwrap().num_of_host_groups, 1);

        assert!(matches!(store.delete_host("h1"), Err(MockError::Conflict(_))));
        store
            .remove_hosts_from_host_group("hg1", &["h1".to_string()])
            .unwrap();
        store.delete_host("h1").unwrap();

        store.rename_host_group("hg1", "hg2").unwrap();
        assert_eq!(store.host("h2").unwrap().host_groups, vec!["hg2".to_string()]);
        store.delete_host_group("hg2").unwrap();
        assert_eq!(store.host("h2").unwrap().num_of_host_groups, 0);
    }

    #[test]
    fn rename_host_updates_initiators() {
        let mut store = test_store();
        store.add_host("h1", &[WWN_A.to_string()], None).unwrap();
        store.rename_host("h1", "h9").unwrap();
        assert!(store.initiators.values().any(|i| i.host == "h9"));
        assert!(!store.initiators.values().any(|i| i.host == "h1"));
    }
}
