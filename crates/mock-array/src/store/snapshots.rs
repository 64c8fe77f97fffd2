//! SnapVX snapshots, their target links and snapshot policies.
//!
//! Snapshots are keyed by `(source volume, name)` and hold their generations
//! newest first, generation 0 being the most recent. Links are keyed by
//! snapshot, source and target; a snapshot with a live link cannot be
//! deleted.

use common::provisioning::{
    LinkedSnapshotGenInfo, SnapVxSession, SnapshotGenInfo, SnapshotHeader, TimeFinderInfo,
    VolumeHeader, VolumeResultPrivate,
};
use common::replication::{
    parse_interval_minutes, CreateSnapshotPolicyParam, SnapshotGenerationList, SnapshotNameList,
    SnapshotPolicy, SnapshotPolicyAction, SnapshotRef, SymVolume, UpdateSnapshotPolicyParam,
    VolumeSnapshot, VolumeSnapshotLink, VolumeSnapshotSource,
};
use tracing::debug;

use super::Store;
use crate::error::{MockError, MockResult};
use crate::jobs::now;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct SnapshotGeneration {
    pub generation: u32,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct SnapshotLink {
    pub snapshot: String,
    pub source: String,
    pub target: String,
}

fn check_pairs(sources: &[String], targets: &[String]) -> MockResult<()> {
    if sources.is_empty() {
        return Err(MockError::invalid("no source volumes given"));
    }
    if sources.len() != targets.len() {
        return Err(MockError::invalid(format!(
            "{} source volume(s) but {} target volume(s)",
            sources.len(),
            targets.len()
        )));
    }
    Ok(())
}

impl Store {
    fn snapshot_generations(&self, source: &str, name: &str) -> MockResult<&[SnapshotGeneration]> {
        self.snapshots
            .get(&(source.to_string(), name.to_string()))
            .map(Vec::as_slice)
            .ok_or_else(|| MockError::not_found("Snapshot", format!("{name} of volume {source}")))
    }

    fn check_generation(&self, source: &str, name: &str, generation: u32) -> MockResult<()> {
        let generations = self.snapshot_generations(source, name)?;
        if generations.iter().any(|g| g.generation == generation) {
            Ok(())
        } else {
            Err(MockError::not_found(
                "Snapshot generation",
                format!("{generation} of {name} on volume {source}"),
            ))
        }
    }

    fn refresh_snapvx_flags(&mut self, volume_id: &str) {
        let source = self.snapshots.keys().any(|(v, _)| v == volume_id);
        let target = self.links.iter().any(|l| l.target == volume_id);
        if let Some(volume) = self.volumes.get_mut(volume_id) {
            volume.snapvx_source = source;
            volume.snapvx_target = target;
        }
    }

    /// Take a new generation of `name` on every source volume.
    pub fn create_snapshot(&mut self, name: &str, sources: &[String]) -> MockResult<()> {
        if name.is_empty() {
            return Err(MockError::invalid("snapshot name is required"));
        }
        if sources.is_empty() {
            return Err(MockError::invalid("no source volumes given"));
        }
        for source in sources {
            self.volume(source)?;
        }

        let timestamp = now();
        for source in sources {
            let generations = self
                .snapshots
                .entry((source.clone(), name.to_string()))
                .or_default();
            for g in generations.iter_mut() {
                g.generation += 1;
            }
            generations.insert(
                0,
                SnapshotGeneration {
                    generation: 0,
                    timestamp: timestamp.clone(),
                },
            );
            self.refresh_snapvx_flags(source);
        }
        debug!(snapshot = name, sources = sources.len(), "snapshot created");
        Ok(())
    }

    /// Link each source's snapshot to the target at the same position.
    pub fn link_snapshot(
        &mut self,
        name: &str,
        sources: &[String],
        targets: &[String],
        generation: u32,
    ) -> MockResult<()> {
        check_pairs(sources, targets)?;
        let mut new_links = Vec::with_capacity(sources.len());
        for (source, target) in sources.iter().zip(targets) {
            self.check_generation(source, name, generation)?;
            self.volume(target)?;
            if source == target {
                return Err(MockError::invalid(format!(
                    "volume {source} cannot be linked to itself"
                )));
            }
            // a target holds at most one image of a given snapshot
            let taken = self
                .links
                .iter()
                .chain(new_links.iter())
                .any(|l| l.snapshot == name && &l.target == target);
            if taken {
                return Err(MockError::already_in_desired_state());
            }
            new_links.push(SnapshotLink {
                snapshot: name.to_string(),
                source: source.clone(),
                target: target.clone(),
            });
        }

        for link in new_links {
            let target = link.target.clone();
            self.links.insert(link);
            self.refresh_snapvx_flags(&target);
        }
        Ok(())
    }

    pub fn unlink_snapshot(&mut self, name: &str, sources: &[String], targets: &[String]) -> MockResult<()> {
        check_pairs(sources, targets)?;
        let mut doomed = Vec::with_capacity(sources.len());
        for (source, target) in sources.iter().zip(targets) {
            self.snapshot_generations(source, name)?;
            let link = SnapshotLink {
                snapshot: name.to_string(),
                source: source.clone(),
                target: target.clone(),
            };
            if !self.links.contains(&link) {
                return Err(MockError::already_in_desired_state());
            }
            doomed.push(link);
        }

        for link in doomed {
            self.links.remove(&link);
            self.refresh_snapvx_flags(&link.target);
        }
        Ok(())
    }

    /// Rename `name` to `new_name` on every source, carrying links along.
    pub fn rename_snapshot(&mut self, name: &str, new_name: &str, sources: &[String]) -> MockResult<()> {
        if new_name.is_empty() {
            return Err(MockError::invalid("new snapshot name is required"));
        }
        for source in sources {
            self.snapshot_generations(source, name)?;
            if self
                .snapshots
                .contains_key(&(source.clone(), new_name.to_string()))
            {
                return Err(MockError::already_exists(
                    "Snapshot",
                    format!("{new_name} of volume {source}"),
                ));
            }
        }

        for source in sources {
            if let Some(generations) = self.snapshots.remove(&(source.clone(), name.to_string())) {
                self.snapshots
                    .insert((source.clone(), new_name.to_string()), generations);
            }
            let renamed: Vec<SnapshotLink> = self
                .links
                .iter()
                .filter(|l| l.snapshot == name && &l.source == source)
                .cloned()
                .collect();
            for mut link in renamed {
                self.links.remove(&link);
                link.snapshot = new_name.to_string();
                self.links.insert(link);
            }
        }
        Ok(())
    }

    /// Restore leaves the store unchanged once the generation is known.
    pub fn restore_snapshot(&mut self, name: &str, sources: &[String], generation: u32) -> MockResult<()> {
        if sources.is_empty() {
            return Err(MockError::invalid("no source volumes given"));
        }
        for source in sources {
            self.check_generation(source, name, generation)?;
        }
        debug!(snapshot = name, generation, "snapshot restored");
        Ok(())
    }

    /// Drop one generation of `name` from every source. Older generations
    /// move up by one.
    pub fn delete_snapshot(&mut self, name: &str, sources: &[String], generation: u32) -> MockResult<()> {
        if sources.is_empty() {
            return Err(MockError::invalid("no source volumes given"));
        }
        for source in sources {
            self.check_generation(source, name, generation)?;
            if let Some(link) = self
                .links
                .iter()
                .find(|l| l.snapshot == name && &l.source == source)
            {
                return Err(MockError::conflict(format!(
                    "Snapshot {name} of volume {source} is linked to volume {}",
                    link.target
                )));
            }
        }

        for source in sources {
            let key = (source.clone(), name.to_string());
            if let Some(generations) = self.snapshots.get_mut(&key) {
                generations.retain(|g| g.generation != generation);
                for g in generations.iter_mut().filter(|g| g.generation > generation) {
                    g.generation -= 1;
                }
                if generations.is_empty() {
                    self.snapshots.remove(&key);
                }
            }
            self.refresh_snapvx_flags(source);
        }
        Ok(())
    }

    pub fn volume_snapshot_names(&self, volume_id: &str) -> MockResult<SnapshotNameList> {
        self.volume(volume_id)?;
        Ok(SnapshotNameList {
            device_name: volume_id.to_string(),
            snapshot_names: self
                .snapshots
                .keys()
                .filter(|(v, _)| v == volume_id)
                .map(|(_, n)| n.clone())
                .collect(),
        })
    }

    fn links_of(&self, name: &str, source: &str) -> Vec<VolumeSnapshotLink> {
        self.links
            .iter()
            .filter(|l| l.snapshot == name && l.source == source)
            .map(|l| VolumeSnapshotLink {
                target_device: l.target.clone(),
                timestamp: String::new(),
                state: "Linked".to_string(),
                defined: true,
                copy: false,
            })
            .collect()
    }

    pub fn volume_snapshot(&self, volume_id: &str, name: &str) -> MockResult<VolumeSnapshot> {
        self.volume(volume_id)?;
        let generations = self.snapshot_generations(volume_id, name)?;
        let linked = self.links_of(name, volume_id);
        Ok(VolumeSnapshot {
            device_name: volume_id.to_string(),
            snapshot_name: name.to_string(),
            sources: generations
                .iter()
                .map(|g| VolumeSnapshotSource {
                    snapshot_name: name.to_string(),
                    generation: g.generation,
                    timestamp: g.timestamp.clone(),
                    state: "Established".to_string(),
                    linked_volumes: linked.clone(),
                })
                .collect(),
            links: linked,
        })
    }

    pub fn volume_snapshot_generations(&self, volume_id: &str, name: &str) -> MockResult<SnapshotGenerationList> {
        self.volume(volume_id)?;
        Ok(SnapshotGenerationList {
            device_name: volume_id.to_string(),
            snapshot_name: name.to_string(),
            generations: self
                .snapshot_generations(volume_id, name)?
                .iter()
                .map(|g| g.generation)
                .collect(),
        })
    }

    pub fn sym_volume(&self, volume_id: &str) -> MockResult<SymVolume> {
        let volume = self.volume(volume_id)?;
        let snapshots = self
            .snapshots
            .iter()
            .filter(|((v, _), _)| v == volume_id)
            .flat_map(|((_, name), generations)| {
                generations.iter().map(move |g| SnapshotRef {
                    name: name.clone(),
                    generation: g.generation,
                })
            })
            .collect();
        Ok(SymVolume {
            name: volume_id.to_string(),
            snapshots,
            snapvx_source: volume.snapvx_source,
            snapvx_target: volume.snapvx_target,
        })
    }

    fn gen_info(&self, source: &str, name: &str, g: &SnapshotGeneration) -> SnapshotGenInfo {
        SnapshotGenInfo {
            header: SnapshotHeader {
                device: source.to_string(),
                snapshot_name: name.to_string(),
                generation: g.generation,
                timestamp: g.timestamp.clone(),
            },
            links: self
                .links
                .iter()
                .filter(|l| l.snapshot == name && l.source == source)
                .map(|l| LinkedSnapshotGenInfo {
                    target_device: l.target.clone(),
                    defined: true,
                    copy: false,
                })
                .collect(),
        }
    }

    /// Private-API view: volume header plus SnapVX sessions.
    pub fn private_volume(&self, volume_id: &str) -> MockResult<VolumeResultPrivate> {
        let volume = self.volume(volume_id)?;
        let source_snapshots: Vec<SnapshotGenInfo> = self
            .snapshots
            .iter()
            .filter(|((v, _), _)| v == volume_id)
            .flat_map(|((v, name), generations)| {
                generations.iter().map(move |g| self.gen_info(v, name, g))
            })
            .collect();
        let target_source = self
            .links
            .iter()
            .find(|l| l.target == volume_id)
            .and_then(|l| {
                let generations = self
                    .snapshots
                    .get(&(l.source.clone(), l.snapshot.clone()))?;
                let newest = generations.first()?;
                Some(self.gen_info(&l.source, &l.snapshot, newest))
            });

        let mut sessions = Vec::new();
        if !source_snapshots.is_empty() || target_source.is_some() {
            sessions.push(SnapVxSession {
                source_snapshots,
                target_source,
            });
        }
        Ok(VolumeResultPrivate {
            volume_header: VolumeHeader {
                volume_id: volume.volume_id.clone(),
                name_modifier: volume.volume_identifier.clone(),
                formatted_name: volume.volume_id.clone(),
                capacity_gb: volume.capacity_gb,
                capacity_mb: volume.capacity_mb,
                capacity_cyl: volume.capacity_cyl,
                emulation_type: volume.emulation.clone(),
                status: volume.status.clone(),
                mapped: volume.number_of_front_end_paths > 0,
                wwn: volume.wwn.clone(),
            },
            time_finder_info: TimeFinderInfo {
                snapvx_source: volume.snapvx_source,
                snapvx_target: volume.snapvx_target,
                sessions,
            },
        })
    }

    // Snapshot policies

    pub fn create_snapshot_policy(
        &mut self,
        symid: &str,
        param: &CreateSnapshotPolicyParam,
    ) -> MockResult<()> {
        if param.name.is_empty() {
            return Err(MockError::invalid("snapshot policy name is required"));
        }
        if self.snapshot_policies.contains_key(&param.name) {
            return Err(MockError::already_exists("Snapshot Policy", &param.name));
        }
        let interval_minutes = parse_interval_minutes(&param.interval)
            .ok_or_else(|| MockError::invalid(format!("invalid interval {:?}", param.interval)))?;
        if param.snapshot_count == 0 {
            return Err(MockError::invalid("snapshot count must be greater than zero"));
        }
        self.snapshot_policies.insert(
            param.name.clone(),
            SnapshotPolicy {
                name: param.name.clone(),
                symmetrix_id: symid.to_string(),
                interval_minutes,
                offset_minutes: param.offset_minutes,
                snapshot_count: param.snapshot_count,
                compliance_count_warning: param.compliance_count_warning,
                compliance_count_critical: param.compliance_count_critical,
                secure: param.secure,
                suspended: false,
                storage_group_count: 0,
                storage_groups: Vec::new(),
            },
        );
        Ok(())
    }

    pub fn snapshot_policy(&self, name: &str) -> MockResult<&SnapshotPolicy> {
        self.snapshot_policies
            .get(name)
            .ok_or_else(|| MockError::not_found("Snapshot Policy", name))
    }

    pub fn update_snapshot_policy(&mut self, name: &str, param: &UpdateSnapshotPolicyParam) -> MockResult<()> {
        self.snapshot_policy(name)?;
        match param.action {
            SnapshotPolicyAction::Suspend => self.set_policy_suspended(name, true),
            SnapshotPolicyAction::Resume => self.set_policy_suspended(name, false),
            SnapshotPolicyAction::Modify => {
                let modify = param
                    .modify
                    .as_ref()
                    .ok_or_else(|| MockError::invalid("modify parameters are required"))?;
                let interval = match &modify.interval {
                    Some(raw) => Some(parse_interval_minutes(raw).ok_or_else(|| {
                        MockError::invalid(format!("invalid interval {raw:?}"))
                    })?),
                    None => None,
                };
                if let Some(new_name) = modify.new_name.as_deref().filter(|n| *n != name) {
                    if self.snapshot_policies.contains_key(new_name) {
                        return Err(MockError::already_exists("Snapshot Policy", new_name));
                    }
                }
                let Some(mut policy) = self.snapshot_policies.remove(name) else {
                    return Err(MockError::not_found("Snapshot Policy", name));
                };
                if let Some(minutes) = interval {
                    policy.interval_minutes = minutes;
                }
                if let Some(count) = modify.snapshot_count {
                    policy.snapshot_count = count;
                }
                if let Some(new_name) = &modify.new_name {
                    policy.name = new_name.clone();
                }
                self.snapshot_policies.insert(policy.name.clone(), policy);
                Ok(())
            }
            SnapshotPolicyAction::AssociateToStorageGroups => {
                let groups = param
                    .associate
                    .as_ref()
                    .ok_or_else(|| MockError::invalid("storage group names are required"))?;
                for sg in &groups.storage_group_names {
                    self.storage_group(sg)?;
                }
                let policy = self.policy_mut(name)?;
                if let Some(dup) = groups
                    .storage_group_names
                    .iter()
                    .find(|sg| policy.storage_groups.contains(sg))
                {
                    return Err(MockError::conflict(format!(
                        "Storage group {dup} is already associated with snapshot policy {name}"
                    )));
                }
                policy
                    .storage_groups
                    .extend(groups.storage_group_names.iter().cloned());
                policy.storage_group_count = policy.storage_groups.len();
                Ok(())
            }
            SnapshotPolicyAction::DisassociateFromStorageGroups => {
                let groups = param
                    .disassociate
                    .as_ref()
                    .ok_or_else(|| MockError::invalid("storage group names are required"))?;
                let policy = self.policy_mut(name)?;
                if let Some(missing) = groups
                    .storage_group_names
                    .iter()
                    .find(|sg| !policy.storage_groups.contains(sg))
                {
                    return Err(MockError::invalid(format!(
                        "Storage group {missing} is not associated with snapshot policy {name}"
                    )));
                }
                policy
                    .storage_groups
                    .retain(|sg| !groups.storage_group_names.contains(sg));
                policy.storage_group_count = policy.storage_groups.len();
                Ok(())
            }
        }
    }

    fn policy_mut(&mut self, name: &str) -> MockResult<&mut SnapshotPolicy> {
        self.snapshot_policies
            .get_mut(name)
            .ok_or_else(|| MockError::not_found("Snapshot Policy", name))
    }

    fn set_policy_suspended(&mut self, name: &str, suspended: bool) -> MockResult<()> {
        self.policy_mut(name)?.suspended = suspended;
        Ok(())
    }

    pub fn delete_snapshot_policy(&mut self, name: &str) -> MockResult<()> {
        let policy = self.snapshot_policy(name)?;
        if policy.storage_group_count > 0 {
            return Err(MockError::conflict(format!(
                "Snapshot policy {name} is associated with storage group(s) {}",
                policy.storage_groups.join(",")
            )));
        }
        self.snapshot_policies.remove(name);
        Ok(())
    }
}
