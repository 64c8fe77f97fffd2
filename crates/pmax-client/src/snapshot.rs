//! SnapVX snapshots and snapshot policies.

use common::replication::{
    CreateSnapshotPolicyParam, CreateVolumesSnapshot, DeleteVolumeSnapshot,
    ModifySnapshotPolicyParam, ModifyVolumeSnapshot, SnapshotAction, SnapshotGenerationList,
    SnapshotNameList, SnapshotPolicy, SnapshotPolicyAction, SnapshotPolicyList,
    StorageGroupNameListParam, SymVolume, UpdateSnapshotPolicyParam, VolumeName, VolumeSnapshot,
};
use common::{routes, ExecutionOption, Job};
use reqwest::Method;
use serde::Serialize;
use tracing::info;

use crate::error::{ClientError, Result};
use crate::Client;

fn names<S: AsRef<str>>(ids: &[S]) -> Vec<String> {
    ids.iter().map(|s| s.as_ref().to_string()).collect()
}

impl Client {
    /// Send a snapshot mutation. Synchronous calls answer 204; a job that
    /// comes back anyway is waited on.
    async fn snapshot_call<B: Serialize>(
        &self,
        symid: &str,
        method: Method,
        snapshot: &str,
        body: &B,
    ) -> Result<()> {
        let url = self.url(routes::SNAPSHOT, &[symid, snapshot]);
        if let Some(job) = self.execute_json(method, url, body).await?.job()? {
            self.wait_on_job_success(symid, &job.job_id).await?;
        }
        Ok(())
    }

    /// Take snapshot `snapshot` of every volume in `sources`. A zero
    /// `time_to_live` keeps it until deleted.
    pub async fn create_snapshot<S: AsRef<str>>(
        &self,
        symid: &str,
        snapshot: &str,
        sources: &[S],
        time_to_live: u32,
    ) -> Result<()> {
        self.check_array(symid)?;
        if sources.is_empty() {
            return Err(ClientError::InvalidArgument("no source volumes given".to_string()));
        }
        let param = CreateVolumesSnapshot {
            source_volumes: VolumeName::list(sources),
            both_sides: false,
            star: false,
            force: false,
            time_to_live,
            time_in_hours: true,
            execution_option: ExecutionOption::Synchronous,
        };
        self.snapshot_call(symid, Method::POST, snapshot, &param).await?;
        info!(%symid, %snapshot, sources = sources.len(), "snapshot created");
        Ok(())
    }

    /// Send a prepared modify request as is. Returns the job when the
    /// request asked for asynchronous execution.
    pub async fn modify_snapshot(
        &self,
        symid: &str,
        snapshot: &str,
        param: &ModifyVolumeSnapshot,
    ) -> Result<Option<Job>> {
        self.check_array(symid)?;
        let url = self.url(routes::SNAPSHOT, &[symid, snapshot]);
        self.execute_json(Method::PUT, url, param).await?.job()
    }

    /// Link generation `generation` of `snapshot` from each source to the
    /// target at the same position.
    pub async fn link_snapshot<S: AsRef<str>>(
        &self,
        symid: &str,
        snapshot: &str,
        sources: &[S],
        targets: &[S],
        generation: u32,
        copy: bool,
    ) -> Result<()> {
        self.check_array(symid)?;
        check_pairs(sources, targets)?;
        let mut param = ModifyVolumeSnapshot::new(SnapshotAction::Link, &names(sources), &names(targets));
        param.generation = generation;
        param.copy = copy;
        self.snapshot_call(symid, Method::PUT, snapshot, &param).await?;
        info!(%symid, %snapshot, generation, targets = targets.len(), "snapshot linked");
        Ok(())
    }

    pub async fn unlink_snapshot<S: AsRef<str>>(
        &self,
        symid: &str,
        snapshot: &str,
        sources: &[S],
        targets: &[S],
    ) -> Result<()> {
        self.check_array(symid)?;
        check_pairs(sources, targets)?;
        let param = ModifyVolumeSnapshot::new(SnapshotAction::Unlink, &names(sources), &names(targets));
        self.snapshot_call(symid, Method::PUT, snapshot, &param).await?;
        info!(%symid, %snapshot, targets = targets.len(), "snapshot unlinked");
        Ok(())
    }

    pub async fn rename_snapshot<S: AsRef<str>>(
        &self,
        symid: &str,
        snapshot: &str,
        new_name: &str,
        sources: &[S],
        generation: u32,
    ) -> Result<()> {
        self.check_array(symid)?;
        if new_name.is_empty() {
            return Err(ClientError::InvalidArgument("new snapshot name is required".to_string()));
        }
        let mut param = ModifyVolumeSnapshot::new(SnapshotAction::Rename, &names(sources), &[]);
        param.new_snapshot_name = new_name.to_string();
        param.generation = generation;
        self.snapshot_call(symid, Method::PUT, snapshot, &param).await?;
        info!(%symid, %snapshot, %new_name, "snapshot renamed");
        Ok(())
    }

    /// Copy the snapshot contents back onto its source volumes.
    pub async fn restore_snapshot<S: AsRef<str>>(
        &self,
        symid: &str,
        snapshot: &str,
        sources: &[S],
        generation: u32,
    ) -> Result<()> {
        self.check_array(symid)?;
        let mut param = ModifyVolumeSnapshot::new(SnapshotAction::Restore, &names(sources), &[]);
        param.generation = generation;
        self.snapshot_call(symid, Method::PUT, snapshot, &param).await?;
        info!(%symid, %snapshot, generation, "snapshot restored");
        Ok(())
    }

    pub async fn delete_snapshot<S: AsRef<str>>(
        &self,
        symid: &str,
        snapshot: &str,
        sources: &[S],
        generation: u32,
    ) -> Result<()> {
        self.check_array(symid)?;
        let param = DeleteVolumeSnapshot {
            source_volumes: VolumeName::list(sources),
            symforce: false,
            star: false,
            force: false,
            restore: false,
            generation,
            execution_option: ExecutionOption::Synchronous,
        };
        self.snapshot_call(symid, Method::DELETE, snapshot, &param).await?;
        info!(%symid, %snapshot, generation, "snapshot deleted");
        Ok(())
    }

    /// Names of the snapshots taken of `volume_id`.
    pub async fn get_snapshot_list(&self, symid: &str, volume_id: &str) -> Result<SnapshotNameList> {
        self.check_array(symid)?;
        self.get(self.url(routes::VOLUME_SNAPSHOT_LIST, &[symid, volume_id]))
            .await
    }

    pub async fn get_volume_snapshot(
        &self,
        symid: &str,
        volume_id: &str,
        snapshot: &str,
    ) -> Result<VolumeSnapshot> {
        self.check_array(symid)?;
        self.get(self.url(routes::VOLUME_SNAPSHOT, &[symid, volume_id, snapshot]))
            .await
    }

    pub async fn get_snapshot_generations(
        &self,
        symid: &str,
        volume_id: &str,
        snapshot: &str,
    ) -> Result<SnapshotGenerationList> {
        self.check_array(symid)?;
        self.get(self.url(
            routes::VOLUME_SNAPSHOT_GENERATION_LIST,
            &[symid, volume_id, snapshot],
        ))
        .await
    }

    /// Snapshot relationships of one volume, source and target side.
    pub async fn get_sym_volume(&self, symid: &str, volume_id: &str) -> Result<SymVolume> {
        self.check_array(symid)?;
        self.get(self.url(routes::SYM_VOLUME, &[symid, volume_id])).await
    }

    // Snapshot policies

    pub async fn get_snapshot_policy_list(&self, symid: &str) -> Result<SnapshotPolicyList> {
        self.check_array(symid)?;
        self.get(self.url(routes::SNAPSHOT_POLICY_LIST, &[symid])).await
    }

    pub async fn get_snapshot_policy(&self, symid: &str, policy: &str) -> Result<SnapshotPolicy> {
        self.check_array(symid)?;
        self.get(self.url(routes::SNAPSHOT_POLICY, &[symid, policy])).await
    }

    pub async fn create_snapshot_policy(
        &self,
        symid: &str,
        param: &CreateSnapshotPolicyParam,
    ) -> Result<SnapshotPolicy> {
        self.check_array(symid)?;
        let policy: SnapshotPolicy = self
            .post(self.url(routes::SNAPSHOT_POLICY_LIST, &[symid]), param)
            .await?;
        info!(%symid, policy = %policy.name, interval = %param.interval, "snapshot policy created");
        Ok(policy)
    }

    pub async fn update_snapshot_policy(
        &self,
        symid: &str,
        policy: &str,
        param: &UpdateSnapshotPolicyParam,
    ) -> Result<SnapshotPolicy> {
        self.check_array(symid)?;
        self.put(self.url(routes::SNAPSHOT_POLICY, &[symid, policy]), param)
            .await
    }

    pub async fn modify_snapshot_policy(
        &self,
        symid: &str,
        policy: &str,
        modify: ModifySnapshotPolicyParam,
    ) -> Result<SnapshotPolicy> {
        let param = UpdateSnapshotPolicyParam {
            action: SnapshotPolicyAction::Modify,
            modify: Some(modify),
            associate: None,
            disassociate: None,
        };
        self.update_snapshot_policy(symid, policy, &param).await
    }

    pub async fn suspend_snapshot_policy(&self, symid: &str, policy: &str) -> Result<SnapshotPolicy> {
        self.update_snapshot_policy(symid, policy, &policy_action(SnapshotPolicyAction::Suspend))
            .await
    }

    pub async fn resume_snapshot_policy(&self, symid: &str, policy: &str) -> Result<SnapshotPolicy> {
        self.update_snapshot_policy(symid, policy, &policy_action(SnapshotPolicyAction::Resume))
            .await
    }

    pub async fn associate_snapshot_policy<S: AsRef<str>>(
        &self,
        symid: &str,
        policy: &str,
        storage_groups: &[S],
    ) -> Result<SnapshotPolicy> {
        let mut param = policy_action(SnapshotPolicyAction::AssociateToStorageGroups);
        param.associate = Some(StorageGroupNameListParam {
            storage_group_names: names(storage_groups),
        });
        self.update_snapshot_policy(symid, policy, &param).await
    }

    pub async fn disassociate_snapshot_policy<S: AsRef<str>>(
        &self,
        symid: &str,
        policy: &str,
        storage_groups: &[S],
    ) -> Result<SnapshotPolicy> {
        let mut param = policy_action(SnapshotPolicyAction::DisassociateFromStorageGroups);
        param.disassociate = Some(StorageGroupNameListParam {
            storage_group_names: names(storage_groups),
        });
        self.update_snapshot_policy(symid, policy, &param).await
    }

    pub async fn delete_snapshot_policy(&self, symid: &str, policy: &str) -> Result<()> {
        self.check_array(symid)?;
        self.delete(self.url(routes::SNAPSHOT_POLICY, &[symid, policy]))
            .await?;
        info!(%symid, %policy, "snapshot policy deleted");
        Ok(())
    }
}

fn policy_action(action: SnapshotPolicyAction) -> UpdateSnapshotPolicyParam {
    UpdateSnapshotPolicyParam {
        action,
        modify: None,
        associate: None,
        disassociate: None,
    }
}

fn check_pairs<S: AsRef<str>>(sources: &[S], targets: &[S]) -> Result<()> {
    if sources.is_empty() {
        return Err(ClientError::InvalidArgument("no source volumes given".to_string()));
    }
    if sources.len() != targets.len() {
        return Err(ClientError::InvalidArgument(format!(
            "{} source volumes but {} targets",
            sources.len(),
            targets.len()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn link_lists_must_pair_up() {
        assert!(check_pairs(&["00001"], &["00002"]).is_ok());
        assert!(matches!(
            check_pairs(&["00001", "00003"], &["00002"]),
            Err(ClientError::InvalidArgument(_))
        ));
        assert!(check_pairs::<&str>(&[], &[]).is_err());
    }
}
