//! Volumes, storage groups, masking views, hosts, host groups, initiators and
//! port groups.

use common::provisioning::{
    diff_port_keys, CreateHostGroupParam, CreateHostParam, CreatePortGroupParam,
    CreateStorageGroupParam, EditHostActionParam, EditHostGroupActionParam,
    EditMaskingViewActionParam, EditMaskingViewParam, EditPortGroupActionParam,
    EditPortGroupParam, EditSloParam, EditStorageGroupActionParam, EditVolumeActionParam,
    EditVolumeParam, ExpandStorageGroupParam, ExpandVolumeParam, Host, HostFlags, HostGroup,
    HostGroupList, HostIoLimits, HostList, HostListParam, Initiator, InitiatorList,
    InitiatorListParam, MaskingView, MaskingViewConnections, MaskingViewCreateParam,
    MaskingViewList, ModifyVolumeIdentifierParam, PortGroup, PortGroupList, PortKey,
    PortListParam, RenameHostGroupParam, RenameHostParam, RenameMaskingViewParam,
    RenamePortGroupParam, RenameStorageGroupParam, ServiceLevelList, SetHostFlagsParam,
    SloBasedStorageGroupParam, StorageGroup, StorageGroupIdList, StoragePool, StoragePoolList,
    UpdateHostGroupParam, UpdateHostParam, UpdateStorageGroupPayload, Volume, VolumeIdListParam,
    VolumeIterator, VolumeResultList, VolumeResultPrivate,
};
use common::version::{VolumeAttribute, VolumeIdentifier};
use common::{routes, AddVolumeParam, CapacityUnit, ErrorKind, ExecutionOption, Job};
use tracing::{debug, info, warn};

use crate::error::{ClientError, Result};
use crate::Client;

/// Longest volume identifier the array accepts.
pub const MAX_VOLUME_IDENTIFIER_LEN: usize = 64;

/// Prefix asking Unisphere for a substring match on `volume_identifier`.
const LIKE: &str = "<like>";

fn id_list<S: AsRef<str>>(ids: &[S]) -> Vec<String> {
    ids.iter().map(|s| s.as_ref().to_string()).collect()
}

fn check_identifier(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(ClientError::InvalidArgument("volume identifier is required".to_string()));
    }
    if name.len() > MAX_VOLUME_IDENTIFIER_LEN {
        return Err(ClientError::InvalidArgument(format!(
            "volume identifier '{name}' is longer than {MAX_VOLUME_IDENTIFIER_LEN} characters"
        )));
    }
    Ok(())
}

impl Client {
    // Volumes

    /// Ids of volumes whose identifier equals `identifier`, or contains it
    /// when `like` is set. An empty identifier lists every volume.
    pub async fn get_volume_id_list(
        &self,
        symid: &str,
        identifier: &str,
        like: bool,
    ) -> Result<Vec<String>> {
        if identifier.is_empty() {
            return self.list_volume_ids(symid, &[]).await;
        }
        let filter = if like {
            format!("{LIKE}{identifier}")
        } else {
            identifier.to_string()
        };
        self.list_volume_ids(symid, &[("volume_identifier", filter.as_str())])
            .await
    }

    pub async fn get_volume_ids_in_storage_group(&self, symid: &str, sg: &str) -> Result<Vec<String>> {
        self.list_volume_ids(symid, &[("storageGroupId", sg)]).await
    }

    /// Run a volume listing to completion. Listings that do not fit on one
    /// page come back as an iterator, which is drained page by page and then
    /// deleted.
    async fn list_volume_ids(&self, symid: &str, query: &[(&str, &str)]) -> Result<Vec<String>> {
        self.check_array(symid)?;
        let first: VolumeIterator = self
            .get_query(self.url(routes::VOLUME_LIST, &[symid]), query)
            .await?;

        let mut ids: Vec<String> = first
            .result_list
            .volumes
            .into_iter()
            .map(|v| v.volume_id)
            .collect();
        if first.id.is_empty() {
            return Ok(ids);
        }

        let drained = self
            .drain_iterator(&first.id, first.result_list.to, first.count, first.max_page_size, &mut ids)
            .await;
        if let Err(err) = self.delete(self.url(routes::ITERATOR, &[&first.id])).await {
            warn!(iterator = %first.id, error = %err, "failed to delete volume iterator");
        }
        drained?;

        debug!(%symid, count = ids.len(), "volume listing paged");
        Ok(ids)
    }

    async fn drain_iterator(
        &self,
        iterator: &str,
        mut to: usize,
        count: usize,
        page_size: usize,
        ids: &mut Vec<String>,
    ) -> Result<()> {
        let page_size = page_size.max(1);
        while to < count {
            let from = to + 1;
            let last = (from + page_size - 1).min(count);
            let (from_s, last_s) = (from.to_string(), last.to_string());
            let page: VolumeResultList = self
                .get_query(
                    self.url(routes::ITERATOR_PAGE, &[iterator]),
                    &[("from", from_s.as_str()), ("to", last_s.as_str())],
                )
                .await?;
            ids.extend(page.volumes.into_iter().map(|v| v.volume_id));
            to = last;
        }
        Ok(())
    }

    pub async fn get_volume_by_id(&self, symid: &str, volume_id: &str) -> Result<Volume> {
        self.check_array(symid)?;
        self.get(self.url(routes::VOLUME, &[symid, volume_id])).await
    }

    /// Volume header plus its SnapVX sessions.
    pub async fn get_private_volume_by_id(
        &self,
        symid: &str,
        volume_id: &str,
    ) -> Result<VolumeResultPrivate> {
        self.check_array(symid)?;
        self.get(self.url(routes::PRIVATE_VOLUME, &[symid, volume_id])).await
    }

    pub async fn rename_volume(&self, symid: &str, volume_id: &str, new_identifier: &str) -> Result<Volume> {
        self.check_array(symid)?;
        check_identifier(new_identifier)?;
        let param = EditVolumeParam {
            action: EditVolumeActionParam {
                modify_identifier: Some(ModifyVolumeIdentifierParam {
                    volume_identifier: VolumeIdentifier::named(new_identifier),
                }),
                ..Default::default()
            },
            execution_option: ExecutionOption::Synchronous,
        };
        let volume: Volume = self.put(self.url(routes::VOLUME, &[symid, volume_id]), &param).await?;
        info!(%symid, volume = %volume_id, identifier = %new_identifier, "volume renamed");
        Ok(volume)
    }

    pub async fn expand_volume(
        &self,
        symid: &str,
        volume_id: &str,
        size: u64,
        unit: CapacityUnit,
    ) -> Result<Volume> {
        self.check_array(symid)?;
        let param = EditVolumeParam {
            action: EditVolumeActionParam {
                expand: Some(ExpandVolumeParam {
                    volume_attribute: VolumeAttribute {
                        num_of_vols: None,
                        volume_identifier: None,
                        capacity_unit: unit,
                        volume_size: size.to_string(),
                    },
                }),
                ..Default::default()
            },
            execution_option: ExecutionOption::Synchronous,
        };
        let volume: Volume = self.put(self.url(routes::VOLUME, &[symid, volume_id]), &param).await?;
        info!(%symid, volume = %volume_id, size, ?unit, "volume expanded");
        Ok(volume)
    }

    pub async fn delete_volume(&self, symid: &str, volume_id: &str) -> Result<()> {
        self.check_array(symid)?;
        self.delete(self.url(routes::VOLUME, &[symid, volume_id])).await?;
        info!(%symid, volume = %volume_id, "volume deleted");
        Ok(())
    }

    // Storage groups

    pub async fn get_storage_group_id_list(&self, symid: &str) -> Result<StorageGroupIdList> {
        self.check_array(symid)?;
        self.get(self.url(routes::STORAGE_GROUP_LIST, &[symid])).await
    }

    pub async fn get_storage_group(&self, symid: &str, sg: &str) -> Result<StorageGroup> {
        self.check_array(symid)?;
        self.get(self.url(routes::STORAGE_GROUP, &[symid, sg])).await
    }

    /// Create an empty storage group. An empty `slo` leaves it without a
    /// service level.
    pub async fn create_storage_group(
        &self,
        symid: &str,
        sg: &str,
        srp: &str,
        slo: &str,
    ) -> Result<StorageGroup> {
        self.check_array(symid)?;
        let slo_based_params = if slo.is_empty() {
            Vec::new()
        } else {
            vec![SloBasedStorageGroupParam {
                slo_id: slo.to_string(),
                workload_selection: "None".to_string(),
            }]
        };
        let param = CreateStorageGroupParam {
            storage_group_id: sg.to_string(),
            srp_id: srp.to_string(),
            slo_based_params,
            create_empty_storage_group: true,
            emulation: "FBA".to_string(),
            execution_option: ExecutionOption::Synchronous,
        };
        let group: StorageGroup = self
            .post(self.url(routes::STORAGE_GROUP_LIST, &[symid]), &param)
            .await?;
        info!(%symid, storage_group = %sg, %srp, %slo, "storage group created");
        Ok(group)
    }

    pub async fn delete_storage_group(&self, symid: &str, sg: &str) -> Result<()> {
        self.check_array(symid)?;
        self.delete(self.url(routes::STORAGE_GROUP, &[symid, sg])).await?;
        info!(%symid, storage_group = %sg, "storage group deleted");
        Ok(())
    }

    /// Apply `payload` synchronously and return the updated group.
    pub async fn update_storage_group(
        &self,
        symid: &str,
        sg: &str,
        mut payload: UpdateStorageGroupPayload,
    ) -> Result<StorageGroup> {
        self.check_array(symid)?;
        payload.execution_option = ExecutionOption::Synchronous;
        self.put(self.url(routes::STORAGE_GROUP, &[symid, sg]), &payload).await
    }

    /// Apply `payload` as an array job.
    pub async fn update_storage_group_async(
        &self,
        symid: &str,
        sg: &str,
        mut payload: UpdateStorageGroupPayload,
    ) -> Result<Job> {
        self.check_array(symid)?;
        payload.execution_option = ExecutionOption::Asynchronous;
        let job: Job = self.put(self.url(routes::STORAGE_GROUP, &[symid, sg]), &payload).await?;
        info!(%symid, storage_group = %sg, job = %job.job_id, "storage group update scheduled");
        Ok(job)
    }

    fn expand_payload(&self, name: &str, size: u64, unit: CapacityUnit) -> UpdateStorageGroupPayload {
        UpdateStorageGroupPayload {
            action: EditStorageGroupActionParam {
                expand: Some(ExpandStorageGroupParam {
                    add_volume: Some(AddVolumeParam::single(self.config().version, name, size, unit)),
                    add_specific_volume: None,
                }),
                ..Default::default()
            },
            execution_option: ExecutionOption::Synchronous,
        }
    }

    /// Create one volume named `name` inside `sg` and return it.
    ///
    /// The expand call does not say which volume it made, so the new volume
    /// is found again by identifier within the group.
    pub async fn create_volume_in_storage_group(
        &self,
        symid: &str,
        sg: &str,
        name: &str,
        size: u64,
        unit: CapacityUnit,
    ) -> Result<Volume> {
        self.check_array(symid)?;
        check_identifier(name)?;
        self.update_storage_group(symid, sg, self.expand_payload(name, size, unit))
            .await?;

        let ids = self
            .list_volume_ids(symid, &[("volume_identifier", name), ("storageGroupId", sg)])
            .await?;
        let Some(volume_id) = ids.last() else {
            return Err(ClientError::Api {
                kind: ErrorKind::NotFound,
                status: ErrorKind::NotFound.status(),
                message: format!("created volume {name} not found in storage group {sg}"),
            });
        };
        let volume = self.get_volume_by_id(symid, volume_id).await?;
        info!(%symid, storage_group = %sg, volume = %volume.volume_id, %name, "volume created");
        Ok(volume)
    }

    pub async fn create_volume_in_storage_group_async(
        &self,
        symid: &str,
        sg: &str,
        name: &str,
        size: u64,
        unit: CapacityUnit,
    ) -> Result<Job> {
        check_identifier(name)?;
        self.update_storage_group_async(symid, sg, self.expand_payload(name, size, unit))
            .await
    }

    pub async fn add_volumes_to_storage_group<S: AsRef<str>>(
        &self,
        symid: &str,
        sg: &str,
        volume_ids: &[S],
    ) -> Result<StorageGroup> {
        let payload = UpdateStorageGroupPayload {
            action: EditStorageGroupActionParam {
                expand: Some(ExpandStorageGroupParam {
                    add_volume: None,
                    add_specific_volume: Some(VolumeIdListParam {
                        volume_ids: id_list(volume_ids),
                    }),
                }),
                ..Default::default()
            },
            ..Default::default()
        };
        self.update_storage_group(symid, sg, payload).await
    }

    pub async fn remove_volumes_from_storage_group<S: AsRef<str>>(
        &self,
        symid: &str,
        sg: &str,
        volume_ids: &[S],
    ) -> Result<StorageGroup> {
        let payload = UpdateStorageGroupPayload {
            action: EditStorageGroupActionParam {
                remove_volume: Some(VolumeIdListParam {
                    volume_ids: id_list(volume_ids),
                }),
                ..Default::default()
            },
            ..Default::default()
        };
        self.update_storage_group(symid, sg, payload).await
    }

    pub async fn update_storage_group_slo(&self, symid: &str, sg: &str, slo: &str) -> Result<StorageGroup> {
        let payload = UpdateStorageGroupPayload {
            action: EditStorageGroupActionParam {
                edit_slo: Some(EditSloParam {
                    slo_id: slo.to_string(),
                }),
                ..Default::default()
            },
            ..Default::default()
        };
        self.update_storage_group(symid, sg, payload).await
    }

    pub async fn set_storage_group_host_io_limits(
        &self,
        symid: &str,
        sg: &str,
        limits: HostIoLimits,
    ) -> Result<StorageGroup> {
        let payload = UpdateStorageGroupPayload {
            action: EditStorageGroupActionParam {
                host_io_limits: Some(limits),
                ..Default::default()
            },
            ..Default::default()
        };
        self.update_storage_group(symid, sg, payload).await
    }

    pub async fn rename_storage_group(&self, symid: &str, sg: &str, new_name: &str) -> Result<StorageGroup> {
        let payload = UpdateStorageGroupPayload {
            action: EditStorageGroupActionParam {
                rename: Some(RenameStorageGroupParam {
                    new_name: new_name.to_string(),
                }),
                ..Default::default()
            },
            ..Default::default()
        };
        self.update_storage_group(symid, sg, payload).await
    }

    // Storage resource pools and service levels

    pub async fn get_storage_pool_list(&self, symid: &str) -> Result<StoragePoolList> {
        self.check_array(symid)?;
        self.get(self.url(routes::SRP_LIST, &[symid])).await
    }

    pub async fn get_storage_pool(&self, symid: &str, srp: &str) -> Result<StoragePool> {
        self.check_array(symid)?;
        self.get(self.url(routes::SRP, &[symid, srp])).await
    }

    pub async fn get_service_level_list(&self, symid: &str) -> Result<ServiceLevelList> {
        self.check_array(symid)?;
        self.get(self.url(routes::SLO_LIST, &[symid])).await
    }

    // Masking views

    pub async fn get_masking_view_list(&self, symid: &str) -> Result<MaskingViewList> {
        self.check_array(symid)?;
        self.get(self.url(routes::MASKING_VIEW_LIST, &[symid])).await
    }

    pub async fn get_masking_view(&self, symid: &str, mv: &str) -> Result<MaskingView> {
        self.check_array(symid)?;
        self.get(self.url(routes::MASKING_VIEW, &[symid, mv])).await
    }

    /// Tie a storage group, a host (or host group when `is_host` is false)
    /// and a port group together.
    pub async fn create_masking_view(
        &self,
        symid: &str,
        mv: &str,
        sg: &str,
        host_or_group: &str,
        is_host: bool,
        port_group: &str,
    ) -> Result<MaskingView> {
        self.check_array(symid)?;
        let param = MaskingViewCreateParam::new(mv, sg, host_or_group, is_host, port_group);
        let view: MaskingView = self
            .post(self.url(routes::MASKING_VIEW_LIST, &[symid]), &param)
            .await?;
        info!(%symid, masking_view = %mv, storage_group = %sg, initiators = %host_or_group, %port_group, "masking view created");
        Ok(view)
    }

    pub async fn rename_masking_view(&self, symid: &str, mv: &str, new_name: &str) -> Result<MaskingView> {
        self.check_array(symid)?;
        let param = EditMaskingViewParam {
            action: EditMaskingViewActionParam {
                rename: RenameMaskingViewParam {
                    new_name: new_name.to_string(),
                },
            },
        };
        self.put(self.url(routes::MASKING_VIEW, &[symid, mv]), &param).await
    }

    pub async fn delete_masking_view(&self, symid: &str, mv: &str) -> Result<()> {
        self.check_array(symid)?;
        self.delete(self.url(routes::MASKING_VIEW, &[symid, mv])).await?;
        info!(%symid, masking_view = %mv, "masking view deleted");
        Ok(())
    }

    pub async fn get_masking_view_connections(&self, symid: &str, mv: &str) -> Result<MaskingViewConnections> {
        self.check_array(symid)?;
        self.get(self.url(routes::MASKING_VIEW_CONNECTIONS, &[symid, mv])).await
    }

    // Hosts

    pub async fn get_host_list(&self, symid: &str) -> Result<HostList> {
        self.check_array(symid)?;
        self.get(self.url(routes::HOST_LIST, &[symid])).await
    }

    pub async fn get_host(&self, symid: &str, host: &str) -> Result<Host> {
        self.check_array(symid)?;
        self.get(self.url(routes::HOST, &[symid, host])).await
    }

    pub async fn create_host<S: AsRef<str>>(
        &self,
        symid: &str,
        host: &str,
        initiators: &[S],
        flags: Option<HostFlags>,
    ) -> Result<Host> {
        self.check_array(symid)?;
        let param = CreateHostParam {
            host_id: host.to_string(),
            initiator_ids: id_list(initiators),
            host_flags: flags,
            execution_option: ExecutionOption::Synchronous,
        };
        let created: Host = self.post(self.url(routes::HOST_LIST, &[symid]), &param).await?;
        info!(%symid, %host, initiators = created.initiators.len(), "host created");
        Ok(created)
    }

    async fn update_host(&self, symid: &str, host: &str, action: EditHostActionParam) -> Result<Host> {
        self.check_array(symid)?;
        let param = UpdateHostParam {
            action,
            execution_option: ExecutionOption::Synchronous,
        };
        self.put(self.url(routes::HOST, &[symid, host]), &param).await
    }

    /// Make the host's initiators exactly `desired`, adding before removing.
    pub async fn update_host_initiators<S: AsRef<str>>(
        &self,
        symid: &str,
        host: &str,
        desired: &[S],
    ) -> Result<Host> {
        let current = self.get_host(symid, host).await?;
        let desired = id_list(desired);
        let to_add: Vec<String> = desired
            .iter()
            .filter(|i| !current.initiators.contains(i))
            .cloned()
            .collect();
        let to_remove: Vec<String> = current
            .initiators
            .iter()
            .filter(|i| !desired.contains(i))
            .cloned()
            .collect();

        let mut updated = current;
        if !to_add.is_empty() {
            let action = EditHostActionParam {
                add_initiator: Some(InitiatorListParam { initiators: to_add }),
                ..Default::default()
            };
            updated = self.update_host(symid, host, action).await?;
        }
        if !to_remove.is_empty() {
            let action = EditHostActionParam {
                remove_initiator: Some(InitiatorListParam {
                    initiators: to_remove,
                }),
                ..Default::default()
            };
            updated = self.update_host(symid, host, action).await?;
        }
        Ok(updated)
    }

    pub async fn update_host_flags(&self, symid: &str, host: &str, flags: HostFlags) -> Result<Host> {
        let action = EditHostActionParam {
            set_host_flags: Some(SetHostFlagsParam { host_flags: flags }),
            ..Default::default()
        };
        self.update_host(symid, host, action).await
    }

    pub async fn rename_host(&self, symid: &str, host: &str, new_name: &str) -> Result<Host> {
        let action = EditHostActionParam {
            rename: Some(RenameHostParam {
                new_name: new_name.to_string(),
            }),
            ..Default::default()
        };
        self.update_host(symid, host, action).await
    }

    pub async fn delete_host(&self, symid: &str, host: &str) -> Result<()> {
        self.check_array(symid)?;
        self.delete(self.url(routes::HOST, &[symid, host])).await?;
        info!(%symid, %host, "host deleted");
        Ok(())
    }

    // Host groups

    pub async fn get_host_group_list(&self, symid: &str) -> Result<HostGroupList> {
        self.check_array(symid)?;
        self.get(self.url(routes::HOST_GROUP_LIST, &[symid])).await
    }

    pub async fn get_host_group(&self, symid: &str, host_group: &str) -> Result<HostGroup> {
        self.check_array(symid)?;
        self.get(self.url(routes::HOST_GROUP, &[symid, host_group])).await
    }

    pub async fn create_host_group<S: AsRef<str>>(
        &self,
        symid: &str,
        host_group: &str,
        hosts: &[S],
        flags: Option<HostFlags>,
    ) -> Result<HostGroup> {
        self.check_array(symid)?;
        let param = CreateHostGroupParam {
            host_group_id: host_group.to_string(),
            host_ids: id_list(hosts),
            host_flags: flags,
            execution_option: ExecutionOption::Synchronous,
        };
        let created: HostGroup = self
            .post(self.url(routes::HOST_GROUP_LIST, &[symid]), &param)
            .await?;
        info!(%symid, %host_group, hosts = created.hosts.len(), "host group created");
        Ok(created)
    }

    async fn update_host_group(
        &self,
        symid: &str,
        host_group: &str,
        action: EditHostGroupActionParam,
    ) -> Result<HostGroup> {
        self.check_array(symid)?;
        let param = UpdateHostGroupParam {
            action,
            execution_option: ExecutionOption::Synchronous,
        };
        self.put(self.url(routes::HOST_GROUP, &[symid, host_group]), &param)
            .await
    }

    /// Make the group's member hosts exactly `desired`.
    pub async fn update_host_group_hosts<S: AsRef<str>>(
        &self,
        symid: &str,
        host_group: &str,
        desired: &[S],
    ) -> Result<HostGroup> {
        let current = self.get_host_group(symid, host_group).await?;
        let members: Vec<String> = current.hosts.iter().map(|h| h.host_id.clone()).collect();
        let desired = id_list(desired);
        let to_add: Vec<String> = desired.iter().filter(|h| !members.contains(h)).cloned().collect();
        let to_remove: Vec<String> = members.iter().filter(|h| !desired.contains(h)).cloned().collect();

        let mut updated = current;
        if !to_add.is_empty() {
            let action = EditHostGroupActionParam {
                add_host: Some(HostListParam { hosts: to_add }),
                ..Default::default()
            };
            updated = self.update_host_group(symid, host_group, action).await?;
        }
        if !to_remove.is_empty() {
            let action = EditHostGroupActionParam {
                remove_host: Some(HostListParam { hosts: to_remove }),
                ..Default::default()
            };
            updated = self.update_host_group(symid, host_group, action).await?;
        }
        Ok(updated)
    }

    pub async fn update_host_group_flags(
        &self,
        symid: &str,
        host_group: &str,
        flags: HostFlags,
    ) -> Result<HostGroup> {
        let action = EditHostGroupActionParam {
            set_flags: Some(SetHostFlagsParam { host_flags: flags }),
            ..Default::default()
        };
        self.update_host_group(symid, host_group, action).await
    }

    pub async fn rename_host_group(&self, symid: &str, host_group: &str, new_name: &str) -> Result<HostGroup> {
        let action = EditHostGroupActionParam {
            rename: Some(RenameHostGroupParam {
                new_name: new_name.to_string(),
            }),
            ..Default::default()
        };
        self.update_host_group(symid, host_group, action).await
    }

    pub async fn delete_host_group(&self, symid: &str, host_group: &str) -> Result<()> {
        self.check_array(symid)?;
        self.delete(self.url(routes::HOST_GROUP, &[symid, host_group])).await?;
        info!(%symid, %host_group, "host group deleted");
        Ok(())
    }

    // Initiators

    pub async fn get_initiator_list(&self, symid: &str) -> Result<InitiatorList> {
        self.check_array(symid)?;
        self.get(self.url(routes::INITIATOR_LIST, &[symid])).await
    }

    /// `initiator_id` is the full `director:port:wwn` form.
    pub async fn get_initiator(&self, symid: &str, initiator_id: &str) -> Result<Initiator> {
        self.check_array(symid)?;
        self.get(self.url(routes::INITIATOR, &[symid, initiator_id])).await
    }

    // Port groups

    pub async fn get_port_group_list(&self, symid: &str) -> Result<PortGroupList> {
        self.check_array(symid)?;
        self.get(self.url(routes::PORT_GROUP_LIST, &[symid])).await
    }

    pub async fn get_port_group(&self, symid: &str, port_group: &str) -> Result<PortGroup> {
        self.check_array(symid)?;
        self.get(self.url(routes::PORT_GROUP, &[symid, port_group])).await
    }

    pub async fn create_port_group(
        &self,
        symid: &str,
        port_group: &str,
        ports: &[PortKey],
        protocol: &str,
    ) -> Result<PortGroup> {
        self.check_array(symid)?;
        let param = CreatePortGroupParam {
            port_group_id: port_group.to_string(),
            symmetrix_port_keys: ports.to_vec(),
            protocol: protocol.to_string(),
            execution_option: ExecutionOption::Synchronous,
        };
        let created: PortGroup = self
            .post(self.url(routes::PORT_GROUP_LIST, &[symid]), &param)
            .await?;
        info!(%symid, %port_group, ports = ports.len(), "port group created");
        Ok(created)
    }

    /// Make the group's ports exactly `desired` in one request. Nothing is
    /// sent when the group already matches.
    pub async fn update_port_group(
        &self,
        symid: &str,
        port_group: &str,
        desired: &[PortKey],
    ) -> Result<PortGroup> {
        let current = self.get_port_group(symid, port_group).await?;
        let (to_add, to_remove) = diff_port_keys(&current.symmetrix_port_keys, desired);
        if to_add.is_empty() && to_remove.is_empty() {
            debug!(%symid, %port_group, "port group already up to date");
            return Ok(current);
        }

        let param = EditPortGroupParam {
            action: EditPortGroupActionParam {
                add_port: (!to_add.is_empty()).then(|| PortListParam { ports: to_add }),
                remove_port: (!to_remove.is_empty()).then(|| PortListParam { ports: to_remove }),
                rename: None,
            },
            execution_option: ExecutionOption::Synchronous,
        };
        self.put(self.url(routes::PORT_GROUP, &[symid, port_group]), &param)
            .await
    }

    pub async fn rename_port_group(&self, symid: &str, port_group: &str, new_name: &str) -> Result<PortGroup> {
        self.check_array(symid)?;
        let param = EditPortGroupParam {
            action: EditPortGroupActionParam {
                rename: Some(RenamePortGroupParam {
                    new_name: new_name.to_string(),
                }),
                ..Default::default()
            },
            execution_option: ExecutionOption::Synchronous,
        };
        self.put(self.url(routes::PORT_GROUP, &[symid, port_group]), &param)
            .await
    }

    pub async fn delete_port_group(&self, symid: &str, port_group: &str) -> Result<()> {
        self.check_array(symid)?;
        self.delete(self.url(routes::PORT_GROUP, &[symid, port_group])).await?;
        info!(%symid, %port_group, "port group deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_are_bounded() {
        assert!(check_identifier("pmax-vol-1").is_ok());
        assert!(matches!(check_identifier(""), Err(ClientError::InvalidArgument(_))));
        let long = "x".repeat(MAX_VOLUME_IDENTIFIER_LEN + 1);
        assert!(matches!(check_identifier(&long), Err(ClientError::InvalidArgument(_))));
    }
}
