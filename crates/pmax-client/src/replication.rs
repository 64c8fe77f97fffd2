//! SRDF protection of storage groups.

use common::replication::{
    CreateSgSrdf, FreeRdfGroupNumbers, ModifySgRdfGroup, RdfAction, RdfDevicePair, RdfGroup,
    RdfGroupList, RdfMode, RdfStorageGroup, SgRdfGroupList, SgRdfInfo,
    SymReplicationCapabilities,
};
use common::{routes, ExecutionOption, Job};
use tracing::info;

use crate::error::Result;
use crate::Client;

/// Where and how to replicate a storage group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtectionTarget {
    pub remote_symmetrix_id: String,
    pub rdfg_number: u32,
    pub mode: RdfMode,
    /// Name of the storage group created on the remote array
    pub remote_storage_group: String,
    pub remote_slo: String,
    /// Start replicating immediately
    pub establish: bool,
}

impl ProtectionTarget {
    fn to_param(&self, execution_option: ExecutionOption) -> CreateSgSrdf {
        CreateSgSrdf {
            remote_symmetrix_id: self.remote_symmetrix_id.clone(),
            replication_mode: self.mode,
            remote_storage_group_name: self.remote_storage_group.clone(),
            remote_slo: self.remote_slo.clone(),
            rdfg_number: self.rdfg_number,
            establish: self.establish,
            execution_option,
        }
    }
}

impl Client {
    /// Replication capabilities of every array behind the endpoint.
    pub async fn get_replication_capabilities(&self) -> Result<SymReplicationCapabilities> {
        let mut caps: SymReplicationCapabilities = self
            .get(self.url(routes::REPLICATION_CAPABILITIES, &[]))
            .await?;
        caps.capabilities
            .retain(|c| self.is_allowed_array(&c.symmetrix_id));
        Ok(caps)
    }

    pub async fn get_rdf_group_list(&self, symid: &str) -> Result<RdfGroupList> {
        self.check_array(symid)?;
        self.get(self.url(routes::RDF_GROUP_LIST, &[symid])).await
    }

    pub async fn get_rdf_group(&self, symid: &str, rdfg: u32) -> Result<RdfGroup> {
        self.check_array(symid)?;
        let rdfg = rdfg.to_string();
        self.get(self.url(routes::RDF_GROUP, &[symid, &rdfg])).await
    }

    /// SRDF view of a storage group on this array.
    pub async fn get_rdf_storage_group(&self, symid: &str, sg: &str) -> Result<RdfStorageGroup> {
        self.check_array(symid)?;
        self.get(self.url(routes::RDF_STORAGE_GROUP, &[symid, sg])).await
    }

    /// RDF group numbers protecting `sg`.
    pub async fn get_storage_group_rdf_groups(&self, symid: &str, sg: &str) -> Result<SgRdfGroupList> {
        self.check_array(symid)?;
        self.get(self.url(routes::SG_RDF_GROUP_LIST, &[symid, sg])).await
    }

    pub async fn get_storage_group_rdf_info(&self, symid: &str, sg: &str, rdfg: u32) -> Result<SgRdfInfo> {
        self.check_array(symid)?;
        let rdfg = rdfg.to_string();
        self.get(self.url(routes::SG_RDF_GROUP, &[symid, sg, &rdfg])).await
    }

    /// Pair the volumes of `sg` with a new group on the remote array.
    pub async fn protect_storage_group(
        &self,
        symid: &str,
        sg: &str,
        target: &ProtectionTarget,
    ) -> Result<SgRdfInfo> {
        self.check_array(symid)?;
        let param = target.to_param(ExecutionOption::Synchronous);
        let info: SgRdfInfo = self
            .post(self.url(routes::SG_RDF_GROUP_LIST, &[symid, sg]), &param)
            .await?;
        info!(
            %symid,
            storage_group = %sg,
            rdfg = target.rdfg_number,
            mode = %target.mode,
            remote = %target.remote_symmetrix_id,
            "storage group protected"
        );
        Ok(info)
    }

    pub async fn protect_storage_group_async(
        &self,
        symid: &str,
        sg: &str,
        target: &ProtectionTarget,
    ) -> Result<Job> {
        self.check_array(symid)?;
        let param = target.to_param(ExecutionOption::Asynchronous);
        self.post(self.url(routes::SG_RDF_GROUP_LIST, &[symid, sg]), &param)
            .await
    }

    /// Run an SRDF action on the pairs of `sg` in `rdfg`.
    pub async fn execute_replication_action(
        &self,
        symid: &str,
        sg: &str,
        rdfg: u32,
        action: RdfAction,
    ) -> Result<SgRdfInfo> {
        self.check_array(symid)?;
        let param = ModifySgRdfGroup {
            action: action.as_str().to_string(),
            execution_option: ExecutionOption::Synchronous,
        };
        let rdfg_s = rdfg.to_string();
        let info: SgRdfInfo = self
            .put(self.url(routes::SG_RDF_GROUP, &[symid, sg, &rdfg_s]), &param)
            .await?;
        info!(%symid, storage_group = %sg, rdfg, action = action.as_str(), states = ?info.states, "srdf action done");
        Ok(info)
    }

    pub async fn execute_replication_action_async(
        &self,
        symid: &str,
        sg: &str,
        rdfg: u32,
        action: RdfAction,
    ) -> Result<Job> {
        self.check_array(symid)?;
        let param = ModifySgRdfGroup {
            action: action.as_str().to_string(),
            execution_option: ExecutionOption::Asynchronous,
        };
        let rdfg = rdfg.to_string();
        self.put(self.url(routes::SG_RDF_GROUP, &[symid, sg, &rdfg]), &param)
            .await
    }

    /// Remove SRDF protection. The array refuses while pairs are consistent;
    /// suspend first.
    pub async fn unprotect_storage_group(&self, symid: &str, sg: &str, rdfg: u32) -> Result<()> {
        self.check_array(symid)?;
        let rdfg_s = rdfg.to_string();
        self.delete(self.url(routes::SG_RDF_GROUP, &[symid, sg, &rdfg_s]))
            .await?;
        info!(%symid, storage_group = %sg, rdfg, "storage group unprotected");
        Ok(())
    }

    pub async fn get_rdf_device_pair(&self, symid: &str, rdfg: u32, volume_id: &str) -> Result<RdfDevicePair> {
        self.check_array(symid)?;
        let rdfg = rdfg.to_string();
        self.get(self.url(routes::RDF_DEVICE_PAIR, &[symid, &rdfg, volume_id]))
            .await
    }

    /// RDF group numbers unused on both this array and its remote.
    pub async fn get_free_rdf_group_numbers(&self, symid: &str) -> Result<FreeRdfGroupNumbers> {
        self.check_array(symid)?;
        self.get(self.url(routes::FREE_RDF_GROUP_NUMBERS, &[symid])).await
    }
}
