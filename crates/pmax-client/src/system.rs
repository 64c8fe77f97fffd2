//! Version, array and front-end port queries.

use common::routes;
use common::system::{
    DirectorIdList, Port, PortKeyList, Symmetrix, SymmetrixIdList, VersionDetails,
};
use common::provisioning::PortKey;
use tracing::info;

use crate::error::Result;
use crate::Client;

impl Client {
    /// Check the credentials against `/version`, the one endpoint Unisphere
    /// authenticates eagerly.
    pub async fn authenticate(&self) -> Result<VersionDetails> {
        let details: VersionDetails = self.get(self.url(routes::VERSION, &[])).await?;
        info!(version = %details.version, "authenticated to unisphere");
        Ok(details)
    }

    /// Arrays visible through this endpoint, narrowed to the allow-list.
    pub async fn get_symmetrix_id_list(&self) -> Result<SymmetrixIdList> {
        let mut list: SymmetrixIdList = self.get(self.url(routes::SYMMETRIX_LIST, &[])).await?;
        list.symmetrix_ids.retain(|id| self.is_allowed_array(id));
        Ok(list)
    }

    pub async fn get_symmetrix(&self, symid: &str) -> Result<Symmetrix> {
        self.check_array(symid)?;
        self.get(self.url(routes::SYMMETRIX, &[symid])).await
    }

    pub async fn get_director_id_list(&self, symid: &str) -> Result<DirectorIdList> {
        self.check_array(symid)?;
        self.get(self.url(routes::DIRECTOR_LIST, &[symid])).await
    }

    pub async fn get_port_list(&self, symid: &str, director: &str) -> Result<PortKeyList> {
        self.check_array(symid)?;
        self.get(self.url(routes::PORT_LIST, &[symid, director])).await
    }

    pub async fn get_port(&self, symid: &str, director: &str, port: &str) -> Result<Port> {
        self.check_array(symid)?;
        self.get(self.url(routes::PORT, &[symid, director, port])).await
    }

    /// Every port of every director on the array.
    pub async fn get_all_port_keys(&self, symid: &str) -> Result<Vec<PortKey>> {
        let directors = self.get_director_id_list(symid).await?;
        let mut keys = Vec::new();
        for director in &directors.director_ids {
            keys.extend(self.get_port_list(symid, director).await?.port_keys);
        }
        Ok(keys)
    }
}
