//! Unified file: file systems, NFS exports, NAS servers and file interfaces.

use common::file::{
    CreateFileInterface, CreateFileSystem, CreateNfsExport, FileInterface, FileObjectList,
    FileSystem, ModifyFileSystem, ModifyNasServer, ModifyNfsExport, NasServer, NfsExport,
};
use common::routes;
use tracing::info;

use crate::error::Result;
use crate::Client;

impl Client {
    // File systems

    pub async fn get_file_system_list(&self, symid: &str) -> Result<FileObjectList> {
        self.check_array(symid)?;
        self.get(self.url(routes::FILE_SYSTEM_LIST, &[symid])).await
    }

    pub async fn get_file_system(&self, symid: &str, fs_id: &str) -> Result<FileSystem> {
        self.check_array(symid)?;
        self.get(self.url(routes::FILE_SYSTEM, &[symid, fs_id])).await
    }

    pub async fn create_file_system(&self, symid: &str, param: &CreateFileSystem) -> Result<FileSystem> {
        self.check_array(symid)?;
        let fs: FileSystem = self
            .post(self.url(routes::FILE_SYSTEM_LIST, &[symid]), param)
            .await?;
        info!(%symid, file_system = %fs.id, name = %fs.name, size = fs.size_total, "file system created");
        Ok(fs)
    }

    pub async fn modify_file_system(
        &self,
        symid: &str,
        fs_id: &str,
        param: &ModifyFileSystem,
    ) -> Result<FileSystem> {
        self.check_array(symid)?;
        self.put(self.url(routes::FILE_SYSTEM, &[symid, fs_id]), param).await
    }

    pub async fn delete_file_system(&self, symid: &str, fs_id: &str) -> Result<()> {
        self.check_array(symid)?;
        self.delete(self.url(routes::FILE_SYSTEM, &[symid, fs_id])).await?;
        info!(%symid, file_system = %fs_id, "file system deleted");
        Ok(())
    }

    // NFS exports

    pub async fn get_nfs_export_list(&self, symid: &str) -> Result<FileObjectList> {
        self.check_array(symid)?;
        self.get(self.url(routes::NFS_EXPORT_LIST, &[symid])).await
    }

    pub async fn get_nfs_export(&self, symid: &str, export_id: &str) -> Result<NfsExport> {
        self.check_array(symid)?;
        self.get(self.url(routes::NFS_EXPORT, &[symid, export_id])).await
    }

    pub async fn create_nfs_export(&self, symid: &str, param: &CreateNfsExport) -> Result<NfsExport> {
        self.check_array(symid)?;
        let export: NfsExport = self
            .post(self.url(routes::NFS_EXPORT_LIST, &[symid]), param)
            .await?;
        info!(%symid, export = %export.id, path = %export.path, "nfs export created");
        Ok(export)
    }

    pub async fn modify_nfs_export(
        &self,
        symid: &str,
        export_id: &str,
        param: &ModifyNfsExport,
    ) -> Result<NfsExport> {
        self.check_array(symid)?;
        self.put(self.url(routes::NFS_EXPORT, &[symid, export_id]), param).await
    }

    pub async fn delete_nfs_export(&self, symid: &str, export_id: &str) -> Result<()> {
        self.check_array(symid)?;
        self.delete(self.url(routes::NFS_EXPORT, &[symid, export_id])).await?;
        info!(%symid, export = %export_id, "nfs export deleted");
        Ok(())
    }

    // NAS servers

    pub async fn get_nas_server_list(&self, symid: &str) -> Result<FileObjectList> {
        self.check_array(symid)?;
        self.get(self.url(routes::NAS_SERVER_LIST, &[symid])).await
    }

    pub async fn get_nas_server(&self, symid: &str, nas_id: &str) -> Result<NasServer> {
        self.check_array(symid)?;
        self.get(self.url(routes::NAS_SERVER, &[symid, nas_id])).await
    }

    pub async fn modify_nas_server(
        &self,
        symid: &str,
        nas_id: &str,
        param: &ModifyNasServer,
    ) -> Result<NasServer> {
        self.check_array(symid)?;
        self.put(self.url(routes::NAS_SERVER, &[symid, nas_id]), param).await
    }

    pub async fn delete_nas_server(&self, symid: &str, nas_id: &str) -> Result<()> {
        self.check_array(symid)?;
        self.delete(self.url(routes::NAS_SERVER, &[symid, nas_id])).await?;
        info!(%symid, nas_server = %nas_id, "nas server deleted");
        Ok(())
    }

    // File interfaces

    pub async fn get_file_interface_list(&self, symid: &str) -> Result<FileObjectList> {
        self.check_array(symid)?;
        self.get(self.url(routes::FILE_INTERFACE_LIST, &[symid])).await
    }

    pub async fn get_file_interface(&self, symid: &str, interface_id: &str) -> Result<FileInterface> {
        self.check_array(symid)?;
        self.get(self.url(routes::FILE_INTERFACE, &[symid, interface_id]))
            .await
    }

    pub async fn create_file_interface(
        &self,
        symid: &str,
        param: &CreateFileInterface,
    ) -> Result<FileInterface> {
        self.check_array(symid)?;
        let interface: FileInterface = self
            .post(self.url(routes::FILE_INTERFACE_LIST, &[symid]), param)
            .await?;
        info!(%symid, interface = %interface.id, ip = %interface.ip_address, "file interface created");
        Ok(interface)
    }
}
