use common::file::{
    CreateFileInterface, CreateFileSystem, CreateNfsExport, FileInterface, FileObjectList,
    FileObjectRef, FileSystem, ModifyFileSystem, ModifyNasServer, ModifyNfsExport, NasServer,
    NfsExport,
};
use std::collections::BTreeMap;

use super::{Store, DEFAULT_SRP};
use crate::error::{MockError, MockResult};

fn object_list<'a, T: 'a>(
    items: impl Iterator<Item = &'a T>,
    fields: impl Fn(&T) -> (&str, &str),
) -> FileObjectList {
    FileObjectList {
        entries: items
            .map(|item| {
                let (id, name) = fields(item);
                FileObjectRef {
                    id: id.to_string(),
                    name: name.to_string(),
                }
            })
            .collect(),
    }
}

fn lookup<'a, T>(map: &'a BTreeMap<String, T>, kind: &str, id: &str) -> MockResult<&'a T> {
    map.get(id).ok_or_else(|| MockError::not_found(kind, id))
}

fn lookup_mut<'a, T>(map: &'a mut BTreeMap<String, T>, kind: &str, id: &str) -> MockResult<&'a mut T> {
    map.get_mut(id).ok_or_else(|| MockError::not_found(kind, id))
}

impl Store {
    /// Seed a NAS server together with its production interface.
    pub(crate) fn seed_nas_server(&mut self, name: &str, ip_address: &str) {
        let id = self.allocate_file_object_id("nas");
        let interface_id = self.allocate_file_object_id("if");
        self.file_interfaces.insert(
            interface_id.clone(),
            FileInterface {
                id: interface_id.clone(),
                name: format!("{name}-if"),
                nas_server: id.clone(),
                ip_address: ip_address.to_string(),
                netmask: "255.255.255.0".to_string(),
                gateway: String::new(),
                role: "Production".to_string(),
                is_disabled: false,
            },
        );
        self.nas_servers.insert(
            id.clone(),
            NasServer {
                id,
                name: name.to_string(),
                storage_resource_pool: DEFAULT_SRP.to_string(),
                operational_status: "Started".to_string(),
                primary_node: "1".to_string(),
                backup_node: "2".to_string(),
                file_interfaces: vec![interface_id.clone()],
                preferred_interface: interface_id,
            },
        );
    }

    // File systems

    pub fn file_system_list(&self) -> FileObjectList {
        object_list(self.file_systems.values(), |fs| (fs.id.as_str(), fs.name.as_str()))
    }

    pub fn file_system(&self, id: &str) -> MockResult<&FileSystem> {
        lookup(&self.file_systems, "File System", id)
    }

    pub fn create_file_system(&mut self, param: &CreateFileSystem) -> MockResult<FileSystem> {
        if param.name.is_empty() {
            return Err(MockError::invalid("file system name is required"));
        }
        if param.size_total == 0 {
            return Err(MockError::invalid("file system size must be greater than zero"));
        }
        lookup(&self.nas_servers, "NAS Server", &param.nas_server)?;
        if self.file_systems.values().any(|fs| fs.name == param.name) {
            return Err(MockError::already_exists("File System", &param.name));
        }

        let symid = self.arrays.first().cloned().unwrap_or_default();
        let id = self.allocate_file_object_id("fs");
        let fs = FileSystem {
            id: id.clone(),
            name: param.name.clone(),
            parent_oid: String::new(),
            storage_wwn: format!("60000970000{symid}5330{}", &id[3..]),
            export_fsid: id.clone(),
            description: param.description.clone(),
            size_total: param.size_total,
            size_used: 0,
            service_level: param.service_level.clone(),
            access_policy: "UNIX".to_string(),
            locking_policy: "Advisory".to_string(),
            nas_server: param.nas_server.clone(),
            data_reduction: false,
        };
        self.file_systems.insert(id, fs.clone());
        Ok(fs)
    }

    /// File systems only grow.
    pub fn modify_file_system(&mut self, id: &str, param: &ModifyFileSystem) -> MockResult<()> {
        let fs = lookup_mut(&mut self.file_systems, "File System", id)?;
        if let Some(size) = param.size_total {
            if size < fs.size_total {
                return Err(MockError::invalid(format!(
                    "new size {size} is smaller than current size {} of file system {id}",
                    fs.size_total
                )));
            }
            fs.size_total = size;
        }
        if let Some(description) = &param.description {
            fs.description = description.clone();
        }
        Ok(())
    }

    pub fn delete_file_system(&mut self, id: &str) -> MockResult<()> {
        self.file_system(id)?;
        if let Some(export) = self.nfs_exports.values().find(|e| e.file_system == id) {
            return Err(MockError::conflict(format!(
                "File system {id} is exported by NFS export {}",
                export.id
            )));
        }
        self.file_systems.remove(id);
        Ok(())
    }

    // NFS exports

    pub fn nfs_export_list(&self) -> FileObjectList {
        object_list(self.nfs_exports.values(), |e| (e.id.as_str(), e.name.as_str()))
    }

    pub fn nfs_export(&self, id: &str) -> MockResult<&NfsExport> {
        lookup(&self.nfs_exports, "NFS Export", id)
    }

    pub fn create_nfs_export(&mut self, param: &CreateNfsExport) -> MockResult<NfsExport> {
        if param.name.is_empty() {
            return Err(MockError::invalid("NFS export name is required"));
        }
        self.file_system(&param.file_system)?;
        if self.nfs_exports.values().any(|e| e.name == param.name) {
            return Err(MockError::already_exists("NFS Export", &param.name));
        }

        let id = self.allocate_file_object_id("nfs");
        let export = NfsExport {
            id: id.clone(),
            name: param.name.clone(),
            file_system: param.file_system.clone(),
            path: param.path.clone(),
            default_access: if param.default_access.is_empty() {
                "No_Access".to_string()
            } else {
                param.default_access.clone()
            },
            min_security: "Sys".to_string(),
            read_write_hosts: Vec::new(),
            read_only_hosts: Vec::new(),
            read_write_root_hosts: Vec::new(),
            no_access_hosts: Vec::new(),
            description: param.description.clone(),
        };
        self.nfs_exports.insert(id, export.clone());
        Ok(export)
    }

    pub fn modify_nfs_export(&mut self, id: &str, param: &ModifyNfsExport) -> MockResult<()> {
        let export = lookup_mut(&mut self.nfs_exports, "NFS Export", id)?;
        for host in &param.add_read_write_hosts {
            if !export.read_write_hosts.contains(host) {
                export.read_write_hosts.push(host.clone());
            }
        }
        export
            .read_write_hosts
            .retain(|h| !param.remove_read_write_hosts.contains(h));
        for host in &param.add_read_only_hosts {
            if !export.read_only_hosts.contains(host) {
                export.read_only_hosts.push(host.clone());
            }
        }
        export
            .read_only_hosts
            .retain(|h| !param.remove_read_only_hosts.contains(h));
        if let Some(description) = &param.description {
            export.description = description.clone();
        }
        Ok(())
    }

    pub fn delete_nfs_export(&mut self, id: &str) -> MockResult<()> {
        self.nfs_exports
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| MockError::not_found("NFS Export", id))
    }

    // NAS servers

    pub fn nas_server_list(&self) -> FileObjectList {
        object_list(self.nas_servers.values(), |n| (n.id.as_str(), n.name.as_str()))
    }

    pub fn nas_server(&self, id: &str) -> MockResult<&NasServer> {
        lookup(&self.nas_servers, "NAS Server", id)
    }

    pub fn modify_nas_server(&mut self, id: &str, param: &ModifyNasServer) -> MockResult<()> {
        if let Some(name) = &param.name {
            if name.is_empty() {
                return Err(MockError::invalid("NAS server name cannot be empty"));
            }
            if self.nas_servers.values().any(|n| &n.name == name && n.id != id) {
                return Err(MockError::already_exists("NAS Server", name));
            }
        }
        let server = lookup_mut(&mut self.nas_servers, "NAS Server", id)?;
        if let Some(name) = &param.name {
            server.name = name.clone();
        }
        Ok(())
    }

    /// Delete a NAS server no file system lives on, with its interfaces.
    pub fn delete_nas_server(&mut self, id: &str) -> MockResult<()> {
        self.nas_server(id)?;
        if let Some(fs) = self.file_systems.values().find(|fs| fs.nas_server == id) {
            return Err(MockError::conflict(format!(
                "NAS server {id} still hosts file system {}",
                fs.name
            )));
        }
        self.nas_servers.remove(id);
        self.file_interfaces.retain(|_, i| i.nas_server != id);
        Ok(())
    }

    // File interfaces

    pub fn file_interface_list(&self) -> FileObjectList {
        object_list(self.file_interfaces.values(), |i| (i.id.as_str(), i.name.as_str()))
    }

    pub fn file_interface(&self, id: &str) -> MockResult<&FileInterface> {
        lookup(&self.file_interfaces, "File Interface", id)
    }

    pub fn create_file_interface(&mut self, param: &CreateFileInterface) -> MockResult<FileInterface> {
        if param.name.is_empty() || param.ip_address.is_empty() {
            return Err(MockError::invalid("file interface name and ip address are required"));
        }
        self.nas_server(&param.nas_server)?;
        if self
            .file_interfaces
            .values()
            .any(|i| i.ip_address == param.ip_address)
        {
            return Err(MockError::already_exists("File Interface with address", &param.ip_address));
        }

        let id = self.allocate_file_object_id("if");
        let interface = FileInterface {
            id: id.clone(),
            name: param.name.clone(),
            nas_server: param.nas_server.clone(),
            ip_address: param.ip_address.clone(),
            netmask: param.netmask.clone(),
            gateway: param.gateway.clone(),
            role: "Production".to_string(),
            is_disabled: false,
        };
        self.file_interfaces.insert(id.clone(), interface.clone());
        if let Some(server) = self.nas_servers.get_mut(&param.nas_server) {
            server.file_interfaces.push(id);
        }
        Ok(interface)
    }
}

#[cfg(test)]
mod tests {
    use super::super::{test_store, DEFAULT_NAS_SERVER};
    use super::*;

    fn nas_id(store: &Store) -> String {
        store
            .nas_servers
            .values()
            .find(|n| n.name == DEFAULT_NAS_SERVER)
            .map(|n| n.id.clone())
            .unwrap()
    }

    fn create_fs(store: &mut Store, name: &str) -> FileSystem {
        let nas = nas_id(store);
        store
            .create_file_system(&CreateFileSystem {
                name: name.into(),
                size_total: 1024,
                nas_server: nas,
                service_level: "Diamond".into(),
                description: String::new(),
            })
            .unwrap()
    }

    #[test]
    fn seeded_nas_server_has_an_interface() {
        let store = test_store();
        let nas = store.nas_server(&nas_id(&store)).unwrap();
        let interface = store.file_interface(&nas.file_interfaces[0]).unwrap();
        assert_eq!(interface.ip_address, "192.168.1.50");
        assert_eq!(store.file_interface_list().entries.len(), 1);
    }

    #[test]
    fn file_system_requires_nas_server() {
        let mut store = test_store();
        let err = store
            .create_file_system(&CreateFileSystem {
                name: "fs1".into(),
                size_total: 1024,
                nas_server: "nas-missing".into(),
                service_level: String::new(),
                description: String::new(),
            })
            .unwrap_err();
        assert!(matches!(err, MockError::NotFound(_)));

        let fs = create_fs(&mut store, "fs1");
        assert_eq!(store.file_system_list().entries[0].id, fs.id);
        store
            .modify_file_system(&fs.id, &ModifyFileSystem {
                size_total: Some(2048),
                description: None,
            })
            .unwrap();
        assert_eq!(store.file_system(&fs.id).unwrap().size_total, 2048);
        assert!(store
            .modify_file_system(&fs.id, &ModifyFileSystem {
                size_total: Some(1),
                description: None,
            })
            .is_err());
    }

    #[test]
    fn export_lifecycle() {
        let mut store = test_store();
        let fs = create_fs(&mut store, "fs1");
        let export = store
            .create_nfs_export(&CreateNfsExport {
                file_system: fs.id.clone(),
                path: "/fs1".into(),
                name: "export1".into(),
                default_access: String::new(),
                description: String::new(),
            })
            .unwrap();
        assert_eq!(export.default_access, "No_Access");

        store
            .modify_nfs_export(&export.id, &ModifyNfsExport {
                add_read_write_hosts: vec!["10.0.0.1".into()],
                ..ModifyNfsExport::default()
            })
            .unwrap();
        assert_eq!(
            store.nfs_export(&export.id).unwrap().read_write_hosts,
            vec!["10.0.0.1".to_string()]
        );

        assert!(matches!(
            store.delete_file_system(&fs.id),
            Err(MockError::Conflict(_))
        ));
        store.delete_nfs_export(&export.id).unwrap();
        store.delete_file_system(&fs.id).unwrap();
        assert!(store.file_systems.is_empty());
    }

    #[test]
    fn nas_server_delete_blocked_by_file_systems() {
        let mut store = test_store();
        let nas = nas_id(&store);
        let fs = create_fs(&mut store, "fs1");
        assert!(matches!(
            store.delete_nas_server(&nas),
            Err(MockError::Conflict(_))
        ));
        store.delete_file_system(&fs.id).unwrap();
        store.delete_nas_server(&nas).unwrap();
        assert!(store.file_interfaces.is_empty());
    }

    #[test]
    fn interfaces_attach_to_their_server() {
        let mut store = test_store();
        let nas = nas_id(&store);
        let interface = store
            .create_file_interface(&CreateFileInterface {
                name: "if2".into(),
                nas_server: nas.clone(),
                ip_address: "192.168.1.51".into(),
                netmask: "255.255.255.0".into(),
                gateway: String::new(),
            })
            .unwrap();
        assert!(store
            .nas_server(&nas)
            .unwrap()
            .file_interfaces
            .contains(&interface.id));
        store
            .modify_nas_server(&nas, &ModifyNasServer {
                name: Some("nas-renamed".into()),
            })
            .unwrap();
        assert_eq!(store.nas_server(&nas).unwrap().name, "nas-renamed");
    }
}
