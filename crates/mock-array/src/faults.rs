//! Induced-error registry.
//!
//! Each fault is a typed key with a fixed status and message. Handlers call
//! [`FaultRegistry::check`] before doing their normal work; an armed fault
//! short-circuits the request with its canned error.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use crate::error::MockError;

macro_rules! faults {
    ($($kind:ident => ($status:expr, $message:expr)),+ $(,)?) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum FaultKind {
            $($kind,)+
        }

        impl FaultKind {
            pub const ALL: &'static [FaultKind] = &[$(FaultKind::$kind,)+];

            pub fn name(&self) -> &'static str {
                match self {
                    $(FaultKind::$kind => stringify!($kind),)+
                }
            }

            /// Status and message returned when this fault fires.
            pub fn response(&self) -> (u16, &'static str) {
                match self {
                    $(FaultKind::$kind => ($status, $message),)+
                }
            }
        }

        impl FromStr for FaultKind {
            type Err = MockError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $(stringify!($kind) => Ok(FaultKind::$kind),)+
                    other => Err(MockError::invalid(format!("unknown fault {other}"))),
                }
            }
        }
    };
}

faults! {
    // transport level, applied by the router middleware
    NoConnection => (503, "Unable to connect to array: no connection"),
    BadHttpStatus => (400, "bad http status"),
    InvalidJson => (200, "invalid json"),
    InvalidResponse => (200, "invalid response"),

    // system and jobs
    GetSymmetrixError => (500, "Error retrieving Symmetrix: induced error"),
    GetDirectorError => (500, "Error retrieving Director: induced error"),
    GetPortError => (500, "Error retrieving Port: induced error"),
    GetJobError => (500, "Error getting Job(s): induced error"),
    GetJobCannotFindRoleForUser => (500, common::ROLE_LOOKUP_FAILURE),
    JobFailedError => (500, "Job failed: induced error"),

    // volumes
    GetVolumeError => (500, "Error retrieving Volume(s): induced error"),
    GetVolumeIteratorError => (500, "Error getting VolumeIterator: induced error"),
    GetPrivateVolumeError => (500, "Error retrieving private Volume: induced error"),
    UpdateVolumeError => (500, "Error updating Volume: induced error"),
    ExpandVolumeError => (500, "Error expanding Volume: induced error"),
    DeleteVolumeError => (500, "Error deleting Volume: induced error"),

    // storage groups, pools, service levels
    GetStorageGroupError => (500, "Error retrieving Storage Group(s): induced error"),
    CreateStorageGroupError => (500, "Failed to create storage group: induced error"),
    UpdateStorageGroupError => (500, "Error updating Storage Group: induced error"),
    AddVolumeToStorageGroupError => (500, "Error adding volume(s) to storage group: induced error"),
    RemoveVolumeFromStorageGroupError => (500, "Error removing volume(s) from storage group: induced error"),
    DeleteStorageGroupError => (500, "Error deleting storage group: induced error"),
    GetStoragePoolError => (500, "Error retrieving StoragePool(s): induced error"),
    GetServiceLevelError => (500, "Error retrieving Service Level(s): induced error"),

    // masking views
    GetMaskingViewError => (500, "Error retrieving Masking View(s): induced error"),
    CreateMaskingViewError => (500, "Failed to create masking view: induced error"),
    UpdateMaskingViewError => (500, "Error updating Masking View: induced error"),
    DeleteMaskingViewError => (500, "Error deleting Masking view: induced error"),
    GetMaskingViewConnectionsError => (500, "Error retrieving Masking View Connections: induced error"),

    // hosts, host groups, initiators
    GetHostError => (500, "Error retrieving Host(s): induced error"),
    CreateHostError => (500, "Error creating Host: induced error"),
    UpdateHostError => (500, "Error updating Host: induced error"),
    DeleteHostError => (500, "Error deleting Host: induced error"),
    GetHostGroupError => (500, "Error retrieving Host Group(s): induced error"),
    CreateHostGroupError => (500, "Error creating Host Group: induced error"),
    UpdateHostGroupError => (500, "Error updating Host Group: induced error"),
    DeleteHostGroupError => (500, "Error deleting Host Group: induced error"),
    GetInitiatorError => (500, "Error retrieving Initiator(s): induced error"),

    // port groups
    GetPortGroupError => (500, "Error retrieving Port Group(s): induced error"),
    CreatePortGroupError => (500, "Error creating Port Group: induced error"),
    UpdatePortGroupError => (500, "Error updating Port Group: induced error"),
    DeletePortGroupError => (500, "Error deleting Port Group: induced error"),

    // SRDF
    GetReplicationCapabilitiesError => (500, "Error retrieving Replication Capabilities: induced error"),
    GetRdfGroupError => (500, "Error retrieving RDF group: induced error"),
    GetRdfDevicePairError => (500, "Error retrieving RDF device pair: induced error"),
    GetSrdfStorageGroupError => (500, "Error retrieving SRDF storage group: induced error"),
    CreateSgReplicaError => (500, "Failed to create SG replica: induced error"),
    ExecuteActionError => (500, "Failed to execute action on SG: induced error"),
    DeleteSgReplicaError => (500, "Failed to delete SG replica: induced error"),
    GetFreeRdfGroupError => (500, "Error retrieving free RDF group numbers: induced error"),

    // SnapVX and snapshot policies
    GetSnapshotError => (500, "Error retrieving Snapshot(s): induced error"),
    GetSnapshotGenerationError => (500, "Error retrieving Snapshot generation(s): induced error"),
    GetSymVolumeError => (500, "Error retrieving Sym Volume: induced error"),
    CreateSnapshotError => (500, "Failed to create snapshot: induced error"),
    LinkSnapshotError => (500, "Failed to link snapshot: induced error"),
    UnlinkSnapshotError => (500, "Failed to unlink snapshot: induced error"),
    RenameSnapshotError => (500, "Failed to rename snapshot: induced error"),
    RestoreSnapshotError => (500, "Failed to restore snapshot: induced error"),
    DeleteSnapshotError => (500, "Failed to delete snapshot: induced error"),
    GetSnapshotPolicyError => (500, "Error retrieving Snapshot Policy: induced error"),
    CreateSnapshotPolicyError => (500, "Error creating Snapshot Policy: induced error"),
    ModifySnapshotPolicyError => (500, "Error modifying Snapshot Policy: induced error"),
    DeleteSnapshotPolicyError => (500, "Error deleting Snapshot Policy: induced error"),

    // performance
    GetStorageGroupMetricsError => (500, "Error getting storage group metrics: induced error"),
    GetVolumeMetricsError => (500, "Error getting volume metrics: induced error"),
    GetStorageGroupPerfKeysError => (500, "Error getting storage group perf keys: induced error"),
    GetArrayPerfKeysError => (500, "Error getting array perf keys: induced error"),

    // file
    GetFileSystemError => (500, "Error retrieving File System: induced error"),
    CreateFileSystemError => (500, "Error creating File System: induced error"),
    UpdateFileSystemError => (500, "Error updating File System: induced error"),
    DeleteFileSystemError => (500, "Error deleting File System: induced error"),
    GetNfsExportError => (500, "Error retrieving NFS Export: induced error"),
    CreateNfsExportError => (500, "Error creating NFS Export: induced error"),
    UpdateNfsExportError => (500, "Error updating NFS Export: induced error"),
    DeleteNfsExportError => (500, "Error deleting NFS Export: induced error"),
    GetNasServerError => (500, "Error retrieving NAS Server: induced error"),
    UpdateNasServerError => (500, "Error updating NAS Server: induced error"),
    DeleteNasServerError => (500, "Error deleting NAS Server: induced error"),
    GetFileInterfaceError => (500, "Error retrieving File Interface: induced error"),
    CreateFileInterfaceError => (500, "Error creating File Interface: induced error"),
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How an armed fault behaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FaultValue {
    /// Fires on every check until cleared.
    Enabled,
    /// Fires on every check with this status instead of the default.
    Status(u16),
    /// Fires this many more times, then clears itself.
    Times(u32),
}

#[derive(Debug, Default)]
pub struct FaultRegistry {
    armed: HashMap<FaultKind, FaultValue>,
    reset_after_first: bool,
}

impl FaultRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn induce(&mut self, kind: FaultKind) {
        self.armed.insert(kind, FaultValue::Enabled);
    }

    pub fn induce_once(&mut self, kind: FaultKind) {
        self.armed.insert(kind, FaultValue::Times(1));
    }

    pub fn induce_times(&mut self, kind: FaultKind, times: u32) {
        if times == 0 {
            self.armed.remove(&kind);
        } else {
            self.armed.insert(kind, FaultValue::Times(times));
        }
    }

    pub fn induce_status(&mut self, kind: FaultKind, status: u16) {
        self.armed.insert(kind, FaultValue::Status(status));
    }

    pub fn clear(&mut self, kind: FaultKind) {
        self.armed.remove(&kind);
    }

    /// Disarm every fault and the reset-after-first switch.
    pub fn reset(&mut self) {
        self.armed.clear();
        self.reset_after_first = false;
    }

    /// While set, any fault disarms itself right after it fires.
    pub fn set_reset_after_first(&mut self, enabled: bool) {
        self.reset_after_first = enabled;
    }

    pub fn reset_after_first(&self) -> bool {
        self.reset_after_first
    }

    pub fn is_armed(&self, kind: FaultKind) -> bool {
        self.armed.contains_key(&kind)
    }

    pub fn armed(&self) -> Vec<FaultKind> {
        let mut kinds: Vec<_> = self.armed.keys().copied().collect();
        kinds.sort();
        kinds
    }

    /// Fire `kind` if armed, consuming it when it is single-shot.
    pub fn trigger(&mut self, kind: FaultKind) -> Option<FaultValue> {
        let value = *self.armed.get(&kind)?;
        match value {
            FaultValue::Times(n) if n > 1 && !self.reset_after_first => {
                self.armed.insert(kind, FaultValue::Times(n - 1));
            }
            FaultValue::Times(_) => {
                self.armed.remove(&kind);
            }
            _ if self.reset_after_first => {
                self.armed.remove(&kind);
            }
            _ => {}
        }
        debug!(fault = %kind, ?value, "induced fault fired");
        Some(value)
    }

    /// `Err` with the fault's canned response when `kind` fires.
    pub fn check(&mut self, kind: FaultKind) -> Result<(), MockError> {
        match self.trigger(kind) {
            Some(value) => Err(Self::error_for(kind, value)),
            None => Ok(()),
        }
    }

    pub fn error_for(kind: FaultKind, value: FaultValue) -> MockError {
        let (status, message) = kind.response();
        let status = match value {
            FaultValue::Status(code) => code,
            _ => status,
        };
        MockError::Induced {
            status,
            message: message.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enabled_fault_keeps_firing() {
        let mut reg = FaultRegistry::new();
        reg.induce(FaultKind::GetVolumeError);
        assert!(reg.check(FaultKind::GetVolumeError).is_err());
        assert!(reg.check(FaultKind::GetVolumeError).is_err());
        assert!(reg.check(FaultKind::GetHostError).is_ok());
    }

    #[test]
    fn reset_after_first_clears_only_the_fired_fault() {
        let mut reg = FaultRegistry::new();
        reg.set_reset_after_first(true);
        reg.induce(FaultKind::CreateStorageGroupError);
        reg.induce(FaultKind::GetHostError);

        assert!(reg.check(FaultKind::CreateStorageGroupError).is_err());
        assert!(reg.check(FaultKind::CreateStorageGroupError).is_ok());
        assert!(reg.is_armed(FaultKind::GetHostError));
    }

    #[test]
    fn counted_fault_expires() {
        let mut reg = FaultRegistry::new();
        reg.induce_times(FaultKind::GetJobError, 2);
        assert!(reg.check(FaultKind::GetJobError).is_err());
        assert!(reg.check(FaultKind::GetJobError).is_err());
        assert!(reg.check(FaultKind::GetJobError).is_ok());
    }

    #[test]
    fn status_override() {
        let mut reg = FaultRegistry::new();
        reg.induce_status(FaultKind::BadHttpStatus, 418);
        let err = reg.check(FaultKind::BadHttpStatus).unwrap_err();
        assert_eq!(err.status(), 418);
        assert_eq!(err.to_string(), "bad http status");
    }

    #[test]
    fn names_round_trip() {
        for kind in FaultKind::ALL {
            assert_eq!(kind.name().parse::<FaultKind>().unwrap(), *kind);
        }
        assert!("NoSuchFault".parse::<FaultKind>().is_err());
    }

    #[test]
    fn role_lookup_fault_uses_transient_message() {
        let (_, message) = FaultKind::GetJobCannotFindRoleForUser.response();
        assert!(message.contains(common::ROLE_LOOKUP_FAILURE));
    }
}
