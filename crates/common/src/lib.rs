//! Wire types and the route table shared by the PowerMax client and the mock
//! array.

pub mod envelope;
pub mod file;
pub mod job;
pub mod performance;
pub mod provisioning;
pub mod replication;
pub mod routes;
pub mod system;
pub mod version;

pub use envelope::{ErrorEnvelope, ErrorKind, ROLE_LOOKUP_FAILURE};
pub use job::{Job, JobIdList, JobOr, JobStatus, Task};
pub use routes::Route;
pub use version::{
    AddVolumeParam, ApiVersion, CapacityUnit, ExecutionOption, NewVolumeSpec, PayloadError,
    UnsupportedVersion,
};
