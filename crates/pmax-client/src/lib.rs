//! Async client for the Unisphere for PowerMax REST API.
//!
//! A [`Client`] is bound to one endpoint and an optional allow-list of
//! arrays; array-scoped calls refuse arrays outside the list before any
//! request is sent. Requests are built from the route table in
//! [`common::routes`], so paths match the ones the mock array serves.
//!
//! Mutations that the array may run as jobs have an `_async` variant that
//! returns the [`Job`]; [`Client::wait_on_job_completion`] polls it to a
//! terminal state.
//!
//! ```no_run
//! use pmax_client::{Client, ClientConfig};
//!
//! # async fn demo() -> pmax_client::Result<()> {
//! let client = Client::new(
//!     ClientConfig::new("https://unisphere:8443").with_credentials("smc", "smc"),
//! )?;
//! client.authenticate().await?;
//! let groups = client.get_storage_group_id_list("000197900046").await?;
//! println!("{:?}", groups.storage_group_ids);
//! # Ok(())
//! # }
//! ```

mod client;
pub mod config;
pub mod error;
mod file;
mod jobs;
mod performance;
mod provisioning;
mod replication;
mod snapshot;
mod system;

pub use client::Client;
pub use config::ClientConfig;
pub use error::{ClientError, Result};
pub use provisioning::MAX_VOLUME_IDENTIFIER_LEN;
pub use replication::ProtectionTarget;

pub use common;
pub use common::{ApiVersion, CapacityUnit, ErrorKind, ExecutionOption, Job, JobStatus};
