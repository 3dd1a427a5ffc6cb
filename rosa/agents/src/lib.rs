/*!

The `rosa-agents` library provisions disposable clusters for end-to-end tests. Given a
[`fixture_model::Profile`] it prepares the cloud resources the cluster depends on, turns the profile
and those resources into provisioning flags, creates the cluster, waits for it to become ready,
and later tears everything down again.

The moving parts:

- [`resolver`] prepares resources in dependency order.
- [`projector`] turns a profile plus resolved resources into flags and a cluster configuration.
- [`lifecycle`] owns a cluster from creation to destruction.
- [`poller`] waits for readiness and for uninstallation.
- [`teardown`] deletes the cluster and everything prepared for it.
- [`kms`] grants the cluster's roles use of customer-managed keys.
- [`rosa`] implements the collaborators by running the `rosa` and `aws` commands.

!*/

#![deny(
    clippy::expect_used,
    clippy::get_unwrap,
    clippy::panic,
    clippy::panic_in_result_fn,
    clippy::panicking_unwrap,
    clippy::unwrap_in_result,
    clippy::unwrap_used
)]

pub mod error;
pub mod features;
pub mod kms;
pub mod lifecycle;
pub mod naming;
pub mod poller;
pub mod projector;
pub mod resolver;
pub mod rosa;
pub mod settings;
pub mod teardown;

pub use error::{Error, ErrorKind, Result, TimeoutKind};
pub use lifecycle::{ClusterHandler, LifecyclePhase};
pub use settings::HandlerSettings;
