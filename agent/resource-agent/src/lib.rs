/*!

The `resource-agent` library defines the collaborators a cluster fixture talks to while it prepares
resources, provisions a cluster and tears everything down again:

- a [`clients::ClusterClient`] that drives the cluster provisioning service,
- a [`provider::ResourcePreparer`] that prepares (and later destroys) the cloud resources a cluster
  depends on,
- an [`clients::InfoClient`] that persists records between invocations.

Each is a trait so that mock implementations can be injected for testing.

!*/

pub mod clients;
mod error;
pub mod provider;

pub use fixture_model::Configuration;
