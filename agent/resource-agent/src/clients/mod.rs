/*!

This module provides the clients the fixture uses to talk to the provisioning service and to
persist its records.

!*/

mod cluster_client;
mod error;
mod info_client;

pub use cluster_client::{ClusterClient, CreatedCluster};
pub use error::{ClientError, ClientResult, CommandOutput};
pub use info_client::{FileInfoClient, InfoClient, MemoryInfoClient};
