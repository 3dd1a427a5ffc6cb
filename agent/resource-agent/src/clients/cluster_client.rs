use super::error::ClientResult;
use fixture_model::{ClusterDescription, JsonDescription};

/// The result of asking the provisioning service to create a cluster.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct CreatedCluster {
    /// Everything the create command printed.
    pub output: String,
    /// The exact command line that was invoked, kept as an artifact of the run.
    pub command: String,
}

/// `ClusterClient` drives the cluster provisioning service: it creates, describes and deletes
/// clusters and a few cluster-scoped helpers.
///
/// A command that runs and fails must be reported as [`super::ClientError::CommandFailed`] so that
/// callers can look at what it printed. Deleting or describing an unknown cluster, for instance,
/// is recognised by the message in the output.
///
/// This is provided as a trait so that mock implementations can be injected for testing purposes.
#[async_trait::async_trait]
pub trait ClusterClient: Send + Sync {
    /// Create a cluster named `cluster_name` with the given flags.
    async fn create_cluster(&self, cluster_name: &str, flags: &[String])
        -> ClientResult<CreatedCluster>;

    /// Describe a cluster by ID or name.
    async fn describe_cluster(&self, cluster: &str) -> ClientResult<ClusterDescription>;

    /// The full description document of a cluster.
    async fn describe_cluster_json(&self, cluster_id: &str) -> ClientResult<JsonDescription>;

    /// Delete a cluster without asking for confirmation. Returns what the command printed.
    async fn delete_cluster(&self, cluster_id: &str) -> ClientResult<String>;

    /// The installation log of a cluster.
    async fn install_log(&self, cluster_id: &str) -> ClientResult<String>;

    /// Delete the OIDC provider that was created for a cluster.
    async fn delete_oidc_provider(&self, cluster_id: &str) -> ClientResult<String>;

    /// Ask the service to re-verify the network of a cluster installed into existing subnets.
    async fn verify_network(&self, cluster_id: &str) -> ClientResult<String>;
}
