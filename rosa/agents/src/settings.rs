use crate::poller::PollSettings;
use fixture_model::constants::{
    DEFAULT_CLUSTER_TIMEOUT_MINUTES, PROXY_CA_BUNDLE_FILE, SHARED_VPC_GRACE,
};
use fixture_model::GlobalEnv;
use std::path::PathBuf;
use std::time::Duration;

/// Tunables of a [`crate::ClusterHandler`].
#[derive(Debug, Clone, PartialEq)]
pub struct HandlerSettings {
    /// Minutes `create_cluster(wait = true)` waits for readiness.
    pub ready_timeout_minutes: u64,
    /// Minutes teardown waits for the cluster to be deleted.
    pub uninstall_timeout_minutes: u64,
    /// Pause before the shared-VPC role is created, giving the operator roles it trusts time to
    /// become visible.
    pub shared_vpc_grace: Duration,
    pub poll: PollSettings,
    /// Where the proxy's CA bundle is written.
    pub proxy_ca_bundle_file: PathBuf,
    /// Credentials for the shared VPC owner's account.
    pub shared_vpc_credentials_file: Option<PathBuf>,
}

impl Default for HandlerSettings {
    fn default() -> Self {
        Self {
            ready_timeout_minutes: DEFAULT_CLUSTER_TIMEOUT_MINUTES,
            uninstall_timeout_minutes: DEFAULT_CLUSTER_TIMEOUT_MINUTES,
            shared_vpc_grace: SHARED_VPC_GRACE,
            poll: PollSettings::default(),
            proxy_ca_bundle_file: PathBuf::from(PROXY_CA_BUNDLE_FILE),
            shared_vpc_credentials_file: None,
        }
    }
}

impl HandlerSettings {
    pub fn from_env(env: &GlobalEnv) -> Self {
        Self {
            ready_timeout_minutes: env.cluster_timeout,
            uninstall_timeout_minutes: env.cluster_timeout,
            proxy_ca_bundle_file: env.shared_dir.join(PROXY_CA_BUNDLE_FILE),
            shared_vpc_credentials_file: env.shared_vpc_aws_shared_credentials_file.clone(),
            ..Self::default()
        }
    }
}
