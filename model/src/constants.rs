use std::time::Duration;

// Cluster identity
pub const CLUSTER_TYPE: &str = "rosa";
pub const DEFAULT_NAME_LENGTH: usize = 15;
pub const MAX_CLUSTER_NAME_LENGTH: usize = 54;
pub const MAX_ROLE_PREFIX_LENGTH: usize = 32;
pub const MAX_OIDC_CONFIG_PREFIX_LENGTH: usize = 15;
pub const MAX_VPC_NAME_PREFIX_LENGTH: usize = 20;
pub const MAX_DOMAIN_PREFIX_LENGTH: usize = 15;

// Defaults filled in when a profile is silent
pub const DEFAULT_INSTANCE_TYPE: &str = "m5.xlarge";
pub const DEFAULT_VPC_CIDR: &str = "10.0.0.0/16";
pub const DEFAULT_CLUSTER_TIMEOUT_MINUTES: u64 = 60;
pub const ADMIN_USERNAME: &str = "cluster-admin";
pub const KMS_KEY_TAG: &str = "rosacli";

// Fixed values projected for feature toggles
pub const AUTOSCALE_MIN_REPLICAS: u32 = 3;
pub const AUTOSCALE_MAX_REPLICAS: u32 = 6;
pub const INGRESS_ROUTE_SELECTOR: &str = "app1=test1,app2=test2";
pub const INGRESS_EXCLUDED_NAMESPACES: &str = "test-ns1,test-ns2";
pub const INGRESS_WILDCARD_POLICY: &str = "WildcardsDisallowed";
pub const INGRESS_NAMESPACE_OWNERSHIP_POLICY: &str = "Strict";
pub const MACHINE_CIDR: &str = "10.0.0.0/16";
pub const SERVICE_CIDR: &str = "172.31.0.0/24";
pub const POD_CIDR: &str = "192.168.0.0/18";
pub const HOST_PREFIX: u32 = 25;
pub const WORKER_LABELS: &str = "test-label/openshift.io=,test-label=testvalue";
pub const CLUSTER_TAGS: &str = "test-tag:tagvalue,qe-managed:true";
pub const NETWORK_TYPE_OTHER: &str = "other";

// Cluster autoscaler values
pub const AUTOSCALER_LOG_VERBOSITY: u32 = 4;
pub const AUTOSCALER_MAX_POD_GRACE_PERIOD: u32 = 0;
pub const AUTOSCALER_POD_PRIORITY_THRESHOLD: i32 = 0;
pub const AUTOSCALER_MAX_NODE_PROVISION_TIME: &str = "10m";
pub const AUTOSCALER_BALANCING_IGNORED_LABELS: &str = "aaa";
pub const AUTOSCALER_MAX_NODES_TOTAL: u32 = 100;
pub const AUTOSCALER_MIN_CORES: u32 = 0;
pub const AUTOSCALER_MAX_CORES: u32 = 1000;
pub const AUTOSCALER_MIN_MEMORY: u32 = 0;
pub const AUTOSCALER_MAX_MEMORY: u32 = 4096;
pub const AUTOSCALER_SCALE_DOWN_UTILIZATION_THRESHOLD: &str = "0.5";
pub const AUTOSCALER_SCALE_DOWN_DELAY: &str = "10s";

// Polling
pub const READY_POLL_INTERVAL: Duration = Duration::from_secs(2 * 60);
pub const WAITING_STATE_BUDGET: Duration = Duration::from_secs(6 * 60);
pub const OBSERVE_POLL_INTERVAL: Duration = Duration::from_secs(60);
pub const OBSERVE_TIMEOUT: Duration = Duration::from_secs(2 * 60);
pub const UNINSTALL_POLL_INTERVAL: Duration = Duration::from_secs(2 * 60);
pub const SHARED_VPC_GRACE: Duration = Duration::from_secs(30);

// Persisted file names
pub const CLUSTER_CONFIG_FILE: &str = "cluster-config.json";
pub const CLUSTER_DETAIL_FILE: &str = "cluster-detail.json";
pub const RESOURCES_FILE: &str = "resources.json";
pub const API_URL_FILE: &str = "api.url";
pub const CONSOLE_URL_FILE: &str = "console.url";
pub const INFRA_ID_FILE: &str = "infra_id";
pub const CLUSTER_ID_FILE: &str = "cluster-id";
pub const CLUSTER_NAME_FILE: &str = "cluster-name";
pub const CLUSTER_TYPE_FILE: &str = "cluster-type";
pub const CLUSTER_ADMIN_FILE: &str = "cluster-admin";
pub const CREATE_COMMAND_FILE: &str = "create_cluster.sh";
pub const INSTALL_LOG_FILE: &str = "install.log";
pub const PROXY_CA_BUNDLE_FILE: &str = "proxy-ca-bundle.pem";

/// The message the provisioning service prints when asked about a cluster it does not know.
pub fn no_cluster_message(cluster_id: &str) -> String {
    format!("There is no cluster with identifier or name '{}'", cluster_id)
}
