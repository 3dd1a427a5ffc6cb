use crate::Configuration;
use serde::{Deserialize, Serialize};

fn is_false(b: &bool) -> bool {
    !b
}

/// The cluster configuration projected from a profile and its resolved resources. It is a record
/// of what was requested of the provisioning service; the authoritative state is whatever the
/// service reports in [`crate::ClusterDetail`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain_prefix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel_group: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sts: Option<StsConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shared_vpc_role_arn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audit_log_arn: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub additional_allowed_principals: Vec<String>,
    #[serde(skip_serializing_if = "is_false")]
    pub private: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub private_link: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub admin_enabled: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub autoscaling: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nodes: Option<Nodes>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ingress: Option<IngressConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub autoscaler: Option<Autoscaler>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub networking: Option<Networking>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub subnet_ids: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub additional_compute_security_groups: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub additional_infra_security_groups: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub additional_control_plane_security_groups: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy: Option<Proxy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_domain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_hosted_zone_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billing_account: Option<String>,
    #[serde(skip_serializing_if = "is_false")]
    pub disable_scp_checks: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub disable_workload_monitoring: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encryption: Option<Encryption>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ec2_metadata_http_tokens: Option<String>,
    #[serde(skip_serializing_if = "is_false")]
    pub external_auth_enabled: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub fips: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub hypershift: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_mp_labels: Option<String>,
    #[serde(skip_serializing_if = "is_false")]
    pub multi_az: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<Properties>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub worker_disk_size: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub availability_zones: Vec<String>,
}

impl Configuration for ClusterConfig {}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StsConfig {
    pub role_arn: String,
    pub support_role_arn: String,
    pub worker_role_arn: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub control_plane_role_arn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oidc_config_id: Option<String>,
    pub operator_roles_prefix: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Nodes {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replicas: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_replicas: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_replicas: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compute_instance_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngressConfig {
    pub route_selector: String,
    pub excluded_namespaces: String,
    pub wildcard_policy: String,
    pub namespace_ownership_policy: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Autoscaler {
    pub balance_similar_node_groups: bool,
    pub skip_nodes_with_local_storage: bool,
    pub log_verbosity: u32,
    pub max_pod_grace_period: u32,
    pub pod_priority_threshold: i32,
    pub ignore_daemonsets_utilization: bool,
    pub max_node_provision_time: String,
    pub balancing_ignored_labels: String,
    pub resource_limits: AutoscalerResourceLimits,
    pub scale_down: AutoscalerScaleDown,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoscalerResourceLimits {
    pub max_nodes_total: u32,
    pub min_cores: u32,
    pub max_cores: u32,
    pub min_memory: u32,
    pub max_memory: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoscalerScaleDown {
    pub enabled: bool,
    pub utilization_threshold: String,
    pub delay_after_add: String,
    pub delay_after_delete: String,
    pub delay_after_failure: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Networking {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub machine_cidr: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_cidr: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pod_cidr: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host_prefix: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Proxy {
    pub http_proxy: String,
    pub https_proxy: String,
    pub no_proxy: String,
    pub trust_bundle_file: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Encryption {
    #[serde(skip_serializing_if = "is_false")]
    pub etcd_encryption: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub etcd_encryption_kms_arn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kms_key_arn: Option<String>,
    #[serde(skip_serializing_if = "is_false")]
    pub enable_customer_managed_key: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Properties {
    pub provision_shard_id: String,
}
