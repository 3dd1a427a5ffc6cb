use crate::{Configuration, OidcConfigKind};
use serde::{Deserialize, Serialize};

/// Everything prepared on behalf of a cluster before it is created. Each field is filled by one
/// preparation step and is never rewritten within a run; teardown reads the set to decide what
/// to destroy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolvedResourceSet {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_roles: Option<AccountRoles>,
    /// The role in the VPC owner's account that the cluster assumes. Computed, not created.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shared_vpc_role_arn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oidc_config_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oidc_provider_for: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operator_roles_prefix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shared_vpc_role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audit_log_role_arn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_principal_role_arn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_user: Option<AdminUser>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vpc: Option<Vpc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subnets: Option<Subnets>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub security_groups: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy: Option<Proxy>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub subnet_arns: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_share_arn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dns_domain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hosted_zone_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub etcd_kms_key_arn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kms_key_arn: Option<String>,
}

impl Configuration for ResolvedResourceSet {}

impl ResolvedResourceSet {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Whether anything in the set lives in the shared VPC owner's account.
    pub fn uses_shared_vpc_account(&self) -> bool {
        self.shared_vpc_role.is_some()
            || self.additional_principal_role_arn.is_some()
            || self.resource_share_arn.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountRoles {
    pub prefix: String,
    pub installer_role_arn: String,
    pub support_role_arn: String,
    pub worker_role_arn: String,
    /// Absent for hosted control planes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub control_plane_role_arn: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdminUser {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Vpc {
    pub id: String,
    pub name: String,
    pub cidr: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Subnets {
    pub private: Vec<String>,
    pub public: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Proxy {
    pub http_proxy: String,
    pub https_proxy: String,
    pub no_proxy: String,
    pub ca_bundle_file: String,
}

/// Input to account role preparation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountRolesRequest {
    pub prefix: String,
    pub hosted_cp: bool,
    pub version: Option<String>,
    pub channel_group: Option<String>,
    pub path: Option<String>,
    pub permissions_boundary: Option<String>,
}

/// Input to operator role preparation keyed by an OIDC configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OperatorRolesRequest {
    pub prefix: String,
    pub oidc_config_id: String,
    pub installer_role_arn: String,
    pub shared_vpc_role_arn: Option<String>,
    pub hosted_cp: bool,
    pub channel_group: Option<String>,
}

/// What a KMS key is for. Decides both how the key is created and which operator roles are
/// granted use of it.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum KeyUse {
    /// Encrypts etcd.
    Etcd,
    /// Encrypts node volumes.
    Volume,
}

serde_plain::derive_display_from_serialize!(KeyUse);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KmsKeyRequest {
    pub tag: String,
    pub hosted_cp: bool,
    pub key_use: KeyUse,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OidcConfigRequest {
    pub kind: OidcConfigKind,
    pub installer_role_arn: String,
    pub prefix: String,
}

#[test]
fn empty_set() {
    let mut set = ResolvedResourceSet::default();
    assert!(set.is_empty());
    assert!(!set.uses_shared_vpc_account());
    set.resource_share_arn = Some("arn:share".to_string());
    assert!(!set.is_empty());
    assert!(set.uses_shared_vpc_account());
    let round = ResolvedResourceSet::from_json_str(&set.to_json_string().unwrap()).unwrap();
    assert_eq!(round, set);
}
