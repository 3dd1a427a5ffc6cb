mod error;

pub use self::error::{IntoProviderError, ProviderError, ProviderResult, Resources};
use fixture_model::{
    AccountRoles, AccountRolesRequest, AdminUser, KmsKeyRequest, OidcConfigRequest,
    OperatorRolesRequest, Proxy, ResolvedResourceSet, Subnets, Vpc,
};
use serde_json::Value;
use std::path::Path;

/// You implement the [`ResourcePreparer`] trait to prepare the cloud resources a cluster depends
/// on: roles, OIDC configuration, network, keys and so on.
///
/// Each operation prepares one thing and returns its identifier. The caller records identifiers
/// and decides the order; an implementation does not need to remember anything between calls.
/// Every operation that fails must say whether it left something behind (see [`Resources`]).
///
/// [`ResourcePreparer::destroy_resources`] destroys everything recorded in a
/// [`ResolvedResourceSet`]. It keeps going past failures and returns all of them.
#[async_trait::async_trait]
pub trait ResourcePreparer: Send + Sync {
    /// Resolve a version constraint (`latest`, `4.15`, `4.15.3`) to a concrete version available
    /// in `channel_group`. `None` if nothing matches.
    async fn resolve_version(
        &self,
        constraint: &str,
        channel_group: &str,
        hosted_cp: bool,
    ) -> ProviderResult<Option<String>>;

    /// The ID of the AWS account the preparer works in, or of the shared VPC owner's account when
    /// `shared_vpc_owner` is set.
    async fn account_id(&self, shared_vpc_owner: bool) -> ProviderResult<String>;

    async fn prepare_account_roles(&self, request: &AccountRolesRequest)
        -> ProviderResult<AccountRoles>;

    /// Returns the OIDC configuration ID.
    async fn prepare_oidc_config(&self, request: &OidcConfigRequest) -> ProviderResult<String>;

    async fn prepare_oidc_provider(&self, oidc_config_id: &str) -> ProviderResult<()>;

    /// Returns the operator role prefix.
    async fn prepare_operator_roles(&self, request: &OperatorRolesRequest)
        -> ProviderResult<String>;

    /// Create the role in the VPC owner's account that lets the installer and the ingress operator
    /// manage the shared network. Returns the role ARN.
    async fn prepare_shared_vpc_role(
        &self,
        role_name: &str,
        installer_role_arn: &str,
        ingress_operator_role_arn: &str,
    ) -> ProviderResult<String>;

    /// Returns the ARN of the role that forwards audit logs.
    async fn prepare_audit_log_role(
        &self,
        role_name: &str,
        oidc_config_id: Option<&str>,
    ) -> ProviderResult<String>;

    /// Returns the ARN of a role in the VPC owner's account trusted by the installer role.
    async fn prepare_additional_principal_role(
        &self,
        role_name: &str,
        installer_role_arn: &str,
    ) -> ProviderResult<String>;

    /// Generate credentials for the cluster administrator.
    async fn prepare_admin_user(&self) -> ProviderResult<AdminUser>;

    async fn prepare_vpc(&self, name_prefix: &str, cidr: &str) -> ProviderResult<Vpc>;

    /// Create a private and a public subnet in each zone (or in the first zone only when not
    /// `multi_az`). An empty `zones` lets the preparer pick.
    async fn prepare_subnets(
        &self,
        vpc: &Vpc,
        zones: &[String],
        multi_az: bool,
    ) -> ProviderResult<Subnets>;

    async fn prepare_additional_security_groups(
        &self,
        vpc: &Vpc,
        count: u32,
        name_prefix: &str,
    ) -> ProviderResult<Vec<String>>;

    /// Start a proxy reachable from the VPC. Its CA bundle is written to `ca_bundle_file`.
    async fn prepare_proxy(
        &self,
        vpc: &Vpc,
        region: &str,
        name: &str,
        ca_bundle_file: &Path,
    ) -> ProviderResult<Proxy>;

    async fn prepare_subnet_arns(&self, subnet_ids: &[String]) -> ProviderResult<Vec<String>>;

    /// Share resources with the cluster's account. Returns the resource share ARN.
    async fn prepare_resource_share(
        &self,
        name: &str,
        resource_arns: &[String],
    ) -> ProviderResult<String>;

    /// Returns a DNS domain reserved for the cluster.
    async fn prepare_dns_domain(&self) -> ProviderResult<String>;

    /// Returns the hosted zone ID.
    async fn prepare_hosted_zone(
        &self,
        cluster_name: &str,
        domain: &str,
        vpc_id: &str,
        private: bool,
    ) -> ProviderResult<String>;

    /// Returns the key ARN.
    async fn prepare_kms_key(&self, request: &KmsKeyRequest) -> ProviderResult<String>;

    /// Create the OIDC provider for a cluster that was created without an OIDC configuration.
    async fn prepare_oidc_provider_by_cluster(&self, cluster_id: &str) -> ProviderResult<()>;

    /// Create operator roles for a cluster that was created without an OIDC configuration.
    async fn prepare_operator_roles_by_cluster(&self, cluster_id: &str) -> ProviderResult<()>;

    /// Add `statements` to the key policy of `key_arn`.
    async fn update_kms_key_policy(&self, key_arn: &str, statements: &[Value])
        -> ProviderResult<()>;

    /// Destroy everything recorded in `resources`, newest first. Returns every failure.
    async fn destroy_resources(&self, resources: &ResolvedResourceSet) -> Vec<ProviderError>;
}
