use fixture_model::{
    AccountRoles, AccountRolesRequest, AdminUser, KmsKeyRequest, KeyUse, OidcConfigRequest,
    OperatorRolesRequest, Proxy, ResolvedResourceSet, Subnets, Vpc,
};
use resource_agent::provider::{ProviderError, ProviderResult, ResourcePreparer, Resources};
use serde_json::Value;
use std::path::Path;
use std::sync::Mutex;
use tokio::time::Instant;

/// A [`ResourcePreparer`] that hands out fixed identifiers. The operation named in `fail_on`
/// fails instead.
#[derive(Default)]
pub(crate) struct MockPreparer {
    fail_on: Option<&'static str>,
    destroy_failures: usize,
    calls: Mutex<Vec<(String, Instant)>>,
    policies: Mutex<Vec<(String, Vec<Value>)>>,
    operator_role_requests: Mutex<Vec<OperatorRolesRequest>>,
    destroyed: Mutex<Vec<ResolvedResourceSet>>,
}

impl MockPreparer {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn failing_on(call: &'static str) -> Self {
        Self {
            fail_on: Some(call),
            ..Self::default()
        }
    }

    /// `destroy_resources` reports this many failures.
    pub(crate) fn with_destroy_failures(mut self, failures: usize) -> Self {
        self.destroy_failures = failures;
        self
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(call, _)| call.clone())
            .collect()
    }

    /// When `call` was first received.
    pub(crate) fn called_at(&self, call: &str) -> Option<Instant> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .find(|(c, _)| c == call)
            .map(|(_, at)| *at)
    }

    pub(crate) fn operator_role_requests(&self) -> Vec<OperatorRolesRequest> {
        self.operator_role_requests.lock().unwrap().clone()
    }

    /// The resource sets handed to `destroy_resources`.
    pub(crate) fn destroyed(&self) -> Vec<ResolvedResourceSet> {
        self.destroyed.lock().unwrap().clone()
    }

    /// The key policy updates received, by key ARN.
    pub(crate) fn policies(&self) -> Vec<(String, Vec<Value>)> {
        self.policies.lock().unwrap().clone()
    }

    fn call(&self, call: &str) -> ProviderResult<()> {
        self.calls
            .lock()
            .unwrap()
            .push((call.to_string(), Instant::now()));
        if self.fail_on == Some(call) {
            return Err(ProviderError::new_with_context(
                Resources::Clear,
                format!("{} failed", call),
            ));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl ResourcePreparer for MockPreparer {
    async fn resolve_version(
        &self,
        constraint: &str,
        _channel_group: &str,
        _hosted_cp: bool,
    ) -> ProviderResult<Option<String>> {
        self.call("version")?;
        Ok(match constraint {
            "latest" | "4.15" => Some("4.15.9".to_string()),
            _ => None,
        })
    }

    async fn account_id(&self, shared_vpc_owner: bool) -> ProviderResult<String> {
        self.call("account-id")?;
        Ok(if shared_vpc_owner {
            "222222222222".to_string()
        } else {
            "111111111111".to_string()
        })
    }

    async fn prepare_account_roles(
        &self,
        request: &AccountRolesRequest,
    ) -> ProviderResult<AccountRoles> {
        self.call("account-roles")?;
        let arn = |role: &str| format!("arn:aws:iam::111111111111:role/{}-{}", request.prefix, role);
        Ok(AccountRoles {
            prefix: request.prefix.clone(),
            installer_role_arn: arn("Installer-Role"),
            support_role_arn: arn("Support-Role"),
            worker_role_arn: arn("Worker-Role"),
            control_plane_role_arn: if request.hosted_cp {
                None
            } else {
                Some(arn("ControlPlane-Role"))
            },
        })
    }

    async fn prepare_oidc_config(&self, _request: &OidcConfigRequest) -> ProviderResult<String> {
        self.call("oidc-config")?;
        Ok("25tu67hq45rto1am3slpf5lq6ht6d5ko".to_string())
    }

    async fn prepare_oidc_provider(&self, _oidc_config_id: &str) -> ProviderResult<()> {
        self.call("oidc-provider")
    }

    async fn prepare_operator_roles(
        &self,
        request: &OperatorRolesRequest,
    ) -> ProviderResult<String> {
        self.operator_role_requests
            .lock()
            .unwrap()
            .push(request.clone());
        self.call("operator-roles")?;
        Ok(request.prefix.clone())
    }

    async fn prepare_shared_vpc_role(
        &self,
        role_name: &str,
        _installer_role_arn: &str,
        _ingress_operator_role_arn: &str,
    ) -> ProviderResult<String> {
        self.call("shared-vpc-role")?;
        Ok(format!("arn:aws:iam::222222222222:role/{}", role_name))
    }

    async fn prepare_audit_log_role(
        &self,
        role_name: &str,
        _oidc_config_id: Option<&str>,
    ) -> ProviderResult<String> {
        self.call("audit-log-role")?;
        Ok(format!("arn:aws:iam::111111111111:role/{}", role_name))
    }

    async fn prepare_additional_principal_role(
        &self,
        role_name: &str,
        _installer_role_arn: &str,
    ) -> ProviderResult<String> {
        self.call("additional-principal-role")?;
        Ok(format!("arn:aws:iam::222222222222:role/{}", role_name))
    }

    async fn prepare_admin_user(&self) -> ProviderResult<AdminUser> {
        self.call("admin-user")?;
        Ok(AdminUser {
            username: "cluster-admin".to_string(),
            password: "Rosa-0123456789abcdef".to_string(),
        })
    }

    async fn prepare_vpc(&self, name_prefix: &str, cidr: &str) -> ProviderResult<Vpc> {
        self.call("vpc")?;
        Ok(Vpc {
            id: "vpc-0a1b2c".to_string(),
            name: name_prefix.to_string(),
            cidr: cidr.to_string(),
        })
    }

    async fn prepare_subnets(
        &self,
        _vpc: &Vpc,
        _zones: &[String],
        _multi_az: bool,
    ) -> ProviderResult<Subnets> {
        self.call("subnets")?;
        Ok(Subnets {
            private: vec!["subnet-private-a".to_string()],
            public: vec!["subnet-public-a".to_string()],
        })
    }

    async fn prepare_additional_security_groups(
        &self,
        _vpc: &Vpc,
        count: u32,
        _name_prefix: &str,
    ) -> ProviderResult<Vec<String>> {
        self.call("security-groups")?;
        Ok((0..count).map(|i| format!("sg-{}", i)).collect())
    }

    async fn prepare_proxy(
        &self,
        _vpc: &Vpc,
        _region: &str,
        _name: &str,
        ca_bundle_file: &Path,
    ) -> ProviderResult<Proxy> {
        self.call("proxy")?;
        Ok(Proxy {
            http_proxy: "http://10.0.0.10:8080".to_string(),
            https_proxy: "https://10.0.0.10:8080".to_string(),
            no_proxy: "quay.io".to_string(),
            ca_bundle_file: ca_bundle_file.display().to_string(),
        })
    }

    async fn prepare_subnet_arns(&self, subnet_ids: &[String]) -> ProviderResult<Vec<String>> {
        self.call("subnet-arns")?;
        Ok(subnet_ids
            .iter()
            .map(|id| format!("arn:aws:ec2:us-east-2:222222222222:subnet/{}", id))
            .collect())
    }

    async fn prepare_resource_share(
        &self,
        name: &str,
        _resource_arns: &[String],
    ) -> ProviderResult<String> {
        self.call("resource-share")?;
        Ok(format!("arn:aws:ram:us-east-2:222222222222:resource-share/{}", name))
    }

    async fn prepare_dns_domain(&self) -> ProviderResult<String> {
        self.call("dns-domain")?;
        Ok("ci.example.com".to_string())
    }

    async fn prepare_hosted_zone(
        &self,
        _cluster_name: &str,
        _domain: &str,
        _vpc_id: &str,
        _private: bool,
    ) -> ProviderResult<String> {
        self.call("hosted-zone")?;
        Ok("Z0123456789".to_string())
    }

    async fn prepare_kms_key(&self, request: &KmsKeyRequest) -> ProviderResult<String> {
        self.call("kms-key")?;
        Ok(match request.key_use {
            KeyUse::Etcd => "arn:aws:kms:us-east-2:111111111111:key/etcd".to_string(),
            KeyUse::Volume => "arn:aws:kms:us-east-2:111111111111:key/volume".to_string(),
        })
    }

    async fn prepare_oidc_provider_by_cluster(&self, _cluster_id: &str) -> ProviderResult<()> {
        self.call("oidc-provider-by-cluster")
    }

    async fn prepare_operator_roles_by_cluster(&self, _cluster_id: &str) -> ProviderResult<()> {
        self.call("operator-roles-by-cluster")
    }

    async fn update_kms_key_policy(
        &self,
        key_arn: &str,
        statements: &[Value],
    ) -> ProviderResult<()> {
        self.call("kms-policy")?;
        self.policies
            .lock()
            .unwrap()
            .push((key_arn.to_string(), statements.to_vec()));
        Ok(())
    }

    async fn destroy_resources(&self, resources: &ResolvedResourceSet) -> Vec<ProviderError> {
        self.destroyed.lock().unwrap().push(resources.clone());
        self.calls
            .lock()
            .unwrap()
            .push(("destroy".to_string(), Instant::now()));
        (0..self.destroy_failures)
            .map(|i| {
                ProviderError::new_with_context(
                    Resources::Remaining,
                    format!("resource {} could not be destroyed", i),
                )
            })
            .collect()
    }
}
