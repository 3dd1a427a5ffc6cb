use super::versions::select_version;
use agent_utils::{run_command, run_command_with_env};
use fixture_model::constants::ADMIN_USERNAME;
use fixture_model::{
    AccountRoles, AccountRolesRequest, AdminUser, KeyUse, KmsKeyRequest, OidcConfigKind,
    OidcConfigRequest, OperatorRolesRequest, Proxy, ResolvedResourceSet, Subnets, Vpc,
};
use log::{debug, info, warn};
use resource_agent::clients::CommandOutput;
use resource_agent::provider::{
    IntoProviderError, ProviderError, ProviderResult, ResourcePreparer, Resources,
};
use serde::Deserialize;
use serde_json::Value;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use uuid::Uuid;

const SHARED_CREDENTIALS_ENV: &str = "AWS_SHARED_CREDENTIALS_FILE";
const KMS_KEY_POLICY_NAME: &str = "default";
const KMS_KEY_DELETION_DAYS: &str = "7";

/// A [`ResourcePreparer`] that runs `rosa` for the resources the provisioning service manages
/// itself and `aws` for accounts and keys. Network topology is not prepared by this
/// implementation.
#[derive(Debug, Clone)]
pub struct RosaCliPreparer {
    rosa: String,
    aws: String,
    region: Option<String>,
    shared_vpc_credentials_file: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct ListedVersion {
    raw_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ListedAccountRole {
    role_name: String,
    role_type: String,
    #[serde(rename = "RoleARN")]
    role_arn: String,
}

impl RosaCliPreparer {
    pub fn new<S1, S2>(rosa: S1, aws: S2, region: Option<String>) -> Self
    where
        S1: Into<String>,
        S2: Into<String>,
    {
        Self {
            rosa: rosa.into(),
            aws: aws.into(),
            region: region.filter(|region| !region.trim().is_empty()),
            shared_vpc_credentials_file: None,
        }
    }

    /// Credentials used for commands that act in the shared VPC owner's account.
    pub fn shared_vpc_credentials_file<P: Into<PathBuf>>(mut self, path: Option<P>) -> Self {
        self.shared_vpc_credentials_file = path.map(Into::into);
        self
    }

    fn with_region(&self, args: &[&str]) -> Vec<String> {
        let mut args: Vec<String> = args.iter().map(|arg| arg.to_string()).collect();
        if let Some(region) = &self.region {
            args.push("--region".to_string());
            args.push(region.clone());
        }
        args
    }

    /// Run `rosa` and return everything it printed. `resources` describes what a failure leaves
    /// behind.
    fn rosa(&self, args: &[&str], resources: Resources, what: &str) -> ProviderResult<String> {
        let output = run_command(&self.rosa, self.with_region(args))
            .context(resources, format!("Unable to run rosa to {}", what))?;
        let output = checked(output, resources, what)?;
        Ok(format!("{}\n{}", output.stdout, output.stderr))
    }

    fn aws(
        &self,
        args: &[&str],
        shared_vpc_owner: bool,
        resources: Resources,
        what: &str,
    ) -> ProviderResult<String> {
        let args = self.with_region(args);
        let mut envs: Vec<(&str, &OsStr)> = Vec::new();
        if shared_vpc_owner {
            let credentials = self.shared_vpc_credentials_file.as_deref().context(
                Resources::Clear,
                "No credentials were given for the shared VPC owner's account",
            )?;
            envs.push((SHARED_CREDENTIALS_ENV, credentials.as_os_str()));
        }
        let output = run_command_with_env(&self.aws, args, &envs)
            .context(resources, format!("Unable to run aws to {}", what))?;
        checked(output, resources, what).map(|output| output.stdout)
    }

    async fn schedule_key_deletion(&self, key_arn: &str) -> ProviderResult<()> {
        self.aws(
            &[
                "kms",
                "schedule-key-deletion",
                "--key-id",
                key_arn,
                "--pending-window-in-days",
                KMS_KEY_DELETION_DAYS,
            ],
            false,
            Resources::Remaining,
            "schedule KMS key deletion",
        )?;
        info!("Scheduled deletion of KMS key '{}'", key_arn);
        Ok(())
    }
}

fn checked(
    output: CommandOutput,
    resources: Resources,
    what: &str,
) -> ProviderResult<CommandOutput> {
    if output.success() {
        Ok(output)
    } else {
        Err(ProviderError::new_with_context(
            resources,
            format!("Unable to {}: {}", what, output),
        ))
    }
}

fn unsupported<T>(what: &str) -> ProviderResult<T> {
    Err(ProviderError::new_with_context(
        Resources::Clear,
        format!("Preparing {} is not supported by the rosa preparer", what),
    ))
}

/// Find the account roles named with `prefix` in the output of `rosa list account-roles -o json`.
fn account_roles_from_list(prefix: &str, hosted_cp: bool, listed: &str) -> Option<AccountRoles> {
    let listed: Vec<ListedAccountRole> = serde_json::from_str(listed).ok()?;
    let role_prefix = format!("{}-", prefix);
    let arn_of = |role_type: &str| {
        listed
            .iter()
            .filter(|role| role.role_name.starts_with(&role_prefix))
            .filter(|role| role.role_name.contains("-HCP-") == hosted_cp)
            .find(|role| role.role_type.eq_ignore_ascii_case(role_type))
            .map(|role| role.role_arn.clone())
    };
    Some(AccountRoles {
        prefix: prefix.to_string(),
        installer_role_arn: arn_of("Installer")?,
        support_role_arn: arn_of("Support")?,
        worker_role_arn: arn_of("Worker")?,
        control_plane_role_arn: if hosted_cp {
            None
        } else {
            Some(arn_of("Control plane")?)
        },
    })
}

/// The OIDC configuration ID that `rosa create oidc-config` suggests passing to later commands.
fn oidc_config_id_from_output(output: &str) -> Option<String> {
    let mut words = output.split_whitespace();
    words.find(|word| *word == "--oidc-config-id")?;
    words
        .next()
        .map(|id| id.trim_matches(|c: char| c == '\'' || c == '"' || c == '`'))
        .filter(|id| !id.is_empty() && !id.starts_with('-'))
        .map(str::to_string)
}

fn admin_password() -> String {
    format!("Rosa-{}", Uuid::new_v4().simple())
}

/// Add `statements` to a key policy document, replacing statements with the same `Sid`.
fn merge_key_policy(policy: &str, statements: &[Value]) -> ProviderResult<Value> {
    let mut policy: Value =
        serde_json::from_str(policy).context(Resources::Remaining, "Unable to parse key policy")?;
    let existing = policy
        .get_mut("Statement")
        .and_then(Value::as_array_mut)
        .context(Resources::Remaining, "Key policy has no statements")?;
    for statement in statements {
        let sid = statement.get("Sid");
        existing.retain(|current| sid.is_none() || current.get("Sid") != sid);
        existing.push(statement.clone());
    }
    Ok(policy)
}

#[async_trait::async_trait]
impl ResourcePreparer for RosaCliPreparer {
    async fn resolve_version(
        &self,
        constraint: &str,
        channel_group: &str,
        hosted_cp: bool,
    ) -> ProviderResult<Option<String>> {
        let mut args = vec!["list", "versions", "-o", "json"];
        if !channel_group.is_empty() {
            args.extend(["--channel-group", channel_group]);
        }
        if hosted_cp {
            args.push("--hosted-cp");
        }
        let output = run_command(&self.rosa, self.with_region(&args))
            .context(Resources::Clear, "Unable to run rosa to list versions")?;
        let listed = checked(output, Resources::Clear, "list versions")?.stdout;
        let versions: Vec<ListedVersion> = serde_json::from_str(&listed)
            .context(Resources::Clear, "Unable to parse the version list")?;
        let available: Vec<&str> = versions.iter().map(|v| v.raw_id.as_str()).collect();
        debug!("Available versions: {:?}", available);
        Ok(select_version(constraint, &available))
    }

    async fn account_id(&self, shared_vpc_owner: bool) -> ProviderResult<String> {
        let account = self.aws(
            &[
                "sts",
                "get-caller-identity",
                "--query",
                "Account",
                "--output",
                "text",
            ],
            shared_vpc_owner,
            Resources::Clear,
            "get the account ID",
        )?;
        Ok(account.trim().to_string())
    }

    async fn prepare_account_roles(
        &self,
        request: &AccountRolesRequest,
    ) -> ProviderResult<AccountRoles> {
        let mut args = vec![
            "create",
            "account-roles",
            "--prefix",
            request.prefix.as_str(),
            "--mode",
            "auto",
            "-y",
        ];
        if request.hosted_cp {
            args.push("--hosted-cp");
        } else if let Some(version) = request.version.as_deref() {
            args.extend(["--version", version]);
        }
        if let Some(channel_group) = request.channel_group.as_deref() {
            args.extend(["--channel-group", channel_group]);
        }
        if let Some(path) = request.path.as_deref() {
            args.extend(["--path", path]);
        }
        if let Some(boundary) = request.permissions_boundary.as_deref() {
            args.extend(["--permissions-boundary", boundary]);
        }
        self.rosa(&args, Resources::Unknown, "create account roles")?;

        let output = run_command(&self.rosa, ["list", "account-roles", "-o", "json"])
            .context(Resources::Orphaned, "Unable to run rosa to list account roles")?;
        let listed = checked(output, Resources::Orphaned, "list account roles")?.stdout;
        let roles = account_roles_from_list(&request.prefix, request.hosted_cp, &listed).context(
            Resources::Orphaned,
            format!(
                "Account roles with prefix '{}' were created but could not be found",
                request.prefix
            ),
        )?;
        info!("Created account roles with prefix '{}'", request.prefix);
        Ok(roles)
    }

    async fn prepare_oidc_config(&self, request: &OidcConfigRequest) -> ProviderResult<String> {
        let mut args = vec!["create", "oidc-config", "--mode", "auto", "-y"];
        match request.kind {
            OidcConfigKind::Managed => args.push("--managed"),
            OidcConfigKind::Unmanaged => args.extend([
                "--managed=false",
                "--prefix",
                request.prefix.as_str(),
                "--installer-role-arn",
                request.installer_role_arn.as_str(),
            ]),
        }
        let output = self.rosa(&args, Resources::Unknown, "create an OIDC configuration")?;
        let id = oidc_config_id_from_output(&output).context(
            Resources::Orphaned,
            format!("No OIDC configuration ID in the output of rosa:\n{}", output),
        )?;
        info!("Created {} OIDC configuration '{}'", request.kind, id);
        Ok(id)
    }

    async fn prepare_oidc_provider(&self, oidc_config_id: &str) -> ProviderResult<()> {
        self.rosa(
            &[
                "create",
                "oidc-provider",
                "--oidc-config-id",
                oidc_config_id,
                "--mode",
                "auto",
                "-y",
            ],
            Resources::Unknown,
            "create an OIDC provider",
        )?;
        Ok(())
    }

    async fn prepare_operator_roles(
        &self,
        request: &OperatorRolesRequest,
    ) -> ProviderResult<String> {
        let mut args = vec![
            "create",
            "operator-roles",
            "--prefix",
            request.prefix.as_str(),
            "--oidc-config-id",
            request.oidc_config_id.as_str(),
            "--installer-role-arn",
            request.installer_role_arn.as_str(),
        ];
        if request.hosted_cp {
            args.push("--hosted-cp");
        }
        if let Some(arn) = request.shared_vpc_role_arn.as_deref() {
            args.extend(["--shared-vpc-role-arn", arn]);
        }
        if let Some(channel_group) = request.channel_group.as_deref() {
            args.extend(["--channel-group", channel_group]);
        }
        args.extend(["--mode", "auto", "-y"]);
        self.rosa(&args, Resources::Unknown, "create operator roles")?;
        Ok(request.prefix.clone())
    }

    async fn prepare_shared_vpc_role(
        &self,
        _role_name: &str,
        _installer_role_arn: &str,
        _ingress_operator_role_arn: &str,
    ) -> ProviderResult<String> {
        unsupported("the shared VPC role")
    }

    async fn prepare_audit_log_role(
        &self,
        _role_name: &str,
        _oidc_config_id: Option<&str>,
    ) -> ProviderResult<String> {
        unsupported("the audit log role")
    }

    async fn prepare_additional_principal_role(
        &self,
        _role_name: &str,
        _installer_role_arn: &str,
    ) -> ProviderResult<String> {
        unsupported("the additional principal role")
    }

    async fn prepare_admin_user(&self) -> ProviderResult<AdminUser> {
        Ok(AdminUser {
            username: ADMIN_USERNAME.to_string(),
            password: admin_password(),
        })
    }

    async fn prepare_vpc(&self, _name_prefix: &str, _cidr: &str) -> ProviderResult<Vpc> {
        unsupported("a VPC")
    }

    async fn prepare_subnets(
        &self,
        _vpc: &Vpc,
        _zones: &[String],
        _multi_az: bool,
    ) -> ProviderResult<Subnets> {
        unsupported("subnets")
    }

    async fn prepare_additional_security_groups(
        &self,
        _vpc: &Vpc,
        _count: u32,
        _name_prefix: &str,
    ) -> ProviderResult<Vec<String>> {
        unsupported("security groups")
    }

    async fn prepare_proxy(
        &self,
        _vpc: &Vpc,
        _region: &str,
        _name: &str,
        _ca_bundle_file: &Path,
    ) -> ProviderResult<Proxy> {
        unsupported("a proxy")
    }

    async fn prepare_subnet_arns(&self, _subnet_ids: &[String]) -> ProviderResult<Vec<String>> {
        unsupported("subnet ARNs")
    }

    async fn prepare_resource_share(
        &self,
        _name: &str,
        _resource_arns: &[String],
    ) -> ProviderResult<String> {
        unsupported("a resource share")
    }

    async fn prepare_dns_domain(&self) -> ProviderResult<String> {
        unsupported("a DNS domain")
    }

    async fn prepare_hosted_zone(
        &self,
        _cluster_name: &str,
        _domain: &str,
        _vpc_id: &str,
        _private: bool,
    ) -> ProviderResult<String> {
        unsupported("a hosted zone")
    }

    async fn prepare_kms_key(&self, request: &KmsKeyRequest) -> ProviderResult<String> {
        let description = match request.key_use {
            KeyUse::Etcd => "etcd encryption key of a test cluster",
            KeyUse::Volume => "volume encryption key of a test cluster",
        };
        let purpose = format!("Key=Purpose,Value={}", request.tag);
        let mut args = vec![
            "kms",
            "create-key",
            "--description",
            description,
            "--tags",
            purpose.as_str(),
        ];
        if request.hosted_cp {
            args.push("Key=red-hat,Value=true");
        }
        let created = self.aws(&args, false, Resources::Unknown, "create a KMS key")?;
        let created: Value = serde_json::from_str(&created)
            .context(Resources::Orphaned, "Unable to parse the created KMS key")?;
        let arn = created
            .pointer("/KeyMetadata/Arn")
            .and_then(Value::as_str)
            .context(Resources::Orphaned, "The created KMS key has no ARN")?;
        info!("Created {} KMS key '{}'", request.key_use, arn);
        Ok(arn.to_string())
    }

    async fn prepare_oidc_provider_by_cluster(&self, cluster_id: &str) -> ProviderResult<()> {
        self.rosa(
            &["create", "oidc-provider", "-c", cluster_id, "--mode", "auto", "-y"],
            Resources::Unknown,
            "create the cluster's OIDC provider",
        )?;
        Ok(())
    }

    async fn prepare_operator_roles_by_cluster(&self, cluster_id: &str) -> ProviderResult<()> {
        self.rosa(
            &["create", "operator-roles", "-c", cluster_id, "--mode", "auto", "-y"],
            Resources::Unknown,
            "create the cluster's operator roles",
        )?;
        Ok(())
    }

    async fn update_kms_key_policy(
        &self,
        key_arn: &str,
        statements: &[Value],
    ) -> ProviderResult<()> {
        let current = self.aws(
            &[
                "kms",
                "get-key-policy",
                "--key-id",
                key_arn,
                "--policy-name",
                KMS_KEY_POLICY_NAME,
                "--query",
                "Policy",
                "--output",
                "text",
            ],
            false,
            Resources::Remaining,
            "get the KMS key policy",
        )?;
        let policy = merge_key_policy(&current, statements)?;
        let policy = serde_json::to_string(&policy)
            .context(Resources::Remaining, "Unable to serialize the key policy")?;
        self.aws(
            &[
                "kms",
                "put-key-policy",
                "--key-id",
                key_arn,
                "--policy-name",
                KMS_KEY_POLICY_NAME,
                "--policy",
                policy.as_str(),
            ],
            false,
            Resources::Remaining,
            "update the KMS key policy",
        )?;
        Ok(())
    }

    async fn destroy_resources(&self, resources: &ResolvedResourceSet) -> Vec<ProviderError> {
        let mut errors = Vec::new();

        for key_arn in [&resources.kms_key_arn, &resources.etcd_kms_key_arn]
            .into_iter()
            .flatten()
        {
            if let Err(e) = self.schedule_key_deletion(key_arn).await {
                errors.push(e);
            }
        }

        let by_hand = [
            ("hosted zone", resources.hosted_zone_id.is_some()),
            ("DNS domain", resources.dns_domain.is_some()),
            ("resource share", resources.resource_share_arn.is_some()),
            ("proxy", resources.proxy.is_some()),
            ("security groups", !resources.security_groups.is_empty()),
            ("subnets", resources.subnets.is_some()),
            ("VPC", resources.vpc.is_some()),
            (
                "additional principal role",
                resources.additional_principal_role_arn.is_some(),
            ),
            ("audit log role", resources.audit_log_role_arn.is_some()),
            ("shared VPC role", resources.shared_vpc_role.is_some()),
        ];
        for (what, _) in by_hand.iter().filter(|(_, recorded)| *recorded) {
            warn!("Unable to destroy the {}, it must be destroyed by hand", what);
            errors.push(ProviderError::new_with_context(
                Resources::Remaining,
                format!("Destroying the {} is not supported by the rosa preparer", what),
            ));
        }

        if let Some(prefix) = resources.operator_roles_prefix.as_deref() {
            let deleted = self.rosa(
                &["delete", "operator-roles", "--prefix", prefix, "--mode", "auto", "-y"],
                Resources::Remaining,
                "delete operator roles",
            );
            match deleted {
                Ok(_) => info!("Deleted operator roles with prefix '{}'", prefix),
                Err(e) => errors.push(e),
            }
        }

        if let Some(oidc_config_id) = resources.oidc_provider_for.as_deref() {
            let deleted = self.rosa(
                &[
                    "delete",
                    "oidc-provider",
                    "--oidc-config-id",
                    oidc_config_id,
                    "--mode",
                    "auto",
                    "-y",
                ],
                Resources::Remaining,
                "delete the OIDC provider",
            );
            match deleted {
                Ok(_) => info!("Deleted the OIDC provider of '{}'", oidc_config_id),
                Err(e) => errors.push(e),
            }
        }

        if let Some(oidc_config_id) = resources.oidc_config_id.as_deref() {
            let deleted = self.rosa(
                &[
                    "delete",
                    "oidc-config",
                    "--oidc-config-id",
                    oidc_config_id,
                    "--mode",
                    "auto",
                    "-y",
                ],
                Resources::Remaining,
                "delete the OIDC configuration",
            );
            match deleted {
                Ok(_) => info!("Deleted OIDC configuration '{}'", oidc_config_id),
                Err(e) => errors.push(e),
            }
        }

        if let Some(roles) = &resources.account_roles {
            let mut args = vec![
                "delete",
                "account-roles",
                "--prefix",
                roles.prefix.as_str(),
                "--mode",
                "auto",
                "-y",
            ];
            if roles.control_plane_role_arn.is_none() {
                args.push("--hosted-cp");
            }
            match self.rosa(&args, Resources::Remaining, "delete account roles") {
                Ok(_) => info!("Deleted account roles with prefix '{}'", roles.prefix),
                Err(e) => errors.push(e),
            }
        }

        errors
    }
}
