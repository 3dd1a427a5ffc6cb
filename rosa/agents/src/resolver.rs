/*!

Prepares the cloud resources a cluster depends on, in dependency order.

The order is an explicit list, [`RESOLUTION_ORDER`]. Each [`Step`] names the steps it depends on
([`Step::requires`]) and decides whether a profile needs it at all ([`Step::enabled`]). A failed
step stops resolution; everything prepared before it stays recorded in the
[`ResolvedResourceSet`] so that teardown can destroy it. Nothing is rolled back here.

!*/

use crate::error::{self, Result};
use crate::features::Features;
use crate::naming::ResourceNames;
use fixture_model::constants::{DEFAULT_VPC_CIDR, KMS_KEY_TAG, MACHINE_CIDR};
use fixture_model::{
    AccountRolesRequest, KeyUse, KmsKeyRequest, OidcConfigKind, OidcConfigRequest,
    OperatorRolesRequest, Profile, ResolvedResourceSet, Vpc,
};
use log::{debug, info};
use resource_agent::provider::ResourcePreparer;
use serde::{Deserialize, Serialize};
use snafu::{ensure, OptionExt, ResultExt};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Step {
    Version,
    AccountRoles,
    SharedVpcRoleArn,
    OidcConfig,
    OidcProvider,
    OperatorRoles,
    SharedVpcRole,
    AuditLogRole,
    AdditionalPrincipalRole,
    AdminUser,
    Vpc,
    Subnets,
    SecurityGroups,
    Proxy,
    SubnetArns,
    ResourceShare,
    DnsDomain,
    HostedZone,
    EtcdKmsKey,
    VolumeKmsKey,
}

serde_plain::derive_display_from_serialize!(Step);

/// The order in which steps run.
pub const RESOLUTION_ORDER: [Step; 20] = [
    Step::Version,
    Step::AccountRoles,
    Step::SharedVpcRoleArn,
    Step::OidcConfig,
    Step::OidcProvider,
    Step::OperatorRoles,
    Step::SharedVpcRole,
    Step::AuditLogRole,
    Step::AdditionalPrincipalRole,
    Step::AdminUser,
    Step::Vpc,
    Step::Subnets,
    Step::SecurityGroups,
    Step::Proxy,
    Step::SubnetArns,
    Step::ResourceShare,
    Step::DnsDomain,
    Step::HostedZone,
    Step::EtcdKmsKey,
    Step::VolumeKmsKey,
];

impl Step {
    /// Steps that must run before this one whenever they are enabled.
    pub fn requires(&self) -> &'static [Step] {
        match self {
            Step::Version => &[],
            Step::AccountRoles => &[Step::Version],
            Step::SharedVpcRoleArn => &[Step::AccountRoles],
            Step::OidcConfig => &[Step::AccountRoles],
            Step::OidcProvider => &[Step::OidcConfig],
            Step::OperatorRoles => &[
                Step::AccountRoles,
                Step::SharedVpcRoleArn,
                Step::OidcConfig,
                Step::OidcProvider,
            ],
            Step::SharedVpcRole => &[
                Step::AccountRoles,
                Step::SharedVpcRoleArn,
                Step::OperatorRoles,
            ],
            Step::AuditLogRole => &[Step::AccountRoles, Step::OidcConfig],
            Step::AdditionalPrincipalRole => &[Step::AccountRoles],
            Step::AdminUser => &[],
            Step::Vpc => &[],
            Step::Subnets => &[Step::Vpc],
            Step::SecurityGroups => &[Step::Vpc, Step::Subnets],
            Step::Proxy => &[Step::Vpc, Step::Subnets],
            Step::SubnetArns => &[Step::Subnets],
            Step::ResourceShare => &[Step::SubnetArns],
            Step::DnsDomain => &[Step::Subnets],
            Step::HostedZone => &[Step::Vpc, Step::DnsDomain],
            Step::EtcdKmsKey => &[],
            Step::VolumeKmsKey => &[],
        }
    }

    /// Whether `profile` needs this step.
    pub fn enabled(&self, profile: &Profile) -> bool {
        let features = Features::new(profile);
        let cluster = features.cluster();
        match self {
            Step::Version => features.version_requested(),
            Step::AccountRoles => features.sts(),
            Step::SharedVpcRoleArn | Step::SharedVpcRole => features.sts() && cluster.shared_vpc,
            Step::OidcConfig | Step::OidcProvider | Step::OperatorRoles => {
                features.sts() && cluster.oidc_config.is_some()
            }
            Step::AuditLogRole => features.sts() && cluster.audit_log_forward,
            Step::AdditionalPrincipalRole => features.sts() && cluster.additional_principals,
            Step::AdminUser => cluster.admin_enabled,
            Step::Vpc | Step::Subnets => features.byo_vpc(),
            Step::SecurityGroups => features.byo_vpc() && cluster.additional_sg_number > 0,
            Step::Proxy => features.byo_vpc() && cluster.proxy_enabled,
            Step::SubnetArns | Step::ResourceShare | Step::DnsDomain | Step::HostedZone => {
                features.byo_vpc() && cluster.shared_vpc
            }
            Step::EtcdKmsKey => cluster.etcd_kms,
            Step::VolumeKmsKey => cluster.kms_key,
        }
    }
}

/// The steps `profile` needs, in the order they run.
pub fn plan(profile: &Profile) -> Vec<Step> {
    RESOLUTION_ORDER
        .iter()
        .copied()
        .filter(|step| step.enabled(profile))
        .collect()
}

pub struct Resolver<'a, P>
where
    P: ResourcePreparer,
{
    preparer: &'a P,
    shared_vpc_grace: Duration,
    proxy_ca_bundle_file: PathBuf,
}

impl<'a, P> Resolver<'a, P>
where
    P: ResourcePreparer,
{
    pub fn new(preparer: &'a P) -> Self {
        Self {
            preparer,
            shared_vpc_grace: fixture_model::constants::SHARED_VPC_GRACE,
            proxy_ca_bundle_file: PathBuf::from(fixture_model::constants::PROXY_CA_BUNDLE_FILE),
        }
    }

    pub fn shared_vpc_grace(mut self, grace: Duration) -> Self {
        self.shared_vpc_grace = grace;
        self
    }

    pub fn proxy_ca_bundle_file<T: Into<PathBuf>>(mut self, path: T) -> Self {
        self.proxy_ca_bundle_file = path.into();
        self
    }

    /// Prepare everything `profile` needs, recording identifiers into `resources` as each step
    /// completes. `resources` must start empty; on failure it keeps whatever was prepared.
    pub async fn resolve(
        &self,
        profile: &Profile,
        names: &ResourceNames,
        resources: &mut ResolvedResourceSet,
    ) -> Result<()> {
        ensure!(
            resources.is_empty(),
            error::ConfigurationSnafu {
                message: "resources have already been prepared for this cluster"
            }
        );
        for step in plan(profile) {
            info!("Preparing {} for cluster '{}'", step, names.cluster_name);
            self.run(step, profile, names, resources).await?;
        }
        debug!("Prepared resources: {:?}", resources);
        Ok(())
    }

    async fn run(
        &self,
        step: Step,
        profile: &Profile,
        names: &ResourceNames,
        resources: &mut ResolvedResourceSet,
    ) -> Result<()> {
        let features = Features::new(profile);
        let cluster = features.cluster();
        let channel_group = non_empty(&profile.channel_group);
        match step {
            Step::Version => {
                // Hosted control planes cannot filter versions, so always resolve as classic.
                let version = self
                    .preparer
                    .resolve_version(&profile.version, &profile.channel_group, false)
                    .await
                    .context(error::DependencyResolutionSnafu { step })?
                    .context(error::ConfigurationSnafu {
                        message: format!(
                            "cannot find a version matching '{}' in channel group '{}'",
                            profile.version, profile.channel_group
                        ),
                    })?;
                resources.version = Some(version);
            }
            Step::AccountRoles => {
                let request = AccountRolesRequest {
                    prefix: names.role_prefix.clone(),
                    hosted_cp: features.hcp(),
                    version: resources.version.clone(),
                    channel_group,
                    path: profile.account_role.path.clone(),
                    permissions_boundary: profile.account_role.permission_boundary.clone(),
                };
                let roles = self
                    .preparer
                    .prepare_account_roles(&request)
                    .await
                    .context(error::DependencyResolutionSnafu { step })?;
                resources.account_roles = Some(roles);
            }
            Step::SharedVpcRoleArn => {
                let account_id = self
                    .preparer
                    .account_id(true)
                    .await
                    .context(error::DependencyResolutionSnafu { step })?;
                resources.shared_vpc_role_arn = Some(names.shared_vpc_role_arn(&account_id));
            }
            Step::OidcConfig => {
                let request = OidcConfigRequest {
                    kind: cluster.oidc_config.unwrap_or(OidcConfigKind::Managed),
                    installer_role_arn: installer_role_arn(step, resources)?,
                    prefix: names.oidc_config_prefix.clone(),
                };
                let id = self
                    .preparer
                    .prepare_oidc_config(&request)
                    .await
                    .context(error::DependencyResolutionSnafu { step })?;
                resources.oidc_config_id = Some(id);
            }
            Step::OidcProvider => {
                let id = oidc_config_id(step, resources)?;
                self.preparer
                    .prepare_oidc_provider(&id)
                    .await
                    .context(error::DependencyResolutionSnafu { step })?;
                resources.oidc_provider_for = Some(id);
            }
            Step::OperatorRoles => {
                let request = OperatorRolesRequest {
                    prefix: names.role_prefix.clone(),
                    oidc_config_id: oidc_config_id(step, resources)?,
                    installer_role_arn: installer_role_arn(step, resources)?,
                    shared_vpc_role_arn: resources.shared_vpc_role_arn.clone(),
                    hosted_cp: features.hcp(),
                    channel_group,
                };
                let prefix = self
                    .preparer
                    .prepare_operator_roles(&request)
                    .await
                    .context(error::DependencyResolutionSnafu { step })?;
                resources.operator_roles_prefix = Some(prefix);
            }
            Step::SharedVpcRole => {
                info!(
                    "Waiting {:?} for the operator roles to become visible before creating the shared VPC role",
                    self.shared_vpc_grace
                );
                tokio::time::sleep(self.shared_vpc_grace).await;
                let installer = installer_role_arn(step, resources)?;
                let arn = self
                    .preparer
                    .prepare_shared_vpc_role(
                        &names.shared_vpc_role_name(),
                        &installer,
                        &names.ingress_operator_role_arn(&installer),
                    )
                    .await
                    .context(error::DependencyResolutionSnafu { step })?;
                resources.shared_vpc_role = Some(arn);
            }
            Step::AuditLogRole => {
                let arn = self
                    .preparer
                    .prepare_audit_log_role(&names.role_prefix, resources.oidc_config_id.as_deref())
                    .await
                    .context(error::DependencyResolutionSnafu { step })?;
                resources.audit_log_role_arn = Some(arn);
            }
            Step::AdditionalPrincipalRole => {
                let installer = installer_role_arn(step, resources)?;
                let arn = self
                    .preparer
                    .prepare_additional_principal_role(
                        &names.additional_principal_role_name(),
                        &installer,
                    )
                    .await
                    .context(error::DependencyResolutionSnafu { step })?;
                resources.additional_principal_role_arn = Some(arn);
            }
            Step::AdminUser => {
                let admin = self
                    .preparer
                    .prepare_admin_user()
                    .await
                    .context(error::DependencyResolutionSnafu { step })?;
                resources.admin_user = Some(admin);
            }
            Step::Vpc => {
                let cidr = if cluster.networking {
                    MACHINE_CIDR
                } else {
                    DEFAULT_VPC_CIDR
                };
                let vpc = self
                    .preparer
                    .prepare_vpc(&names.vpc_prefix, cidr)
                    .await
                    .context(error::DependencyResolutionSnafu { step })?;
                resources.vpc = Some(vpc);
            }
            Step::Subnets => {
                let vpc = vpc(step, resources)?;
                let subnets = self
                    .preparer
                    .prepare_subnets(&vpc, &features.zones(), cluster.multi_az)
                    .await
                    .context(error::DependencyResolutionSnafu { step })?;
                resources.subnets = Some(subnets);
            }
            Step::SecurityGroups => {
                let vpc = vpc(step, resources)?;
                let groups = self
                    .preparer
                    .prepare_additional_security_groups(
                        &vpc,
                        cluster.additional_sg_number,
                        &names.vpc_prefix,
                    )
                    .await
                    .context(error::DependencyResolutionSnafu { step })?;
                resources.security_groups = groups;
            }
            Step::Proxy => {
                let vpc = vpc(step, resources)?;
                let name = if vpc.name.is_empty() {
                    names.cluster_name.clone()
                } else {
                    vpc.name.clone()
                };
                let proxy = self
                    .preparer
                    .prepare_proxy(&vpc, &profile.region, &name, &self.proxy_ca_bundle_file)
                    .await
                    .context(error::DependencyResolutionSnafu { step })?;
                resources.proxy = Some(proxy);
            }
            Step::SubnetArns => {
                let subnet_ids = cluster_subnet_ids(&features, resources);
                ensure!(
                    !subnet_ids.is_empty(),
                    error::PrerequisiteSnafu {
                        step,
                        missing: Step::Subnets
                    }
                );
                let arns = self
                    .preparer
                    .prepare_subnet_arns(&subnet_ids)
                    .await
                    .context(error::DependencyResolutionSnafu { step })?;
                resources.subnet_arns = arns;
            }
            Step::ResourceShare => {
                ensure!(
                    !resources.subnet_arns.is_empty(),
                    error::PrerequisiteSnafu {
                        step,
                        missing: Step::SubnetArns
                    }
                );
                let arn = self
                    .preparer
                    .prepare_resource_share(&names.resource_share_name(), &resources.subnet_arns)
                    .await
                    .context(error::DependencyResolutionSnafu { step })?;
                resources.resource_share_arn = Some(arn);
            }
            Step::DnsDomain => {
                let domain = self
                    .preparer
                    .prepare_dns_domain()
                    .await
                    .context(error::DependencyResolutionSnafu { step })?;
                resources.dns_domain = Some(domain);
            }
            Step::HostedZone => {
                let vpc = vpc(step, resources)?;
                let domain = resources.dns_domain.clone().context(error::PrerequisiteSnafu {
                    step,
                    missing: Step::DnsDomain,
                })?;
                let zone = self
                    .preparer
                    .prepare_hosted_zone(&names.cluster_name, &domain, &vpc.id, true)
                    .await
                    .context(error::DependencyResolutionSnafu { step })?;
                resources.hosted_zone_id = Some(zone);
            }
            Step::EtcdKmsKey | Step::VolumeKmsKey => {
                let key_use = if step == Step::EtcdKmsKey {
                    KeyUse::Etcd
                } else {
                    KeyUse::Volume
                };
                let request = KmsKeyRequest {
                    tag: KMS_KEY_TAG.to_string(),
                    hosted_cp: features.hcp(),
                    key_use,
                };
                let arn = self
                    .preparer
                    .prepare_kms_key(&request)
                    .await
                    .context(error::DependencyResolutionSnafu { step })?;
                match key_use {
                    KeyUse::Etcd => resources.etcd_kms_key_arn = Some(arn),
                    KeyUse::Volume => resources.kms_key_arn = Some(arn),
                }
            }
        }
        Ok(())
    }
}

/// The subnets the cluster is installed into: the private subnets, plus the public ones unless
/// the cluster uses private link.
pub fn cluster_subnet_ids(features: &Features<'_>, resources: &ResolvedResourceSet) -> Vec<String> {
    match &resources.subnets {
        None => Vec::new(),
        Some(subnets) if features.private_link() => subnets.private.clone(),
        Some(subnets) => subnets
            .private
            .iter()
            .chain(subnets.public.iter())
            .cloned()
            .collect(),
    }
}

fn non_empty(s: &str) -> Option<String> {
    Some(s.trim().to_string()).filter(|s| !s.is_empty())
}

fn installer_role_arn(step: Step, resources: &ResolvedResourceSet) -> Result<String> {
    resources
        .account_roles
        .as_ref()
        .map(|roles| roles.installer_role_arn.clone())
        .context(error::PrerequisiteSnafu {
            step,
            missing: Step::AccountRoles,
        })
}

fn oidc_config_id(step: Step, resources: &ResolvedResourceSet) -> Result<String> {
    resources
        .oidc_config_id
        .clone()
        .context(error::PrerequisiteSnafu {
            step,
            missing: Step::OidcConfig,
        })
}

fn vpc(step: Step, resources: &ResolvedResourceSet) -> Result<Vpc> {
    resources.vpc.clone().context(error::PrerequisiteSnafu {
        step,
        missing: Step::Vpc,
    })
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn requirements_come_first() {
        for (position, step) in RESOLUTION_ORDER.iter().enumerate() {
            for required in step.requires() {
                let required_position = RESOLUTION_ORDER
                    .iter()
                    .position(|s| s == required)
                    .unwrap();
                assert!(
                    required_position < position,
                    "{} requires {} but runs before it",
                    step,
                    required
                );
            }
        }
    }

    #[test]
    fn every_step_is_ordered_once() {
        for step in RESOLUTION_ORDER {
            assert_eq!(RESOLUTION_ORDER.iter().filter(|s| **s == step).count(), 1);
        }
    }

    #[test]
    fn plans() {
        let mut profile = Profile::default();
        assert!(plan(&profile).is_empty());

        profile.version = "4.15".to_string();
        profile.cluster.sts = true;
        profile.cluster.kms_key = true;
        assert_eq!(
            plan(&profile),
            vec![Step::Version, Step::AccountRoles, Step::VolumeKmsKey]
        );

        profile.cluster.oidc_config = Some(OidcConfigKind::Managed);
        profile.cluster.shared_vpc = true;
        profile.cluster.byo_vpc = true;
        assert_eq!(
            plan(&profile),
            vec![
                Step::Version,
                Step::AccountRoles,
                Step::SharedVpcRoleArn,
                Step::OidcConfig,
                Step::OidcProvider,
                Step::OperatorRoles,
                Step::SharedVpcRole,
                Step::Vpc,
                Step::Subnets,
                Step::SubnetArns,
                Step::ResourceShare,
                Step::DnsDomain,
                Step::HostedZone,
                Step::VolumeKmsKey,
            ]
        );
    }

    #[test]
    fn sts_only_steps_need_sts() {
        let mut profile = Profile::default();
        profile.cluster.oidc_config = Some(OidcConfigKind::Unmanaged);
        profile.cluster.audit_log_forward = true;
        profile.cluster.additional_principals = true;
        assert!(plan(&profile).is_empty());
    }

    #[test]
    fn step_display() {
        assert_eq!(Step::SharedVpcRoleArn.to_string(), "shared-vpc-role-arn");
        assert_eq!(Step::EtcdKmsKey.to_string(), "etcd-kms-key");
    }
}
