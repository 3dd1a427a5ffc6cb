//! Names of the cluster and of everything prepared for it, all derived from the profile's name
//! prefix.

use crate::error::{self, Result};
use fixture_model::constants::{
    DEFAULT_NAME_LENGTH, MAX_CLUSTER_NAME_LENGTH, MAX_DOMAIN_PREFIX_LENGTH,
    MAX_OIDC_CONFIG_PREFIX_LENGTH, MAX_ROLE_PREFIX_LENGTH, MAX_VPC_NAME_PREFIX_LENGTH,
};
use fixture_model::Profile;
use serde::{Deserialize, Serialize};
use snafu::ensure;

/// Truncate `name` to at most `max` bytes, never splitting a character, and drop any trailing
/// `-`. An empty result is a configuration error.
pub fn trim_name_by_length(name: &str, max: usize) -> Result<String> {
    let end = name
        .char_indices()
        .map(|(i, c)| i + c.len_utf8())
        .take_while(|end| *end <= max)
        .last()
        .unwrap_or(0);
    let trimmed = name.get(..end).unwrap_or_default().trim_end_matches('-');
    ensure!(
        !trimmed.is_empty(),
        error::ConfigurationSnafu {
            message: format!(
                "name '{}' is empty after trimming it to {} characters",
                name, max
            )
        }
    );
    Ok(trimmed.to_string())
}

#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct ResourceNames {
    pub cluster_name: String,
    /// Prefix of the account roles. Operator roles, the audit-log role and the shared-VPC role
    /// are named after it too.
    pub role_prefix: String,
    pub oidc_config_prefix: String,
    pub vpc_prefix: String,
    pub domain_prefix: String,
}

impl ResourceNames {
    /// Derive every name from the profile's name prefix. Fails before anything external is
    /// touched if the prefix is empty or the requested length is out of range.
    pub fn derive(profile: &Profile) -> Result<Self> {
        let prefix = profile.name_prefix.trim();
        ensure!(
            !prefix.is_empty(),
            error::ConfigurationSnafu {
                message: "the profile name prefix is empty, set it in the profile or with NAME_PREFIX"
            }
        );
        let name_length = profile.cluster.name_length.unwrap_or(DEFAULT_NAME_LENGTH);
        ensure!(
            name_length > 0 && name_length <= MAX_CLUSTER_NAME_LENGTH,
            error::ConfigurationSnafu {
                message: format!(
                    "name length {} is outside of 1..={}",
                    name_length, MAX_CLUSTER_NAME_LENGTH
                )
            }
        );

        let cluster_name = trim_name_by_length(prefix, name_length)?;
        Ok(Self {
            role_prefix: trim_name_by_length(&cluster_name, MAX_ROLE_PREFIX_LENGTH)?,
            oidc_config_prefix: trim_name_by_length(&cluster_name, MAX_OIDC_CONFIG_PREFIX_LENGTH)?,
            vpc_prefix: trim_name_by_length(&cluster_name, MAX_VPC_NAME_PREFIX_LENGTH)?,
            domain_prefix: trim_name_by_length(&cluster_name, MAX_DOMAIN_PREFIX_LENGTH)?,
            cluster_name,
        })
    }

    pub fn shared_vpc_role_name(&self) -> String {
        format!("{}-shared-vpc-role", self.role_prefix)
    }

    pub fn additional_principal_role_name(&self) -> String {
        format!("{}-additional-principal-role", self.role_prefix)
    }

    pub fn resource_share_name(&self) -> String {
        format!("{}-resource-share", self.role_prefix)
    }

    /// The ARN of the role the ingress operator will assume, in the same account and path as
    /// `installer_role_arn`.
    pub fn ingress_operator_role_arn(&self, installer_role_arn: &str) -> String {
        let account_part = installer_role_arn
            .split('/')
            .next()
            .unwrap_or(installer_role_arn);
        format!(
            "{}/{}-openshift-ingress-operator-cloud-credentials",
            account_part, self.role_prefix
        )
    }

    /// The ARN of the shared-VPC role in the VPC owner's account.
    pub fn shared_vpc_role_arn(&self, shared_vpc_account_id: &str) -> String {
        format!(
            "arn:aws:iam::{}:role/{}",
            shared_vpc_account_id,
            self.shared_vpc_role_name()
        )
    }
}
