use crate::env::GlobalEnv;
use crate::error::{self, Result};
use log::info;
use serde::{Deserialize, Serialize};
use snafu::{OptionExt, ResultExt};
use std::path::{Path, PathBuf};

/// A named, declarative description of the cluster a test run wants. Profiles are read from YAML:
///
/// ```yaml
/// profiles:
///   - as: rosa-sts-ad
///     name_prefix: ci-sts
///     version: "4.15"
///     channel_group: stable
///     region: us-east-2
///     cluster:
///       sts: true
///       multi_az: true
///       autoscale: true
///     account-role:
///       path: /test/
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    #[serde(rename = "as", alias = "name")]
    pub name: String,
    pub name_prefix: String,
    /// A version constraint (`latest`, `4.15`, `4.15.3`, ...). Empty means "service default".
    pub version: String,
    pub channel_group: String,
    pub region: String,
    pub cluster: ClusterProfile,
    #[serde(rename = "account-role", alias = "account_role")]
    pub account_role: AccountRoleConfig,
}

/// Feature toggles and knobs of the requested cluster.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterProfile {
    pub name_length: Option<usize>,
    pub domain_prefix_enabled: bool,
    pub sts: bool,
    pub hcp: bool,
    pub oidc_config: Option<OidcConfigKind>,
    pub shared_vpc: bool,
    pub additional_principals: bool,
    pub audit_log_forward: bool,
    pub private: bool,
    pub private_link: bool,
    pub admin_enabled: bool,
    pub autoscale: bool,
    pub replicas: Option<u32>,
    pub ingress_customized: bool,
    pub autoscaler_enabled: bool,
    pub networking: bool,
    pub byo_vpc: bool,
    /// Comma separated availability zones.
    pub zones: Option<String>,
    pub multi_az: bool,
    pub additional_sg_number: u32,
    pub proxy_enabled: bool,
    pub billing_account: Option<String>,
    pub disable_scp_checks: bool,
    pub disable_user_workload_monitoring: bool,
    pub etcd_kms: bool,
    /// EC2 instance metadata http tokens (`optional` or `required`).
    pub imdsv2: Option<String>,
    pub etcd_encryption: bool,
    pub external_auth_config: bool,
    pub fips: bool,
    pub instance_type: Option<String>,
    pub kms_key: bool,
    pub label_enabled: bool,
    pub provision_shard: Option<String>,
    pub tag_enabled: bool,
    pub volume_size: Option<u32>,
    pub network_type: Option<String>,
}

/// Whether the OIDC configuration's keys are held by the service or by the account owner.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OidcConfigKind {
    Managed,
    Unmanaged,
}

serde_plain::derive_display_from_serialize!(OidcConfigKind);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountRoleConfig {
    pub path: Option<String>,
    pub permission_boundary: Option<String>,
}

impl Profile {
    /// Apply the environment overrides. Called once, after the profile is loaded and before any
    /// resource is prepared.
    pub fn apply_env(&mut self, env: &GlobalEnv) {
        if let Some(channel_group) = non_empty(&env.channel_group) {
            info!("Got global env settings for channel group: {}", channel_group);
            self.channel_group = channel_group.to_string();
        }
        if let Some(version) = non_empty(&env.version) {
            info!("Got global env settings for version: {}", version);
            self.version = version.to_string();
        }
        if let Some(region) = non_empty(&env.region) {
            info!("Got global env settings for region: {}", region);
            self.region = region.to_string();
        }
        if let Some(shard) = non_empty(&env.provision_shard) {
            info!("Got global env settings for provision shard: {}", shard);
            self.cluster.provision_shard = Some(shard.to_string());
        }
        if let Some(prefix) = non_empty(&env.name_prefix) {
            info!("Got global env settings for name prefix: {}", prefix);
            self.name_prefix = prefix.to_string();
        }
        if let Some(instance_type) = non_empty(&env.compute_machine_type) {
            info!("Got global env settings for instance type: {}", instance_type);
            self.cluster.instance_type = Some(instance_type.to_string());
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// The profiles defined in one file or a directory of files.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileSet {
    #[serde(default)]
    pub profiles: Vec<Profile>,

    #[serde(skip)]
    location: PathBuf,
}

impl ProfileSet {
    pub fn from_yaml_str<P: AsRef<Path>>(yaml: &str, location: P) -> Result<Self> {
        let mut set: ProfileSet = serde_yaml::from_str(yaml).context(error::ProfileParseSnafu {
            path: location.as_ref(),
        })?;
        set.location = location.as_ref().to_path_buf();
        Ok(set)
    }

    /// Load profiles from a YAML file, or from every `.yaml`/`.yml` file in a directory. When two
    /// files define the same name the one that sorts last wins.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_dir() {
            let yaml = std::fs::read_to_string(path).context(error::ProfileReadSnafu { path })?;
            return Self::from_yaml_str(&yaml, path);
        }

        let mut files = std::fs::read_dir(path)
            .context(error::ProfileReadSnafu { path })?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| {
                matches!(
                    p.extension().and_then(|ext| ext.to_str()),
                    Some("yaml") | Some("yml")
                )
            })
            .collect::<Vec<_>>();
        files.sort();

        let mut merged = ProfileSet {
            profiles: Vec::new(),
            location: path.to_path_buf(),
        };
        for file in files {
            let yaml =
                std::fs::read_to_string(&file).context(error::ProfileReadSnafu { path: &file })?;
            for profile in Self::from_yaml_str(&yaml, &file)?.profiles {
                merged.profiles.retain(|p| p.name != profile.name);
                merged.profiles.push(profile);
            }
        }
        Ok(merged)
    }

    /// Find a profile by name.
    pub fn find(&self, name: &str) -> Result<Profile> {
        Ok(self
            .profiles
            .iter()
            .find(|p| p.name == name)
            .cloned()
            .context(error::ProfileNotFoundSnafu {
                name,
                dir: &self.location,
            })?)
    }

    pub fn names(&self) -> Vec<&str> {
        self.profiles.iter().map(|p| p.name.as_str()).collect()
    }
}
