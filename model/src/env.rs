use crate::constants::DEFAULT_CLUSTER_TIMEOUT_MINUTES;
use crate::error::{self, Result};
use serde::Deserialize;
use snafu::ResultExt;
use std::path::PathBuf;

/// Settings read from the process environment. Every field maps to the upper-cased environment
/// variable of the same name, e.g. `channel_group` is read from `CHANNEL_GROUP`.
///
/// # Example
///
/// ```text
/// TEST_PROFILE=rosa-sts-ad REGION=us-east-2 NAME_PREFIX=ci-run-42 rosa-fixture create --wait
/// ```
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct GlobalEnv {
    /// The name of the profile to use.
    #[serde(default)]
    pub test_profile: Option<String>,

    /// A file or a directory of files holding the profile definitions.
    #[serde(default = "profiles_dir")]
    pub profiles_dir: PathBuf,

    /// Where records shared between invocations are written.
    #[serde(default = "shared_dir")]
    pub shared_dir: PathBuf,

    /// Where diagnostic artifacts (install logs) are written. Defaults to `shared_dir`.
    #[serde(default)]
    pub artifact_dir: Option<PathBuf>,

    #[serde(default)]
    pub channel_group: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub provision_shard: Option<String>,
    #[serde(default)]
    pub name_prefix: Option<String>,
    #[serde(default)]
    pub compute_machine_type: Option<String>,

    /// Minutes to wait for the cluster to become ready, and for it to uninstall.
    #[serde(default = "cluster_timeout")]
    pub cluster_timeout: u64,

    /// Whether `create` should also wait for the cluster to become ready.
    #[serde(default)]
    pub wait_setup_cluster_ready: bool,

    /// Credentials for the account that owns a shared VPC.
    #[serde(default)]
    pub shared_vpc_aws_shared_credentials_file: Option<PathBuf>,

    /// The path or name of the `rosa` binary.
    #[serde(default = "rosa_cli")]
    pub rosa_cli: String,

    /// The path or name of the `aws` binary.
    #[serde(default = "aws_cli")]
    pub aws_cli: String,
}

impl GlobalEnv {
    /// Read settings from the process environment.
    pub fn from_env() -> Result<Self> {
        Ok(envy::from_env::<Self>().context(error::EnvSettingsSnafu)?)
    }

    /// Read settings from an explicit set of key/value pairs, keys spelled as environment
    /// variables.
    pub fn from_vars<I>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        Ok(envy::from_iter::<_, Self>(vars).context(error::EnvSettingsSnafu)?)
    }

    pub fn artifact_dir(&self) -> PathBuf {
        self.artifact_dir
            .clone()
            .unwrap_or_else(|| self.shared_dir.clone())
    }
}

fn profiles_dir() -> PathBuf {
    PathBuf::from("profiles")
}

fn shared_dir() -> PathBuf {
    PathBuf::from("output")
}

fn cluster_timeout() -> u64 {
    DEFAULT_CLUSTER_TIMEOUT_MINUTES
}

fn rosa_cli() -> String {
    String::from("rosa")
}

fn aws_cli() -> String {
    String::from("aws")
}
