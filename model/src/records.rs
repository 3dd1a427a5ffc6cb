use crate::constants::{
    API_URL_FILE, CLUSTER_ADMIN_FILE, CLUSTER_CONFIG_FILE, CLUSTER_DETAIL_FILE, CLUSTER_ID_FILE,
    CLUSTER_NAME_FILE, CLUSTER_TYPE_FILE, CONSOLE_URL_FILE, CREATE_COMMAND_FILE, INFRA_ID_FILE,
    INSTALL_LOG_FILE, RESOURCES_FILE,
};
use serde::{Deserialize, Serialize};

/// The structured records that are persisted between invocations.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Record {
    ClusterConfig,
    ClusterDetail,
    Resources,
}

impl Record {
    pub fn file_name(&self) -> &'static str {
        match self {
            Record::ClusterConfig => CLUSTER_CONFIG_FILE,
            Record::ClusterDetail => CLUSTER_DETAIL_FILE,
            Record::Resources => RESOURCES_FILE,
        }
    }
}

/// Single-value files kept for consumers that read flat files instead of the JSON records.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlainFile {
    ApiUrl,
    ConsoleUrl,
    InfraId,
    ClusterId,
    ClusterName,
    ClusterType,
    ClusterAdmin,
    CreateCommand,
    InstallLog,
}

impl PlainFile {
    pub fn file_name(&self) -> &'static str {
        match self {
            PlainFile::ApiUrl => API_URL_FILE,
            PlainFile::ConsoleUrl => CONSOLE_URL_FILE,
            PlainFile::InfraId => INFRA_ID_FILE,
            PlainFile::ClusterId => CLUSTER_ID_FILE,
            PlainFile::ClusterName => CLUSTER_NAME_FILE,
            PlainFile::ClusterType => CLUSTER_TYPE_FILE,
            PlainFile::ClusterAdmin => CLUSTER_ADMIN_FILE,
            PlainFile::CreateCommand => CREATE_COMMAND_FILE,
            PlainFile::InstallLog => INSTALL_LOG_FILE,
        }
    }
}

serde_plain::derive_display_from_serialize!(Record);
serde_plain::derive_display_from_serialize!(PlainFile);
