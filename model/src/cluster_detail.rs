use crate::constants::CLUSTER_TYPE;
use crate::{ClusterDescription, Configuration};
use serde::{Deserialize, Serialize};

/// What the provisioning service reports about the cluster it created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterDetail {
    pub cluster_id: Option<String>,
    pub cluster_name: Option<String>,
    pub cluster_type: String,
    pub api_url: Option<String>,
    pub console_url: Option<String>,
    pub infra_id: Option<String>,
    pub oidc_endpoint_url: Option<String>,
    pub operator_roles_arns: Vec<String>,
}

impl Default for ClusterDetail {
    fn default() -> Self {
        Self {
            cluster_id: None,
            cluster_name: None,
            cluster_type: CLUSTER_TYPE.to_string(),
            api_url: None,
            console_url: None,
            infra_id: None,
            oidc_endpoint_url: None,
            operator_roles_arns: Vec::new(),
        }
    }
}

impl Configuration for ClusterDetail {}

impl ClusterDetail {
    /// Record the identity of a newly created cluster.
    pub fn record_creation(&mut self, description: &ClusterDescription) {
        self.cluster_id = Some(description.id.clone()).filter(|s| !s.is_empty());
        self.cluster_name = Some(description.name.clone()).filter(|s| !s.is_empty());
        self.oidc_endpoint_url = description.oidc_endpoint_url.clone();
        self.operator_roles_arns = description.operator_iam_roles.clone();
        self.record_endpoints(description);
    }

    /// Refresh the fields that only become known while the cluster installs. A field the
    /// description leaves out keeps its previous value.
    pub fn record_endpoints(&mut self, description: &ClusterDescription) {
        if description.api_url.is_some() {
            self.api_url = description.api_url.clone();
        }
        if description.console_url.is_some() {
            self.console_url = description.console_url.clone();
        }
        if description.infra_id.is_some() {
            self.infra_id = description.infra_id.clone();
        }
    }
}

#[test]
fn endpoints_are_not_cleared_by_partial_descriptions() {
    let mut detail = ClusterDetail::default();
    detail.record_creation(&ClusterDescription {
        id: "abc".to_string(),
        name: "ci".to_string(),
        api_url: Some("https://api".to_string()),
        ..ClusterDescription::default()
    });
    detail.record_endpoints(&ClusterDescription {
        console_url: Some("https://console".to_string()),
        ..ClusterDescription::default()
    });
    assert_eq!(detail.cluster_id.as_deref(), Some("abc"));
    assert_eq!(detail.api_url.as_deref(), Some("https://api"));
    assert_eq!(detail.console_url.as_deref(), Some("https://console"));
    assert_eq!(detail.cluster_type, "rosa");
}
