use crate::error::{self, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use snafu::ResultExt;
use std::fmt::{Display, Formatter};

/// The provisioning service's view of a cluster's state, classified from the raw state string.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum ClusterState {
    Pending,
    Validating,
    Installing,
    /// The service is waiting on something outside its control, usually roles or an OIDC
    /// provider that have not been created yet.
    Waiting,
    Ready,
    /// The service reported an error. Holds the raw state.
    Error(String),
    Uninstalling,
    /// A state this crate does not know about. Holds the raw state.
    Unknown(String),
}

impl ClusterState {
    /// Classify a raw state string. `ready` and `uninstalling` must match exactly; the others
    /// match when the raw state contains them, since the service decorates some states with a
    /// reason. Matching ignores case.
    pub fn classify(raw: &str) -> Self {
        let trimmed = raw.trim();
        let state = trimmed.to_lowercase();
        if state == "ready" {
            ClusterState::Ready
        } else if state == "uninstalling" {
            ClusterState::Uninstalling
        } else if state.contains("error") {
            ClusterState::Error(trimmed.to_string())
        } else if state.contains("pending") {
            ClusterState::Pending
        } else if state.contains("installing") {
            ClusterState::Installing
        } else if state.contains("validating") {
            ClusterState::Validating
        } else if state.contains("waiting") {
            ClusterState::Waiting
        } else {
            ClusterState::Unknown(trimmed.to_string())
        }
    }

    /// States in which the cluster is still making progress on its own.
    pub fn is_progressing(&self) -> bool {
        matches!(
            self,
            ClusterState::Pending | ClusterState::Installing | ClusterState::Validating
        )
    }
}

impl Display for ClusterState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ClusterState::Pending => write!(f, "pending"),
            ClusterState::Validating => write!(f, "validating"),
            ClusterState::Installing => write!(f, "installing"),
            ClusterState::Waiting => write!(f, "waiting"),
            ClusterState::Ready => write!(f, "ready"),
            ClusterState::Error(raw) | ClusterState::Unknown(raw) => write!(f, "{}", raw),
            ClusterState::Uninstalling => write!(f, "uninstalling"),
        }
    }
}

/// A structured description document queryable by dotted path, e.g. `aws.sts.role_arn`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JsonDescription(Value);

impl JsonDescription {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn parse(json: &str) -> Result<Self> {
        Ok(Self(
            serde_json::from_str(json).context(error::ConfigDeserializationSnafu)?,
        ))
    }

    pub fn value(&self) -> &Value {
        &self.0
    }

    /// The value at a dotted path. `None` if any segment is missing.
    pub fn get(&self, path: &str) -> Option<&Value> {
        path.split('.')
            .try_fold(&self.0, |value, segment| value.get(segment))
    }

    /// The non-empty string at a dotted path.
    pub fn str_at(&self, path: &str) -> Option<&str> {
        self.get(path)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    /// The boolean at a dotted path, `false` when absent.
    pub fn bool_at(&self, path: &str) -> bool {
        self.get(path).and_then(Value::as_bool).unwrap_or(false)
    }

    pub fn array_at(&self, path: &str) -> &[Value] {
        self.get(path)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// The fields of a cluster description that the lifecycle needs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterDescription {
    pub id: String,
    pub name: String,
    /// The raw state string, see [`ClusterState::classify`].
    pub state: String,
    pub api_url: Option<String>,
    pub console_url: Option<String>,
    pub infra_id: Option<String>,
    pub oidc_endpoint_url: Option<String>,
    pub operator_iam_roles: Vec<String>,
}

impl ClusterDescription {
    pub fn from_json(json: &JsonDescription) -> Self {
        let owned = |path: &str| json.str_at(path).map(str::to_string);
        Self {
            id: owned("id").unwrap_or_default(),
            name: owned("name").unwrap_or_default(),
            state: owned("state")
                .or_else(|| owned("status.state"))
                .unwrap_or_default(),
            api_url: owned("api.url"),
            console_url: owned("console.url"),
            infra_id: owned("infra_id"),
            oidc_endpoint_url: owned("aws.sts.oidc_endpoint_url"),
            operator_iam_roles: json
                .array_at("aws.sts.operator_iam_roles")
                .iter()
                .filter_map(|role| role.get("role_arn").and_then(Value::as_str))
                .map(str::to_string)
                .collect(),
        }
    }

    pub fn state(&self) -> ClusterState {
        ClusterState::classify(&self.state)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    #[test]
    fn classify_states() {
        assert_eq!(ClusterState::classify("ready"), ClusterState::Ready);
        assert_eq!(ClusterState::classify("Ready"), ClusterState::Ready);
        assert_eq!(ClusterState::classify("uninstalling"), ClusterState::Uninstalling);
        assert_eq!(ClusterState::classify("pending"), ClusterState::Pending);
        assert_eq!(ClusterState::classify("installing"), ClusterState::Installing);
        assert_eq!(ClusterState::classify("validating"), ClusterState::Validating);
        assert_eq!(
            ClusterState::classify("waiting (Waiting for OIDC configuration)"),
            ClusterState::Waiting
        );
        assert_eq!(
            ClusterState::classify("error"),
            ClusterState::Error("error".to_string())
        );
        assert_eq!(
            ClusterState::classify("Error: install failed"),
            ClusterState::Error("Error: install failed".to_string())
        );
        assert_eq!(
            ClusterState::classify("hibernating"),
            ClusterState::Unknown("hibernating".to_string())
        );
        // Only an exact match counts as ready.
        assert_eq!(
            ClusterState::classify("not ready"),
            ClusterState::Unknown("not ready".to_string())
        );
    }

    #[test]
    fn dotted_paths() {
        let json = JsonDescription::new(json!({
            "aws": { "sts": { "role_arn": "arn:installer", "empty": "" } },
            "hypershift": { "enabled": true },
        }));
        assert_eq!(json.str_at("aws.sts.role_arn"), Some("arn:installer"));
        assert_eq!(json.str_at("aws.sts.empty"), None);
        assert_eq!(json.str_at("aws.kms_key_arn"), None);
        assert!(json.bool_at("hypershift.enabled"));
        assert!(!json.bool_at("fips"));
        assert!(json.array_at("aws.sts.operator_iam_roles").is_empty());
    }

    #[test]
    fn description_from_json() {
        let json = JsonDescription::parse(
            r#"{
                "id": "2a3b",
                "name": "ci-sts",
                "state": "installing",
                "api": { "url": "https://api.ci-sts.example.com:6443" },
                "console": { "url": "https://console.ci-sts.example.com" },
                "infra_id": "ci-sts-x7k2p",
                "aws": { "sts": {
                    "oidc_endpoint_url": "https://oidc.example.com/2a3b",
                    "operator_iam_roles": [
                        { "name": "ebs-cloud-credentials", "role_arn": "arn:aws:iam::123:role/ebs" },
                        { "name": "cloud-credentials", "role_arn": "arn:aws:iam::123:role/ingress" }
                    ]
                } }
            }"#,
        )
        .unwrap();
        let desc = ClusterDescription::from_json(&json);
        assert_eq!(desc.id, "2a3b");
        assert_eq!(desc.state(), ClusterState::Installing);
        assert_eq!(desc.infra_id.as_deref(), Some("ci-sts-x7k2p"));
        assert_eq!(desc.console_url.as_deref(), Some("https://console.ci-sts.example.com"));
        assert_eq!(
            desc.operator_iam_roles,
            vec!["arn:aws:iam::123:role/ebs", "arn:aws:iam::123:role/ingress"]
        );
    }
}
