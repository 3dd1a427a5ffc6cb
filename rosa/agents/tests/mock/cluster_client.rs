use fixture_model::constants::no_cluster_message;
use fixture_model::{ClusterDescription, JsonDescription};
use resource_agent::clients::{
    ClientError, ClientResult, ClusterClient, CommandOutput, CreatedCluster,
};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Mutex;

/// A scripted state that makes `describe_cluster` fail the way it does for a deleted cluster.
pub(crate) const GONE: &str = "<gone>";

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub(crate) enum DeleteOutcome {
    Deleted,
    NotFound,
    Fails,
}

/// A [`ClusterClient`] that plays back a list of states. The last state repeats forever.
pub(crate) struct MockClusterClient {
    cluster_id: String,
    states: Mutex<VecDeque<String>>,
    json: Value,
    delete: DeleteOutcome,
    network_fails: bool,
    calls: Mutex<Vec<String>>,
}

impl MockClusterClient {
    pub(crate) fn new<S: AsRef<str>>(cluster_id: &str, states: &[S]) -> Self {
        Self {
            cluster_id: cluster_id.to_string(),
            states: Mutex::new(states.iter().map(|s| s.as_ref().to_string()).collect()),
            json: Value::Null,
            delete: DeleteOutcome::Deleted,
            network_fails: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// What `describe_cluster_json` returns.
    pub(crate) fn with_json(mut self, json: Value) -> Self {
        self.json = json;
        self
    }

    pub(crate) fn with_delete(mut self, delete: DeleteOutcome) -> Self {
        self.delete = delete;
        self
    }

    /// `verify_network` reports a failed verification.
    pub(crate) fn with_failing_network(mut self) -> Self {
        self.network_fails = true;
        self
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn count(&self, call: &str) -> usize {
        self.calls().iter().filter(|c| c.as_str() == call).count()
    }

    fn record(&self, call: &str) {
        self.calls.lock().unwrap().push(call.to_string());
    }

    fn next_state(&self) -> String {
        let mut states = self.states.lock().unwrap();
        if states.len() > 1 {
            states.pop_front().unwrap()
        } else {
            states.front().cloned().unwrap_or_default()
        }
    }

    fn not_found(&self, command: &str) -> ClientError {
        ClientError::CommandFailed(CommandOutput {
            command: command.to_string(),
            code: Some(1),
            stdout: String::new(),
            stderr: format!("E: {}", no_cluster_message(&self.cluster_id)),
        })
    }
}

#[async_trait::async_trait]
impl ClusterClient for MockClusterClient {
    async fn create_cluster(
        &self,
        cluster_name: &str,
        flags: &[String],
    ) -> ClientResult<CreatedCluster> {
        self.record("create");
        Ok(CreatedCluster {
            output: format!("I: Creating cluster '{}'", cluster_name),
            command: format!(
                "rosa create cluster --cluster-name {} {}",
                cluster_name,
                flags.join(" ")
            ),
        })
    }

    async fn describe_cluster(&self, cluster: &str) -> ClientResult<ClusterDescription> {
        self.record("describe");
        let state = self.next_state();
        if state == GONE {
            return Err(self.not_found("rosa describe cluster"));
        }
        Ok(ClusterDescription {
            id: self.cluster_id.clone(),
            name: cluster.to_string(),
            state,
            api_url: Some(format!("https://api.{}.example.com:6443", self.cluster_id)),
            console_url: Some("https://console.example.com".to_string()),
            infra_id: Some("ci-rosa-x7k2p".to_string()),
            ..ClusterDescription::default()
        })
    }

    async fn describe_cluster_json(&self, _cluster_id: &str) -> ClientResult<JsonDescription> {
        self.record("describe-json");
        Ok(JsonDescription::new(self.json.clone()))
    }

    async fn delete_cluster(&self, _cluster_id: &str) -> ClientResult<String> {
        self.record("delete");
        match self.delete {
            DeleteOutcome::Deleted => Ok("I: Cluster will start uninstalling now".to_string()),
            DeleteOutcome::NotFound => Err(self.not_found("rosa delete cluster")),
            DeleteOutcome::Fails => Err(ClientError::CommandFailed(CommandOutput {
                command: "rosa delete cluster".to_string(),
                code: Some(1),
                stdout: String::new(),
                stderr: "E: Failed to delete cluster: access denied".to_string(),
            })),
        }
    }

    async fn install_log(&self, _cluster_id: &str) -> ClientResult<String> {
        self.record("install-log");
        Ok("level=error msg=\"Cluster operator ingress is not available\"".to_string())
    }

    async fn delete_oidc_provider(&self, _cluster_id: &str) -> ClientResult<String> {
        self.record("delete-oidc-provider");
        Ok(String::new())
    }

    async fn verify_network(&self, _cluster_id: &str) -> ClientResult<String> {
        self.record("verify-network");
        if self.network_fails {
            return Err(ClientError::CommandFailed(CommandOutput {
                command: "rosa verify network".to_string(),
                code: Some(1),
                stdout: String::new(),
                stderr: "E: subnet-private-a: egress to quay.io:443 is blocked".to_string(),
            }));
        }
        Ok(String::new())
    }
}
