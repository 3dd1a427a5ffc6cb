use agent_utils::{client_result_for_cmd_output, command_line, run_command};
use fixture_model::{ClusterDescription, JsonDescription};
use log::debug;
use resource_agent::clients::{ClientError, ClientResult, ClusterClient, CreatedCluster};

/// A [`ClusterClient`] that runs `rosa`.
#[derive(Debug, Clone)]
pub struct RosaCli {
    rosa: String,
    region: Option<String>,
}

impl RosaCli {
    /// `rosa` is the path or name of the binary. Commands target `region` when it is given.
    pub fn new<S: Into<String>>(rosa: S, region: Option<String>) -> Self {
        Self {
            rosa: rosa.into(),
            region: region.filter(|region| !region.trim().is_empty()),
        }
    }

    fn args(&self, args: &[&str]) -> Vec<String> {
        let mut args: Vec<String> = args.iter().map(|arg| arg.to_string()).collect();
        if let Some(region) = &self.region {
            args.push("--region".to_string());
            args.push(region.clone());
        }
        args
    }

    fn run(&self, args: &[String]) -> ClientResult<String> {
        let output = run_command(&self.rosa, args)
            .map_err(|e| ClientError::InitializationFailed(Some(Box::new(e))))?;
        client_result_for_cmd_output(output)
    }

    fn describe(&self, cluster: &str) -> ClientResult<JsonDescription> {
        let stdout = self.run(&self.args(&["describe", "cluster", "-c", cluster, "-o", "json"]))?;
        JsonDescription::parse(&stdout).map_err(ClientError::from)
    }
}

#[async_trait::async_trait]
impl ClusterClient for RosaCli {
    async fn create_cluster(
        &self,
        cluster_name: &str,
        flags: &[String],
    ) -> ClientResult<CreatedCluster> {
        // Flags carry their own `--region` when the profile sets one.
        let args: Vec<String> = ["create", "cluster", "--cluster-name", cluster_name]
            .iter()
            .map(|arg| arg.to_string())
            .chain(flags.iter().cloned())
            .collect();
        let command = command_line(&self.rosa, &args);
        debug!("Creating cluster with '{}'", command);
        let output = self.run(&args)?;
        Ok(CreatedCluster { output, command })
    }

    async fn describe_cluster(&self, cluster: &str) -> ClientResult<ClusterDescription> {
        Ok(ClusterDescription::from_json(&self.describe(cluster)?))
    }

    async fn describe_cluster_json(&self, cluster_id: &str) -> ClientResult<JsonDescription> {
        self.describe(cluster_id)
    }

    async fn delete_cluster(&self, cluster_id: &str) -> ClientResult<String> {
        self.run(&self.args(&["delete", "cluster", "-c", cluster_id, "-y"]))
    }

    async fn install_log(&self, cluster_id: &str) -> ClientResult<String> {
        self.run(&self.args(&["logs", "install", "-c", cluster_id]))
    }

    async fn delete_oidc_provider(&self, cluster_id: &str) -> ClientResult<String> {
        self.run(&self.args(&[
            "delete",
            "oidc-provider",
            "-c",
            cluster_id,
            "-y",
            "--mode",
            "auto",
        ]))
    }

    async fn verify_network(&self, cluster_id: &str) -> ClientResult<String> {
        self.run(&self.args(&["verify", "network", "--cluster", cluster_id]))
    }
}

#[test]
fn region_is_appended() {
    let rosa = RosaCli::new("rosa", Some("us-east-2".to_string()));
    assert_eq!(
        rosa.args(&["logs", "install", "-c", "abc"]),
        vec!["logs", "install", "-c", "abc", "--region", "us-east-2"]
    );
    let rosa = RosaCli::new("rosa", Some(" ".to_string()));
    assert_eq!(rosa.args(&["whoami"]), vec!["whoami"]);
}

#[cfg(unix)]
#[test]
fn failures_keep_the_output() {
    // `sh -c <script>` stands in for the binary: the first argument becomes the script.
    let rosa = RosaCli::new("sh", None);
    let err = rosa
        .run(&[
            "-c".to_string(),
            "echo \"There is no cluster with identifier or name 'abc'\" >&2; exit 1".to_string(),
        ])
        .unwrap_err();
    assert!(err.output_contains("There is no cluster with identifier or name 'abc'"));
}
