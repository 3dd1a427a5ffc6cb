use crate::Fixture;
use anyhow::{Context, Result};
use clap::Parser;

/// Wait for the cluster created by an earlier `create` to become ready.
#[derive(Debug, Parser)]
pub(crate) struct Wait {
    /// Minutes to wait. Defaults to CLUSTER_TIMEOUT.
    #[clap(long = "timeout-minutes")]
    timeout_minutes: Option<u64>,
}

impl Wait {
    pub(crate) async fn run(self, fixture: Fixture) -> Result<()> {
        let timeout_minutes = self.timeout_minutes.unwrap_or(fixture.env.cluster_timeout);
        let mut handler = fixture.handler().await?;
        handler
            .wait_for_cluster_ready(timeout_minutes)
            .await
            .context("The cluster did not become ready")?;
        println!(
            "Cluster '{}' is ready, API at {}",
            handler.detail().cluster_id.as_deref().unwrap_or_default(),
            handler.detail().api_url.as_deref().unwrap_or("<unknown>")
        );
        Ok(())
    }
}
