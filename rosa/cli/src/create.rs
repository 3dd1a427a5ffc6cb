use crate::Fixture;
use anyhow::{Context, Result};
use clap::Parser;

/// Prepare the resources the profile needs and create the cluster.
#[derive(Debug, Parser)]
pub(crate) struct Create {
    /// Also wait for the cluster to become ready. Implied by WAIT_SETUP_CLUSTER_READY=true.
    #[clap(long)]
    wait: bool,
}

impl Create {
    pub(crate) async fn run(self, fixture: Fixture) -> Result<()> {
        let wait = self.wait || fixture.env.wait_setup_cluster_ready;
        let mut handler = fixture.handler().await?;
        handler
            .create_cluster(wait)
            .await
            .context(format!("Unable to create a cluster for '{}'", fixture.profile.name))?;

        let detail = handler.detail();
        println!(
            "Created cluster '{}' with ID '{}'",
            detail.cluster_name.as_deref().unwrap_or_default(),
            detail.cluster_id.as_deref().unwrap_or_default()
        );
        if wait {
            println!("The cluster is ready");
        }
        Ok(())
    }
}
