use crate::Fixture;
use agent_utils::command_line;
use anyhow::{Context, Result};
use clap::Parser;

/// Prepare the resources the profile needs and print the create command. The resources are
/// recorded, so `destroy` cleans them up.
#[derive(Debug, Parser)]
pub(crate) struct Flags {}

impl Flags {
    pub(crate) async fn run(self, fixture: Fixture) -> Result<()> {
        let mut handler = fixture.handler().await?;
        let flags = handler
            .generate_create_flags()
            .await
            .context("Unable to generate the create flags")?;
        let name = handler.config().name.as_str();
        let args: Vec<String> = ["create", "cluster", "--cluster-name", name]
            .iter()
            .map(|arg| arg.to_string())
            .chain(flags)
            .collect();
        println!("{}", command_line(&fixture.env.rosa_cli, &args));
        Ok(())
    }
}
