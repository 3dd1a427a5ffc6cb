use crate::Fixture;
use anyhow::{Error, Result};
use clap::Parser;

/// Delete the cluster and destroy everything prepared for it.
#[derive(Debug, Parser)]
pub(crate) struct Destroy {}

impl Destroy {
    pub(crate) async fn run(self, fixture: Fixture) -> Result<()> {
        let mut handler = fixture.handler().await?;
        let errors = handler.destroy().await;
        if errors.is_empty() {
            println!("The cluster and its resources were destroyed");
            return Ok(());
        }
        for e in &errors {
            eprintln!("{}", e);
        }
        Err(Error::msg(format!(
            "Teardown failed with {} error(s), some resources may be left behind",
            errors.len()
        )))
    }
}
