/*!

This is the command line interface for provisioning a disposable ROSA cluster for end-to-end tests.

Settings come from the environment (see [`fixture_model::GlobalEnv`]); the profile is chosen with
`--profile` or `TEST_PROFILE`. Every subcommand stores its records under `SHARED_DIR`, so a
cluster created by one invocation can be awaited and destroyed by later ones.

!*/

mod create;
mod destroy;
mod flags;
mod wait;

use anyhow::{Context, Result};
use clap::Parser;
use fixture_model::{GlobalEnv, Profile, ProfileSet};
use log::{info, LevelFilter};
use resource_agent::clients::FileInfoClient;
use rosa_agents::rosa::{RosaCli, RosaCliPreparer};
use rosa_agents::{ClusterHandler, HandlerSettings};

/// Provision, await and destroy ROSA clusters described by test profiles.
#[derive(Debug, Parser)]
#[clap(author, version, about)]
struct Args {
    /// Set logging verbosity [trace|debug|info|warn|error]. If the environment variable `RUST_LOG`
    /// is present, it overrides the default logging behavior. See https://docs.rs/env_logger/latest
    #[clap(long = "log-level", default_value = "info")]
    log_level: LevelFilter,
    /// The profile to provision. Overrides the TEST_PROFILE environment variable.
    #[clap(long = "profile")]
    profile: Option<String>,
    #[clap(subcommand)]
    command: Command,
}

#[derive(Debug, Parser)]
enum Command {
    /// Prepare resources and create the cluster.
    Create(create::Create),
    /// Wait for a created cluster to become ready.
    Wait(wait::Wait),
    /// Delete the cluster and everything prepared for it.
    Destroy(destroy::Destroy),
    /// Prepare resources and print the create command without running it.
    Flags(flags::Flags),
}

/// What every subcommand needs: the environment, the chosen profile and the handler settings.
pub(crate) struct Fixture {
    pub(crate) env: GlobalEnv,
    pub(crate) profile: Profile,
    pub(crate) settings: HandlerSettings,
}

pub(crate) type Handler = ClusterHandler<RosaCli, RosaCliPreparer, FileInfoClient>;

impl Fixture {
    fn new(profile_name: Option<String>) -> Result<Self> {
        let env = GlobalEnv::from_env().context("Unable to read settings from the environment")?;
        let profile_name = profile_name
            .or_else(|| env.test_profile.clone())
            .filter(|name| !name.trim().is_empty())
            .context("No profile was chosen, use --profile or set TEST_PROFILE")?;
        let mut profile = ProfileSet::load(&env.profiles_dir)
            .and_then(|set| set.find(&profile_name))
            .context(format!("Unable to load profile '{}'", profile_name))?;
        profile.apply_env(&env);
        info!("Using profile '{}'", profile.name);
        let settings = HandlerSettings::from_env(&env);
        Ok(Self {
            env,
            profile,
            settings,
        })
    }

    /// A handler that picks up whatever earlier invocations recorded.
    pub(crate) async fn handler(&self) -> Result<Handler> {
        let region = Some(self.profile.region.clone());
        let client = RosaCli::new(&self.env.rosa_cli, region.clone());
        let preparer = RosaCliPreparer::new(&self.env.rosa_cli, &self.env.aws_cli, region)
            .shared_vpc_credentials_file(self.settings.shared_vpc_credentials_file.clone());
        let info_client = FileInfoClient::new(&self.env.shared_dir)
            .with_artifact_dir(self.env.artifact_dir());
        ClusterHandler::resume(
            client,
            preparer,
            info_client,
            self.profile.clone(),
            self.settings.clone(),
        )
        .await
        .context(format!(
            "Unable to load the records in '{}'",
            self.env.shared_dir.display()
        ))
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    agent_utils::init_agent_logger(env!("CARGO_CRATE_NAME"), Some(args.log_level));
    if let Err(e) = run(args).await {
        eprintln!("{:?}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    let fixture = Fixture::new(args.profile)?;
    match args.command {
        Command::Create(create) => create.run(fixture).await,
        Command::Wait(wait) => wait.run(fixture).await,
        Command::Destroy(destroy) => destroy.run(fixture).await,
        Command::Flags(flags) => flags.run(fixture).await,
    }
}
