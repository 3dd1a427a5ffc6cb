/*!

Scripted implementations of the [`ClusterClient`] and [`ResourcePreparer`] traits so that the
lifecycle can be tested without the `rosa` command or a cloud account. Both mocks record every
call they receive so that tests can assert on order and count.

!*/

#![allow(dead_code)]

pub(crate) mod cluster_client;
pub(crate) mod preparer;

pub(crate) use cluster_client::{DeleteOutcome, MockClusterClient, GONE};
pub(crate) use preparer::MockPreparer;

use fixture_model::Profile;
use rosa_agents::poller::PollSettings;
use rosa_agents::HandlerSettings;
use std::time::Duration;

pub(crate) const CLUSTER_ID: &str = "24g9q8jhdhv5sj2ksbjnvk2fk6pma8an";

pub(crate) fn profile() -> Profile {
    let mut profile = Profile {
        name: "rosa-sts".to_string(),
        name_prefix: "ci-rosa".to_string(),
        region: "us-east-2".to_string(),
        ..Profile::default()
    };
    profile.cluster.sts = true;
    profile
}

/// Settings with polling intervals short enough for paused-time tests to stay readable.
pub(crate) fn settings() -> HandlerSettings {
    HandlerSettings {
        ready_timeout_minutes: 60,
        uninstall_timeout_minutes: 30,
        shared_vpc_grace: Duration::ZERO,
        poll: PollSettings::default(),
        ..HandlerSettings::default()
    }
}

/// Show the crate's logs in failing tests.
pub(crate) fn init_logger() {
    let _ = env_logger::builder()
        .is_test(true)
        .filter_module("rosa_agents", log::LevelFilter::Debug)
        .try_init();
}
