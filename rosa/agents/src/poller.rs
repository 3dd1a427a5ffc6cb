/*!

Waits for a cluster to become ready, or to disappear.

Readiness polling runs in two stages. A short precheck first waits for the cluster to become
observable, that is, to report a state other than nothing or `waiting`. The precheck does not
count against the caller's timeout and gives up quietly. The main loop then classifies the state
on every poll until it reaches a terminal state or the deadline passes.

Time is measured with [`tokio::time`], so tests can run the loops with paused time.

!*/

use crate::error::{self, Result};
use fixture_model::constants::{
    no_cluster_message, OBSERVE_POLL_INTERVAL, OBSERVE_TIMEOUT, READY_POLL_INTERVAL,
    UNINSTALL_POLL_INTERVAL, WAITING_STATE_BUDGET,
};
use fixture_model::{ClusterDescription, ClusterDetail, ClusterState, PlainFile};
use log::{debug, error, info, warn};
use resource_agent::clients::{ClusterClient, InfoClient};
use snafu::ResultExt;
use std::time::Duration;
use tokio::time::{sleep, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    /// Pause between polls while the cluster installs.
    pub interval: Duration,
    /// How long the cluster may report `waiting` before polling gives up on it.
    pub waiting_budget: Duration,
    /// Pause between polls of the precheck.
    pub observe_interval: Duration,
    /// How long the precheck waits for the cluster to become observable.
    pub observe_timeout: Duration,
    /// Pause between polls while the cluster uninstalls.
    pub uninstall_interval: Duration,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: READY_POLL_INTERVAL,
            waiting_budget: WAITING_STATE_BUDGET,
            observe_interval: OBSERVE_POLL_INTERVAL,
            observe_timeout: OBSERVE_TIMEOUT,
            uninstall_interval: UNINSTALL_POLL_INTERVAL,
        }
    }
}

pub struct ReadinessPoller<'a, C, S>
where
    C: ClusterClient,
    S: InfoClient,
{
    client: &'a C,
    info_client: &'a S,
    settings: PollSettings,
}

impl<'a, C, S> ReadinessPoller<'a, C, S>
where
    C: ClusterClient,
    S: InfoClient,
{
    pub fn new(client: &'a C, info_client: &'a S, settings: PollSettings) -> Self {
        Self {
            client,
            info_client,
            settings,
        }
    }

    /// Poll `cluster_id` until it is ready. The endpoints in `detail` are refreshed on every poll,
    /// including the last one of a failed wait.
    pub async fn wait_for_ready(
        &self,
        cluster_id: &str,
        timeout_minutes: u64,
        detail: &mut ClusterDetail,
    ) -> Result<()> {
        // The precheck's last description is the main loop's first poll.
        let mut observed = Some(self.wait_until_observable(cluster_id).await?);

        let deadline = deadline_after(timeout_minutes);
        let mut waited = Duration::ZERO;
        while before(deadline) {
            let description = match observed.take() {
                Some(description) => description,
                None => self.describe(cluster_id).await?,
            };
            detail.record_endpoints(&description);
            match description.state() {
                ClusterState::Ready => {
                    info!("Cluster '{}' is ready", cluster_id);
                    return Ok(());
                }
                ClusterState::Uninstalling => {
                    return error::ClusterUninstallingSnafu { cluster_id }.fail();
                }
                ClusterState::Error(state) => {
                    error!(
                        "Cluster '{}' is in error state '{}', recording the installation log",
                        cluster_id, state
                    );
                    self.record_install_log(cluster_id).await;
                    return error::ClusterFailedSnafu { cluster_id, state }.fail();
                }
                state if state.is_progressing() => {
                    debug!("Cluster '{}' is {}", cluster_id, state);
                }
                ClusterState::Waiting => {
                    info!("Cluster '{}' is waiting, wait for it to become ready", cluster_id);
                    if waited >= self.settings.waiting_budget {
                        return error::StuckWaitingSnafu {
                            cluster_id,
                            minutes: waited.as_secs() / 60,
                        }
                        .fail();
                    }
                    waited += self.settings.interval;
                }
                state => {
                    return error::UnknownStateSnafu {
                        cluster_id,
                        state: state.to_string(),
                    }
                    .fail();
                }
            }
            sleep(self.settings.interval).await;
        }

        error::ReadyTimeoutSnafu {
            cluster_id,
            minutes: timeout_minutes,
        }
        .fail()
    }

    /// Poll `cluster_id` until the service no longer knows it. The cluster must be uninstalling
    /// in the meantime; any other state means it will never go away.
    pub async fn wait_for_uninstalled(&self, cluster_id: &str, timeout_minutes: u64) -> Result<()> {
        let deadline = deadline_after(timeout_minutes);
        let gone = no_cluster_message(cluster_id);
        while before(deadline) {
            let description = match self.client.describe_cluster(cluster_id).await {
                Ok(description) => description,
                Err(e) if e.output_contains(&gone) => {
                    info!("Cluster '{}' has been deleted", cluster_id);
                    return Ok(());
                }
                Err(e) => {
                    return Err(e).context(error::ClusterCommandSnafu {
                        what: format!("describe cluster '{}'", cluster_id),
                    })
                }
            };
            match description.state() {
                ClusterState::Uninstalling => {
                    debug!("Cluster '{}' is still uninstalling", cluster_id);
                }
                state => {
                    return error::NotUninstallingSnafu {
                        cluster_id,
                        state: state.to_string(),
                    }
                    .fail();
                }
            }
            sleep(self.settings.uninstall_interval).await;
        }

        error::UninstallTimeoutSnafu {
            cluster_id,
            minutes: timeout_minutes,
        }
        .fail()
    }

    async fn wait_until_observable(&self, cluster_id: &str) -> Result<ClusterDescription> {
        let deadline = Instant::now() + self.settings.observe_timeout;
        loop {
            let description = self.describe(cluster_id).await?;
            if !description.state.trim().is_empty() && description.state() != ClusterState::Waiting
            {
                return Ok(description);
            }
            if Instant::now() >= deadline {
                warn!(
                    "Cluster '{}' still reports '{}' after {:?}, polling anyway",
                    cluster_id, description.state, self.settings.observe_timeout
                );
                return Ok(description);
            }
            sleep(self.settings.observe_interval).await;
        }
    }

    async fn describe(&self, cluster_id: &str) -> Result<ClusterDescription> {
        self.client
            .describe_cluster(cluster_id)
            .await
            .context(error::ClusterCommandSnafu {
                what: format!("describe cluster '{}'", cluster_id),
            })
    }

    async fn record_install_log(&self, cluster_id: &str) {
        let log = match self.client.install_log(cluster_id).await {
            Ok(log) => log,
            Err(e) => {
                warn!("Unable to get the installation log of '{}': {}", cluster_id, e);
                return;
            }
        };
        if let Err(e) = self.info_client.send_plain(PlainFile::InstallLog, &log).await {
            warn!("Unable to store the installation log of '{}': {}", cluster_id, e);
        }
    }
}

/// The instant `timeout_minutes` from now. `None` when that lies beyond what `Instant` can
/// represent, in which case there is no deadline.
fn deadline_after(timeout_minutes: u64) -> Option<Instant> {
    Instant::now().checked_add(Duration::from_secs(timeout_minutes.saturating_mul(60)))
}

fn before(deadline: Option<Instant>) -> bool {
    deadline.map_or(true, |deadline| Instant::now() < deadline)
}
