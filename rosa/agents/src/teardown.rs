/*!

Deletes a cluster and everything prepared for it.

Teardown never stops at the first failure. Every step that can run does run, and every failure is
collected and returned; whether a non-empty list fails the test run is up to the caller. The
prepared resources are destroyed even when the cluster could not be deleted, since leaking them
costs more than a second, failing, attempt to delete them.

!*/

use crate::error::{self, Error};
use crate::poller::ReadinessPoller;
use fixture_model::constants::no_cluster_message;
use fixture_model::{ClusterDetail, ResolvedResourceSet};
use log::{error, info};
use resource_agent::clients::{ClusterClient, InfoClient};
use resource_agent::provider::ResourcePreparer;
use snafu::ResultExt;

pub struct TeardownCoordinator<'a, C, P, S>
where
    C: ClusterClient,
    P: ResourcePreparer,
    S: InfoClient,
{
    client: &'a C,
    preparer: &'a P,
    poller: ReadinessPoller<'a, C, S>,
    uninstall_timeout_minutes: u64,
}

impl<'a, C, P, S> TeardownCoordinator<'a, C, P, S>
where
    C: ClusterClient,
    P: ResourcePreparer,
    S: InfoClient,
{
    pub fn new(
        client: &'a C,
        preparer: &'a P,
        poller: ReadinessPoller<'a, C, S>,
        uninstall_timeout_minutes: u64,
    ) -> Self {
        Self {
            client,
            preparer,
            poller,
            uninstall_timeout_minutes,
        }
    }

    /// Delete the cluster recorded in `detail`, if any, then destroy `resources`. `sts` says
    /// whether the cluster has an OIDC provider to delete. Returns every failure.
    pub async fn destroy(
        &self,
        sts: bool,
        detail: &ClusterDetail,
        resources: &ResolvedResourceSet,
    ) -> Vec<Error> {
        let mut errors = Vec::new();
        if let Some(cluster_id) = detail.cluster_id.as_deref() {
            self.destroy_cluster(cluster_id, sts, &mut errors).await;
        } else {
            info!("No cluster was created, nothing to delete");
        }

        if resources.is_empty() {
            info!("No resources were prepared, nothing to destroy");
            return errors;
        }
        info!("Destroying prepared resources");
        for e in self.preparer.destroy_resources(resources).await {
            error!("Unable to destroy a prepared resource: {}", e);
            errors.push(Error::Preparer {
                what: "destroy prepared resources".to_string(),
                source: e,
            });
        }
        errors
    }

    async fn destroy_cluster(&self, cluster_id: &str, sts: bool, errors: &mut Vec<Error>) {
        info!("Deleting cluster '{}'", cluster_id);
        match self.client.delete_cluster(cluster_id).await {
            Ok(_) => {}
            Err(e) if e.output_contains(&no_cluster_message(cluster_id)) => {
                info!("Cluster '{}' does not exist", cluster_id);
                return;
            }
            Err(e) => {
                error!("Unable to delete cluster '{}': {}", cluster_id, e);
                errors.push(Error::ClusterCommand {
                    what: format!("delete cluster '{}'", cluster_id),
                    source: e,
                });
                return;
            }
        }

        info!("Waiting for cluster '{}' to be uninstalled", cluster_id);
        if let Err(e) = self
            .poller
            .wait_for_uninstalled(cluster_id, self.uninstall_timeout_minutes)
            .await
        {
            error!("Unable to confirm that cluster '{}' was deleted: {}", cluster_id, e);
            errors.push(e);
            return;
        }
        info!("Deleted cluster '{}'", cluster_id);

        if sts {
            let deleted = self
                .client
                .delete_oidc_provider(cluster_id)
                .await
                .context(error::ClusterCommandSnafu {
                    what: format!("delete the OIDC provider of cluster '{}'", cluster_id),
                });
            match deleted {
                Ok(_) => info!("Deleted the OIDC provider of cluster '{}'", cluster_id),
                Err(e) => {
                    error!("{}", e);
                    errors.push(e);
                }
            }
        }
    }
}
