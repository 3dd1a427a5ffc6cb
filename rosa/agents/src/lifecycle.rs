/*!

The `lifecycle` module defines the [`ClusterHandler`], which owns one cluster from the first
prepared resource to the last destroyed one.

A handler moves through the phases of [`LifecyclePhase`]:

```text
Unprovisioned -> Creating -> AwaitingReady -> Ready
                                           -> Failed
          (any phase after Creating) -> Destroying -> Destroyed
```

Every public operation stores the handler's records through its [`InfoClient`] before it
returns, whether it succeeded or not. A later invocation can therefore [`ClusterHandler::resume`]
and wait for, or tear down, a cluster that an earlier invocation created.

!*/

use crate::error::{self, Error, Result};
use crate::features::Features;
use crate::kms::{key_policy_statements, KmsPolicyInputs};
use crate::naming::ResourceNames;
use crate::poller::ReadinessPoller;
use crate::projector;
use crate::resolver::Resolver;
use crate::settings::HandlerSettings;
use crate::teardown::TeardownCoordinator;
use fixture_model::{
    ClusterConfig, ClusterDetail, Configuration, KeyUse, PlainFile, Profile, Record,
    ResolvedResourceSet,
};
use log::{error, info, warn};
use resource_agent::clients::{ClusterClient, InfoClient, MemoryInfoClient};
use resource_agent::provider::ResourcePreparer;
use serde::{Deserialize, Serialize};
use snafu::{ensure, OptionExt, ResultExt};

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LifecyclePhase {
    /// Nothing has been created yet.
    Unprovisioned,
    /// Resources are being prepared or the create command is running.
    Creating,
    /// The cluster exists and is installing.
    AwaitingReady,
    Ready,
    Failed,
    Destroying,
    Destroyed,
}

serde_plain::derive_display_from_serialize!(LifecyclePhase);

/// Drives one cluster through its lifecycle.
///
/// ## Dependency Injection for Testing
///
/// The `C`, `P` and `S` types are available so that you can inject mock clients and test the
/// lifecycle without a provisioning service or a cloud account. In practice you will use
/// [`crate::rosa::RosaCli`], [`crate::rosa::RosaCliPreparer`] and
/// [`resource_agent::clients::FileInfoClient`].
pub struct ClusterHandler<C, P, S>
where
    C: ClusterClient,
    P: ResourcePreparer,
    S: InfoClient,
{
    client: C,
    preparer: P,
    info_client: S,
    profile: Profile,
    settings: HandlerSettings,
    resources: ResolvedResourceSet,
    config: ClusterConfig,
    detail: ClusterDetail,
    phase: LifecyclePhase,
}

impl<C, P> ClusterHandler<C, P, MemoryInfoClient>
where
    C: ClusterClient,
    P: ResourcePreparer,
{
    /// A handler whose records are kept in memory only. Whatever it prepares must be destroyed
    /// by the same handler.
    pub fn temporary(
        client: C,
        preparer: P,
        profile: Profile,
        settings: HandlerSettings,
    ) -> Result<Self> {
        Self::new(client, preparer, MemoryInfoClient::new(), profile, settings)
    }
}

impl<C, P, S> ClusterHandler<C, P, S>
where
    C: ClusterClient,
    P: ResourcePreparer,
    S: InfoClient,
{
    /// A handler for a new cluster.
    pub fn new(
        client: C,
        preparer: P,
        info_client: S,
        profile: Profile,
        settings: HandlerSettings,
    ) -> Result<Self> {
        let handler = Self {
            client,
            preparer,
            info_client,
            profile,
            settings,
            resources: ResolvedResourceSet::default(),
            config: ClusterConfig::default(),
            detail: ClusterDetail::default(),
            phase: LifecyclePhase::Unprovisioned,
        };
        handler.check_shared_vpc_credentials()?;
        Ok(handler)
    }

    /// A handler for the cluster whose records an earlier handler stored in `info_client`.
    pub async fn resume(
        client: C,
        preparer: P,
        info_client: S,
        profile: Profile,
        settings: HandlerSettings,
    ) -> Result<Self> {
        let resources: ResolvedResourceSet = load(&info_client, Record::Resources).await?;
        let config: ClusterConfig = load(&info_client, Record::ClusterConfig).await?;
        let detail: ClusterDetail = load(&info_client, Record::ClusterDetail).await?;
        let phase = if detail.cluster_id.is_some() {
            LifecyclePhase::AwaitingReady
        } else {
            LifecyclePhase::Unprovisioned
        };
        let handler = Self {
            client,
            preparer,
            info_client,
            profile,
            settings,
            resources,
            config,
            detail,
            phase,
        };
        handler.check_shared_vpc_credentials()?;
        info!(
            "Resumed cluster handler in phase '{}' for cluster '{}'",
            handler.phase,
            handler.detail.cluster_id.as_deref().unwrap_or_default()
        );
        Ok(handler)
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn detail(&self) -> &ClusterDetail {
        &self.detail
    }

    pub fn config(&self) -> &ClusterConfig {
        &self.config
    }

    pub fn resources(&self) -> &ResolvedResourceSet {
        &self.resources
    }

    pub fn phase(&self) -> LifecyclePhase {
        self.phase
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn preparer(&self) -> &P {
        &self.preparer
    }

    pub fn info_client(&self) -> &S {
        &self.info_client
    }

    /// Prepare the resources the profile needs and return the flags of the create command.
    pub async fn generate_create_flags(&mut self) -> Result<Vec<String>> {
        let result = self.generate_create_flags_inner().await;
        self.finish(result).await
    }

    /// Prepare resources, create the cluster and, if `wait`, wait for it to become ready.
    pub async fn create_cluster(&mut self, wait: bool) -> Result<()> {
        let result = self.create_cluster_inner().await;
        if result.is_err() {
            self.phase = LifecyclePhase::Failed;
        }
        self.finish(result).await?;
        if wait {
            let timeout_minutes = self.settings.ready_timeout_minutes;
            self.wait_for_cluster_ready(timeout_minutes).await?;
        }
        Ok(())
    }

    /// Wait for the created cluster to become ready.
    pub async fn wait_for_cluster_ready(&mut self, timeout_minutes: u64) -> Result<()> {
        let cluster_id = match self.detail.cluster_id.clone() {
            Some(cluster_id) => cluster_id,
            None => {
                let result = error::NoClusterSnafu {
                    action: "wait for the cluster to become ready",
                }
                .fail();
                return self.finish(result).await;
            }
        };
        self.phase = LifecyclePhase::AwaitingReady;
        info!(
            "Waiting up to {} minutes for cluster '{}' to become ready",
            timeout_minutes, cluster_id
        );
        let poller = ReadinessPoller::new(&self.client, &self.info_client, self.settings.poll);
        let result = poller
            .wait_for_ready(&cluster_id, timeout_minutes, &mut self.detail)
            .await;
        self.phase = if result.is_ok() {
            LifecyclePhase::Ready
        } else {
            LifecyclePhase::Failed
        };
        info!("Recording the cluster information");
        self.finish(result).await
    }

    /// Delete the cluster and destroy everything prepared for it. Returns every failure; an
    /// empty list means nothing is left behind.
    pub async fn destroy(&mut self) -> Vec<Error> {
        self.phase = LifecyclePhase::Destroying;
        let poller = ReadinessPoller::new(&self.client, &self.info_client, self.settings.poll);
        let teardown = TeardownCoordinator::new(
            &self.client,
            &self.preparer,
            poller,
            self.settings.uninstall_timeout_minutes,
        );
        let mut errors = teardown
            .destroy(self.profile.cluster.sts, &self.detail, &self.resources)
            .await;

        if errors.is_empty() {
            self.resources = ResolvedResourceSet::default();
            self.detail = ClusterDetail::default();
            self.phase = LifecyclePhase::Destroyed;
        } else {
            self.phase = LifecyclePhase::Failed;
        }
        if let Err(e) = self.persist().await {
            errors.push(e);
        }
        errors
    }

    async fn generate_create_flags_inner(&mut self) -> Result<Vec<String>> {
        projector::validate(&self.profile)?;
        let names = ResourceNames::derive(&self.profile)?;
        self.config.name = names.cluster_name.clone();

        Resolver::new(&self.preparer)
            .shared_vpc_grace(self.settings.shared_vpc_grace)
            .proxy_ca_bundle_file(self.settings.proxy_ca_bundle_file.clone())
            .resolve(&self.profile, &names, &mut self.resources)
            .await?;

        if let Some(admin) = &self.resources.admin_user {
            info!("The cluster admin is enabled, recording its credentials");
            self.info_client
                .send_plain(
                    PlainFile::ClusterAdmin,
                    &format!("{}:{}", admin.username, admin.password),
                )
                .await
                .context(error::PersistSnafu {
                    what: "the cluster admin credentials",
                })?;
        }

        let projection = projector::project(&self.profile, &names, &self.resources)?;
        self.config = projection.config;
        info!("Resources and flags are prepared");
        Ok(projection.flags)
    }

    async fn create_cluster_inner(&mut self) -> Result<()> {
        ensure!(
            self.detail.cluster_id.is_none(),
            error::ConfigurationSnafu {
                message: format!(
                    "cluster '{}' has already been created",
                    self.detail.cluster_id.as_deref().unwrap_or_default()
                )
            }
        );
        self.phase = LifecyclePhase::Creating;
        let flags = self.generate_create_flags_inner().await?;
        let cluster_name = self.config.name.clone();

        info!("Creating cluster '{}'", cluster_name);
        let created = self
            .client
            .create_cluster(&cluster_name, &flags)
            .await
            .context(error::ClusterCommandSnafu {
                what: format!("create cluster '{}'", cluster_name),
            })?;
        self.info_client
            .send_plain(PlainFile::CreateCommand, &created.command)
            .await
            .context(error::PersistSnafu {
                what: "the create command",
            })?;
        info!("Cluster '{}' created", cluster_name);

        let description = self
            .client
            .describe_cluster(&cluster_name)
            .await
            .context(error::ClusterCommandSnafu {
                what: format!("describe cluster '{}'", cluster_name),
            })?;
        self.detail.record_creation(&description);
        let cluster_id = self.detail.cluster_id.clone().context(error::MissingSnafu {
            what: "id",
            from: format!("the description of cluster '{}'", cluster_name),
        })?;
        self.phase = LifecyclePhase::AwaitingReady;

        self.reconcile_created_cluster(&cluster_id).await
    }

    /// The steps that can only run once the cluster exists.
    async fn reconcile_created_cluster(&mut self, cluster_id: &str) -> Result<()> {
        let features = Features::new(&self.profile);
        let cluster = features.cluster();

        if features.sts() && cluster.oidc_config.is_none() {
            info!("Creating the OIDC provider and operator roles of cluster '{}'", cluster_id);
            self.preparer
                .prepare_oidc_provider_by_cluster(cluster_id)
                .await
                .context(error::PreparerSnafu {
                    what: format!("create the OIDC provider of cluster '{}'", cluster_id),
                })?;
            self.preparer
                .prepare_operator_roles_by_cluster(cluster_id)
                .await
                .context(error::PreparerSnafu {
                    what: format!("create the operator roles of cluster '{}'", cluster_id),
                })?;
            // The roles carry the prefix the cluster was created with, so teardown finds them.
            if self.resources.operator_roles_prefix.is_none() {
                self.resources.operator_roles_prefix =
                    self.config.sts.as_ref().map(|sts| sts.operator_roles_prefix.clone());
            }
        }

        if features.sts() && cluster.kms_key {
            self.elaborate_kms_key(cluster_id, KeyUse::Volume).await?;
        }
        if features.sts() && cluster.etcd_kms {
            self.elaborate_kms_key(cluster_id, KeyUse::Etcd).await?;
        }

        if features.byo_vpc() {
            info!("Verifying the network of cluster '{}'", cluster_id);
            if let Err(e) = self.client.verify_network(cluster_id).await {
                warn!("Unable to verify the network of cluster '{}': {}", cluster_id, e);
            }
        }
        Ok(())
    }

    async fn elaborate_kms_key(&self, cluster_id: &str, key_use: KeyUse) -> Result<()> {
        let description = self
            .client
            .describe_cluster_json(cluster_id)
            .await
            .context(error::ClusterCommandSnafu {
                what: format!("describe cluster '{}'", cluster_id),
            })?;
        let inputs = KmsPolicyInputs::from_description(&description, key_use)?;
        let statements = key_policy_statements(&inputs);
        match self
            .preparer
            .update_kms_key_policy(&inputs.key_arn, &statements)
            .await
        {
            Ok(()) => {
                info!(
                    "Elaborated the {} KMS key '{}' for cluster '{}'",
                    key_use, inputs.key_arn, cluster_id
                );
                Ok(())
            }
            Err(e) => {
                error!(
                    "Unable to elaborate the {} KMS key '{}' for cluster '{}': {}",
                    key_use, inputs.key_arn, cluster_id, e
                );
                Err(e).context(error::PreparerSnafu {
                    what: format!("update the policy of KMS key '{}'", inputs.key_arn),
                })
            }
        }
    }

    /// Store the records, then return `result`. A storage failure is returned only when there is
    /// no earlier error to report.
    async fn finish<T>(&self, result: Result<T>) -> Result<T> {
        match (result, self.persist().await) {
            (Ok(value), Ok(())) => Ok(value),
            (Ok(_), Err(e)) => Err(e),
            (Err(e), Ok(())) => Err(e),
            (Err(e), Err(persist_error)) => {
                error!("Unable to record the cluster information: {}", persist_error);
                Err(e)
            }
        }
    }

    async fn persist(&self) -> Result<()> {
        self.info_client
            .send_info(Record::Resources, self.resources.clone())
            .await
            .context(error::PersistSnafu {
                what: "the prepared resources",
            })?;
        self.info_client
            .send_info(Record::ClusterConfig, self.config.clone())
            .await
            .context(error::PersistSnafu {
                what: "the cluster config",
            })?;
        self.info_client
            .send_info(Record::ClusterDetail, self.detail.clone())
            .await
            .context(error::PersistSnafu {
                what: "the cluster detail",
            })?;

        // Flat files for consumers that predate the structured records.
        let detail = &self.detail;
        let flat = [
            (PlainFile::ApiUrl, detail.api_url.as_deref()),
            (PlainFile::ConsoleUrl, detail.console_url.as_deref()),
            (PlainFile::InfraId, detail.infra_id.as_deref()),
            (PlainFile::ClusterId, detail.cluster_id.as_deref()),
            (PlainFile::ClusterName, detail.cluster_name.as_deref()),
            (PlainFile::ClusterType, Some(detail.cluster_type.as_str())),
        ];
        for (file, value) in flat {
            self.info_client
                .send_plain(file, value.unwrap_or_default())
                .await
                .context(error::PersistSnafu {
                    what: file.to_string(),
                })?;
        }
        Ok(())
    }

    fn check_shared_vpc_credentials(&self) -> Result<()> {
        let cluster = &self.profile.cluster;
        let needed = cluster.shared_vpc
            || cluster.additional_principals
            || self.resources.uses_shared_vpc_account();
        ensure!(
            !needed || self.settings.shared_vpc_credentials_file.is_some(),
            error::ConfigurationSnafu {
                message: "resources in the shared VPC account need \
                          SHARED_VPC_AWS_SHARED_CREDENTIALS_FILE to be set"
            }
        );
        Ok(())
    }
}

async fn load<S, T>(info_client: &S, record: Record) -> Result<T>
where
    S: InfoClient,
    T: Configuration,
{
    Ok(info_client
        .get_info(record)
        .await
        .context(error::LoadSnafu {
            what: record.to_string(),
        })?
        .unwrap_or_default())
}
