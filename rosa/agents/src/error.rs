use crate::resolver::Step;
use resource_agent::clients::ClientError;
use resource_agent::provider::ProviderError;
use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("Invalid configuration: {}", message))]
    Configuration { message: String },

    #[snafu(display("Unable to prepare {}: {}", step, source))]
    DependencyResolution { step: Step, source: ProviderError },

    #[snafu(display("Unable to prepare {}: {} has not been prepared", step, missing))]
    Prerequisite { step: Step, missing: Step },

    #[snafu(display("Unable to generate cluster flags: {} has not been prepared", step))]
    Unprepared { step: Step },

    #[snafu(display("Failed to {}: {}", what, source))]
    ClusterCommand { what: String, source: ClientError },

    #[snafu(display("Failed to {}: {}", what, source))]
    Preparer { what: String, source: ProviderError },

    #[snafu(display("'{}' was missing from {}", what, from))]
    Missing { what: String, from: String },

    #[snafu(display("Unable to {}: no cluster has been created", action))]
    NoCluster { action: String },

    #[snafu(display("Cluster '{}' is in error state: {}", cluster_id, state))]
    ClusterFailed { cluster_id: String, state: String },

    #[snafu(display("Cluster '{}' is uninstalling and will never become ready", cluster_id))]
    ClusterUninstalling { cluster_id: String },

    #[snafu(display("Cluster '{}' is in unknown state '{}'", cluster_id, state))]
    UnknownState { cluster_id: String, state: String },

    #[snafu(display(
        "Cluster '{}' is in state '{}' which will not be deleted, stop waiting",
        cluster_id,
        state
    ))]
    NotUninstalling { cluster_id: String, state: String },

    #[snafu(display(
        "Timed out after {} minutes waiting for cluster '{}' to become ready",
        minutes,
        cluster_id
    ))]
    ReadyTimeout { cluster_id: String, minutes: u64 },

    #[snafu(display(
        "Cluster '{}' stuck in waiting state for {} minutes, check whether its account roles, \
         operator roles and OIDC provider exist",
        cluster_id,
        minutes
    ))]
    StuckWaiting { cluster_id: String, minutes: u64 },

    #[snafu(display(
        "Timed out after {} minutes waiting for cluster '{}' to be deleted",
        minutes,
        cluster_id
    ))]
    UninstallTimeout { cluster_id: String, minutes: u64 },

    #[snafu(display("Unable to store {}: {}", what, source))]
    Persist { what: String, source: ClientError },

    #[snafu(display("Unable to load {}: {}", what, source))]
    Load { what: String, source: ClientError },
}

pub type Result<T> = std::result::Result<T, Error>;

/// The broad class of an [`Error`], for callers that only need to know what went wrong, not
/// where.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ErrorKind {
    /// The profile or the environment asks for something impossible. Nothing external was
    /// touched.
    Configuration,
    /// Preparing a resource failed. Resources prepared before it remain.
    DependencyResolution,
    /// A call to the provisioning service or the preparer failed.
    ExternalCall,
    /// The cluster is in a state that rules out the requested operation.
    State,
    Timeout(TimeoutKind),
    /// Records could not be stored.
    Persistence,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum TimeoutKind {
    /// The overall deadline passed.
    Deadline,
    /// The cluster sat in the waiting state for longer than allowed.
    StuckWaiting,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Configuration { .. } | Error::NoCluster { .. } => ErrorKind::Configuration,
            Error::DependencyResolution { .. }
            | Error::Prerequisite { .. }
            | Error::Unprepared { .. } => {
                ErrorKind::DependencyResolution
            }
            Error::ClusterCommand { .. } | Error::Preparer { .. } | Error::Missing { .. } => {
                ErrorKind::ExternalCall
            }
            Error::ClusterFailed { .. }
            | Error::ClusterUninstalling { .. }
            | Error::UnknownState { .. }
            | Error::NotUninstalling { .. } => ErrorKind::State,
            Error::ReadyTimeout { .. } | Error::UninstallTimeout { .. } => {
                ErrorKind::Timeout(TimeoutKind::Deadline)
            }
            Error::StuckWaiting { .. } => ErrorKind::Timeout(TimeoutKind::StuckWaiting),
            Error::Persist { .. } | Error::Load { .. } => ErrorKind::Persistence,
        }
    }
}
