/*!

This library provides the plain-old-data records that describe a test cluster: the profile that
requests it, the resources prepared for it, the configuration sent to the provisioning service,
and what the service reports back.

!*/

#![deny(
    clippy::expect_used,
    clippy::get_unwrap,
    clippy::panic,
    clippy::panic_in_result_fn,
    clippy::panicking_unwrap,
    clippy::unwrap_in_result,
    clippy::unwrap_used
)]

pub use cluster_config::{
    Autoscaler, AutoscalerResourceLimits, AutoscalerScaleDown, ClusterConfig, Encryption,
    IngressConfig, Networking, Nodes, Properties, Proxy as ProxyConfig, StsConfig,
};
pub use cluster_detail::ClusterDetail;
pub use configuration::Configuration;
pub use description::{ClusterDescription, ClusterState, JsonDescription};
pub use env::GlobalEnv;
pub use error::{Error, Result};
pub use profile::{AccountRoleConfig, ClusterProfile, OidcConfigKind, Profile, ProfileSet};
pub use records::{PlainFile, Record};
pub use resources::{
    AccountRoles, AccountRolesRequest, AdminUser, KeyUse, KmsKeyRequest, OidcConfigRequest,
    OperatorRolesRequest, Proxy, ResolvedResourceSet, Subnets, Vpc,
};

mod cluster_config;
mod cluster_detail;
mod configuration;
pub mod constants;
mod description;
mod env;
mod error;
mod profile;
mod records;
mod resources;
