/*!

Collaborators that drive the `rosa` and `aws` command line tools.

[`RosaCli`] is the [`resource_agent::clients::ClusterClient`] used outside of tests.
[`RosaCliPreparer`] prepares what `rosa` can prepare by itself: versions, account roles, OIDC
configuration and providers, operator roles and the cluster admin, plus KMS keys through `aws`.
It does not build network topology; a profile that needs a VPC fails in resource resolution.

!*/

mod cluster;
mod preparer;
mod versions;

pub use cluster::RosaCli;
pub use preparer::RosaCliPreparer;
pub use versions::select_version;
