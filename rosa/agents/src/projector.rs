/*!

Turns a profile and the resources prepared for it into the flags of the create command and the
[`ClusterConfig`] record that describes the same cluster.

Every feature toggle has its own projector in [`PROJECTORS`]. A projector reads the
[`ProjectionContext`] and appends flags and fills in the config. Projectors run in list order, so
the flags of a given profile always come out in the same order. Two orderings matter:

- `-y` is always the first token.
- `--no-cni` comes last because it edits the networking block that the networking projector
  creates.

Projection makes no external calls. Everything it needs from the outside world has already been
prepared by the [`crate::resolver`].

!*/

use crate::error::{self, Result};
use crate::features::Features;
use crate::naming::ResourceNames;
use crate::resolver::{cluster_subnet_ids, Step};
use fixture_model::constants::{
    AUTOSCALER_BALANCING_IGNORED_LABELS, AUTOSCALER_LOG_VERBOSITY, AUTOSCALER_MAX_CORES,
    AUTOSCALER_MAX_MEMORY, AUTOSCALER_MAX_NODES_TOTAL, AUTOSCALER_MAX_NODE_PROVISION_TIME,
    AUTOSCALER_MAX_POD_GRACE_PERIOD, AUTOSCALER_MIN_CORES, AUTOSCALER_MIN_MEMORY,
    AUTOSCALER_POD_PRIORITY_THRESHOLD, AUTOSCALER_SCALE_DOWN_DELAY,
    AUTOSCALER_SCALE_DOWN_UTILIZATION_THRESHOLD, AUTOSCALE_MAX_REPLICAS, AUTOSCALE_MIN_REPLICAS,
    CLUSTER_TAGS, DEFAULT_INSTANCE_TYPE, HOST_PREFIX, INGRESS_EXCLUDED_NAMESPACES,
    INGRESS_NAMESPACE_OWNERSHIP_POLICY, INGRESS_ROUTE_SELECTOR, INGRESS_WILDCARD_POLICY,
    MACHINE_CIDR, NETWORK_TYPE_OTHER, POD_CIDR, SERVICE_CIDR, WORKER_LABELS,
};
use fixture_model::{
    Autoscaler, AutoscalerResourceLimits, AutoscalerScaleDown, ClusterConfig, Encryption,
    IngressConfig, Networking, Nodes, Profile, Properties, ProxyConfig, ResolvedResourceSet,
    StsConfig,
};
use log::debug;
use snafu::{ensure, OptionExt};

/// Everything a projector may read.
#[derive(Debug, Clone, Copy)]
pub struct ProjectionContext<'a> {
    pub features: Features<'a>,
    pub names: &'a ResourceNames,
    pub resources: &'a ResolvedResourceSet,
}

impl<'a> ProjectionContext<'a> {
    pub fn new(
        profile: &'a Profile,
        names: &'a ResourceNames,
        resources: &'a ResolvedResourceSet,
    ) -> Self {
        Self {
            features: Features::new(profile),
            names,
            resources,
        }
    }

    pub fn profile(&self) -> &'a Profile {
        self.features.profile()
    }
}

/// Appends the flags of one feature and records the feature in the config.
pub type Projector = fn(&ProjectionContext<'_>, &mut Vec<String>, &mut ClusterConfig) -> Result<()>;

/// The projectors, named, in the order their flags appear on the command line.
pub const PROJECTORS: &[(&str, Projector)] = &[
    ("confirm", confirm),
    ("version", version),
    ("channel-group", channel_group),
    ("region", region),
    ("domain-prefix", domain_prefix),
    ("sts", sts),
    ("shared-vpc-role", shared_vpc_role),
    ("audit-log", audit_log),
    ("additional-principals", additional_principals),
    ("private", private),
    ("admin-user", admin_user),
    ("autoscaling", autoscaling),
    ("replicas", replicas),
    ("ingress", ingress),
    ("autoscaler", autoscaler),
    ("networking", networking),
    ("subnets", subnets),
    ("security-groups", security_groups),
    ("proxy", proxy),
    ("shared-vpc-network", shared_vpc_network),
    ("billing-account", billing_account),
    ("disable-scp-checks", disable_scp_checks),
    ("disable-workload-monitoring", disable_workload_monitoring),
    ("etcd-kms-key", etcd_kms_key),
    ("ec2-metadata-http-tokens", ec2_metadata_http_tokens),
    ("etcd-encryption", etcd_encryption),
    ("external-auth", external_auth),
    ("fips", fips),
    ("hosted-cp", hosted_cp),
    ("compute-machine-type", compute_machine_type),
    ("kms-key", kms_key),
    ("worker-labels", worker_labels),
    ("multi-az", multi_az),
    ("private-link", private_link),
    ("provision-shard", provision_shard),
    ("tags", tags),
    ("worker-disk-size", worker_disk_size),
    ("availability-zones", availability_zones),
    ("no-cni", no_cni),
];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Projection {
    pub flags: Vec<String>,
    pub config: ClusterConfig,
}

/// Reject profiles whose toggles contradict each other.
pub fn validate(profile: &Profile) -> Result<()> {
    ensure!(
        !profile.cluster.autoscaler_enabled || profile.cluster.autoscale,
        error::ConfigurationSnafu {
            message: "the autoscaler is enabled without enabling autoscale"
        }
    );
    Ok(())
}

/// Project `profile` and `resources` into create flags and a cluster config.
pub fn project(
    profile: &Profile,
    names: &ResourceNames,
    resources: &ResolvedResourceSet,
) -> Result<Projection> {
    validate(profile)?;
    let context = ProjectionContext::new(profile, names, resources);
    let mut projection = Projection {
        flags: Vec::new(),
        config: ClusterConfig {
            name: names.cluster_name.clone(),
            ..ClusterConfig::default()
        },
    };
    for (name, projector) in PROJECTORS {
        let before = projection.flags.len();
        projector(&context, &mut projection.flags, &mut projection.config)?;
        if projection.flags.len() > before {
            debug!("{}: {:?}", name, &projection.flags[before..]);
        }
    }
    Ok(projection)
}

fn arg<V: ToString>(flags: &mut Vec<String>, flag: &str, value: V) {
    flags.push(flag.to_string());
    flags.push(value.to_string());
}

fn switch(flags: &mut Vec<String>, flag: &str) {
    flags.push(flag.to_string());
}

fn non_empty(value: &str) -> Option<&str> {
    Some(value.trim()).filter(|s| !s.is_empty())
}

fn nodes(config: &mut ClusterConfig) -> &mut Nodes {
    config.nodes.get_or_insert_with(Nodes::default)
}

fn encryption(config: &mut ClusterConfig) -> &mut Encryption {
    config.encryption.get_or_insert_with(Encryption::default)
}

fn confirm(_: &ProjectionContext<'_>, flags: &mut Vec<String>, _: &mut ClusterConfig) -> Result<()> {
    switch(flags, "-y");
    Ok(())
}

fn version(
    context: &ProjectionContext<'_>,
    flags: &mut Vec<String>,
    config: &mut ClusterConfig,
) -> Result<()> {
    if !context.features.version_requested() {
        return Ok(());
    }
    let version = context
        .resources
        .version
        .as_deref()
        .context(error::UnpreparedSnafu {
            step: Step::Version,
        })?;
    arg(flags, "--version", version);
    config.version = Some(version.to_string());
    Ok(())
}

fn channel_group(
    context: &ProjectionContext<'_>,
    flags: &mut Vec<String>,
    config: &mut ClusterConfig,
) -> Result<()> {
    if let Some(channel_group) = non_empty(&context.profile().channel_group) {
        arg(flags, "--channel-group", channel_group);
        config.channel_group = Some(channel_group.to_string());
    }
    Ok(())
}

fn region(
    context: &ProjectionContext<'_>,
    flags: &mut Vec<String>,
    config: &mut ClusterConfig,
) -> Result<()> {
    if let Some(region) = non_empty(&context.profile().region) {
        arg(flags, "--region", region);
        config.region = Some(region.to_string());
    }
    Ok(())
}

fn domain_prefix(
    context: &ProjectionContext<'_>,
    flags: &mut Vec<String>,
    config: &mut ClusterConfig,
) -> Result<()> {
    if context.features.cluster().domain_prefix_enabled {
        arg(flags, "--domain-prefix", &context.names.domain_prefix);
        config.domain_prefix = Some(context.names.domain_prefix.clone());
    }
    Ok(())
}

fn sts(
    context: &ProjectionContext<'_>,
    flags: &mut Vec<String>,
    config: &mut ClusterConfig,
) -> Result<()> {
    if !context.features.sts() {
        return Ok(());
    }
    let roles = context
        .resources
        .account_roles
        .as_ref()
        .context(error::UnpreparedSnafu {
            step: Step::AccountRoles,
        })?;
    arg(flags, "--role-arn", &roles.installer_role_arn);
    arg(flags, "--support-role-arn", &roles.support_role_arn);
    arg(flags, "--worker-iam-role", &roles.worker_role_arn);

    let mut sts = StsConfig {
        role_arn: roles.installer_role_arn.clone(),
        support_role_arn: roles.support_role_arn.clone(),
        worker_role_arn: roles.worker_role_arn.clone(),
        operator_roles_prefix: context.names.role_prefix.clone(),
        ..StsConfig::default()
    };
    if !context.features.hcp() {
        let control_plane = roles
            .control_plane_role_arn
            .as_deref()
            .context(error::UnpreparedSnafu {
                step: Step::AccountRoles,
            })?;
        arg(flags, "--controlplane-iam-role", control_plane);
        sts.control_plane_role_arn = Some(control_plane.to_string());
    }
    if context.features.cluster().oidc_config.is_some() {
        let oidc_config_id = context
            .resources
            .oidc_config_id
            .as_deref()
            .context(error::UnpreparedSnafu {
                step: Step::OidcConfig,
            })?;
        arg(flags, "--oidc-config-id", oidc_config_id);
        sts.oidc_config_id = Some(oidc_config_id.to_string());
    }
    arg(flags, "--operator-roles-prefix", &context.names.role_prefix);
    config.sts = Some(sts);
    Ok(())
}

fn shared_vpc_role(
    context: &ProjectionContext<'_>,
    flags: &mut Vec<String>,
    config: &mut ClusterConfig,
) -> Result<()> {
    if !(context.features.sts() && context.features.shared_vpc()) {
        return Ok(());
    }
    let arn = context
        .resources
        .shared_vpc_role
        .as_deref()
        .context(error::UnpreparedSnafu {
            step: Step::SharedVpcRole,
        })?;
    arg(flags, "--shared-vpc-role-arn", arn);
    config.shared_vpc_role_arn = Some(arn.to_string());
    Ok(())
}

fn audit_log(
    context: &ProjectionContext<'_>,
    flags: &mut Vec<String>,
    config: &mut ClusterConfig,
) -> Result<()> {
    if !(context.features.sts() && context.features.cluster().audit_log_forward) {
        return Ok(());
    }
    let arn = context
        .resources
        .audit_log_role_arn
        .as_deref()
        .context(error::UnpreparedSnafu {
            step: Step::AuditLogRole,
        })?;
    arg(flags, "--audit-log-arn", arn);
    config.audit_log_arn = Some(arn.to_string());
    Ok(())
}

fn additional_principals(
    context: &ProjectionContext<'_>,
    flags: &mut Vec<String>,
    config: &mut ClusterConfig,
) -> Result<()> {
    if !(context.features.sts() && context.features.cluster().additional_principals) {
        return Ok(());
    }
    let arn = context
        .resources
        .additional_principal_role_arn
        .as_deref()
        .context(error::UnpreparedSnafu {
            step: Step::AdditionalPrincipalRole,
        })?;
    arg(flags, "--additional-allowed-principals", arn);
    config.additional_allowed_principals = vec![arn.to_string()];
    Ok(())
}

fn private(
    context: &ProjectionContext<'_>,
    flags: &mut Vec<String>,
    config: &mut ClusterConfig,
) -> Result<()> {
    if context.features.cluster().private {
        switch(flags, "--private");
        config.private = true;
    }
    Ok(())
}

fn admin_user(
    context: &ProjectionContext<'_>,
    flags: &mut Vec<String>,
    config: &mut ClusterConfig,
) -> Result<()> {
    if !context.features.cluster().admin_enabled {
        return Ok(());
    }
    let admin = context
        .resources
        .admin_user
        .as_ref()
        .context(error::UnpreparedSnafu {
            step: Step::AdminUser,
        })?;
    switch(flags, "--create-admin-user");
    arg(flags, "--cluster-admin-password", &admin.password);
    config.admin_enabled = true;
    Ok(())
}

fn autoscaling(
    context: &ProjectionContext<'_>,
    flags: &mut Vec<String>,
    config: &mut ClusterConfig,
) -> Result<()> {
    if !context.features.cluster().autoscale {
        return Ok(());
    }
    switch(flags, "--enable-autoscaling");
    arg(flags, "--min-replicas", AUTOSCALE_MIN_REPLICAS);
    arg(flags, "--max-replicas", AUTOSCALE_MAX_REPLICAS);
    config.autoscaling = true;
    let nodes = nodes(config);
    nodes.min_replicas = Some(AUTOSCALE_MIN_REPLICAS);
    nodes.max_replicas = Some(AUTOSCALE_MAX_REPLICAS);
    Ok(())
}

fn replicas(
    context: &ProjectionContext<'_>,
    flags: &mut Vec<String>,
    config: &mut ClusterConfig,
) -> Result<()> {
    match context.features.cluster().replicas {
        Some(replicas) if replicas > 0 => {
            arg(flags, "--replicas", replicas);
            nodes(config).replicas = Some(replicas);
        }
        _ => {}
    }
    Ok(())
}

fn ingress(
    context: &ProjectionContext<'_>,
    flags: &mut Vec<String>,
    config: &mut ClusterConfig,
) -> Result<()> {
    if !context.features.cluster().ingress_customized {
        return Ok(());
    }
    arg(flags, "--default-ingress-route-selector", INGRESS_ROUTE_SELECTOR);
    arg(flags, "--default-ingress-excluded-namespaces", INGRESS_EXCLUDED_NAMESPACES);
    arg(flags, "--default-ingress-wildcard-policy", INGRESS_WILDCARD_POLICY);
    arg(
        flags,
        "--default-ingress-namespace-ownership-policy",
        INGRESS_NAMESPACE_OWNERSHIP_POLICY,
    );
    config.ingress = Some(IngressConfig {
        route_selector: INGRESS_ROUTE_SELECTOR.to_string(),
        excluded_namespaces: INGRESS_EXCLUDED_NAMESPACES.to_string(),
        wildcard_policy: INGRESS_WILDCARD_POLICY.to_string(),
        namespace_ownership_policy: INGRESS_NAMESPACE_OWNERSHIP_POLICY.to_string(),
    });
    Ok(())
}

fn autoscaler(
    context: &ProjectionContext<'_>,
    flags: &mut Vec<String>,
    config: &mut ClusterConfig,
) -> Result<()> {
    if !context.features.cluster().autoscaler_enabled {
        return Ok(());
    }
    let autoscaler = Autoscaler {
        balance_similar_node_groups: true,
        skip_nodes_with_local_storage: true,
        log_verbosity: AUTOSCALER_LOG_VERBOSITY,
        max_pod_grace_period: AUTOSCALER_MAX_POD_GRACE_PERIOD,
        pod_priority_threshold: AUTOSCALER_POD_PRIORITY_THRESHOLD,
        ignore_daemonsets_utilization: true,
        max_node_provision_time: AUTOSCALER_MAX_NODE_PROVISION_TIME.to_string(),
        balancing_ignored_labels: AUTOSCALER_BALANCING_IGNORED_LABELS.to_string(),
        resource_limits: AutoscalerResourceLimits {
            max_nodes_total: AUTOSCALER_MAX_NODES_TOTAL,
            min_cores: AUTOSCALER_MIN_CORES,
            max_cores: AUTOSCALER_MAX_CORES,
            min_memory: AUTOSCALER_MIN_MEMORY,
            max_memory: AUTOSCALER_MAX_MEMORY,
        },
        scale_down: AutoscalerScaleDown {
            enabled: true,
            utilization_threshold: AUTOSCALER_SCALE_DOWN_UTILIZATION_THRESHOLD.to_string(),
            delay_after_add: AUTOSCALER_SCALE_DOWN_DELAY.to_string(),
            delay_after_delete: AUTOSCALER_SCALE_DOWN_DELAY.to_string(),
            delay_after_failure: AUTOSCALER_SCALE_DOWN_DELAY.to_string(),
        },
    };
    switch(flags, "--autoscaler-balance-similar-node-groups");
    switch(flags, "--autoscaler-skip-nodes-with-local-storage");
    arg(flags, "--autoscaler-log-verbosity", autoscaler.log_verbosity);
    arg(flags, "--autoscaler-max-pod-grace-period", autoscaler.max_pod_grace_period);
    arg(flags, "--autoscaler-pod-priority-threshold", autoscaler.pod_priority_threshold);
    switch(flags, "--autoscaler-ignore-daemonsets-utilization");
    arg(flags, "--autoscaler-max-node-provision-time", &autoscaler.max_node_provision_time);
    arg(flags, "--autoscaler-balancing-ignored-labels", &autoscaler.balancing_ignored_labels);
    let limits = &autoscaler.resource_limits;
    arg(flags, "--autoscaler-max-nodes-total", limits.max_nodes_total);
    arg(flags, "--autoscaler-min-cores", limits.min_cores);
    arg(flags, "--autoscaler-max-cores", limits.max_cores);
    arg(flags, "--autoscaler-min-memory", limits.min_memory);
    arg(flags, "--autoscaler-max-memory", limits.max_memory);
    let scale_down = &autoscaler.scale_down;
    switch(flags, "--autoscaler-scale-down-enabled");
    arg(
        flags,
        "--autoscaler-scale-down-utilization-threshold",
        &scale_down.utilization_threshold,
    );
    arg(flags, "--autoscaler-scale-down-delay-after-add", &scale_down.delay_after_add);
    arg(flags, "--autoscaler-scale-down-delay-after-delete", &scale_down.delay_after_delete);
    arg(flags, "--autoscaler-scale-down-delay-after-failure", &scale_down.delay_after_failure);
    config.autoscaler = Some(autoscaler);
    Ok(())
}

fn networking(
    context: &ProjectionContext<'_>,
    flags: &mut Vec<String>,
    config: &mut ClusterConfig,
) -> Result<()> {
    if !context.features.cluster().networking {
        return Ok(());
    }
    arg(flags, "--machine-cidr", MACHINE_CIDR);
    arg(flags, "--service-cidr", SERVICE_CIDR);
    arg(flags, "--pod-cidr", POD_CIDR);
    arg(flags, "--host-prefix", HOST_PREFIX);
    config.networking = Some(Networking {
        machine_cidr: Some(MACHINE_CIDR.to_string()),
        service_cidr: Some(SERVICE_CIDR.to_string()),
        pod_cidr: Some(POD_CIDR.to_string()),
        host_prefix: Some(HOST_PREFIX),
        network_type: None,
    });
    Ok(())
}

fn subnets(
    context: &ProjectionContext<'_>,
    flags: &mut Vec<String>,
    config: &mut ClusterConfig,
) -> Result<()> {
    if !context.features.byo_vpc() {
        return Ok(());
    }
    let subnet_ids = cluster_subnet_ids(&context.features, context.resources);
    ensure!(
        !subnet_ids.is_empty(),
        error::UnpreparedSnafu {
            step: Step::Subnets
        }
    );
    arg(flags, "--subnet-ids", subnet_ids.join(","));
    config.subnet_ids = subnet_ids;
    Ok(())
}

fn security_groups(
    context: &ProjectionContext<'_>,
    flags: &mut Vec<String>,
    config: &mut ClusterConfig,
) -> Result<()> {
    if !context.features.byo_vpc() || context.features.cluster().additional_sg_number == 0 {
        return Ok(());
    }
    let groups = &context.resources.security_groups;
    ensure!(
        !groups.is_empty(),
        error::UnpreparedSnafu {
            step: Step::SecurityGroups
        }
    );
    let joined = groups.join(",");
    if !context.features.hcp() {
        arg(flags, "--additional-infra-security-group-ids", &joined);
        arg(flags, "--additional-control-plane-security-group-ids", &joined);
        config.additional_infra_security_groups = groups.clone();
        config.additional_control_plane_security_groups = groups.clone();
    }
    arg(flags, "--additional-compute-security-group-ids", &joined);
    config.additional_compute_security_groups = groups.clone();
    Ok(())
}

fn proxy(
    context: &ProjectionContext<'_>,
    flags: &mut Vec<String>,
    config: &mut ClusterConfig,
) -> Result<()> {
    if !context.features.byo_vpc() || !context.features.cluster().proxy_enabled {
        return Ok(());
    }
    let proxy = context
        .resources
        .proxy
        .as_ref()
        .context(error::UnpreparedSnafu { step: Step::Proxy })?;
    arg(flags, "--http-proxy", &proxy.http_proxy);
    arg(flags, "--https-proxy", &proxy.https_proxy);
    arg(flags, "--no-proxy", &proxy.no_proxy);
    arg(flags, "--additional-trust-bundle-file", &proxy.ca_bundle_file);
    config.proxy = Some(ProxyConfig {
        http_proxy: proxy.http_proxy.clone(),
        https_proxy: proxy.https_proxy.clone(),
        no_proxy: proxy.no_proxy.clone(),
        trust_bundle_file: proxy.ca_bundle_file.clone(),
    });
    Ok(())
}

fn shared_vpc_network(
    context: &ProjectionContext<'_>,
    flags: &mut Vec<String>,
    config: &mut ClusterConfig,
) -> Result<()> {
    if !context.features.byo_vpc() || !context.features.shared_vpc() {
        return Ok(());
    }
    let domain = context
        .resources
        .dns_domain
        .as_deref()
        .context(error::UnpreparedSnafu {
            step: Step::DnsDomain,
        })?;
    let zone = context
        .resources
        .hosted_zone_id
        .as_deref()
        .context(error::UnpreparedSnafu {
            step: Step::HostedZone,
        })?;
    arg(flags, "--base-domain", domain);
    arg(flags, "--private-hosted-zone-id", zone);
    config.base_domain = Some(domain.to_string());
    config.private_hosted_zone_id = Some(zone.to_string());
    Ok(())
}

fn billing_account(
    context: &ProjectionContext<'_>,
    flags: &mut Vec<String>,
    config: &mut ClusterConfig,
) -> Result<()> {
    if let Some(account) = context
        .features
        .cluster()
        .billing_account
        .as_deref()
        .and_then(non_empty)
    {
        arg(flags, "--billing-account", account);
        config.billing_account = Some(account.to_string());
    }
    Ok(())
}

fn disable_scp_checks(
    context: &ProjectionContext<'_>,
    flags: &mut Vec<String>,
    config: &mut ClusterConfig,
) -> Result<()> {
    if context.features.cluster().disable_scp_checks {
        switch(flags, "--disable-scp-checks");
        config.disable_scp_checks = true;
    }
    Ok(())
}

fn disable_workload_monitoring(
    context: &ProjectionContext<'_>,
    flags: &mut Vec<String>,
    config: &mut ClusterConfig,
) -> Result<()> {
    if context.features.cluster().disable_user_workload_monitoring {
        switch(flags, "--disable-workload-monitoring");
        config.disable_workload_monitoring = true;
    }
    Ok(())
}

fn etcd_kms_key(
    context: &ProjectionContext<'_>,
    flags: &mut Vec<String>,
    config: &mut ClusterConfig,
) -> Result<()> {
    if !context.features.cluster().etcd_kms {
        return Ok(());
    }
    let arn = context
        .resources
        .etcd_kms_key_arn
        .as_deref()
        .context(error::UnpreparedSnafu {
            step: Step::EtcdKmsKey,
        })?;
    arg(flags, "--etcd-encryption-kms-arn", arn);
    encryption(config).etcd_encryption_kms_arn = Some(arn.to_string());
    Ok(())
}

fn ec2_metadata_http_tokens(
    context: &ProjectionContext<'_>,
    flags: &mut Vec<String>,
    config: &mut ClusterConfig,
) -> Result<()> {
    if let Some(tokens) = context.features.cluster().imdsv2.as_deref().and_then(non_empty) {
        arg(flags, "--ec2-metadata-http-tokens", tokens);
        config.ec2_metadata_http_tokens = Some(tokens.to_string());
    }
    Ok(())
}

fn etcd_encryption(
    context: &ProjectionContext<'_>,
    flags: &mut Vec<String>,
    config: &mut ClusterConfig,
) -> Result<()> {
    if context.features.cluster().etcd_encryption {
        switch(flags, "--etcd-encryption");
        encryption(config).etcd_encryption = true;
    }
    Ok(())
}

/// `--external-auth-providers-enabled` appears once, even though older tooling passed it twice.
/// Command lines recorded by that tooling differ from ours in that one repeated switch.
fn external_auth(
    context: &ProjectionContext<'_>,
    flags: &mut Vec<String>,
    config: &mut ClusterConfig,
) -> Result<()> {
    if context.features.cluster().external_auth_config {
        switch(flags, "--external-auth-providers-enabled");
        config.external_auth_enabled = true;
    }
    Ok(())
}

fn fips(
    context: &ProjectionContext<'_>,
    flags: &mut Vec<String>,
    config: &mut ClusterConfig,
) -> Result<()> {
    if context.features.cluster().fips {
        switch(flags, "--fips");
        config.fips = true;
    }
    Ok(())
}

fn hosted_cp(
    context: &ProjectionContext<'_>,
    flags: &mut Vec<String>,
    config: &mut ClusterConfig,
) -> Result<()> {
    if context.features.hcp() {
        switch(flags, "--hosted-cp");
        config.hypershift = true;
    }
    Ok(())
}

fn compute_machine_type(
    context: &ProjectionContext<'_>,
    flags: &mut Vec<String>,
    config: &mut ClusterConfig,
) -> Result<()> {
    let instance_type = context
        .features
        .cluster()
        .instance_type
        .as_deref()
        .and_then(non_empty);
    if let Some(instance_type) = instance_type {
        arg(flags, "--compute-machine-type", instance_type);
    }
    nodes(config).compute_instance_type =
        Some(instance_type.unwrap_or(DEFAULT_INSTANCE_TYPE).to_string());
    Ok(())
}

fn kms_key(
    context: &ProjectionContext<'_>,
    flags: &mut Vec<String>,
    config: &mut ClusterConfig,
) -> Result<()> {
    if !context.features.cluster().kms_key {
        return Ok(());
    }
    let arn = context
        .resources
        .kms_key_arn
        .as_deref()
        .context(error::UnpreparedSnafu {
            step: Step::VolumeKmsKey,
        })?;
    arg(flags, "--kms-key-arn", arn);
    switch(flags, "--enable-customer-managed-key");
    let encryption = encryption(config);
    encryption.kms_key_arn = Some(arn.to_string());
    encryption.enable_customer_managed_key = true;
    Ok(())
}

fn worker_labels(
    context: &ProjectionContext<'_>,
    flags: &mut Vec<String>,
    config: &mut ClusterConfig,
) -> Result<()> {
    if context.features.cluster().label_enabled {
        arg(flags, "--worker-mp-labels", WORKER_LABELS);
        config.default_mp_labels = Some(WORKER_LABELS.to_string());
    }
    Ok(())
}

fn multi_az(
    context: &ProjectionContext<'_>,
    flags: &mut Vec<String>,
    config: &mut ClusterConfig,
) -> Result<()> {
    if context.features.cluster().multi_az {
        switch(flags, "--multi-az");
        config.multi_az = true;
    }
    Ok(())
}

fn private_link(
    context: &ProjectionContext<'_>,
    flags: &mut Vec<String>,
    config: &mut ClusterConfig,
) -> Result<()> {
    if context.features.private_link() {
        switch(flags, "--private-link");
        config.private_link = true;
    }
    Ok(())
}

fn provision_shard(
    context: &ProjectionContext<'_>,
    flags: &mut Vec<String>,
    config: &mut ClusterConfig,
) -> Result<()> {
    if let Some(shard) = context
        .features
        .cluster()
        .provision_shard
        .as_deref()
        .and_then(non_empty)
    {
        arg(flags, "--properties", format!("provision_shard_id:{}", shard));
        config.properties = Some(Properties {
            provision_shard_id: shard.to_string(),
        });
    }
    Ok(())
}

fn tags(
    context: &ProjectionContext<'_>,
    flags: &mut Vec<String>,
    config: &mut ClusterConfig,
) -> Result<()> {
    if context.features.cluster().tag_enabled {
        arg(flags, "--tags", CLUSTER_TAGS);
        config.tags = Some(CLUSTER_TAGS.to_string());
    }
    Ok(())
}

fn worker_disk_size(
    context: &ProjectionContext<'_>,
    flags: &mut Vec<String>,
    config: &mut ClusterConfig,
) -> Result<()> {
    match context.features.cluster().volume_size {
        Some(size) if size > 0 => {
            let size = format!("{}GiB", size);
            arg(flags, "--worker-disk-size", &size);
            config.worker_disk_size = Some(size);
        }
        _ => {}
    }
    Ok(())
}

fn availability_zones(
    context: &ProjectionContext<'_>,
    flags: &mut Vec<String>,
    config: &mut ClusterConfig,
) -> Result<()> {
    // Subnets already pin the zones of a cluster installed into an existing network.
    let zones = context.features.zones();
    if zones.is_empty() || context.features.byo_vpc() {
        return Ok(());
    }
    arg(flags, "--availability-zones", zones.join(","));
    config.availability_zones = zones;
    Ok(())
}

fn no_cni(
    context: &ProjectionContext<'_>,
    flags: &mut Vec<String>,
    config: &mut ClusterConfig,
) -> Result<()> {
    if context.features.cluster().network_type.as_deref() != Some(NETWORK_TYPE_OTHER) {
        return Ok(());
    }
    switch(flags, "--no-cni");
    config
        .networking
        .get_or_insert_with(Networking::default)
        .network_type = Some(NETWORK_TYPE_OTHER.to_string());
    Ok(())
}
