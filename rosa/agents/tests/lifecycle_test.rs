mod mock;

use fixture_model::constants::CLUSTER_TYPE;
use fixture_model::{ClusterDetail, OidcConfigKind, PlainFile, Record, ResolvedResourceSet};
use mock::{MockClusterClient, MockPreparer, CLUSTER_ID, GONE};
use resource_agent::clients::{FileInfoClient, InfoClient};
use rosa_agents::{ClusterHandler, ErrorKind, LifecyclePhase};
use serde_json::json;
use std::path::PathBuf;

#[tokio::test(start_paused = true)]
async fn create_records_everything() {
    mock::init_logger();
    let mut handler = ClusterHandler::temporary(
        MockClusterClient::new(CLUSTER_ID, &["ready"]),
        MockPreparer::new(),
        mock::profile(),
        mock::settings(),
    )
    .unwrap();
    handler.create_cluster(true).await.unwrap();

    assert_eq!(handler.phase(), LifecyclePhase::Ready);
    assert_eq!(handler.detail().cluster_id.as_deref(), Some(CLUSTER_ID));
    assert_eq!(handler.detail().cluster_name.as_deref(), Some("ci-rosa"));
    assert_eq!(handler.config().name, "ci-rosa");
    assert_eq!(
        handler.preparer().calls(),
        vec![
            "account-roles",
            "oidc-provider-by-cluster",
            "operator-roles-by-cluster"
        ]
    );
    // Creation describes once by name; readiness is observed on the next describe.
    assert_eq!(handler.client().calls(), vec!["create", "describe", "describe"]);

    let info = handler.info_client();
    let command = info.plain(PlainFile::CreateCommand).await.unwrap();
    assert!(command.starts_with(
        "rosa create cluster --cluster-name ci-rosa -y --region us-east-2 --role-arn \
         arn:aws:iam::111111111111:role/ci-rosa-Installer-Role"
    ));
    assert_eq!(
        info.plain(PlainFile::ClusterId).await.as_deref(),
        Some(CLUSTER_ID)
    );
    assert_eq!(
        info.plain(PlainFile::ClusterType).await.as_deref(),
        Some(CLUSTER_TYPE)
    );
    assert!(info
        .plain(PlainFile::ApiUrl)
        .await
        .unwrap()
        .starts_with("https://api."));
    assert_eq!(info.plain(PlainFile::ClusterAdmin).await, None);

    let detail: ClusterDetail = info.get_info(Record::ClusterDetail).await.unwrap().unwrap();
    assert_eq!(&detail, handler.detail());
    let resources: ResolvedResourceSet = info.get_info(Record::Resources).await.unwrap().unwrap();
    assert_eq!(
        resources.account_roles.unwrap().prefix,
        "ci-rosa".to_string()
    );
    // Operator roles made for the cluster are torn down by prefix.
    assert_eq!(resources.operator_roles_prefix.as_deref(), Some("ci-rosa"));
}

#[tokio::test]
async fn invalid_profile_touches_nothing() {
    let mut profile = mock::profile();
    profile.cluster.autoscaler_enabled = true;
    let mut handler = ClusterHandler::temporary(
        MockClusterClient::new(CLUSTER_ID, &["ready"]),
        MockPreparer::new(),
        profile,
        mock::settings(),
    )
    .unwrap();

    let err = handler.generate_create_flags().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert!(handler.preparer().calls().is_empty());
    assert!(handler.client().calls().is_empty());
    // Records are stored even when the operation fails.
    assert_eq!(
        handler
            .info_client()
            .plain(PlainFile::ClusterType)
            .await
            .as_deref(),
        Some(CLUSTER_TYPE)
    );
}

#[tokio::test]
async fn admin_credentials_are_recorded() {
    let mut profile = mock::profile();
    profile.cluster.admin_enabled = true;
    let mut handler = ClusterHandler::temporary(
        MockClusterClient::new(CLUSTER_ID, &["ready"]),
        MockPreparer::new(),
        profile,
        mock::settings(),
    )
    .unwrap();

    let flags = handler.generate_create_flags().await.unwrap();
    let password = flags
        .iter()
        .position(|flag| flag == "--cluster-admin-password")
        .unwrap();
    assert_eq!(flags[password + 1], "Rosa-0123456789abcdef");
    assert_eq!(
        handler
            .info_client()
            .plain(PlainFile::ClusterAdmin)
            .await
            .as_deref(),
        Some("cluster-admin:Rosa-0123456789abcdef")
    );
    assert!(handler.config().admin_enabled);
}

#[tokio::test]
async fn resolution_failure_keeps_what_was_prepared() {
    let mut profile = mock::profile();
    profile.cluster.oidc_config = Some(OidcConfigKind::Managed);
    let mut handler = ClusterHandler::temporary(
        MockClusterClient::new(CLUSTER_ID, &["ready"]),
        MockPreparer::failing_on("operator-roles"),
        profile,
        mock::settings(),
    )
    .unwrap();

    let err = handler.create_cluster(false).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DependencyResolution);
    assert_eq!(handler.phase(), LifecyclePhase::Failed);
    assert_eq!(
        handler.preparer().calls(),
        vec![
            "account-roles",
            "oidc-config",
            "oidc-provider",
            "operator-roles"
        ]
    );
    assert!(handler.client().calls().is_empty());

    let stored: ResolvedResourceSet = handler
        .info_client()
        .get_info(Record::Resources)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        stored.oidc_config_id.as_deref(),
        Some("25tu67hq45rto1am3slpf5lq6ht6d5ko")
    );
    assert!(stored.operator_roles_prefix.is_none());
    assert_eq!(&stored, handler.resources());
}

fn kms_description() -> serde_json::Value {
    json!({
        "id": CLUSTER_ID,
        "region": { "id": "us-east-2" },
        "hypershift": { "enabled": false },
        "aws": {
            "kms_key_arn": "arn:aws:kms:us-east-2:111111111111:key/volume",
            "etcd_encryption": { "kms_key_arn": "arn:aws:kms:us-east-2:111111111111:key/etcd" },
            "sts": {
                "role_arn": "arn:aws:iam::111111111111:role/ci-rosa-Installer-Role",
                "operator_iam_roles": [
                    { "name": "ebs-cloud-credentials", "role_arn": "arn:ebs" },
                    { "name": "cloud-credentials", "role_arn": "arn:ingress" }
                ]
            }
        }
    })
}

#[tokio::test]
async fn kms_keys_are_elaborated() {
    let mut profile = mock::profile();
    profile.cluster.kms_key = true;
    profile.cluster.etcd_kms = true;
    let mut handler = ClusterHandler::temporary(
        MockClusterClient::new(CLUSTER_ID, &["installing"]).with_json(kms_description()),
        MockPreparer::new(),
        profile,
        mock::settings(),
    )
    .unwrap();
    handler.create_cluster(false).await.unwrap();
    assert_eq!(handler.phase(), LifecyclePhase::AwaitingReady);

    let policies = handler.preparer().policies();
    assert_eq!(policies.len(), 2);
    let (volume_key, volume_statements) = &policies[0];
    assert_eq!(volume_key, "arn:aws:kms:us-east-2:111111111111:key/volume");
    assert_eq!(volume_statements.len(), 4);
    assert_eq!(volume_statements[2]["Principal"]["AWS"], json!(["arn:ebs"]));
    let (etcd_key, etcd_statements) = &policies[1];
    assert_eq!(etcd_key, "arn:aws:kms:us-east-2:111111111111:key/etcd");
    assert_eq!(etcd_statements.len(), 2);
    assert_eq!(handler.client().count("describe-json"), 2);
}

#[tokio::test]
async fn kms_failure_fails_creation() {
    let mut profile = mock::profile();
    profile.cluster.kms_key = true;
    let mut handler = ClusterHandler::temporary(
        MockClusterClient::new(CLUSTER_ID, &["installing"]).with_json(kms_description()),
        MockPreparer::failing_on("kms-policy"),
        profile,
        mock::settings(),
    )
    .unwrap();

    let err = handler.create_cluster(true).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ExternalCall);
    assert_eq!(handler.phase(), LifecyclePhase::Failed);
    // The cluster exists, so its identity is kept for teardown.
    assert_eq!(handler.detail().cluster_id.as_deref(), Some(CLUSTER_ID));
    assert_eq!(
        handler
            .info_client()
            .plain(PlainFile::ClusterId)
            .await
            .as_deref(),
        Some(CLUSTER_ID)
    );
    // Readiness is not awaited after a failed creation.
    assert_eq!(handler.client().count("describe"), 1);
}

#[tokio::test]
async fn shared_vpc_needs_credentials() {
    let mut profile = mock::profile();
    profile.cluster.shared_vpc = true;
    let err = ClusterHandler::temporary(
        MockClusterClient::new(CLUSTER_ID, &["ready"]),
        MockPreparer::new(),
        profile.clone(),
        mock::settings(),
    )
    .err()
    .unwrap();
    assert_eq!(err.kind(), ErrorKind::Configuration);

    let mut settings = mock::settings();
    settings.shared_vpc_credentials_file = Some(PathBuf::from("/tmp/shared-vpc-credentials"));
    assert!(ClusterHandler::temporary(
        MockClusterClient::new(CLUSTER_ID, &["ready"]),
        MockPreparer::new(),
        profile,
        settings,
    )
    .is_ok());
}

#[tokio::test]
async fn second_create_is_refused() {
    let mut handler = ClusterHandler::temporary(
        MockClusterClient::new(CLUSTER_ID, &["installing"]),
        MockPreparer::new(),
        mock::profile(),
        mock::settings(),
    )
    .unwrap();
    handler.create_cluster(false).await.unwrap();

    let err = handler.create_cluster(false).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert_eq!(handler.client().count("create"), 1);
    // The first cluster is still recorded.
    assert_eq!(handler.detail().cluster_id.as_deref(), Some(CLUSTER_ID));
}

#[tokio::test]
async fn wait_needs_a_cluster() {
    let mut handler = ClusterHandler::temporary(
        MockClusterClient::new(CLUSTER_ID, &["ready"]),
        MockPreparer::new(),
        mock::profile(),
        mock::settings(),
    )
    .unwrap();
    let err = handler.wait_for_cluster_ready(10).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert!(handler.client().calls().is_empty());
}

#[tokio::test]
async fn later_invocations_resume_from_records() {
    mock::init_logger();
    let dir = tempfile::tempdir().unwrap();

    let mut handler = ClusterHandler::new(
        MockClusterClient::new(CLUSTER_ID, &["installing"]),
        MockPreparer::new(),
        FileInfoClient::new(dir.path()),
        mock::profile(),
        mock::settings(),
    )
    .unwrap();
    handler.create_cluster(false).await.unwrap();
    let created = handler.detail().clone();
    drop(handler);

    let mut handler = ClusterHandler::resume(
        MockClusterClient::new(CLUSTER_ID, &["ready", GONE]),
        MockPreparer::new(),
        FileInfoClient::new(dir.path()),
        mock::profile(),
        mock::settings(),
    )
    .await
    .unwrap();
    assert_eq!(handler.phase(), LifecyclePhase::AwaitingReady);
    assert_eq!(handler.detail(), &created);
    assert!(handler.resources().account_roles.is_some());

    handler.wait_for_cluster_ready(30).await.unwrap();
    assert_eq!(handler.phase(), LifecyclePhase::Ready);

    let errors = handler.destroy().await;
    assert!(errors.is_empty(), "{:?}", errors);
    assert_eq!(handler.phase(), LifecyclePhase::Destroyed);
    assert_eq!(
        handler.client().calls(),
        vec!["describe", "delete", "describe", "delete-oidc-provider"]
    );
    assert_eq!(handler.preparer().calls(), vec!["destroy"]);

    let stored: ResolvedResourceSet = FileInfoClient::new(dir.path())
        .get_info(Record::Resources)
        .await
        .unwrap()
        .unwrap();
    assert!(stored.is_empty());
    assert_eq!(
        std::fs::read_to_string(dir.path().join("cluster-id")).unwrap(),
        ""
    );
}

#[tokio::test]
async fn resume_without_records_starts_fresh() {
    let dir = tempfile::tempdir().unwrap();
    let handler = ClusterHandler::resume(
        MockClusterClient::new(CLUSTER_ID, &["ready"]),
        MockPreparer::new(),
        FileInfoClient::new(dir.path().join("empty")),
        mock::profile(),
        mock::settings(),
    )
    .await
    .unwrap();
    assert_eq!(handler.phase(), LifecyclePhase::Unprovisioned);
    assert!(handler.resources().is_empty());
    assert_eq!(handler.detail(), &ClusterDetail::default());
}

#[tokio::test]
async fn oidc_config_reaches_operator_roles_and_flags() {
    let mut profile = mock::profile();
    profile.cluster.oidc_config = Some(OidcConfigKind::Managed);
    let mut handler = ClusterHandler::temporary(
        MockClusterClient::new(CLUSTER_ID, &["installing"]),
        MockPreparer::new(),
        profile,
        mock::settings(),
    )
    .unwrap();
    handler.create_cluster(false).await.unwrap();

    let requests = handler.preparer().operator_role_requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].oidc_config_id, "25tu67hq45rto1am3slpf5lq6ht6d5ko");
    // Roles keyed by the OIDC config replace the ones made after creation.
    assert!(!handler
        .preparer()
        .calls()
        .iter()
        .any(|call| call.ends_with("-by-cluster")));

    let command = handler
        .info_client()
        .plain(PlainFile::CreateCommand)
        .await
        .unwrap();
    assert!(command.contains("--oidc-config-id 25tu67hq45rto1am3slpf5lq6ht6d5ko"));
    assert!(command.contains("--operator-roles-prefix ci-rosa"));
    assert_eq!(
        handler.resources().operator_roles_prefix.as_deref(),
        Some("ci-rosa")
    );
}

#[tokio::test]
async fn failed_network_verification_is_only_logged() {
    mock::init_logger();
    let mut profile = mock::profile();
    profile.cluster.byo_vpc = true;
    let mut handler = ClusterHandler::temporary(
        MockClusterClient::new(CLUSTER_ID, &["installing"]).with_failing_network(),
        MockPreparer::new(),
        profile,
        mock::settings(),
    )
    .unwrap();
    handler.create_cluster(false).await.unwrap();

    assert_eq!(handler.phase(), LifecyclePhase::AwaitingReady);
    assert_eq!(handler.client().count("verify-network"), 1);
    assert_eq!(handler.detail().cluster_id.as_deref(), Some(CLUSTER_ID));
    assert!(handler.resources().vpc.is_some());
}

#[tokio::test(start_paused = true)]
async fn operator_roles_made_after_creation_are_destroyed() {
    let mut handler = ClusterHandler::temporary(
        MockClusterClient::new(CLUSTER_ID, &["installing", "uninstalling", GONE]),
        MockPreparer::new(),
        mock::profile(),
        mock::settings(),
    )
    .unwrap();
    handler.create_cluster(false).await.unwrap();
    assert!(handler.destroy().await.is_empty());

    let destroyed = handler.preparer().destroyed();
    assert_eq!(destroyed.len(), 1);
    assert_eq!(destroyed[0].operator_roles_prefix.as_deref(), Some("ci-rosa"));
}
