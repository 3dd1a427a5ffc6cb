mod mock;

use fixture_model::{ClusterDetail, Record, ResolvedResourceSet};
use mock::{DeleteOutcome, MockClusterClient, MockPreparer, CLUSTER_ID, GONE};
use resource_agent::clients::{InfoClient, MemoryInfoClient};
use rosa_agents::poller::{PollSettings, ReadinessPoller};
use rosa_agents::teardown::TeardownCoordinator;
use rosa_agents::{ClusterHandler, Error, ErrorKind, LifecyclePhase};

fn detail() -> ClusterDetail {
    ClusterDetail {
        cluster_id: Some(CLUSTER_ID.to_string()),
        cluster_name: Some("ci-rosa".to_string()),
        ..ClusterDetail::default()
    }
}

fn resources() -> ResolvedResourceSet {
    ResolvedResourceSet {
        operator_roles_prefix: Some("ci-rosa".to_string()),
        ..ResolvedResourceSet::default()
    }
}

#[tokio::test(start_paused = true)]
async fn deleted_cluster() {
    mock::init_logger();
    let client = MockClusterClient::new(CLUSTER_ID, &["uninstalling", GONE]);
    let preparer = MockPreparer::new();
    let info_client = MemoryInfoClient::new();
    let poller = ReadinessPoller::new(&client, &info_client, PollSettings::default());
    let errors = TeardownCoordinator::new(&client, &preparer, poller, 30)
        .destroy(true, &detail(), &resources())
        .await;
    assert!(errors.is_empty(), "{:?}", errors);
    assert_eq!(
        client.calls(),
        vec!["delete", "describe", "describe", "delete-oidc-provider"]
    );
    assert_eq!(preparer.calls(), vec!["destroy"]);
}

#[tokio::test]
async fn missing_cluster_still_destroys_resources() {
    let client =
        MockClusterClient::new(CLUSTER_ID, &["ready"]).with_delete(DeleteOutcome::NotFound);
    let preparer = MockPreparer::new();
    let info_client = MemoryInfoClient::new();
    let poller = ReadinessPoller::new(&client, &info_client, PollSettings::default());
    let errors = TeardownCoordinator::new(&client, &preparer, poller, 30)
        .destroy(true, &detail(), &resources())
        .await;
    assert!(errors.is_empty(), "{:?}", errors);
    // Nothing to wait for and no OIDC provider to delete.
    assert_eq!(client.calls(), vec!["delete"]);
    assert_eq!(preparer.calls(), vec!["destroy"]);
}

#[tokio::test]
async fn failures_are_collected() {
    let client = MockClusterClient::new(CLUSTER_ID, &["ready"]).with_delete(DeleteOutcome::Fails);
    let preparer = MockPreparer::new().with_destroy_failures(2);
    let info_client = MemoryInfoClient::new();
    let poller = ReadinessPoller::new(&client, &info_client, PollSettings::default());
    let errors = TeardownCoordinator::new(&client, &preparer, poller, 30)
        .destroy(true, &detail(), &resources())
        .await;
    assert_eq!(errors.len(), 3);
    assert!(matches!(errors[0], Error::ClusterCommand { .. }));
    assert!(errors[1..]
        .iter()
        .all(|e| e.kind() == ErrorKind::ExternalCall));
    assert_eq!(client.calls(), vec!["delete"]);
    assert_eq!(preparer.calls(), vec!["destroy"]);
}

#[tokio::test]
async fn nothing_to_destroy() {
    let client = MockClusterClient::new(CLUSTER_ID, &["ready"]);
    let preparer = MockPreparer::new();
    let info_client = MemoryInfoClient::new();
    let poller = ReadinessPoller::new(&client, &info_client, PollSettings::default());
    let errors = TeardownCoordinator::new(&client, &preparer, poller, 30)
        .destroy(true, &ClusterDetail::default(), &ResolvedResourceSet::default())
        .await;
    assert!(errors.is_empty());
    assert!(client.calls().is_empty());
    assert!(preparer.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn failed_teardown_keeps_the_records() {
    let mut handler = ClusterHandler::temporary(
        MockClusterClient::new(CLUSTER_ID, &["installing"]).with_delete(DeleteOutcome::Fails),
        MockPreparer::new(),
        mock::profile(),
        mock::settings(),
    )
    .unwrap();
    handler.create_cluster(false).await.unwrap();

    let errors = handler.destroy().await;
    assert_eq!(errors.len(), 1);
    assert_eq!(handler.phase(), LifecyclePhase::Failed);
    assert_eq!(handler.detail().cluster_id.as_deref(), Some(CLUSTER_ID));
    let stored: ResolvedResourceSet = handler
        .info_client()
        .get_info(Record::Resources)
        .await
        .unwrap()
        .unwrap();
    assert!(stored.account_roles.is_some());
    assert_eq!(
        handler.preparer().calls().last().map(String::as_str),
        Some("destroy")
    );
}
