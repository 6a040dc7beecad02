//! `RegistryActor` unit-level behavior tests.
//!
//! Relocated from `src/conference/registry.rs`: they depend on
//! `conf-test-utils`, which depends back on `conf-service`, so they cannot
//! run as the crate's own unit tests without cargo building two incompatible
//! copies of `conf-service`.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use conf_service::conference::RegistryHandle;
use conf_service::errors::ConfError;
use conf_service::metrics::ServiceMetrics;
use conf_service::stasis::EventRouter;
use conf_test_utils::fixtures::test_config;
use conf_test_utils::mock_control_plane::MockControlPlane;

use common::types::ConferenceId;

fn registry() -> RegistryHandle {
    let metrics = ServiceMetrics::new();
    let router = EventRouter::new(Arc::clone(&metrics));
    RegistryHandle::new(
        Arc::new(test_config()),
        Arc::new(MockControlPlane::builder().build()),
        router,
        metrics,
    )
}

#[tokio::test]
async fn test_create_and_get_conference() {
    let registry = registry();

    let handle = registry
        .create_conference("sales".to_string())
        .await
        .unwrap();
    assert_eq!(handle.name(), "sales");

    let found = registry.get_conference(handle.id()).await.unwrap();
    assert_eq!(found.id(), handle.id());

    let by_name = registry.find_by_name("sales".to_string()).await.unwrap();
    assert_eq!(by_name.map(|h| h.id()), Some(handle.id()));

    registry.cancel();
}

#[tokio::test]
async fn test_duplicate_name_is_a_conflict() {
    let registry = registry();

    registry
        .create_conference("sales".to_string())
        .await
        .unwrap();
    let result = registry.create_conference("sales".to_string()).await;
    assert!(matches!(result, Err(ConfError::Conflict(_))));

    registry.cancel();
}

#[tokio::test]
async fn test_get_unknown_conference_fails() {
    let registry = registry();

    let result = registry.get_conference(ConferenceId::new()).await;
    assert!(matches!(result, Err(ConfError::ConferenceNotFound(_))));

    let found = registry.find_by_name("ghosts".to_string()).await.unwrap();
    assert!(found.is_none());

    registry.cancel();
}

#[tokio::test]
async fn test_remove_conference() {
    let registry = registry();

    let handle = registry
        .create_conference("sales".to_string())
        .await
        .unwrap();
    registry.remove_conference(handle.id()).await.unwrap();

    let result = registry.get_conference(handle.id()).await;
    assert!(matches!(result, Err(ConfError::ConferenceNotFound(_))));

    // Removing twice fails cleanly.
    let result = registry.remove_conference(handle.id()).await;
    assert!(matches!(result, Err(ConfError::ConferenceNotFound(_))));

    registry.cancel();
}

#[tokio::test]
async fn test_shutdown_stops_accepting() {
    let registry = registry();

    registry
        .create_conference("sales".to_string())
        .await
        .unwrap();
    registry.shutdown().await.unwrap();
    assert!(registry.is_cancelled());
}

#[tokio::test]
async fn test_status_reports_counts() {
    let registry = registry();

    registry
        .create_conference("sales".to_string())
        .await
        .unwrap();
    registry
        .create_conference("support".to_string())
        .await
        .unwrap();

    let status = registry.status().await.unwrap();
    assert_eq!(status.conference_count, 2);
    assert!(!status.is_draining);

    registry.cancel();
}
