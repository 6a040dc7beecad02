//! End-to-end conference lifecycle tests.
//!
//! Drives the registry and conference actors against the mock control
//! plane, simulating the control-plane events a real deployment would push
//! back, and asserts on the resulting command traffic and state.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use conf_service::conference::{ConferencePhase, ParticipantState, RegistryHandle};
use conf_service::errors::ConfError;
use conf_service::metrics::ServiceMetrics;
use conf_service::stasis::{EventRouter, StasisEvent};
use conf_test_utils::fixtures::test_config;
use conf_test_utils::mock_control_plane::{IssuedCommand, MockControlPlane};

use common::types::{BridgeId, ChannelId, RecordingName};

struct TestBed {
    registry: RegistryHandle,
    control: Arc<MockControlPlane>,
    router: Arc<EventRouter>,
    metrics: Arc<ServiceMetrics>,
}

fn test_bed() -> TestBed {
    let metrics = ServiceMetrics::new();
    let router = EventRouter::new(Arc::clone(&metrics));
    let control = Arc::new(MockControlPlane::builder().build());
    let control_plane: Arc<dyn conf_service::stasis::ControlPlane> = control.clone();
    let registry = RegistryHandle::new(
        Arc::new(test_config()),
        control_plane,
        Arc::clone(&router),
        Arc::clone(&metrics),
    );
    TestBed {
        registry,
        control,
        router,
        metrics,
    }
}

/// Walk one leg through the two-phase join: recording completes, then the
/// control plane confirms bridge entry.
async fn join_leg(
    bed: &TestBed,
    conference: &conf_service::conference::ConferenceHandle,
    channel: &str,
) {
    conference.add_user(ChannelId::from(channel)).await.unwrap();
    bed.router
        .dispatch(StasisEvent::RecordingFinished {
            recording_name: RecordingName(format!(
                "conftemp-{}-{channel}",
                conference.name()
            )),
        })
        .await;
    bed.router
        .dispatch(StasisEvent::ChannelEnteredBridge {
            bridge_id: conference.bridge_id().clone(),
            channel_id: ChannelId::from(channel),
        })
        .await;
    // Snapshot round-trips the mailbox so both events are processed.
    conference.snapshot().await.unwrap();
}

#[tokio::test]
async fn test_sales_conference_full_flow() {
    let bed = test_bed();

    let sales = bed
        .registry
        .create_conference("sales".to_string())
        .await
        .unwrap();

    // Start: bridge assigned, admission open, hold music running.
    sales.start().await.unwrap();
    let snapshot = sales.snapshot().await.unwrap();
    assert_eq!(snapshot.phase, ConferencePhase::Ready);
    assert_eq!(snapshot.bridge, Some(sales.bridge_id().clone()));
    assert!(bed.control.moh_running(sales.bridge_id()));

    // First leg admitted: answered, name recording started, not bridged.
    sales.add_user(ChannelId::from("chan-a")).await.unwrap();
    let snapshot = sales.snapshot().await.unwrap();
    assert_eq!(snapshot.phase, ConferencePhase::Ready);
    assert_eq!(snapshot.participants.len(), 1);
    let commands = bed.control.commands();
    assert!(commands
        .iter()
        .any(|c| matches!(c, IssuedCommand::Answer { channel } if channel.as_str() == "chan-a")));
    assert!(!commands
        .iter()
        .any(|c| matches!(c, IssuedCommand::AddChannel { .. })));

    // Recording completes while the leg is still recording its name: the
    // channel is added to the bridge.
    bed.router
        .dispatch(StasisEvent::RecordingFinished {
            recording_name: RecordingName::from("conftemp-sales-chan-a"),
        })
        .await;
    let snapshot = sales.snapshot().await.unwrap();
    assert_eq!(
        snapshot.participants.first().unwrap().state,
        ParticipantState::Joining
    );
    assert!(bed.control.commands().iter().any(|c| matches!(
        c,
        IssuedCommand::AddChannel { channel, .. } if channel.as_str() == "chan-a"
    )));

    // Bridge entry confirmed: sole participant hears the alone prompt on
    // their own leg, the bridge does not, and hold music keeps running.
    bed.router
        .dispatch(StasisEvent::ChannelEnteredBridge {
            bridge_id: sales.bridge_id().clone(),
            channel_id: ChannelId::from("chan-a"),
        })
        .await;
    let snapshot = sales.snapshot().await.unwrap();
    assert_eq!(snapshot.phase, ConferencePhase::Ready);
    assert_eq!(snapshot.in_bridge_count(), 1);
    assert_eq!(
        bed.control.channel_playbacks(&ChannelId::from("chan-a")),
        vec!["sound:conf-onlyperson"]
    );
    assert!(bed.control.bridge_playbacks(sales.bridge_id()).is_empty());
    assert!(bed.control.moh_running(sales.bridge_id()));

    // Second leg joins: hold music stops, the room hears the newcomer's
    // name and the joined prompt, and nobody hears the alone prompt.
    join_leg(&bed, &sales, "chan-b").await;
    let snapshot = sales.snapshot().await.unwrap();
    assert_eq!(snapshot.in_bridge_count(), 2);
    assert!(!bed.control.moh_running(sales.bridge_id()));
    assert_eq!(
        bed.control.bridge_playbacks(sales.bridge_id()),
        vec!["recording:conftemp-sales-chan-b", "sound:conf-hasjoin"]
    );
    assert!(bed
        .control
        .channel_playbacks(&ChannelId::from("chan-b"))
        .is_empty());
}

#[tokio::test]
async fn test_departure_restarts_hold_music_and_deletes_recording() {
    let bed = test_bed();
    let sales = bed
        .registry
        .create_conference("sales".to_string())
        .await
        .unwrap();
    sales.start().await.unwrap();
    join_leg(&bed, &sales, "chan-a").await;
    join_leg(&bed, &sales, "chan-b").await;
    assert!(!bed.control.moh_running(sales.bridge_id()));
    bed.control.clear();

    // chan-b hangs up; the control plane reports it gone from the bridge.
    bed.router
        .dispatch(StasisEvent::ChannelLeftBridge {
            bridge_id: sales.bridge_id().clone(),
            channel_id: ChannelId::from("chan-b"),
        })
        .await;
    let snapshot = sales.snapshot().await.unwrap();

    assert_eq!(snapshot.participants.len(), 1);
    assert_eq!(snapshot.in_bridge_count(), 1);

    // Departure announcements: the leg's name recording, then the left
    // prompt; afterwards the lone member is back on hold music and the
    // temporary recording is gone.
    assert_eq!(
        bed.control.bridge_playbacks(sales.bridge_id()),
        vec!["recording:conftemp-sales-chan-b", "sound:conf-hasleft"]
    );
    assert!(bed.control.moh_running(sales.bridge_id()));
    assert!(bed.control.commands().iter().any(|c| matches!(
        c,
        IssuedCommand::DeleteStoredRecording { name } if name.as_str() == "conftemp-sales-chan-b"
    )));
}

#[tokio::test]
async fn test_destroy_removes_participants_then_bridge() {
    let bed = test_bed();
    let sales = bed
        .registry
        .create_conference("sales".to_string())
        .await
        .unwrap();
    sales.start().await.unwrap();
    join_leg(&bed, &sales, "chan-a").await;
    join_leg(&bed, &sales, "chan-b").await;
    bed.control.clear();

    sales.destroy().await.unwrap();

    let snapshot = sales.snapshot().await.unwrap();
    assert_eq!(snapshot.phase, ConferencePhase::Destroying);
    assert!(snapshot.participants.is_empty());

    // Both legs removed from the bridge before the bridge itself goes.
    let commands = bed.control.commands();
    let removals: Vec<usize> = commands
        .iter()
        .enumerate()
        .filter_map(|(i, c)| matches!(c, IssuedCommand::RemoveChannel { .. }).then_some(i))
        .collect();
    let destroy_position = commands
        .iter()
        .position(|c| matches!(c, IssuedCommand::DestroyBridge { .. }))
        .expect("bridge destruction must be requested");
    assert_eq!(removals.len(), 2);
    assert!(removals.iter().all(|&i| i < destroy_position));

    // Only the control plane's confirmation finishes the conference.
    bed.router
        .dispatch(StasisEvent::BridgeDestroyed {
            bridge_id: sales.bridge_id().clone(),
        })
        .await;

    // The actor exits after confirming; its mailbox closes and its routes
    // disappear.
    let mut closed = false;
    for _ in 0..50 {
        if sales.snapshot().await.is_err() {
            closed = true;
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
    }
    assert!(closed, "conference actor should stop after confirmation");
    assert_eq!(bed.router.bridge_route_count(), 0);
    assert_eq!(bed.router.channel_claim_count(), 0);
    assert_eq!(bed.router.recording_claim_count(), 0);
}

#[tokio::test]
async fn test_destroyed_conference_is_swept_from_registry() {
    let bed = test_bed();
    let sales = bed
        .registry
        .create_conference("sales".to_string())
        .await
        .unwrap();
    sales.start().await.unwrap();

    sales.destroy().await.unwrap();
    bed.router
        .dispatch(StasisEvent::BridgeDestroyed {
            bridge_id: sales.bridge_id().clone(),
        })
        .await;

    // The health sweep runs at the top of the registry loop, so the dead
    // conference disappears after a bounded number of round trips.
    let mut swept = false;
    for _ in 0..50 {
        if bed.registry.get_conference(sales.id()).await.is_err() {
            swept = true;
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
    }
    assert!(swept, "registry should sweep the destroyed conference");
}

#[tokio::test]
async fn test_admission_follows_phase() {
    let bed = test_bed();
    let sales = bed
        .registry
        .create_conference("sales".to_string())
        .await
        .unwrap();

    // Before start: closed.
    let result = sales.add_user(ChannelId::from("chan-a")).await;
    assert!(matches!(result, Err(ConfError::AdmissionClosed(_))));

    // Ready: open.
    sales.start().await.unwrap();
    sales.add_user(ChannelId::from("chan-a")).await.unwrap();

    // Destroying: closed again.
    sales.destroy().await.unwrap();
    let result = sales.add_user(ChannelId::from("chan-b")).await;
    assert!(matches!(result, Err(ConfError::AdmissionClosed(_))));
}

#[tokio::test]
async fn test_late_events_for_dead_entities_are_dropped() {
    let bed = test_bed();
    let sales = bed
        .registry
        .create_conference("sales".to_string())
        .await
        .unwrap();
    sales.start().await.unwrap();
    join_leg(&bed, &sales, "chan-a").await;

    sales.destroy().await.unwrap();
    bed.router
        .dispatch(StasisEvent::BridgeDestroyed {
            bridge_id: sales.bridge_id().clone(),
        })
        .await;
    while sales.snapshot().await.is_ok() {
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
    }

    let unmatched_before = bed.metrics.snapshot().events_unmatched;

    // Duplicate and stale events for the torn-down conference match no
    // routes and vanish without a crash.
    bed.router
        .dispatch(StasisEvent::BridgeDestroyed {
            bridge_id: sales.bridge_id().clone(),
        })
        .await;
    bed.router
        .dispatch(StasisEvent::ChannelDtmfReceived {
            channel_id: ChannelId::from("chan-a"),
            digit: '#',
        })
        .await;
    bed.router
        .dispatch(StasisEvent::RecordingFinished {
            recording_name: RecordingName::from("conftemp-sales-chan-a"),
        })
        .await;

    assert_eq!(
        bed.metrics.snapshot().events_unmatched,
        unmatched_before + 3
    );
}

#[tokio::test]
async fn test_events_for_foreign_bridges_do_not_leak_across() {
    let bed = test_bed();
    let sales = bed
        .registry
        .create_conference("sales".to_string())
        .await
        .unwrap();
    sales.start().await.unwrap();

    // An event for a bridge nobody owns is dropped at the router.
    bed.router
        .dispatch(StasisEvent::BridgeDestroyed {
            bridge_id: BridgeId::from("not-ours"),
        })
        .await;
    let snapshot = sales.snapshot().await.unwrap();
    assert_eq!(snapshot.phase, ConferencePhase::Ready);
    assert_eq!(bed.metrics.snapshot().events_unmatched, 1);
}
