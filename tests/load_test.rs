//! Run loop pacing and lifecycle tests.
//!
//! All timing here runs on tokio's paused clock, so the loop's sleeps
//! auto-advance and the counts are deterministic.

mod common;

use std::sync::Arc;
use std::time::Duration;

use telemetry_loadgen::engine::{ConfigUpdate, MessageKind, RunStatus};
use telemetry_loadgen::gateway::RecordingGateway;
use telemetry_loadgen::lifecycle::startup;

use common::{clean_load, control_with, test_config};

#[tokio::test(start_paused = true)]
async fn test_sixty_per_minute_sends_about_one_per_second() {
    let gateway = Arc::new(RecordingGateway::new());
    let control = control_with(gateway.clone(), clean_load(60));

    control.start();
    tokio::time::sleep(Duration::from_secs(5)).await;
    control.stop();

    let sent = gateway.sent_count();
    assert!((4..=6).contains(&sent), "sent = {}", sent);
}

#[tokio::test(start_paused = true)]
async fn test_rate_change_applies_to_running_loop() {
    let gateway = Arc::new(RecordingGateway::new());
    let control = control_with(gateway.clone(), clean_load(60));

    control.start();
    tokio::time::sleep(Duration::from_millis(2500)).await;
    let before = gateway.sent_count();
    assert!((2..=3).contains(&before), "before = {}", before);

    control
        .update_config(&ConfigUpdate {
            rate_per_minute: Some(300),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(control.run_status(), RunStatus::Running);

    tokio::time::sleep(Duration::from_millis(2500)).await;
    control.stop();

    // At most three more at 60/min; at 300/min roughly ten.
    let after = gateway.sent_count() - before;
    assert!(after >= 8, "after = {}", after);
}

#[tokio::test(start_paused = true)]
async fn test_start_twice_runs_a_single_loop() {
    let gateway = Arc::new(RecordingGateway::new().with_delay(Duration::from_millis(100)));
    let control = control_with(gateway.clone(), clean_load(300));

    assert!(control.start());
    assert!(!control.start());

    // 100ms send + 200ms delay per iteration.
    tokio::time::sleep(Duration::from_secs(3)).await;
    control.stop();

    assert_eq!(gateway.max_in_flight(), 1);
    let calls = gateway.calls();
    assert!((9..=11).contains(&calls), "calls = {}", calls);
}

#[tokio::test(start_paused = true)]
async fn test_stop_returns_while_send_is_in_flight() {
    let gateway = Arc::new(RecordingGateway::new().with_delay(Duration::from_secs(1)));
    let control = control_with(gateway.clone(), clean_load(300));

    control.start();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(gateway.calls(), 1);

    assert!(control.stop());
    assert_eq!(control.run_status(), RunStatus::Stopped);
    assert_eq!(gateway.sent_count(), 0);

    tokio::time::sleep(Duration::from_secs(5)).await;

    // The in-flight send completed and nothing followed it.
    assert_eq!(gateway.sent_count(), 1);
    assert_eq!(gateway.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_restart_while_draining_never_overlaps() {
    let gateway = Arc::new(RecordingGateway::new().with_delay(Duration::from_secs(1)));
    let control = control_with(gateway.clone(), clean_load(300));

    control.start();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(control.stop());
    assert!(control.start());
    assert_eq!(control.run_status(), RunStatus::Running);

    // New loop is still waiting on the old one's send.
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(gateway.calls(), 1);

    tokio::time::sleep(Duration::from_secs(3)).await;
    control.stop();

    assert!(gateway.calls() > 1);
    assert_eq!(gateway.max_in_flight(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_waits_for_in_flight_send() {
    let gateway = Arc::new(RecordingGateway::new().with_delay(Duration::from_secs(1)));
    let control = control_with(gateway.clone(), clean_load(60));

    control.start();
    tokio::time::sleep(Duration::from_millis(100)).await;
    control.shutdown(Duration::from_secs(5)).await;

    assert_eq!(control.run_status(), RunStatus::Stopped);
    assert_eq!(gateway.sent_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_invoke_once_alongside_running_loop() {
    let gateway = Arc::new(RecordingGateway::new().with_delay(Duration::from_millis(50)));
    let control = control_with(gateway.clone(), clean_load(300));

    control.start();
    let outcomes = tokio::join!(
        control.invoke_once(),
        control.invoke_once(),
        control.invoke_once(),
    );
    control.stop();

    assert!(outcomes.0.sent && outcomes.1.sent && outcomes.2.sent);
    let singles = gateway
        .sent()
        .iter()
        .filter(|r| r.kind == MessageKind::Single)
        .count();
    assert_eq!(singles, 3);
    assert_eq!(control.status().stats.invocations, 3);
}

#[tokio::test]
async fn test_invoke_once_while_stopped() {
    let gateway = Arc::new(RecordingGateway::new());
    let control = control_with(gateway.clone(), clean_load(60));

    let outcome = control.invoke_once().await;

    assert!(outcome.sent);
    assert!(!outcome.message_id.is_nil());
    assert_eq!(control.run_status(), RunStatus::Stopped);
    assert_eq!(gateway.sent_count(), 1);
}

#[tokio::test]
async fn test_autostart_begins_running() {
    let mut config = test_config();
    config.load.autostart = true;
    let gateway = Arc::new(RecordingGateway::new());

    let control = startup::assemble(gateway, &config);
    assert_eq!(control.run_status(), RunStatus::Running);

    control.shutdown(Duration::from_secs(1)).await;
    assert_eq!(control.run_status(), RunStatus::Stopped);
}
