//! Fault injection tests.
//!
//! Drives the run loop against a recording gateway on a paused clock and
//! checks that each fault knob has the effect it advertises.

mod common;

use std::sync::Arc;
use std::time::Duration;

use telemetry_loadgen::engine::{is_well_formed, LoadConfig, MessageKind, RunStatus};
use telemetry_loadgen::gateway::RecordingGateway;

use common::{clean_load, control_with};

/// 300/min gives a 200ms delay, so a 2s window holds about ten iterations.
const FAST_RATE: u32 = 300;

#[tokio::test(start_paused = true)]
async fn test_full_failure_rate_never_reaches_gateway() {
    let gateway = Arc::new(RecordingGateway::new());
    let control = control_with(
        gateway.clone(),
        LoadConfig {
            failure_rate_pct: 100,
            ..clean_load(FAST_RATE)
        },
    );

    control.start();
    tokio::time::sleep(Duration::from_secs(2)).await;
    control.stop();

    let stats = control.status().stats;
    assert_eq!(gateway.calls(), 0);
    assert!(stats.iterations >= 9, "iterations = {}", stats.iterations);
    assert_eq!(stats.synthetic_failures, stats.iterations);
    assert_eq!(stats.sent, 0);
    assert_eq!(stats.send_errors, 0);
}

#[tokio::test(start_paused = true)]
async fn test_zero_failure_rate_sends_every_iteration() {
    let gateway = Arc::new(RecordingGateway::new());
    let control = control_with(gateway.clone(), clean_load(FAST_RATE));

    control.start();
    tokio::time::sleep(Duration::from_secs(2)).await;
    control.stop();

    let stats = control.status().stats;
    assert!(stats.iterations >= 9);
    assert_eq!(stats.synthetic_failures, 0);
    assert_eq!(gateway.sent_count() as u64, stats.iterations);
    assert_eq!(stats.sent, stats.iterations);
}

#[tokio::test(start_paused = true)]
async fn test_full_corruption_breaks_every_body() {
    let gateway = Arc::new(RecordingGateway::new());
    let control = control_with(
        gateway.clone(),
        LoadConfig {
            corruption_pct: 100,
            ..clean_load(FAST_RATE)
        },
    );

    control.start();
    tokio::time::sleep(Duration::from_secs(2)).await;
    control.stop();

    let sent = gateway.sent();
    assert!(!sent.is_empty());
    for record in &sent {
        assert_eq!(record.kind, MessageKind::Corrupted);
        assert!(!is_well_formed(&record.body), "body parsed: {}", record.body);
    }
    assert_eq!(control.status().stats.corrupted, sent.len() as u64);
}

#[tokio::test(start_paused = true)]
async fn test_zero_corruption_keeps_bodies_well_formed() {
    let gateway = Arc::new(RecordingGateway::new());
    let control = control_with(gateway.clone(), clean_load(FAST_RATE));

    control.start();
    tokio::time::sleep(Duration::from_secs(2)).await;
    control.stop();

    let sent = gateway.sent();
    assert!(!sent.is_empty());
    for record in &sent {
        assert_eq!(record.kind, MessageKind::Loop);
        assert!(is_well_formed(&record.body));
    }
    assert_eq!(control.status().stats.corrupted, 0);
}

#[tokio::test(start_paused = true)]
async fn test_gateway_errors_do_not_stop_the_loop() {
    let gateway = Arc::new(RecordingGateway::failing("queue does not exist"));
    let control = control_with(gateway.clone(), clean_load(FAST_RATE));

    control.start();
    tokio::time::sleep(Duration::from_secs(2)).await;

    assert_eq!(control.run_status(), RunStatus::Running);
    let stats = control.status().stats;
    assert!(stats.send_errors >= 9, "send_errors = {}", stats.send_errors);
    assert_eq!(stats.sent, 0);
    assert_eq!(gateway.calls() as u64, stats.send_errors);

    control.stop();
}

#[tokio::test(start_paused = true)]
async fn test_latency_is_added_before_each_send() {
    let gateway = Arc::new(RecordingGateway::new());
    // 1s delay + 1s latency: one send every 2s, first one at t=1s.
    let control = control_with(
        gateway.clone(),
        LoadConfig {
            latency_ms: 1000,
            ..clean_load(60)
        },
    );

    control.start();
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(gateway.calls(), 0);

    tokio::time::sleep(Duration::from_millis(4000)).await;
    control.stop();

    // Sends at t=1s and t=3s.
    assert_eq!(gateway.calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_stop_interrupts_injected_latency() {
    let gateway = Arc::new(RecordingGateway::new());
    let control = control_with(
        gateway.clone(),
        LoadConfig {
            latency_ms: 60_000,
            ..clean_load(60)
        },
    );

    control.start();
    tokio::time::sleep(Duration::from_millis(100)).await;
    control.stop();
    control.shutdown(Duration::from_secs(1)).await;

    assert_eq!(gateway.calls(), 0);
}

#[tokio::test]
async fn test_invoke_once_ignores_fault_settings() {
    let gateway = Arc::new(RecordingGateway::new());
    let control = control_with(
        gateway.clone(),
        LoadConfig {
            rate_per_minute: 60,
            failure_rate_pct: 100,
            latency_ms: 60_000,
            corruption_pct: 100,
        },
    );

    let outcome = control.invoke_once().await;
    assert!(outcome.sent);
    assert!(outcome.error.is_none());

    let sent = gateway.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].message_id, outcome.message_id);
    assert_eq!(sent[0].kind, MessageKind::Single);
    assert!(is_well_formed(&sent[0].body));
}

#[tokio::test]
async fn test_invoke_once_reports_gateway_failure() {
    let gateway = Arc::new(RecordingGateway::failing("access denied"));
    let control = control_with(gateway.clone(), clean_load(60));

    let outcome = control.invoke_once().await;
    assert!(!outcome.sent);
    assert!(outcome.external_id.is_none());
    assert!(outcome.error.unwrap().contains("access denied"));
    assert_eq!(control.status().stats.invocations, 1);
    assert_eq!(control.run_status(), RunStatus::Stopped);
}
