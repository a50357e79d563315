//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::sync::Arc;

use telemetry_loadgen::config::AppConfig;
use telemetry_loadgen::engine::{ControlSurface, EngineOptions, FaultInjector, LoadConfig};
use telemetry_loadgen::gateway::RecordingGateway;
use telemetry_loadgen::http::HttpServer;
use telemetry_loadgen::lifecycle::Shutdown;
use tokio::net::TcpListener;

/// Config that passes startup validation.
#[allow(dead_code)]
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.queue.url = Some("http://localhost:4566/000000000000/loadgen-test".into());
    config
}

/// Control surface over `gateway` with a fixed seed and the given traffic shape.
#[allow(dead_code)]
pub fn control_with(gateway: Arc<RecordingGateway>, initial: LoadConfig) -> Arc<ControlSurface> {
    let options = EngineOptions {
        initial,
        ..Default::default()
    };
    Arc::new(ControlSurface::with_faults(gateway, options, FaultInjector::seeded(42)))
}

/// Fault-free traffic at `rate_per_minute`.
#[allow(dead_code)]
pub fn clean_load(rate_per_minute: u32) -> LoadConfig {
    LoadConfig {
        rate_per_minute,
        failure_rate_pct: 0,
        latency_ms: 0,
        corruption_pct: 0,
    }
}

/// A running control server on an ephemeral port.
#[allow(dead_code)]
pub struct TestServer {
    pub addr: SocketAddr,
    pub control: Arc<ControlSurface>,
    pub gateway: Arc<RecordingGateway>,
    pub shutdown: Shutdown,
}

#[allow(dead_code)]
impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.control.stop();
        self.shutdown.trigger();
    }
}

/// Start the HTTP server around a recording gateway.
#[allow(dead_code)]
pub async fn start_server(config: AppConfig) -> TestServer {
    let gateway = Arc::new(RecordingGateway::new());
    let control = Arc::new(ControlSurface::with_faults(
        gateway.clone(),
        EngineOptions::from_config(&config),
        FaultInjector::seeded(42),
    ));

    let listener = TcpListener::bind(&config.listener.bind_address).await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(control.clone(), &config);
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    TestServer {
        addr,
        control,
        gateway,
        shutdown,
    }
}
