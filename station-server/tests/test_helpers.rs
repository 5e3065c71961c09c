#![allow(dead_code)]

use station_core::{Engine, EngineConfig, ManualClock};
use station_server::station_manager::{StartRequest, StationManager};
use std::sync::Arc;
use tokio::sync::mpsc;

pub const T0: u64 = 1_700_000_000_000;

/// Test setup that provides a manager on a manual clock plus its outbound queue
pub struct TestStationSetup {
    pub manager: Arc<StationManager>,
    pub outbound: mpsc::UnboundedReceiver<String>,
    pub clock: ManualClock,
}

impl TestStationSetup {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        let clock = ManualClock::new(T0);
        let engine = Engine::new(config, Arc::new(clock.clone()));
        let (manager, outbound) = StationManager::new(engine);

        Self {
            manager: Arc::new(manager),
            outbound,
            clock,
        }
    }

    /// Starts a session with a one minute debounce and five minute code interval
    pub async fn start_session(&self) {
        self.manager
            .start(StartRequest {
                debounce_window_ms: Some(60_000),
                code_interval_ms: Some(300_000),
            })
            .await
            .unwrap();
    }

    /// Drains everything queued for the stations so far
    pub fn drain_outbound(&mut self) -> Vec<String> {
        let mut lines = Vec::new();
        while let Ok(line) = self.outbound.try_recv() {
            lines.push(line);
        }
        lines
    }
}

pub fn tag_fields(bytes: [u8; 8]) -> String {
    bytes
        .iter()
        .map(|b| b.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

pub fn tag_hex(bytes: [u8; 8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

pub fn enrollment_line(bytes: [u8; 8]) -> String {
    format!("#R:0,0,0,0,0,{}\n", tag_fields(bytes))
}

pub fn scan_line(box_id: u32, bytes: [u8; 8]) -> String {
    format!("#T:{},0,0,0,0,{}\n", box_id, tag_fields(bytes))
}
