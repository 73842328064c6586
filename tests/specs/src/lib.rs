// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Test harness for end-to-end controller scenarios.
//!
//! Builds the full application in-process (scripted detectors, synthetic
//! sources, real supervisor, controller, and HTTP router) and drives it
//! under a paused tokio clock so multi-minute light cycles run instantly.

use std::sync::Arc;
use std::time::Duration;

use axum_test::TestServer;
use clap::Parser;
use tokio_util::sync::CancellationToken;

use semaforo::config::Config;
use semaforo::detect::{Detector, ScriptedDetector};
use semaforo::state::AppState;
use semaforo::transport::build_router;
use semaforo::vehicle::ClassCounts;

pub struct Rig {
    pub server: TestServer,
    pub app: Arc<AppState>,
    pub detectors: Vec<Arc<ScriptedDetector>>,
}

/// Build a stopped application with scripted detectors. Extra CLI args are
/// appended after the low-FPS test defaults.
pub fn rig(extra_args: &[&str]) -> anyhow::Result<Rig> {
    let mut argv = vec!["semaforo", "--autostart", "false", "--target-fps", "2"];
    argv.extend_from_slice(extra_args);
    let config = Config::try_parse_from(argv)?;
    config.validate()?;

    let detectors: Vec<Arc<ScriptedDetector>> =
        (0..4).map(|_| Arc::new(ScriptedDetector::new())).collect();
    let dyn_detectors: Vec<Arc<dyn Detector>> =
        detectors.iter().map(|d| Arc::clone(d) as Arc<dyn Detector>).collect();

    let app = AppState::with_detectors(config, dyn_detectors, CancellationToken::new());
    let server = TestServer::new(build_router(Arc::clone(&app)))
        .map_err(|e| anyhow::anyhow!("test server: {e}"))?;
    Ok(Rig { server, app, detectors })
}

impl Rig {
    /// `POST /toggle_processing`, returning the new processing state.
    pub async fn toggle(&self) -> bool {
        let body: serde_json::Value = self.server.post("/toggle_processing").await.json();
        body["processing"].as_bool().unwrap_or(false)
    }

    pub async fn semaphore_data(&self) -> serde_json::Value {
        self.server.get("/api/semaphore_data").await.json()
    }

    pub async fn detection_data(&self) -> serde_json::Value {
        self.server.get("/api/detection_data").await.json()
    }

    pub async fn color(&self, group: &str) -> String {
        self.semaphore_data().await["semaphore_states"][group]["current_color"]
            .as_str()
            .unwrap_or_default()
            .to_owned()
    }

    pub fn set_counts(&self, camera_id: usize, counts: ClassCounts) {
        self.detectors[camera_id].set(counts);
    }

    /// Advance the paused clock second by second until `group` shows
    /// `color`, returning the seconds waited. Fails after `cap` seconds.
    pub async fn wait_for_color(&self, group: &str, color: &str, cap: u64) -> anyhow::Result<u64> {
        for second in 0..=cap {
            if self.color(group).await == color {
                return Ok(second);
            }
            tokio::time::sleep(Duration::from_secs(1)).await;
        }
        let state = self.semaphore_data().await;
        anyhow::bail!("{group} never became {color} within {cap}s: {state}");
    }
}

/// Advance the paused clock.
pub async fn advance(seconds: u64) {
    tokio::time::sleep(Duration::from_secs(seconds)).await;
}
