// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Signal controller — the single task driving the two-group light state
//! machine from realtime congestion.

pub mod plan;

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::store::{
    epoch_ms, EmergencyState, GroupLightState, LightGroup, LightsState, StateStore,
};

use plan::{LightPlan, TickInput, Timings};

/// Tick interval for the control loop.
const TICK: Duration = Duration::from_secs(1);

/// Ambulance pre-emption bookkeeping, owned by the controller.
#[derive(Debug, Clone, Copy)]
struct Emergency {
    camera: usize,
    group: LightGroup,
    until: Instant,
}

pub struct SignalController {
    store: Arc<StateStore>,
    timings: Timings,
    shutdown: CancellationToken,
}

impl SignalController {
    pub fn new(store: Arc<StateStore>, timings: Timings, shutdown: CancellationToken) -> Self {
        Self { store, timings, shutdown }
    }

    /// Spawn the control loop as a background task.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    async fn run(self) {
        let mut timer = tokio::time::interval(TICK);
        timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        let now = Instant::now();
        let g2_green = plan::green_duration(
            self.store.group_congestion(LightGroup::G2),
            self.store.group_congestion(LightGroup::G1),
            &self.timings,
        );
        let mut plan = LightPlan::initial(now, g2_green);
        let mut emergency: Option<Emergency> = None;

        self.publish(&plan, emergency, now);
        tracing::info!(g2_green_secs = g2_green.as_secs(), "signal controller started");

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => break,
                _ = timer.tick() => {}
            }

            let now = Instant::now();
            emergency = self.scan_emergency(emergency, now);

            let input = TickInput {
                now,
                congestion: [
                    self.store.group_congestion(LightGroup::G1),
                    self.store.group_congestion(LightGroup::G2),
                ],
                emergency: emergency.map(|e| e.group),
                hold_green_until: emergency.map(|e| e.until),
            };

            for t in plan.step(&input, &self.timings) {
                tracing::info!(
                    group = t.group.as_str(),
                    from = t.from.as_str(),
                    to = t.to.as_str(),
                    "light transition"
                );
            }

            self.publish(&plan, emergency, now);
        }

        tracing::debug!("signal controller stopped");
    }

    /// Enter or refresh emergency mode while any camera sees an ambulance;
    /// clear it only after expiry once no ambulance remains.
    fn scan_emergency(&self, current: Option<Emergency>, now: Instant) -> Option<Emergency> {
        let sighting = self
            .store
            .snapshot_all()
            .into_iter()
            .find(|row| row.counts.ambulance > 0)
            .map(|row| row.camera_id);

        match (current, sighting) {
            (_, Some(camera)) => {
                let group = LightGroup::of_camera(camera);
                if current.map(|e| e.camera) != Some(camera) {
                    tracing::warn!(camera, group = group.as_str(), "emergency mode active");
                }
                Some(Emergency { camera, group, until: now + self.timings.emergency_hold })
            }
            (Some(e), None) if now < e.until => Some(e),
            (Some(e), None) => {
                tracing::info!(camera = e.camera, "emergency mode cleared");
                None
            }
            (None, None) => None,
        }
    }

    /// Publish reader-facing light and emergency snapshots.
    fn publish(&self, plan: &LightPlan, emergency: Option<Emergency>, now: Instant) {
        let wall = epoch_ms();
        let group_state = |g: LightGroup| {
            let gp = plan.group(g);
            let deadline_epoch_ms = match gp.next {
                Some(pending) => {
                    wall + pending.at.saturating_duration_since(now).as_millis() as u64
                }
                None => wall,
            };
            GroupLightState { current_color: gp.color, deadline_epoch_ms }
        };

        self.store.set_lights(LightsState {
            group_1: group_state(LightGroup::G1),
            group_2: group_state(LightGroup::G2),
        });
        self.store.set_emergency(match emergency {
            Some(e) => EmergencyState {
                active: true,
                emergency_camera: Some(e.camera),
                end_time_epoch_ms: wall + e.until.saturating_duration_since(now).as_millis() as u64,
            },
            None => EmergencyState::inactive(),
        });
    }
}

#[cfg(test)]
#[path = "controller_tests.rs"]
mod tests;
