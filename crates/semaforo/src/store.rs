// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process-wide realtime state: per-camera counts, light state, emergency
//! mode.
//!
//! Each camera row has exactly one writer (its worker) and many readers;
//! rows are replaced whole under a per-row lock so a read always returns
//! field values from a single write. Light and emergency snapshots have a
//! single writer (the signal controller).

use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::config::NUM_CAMERAS;
use crate::vehicle::{ClassCounts, CongestionLevel, CongestionThresholds};

/// Return current epoch millis.
pub fn epoch_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

// -- Light groups -------------------------------------------------------------

/// One of the two conflicting light groups.
///
/// G1 controls approaches {0, 2}; G2 controls {1, 3}. At most one group is
/// green or yellow at any instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LightGroup {
    G1,
    G2,
}

impl LightGroup {
    pub const BOTH: [LightGroup; 2] = [Self::G1, Self::G2];

    pub fn sibling(self) -> LightGroup {
        match self {
            Self::G1 => Self::G2,
            Self::G2 => Self::G1,
        }
    }

    pub fn cameras(self) -> [usize; 2] {
        match self {
            Self::G1 => [0, 2],
            Self::G2 => [1, 3],
        }
    }

    pub fn of_camera(camera_id: usize) -> LightGroup {
        if camera_id % 2 == 0 {
            Self::G1
        } else {
            Self::G2
        }
    }

    pub fn index(self) -> usize {
        match self {
            Self::G1 => 0,
            Self::G2 => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::G1 => "group_1",
            Self::G2 => "group_2",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LightColor {
    Red,
    Yellow,
    Green,
}

impl LightColor {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Yellow => "yellow",
            Self::Green => "green",
        }
    }
}

// -- Snapshots ----------------------------------------------------------------

/// Per-camera realtime detection state, reflecting the latest processed
/// frame only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraState {
    pub camera_id: usize,
    #[serde(flatten)]
    pub counts: ClassCounts,
    pub total: u32,
    pub weighted_total: f64,
    pub last_update_ms: u64,
    pub degraded: bool,
}

impl CameraState {
    pub fn zero(camera_id: usize) -> Self {
        Self {
            camera_id,
            counts: ClassCounts::default(),
            total: 0,
            weighted_total: 0.0,
            last_update_ms: 0,
            degraded: false,
        }
    }

    pub fn from_counts(camera_id: usize, counts: ClassCounts) -> Self {
        Self {
            camera_id,
            counts,
            total: counts.total(),
            weighted_total: counts.weighted_total(),
            last_update_ms: epoch_ms(),
            degraded: false,
        }
    }
}

/// Published state of one light group.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroupLightState {
    pub current_color: LightColor,
    pub deadline_epoch_ms: u64,
}

/// Both groups, written atomically by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LightsState {
    pub group_1: GroupLightState,
    pub group_2: GroupLightState,
}

impl LightsState {
    pub fn all_red() -> Self {
        let red = GroupLightState { current_color: LightColor::Red, deadline_epoch_ms: 0 };
        Self { group_1: red, group_2: red }
    }

    pub fn group(&self, g: LightGroup) -> GroupLightState {
        match g {
            LightGroup::G1 => self.group_1,
            LightGroup::G2 => self.group_2,
        }
    }
}

/// Ambulance pre-emption state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmergencyState {
    pub active: bool,
    pub emergency_camera: Option<usize>,
    pub end_time_epoch_ms: u64,
}

impl EmergencyState {
    pub fn inactive() -> Self {
        Self { active: false, emergency_camera: None, end_time_epoch_ms: 0 }
    }
}

/// Dashboard-wide aggregates across all cameras.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardTotals {
    pub total_vehicles: u32,
    pub type_totals: ClassCounts,
    pub congestion_level: CongestionLevel,
}

// -- Store --------------------------------------------------------------------

/// Shared realtime store. Cheap to read; every aggregate is
/// O(cameras × classes).
pub struct StateStore {
    rows: [RwLock<CameraState>; NUM_CAMERAS],
    lights: RwLock<LightsState>,
    emergency: RwLock<EmergencyState>,
    processing: AtomicBool,
    thresholds: CongestionThresholds,
}

impl StateStore {
    pub fn new(thresholds: CongestionThresholds) -> Self {
        Self {
            rows: std::array::from_fn(|id| RwLock::new(CameraState::zero(id))),
            lights: RwLock::new(LightsState::all_red()),
            emergency: RwLock::new(EmergencyState::inactive()),
            processing: AtomicBool::new(false),
            thresholds,
        }
    }

    pub fn thresholds(&self) -> CongestionThresholds {
        self.thresholds
    }

    /// Consistent snapshot of one camera row.
    pub fn get_camera(&self, camera_id: usize) -> Option<CameraState> {
        self.rows.get(camera_id).map(|row| row.read().clone())
    }

    /// Snapshot of all rows. Each row is individually atomic; no cross-row
    /// consistency is promised.
    pub fn snapshot_all(&self) -> Vec<CameraState> {
        self.rows.iter().map(|row| row.read().clone()).collect()
    }

    /// Replace one row. Called only by the owning camera worker.
    pub fn update(&self, camera_id: usize, state: CameraState) {
        if let Some(row) = self.rows.get(camera_id) {
            *row.write() = state;
        }
    }

    /// Zero a row and flag it degraded (source lost).
    pub fn mark_degraded(&self, camera_id: usize) {
        if let Some(row) = self.rows.get(camera_id) {
            let mut state = CameraState::zero(camera_id);
            state.degraded = true;
            state.last_update_ms = epoch_ms();
            *row.write() = state;
        }
    }

    /// Reset every row to zeros (processing start).
    pub fn reset_rows(&self) {
        for (id, row) in self.rows.iter().enumerate() {
            *row.write() = CameraState::zero(id);
        }
    }

    pub fn set_lights(&self, lights: LightsState) {
        *self.lights.write() = lights;
    }

    pub fn get_lights(&self) -> LightsState {
        *self.lights.read()
    }

    pub fn set_emergency(&self, emergency: EmergencyState) {
        *self.emergency.write() = emergency;
    }

    pub fn get_emergency(&self) -> EmergencyState {
        *self.emergency.read()
    }

    pub fn set_processing(&self, on: bool) {
        self.processing.store(on, Ordering::Release);
    }

    pub fn is_processing(&self) -> bool {
        self.processing.load(Ordering::Acquire)
    }

    /// Weighted congestion of one group's two approaches.
    pub fn group_congestion(&self, group: LightGroup) -> CongestionLevel {
        let weighted: f64 = group
            .cameras()
            .iter()
            .filter_map(|&id| self.get_camera(id))
            .map(|c| c.weighted_total)
            .sum();
        self.thresholds.level(weighted)
    }

    /// Sums across all cameras; the overall congestion level uses the group
    /// thresholds scaled by the number of groups.
    pub fn dashboard_totals(&self) -> DashboardTotals {
        let mut type_totals = ClassCounts::default();
        let mut weighted = 0.0;
        for row in self.snapshot_all() {
            type_totals.add(&row.counts);
            weighted += row.weighted_total;
        }
        DashboardTotals {
            total_vehicles: type_totals.total(),
            type_totals,
            congestion_level: self.thresholds.level_scaled(weighted, LightGroup::BOTH.len() as f64),
        }
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
