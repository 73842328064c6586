// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! JSON handlers for the realtime API.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use crate::config::NUM_CAMERAS;
use crate::error::ApiError;
use crate::state::AppState;
use crate::store::{CameraState, DashboardTotals, EmergencyState, GroupLightState, LightGroup};
use crate::vehicle::CongestionLevel;

// -- Response types -----------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub processing: bool,
    pub cameras: usize,
}

#[derive(Debug, Serialize)]
pub struct GroupCongestion {
    pub group_1: CongestionLevel,
    pub group_2: CongestionLevel,
}

#[derive(Debug, Serialize)]
pub struct DetectionDataResponse {
    pub dashboard_totals: DashboardTotals,
    /// Keyed `camera_0` … `camera_3`.
    pub cameras_data: BTreeMap<String, CameraState>,
    pub group_congestion: GroupCongestion,
    pub processing: bool,
}

#[derive(Debug, Serialize)]
pub struct CameraDataResponse {
    pub camera_id: usize,
    pub detection_data: CameraState,
    pub congestion_level: CongestionLevel,
}

#[derive(Debug, Serialize)]
pub struct SemaphoreStates {
    pub group_1: GroupLightState,
    pub group_2: GroupLightState,
}

#[derive(Debug, Serialize)]
pub struct SemaphoreDataResponse {
    pub semaphore_states: SemaphoreStates,
    pub emergency_mode: EmergencyState,
    pub group_congestion: GroupCongestion,
}

#[derive(Debug, Serialize)]
pub struct ToggleResponse {
    pub processing: bool,
}

fn group_congestion(state: &AppState) -> GroupCongestion {
    GroupCongestion {
        group_1: state.store.group_congestion(LightGroup::G1),
        group_2: state.store.group_congestion(LightGroup::G2),
    }
}

// -- Handlers -----------------------------------------------------------------

/// `GET /api/health`
pub async fn health(State(s): State<Arc<AppState>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "running".to_owned(),
        processing: s.store.is_processing(),
        cameras: NUM_CAMERAS,
    })
}

/// `GET /api/detection_data` — dashboard totals plus every camera row.
pub async fn detection_data(State(s): State<Arc<AppState>>) -> impl IntoResponse {
    let cameras_data = s
        .store
        .snapshot_all()
        .into_iter()
        .map(|row| (format!("camera_{}", row.camera_id), row))
        .collect();

    Json(DetectionDataResponse {
        dashboard_totals: s.store.dashboard_totals(),
        cameras_data,
        group_congestion: group_congestion(&s),
        processing: s.store.is_processing(),
    })
}

/// `GET /api/camera_data/{camera_id}` — one camera row.
pub async fn camera_data(
    State(s): State<Arc<AppState>>,
    Path(camera_id): Path<usize>,
) -> impl IntoResponse {
    let Some(row) = s.store.get_camera(camera_id) else {
        return ApiError::CameraNotFound
            .to_http_response(format!("camera {camera_id} out of range"))
            .into_response();
    };

    let congestion_level = s.store.thresholds().level(row.weighted_total);
    Json(CameraDataResponse { camera_id, detection_data: row, congestion_level }).into_response()
}

/// `GET /api/semaphore_data` — light state, emergency mode, congestion.
pub async fn semaphore_data(State(s): State<Arc<AppState>>) -> impl IntoResponse {
    let lights = s.store.get_lights();
    Json(SemaphoreDataResponse {
        semaphore_states: SemaphoreStates { group_1: lights.group_1, group_2: lights.group_2 },
        emergency_mode: s.store.get_emergency(),
        group_congestion: group_congestion(&s),
    })
}

/// `POST /toggle_processing` — start or stop the processing group.
pub async fn toggle_processing(State(s): State<Arc<AppState>>) -> impl IntoResponse {
    let processing = s.supervisor.toggle(&s).await;
    Json(ToggleResponse { processing })
}

#[cfg(test)]
#[path = "http_tests.rs"]
mod tests;
