// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP surface: JSON endpoints, MJPEG streams, dashboard page.

pub mod http;
pub mod mjpeg;

use std::sync::Arc;

use axum::response::Html;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::state::AppState;

/// Embedded dashboard HTML.
const DASHBOARD_HTML: &str = include_str!("../../web/dashboard.html");

/// Build the axum `Router` with all routes.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Dashboard (boundary; rendering is not part of the core)
        .route("/dashboard", get(|| async { Html(DASHBOARD_HTML) }))
        // Video
        .route("/video_feed/{camera_id}", get(mjpeg::video_feed))
        // Realtime JSON
        .route("/api/health", get(http::health))
        .route("/api/detection_data", get(http::detection_data))
        .route("/api/camera_data/{camera_id}", get(http::camera_data))
        .route("/api/semaphore_data", get(http::semaphore_data))
        // Control
        .route("/toggle_processing", post(http::toggle_processing))
        // Middleware
        .layer(CorsLayer::permissive())
        .with_state(state)
}
