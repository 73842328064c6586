// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! MJPEG endpoint.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::IntoResponse;

use crate::broadcast;
use crate::config::NUM_CAMERAS;
use crate::error::ApiError;
use crate::state::AppState;

/// Longest single wait on the mailbox before it counts as a miss.
const FRAME_WAIT: Duration = Duration::from_secs(1);

/// `GET /video_feed/{camera_id}` — `multipart/x-mixed-replace` stream.
///
/// While processing runs, parts come from the camera mailbox (annotated
/// frames). While stopped, raw frames are read straight from the configured
/// source with a "processing disabled" banner.
pub async fn video_feed(
    State(s): State<Arc<AppState>>,
    Path(camera_id): Path<usize>,
) -> impl IntoResponse {
    if camera_id >= NUM_CAMERAS {
        return ApiError::CameraNotFound
            .to_http_response(format!("camera {camera_id} out of range"))
            .into_response();
    }

    let cancel = s.shutdown.child_token();
    let body = if s.store.is_processing() {
        let reader = s.mailboxes[camera_id].subscribe();
        Body::from_stream(broadcast::live_stream(reader, FRAME_WAIT, cancel))
    } else {
        let spec = s.config.video_paths()[camera_id].to_owned();
        Body::from_stream(broadcast::idle_stream(spec, s.config.frame_interval(), cancel))
    };

    ([(header::CONTENT_TYPE, broadcast::CONTENT_TYPE)], body).into_response()
}
