// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Error codes for the JSON API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApiError {
    CameraNotFound,
    BadRequest,
    Internal,
}

impl ApiError {
    pub fn http_status(&self) -> u16 {
        match self {
            Self::CameraNotFound => 404,
            Self::BadRequest => 400,
            Self::Internal => 500,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CameraNotFound => "CAMERA_NOT_FOUND",
            Self::BadRequest => "BAD_REQUEST",
            Self::Internal => "INTERNAL",
        }
    }

    pub fn to_error_body(&self, message: impl Into<String>) -> ErrorBody {
        ErrorBody { code: self.as_str().to_owned(), message: message.into() }
    }

    pub fn to_http_response(
        &self,
        message: impl Into<String>,
    ) -> (StatusCode, Json<ErrorResponse>) {
        let status =
            StatusCode::from_u16(self.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = ErrorResponse { error: self.to_error_body(message) };
        (status, Json(body))
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Top-level error response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

/// Error body with machine-readable code and human-readable message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

/// Detector failure on a single frame. The frame is skipped; the worker
/// continues.
#[derive(Debug, thiserror::Error)]
#[error("detector failed: {0}")]
pub struct ModelError(pub String);

/// Failures inside a camera worker.
#[derive(Debug, thiserror::Error)]
pub enum CameraError {
    /// Video source cannot be opened or read after one rewind. Terminates
    /// the owning worker only; the camera is marked degraded.
    #[error("video source error: {0}")]
    Source(String),

    #[error(transparent)]
    Model(#[from] ModelError),

    /// JPEG encode failed for one frame; publishing is skipped.
    #[error("jpeg encode error: {0}")]
    Encode(String),
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
