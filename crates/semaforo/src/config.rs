// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::time::Duration;

use crate::vehicle::CongestionThresholds;

/// Number of approaches (and cameras) at the intersection.
pub const NUM_CAMERAS: usize = 4;

/// Configuration for the intersection controller.
#[derive(Debug, Clone, clap::Parser)]
#[command(name = "semaforo", version, about = "Adaptive urban-intersection controller.")]
pub struct Config {
    /// Host to bind on.
    #[arg(long, default_value = "0.0.0.0", env = "HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(long, default_value_t = 5000, env = "PORT")]
    pub port: u16,

    /// Video source for approach 0 (file path or `synthetic:<seed>`).
    #[arg(long, default_value = "synthetic:0", env = "VIDEO_PATH_0")]
    pub video_path_0: String,

    /// Video source for approach 1.
    #[arg(long, default_value = "synthetic:1", env = "VIDEO_PATH_1")]
    pub video_path_1: String,

    /// Video source for approach 2.
    #[arg(long, default_value = "synthetic:2", env = "VIDEO_PATH_2")]
    pub video_path_2: String,

    /// Video source for approach 3.
    #[arg(long, default_value = "synthetic:3", env = "VIDEO_PATH_3")]
    pub video_path_3: String,

    /// Use a real detector model instead of the synthetic mock.
    #[arg(long, env = "USE_DETECTOR")]
    pub use_detector: bool,

    /// Path to the detector model weights (only read when --use-detector).
    #[arg(long, env = "DETECTOR_MODEL_PATH")]
    pub detector_model_path: Option<String>,

    /// Minimum detection confidence; lower-confidence boxes are dropped.
    #[arg(long, default_value_t = 0.5, env = "CONFIDENCE_THRESHOLD")]
    pub confidence_threshold: f32,

    /// Target frames per second per camera worker.
    #[arg(long, default_value_t = 30, env = "TARGET_FPS")]
    pub target_fps: u32,

    /// Frames to average per-class counts over (1 = instantaneous).
    #[arg(long, default_value_t = 1, env = "COUNT_SMOOTHING")]
    pub count_smoothing: usize,

    /// Minimum green phase in seconds.
    #[arg(long, default_value_t = 10, env = "GREEN_MIN")]
    pub green_min: u64,

    /// Maximum green phase in seconds.
    #[arg(long, default_value_t = 60, env = "GREEN_MAX")]
    pub green_max: u64,

    /// Yellow phase in seconds.
    #[arg(long, default_value_t = 5, env = "YELLOW")]
    pub yellow: u64,

    /// All-red interlock between group changes, in seconds.
    #[arg(long, default_value_t = 3, env = "ALL_RED")]
    pub all_red: u64,

    /// How long emergency mode persists after the last ambulance sighting,
    /// in seconds.
    #[arg(long, default_value_t = 15, env = "EMERGENCY_HOLD")]
    pub emergency_hold: u64,

    /// Minimum green granted to the emergency group, in seconds.
    #[arg(long, default_value_t = 10, env = "EMERGENCY_MIN_GREEN")]
    pub emergency_min_green: u64,

    /// Per-group weighted total at or above which congestion is medium.
    #[arg(long, default_value_t = 8.0, env = "CONGESTION_MEDIUM")]
    pub congestion_medium: f64,

    /// Per-group weighted total at or above which congestion is high.
    #[arg(long, default_value_t = 25.0, env = "CONGESTION_HIGH")]
    pub congestion_high: f64,

    /// Start processing as soon as the server boots.
    #[arg(long, default_value_t = true, env = "AUTOSTART", action = clap::ArgAction::Set)]
    pub autostart: bool,

    /// Log format (json or text).
    #[arg(long, default_value = "text", env = "LOG_FORMAT")]
    pub log_format: String,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info", env = "LOG_LEVEL")]
    pub log_level: String,
}

impl Config {
    /// Validate the configuration after parsing.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.green_min == 0 || self.green_min > self.green_max {
            anyhow::bail!(
                "green timings out of order: GREEN_MIN={} GREEN_MAX={}",
                self.green_min,
                self.green_max
            );
        }
        if self.yellow == 0 || self.all_red == 0 {
            anyhow::bail!("YELLOW and ALL_RED must be non-zero");
        }
        if self.target_fps == 0 {
            anyhow::bail!("TARGET_FPS must be non-zero");
        }
        if self.count_smoothing == 0 {
            anyhow::bail!("COUNT_SMOOTHING must be at least 1");
        }
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            anyhow::bail!(
                "CONFIDENCE_THRESHOLD must be in [0, 1], got {}",
                self.confidence_threshold
            );
        }
        if self.congestion_medium <= 0.0 || self.congestion_medium >= self.congestion_high {
            anyhow::bail!(
                "congestion thresholds out of order: medium={} high={}",
                self.congestion_medium,
                self.congestion_high
            );
        }
        if self.use_detector && self.detector_model_path.is_none() {
            anyhow::bail!("--use-detector requires DETECTOR_MODEL_PATH");
        }
        Ok(())
    }

    pub fn video_paths(&self) -> [&str; NUM_CAMERAS] {
        [&self.video_path_0, &self.video_path_1, &self.video_path_2, &self.video_path_3]
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.target_fps))
    }

    pub fn thresholds(&self) -> CongestionThresholds {
        CongestionThresholds { medium: self.congestion_medium, high: self.congestion_high }
    }

    pub fn green_min_duration(&self) -> Duration {
        Duration::from_secs(self.green_min)
    }

    pub fn green_max_duration(&self) -> Duration {
        Duration::from_secs(self.green_max)
    }

    pub fn yellow_duration(&self) -> Duration {
        Duration::from_secs(self.yellow)
    }

    pub fn all_red_duration(&self) -> Duration {
        Duration::from_secs(self.all_red)
    }

    pub fn emergency_hold_duration(&self) -> Duration {
        Duration::from_secs(self.emergency_hold)
    }

    pub fn emergency_min_green_duration(&self) -> Duration {
        Duration::from_secs(self.emergency_min_green)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
