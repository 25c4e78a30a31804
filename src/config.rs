//! Runtime configuration, loadable from JSON.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::ports::DetectorKind;

/// Tracking pipeline settings.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct MotConfig {
    /// Which detector backend the application should construct.
    pub detector_kind: DetectorKind,
    /// Run the detector every N-th frame, flow-only updates in between.
    pub detector_frame_skip: u64,
}

impl Default for MotConfig {
    fn default() -> Self {
        Self {
            detector_kind: DetectorKind::Yolo,
            detector_frame_skip: 5,
        }
    }
}

/// Navigation controller settings.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct NavConfig {
    /// Half-width in pixels of the centre trigger band.
    pub centre_limit: u32,
    /// PWM duty cycle for turn commands.
    pub turn_duty: u8,
    /// PWM duty cycle for the forward command.
    pub forward_duty: u8,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            centre_limit: 200,
            turn_duty: 7,
            forward_duty: 12,
        }
    }
}

/// Telemetry broadcaster settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Socket address the WebSocket server listens on.
    pub bind: String,
    /// Seconds between broadcasts.
    pub period_secs: u64,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8765".into(),
            period_secs: 1,
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Resolution frames are resized to before tracking.
    pub resize_to: (u32, u32),
    pub mot: MotConfig,
    pub nav: NavConfig,
    pub telemetry: TelemetryConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            resize_to: (1280, 720),
            mot: MotConfig::default(),
            nav: NavConfig::default(),
            telemetry: TelemetryConfig::default(),
        }
    }
}

impl Config {
    pub fn from_json_str(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|err| Error::Config(err.to_string()))
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.resize_to, (1280, 720));
        assert_eq!(config.mot.detector_frame_skip, 5);
        assert_eq!(config.nav.centre_limit, 200);
        assert_eq!(config.nav.turn_duty, 7);
        assert_eq!(config.nav.forward_duty, 12);
        assert_eq!(config.telemetry.bind, "0.0.0.0:8765");
        assert_eq!(config.telemetry.period_secs, 1);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = Config::from_json_str(
            r#"{"resize_to": [640, 480], "mot": {"detector_frame_skip": 3, "detector_kind": "ssd"}}"#,
        )
        .unwrap();
        assert_eq!(config.resize_to, (640, 480));
        assert_eq!(config.mot.detector_frame_skip, 3);
        assert_eq!(config.mot.detector_kind, DetectorKind::Ssd);
        assert_eq!(config.nav.centre_limit, 200);
    }

    #[test]
    fn test_invalid_json_is_a_config_error() {
        let result = Config::from_json_str("{not json");
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
