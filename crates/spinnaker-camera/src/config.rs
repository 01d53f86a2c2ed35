//! Reconfiguration snapshot.

use serde::{Deserialize, Serialize};

use crate::{CameraError, ReconfigureLevel};

/// Full set of user-tunable camera parameters for one reconfiguration event.
///
/// Enumeration-valued fields carry the symbolic entry names understood by
/// the node map (`"Off"`, `"Continuous"`, `"BayerRG8"`, ...). Every field has
/// a default so partial JSON documents deserialize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpinnakerConfig {
    pub acquisition_frame_rate: f64,
    pub acquisition_frame_rate_enable: bool,

    pub exposure_mode: String,
    pub exposure_auto: String,
    /// Exposure time in microseconds, used when `exposure_auto` is `Off`.
    pub exposure_time: f64,
    /// Upper exposure limit in microseconds while auto exposure is active.
    pub auto_exposure_time_upper_limit: f64,

    pub gain_selector: String,
    pub auto_gain: String,
    /// Gain in dB, used when `auto_gain` is `Off`.
    pub gain: f64,

    /// Black level.
    pub brightness: f64,

    pub sharpening_enable: bool,
    pub auto_sharpness: bool,
    pub sharpness: f64,
    pub sharpening_threshold: f64,

    pub saturation_enable: bool,
    pub saturation: f64,

    pub gamma_enable: bool,
    pub gamma: f64,

    pub auto_white_balance: String,
    pub white_balance_blue_ratio: f64,
    pub white_balance_red_ratio: f64,

    pub image_format_x_binning: i64,
    pub image_format_y_binning: i64,
    pub image_format_x_decimation: i64,
    pub image_format_y_decimation: i64,
    pub image_format_x_offset: i64,
    pub image_format_y_offset: i64,
    /// Region of interest width; `0` selects the full sensor width.
    pub image_format_roi_width: i64,
    /// Region of interest height; `0` selects the full sensor height.
    pub image_format_roi_height: i64,
    pub image_format_color_coding: String,

    pub enable_trigger: String,
    pub trigger_activation_mode: String,
    pub trigger_source: String,
    pub trigger_selector: String,
    pub trigger_overlap_mode: String,

    pub line_selector: String,
    pub line_mode: String,
    pub line_source: String,
}

impl Default for SpinnakerConfig {
    fn default() -> Self {
        Self {
            acquisition_frame_rate: 20.0,
            acquisition_frame_rate_enable: true,
            exposure_mode: "Timed".into(),
            exposure_auto: "Continuous".into(),
            exposure_time: 10_000.0,
            auto_exposure_time_upper_limit: 5_000.0,
            gain_selector: "All".into(),
            auto_gain: "Continuous".into(),
            gain: 0.0,
            brightness: 0.0,
            sharpening_enable: false,
            auto_sharpness: false,
            sharpness: 1.0,
            sharpening_threshold: 0.1,
            saturation_enable: false,
            saturation: 1.0,
            gamma_enable: false,
            gamma: 1.0,
            auto_white_balance: "Continuous".into(),
            white_balance_blue_ratio: 1.6,
            white_balance_red_ratio: 1.3,
            image_format_x_binning: 1,
            image_format_y_binning: 1,
            image_format_x_decimation: 1,
            image_format_y_decimation: 1,
            image_format_x_offset: 0,
            image_format_y_offset: 0,
            image_format_roi_width: 0,
            image_format_roi_height: 0,
            image_format_color_coding: "BayerRG8".into(),
            enable_trigger: "Off".into(),
            trigger_activation_mode: "RisingEdge".into(),
            trigger_source: "Software".into(),
            trigger_selector: "FrameStart".into(),
            trigger_overlap_mode: "Off".into(),
            line_selector: "Line1".into(),
            line_mode: "Output".into(),
            line_source: "ExposureActive".into(),
        }
    }
}

impl SpinnakerConfig {
    /// Deserialize a snapshot from JSON; absent fields take their defaults.
    pub fn from_json(text: &str) -> Result<Self, CameraError> {
        let config: SpinnakerConfig = serde_json::from_str(text)
            .map_err(|err| CameraError::config(format!("parse JSON snapshot: {err}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject snapshots that no device could accept.
    pub fn validate(&self) -> Result<(), CameraError> {
        if !self.acquisition_frame_rate.is_finite() || self.acquisition_frame_rate <= 0.0 {
            return Err(CameraError::config(format!(
                "acquisition_frame_rate must be positive, got {}",
                self.acquisition_frame_rate
            )));
        }
        for (field, value) in [
            ("image_format_x_binning", self.image_format_x_binning),
            ("image_format_y_binning", self.image_format_y_binning),
            ("image_format_x_decimation", self.image_format_x_decimation),
            ("image_format_y_decimation", self.image_format_y_decimation),
        ] {
            if value < 1 {
                return Err(CameraError::config(format!(
                    "{field} must be at least 1, got {value}"
                )));
            }
        }
        for (field, value) in [
            ("image_format_x_offset", self.image_format_x_offset),
            ("image_format_y_offset", self.image_format_y_offset),
            ("image_format_roi_width", self.image_format_roi_width),
            ("image_format_roi_height", self.image_format_roi_height),
        ] {
            if value < 0 {
                return Err(CameraError::config(format!(
                    "{field} must not be negative, got {value}"
                )));
            }
        }
        Ok(())
    }

    /// Whether any field changing the image geometry or pixel layout differs.
    pub fn image_format_differs(&self, other: &SpinnakerConfig) -> bool {
        self.image_format_x_binning != other.image_format_x_binning
            || self.image_format_y_binning != other.image_format_y_binning
            || self.image_format_x_decimation != other.image_format_x_decimation
            || self.image_format_y_decimation != other.image_format_y_decimation
            || self.image_format_x_offset != other.image_format_x_offset
            || self.image_format_y_offset != other.image_format_y_offset
            || self.image_format_roi_width != other.image_format_roi_width
            || self.image_format_roi_height != other.image_format_roi_height
            || self.image_format_color_coding != other.image_format_color_coding
    }

    /// Level required to move the device from `previous` to `self`.
    ///
    /// Image format fields need the stream stopped; every other field can be
    /// changed while streaming.
    pub fn required_level(&self, previous: &SpinnakerConfig) -> ReconfigureLevel {
        if self.image_format_differs(previous) {
            ReconfigureLevel::Stop
        } else {
            ReconfigureLevel::Running
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_uses_defaults() {
        let config = SpinnakerConfig::from_json(
            r#"{ "acquisition_frame_rate": 45.0, "auto_gain": "Off", "gain": 6.5 }"#,
        )
        .expect("parse snapshot");
        assert_eq!(config.acquisition_frame_rate, 45.0);
        assert_eq!(config.auto_gain, "Off");
        assert_eq!(config.gain, 6.5);
        assert_eq!(config.image_format_x_binning, 1);
        assert_eq!(config.trigger_selector, "FrameStart");
    }

    #[test]
    fn invalid_snapshots_are_rejected() {
        let err = SpinnakerConfig::from_json(r#"{ "image_format_y_binning": 0 }"#).unwrap_err();
        assert!(matches!(err, CameraError::InvalidConfig(msg) if msg.contains("y_binning")));

        let err = SpinnakerConfig::from_json(r#"{ "acquisition_frame_rate": -1 }"#).unwrap_err();
        assert!(matches!(err, CameraError::InvalidConfig(_)));

        let err = SpinnakerConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, CameraError::InvalidConfig(_)));

        let config = SpinnakerConfig {
            image_format_roi_width: -8,
            ..SpinnakerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn level_follows_changed_fields() {
        let base = SpinnakerConfig::default();
        let gain_only = SpinnakerConfig {
            gain: 12.0,
            auto_gain: "Off".into(),
            ..base.clone()
        };
        assert_eq!(gain_only.required_level(&base), ReconfigureLevel::Running);

        let roi = SpinnakerConfig {
            image_format_roi_width: 640,
            ..gain_only.clone()
        };
        assert_eq!(roi.required_level(&base), ReconfigureLevel::Stop);
        assert_eq!(base.required_level(&base), ReconfigureLevel::Running);
    }

    #[test]
    fn serializes_round_trip_through_json() {
        let config = SpinnakerConfig {
            image_format_color_coding: "Mono8".into(),
            ..SpinnakerConfig::default()
        };
        let text = serde_json::to_string(&config).unwrap();
        assert_eq!(SpinnakerConfig::from_json(&text).unwrap(), config);
    }
}
