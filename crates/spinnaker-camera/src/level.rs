use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::CameraError;

/// How disruptive applying a parameter change is to an active stream.
///
/// The numeric values are a fixed contract with dynamic-reconfigure callers
/// and the variants are totally ordered: `Close > Stop > Running`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum ReconfigureLevel {
    /// Can be changed while the sensor is streaming.
    #[default]
    Running = 0,
    /// Requires the sensor to stop streaming.
    Stop = 1,
    /// Requires the sensor to be closed completely.
    Close = 3,
}

impl ReconfigureLevel {
    /// Classify a dynamic-reconfigure level mask, i.e. the bitwise OR of the
    /// levels of every changed parameter.
    pub const fn from_mask(mask: u32) -> Self {
        if mask & 0b10 != 0 {
            ReconfigureLevel::Close
        } else if mask & 0b01 != 0 {
            ReconfigureLevel::Stop
        } else {
            ReconfigureLevel::Running
        }
    }

    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Whether streaming must stop before the change is applied.
    pub fn requires_stop(self) -> bool {
        self >= ReconfigureLevel::Stop
    }

    /// Whether the device must be closed before the change is applied.
    pub fn requires_close(self) -> bool {
        self >= ReconfigureLevel::Close
    }
}

impl TryFrom<u8> for ReconfigureLevel {
    type Error = CameraError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ReconfigureLevel::Running),
            1 => Ok(ReconfigureLevel::Stop),
            3 => Ok(ReconfigureLevel::Close),
            other => Err(CameraError::config(format!(
                "unknown reconfigure level {other}"
            ))),
        }
    }
}

impl From<ReconfigureLevel> for u8 {
    fn from(level: ReconfigureLevel) -> Self {
        level.as_u8()
    }
}

impl FromStr for ReconfigureLevel {
    type Err = CameraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "running" | "0" => Ok(ReconfigureLevel::Running),
            "stop" | "1" => Ok(ReconfigureLevel::Stop),
            "close" | "3" => Ok(ReconfigureLevel::Close),
            other => Err(CameraError::config(format!(
                "unknown reconfigure level '{other}'"
            ))),
        }
    }
}

impl fmt::Display for ReconfigureLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReconfigureLevel::Running => f.write_str("running"),
            ReconfigureLevel::Stop => f.write_str("stop"),
            ReconfigureLevel::Close => f.write_str("close"),
        }
    }
}
