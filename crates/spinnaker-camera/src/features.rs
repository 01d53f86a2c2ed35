//! Node names used by the camera controller.
//!
//! Standard Feature Naming Convention names are shared by every model; the
//! [`ControlNames`] tables capture where a camera family deviates.

pub const DEVICE_MODEL_NAME: &str = "DeviceModelName";
pub const DEVICE_LINK_THROUGHPUT_LIMIT: &str = "DeviceLinkThroughputLimit";

pub const WIDTH_MAX: &str = "WidthMax";
pub const HEIGHT_MAX: &str = "HeightMax";
pub const WIDTH: &str = "Width";
pub const HEIGHT: &str = "Height";
pub const OFFSET_X: &str = "OffsetX";
pub const OFFSET_Y: &str = "OffsetY";
pub const PIXEL_FORMAT: &str = "PixelFormat";
pub const BINNING_HORIZONTAL: &str = "BinningHorizontal";
pub const BINNING_VERTICAL: &str = "BinningVertical";
pub const DECIMATION_HORIZONTAL: &str = "DecimationHorizontal";
pub const DECIMATION_VERTICAL: &str = "DecimationVertical";

pub const ACQUISITION_FRAME_RATE: &str = "AcquisitionFrameRate";
pub const ACQUISITION_FRAME_RATE_AUTO: &str = "AcquisitionFrameRateAuto";

pub const TRIGGER_MODE: &str = "TriggerMode";
pub const TRIGGER_SOURCE: &str = "TriggerSource";
pub const TRIGGER_SELECTOR: &str = "TriggerSelector";
pub const TRIGGER_ACTIVATION: &str = "TriggerActivation";
pub const TRIGGER_OVERLAP: &str = "TriggerOverlap";

pub const LINE_SELECTOR: &str = "LineSelector";
pub const LINE_MODE: &str = "LineMode";
pub const LINE_SOURCE: &str = "LineSource";

pub const EXPOSURE_MODE: &str = "ExposureMode";
pub const EXPOSURE_AUTO: &str = "ExposureAuto";
pub const EXPOSURE_TIME: &str = "ExposureTime";

pub const GAIN_SELECTOR: &str = "GainSelector";
pub const GAIN_AUTO: &str = "GainAuto";
pub const GAIN: &str = "Gain";

pub const BLACK_LEVEL: &str = "BlackLevel";
pub const GAMMA: &str = "Gamma";

pub const BALANCE_WHITE_AUTO: &str = "BalanceWhiteAuto";
pub const BALANCE_RATIO_SELECTOR: &str = "BalanceRatioSelector";
pub const BALANCE_RATIO: &str = "BalanceRatio";

/// Enumeration entry switching an automatic control off.
pub const OFF: &str = "Off";

/// Sharpening controls, which differ in type between families.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SharpeningNames {
    /// Float sharpening with a boolean auto switch and a threshold.
    Float {
        enable: &'static str,
        auto: &'static str,
        value: &'static str,
        threshold: &'static str,
    },
    /// Integer sharpness with an enumeration auto switch.
    Integer {
        enable: &'static str,
        auto: &'static str,
        value: &'static str,
    },
}

impl SharpeningNames {
    pub fn enable(&self) -> &'static str {
        match *self {
            SharpeningNames::Float { enable, .. } | SharpeningNames::Integer { enable, .. } => {
                enable
            }
        }
    }
}

/// Family-specific node names for the controls applied on reconfiguration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlNames {
    pub frame_rate_enable: &'static str,
    pub exposure_mode: Option<&'static str>,
    pub exposure_upper_limit: &'static str,
    pub gain_selector: Option<&'static str>,
    pub gamma_enable: &'static str,
    pub sharpening: SharpeningNames,
    pub saturation_enable: &'static str,
    pub saturation_auto: Option<&'static str>,
    pub saturation: &'static str,
    /// Whether decimation is written alongside binning.
    pub decimation: bool,
}

pub const BLACKFLY_S: ControlNames = ControlNames {
    frame_rate_enable: "AcquisitionFrameRateEnable",
    exposure_mode: Some(EXPOSURE_MODE),
    exposure_upper_limit: "AutoExposureExposureTimeUpperLimit",
    gain_selector: Some(GAIN_SELECTOR),
    gamma_enable: "GammaEnable",
    sharpening: SharpeningNames::Float {
        enable: "SharpeningEnable",
        auto: "SharpeningAuto",
        value: "Sharpening",
        threshold: "SharpeningThreshold",
    },
    saturation_enable: "SaturationEnable",
    saturation_auto: None,
    saturation: "Saturation",
    decimation: true,
};

/// Names used by the earlier USB3 firmware generation (Chameleon3,
/// Grasshopper3).
pub const LEGACY_USB3: ControlNames = ControlNames {
    frame_rate_enable: "AcquisitionFrameRateEnabled",
    exposure_mode: None,
    exposure_upper_limit: "AutoExposureTimeUpperLimit",
    gain_selector: None,
    gamma_enable: "GammaEnabled",
    sharpening: SharpeningNames::Integer {
        enable: "SharpnessEnabled",
        auto: "SharpnessAuto",
        value: "Sharpness",
    },
    saturation_enable: "SaturationEnabled",
    saturation_auto: Some("SaturationAuto"),
    saturation: "Saturation",
    decimation: false,
};
