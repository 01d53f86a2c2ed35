//! Write sequences shared by the camera families.

use tracing::{debug, warn};

use crate::camera::CameraCore;
use crate::features::{self, ControlNames, SharpeningNames};
use crate::{CameraError, SpinnakerConfig};

const CONTINUOUS: &str = "Continuous";
const OUTPUT: &str = "Output";

/// Everything applied on every reconfiguration after the frame rate.
pub(crate) fn apply(
    core: &mut CameraCore<'_>,
    config: &SpinnakerConfig,
    names: &ControlNames,
) -> Result<(), CameraError> {
    apply_trigger(core, config)?;
    apply_line(core, config)?;
    apply_exposure(core, config, names)?;
    apply_sharpening(core, config, names)?;
    apply_saturation(core, config, names)?;
    apply_gain(core, config, names)?;
    core.set_float_clamped(features::BLACK_LEVEL, config.brightness)?;
    apply_gamma(core, config, names)?;
    apply_white_balance(core, config)
}

fn apply_trigger(core: &mut CameraCore<'_>, config: &SpinnakerConfig) -> Result<(), CameraError> {
    // Source and activation are only writable while triggering is off.
    core.set_enum(features::TRIGGER_MODE, features::OFF)?;
    core.set_enum(features::TRIGGER_SOURCE, &config.trigger_source)?;
    core.set_enum(features::TRIGGER_SELECTOR, &config.trigger_selector)?;
    core.set_enum(features::TRIGGER_ACTIVATION, &config.trigger_activation_mode)?;
    if core.is_available(features::TRIGGER_OVERLAP) {
        core.set_enum(features::TRIGGER_OVERLAP, &config.trigger_overlap_mode)?;
    }
    core.set_enum(features::TRIGGER_MODE, &config.enable_trigger)
}

fn apply_line(core: &mut CameraCore<'_>, config: &SpinnakerConfig) -> Result<(), CameraError> {
    core.set_enum(features::LINE_SELECTOR, &config.line_selector)?;
    core.set_enum(features::LINE_MODE, &config.line_mode)?;
    if config.line_mode == OUTPUT {
        core.set_enum(features::LINE_SOURCE, &config.line_source)?;
    }
    Ok(())
}

fn apply_exposure(
    core: &mut CameraCore<'_>,
    config: &SpinnakerConfig,
    names: &ControlNames,
) -> Result<(), CameraError> {
    if let Some(mode) = names.exposure_mode {
        core.set_enum(mode, &config.exposure_mode)?;
    }
    core.set_enum(features::EXPOSURE_AUTO, &config.exposure_auto)?;
    if config.exposure_auto == features::OFF {
        core.set_float_clamped(features::EXPOSURE_TIME, config.exposure_time)?;
    } else {
        core.set_float_clamped(
            names.exposure_upper_limit,
            config.auto_exposure_time_upper_limit,
        )?;
    }
    Ok(())
}

fn apply_sharpening(
    core: &mut CameraCore<'_>,
    config: &SpinnakerConfig,
    names: &ControlNames,
) -> Result<(), CameraError> {
    let sharpening = names.sharpening;
    if !core.is_available(sharpening.enable()) {
        debug!("sharpening not available on this model");
        return Ok(());
    }
    core.set_bool(sharpening.enable(), config.sharpening_enable)?;
    if !config.sharpening_enable {
        return Ok(());
    }
    match sharpening {
        SharpeningNames::Float {
            auto,
            value,
            threshold,
            ..
        } => {
            core.set_bool(auto, config.auto_sharpness)?;
            core.set_float_clamped(value, config.sharpness)?;
            core.set_float_clamped(threshold, config.sharpening_threshold)?;
        }
        SharpeningNames::Integer { auto, value, .. } => {
            let mode = if config.auto_sharpness {
                CONTINUOUS
            } else {
                features::OFF
            };
            core.set_enum(auto, mode)?;
            core.set_integer_clamped(value, config.sharpness.round() as i64)?;
        }
    }
    Ok(())
}

fn apply_saturation(
    core: &mut CameraCore<'_>,
    config: &SpinnakerConfig,
    names: &ControlNames,
) -> Result<(), CameraError> {
    if !core.is_available(names.saturation_enable) {
        debug!("saturation not available on this model");
        return Ok(());
    }
    core.set_bool(names.saturation_enable, config.saturation_enable)?;
    if config.saturation_enable {
        if let Some(auto) = names.saturation_auto {
            core.set_enum(auto, features::OFF)?;
        }
        core.set_float_clamped(names.saturation, config.saturation)?;
    }
    Ok(())
}

fn apply_gain(
    core: &mut CameraCore<'_>,
    config: &SpinnakerConfig,
    names: &ControlNames,
) -> Result<(), CameraError> {
    if let Some(selector) = names.gain_selector {
        core.set_enum(selector, &config.gain_selector)?;
    }
    core.set_enum(features::GAIN_AUTO, &config.auto_gain)?;
    if config.auto_gain == features::OFF {
        core.set_float(features::GAIN, config.gain)?;
    }
    Ok(())
}

fn apply_gamma(
    core: &mut CameraCore<'_>,
    config: &SpinnakerConfig,
    names: &ControlNames,
) -> Result<(), CameraError> {
    if !core.is_available(names.gamma_enable) {
        return Ok(());
    }
    core.set_bool(names.gamma_enable, config.gamma_enable)?;
    if config.gamma_enable {
        core.set_float_clamped(features::GAMMA, config.gamma)?;
    }
    Ok(())
}

fn apply_white_balance(
    core: &mut CameraCore<'_>,
    config: &SpinnakerConfig,
) -> Result<(), CameraError> {
    if !core.is_available(features::BALANCE_WHITE_AUTO) {
        debug!("white balance not available on this model");
        return Ok(());
    }
    core.set_enum(features::BALANCE_WHITE_AUTO, &config.auto_white_balance)?;
    if config.auto_white_balance == features::OFF {
        core.set_enum(features::BALANCE_RATIO_SELECTOR, "Blue")?;
        core.set_float_clamped(features::BALANCE_RATIO, config.white_balance_blue_ratio)?;
        core.set_enum(features::BALANCE_RATIO_SELECTOR, "Red")?;
        core.set_float_clamped(features::BALANCE_RATIO, config.white_balance_red_ratio)?;
    }
    Ok(())
}

/// Write an integer feature the model may lack; a missing node is only an
/// error when a non-neutral value (anything but 1) was requested.
pub(crate) fn write_optional_integer(
    core: &mut CameraCore<'_>,
    name: &str,
    value: i64,
) -> Result<(), CameraError> {
    if core.is_available(name) {
        core.set_integer(name, value)
    } else if value == 1 {
        debug!(node = name, "not available, keeping sensor default");
        Ok(())
    } else {
        Err(CameraError::unsupported(format!(
            "{name} = {value} requested but not available on this model"
        )))
    }
}

/// Offsets, width, height and pixel format.
///
/// Uses the live `WidthMax`/`HeightMax`, which shrink with binning and
/// decimation; the bounds cached at construction are left untouched.
pub(crate) fn apply_region(
    core: &mut CameraCore<'_>,
    config: &SpinnakerConfig,
) -> Result<(), CameraError> {
    let width_max = core.integer(features::WIDTH_MAX)?;
    let height_max = core.integer(features::HEIGHT_MAX)?;

    // Reset offsets first so a larger region fits.
    core.set_integer(features::OFFSET_X, 0)?;
    core.set_integer(features::OFFSET_Y, 0)?;

    let width = region_extent(config.image_format_roi_width, width_max);
    let height = region_extent(config.image_format_roi_height, height_max);
    if width != config.image_format_roi_width && config.image_format_roi_width != 0 {
        warn!(
            requested = config.image_format_roi_width,
            width, "region width exceeds sensor, using full width"
        );
    }
    if height != config.image_format_roi_height && config.image_format_roi_height != 0 {
        warn!(
            requested = config.image_format_roi_height,
            height, "region height exceeds sensor, using full height"
        );
    }
    core.set_integer(features::WIDTH, width)?;
    core.set_integer(features::HEIGHT, height)?;

    core.set_integer(features::OFFSET_X, config.image_format_x_offset)?;
    core.set_integer(features::OFFSET_Y, config.image_format_y_offset)?;

    core.set_enum(features::PIXEL_FORMAT, &config.image_format_color_coding)
}

fn region_extent(requested: i64, max: i64) -> i64 {
    if requested <= 0 || requested > max {
        max
    } else {
        requested
    }
}

#[cfg(test)]
mod tests {
    use super::region_extent;

    #[test]
    fn region_extent_falls_back_to_maximum() {
        assert_eq!(region_extent(0, 1440), 1440);
        assert_eq!(region_extent(2000, 1440), 1440);
        assert_eq!(region_extent(-4, 1440), 1440);
        assert_eq!(region_extent(640, 1440), 640);
        assert_eq!(region_extent(1440, 1440), 1440);
    }
}
