use nodemap_core::PropertyRegistry;
use tracing::{debug, warn};

use super::chameleon3::set_legacy_frame_rate;
use crate::camera::{Camera, CameraCore, CameraModel};
use crate::controls;
use crate::features::{self, ControlNames};
use crate::{CameraError, SpinnakerConfig};

/// Grasshopper3 controller.
///
/// Shares the Chameleon3 firmware names. Its sensor bins both axes together:
/// `BinningVertical` drives the binning and `BinningHorizontal` mirrors it.
#[derive(Debug)]
pub struct Grasshopper3<'a> {
    core: CameraCore<'a>,
}

impl<'a> Grasshopper3<'a> {
    pub fn new(registry: &'a mut dyn PropertyRegistry) -> Result<Self, CameraError> {
        let mut camera = Self {
            core: CameraCore::new(registry)?,
        };
        camera.init()?;
        Ok(camera)
    }
}

impl<'a> Camera<'a> for Grasshopper3<'a> {
    fn model(&self) -> CameraModel {
        CameraModel::Grasshopper3
    }

    fn core(&self) -> &CameraCore<'a> {
        &self.core
    }

    fn core_mut(&mut self) -> &mut CameraCore<'a> {
        &mut self.core
    }

    fn controls(&self) -> &'static ControlNames {
        &features::LEGACY_USB3
    }

    /// Link throughput is negotiated by the firmware; nothing to set up.
    fn init(&mut self) -> Result<(), CameraError> {
        Ok(())
    }

    fn set_frame_rate(&mut self, frame_rate: f64) -> Result<f64, CameraError> {
        set_legacy_frame_rate(&mut self.core, frame_rate)
    }

    fn set_image_control_formats(&mut self, config: &SpinnakerConfig) -> Result<(), CameraError> {
        let binning = linked_binning(config);
        controls::write_optional_integer(&mut self.core, features::BINNING_VERTICAL, binning)?;
        if self.core.is_writable(features::BINNING_HORIZONTAL) {
            self.core
                .set_integer(features::BINNING_HORIZONTAL, binning)?;
        } else {
            debug!(binning, "horizontal binning follows vertical binning");
        }
        controls::apply_region(&mut self.core, config)
    }
}

fn linked_binning(config: &SpinnakerConfig) -> i64 {
    let (x, y) = (config.image_format_x_binning, config.image_format_y_binning);
    if x != y {
        warn!(
            x_binning = x,
            y_binning = y,
            "binning is linked on this sensor, using the larger factor"
        );
    }
    x.max(y)
}
