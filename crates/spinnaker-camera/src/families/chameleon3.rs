use nodemap_core::PropertyRegistry;
use tracing::debug;

use crate::camera::{Camera, CameraCore, CameraModel};
use crate::features::{self, ControlNames};
use crate::CameraError;

/// Chameleon3 controller.
///
/// Uses the earlier USB3 firmware names and has an automatic frame-rate
/// control that must be switched off before a fixed rate sticks.
#[derive(Debug)]
pub struct Chameleon3<'a> {
    core: CameraCore<'a>,
}

impl<'a> Chameleon3<'a> {
    pub fn new(registry: &'a mut dyn PropertyRegistry) -> Result<Self, CameraError> {
        let mut camera = Self {
            core: CameraCore::new(registry)?,
        };
        camera.init()?;
        Ok(camera)
    }
}

impl<'a> Camera<'a> for Chameleon3<'a> {
    fn model(&self) -> CameraModel {
        CameraModel::Chameleon3
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
}

/// Frame-rate sequence for the earlier USB3 firmware: automatic frame rate
/// off, override enabled, then the clamped rate.
pub(crate) fn set_legacy_frame_rate(
    core: &mut CameraCore<'_>,
    frame_rate: f64,
) -> Result<f64, CameraError> {
    if core.is_writable(features::ACQUISITION_FRAME_RATE_AUTO) {
        core.set_enum(features::ACQUISITION_FRAME_RATE_AUTO, features::OFF)?;
    } else {
        debug!("no writable automatic frame rate control");
    }
    core.set_bool(features::LEGACY_USB3.frame_rate_enable, true)?;
    core.set_float_clamped(features::ACQUISITION_FRAME_RATE, frame_rate)
}
