use nodemap_core::PropertyRegistry;
use tracing::{info, warn};

use crate::camera::{Camera, CameraModel};
use crate::families::{BlackflyS, Chameleon3, Grasshopper3};
use crate::{features, CameraError};

/// Identify the device behind `registry` and build the matching controller.
///
/// Unknown or unreadable model names fall back to the Blackfly S controller,
/// which only uses standard feature names.
pub fn connect<'a>(
    registry: &'a mut dyn PropertyRegistry,
) -> Result<Box<dyn Camera<'a> + 'a>, CameraError> {
    let model = match registry.get_string(features::DEVICE_MODEL_NAME) {
        Ok(name) => match CameraModel::from_model_name(&name) {
            Some(model) => {
                info!(device = %name, %model, "camera family detected");
                model
            }
            None => {
                warn!(device = %name, "unknown camera family, using Blackfly S controls");
                CameraModel::BlackflyS
            }
        },
        Err(err) => {
            warn!(error = %err, "cannot read model name, using Blackfly S controls");
            CameraModel::BlackflyS
        }
    };
    model.open(registry)
}

impl CameraModel {
    /// Build this family's controller on `registry`.
    pub fn open<'a>(
        self,
        registry: &'a mut dyn PropertyRegistry,
    ) -> Result<Box<dyn Camera<'a> + 'a>, CameraError> {
        let camera: Box<dyn Camera<'a> + 'a> = match self {
            CameraModel::BlackflyS => Box::new(BlackflyS::new(registry)?),
            CameraModel::Chameleon3 => Box::new(Chameleon3::new(registry)?),
            CameraModel::Grasshopper3 => Box::new(Grasshopper3::new(registry)?),
        };
        Ok(camera)
    }
}
