use nodemap_core::PropertyRegistry;

use crate::camera::{Camera, CameraCore, CameraModel};
use crate::CameraError;

/// Blackfly S controller; uses the provided [`Camera`] behaviour unchanged.
#[derive(Debug)]
pub struct BlackflyS<'a> {
    core: CameraCore<'a>,
}

impl<'a> BlackflyS<'a> {
    /// Bind to a connected device's registry and run the one-time setup.
    pub fn new(registry: &'a mut dyn PropertyRegistry) -> Result<Self, CameraError> {
        let mut camera = Self {
            core: CameraCore::new(registry)?,
        };
        camera.init()?;
        Ok(camera)
    }
}

impl<'a> Camera<'a> for BlackflyS<'a> {
    fn model(&self) -> CameraModel {
        CameraModel::BlackflyS
    }

    fn core(&self) -> &CameraCore<'a> {
        &self.core
    }

    fn core_mut(&mut self) -> &mut CameraCore<'a> {
        &mut self.core
    }
}
