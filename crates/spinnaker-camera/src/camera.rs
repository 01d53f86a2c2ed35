use std::fmt;

use nodemap_core::{PropertyHandle, PropertyRegistry};
use tracing::{debug, info, warn};

use crate::controls;
use crate::features::{self, ControlNames};
use crate::{CameraError, ReconfigureLevel, SpinnakerConfig};

/// Maximum sensor dimensions read once when the controller is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SensorBounds {
    pub width_max: i64,
    pub height_max: i64,
}

impl SensorBounds {
    /// Read `WidthMax`/`HeightMax`; both nodes are required.
    pub fn read(registry: &dyn PropertyRegistry) -> Result<Self, CameraError> {
        let width_max = registry.get_integer(features::WIDTH_MAX)?;
        let height_max = registry.get_integer(features::HEIGHT_MAX)?;
        Ok(Self {
            width_max,
            height_max,
        })
    }
}

/// Camera families with dedicated control logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CameraModel {
    BlackflyS,
    Chameleon3,
    Grasshopper3,
}

impl CameraModel {
    /// Match a `DeviceModelName` such as `"Blackfly S BFS-U3-16S2C"`.
    pub fn from_model_name(name: &str) -> Option<Self> {
        let compact: String = name
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_lowercase();
        if compact.starts_with("blackflys") {
            Some(CameraModel::BlackflyS)
        } else if compact.starts_with("chameleon3") {
            Some(CameraModel::Chameleon3)
        } else if compact.starts_with("grasshopper3") {
            Some(CameraModel::Grasshopper3)
        } else {
            None
        }
    }
}

impl fmt::Display for CameraModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CameraModel::BlackflyS => f.write_str("Blackfly S"),
            CameraModel::Chameleon3 => f.write_str("Chameleon3"),
            CameraModel::Grasshopper3 => f.write_str("Grasshopper3"),
        }
    }
}

/// Registry binding and cached bounds shared by every camera family.
///
/// The registry is borrowed for the lifetime of the controller and never
/// owned by it.
pub struct CameraCore<'a> {
    registry: &'a mut dyn PropertyRegistry,
    bounds: SensorBounds,
}

impl<'a> CameraCore<'a> {
    /// Bind to `registry` and cache the sensor bounds.
    pub fn new(registry: &'a mut dyn PropertyRegistry) -> Result<Self, CameraError> {
        let bounds = SensorBounds::read(&*registry)?;
        info!(
            width_max = bounds.width_max,
            height_max = bounds.height_max,
            "sensor bounds"
        );
        Ok(Self { registry, bounds })
    }

    pub fn bounds(&self) -> SensorBounds {
        self.bounds
    }

    pub fn read_property(&self, name: &str) -> Result<PropertyHandle<'_>, CameraError> {
        PropertyHandle::lookup(&*self.registry, name).map_err(Into::into)
    }

    pub fn is_available(&self, name: &str) -> bool {
        self.registry.is_available(name)
    }

    pub fn is_writable(&self, name: &str) -> bool {
        self.registry.is_writable(name)
    }

    /// Fail with [`CameraError::Unsupported`] unless `name` can be written.
    pub fn ensure_writable(&self, name: &str) -> Result<(), CameraError> {
        match self.registry.node(name) {
            None => Err(CameraError::unsupported(format!(
                "{name} is not present on this model"
            ))),
            Some(info) if !info.is_writable() => Err(CameraError::unsupported(format!(
                "{name} is not writable"
            ))),
            Some(_) => Ok(()),
        }
    }

    pub fn integer(&self, name: &str) -> Result<i64, CameraError> {
        self.registry.get_integer(name).map_err(Into::into)
    }

    pub fn float_range(&self, name: &str) -> Result<(f64, f64), CameraError> {
        self.registry.float_range(name).map_err(Into::into)
    }

    pub fn set_enum(&mut self, name: &str, entry: &str) -> Result<(), CameraError> {
        self.ensure_writable(name)?;
        self.registry.set_enum(name, entry)?;
        debug!(node = name, entry, "set property");
        Ok(())
    }

    pub fn set_bool(&mut self, name: &str, value: bool) -> Result<(), CameraError> {
        self.ensure_writable(name)?;
        self.registry.set_bool(name, value)?;
        debug!(node = name, value, "set property");
        Ok(())
    }

    /// Write an integer; values outside the node limits are an error.
    pub fn set_integer(&mut self, name: &str, value: i64) -> Result<(), CameraError> {
        self.ensure_writable(name)?;
        self.registry.set_integer(name, value)?;
        debug!(node = name, value, "set property");
        Ok(())
    }

    /// Write a float; values outside the node limits are an error.
    pub fn set_float(&mut self, name: &str, value: f64) -> Result<(), CameraError> {
        self.ensure_writable(name)?;
        self.registry.set_float(name, value)?;
        debug!(node = name, value, "set property");
        Ok(())
    }

    /// Write a float clamped into the node's current limits and return the
    /// value actually written.
    pub fn set_float_clamped(&mut self, name: &str, value: f64) -> Result<f64, CameraError> {
        self.ensure_writable(name)?;
        if value.is_nan() {
            return Err(CameraError::OutOfRange(format!("{name}: NaN requested")));
        }
        let (min, max) = self.registry.float_range(name)?;
        debug!(node = name, min, max, "float limits");
        if min.is_nan() || max.is_nan() || min > max {
            return Err(CameraError::OutOfRange(format!(
                "{name}: device reports empty range [{min}, {max}]"
            )));
        }
        let applied = value.clamp(min, max);
        if applied != value {
            warn!(node = name, requested = value, applied, "value clamped to device limits");
        }
        self.registry.set_float(name, applied)?;
        debug!(node = name, value = applied, "set property");
        Ok(applied)
    }

    /// Write an integer clamped into the node's current limits and return the
    /// value actually written.
    pub fn set_integer_clamped(&mut self, name: &str, value: i64) -> Result<i64, CameraError> {
        self.ensure_writable(name)?;
        let (min, max) = self.registry.integer_range(name)?;
        if min > max {
            return Err(CameraError::OutOfRange(format!(
                "{name}: device reports empty range [{min}, {max}]"
            )));
        }
        let applied = value.clamp(min, max);
        if applied != value {
            warn!(node = name, requested = value, applied, "value clamped to device limits");
        }
        self.registry.set_integer(name, applied)?;
        debug!(node = name, value = applied, "set property");
        Ok(applied)
    }

    pub fn execute(&mut self, name: &str) -> Result<(), CameraError> {
        self.ensure_writable(name)?;
        self.registry.execute(name)?;
        debug!(node = name, "executed command");
        Ok(())
    }

    /// Write the maximum of an integer node and return it.
    pub fn set_integer_to_max(&mut self, name: &str) -> Result<i64, CameraError> {
        self.ensure_writable(name)?;
        let (_, max) = self.registry.integer_range(name)?;
        self.registry.set_integer(name, max)?;
        debug!(node = name, value = max, "set property to maximum");
        Ok(max)
    }
}

impl fmt::Debug for CameraCore<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CameraCore")
            .field("bounds", &self.bounds)
            .finish_non_exhaustive()
    }
}

/// Dynamic-reconfigure control surface of a camera.
///
/// The provided methods implement the Blackfly S behaviour; other families
/// override the subset where their firmware differs. Implementors only need
/// to expose their [`CameraCore`] and model.
pub trait Camera<'a> {
    fn model(&self) -> CameraModel;
    fn core(&self) -> &CameraCore<'a>;
    fn core_mut(&mut self) -> &mut CameraCore<'a>;

    /// Node names used when applying a configuration.
    fn controls(&self) -> &'static ControlNames {
        &features::BLACKFLY_S
    }

    /// One-time device setup performed right after binding.
    fn init(&mut self) -> Result<(), CameraError> {
        let core = self.core_mut();
        if core.is_writable(features::DEVICE_LINK_THROUGHPUT_LIMIT) {
            let limit = core.set_integer_to_max(features::DEVICE_LINK_THROUGHPUT_LIMIT)?;
            info!(limit, "device link throughput set to maximum");
        }
        Ok(())
    }

    /// Push a configuration snapshot into the device.
    ///
    /// Writes are issued one by one and the first failure is returned;
    /// earlier writes stay applied. Image format fields are only written when
    /// `level` requires the stream to be stopped, because devices lock them
    /// while streaming. Stopping the stream is the caller's job.
    fn apply_configuration(
        &mut self,
        config: &SpinnakerConfig,
        level: ReconfigureLevel,
    ) -> Result<(), CameraError> {
        config.validate()?;
        debug!(model = %self.model(), %level, "applying configuration");
        if level.requires_stop() {
            self.set_image_control_formats(config)?;
        }
        let names = self.controls();
        self.set_frame_rate(config.acquisition_frame_rate)?;
        // Enable flag after the rate, so a disabled override still stores it.
        self.core_mut()
            .set_bool(names.frame_rate_enable, config.acquisition_frame_rate_enable)?;
        controls::apply(self.core_mut(), config, names)
    }

    /// Switch automatic gain off and write `gain` (dB).
    ///
    /// The gain node is checked before anything is written, so a model
    /// without a writable gain, or a value outside its limits, leaves the
    /// device untouched.
    fn set_gain(&mut self, gain: f64) -> Result<(), CameraError> {
        let core = self.core_mut();
        core.ensure_writable(features::GAIN)?;
        let (min, max) = core.float_range(features::GAIN)?;
        if !(min..=max).contains(&gain) {
            return Err(CameraError::OutOfRange(format!(
                "{}: {gain} outside [{min}, {max}]",
                features::GAIN
            )));
        }
        if core.is_writable(features::GAIN_AUTO) {
            core.set_enum(features::GAIN_AUTO, features::OFF)?;
        }
        core.set_float(features::GAIN, gain)
    }

    /// Enable the frame-rate override and write `frame_rate` clamped to what
    /// the active sensor mode supports. Returns the applied rate.
    fn set_frame_rate(&mut self, frame_rate: f64) -> Result<f64, CameraError> {
        let enable = self.controls().frame_rate_enable;
        let core = self.core_mut();
        core.set_bool(enable, true)?;
        core.set_float_clamped(features::ACQUISITION_FRAME_RATE, frame_rate)
    }

    /// Binning, decimation, region of interest and pixel format.
    fn set_image_control_formats(&mut self, config: &SpinnakerConfig) -> Result<(), CameraError> {
        let decimation = self.controls().decimation;
        let core = self.core_mut();
        controls::write_optional_integer(
            core,
            features::BINNING_HORIZONTAL,
            config.image_format_x_binning,
        )?;
        controls::write_optional_integer(
            core,
            features::BINNING_VERTICAL,
            config.image_format_y_binning,
        )?;
        if decimation {
            controls::write_optional_integer(
                core,
                features::DECIMATION_HORIZONTAL,
                config.image_format_x_decimation,
            )?;
            controls::write_optional_integer(
                core,
                features::DECIMATION_VERTICAL,
                config.image_format_y_decimation,
            )?;
        }
        controls::apply_region(core, config)
    }

    fn bounds(&self) -> SensorBounds {
        self.core().bounds()
    }

    /// Sensor width cached at construction; no device access.
    fn width_max(&self) -> i64 {
        self.core().bounds().width_max
    }

    /// Sensor height cached at construction; no device access.
    fn height_max(&self) -> i64 {
        self.core().bounds().height_max
    }

    /// Look up a named property.
    fn read_property<'s>(&'s self, name: &str) -> Result<PropertyHandle<'s>, CameraError>
    where
        'a: 's,
    {
        self.core().read_property(name)
    }

    /// Execute a command node such as `UserSetLoad`.
    fn execute(&mut self, name: &str) -> Result<(), CameraError> {
        self.core_mut().execute(name)
    }
}
