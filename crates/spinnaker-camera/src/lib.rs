#![cfg_attr(docsrs, feature(doc_cfg))]
//! Dynamic-reconfigure control of Spinnaker-class machine vision cameras.
//!
//! A controller borrows a [`PropertyRegistry`](nodemap::PropertyRegistry)
//! for its whole lifetime and translates [`SpinnakerConfig`] snapshots into
//! ordered property writes. [`connect`] reads `DeviceModelName` and picks the
//! family whose firmware naming matches the device.
//!
//! ```rust
//! use spinnaker_camera::nodemap::NodeMap;
//! use spinnaker_camera::{connect, CameraError};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut device = NodeMap::parse(r#"
//!     <RegisterDescription ModelName="Blackfly S BFS-U3-16S2C">
//!         <String Name="DeviceModelName"><Value>Blackfly S BFS-U3-16S2C</Value></String>
//!         <Integer Name="WidthMax"><Value>1440</Value><AccessMode>RO</AccessMode></Integer>
//!         <Integer Name="HeightMax"><Value>1080</Value><AccessMode>RO</AccessMode></Integer>
//!         <Enumeration Name="GainAuto">
//!             <EnumEntry Name="Off" /><EnumEntry Name="Continuous" />
//!             <Value>Continuous</Value>
//!         </Enumeration>
//!         <Float Name="Gain"><Value>0</Value><Min>0</Min><Max>47.99</Max></Float>
//!     </RegisterDescription>
//! "#)?;
//!
//! let mut camera = connect(&mut device)?;
//! assert_eq!(camera.width_max(), 1440);
//! camera.set_gain(6.0)?;
//! assert!(matches!(camera.set_gain(99.0), Err(CameraError::OutOfRange(_))));
//! assert_eq!(camera.read_property("Gain")?.as_float()?, 6.0);
//! # Ok(())
//! # }
//! ```

mod camera;
mod config;
mod connect;
mod controls;
mod error;
pub mod families;
pub mod features;
mod level;

pub use camera::{Camera, CameraCore, CameraModel, SensorBounds};
pub use config::SpinnakerConfig;
pub use connect::connect;
pub use error::CameraError;
pub use level::ReconfigureLevel;
pub use nodemap_core as nodemap;
