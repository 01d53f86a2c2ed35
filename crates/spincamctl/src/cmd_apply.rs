use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use spinnaker_camera::{connect, ReconfigureLevel};
use tracing::info;

use crate::common;

#[derive(Serialize)]
struct ApplyResponse {
    family: String,
    level: ReconfigureLevel,
    stop_required: bool,
    reopen_required: bool,
    width: i64,
    height: i64,
    pixel_format: String,
    frame_rate: f64,
}

pub fn run(device: &Path, config: &Path, level: ReconfigureLevel, json: bool) -> Result<()> {
    let config = common::load_config(config)?;
    let mut map = common::load_device(device)?;
    let mut camera = connect(&mut map).context("open camera for apply")?;
    info!(family = %camera.model(), %level, "applying configuration");
    if level.requires_close() {
        info!("device must be closed and reopened for this change to take effect");
    }
    camera
        .apply_configuration(&config, level)
        .with_context(|| format!("apply configuration at level {level}"))?;

    let read_integer = |name: &str| -> Result<i64> {
        Ok(camera.read_property(name)?.as_integer()?)
    };
    let response = ApplyResponse {
        family: camera.model().to_string(),
        level,
        stop_required: level.requires_stop(),
        reopen_required: level.requires_close(),
        width: read_integer("Width")?,
        height: read_integer("Height")?,
        pixel_format: camera
            .read_property("PixelFormat")?
            .as_enum()
            .context("read pixel format")?,
        frame_rate: camera
            .read_property("AcquisitionFrameRate")?
            .as_float()
            .context("read frame rate")?,
    };

    if json {
        common::print_json(&response)?;
    } else {
        println!(
            "{} configured at level {}: {}x{} {} @ {} Hz",
            response.family,
            response.level,
            response.width,
            response.height,
            response.pixel_format,
            response.frame_rate
        );
    }
    Ok(())
}
