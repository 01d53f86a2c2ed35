use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use spinnaker_camera::connect;

use crate::common;

#[derive(Serialize)]
struct FrameRateResponse {
    requested: f64,
    applied: f64,
}

pub fn run(device: &Path, value: f64, json: bool) -> Result<()> {
    let mut map = common::load_device(device)?;
    let mut camera = connect(&mut map).context("open camera for frame-rate")?;
    let applied = camera
        .set_frame_rate(value)
        .with_context(|| format!("set frame rate to {value} Hz"))?;

    if json {
        common::print_json(&FrameRateResponse {
            requested: value,
            applied,
        })?;
    } else if applied == value {
        println!("{applied}");
    } else {
        println!("{applied} (clamped from {value})");
    }
    Ok(())
}
