use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use spinnaker_camera::connect;
use tracing::info;

use crate::common;

#[derive(Serialize)]
struct GainResponse {
    gain: f64,
}

pub fn run(device: &Path, value: f64, json: bool) -> Result<()> {
    let mut map = common::load_device(device)?;
    let mut camera = connect(&mut map).context("open camera for set-gain")?;
    camera
        .set_gain(value)
        .with_context(|| format!("set gain to {value} dB"))?;
    let gain = camera
        .read_property("Gain")
        .and_then(|handle| handle.as_float().map_err(Into::into))
        .context("read back gain")?;
    info!(gain, "gain applied");

    if json {
        common::print_json(&GainResponse { gain })?;
    } else {
        println!("{gain}");
    }
    Ok(())
}
