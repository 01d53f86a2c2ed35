use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use spinnaker_camera::connect;
use tracing::info;

use crate::common;

#[derive(Serialize)]
struct DeviceSummary {
    vendor: Option<String>,
    model: Option<String>,
    schema_version: Option<String>,
    family: String,
    width_max: i64,
    height_max: i64,
    nodes: usize,
}

pub fn run(device: &Path, json: bool) -> Result<()> {
    let mut map = common::load_device(device)?;
    let vendor = map.vendor().map(str::to_string);
    let model = map.model().map(str::to_string);
    let schema_version = map.version().map(str::to_string);
    let nodes = map.len();

    let camera = connect(&mut map).context("open camera for info")?;
    info!(family = %camera.model(), "camera ready");
    let summary = DeviceSummary {
        vendor,
        model,
        schema_version,
        family: camera.model().to_string(),
        width_max: camera.width_max(),
        height_max: camera.height_max(),
        nodes,
    };

    if json {
        common::print_json(&summary)?;
    } else {
        println!(
            "{} {}",
            summary.vendor.as_deref().unwrap_or("-"),
            summary.model.as_deref().unwrap_or("-")
        );
        println!("  family : {}", summary.family);
        println!("  sensor : {}x{}", summary.width_max, summary.height_max);
        println!("  nodes  : {}", summary.nodes);
    }
    Ok(())
}
