use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use spinnaker_camera::connect;

use crate::common;

#[derive(Serialize)]
struct FeatureValue<'a> {
    name: &'a str,
    kind: String,
    value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    limits: Option<(f64, f64)>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    entries: Vec<String>,
    writable: bool,
}

pub fn run(device: &Path, name: String, json: bool) -> Result<()> {
    let mut map = common::load_device(device)?;
    let camera = connect(&mut map).context("open camera for get")?;
    let handle = camera
        .read_property(&name)
        .with_context(|| format!("look up feature {name}"))?;
    let value = handle
        .value()
        .with_context(|| format!("read feature {name}"))?;

    let payload = FeatureValue {
        name: &name,
        kind: handle.kind().to_string(),
        value: value.to_string(),
        limits: handle.limits().ok(),
        entries: handle.entries().unwrap_or_default(),
        writable: handle.info().is_writable(),
    };

    if json {
        common::print_json(&payload)?;
    } else {
        println!("{}", payload.value);
    }
    Ok(())
}
