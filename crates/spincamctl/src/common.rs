use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use spinnaker_camera::nodemap::NodeMap;
use spinnaker_camera::SpinnakerConfig;
use tracing::debug;

/// Load a device description and stand up its node map.
pub fn load_device(path: &Path) -> Result<NodeMap> {
    let xml = fs::read_to_string(path)
        .with_context(|| format!("read device description {}", path.display()))?;
    let map = NodeMap::parse(&xml)
        .with_context(|| format!("parse device description {}", path.display()))?;
    debug!(
        model = map.model().unwrap_or("unknown"),
        nodes = map.len(),
        "device description loaded"
    );
    Ok(map)
}

/// Load a JSON configuration snapshot.
pub fn load_config(path: &Path) -> Result<SpinnakerConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("read configuration {}", path.display()))?;
    SpinnakerConfig::from_json(&text)
        .with_context(|| format!("load configuration {}", path.display()))
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("serialise JSON output")?;
    println!("{text}");
    Ok(())
}
