use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use spinnaker_camera::connect;
use tracing::info;

use crate::common;

#[derive(Serialize)]
struct ExecuteResponse<'a> {
    name: &'a str,
    executions: u32,
}

pub fn run(device: &Path, name: String, json: bool) -> Result<()> {
    let mut map = common::load_device(device)?;
    {
        let mut camera = connect(&mut map).context("open camera for execute")?;
        camera
            .execute(&name)
            .with_context(|| format!("execute command {name}"))?;
    }
    let executions = map
        .executions(&name)
        .with_context(|| format!("read execution count of {name}"))?;
    info!(command = %name, executions, "command executed");

    if json {
        common::print_json(&ExecuteResponse {
            name: &name,
            executions,
        })?;
    } else {
        println!("{name} executed");
    }
    Ok(())
}
