use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use spinnaker_camera::ReconfigureLevel;
use tracing_subscriber::EnvFilter;

use spincamctl::cmd_apply;
use spincamctl::cmd_execute;
use spincamctl::cmd_frame_rate;
use spincamctl::cmd_get;
use spincamctl::cmd_info;
use spincamctl::cmd_set_gain;

#[derive(Parser, Debug)]
#[command(
    name = "spincamctl",
    version,
    about = "Spinnaker camera control against a described device"
)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
    /// Output JSON where applicable
    #[arg(long)]
    json: bool,
    /// XML device description to control
    #[arg(long, global = true)]
    device: Option<PathBuf>,
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Vendor, model, camera family and sensor size
    Info,
    /// Read a feature by name
    Get {
        #[arg(long)]
        name: String,
    },
    /// Switch automatic gain off and set gain in dB
    SetGain {
        #[arg(long, allow_hyphen_values = true)]
        value: f64,
    },
    /// Set the acquisition frame rate in Hz, clamped to the mode limit
    FrameRate {
        #[arg(long)]
        value: f64,
    },
    /// Execute a command feature such as AcquisitionStart
    Execute {
        #[arg(long)]
        name: String,
    },
    /// Apply a JSON configuration snapshot
    Apply {
        #[arg(long)]
        config: PathBuf,
        /// running, stop or close
        #[arg(long, default_value_t = ReconfigureLevel::Stop)]
        level: ReconfigureLevel,
    },
}

fn main() -> Result<()> {
    let Cli {
        verbose,
        json,
        device,
        cmd,
    } = Cli::parse();

    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| level.into()),
        ))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let device = device
        .ok_or_else(|| anyhow::anyhow!("a device description must be given via --device"))?;

    match cmd {
        Cmd::Info => cmd_info::run(&device, json)?,
        Cmd::Get { name } => cmd_get::run(&device, name, json)?,
        Cmd::SetGain { value } => cmd_set_gain::run(&device, value, json)?,
        Cmd::FrameRate { value } => cmd_frame_rate::run(&device, value, json)?,
        Cmd::Execute { name } => cmd_execute::run(&device, name, json)?,
        Cmd::Apply { config, level } => cmd_apply::run(&device, &config, level, json)?,
    };

    Ok(())
}
