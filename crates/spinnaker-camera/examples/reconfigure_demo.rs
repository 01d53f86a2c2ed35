use spinnaker_camera::nodemap::NodeMap;
use spinnaker_camera::{connect, SpinnakerConfig};

const DEVICE: &str = include_str!("../devices/blackfly_s.xml");

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();
    let mut device = NodeMap::parse(DEVICE)?;
    println!(
        "Simulated {} ({} nodes)",
        device.model().unwrap_or("unknown device"),
        device.len()
    );

    let mut camera = connect(&mut device)?;
    println!(
        "Family: {}, sensor {}x{}",
        camera.model(),
        camera.width_max(),
        camera.height_max()
    );

    let current = SpinnakerConfig::default();
    camera.apply_configuration(&current, current.required_level(&current))?;

    let next = SpinnakerConfig {
        acquisition_frame_rate: 400.0,
        image_format_roi_width: 800,
        image_format_roi_height: 600,
        image_format_color_coding: "Mono8".into(),
        auto_gain: "Off".into(),
        gain: 9.0,
        ..current.clone()
    };
    let level = next.required_level(&current);
    println!("Applying snapshot at level {level} ({})", level.as_u8());
    camera.apply_configuration(&next, level)?;

    for name in ["Width", "Height", "PixelFormat", "AcquisitionFrameRate", "Gain"] {
        let handle = camera.read_property(name)?;
        println!("  {name:<22} {}", handle.value()?);
    }
    Ok(())
}
