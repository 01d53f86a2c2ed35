use std::cell::RefCell;
use std::rc::Rc;

use spinnaker_camera::nodemap::{
    Access, NodeError, NodeInfo, NodeKind, NodeMap, PropertyRegistry, Value,
};
use spinnaker_camera::{connect, CameraError, CameraModel, ReconfigureLevel, SpinnakerConfig};

const BLACKFLY_S: &str = include_str!("../devices/blackfly_s.xml");
const CHAMELEON3: &str = include_str!("../devices/chameleon3.xml");
const GRASSHOPPER3: &str = include_str!("../devices/grasshopper3.xml");

const BARE: &str = r#"
    <RegisterDescription ModelName="Blackfly S BFS-PGE-31S4M">
        <String Name="DeviceModelName"><Value>Blackfly S BFS-PGE-31S4M</Value></String>
        <Integer Name="WidthMax"><Value>2048</Value><AccessMode>RO</AccessMode></Integer>
        <Integer Name="HeightMax"><Value>1536</Value><AccessMode>RO</AccessMode></Integer>
        <Enumeration Name="GainAuto">
            <EnumEntry Name="Off" /><EnumEntry Name="Continuous" />
            <Value>Continuous</Value>
        </Enumeration>
    </RegisterDescription>
"#;

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn device(xml: &str) -> NodeMap {
    init_tracing();
    NodeMap::parse(xml).expect("parse device description")
}

#[derive(Debug, Default)]
struct Log {
    reads: usize,
    writes: Vec<String>,
}

/// Registry wrapper counting value reads and recording attempted writes.
struct Recording {
    inner: NodeMap,
    log: Rc<RefCell<Log>>,
}

impl Recording {
    fn new(inner: NodeMap) -> (Self, Rc<RefCell<Log>>) {
        let log = Rc::new(RefCell::new(Log::default()));
        (
            Self {
                inner,
                log: Rc::clone(&log),
            },
            log,
        )
    }

    fn read(&self) {
        self.log.borrow_mut().reads += 1;
    }

    fn write(&self, name: &str) {
        self.log.borrow_mut().writes.push(name.to_string());
    }
}

impl PropertyRegistry for Recording {
    fn node(&self, name: &str) -> Option<NodeInfo> {
        self.inner.node(name)
    }

    fn get_integer(&self, name: &str) -> Result<i64, NodeError> {
        self.read();
        self.inner.get_integer(name)
    }

    fn set_integer(&mut self, name: &str, value: i64) -> Result<(), NodeError> {
        self.write(name);
        self.inner.set_integer(name, value)
    }

    fn integer_range(&self, name: &str) -> Result<(i64, i64), NodeError> {
        self.read();
        self.inner.integer_range(name)
    }

    fn get_float(&self, name: &str) -> Result<f64, NodeError> {
        self.read();
        self.inner.get_float(name)
    }

    fn set_float(&mut self, name: &str, value: f64) -> Result<(), NodeError> {
        self.write(name);
        self.inner.set_float(name, value)
    }

    fn float_range(&self, name: &str) -> Result<(f64, f64), NodeError> {
        self.read();
        self.inner.float_range(name)
    }

    fn get_enum(&self, name: &str) -> Result<String, NodeError> {
        self.read();
        self.inner.get_enum(name)
    }

    fn set_enum(&mut self, name: &str, entry: &str) -> Result<(), NodeError> {
        self.write(name);
        self.inner.set_enum(name, entry)
    }

    fn enum_entries(&self, name: &str) -> Result<Vec<String>, NodeError> {
        self.inner.enum_entries(name)
    }

    fn get_bool(&self, name: &str) -> Result<bool, NodeError> {
        self.read();
        self.inner.get_bool(name)
    }

    fn set_bool(&mut self, name: &str, value: bool) -> Result<(), NodeError> {
        self.write(name);
        self.inner.set_bool(name, value)
    }

    fn get_string(&self, name: &str) -> Result<String, NodeError> {
        self.read();
        self.inner.get_string(name)
    }

    fn execute(&mut self, name: &str) -> Result<(), NodeError> {
        self.write(name);
        self.inner.execute(name)
    }
}

#[test]
fn connect_selects_family_from_model_name() {
    for (xml, expected) in [
        (BLACKFLY_S, CameraModel::BlackflyS),
        (CHAMELEON3, CameraModel::Chameleon3),
        (GRASSHOPPER3, CameraModel::Grasshopper3),
    ] {
        let mut map = device(xml);
        let camera = connect(&mut map).expect("connect");
        assert_eq!(camera.model(), expected);
    }
}

#[test]
fn unknown_model_falls_back_to_blackfly_s() {
    let mut map = device(BLACKFLY_S);
    map.store(
        "DeviceModelName",
        Value::String("Blackfly BFLY-PGE-23S6C".into()),
    )
    .unwrap();
    assert_eq!(connect(&mut map).unwrap().model(), CameraModel::BlackflyS);

    let mut nameless = device(
        r#"<RegisterDescription>
            <Integer Name="WidthMax"><Value>640</Value></Integer>
            <Integer Name="HeightMax"><Value>480</Value></Integer>
        </RegisterDescription>"#,
    );
    let camera = connect(&mut nameless).unwrap();
    assert_eq!(camera.model(), CameraModel::BlackflyS);
    assert_eq!((camera.width_max(), camera.height_max()), (640, 480));
}

#[test]
fn construction_requires_sensor_bounds() {
    let mut map = device(
        r#"<RegisterDescription>
            <String Name="DeviceModelName"><Value>Chameleon3 CM3-U3-13Y3M</Value></String>
            <Integer Name="HeightMax"><Value>1024</Value></Integer>
        </RegisterDescription>"#,
    );
    let err = connect(&mut map).err().expect("WidthMax is missing");
    assert!(matches!(err, CameraError::InvalidHandle(name) if name == "WidthMax"));
}

#[test]
fn init_raises_link_throughput_to_maximum() {
    let mut map = device(BLACKFLY_S);
    drop(connect(&mut map).unwrap());
    assert_eq!(
        map.get_integer("DeviceLinkThroughputLimit").unwrap(),
        380_160_000
    );
}

#[test]
fn legacy_firmware_keeps_link_throughput() {
    let mut map = device(
        r#"<RegisterDescription>
            <String Name="DeviceModelName"><Value>Chameleon3 CM3-U3-31S4C</Value></String>
            <Integer Name="WidthMax"><Value>2048</Value></Integer>
            <Integer Name="HeightMax"><Value>1536</Value></Integer>
            <Integer Name="DeviceLinkThroughputLimit">
                <Value>1000</Value><Min>0</Min><Max>5000</Max>
            </Integer>
        </RegisterDescription>"#,
    );
    assert_eq!(connect(&mut map).unwrap().model(), CameraModel::Chameleon3);
    assert_eq!(map.get_integer("DeviceLinkThroughputLimit").unwrap(), 1000);
}

#[test]
fn sensor_bounds_are_cached() {
    let (mut registry, log) = Recording::new(device(BLACKFLY_S));
    let camera = connect(&mut registry).unwrap();
    let reads = log.borrow().reads;
    for _ in 0..3 {
        assert_eq!(camera.width_max(), 1440);
        assert_eq!(camera.height_max(), 1080);
    }
    assert_eq!(log.borrow().reads, reads);
}

#[test]
fn read_property_returns_handle_or_invalid_handle() {
    let mut map = device(BLACKFLY_S);
    let camera = connect(&mut map).unwrap();

    let handle = camera.read_property("ExposureTime").unwrap();
    assert_eq!(handle.kind(), NodeKind::Float);
    assert_eq!(handle.as_float().unwrap(), 10_000.0);
    assert_eq!(handle.limits().unwrap(), (6.0, 30_000_000.0));

    let err = camera.read_property("Exposure").unwrap_err();
    assert!(matches!(err, CameraError::InvalidHandle(name) if name == "Exposure"));
}

#[test]
fn execute_runs_command_nodes() {
    let mut map = device(BLACKFLY_S);
    {
        let mut camera = connect(&mut map).unwrap();
        camera.execute("AcquisitionStop").unwrap();
        assert!(matches!(
            camera.execute("AcquisitionAbort"),
            Err(CameraError::Unsupported(_))
        ));
    }
    assert_eq!(map.executions("AcquisitionStop").unwrap(), 1);
}

#[test]
fn frame_rate_is_clamped_to_mode_limit() {
    let mut map = device(BLACKFLY_S);
    {
        let mut camera = connect(&mut map).unwrap();
        assert_eq!(camera.set_frame_rate(500.0).unwrap(), 226.5);
        assert_eq!(camera.set_frame_rate(30.0).unwrap(), 30.0);
        assert_eq!(camera.set_frame_rate(0.1).unwrap(), 1.0);
        assert!(matches!(
            camera.set_frame_rate(f64::NAN),
            Err(CameraError::OutOfRange(_))
        ));
    }
    assert_eq!(map.get_float("AcquisitionFrameRate").unwrap(), 1.0);
    assert!(map.get_bool("AcquisitionFrameRateEnable").unwrap());
}

#[test]
fn frame_rate_follows_device_side_limit() {
    let mut map = device(BLACKFLY_S);
    map.store("AcquisitionFrameRateMax", Value::Float(60.0))
        .unwrap();
    let config = SpinnakerConfig {
        acquisition_frame_rate: 100.0,
        ..SpinnakerConfig::default()
    };
    connect(&mut map)
        .unwrap()
        .apply_configuration(&config, ReconfigureLevel::Running)
        .unwrap();
    assert_eq!(map.get_float("AcquisitionFrameRate").unwrap(), 60.0);
}

#[test]
fn empty_frame_rate_range_is_an_error() {
    let mut map = device(BLACKFLY_S);
    map.store("AcquisitionFrameRateMax", Value::Float(0.5))
        .unwrap();
    let err = connect(&mut map).unwrap().set_frame_rate(30.0).unwrap_err();
    assert!(matches!(err, CameraError::OutOfRange(msg) if msg.contains("AcquisitionFrameRate")));
    assert_eq!(map.get_float("AcquisitionFrameRate").unwrap(), 30.0);
}

#[test]
fn set_gain_turns_auto_gain_off() {
    let mut map = device(BLACKFLY_S);
    connect(&mut map).unwrap().set_gain(12.5).unwrap();
    assert_eq!(map.get_enum("GainAuto").unwrap(), "Off");
    assert_eq!(map.get_float("Gain").unwrap(), 12.5);
}

#[test]
fn set_gain_out_of_range_writes_nothing() {
    let (mut registry, log) = Recording::new(device(BLACKFLY_S));
    {
        let mut camera = connect(&mut registry).unwrap();
        log.borrow_mut().writes.clear();
        let err = camera.set_gain(60.0).unwrap_err();
        assert!(matches!(err, CameraError::OutOfRange(_)));
        let err = camera.set_gain(-0.5).unwrap_err();
        assert!(matches!(err, CameraError::OutOfRange(_)));
    }
    assert!(log.borrow().writes.is_empty());
    assert_eq!(registry.inner.get_enum("GainAuto").unwrap(), "Continuous");
}

#[test]
fn set_gain_without_gain_node_is_unsupported() {
    let (mut registry, log) = Recording::new(device(BARE));
    {
        let mut camera = connect(&mut registry).unwrap();
        let err = camera.set_gain(3.0).unwrap_err();
        assert!(matches!(err, CameraError::Unsupported(_)));
    }
    assert!(log.borrow().writes.is_empty());
    assert_eq!(registry.inner.get_enum("GainAuto").unwrap(), "Continuous");

    let mut map = device(BLACKFLY_S);
    map.set_access("Gain", Access::AVAILABLE | Access::READABLE)
        .unwrap();
    let err = connect(&mut map).unwrap().set_gain(3.0).unwrap_err();
    assert!(matches!(err, CameraError::Unsupported(_)));
}

#[test]
fn default_configuration_applies_on_blackfly_s() {
    let mut map = device(BLACKFLY_S);
    connect(&mut map)
        .unwrap()
        .apply_configuration(&SpinnakerConfig::default(), ReconfigureLevel::Stop)
        .unwrap();

    assert_eq!(map.get_integer("Width").unwrap(), 1440);
    assert_eq!(map.get_integer("Height").unwrap(), 1080);
    assert_eq!(map.get_enum("PixelFormat").unwrap(), "BayerRG8");
    assert_eq!(map.get_float("AcquisitionFrameRate").unwrap(), 20.0);
    assert!(map.get_bool("AcquisitionFrameRateEnable").unwrap());
    assert_eq!(map.get_enum("TriggerMode").unwrap(), "Off");
    assert_eq!(map.get_enum("LineSelector").unwrap(), "Line1");
    assert_eq!(map.get_enum("LineMode").unwrap(), "Output");
    assert_eq!(map.get_enum("LineSource").unwrap(), "ExposureActive");
    assert_eq!(map.get_enum("ExposureAuto").unwrap(), "Continuous");
    assert_eq!(
        map.get_float("AutoExposureExposureTimeUpperLimit").unwrap(),
        5_000.0
    );
    assert_eq!(map.get_enum("GainAuto").unwrap(), "Continuous");
    assert!(!map.get_bool("GammaEnable").unwrap());
    assert!(!map.get_bool("SharpeningEnable").unwrap());

    // Line0 keeps its own mode.
    map.set_enum("LineSelector", "Line0").unwrap();
    assert_eq!(map.get_enum("LineMode").unwrap(), "Input");
}

#[test]
fn image_format_needs_stop_level() {
    let mut map = device(BLACKFLY_S);
    let config = SpinnakerConfig {
        image_format_roi_width: 640,
        image_format_roi_height: 480,
        image_format_x_offset: 16,
        acquisition_frame_rate: 15.0,
        ..SpinnakerConfig::default()
    };
    let level = config.required_level(&SpinnakerConfig::default());
    assert_eq!(level, ReconfigureLevel::Stop);
    {
        let mut camera = connect(&mut map).unwrap();
        camera
            .apply_configuration(&config, ReconfigureLevel::from_mask(0))
            .unwrap();
        assert_eq!(camera.read_property("Width").unwrap().as_integer().unwrap(), 1440);
        assert_eq!(
            camera
                .read_property("AcquisitionFrameRate")
                .unwrap()
                .as_float()
                .unwrap(),
            15.0
        );
        camera.apply_configuration(&config, level).unwrap();
    }
    assert_eq!(map.get_integer("Width").unwrap(), 640);
    assert_eq!(map.get_integer("Height").unwrap(), 480);
    assert_eq!(map.get_integer("OffsetX").unwrap(), 16);
    assert_eq!(map.get_integer("OffsetY").unwrap(), 0);
}

#[test]
fn oversized_region_falls_back_to_sensor_size() {
    let mut map = device(BLACKFLY_S);
    let config = SpinnakerConfig {
        image_format_roi_width: 4000,
        image_format_roi_height: 720,
        ..SpinnakerConfig::default()
    };
    connect(&mut map)
        .unwrap()
        .apply_configuration(&config, ReconfigureLevel::Stop)
        .unwrap();
    assert_eq!(map.get_integer("Width").unwrap(), 1440);
    assert_eq!(map.get_integer("Height").unwrap(), 720);
}

#[test]
fn failed_write_keeps_earlier_writes() {
    let mut map = device(BLACKFLY_S);
    let config = SpinnakerConfig {
        image_format_x_binning: 2,
        image_format_color_coding: "YUV422Packed".into(),
        ..SpinnakerConfig::default()
    };
    let err = connect(&mut map)
        .unwrap()
        .apply_configuration(&config, ReconfigureLevel::Stop)
        .unwrap_err();
    assert!(matches!(err, CameraError::OutOfRange(msg) if msg.contains("PixelFormat")));

    assert_eq!(map.get_integer("BinningHorizontal").unwrap(), 2);
    assert_eq!(map.get_enum("PixelFormat").unwrap(), "BayerRG8");
    // Nothing after the failing write was touched.
    assert_eq!(map.get_float("AcquisitionFrameRate").unwrap(), 30.0);
    assert!(!map.get_bool("AcquisitionFrameRateEnable").unwrap());
}

#[test]
fn invalid_snapshot_is_rejected_before_any_write() {
    let (mut registry, log) = Recording::new(device(BLACKFLY_S));
    {
        let mut camera = connect(&mut registry).unwrap();
        log.borrow_mut().writes.clear();
        let config = SpinnakerConfig {
            image_format_x_decimation: 0,
            ..SpinnakerConfig::default()
        };
        let err = camera
            .apply_configuration(&config, ReconfigureLevel::Stop)
            .unwrap_err();
        assert!(matches!(err, CameraError::InvalidConfig(_)));
    }
    assert!(log.borrow().writes.is_empty());
}

#[test]
fn missing_decimation_only_fails_for_non_neutral_values() {
    let mut map = device(BLACKFLY_S);
    map.set_access("DecimationHorizontal", Access::empty())
        .unwrap();
    let mut camera = connect(&mut map).unwrap();
    camera
        .apply_configuration(&SpinnakerConfig::default(), ReconfigureLevel::Stop)
        .unwrap();

    let config = SpinnakerConfig {
        image_format_x_decimation: 2,
        ..SpinnakerConfig::default()
    };
    let err = camera
        .apply_configuration(&config, ReconfigureLevel::Stop)
        .unwrap_err();
    assert!(matches!(err, CameraError::Unsupported(msg) if msg.contains("DecimationHorizontal")));
}

#[test]
fn manual_exposure_and_gain() {
    let mut map = device(BLACKFLY_S);
    let config = SpinnakerConfig {
        exposure_auto: "Off".into(),
        exposure_time: 50_000_000.0,
        auto_gain: "Off".into(),
        gain: 6.0,
        ..SpinnakerConfig::default()
    };
    {
        let mut camera = connect(&mut map).unwrap();
        camera
            .apply_configuration(&config, ReconfigureLevel::Running)
            .unwrap();

        let too_loud = SpinnakerConfig {
            gain: 99.0,
            ..config.clone()
        };
        let err = camera
            .apply_configuration(&too_loud, ReconfigureLevel::Running)
            .unwrap_err();
        assert!(matches!(err, CameraError::OutOfRange(_)));
    }
    assert_eq!(map.get_float("ExposureTime").unwrap(), 30_000_000.0);
    assert_eq!(map.get_enum("ExposureAuto").unwrap(), "Off");
    assert_eq!(map.get_float("Gain").unwrap(), 6.0);
}

#[test]
fn manual_white_balance_writes_each_ratio() {
    let mut map = device(BLACKFLY_S);
    let config = SpinnakerConfig {
        auto_white_balance: "Off".into(),
        white_balance_blue_ratio: 2.0,
        white_balance_red_ratio: 1.1,
        ..SpinnakerConfig::default()
    };
    connect(&mut map)
        .unwrap()
        .apply_configuration(&config, ReconfigureLevel::Running)
        .unwrap();

    assert_eq!(map.get_enum("BalanceRatioSelector").unwrap(), "Red");
    assert_eq!(map.get_float("BalanceRatio").unwrap(), 1.1);
    map.set_enum("BalanceRatioSelector", "Blue").unwrap();
    assert_eq!(map.get_float("BalanceRatio").unwrap(), 2.0);
}

#[test]
fn sharpening_gamma_and_saturation_on_blackfly_s() {
    let mut map = device(BLACKFLY_S);
    let config = SpinnakerConfig {
        sharpening_enable: true,
        sharpness: 12.0,
        sharpening_threshold: 0.2,
        saturation_enable: true,
        saturation: 1.5,
        gamma_enable: true,
        gamma: 2.2,
        ..SpinnakerConfig::default()
    };
    connect(&mut map)
        .unwrap()
        .apply_configuration(&config, ReconfigureLevel::Running)
        .unwrap();

    assert!(map.get_bool("SharpeningEnable").unwrap());
    assert!(!map.get_bool("SharpeningAuto").unwrap());
    assert_eq!(map.get_float("Sharpening").unwrap(), 8.0);
    assert_eq!(map.get_float("SharpeningThreshold").unwrap(), 0.2);
    assert!(map.get_bool("SaturationEnable").unwrap());
    assert_eq!(map.get_float("Saturation").unwrap(), 1.5);
    assert!(map.get_bool("GammaEnable").unwrap());
    assert_eq!(map.get_float("Gamma").unwrap(), 2.2);
}

#[test]
fn chameleon3_disables_automatic_frame_rate() {
    let mut map = device(CHAMELEON3);
    {
        let mut camera = connect(&mut map).unwrap();
        assert_eq!(camera.set_frame_rate(200.0).unwrap(), 149.0);
    }
    assert_eq!(map.get_enum("AcquisitionFrameRateAuto").unwrap(), "Off");
    assert!(map.get_bool("AcquisitionFrameRateEnabled").unwrap());
    assert_eq!(map.get_float("AcquisitionFrameRate").unwrap(), 149.0);
}

#[test]
fn chameleon3_uses_legacy_feature_names() {
    let mut map = device(CHAMELEON3);
    let config = SpinnakerConfig {
        sharpening_enable: true,
        sharpness: 2.6,
        saturation_enable: true,
        saturation: 120.0,
        gamma_enable: true,
        gamma: 1.5,
        image_format_x_binning: 2,
        image_format_y_binning: 2,
        ..SpinnakerConfig::default()
    };
    connect(&mut map)
        .unwrap()
        .apply_configuration(&config, ReconfigureLevel::Stop)
        .unwrap();

    assert_eq!(map.get_enum("SharpnessAuto").unwrap(), "Off");
    assert_eq!(map.get_integer("Sharpness").unwrap(), 3);
    assert!(map.get_bool("SaturationEnabled").unwrap());
    assert_eq!(map.get_enum("SaturationAuto").unwrap(), "Off");
    assert_eq!(map.get_float("Saturation").unwrap(), 120.0);
    assert!(map.get_bool("GammaEnabled").unwrap());
    assert_eq!(map.get_float("Gamma").unwrap(), 1.5);
    assert_eq!(map.get_integer("BinningHorizontal").unwrap(), 2);
    assert_eq!(map.get_integer("BinningVertical").unwrap(), 2);
    assert_eq!(
        map.get_float("AutoExposureTimeUpperLimit").unwrap(),
        5_000.0
    );
    assert_eq!(map.get_enum("TriggerActivation").unwrap(), "RisingEdge");
    assert_eq!(map.get_enum("TriggerSource").unwrap(), "Software");
}

#[test]
fn grasshopper3_links_binning_axes() {
    let (mut registry, log) = Recording::new(device(GRASSHOPPER3));
    let config = SpinnakerConfig {
        image_format_x_binning: 2,
        image_format_y_binning: 4,
        ..SpinnakerConfig::default()
    };
    {
        let mut camera = connect(&mut registry).unwrap();
        assert_eq!(camera.width_max(), 1920);
        camera
            .apply_configuration(&config, ReconfigureLevel::Stop)
            .unwrap();
    }
    assert_eq!(registry.inner.get_integer("BinningVertical").unwrap(), 4);
    let log = log.borrow();
    assert!(log.writes.iter().any(|name| name == "BinningVertical"));
    assert!(!log.writes.iter().any(|name| name == "BinningHorizontal"));
    assert_eq!(
        registry.inner.get_enum("AcquisitionFrameRateAuto").unwrap(),
        "Off"
    );
}
