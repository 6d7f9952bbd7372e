use tinyg_control_settings::{Config, FlowControl, Parity, SpindleSettings};

#[test]
fn test_toml_round_trip_with_spindle() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");

    let mut config = Config::default();
    config.serial.port = "/dev/ttyTinyg".to_string();
    config.serial.parity = Parity::Even;
    config.flow.queue_capacity = 500;
    config.spindle = Some(SpindleSettings {
        max_rpm: 24000,
        ..Default::default()
    });

    config.save_to_file(&path).unwrap();
    let loaded = Config::load_from_file(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_json_file_loads() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(
        &path,
        r#"{"serial":{"port":"COM3","flow_control":"none"},"timing":{"reset_settle_ms":100}}"#,
    )
    .unwrap();

    let config = Config::load_from_file(&path).unwrap();
    assert_eq!(config.serial.port, "COM3");
    assert_eq!(config.serial.flow_control, FlowControl::None);
    assert_eq!(config.timing.reset_settle_ms, 100);
    assert_eq!(config.timing.online_threshold_ms, 1000);
}

#[test]
fn test_invalid_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[flow]\ncontrol_lane_threshold = 9\n").unwrap();
    assert!(Config::load_from_file(&path).is_err());

    let other = dir.path().join("config.yaml");
    std::fs::write(&other, "serial: {}").unwrap();
    assert!(Config::load_from_file(&other).is_err());
}

#[test]
fn test_explicit_path_wins() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("tinyg.toml");
    let mut config = Config::default();
    config.polling.enabled = false;
    config.save_to_file(&path).unwrap();

    let loaded = Config::load_or_default(Some(&path)).unwrap();
    assert!(!loaded.polling.enabled);
}
