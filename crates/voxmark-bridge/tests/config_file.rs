//! Loading bridge configs from disk.

use std::io::Write;

use voxmark_bridge::{BridgeConfig, BridgeError};

#[test]
fn loads_partial_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "source:\n  resolution_level: 1\n  voxel_size: [0.2, 0.2, 1.0]\ntransfer:\n  gamma: 0.6\ntiming:\n  settle_delay_ms: 0\nauto_update: false"
    )
    .unwrap();

    let cfg = BridgeConfig::from_file(file.path()).unwrap();
    assert_eq!(cfg.source.resolution_level, 1);
    assert_eq!(cfg.source.voxel_size, Some([0.2, 0.2, 1.0]));
    assert_eq!(cfg.transfer.gamma, 0.6);
    assert_eq!(cfg.transfer.contrast, 2.0);
    assert!(!cfg.auto_update);

    let opts = cfg.refresh_options();
    assert_eq!(opts.level, 1);
    assert!(opts.settle_delay.is_zero());
    assert_eq!(cfg.render_settings().transfer.gamma, 0.6);
}

#[test]
fn written_config_reloads() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("voxmark.yaml");
    let mut cfg = BridgeConfig::default();
    cfg.camera.flips.x = true;
    cfg.imprint.boost = true;
    std::fs::write(&path, cfg.to_yaml().unwrap()).unwrap();

    assert_eq!(BridgeConfig::from_file(&path).unwrap(), cfg);
}

#[test]
fn missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = BridgeConfig::from_file(dir.path().join("absent.yaml")).unwrap_err();
    assert!(matches!(err, BridgeError::ConfigNotFound { .. }));
    assert!(err.is_config_error());
}

#[test]
fn malformed_yaml() {
    let err = BridgeConfig::from_yaml_str("transfer: [1, 2").unwrap_err();
    assert!(matches!(err, BridgeError::Yaml(_)));
}

#[test]
fn unknown_flip_type() {
    assert!(BridgeConfig::from_yaml_str("camera: { flips: { y: maybe } }").is_err());
}
