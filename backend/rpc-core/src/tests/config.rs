// Unit tests for config load/save/validate

use crate::config::AppConfig;
use crate::error::config::ConfigError;

/// **VALUE**: Verifies that the defaults pass their own validation.
#[test]
fn given_default_config_when_validated_then_ok() {
    let config = AppConfig::default();
    assert!(config.validate().is_ok());
    assert_eq!(config.ui.poll_interval_ms, 16);
    assert_eq!(config.rpc.broadcast_port, crate::DEFAULT_BROADCAST_PORT);
}

// -------------------------------------------------------------------------- //

#[test]
fn given_zero_poll_interval_when_validated_then_rejected() {
    let mut config = AppConfig::default();
    config.ui.poll_interval_ms = 0;

    assert!(matches!(
        config.validate(),
        Err(ConfigError::Validation { .. })
    ));
}

// -------------------------------------------------------------------------- //

#[test]
fn given_invalid_version_when_validated_then_rejected() {
    let mut config = AppConfig::default();
    config.version = 0;

    assert!(matches!(
        config.validate(),
        Err(ConfigError::Validation { .. })
    ));
}

// -------------------------------------------------------------------------- //

/// **VALUE**: Verifies the save/load round trip through the real filesystem.
///
/// **WHY THIS MATTERS**: Save uses temp-file-plus-rename; a path bug would
/// leave the config unreadable on next launch and silently reset the user.
#[test]
fn given_saved_config_when_loaded_then_values_survive() {
    let dir = tempfile::tempdir().expect("temp dir");

    // GIVEN: A non-default config saved to disk
    let mut config = AppConfig::default();
    config.rpc.broadcast_port = 4242;
    config.ui.poll_interval_ms = 32;
    config.save(dir.path()).expect("save should succeed");

    // WHEN: It is loaded back
    let loaded = AppConfig::load(dir.path()).expect("load should succeed");

    // THEN: The values survive the round trip
    assert_eq!(loaded.rpc.broadcast_port, 4242);
    assert_eq!(loaded.ui.poll_interval_ms, 32);
}

// -------------------------------------------------------------------------- //

#[test]
fn given_missing_file_when_loaded_then_defaults() {
    let dir = tempfile::tempdir().expect("temp dir");

    let loaded = AppConfig::load(dir.path()).expect("missing file is not an error");

    assert_eq!(loaded.ui.poll_interval_ms, 16);
}

// -------------------------------------------------------------------------- //

#[test]
fn given_corrupt_file_when_loaded_then_parse_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    std::fs::write(dir.path().join("config.json"), "{not json").expect("write");

    assert!(matches!(
        AppConfig::load(dir.path()),
        Err(ConfigError::Parse { .. })
    ));
}
