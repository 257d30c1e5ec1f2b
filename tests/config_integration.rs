//! Integration tests for configuration loading
//!
//! Tests that verify config loading from files and environment variables.

use brickstep::config::AppConfig;
use brickstep::session::EditorSession;
use serial_test::serial;

#[test]
#[serial]
fn test_env_override() {
    std::env::set_var("BRICKSTEP_EDITING__ADD_KEYS", "true");
    std::env::set_var("BRICKSTEP_DEBUG__LOG_LEVEL", "trace");
    let config = AppConfig::load();
    std::env::remove_var("BRICKSTEP_EDITING__ADD_KEYS");
    std::env::remove_var("BRICKSTEP_DEBUG__LOG_LEVEL");

    let config = config.unwrap();
    assert!(config.editing.add_keys);
    assert_eq!(config.debug.log_level, "trace");
}

#[test]
#[serial]
fn test_default_file_loading() {
    std::env::remove_var("BRICKSTEP_EDITING__ADD_KEYS");

    let cwd = std::env::current_dir().unwrap();
    assert!(cwd.join("config/default.toml").exists());

    let config = AppConfig::load().unwrap();
    assert_eq!(config.interface.line_width, 1.0);
    assert_eq!(config.editing.default_camera_position, [-250.0, -250.0, 75.0]);
}

#[test]
#[serial]
fn test_invalid_env_value_is_an_error() {
    std::env::set_var("BRICKSTEP_INTERFACE__LINE_WIDTH", "wide");
    let result = AppConfig::load();
    std::env::remove_var("BRICKSTEP_INTERFACE__LINE_WIDTH");

    let err = result.unwrap_err();
    assert!(err.to_string().starts_with("Configuration error"));
}

#[test]
#[serial]
fn test_session_uses_config_defaults() {
    std::env::set_var("BRICKSTEP_EDITING__ADD_KEYS", "true");
    let config = AppConfig::load();
    std::env::remove_var("BRICKSTEP_EDITING__ADD_KEYS");

    let mut session = EditorSession::new(&config.unwrap());
    assert!(session.add_keys());

    let light = session.add_light();
    let position = session.scene().light(light).unwrap().position();
    assert_eq!(position.to_array(), [0.0, -100.0, 100.0]);
}
