use std::env;
use std::path::PathBuf;

use serial_test::serial;

use dropbox_upload::{Config, ConfigError};

const ALL_INPUTS: &[&str] = &[
    "INPUT_ACCESSTOKEN",
    "INPUT_PATTERN",
    "INPUT_FILE",
    "INPUT_DESTINATION",
    "INPUT_DISPLAYPROGRESS",
    "INPUT_PARTSIZEBYTES",
    "INPUT_WORKINGDIRECTORY",
];

fn clear_inputs() {
    for key in ALL_INPUTS {
        env::remove_var(key);
    }
}

#[test]
#[serial]
fn resolves_required_inputs_and_applies_defaults() {
    clear_inputs();
    env::set_var("INPUT_ACCESSTOKEN", "token-123");
    env::set_var("INPUT_DESTINATION", "/backup");

    let config = Config::from_env().expect("config should resolve");

    assert_eq!(config.access_token, "token-123");
    assert_eq!(config.destination, "/backup");
    assert_eq!(config.pattern, None);
    assert_eq!(config.file, None);
    assert!(!config.display_progress);
    assert_eq!(config.part_size_bytes, 1024);
    assert_eq!(config.working_directory, PathBuf::from("."));
}

#[test]
#[serial]
fn resolves_optional_inputs_when_present() {
    clear_inputs();
    env::set_var("INPUT_ACCESSTOKEN", "token-123");
    env::set_var("INPUT_DESTINATION", "/backup");
    env::set_var("INPUT_PATTERN", "*.png");
    env::set_var("INPUT_FILE", "report.txt");
    env::set_var("INPUT_DISPLAYPROGRESS", "True");
    env::set_var("INPUT_PARTSIZEBYTES", "8388608");
    env::set_var("INPUT_WORKINGDIRECTORY", "dist");

    let config = Config::from_env().expect("config should resolve");

    assert_eq!(config.pattern.as_deref(), Some("*.png"));
    assert_eq!(config.file.as_deref(), Some("report.txt"));
    assert!(config.display_progress);
    assert_eq!(config.part_size_bytes, 8_388_608);
    assert_eq!(config.working_directory, PathBuf::from("dist"));
}

#[test]
#[serial]
fn missing_destination_is_a_configuration_error() {
    clear_inputs();
    env::set_var("INPUT_ACCESSTOKEN", "token-123");

    let err = Config::from_env().unwrap_err();
    assert!(matches!(err, ConfigError::Missing(ref name) if name == "destination"));
}

#[test]
#[serial]
fn empty_value_counts_as_absent() {
    clear_inputs();
    env::set_var("INPUT_ACCESSTOKEN", "token-123");
    env::set_var("INPUT_DESTINATION", "");

    let err = Config::from_env().unwrap_err();
    assert!(matches!(err, ConfigError::Missing(ref name) if name == "destination"));
}

#[test]
#[serial]
fn mistyped_part_size_is_rejected() {
    clear_inputs();
    env::set_var("INPUT_ACCESSTOKEN", "token-123");
    env::set_var("INPUT_DESTINATION", "/backup");
    env::set_var("INPUT_PARTSIZEBYTES", "lots");

    let err = Config::from_env().unwrap_err();
    assert!(
        matches!(err, ConfigError::Invalid { ref name, .. } if name == "partSizeBytes"),
        "expected invalid partSizeBytes, got: {err}"
    );
}

#[test]
#[serial]
fn mistyped_display_progress_is_rejected() {
    clear_inputs();
    env::set_var("INPUT_ACCESSTOKEN", "token-123");
    env::set_var("INPUT_DESTINATION", "/backup");
    env::set_var("INPUT_DISPLAYPROGRESS", "yes");

    let err = Config::from_env().unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { ref name, .. } if name == "displayProgress"));
}
