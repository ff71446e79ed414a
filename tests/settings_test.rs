// tests/settings_test.rs
use auto_release::settings::{load_settings, Settings, SETTINGS_FILE};
use serial_test::serial;
use std::io::Write;
use tempfile::{NamedTempFile, TempDir};

#[test]
fn test_load_from_file() {
    let mut temp_file = NamedTempFile::new().unwrap();
    let toml_content = r#"
command_prefix = "ship"
config_path = ".release.yml"

[committer]
name = "Release Bot"
email = "bot@example.com"

[logging]
level = "debug"
json = true
"#;
    temp_file.write_all(toml_content.as_bytes()).unwrap();
    temp_file.flush().unwrap();

    let settings = load_settings(Some(temp_file.path().to_str().unwrap())).unwrap();
    assert_eq!(settings.command_prefix, "ship");
    assert_eq!(settings.config_path, ".release.yml");
    assert_eq!(settings.committer.name, "Release Bot");
    assert_eq!(settings.committer.email, "bot@example.com");
    assert_eq!(settings.logging.level, "debug");
    assert!(settings.logging.json);
}

#[test]
fn test_missing_explicit_file_is_error() {
    let err = load_settings(Some("/nonexistent/auto-release.toml")).unwrap_err();
    assert!(err.to_string().contains("I/O error"));
}

#[test]
fn test_invalid_file_is_error() {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(b"command_prefix = 42\n").unwrap();
    temp_file.flush().unwrap();

    assert!(load_settings(Some(temp_file.path().to_str().unwrap())).is_err());
}

#[test]
#[serial]
fn test_settings_in_working_directory() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join(SETTINGS_FILE), "command_prefix = \"cwd\"\n").unwrap();

    let previous = std::env::current_dir().unwrap();
    std::env::set_current_dir(dir.path()).unwrap();
    let result = load_settings(None);
    std::env::set_current_dir(previous).unwrap();

    assert_eq!(result.unwrap().command_prefix, "cwd");
}

#[test]
#[serial]
fn test_defaults_without_file() {
    let dir = TempDir::new().unwrap();

    let previous = std::env::current_dir().unwrap();
    std::env::set_current_dir(dir.path()).unwrap();
    let result = load_settings(None);
    std::env::set_current_dir(previous).unwrap();

    // A user-level settings file may exist; only check it loads
    let settings = result.unwrap();
    assert!(!settings.command_prefix.is_empty());
    assert_eq!(Settings::default().command_prefix, "release");
}
