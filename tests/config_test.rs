//! Tests for layered settings loading

use std::fs;

use tempfile::TempDir;

use wikiclade::application::ApplicationError;
use wikiclade::config::{Settings, DEFAULT_SEARCH_PATH};

#[test]
fn given_explicit_file_when_loading_then_overrides_defaults() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("wikiclade.toml");
    fs::write(
        &path,
        r#"
base_url = "https://de.wikipedia.org"
max_depth = 2
"#,
    )
    .unwrap();

    // Act
    let settings = Settings::load(Some(&path)).unwrap();

    // Assert
    assert_eq!(settings.base_url, "https://de.wikipedia.org");
    assert_eq!(settings.max_depth, 2);
    assert_eq!(settings.search_path, DEFAULT_SEARCH_PATH);
}

#[test]
fn given_missing_explicit_file_when_loading_then_fails_with_config_error() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("absent.toml");

    // Act
    let result = Settings::load(Some(&path));

    // Assert
    assert!(matches!(result, Err(ApplicationError::Config { .. })));
}

#[test]
fn given_malformed_file_when_loading_then_fails_with_config_error() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("broken.toml");
    fs::write(&path, "max_depth = \"deep\"").unwrap();

    // Act
    let result = Settings::load(Some(&path));

    // Assert
    assert!(matches!(result, Err(ApplicationError::Config { .. })));
}

#[test]
fn given_invalid_base_url_when_loading_then_fails_validation() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("wikiclade.toml");
    fs::write(&path, r#"base_url = "not a url""#).unwrap();

    // Act
    let result = Settings::load(Some(&path));

    // Assert
    match result {
        Err(ApplicationError::Config { message }) => assert!(message.contains("base_url")),
        other => panic!("expected config error, got {other:?}"),
    }
}

#[test]
fn given_settings_when_rendering_toml_then_reparses_to_same_values() {
    // Arrange
    let settings = Settings {
        max_depth: 3,
        ..Settings::default()
    };

    // Act
    let text = settings.to_toml().unwrap();
    let reparsed: Settings = toml::from_str(&text).unwrap();

    // Assert
    assert_eq!(reparsed, settings);
}
