/// Host configuration tests
/// Covers file loading, environment overrides and validation
use nowplaying_cli::{CliConfig, ConfigError};
use std::collections::HashMap;
use std::time::Duration;
use tempfile::TempDir;

fn no_environment() -> config::Environment {
    CliConfig::environment().source(Some(HashMap::new()))
}

fn environment(vars: &[(&str, &str)]) -> config::Environment {
    let map = vars
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect::<HashMap<_, _>>();
    CliConfig::environment().source(Some(map))
}

fn write_config(dir: &TempDir, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join("nowplaying.toml");
    std::fs::write(&path, contents).unwrap();
    path
}

/// Test that a TOML file populates every section
#[test]
fn test_load_from_file() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
[backend]
base_url = "http://music.local:9000"
page_origin = "https://radio.example.com"

[playback]
shuffle = true
simulated_track_secs = 45
tick_ms = 100
"#,
    );

    let config = CliConfig::load_with(Some(&path), no_environment()).unwrap();

    assert_eq!(
        config.backend.base_url.as_deref(),
        Some("http://music.local:9000")
    );
    assert_eq!(
        config.backend.page_origin.as_deref(),
        Some("https://radio.example.com")
    );
    assert!(config.playback.shuffle);
    assert_eq!(config.simulated_track_length(), Duration::from_secs(45));
    assert_eq!(config.tick_interval(), Duration::from_millis(100));
    config.validate().unwrap();
}

/// Test that omitted keys keep their defaults
#[test]
fn test_partial_file_uses_defaults() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "[playback]\nshuffle = true\n");

    let config = CliConfig::load_with(Some(&path), no_environment()).unwrap();

    assert!(config.playback.shuffle);
    assert_eq!(config.backend.base_url, None);
    assert_eq!(config.simulated_track_length(), Duration::from_secs(30));
    assert_eq!(config.tick_interval(), Duration::from_millis(250));
}

/// Test that an explicit path must exist
#[test]
fn test_missing_explicit_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.toml");

    let err = CliConfig::load_with(Some(&path), no_environment()).unwrap_err();

    match err {
        ConfigError::NotFound(missing) => assert_eq!(missing, path),
        other => panic!("expected NotFound, got {other:?}"),
    }
}

/// Test that a malformed file is reported as a load error
#[test]
fn test_malformed_file() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "[playback]\nsimulated_track_secs = \"long\"\n");

    let err = CliConfig::load_with(Some(&path), no_environment()).unwrap_err();

    assert!(matches!(err, ConfigError::Load(_)), "got {err:?}");
}

/// Test that environment variables override the file
#[test]
fn test_environment_overrides_file() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        "[backend]\nbase_url = \"http://file.local\"\n\n[playback]\ntick_ms = 500\n",
    );

    let env = environment(&[
        ("NOWPLAYING_BACKEND__BASE_URL", "https://env.example.com"),
        ("NOWPLAYING_PLAYBACK__SHUFFLE", "true"),
        ("NOWPLAYING_PLAYBACK__TICK_MS", "50"),
    ]);
    let config = CliConfig::load_with(Some(&path), env).unwrap();

    assert_eq!(
        config.backend.base_url.as_deref(),
        Some("https://env.example.com")
    );
    assert!(config.playback.shuffle);
    assert_eq!(config.playback.tick_ms, 50);
}

/// Test that command-line flags win over loaded values
#[test]
fn test_apply_overrides() {
    let mut config = CliConfig::default();
    config.backend.base_url = Some("http://file.local".to_string());

    config.apply_overrides(None, false);
    assert_eq!(config.backend.base_url.as_deref(), Some("http://file.local"));
    assert!(!config.playback.shuffle);

    config.apply_overrides(Some("https://cli.example.com".to_string()), true);
    assert_eq!(
        config.backend.base_url.as_deref(),
        Some("https://cli.example.com")
    );
    assert!(config.playback.shuffle);
}

/// Test validation of addresses and timings
#[test]
fn test_validation() {
    assert!(CliConfig::default().validate().is_ok());

    let mut config = CliConfig::default();
    config.backend.base_url = Some("ftp://music.local".to_string());
    assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

    let mut config = CliConfig::default();
    config.backend.page_origin = Some("radio.example.com".to_string());
    assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

    let mut config = CliConfig::default();
    config.playback.simulated_track_secs = 0;
    assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

    let mut config = CliConfig::default();
    config.playback.tick_ms = 0;
    assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
}

/// Test that a configured address flows into the loader configuration
#[test]
fn test_loader_config_uses_backend_settings() {
    let mut config = CliConfig::default();
    config.backend.base_url = Some("http://music.local:9000".to_string());
    config.backend.page_origin = Some("https://radio.example.com/player".to_string());

    let loader = config.loader_config();

    assert_eq!(loader.base_url.as_deref(), Some("http://music.local:9000"));
    assert_eq!(
        loader.page_location.as_deref(),
        Some("https://radio.example.com/player")
    );
    assert_eq!(loader.endpoint().as_str(), "http://music.local:9000");
}
