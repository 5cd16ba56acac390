use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use hdcleaner::config::{Config, ConfigError, ConfigOverrides, ENV_PREFIX};
use std::fs;
use tempfile::tempdir;

#[test]
fn test_config_load_defaults() {
    // Use figment directly without Env to avoid interference from other tests
    let config: Config = Figment::from(Serialized::defaults(Config::default()))
        .extract()
        .unwrap();
    assert_eq!(config, Config::default());
    assert_eq!(config.io_threads, 4);
}

#[test]
fn test_config_load_from_toml() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(
        &config_path,
        r#"
io_threads = 8
chunk_size = 131072
min_size = 1024
include_hidden = true
"#,
    )
    .unwrap();

    let config = Config::load(Some(&config_path), &ConfigOverrides::default()).unwrap();

    assert_eq!(config.io_threads, 8);
    assert_eq!(config.chunk_size, 131_072);
    assert_eq!(config.min_size, 1024);
    assert!(config.include_hidden);
}

#[test]
fn test_partial_toml_keeps_defaults() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("partial.toml");
    fs::write(&config_path, "min_size = 10\n").unwrap();

    let config = Config::load(Some(&config_path), &ConfigOverrides::default()).unwrap();

    assert_eq!(config.min_size, 10);
    assert_eq!(config.chunk_size, Config::default().chunk_size);
}

#[test]
fn test_cli_overrides_win_over_file() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "io_threads = 8\nmin_size = 1024\n").unwrap();

    let overrides = ConfigOverrides {
        io_threads: Some(2),
        ..ConfigOverrides::default()
    };
    let config = Config::load(Some(&config_path), &overrides).unwrap();

    assert_eq!(config.io_threads, 2);
    assert_eq!(config.min_size, 1024);
}

#[test]
fn test_config_load_from_env() {
    std::env::set_var("HDCLEANER_FOLLOW_SYMLINKS", "true");

    let config: Config = Figment::from(Serialized::defaults(Config::default()))
        .merge(Env::prefixed(ENV_PREFIX))
        .extract()
        .unwrap();

    assert!(config.follow_symlinks);
    std::env::remove_var("HDCLEANER_FOLLOW_SYMLINKS");
}

#[test]
fn test_file_then_cli_layering_via_figment() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "chunk_size = 4096\n").unwrap();

    let overrides = ConfigOverrides {
        chunk_size: Some(512),
        ..ConfigOverrides::default()
    };
    let config: Config = Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file(&config_path))
        .merge(Serialized::defaults(&overrides))
        .extract()
        .unwrap();

    assert_eq!(config.chunk_size, 512);
}

#[test]
fn test_malformed_toml_is_error() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("broken.toml");
    fs::write(&config_path, "invalid = toml").unwrap();

    let result = Config::load(Some(&config_path), &ConfigOverrides::default());
    assert!(matches!(result, Err(ConfigError::Invalid(_))));
}

#[test]
fn test_wrong_type_is_error() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("typed.toml");
    fs::write(&config_path, "io_threads = \"many\"\n").unwrap();

    let result = Config::load(Some(&config_path), &ConfigOverrides::default());
    assert!(matches!(result, Err(ConfigError::Invalid(_))));
}

#[test]
fn test_missing_explicit_file_is_error() {
    let temp_dir = tempdir().unwrap();
    let missing = temp_dir.path().join("nope.toml");

    let result = Config::load(Some(&missing), &ConfigOverrides::default());
    assert!(matches!(result, Err(ConfigError::NotFound(path)) if path == missing));
}

#[test]
fn test_default_path_names_the_app() {
    if let Some(path) = Config::default_path() {
        assert!(path.ends_with("config.toml"));
        assert!(path.to_string_lossy().contains("hdcleaner"));
    }
}
