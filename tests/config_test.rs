use clap::Parser;
use curator::cli::Cli;
use curator::config::Settings;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_load_config_file() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let config_path = temp_dir.path().join("curator.toml");

    let curator_toml = r#"
[server]
host = "0.0.0.0"
port = 9000

[profiles]
dir = "data/profiles"
case_sensitive = true
watch = false
"#;
    fs::write(&config_path, curator_toml)?;

    let cli = Cli::parse_from(["curator", "--config", config_path.to_str().unwrap()]);
    let settings = Settings::new_with_cli(&cli)?;

    assert_eq!(settings.server.host, "0.0.0.0");
    assert_eq!(settings.server.port, 9000);
    assert_eq!(settings.profiles.dir, std::path::PathBuf::from("data/profiles"));
    assert!(settings.profiles.case_sensitive);
    assert!(!settings.profiles.watch);
    Ok(())
}

#[test]
fn test_defaults_without_config_file() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let config_path = temp_dir.path().join("does-not-exist.toml");

    let cli = Cli::parse_from(["curator", "--config", config_path.to_str().unwrap()]);
    let settings = Settings::new_with_cli(&cli)?;

    assert_eq!(settings.server.host, "127.0.0.1");
    assert_eq!(settings.server.port, 8000);
    assert_eq!(settings.profiles.dir, std::path::PathBuf::from("profiles"));
    assert!(!settings.profiles.case_sensitive);
    assert!(settings.profiles.watch);
    Ok(())
}

#[test]
fn test_cli_overrides_config_file() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let config_path = temp_dir.path().join("curator.toml");

    let curator_toml = r#"
[server]
host = "127.0.0.1"
port = 9000
"#;
    fs::write(&config_path, curator_toml)?;

    let cli = Cli::parse_from([
        "curator",
        "--config",
        config_path.to_str().unwrap(),
        "--host",
        "0.0.0.0",
        "--port",
        "8080",
        "--profile-dir",
        "elsewhere",
        "--no-watch",
    ]);
    let settings = Settings::new_with_cli(&cli)?;

    assert_eq!(settings.server.host, "0.0.0.0");
    assert_eq!(settings.server.port, 8080);
    assert_eq!(settings.profiles.dir, std::path::PathBuf::from("elsewhere"));
    assert!(!settings.profiles.watch);
    Ok(())
}
