use config::{Config, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub mod validator;
pub mod watcher;

use crate::cli::Cli;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub server: ServerSettings,
    #[serde(default)]
    pub profiles: ProfileSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

/// Where dataset profiles live and how their patterns are interpreted.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProfileSettings {
    /// Directory scanned for `*.profile.json` files.
    #[serde(default = "default_profile_dir")]
    pub dir: PathBuf,
    /// Match filename patterns case-sensitively. Off by default: patterns
    /// like `.*\.txt` are expected to cover `readme.TXT` as well.
    #[serde(default)]
    pub case_sensitive: bool,
    /// Reload profiles when files in the profile directory change.
    #[serde(default = "default_watch")]
    pub watch: bool,
}

impl Default for ProfileSettings {
    fn default() -> Self {
        Self {
            dir: default_profile_dir(),
            case_sensitive: false,
            watch: default_watch(),
        }
    }
}

fn default_profile_dir() -> PathBuf {
    PathBuf::from("profiles")
}

fn default_watch() -> bool {
    true
}

impl Settings {
    pub fn new() -> Result<Self, anyhow::Error> {
        let settings = Self::from_file(Path::new("curator.toml"))?;
        Self::validated(settings)
    }

    /// Create settings from CLI arguments (config file plus CLI overrides).
    pub fn new_with_cli(cli: &Cli) -> Result<Self, anyhow::Error> {
        let mut settings = Self::from_file(&cli.config)?;
        settings.apply_cli_overrides(cli);
        Self::validated(settings)
    }

    fn from_file(config_path: &Path) -> Result<Self, anyhow::Error> {
        let s = Config::builder()
            .add_source(File::from(config_path.to_path_buf()).required(false))
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8000)?
            .build()?;

        let settings: Settings = s.try_deserialize()?;
        Ok(settings)
    }

    fn validated(settings: Settings) -> Result<Self, anyhow::Error> {
        validator::ConfigValidator::validate(&settings).map_err(|errors| {
            let error_messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            anyhow::anyhow!(
                "Configuration validation failed:\n{}",
                error_messages.join("\n")
            )
        })?;
        Ok(settings)
    }

    /// Apply CLI argument overrides to settings (CLI > env vars > config file).
    fn apply_cli_overrides(&mut self, cli: &Cli) {
        if let Some(host) = &cli.host {
            self.server.host = host.clone();
        }
        if let Some(port) = cli.port {
            self.server.port = port;
        }
        if let Some(profile_dir) = &cli.profile_dir {
            self.profiles.dir = profile_dir.clone();
        }
        if cli.no_watch == Some(true) {
            self.profiles.watch = false;
        }
    }
}
