use clap::Parser;
use std::path::PathBuf;

/// Curator - metadata-aware dataset profile server
#[derive(Parser, Debug, Clone)]
#[command(name = "curator", version, about, long_about = None)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, env = "CURATOR_CONFIG", default_value = "curator.toml")]
    pub config: PathBuf,

    /// Server host address
    #[arg(long, env = "CURATOR_HOST")]
    pub host: Option<String>,

    /// Server port
    #[arg(long, env = "CURATOR_PORT")]
    pub port: Option<u16>,

    /// Directory containing *.profile.json files
    #[arg(long, env = "CURATOR_PROFILE_DIR")]
    pub profile_dir: Option<PathBuf>,

    /// Disable the profile directory watcher
    #[arg(long, env = "CURATOR_NO_WATCH", num_args = 0..=1, default_missing_value = "true")]
    pub no_watch: Option<bool>,
}
