use std::path::PathBuf;
use thiserror::Error;

/// Fatal misconfiguration, surfaced when profiles are loaded or on first use.
///
/// None of these are per-request conditions: a profile that passes load-time
/// validation can no longer produce them. Metadata that fails validation
/// against a schema is reported separately and is not an error of this kind.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("unknown schema reference '{0}'")]
    UnknownSchema(String),

    #[error("unknown profile '{0}'")]
    UnknownProfile(String),

    #[error("invalid filename pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("'$defs' is reserved and cannot be used as a schema name")]
    ReservedSchemaName,

    #[error("invalid profile '{name}': {reason}")]
    InvalidProfile { name: String, reason: String },

    #[error("'{name}' is not a valid Draft 7 JSON Schema: {reason}")]
    InvalidSchema { name: String, reason: String },

    #[error("cannot load '{name}': {reason}")]
    SchemaLoad { name: String, reason: String },

    #[error("profile directory '{}' does not exist", .0.display())]
    MissingProfileDir(PathBuf),

    #[error("cannot scan profile directory '{}': {reason}", .dir.display())]
    ProfileScan { dir: PathBuf, reason: String },

    #[error("no profiles (*.profile.json) found in '{}'", .0.display())]
    NoProfiles(PathBuf),
}
