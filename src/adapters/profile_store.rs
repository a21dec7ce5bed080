//! In-memory store of assembled dataset profiles.
//!
//! Profiles are loaded from `*.profile.json` files in the configured
//! directory and brought into a normal form: the embedded `schemas` map is
//! extended until every schema reference of the profile (root, fallback,
//! pattern bindings, and every transitive cross-document `$ref`) resolves to
//! one of its entries. Referenced schemas that are not embedded are loaded
//! from files next to the profile or fetched from http(s) URLs.
//!
//! Assembled profiles are immutable. The store additionally caches resolved
//! self-contained schemas per (profile, schema name); the cache is dropped
//! whenever the profiles are reloaded.

use glob::glob;
use jsonschema::{Draft, Validator};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::path::Path;
use std::sync::{Arc, OnceLock};
use tokio::sync::RwLock;
use tracing::info;

use crate::adapters::metadata_validator::{self, ValidationIssue};
use crate::adapters::schema_loader::SchemaLoader;
use crate::config::ProfileSettings;
use crate::domain::matcher::PatternMatcher;
use crate::domain::{
    resolver, ConfigurationError, Profile, ProfileInfo, SchemaRef, SchemaSource, DEFS_KEY,
};

/// File suffix for dataset profiles.
pub const PROFILE_SUFFIX: &str = ".profile.json";

const PROFILE_META: &str = include_str!("../../assets/profile.schema.json");

/// Validator built from the embedded profile meta-schema.
fn profile_validator() -> &'static Validator {
    static VALIDATOR: OnceLock<Validator> = OnceLock::new();
    VALIDATOR.get_or_init(|| {
        let meta: Value =
            serde_json::from_str(PROFILE_META).expect("embedded profile meta-schema parses");
        jsonschema::options()
            .with_draft(Draft::Draft7)
            .build(&meta)
            .expect("embedded profile meta-schema compiles")
    })
}

/// A fully assembled profile with its compiled pattern matcher.
pub struct LoadedProfile {
    pub profile: Profile,
    matcher: PatternMatcher,
}

impl LoadedProfile {
    /// Schema reference applicable to a filename (root schema for `None`).
    pub fn schema_name_for(&self, filename: Option<&str>) -> &SchemaRef {
        self.matcher.schema_name_for(filename)
    }
}

/// Store of all loaded profiles, shared between request handlers and the
/// reload path.
pub struct ProfileStore {
    settings: ProfileSettings,
    profiles: RwLock<BTreeMap<String, Arc<LoadedProfile>>>,
    resolved: RwLock<HashMap<(String, String), Arc<Value>>>,
}

impl ProfileStore {
    /// Load and assemble every profile in the configured directory.
    ///
    /// Fatal on a missing directory, an empty directory, or any profile that
    /// fails validation or assembly.
    pub async fn load(settings: ProfileSettings) -> Result<Self, ConfigurationError> {
        let profiles = load_dir(&settings).await?;
        Ok(Self {
            settings,
            profiles: RwLock::new(profiles),
            resolved: RwLock::new(HashMap::new()),
        })
    }

    /// Re-scan the profile directory and swap in the new state.
    ///
    /// On failure the previous profiles stay in place. The resolved-schema
    /// cache is cleared together with the swap.
    pub async fn reload(&self) -> Result<(), ConfigurationError> {
        let fresh = load_dir(&self.settings).await?;
        // Swap and invalidate under both locks so no request sees the new
        // profiles with the old cache.
        let mut profiles = self.profiles.write().await;
        let mut resolved = self.resolved.write().await;
        *profiles = fresh;
        resolved.clear();
        Ok(())
    }

    /// Names of all loaded profiles, sorted.
    pub async fn names(&self) -> Vec<String> {
        self.profiles.read().await.keys().cloned().collect()
    }

    /// Title and description of every loaded profile, for overviews.
    pub async fn infos(&self) -> BTreeMap<String, ProfileInfo> {
        self.profiles
            .read()
            .await
            .iter()
            .map(|(name, loaded)| (name.clone(), ProfileInfo::of(&loaded.profile)))
            .collect()
    }

    pub async fn get(&self, name: &str) -> Option<Arc<LoadedProfile>> {
        self.profiles.read().await.get(name).cloned()
    }

    /// Self-contained schema for one named schema of a profile, cached.
    ///
    /// Duplicate concurrent computation of the same key is acceptable; the
    /// result is a pure function of the inputs.
    pub async fn resolve(
        &self,
        profile_name: &str,
        schema_name: &str,
    ) -> Result<Arc<Value>, ConfigurationError> {
        let key = (profile_name.to_string(), schema_name.to_string());
        if let Some(hit) = self.resolved.read().await.get(&key) {
            return Ok(hit.clone());
        }

        let loaded = self
            .get(profile_name)
            .await
            .ok_or_else(|| ConfigurationError::UnknownProfile(profile_name.to_string()))?;
        let value = Arc::new(resolver::resolve(&loaded.profile, schema_name)?);
        self.resolved.write().await.insert(key, value.clone());
        Ok(value)
    }

    /// Self-contained schema governing a filename (root schema for `None`).
    pub async fn schema_for(
        &self,
        profile_name: &str,
        filename: Option<&str>,
    ) -> Result<Arc<Value>, ConfigurationError> {
        let loaded = self
            .get(profile_name)
            .await
            .ok_or_else(|| ConfigurationError::UnknownProfile(profile_name.to_string()))?;
        match loaded.schema_name_for(filename) {
            SchemaRef::Bool(trivial) => Ok(Arc::new(Value::Bool(*trivial))),
            SchemaRef::Name(name) => {
                let name = name.clone();
                self.resolve(profile_name, &name).await
            }
        }
    }

    /// Validate a metadata document against the schema governing a filename.
    pub async fn validate_metadata(
        &self,
        profile_name: &str,
        filename: Option<&str>,
        instance: &Value,
    ) -> Result<Vec<ValidationIssue>, ConfigurationError> {
        let schema = self.schema_for(profile_name, filename).await?;
        metadata_validator::validate_metadata(&schema, instance)
    }
}

async fn load_dir(
    settings: &ProfileSettings,
) -> Result<BTreeMap<String, Arc<LoadedProfile>>, ConfigurationError> {
    let dir = &settings.dir;
    if !dir.is_dir() {
        return Err(ConfigurationError::MissingProfileDir(dir.clone()));
    }

    info!(
        "Loading profiles (*{}) from '{}'",
        PROFILE_SUFFIX,
        dir.display()
    );

    let scan_error = |reason: String| ConfigurationError::ProfileScan {
        dir: dir.clone(),
        reason,
    };

    let pattern = dir.join(format!("*{}", PROFILE_SUFFIX));
    let loader = SchemaLoader::new(dir.clone());
    let mut found = BTreeMap::new();
    for entry in glob(&pattern.to_string_lossy()).map_err(|e| scan_error(e.to_string()))? {
        let path = entry.map_err(|e| scan_error(e.to_string()))?;
        let name = profile_name(&path);
        let profile = assemble_profile(&name, &path, &loader).await?;
        let matcher = PatternMatcher::compile(&profile, !settings.case_sensitive)?;
        info!("Loaded profile '{}' from '{}'", name, path.display());
        found.insert(name, Arc::new(LoadedProfile { profile, matcher }));
    }

    if found.is_empty() {
        return Err(ConfigurationError::NoProfiles(dir.clone()));
    }
    Ok(found)
}

/// Profile name: the filename without the `.profile.json` suffix.
fn profile_name(path: &Path) -> String {
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    filename
        .strip_suffix(PROFILE_SUFFIX)
        .map(str::to_string)
        .unwrap_or(filename)
}

/// Read a profile file and check it against the profile meta-schema.
async fn load_profile_json(name: &str, path: &Path) -> Result<Value, ConfigurationError> {
    let invalid = |reason: String| ConfigurationError::InvalidProfile {
        name: name.to_string(),
        reason,
    };

    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| invalid(e.to_string()))?;
    let document: Value = serde_json::from_str(&text).map_err(|e| invalid(e.to_string()))?;
    if let Err(error) = profile_validator().validate(&document) {
        return Err(invalid(error.to_string()));
    }
    Ok(document)
}

/// Assemble a profile into normal form.
///
/// Embedded schemas win over external files of the same name. Everything
/// referenced but not embedded is loaded and inserted, chasing transitive
/// cross-document `$ref`s breadth-first until the profile is closed under
/// reference resolution.
async fn assemble_profile(
    name: &str,
    path: &Path,
    loader: &SchemaLoader,
) -> Result<Profile, ConfigurationError> {
    let raw = load_profile_json(name, path).await?;
    let mut profile: Profile =
        serde_json::from_value(raw).map_err(|e| ConfigurationError::InvalidProfile {
            name: name.to_string(),
            reason: e.to_string(),
        })?;

    if profile.schemas.contains_key(DEFS_KEY) {
        return Err(ConfigurationError::ReservedSchemaName);
    }

    // Everything that must end up embedded: references from the already
    // embedded schemas, plus the root/fallback/pattern bindings.
    let mut queue: VecDeque<String> = VecDeque::new();
    for schema in profile.schemas.values() {
        queue.extend(schema.referenced_schemas());
    }
    queue.extend(
        profile
            .referenced_names()
            .into_iter()
            .map(str::to_string),
    );

    while let Some(next) = queue.pop_front() {
        if profile.schemas.contains_key(&next) {
            continue;
        }
        let fetched = loader.fetch(&next).await?;
        queue.extend(fetched.referenced_schemas());
        profile.schemas.insert(next, fetched);
    }

    Ok(profile)
}
