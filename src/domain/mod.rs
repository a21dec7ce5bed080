//! Core domain types for dataset profiles.
//!
//! A profile binds filename patterns to named JSON Schemas for one kind of
//! dataset. Profiles are declarative data loaded from `*.profile.json` files
//! and immutable for their lifetime; everything in this module is a pure
//! function over them.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

pub mod error;
pub mod matcher;
pub mod refs;
pub mod resolver;

pub use error::ConfigurationError;

/// Reserved key under which sibling schemas are embedded when a schema is
/// assembled into a self-contained document. Never allowed as a schema name.
pub const DEFS_KEY: &str = "$defs";

/// A JSON Schema document: either a boolean (`true` accepts anything,
/// `false` accepts nothing) or a schema object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Schema {
    Bool(bool),
    Object(Map<String, Value>),
}

impl Schema {
    pub fn to_value(&self) -> Value {
        match self {
            Schema::Bool(trivial) => Value::Bool(*trivial),
            Schema::Object(document) => Value::Object(document.clone()),
        }
    }

    /// Names of all schemas this document references.
    pub fn referenced_schemas(&self) -> std::collections::BTreeSet<String> {
        match self {
            Schema::Bool(_) => Default::default(),
            Schema::Object(document) => refs::referenced_in(document),
        }
    }
}

/// Reference to a schema: a trivial boolean schema, or the name of an entry
/// in the profile's `schemas` map (after assembly; before assembly a name
/// may also denote an external schema file or URL).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SchemaRef {
    Bool(bool),
    Name(String),
}

impl SchemaRef {
    pub fn as_name(&self) -> Option<&str> {
        match self {
            SchemaRef::Bool(_) => None,
            SchemaRef::Name(name) => Some(name),
        }
    }
}

/// Pair of a regex pattern and the schema applying to filenames it matches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternSchema {
    /// Regex pattern; must match the full filename.
    pub pattern: String,
    /// Schema applied when the pattern matches.
    pub use_schema: SchemaRef,
}

/// A dataset profile.
///
/// After assembly by the profile store, every [`SchemaRef::Name`] in
/// `root_schema`, `fallback_schema` and `patterns`, and the schema part of
/// every cross-document `$ref`, resolves to a key of `schemas`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    /// Human-readable title of the dataset profile.
    pub title: String,
    /// Human-readable description of the dataset profile.
    #[serde(default)]
    pub description: String,
    /// Named schema documents, embedded or assembled from external files.
    #[serde(default)]
    pub schemas: BTreeMap<String, Schema>,
    /// Schema for the dataset itself (not bound to a file).
    pub root_schema: SchemaRef,
    /// Ordered pattern-to-schema bindings; first match wins.
    #[serde(default)]
    pub patterns: Vec<PatternSchema>,
    /// Schema for files not matching any pattern.
    pub fallback_schema: SchemaRef,
}

impl Profile {
    /// Schema names referenced by the root, fallback and pattern bindings.
    pub fn referenced_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        if let Some(name) = self.root_schema.as_name() {
            names.push(name);
        }
        if let Some(name) = self.fallback_schema.as_name() {
            names.push(name);
        }
        for pattern in &self.patterns {
            if let Some(name) = pattern.use_schema.as_name() {
                names.push(name);
            }
        }
        names
    }
}

/// Title and description of a profile, for overview listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileInfo {
    pub title: String,
    #[serde(default)]
    pub description: String,
}

impl ProfileInfo {
    pub fn of(profile: &Profile) -> Self {
        Self {
            title: profile.title.clone(),
            description: profile.description.clone(),
        }
    }
}

/// Source of schema documents referenced by name from a profile.
///
/// Implementations resolve a reference that is not embedded in the profile,
/// for example to a file next to the profile or to an http(s) URL.
#[async_trait]
pub trait SchemaSource: Send + Sync {
    async fn fetch(&self, name: &str) -> Result<Schema, ConfigurationError>;
}
