//! Assembly of self-contained schema documents.
//!
//! [`resolve`] takes one named schema out of a profile and produces a single
//! standalone document: every sibling schema of the profile is embedded under
//! `#/$defs/<name>` and all references are relocated so they resolve inside
//! the result. References are only re-addressed, never inlined, so reference
//! cycles between schemas stay legal and are left to the downstream
//! validator or form renderer.
//!
//! Layout of the result for a target schema `T`:
//!
//! - the top-level content of `T` stays in place (local pointers like
//!   `#/properties/x` remain valid),
//! - `#/$defs/<name>` holds the embedded copy of each named sibling,
//! - `#/$defs/$defs` holds `T`'s own former `$defs` subtree, if it had one.
//!   No sibling can be called `$defs` (the name is reserved), so the slot is
//!   always free.

use serde_json::{Map, Value};

use super::error::ConfigurationError;
use super::matcher::PatternMatcher;
use super::refs::{self, RefScope};
use super::{Profile, Schema, SchemaRef, DEFS_KEY};

/// Produce a self-contained schema document for one named schema.
///
/// Pure: the profile is deep-copied before any rewriting, so repeated calls
/// with the same profile yield structurally identical results and the stored
/// profile is never mutated. A boolean schema is trivially self-contained
/// and returned unchanged.
pub fn resolve(profile: &Profile, schema_name: &str) -> Result<Value, ConfigurationError> {
    let target = profile
        .schemas
        .get(schema_name)
        .ok_or_else(|| ConfigurationError::UnknownSchema(schema_name.to_string()))?;

    let mut target = match target {
        Schema::Bool(trivial) => return Ok(Value::Bool(*trivial)),
        Schema::Object(document) => document.clone(),
    };

    // The target stays at the document root, so only its pointers into its
    // own `$defs` need re-addressing.
    refs::rewrite_refs_in(&mut target, RefScope::Root);

    // Embed a copy of every named schema, each relocated into its own
    // namespace. The target itself is included, so self-references by name
    // keep working.
    let mut embedded = Map::new();
    for (name, schema) in &profile.schemas {
        let mut copy = schema.to_value();
        refs::rewrite_refs(&mut copy, RefScope::Embedded(name));
        embedded.insert(name.clone(), copy);
    }

    // The target's own definitions move one level down to make room for the
    // embedded siblings.
    if let Some(own_defs) = target.remove(DEFS_KEY) {
        let keep = match &own_defs {
            Value::Object(map) => !map.is_empty(),
            _ => true,
        };
        if keep {
            embedded.insert(DEFS_KEY.to_string(), own_defs);
        }
    }
    target.insert(DEFS_KEY.to_string(), Value::Object(embedded));

    Ok(Value::Object(target))
}

/// Resolve the schema governing a filename (or the dataset root for `None`).
///
/// Composes the pattern matcher with [`resolve`]; a boolean schema reference
/// skips resolution entirely.
pub fn schema_for(
    profile: &Profile,
    matcher: &PatternMatcher,
    filename: Option<&str>,
) -> Result<Value, ConfigurationError> {
    match matcher.schema_name_for(filename) {
        SchemaRef::Bool(trivial) => Ok(Value::Bool(*trivial)),
        SchemaRef::Name(name) => resolve(profile, name),
    }
}
