//! `$ref` rewriting for embedding schemas into a single document.
//!
//! A profile names several schemas that may reference each other. When one of
//! them is assembled into a standalone document, every sibling schema is
//! embedded under `#/$defs/<name>` and all references have to be relocated so
//! they keep resolving inside the combined document. Three reference shapes
//! must survive the move:
//!
//! - local pointers within a schema (`#/properties/x`),
//! - pointers into a schema's own definitions (`#/$defs/x`),
//! - cross-schema references (`other#/properties/x` or bare `other`).

use serde_json::{Map, Value};
use std::collections::BTreeSet;

/// Key marking a JSON Schema reference.
pub const REF_KEY: &str = "$ref";

/// Where a schema ends up in the assembled document.
///
/// The scope decides how its local references are relocated; cross-schema
/// references always move to the referenced sibling's namespace.
#[derive(Debug, Clone, Copy)]
pub enum RefScope<'a> {
    /// The schema stays at the document root. Its top-level content does not
    /// move, so local pointers keep working untouched. Only pointers into its
    /// own `$defs` are relocated, because that subtree is nested one level
    /// deeper to make room for the embedded siblings.
    Root,
    /// The schema is embedded under `#/$defs/<name>`, so every local pointer
    /// moves into that namespace with it.
    Embedded(&'a str),
}

/// Split a reference on the first `#` into schema part and fragment.
///
/// The fragment keeps its leading `/` if present and is empty for bare
/// references like `"other"`.
pub fn split_ref(reference: &str) -> (&str, &str) {
    match reference.find('#') {
        Some(idx) => (&reference[..idx], &reference[idx + 1..]),
        None => (reference, ""),
    }
}

/// Relocate a single reference string.
pub fn rewrite_ref(reference: &str, scope: RefScope<'_>) -> String {
    let (schema_part, fragment) = split_ref(reference);
    if schema_part.is_empty() {
        match scope {
            RefScope::Root if !fragment.starts_with("/$defs/") => reference.to_string(),
            RefScope::Root => format!("#/$defs{}", fragment),
            RefScope::Embedded(name) => format!("#/$defs/{}{}", name, fragment),
        }
    } else {
        format!("#/$defs/{}{}", schema_part, fragment)
    }
}

/// Rewrite every `$ref` string in a value, recursing through objects and
/// arrays but not into scalar leaves.
///
/// A `$ref` key whose value is a container is a property that happens to be
/// called "$ref", not a reference; it is recursed into instead.
pub fn rewrite_refs(value: &mut Value, scope: RefScope<'_>) {
    match value {
        Value::Object(map) => rewrite_refs_in(map, scope),
        Value::Array(items) => {
            for item in items {
                rewrite_refs(item, scope);
            }
        }
        _ => {}
    }
}

/// Like [`rewrite_refs`], operating directly on an object's entries.
pub fn rewrite_refs_in(map: &mut Map<String, Value>, scope: RefScope<'_>) {
    for (key, entry) in map.iter_mut() {
        match entry {
            Value::String(reference) if key.as_str() == REF_KEY => {
                let rewritten = rewrite_ref(reference, scope);
                *reference = rewritten;
            }
            _ => rewrite_refs(entry, scope),
        }
    }
}

/// Collect the names of all schemas referenced from a value.
///
/// Returns the schema part of every `$ref` string, skipping document-local
/// references (`#/...`).
pub fn referenced_schemas(value: &Value) -> BTreeSet<String> {
    let mut found = BTreeSet::new();
    collect_refs(value, &mut found);
    found
}

/// Like [`referenced_schemas`], operating directly on an object's entries.
pub fn referenced_in(map: &Map<String, Value>) -> BTreeSet<String> {
    let mut found = BTreeSet::new();
    collect_map(map, &mut found);
    found
}

fn collect_refs(value: &Value, found: &mut BTreeSet<String>) {
    match value {
        Value::Object(map) => collect_map(map, found),
        Value::Array(items) => {
            for item in items {
                collect_refs(item, found);
            }
        }
        _ => {}
    }
}

fn collect_map(map: &Map<String, Value>, found: &mut BTreeSet<String>) {
    for (key, entry) in map {
        match entry {
            Value::String(reference) if key.as_str() == REF_KEY => {
                let (schema_part, _) = split_ref(reference);
                if !schema_part.is_empty() {
                    found.insert(schema_part.to_string());
                }
            }
            _ => collect_refs(entry, found),
        }
    }
}
