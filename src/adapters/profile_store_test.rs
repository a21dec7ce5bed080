use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

use crate::adapters::profile_store::ProfileStore;
use crate::config::ProfileSettings;
use crate::domain::{ConfigurationError, Schema};

fn settings_for(dir: &Path) -> ProfileSettings {
    ProfileSettings {
        dir: dir.to_path_buf(),
        case_sensitive: false,
        watch: false,
    }
}

/// Profile directory mirroring the common case: embedded schemas, schema
/// files next to the profile, and a transitively referenced schema file.
fn write_example_dir(dir: &Path) {
    fs::write(
        dir.join("example.profile.json"),
        json!({
            "title": "Example profile",
            "description": "Example dataset kind",
            "schemas": {
                "embeddedSchema": {
                    "type": "object",
                    "properties": { "n": { "$ref": "#/$defs/Pos" } },
                    "$defs": { "Pos": { "type": "object" } }
                },
                "false.schema.json": true
            },
            "rootSchema": "embeddedSchema",
            "patterns": [
                { "pattern": ".*\\.jpg", "useSchema": "false.schema.json" },
                { "pattern": ".*\\.mp4", "useSchema": "true.schema.json" },
                { "pattern": ".*\\.txt", "useSchema": "generic.schema.json" }
            ],
            "fallbackSchema": false
        })
        .to_string(),
    )
    .unwrap();
    fs::write(dir.join("true.schema.json"), "true").unwrap();
    fs::write(dir.join("false.schema.json"), "false").unwrap();
    fs::write(
        dir.join("generic.schema.json"),
        json!({
            "type": "object",
            "properties": {
                "author": { "$ref": "transitive.schema.json#/definitions/author" }
            },
            "required": ["author"]
        })
        .to_string(),
    )
    .unwrap();
    fs::write(
        dir.join("transitive.schema.json"),
        json!({
            "definitions": { "author": { "type": "string" } }
        })
        .to_string(),
    )
    .unwrap();
}

#[tokio::test]
async fn test_missing_directory_is_fatal() {
    let result = ProfileStore::load(settings_for(Path::new("non-existing dir"))).await;
    assert!(matches!(
        result,
        Err(ConfigurationError::MissingProfileDir(_))
    ));
}

#[tokio::test]
async fn test_empty_directory_is_fatal() {
    let dir = TempDir::new().unwrap();
    let result = ProfileStore::load(settings_for(dir.path())).await;
    assert!(matches!(result, Err(ConfigurationError::NoProfiles(_))));
}

#[tokio::test]
async fn test_profiles_are_assembled() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    write_example_dir(dir.path());

    let store = ProfileStore::load(settings_for(dir.path())).await?;
    assert_eq!(store.names().await, vec!["example".to_string()]);
    assert!(store.get("non-existing profile").await.is_none());

    let loaded = store.get("example").await.unwrap();
    let schemas: Vec<&str> = loaded.profile.schemas.keys().map(|k| k.as_str()).collect();
    // The directly embedded schemas, the schema files referenced by the
    // patterns, and the transitively referenced file.
    assert_eq!(
        schemas,
        vec![
            "embeddedSchema",
            "false.schema.json",
            "generic.schema.json",
            "transitive.schema.json",
            "true.schema.json",
        ]
    );

    // The embedded schema wins over the file with the same name.
    assert_eq!(
        loaded.profile.schemas["false.schema.json"],
        Schema::Bool(true)
    );

    // The file-backed schema is the one loaded from disk.
    let on_disk: Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("generic.schema.json"))?)?;
    assert_eq!(
        loaded.profile.schemas["generic.schema.json"].to_value(),
        on_disk
    );
    Ok(())
}

#[tokio::test]
async fn test_schema_selection_for_filenames() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    write_example_dir(dir.path());
    let store = ProfileStore::load(settings_for(dir.path())).await?;

    // Embedded as `true`, shadowing the external false.schema.json.
    assert_eq!(
        *store.schema_for("example", Some("Some image.jpg")).await?,
        Value::Bool(true)
    );
    // Loaded from file, matched case-insensitively.
    assert_eq!(
        *store.schema_for("example", Some("some Movie.Mp4")).await?,
        Value::Bool(true)
    );
    // No pattern matches, so the fallback forbids the file.
    assert_eq!(
        *store.schema_for("example", Some("some-website.htm")).await?,
        Value::Bool(false)
    );
    // The match must cover the whole filename, not a substring of it.
    assert_eq!(
        *store.schema_for("example", Some("some.txt.document")).await?,
        Value::Bool(false)
    );

    // The root schema request never consults patterns and is resolved into a
    // self-contained document.
    let root = store.schema_for("example", None).await?;
    assert_eq!(root["properties"]["n"]["$ref"], "#/$defs/$defs/Pos");
    assert_eq!(root["$defs"]["$defs"]["Pos"], json!({ "type": "object" }));

    // The cross-document ref in the file-backed schema is rewired to the
    // embedded copy of its target.
    let text = store.schema_for("example", Some("document.txt")).await?;
    assert_eq!(
        text["properties"]["author"]["$ref"],
        "#/$defs/transitive.schema.json/definitions/author"
    );
    assert_eq!(
        text["$defs"]["transitive.schema.json"]["definitions"]["author"],
        json!({ "type": "string" })
    );
    Ok(())
}

#[tokio::test]
async fn test_metadata_validation_end_to_end() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    write_example_dir(dir.path());
    let store = ProfileStore::load(settings_for(dir.path())).await?;

    let valid = store
        .validate_metadata("example", Some("notes.txt"), &json!({ "author": "jane" }))
        .await?;
    assert!(valid.is_empty());

    let invalid = store
        .validate_metadata("example", Some("notes.txt"), &json!({ "author": 42 }))
        .await?;
    assert_eq!(invalid.len(), 1);
    assert_eq!(invalid[0].path, "/author");
    Ok(())
}

#[tokio::test]
async fn test_unknown_profile_errors() {
    let dir = TempDir::new().unwrap();
    write_example_dir(dir.path());
    let store = ProfileStore::load(settings_for(dir.path())).await.unwrap();
    let result = store.schema_for("nope", None).await;
    assert!(matches!(
        result,
        Err(ConfigurationError::UnknownProfile(name)) if name == "nope"
    ));
}

#[tokio::test]
async fn test_reserved_defs_schema_name_is_rejected() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("bad.profile.json"),
        json!({
            "title": "bad",
            "schemas": { "$defs": { "type": "object" } },
            "rootSchema": true,
            "patterns": [],
            "fallbackSchema": true
        })
        .to_string(),
    )
    .unwrap();
    let result = ProfileStore::load(settings_for(dir.path())).await;
    assert!(matches!(
        result,
        Err(ConfigurationError::ReservedSchemaName)
    ));
}

#[tokio::test]
async fn test_malformed_pattern_is_rejected_at_load() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("bad.profile.json"),
        json!({
            "title": "bad",
            "rootSchema": true,
            "patterns": [ { "pattern": "(unclosed", "useSchema": true } ],
            "fallbackSchema": true
        })
        .to_string(),
    )
    .unwrap();
    let result = ProfileStore::load(settings_for(dir.path())).await;
    assert!(matches!(
        result,
        Err(ConfigurationError::InvalidPattern { .. })
    ));
}

#[tokio::test]
async fn test_unresolvable_schema_reference_is_rejected_at_load() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("bad.profile.json"),
        json!({
            "title": "bad",
            "rootSchema": "missing.schema.json",
            "patterns": [],
            "fallbackSchema": true
        })
        .to_string(),
    )
    .unwrap();
    let result = ProfileStore::load(settings_for(dir.path())).await;
    assert!(matches!(result, Err(ConfigurationError::SchemaLoad { .. })));
}

#[tokio::test]
async fn test_profile_failing_meta_schema_is_rejected() {
    let dir = TempDir::new().unwrap();
    // patterns must be a list of pattern/useSchema pairs.
    fs::write(
        dir.path().join("bad.profile.json"),
        json!({
            "title": "bad",
            "rootSchema": true,
            "patterns": [ { "pattern": ".*" } ],
            "fallbackSchema": true
        })
        .to_string(),
    )
    .unwrap();
    let result = ProfileStore::load(settings_for(dir.path())).await;
    assert!(matches!(
        result,
        Err(ConfigurationError::InvalidProfile { .. })
    ));
}

#[tokio::test]
async fn test_reload_swaps_state_and_keeps_old_state_on_failure() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    write_example_dir(dir.path());
    let store = ProfileStore::load(settings_for(dir.path())).await?;

    // Warm the resolve cache, then change the profile on disk.
    let before = store.schema_for("example", None).await?;
    assert_eq!(before["properties"]["n"]["$ref"], "#/$defs/$defs/Pos");

    fs::write(
        dir.path().join("example.profile.json"),
        json!({
            "title": "Replaced profile",
            "schemas": { "root": { "type": "object" } },
            "rootSchema": "root",
            "patterns": [],
            "fallbackSchema": true
        })
        .to_string(),
    )?;
    store.reload().await?;

    let loaded = store.get("example").await.unwrap();
    assert_eq!(loaded.profile.title, "Replaced profile");
    // The cache was invalidated together with the swap.
    let after = store.schema_for("example", None).await?;
    assert!(after.get("properties").is_none());

    // A broken reload leaves the previous state in place.
    fs::write(dir.path().join("example.profile.json"), "{ not json")?;
    assert!(store.reload().await.is_err());
    let kept = store.get("example").await.unwrap();
    assert_eq!(kept.profile.title, "Replaced profile");
    Ok(())
}
