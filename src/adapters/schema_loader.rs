//! Loading of schema documents referenced by name from a profile.
//!
//! A schema reference that is not embedded in the profile resolves either to
//! a file next to the profile files or to an http(s) URL. Every loaded
//! document is checked against the Draft 7 meta-schema before it is accepted.

use async_trait::async_trait;
use jsonschema::{Draft, Validator};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::OnceLock;

use crate::domain::{ConfigurationError, Schema, SchemaSource};

const DRAFT7_META: &str = include_str!("../../assets/draft-07.schema.json");

/// Validator built from the embedded Draft 7 meta-schema.
fn draft7_validator() -> &'static Validator {
    static VALIDATOR: OnceLock<Validator> = OnceLock::new();
    VALIDATOR.get_or_init(|| {
        let meta: Value = serde_json::from_str(DRAFT7_META)
            .expect("embedded Draft 7 meta-schema parses");
        jsonschema::options()
            .with_draft(Draft::Draft7)
            .build(&meta)
            .expect("embedded Draft 7 meta-schema compiles")
    })
}

/// Check a loaded document against the Draft 7 meta-schema.
pub fn check_schema_document(name: &str, document: &Value) -> Result<(), ConfigurationError> {
    match draft7_validator().validate(document) {
        Ok(()) => Ok(()),
        Err(error) => Err(ConfigurationError::InvalidSchema {
            name: name.to_string(),
            reason: error.to_string(),
        }),
    }
}

/// Resolves schema references against the profile directory, or fetches them
/// from the web for http(s) URLs.
pub struct SchemaLoader {
    base_dir: PathBuf,
    client: reqwest::Client,
}

impl SchemaLoader {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            client: reqwest::Client::new(),
        }
    }

    fn is_url(name: &str) -> bool {
        name.starts_with("http://") || name.starts_with("https://")
    }

    async fn fetch_document(&self, name: &str) -> Result<Value, ConfigurationError> {
        let load_error = |reason: String| ConfigurationError::SchemaLoad {
            name: name.to_string(),
            reason,
        };

        if Self::is_url(name) {
            let response = self
                .client
                .get(name)
                .send()
                .await
                .and_then(|response| response.error_for_status())
                .map_err(|e| load_error(e.to_string()))?;
            response.json().await.map_err(|e| load_error(e.to_string()))
        } else {
            let path = self.base_dir.join(name);
            let text = tokio::fs::read_to_string(&path)
                .await
                .map_err(|e| load_error(e.to_string()))?;
            serde_json::from_str(&text).map_err(|e| load_error(e.to_string()))
        }
    }
}

#[async_trait]
impl SchemaSource for SchemaLoader {
    async fn fetch(&self, name: &str) -> Result<Schema, ConfigurationError> {
        let document = self.fetch_document(name).await?;
        check_schema_document(name, &document)?;
        serde_json::from_value(document).map_err(|e| ConfigurationError::InvalidSchema {
            name: name.to_string(),
            reason: e.to_string(),
        })
    }
}
