//! Server-side validation of metadata documents against resolved schemas.

use jsonschema::Draft;
use serde::Serialize;
use serde_json::Value;

use crate::domain::ConfigurationError;

/// A single schema violation.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationIssue {
    /// JSON Pointer to the offending value inside the metadata document.
    pub path: String,
    pub message: String,
}

/// Validate a metadata document against a self-contained schema.
///
/// Returns every violation with its instance path; an empty list means the
/// document is valid. The schema is expected to be an already resolved,
/// self-contained document, so a schema that fails to compile is a
/// configuration problem, not a property of the metadata.
pub fn validate_metadata(
    schema: &Value,
    instance: &Value,
) -> Result<Vec<ValidationIssue>, ConfigurationError> {
    let validator = jsonschema::options()
        .with_draft(Draft::Draft7)
        .build(schema)
        .map_err(|e| ConfigurationError::InvalidSchema {
            name: "resolved schema".to_string(),
            reason: e.to_string(),
        })?;

    Ok(validator
        .iter_errors(instance)
        .map(|error| ValidationIssue {
            path: error.instance_path.to_string(),
            message: error.to_string(),
        })
        .collect())
}
