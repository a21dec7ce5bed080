//! REST API handlers for profile introspection and metadata validation.
//!
//! This is the surface consumed by the metadata-editing UI and by upload
//! filename validation: list profiles, fetch an assembled profile, ask which
//! schema governs a filename, fetch that schema as a self-contained
//! document, and validate a metadata document against it.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

use crate::adapters::profile_store::ProfileStore;
use crate::domain::ConfigurationError;

/// Shared application state for API handlers.
#[derive(Clone)]
pub struct ApiState {
    pub store: Arc<ProfileStore>,
}

// ============================================================================
// Response Types
// ============================================================================

#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

impl<T> ApiResponse<T> {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Deserialize)]
pub struct FilenameQuery {
    /// Filename to match against the profile's patterns; absent requests the
    /// dataset-root schema.
    pub filename: Option<String>,
}

/// Map a configuration error onto a response.
///
/// Unknown profiles are a client mistake; everything else escaping a loaded
/// store is a server-side misconfiguration and is reported loudly as such.
fn error_response(error: ConfigurationError) -> Response {
    let status = match &error {
        ConfigurationError::UnknownProfile(_) => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(ApiResponse::<()>::error(error.to_string()))).into_response()
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/profiles - overview of all loaded profiles.
pub async fn list_profiles(State(state): State<ApiState>) -> impl IntoResponse {
    Json(ApiResponse::success(state.store.infos().await))
}

/// GET /api/profiles/:name - one assembled profile.
pub async fn get_profile(
    State(state): State<ApiState>,
    Path(name): Path<String>,
) -> Response {
    match state.store.get(&name).await {
        Some(loaded) => Json(ApiResponse::success(loaded.profile.clone())).into_response(),
        None => error_response(ConfigurationError::UnknownProfile(name)),
    }
}

/// GET /api/profiles/:name/schema-name?filename=... - the schema reference
/// chosen by pattern matching. A `false` reference tells the caller that
/// uploads of this filename must be rejected.
pub async fn get_schema_name(
    State(state): State<ApiState>,
    Path(name): Path<String>,
    Query(query): Query<FilenameQuery>,
) -> Response {
    match state.store.get(&name).await {
        Some(loaded) => {
            let schema_ref = loaded.schema_name_for(query.filename.as_deref()).clone();
            Json(ApiResponse::success(schema_ref)).into_response()
        }
        None => error_response(ConfigurationError::UnknownProfile(name)),
    }
}

/// GET /api/profiles/:name/schema?filename=... - the self-contained schema
/// governing a filename (or the dataset root when no filename is given).
pub async fn get_schema(
    State(state): State<ApiState>,
    Path(name): Path<String>,
    Query(query): Query<FilenameQuery>,
) -> Response {
    match state.store.schema_for(&name, query.filename.as_deref()).await {
        Ok(schema) => Json(ApiResponse::success(&*schema)).into_response(),
        Err(error) => error_response(error),
    }
}

/// POST /api/profiles/:name/validate?filename=... - validate a metadata
/// document against the schema governing a filename.
pub async fn validate_metadata(
    State(state): State<ApiState>,
    Path(name): Path<String>,
    Query(query): Query<FilenameQuery>,
    Json(instance): Json<serde_json::Value>,
) -> Response {
    match state
        .store
        .validate_metadata(&name, query.filename.as_deref(), &instance)
        .await
    {
        Ok(issues) => Json(ApiResponse::success(json!({
            "valid": issues.is_empty(),
            "errors": issues,
        })))
        .into_response(),
        Err(error) => error_response(error),
    }
}
