//! # Curator - Metadata-aware dataset profile server
//!
//! Curator serves dataset profiles: declarative documents binding filename
//! patterns to JSON Schemas for one kind of dataset. For any filename (or
//! for the dataset itself) it determines the governing schema and assembles
//! it into a single self-contained document, ready to drive a validator or
//! a schema-based form editor.
//!
//! ## Features
//!
//! - **Pattern matching**: ordered, anchored, case-insensitive filename
//!   patterns with a fallback schema
//! - **Schema assembly**: profile-local and external schemas embedded under
//!   `$defs` with every `$ref` rewritten to resolve in-document
//! - **Validation**: server-side Draft 7 validation of metadata documents
//!   with structured error paths
//! - **Live Reload**: automatic reload when profile files change
//! - **Health Checks**: Kubernetes-ready health endpoints
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use curator::adapters::profile_store::ProfileStore;
//! use curator::config::Settings;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     // Load configuration and the profiles it points at
//!     let settings = Settings::new()?;
//!     let store = ProfileStore::load(settings.profiles).await?;
//!
//!     // Which schema governs this file?
//!     let schema = store.schema_for("example", Some("scan-001.tiff")).await?;
//!     println!("{}", schema);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! Curator follows Hexagonal Architecture:
//! - **Domain**: profile model, pattern matching, schema resolution
//! - **Adapters**: profile store, schema loading, HTTP handlers
//! - **Config**: configuration management and the profile watcher

pub mod adapters;
pub mod cli;
pub mod config;
pub mod domain;

use crate::adapters::api_handler::{self, ApiState};
use crate::adapters::health_handler::HealthHandler;
use crate::adapters::profile_store::ProfileStore;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// Creates the Axum application router with all endpoints configured.
///
/// # Arguments
///
/// * `store` - Shared store of assembled dataset profiles
///
/// # Returns
///
/// Configured Axum Router
pub fn create_app(store: Arc<ProfileStore>) -> Router {
    let health_handler = Arc::new(HealthHandler::new(store.clone()));

    // Health check endpoints
    let public_router = Router::new()
        .route("/health", get({
            let handler = health_handler.clone();
            move || {
                let h = handler.clone();
                async move { h.health().await }
            }
        }))
        .route("/health/ready", get({
            let handler = health_handler.clone();
            move || {
                let h = handler.clone();
                async move { h.ready().await }
            }
        }))
        .route("/health/live", get({
            let handler = health_handler.clone();
            move || {
                let h = handler.clone();
                async move { h.live().await }
            }
        }));

    // API routes for the metadata-editing UI and upload filename validation
    let api_state = ApiState { store };
    let api_router = Router::new()
        .route("/profiles", get(api_handler::list_profiles))
        .route("/profiles/:name", get(api_handler::get_profile))
        .route("/profiles/:name/schema", get(api_handler::get_schema))
        .route(
            "/profiles/:name/schema-name",
            get(api_handler::get_schema_name),
        )
        .route(
            "/profiles/:name/validate",
            post(api_handler::validate_metadata),
        )
        .with_state(api_state);

    let router = public_router.nest("/api", api_router);

    router.layer(
        tower_http::cors::CorsLayer::new()
            .allow_origin(tower_http::cors::Any)
            .allow_methods(tower_http::cors::Any)
            .allow_headers(tower_http::cors::Any),
    )
}
