//! Defines routes for the export configuration API.
//!
//! ## Structure
//! - **Branch-level endpoints**
//!   - `GET /repositories/{repository}/branches/{branch}/export`: read configuration
//!   - `PUT /repositories/{repository}/branches/{branch}/export`: create or replace it
//!
//! - **Catalog-level endpoints**
//!   - `GET /exports`: list every configured branch

use crate::{
    handlers::{
        export_handlers::{
            get_export_configuration, list_export_configurations, put_export_configuration,
        },
        health_handlers::{healthz, readyz},
    },
    services::export_store::ExportStore,
};
use axum::{Router, routing::get};

/// Build the router; every handler shares the `ExportStore` state.
pub fn routes() -> Router<ExportStore> {
    Router::new()
        // health endpoints (mounted at root)
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route(
            "/repositories/{repository}/branches/{branch}/export",
            get(get_export_configuration).put(put_export_configuration),
        )
        .route("/exports", get(list_export_configurations))
}
