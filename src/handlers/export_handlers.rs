//! HTTP handlers for branch export configuration.
//! Thin JSON adapters over `ExportStore`.

use crate::{
    errors::AppError,
    models::export_configuration::{ExportConfiguration, ExportConfigurationForBranch},
    services::export_store::ExportStore,
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

/// GET `/repositories/{repository}/branches/{branch}/export`
pub async fn get_export_configuration(
    State(store): State<ExportStore>,
    Path((repository, branch)): Path<(String, String)>,
) -> Result<Json<ExportConfiguration>, AppError> {
    let cfg = store.get(&repository, &branch).await?;
    Ok(Json(cfg))
}

/// PUT `/repositories/{repository}/branches/{branch}/export`: create or
/// replace the branch's export configuration.
pub async fn put_export_configuration(
    State(store): State<ExportStore>,
    Path((repository, branch)): Path<(String, String)>,
    Json(cfg): Json<ExportConfiguration>,
) -> Result<StatusCode, AppError> {
    store.put(&repository, &branch, &cfg).await?;
    Ok(StatusCode::CREATED)
}

/// GET `/exports`: every configured branch, in no particular order.
pub async fn list_export_configurations(
    State(store): State<ExportStore>,
) -> Result<Json<Vec<ExportConfigurationForBranch>>, AppError> {
    Ok(Json(store.list_all().await?))
}
