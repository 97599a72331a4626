use crate::services::export_store::StoreError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

/// A lightweight wrapper for general errors that keeps the message local.
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    /// Create a new AppError with a specific status and message.
    pub fn new(status: StatusCode, msg: impl Into<String>) -> Self {
        Self {
            status,
            message: msg.into(),
        }
    }

    /// Shortcut for a 500 Internal Server Error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, msg)
    }

    /// Shortcut for 404 Not Found
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, msg)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.message,
            "status": self.status.as_u16()
        }));

        (self.status, body).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match &err {
            StoreError::Storage(inner) => {
                tracing::error!(error = %inner, "export configuration storage failure");
                AppError::internal("internal storage error")
            }
            StoreError::BranchNotFound { .. } | StoreError::ConfigurationNotFound { .. } => {
                AppError::not_found(err.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_branch_and_missing_configuration_are_404() {
        let branch = AppError::from(StoreError::BranchNotFound {
            repository: "repo".into(),
            branch: "dev".into(),
        });
        assert_eq!(branch.status, StatusCode::NOT_FOUND);
        assert_eq!(branch.message, "branch `dev` not found in repository `repo`");

        let cfg = AppError::from(StoreError::ConfigurationNotFound {
            repository: "repo".into(),
            branch: "main".into(),
        });
        assert_eq!(cfg.status, StatusCode::NOT_FOUND);
        assert_eq!(
            cfg.message,
            "no export configuration for branch `main` in repository `repo`"
        );
    }

    #[test]
    fn storage_failure_is_500_without_driver_detail() {
        let err = AppError::from(StoreError::Storage(sqlx::Error::PoolTimedOut));
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message, "internal storage error");
    }
}
