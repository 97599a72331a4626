//! Per-branch export configuration for a versioned data catalog.
//!
//! [`ExportStore`] keeps at most one [`ExportConfiguration`] per branch in
//! SQLite, resolving branch names through a [`BranchResolver`] inside the
//! same transaction as the read or write. The `handlers`/`routes` modules
//! expose it over HTTP.

pub mod config;
pub mod db;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use models::{
    branch::BranchId,
    export_configuration::{ExportConfiguration, ExportConfigurationForBranch},
};
pub use services::{
    branch_resolver::{BranchResolver, CachedBranchResolver},
    export_store::{ExportStore, StoreError, StoreResult},
};
