//! Data models for the export configuration store.
//!
//! These map to the catalog tables via `sqlx::FromRow` and serialize
//! as JSON via `serde` using the catalog's wire names.

pub mod branch;
pub mod export_configuration;
