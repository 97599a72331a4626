pub mod branch_resolver;
pub mod export_store;
