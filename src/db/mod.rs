//! ThermoHub database access.
//!
//! This module provides:
//! - AQL query texts with bind variables
//! - The ArangoDB HTTP connection (cursor pagination, error mapping)
//! - The `HubSource` trait and its remote and in-memory implementations

pub mod arango;
pub mod queries;
pub mod source;

pub use arango::ArangoConnection;
pub use queries::AqlQuery;
pub use source::{ArangoSource, HubSource, MemorySource};
