//! Data models for the ThermoHub client.
//!
//! This module re-exports all model types used throughout the crate.

pub mod connection;
pub mod dataset;

// Re-export commonly used types
pub use connection::{ConnectionConfig, DEFAULT_DATABASE, DEFAULT_SERVER_URL};
pub use dataset::{ThermoDatabase, strip_nulls};
