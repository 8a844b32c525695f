//! ThermoHub client library.
//!
//! This library queries ThermoHub, the ArangoDB server holding the ThermoFun
//! thermodatasets, for the elements, substances, substance classes and aggregate
//! states of a ThermoDataSet, and saves a dataset (or an element subset of it) as a
//! local JSON database.

pub mod client;
pub mod config;
pub mod db;
pub mod error;
pub mod format;
pub mod formula;
pub mod models;
pub mod store;
pub mod subset;

pub use client::DatabaseClient;
pub use config::{ClientOptions, Config};
pub use error::{HubError, HubResult};
pub use models::{ConnectionConfig, ThermoDatabase};
pub use store::{DatabaseStore, SavedDatabase};
