//! AQL queries sent to ThermoHub.
//!
//! User input only ever reaches the server through bind variables.

use serde::Serialize;
use serde_json::{Map, Value as JsonValue};

/// `_id` of the thermodataset whose `properties.symbol` equals `@symbol`.
pub const THERMO_DATASET_ID: &str = "FOR u IN thermodatasets \
FILTER u.properties.symbol == @symbol \
RETURN u._id";

/// Symbols of all thermodatasets, sorted.
pub const THERMO_DATASET_SYMBOLS: &str = "FOR u IN thermodatasets \
SORT u.properties.symbol \
RETURN u.properties.symbol";

/// Whole ThermoFun database of the thermodataset `@idThermoDataSet`.
///
/// Elements, substances and reactions are linked to the dataset through the inbound
/// `basis`, `product` and `takes` edges and returned sorted by symbol.
pub const THERMO_DATABASE_FROM_THERMO_DATASET: &str = "LET ds = DOCUMENT(@idThermoDataSet) \
FILTER ds != null \
RETURN { \
thermodataset: ds.properties, \
elements: (FOR v IN 1..1 INBOUND ds basis SORT v.properties.symbol RETURN v.properties), \
substances: (FOR v IN 1..1 INBOUND ds product SORT v.properties.symbol RETURN v.properties), \
reactions: (FOR v IN 1..1 INBOUND ds takes SORT v.properties.symbol RETURN v.properties) \
}";

/// An AQL query with its bind variables.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AqlQuery {
    pub query: &'static str,
    #[serde(rename = "bindVars", skip_serializing_if = "Map::is_empty")]
    pub bind_vars: Map<String, JsonValue>,
}

impl AqlQuery {
    pub fn new(query: &'static str) -> Self {
        Self {
            query,
            bind_vars: Map::new(),
        }
    }

    /// Add a bind variable (`@name` in the query text).
    pub fn bind(mut self, name: &str, value: impl Into<JsonValue>) -> Self {
        self.bind_vars.insert(name.to_string(), value.into());
        self
    }

    pub fn thermo_dataset_id(symbol: &str) -> Self {
        Self::new(THERMO_DATASET_ID).bind("symbol", symbol)
    }

    pub fn thermo_dataset_symbols() -> Self {
        Self::new(THERMO_DATASET_SYMBOLS)
    }

    pub fn thermo_database(id_thermo_dataset: &str) -> Self {
        Self::new(THERMO_DATABASE_FROM_THERMO_DATASET).bind("idThermoDataSet", id_thermo_dataset)
    }
}
