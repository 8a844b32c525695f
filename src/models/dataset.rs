//! ThermoDataSet database models.
//!
//! A ThermoDataSet is fetched from ThermoHub as one JSON document holding the dataset
//! metadata and the `properties` records of its elements, substances and reactions.
//! Records are kept as raw JSON so that saving a dataset writes back exactly what the
//! server returned (minus `null` fields).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::collections::HashSet;

/// Record field holding the element / substance / reaction symbol.
pub const SYMBOL_FIELD: &str = "symbol";
pub const FORMULA_FIELD: &str = "formula";
pub const CLASS_FIELD: &str = "class_";
pub const AGGREGATE_STATE_FIELD: &str = "aggregate_state";
pub const REACTANTS_FIELD: &str = "reactants";

/// A complete ThermoDataSet database, in the layout ThermoFun reads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThermoDatabase {
    /// Metadata of the thermodataset document (symbol, name, comment, ...)
    #[serde(default)]
    pub thermodataset: Map<String, JsonValue>,
    #[serde(default)]
    pub elements: Vec<JsonValue>,
    #[serde(default)]
    pub substances: Vec<JsonValue>,
    #[serde(default)]
    pub reactions: Vec<JsonValue>,
}

impl ThermoDatabase {
    /// Build a database from a raw server document, dropping every `null` field first.
    pub fn from_document(mut document: JsonValue) -> Result<Self, serde_json::Error> {
        strip_nulls(&mut document);
        serde_json::from_value(document)
    }

    /// Element symbols as raw JSON text (e.g. `"Mg"` including the quotes).
    pub fn element_symbols(&self) -> Vec<String> {
        raw_field_values(&self.elements, SYMBOL_FIELD)
    }

    /// Substance symbols as raw JSON text (e.g. `"Zoisite"` including the quotes).
    pub fn substance_symbols(&self) -> Vec<String> {
        raw_field_values(&self.substances, SYMBOL_FIELD)
    }

    /// Distinct substance classes in first-seen order, as raw JSON text.
    pub fn substance_classes(&self) -> Vec<String> {
        distinct(raw_field_values(&self.substances, CLASS_FIELD))
    }

    /// Distinct substance aggregate states in first-seen order, as raw JSON text.
    pub fn substance_aggregate_states(&self) -> Vec<String> {
        distinct(raw_field_values(&self.substances, AGGREGATE_STATE_FIELD))
    }

    /// Plain element symbols (no JSON quoting), skipping records without a string symbol.
    pub fn element_symbol_set(&self) -> HashSet<String> {
        self.elements
            .iter()
            .filter_map(|record| str_field(record, SYMBOL_FIELD))
            .map(String::from)
            .collect()
    }

    /// Symbol of the thermodataset itself, if present.
    pub fn dataset_symbol(&self) -> Option<&str> {
        self.thermodataset
            .get(SYMBOL_FIELD)
            .and_then(JsonValue::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty() && self.substances.is_empty() && self.reactions.is_empty()
    }
}

/// Get a string field of a JSON record.
pub fn str_field<'a>(record: &'a JsonValue, field: &str) -> Option<&'a str> {
    record.get(field).and_then(JsonValue::as_str)
}

/// Remove `null`-valued object entries (recursively) and `null` array items.
pub fn strip_nulls(value: &mut JsonValue) {
    match value {
        JsonValue::Object(map) => {
            map.retain(|_, v| !v.is_null());
            map.values_mut().for_each(strip_nulls);
        }
        JsonValue::Array(items) => {
            items.retain(|v| !v.is_null());
            items.iter_mut().for_each(strip_nulls);
        }
        _ => {}
    }
}

fn raw_field_values(records: &[JsonValue], field: &str) -> Vec<String> {
    records
        .iter()
        .filter_map(|record| record.get(field))
        .map(JsonValue::to_string)
        .collect()
}

fn distinct(values: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .into_iter()
        .filter(|v| seen.insert(v.clone()))
        .collect()
}
