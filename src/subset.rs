//! Element-filtered subsets of a ThermoDataSet.
//!
//! A subset keeps the substances made only of the selected elements, the selected
//! elements themselves, and the reactions whose reactants all survive.

use crate::formula::{CHARGE_SYMBOL, formula_symbols};
use crate::models::ThermoDatabase;
use crate::models::dataset::{FORMULA_FIELD, REACTANTS_FIELD, SYMBOL_FIELD, str_field};
use serde_json::Value as JsonValue;
use std::collections::{BTreeSet, HashSet};
use tracing::{debug, warn};

/// Elements selected for a subset, resolved against one dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementFilter {
    symbols: BTreeSet<String>,
    dropped: Vec<String>,
}

impl ElementFilter {
    /// Keep the requested symbols that are elements of the dataset, plus the charge
    /// pseudo-element when asked for. Anything else is dropped, not rejected.
    pub fn new<S: AsRef<str>>(database: &ThermoDatabase, requested: &[S]) -> Self {
        let known = database.element_symbol_set();
        let mut symbols = BTreeSet::new();
        let mut dropped = Vec::new();

        for symbol in requested.iter().map(|s| s.as_ref().trim()) {
            if symbol.is_empty() {
                continue;
            }
            if symbol == CHARGE_SYMBOL || known.contains(symbol) {
                symbols.insert(symbol.to_string());
            } else if !dropped.iter().any(|d| d == symbol) {
                dropped.push(symbol.to_string());
            }
        }

        if !dropped.is_empty() {
            debug!(dropped = ?dropped, "Ignoring symbols that are not elements of the dataset");
        }

        Self { symbols, dropped }
    }

    /// Effective symbols, sorted.
    pub fn symbols(&self) -> &BTreeSet<String> {
        &self.symbols
    }

    /// Requested symbols that were not dataset elements.
    pub fn dropped(&self) -> &[String] {
        &self.dropped
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.symbols.contains(symbol)
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// `<key>-<El1>-<El2>...` in symbol order, or `<key>-none` for an empty filter.
    pub fn file_stem(&self, key: &str) -> String {
        if self.symbols.is_empty() {
            return format!("{}-none", key);
        }
        let joined: Vec<&str> = self.symbols.iter().map(String::as_str).collect();
        format!("{}-{}", key, joined.join("-"))
    }

    fn admits_formula(&self, formula: &str) -> Option<bool> {
        match formula_symbols(formula) {
            Ok(symbols) => Some(symbols.iter().all(|s| self.contains(s))),
            Err(e) => {
                warn!(error = %e, "Dropping substance with unparsable formula");
                None
            }
        }
    }
}

/// Build the subset of `database` selected by `filter`.
pub fn filter_database(database: &ThermoDatabase, filter: &ElementFilter) -> ThermoDatabase {
    let elements: Vec<JsonValue> = database
        .elements
        .iter()
        .filter(|record| str_field(record, SYMBOL_FIELD).is_some_and(|s| filter.contains(s)))
        .cloned()
        .collect();

    let substances: Vec<JsonValue> = database
        .substances
        .iter()
        .filter(|record| match str_field(record, FORMULA_FIELD) {
            Some(formula) => filter.admits_formula(formula).unwrap_or(false),
            None => {
                warn!(
                    substance = str_field(record, SYMBOL_FIELD).unwrap_or("?"),
                    "Dropping substance without formula"
                );
                false
            }
        })
        .cloned()
        .collect();

    let kept: HashSet<&str> = substances
        .iter()
        .filter_map(|record| str_field(record, SYMBOL_FIELD))
        .collect();

    let reactions: Vec<JsonValue> = database
        .reactions
        .iter()
        .filter(|record| reactants_kept(record, &kept))
        .cloned()
        .collect();

    debug!(
        elements = elements.len(),
        substances = substances.len(),
        reactions = reactions.len(),
        "Filtered database"
    );

    ThermoDatabase {
        thermodataset: database.thermodataset.clone(),
        elements,
        substances,
        reactions,
    }
}

/// A reaction survives when it lists reactants and every one of them is kept.
fn reactants_kept(reaction: &JsonValue, kept: &HashSet<&str>) -> bool {
    let Some(reactants) = reaction.get(REACTANTS_FIELD).and_then(JsonValue::as_array) else {
        return false;
    };
    !reactants.is_empty()
        && reactants.iter().all(|reactant| {
            str_field(reactant, SYMBOL_FIELD).is_some_and(|symbol| kept.contains(symbol))
        })
}
