//! Shared fixture: a small aqueous ThermoDataSet shaped like the ThermoHub documents.

#![allow(dead_code)]

use serde_json::{Value, json};
use thermohub_client::ThermoDatabase;

pub const MINI: &str = "mini17";

fn substance(symbol: &str, formula: &str, class: Value, state: Value) -> Value {
    json!({
        "symbol": symbol,
        "name": symbol,
        "formula": formula,
        "class_": class,
        "aggregate_state": state,
        "comment": null
    })
}

/// Raw dataset document as the server returns it, `null` fields included.
pub fn mini_document() -> Value {
    let aqsolute = json!({ "2": "SC_AQSOLUTE" });
    let gasfluid = json!({ "1": "SC_GASFLUID" });
    let component = json!({ "0": "SC_COMPONENT" });
    let aqsolvent = json!({ "3": "SC_AQSOLVENT" });
    let aqueous = json!({ "4": "AS_AQUEOUS" });
    let gas = json!({ "0": "AS_GAS" });
    let crystal = json!({ "3": "AS_CRYSTAL" });

    let elements: Vec<Value> = ["Al", "C", "Ca", "H", "Mg", "O", "Si", "Zz"]
        .iter()
        .map(|symbol| json!({ "symbol": symbol, "class_": { "0": "ELEMENT" }, "isotope_mass": null }))
        .collect();

    json!({
        "thermodataset": {
            "symbol": MINI,
            "name": "Mini aqueous dataset",
            "comment": null,
            "stype": { "0": "BASE" }
        },
        "elements": elements,
        "substances": [
            substance("Al+3", "Al+3", aqsolute.clone(), aqueous.clone()),
            substance("CO2", "CO2", gasfluid, gas),
            substance("Ca+2", "Ca+2", aqsolute.clone(), aqueous.clone()),
            substance("Calcite", "CaCO3", component.clone(), crystal.clone()),
            substance("Corundum", "Al2O3", component.clone(), crystal.clone()),
            substance("H2O@", "H2O@", aqsolvent, aqueous.clone()),
            substance("Kyanite", "Al2SiO5", component.clone(), crystal.clone()),
            substance("Mg+2", "Mg+2", aqsolute.clone(), aqueous.clone()),
            substance("OH-", "OH-", aqsolute, aqueous),
            substance("Quartz", "SiO2", component.clone(), crystal.clone()),
            substance("Zoisite", "Ca2Al3Si3O12(OH)", component, crystal)
        ],
        "reactions": [
            {
                "symbol": "Calcite-dissolution",
                "reactants": [
                    { "symbol": "Calcite", "coefficient": -1 },
                    { "symbol": "H2O@", "coefficient": -1 },
                    { "symbol": "Ca+2", "coefficient": 1 },
                    { "symbol": "CO2", "coefficient": 1 },
                    { "symbol": "OH-", "coefficient": 2 }
                ],
                "comment": null
            },
            {
                "symbol": "Corundum-dissolution",
                "reactants": [
                    { "symbol": "Corundum", "coefficient": -1 },
                    { "symbol": "H2O@", "coefficient": -3 },
                    { "symbol": "Al+3", "coefficient": 2 },
                    { "symbol": "OH-", "coefficient": 6 }
                ]
            },
            {
                "symbol": "Kyanite-formation",
                "reactants": [
                    { "symbol": "Corundum", "coefficient": -1 },
                    { "symbol": "Quartz", "coefficient": -1 },
                    { "symbol": "Kyanite", "coefficient": 1 }
                ]
            }
        ]
    })
}

pub fn mini_database() -> ThermoDatabase {
    ThermoDatabase::from_document(mini_document()).expect("fixture is a valid database")
}

/// Second dataset, so listings have more than one entry.
pub fn tiny_database(symbol: &str) -> ThermoDatabase {
    ThermoDatabase::from_document(json!({
        "thermodataset": { "symbol": symbol },
        "elements": [{ "symbol": "O" }, { "symbol": "Si" }],
        "substances": [{ "symbol": "Quartz", "formula": "SiO2" }],
        "reactions": []
    }))
    .expect("fixture is a valid database")
}

/// Dataset whose element list has no `Zz` entry, though it holds a charged species.
pub fn uncharged_elements_database(symbol: &str) -> ThermoDatabase {
    ThermoDatabase::from_document(json!({
        "thermodataset": { "symbol": symbol },
        "elements": [{ "symbol": "Al" }, { "symbol": "O" }],
        "substances": [
            { "symbol": "Al+3", "formula": "Al+3" },
            { "symbol": "Corundum", "formula": "Al2O3" }
        ],
        "reactions": []
    }))
    .expect("fixture is a valid database")
}
