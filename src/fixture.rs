//! Fixtures for tests

use crate::config::AnalysisConfig;
use crate::ecm::{Ecm, EcmMap, FuelType, ResultsDocument, StateStockMap};
use crate::input::read_results;
use crate::state::StateID;
use indexmap::IndexSet;
use map_macro::btree_map;
use rstest::fixture;
use serde_json::{Map, Value, json};
use std::fs;
use tempfile::tempdir;

/// Assert that an error with the given message occurs
macro_rules! assert_error {
    ($result:expr, $msg:expr) => {
        assert_eq!(
            $result.unwrap_err().chain().next().unwrap().to_string(),
            $msg
        );
    };
}
pub(crate) use assert_error;

/// A small configuration: two ECMs, one building type, years 2025 and 2026
#[fixture]
pub fn config() -> AnalysisConfig {
    AnalysisConfig {
        start_year: 2025,
        end_year: 2026,
        state_reference_ecm: "A".into(),
        building_types: vec!["Single Family Homes (New)".into()],
        share_ecms: vec!["A".into(), "B".into()],
        summary_ecm: "A".into(),
        summary_year: 2026,
        summary_label: "A".into(),
        fuel_types: [("B".into(), FuelType::NaturalGas)]
            .into_iter()
            .collect(),
        ..AnalysisConfig::default()
    }
}

/// Build the results file entry for one ECM.
///
/// The by-category stock is the same for every state listed, with a single building type.
pub fn ecm_json(
    competed: [f64; 2],
    baseline: [f64; 2],
    electric: f64,
    natural_gas: f64,
    states: &[&str],
) -> Value {
    let by_state: Map<String, Value> = states
        .iter()
        .map(|state| {
            let value = json!({
                "Single Family Homes (New)": {
                    "Heating (Equip.)": {
                        "Electric": {"2025": electric, "2026": electric},
                        "Natural Gas": {"2025": natural_gas, "2026": natural_gas},
                        "Distillate/Other": {"2025": 0.0, "2026": 0.0}
                    }
                }
            });
            ((*state).to_string(), value)
        })
        .collect();

    json!({
        "Markets and Savings (Overall)": {
            "Max adoption potential": {
                "Measure Stock (Competed)(units equipment)": {
                    "2024": 0.0, "2025": competed[0], "2026": competed[1]
                },
                "Baseline Stock (Uncompeted)(units equipment)": {
                    "2024": 1.0, "2025": baseline[0], "2026": baseline[1]
                }
            }
        },
        "Markets and Savings (by Category)": {
            "Max adoption potential": {
                "Measure Stock (units equipment)": by_state
            }
        }
    })
}

/// A results file with two ECMs, two states and an excluded ECM with a different schema
#[fixture]
pub fn results_json() -> Value {
    json!({
        "A": ecm_json([50.0, 75.0], [100.0, 100.0], 1.0, 10.0, &["AL", "TX"]),
        "B": ecm_json([25.0, 25.0], [100.0, 100.0], 2.0, 20.0, &["AL", "TX"]),
        "On-site Generation": {"Markets and Savings (Overall)": {}}
    })
}

/// The loaded form of [`results_json`]
#[fixture]
pub fn results(results_json: Value, config: AnalysisConfig) -> ResultsDocument {
    let dir = tempdir().unwrap();
    let file_path = dir.path().join("ecm_results.json");
    fs::write(&file_path, results_json.to_string()).unwrap();
    read_results(&file_path, &config).unwrap()
}

/// A single ECM with electric stock for one state and building type
#[fixture]
pub fn ecm() -> Ecm {
    let state_id: StateID = "AL".into();
    let mut state_stock = StateStockMap::new();
    state_stock.insert(
        (
            state_id.clone(),
            "Single Family Homes (New)".into(),
            FuelType::Electric,
        ),
        btree_map! {2025 => 1.0},
    );

    Ecm {
        id: "A".into(),
        fuel_type: FuelType::Electric,
        competed_stock: btree_map! {2025 => 50.0},
        baseline_stock: btree_map! {2025 => 100.0},
        states: IndexSet::from([state_id]),
        state_stock,
    }
}

/// A map containing only [`ecm`]
#[fixture]
pub fn ecms(ecm: Ecm) -> EcmMap {
    [(ecm.id.clone(), ecm)].into_iter().collect()
}
