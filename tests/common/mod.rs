//! A synthetic results file covering the default analysis configuration.
#![allow(dead_code)]
use serde_json::{Map, Value, json};
use std::fs;
use std::path::{Path, PathBuf};

/// States in the results file, in file order
pub const STATES: [&str; 3] = ["AL", "CA", "TX"];

/// Every building type in the default configuration
pub const BUILDING_TYPES: [&str; 6] = [
    "Single Family Homes (New)",
    "Multi Family Homes (New)",
    "Manufactured Homes (New)",
    "Single Family Homes (Existing)",
    "Multi Family Homes (Existing)",
    "Manufactured Homes (Existing)",
];

/// The ECMs in the results file, apart from the excluded one.
///
/// The first five are the default share ECMs and the last contributes to the total only.
pub const ECMS: [&str; 6] = [
    "(R) ESTAR GSHP (NG Furnace)",
    "(R) ESTAR HP FS (NG Furnace)",
    "(R) Ref. Case NG Heat, No Cooling",
    "(R) Ref. Case NG Furnace & AC",
    "(R) ESTAR HP FS (NG Heat, No Cool)",
    "(R) Best Windows (NG Furnace)",
];

/// Baseline stock for every ECM and year
pub const BASELINE_STOCK: f64 = 10_000.0;

/// National measure stock for an ECM
pub fn competed_stock(ecm: usize, year: u32) -> f64 {
    100.0 * (ecm + 1) as f64 + 10.0 * f64::from(year - 2024)
}

/// Electric stock for an ECM in one building type (the same for every state)
pub fn electric_stock(ecm: usize, building_type: usize, year: u32) -> f64 {
    ((ecm + 1) * (building_type + 1)) as f64 + f64::from(year - 2024)
}

/// Natural gas stock for an ECM in one building type (the same for every state)
pub fn natural_gas_stock(ecm: usize, building_type: usize, year: u32) -> f64 {
    10.0 * electric_stock(ecm, building_type, year)
}

/// A year series covering 2024 to 2050
fn year_series<F>(value: F) -> Value
where
    F: Fn(u32) -> f64,
{
    let map: Map<String, Value> = (2024..=2050)
        .map(|year| (year.to_string(), json!(value(year))))
        .collect();
    Value::Object(map)
}

/// The results file entry for one ECM
fn ecm_json(ecm: usize) -> Value {
    let by_building_type: Map<String, Value> = BUILDING_TYPES
        .iter()
        .enumerate()
        .map(|(building_type, name)| {
            let value = json!({
                "Heating (Equip.)": {
                    "Electric": year_series(|year| electric_stock(ecm, building_type, year)),
                    "Natural Gas": year_series(|year| natural_gas_stock(ecm, building_type, year)),
                    "Distillate/Other": year_series(|_| 1.0)
                },
                "Cooling (Equip.)": {
                    "Electric": year_series(|_| 5.0)
                }
            });
            ((*name).to_string(), value)
        })
        .collect();
    let by_state: Map<String, Value> = STATES
        .iter()
        .map(|state| ((*state).to_string(), Value::Object(by_building_type.clone())))
        .collect();

    json!({
        "Markets and Savings (Overall)": {
            "Max adoption potential": {
                "Measure Stock (Competed)(units equipment)":
                    year_series(|year| competed_stock(ecm, year)),
                "Baseline Stock (Uncompeted)(units equipment)": year_series(|_| BASELINE_STOCK)
            }
        },
        "Markets and Savings (by Category)": {
            "Max adoption potential": {
                "Measure Stock (units equipment)": by_state
            }
        }
    })
}

/// The whole results file, including an excluded ECM with a different layout
pub fn results_json() -> Value {
    let mut map: Map<String, Value> = ECMS
        .iter()
        .enumerate()
        .map(|(ecm, name)| ((*name).to_string(), ecm_json(ecm)))
        .collect();
    map.insert(
        "On-site Generation".into(),
        json!({"Markets and Savings (Overall)": {"Max adoption potential": {}}}),
    );

    Value::Object(map)
}

/// Write the results file to the given directory and return its path
pub fn write_results_file(dir: &Path) -> PathBuf {
    let file_path = dir.join("ecm_results.json");
    fs::write(&file_path, results_json().to_string()).unwrap();
    file_path
}

/// Read a CSV file written by the program into its header and rows
pub fn read_csv(file_path: &Path) -> (Vec<String>, Vec<Vec<String>>) {
    let mut reader = csv::Reader::from_path(file_path).unwrap();
    let header = reader.headers().unwrap().iter().map(String::from).collect();
    let rows = reader
        .records()
        .map(|record| record.unwrap().iter().map(String::from).collect())
        .collect();
    (header, rows)
}
