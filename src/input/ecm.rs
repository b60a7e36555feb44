//! Code for reading ECM results from the JSON results file.
use super::{input_err_msg, read_json};
use crate::config::AnalysisConfig;
use crate::ecm::{Ecm, EcmID, EcmMap, FuelType, ResultsDocument, StateStockMap};
use crate::state::{BuildingTypeID, StateID};
use crate::year::{YearSeries, check_year_coverage, parse_year_key};
use anyhow::{Context, Result, bail, ensure};
use indexmap::{IndexMap, IndexSet};
use itertools::Itertools;
use log::debug;
use serde_json::{Map, Value};
use std::path::Path;
use std::str::FromStr;

/// The section containing national results
const OVERALL_SECTION: &str = "Markets and Savings (Overall)";

/// The section containing results broken down by state, building type, end use and fuel
const BY_CATEGORY_SECTION: &str = "Markets and Savings (by Category)";

/// National measure stock
const COMPETED_STOCK_METRIC: &str = "Measure Stock (Competed)(units equipment)";

/// National baseline stock, the denominator for stock penetration
const BASELINE_STOCK_METRIC: &str = "Baseline Stock (Uncompeted)(units equipment)";

/// Measure stock in the by-category section
const STATE_STOCK_METRIC: &str = "Measure Stock (units equipment)";

/// Read the results file and check it against the analysis configuration.
///
/// # Arguments
///
/// * `file_path` - Path to the JSON results file
/// * `config` - The analysis configuration
///
/// # Returns
///
/// The ECMs in the file (other than excluded ones) along with the list of states, or an error if
/// the file is missing, malformed or inconsistent with `config`.
pub fn read_results(file_path: &Path, config: &AnalysisConfig) -> Result<ResultsDocument> {
    let raw: IndexMap<String, Value> = read_json(file_path)?;
    read_results_from_map(raw, config).with_context(|| input_err_msg(file_path))
}

/// Read results from the top-level map of the results file
fn read_results_from_map(
    raw: IndexMap<String, Value>,
    config: &AnalysisConfig,
) -> Result<ResultsDocument> {
    let mut ecms = EcmMap::new();
    for (name, value) in raw {
        if config.is_excluded(&name) {
            debug!("Skipping excluded ECM: {name}");
            continue;
        }

        let id = EcmID::from(name);
        let ecm = read_ecm(id.clone(), &value, config)
            .with_context(|| format!("Invalid results for ECM {id}"))?;
        ecms.insert(id, ecm);
    }
    ensure!(!ecms.is_empty(), "Results file contains no ECMs");

    check_required_ecms(&ecms, config)?;
    let states = ecms[&config.state_reference_ecm].states.clone();
    check_states(&ecms, &states)?;
    for ecm in ecms.values() {
        check_ecm_years(ecm, &states, config)
            .with_context(|| format!("Incomplete results for ECM {}", ecm.id))?;
    }

    Ok(ResultsDocument { ecms, states })
}

/// Read the results for a single ECM
fn read_ecm(id: EcmID, value: &Value, config: &AnalysisConfig) -> Result<Ecm> {
    let overall = get_path(value, &[OVERALL_SECTION, &config.scenario])?;
    let competed_stock = read_year_series(get_path(overall, &[COMPETED_STOCK_METRIC])?)
        .with_context(|| format!("Invalid values for {COMPETED_STOCK_METRIC}"))?;
    let baseline_stock = read_year_series(get_path(overall, &[BASELINE_STOCK_METRIC])?)
        .with_context(|| format!("Invalid values for {BASELINE_STOCK_METRIC}"))?;

    let by_state = get_object(
        value,
        &[BY_CATEGORY_SECTION, &config.scenario, STATE_STOCK_METRIC],
    )?;
    let mut states = IndexSet::new();
    let mut state_stock = StateStockMap::new();
    for (state, state_value) in by_state {
        let state_id = StateID::from(state.as_str());
        read_state_stock(
            &state_id,
            state_value,
            &config.building_types,
            &config.end_use,
            &mut state_stock,
        )
        .with_context(|| format!("Invalid stock for state {state_id}"))?;
        states.insert(state_id);
    }

    Ok(Ecm {
        fuel_type: config.fuel_type_for(&id),
        id,
        competed_stock,
        baseline_stock,
        states,
        state_stock,
    })
}

/// Read the stock for each fuel and building type within a single state.
///
/// Only the given building types are read; any others are ignored. Fuels other than those in
/// [`FuelType`] are also ignored.
fn read_state_stock(
    state_id: &StateID,
    value: &Value,
    building_types: &[BuildingTypeID],
    end_use: &str,
    state_stock: &mut StateStockMap,
) -> Result<()> {
    let by_building_type = value.as_object().context("Expected an object")?;
    let missing = building_types
        .iter()
        .filter(|building_type| !by_building_type.contains_key(building_type.0.as_ref()))
        .collect_vec();
    ensure!(
        missing.is_empty(),
        "Missing building types: {}",
        missing.iter().join(", ")
    );

    for building_type in building_types {
        let by_fuel = get_object(&by_building_type[building_type.0.as_ref()], &[end_use])
            .with_context(|| format!("Invalid stock for building type {building_type}"))?;
        for (fuel, series) in by_fuel {
            let Ok(fuel_type) = FuelType::from_str(fuel) else {
                continue;
            };

            let series = read_year_series(series).with_context(|| {
                format!("Invalid values for building type {building_type}, fuel {fuel}")
            })?;
            state_stock.insert(
                (state_id.clone(), building_type.clone(), fuel_type),
                series,
            );
        }
    }

    Ok(())
}

/// Follow a path of keys through nested JSON objects
fn get_path<'a>(value: &'a Value, path: &[&str]) -> Result<&'a Value> {
    let mut current = value;
    for (depth, key) in path.iter().enumerate() {
        let Some(next) = current.get(*key) else {
            bail!("Missing key '{key}' at '{}'", path[..depth].iter().join(" > "));
        };
        current = next;
    }

    Ok(current)
}

/// Follow a path of keys through nested JSON objects, expecting an object at the end
fn get_object<'a>(value: &'a Value, path: &[&str]) -> Result<&'a Map<String, Value>> {
    get_path(value, path)?
        .as_object()
        .with_context(|| format!("Expected an object at '{}'", path.join(" > ")))
}

/// Read a map of year keys to numeric values
fn read_year_series(value: &Value) -> Result<YearSeries> {
    let map = value
        .as_object()
        .context("Expected an object with a value for each year")?;

    let mut series = YearSeries::new();
    for (key, value) in map {
        let year = parse_year_key(key)?;
        let value = value
            .as_f64()
            .with_context(|| format!("Value for year {year} is not a number"))?;
        ensure!(value.is_finite(), "Value for year {year} is not finite");
        series.insert(year, value);
    }

    Ok(series)
}

/// Check that the ECMs named in the configuration are all present in the results.
///
/// Entries in `fuel_types` for excluded ECMs are not required, as those ECMs are never read.
fn check_required_ecms(ecms: &EcmMap, config: &AnalysisConfig) -> Result<()> {
    let fuel_type_ecms = config
        .fuel_types
        .keys()
        .filter(|ecm_id| !config.is_excluded(&ecm_id.0));
    let missing = config
        .share_ecms
        .iter()
        .chain([&config.state_reference_ecm, &config.summary_ecm])
        .chain(fuel_type_ecms)
        .unique()
        .filter(|ecm_id| !ecms.contains_key(*ecm_id))
        .collect_vec();
    ensure!(
        missing.is_empty(),
        "The following ECMs are required by the analysis configuration but are missing from the \
        results file: {}",
        missing.iter().join(", ")
    );

    Ok(())
}

/// Check that every ECM has results for exactly the same states as the reference ECM
fn check_states(ecms: &EcmMap, states: &IndexSet<StateID>) -> Result<()> {
    ensure!(!states.is_empty(), "No states found in results");

    for ecm in ecms.values() {
        let missing = states.difference(&ecm.states).collect_vec();
        let extra = ecm.states.difference(states).collect_vec();
        ensure!(
            missing.is_empty() && extra.is_empty(),
            "ECM {} has a different set of states from other ECMs (missing: [{}], extra: [{}])",
            ecm.id,
            missing.iter().join(", "),
            extra.iter().join(", ")
        );
    }

    Ok(())
}

/// Check that all the series used for an ECM cover every year of the analysis
fn check_ecm_years(ecm: &Ecm, states: &IndexSet<StateID>, config: &AnalysisConfig) -> Result<()> {
    let years = config.years();
    check_year_coverage(&ecm.competed_stock, &years)
        .with_context(|| format!("Invalid values for {COMPETED_STOCK_METRIC}"))?;
    check_year_coverage(&ecm.baseline_stock, &years)
        .with_context(|| format!("Invalid values for {BASELINE_STOCK_METRIC}"))?;

    for (state_id, building_type) in states.iter().cartesian_product(&config.building_types) {
        let series = ecm.stock_for(state_id, building_type)?;
        check_year_coverage(series, &years).with_context(|| {
            format!("Invalid values for state {state_id}, building type {building_type}")
        })?;
    }

    Ok(())
}
