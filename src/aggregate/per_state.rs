//! Measure stock and share for each state.
use super::compute_shares;
use crate::config::AnalysisConfig;
use crate::ecm::{EcmMap, ResultsDocument};
use crate::state::{BuildingTypeID, StateID};
use crate::table::TimeSeriesTable;
use crate::year::value_for_year;
use anyhow::{Context, Result};
use indexmap::IndexMap;
use log::debug;
use std::ops::RangeInclusive;

/// Tables for a single state
#[derive(Debug, PartialEq)]
pub struct StateTables {
    /// Measure stock summed over building types, for every ECM
    pub stock: TimeSeriesTable,
    /// Share of the state's total measure stock for the share ECMs
    pub share: TimeSeriesTable,
}

/// Calculate stock and share tables for every state in the results
pub fn aggregate_states(
    results: &ResultsDocument,
    config: &AnalysisConfig,
) -> Result<IndexMap<StateID, StateTables>> {
    let mut tables = IndexMap::new();
    for state_id in &results.states {
        debug!("Aggregating results for state {state_id}");
        let stock =
            state_measure_stock(&results.ecms, state_id, &config.building_types, config.years())
                .with_context(|| format!("Failed to calculate measure stock for {state_id}"))?;
        let share = compute_shares(&stock, config, state_id.0.as_ref())?;
        tables.insert(state_id.clone(), StateTables { stock, share });
    }

    Ok(tables)
}

/// Measure stock for one state, summed over the given building types.
///
/// The stock for each ECM is taken from that ECM's fuel field.
pub fn state_measure_stock(
    ecms: &EcmMap,
    state_id: &StateID,
    building_types: &[BuildingTypeID],
    years: RangeInclusive<u32>,
) -> Result<TimeSeriesTable> {
    let mut table = TimeSeriesTable::new(years.clone());
    for ecm in ecms.values() {
        let mut values = vec![0.0; table.years().len()];
        for building_type in building_types {
            let series = ecm.stock_for(state_id, building_type)?;
            for (value, year) in values.iter_mut().zip(years.clone()) {
                *value += value_for_year(series, year)?;
            }
        }
        table.insert_column(ecm.id.clone(), values)?;
    }

    Ok(table)
}
