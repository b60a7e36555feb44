//! The aggregation pipeline, which turns loaded results into tables for output.
//!
//! Every stage is a function of the loaded results and the configuration, so the tables can be
//! produced (and tested) without writing any files.
use crate::config::{AnalysisConfig, ShareTotal, ZeroDenominatorPolicy};
use crate::ecm::ResultsDocument;
use crate::state::StateID;
use crate::table::TimeSeriesTable;
use anyhow::{Context, Result, bail};
use indexmap::IndexMap;
use itertools::Itertools;
use log::{debug, info};

pub mod national;
pub mod per_state;
pub mod summary;
use national::{NationalTables, aggregate_national};
use per_state::{StateTables, aggregate_states};
use summary::{StateSummary, extract_summary};

/// All tables produced by an analysis run
#[derive(Debug, PartialEq)]
pub struct AnalysisResults {
    /// Tables for the whole country
    pub national: NationalTables,
    /// Tables for each state, in the order the states appear in the results file
    pub states: IndexMap<StateID, StateTables>,
    /// A single ECM and year, compared across states
    pub summary: StateSummary,
}

/// Aggregate the loaded results into national, state and summary tables
pub fn run_analysis(results: &ResultsDocument, config: &AnalysisConfig) -> Result<AnalysisResults> {
    info!("Aggregating national results for {} ECMs", results.ecms.len());
    let national =
        aggregate_national(&results.ecms, config).context("Failed to aggregate national results")?;

    info!("Aggregating results for {} states", results.states.len());
    let states = aggregate_states(results, config).context("Failed to aggregate state results")?;

    let summary = extract_summary(&states, &config.summary_ecm, config.summary_year)?;

    Ok(AnalysisResults {
        national,
        states,
        summary,
    })
}

/// Divide one value by another, applying `policy` if the denominator is zero.
///
/// # Arguments
///
/// * `numerator` - The value to divide
/// * `denominator` - The value to divide by
/// * `policy` - What to do if `denominator` is zero
/// * `describe` - Describes the zero denominator, for use in error and log messages
fn divide<F>(
    numerator: f64,
    denominator: f64,
    policy: ZeroDenominatorPolicy,
    describe: F,
) -> Result<f64>
where
    F: FnOnce() -> String,
{
    if denominator != 0.0 {
        return Ok(numerator / denominator);
    }

    match policy {
        ZeroDenominatorPolicy::Error => bail!("{}", describe()),
        ZeroDenominatorPolicy::Zero => {
            debug!("{}; treating as not applicable", describe());
            Ok(0.0)
        }
    }
}

/// Calculate the share of total measure stock for each of the share ECMs.
///
/// # Arguments
///
/// * `stock` - Measure stock for every ECM
/// * `config` - The analysis configuration
/// * `scope` - What the table covers (e.g. "national" or a state code), for error messages
///
/// # Returns
///
/// A table with a column for each share ECM, in the configured order.
pub fn compute_shares(
    stock: &TimeSeriesTable,
    config: &AnalysisConfig,
    scope: &str,
) -> Result<TimeSeriesTable> {
    let totals = match config.share_total {
        ShareTotal::AllEcms => stock.row_totals(stock.columns().map(|(ecm_id, _)| ecm_id))?,
        ShareTotal::ShareEcms => stock.row_totals(&config.share_ecms)?,
    };

    let mut shares = TimeSeriesTable::new(stock.years().iter().copied());
    for ecm_id in &config.share_ecms {
        let values = stock
            .column(ecm_id)?
            .iter()
            .zip(&totals)
            .zip(stock.years())
            .map(|((value, total), year)| {
                divide(*value, *total, config.zero_denominator, || {
                    format!("Total measure stock ({scope}) is zero in {year}")
                })
            })
            .try_collect()?;
        shares.insert_column(ecm_id.clone(), values)?;
    }

    Ok(shares)
}
