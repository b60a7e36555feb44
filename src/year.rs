//! Code for working with years.
use anyhow::{Context, Result, ensure};
use itertools::Itertools;
use std::collections::BTreeMap;
use std::ops::RangeInclusive;

/// A value for each year, ordered by year
pub type YearSeries = BTreeMap<u32, f64>;

/// Parse a year key from the results file (e.g. `"2025"`).
pub fn parse_year_key(s: &str) -> Result<u32> {
    s.trim()
        .parse::<u32>()
        .ok()
        .with_context(|| format!("Invalid year: {s}"))
}

/// Get the value for `year` from `series`, failing if the year is absent.
pub fn value_for_year(series: &YearSeries, year: u32) -> Result<f64> {
    series
        .get(&year)
        .copied()
        .with_context(|| format!("No value for year {year}"))
}

/// Check that `series` has a value for every year in `years`.
///
/// The error lists all missing years.
pub fn check_year_coverage(series: &YearSeries, years: &RangeInclusive<u32>) -> Result<()> {
    let missing = years
        .clone()
        .filter(|year| !series.contains_key(year))
        .collect_vec();
    ensure!(
        missing.is_empty(),
        "Missing values for years: {}",
        missing.iter().join(", ")
    );

    Ok(())
}
