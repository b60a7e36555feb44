//! National measure stock, share and stock penetration.
use super::{compute_shares, divide};
use crate::config::{AnalysisConfig, ZeroDenominatorPolicy};
use crate::ecm::EcmMap;
use crate::table::TimeSeriesTable;
use crate::year::value_for_year;
use anyhow::{Context, Result};
use itertools::Itertools;
use std::ops::RangeInclusive;

/// Tables for the whole country
#[derive(Debug, PartialEq)]
pub struct NationalTables {
    /// Measure stock (competed) for every ECM
    pub stock: TimeSeriesTable,
    /// Share of total measure stock for the share ECMs
    pub share: TimeSeriesTable,
    /// Measure stock as a proportion of baseline stock, for every ECM
    pub penetration: TimeSeriesTable,
}

/// Calculate national stock, share and penetration tables
pub fn aggregate_national(ecms: &EcmMap, config: &AnalysisConfig) -> Result<NationalTables> {
    let stock = measure_stock(ecms, config.years())?;
    let share = compute_shares(&stock, config, "national")?;
    let penetration = stock_penetration(ecms, config.years(), config.zero_denominator)?;

    Ok(NationalTables {
        stock,
        share,
        penetration,
    })
}

/// National measure stock (competed) for each ECM and year
pub fn measure_stock(ecms: &EcmMap, years: RangeInclusive<u32>) -> Result<TimeSeriesTable> {
    let mut table = TimeSeriesTable::new(years.clone());
    for ecm in ecms.values() {
        let values = years
            .clone()
            .map(|year| value_for_year(&ecm.competed_stock, year))
            .try_collect()
            .with_context(|| format!("Missing measure stock for ECM {}", ecm.id))?;
        table.insert_column(ecm.id.clone(), values)?;
    }

    Ok(table)
}

/// Stock penetration (competed stock divided by baseline stock) for each ECM and year.
///
/// Values are proportions, not percentages.
pub fn stock_penetration(
    ecms: &EcmMap,
    years: RangeInclusive<u32>,
    policy: ZeroDenominatorPolicy,
) -> Result<TimeSeriesTable> {
    let mut table = TimeSeriesTable::new(years.clone());
    for ecm in ecms.values() {
        let values = years
            .clone()
            .map(|year| {
                let competed = value_for_year(&ecm.competed_stock, year)?;
                let baseline = value_for_year(&ecm.baseline_stock, year)?;
                divide(competed, baseline, policy, || {
                    format!("Baseline stock for ECM {} is zero in {year}", ecm.id)
                })
            })
            .try_collect()?;
        table.insert_column(ecm.id.clone(), values)?;
    }

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecm::{Ecm, ResultsDocument};
    use crate::fixture::{assert_error, config, ecm, ecms, results};
    use map_macro::btree_map;
    use rstest::rstest;

    #[rstest]
    fn test_stock_penetration_two_ecms(results: ResultsDocument) {
        let table =
            stock_penetration(&results.ecms, 2025..=2026, ZeroDenominatorPolicy::Error).unwrap();
        assert_eq!(table.years(), &[2025, 2026]);
        assert_eq!(table.column(&"A".into()).unwrap(), &[0.5, 0.75]);
        assert_eq!(table.column(&"B".into()).unwrap(), &[0.25, 0.25]);
    }

    #[rstest]
    fn test_stock_penetration_matches_ratio(results: ResultsDocument, config: AnalysisConfig) {
        let table = stock_penetration(&results.ecms, config.years(), config.zero_denominator)
            .unwrap();
        for (ecm_id, ecm) in &results.ecms {
            for year in config.years() {
                assert_eq!(
                    table.get(ecm_id, year).unwrap(),
                    ecm.competed_stock[&year] / ecm.baseline_stock[&year]
                );
            }
        }
    }

    #[rstest]
    fn test_stock_penetration_zero_baseline(mut ecm: Ecm) {
        ecm.baseline_stock = btree_map! {2025 => 0.0};
        let ecms: EcmMap = [(ecm.id.clone(), ecm)].into_iter().collect();

        assert_error!(
            stock_penetration(&ecms, 2025..=2025, ZeroDenominatorPolicy::Error),
            "Baseline stock for ECM A is zero in 2025"
        );
        let table = stock_penetration(&ecms, 2025..=2025, ZeroDenominatorPolicy::Zero).unwrap();
        assert_eq!(table.get(&"A".into(), 2025).unwrap(), 0.0);
    }

    #[rstest]
    fn test_measure_stock(ecms: EcmMap) {
        let table = measure_stock(&ecms, 2025..=2025).unwrap();
        assert_eq!(table.column(&"A".into()).unwrap(), &[50.0]);

        // Year outside the series
        assert_error!(
            measure_stock(&ecms, 2025..=2026),
            "Missing measure stock for ECM A"
        );
    }

    #[rstest]
    fn test_aggregate_national(results: ResultsDocument, config: AnalysisConfig) {
        let tables = aggregate_national(&results.ecms, &config).unwrap();
        assert_eq!(tables.stock.column(&"A".into()).unwrap(), &[50.0, 75.0]);
        assert_eq!(tables.stock.column(&"B".into()).unwrap(), &[25.0, 25.0]);
        assert_eq!(tables.share.get(&"B".into(), 2026).unwrap(), 0.25);
        assert_eq!(tables.penetration.get(&"A".into(), 2026).unwrap(), 0.75);
    }
}
