//! A single ECM in a single year, compared across states.
use super::per_state::StateTables;
use crate::ecm::EcmID;
use crate::state::StateID;
use anyhow::{Context, Result};
use indexmap::IndexMap;

/// Figures for one state in a [`StateSummary`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateSummaryRow {
    /// Measure stock summed over building types
    pub measure_stock: f64,
    /// Share of the state's total measure stock, as a proportion
    pub share: f64,
}

/// Measure stock and share of one ECM in one year, for every state
#[derive(Debug, PartialEq)]
pub struct StateSummary {
    /// The ECM summarised
    pub ecm_id: EcmID,
    /// The year summarised
    pub year: u32,
    /// One row per state, in the same order as the state tables
    pub rows: IndexMap<StateID, StateSummaryRow>,
}

/// Extract measure stock and share for one ECM and year from the state tables
pub fn extract_summary(
    states: &IndexMap<StateID, StateTables>,
    ecm_id: &EcmID,
    year: u32,
) -> Result<StateSummary> {
    let rows = states
        .iter()
        .map(|(state_id, tables)| {
            let row = StateSummaryRow {
                measure_stock: tables.stock.get(ecm_id, year)?,
                share: tables.share.get(ecm_id, year)?,
            };
            Ok((state_id.clone(), row))
        })
        .collect::<Result<_>>()
        .with_context(|| format!("Failed to summarise ECM {ecm_id} for {year}"))?;

    Ok(StateSummary {
        ecm_id: ecm_id.clone(),
        year,
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::per_state::aggregate_states;
    use crate::config::AnalysisConfig;
    use crate::ecm::ResultsDocument;
    use crate::fixture::{assert_error, config, results};
    use float_cmp::approx_eq;
    use rstest::{fixture, rstest};

    #[fixture]
    fn states(results: ResultsDocument, config: AnalysisConfig) -> IndexMap<StateID, StateTables> {
        aggregate_states(&results, &config).unwrap()
    }

    #[rstest]
    fn test_extract_summary(states: IndexMap<StateID, StateTables>) {
        let summary = extract_summary(&states, &"B".into(), 2026).unwrap();
        assert_eq!(summary.year, 2026);
        assert!(summary.rows.keys().map(|id| id.0.as_ref()).eq(["AL", "TX"]));

        let row = summary.rows[&StateID::new("TX")];
        assert_eq!(row.measure_stock, 20.0);
        assert!(approx_eq!(f64, row.share, 20.0 / 21.0));
    }

    #[rstest]
    fn test_extract_summary_missing_year(states: IndexMap<StateID, StateTables>) {
        assert_error!(
            extract_summary(&states, &"B".into(), 2050),
            "Failed to summarise ECM B for 2050"
        );
    }

    #[test]
    fn test_extract_summary_no_states() {
        let summary = extract_summary(&IndexMap::new(), &"B".into(), 2050).unwrap();
        assert!(summary.rows.is_empty());
    }
}
