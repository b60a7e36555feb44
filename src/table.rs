//! Tables of values by year and ECM, the form in which aggregated results are written and plotted.
use crate::ecm::EcmID;
use anyhow::{Context, Result, ensure};
use indexmap::IndexMap;

/// A table with a row for each year and a column for each ECM
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeriesTable {
    years: Vec<u32>,
    columns: IndexMap<EcmID, Vec<f64>>,
}

impl TimeSeriesTable {
    /// Create a new table with no columns
    pub fn new<I>(years: I) -> Self
    where
        I: IntoIterator<Item = u32>,
    {
        Self {
            years: years.into_iter().collect(),
            columns: IndexMap::new(),
        }
    }

    /// Add a column to the table.
    ///
    /// There must be one value for each year and the ECM must not already have a column.
    pub fn insert_column(&mut self, ecm_id: EcmID, values: Vec<f64>) -> Result<()> {
        ensure!(
            values.len() == self.years.len(),
            "Column for ECM {ecm_id} has {} values but the table has {} years",
            values.len(),
            self.years.len()
        );
        ensure!(
            !self.columns.contains_key(&ecm_id),
            "Duplicate column for ECM {ecm_id}"
        );
        self.columns.insert(ecm_id, values);

        Ok(())
    }

    /// The years, one for each row
    pub fn years(&self) -> &[u32] {
        &self.years
    }

    /// Iterate over the columns in insertion order
    pub fn columns(&self) -> impl Iterator<Item = (&EcmID, &[f64])> {
        self.columns
            .iter()
            .map(|(ecm_id, values)| (ecm_id, values.as_slice()))
    }

    /// Get the column for the given ECM
    pub fn column(&self, ecm_id: &EcmID) -> Result<&[f64]> {
        self.columns
            .get(ecm_id)
            .map(Vec::as_slice)
            .with_context(|| format!("No column for ECM {ecm_id}"))
    }

    /// Get a single value
    pub fn get(&self, ecm_id: &EcmID, year: u32) -> Result<f64> {
        let row = self
            .years
            .iter()
            .position(|y| *y == year)
            .with_context(|| format!("No row for year {year}"))?;
        Ok(self.column(ecm_id)?[row])
    }

    /// The sum of the given columns for each row
    pub fn row_totals<'a, I>(&self, ecm_ids: I) -> Result<Vec<f64>>
    where
        I: IntoIterator<Item = &'a EcmID>,
    {
        let mut totals = vec![0.0; self.years.len()];
        for ecm_id in ecm_ids {
            for (total, value) in totals.iter_mut().zip(self.column(ecm_id)?) {
                *total += value;
            }
        }

        Ok(totals)
    }

    /// The values of a single row, in column order
    pub fn row(&self, index: usize) -> impl Iterator<Item = f64> + '_ {
        self.columns.values().map(move |values| values[index])
    }

    /// A copy of the table with every value multiplied by `factor`
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            years: self.years.clone(),
            columns: self
                .columns
                .iter()
                .map(|(ecm_id, values)| {
                    let values = values.iter().map(|v| v * factor).collect();
                    (ecm_id.clone(), values)
                })
                .collect(),
        }
    }

    /// The largest value in the table, or zero if the table is empty
    pub fn max_value(&self) -> f64 {
        self.columns
            .values()
            .flatten()
            .copied()
            .fold(0.0, f64::max)
    }
}
