//! The module responsible for writing output data to disk.
use crate::aggregate::AnalysisResults;
use crate::aggregate::summary::StateSummary;
use crate::state::StateID;
use crate::table::TimeSeriesTable;
use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fs;
use std::iter;
use std::path::{Path, PathBuf};

pub mod chart;
pub mod metadata;

/// The root folder in which input-specific output folders will be created
const OUTPUT_DIRECTORY_ROOT: &str = "ecm_summary_results";

/// The scope used in file names and titles for national tables
pub const NATIONAL_SCOPE: &str = "national";

/// Get the default output directory for the specified input file
pub fn get_output_dir(input_path: &Path) -> Result<PathBuf> {
    let input_name = input_path
        .file_stem()
        .context("Input path has no file name")?
        .to_str()
        .context("Invalid chars in input file name")?;

    Ok([OUTPUT_DIRECTORY_ROOT, input_name].iter().collect())
}

/// Create a new output directory.
///
/// If the directory already exists and is not empty, it is only reused when `allow_overwrite` is
/// true, in which case its previous contents are removed.
///
/// # Returns
///
/// True if an existing non-empty directory was overwritten.
pub fn create_output_directory(output_dir: &Path, allow_overwrite: bool) -> Result<bool> {
    let overwrite = if let Ok(mut contents) = fs::read_dir(output_dir) {
        if contents.next().is_none() {
            // Already exists and is empty
            return Ok(false);
        }

        ensure!(
            allow_overwrite,
            "Output folder {} already exists and is not empty. Please specify a different \
            output directory or use the --overwrite option.",
            output_dir.display()
        );
        fs::remove_dir_all(output_dir)?;
        true
    } else {
        false
    };

    // Try to create the directory, with parents
    fs::create_dir_all(output_dir)?;

    Ok(overwrite)
}

/// The quantity shown in a time-series table
#[derive(Clone, Copy, Debug, PartialEq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum Metric {
    /// Measure stock (competed), in units of equipment
    EcmMeasureStock,
    /// Share of total measure stock, as a proportion
    EcmMeasureShare,
    /// Stock penetration, as a percentage
    EcmStockPenetration,
}

impl Metric {
    /// The name of the CSV file for this metric and scope
    pub fn table_file_name(self, scope: &str) -> String {
        format!("{scope}_{self}.csv")
    }

    /// The name of the chart image for this metric and scope
    pub fn chart_file_name(self, scope: &str) -> String {
        format!("{scope}_{self}_over_time.png")
    }

    /// A human-readable title for this metric and scope
    pub fn title(self, scope: &str) -> String {
        let scope = if scope == NATIONAL_SCOPE {
            "National"
        } else {
            scope
        };
        let name = match self {
            Self::EcmMeasureStock => "Measure Stock",
            Self::EcmMeasureShare => "Measure Share",
            Self::EcmStockPenetration => "Stock Penetration",
        };

        format!("{scope} ECM {name} over Time")
    }

    /// The label for the value axis
    pub fn axis_label(self) -> &'static str {
        match self {
            Self::EcmMeasureStock => "Measure Stock (Units of Equipment)",
            Self::EcmMeasureShare => "Share",
            Self::EcmStockPenetration => "Stock Penetration (%)",
        }
    }
}

/// A time-series table along with what it shows
#[derive(Debug)]
pub struct TableOutput<'a> {
    /// "national" or a state code
    pub scope: &'a str,
    /// The quantity in the table
    pub metric: Metric,
    /// The values, in the units in which they are written
    pub table: Cow<'a, TimeSeriesTable>,
}

/// Every time-series table to be written for an analysis, in output order
pub fn time_series_outputs(analysis: &AnalysisResults) -> Vec<TableOutput<'_>> {
    let national = &analysis.national;
    let mut outputs = vec![
        TableOutput {
            scope: NATIONAL_SCOPE,
            metric: Metric::EcmMeasureStock,
            table: Cow::Borrowed(&national.stock),
        },
        TableOutput {
            scope: NATIONAL_SCOPE,
            metric: Metric::EcmMeasureShare,
            table: Cow::Borrowed(&national.share),
        },
        TableOutput {
            scope: NATIONAL_SCOPE,
            metric: Metric::EcmStockPenetration,
            table: Cow::Owned(national.penetration.scaled(100.0)),
        },
    ];

    for (state_id, tables) in &analysis.states {
        outputs.push(TableOutput {
            scope: &state_id.0,
            metric: Metric::EcmMeasureStock,
            table: Cow::Borrowed(&tables.stock),
        });
        outputs.push(TableOutput {
            scope: &state_id.0,
            metric: Metric::EcmMeasureShare,
            table: Cow::Borrowed(&tables.share),
        });
    }

    outputs
}

/// The file name stem shared by the summary table and charts (e.g. "ASHP_FS_2050")
pub fn summary_file_stem(label: &str, summary: &StateSummary) -> String {
    format!("{label}_{}", summary.year)
}

/// Represents a row in the summary by state CSV file
#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct SummaryRow {
    state: StateID,
    measure_stock: f64,
    share_percent: f64,
}

/// Write a time-series table to a CSV file with a `year` column and a column per ECM
fn write_time_series(file_path: &Path, table: &TimeSeriesTable) -> Result<()> {
    let mut writer = csv::Writer::from_path(file_path)?;
    writer.write_record(iter::once("year").chain(table.columns().map(|(id, _)| id.0.as_ref())))?;
    for (index, year) in table.years().iter().enumerate() {
        let values = table.row(index).map(|value| value.to_string());
        writer.write_record(iter::once(year.to_string()).chain(values))?;
    }
    writer.flush()?;

    Ok(())
}

/// Write the summary by state to a CSV file, with shares as percentages
fn write_summary(file_path: &Path, summary: &StateSummary) -> Result<()> {
    let mut writer = csv::Writer::from_path(file_path)?;
    for (state_id, row) in &summary.rows {
        writer.serialize(SummaryRow {
            state: state_id.clone(),
            measure_stock: row.measure_stock,
            share_percent: row.share * 100.0,
        })?;
    }
    writer.flush()?;

    Ok(())
}

/// Write every table for an analysis to CSV files.
///
/// # Arguments
///
/// * `output_path` - Folder where files will be saved
/// * `analysis` - The aggregated results
/// * `summary_label` - The label used in the summary file name
///
/// # Returns
///
/// The paths of the files written.
pub fn write_tables(
    output_path: &Path,
    analysis: &AnalysisResults,
    summary_label: &str,
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    for output in time_series_outputs(analysis) {
        let file_path = output_path.join(output.metric.table_file_name(output.scope));
        write_time_series(&file_path, &output.table)
            .with_context(|| format!("Failed to write {}", file_path.display()))?;
        written.push(file_path);
    }

    let file_name = format!(
        "{}_summary_by_state.csv",
        summary_file_stem(summary_label, &analysis.summary)
    );
    let file_path = output_path.join(file_name);
    write_summary(&file_path, &analysis.summary)
        .with_context(|| format!("Failed to write {}", file_path.display()))?;
    written.push(file_path);

    Ok(written)
}
