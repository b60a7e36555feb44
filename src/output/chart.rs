//! Rendering the aggregated tables as PNG charts.
use super::{Metric, summary_file_stem, time_series_outputs};
use crate::aggregate::AnalysisResults;
use crate::aggregate::summary::StateSummary;
use crate::table::TimeSeriesTable;
use anyhow::{Context, Result, ensure};
use log::debug;
use plotters::prelude::*;
use plotters::style::Palette;
use std::path::{Path, PathBuf};

/// Size in pixels of time-series charts
const TIME_SERIES_CHART_SIZE: (u32, u32) = (1200, 700);

/// Size in pixels of charts with a bar for each state
const STATE_CHART_SIZE: (u32, u32) = (1500, 600);

/// Half the width of a bar on a year axis, in years
const BAR_HALF_WIDTH: f64 = 0.4;

/// The colour for the series at the given index
fn series_color(index: usize) -> RGBColor {
    let (r, g, b) = Palette99::COLORS[index % Palette99::COLORS.len()];
    RGBColor(r, g, b)
}

/// The upper limit of a value axis, leaving some headroom above the largest value
fn axis_max(max_value: f64) -> f64 {
    if max_value > 0.0 {
        max_value * 1.05
    } else {
        1.0
    }
}

/// The first and last years of a table
fn year_bounds(table: &TimeSeriesTable) -> Result<(u32, u32)> {
    let first = table.years().first().context("Table has no years")?;
    let last = table.years().last().context("Table has no years")?;
    Ok((*first, *last))
}

/// Draw a line chart with a line for each ECM in the table
pub fn draw_line_chart(
    file_path: &Path,
    title: &str,
    y_desc: &str,
    table: &TimeSeriesTable,
) -> Result<()> {
    let (first, last) = year_bounds(table)?;
    let root = BitMapBackend::new(file_path, TIME_SERIES_CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 24))
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(90)
        .build_cartesian_2d(first..last.max(first + 1), 0.0..axis_max(table.max_value()))?;
    chart
        .configure_mesh()
        .x_desc("Year")
        .y_desc(y_desc)
        .draw()?;

    for (index, (ecm_id, values)) in table.columns().enumerate() {
        let color = series_color(index);
        let points = table.years().iter().copied().zip(values.iter().copied());
        chart
            .draw_series(LineSeries::new(points, color.stroke_width(2)))?
            .label(ecm_id.to_string())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;
    root.present()?;

    Ok(())
}

/// Draw a stacked bar chart of shares, with a bar for each year and y formatted as a percentage
pub fn draw_stacked_share_chart(
    file_path: &Path,
    title: &str,
    table: &TimeSeriesTable,
) -> Result<()> {
    let (first, last) = year_bounds(table)?;
    let x_range = (f64::from(first) - 0.5)..(f64::from(last) + 0.5);
    let root = BitMapBackend::new(file_path, TIME_SERIES_CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 24))
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(x_range, 0.0..1.0)?;
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc("Year")
        .y_desc(Metric::EcmMeasureShare.axis_label())
        .x_label_formatter(&|year| format!("{year:.0}"))
        .y_label_formatter(&|share| format!("{:.0}%", share * 100.0))
        .draw()?;

    let mut bottoms = vec![0.0; table.years().len()];
    for (index, (ecm_id, values)) in table.columns().enumerate() {
        let color = series_color(index);
        let bars = table.years().iter().zip(values).zip(bottoms.iter_mut()).map(
            |((year, value), bottom)| {
                let x = f64::from(*year);
                let top = *bottom + value;
                let bar = Rectangle::new(
                    [(x - BAR_HALF_WIDTH, *bottom), (x + BAR_HALF_WIDTH, top)],
                    color.filled(),
                );
                *bottom = top;
                bar
            },
        );
        chart
            .draw_series(bars)?
            .label(ecm_id.to_string())
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 15, y + 5)], color.filled()));
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;
    root.present()?;

    Ok(())
}

/// Draw a bar chart with one bar per state
///
/// # Arguments
///
/// * `file_path` - Where to save the image
/// * `title` - The chart caption
/// * `y_desc` - The label for the value axis
/// * `bars` - State codes and values, in plotting order
pub fn draw_state_bar_chart(
    file_path: &Path,
    title: &str,
    y_desc: &str,
    bars: &[(&str, f64)],
) -> Result<()> {
    ensure!(!bars.is_empty(), "No states to plot");
    let max_value = bars.iter().map(|(_, value)| *value).fold(0.0, f64::max);
    let root = BitMapBackend::new(file_path, STATE_CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 24))
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(90)
        .build_cartesian_2d((0..bars.len()).into_segmented(), 0.0..axis_max(max_value))?;
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc("State")
        .y_desc(y_desc)
        .x_labels(bars.len())
        .x_label_formatter(&|segment| match segment {
            SegmentValue::CenterOf(index) => bars
                .get(*index)
                .map(|(state, _)| (*state).to_string())
                .unwrap_or_default(),
            _ => String::new(),
        })
        .draw()?;

    chart.draw_series(
        Histogram::vertical(&chart)
            .style(series_color(0).filled())
            .margin(3)
            .data(bars.iter().enumerate().map(|(index, (_, value))| (index, *value))),
    )?;
    root.present()?;

    Ok(())
}

/// Draw a scatter plot of measure stock against share (%), with each point labelled by state
pub fn draw_summary_scatter(file_path: &Path, title: &str, summary: &StateSummary) -> Result<()> {
    ensure!(!summary.rows.is_empty(), "No states to plot");
    let points = summary
        .rows
        .iter()
        .map(|(state_id, row)| (state_id.to_string(), row.measure_stock, row.share * 100.0))
        .collect::<Vec<_>>();
    let x_max = points.iter().map(|(_, x, _)| *x).fold(0.0, f64::max);
    let y_max = points.iter().map(|(_, _, y)| *y).fold(0.0, f64::max);

    let root = BitMapBackend::new(file_path, TIME_SERIES_CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 24))
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(0.0..axis_max(x_max), 0.0..axis_max(y_max))?;
    chart
        .configure_mesh()
        .x_desc(Metric::EcmMeasureStock.axis_label())
        .y_desc("Share (%)")
        .draw()?;

    let color = series_color(0);
    chart.draw_series(points.into_iter().map(|(state, x, y)| {
        EmptyElement::at((x, y))
            + Circle::new((0, 0), 4, color.filled())
            + Text::new(state, (6, -6), ("sans-serif", 12).into_font())
    }))?;
    root.present()?;

    Ok(())
}

/// Render every chart for an analysis.
///
/// # Arguments
///
/// * `output_path` - Folder where images will be saved
/// * `analysis` - The aggregated results
/// * `summary_label` - The label used in the summary file names and titles
///
/// # Returns
///
/// The paths of the images written.
pub fn render_charts(
    output_path: &Path,
    analysis: &AnalysisResults,
    summary_label: &str,
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    for output in time_series_outputs(analysis) {
        let file_path = output_path.join(output.metric.chart_file_name(output.scope));
        debug!("Drawing {}", file_path.display());
        let title = output.metric.title(output.scope);
        let result = match output.metric {
            Metric::EcmMeasureShare => draw_stacked_share_chart(&file_path, &title, &output.table),
            _ => draw_line_chart(&file_path, &title, output.metric.axis_label(), &output.table),
        };
        result.with_context(|| format!("Failed to draw {}", file_path.display()))?;
        written.push(file_path);
    }

    let summary = &analysis.summary;
    let stem = summary_file_stem(summary_label, summary);
    let title_prefix = format!("{} {}", summary_label.replace('_', " "), summary.year);

    let stock_bars = summary
        .rows
        .iter()
        .map(|(state_id, row)| (state_id.0.as_ref(), row.measure_stock))
        .collect::<Vec<_>>();
    let share_bars = summary
        .rows
        .iter()
        .map(|(state_id, row)| (state_id.0.as_ref(), row.share * 100.0))
        .collect::<Vec<_>>();
    let state_charts = [
        (
            "measure_stock_by_state",
            "ECM Measure Stock by State",
            Metric::EcmMeasureStock.axis_label(),
            stock_bars,
        ),
        (
            "measure_share_by_state",
            "ECM Measure Share by State",
            "Share (%)",
            share_bars,
        ),
    ];
    for (suffix, title, y_desc, bars) in state_charts {
        let file_path = output_path.join(format!("{stem}_{suffix}.png"));
        debug!("Drawing {}", file_path.display());
        draw_state_bar_chart(&file_path, &format!("{title_prefix} {title}"), y_desc, &bars)
            .with_context(|| format!("Failed to draw {}", file_path.display()))?;
        written.push(file_path);
    }

    let file_path = output_path.join(format!("{stem}_scatter_plot_by_state.png"));
    debug!("Drawing {}", file_path.display());
    let title = format!("{title_prefix} Measure Stock and Share by State");
    draw_summary_scatter(&file_path, &title, summary)
        .with_context(|| format!("Failed to draw {}", file_path.display()))?;
    written.push(file_path);

    Ok(written)
}
