use std::collections::{BTreeSet, HashMap};

use plotters::prelude::*;
use polars::prelude::{col, DataType, IntoLazy, PolarsResult};
use staylens_parser::schema::{AVAILABILITY_365, NEIGHBOURHOOD_GROUP, PRICE};

use super::{ChartError, ChartUnit};
use crate::listings::CleanedListings;
use crate::render::{
    self, palette, Canvas, DrawResult, FigureSize, RenderSettings, RenderedChart,
};

const MEAN_PRICE_COLUMN: &str = "mean_price";
const COLOUR_BAR_STEPS: usize = 256;

/// Mean price per neighbourhood group (rows, alphabetical) and distinct availability value
/// (columns, ascending). Combinations with no listings are `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct PivotTable {
    pub rows: Vec<String>,
    pub columns: Vec<i64>,
    pub cells: Vec<Vec<Option<f64>>>,
}

impl PivotTable {
    pub fn get(&self, row: &str, column: i64) -> Option<f64> {
        let r = self.rows.iter().position(|g| g == row)?;
        let c = self.columns.iter().position(|a| *a == column)?;
        self.cells[r][c]
    }

    /// Smallest and largest defined cell.
    fn value_bounds(&self) -> Option<(f64, f64)> {
        self.cells
            .iter()
            .flatten()
            .flatten()
            .fold(None, |acc, v| match acc {
                None => Some((*v, *v)),
                Some((lo, hi)) => Some((f64::min(lo, *v), f64::max(hi, *v))),
            })
    }
}

pub fn price_availability_pivot(listings: &CleanedListings) -> PolarsResult<PivotTable> {
    let summary = listings
        .frame()
        .clone()
        .lazy()
        .group_by([
            col(NEIGHBOURHOOD_GROUP),
            col(AVAILABILITY_365).cast(DataType::Int64),
        ])
        .agg([col(PRICE)
            .cast(DataType::Float64)
            .mean()
            .alias(MEAN_PRICE_COLUMN)])
        .collect()?;

    let groups_col = summary.column(NEIGHBOURHOOD_GROUP)?.cast(&DataType::String)?;
    let groups_col = groups_col.str()?;
    let avail_col = summary.column(AVAILABILITY_365)?.cast(&DataType::Int64)?;
    let avail_col = avail_col.i64()?;
    let means = summary.column(MEAN_PRICE_COLUMN)?.f64()?;

    let mut rows = BTreeSet::new();
    let mut columns = BTreeSet::new();
    let mut lookup: HashMap<(String, i64), f64> = HashMap::new();
    for idx in 0..summary.height() {
        let (Some(group), Some(availability), Some(mean)) =
            (groups_col.get(idx), avail_col.get(idx), means.get(idx))
        else {
            continue;
        };
        rows.insert(group.to_string());
        columns.insert(availability);
        lookup.insert((group.to_string(), availability), mean);
    }

    let rows: Vec<String> = rows.into_iter().collect();
    let columns: Vec<i64> = columns.into_iter().collect();
    let cells = rows
        .iter()
        .map(|group| {
            columns
                .iter()
                .map(|availability| lookup.get(&(group.clone(), *availability)).copied())
                .collect()
        })
        .collect();

    Ok(PivotTable {
        rows,
        columns,
        cells,
    })
}

pub struct PriceAvailabilityHeatmap;

impl ChartUnit for PriceAvailabilityHeatmap {
    fn name(&self) -> &'static str {
        "price_availability_heatmap"
    }

    fn title(&self) -> &'static str {
        "Price vs Availability Across Neighborhoods"
    }

    fn figure(&self) -> FigureSize {
        FigureSize::new(12.0, 8.0)
    }

    fn render(
        &self,
        listings: &CleanedListings,
        settings: &RenderSettings,
    ) -> Result<RenderedChart, ChartError> {
        let pivot = price_availability_pivot(listings)?;
        let rendered = render::render_png(self.figure(), settings, |root| {
            draw(root, self.title(), &pivot, settings)
        })?;
        Ok(rendered)
    }
}

/// Position of `value` within `[low, high]`, as used for colour lookup.
fn normalise(value: f64, low: f64, high: f64) -> f64 {
    let span = high - low;
    if span > 0.0 {
        (value - low) / span
    } else {
        0.5
    }
}

fn draw(
    root: &Canvas<'_>,
    title: &str,
    pivot: &PivotTable,
    settings: &RenderSettings,
) -> DrawResult {
    let (low, high) = pivot.value_bounds().unwrap_or((0.0, 1.0));
    let row_count = pivot.rows.len();

    let body = root.titled(title, settings.title_font())?;
    let (body_width, _) = body.dim_in_pixel();
    let bar_width = settings.px(86.0);
    let (heat_area, bar_area) = body.split_horizontally(body_width.saturating_sub(bar_width));

    let row_labels: Vec<String> = pivot.rows.clone();
    let mut chart = ChartBuilder::on(&heat_area)
        .margin(settings.px(10.0))
        .x_label_area_size(settings.px(40.0))
        .y_label_area_size(render::category_label_area(&row_labels, settings))
        .build_cartesian_2d(
            render::category_range(pivot.columns.len()),
            render::category_range(row_count),
        )?;

    let columns = &pivot.columns;
    let availability_tick = |v: &f64| -> String {
        let idx = v.round();
        if (v - idx).abs() > 1e-6 || idx < 0.0 {
            return String::new();
        }
        columns
            .get(idx as usize)
            .map(|a| a.to_string())
            .unwrap_or_default()
    };

    chart
        .configure_mesh()
        .disable_mesh()
        .x_labels(12)
        .x_label_formatter(&availability_tick)
        .y_label_formatter(&|_| String::new())
        .x_desc("Availability (days)")
        .y_desc("Neighborhood Group")
        .axis_desc_style(settings.axis_font())
        .label_style(settings.tick_font())
        .draw()?;

    // First row at the top.
    let row_y = |row: usize| (row_count - 1 - row) as f64;

    chart.draw_series(pivot.cells.iter().enumerate().flat_map(|(row, cells)| {
        cells.iter().enumerate().filter_map(move |(column, value)| {
            value.map(|value| {
                let x = column as f64;
                let y = row_y(row);
                Rectangle::new(
                    [(x - 0.5, y - 0.5), (x + 0.5, y + 0.5)],
                    palette::yl_or_rd(normalise(value, low, high)).filled(),
                )
            })
        })
    }))?;

    let positions: Vec<(f64, String)> = row_labels
        .into_iter()
        .enumerate()
        .map(|(row, label)| (row_y(row), label))
        .collect();
    // Chart coordinates are absolute, so labels go on the unshifted root.
    render::draw_y_category_labels(root, &chart, &positions, -0.5, settings)?;

    draw_colour_bar(&bar_area, low, high, settings)
}

fn draw_colour_bar(
    area: &Canvas<'_>,
    low: f64,
    high: f64,
    settings: &RenderSettings,
) -> DrawResult {
    let span = if high > low { high - low } else { 1.0 };
    let mut bar = ChartBuilder::on(area)
        .margin(settings.px(10.0))
        .margin_right(settings.px(4.0))
        .x_label_area_size(settings.px(40.0))
        .right_y_label_area_size(settings.px(60.0))
        .build_cartesian_2d(0.0..1.0, low..low + span)?;

    bar.configure_mesh()
        .disable_mesh()
        .disable_x_axis()
        .label_style(settings.tick_font())
        .draw()?;

    let step = span / COLOUR_BAR_STEPS as f64;
    bar.draw_series((0..COLOUR_BAR_STEPS).map(|i| {
        let from = low + step * i as f64;
        Rectangle::new(
            [(0.0, from), (1.0, from + step)],
            palette::yl_or_rd((i as f64 + 0.5) / COLOUR_BAR_STEPS as f64).filled(),
        )
    }))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalise_handles_flat_range() {
        assert_eq!(normalise(5.0, 5.0, 5.0), 0.5);
        assert_eq!(normalise(150.0, 100.0, 200.0), 0.5);
        assert_eq!(normalise(200.0, 100.0, 200.0), 1.0);
    }

    #[test]
    fn bounds_skip_empty_cells() {
        let pivot = PivotTable {
            rows: vec!["Bronx".into(), "Queens".into()],
            columns: vec![0, 365],
            cells: vec![vec![Some(80.0), None], vec![None, Some(120.0)]],
        };
        assert_eq!(pivot.value_bounds(), Some((80.0, 120.0)));
        assert_eq!(pivot.get("Queens", 365), Some(120.0));
        assert_eq!(pivot.get("Queens", 0), None);
    }
}
