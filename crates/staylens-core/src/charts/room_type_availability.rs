use std::collections::{BTreeSet, HashMap};

use plotters::prelude::*;
use polars::prelude::{col, len, DataType, IntoLazy, PolarsResult};
use staylens_parser::schema::{AVAILABILITY_365, NEIGHBOURHOOD_GROUP, ROOM_TYPE};

use super::{ChartError, ChartUnit};
use crate::listings::CleanedListings;
use crate::render::{self, palette, Canvas, DrawResult, RenderSettings, RenderedChart};

const MEAN_COLUMN: &str = "availability_mean";
const STD_COLUMN: &str = "availability_std";
const COUNT_COLUMN: &str = "availability_count";
const GROUP_SPAN: f64 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeanStd {
    pub mean: f64,
    /// Sample standard deviation. `None` when the cell holds a single listing.
    pub std_dev: Option<f64>,
    pub count: usize,
}

/// Availability statistics keyed by neighbourhood group (rows) and room type (columns),
/// both sorted by name. Combinations with no listings are `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupedMeanStd {
    pub groups: Vec<String>,
    pub room_types: Vec<String>,
    pub cells: Vec<Vec<Option<MeanStd>>>,
}

impl GroupedMeanStd {
    pub fn get(&self, group: &str, room_type: &str) -> Option<MeanStd> {
        let row = self.groups.iter().position(|g| g == group)?;
        let column = self.room_types.iter().position(|r| r == room_type)?;
        self.cells[row][column]
    }
}

pub fn availability_by_room_type(listings: &CleanedListings) -> PolarsResult<GroupedMeanStd> {
    let availability = col(AVAILABILITY_365).cast(DataType::Float64);
    let summary = listings
        .frame()
        .clone()
        .lazy()
        .group_by([col(NEIGHBOURHOOD_GROUP), col(ROOM_TYPE)])
        .agg([
            availability.clone().mean().alias(MEAN_COLUMN),
            availability.std(1).alias(STD_COLUMN),
            len().alias(COUNT_COLUMN),
        ])
        .collect()?;

    let groups_col = summary.column(NEIGHBOURHOOD_GROUP)?.cast(&DataType::String)?;
    let groups_col = groups_col.str()?;
    let rooms_col = summary.column(ROOM_TYPE)?.cast(&DataType::String)?;
    let rooms_col = rooms_col.str()?;
    let means = summary.column(MEAN_COLUMN)?.f64()?;
    let stds = summary.column(STD_COLUMN)?.f64()?;
    let counts = summary.column(COUNT_COLUMN)?.cast(&DataType::Int64)?;
    let counts = counts.i64()?;

    let mut groups = BTreeSet::new();
    let mut room_types = BTreeSet::new();
    let mut lookup: HashMap<(String, String), MeanStd> = HashMap::new();

    for idx in 0..summary.height() {
        let (Some(group), Some(room_type), Some(mean), Some(count)) = (
            groups_col.get(idx),
            rooms_col.get(idx),
            means.get(idx),
            counts.get(idx),
        ) else {
            continue;
        };

        let std_dev = if count < 2 {
            None
        } else {
            stds.get(idx).filter(|v| v.is_finite())
        };

        groups.insert(group.to_string());
        room_types.insert(room_type.to_string());
        lookup.insert(
            (group.to_string(), room_type.to_string()),
            MeanStd {
                mean,
                std_dev,
                count: count as usize,
            },
        );
    }

    let groups: Vec<String> = groups.into_iter().collect();
    let room_types: Vec<String> = room_types.into_iter().collect();
    let cells = groups
        .iter()
        .map(|group| {
            room_types
                .iter()
                .map(|room_type| lookup.get(&(group.clone(), room_type.clone())).copied())
                .collect()
        })
        .collect();

    Ok(GroupedMeanStd {
        groups,
        room_types,
        cells,
    })
}

pub struct RoomTypeAvailability;

impl ChartUnit for RoomTypeAvailability {
    fn name(&self) -> &'static str {
        "room_type_availability"
    }

    fn title(&self) -> &'static str {
        "Average Availability by Room Type and Neighborhood"
    }

    fn render(
        &self,
        listings: &CleanedListings,
        settings: &RenderSettings,
    ) -> Result<RenderedChart, ChartError> {
        let table = availability_by_room_type(listings)?;
        let rendered = render::render_png(self.figure(), settings, |root| {
            draw(root, self.title(), &table, settings)
        })?;
        Ok(rendered)
    }
}

fn draw(
    root: &Canvas<'_>,
    title: &str,
    table: &GroupedMeanStd,
    settings: &RenderSettings,
) -> DrawResult {
    let top = table
        .cells
        .iter()
        .flatten()
        .flatten()
        .map(|cell| cell.mean + cell.std_dev.unwrap_or(0.0))
        .fold(0.0, f64::max);

    let y_range = render::zero_based_range(top);
    let mut chart = render::category_chart(root, title, &table.groups, y_range, settings)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_label_formatter(&|_| String::new())
        .x_desc("Neighborhood Group")
        .y_desc("Average Availability (days)")
        .axis_desc_style(settings.axis_font())
        .label_style(settings.tick_font())
        .draw()?;

    let series_count = table.room_types.len().max(1);
    let bar_width = GROUP_SPAN / series_count as f64;
    let cap_px = settings.px(3.0);
    let error_style = BLACK.stroke_width(settings.px(1.0));

    render::legend_heading(&mut chart, "Room Type")?;

    for (series, room_type) in table.room_types.iter().enumerate() {
        let color = palette::tab10(series);
        let bars: Vec<(f64, MeanStd)> = table
            .cells
            .iter()
            .enumerate()
            .filter_map(|(row, cells)| {
                let center =
                    row as f64 - GROUP_SPAN / 2.0 + bar_width * (series as f64 + 0.5);
                cells[series].map(|cell| (center, cell))
            })
            .collect();

        chart
            .draw_series(bars.iter().map(|(center, cell)| {
                Rectangle::new(
                    [
                        (center - bar_width / 2.0, 0.0),
                        (center + bar_width / 2.0, cell.mean),
                    ],
                    color.filled(),
                )
            }))?
            .label(room_type.as_str())
            .legend(render::swatch(color, settings));

        chart.draw_series(bars.iter().filter_map(|(center, cell)| {
            cell.std_dev.map(|std_dev| {
                ErrorBar::new_vertical(
                    *center,
                    cell.mean - std_dev,
                    cell.mean,
                    cell.mean + std_dev,
                    error_style,
                    cap_px,
                )
            })
        }))?;
    }

    render::draw_legend(&mut chart, SeriesLabelPosition::UpperRight, settings)?;

    let positions: Vec<(f64, String)> = table
        .groups
        .iter()
        .enumerate()
        .map(|(idx, label)| (idx as f64, label.clone()))
        .collect();
    render::draw_x_category_labels(root, &chart, &positions, 0.0, settings)?;
    Ok(())
}
