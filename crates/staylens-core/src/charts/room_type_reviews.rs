use std::collections::{BTreeSet, HashMap};

use plotters::prelude::*;
use polars::prelude::{col, DataType, IntoLazy, PolarsResult};
use staylens_parser::schema::{NEIGHBOURHOOD_GROUP, NUMBER_OF_REVIEWS, ROOM_TYPE};

use super::{ChartError, ChartUnit};
use crate::listings::CleanedListings;
use crate::render::{self, palette, Canvas, DrawResult, RenderSettings, RenderedChart};

const TOTAL_COLUMN: &str = "review_total";
const BAR_WIDTH: f64 = 0.5;

/// Review totals per neighbourhood group (rows) and room type (columns), both sorted by
/// name. Combinations with no listings are `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct StackedTotals {
    pub groups: Vec<String>,
    pub room_types: Vec<String>,
    pub totals: Vec<Vec<Option<i64>>>,
}

impl StackedTotals {
    pub fn get(&self, group: &str, room_type: &str) -> Option<i64> {
        let row = self.groups.iter().position(|g| g == group)?;
        let column = self.room_types.iter().position(|r| r == room_type)?;
        self.totals[row][column]
    }

    /// Height of each group's full stack.
    pub fn stack_heights(&self) -> Vec<i64> {
        self.totals
            .iter()
            .map(|row| row.iter().map(|v| v.unwrap_or(0)).sum())
            .collect()
    }
}

pub fn review_totals(listings: &CleanedListings) -> PolarsResult<StackedTotals> {
    let summary = listings
        .frame()
        .clone()
        .lazy()
        .group_by([col(NEIGHBOURHOOD_GROUP), col(ROOM_TYPE)])
        .agg([col(NUMBER_OF_REVIEWS)
            .cast(DataType::Int64)
            .sum()
            .alias(TOTAL_COLUMN)])
        .collect()?;

    let groups_col = summary.column(NEIGHBOURHOOD_GROUP)?.cast(&DataType::String)?;
    let groups_col = groups_col.str()?;
    let rooms_col = summary.column(ROOM_TYPE)?.cast(&DataType::String)?;
    let rooms_col = rooms_col.str()?;
    let sums = summary.column(TOTAL_COLUMN)?.cast(&DataType::Int64)?;
    let sums = sums.i64()?;

    let mut groups = BTreeSet::new();
    let mut room_types = BTreeSet::new();
    let mut lookup: HashMap<(String, String), i64> = HashMap::new();
    for idx in 0..summary.height() {
        let (Some(group), Some(room_type), Some(total)) =
            (groups_col.get(idx), rooms_col.get(idx), sums.get(idx))
        else {
            continue;
        };
        groups.insert(group.to_string());
        room_types.insert(room_type.to_string());
        lookup.insert((group.to_string(), room_type.to_string()), total);
    }

    let groups: Vec<String> = groups.into_iter().collect();
    let room_types: Vec<String> = room_types.into_iter().collect();
    let totals = groups
        .iter()
        .map(|group| {
            room_types
                .iter()
                .map(|room_type| lookup.get(&(group.clone(), room_type.clone())).copied())
                .collect()
        })
        .collect();

    Ok(StackedTotals {
        groups,
        room_types,
        totals,
    })
}

pub struct RoomTypeReviews;

impl ChartUnit for RoomTypeReviews {
    fn name(&self) -> &'static str {
        "room_type_reviews"
    }

    fn title(&self) -> &'static str {
        "Number of Reviews by Room Type and Neighborhood"
    }

    fn render(
        &self,
        listings: &CleanedListings,
        settings: &RenderSettings,
    ) -> Result<RenderedChart, ChartError> {
        let totals = review_totals(listings)?;
        let rendered = render::render_png(self.figure(), settings, |root| {
            draw(root, self.title(), &totals, settings)
        })?;
        Ok(rendered)
    }
}

fn draw(
    root: &Canvas<'_>,
    title: &str,
    table: &StackedTotals,
    settings: &RenderSettings,
) -> DrawResult {
    let top = table.stack_heights().into_iter().max().unwrap_or(0) as f64;
    let y_range = render::zero_based_range(top);
    let mut chart = render::category_chart(root, title, &table.groups, y_range, settings)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_label_formatter(&|_| String::new())
        .x_desc("Neighborhood Group")
        .y_desc("Number of Reviews")
        .axis_desc_style(settings.axis_font())
        .label_style(settings.tick_font())
        .draw()?;

    render::legend_heading(&mut chart, "Room Type")?;

    let mut base = vec![0.0f64; table.groups.len()];
    for (series, room_type) in table.room_types.iter().enumerate() {
        let color = palette::tab10(series);
        let segments: Vec<(f64, f64, f64)> = table
            .totals
            .iter()
            .zip(base.iter_mut())
            .enumerate()
            .map(|(row, (totals, bottom))| {
                let from = *bottom;
                *bottom += totals[series].unwrap_or(0) as f64;
                (row as f64, from, *bottom)
            })
            .collect();

        chart
            .draw_series(segments.iter().map(|(center, from, to)| {
                Rectangle::new(
                    [(center - BAR_WIDTH / 2.0, *from), (center + BAR_WIDTH / 2.0, *to)],
                    color.filled(),
                )
            }))?
            .label(room_type.as_str())
            .legend(render::swatch(color, settings));
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
