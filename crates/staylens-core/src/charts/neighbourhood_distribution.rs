use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use polars::prelude::{col, len, DataType, IntoLazy, PolarsResult};
use staylens_parser::schema::NEIGHBOURHOOD_GROUP;

use super::{ChartError, ChartUnit};
use crate::listings::CleanedListings;
use crate::render::{self, palette, Canvas, DrawResult, RenderSettings, RenderedChart};
use crate::stats::format_thousands;

const COUNT_COLUMN: &str = "listing_count";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupCount {
    pub group: String,
    pub count: usize,
}

/// Listings per neighbourhood group, most common first. Ties are ordered by name.
pub fn group_counts(listings: &CleanedListings) -> PolarsResult<Vec<GroupCount>> {
    let counts = listings
        .frame()
        .clone()
        .lazy()
        .group_by([col(NEIGHBOURHOOD_GROUP)])
        .agg([len().alias(COUNT_COLUMN)])
        .collect()?;

    let groups = counts.column(NEIGHBOURHOOD_GROUP)?.cast(&DataType::String)?;
    let groups = groups.str()?;
    let totals = counts.column(COUNT_COLUMN)?.cast(&DataType::Int64)?;
    let totals = totals.i64()?;

    let mut out = Vec::with_capacity(counts.height());
    for idx in 0..counts.height() {
        let (Some(group), Some(count)) = (groups.get(idx), totals.get(idx)) else {
            continue;
        };
        out.push(GroupCount {
            group: group.to_string(),
            count: count as usize,
        });
    }

    out.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.group.cmp(&b.group)));
    Ok(out)
}

pub struct NeighbourhoodDistribution;

impl ChartUnit for NeighbourhoodDistribution {
    fn name(&self) -> &'static str {
        "neighborhood_distribution"
    }

    fn title(&self) -> &'static str {
        "Distribution of Airbnb Listings Across Neighborhood Groups"
    }

    fn render(
        &self,
        listings: &CleanedListings,
        settings: &RenderSettings,
    ) -> Result<RenderedChart, ChartError> {
        let counts = group_counts(listings)?;
        let rendered = render::render_png(self.figure(), settings, |root| {
            draw(root, self.title(), &counts, settings)
        })?;
        Ok(rendered)
    }
}

fn draw(
    root: &Canvas<'_>,
    title: &str,
    counts: &[GroupCount],
    settings: &RenderSettings,
) -> DrawResult {
    let labels: Vec<String> = counts.iter().map(|c| c.group.clone()).collect();
    let max = counts.iter().map(|c| c.count).max().unwrap_or(0) as f64;

    // Headroom for the count printed above the tallest bar.
    let y_range = render::zero_based_range(max * 1.08);
    let mut chart = render::category_chart(root, title, &labels, y_range, settings)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_label_formatter(&|_| String::new())
        .y_label_formatter(&|v| format_thousands(v.max(0.0).round() as usize))
        .x_desc("Neighborhood Group")
        .y_desc("Number of Listings")
        .axis_desc_style(settings.axis_font())
        .label_style(settings.tick_font())
        .draw()?;

    chart.draw_series(counts.iter().enumerate().map(|(idx, entry)| {
        let x = idx as f64;
        Rectangle::new(
            [(x - 0.4, 0.0), (x + 0.4, entry.count as f64)],
            palette::set3(idx).filled(),
        )
    }))?;

    let label_style = settings
        .tick_font()
        .color(&BLACK)
        .pos(Pos::new(HPos::Center, VPos::Bottom));
    chart.draw_series(counts.iter().enumerate().map(|(idx, entry)| {
        Text::new(
            format_thousands(entry.count),
            (idx as f64, entry.count as f64),
            label_style.clone(),
        )
    }))?;

    let positions: Vec<(f64, String)> = labels
        .into_iter()
        .enumerate()
        .map(|(idx, label)| (idx as f64, label))
        .collect();
    render::draw_x_category_labels(root, &chart, &positions, 0.0, settings)?;
    Ok(())
}
