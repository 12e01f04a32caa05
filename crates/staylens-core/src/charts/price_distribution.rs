use plotters::prelude::*;
use polars::prelude::PolarsResult;

use super::{first_appearance, ChartError, ChartUnit};
use crate::listings::CleanedListings;
use crate::render::{self, palette, Canvas, DrawResult, RenderSettings, RenderedChart};
use crate::stats::quantile_sorted;

const WHISKER_IQR: f64 = 1.5;
const BOX_HALF_WIDTH: f64 = 0.35;

/// Box-plot summary of one group's prices.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxStats {
    pub group: String,
    pub count: usize,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    /// Lowest observation within 1.5 IQR below the first quartile.
    pub whisker_low: f64,
    /// Highest observation within 1.5 IQR above the third quartile.
    pub whisker_high: f64,
    pub outliers: Vec<f64>,
}

impl BoxStats {
    pub fn from_values(group: impl Into<String>, values: &[f64]) -> Option<Self> {
        let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if sorted.is_empty() {
            return None;
        }
        sorted.sort_by(f64::total_cmp);

        let q1 = quantile_sorted(&sorted, 0.25)?;
        let median = quantile_sorted(&sorted, 0.5)?;
        let q3 = quantile_sorted(&sorted, 0.75)?;
        let iqr = q3 - q1;
        let low_fence = q1 - WHISKER_IQR * iqr;
        let high_fence = q3 + WHISKER_IQR * iqr;

        let whisker_low = sorted
            .iter()
            .copied()
            .find(|v| *v >= low_fence)
            .unwrap_or(q1)
            .min(q1);
        let whisker_high = sorted
            .iter()
            .rev()
            .copied()
            .find(|v| *v <= high_fence)
            .unwrap_or(q3)
            .max(q3);
        let outliers = sorted
            .iter()
            .copied()
            .filter(|v| *v < whisker_low || *v > whisker_high)
            .collect();

        Some(Self {
            group: group.into(),
            count: sorted.len(),
            q1,
            median,
            q3,
            whisker_low,
            whisker_high,
            outliers,
        })
    }

    fn upper_extent(&self) -> f64 {
        self.outliers
            .iter()
            .copied()
            .fold(self.whisker_high, f64::max)
    }

    fn lower_extent(&self) -> f64 {
        self.outliers.iter().copied().fold(self.whisker_low, f64::min)
    }
}

/// Price box statistics per neighbourhood group, in order of first appearance.
pub fn price_box_stats(listings: &CleanedListings) -> PolarsResult<Vec<BoxStats>> {
    let records = listings.records()?;
    let groups = first_appearance(records.iter().map(|r| r.neighbourhood_group.as_str()));

    let stats = groups
        .into_iter()
        .filter_map(|group| {
            let prices: Vec<f64> = records
                .iter()
                .filter(|r| r.neighbourhood_group == group)
                .map(|r| r.price)
                .collect();
            BoxStats::from_values(group, &prices)
        })
        .collect();
    Ok(stats)
}

pub struct PriceDistribution;

impl ChartUnit for PriceDistribution {
    fn name(&self) -> &'static str {
        "price_distribution"
    }

    fn title(&self) -> &'static str {
        "Price Distribution Across Neighborhoods"
    }

    fn render(
        &self,
        listings: &CleanedListings,
        settings: &RenderSettings,
    ) -> Result<RenderedChart, ChartError> {
        let stats = price_box_stats(listings)?;
        let rendered = render::render_png(self.figure(), settings, |root| {
            draw(root, self.title(), &stats, settings)
        })?;
        Ok(rendered)
    }
}

fn draw(
    root: &Canvas<'_>,
    title: &str,
    stats: &[BoxStats],
    settings: &RenderSettings,
) -> DrawResult {
    let labels: Vec<String> = stats.iter().map(|s| s.group.clone()).collect();
    let low = stats
        .iter()
        .map(BoxStats::lower_extent)
        .fold(f64::INFINITY, f64::min);
    let high = stats
        .iter()
        .map(BoxStats::upper_extent)
        .fold(f64::NEG_INFINITY, f64::max);

    let y_range = render::padded_range(low, high);
    let y_bottom = y_range.start;
    let mut chart = render::category_chart(root, title, &labels, y_range, settings)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_label_formatter(&|_| String::new())
        .x_desc("Neighborhood Group")
        .y_desc("Price")
        .axis_desc_style(settings.axis_font())
        .label_style(settings.tick_font())
        .draw()?;

    let line = BLACK.stroke_width(settings.px(1.0));
    let marker_radius = settings.px(2.5) as i32;

    for (idx, entry) in stats.iter().enumerate() {
        let x = idx as f64;
        let left = x - BOX_HALF_WIDTH;
        let right = x + BOX_HALF_WIDTH;
        let cap = BOX_HALF_WIDTH / 2.0;

        chart.draw_series(std::iter::once(Rectangle::new(
            [(left, entry.q1), (right, entry.q3)],
            palette::tab10(idx).mix(0.8).filled(),
        )))?;
        chart.draw_series(std::iter::once(Rectangle::new(
            [(left, entry.q1), (right, entry.q3)],
            line,
        )))?;

        chart.draw_series(
            [
                vec![(left, entry.median), (right, entry.median)],
                vec![(x, entry.q3), (x, entry.whisker_high)],
                vec![(x, entry.q1), (x, entry.whisker_low)],
                vec![(x - cap, entry.whisker_high), (x + cap, entry.whisker_high)],
                vec![(x - cap, entry.whisker_low), (x + cap, entry.whisker_low)],
            ]
            .into_iter()
            .map(|points| PathElement::new(points, line)),
        )?;

        chart.draw_series(
            entry
                .outliers
                .iter()
                .map(|value| Circle::new((x, *value), marker_radius, line)),
        )?;
    }

    let positions: Vec<(f64, String)> = labels
        .into_iter()
        .enumerate()
        .map(|(idx, label)| (idx as f64, label))
        .collect();
    render::draw_x_category_labels(root, &chart, &positions, y_bottom, settings)?;
    Ok(())
}
