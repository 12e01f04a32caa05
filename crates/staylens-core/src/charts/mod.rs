//! The seven chart units. Each one aggregates the cleaned listings into a small view and
//! renders that view into a PNG.

mod neighbourhood_distribution;
mod price_availability_heatmap;
mod price_distribution;
mod price_reviews;
mod reviews_time_series;
mod room_type_availability;
mod room_type_reviews;

use once_cell::sync::Lazy;
use polars::prelude::PolarsError;
use thiserror::Error;

use crate::listings::CleanedListings;
use crate::render::{FigureSize, RenderError, RenderSettings, RenderedChart};

pub use neighbourhood_distribution::{group_counts, GroupCount, NeighbourhoodDistribution};
pub use price_availability_heatmap::{
    price_availability_pivot, PivotTable, PriceAvailabilityHeatmap,
};
pub use price_distribution::{price_box_stats, BoxStats, PriceDistribution};
pub use price_reviews::{price_review_points, PriceReviewsCorrelation, ScatterSeries};
pub use reviews_time_series::{
    review_rolling_means, ReviewsTimeSeries, RollingSeries, ROLLING_WINDOW,
};
pub use room_type_availability::{
    availability_by_room_type, GroupedMeanStd, MeanStd, RoomTypeAvailability,
};
pub use room_type_reviews::{review_totals, RoomTypeReviews, StackedTotals};

pub const STANDARD_FIGURE: FigureSize = FigureSize::new(12.0, 6.0);

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("aggregation failed: {0}")]
    Polars(#[from] PolarsError),
    #[error(transparent)]
    Render(#[from] RenderError),
}

pub trait ChartUnit: Send + Sync {
    /// Logical output name, also used as the file stem.
    fn name(&self) -> &'static str;
    fn title(&self) -> &'static str;
    fn figure(&self) -> FigureSize {
        STANDARD_FIGURE
    }
    fn render(
        &self,
        listings: &CleanedListings,
        settings: &RenderSettings,
    ) -> Result<RenderedChart, ChartError>;
}

static CHARTS: Lazy<Vec<&'static dyn ChartUnit>> = Lazy::new(|| {
    vec![
        &NeighbourhoodDistribution as &dyn ChartUnit,
        &PriceDistribution,
        &RoomTypeAvailability,
        &PriceReviewsCorrelation,
        &ReviewsTimeSeries,
        &PriceAvailabilityHeatmap,
        &RoomTypeReviews,
    ]
});

/// Every chart, in the order the pipeline renders them.
pub fn all_charts() -> &'static [&'static dyn ChartUnit] {
    CHARTS.as_slice()
}

pub fn chart_by_name(name: &str) -> Option<&'static dyn ChartUnit> {
    all_charts().iter().copied().find(|chart| chart.name() == name)
}

/// Distinct values in order of first appearance.
pub(crate) fn first_appearance<'a>(values: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();
    for value in values {
        if seen.insert(value) {
            out.push(value.to_string());
        }
    }
    out
}
