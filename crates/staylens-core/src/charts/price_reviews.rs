use plotters::prelude::*;
use polars::prelude::PolarsResult;

use super::{first_appearance, ChartError, ChartUnit};
use crate::listings::CleanedListings;
use crate::render::{self, palette, Canvas, DrawResult, RenderSettings, RenderedChart};

const POINT_ALPHA: f64 = 0.5;

/// `(price, number_of_reviews)` points for one room type.
#[derive(Debug, Clone, PartialEq)]
pub struct ScatterSeries {
    pub room_type: String,
    pub points: Vec<(f64, f64)>,
}

/// One series per room type, in order of first appearance.
pub fn price_review_points(listings: &CleanedListings) -> PolarsResult<Vec<ScatterSeries>> {
    let records = listings.records()?;
    let room_types = first_appearance(records.iter().map(|r| r.room_type.as_str()));

    Ok(room_types
        .into_iter()
        .map(|room_type| {
            let points = records
                .iter()
                .filter(|r| r.room_type == room_type)
                .map(|r| (r.price, r.number_of_reviews as f64))
                .collect();
            ScatterSeries { room_type, points }
        })
        .collect())
}

pub struct PriceReviewsCorrelation;

impl ChartUnit for PriceReviewsCorrelation {
    fn name(&self) -> &'static str {
        "price_reviews_correlation"
    }

    fn title(&self) -> &'static str {
        "Price vs Number of Reviews"
    }

    fn render(
        &self,
        listings: &CleanedListings,
        settings: &RenderSettings,
    ) -> Result<RenderedChart, ChartError> {
        let series = price_review_points(listings)?;
        let rendered = render::render_png(self.figure(), settings, |root| {
            draw(root, self.title(), &series, settings)
        })?;
        Ok(rendered)
    }
}

fn draw(
    root: &Canvas<'_>,
    title: &str,
    series: &[ScatterSeries],
    settings: &RenderSettings,
) -> DrawResult {
    let all_points = series.iter().flat_map(|s| s.points.iter());
    let (mut min_x, mut max_x, mut min_y, mut max_y) = (
        f64::INFINITY,
        f64::NEG_INFINITY,
        f64::INFINITY,
        f64::NEG_INFINITY,
    );
    for (x, y) in all_points {
        min_x = min_x.min(*x);
        max_x = max_x.max(*x);
        min_y = min_y.min(*y);
        max_y = max_y.max(*y);
    }

    let mut chart = ChartBuilder::on(root)
        .caption(title, settings.title_font())
        .margin(settings.px(10.0))
        .x_label_area_size(settings.px(40.0))
        .y_label_area_size(settings.px(60.0))
        .build_cartesian_2d(
            render::padded_range(min_x, max_x),
            render::padded_range(min_y, max_y),
        )?;

    chart
        .configure_mesh()
        .x_desc("Price")
        .y_desc("Number of Reviews")
        .axis_desc_style(settings.axis_font())
        .label_style(settings.tick_font())
        .draw()?;

    let radius = settings.px(3.0) as i32;
    for (idx, entry) in series.iter().enumerate() {
        let color = palette::tab10(idx);
        chart
            .draw_series(entry.points.iter().map(|point| {
                Circle::new(*point, radius, color.mix(POINT_ALPHA).filled())
            }))?
            .label(entry.room_type.as_str())
            .legend(move |(x, y)| Circle::new((x + radius, y), radius, color.filled()));
    }

    render::draw_legend(&mut chart, SeriesLabelPosition::UpperRight, settings)?;
    Ok(())
}
