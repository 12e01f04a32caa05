use chrono::NaiveDate;
use plotters::prelude::*;
use polars::prelude::PolarsResult;

use super::{first_appearance, ChartError, ChartUnit};
use crate::listings::{date_from_epoch_days, epoch_days, CleanedListings};
use crate::render::{self, palette, Canvas, DrawResult, RenderSettings, RenderedChart};
use crate::stats;

/// Number of samples in the trailing window.
pub const ROLLING_WINDOW: usize = 30;

/// Rolling mean of `number_of_reviews` for one neighbourhood group, one point per listing
/// in `last_review` order. Points without a full window are `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct RollingSeries {
    pub group: String,
    pub points: Vec<(NaiveDate, Option<f64>)>,
}

impl RollingSeries {
    /// Maximal runs of consecutive defined points.
    fn segments(&self) -> Vec<Vec<(f64, f64)>> {
        let mut segments = Vec::new();
        let mut current = Vec::new();
        for (date, value) in &self.points {
            match value {
                Some(value) => current.push((epoch_days(*date) as f64, *value)),
                None if !current.is_empty() => segments.push(std::mem::take(&mut current)),
                None => {}
            }
        }
        if !current.is_empty() {
            segments.push(current);
        }
        segments
    }
}

pub fn review_rolling_means(listings: &CleanedListings) -> PolarsResult<Vec<RollingSeries>> {
    let records = listings.records()?;
    let groups = first_appearance(records.iter().map(|r| r.neighbourhood_group.as_str()));

    Ok(groups
        .into_iter()
        .map(|group| {
            let mut rows: Vec<(NaiveDate, f64)> = records
                .iter()
                .filter(|r| r.neighbourhood_group == group)
                .map(|r| (r.last_review, r.number_of_reviews as f64))
                .collect();
            // Stable, so listings sharing a date keep table order.
            rows.sort_by_key(|(date, _)| *date);

            let values: Vec<f64> = rows.iter().map(|(_, reviews)| *reviews).collect();
            let means = stats::rolling_mean(&values, ROLLING_WINDOW);
            let points = rows
                .iter()
                .zip(means)
                .map(|((date, _), mean)| (*date, mean))
                .collect();
            RollingSeries { group, points }
        })
        .collect())
}

pub struct ReviewsTimeSeries;

impl ChartUnit for ReviewsTimeSeries {
    fn name(&self) -> &'static str {
        "reviews_time_series"
    }

    fn title(&self) -> &'static str {
        "Number of Reviews Over Time by Neighborhood"
    }

    fn render(
        &self,
        listings: &CleanedListings,
        settings: &RenderSettings,
    ) -> Result<RenderedChart, ChartError> {
        let series = review_rolling_means(listings)?;
        let rendered = render::render_png(self.figure(), settings, |root| {
            draw(root, self.title(), &series, settings)
        })?;
        Ok(rendered)
    }
}

fn format_date_tick(days: &f64) -> String {
    date_from_epoch_days(days.round() as i32)
        .map(|date| date.format("%Y-%m").to_string())
        .unwrap_or_default()
}

fn draw(
    root: &Canvas<'_>,
    title: &str,
    series: &[RollingSeries],
    settings: &RenderSettings,
) -> DrawResult {
    let segments: Vec<Vec<Vec<(f64, f64)>>> = series.iter().map(RollingSeries::segments).collect();

    let defined = segments.iter().flatten().flatten();
    let (x_min, x_max) = defined
        .clone()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), (x, _)| {
            (lo.min(*x), hi.max(*x))
        });
    let (y_min, y_max) = defined.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), (_, y)| {
        (lo.min(*y), hi.max(*y))
    });

    let mut chart = ChartBuilder::on(root)
        .caption(title, settings.title_font())
        .margin(settings.px(10.0))
        .x_label_area_size(settings.px(40.0))
        .y_label_area_size(settings.px(60.0))
        .build_cartesian_2d(
            render::padded_range(x_min, x_max),
            render::padded_range(y_min, y_max),
        )?;

    chart
        .configure_mesh()
        .x_labels(8)
        .x_label_formatter(&format_date_tick)
        .x_desc("Date")
        .y_desc("Number of Reviews (30-day rolling average)")
        .axis_desc_style(settings.axis_font())
        .label_style(settings.tick_font())
        .draw()?;

    let stroke = settings.line_width();
    for (idx, (entry, runs)) in series.iter().zip(&segments).enumerate() {
        let color = palette::tab10(idx);
        // Groups without a full window still get a legend entry.
        chart
            .draw_series(LineSeries::new(std::iter::empty::<(f64, f64)>(), color))?
            .label(entry.group.as_str())
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(stroke))
            });
        for run in runs {
            chart.draw_series(LineSeries::new(
                run.iter().copied(),
                color.stroke_width(stroke),
            ))?;
        }
    }

    render::draw_legend(&mut chart, SeriesLabelPosition::UpperLeft, settings)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2019, 1, d).unwrap()
    }

    #[test]
    fn segments_split_on_gaps() {
        let series = RollingSeries {
            group: "Queens".into(),
            points: vec![
                (day(1), None),
                (day(2), Some(1.0)),
                (day(3), Some(2.0)),
                (day(4), None),
                (day(5), Some(3.0)),
            ],
        };
        let segments = series.segments();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].len(), 2);
        assert_eq!(segments[1], vec![(epoch_days(day(5)) as f64, 3.0)]);
    }

    #[test]
    fn undefined_series_has_no_segments() {
        let series = RollingSeries {
            group: "Bronx".into(),
            points: vec![(day(1), None), (day(2), None)],
        };
        assert!(series.segments().is_empty());
    }

    #[test]
    fn date_ticks_show_year_and_month() {
        let days = epoch_days(NaiveDate::from_ymd_opt(2019, 7, 14).unwrap()) as f64;
        assert_eq!(format_date_tick(&days), "2019-07");
    }
}
