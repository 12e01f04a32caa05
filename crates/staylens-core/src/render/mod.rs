//! Raster rendering shared by every chart: figure sizing, fonts, category axes, tight
//! cropping and PNG encoding.

pub mod palette;

use std::ops::Range;

use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder};
use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_DPI: u32 = 300;
pub const FONT_FAMILY: &str = "sans-serif";

pub const TITLE_POINTS: f64 = 16.0;
pub const AXIS_LABEL_POINTS: f64 = 12.0;
pub const TICK_POINTS: f64 = 10.0;

const TIGHT_PAD_INCHES: f64 = 0.1;
const BACKGROUND: [u8; 3] = [255, 255, 255];

pub type Canvas<'a> = DrawingArea<BitMapBackend<'a>, Shift>;
pub type PlotArea<'c, 'a> =
    ChartContext<'c, BitMapBackend<'a>, Cartesian2d<RangedCoordf64, RangedCoordf64>>;
pub type DrawResult = Result<(), Box<dyn std::error::Error>>;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("figure resolves to an empty {width}x{height} canvas")]
    EmptyFigure { width: u32, height: u32 },
    #[error("drawing failed: {0}")]
    Draw(String),
    #[error("PNG encoding failed: {0}")]
    Encode(#[from] image::ImageError),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FigureSize {
    pub width_in: f64,
    pub height_in: f64,
}

impl FigureSize {
    pub const fn new(width_in: f64, height_in: f64) -> Self {
        Self {
            width_in,
            height_in,
        }
    }

    pub fn pixels(&self, dpi: u32) -> (u32, u32) {
        let dpi = dpi as f64;
        (
            (self.width_in * dpi).round().max(0.0) as u32,
            (self.height_in * dpi).round().max(0.0) as u32,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderSettings {
    pub dpi: u32,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self { dpi: DEFAULT_DPI }
    }
}

impl RenderSettings {
    /// Converts a length in points to pixels at this resolution.
    pub fn px(&self, points: f64) -> u32 {
        ((points * self.dpi as f64) / 72.0).round().max(1.0) as u32
    }

    pub fn font(&self, points: f64) -> FontDesc<'static> {
        (FONT_FAMILY, self.px(points) as f64).into_font()
    }

    pub fn title_font(&self) -> FontDesc<'static> {
        self.font(TITLE_POINTS)
    }

    pub fn axis_font(&self) -> FontDesc<'static> {
        self.font(AXIS_LABEL_POINTS)
    }

    pub fn tick_font(&self) -> FontDesc<'static> {
        self.font(TICK_POINTS)
    }

    pub fn line_width(&self) -> u32 {
        self.px(1.5)
    }
}

/// An encoded chart image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedChart {
    pub png: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Draws one figure into an in-memory RGB canvas, crops it to its content and encodes it
/// as PNG. The canvas lives only for the duration of this call.
pub fn render_png<F>(
    figure: FigureSize,
    settings: &RenderSettings,
    draw: F,
) -> Result<RenderedChart, RenderError>
where
    F: FnOnce(&Canvas<'_>) -> DrawResult,
{
    let (width, height) = figure.pixels(settings.dpi);
    if width == 0 || height == 0 {
        return Err(RenderError::EmptyFigure { width, height });
    }

    let mut buffer = vec![0u8; width as usize * height as usize * 3];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
        root.fill(&WHITE).map_err(draw_error)?;
        draw(&root).map_err(|err| RenderError::Draw(err.to_string()))?;
        root.present().map_err(draw_error)?;
    }

    let pad = (TIGHT_PAD_INCHES * settings.dpi as f64).round() as u32;
    let (pixels, crop_width, crop_height) = crop_to_content(&buffer, width, height, pad);
    drop(buffer);

    let mut png = Vec::new();
    PngEncoder::new(&mut png).write_image(&pixels, crop_width, crop_height, ColorType::Rgb8)?;

    Ok(RenderedChart {
        png,
        width: crop_width,
        height: crop_height,
    })
}

fn draw_error(err: impl std::error::Error) -> RenderError {
    RenderError::Draw(err.to_string())
}

/// Inclusive pixel bounds `(x0, y0, x1, y1)` of everything that is not background.
pub fn content_bounds(pixels: &[u8], width: u32, height: u32) -> Option<(u32, u32, u32, u32)> {
    let mut bounds: Option<(u32, u32, u32, u32)> = None;
    for y in 0..height {
        let row_start = (y * width) as usize * 3;
        for x in 0..width {
            let offset = row_start + x as usize * 3;
            if pixels[offset..offset + 3] == BACKGROUND {
                continue;
            }
            bounds = Some(match bounds {
                None => (x, y, x, y),
                Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
            });
        }
    }
    bounds
}

/// Crops an RGB buffer to its content plus `pad` pixels on every side. A blank buffer is
/// returned whole.
pub fn crop_to_content(pixels: &[u8], width: u32, height: u32, pad: u32) -> (Vec<u8>, u32, u32) {
    let Some((x0, y0, x1, y1)) = content_bounds(pixels, width, height) else {
        return (pixels.to_vec(), width, height);
    };

    let left = x0.saturating_sub(pad);
    let top = y0.saturating_sub(pad);
    let right = (x1 + pad).min(width - 1);
    let bottom = (y1 + pad).min(height - 1);

    let crop_width = right - left + 1;
    let crop_height = bottom - top + 1;
    let mut out = Vec::with_capacity(crop_width as usize * crop_height as usize * 3);
    for y in top..=bottom {
        let start = ((y * width + left) as usize) * 3;
        let end = start + crop_width as usize * 3;
        out.extend_from_slice(&pixels[start..end]);
    }
    (out, crop_width, crop_height)
}

/// Value axis from zero to a little above `max`.
pub fn zero_based_range(max: f64) -> Range<f64> {
    if max.is_finite() && max > 0.0 {
        0.0..max * 1.05
    } else {
        0.0..1.0
    }
}

/// Axis spanning `[min, max]` with a 5% margin on both ends.
pub fn padded_range(min: f64, max: f64) -> Range<f64> {
    if !min.is_finite() || !max.is_finite() {
        return 0.0..1.0;
    }
    let span = max - min;
    if span <= 0.0 {
        return (min - 1.0)..(max + 1.0);
    }
    (min - span * 0.05)..(max + span * 0.05)
}

/// Range for `count` categories centred on the integers `0..count`.
pub fn category_range(count: usize) -> Range<f64> {
    -0.5..(count.max(1) as f64 - 0.5)
}

/// Label area tall enough for rotated category names plus the axis description.
pub fn category_label_area(labels: &[String], settings: &RenderSettings) -> u32 {
    let longest = labels.iter().map(|l| l.chars().count()).max().unwrap_or(1) as f64;
    let tick_px = settings.px(TICK_POINTS) as f64;
    let axis_px = settings.px(AXIS_LABEL_POINTS) as f64;
    (longest * tick_px * 0.62 + axis_px * 2.0 + tick_px) as u32
}

/// Cartesian chart with a categorical x axis. Category names are drawn separately with
/// [`draw_x_category_labels`] so they can be rotated.
pub fn category_chart<'c, 'a>(
    root: &'c Canvas<'a>,
    title: &str,
    labels: &[String],
    y_range: Range<f64>,
    settings: &RenderSettings,
) -> Result<PlotArea<'c, 'a>, Box<dyn std::error::Error>> {
    let chart = ChartBuilder::on(root)
        .caption(title, settings.title_font())
        .margin(settings.px(10.0))
        .x_label_area_size(category_label_area(labels, settings))
        .y_label_area_size(settings.px(60.0))
        .build_cartesian_2d(category_range(labels.len()), y_range)?;
    Ok(chart)
}

/// Draws category names under the x axis, rotated a quarter turn, at each label's x value.
/// Plotters only rotates text in quarter turns, so this stands in for a 45 degree tilt.
pub fn draw_x_category_labels(
    root: &Canvas<'_>,
    chart: &PlotArea<'_, '_>,
    labels: &[(f64, String)],
    y_axis_value: f64,
    settings: &RenderSettings,
) -> DrawResult {
    let tick_px = settings.px(TICK_POINTS) as i32;
    let style = settings
        .tick_font()
        .transform(FontTransform::Rotate90)
        .color(&BLACK);
    for (x, label) in labels {
        let (px, py) = chart.backend_coord(&(*x, y_axis_value));
        root.draw(&Text::new(
            label.clone(),
            (px + tick_px / 2, py + tick_px / 2),
            style.clone(),
        ))?;
    }
    Ok(())
}

/// Draws category names to the left of the y axis, right-aligned at each label's y value.
pub fn draw_y_category_labels(
    root: &Canvas<'_>,
    chart: &PlotArea<'_, '_>,
    labels: &[(f64, String)],
    x_axis_value: f64,
    settings: &RenderSettings,
) -> DrawResult {
    let gap = settings.px(4.0) as i32;
    let style = settings
        .tick_font()
        .color(&BLACK)
        .pos(Pos::new(HPos::Right, VPos::Center));
    for (y, label) in labels {
        let (px, py) = chart.backend_coord(&(x_axis_value, *y));
        root.draw(&Text::new(label.clone(), (px - gap, py), style.clone()))?;
    }
    Ok(())
}

/// Adds a marker-less legend entry, used as a heading above the series entries.
pub fn legend_heading<'c, 'a: 'c>(chart: &mut PlotArea<'c, 'a>, heading: &str) -> DrawResult {
    chart
        .draw_series(std::iter::empty::<Rectangle<(f64, f64)>>())?
        .label(heading)
        .legend(|(x, y)| EmptyElement::at((x, y)));
    Ok(())
}

pub fn draw_legend<'c, 'a: 'c>(
    chart: &mut PlotArea<'c, 'a>,
    position: SeriesLabelPosition,
    settings: &RenderSettings,
) -> DrawResult {
    chart
        .configure_series_labels()
        .position(position)
        .margin(settings.px(6.0))
        .legend_area_size(settings.px(18.0))
        .label_font(settings.tick_font())
        .background_style(WHITE.mix(0.85))
        .border_style(BLACK.mix(0.4))
        .draw()?;
    Ok(())
}

/// Legend swatch for filled series such as bars.
pub fn swatch(
    color: RGBColor,
    settings: &RenderSettings,
) -> impl Fn((i32, i32)) -> Rectangle<(i32, i32)> {
    let half = settings.px(5.0) as i32;
    move |(x, y)| Rectangle::new([(x, y - half), (x + half * 2, y + half)], color.filled())
}
