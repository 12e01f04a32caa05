//! Load, clean and render, end to end.

use std::path::PathBuf;

use chrono::Utc;
use serde::Serialize;
use staylens_parser::{load_listings, LoadOptions};
use tracing::{debug, info};

use crate::charts::all_charts;
use crate::cleaning::{clean_listings, CleaningScope};
use crate::error::{PipelineError, Result};
use crate::listings::CleanedListings;
use crate::render::RenderSettings;
use crate::sink::ImageSink;
use crate::summary::RunSummary;

pub const DEFAULT_INPUT: &str = "data/AB_NYC_2019.csv";

/// One chart handed to the sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartArtifact {
    pub name: String,
    pub title: String,
    pub location: String,
    pub width: u32,
    pub height: u32,
    pub bytes: usize,
}

/// Renders every chart in order and stores each image as soon as it is encoded. The first
/// failure stops the run; images already stored are left in place.
pub fn render_all(
    listings: &CleanedListings,
    sink: &mut dyn ImageSink,
    settings: &RenderSettings,
) -> Result<Vec<ChartArtifact>> {
    let mut artifacts = Vec::new();
    for chart in all_charts() {
        let name = chart.name();
        debug!(chart = name, dpi = settings.dpi, "Rendering chart");
        let rendered = chart
            .render(listings, settings)
            .map_err(|source| PipelineError::Chart { name, source })?;
        let location = sink.put_image(name, &rendered.png)?;
        info!(
            chart = name,
            location = %location,
            width = rendered.width,
            height = rendered.height,
            "Chart saved"
        );
        artifacts.push(ChartArtifact {
            name: name.to_string(),
            title: chart.title().to_string(),
            location,
            width: rendered.width,
            height: rendered.height,
            bytes: rendered.png.len(),
        });
    }
    Ok(artifacts)
}

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub input: PathBuf,
    pub load: LoadOptions,
    pub scope: CleaningScope,
    pub render: RenderSettings,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT),
            load: LoadOptions::default(),
            scope: CleaningScope::default(),
            render: RenderSettings::default(),
        }
    }
}

pub fn run(options: &RunOptions, sink: &mut dyn ImageSink) -> Result<RunSummary> {
    info!(input = %options.input.display(), "Loading listings");
    let table = load_listings(&options.input, &options.load)?;
    info!(
        rows = table.row_count(),
        columns = table.schema.columns.len(),
        "Listings loaded"
    );

    let schema = table.schema;
    let (listings, cleaning) = clean_listings(table.df, options.scope)?;
    let charts = render_all(&listings, sink, &options.render)?;

    Ok(RunSummary {
        generated_at: Utc::now(),
        input: options.input.clone(),
        schema,
        cleaning,
        dpi: options.render.dpi,
        charts,
    })
}
