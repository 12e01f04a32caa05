use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use staylens_core::pipeline::{self, RunOptions, DEFAULT_INPUT};
use staylens_core::{write_summary, CleaningScope, FileSink, LoadOptions, RenderSettings};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Render Airbnb listing visualizations", long_about = None)]
struct Cli {
    /// Listings CSV to read
    #[arg(long, default_value = DEFAULT_INPUT)]
    input: PathBuf,

    /// Directory the PNG files are written to
    #[arg(long, default_value = "visualizations")]
    output_dir: PathBuf,

    /// Output resolution in dots per inch
    #[arg(long, default_value_t = 300, value_parser = clap::value_parser!(u32).range(1..))]
    dpi: u32,

    /// Field delimiter of the input file
    #[arg(long, default_value_t = ',')]
    delimiter: char,

    /// Which columns must be populated for a row to be kept
    #[arg(long, value_enum, default_value_t = DropScope::All)]
    drop_scope: DropScope,

    /// Also write a JSON run summary to this path
    #[arg(long)]
    summary: Option<PathBuf>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum DropScope {
    /// Any missing value drops the row
    All,
    /// Only the charted columns are checked
    Required,
}

impl From<DropScope> for CleaningScope {
    fn from(scope: DropScope) -> Self {
        match scope {
            DropScope::All => CleaningScope::AllColumns,
            DropScope::Required => CleaningScope::RequiredColumns,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let cli = Cli::parse();

    if !cli.delimiter.is_ascii() {
        bail!("delimiter must be a single ASCII character, got {:?}", cli.delimiter);
    }

    let options = RunOptions {
        input: cli.input.clone(),
        load: LoadOptions {
            delimiter: cli.delimiter as u8,
        },
        scope: cli.drop_scope.into(),
        render: RenderSettings { dpi: cli.dpi },
    };

    let mut sink = FileSink::new(&cli.output_dir);
    let summary = pipeline::run(&options, &mut sink).with_context(|| {
        format!(
            "failed to render visualizations from {} into {}",
            cli.input.display(),
            cli.output_dir.display()
        )
    })?;
    info!(
        output_dir = %sink.dir().display(),
        charts = summary.charts.len(),
        rows_retained = summary.cleaning.rows_retained,
        "Visualizations written"
    );

    if let Some(path) = &cli.summary {
        write_summary(path, &summary)
            .with_context(|| format!("failed to write run summary to {}", path.display()))?;
        info!(path = %path.display(), "Run summary written");
    }

    println!("All visualizations have been generated and saved.");
    Ok(())
}
