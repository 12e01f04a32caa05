use thiserror::Error;

use crate::charts::ChartError;
use crate::sink::SinkError;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Loading listings failed: {0}")]
    Loader(#[from] staylens_parser::LoaderError),

    #[error("Polars operation failed: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("Chart '{name}' failed: {source}")]
    Chart {
        name: &'static str,
        #[source]
        source: ChartError,
    },

    #[error("Writing chart image failed: {0}")]
    Sink(#[from] SinkError),

    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
