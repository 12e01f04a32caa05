use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("input did not contain a header row")]
    EmptyHeader,

    #[error("header column {index} ('{name}') appears more than once")]
    DuplicateColumn { index: usize, name: String },

    #[error("required columns missing from input: {}", missing.join(", "))]
    MissingColumns { missing: Vec<String> },

    #[error("failed to build listings dataframe: {0}")]
    Polars(#[from] polars::error::PolarsError),
}
