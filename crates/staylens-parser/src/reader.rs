use std::collections::HashSet;
use std::fs;
use std::path::Path;

use csv::ReaderBuilder;
use polars::prelude::*;

use crate::columns::ColumnAccumulator;
use crate::errors::LoaderError;
use crate::model::{LoadedTable, TableSchema};
use crate::schema::REQUIRED_COLUMNS;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    pub delimiter: u8,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

pub fn load_listings(path: &Path, options: &LoadOptions) -> Result<LoadedTable, LoaderError> {
    let bytes = fs::read(path).map_err(|source| LoaderError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_listings_bytes(&bytes, options)
}

pub fn parse_listings(content: &str, options: &LoadOptions) -> Result<LoadedTable, LoaderError> {
    parse_listings_bytes(content.as_bytes(), options)
}

fn parse_listings_bytes(content: &[u8], options: &LoadOptions) -> Result<LoadedTable, LoaderError> {
    let mut reader = ReaderBuilder::new()
        .delimiter(options.delimiter)
        .has_headers(true)
        .from_reader(content);

    let header = reader.headers()?.clone();
    if header.is_empty() || header.iter().all(|name| name.trim().is_empty()) {
        return Err(LoaderError::EmptyHeader);
    }

    let names: Vec<String> = header
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let name = if idx == 0 {
                name.trim_start_matches('\u{feff}')
            } else {
                name
            };
            name.trim().to_string()
        })
        .collect();

    let mut seen = HashSet::new();
    for (index, name) in names.iter().enumerate() {
        if !seen.insert(name.as_str()) {
            return Err(LoaderError::DuplicateColumn {
                index,
                name: name.clone(),
            });
        }
    }

    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|required| !seen.contains(**required))
        .map(|required| required.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(LoaderError::MissingColumns { missing });
    }

    let mut accumulators: Vec<ColumnAccumulator> =
        names.iter().map(|name| ColumnAccumulator::new(name)).collect();

    for record in reader.records() {
        let record = record?;
        for (acc, field) in accumulators.iter_mut().zip(record.iter()) {
            acc.push(field);
        }
    }

    let mut columns: Vec<Column> = Vec::with_capacity(accumulators.len());
    let mut schema = TableSchema::default();
    for acc in accumulators {
        let (column, column_schema) = acc.into_column();
        columns.push(column);
        schema.columns.push(column_schema);
    }

    let df = DataFrame::new(columns)?;
    Ok(LoadedTable { df, schema })
}
