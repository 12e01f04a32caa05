use polars::prelude::*;

use crate::model::{ColumnKind, ColumnSchema};
use crate::schema::is_na_token;

/// Raw text cells for one column, collected row by row before the type is known.
#[derive(Debug, Clone)]
pub(crate) struct ColumnAccumulator {
    name: String,
    values: Vec<Option<String>>,
}

impl ColumnAccumulator {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            values: Vec::new(),
        }
    }

    pub fn push(&mut self, raw: &str) {
        let trimmed = raw.trim();
        if is_na_token(trimmed) {
            self.values.push(None);
        } else {
            self.values.push(Some(trimmed.to_string()));
        }
    }

    pub fn infer_kind(&self) -> ColumnKind {
        let mut present = self.values.iter().flatten().peekable();
        if present.peek().is_none() {
            return ColumnKind::Float64;
        }

        let mut all_int = true;
        for value in present {
            if all_int && value.parse::<i64>().is_ok() {
                continue;
            }
            all_int = false;
            if value.parse::<f64>().is_err() {
                return ColumnKind::Text;
            }
        }

        if all_int {
            ColumnKind::Int64
        } else {
            ColumnKind::Float64
        }
    }

    pub fn into_column(self) -> (Column, ColumnSchema) {
        let kind = self.infer_kind();
        let null_count = self.values.iter().filter(|v| v.is_none()).count();
        let name: PlSmallStr = self.name.as_str().into();

        let series = match kind {
            ColumnKind::Int64 => {
                let data: Vec<Option<i64>> = self
                    .values
                    .iter()
                    .map(|v| v.as_deref().and_then(|s| s.parse().ok()))
                    .collect();
                Series::new(name, data)
            }
            ColumnKind::Float64 => {
                let data: Vec<Option<f64>> = self
                    .values
                    .iter()
                    .map(|v| v.as_deref().and_then(|s| s.parse().ok()))
                    .collect();
                Series::new(name, data)
            }
            ColumnKind::Text => {
                let data: Vec<Option<&str>> = self.values.iter().map(|v| v.as_deref()).collect();
                Series::new(name, data)
            }
        };

        let schema = ColumnSchema {
            name: self.name,
            kind,
            null_count,
        };
        (series.into(), schema)
    }
}
