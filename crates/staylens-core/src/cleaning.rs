use std::collections::BTreeMap;
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use staylens_parser::schema::{LAST_REVIEW, REQUIRED_COLUMNS};
use tracing::{debug, info};

use crate::listings::{epoch_days, CleanedListings};

/// Which columns a row must have populated to survive cleaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CleaningScope {
    /// Drop a row when any column at all is missing.
    #[default]
    AllColumns,
    /// Only the columns the charts read are checked.
    RequiredColumns,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum DropReason {
    Missing(String),
    UnparseableDate,
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DropReason::Missing(column) => write!(f, "missing:{column}"),
            DropReason::UnparseableDate => write!(f, "unparseable_date:{LAST_REVIEW}"),
        }
    }
}

/// Accounting for the rows removed by [`clean_listings`]. A row with several problems is
/// tallied once under each reason but only once in `rows_dropped`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleaningReport {
    pub scope: CleaningScope,
    pub rows_in: usize,
    pub rows_retained: usize,
    pub rows_dropped: usize,
    pub dropped_by_reason: BTreeMap<String, usize>,
}

impl CleaningReport {
    pub fn dropped_for(&self, reason: &DropReason) -> usize {
        self.dropped_by_reason
            .get(&reason.to_string())
            .copied()
            .unwrap_or(0)
    }
}

pub fn parse_review_date(raw: &str) -> Option<NaiveDate> {
    static DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];
    static DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

    let trimmed = raw.trim();
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, fmt) {
            return Some(date);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(dt.date());
        }
    }
    None
}

/// Parses `last_review` into dates and removes every row with a missing value in the
/// checked columns. Unparseable dates count as missing.
pub fn clean_listings(
    raw: DataFrame,
    scope: CleaningScope,
) -> Result<(CleanedListings, CleaningReport), PolarsError> {
    let mut df = raw;
    let rows_in = df.height();

    let unparseable = convert_last_review(&mut df)?;

    let checked: Vec<String> = match scope {
        CleaningScope::AllColumns => df
            .get_column_names()
            .into_iter()
            .map(|name| name.to_string())
            .collect(),
        CleaningScope::RequiredColumns => {
            REQUIRED_COLUMNS.iter().map(|name| name.to_string()).collect()
        }
    };

    let mut keep = vec![true; rows_in];
    let mut reasons: BTreeMap<DropReason, usize> = BTreeMap::new();

    for name in &checked {
        let column = df.column(name)?;
        let missing = missing_mask(column)?;
        for (idx, is_missing) in missing.into_iter().enumerate() {
            if !is_missing {
                continue;
            }
            keep[idx] = false;
            let reason = if name == LAST_REVIEW && unparseable[idx] {
                DropReason::UnparseableDate
            } else {
                DropReason::Missing(name.clone())
            };
            *reasons.entry(reason).or_insert(0) += 1;
        }
    }

    let mask = BooleanChunked::from_slice("keep".into(), &keep);
    let cleaned = df.filter(&mask)?;

    let report = CleaningReport {
        scope,
        rows_in,
        rows_retained: cleaned.height(),
        rows_dropped: rows_in - cleaned.height(),
        dropped_by_reason: reasons
            .into_iter()
            .map(|(reason, count)| (reason.to_string(), count))
            .collect(),
    };

    info!(
        rows_in = report.rows_in,
        rows_retained = report.rows_retained,
        rows_dropped = report.rows_dropped,
        scope = ?report.scope,
        "Dropped incomplete listing rows"
    );
    for (reason, count) in &report.dropped_by_reason {
        debug!(reason = %reason, count, "Rows dropped");
    }

    Ok((CleanedListings::new(cleaned), report))
}

/// Replaces the `last_review` column with a `Date` column. Returns, per row, whether a
/// present value failed to parse.
fn convert_last_review(df: &mut DataFrame) -> PolarsResult<Vec<bool>> {
    let len = df.height();
    let column = df.column(LAST_REVIEW)?;
    if matches!(column.dtype(), DataType::Date) {
        return Ok(vec![false; len]);
    }

    let text = column.cast(&DataType::String)?;
    let text = text.str()?;

    let mut days: Vec<Option<i32>> = Vec::with_capacity(len);
    let mut unparseable = Vec::with_capacity(len);
    for idx in 0..len {
        match text.get(idx) {
            Some(raw) => match parse_review_date(raw) {
                Some(date) => {
                    days.push(Some(epoch_days(date)));
                    unparseable.push(false);
                }
                None => {
                    days.push(None);
                    unparseable.push(true);
                }
            },
            None => {
                days.push(None);
                unparseable.push(false);
            }
        }
    }

    let dates = Series::new(LAST_REVIEW.into(), days).cast(&DataType::Date)?;
    df.with_column(dates)?;
    Ok(unparseable)
}

/// Null cells, plus NaN for float columns.
fn missing_mask(column: &Column) -> PolarsResult<Vec<bool>> {
    let len = column.len();
    let nulls = column.is_null();
    let mut mask: Vec<bool> = (0..len).map(|idx| nulls.get(idx).unwrap_or(false)).collect();

    if matches!(column.dtype(), DataType::Float64 | DataType::Float32) {
        let floats = column.cast(&DataType::Float64)?;
        let floats = floats.f64()?;
        for (idx, flag) in mask.iter_mut().enumerate() {
            if floats.get(idx).is_some_and(f64::is_nan) {
                *flag = true;
            }
        }
    }

    Ok(mask)
}
