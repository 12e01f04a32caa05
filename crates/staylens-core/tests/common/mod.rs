#![allow(dead_code)]

use std::path::PathBuf;

use polars::prelude::*;
use staylens_core::{clean_listings, CleanedListings, CleaningScope};

/// `(neighbourhood_group, room_type, price, number_of_reviews, availability_365, last_review)`
pub type Row<'a> = (&'a str, &'a str, f64, i64, i64, &'a str);

pub fn raw_frame(rows: &[Row<'_>]) -> DataFrame {
    df!(
        "neighbourhood_group" => rows.iter().map(|r| r.0).collect::<Vec<_>>(),
        "room_type" => rows.iter().map(|r| r.1).collect::<Vec<_>>(),
        "price" => rows.iter().map(|r| r.2).collect::<Vec<_>>(),
        "number_of_reviews" => rows.iter().map(|r| r.3).collect::<Vec<_>>(),
        "availability_365" => rows.iter().map(|r| r.4).collect::<Vec<_>>(),
        "last_review" => rows.iter().map(|r| r.5).collect::<Vec<_>>(),
    )
    .unwrap()
}

pub fn cleaned(rows: &[Row<'_>]) -> CleanedListings {
    let (listings, report) = clean_listings(raw_frame(rows), CleaningScope::AllColumns).unwrap();
    assert_eq!(report.rows_dropped, 0, "fixture rows should all be complete");
    listings
}

/// Two groups by two room types.
pub fn two_by_two() -> CleanedListings {
    cleaned(&[
        ("Manhattan", "Entire home/apt", 225.0, 45, 100, "2019-05-21"),
        ("Brooklyn", "Private room", 149.0, 9, 365, "2018-10-19"),
        ("Manhattan", "Entire home/apt", 175.0, 12, 300, "2019-06-01"),
        ("Brooklyn", "Entire home/apt", 89.0, 270, 194, "2019-07-05"),
        ("Manhattan", "Private room", 80.0, 9, 0, "2018-11-19"),
    ])
}

pub fn sample_csv() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../staylens-parser/tests/data/AB_NYC_sample.csv")
}
