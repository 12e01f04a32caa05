mod common;

use chrono::NaiveDate;
use polars::prelude::*;
use staylens_core::charts::group_counts;
use staylens_core::cleaning::parse_review_date;
use staylens_core::{clean_listings, load_listings, CleaningScope, DropReason, LoadOptions};

#[test]
fn row_missing_price_is_dropped() {
    let raw = df!(
        "neighbourhood_group" => &["Manhattan", "Brooklyn"],
        "room_type" => &["Entire home/apt", "Private room"],
        "price" => &[Some(150.0f64), None],
        "number_of_reviews" => &[10i64, 3],
        "availability_365" => &[200i64, 12],
        "last_review" => &["2019-06-01", "2019-02-11"],
    )
    .unwrap();

    let (listings, report) = clean_listings(raw, CleaningScope::AllColumns).unwrap();
    assert_eq!(listings.len(), 1);
    assert_eq!(report.rows_in, 2);
    assert_eq!(report.rows_retained, 1);
    assert_eq!(report.dropped_for(&DropReason::Missing("price".into())), 1);

    let counts = group_counts(&listings).unwrap();
    assert_eq!(counts.len(), 1);
    assert_eq!(counts[0].group, "Manhattan");
    assert_eq!(counts[0].count, 1);
}

#[test]
fn cleaned_frame_has_no_nulls_and_typed_dates() {
    let raw = df!(
        "neighbourhood_group" => &[Some("Queens"), Some("Bronx"), None],
        "room_type" => &["Private room", "Shared room", "Private room"],
        "price" => &[60.0f64, f64::NAN, 75.0],
        "number_of_reviews" => &[4i64, 1, 7],
        "availability_365" => &[30i64, 90, 180],
        "last_review" => &[Some("2019-03-04"), Some("2019-04-05"), Some("2019-05-06")],
        "reviews_per_month" => &[Some(0.5f64), Some(1.0), None],
    )
    .unwrap();

    let (listings, report) = clean_listings(raw, CleaningScope::AllColumns).unwrap();
    let frame = listings.frame();
    assert_eq!(frame.height(), 1);
    assert!(frame.get_columns().iter().all(|c| c.null_count() == 0));
    assert_eq!(frame.column("last_review").unwrap().dtype(), &DataType::Date);
    assert_eq!(report.dropped_for(&DropReason::Missing("price".into())), 1);
    assert_eq!(report.dropped_for(&DropReason::Missing("neighbourhood_group".into())), 1);
    assert_eq!(report.dropped_for(&DropReason::Missing("reviews_per_month".into())), 1);

    let records = listings.records().unwrap();
    assert_eq!(
        records[0].last_review,
        NaiveDate::from_ymd_opt(2019, 3, 4).unwrap()
    );
}

#[test]
fn unparseable_dates_are_reported_separately() {
    let raw = df!(
        "neighbourhood_group" => &["Queens", "Queens", "Queens"],
        "room_type" => &["Private room", "Private room", "Private room"],
        "price" => &[60.0f64, 70.0, 80.0],
        "number_of_reviews" => &[4i64, 1, 7],
        "availability_365" => &[30i64, 90, 180],
        "last_review" => &[Some("someday"), None, Some("2019/05/06")],
    )
    .unwrap();

    let (listings, report) = clean_listings(raw, CleaningScope::AllColumns).unwrap();
    assert_eq!(listings.len(), 1);
    assert_eq!(report.rows_dropped, 2);
    assert_eq!(report.dropped_for(&DropReason::UnparseableDate), 1);
    assert_eq!(report.dropped_for(&DropReason::Missing("last_review".into())), 1);
    assert_eq!(
        report.dropped_by_reason.get("unparseable_date:last_review"),
        Some(&1)
    );
}

#[test]
fn required_scope_ignores_unrelated_columns() {
    let raw = || {
        df!(
            "neighbourhood_group" => &["Queens", "Bronx"],
            "room_type" => &["Private room", "Shared room"],
            "price" => &[60.0f64, 40.0],
            "number_of_reviews" => &[4i64, 1],
            "availability_365" => &[30i64, 90],
            "last_review" => &["2019-03-04", "2019-04-05"],
            "host_name" => &[Some("Ana"), None],
        )
        .unwrap()
    };

    let (all, _) = clean_listings(raw(), CleaningScope::AllColumns).unwrap();
    assert_eq!(all.len(), 1);

    let (required, report) = clean_listings(raw(), CleaningScope::RequiredColumns).unwrap();
    assert_eq!(required.len(), 2);
    assert_eq!(report.rows_dropped, 0);
    assert_eq!(report.scope, CleaningScope::RequiredColumns);
    assert!(report.dropped_by_reason.is_empty());
}

#[test]
fn review_dates_accept_common_layouts() {
    let expected = NaiveDate::from_ymd_opt(2019, 7, 5);
    assert_eq!(parse_review_date("2019-07-05"), expected);
    assert_eq!(parse_review_date(" 2019/07/05 "), expected);
    assert_eq!(parse_review_date("07/05/2019"), expected);
    assert_eq!(parse_review_date("2019-07-05 13:45:00"), expected);
    assert_eq!(parse_review_date("2019-07-05T13:45:00"), expected);
    assert_eq!(parse_review_date("2019-13-01"), None);
    assert_eq!(parse_review_date(""), None);
}

#[test]
fn sample_file_loses_row_without_reviews() {
    let table = load_listings(&common::sample_csv(), &LoadOptions::default()).unwrap();
    assert_eq!(table.row_count(), 5);

    let (listings, report) = clean_listings(table.df, CleaningScope::AllColumns).unwrap();
    assert_eq!(listings.len(), 4);
    assert_eq!(report.rows_dropped, 1);
    assert_eq!(report.dropped_for(&DropReason::Missing("last_review".into())), 1);
    assert_eq!(report.dropped_for(&DropReason::Missing("reviews_per_month".into())), 1);

    let counts = group_counts(&listings).unwrap();
    let manhattan = counts.iter().find(|c| c.group == "Manhattan").unwrap();
    assert_eq!(manhattan.count, 2);
}
