mod common;

use chrono::{Duration, NaiveDate};
use staylens_core::charts::{
    availability_by_room_type, group_counts, price_availability_pivot, price_box_stats,
    price_review_points, review_rolling_means, review_totals, ROLLING_WINDOW,
};

use common::{cleaned, two_by_two, Row};

#[test]
fn group_counts_match_rows_per_group() {
    let counts = group_counts(&two_by_two()).unwrap();
    let pairs: Vec<(&str, usize)> = counts.iter().map(|c| (c.group.as_str(), c.count)).collect();
    assert_eq!(pairs, vec![("Manhattan", 3), ("Brooklyn", 2)]);
}

#[test]
fn group_count_ties_are_ordered_by_name() {
    let listings = cleaned(&[
        ("Queens", "Private room", 50.0, 1, 10, "2019-01-01"),
        ("Bronx", "Private room", 50.0, 1, 10, "2019-01-01"),
    ]);
    let counts = group_counts(&listings).unwrap();
    assert_eq!(counts[0].group, "Bronx");
    assert_eq!(counts[1].group, "Queens");
}

#[test]
fn availability_mean_and_sample_std() {
    let table = availability_by_room_type(&two_by_two()).unwrap();
    assert_eq!(table.groups, vec!["Brooklyn", "Manhattan"]);
    assert_eq!(table.room_types, vec!["Entire home/apt", "Private room"]);

    let pair = table.get("Manhattan", "Entire home/apt").unwrap();
    assert_eq!(pair.count, 2);
    assert!((pair.mean - 200.0).abs() < 1e-9);
    let std_dev = pair.std_dev.unwrap();
    assert!((std_dev - 141.421_356_237).abs() < 1e-6);

    let single = table.get("Manhattan", "Private room").unwrap();
    assert_eq!(single.mean, 0.0);
    assert_eq!(single.std_dev, None);
}

#[test]
fn absent_combination_has_no_cell() {
    let listings = cleaned(&[
        ("Queens", "Private room", 50.0, 1, 10, "2019-01-01"),
        ("Bronx", "Shared room", 40.0, 2, 20, "2019-01-02"),
    ]);
    let table = availability_by_room_type(&listings).unwrap();
    assert_eq!(table.get("Queens", "Shared room"), None);
    assert!(table.get("Bronx", "Shared room").is_some());
}

#[test]
fn box_stats_follow_first_appearance() {
    let listings = cleaned(&[
        ("Queens", "Private room", 10.0, 1, 10, "2019-01-01"),
        ("Bronx", "Private room", 55.0, 1, 10, "2019-01-01"),
        ("Queens", "Private room", 20.0, 1, 10, "2019-01-01"),
        ("Queens", "Private room", 30.0, 1, 10, "2019-01-01"),
        ("Queens", "Private room", 40.0, 1, 10, "2019-01-01"),
        ("Queens", "Private room", 1000.0, 1, 10, "2019-01-01"),
    ]);
    let stats = price_box_stats(&listings).unwrap();
    assert_eq!(stats[0].group, "Queens");
    assert_eq!(stats[1].group, "Bronx");

    let queens = &stats[0];
    assert_eq!(queens.count, 5);
    assert_eq!(queens.q1, 20.0);
    assert_eq!(queens.median, 30.0);
    assert_eq!(queens.q3, 40.0);
    assert_eq!(queens.whisker_low, 10.0);
    assert_eq!(queens.whisker_high, 40.0);
    assert_eq!(queens.outliers, vec![1000.0]);

    let bronx = &stats[1];
    assert_eq!(bronx.median, 55.0);
    assert!(bronx.outliers.is_empty());
}

#[test]
fn scatter_series_follow_first_appearance() {
    let series = price_review_points(&two_by_two()).unwrap();
    let names: Vec<&str> = series.iter().map(|s| s.room_type.as_str()).collect();
    assert_eq!(names, vec!["Entire home/apt", "Private room"]);
    assert_eq!(series[0].points, vec![(225.0, 45.0), (175.0, 12.0), (89.0, 270.0)]);
}

fn dated_rows(group: &'static str, count: usize) -> Vec<(String, i64)> {
    let start = NaiveDate::from_ymd_opt(2019, 1, 1).unwrap();
    (0..count)
        .map(|i| {
            let date = start + Duration::days(i as i64);
            (date.format("%Y-%m-%d").to_string(), i as i64)
        })
        .rev()
        .map(|(date, reviews)| (format!("{group}|{date}"), reviews))
        .collect()
}

fn rolling_listings(groups: &[(&'static str, usize)]) -> staylens_core::CleanedListings {
    let keyed: Vec<(String, i64)> = groups
        .iter()
        .flat_map(|(group, count)| dated_rows(group, *count))
        .collect();
    let rows: Vec<Row<'_>> = keyed
        .iter()
        .map(|(key, reviews)| {
            let (group, date) = key.split_once('|').unwrap();
            (group, "Private room", 100.0, *reviews, 10, date)
        })
        .collect();
    cleaned(&rows)
}

#[test]
fn short_group_has_no_rolling_values() {
    let listings = rolling_listings(&[("Staten Island", ROLLING_WINDOW - 1)]);
    let series = review_rolling_means(&listings).unwrap();
    assert_eq!(series.len(), 1);
    assert_eq!(series[0].points.len(), ROLLING_WINDOW - 1);
    assert!(series[0].points.iter().all(|(_, v)| v.is_none()));
}

#[test]
fn full_window_defines_only_last_sample() {
    let listings = rolling_listings(&[("Bronx", ROLLING_WINDOW), ("Queens", 3)]);
    let series = review_rolling_means(&listings).unwrap();
    assert_eq!(series[0].group, "Bronx");
    assert_eq!(series[1].group, "Queens");

    let bronx = &series[0].points;
    // Rows were inserted newest first; the series runs oldest first.
    assert!(bronx.windows(2).all(|w| w[0].0 <= w[1].0));
    let defined: Vec<f64> = bronx.iter().filter_map(|(_, v)| *v).collect();
    assert_eq!(defined.len(), 1);
    assert!((defined[0] - 14.5).abs() < 1e-9);
    assert!(bronx.last().unwrap().1.is_some());
}

#[test]
fn pivot_keeps_out_of_range_availability() {
    let listings = cleaned(&[
        ("Queens", "Private room", 50.0, 1, 400, "2019-01-01"),
        ("Queens", "Private room", 70.0, 1, 400, "2019-01-01"),
        ("Bronx", "Private room", 90.0, 1, -5, "2019-01-01"),
        ("Bronx", "Private room", 30.0, 1, 100, "2019-01-01"),
    ]);
    let pivot = price_availability_pivot(&listings).unwrap();
    assert_eq!(pivot.rows, vec!["Bronx", "Queens"]);
    assert_eq!(pivot.columns, vec![-5, 100, 400]);
    assert_eq!(pivot.get("Queens", 400), Some(60.0));
    assert_eq!(pivot.get("Bronx", -5), Some(90.0));
    assert_eq!(pivot.get("Queens", -5), None);
    assert_eq!(pivot.cells[1], vec![None, None, Some(60.0)]);
}

#[test]
fn review_totals_sum_per_cell() {
    let totals = review_totals(&two_by_two()).unwrap();
    assert_eq!(totals.groups, vec!["Brooklyn", "Manhattan"]);
    assert_eq!(totals.room_types, vec!["Entire home/apt", "Private room"]);
    assert_eq!(totals.get("Manhattan", "Entire home/apt"), Some(57));
    assert_eq!(totals.get("Brooklyn", "Private room"), Some(9));
    assert_eq!(totals.stack_heights(), vec![279, 66]);

    let sparse = cleaned(&[
        ("Queens", "Private room", 50.0, 4, 10, "2019-01-01"),
        ("Bronx", "Shared room", 40.0, 6, 20, "2019-01-02"),
    ]);
    let totals = review_totals(&sparse).unwrap();
    assert_eq!(totals.get("Queens", "Shared room"), None);
    assert_eq!(totals.stack_heights(), vec![6, 4]);
}

#[test]
fn pivot_groups_fractional_availability_on_whole_days() {
    let raw = polars::df!(
        "neighbourhood_group" => &["Queens", "Queens", "Queens"],
        "room_type" => &["Private room", "Private room", "Private room"],
        "price" => &[50.0f64, 70.0, 90.0],
        "number_of_reviews" => &[1i64, 2, 3],
        "availability_365" => &[100.2f64, 100.7, 200.0],
        "last_review" => &["2019-01-01", "2019-01-02", "2019-01-03"],
    )
    .unwrap();
    let (listings, _) =
        staylens_core::clean_listings(raw, staylens_core::CleaningScope::AllColumns).unwrap();

    let pivot = price_availability_pivot(&listings).unwrap();
    assert_eq!(pivot.columns, vec![100, 200]);
    assert_eq!(pivot.get("Queens", 100), Some(60.0));
    assert_eq!(pivot.get("Queens", 200), Some(90.0));
}
