//! Column names the listing charts depend on.

pub const NEIGHBOURHOOD_GROUP: &str = "neighbourhood_group";
pub const ROOM_TYPE: &str = "room_type";
pub const PRICE: &str = "price";
pub const NUMBER_OF_REVIEWS: &str = "number_of_reviews";
pub const AVAILABILITY_365: &str = "availability_365";
pub const LAST_REVIEW: &str = "last_review";

/// Every column a listings file must carry, in the order they are reported when absent.
pub const REQUIRED_COLUMNS: [&str; 6] = [
    NEIGHBOURHOOD_GROUP,
    PRICE,
    ROOM_TYPE,
    AVAILABILITY_365,
    NUMBER_OF_REVIEWS,
    LAST_REVIEW,
];

/// Tokens read as a missing value. Matches the NA set common dataframe tools use by default.
pub const NA_TOKENS: &[&str] = &[
    "",
    "#N/A",
    "#N/A N/A",
    "#NA",
    "-1.#IND",
    "-1.#QNAN",
    "-NaN",
    "-nan",
    "1.#IND",
    "1.#QNAN",
    "<NA>",
    "N/A",
    "NA",
    "NULL",
    "NaN",
    "None",
    "n/a",
    "nan",
    "null",
];

pub fn is_na_token(value: &str) -> bool {
    NA_TOKENS.contains(&value)
}
