use chrono::{Datelike, NaiveDate};
use polars::prelude::*;
use staylens_parser::schema::{
    AVAILABILITY_365, LAST_REVIEW, NEIGHBOURHOOD_GROUP, NUMBER_OF_REVIEWS, PRICE, ROOM_TYPE,
};

/// Days between 0001-01-01 and the Unix epoch, the offset polars dates are stored against.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// One cleaned listing, restricted to the fields the charts read.
#[derive(Debug, Clone, PartialEq)]
pub struct Listing {
    pub neighbourhood_group: String,
    pub room_type: String,
    pub price: f64,
    pub number_of_reviews: i64,
    pub availability_365: i64,
    pub last_review: NaiveDate,
}

/// The cleaned listings table. Built once by the cleaner and only ever borrowed afterwards.
#[derive(Debug, Clone)]
pub struct CleanedListings {
    df: DataFrame,
}

impl CleanedListings {
    pub(crate) fn new(df: DataFrame) -> Self {
        Self { df }
    }

    pub fn frame(&self) -> &DataFrame {
        &self.df
    }

    pub fn len(&self) -> usize {
        self.df.height()
    }

    pub fn is_empty(&self) -> bool {
        self.df.height() == 0
    }

    /// Typed rows in table order.
    pub fn records(&self) -> PolarsResult<Vec<Listing>> {
        let len = self.df.height();

        let groups = self.df.column(NEIGHBOURHOOD_GROUP)?.cast(&DataType::String)?;
        let groups = groups.str()?;
        let room_types = self.df.column(ROOM_TYPE)?.cast(&DataType::String)?;
        let room_types = room_types.str()?;
        let prices = self.df.column(PRICE)?.cast(&DataType::Float64)?;
        let prices = prices.f64()?;
        let reviews = self.df.column(NUMBER_OF_REVIEWS)?.cast(&DataType::Int64)?;
        let reviews = reviews.i64()?;
        let availability = self.df.column(AVAILABILITY_365)?.cast(&DataType::Int64)?;
        let availability = availability.i64()?;
        let dates = self.df.column(LAST_REVIEW)?.cast(&DataType::Int32)?;
        let dates = dates.i32()?;

        let mut out = Vec::with_capacity(len);
        for idx in 0..len {
            let (
                Some(group),
                Some(room_type),
                Some(price),
                Some(number_of_reviews),
                Some(availability_365),
                Some(last_review),
            ) = (
                groups.get(idx),
                room_types.get(idx),
                prices.get(idx),
                reviews.get(idx),
                availability.get(idx),
                dates.get(idx).and_then(date_from_epoch_days),
            )
            else {
                continue;
            };

            out.push(Listing {
                neighbourhood_group: group.to_string(),
                room_type: room_type.to_string(),
                price,
                number_of_reviews,
                availability_365,
                last_review,
            });
        }

        Ok(out)
    }
}

pub(crate) fn date_from_epoch_days(days: i32) -> Option<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(days.checked_add(UNIX_EPOCH_DAYS_FROM_CE)?)
}

pub(crate) fn epoch_days(date: NaiveDate) -> i32 {
    date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE
}
