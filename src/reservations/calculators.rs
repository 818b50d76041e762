//! Core availability and pricing functions.
//!
//! Pure functions for the reservation engine - no database access.
//! Date ranges are calendar dates, inclusive on both ends.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

use crate::error::{AppError, Result};

/// Longest stay a single reservation may cover, in nights
pub const MAX_STAY_NIGHTS: i64 = 365;

/// Largest amount `reservations.total_price NUMERIC(14, 2)` can hold
pub const MAX_TOTAL_PRICE: Decimal = dec!(999999999999.99);

/// Round to specified decimal places using banker's rounding (ROUND_HALF_EVEN).
///
/// # Examples
/// ```
/// use rust_decimal_macros::dec;
/// use naturenest_api::reservations::round_money;
///
/// assert_eq!(round_money(dec!(2.5), 0), dec!(2));   // rounds to even
/// assert_eq!(round_money(dec!(3.5), 0), dec!(4));   // rounds to even
/// assert_eq!(round_money(dec!(1.234), 2), dec!(1.23));
/// ```
pub fn round_money(amount: Decimal, places: u32) -> Decimal {
    amount.round_dp_with_strategy(places, RoundingStrategy::MidpointNearestEven)
}

/// Date range already booked on a property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookedRange {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub number_of_guests: i32,
}

/// Occupancy of a single calendar day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayAvailability {
    pub date: NaiveDate,
    pub total_guests: i32,
    pub available_slots: i32,
}

/// A day on which a booking would exceed property capacity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayOverage {
    pub date: NaiveDate,
    pub total_guests: i32,
    pub overage: i32,
}

/// Reject ranges that start in the past or end before they start.
pub fn validate_dates(start: NaiveDate, end: NaiveDate, today: NaiveDate) -> Result<()> {
    if start < today {
        return Err(AppError::Validation(format!(
            "startDate {} is in the past (today is {})",
            start, today
        )));
    }
    validate_range(start, end)
}

/// Reject ranges whose end date is before their start date or that run
/// longer than `MAX_STAY_NIGHTS`.
pub fn validate_range(start: NaiveDate, end: NaiveDate) -> Result<()> {
    if end < start {
        return Err(AppError::Validation(format!(
            "endDate {} is before startDate {}",
            end, start
        )));
    }
    let nights = number_of_nights(start, end);
    if nights > MAX_STAY_NIGHTS {
        return Err(AppError::Validation(format!(
            "Stay of {} nights exceeds the maximum of {}",
            nights, MAX_STAY_NIGHTS
        )));
    }
    Ok(())
}

/// Check a requested guest count against the property's capacity.
pub fn validate_guests(requested: i32, capacity: i32) -> Result<()> {
    if requested < 1 {
        return Err(AppError::Validation(
            "numberOfGuests must be at least 1".to_string(),
        ));
    }
    if requested > capacity {
        return Err(AppError::Validation(format!(
            "Number of guests ({}) exceeds property capacity ({})",
            requested, capacity
        )));
    }
    Ok(())
}

/// Number of nights billed for a stay: both boundary days count.
pub fn number_of_nights(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days() + 1
}

/// `nights * price_per_night * guests`, rounded to cents.
///
/// Totals above `MAX_TOTAL_PRICE` cannot be stored and are rejected.
pub fn calculate_total_price(
    start: NaiveDate,
    end: NaiveDate,
    price_per_night: Decimal,
    number_of_guests: i32,
) -> Result<Decimal> {
    let nights = Decimal::from(number_of_nights(start, end));
    let total = nights
        .checked_mul(price_per_night)
        .and_then(|t| t.checked_mul(Decimal::from(number_of_guests)))
        .map(|t| round_money(t, 2))
        .filter(|t| *t <= MAX_TOTAL_PRICE)
        .ok_or_else(|| {
            AppError::Validation(format!(
                "Total price exceeds the maximum of {}",
                MAX_TOTAL_PRICE
            ))
        })?;
    Ok(total)
}

/// Inclusive overlap test: ranges sharing a boundary day overlap.
pub fn ranges_overlap(
    a_start: NaiveDate,
    a_end: NaiveDate,
    b_start: NaiveDate,
    b_end: NaiveDate,
) -> bool {
    a_start <= b_end && a_end >= b_start
}

/// Guest totals for every day in `[start, end]`.
///
/// Each day starts at `requested` and accumulates the guests of every
/// existing booking that covers it.
pub fn daily_occupancy(
    start: NaiveDate,
    end: NaiveDate,
    requested: i32,
    existing: &[BookedRange],
) -> BTreeMap<NaiveDate, i32> {
    start
        .iter_days()
        .take_while(|day| *day <= end)
        .map(|day| {
            let booked: i32 = existing
                .iter()
                .filter(|r| r.start_date <= day && day <= r.end_date)
                .map(|r| r.number_of_guests)
                .sum();
            (day, requested + booked)
        })
        .collect()
}

/// Verify that adding `requested` guests over `[start, end]` keeps every day
/// within `capacity`.
///
/// Returns the per-day breakdown on success, or `CapacityExceeded` listing
/// each offending day and by how much it is over.
pub fn check_availability(
    capacity: i32,
    start: NaiveDate,
    end: NaiveDate,
    requested: i32,
    existing: &[BookedRange],
) -> Result<Vec<DayAvailability>> {
    let occupancy = daily_occupancy(start, end, requested, existing);

    let days: Vec<DayAvailability> = occupancy
        .into_iter()
        .map(|(date, total_guests)| DayAvailability {
            date,
            total_guests,
            available_slots: capacity - total_guests,
        })
        .collect();

    let overages: Vec<DayOverage> = days
        .iter()
        .filter(|d| d.available_slots < 0)
        .map(|d| DayOverage {
            date: d.date,
            total_guests: d.total_guests,
            overage: -d.available_slots,
        })
        .collect();

    if overages.is_empty() {
        Ok(days)
    } else {
        Err(AppError::CapacityExceeded(overages))
    }
}

/// A reservation that has ended, as seen by the stats aggregation
#[derive(Debug, Clone, Copy)]
pub struct CompletedStay {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_price: Decimal,
}

/// Aggregate booking figures of a property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyStats {
    pub total_nights_booked: i64,
    #[serde(with = "rust_decimal::serde::str")]
    pub total_income: Decimal,
}

/// Sum nights and income over the stays that ended on or before `today`.
pub fn summarize_completed(stays: &[CompletedStay], today: NaiveDate) -> PropertyStats {
    stays
        .iter()
        .filter(|s| s.end_date <= today)
        .fold(
            PropertyStats {
                total_nights_booked: 0,
                total_income: Decimal::ZERO,
            },
            |acc, s| PropertyStats {
                total_nights_booked: acc.total_nights_booked
                    + number_of_nights(s.start_date, s.end_date),
                total_income: acc.total_income + s.total_price,
            },
        )
}
