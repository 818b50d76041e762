//! Response DTOs for reservation API endpoints.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use super::calculators::DayAvailability;
use super::services::{BookingRequest, Quote};

/// Response of the availability check
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityResponse {
    pub property_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub number_of_guests: i32,
    pub nights: i64,
    #[serde(with = "rust_decimal::serde::str")]
    pub total_price: Decimal,
    pub days: Vec<DayAvailability>,
}

impl AvailabilityResponse {
    pub fn new(request: BookingRequest, quote: Quote) -> Self {
        Self {
            property_id: request.property_id,
            start_date: request.start_date,
            end_date: request.end_date,
            number_of_guests: request.number_of_guests,
            nights: quote.nights,
            total_price: quote.total_price,
            days: quote.days,
        }
    }
}
