//! Request DTOs for reservation API endpoints.

use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, Result};

use super::services::{BookingChanges, BookingRequest};

/// Parse a calendar date in strict `YYYY-MM-DD` form
pub fn parse_date(field: &str, value: &str) -> Result<NaiveDate> {
    let bytes = value.as_bytes();
    let shaped = bytes.len() == 10 && bytes[4] == b'-' && bytes[7] == b'-';

    shaped
        .then(|| NaiveDate::parse_from_str(value, "%Y-%m-%d").ok())
        .flatten()
        .ok_or_else(|| {
            AppError::Validation(format!(
                "{} must be a valid date in YYYY-MM-DD format, got '{}'",
                field, value
            ))
        })
}

/// Request to book a stay
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateReservationRequest {
    pub property_id: Uuid,
    pub start_date: String,
    pub end_date: String,
    #[validate(range(min = 1, message = "numberOfGuests must be at least 1"))]
    pub number_of_guests: i32,
}

impl CreateReservationRequest {
    pub fn into_booking(self) -> Result<BookingRequest> {
        Ok(BookingRequest {
            property_id: self.property_id,
            start_date: parse_date("startDate", &self.start_date)?,
            end_date: parse_date("endDate", &self.end_date)?,
            number_of_guests: self.number_of_guests,
        })
    }
}

/// Partial update of a reservation
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReservationRequest {
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    #[validate(range(min = 1, message = "numberOfGuests must be at least 1"))]
    pub number_of_guests: Option<i32>,
}

impl UpdateReservationRequest {
    pub fn into_changes(self) -> Result<BookingChanges> {
        Ok(BookingChanges {
            start_date: self
                .start_date
                .as_deref()
                .map(|v| parse_date("startDate", v))
                .transpose()?,
            end_date: self
                .end_date
                .as_deref()
                .map(|v| parse_date("endDate", v))
                .transpose()?,
            number_of_guests: self.number_of_guests,
        })
    }
}

/// Request body of the availability check; the property comes from the path
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityRequest {
    pub start_date: String,
    pub end_date: String,
    #[validate(range(min = 1, message = "numberOfGuests must be at least 1"))]
    pub number_of_guests: i32,
}

impl AvailabilityRequest {
    pub fn into_booking(self, property_id: Uuid) -> Result<BookingRequest> {
        Ok(BookingRequest {
            property_id,
            start_date: parse_date("startDate", &self.start_date)?,
            end_date: parse_date("endDate", &self.end_date)?,
            number_of_guests: self.number_of_guests,
        })
    }
}

/// Query string of `GET /reservations`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListReservationsQuery {
    #[serde(default)]
    pub property_id: Option<Uuid>,
}
