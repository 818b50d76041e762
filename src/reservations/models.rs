//! Database models for reservations.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use super::calculators::{BookedRange, CompletedStay};

/// Reservation row from `reservations`
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    pub id: Uuid,
    pub property_id: Uuid,
    pub user_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub number_of_guests: i32,
    #[serde(with = "rust_decimal::serde::str")]
    pub total_price: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Reservation {
    pub fn booked_range(&self) -> BookedRange {
        BookedRange {
            start_date: self.start_date,
            end_date: self.end_date,
            number_of_guests: self.number_of_guests,
        }
    }

    pub fn completed_stay(&self) -> CompletedStay {
        CompletedStay {
            start_date: self.start_date,
            end_date: self.end_date,
            total_price: self.total_price,
        }
    }
}

/// What the reservation engine needs to know about a property
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct PropertySnapshot {
    pub id: Uuid,
    pub name: String,
    pub guests: i32,
    pub price: Decimal,
    pub cover_url: String,
    pub creator_id: Uuid,
}

/// Minimal user view embedded in reservation responses
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestSummary {
    pub id: Uuid,
    pub username: String,
    pub email: String,
}

/// Property view embedded in reservation responses
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservedProperty {
    pub id: Uuid,
    pub name: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub price: Decimal,
    pub cover_url: String,
    pub creator_id: Uuid,
}

/// Reservation joined with its property and guest
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationDetails {
    #[serde(flatten)]
    pub reservation: Reservation,
    pub property: ReservedProperty,
    pub user: GuestSummary,
}

/// Flat join row used to build `ReservationDetails`
#[derive(Debug, Clone, FromRow)]
pub struct ReservationDetailsRow {
    pub id: Uuid,
    pub property_id: Uuid,
    pub user_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub number_of_guests: i32,
    pub total_price: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub property_name: String,
    pub property_price: Decimal,
    pub property_cover_url: String,
    pub property_creator_id: Uuid,
    pub user_username: String,
    pub user_email: String,
}

impl From<ReservationDetailsRow> for ReservationDetails {
    fn from(row: ReservationDetailsRow) -> Self {
        Self {
            property: ReservedProperty {
                id: row.property_id,
                name: row.property_name,
                price: row.property_price,
                cover_url: row.property_cover_url,
                creator_id: row.property_creator_id,
            },
            user: GuestSummary {
                id: row.user_id,
                username: row.user_username,
                email: row.user_email,
            },
            reservation: Reservation {
                id: row.id,
                property_id: row.property_id,
                user_id: row.user_id,
                start_date: row.start_date,
                end_date: row.end_date,
                number_of_guests: row.number_of_guests,
                total_price: row.total_price,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
        }
    }
}

/// Values for a reservation about to be inserted
#[derive(Debug, Clone)]
pub struct NewReservation {
    pub property_id: Uuid,
    pub user_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub number_of_guests: i32,
    pub total_price: Decimal,
}

/// Fully resolved values written by an update
#[derive(Debug, Clone)]
pub struct ReservationChanges {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub number_of_guests: i32,
    pub total_price: Decimal,
}

/// Reservations of one property that intersect `[start_date, end_date]`
#[derive(Debug, Clone, Copy)]
pub struct OverlapQuery {
    pub property_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Reservation being updated; never counted against itself
    pub exclude_id: Option<Uuid>,
}

/// Which reservations a listing should return
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReservationFilter {
    Property(Uuid),
    Guest(Uuid),
}
