//! Storage seam for the reservation engine.
//!
//! `ReservationStore` is implemented over Postgres for the running service and
//! in memory for tests. Availability checks and the write they guard always
//! happen inside one `BookingSession`, which holds a per-property lock until
//! it is committed or dropped.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::error::{AppError, Result};

use super::calculators::{BookedRange, CompletedStay, PropertyStats};
use super::models::{
    NewReservation, OverlapQuery, PropertySnapshot, Reservation, ReservationChanges,
    ReservationDetails, ReservationFilter,
};
use super::queries;

#[async_trait]
pub trait ReservationStore: Send + Sync {
    /// Capacity/price view of a property, `None` if it does not exist
    async fn property(&self, property_id: Uuid) -> Result<Option<PropertySnapshot>>;

    async fn find(&self, reservation_id: Uuid) -> Result<Option<ReservationDetails>>;

    async fn list(&self, filter: ReservationFilter) -> Result<Vec<ReservationDetails>>;

    /// Read-only overlap lookup, used for quotes that do not book anything
    async fn find_overlapping(&self, query: &OverlapQuery) -> Result<Vec<BookedRange>>;

    /// Open a session that serializes bookings on `property_id`
    async fn begin_booking(&self, property_id: Uuid) -> Result<Box<dyn BookingSession>>;

    async fn delete(&self, reservation_id: Uuid) -> Result<Option<Reservation>>;

    async fn completed_stays(&self, property_id: Uuid, today: NaiveDate)
        -> Result<Vec<CompletedStay>>;

    async fn write_stats(&self, property_id: Uuid, stats: &PropertyStats) -> Result<()>;
}

/// Check-and-write scope for one property.
///
/// Dropping a session without calling `commit` discards its writes.
#[async_trait]
pub trait BookingSession: Send {
    /// Current state of a reservation, read under the session's lock
    async fn find(&mut self, reservation_id: Uuid) -> Result<Option<Reservation>>;

    async fn find_overlapping(&mut self, query: &OverlapQuery) -> Result<Vec<BookedRange>>;

    async fn insert(&mut self, new: NewReservation) -> Result<Reservation>;

    async fn update(
        &mut self,
        reservation_id: Uuid,
        changes: ReservationChanges,
    ) -> Result<Reservation>;

    async fn commit(self: Box<Self>) -> Result<()>;
}

/// Postgres-backed store
#[derive(Clone)]
pub struct PgReservationStore {
    pool: PgPool,
}

impl PgReservationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReservationStore for PgReservationStore {
    async fn property(&self, property_id: Uuid) -> Result<Option<PropertySnapshot>> {
        queries::get_property_snapshot(&self.pool, property_id).await
    }

    async fn find(&self, reservation_id: Uuid) -> Result<Option<ReservationDetails>> {
        let row = queries::get_reservation_details(&self.pool, reservation_id).await?;
        Ok(row.map(ReservationDetails::from))
    }

    async fn list(&self, filter: ReservationFilter) -> Result<Vec<ReservationDetails>> {
        let rows = queries::list_reservation_details(&self.pool, filter).await?;
        Ok(rows.into_iter().map(ReservationDetails::from).collect())
    }

    async fn find_overlapping(&self, query: &OverlapQuery) -> Result<Vec<BookedRange>> {
        queries::find_overlapping(&self.pool, query).await
    }

    async fn begin_booking(&self, property_id: Uuid) -> Result<Box<dyn BookingSession>> {
        let mut tx = self.pool.begin().await?;
        queries::lock_property(&mut *tx, property_id).await?;
        Ok(Box::new(PgBookingSession { tx }))
    }

    async fn delete(&self, reservation_id: Uuid) -> Result<Option<Reservation>> {
        queries::delete_reservation(&self.pool, reservation_id).await
    }

    async fn completed_stays(
        &self,
        property_id: Uuid,
        today: NaiveDate,
    ) -> Result<Vec<CompletedStay>> {
        queries::find_completed_stays(&self.pool, property_id, today).await
    }

    async fn write_stats(&self, property_id: Uuid, stats: &PropertyStats) -> Result<()> {
        let updated = queries::write_property_stats(&self.pool, property_id, stats).await?;
        if updated == 0 {
            return Err(AppError::NotFound(format!(
                "Property id {} not found",
                property_id
            )));
        }
        Ok(())
    }
}

/// Transaction holding `pg_advisory_xact_lock` for one property
pub struct PgBookingSession {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl BookingSession for PgBookingSession {
    async fn find(&mut self, reservation_id: Uuid) -> Result<Option<Reservation>> {
        queries::lock_reservation(&mut *self.tx, reservation_id).await
    }

    async fn find_overlapping(&mut self, query: &OverlapQuery) -> Result<Vec<BookedRange>> {
        queries::find_overlapping(&mut *self.tx, query).await
    }

    async fn insert(&mut self, new: NewReservation) -> Result<Reservation> {
        queries::insert_reservation(&mut *self.tx, &new).await
    }

    async fn update(
        &mut self,
        reservation_id: Uuid,
        changes: ReservationChanges,
    ) -> Result<Reservation> {
        queries::update_reservation(&mut *self.tx, reservation_id, &changes)
            .await?
            .ok_or_else(|| AppError::NotFound("Reservation not found".to_string()))
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        self.tx.commit().await?;
        Ok(())
    }
}
