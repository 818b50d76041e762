//! Reservation service: validation, availability, pricing and persistence.
//!
//! Every write runs `validate -> check availability -> price -> write` inside
//! a booking session, so two concurrent requests for the same property
//! cannot both pass the capacity check.

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{info, warn};
use uuid::Uuid;

use crate::cache::AppCache;
use crate::error::{AppError, Result};

use super::calculators::{
    calculate_total_price, check_availability, number_of_nights, validate_dates,
    validate_guests, validate_range, DayAvailability,
};
use super::models::{
    NewReservation, OverlapQuery, PropertySnapshot, Reservation, ReservationChanges,
    ReservationDetails, ReservationFilter,
};
use super::stats::{StatsDispatch, StatsQueue};
use super::store::ReservationStore;

/// A booking request with parsed dates
#[derive(Debug, Clone, Copy)]
pub struct BookingRequest {
    pub property_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub number_of_guests: i32,
}

/// Partial update of a reservation; `None` keeps the stored value
#[derive(Debug, Clone, Copy, Default)]
pub struct BookingChanges {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub number_of_guests: Option<i32>,
}

/// Result of a successful create or update
#[derive(Debug, Clone)]
pub struct BookingOutcome {
    pub reservation: Reservation,
    pub availability: Vec<DayAvailability>,
    pub stats: StatsDispatch,
}

/// Result of a cancellation
#[derive(Debug, Clone)]
pub struct Cancellation {
    pub reservation: Reservation,
    pub stats: StatsDispatch,
}

/// Availability and price for a prospective stay
#[derive(Debug, Clone)]
pub struct Quote {
    pub nights: i64,
    pub total_price: Decimal,
    pub days: Vec<DayAvailability>,
}

#[derive(Clone)]
pub struct ReservationService {
    store: Arc<dyn ReservationStore>,
    cache: AppCache,
    stats: StatsQueue,
}

impl ReservationService {
    pub fn new(store: Arc<dyn ReservationStore>, cache: AppCache, stats: StatsQueue) -> Self {
        Self {
            store,
            cache,
            stats,
        }
    }

    pub fn store(&self) -> Arc<dyn ReservationStore> {
        self.store.clone()
    }

    /// Look up a property snapshot, cache first
    pub async fn property(&self, property_id: Uuid) -> Result<Arc<PropertySnapshot>> {
        if let Some(cached) = self.cache.properties.get(&property_id).await {
            tracing::debug!("Cache HIT for property: {}", property_id);
            return Ok(cached);
        }

        tracing::debug!("Cache MISS for property: {}", property_id);
        let property = self
            .store
            .property(property_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Property id {} not found", property_id)))?;

        let property = Arc::new(property);
        self.cache
            .properties
            .insert(property_id, property.clone())
            .await;
        Ok(property)
    }

    pub async fn find(&self, reservation_id: Uuid) -> Result<ReservationDetails> {
        self.store
            .find(reservation_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Reservation not found".to_string()))
    }

    pub async fn list(&self, filter: ReservationFilter) -> Result<Vec<ReservationDetails>> {
        self.store.list(filter).await
    }

    /// Availability breakdown and price without booking anything
    pub async fn quote(&self, request: BookingRequest, today: NaiveDate) -> Result<Quote> {
        validate_dates(request.start_date, request.end_date, today)?;
        let property = self.property(request.property_id).await?;
        validate_guests(request.number_of_guests, property.guests)?;

        let existing = self
            .store
            .find_overlapping(&OverlapQuery {
                property_id: request.property_id,
                start_date: request.start_date,
                end_date: request.end_date,
                exclude_id: None,
            })
            .await?;

        let days = check_availability(
            property.guests,
            request.start_date,
            request.end_date,
            request.number_of_guests,
            &existing,
        )?;

        Ok(Quote {
            nights: number_of_nights(request.start_date, request.end_date),
            total_price: calculate_total_price(
                request.start_date,
                request.end_date,
                property.price,
                request.number_of_guests,
            )?,
            days,
        })
    }

    pub async fn create(
        &self,
        user_id: Uuid,
        request: BookingRequest,
        today: NaiveDate,
    ) -> Result<BookingOutcome> {
        validate_dates(request.start_date, request.end_date, today)?;
        if request.number_of_guests < 1 {
            return Err(AppError::Validation(
                "numberOfGuests must be at least 1".to_string(),
            ));
        }

        let property = self.property(request.property_id).await?;
        validate_guests(request.number_of_guests, property.guests)?;

        let mut session = self.store.begin_booking(property.id).await?;

        let existing = session
            .find_overlapping(&OverlapQuery {
                property_id: property.id,
                start_date: request.start_date,
                end_date: request.end_date,
                exclude_id: None,
            })
            .await?;

        let availability = check_availability(
            property.guests,
            request.start_date,
            request.end_date,
            request.number_of_guests,
            &existing,
        )
        .inspect_err(|e| {
            warn!(property_id = %property.id, %user_id, error = %e, "Booking rejected")
        })?;

        let total_price = calculate_total_price(
            request.start_date,
            request.end_date,
            property.price,
            request.number_of_guests,
        )?;

        let reservation = session
            .insert(NewReservation {
                property_id: property.id,
                user_id,
                start_date: request.start_date,
                end_date: request.end_date,
                number_of_guests: request.number_of_guests,
                total_price,
            })
            .await?;
        session.commit().await?;

        info!(
            reservation_id = %reservation.id,
            property_id = %property.id,
            %user_id,
            total_price = %total_price,
            "Reservation created"
        );

        Ok(BookingOutcome {
            reservation,
            availability,
            stats: self.stats.enqueue(property.id),
        })
    }

    pub async fn update(
        &self,
        reservation_id: Uuid,
        changes: BookingChanges,
        today: NaiveDate,
    ) -> Result<BookingOutcome> {
        let property_id = self.find(reservation_id).await?.reservation.property_id;
        let property = self.property(property_id).await?;

        let mut session = self.store.begin_booking(property.id).await?;

        // Re-read under the lock so concurrent edits merge onto the latest row
        let current = session
            .find(reservation_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Reservation not found".to_string()))?;

        let start_date = changes.start_date.unwrap_or(current.start_date);
        let end_date = changes.end_date.unwrap_or(current.end_date);
        let number_of_guests = changes.number_of_guests.unwrap_or(current.number_of_guests);

        validate_range(start_date, end_date)?;
        if changes.start_date.is_some() && start_date < today {
            return Err(AppError::Validation(format!(
                "startDate {} is in the past (today is {})",
                start_date, today
            )));
        }
        if end_date < today {
            return Err(AppError::Validation(format!(
                "endDate {} has already passed; finished stays cannot be changed",
                end_date
            )));
        }
        validate_guests(number_of_guests, property.guests)?;

        let existing = session
            .find_overlapping(&OverlapQuery {
                property_id: property.id,
                start_date,
                end_date,
                exclude_id: Some(reservation_id),
            })
            .await?;

        let availability = check_availability(
            property.guests,
            start_date,
            end_date,
            number_of_guests,
            &existing,
        )
        .inspect_err(|e| {
            warn!(%reservation_id, property_id = %property.id, error = %e, "Update rejected")
        })?;

        let total_price =
            calculate_total_price(start_date, end_date, property.price, number_of_guests)?;

        let reservation = session
            .update(
                reservation_id,
                ReservationChanges {
                    start_date,
                    end_date,
                    number_of_guests,
                    total_price,
                },
            )
            .await?;
        session.commit().await?;

        info!(
            %reservation_id,
            property_id = %property.id,
            total_price = %total_price,
            "Reservation updated"
        );

        Ok(BookingOutcome {
            reservation,
            availability,
            stats: self.stats.enqueue(property.id),
        })
    }

    pub async fn delete(&self, reservation_id: Uuid) -> Result<Cancellation> {
        let reservation = self
            .store
            .delete(reservation_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Reservation not found".to_string()))?;

        info!(
            %reservation_id,
            property_id = %reservation.property_id,
            "Reservation deleted"
        );

        let stats = self.stats.enqueue(reservation.property_id);
        Ok(Cancellation { reservation, stats })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reservations::memory::InMemoryReservationStore;
    use rust_decimal_macros::dec;
    use std::time::Duration;
    use tokio::sync::mpsc;

    use super::super::stats::RecomputeStats;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn today() -> NaiveDate {
        date("2024-03-01")
    }

    struct Fixture {
        service: ReservationService,
        store: InMemoryReservationStore,
        rx: mpsc::Receiver<RecomputeStats>,
        property_id: Uuid,
    }

    fn fixture(capacity: i32) -> Fixture {
        let store = InMemoryReservationStore::new();
        let property_id = Uuid::new_v4();
        store.add_property(PropertySnapshot {
            id: property_id,
            name: "Mountain Cabin".to_string(),
            guests: capacity,
            price: dec!(100),
            cover_url: "https://example.com/cabin.jpg".to_string(),
            creator_id: Uuid::new_v4(),
        });

        let (queue, rx) = StatsQueue::new(16);
        let service = ReservationService::new(Arc::new(store.clone()), AppCache::new(), queue);
        Fixture {
            service,
            store,
            rx,
            property_id,
        }
    }

    fn request(property_id: Uuid, start: &str, end: &str, guests: i32) -> BookingRequest {
        BookingRequest {
            property_id,
            start_date: date(start),
            end_date: date(end),
            number_of_guests: guests,
        }
    }

    #[tokio::test]
    async fn test_create_prices_inclusive_nights() {
        let mut f = fixture(4);
        let outcome = f
            .service
            .create(Uuid::new_v4(), request(f.property_id, "2024-03-15", "2024-03-17", 2), today())
            .await
            .unwrap();

        assert_eq!(outcome.reservation.total_price, dec!(600));
        assert_eq!(outcome.availability.len(), 3);
        assert_eq!(outcome.stats, StatsDispatch::Queued);
        assert_eq!(
            f.rx.recv().await,
            Some(RecomputeStats {
                property_id: f.property_id
            })
        );
    }

    #[tokio::test]
    async fn test_create_rejects_overbooking() {
        let f = fixture(4);
        f.service
            .create(Uuid::new_v4(), request(f.property_id, "2024-03-15", "2024-03-20", 3), today())
            .await
            .unwrap();

        let err = f
            .service
            .create(Uuid::new_v4(), request(f.property_id, "2024-03-17", "2024-03-19", 2), today())
            .await
            .unwrap_err();

        match err {
            AppError::CapacityExceeded(days) => {
                let dates: Vec<NaiveDate> = days.iter().map(|d| d.date).collect();
                assert_eq!(
                    dates,
                    vec![date("2024-03-17"), date("2024-03-18"), date("2024-03-19")]
                );
            }
            other => panic!("expected CapacityExceeded, got {:?}", other),
        }
        assert_eq!(f.store.reservation_count(), 1);
    }

    #[tokio::test]
    async fn test_create_after_existing_range_succeeds() {
        let f = fixture(4);
        f.service
            .create(Uuid::new_v4(), request(f.property_id, "2024-03-15", "2024-03-20", 4), today())
            .await
            .unwrap();

        let outcome = f
            .service
            .create(Uuid::new_v4(), request(f.property_id, "2024-03-21", "2024-03-25", 4), today())
            .await
            .unwrap();
        assert_eq!(outcome.reservation.number_of_guests, 4);
    }

    #[tokio::test]
    async fn test_create_rejects_guests_over_capacity() {
        let f = fixture(2);
        let err = f
            .service
            .create(Uuid::new_v4(), request(f.property_id, "2024-03-15", "2024-03-16", 3), today())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_create_rejects_past_start_before_property_lookup() {
        let f = fixture(2);
        let err = f
            .service
            .create(Uuid::new_v4(), request(Uuid::new_v4(), "2024-02-01", "2024-02-03", 1), today())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_create_unknown_property_is_not_found() {
        let f = fixture(2);
        let err = f
            .service
            .create(Uuid::new_v4(), request(Uuid::new_v4(), "2024-03-15", "2024-03-16", 1), today())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_update_does_not_count_itself() {
        let f = fixture(4);
        let created = f
            .service
            .create(Uuid::new_v4(), request(f.property_id, "2024-03-15", "2024-03-18", 3), today())
            .await
            .unwrap();

        // 3 -> 4 guests only fits if the old record is excluded
        let outcome = f
            .service
            .update(
                created.reservation.id,
                BookingChanges {
                    number_of_guests: Some(4),
                    ..Default::default()
                },
                today(),
            )
            .await
            .unwrap();

        assert_eq!(outcome.reservation.number_of_guests, 4);
        assert_eq!(outcome.reservation.total_price, dec!(1600));
        assert!(outcome.availability.iter().all(|d| d.available_slots == 0));
        assert_eq!(f.store.reservation_count(), 1);
    }

    #[tokio::test]
    async fn test_update_rechecks_against_others() {
        let f = fixture(4);
        f.service
            .create(Uuid::new_v4(), request(f.property_id, "2024-03-20", "2024-03-22", 3), today())
            .await
            .unwrap();
        let mine = f
            .service
            .create(Uuid::new_v4(), request(f.property_id, "2024-03-15", "2024-03-18", 2), today())
            .await
            .unwrap();

        let err = f
            .service
            .update(
                mine.reservation.id,
                BookingChanges {
                    end_date: Some(date("2024-03-20")),
                    ..Default::default()
                },
                today(),
            )
            .await
            .unwrap_err();

        match err {
            AppError::CapacityExceeded(days) => {
                assert_eq!(days.len(), 1);
                assert_eq!(days[0].date, date("2024-03-20"));
                assert_eq!(days[0].overage, 1);
            }
            other => panic!("expected CapacityExceeded, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_update_rejects_finished_stay() {
        let f = fixture(4);
        let created = f
            .service
            .create(Uuid::new_v4(), request(f.property_id, "2024-03-02", "2024-03-04", 1), today())
            .await
            .unwrap();

        let err = f
            .service
            .update(
                created.reservation.id,
                BookingChanges {
                    number_of_guests: Some(2),
                    ..Default::default()
                },
                date("2024-03-10"),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_update_keeps_started_stay_editable() {
        let f = fixture(4);
        let created = f
            .service
            .create(Uuid::new_v4(), request(f.property_id, "2024-03-02", "2024-03-06", 1), today())
            .await
            .unwrap();

        // Start date already passed but is not being changed
        let outcome = f
            .service
            .update(
                created.reservation.id,
                BookingChanges {
                    number_of_guests: Some(2),
                    ..Default::default()
                },
                date("2024-03-04"),
            )
            .await
            .unwrap();
        assert_eq!(outcome.reservation.total_price, dec!(1000));
    }

    #[tokio::test]
    async fn test_update_unknown_reservation() {
        let f = fixture(4);
        let err = f
            .service
            .update(Uuid::new_v4(), BookingChanges::default(), today())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_frees_capacity() {
        let f = fixture(4);
        let first = f
            .service
            .create(Uuid::new_v4(), request(f.property_id, "2024-03-15", "2024-03-16", 4), today())
            .await
            .unwrap();

        let blocked = f
            .service
            .create(Uuid::new_v4(), request(f.property_id, "2024-03-16", "2024-03-17", 1), today())
            .await;
        assert!(blocked.is_err());

        let cancelled = f.service.delete(first.reservation.id).await.unwrap();
        assert_eq!(cancelled.reservation.id, first.reservation.id);

        f.service
            .create(Uuid::new_v4(), request(f.property_id, "2024-03-16", "2024-03-17", 1), today())
            .await
            .unwrap();

        let missing = f.service.delete(first.reservation.id).await.unwrap_err();
        assert!(matches!(missing, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_quote_does_not_book() {
        let f = fixture(4);
        let quote = f
            .service
            .quote(request(f.property_id, "2024-03-15", "2024-03-17", 2), today())
            .await
            .unwrap();

        assert_eq!(quote.nights, 3);
        assert_eq!(quote.total_price, dec!(600));
        assert_eq!(quote.days.len(), 3);
        assert_eq!(f.store.reservation_count(), 0);
    }

    #[tokio::test]
    async fn test_create_rejects_unbounded_stay() {
        let f = fixture(4);
        let err = f
            .service
            .create(Uuid::new_v4(), request(f.property_id, "2024-03-15", "9999-12-31", 1), today())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(f.store.reservation_count(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_competing_booking_waits_for_open_session() {
        let f = fixture(4);
        let pid = f.property_id;

        let mut held = f.store.begin_booking(pid).await.unwrap();
        held.insert(NewReservation {
            property_id: pid,
            user_id: Uuid::new_v4(),
            start_date: date("2024-03-15"),
            end_date: date("2024-03-17"),
            number_of_guests: 3,
            total_price: dec!(900),
        })
        .await
        .unwrap();

        let service = f.service.clone();
        let competitor = tokio::spawn(async move {
            service
                .create(Uuid::new_v4(), request(pid, "2024-03-16", "2024-03-18", 3), today())
                .await
        });

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!competitor.is_finished());

        held.commit().await.unwrap();

        let err = competitor.await.unwrap().unwrap_err();
        assert!(matches!(err, AppError::CapacityExceeded(_)));
        assert_eq!(f.store.reservation_count(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_update_merges_onto_latest_committed_row() {
        let f = fixture(4);
        let pid = f.property_id;
        let created = f
            .service
            .create(Uuid::new_v4(), request(pid, "2024-03-15", "2024-03-17", 2), today())
            .await
            .unwrap();
        let id = created.reservation.id;

        // Another writer moves the dates while holding the property lock
        let mut held = f.store.begin_booking(pid).await.unwrap();
        held.update(
            id,
            ReservationChanges {
                start_date: date("2024-03-20"),
                end_date: date("2024-03-22"),
                number_of_guests: 2,
                total_price: dec!(600),
            },
        )
        .await
        .unwrap();

        let service = f.service.clone();
        let guests_change = tokio::spawn(async move {
            service
                .update(
                    id,
                    BookingChanges {
                        number_of_guests: Some(3),
                        ..Default::default()
                    },
                    today(),
                )
                .await
        });

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!guests_change.is_finished());

        held.commit().await.unwrap();

        let updated = guests_change.await.unwrap().unwrap().reservation;
        assert_eq!(updated.start_date, date("2024-03-20"));
        assert_eq!(updated.end_date, date("2024-03-22"));
        assert_eq!(updated.number_of_guests, 3);
        assert_eq!(updated.total_price, dec!(900));
    }
}
