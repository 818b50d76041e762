//! In-memory `ReservationStore` for tests and local experiments.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use tokio::sync::OwnedMutexGuard;
use uuid::Uuid;

use crate::error::{AppError, Result};

use super::calculators::{ranges_overlap, BookedRange, CompletedStay, PropertyStats};
use super::models::{
    GuestSummary, NewReservation, OverlapQuery, PropertySnapshot, Reservation,
    ReservationChanges, ReservationDetails, ReservationFilter, ReservedProperty,
};
use super::store::{BookingSession, ReservationStore};

#[derive(Debug, Default)]
struct MemoryState {
    properties: HashMap<Uuid, PropertySnapshot>,
    guests: HashMap<Uuid, GuestSummary>,
    reservations: Vec<Reservation>,
    stats: HashMap<Uuid, PropertyStats>,
}

impl MemoryState {
    fn details(&self, reservation: &Reservation) -> Option<ReservationDetails> {
        let property = self.properties.get(&reservation.property_id)?;
        let user = self
            .guests
            .get(&reservation.user_id)
            .cloned()
            .unwrap_or_else(|| GuestSummary {
                id: reservation.user_id,
                username: String::new(),
                email: String::new(),
            });

        Some(ReservationDetails {
            reservation: reservation.clone(),
            property: ReservedProperty {
                id: property.id,
                name: property.name.clone(),
                price: property.price,
                cover_url: property.cover_url.clone(),
                creator_id: property.creator_id,
            },
            user,
        })
    }

    fn overlapping(&self, query: &OverlapQuery) -> Vec<BookedRange> {
        let mut ranges: Vec<BookedRange> = self
            .reservations
            .iter()
            .filter(|r| r.property_id == query.property_id)
            .filter(|r| Some(r.id) != query.exclude_id)
            .filter(|r| ranges_overlap(r.start_date, r.end_date, query.start_date, query.end_date))
            .map(Reservation::booked_range)
            .collect();
        ranges.sort_by_key(|r| r.start_date);
        ranges
    }
}

/// Store keeping everything in process memory
#[derive(Clone, Default)]
pub struct InMemoryReservationStore {
    state: Arc<Mutex<MemoryState>>,
    locks: Arc<Mutex<HashMap<Uuid, Arc<tokio::sync::Mutex<()>>>>>,
}

impl InMemoryReservationStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn property_lock(&self, property_id: Uuid) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        locks.entry(property_id).or_default().clone()
    }

    /// Register a property the engine can book
    pub fn add_property(&self, property: PropertySnapshot) {
        self.state().properties.insert(property.id, property);
    }

    /// Register a guest so listings can show username/email
    pub fn add_guest(&self, guest: GuestSummary) {
        self.state().guests.insert(guest.id, guest);
    }

    /// Stats last written for a property
    pub fn stats(&self, property_id: Uuid) -> Option<PropertyStats> {
        self.state().stats.get(&property_id).copied()
    }

    pub fn reservation_count(&self) -> usize {
        self.state().reservations.len()
    }
}

#[async_trait]
impl ReservationStore for InMemoryReservationStore {
    async fn property(&self, property_id: Uuid) -> Result<Option<PropertySnapshot>> {
        Ok(self.state().properties.get(&property_id).cloned())
    }

    async fn find(&self, reservation_id: Uuid) -> Result<Option<ReservationDetails>> {
        let state = self.state();
        Ok(state
            .reservations
            .iter()
            .find(|r| r.id == reservation_id)
            .and_then(|r| state.details(r)))
    }

    async fn list(&self, filter: ReservationFilter) -> Result<Vec<ReservationDetails>> {
        let state = self.state();
        let mut details: Vec<ReservationDetails> = state
            .reservations
            .iter()
            .filter(|r| match filter {
                ReservationFilter::Property(id) => r.property_id == id,
                ReservationFilter::Guest(id) => r.user_id == id,
            })
            .filter_map(|r| state.details(r))
            .collect();
        details.sort_by_key(|d| d.reservation.start_date);
        Ok(details)
    }

    async fn find_overlapping(&self, query: &OverlapQuery) -> Result<Vec<BookedRange>> {
        Ok(self.state().overlapping(query))
    }

    async fn begin_booking(&self, property_id: Uuid) -> Result<Box<dyn BookingSession>> {
        let guard = self.property_lock(property_id).lock_owned().await;
        Ok(Box::new(MemoryBookingSession {
            state: self.state.clone(),
            _guard: guard,
            pending: Vec::new(),
        }))
    }

    async fn delete(&self, reservation_id: Uuid) -> Result<Option<Reservation>> {
        let mut state = self.state();
        let position = state.reservations.iter().position(|r| r.id == reservation_id);
        Ok(position.map(|i| state.reservations.remove(i)))
    }

    async fn completed_stays(
        &self,
        property_id: Uuid,
        today: NaiveDate,
    ) -> Result<Vec<CompletedStay>> {
        Ok(self
            .state()
            .reservations
            .iter()
            .filter(|r| r.property_id == property_id && r.end_date <= today)
            .map(Reservation::completed_stay)
            .collect())
    }

    async fn write_stats(&self, property_id: Uuid, stats: &PropertyStats) -> Result<()> {
        let mut state = self.state();
        if !state.properties.contains_key(&property_id) {
            return Err(AppError::NotFound(format!(
                "Property id {} not found",
                property_id
            )));
        }
        state.stats.insert(property_id, *stats);
        Ok(())
    }
}

/// Session holding the property's async mutex; writes apply on commit
struct MemoryBookingSession {
    state: Arc<Mutex<MemoryState>>,
    _guard: OwnedMutexGuard<()>,
    pending: Vec<Reservation>,
}

impl MemoryBookingSession {
    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl BookingSession for MemoryBookingSession {
    async fn find(&mut self, reservation_id: Uuid) -> Result<Option<Reservation>> {
        if let Some(pending) = self.pending.iter().rev().find(|r| r.id == reservation_id) {
            return Ok(Some(pending.clone()));
        }
        Ok(self
            .state()
            .reservations
            .iter()
            .find(|r| r.id == reservation_id)
            .cloned())
    }

    async fn find_overlapping(&mut self, query: &OverlapQuery) -> Result<Vec<BookedRange>> {
        Ok(self.state().overlapping(query))
    }

    async fn insert(&mut self, new: NewReservation) -> Result<Reservation> {
        let now = Utc::now();
        let reservation = Reservation {
            id: Uuid::new_v4(),
            property_id: new.property_id,
            user_id: new.user_id,
            start_date: new.start_date,
            end_date: new.end_date,
            number_of_guests: new.number_of_guests,
            total_price: new.total_price,
            created_at: now,
            updated_at: now,
        };
        self.pending.push(reservation.clone());
        Ok(reservation)
    }

    async fn update(
        &mut self,
        reservation_id: Uuid,
        changes: ReservationChanges,
    ) -> Result<Reservation> {
        let current = self
            .state()
            .reservations
            .iter()
            .find(|r| r.id == reservation_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("Reservation not found".to_string()))?;

        let updated = Reservation {
            start_date: changes.start_date,
            end_date: changes.end_date,
            number_of_guests: changes.number_of_guests,
            total_price: changes.total_price,
            updated_at: Utc::now(),
            ..current
        };
        self.pending.push(updated.clone());
        Ok(updated)
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        for reservation in &self.pending {
            match state.reservations.iter_mut().find(|r| r.id == reservation.id) {
                Some(existing) => *existing = reservation.clone(),
                None => state.reservations.push(reservation.clone()),
            }
        }
        Ok(())
    }
}
