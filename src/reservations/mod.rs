//! Reservation engine for the marketplace.
//!
//! Date-range overlap detection, per-day capacity accounting and pricing,
//! plus the HTTP surface and the background stats worker built on them.

pub mod access;
pub mod calculators;
pub mod memory;
pub mod models;
pub mod queries;
pub mod requests;
pub mod responses;
pub mod routes;
pub mod services;
pub mod stats;
pub mod store;

// Re-export commonly used items
pub use calculators::round_money;
pub use memory::InMemoryReservationStore;
pub use routes::router;
pub use services::{BookingChanges, BookingOutcome, BookingRequest, ReservationService};
pub use stats::{run_stats_worker, StatsDispatch, StatsQueue};
pub use store::{PgReservationStore, ReservationStore};
