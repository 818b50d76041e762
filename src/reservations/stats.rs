//! Background recomputation of per-property booking stats.
//!
//! Writes to reservations enqueue a `RecomputeStats` message. Delivery is
//! best-effort and at-most-once: a full queue drops the message, and a failed
//! recomputation is logged and not retried. Both outcomes are reported to the
//! caller rather than swallowed.

use std::sync::Arc;

use chrono::NaiveDate;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::Result;

use super::calculators::{summarize_completed, PropertyStats};
use super::store::ReservationStore;

/// Request to refresh a property's nights/income totals
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecomputeStats {
    pub property_id: Uuid,
}

/// Outcome of handing a message to the stats queue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatsDispatch {
    Queued,
    /// Queue full or worker gone; the stats stay stale until the next write
    Dropped,
}

/// Sending half of the stats queue
#[derive(Clone)]
pub struct StatsQueue {
    tx: mpsc::Sender<RecomputeStats>,
}

impl StatsQueue {
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<RecomputeStats>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }

    pub fn enqueue(&self, property_id: Uuid) -> StatsDispatch {
        match self.tx.try_send(RecomputeStats { property_id }) {
            Ok(()) => {
                debug!(%property_id, "Stats recompute queued");
                StatsDispatch::Queued
            }
            Err(e) => {
                warn!(%property_id, error = %e, "Stats recompute dropped");
                StatsDispatch::Dropped
            }
        }
    }
}

/// Recompute and persist the stats of one property
pub async fn recompute_property_stats(
    store: &dyn ReservationStore,
    property_id: Uuid,
    today: NaiveDate,
) -> Result<PropertyStats> {
    let stays = store.completed_stays(property_id, today).await?;
    let stats = summarize_completed(&stays, today);
    store.write_stats(property_id, &stats).await?;
    Ok(stats)
}

/// Consume the stats queue until every sender is dropped
pub async fn run_stats_worker(
    mut rx: mpsc::Receiver<RecomputeStats>,
    store: Arc<dyn ReservationStore>,
    today: fn() -> NaiveDate,
) {
    info!("Stats worker started");

    while let Some(message) = rx.recv().await {
        let property_id = message.property_id;
        match recompute_property_stats(store.as_ref(), property_id, today()).await {
            Ok(stats) => debug!(
                %property_id,
                nights = stats.total_nights_booked,
                income = %stats.total_income,
                "Property stats updated"
            ),
            Err(e) => warn!(%property_id, error = %e, "Property stats recompute failed"),
        }
    }

    info!("Stats worker stopped");
}
