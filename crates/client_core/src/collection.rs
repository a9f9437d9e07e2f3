use std::collections::HashSet;

use shared::domain::TripId;
use shared::protocol::Trip;
use tracing::{debug, warn};

use crate::busy::MarkGuard;
use crate::client::TripClient;
use crate::confirm::ConfirmationGate;
use crate::toast::ToastQueue;

#[derive(Debug, Clone, PartialEq)]
pub enum CollectionState {
    Loading,
    Failed(String),
    /// An empty list is a loaded state of its own, not a failure.
    Loaded(Vec<Trip>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    /// The gate said no; no request was made.
    Declined,
    Failed,
}

/// Dashboard-side list of every trip. Kept in sync by explicit loads and by
/// in-place edits after successful deletes; never re-fetches on its own.
#[derive(Debug)]
pub struct TripCollection {
    state: CollectionState,
    deleting: HashSet<TripId>,
}

impl TripCollection {
    pub fn new() -> Self {
        Self {
            state: CollectionState::Loading,
            deleting: HashSet::new(),
        }
    }

    pub fn state(&self) -> &CollectionState {
        &self.state
    }

    /// Trips in server order; empty while not loaded.
    pub fn trips(&self) -> &[Trip] {
        match &self.state {
            CollectionState::Loaded(trips) => trips,
            _ => &[],
        }
    }

    /// True while a delete for this trip is outstanding. Scoped to that
    /// trip's own controls; the rest of the list stays interactive.
    pub fn is_deleting(&self, trip_id: TripId) -> bool {
        self.deleting.contains(&trip_id)
    }

    /// Fetches the full list, replacing whatever was shown before.
    pub async fn load(&mut self, client: &TripClient) {
        self.state = CollectionState::Loading;
        self.state = match client.list_trips().await {
            Ok(trips) => {
                debug!(count = trips.len(), "trips: loaded");
                CollectionState::Loaded(trips)
            }
            Err(err) => {
                warn!(error = %err, "trips: load failed");
                CollectionState::Failed(err.to_string())
            }
        };
    }

    /// Confirmation-gated delete. A decline costs nothing. Success removes
    /// the trip from the loaded list in place; failure leaves the list
    /// untouched and raises an error toast.
    pub async fn delete_trip(
        &mut self,
        client: &TripClient,
        toasts: &ToastQueue,
        gate: &dyn ConfirmationGate,
        trip_id: TripId,
    ) -> DeleteOutcome {
        let prompt = match self.trips().iter().find(|trip| trip.id == trip_id) {
            Some(trip) => format!("Delete trip \"{}\"?", trip.name),
            None => "Delete this trip?".to_owned(),
        };
        if !gate.confirm(&prompt) {
            return DeleteOutcome::Declined;
        }
        let result = {
            let _mark = MarkGuard::arm(&mut self.deleting, trip_id);
            client.delete_trip(trip_id).await
        };
        match result {
            Ok(()) => {
                if let CollectionState::Loaded(trips) = &mut self.state {
                    trips.retain(|trip| trip.id != trip_id);
                }
                debug!(trip_id = trip_id.0, "trips: deleted");
                toasts.success("Trip deleted.").await;
                DeleteOutcome::Deleted
            }
            Err(err) => {
                warn!(trip_id = trip_id.0, error = %err, "trips: delete failed");
                toasts.error(err.to_string()).await;
                DeleteOutcome::Failed
            }
        }
    }
}

impl Default for TripCollection {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "tests/collection_tests.rs"]
mod tests;
