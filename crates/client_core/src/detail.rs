use std::collections::HashSet;

use shared::domain::{DestinationId, TripId};
use shared::protocol::{Destination, GenerateDestinationsRequest, Trip};
use tracing::{debug, warn};

use crate::busy::{BusyGuard, MarkGuard};
use crate::client::TripClient;
use crate::collection::DeleteOutcome;
use crate::confirm::ConfirmationGate;
use crate::error::ApiError;
use crate::toast::ToastQueue;

#[derive(Debug, Clone, PartialEq)]
pub enum DetailState {
    Loading,
    /// The trip id resolves to nothing; rendered as its own page, not as a
    /// generic error.
    NotFound,
    Failed(String),
    Loaded {
        trip: Trip,
        destinations: Vec<Destination>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerateOutcome {
    Generated,
    Declined,
    /// A generation is already running; nothing was done.
    InFlight,
    Failed,
    /// The page is not in a loaded state, so there is no trip to work from.
    NotLoaded,
}

/// One trip's page: the trip record, its destinations, AI generation and
/// destination removal. Every instance stands alone; nothing is shared with
/// the dashboard list or with other pages.
#[derive(Debug)]
pub struct TripDetail {
    trip_id: TripId,
    state: DetailState,
    generating: bool,
    deleting: HashSet<DestinationId>,
}

impl TripDetail {
    pub fn new(trip_id: TripId) -> Self {
        Self {
            trip_id,
            state: DetailState::Loading,
            generating: false,
            deleting: HashSet::new(),
        }
    }

    pub fn trip_id(&self) -> TripId {
        self.trip_id
    }

    pub fn state(&self) -> &DetailState {
        &self.state
    }

    pub fn trip(&self) -> Option<&Trip> {
        match &self.state {
            DetailState::Loaded { trip, .. } => Some(trip),
            _ => None,
        }
    }

    pub fn destinations(&self) -> &[Destination] {
        match &self.state {
            DetailState::Loaded { destinations, .. } => destinations,
            _ => &[],
        }
    }

    pub fn is_generating(&self) -> bool {
        self.generating
    }

    pub fn is_deleting(&self, destination_id: DestinationId) -> bool {
        self.deleting.contains(&destination_id)
    }

    /// Loads the trip and its destination list together. The page shows
    /// either everything or one failure; when both requests fail, the
    /// trip's failure wins. A missing trip is its own state.
    pub async fn load(&mut self, client: &TripClient) {
        self.state = DetailState::Loading;
        let (trip, destinations) = tokio::join!(
            client.fetch_trip(self.trip_id),
            client.list_destinations(self.trip_id),
        );
        self.state = match (trip, destinations) {
            (Err(ApiError::NotFound), _) => {
                debug!(trip_id = self.trip_id.0, "detail: trip missing");
                DetailState::NotFound
            }
            (Err(err), _) => {
                warn!(trip_id = self.trip_id.0, error = %err, "detail: trip load failed");
                DetailState::Failed(err.to_string())
            }
            (Ok(_), Err(err)) => {
                warn!(trip_id = self.trip_id.0, error = %err, "detail: destination load failed");
                DetailState::Failed(err.to_string())
            }
            (Ok(trip), Ok(destinations)) => DetailState::Loaded { trip, destinations },
        };
    }

    /// Asks the server to add AI-picked destinations for this trip, then
    /// re-reads the whole list since the endpoint only appends. Gaps in the
    /// trip's own budget/season/interests fall back to the documented
    /// defaults. One generation at a time; the page stays browsable while it
    /// runs, and dropping the returned future cancels the request and clears
    /// the in-flight flag.
    pub async fn generate_destinations(
        &mut self,
        client: &TripClient,
        toasts: &ToastQueue,
        gate: &dyn ConfirmationGate,
    ) -> GenerateOutcome {
        if self.generating {
            return GenerateOutcome::InFlight;
        }
        let DetailState::Loaded { trip, .. } = &self.state else {
            return GenerateOutcome::NotLoaded;
        };
        if !gate.confirm("Generate AI destination suggestions for this trip?") {
            return GenerateOutcome::Declined;
        }
        let request = GenerateDestinationsRequest {
            budget: trip.budget.unwrap_or(1000.0),
            season: fallback_text(trip.season.as_deref(), "any"),
            interests: fallback_text(trip.interests.as_deref(), "sightseeing"),
        };
        debug!(trip_id = self.trip_id.0, "detail: generation requested");
        let result = {
            let _busy = BusyGuard::arm(&mut self.generating);
            client.generate_destinations(self.trip_id, &request).await
        };
        match result {
            Ok(()) => {
                toasts.success("New destinations added.").await;
                if let Err(err) = self.refresh_destinations(client).await {
                    warn!(trip_id = self.trip_id.0, error = %err, "detail: refresh after generation failed");
                    self.state = DetailState::Failed(err.to_string());
                }
                GenerateOutcome::Generated
            }
            Err(err) => {
                warn!(trip_id = self.trip_id.0, error = %err, "detail: generation failed");
                toasts.error(err.to_string()).await;
                GenerateOutcome::Failed
            }
        }
    }

    /// Confirmation-gated destination removal, mirroring trip deletion on
    /// the dashboard: success edits the list in place, failure leaves it
    /// untouched and raises an error toast.
    pub async fn delete_destination(
        &mut self,
        client: &TripClient,
        toasts: &ToastQueue,
        gate: &dyn ConfirmationGate,
        destination_id: DestinationId,
    ) -> DeleteOutcome {
        let prompt = match self
            .destinations()
            .iter()
            .find(|destination| destination.id == destination_id)
        {
            Some(destination) => format!("Remove destination \"{}\"?", destination.name),
            None => "Remove this destination?".to_owned(),
        };
        if !gate.confirm(&prompt) {
            return DeleteOutcome::Declined;
        }
        let result = {
            let _mark = MarkGuard::arm(&mut self.deleting, destination_id);
            client.delete_destination(self.trip_id, destination_id).await
        };
        match result {
            Ok(()) => {
                if let DetailState::Loaded { destinations, .. } = &mut self.state {
                    destinations.retain(|destination| destination.id != destination_id);
                }
                debug!(
                    trip_id = self.trip_id.0,
                    destination_id = destination_id.0,
                    "detail: destination removed"
                );
                toasts.success("Destination removed.").await;
                DeleteOutcome::Deleted
            }
            Err(err) => {
                warn!(
                    trip_id = self.trip_id.0,
                    destination_id = destination_id.0,
                    error = %err,
                    "detail: destination delete failed"
                );
                toasts.error(err.to_string()).await;
                DeleteOutcome::Failed
            }
        }
    }

    async fn refresh_destinations(&mut self, client: &TripClient) -> Result<(), ApiError> {
        let fresh = client.list_destinations(self.trip_id).await?;
        if let DetailState::Loaded { destinations, .. } = &mut self.state {
            *destinations = fresh;
        }
        Ok(())
    }
}

fn fallback_text(value: Option<&str>, default: &str) -> String {
    match value {
        Some(text) if !text.trim().is_empty() => text.to_owned(),
        _ => default.to_owned(),
    }
}

#[cfg(test)]
#[path = "tests/detail_tests.rs"]
mod tests;
