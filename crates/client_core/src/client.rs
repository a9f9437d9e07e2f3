use reqwest::{Client, Response, StatusCode};
use shared::domain::{DestinationId, TripId};
use shared::protocol::{CreateTripRequest, Destination, GenerateDestinationsRequest, Trip};

use crate::error::ApiError;

/// API base used when no configuration overrides it.
pub const DEFAULT_API_BASE: &str = "http://localhost:8000/api/v1";

/// Typed client for the trip-planning HTTP API. Cloning shares the
/// underlying connection pool.
#[derive(Clone)]
pub struct TripClient {
    http: Client,
    base_url: String,
}

impl TripClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            http: Client::new(),
            base_url,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn create_trip(&self, request: &CreateTripRequest) -> Result<Trip, ApiError> {
        let response = self
            .http
            .post(format!("{}/trips", self.base_url))
            .json(request)
            .send()
            .await?;
        let response = fail_on_status(response, "Failed to create trip", true).await?;
        Ok(response.json().await?)
    }

    pub async fn list_trips(&self) -> Result<Vec<Trip>, ApiError> {
        let response = self
            .http
            .get(format!("{}/trips", self.base_url))
            .send()
            .await?;
        let response = fail_on_status(response, "Failed to load trips", false).await?;
        Ok(response.json().await?)
    }

    /// Fetches one trip. A 404 here means the trip itself is gone, which is
    /// the one failure callers treat as its own state rather than a message.
    pub async fn fetch_trip(&self, trip_id: TripId) -> Result<Trip, ApiError> {
        let response = self
            .http
            .get(format!("{}/trips/{}", self.base_url, trip_id.0))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound);
        }
        let response = fail_on_status(response, "Failed to load trip", false).await?;
        Ok(response.json().await?)
    }

    pub async fn delete_trip(&self, trip_id: TripId) -> Result<(), ApiError> {
        let response = self
            .http
            .delete(format!("{}/trips/{}", self.base_url, trip_id.0))
            .send()
            .await?;
        fail_on_status(response, "Failed to delete trip", false).await?;
        Ok(())
    }

    pub async fn list_destinations(&self, trip_id: TripId) -> Result<Vec<Destination>, ApiError> {
        let response = self
            .http
            .get(format!("{}/trips/{}/destinations", self.base_url, trip_id.0))
            .send()
            .await?;
        let response = fail_on_status(response, "Failed to load destinations", false).await?;
        Ok(response.json().await?)
    }

    /// Kicks off server-side destination generation. The endpoint appends to
    /// the trip's destinations; its response body is ignored and callers
    /// re-fetch the list afterwards.
    pub async fn generate_destinations(
        &self,
        trip_id: TripId,
        request: &GenerateDestinationsRequest,
    ) -> Result<(), ApiError> {
        let response = self
            .http
            .post(format!(
                "{}/trips/{}/destinations/ai-generate",
                self.base_url, trip_id.0
            ))
            .json(request)
            .send()
            .await?;
        fail_on_status(response, "AI generation failed", true).await?;
        Ok(())
    }

    pub async fn delete_destination(
        &self,
        trip_id: TripId,
        destination_id: DestinationId,
    ) -> Result<(), ApiError> {
        let response = self
            .http
            .delete(format!(
                "{}/trips/{}/destinations/{}",
                self.base_url, trip_id.0, destination_id.0
            ))
            .send()
            .await?;
        fail_on_status(response, "Failed to delete destination", false).await?;
        Ok(())
    }
}

/// Maps a non-success response to `ApiError::Status`. Only endpoints whose
/// error bodies are worth relaying to users fold the body into the message.
async fn fail_on_status(
    response: Response,
    label: &str,
    include_body: bool,
) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let mut message = format!("{label} (HTTP {})", status.as_u16());
    if include_body {
        let body = response.text().await.unwrap_or_default();
        if !body.is_empty() {
            message.push_str(": ");
            message.push_str(&body);
        }
    }
    Err(ApiError::Status(message))
}

#[cfg(test)]
#[path = "tests/client_tests.rs"]
mod tests;
