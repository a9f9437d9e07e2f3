use chrono::{Datelike, NaiveDate};
use shared::domain::{Season, TripId};
use shared::protocol::CreateTripRequest;
use tracing::{debug, warn};

use crate::busy::BusyGuard;
use crate::client::TripClient;
use crate::toast::ToastQueue;

/// Editable fields of the trip creation form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TripField {
    Name,
    Description,
    StartDate,
    EndDate,
    Budget,
    Season,
    Interests,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct TripFormValues {
    name: String,
    description: String,
    start_date: String,
    end_date: String,
    budget: String,
    season: String,
    interests: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Trip persisted; callers navigate to it.
    Created(TripId),
    /// Validation or the request failed; the inline error says why.
    Rejected,
    /// A previous submission is still in flight; nothing was done.
    InFlight,
}

/// State machine behind the trip creation form: raw text fields, season
/// inference, first-failure validation and guarded submission.
///
/// Fields hold whatever the user typed; nothing is normalized until the
/// payload is built.
#[derive(Debug, Default)]
pub struct TripForm {
    values: TripFormValues,
    season_touched: bool,
    submitting: bool,
    error: Option<String>,
}

impl TripForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges one edited field into the form. Editing the season by hand
    /// turns automatic inference off for good; editing a date while
    /// inference is still on re-derives the season from the dates.
    pub fn set(&mut self, field: TripField, value: impl Into<String>) {
        let value = value.into();
        match field {
            TripField::Name => self.values.name = value,
            TripField::Description => self.values.description = value,
            TripField::StartDate => self.values.start_date = value,
            TripField::EndDate => self.values.end_date = value,
            TripField::Budget => self.values.budget = value,
            TripField::Season => {
                self.values.season = value;
                self.season_touched = true;
                return;
            }
            TripField::Interests => self.values.interests = value,
        }
        if !self.season_touched && matches!(field, TripField::StartDate | TripField::EndDate) {
            self.infer_season();
        }
    }

    pub fn value(&self, field: TripField) -> &str {
        match field {
            TripField::Name => &self.values.name,
            TripField::Description => &self.values.description,
            TripField::StartDate => &self.values.start_date,
            TripField::EndDate => &self.values.end_date,
            TripField::Budget => &self.values.budget,
            TripField::Season => &self.values.season,
            TripField::Interests => &self.values.interests,
        }
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Validates, posts, and on success resets the whole form for the next
    /// trip. At most one submission runs at a time; triggers while one is in
    /// flight are ignored. Validation failures stay inline; request failures
    /// also raise an error toast. Dropping the returned future cancels the
    /// request and clears the in-flight flag, so a later submit starts clean.
    pub async fn submit(&mut self, client: &TripClient, toasts: &ToastQueue) -> SubmitOutcome {
        if self.submitting {
            return SubmitOutcome::InFlight;
        }
        if let Some(message) = self.first_validation_error() {
            self.error = Some(message);
            return SubmitOutcome::Rejected;
        }
        self.error = None;
        let request = self.to_request();
        let result = {
            let _busy = BusyGuard::arm(&mut self.submitting);
            client.create_trip(&request).await
        };
        match result {
            Ok(trip) => {
                debug!(trip_id = trip.id.0, "form: trip created");
                self.values = TripFormValues::default();
                self.season_touched = false;
                toasts.success("Trip created.").await;
                SubmitOutcome::Created(trip.id)
            }
            Err(err) => {
                warn!(error = %err, "form: create failed");
                let message = err.to_string();
                toasts.error(message.clone()).await;
                self.error = Some(message);
                SubmitOutcome::Rejected
            }
        }
    }

    /// First failing rule, in the order users meet the fields.
    fn first_validation_error(&self) -> Option<String> {
        if self.values.name.trim().is_empty() {
            return Some("Title is required.".to_owned());
        }
        if let Some(raw) = normalized(&self.values.budget) {
            if !matches!(raw.parse::<f64>(), Ok(n) if n >= 0.0) {
                return Some("Budget must be a non-negative number.".to_owned());
            }
        }
        if let (Some(start), Some(end)) = (
            parse_date(&self.values.start_date),
            parse_date(&self.values.end_date),
        ) {
            if start > end {
                return Some("End date must be after start date.".to_owned());
            }
        }
        None
    }

    fn to_request(&self) -> CreateTripRequest {
        CreateTripRequest {
            name: self.values.name.trim().to_owned(),
            description: normalized(&self.values.description),
            start_date: parse_date(&self.values.start_date),
            end_date: parse_date(&self.values.end_date),
            budget: normalized(&self.values.budget).and_then(|raw| raw.parse().ok()),
            season: normalized(&self.values.season),
            interests: normalized(&self.values.interests),
        }
    }

    // Start date wins when both parse; a date that does not parse neither
    // infers nor clears anything.
    fn infer_season(&mut self) {
        let date = parse_date(&self.values.start_date)
            .or_else(|| parse_date(&self.values.end_date));
        if let Some(date) = date {
            self.values.season = season_of(date).as_str().to_owned();
        }
    }
}

/// The one place a blank form field becomes an absent value.
fn normalized(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_owned())
    }
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    raw.trim().parse().ok()
}

fn season_of(date: NaiveDate) -> Season {
    match date.month() {
        3..=5 => Season::Spring,
        6..=8 => Season::Summer,
        9..=11 => Season::Autumn,
        _ => Season::Winter,
    }
}

#[cfg(test)]
#[path = "tests/form_tests.rs"]
mod tests;
