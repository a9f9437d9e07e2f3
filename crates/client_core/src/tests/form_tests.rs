use super::*;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use shared::protocol::Trip;
use tokio::{
    net::TcpListener,
    sync::{oneshot, Mutex},
};

use crate::toast::ToastVariant;

#[derive(Clone)]
struct CreateServerState {
    body_tx: Arc<Mutex<Option<oneshot::Sender<String>>>>,
}

async fn handle_create_trip(
    State(state): State<CreateServerState>,
    body: String,
) -> Result<(StatusCode, Json<Trip>), StatusCode> {
    let request: CreateTripRequest =
        serde_json::from_str(&body).map_err(|_| StatusCode::BAD_REQUEST)?;
    if let Some(tx) = state.body_tx.lock().await.take() {
        let _ = tx.send(body);
    }
    Ok((
        StatusCode::CREATED,
        Json(Trip {
            id: TripId(42),
            name: request.name,
            description: request.description,
            start_date: request.start_date,
            end_date: request.end_date,
            budget: request.budget,
            season: request.season,
            interests: request.interests,
        }),
    ))
}

async fn spawn_create_server() -> Result<(String, oneshot::Receiver<String>)> {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let (tx, rx) = oneshot::channel();
    let state = CreateServerState {
        body_tx: Arc::new(Mutex::new(Some(tx))),
    };
    let app = Router::new()
        .route("/trips", post(handle_create_trip))
        .with_state(state);
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok((format!("http://{addr}"), rx))
}

async fn spawn_rejecting_server(status: StatusCode, body: &'static str) -> Result<String> {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let app = Router::new().route("/trips", post(move || async move { (status, body) }));
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(format!("http://{addr}"))
}

// The first create request parks until the returned sender fires; later
// requests answer right away.
async fn spawn_stalling_create_server() -> Result<(String, oneshot::Sender<()>)> {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let (release_tx, release_rx) = oneshot::channel::<()>();
    let gate = Arc::new(Mutex::new(Some(release_rx)));
    let app = Router::new().route(
        "/trips",
        post(move || {
            let gate = Arc::clone(&gate);
            async move {
                if let Some(release) = gate.lock().await.take() {
                    let _ = release.await;
                }
                (
                    StatusCode::CREATED,
                    Json(serde_json::json!({ "id": 7, "name": "Azores" })),
                )
            }
        }),
    );
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok((format!("http://{addr}"), release_tx))
}

#[test]
fn title_failure_reported_before_budget_failure() {
    let mut form = TripForm::new();
    form.set(TripField::Name, "   ");
    form.set(TripField::Budget, "not a number");
    assert_eq!(
        form.first_validation_error().as_deref(),
        Some("Title is required.")
    );
}

#[test]
fn budget_rule_rejects_negatives_and_junk() {
    let mut form = TripForm::new();
    form.set(TripField::Name, "Iceland");
    form.set(TripField::Budget, "-20");
    assert_eq!(
        form.first_validation_error().as_deref(),
        Some("Budget must be a non-negative number.")
    );
    form.set(TripField::Budget, "twelve");
    assert_eq!(
        form.first_validation_error().as_deref(),
        Some("Budget must be a non-negative number.")
    );
    form.set(TripField::Budget, "");
    assert_eq!(form.first_validation_error(), None);
    form.set(TripField::Budget, " 0 ");
    assert_eq!(form.first_validation_error(), None);
    form.set(TripField::Budget, "1e3");
    assert_eq!(form.first_validation_error(), None);
}

#[test]
fn date_order_rule_needs_two_parseable_dates() {
    let mut form = TripForm::new();
    form.set(TripField::Name, "Iceland");
    form.set(TripField::StartDate, "2025-09-10");
    form.set(TripField::EndDate, "2025-09-01");
    assert_eq!(
        form.first_validation_error().as_deref(),
        Some("End date must be after start date.")
    );
    // Same-day trips are fine.
    form.set(TripField::EndDate, "2025-09-10");
    assert_eq!(form.first_validation_error(), None);
    form.set(TripField::EndDate, "sometime next year");
    assert_eq!(form.first_validation_error(), None);
}

#[test]
fn season_tracks_start_date_months() {
    let mut form = TripForm::new();
    form.set(TripField::StartDate, "2024-03-15");
    assert_eq!(form.value(TripField::Season), "spring");
    form.set(TripField::StartDate, "2024-07-10");
    assert_eq!(form.value(TripField::Season), "summer");
    form.set(TripField::StartDate, "2024-10-01");
    assert_eq!(form.value(TripField::Season), "autumn");
    form.set(TripField::StartDate, "2024-12-21");
    assert_eq!(form.value(TripField::Season), "winter");
    form.set(TripField::StartDate, "2025-01-05");
    assert_eq!(form.value(TripField::Season), "winter");
}

#[test]
fn start_date_wins_but_end_date_fills_in() {
    let mut form = TripForm::new();
    form.set(TripField::EndDate, "2024-11-03");
    assert_eq!(form.value(TripField::Season), "autumn");
    form.set(TripField::StartDate, "2024-06-20");
    assert_eq!(form.value(TripField::Season), "summer");
    form.set(TripField::StartDate, "");
    assert_eq!(form.value(TripField::Season), "autumn");
}

#[test]
fn manual_season_edit_latches_inference_off() {
    let mut form = TripForm::new();
    form.set(TripField::Season, "monsoon");
    form.set(TripField::StartDate, "2024-07-10");
    assert_eq!(form.value(TripField::Season), "monsoon");
    form.set(TripField::Season, "");
    form.set(TripField::EndDate, "2024-07-20");
    assert_eq!(form.value(TripField::Season), "");
}

#[test]
fn unparseable_date_keeps_last_inferred_season() {
    let mut form = TripForm::new();
    form.set(TripField::StartDate, "2024-07-10");
    form.set(TripField::StartDate, "not a date");
    assert_eq!(form.value(TripField::Season), "summer");
}

#[test]
fn request_payload_normalizes_blank_fields_to_absent() {
    let mut form = TripForm::new();
    form.set(TripField::Name, "  Japan 2025  ");
    form.set(TripField::Description, "   ");
    form.set(TripField::Budget, "  ");
    form.set(TripField::Interests, " food, temples  ");
    let request = form.to_request();
    assert_eq!(request.name, "Japan 2025");
    assert_eq!(request.description, None);
    assert_eq!(request.start_date, None);
    assert_eq!(request.end_date, None);
    assert_eq!(request.budget, None);
    assert_eq!(request.season, None);
    assert_eq!(request.interests.as_deref(), Some("food, temples"));
}

#[tokio::test]
async fn submit_success_resets_form_and_toasts() {
    let (server_url, body_rx) = spawn_create_server().await.expect("spawn server");
    let client = TripClient::new(server_url);
    let toasts = ToastQueue::new();

    let mut form = TripForm::new();
    form.set(TripField::Name, "  Japan 2025  ");
    form.set(TripField::StartDate, "2025-04-01");
    form.set(TripField::EndDate, "2025-04-15");
    form.set(TripField::Budget, " 2500 ");
    form.set(TripField::Season, "");
    form.set(TripField::Interests, "  food, temples ");

    let outcome = form.submit(&client, &toasts).await;
    assert_eq!(outcome, SubmitOutcome::Created(TripId(42)));

    // Blank optional fields go out as explicit nulls, not missing keys.
    let body: serde_json::Value =
        serde_json::from_str(&body_rx.await.expect("captured body")).expect("valid json");
    assert_eq!(body["name"], "Japan 2025");
    assert_eq!(body["description"], serde_json::Value::Null);
    assert_eq!(body["start_date"], "2025-04-01");
    assert_eq!(body["end_date"], "2025-04-15");
    assert_eq!(body["budget"], 2500.0);
    assert_eq!(body["season"], serde_json::Value::Null);
    assert_eq!(body["interests"], "food, temples");

    for field in [
        TripField::Name,
        TripField::Description,
        TripField::StartDate,
        TripField::EndDate,
        TripField::Budget,
        TripField::Season,
        TripField::Interests,
    ] {
        assert_eq!(form.value(field), "", "field should reset: {field:?}");
    }
    assert!(!form.season_touched);
    assert!(!form.is_submitting());
    assert!(form.error().is_none());

    let active = toasts.active().await;
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].message, "Trip created.");
    assert_eq!(active[0].variant, ToastVariant::Success);
}

#[tokio::test]
async fn submit_failure_preserves_fields_and_surfaces_status_error() {
    let server_url =
        spawn_rejecting_server(StatusCode::UNPROCESSABLE_ENTITY, "budget out of range")
            .await
            .expect("spawn server");
    let client = TripClient::new(server_url);
    let toasts = ToastQueue::new();

    let mut form = TripForm::new();
    form.set(TripField::Name, "Weekend in Oslo");
    form.set(TripField::Budget, "900");

    let outcome = form.submit(&client, &toasts).await;
    assert_eq!(outcome, SubmitOutcome::Rejected);
    assert_eq!(form.value(TripField::Name), "Weekend in Oslo");
    assert_eq!(form.value(TripField::Budget), "900");
    assert_eq!(
        form.error(),
        Some("Failed to create trip (HTTP 422): budget out of range")
    );
    assert!(!form.is_submitting());

    let active = toasts.active().await;
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].variant, ToastVariant::Error);
    assert_eq!(
        active[0].message,
        "Failed to create trip (HTTP 422): budget out of range"
    );
}

#[tokio::test]
async fn validation_failure_stays_inline_without_toast() {
    let client = TripClient::new("http://127.0.0.1:9");
    let toasts = ToastQueue::new();
    let mut form = TripForm::new();

    assert_eq!(form.submit(&client, &toasts).await, SubmitOutcome::Rejected);
    assert_eq!(form.error(), Some("Title is required."));
    assert!(toasts.is_empty().await);

    // The next failure replaces the old message instead of stacking.
    form.set(TripField::Name, "Fjord loop");
    form.set(TripField::Budget, "-1");
    assert_eq!(form.submit(&client, &toasts).await, SubmitOutcome::Rejected);
    assert_eq!(form.error(), Some("Budget must be a non-negative number."));
    assert!(toasts.is_empty().await);
}

#[tokio::test]
async fn submit_ignored_while_in_flight() {
    let client = TripClient::new("http://127.0.0.1:9");
    let toasts = ToastQueue::new();
    let mut form = TripForm::new();
    form.set(TripField::Name, "Retry storm");
    form.submitting = true;

    assert_eq!(form.submit(&client, &toasts).await, SubmitOutcome::InFlight);
    assert_eq!(form.value(TripField::Name), "Retry storm");
    assert!(form.error().is_none());
    assert!(toasts.is_empty().await);
}

#[tokio::test]
async fn dropped_submission_clears_the_in_flight_flag() {
    let (server_url, release) = spawn_stalling_create_server().await.expect("spawn server");
    let client = TripClient::new(server_url);
    let toasts = ToastQueue::new();
    let mut form = TripForm::new();
    form.set(TripField::Name, "Azores");

    {
        let submit = form.submit(&client, &toasts);
        tokio::pin!(submit);
        let elapsed = tokio::time::timeout(Duration::from_millis(100), &mut submit).await;
        assert!(elapsed.is_err(), "first attempt should still be in flight");
    }

    // The abandoned attempt is gone; a fresh one goes through.
    assert!(!form.is_submitting());
    let _ = release.send(());
    assert_eq!(
        form.submit(&client, &toasts).await,
        SubmitOutcome::Created(TripId(7))
    );
}
