mod config;

use std::io::{self, Write};

use anyhow::Result;
use clap::Parser;
use client_core::{
    CollectionState, ConfirmationGate, DetailState, SubmitOutcome, ToastQueue, ToastVariant,
    TripClient, TripCollection, TripDetail, TripField, TripForm,
};
use shared::domain::{DestinationId, TripId};
use shared::protocol::{Destination, Trip};

use crate::config::load_settings;

#[derive(Parser, Debug)]
struct Args {
    #[arg(long)]
    api_base: Option<String>,
}

enum Screen {
    Dashboard,
    Detail(TripId),
    Quit,
}

struct StdinConfirm;

impl ConfirmationGate for StdinConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        match prompt_line(&format!("{prompt} [y/N] ")) {
            Ok(Some(answer)) => {
                let answer = answer.trim();
                answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes")
            }
            _ => false,
        }
    }
}

const FORM_FIELDS: &[(TripField, &str)] = &[
    (TripField::Name, "Title"),
    (TripField::Description, "Description"),
    (TripField::StartDate, "Start date (YYYY-MM-DD)"),
    (TripField::EndDate, "End date (YYYY-MM-DD)"),
    (TripField::Budget, "Budget"),
    (TripField::Season, "Season"),
    (TripField::Interests, "Interests"),
];

#[tokio::main]
async fn main() -> Result<()> {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_owned());
    tracing_subscriber::fmt()
        .with_env_filter(filter.as_str())
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let mut settings = load_settings();
    if let Some(api_base) = args.api_base {
        settings.api_base_url = api_base;
    }

    let client = TripClient::new(settings.api_base_url);
    let toasts = ToastQueue::new();
    let gate = StdinConfirm;

    println!(
        "TripGenie console. API at {}. Type 'help' for commands.",
        client.base_url()
    );

    let mut screen = Screen::Dashboard;
    loop {
        screen = match screen {
            Screen::Dashboard => run_dashboard(&client, &toasts, &gate).await?,
            Screen::Detail(trip_id) => run_detail(&client, &toasts, &gate, trip_id).await?,
            Screen::Quit => break,
        };
    }
    Ok(())
}

async fn run_dashboard(
    client: &TripClient,
    toasts: &ToastQueue,
    gate: &StdinConfirm,
) -> Result<Screen> {
    let mut collection = TripCollection::new();
    collection.load(client).await;
    render_dashboard(&collection);
    loop {
        drain_toasts(toasts).await;
        let Some(line) = prompt_line("dashboard> ")? else {
            return Ok(Screen::Quit);
        };
        let (command, argument) = split_command(line.trim());
        match command {
            "" => {}
            "list" => {
                collection.load(client).await;
                render_dashboard(&collection);
            }
            "new" => {
                if let Some(trip_id) = run_create_form(client, toasts).await? {
                    return Ok(Screen::Detail(trip_id));
                }
            }
            "open" => match argument.parse::<i64>() {
                Ok(raw) => return Ok(Screen::Detail(TripId(raw))),
                Err(_) => println!("usage: open <trip id>"),
            },
            "delete" => match argument.parse::<i64>() {
                Ok(raw) => {
                    collection
                        .delete_trip(client, toasts, gate, TripId(raw))
                        .await;
                    render_dashboard(&collection);
                }
                Err(_) => println!("usage: delete <trip id>"),
            },
            "help" => println!("commands: list, new, open <trip id>, delete <trip id>, quit"),
            "quit" | "exit" => return Ok(Screen::Quit),
            other => println!("unknown command '{other}'; try help"),
        }
    }
}

async fn run_detail(
    client: &TripClient,
    toasts: &ToastQueue,
    gate: &StdinConfirm,
    trip_id: TripId,
) -> Result<Screen> {
    let mut detail = TripDetail::new(trip_id);
    detail.load(client).await;
    render_detail(&detail);
    loop {
        drain_toasts(toasts).await;
        let Some(line) = prompt_line(&format!("trip {}> ", trip_id.0))? else {
            return Ok(Screen::Quit);
        };
        let (command, argument) = split_command(line.trim());
        match command {
            "" => {}
            "refresh" => {
                detail.load(client).await;
                render_detail(&detail);
            }
            "generate" => {
                detail.generate_destinations(client, toasts, gate).await;
                render_detail(&detail);
            }
            "rm" => match argument.parse::<i64>() {
                Ok(raw) => {
                    detail
                        .delete_destination(client, toasts, gate, DestinationId(raw))
                        .await;
                    render_detail(&detail);
                }
                Err(_) => println!("usage: rm <destination id>"),
            },
            "help" => println!("commands: generate, rm <destination id>, refresh, back, quit"),
            "back" => return Ok(Screen::Dashboard),
            "quit" | "exit" => return Ok(Screen::Quit),
            other => println!("unknown command '{other}'; try help"),
        }
    }
}

/// Walks the form fields once per pass, submits, and loops back on
/// validation or request failures so the answers can be fixed in place.
async fn run_create_form(client: &TripClient, toasts: &ToastQueue) -> Result<Option<TripId>> {
    println!();
    println!("== New trip == (enter keeps the shown value, Ctrl-D cancels)");
    let mut form = TripForm::new();
    loop {
        for (field, label) in FORM_FIELDS {
            let current = form.value(*field).to_owned();
            let prompt = if current.is_empty() {
                format!("{label}: ")
            } else {
                format!("{label} [{current}]: ")
            };
            let Some(answer) = prompt_line(&prompt)? else {
                println!("(cancelled)");
                return Ok(None);
            };
            if !answer.is_empty() {
                form.set(*field, answer);
            }
        }
        match form.submit(client, toasts).await {
            SubmitOutcome::Created(trip_id) => return Ok(Some(trip_id)),
            SubmitOutcome::Rejected => {
                if let Some(message) = form.error() {
                    println!("error: {message}");
                }
                let Some(answer) = prompt_line("Edit and retry? [Y/n] ")? else {
                    return Ok(None);
                };
                let answer = answer.trim();
                if answer.eq_ignore_ascii_case("n") || answer.eq_ignore_ascii_case("no") {
                    return Ok(None);
                }
            }
            SubmitOutcome::InFlight => return Ok(None),
        }
    }
}

fn render_dashboard(collection: &TripCollection) {
    println!();
    println!("== Trips ==");
    match collection.state() {
        CollectionState::Loading => println!("(loading)"),
        CollectionState::Failed(message) => println!("error: {message}"),
        CollectionState::Loaded(trips) if trips.is_empty() => {
            println!("No trips yet. Type 'new' to plan one.");
        }
        CollectionState::Loaded(trips) => {
            for trip in trips {
                let marker = if collection.is_deleting(trip.id) {
                    " (deleting)"
                } else {
                    ""
                };
                println!("  #{} {}{}{}", trip.id.0, trip.name, trip_summary(trip), marker);
            }
        }
    }
}

fn render_detail(detail: &TripDetail) {
    println!();
    match detail.state() {
        DetailState::Loading => println!("(loading)"),
        DetailState::NotFound => println!("Trip not found."),
        DetailState::Failed(message) => println!("error: {message}"),
        DetailState::Loaded { trip, destinations } => {
            println!("== {} (#{}) ==", trip.name, trip.id.0);
            if let Some(description) = trip.description.as_deref() {
                println!("{description}");
            }
            match (trip.start_date, trip.end_date) {
                (Some(start), Some(end)) => println!("  Dates: {start} to {end}"),
                (Some(start), None) => println!("  Starts: {start}"),
                (None, Some(end)) => println!("  Ends: {end}"),
                (None, None) => {}
            }
            if let Some(budget) = trip.budget {
                println!("  Budget: {budget}");
            }
            if let Some(season) = trip.season.as_deref() {
                println!("  Season: {season}");
            }
            if let Some(interests) = trip.interests.as_deref() {
                println!("  Interests: {interests}");
            }
            if destinations.is_empty() {
                println!("No destinations yet. Type 'generate' for AI suggestions.");
            } else {
                println!("Destinations:");
                for destination in destinations {
                    render_destination(detail, destination);
                }
            }
            if detail.is_generating() {
                println!("(generating suggestions)");
            }
        }
    }
}

fn render_destination(detail: &TripDetail, destination: &Destination) {
    let marker = if detail.is_deleting(destination.id) {
        " (removing)"
    } else {
        ""
    };
    println!("  #{} {}{}", destination.id.0, destination.name, marker);
    if let Some(place) = place_line(destination) {
        println!("      {place}");
    }
    match (destination.arrival_date, destination.departure_date) {
        (Some(arrival), Some(departure)) => println!("      stay: {arrival} to {departure}"),
        (Some(arrival), None) => println!("      arrives: {arrival}"),
        (None, Some(departure)) => println!("      departs: {departure}"),
        (None, None) => {}
    }
    if let Some(description) = destination.description.as_deref() {
        println!("      {description}");
    }
}

fn trip_summary(trip: &Trip) -> String {
    let mut parts = Vec::new();
    match (trip.start_date, trip.end_date) {
        (Some(start), Some(end)) => parts.push(format!("{start} to {end}")),
        (Some(start), None) => parts.push(format!("from {start}")),
        (None, Some(end)) => parts.push(format!("until {end}")),
        (None, None) => {}
    }
    if let Some(budget) = trip.budget {
        parts.push(format!("budget {budget}"));
    }
    if let Some(season) = trip.season.as_deref() {
        parts.push(season.to_owned());
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join(", "))
    }
}

fn place_line(destination: &Destination) -> Option<String> {
    let mut parts: Vec<String> = Vec::new();
    if let Some(address) = destination.address.as_deref() {
        parts.push(address.to_owned());
    }
    if let Some(city) = destination.city.as_deref() {
        parts.push(city.to_owned());
    }
    if let Some(country) = destination.country.as_deref() {
        parts.push(country.to_owned());
    }
    if let (Some(latitude), Some(longitude)) = (destination.latitude, destination.longitude) {
        parts.push(format!("({latitude:.4}, {longitude:.4})"));
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(", "))
    }
}

async fn drain_toasts(toasts: &ToastQueue) {
    while let Some(toast) = toasts.advance().await {
        match toast.variant {
            ToastVariant::Success => println!("[ok] {}", toast.message),
            ToastVariant::Error => println!("[error] {}", toast.message),
        }
    }
}

fn split_command(line: &str) -> (&str, &str) {
    match line.split_once(char::is_whitespace) {
        Some((command, argument)) => (command, argument.trim()),
        None => (line, ""),
    }
}

/// One line from stdin, `None` once input is closed.
fn prompt_line(label: &str) -> Result<Option<String>> {
    print!("{label}");
    io::stdout().flush()?;
    let mut line = String::new();
    if io::stdin().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_owned()))
}
