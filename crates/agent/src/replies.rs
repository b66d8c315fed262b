//! Prose rendering of tool outcomes.
//!
//! This is the only place the workspace produces text meant for a traveller. Core types
//! stay structured; the functions here turn them into one status string per tool call.

use std::fmt::Write as _;

use tripline_core::domain::flight::{SearchResult, TripType};
use tripline_core::domain::trip::TripContext;
use tripline_core::errors::{FlightSearchError, TripSide};
use tripline_core::flight_search::SearchSummary;
use tripline_core::merge::ChangedGroups;

pub fn search_results(summary: &SearchSummary) -> String {
    let request = &summary.request;
    let travellers = request.passengers.total();
    let mut out = String::new();

    let _ = write!(
        out,
        "Found {} flight{} from {} ({}) to {} ({}) on {}",
        summary.results.len(),
        plural(summary.results.len()),
        request.origin.city,
        request.origin.iata,
        request.destination.city,
        request.destination.iata,
        request.outbound_date,
    );
    if let (TripType::Roundtrip, Some(return_date)) = (request.trip_type, request.return_date) {
        let _ = write!(out, ", returning {return_date}");
    }
    let _ = writeln!(
        out,
        " for {travellers} traveller{} in {}.",
        plural(travellers as usize),
        request.cabin_class.display_name()
    );

    for result in &summary.results {
        let _ = writeln!(out, "{}", flight_line(result));
    }
    let _ = write!(out, "Book or compare: {}", summary.deep_link);
    out
}

pub fn flight_line(result: &SearchResult) -> String {
    let stops = match result.stops {
        0 => "nonstop".to_string(),
        1 => "1 stop".to_string(),
        n => format!("{n} stops"),
    };
    format!(
        "{}: {} {} | {} {} -> {} {} | {}h {:02}m | {} | {} {} | {}",
        result.rank_label,
        result.airline.name,
        result.flight_id,
        result.departure.airport,
        result.departure.time.format("%H:%M"),
        result.arrival.airport,
        result.arrival.time.format("%H:%M"),
        result.duration_minutes / 60,
        result.duration_minutes % 60,
        stops,
        result.price.currency,
        result.price.amount,
        if result.refundable { "refundable" } else { "non-refundable" },
    )
}

pub fn search_error(error: &FlightSearchError) -> String {
    match error {
        FlightSearchError::MissingRequiredField { .. } => {
            format!("To search flights I {error}.")
        }
        FlightSearchError::UnsupportedLocation { side, source } => {
            let role = match side {
                TripSide::Origin => "departure",
                TripSide::Destination => "destination",
            };
            format!(
                "I couldn't find a major airport for {}. Which nearby city with a major \
                 airport should I use as your {role}?",
                source.city
            )
        }
        FlightSearchError::InvalidDate(rejection)
        | FlightSearchError::InvalidDateOrdering(rejection) => {
            format!("That date doesn't work: {rejection}.")
        }
        FlightSearchError::PassengerRuleViolation(violation) => match &violation.suggestion {
            Some(suggestion) => format!("{} {suggestion}", violation.message),
            None => violation.message.clone(),
        },
        FlightSearchError::DuplicateRequest => {
            "Those flights are already listed above. Change the dates, cities, cabin or \
             travellers and I'll search again."
                .to_string()
        }
        FlightSearchError::ProviderFailure { .. } => {
            "I couldn't reach the flight search just now. Your trip details are saved, \
             please try again in a moment."
                .to_string()
        }
        FlightSearchError::BookingTransition(transition) => {
            format!("I can't do that right now: {transition}.")
        }
    }
}

pub fn summary_updated(changes: ChangedGroups, context: &TripContext) -> String {
    if !changes.any() {
        return "Nothing new to note; your trip details are unchanged.".to_string();
    }

    let summary = &context.summary;
    let mut parts = Vec::new();
    if let Some(origin) = &summary.origin {
        parts.push(format!("from {}", origin.city));
    }
    if let Some(destination) = &summary.destination {
        parts.push(format!("to {}", destination.city));
    }
    if let Some(outbound) = summary.outbound_date {
        parts.push(format!("leaving {outbound}"));
    }
    if let Some(return_date) = summary.return_date {
        parts.push(format!("back {return_date}"));
    }
    let travellers = summary.passengers.total();
    parts.push(format!("{travellers} traveller{}", plural(travellers as usize)));

    format!("Noted your trip: {}.", parts.join(", "))
}

pub fn flight_selected(result: &SearchResult) -> String {
    format!(
        "Selected {} {} departing {} at {}. Confirm when you're ready to book.",
        result.airline.name,
        result.flight_id,
        result.departure.airport,
        result.departure.time.format("%Y-%m-%d %H:%M"),
    )
}

pub fn booking_confirmed(context: &TripContext) -> String {
    let reference = context.booking.confirmation_reference.as_deref().unwrap_or_default();
    let flight = context.booking.selected_flight_id.as_deref().unwrap_or_default();
    format!("Booking confirmed for flight {flight}. Your reference is {reference}.")
}

fn plural(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}
