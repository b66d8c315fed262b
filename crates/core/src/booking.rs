//! Booking-status state machine.
//!
//! `pending -> searching -> {results_shown | pending} -> selected -> confirmed`. A shown or
//! selected result set may be replaced by a new search; `confirmed` is terminal.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::domain::flight::{BookingStatus, SearchResult};
use crate::domain::trip::TripContext;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingEvent {
    SearchStarted,
    ResultsReceived,
    SearchFailed,
    FlightSelected,
    BookingConfirmed,
}

impl BookingEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SearchStarted => "search_started",
            Self::ResultsReceived => "results_received",
            Self::SearchFailed => "search_failed",
            Self::FlightSelected => "flight_selected",
            Self::BookingConfirmed => "booking_confirmed",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChange {
    pub from: BookingStatus,
    pub to: BookingStatus,
    pub event: BookingEvent,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum BookingTransitionError {
    #[error("cannot apply {} while booking is {}", .event.as_str(), .state.as_str())]
    InvalidTransition { state: BookingStatus, event: BookingEvent },
    #[error("flight `{flight_id}` is not among the current search results")]
    UnknownFlight { flight_id: String },
    #[error("a confirmation reference is required to confirm the booking")]
    MissingReference,
}

pub fn transition(
    current: BookingStatus,
    event: BookingEvent,
) -> Result<StatusChange, BookingTransitionError> {
    use BookingEvent::{
        BookingConfirmed, FlightSelected, ResultsReceived, SearchFailed, SearchStarted,
    };
    use BookingStatus::{Confirmed, Pending, ResultsShown, Searching, Selected};

    let to = match (current, event) {
        (Pending, SearchStarted) | (ResultsShown, SearchStarted) | (Selected, SearchStarted) => {
            Searching
        }
        (Searching, ResultsReceived) => ResultsShown,
        (Searching, SearchFailed) => Pending,
        (ResultsShown, FlightSelected) | (Selected, FlightSelected) => Selected,
        (Selected, BookingConfirmed) => Confirmed,
        _ => return Err(BookingTransitionError::InvalidTransition { state: current, event }),
    };

    Ok(StatusChange { from: current, to, event })
}

/// Applies `event` to the context's flight state in place.
pub fn apply(
    context: &mut TripContext,
    event: BookingEvent,
) -> Result<StatusChange, BookingTransitionError> {
    let change = transition(context.flight.booking_status, event)?;
    context.flight.booking_status = change.to;
    Ok(change)
}

/// Marks one of the shown results as the traveller's choice.
pub fn select_flight(
    context: &mut TripContext,
    flight_id: &str,
) -> Result<SearchResult, BookingTransitionError> {
    let flight_id = flight_id.trim();
    let change = transition(context.flight.booking_status, BookingEvent::FlightSelected)?;
    let selected = context
        .flight
        .search_results
        .iter()
        .find(|result| result.flight_id.eq_ignore_ascii_case(flight_id))
        .cloned()
        .ok_or_else(|| BookingTransitionError::UnknownFlight { flight_id: flight_id.to_string() })?;

    context.flight.booking_status = change.to;
    context.booking.selected_flight_id = Some(selected.flight_id.clone());
    context.booking.confirmation_reference = None;
    context.touch();

    info!(
        event_name = "booking.flight_selected",
        conversation_id = %context.conversation_id,
        flight_id = %selected.flight_id,
        "flight selected"
    );
    Ok(selected)
}

pub fn confirm_booking(
    context: &mut TripContext,
    reference: &str,
) -> Result<StatusChange, BookingTransitionError> {
    let reference = reference.trim();
    let change = transition(context.flight.booking_status, BookingEvent::BookingConfirmed)?;
    if reference.is_empty() {
        return Err(BookingTransitionError::MissingReference);
    }

    context.flight.booking_status = change.to;
    context.booking.confirmation_reference = Some(reference.to_string());
    context.touch();

    info!(
        event_name = "booking.confirmed",
        conversation_id = %context.conversation_id,
        confirmation_reference = reference,
        "booking confirmed"
    );
    Ok(change)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    use super::{
        confirm_booking, select_flight, transition, BookingEvent, BookingTransitionError,
    };
    use crate::domain::flight::{
        Airline, Baggage, BookingStatus, FlightEndpoint, Money, SearchResult,
    };
    use crate::domain::trip::{ConversationId, TripContext};

    fn result(id: &str) -> SearchResult {
        let time = NaiveDate::from_ymd_opt(2026, 3, 1)
            .and_then(|date| date.and_hms_opt(7, 30, 0))
            .expect("valid time");
        SearchResult {
            flight_id: id.to_string(),
            airline: Airline { code: "6E".to_string(), name: "IndiGo".to_string() },
            departure: FlightEndpoint { airport: "BOM".to_string(), time, terminal: None },
            arrival: FlightEndpoint { airport: "GOI".to_string(), time, terminal: None },
            duration_minutes: 75,
            stops: 0,
            price: Money { amount: Decimal::from(4200), currency: "INR".to_string() },
            baggage: Baggage { cabin_kg: 7, checked_kg: 15 },
            refundable: false,
            rank_label: "Recommended 1".to_string(),
        }
    }

    fn context_with_results() -> TripContext {
        let mut context = TripContext::new(ConversationId("conv-booking".to_string()));
        context.flight.search_results = vec![result("6E201-20260301"), result("AI655-20260301")];
        context.flight.booking_status = BookingStatus::ResultsShown;
        context
    }

    #[test]
    fn search_cycle_follows_the_documented_path() {
        let searching = transition(BookingStatus::Pending, BookingEvent::SearchStarted)
            .expect("pending -> searching");
        assert_eq!(searching.to, BookingStatus::Searching);

        let shown = transition(searching.to, BookingEvent::ResultsReceived)
            .expect("searching -> results_shown");
        assert_eq!(shown.to, BookingStatus::ResultsShown);

        let failed = transition(BookingStatus::Searching, BookingEvent::SearchFailed)
            .expect("searching -> pending");
        assert_eq!(failed.to, BookingStatus::Pending);

        let again = transition(BookingStatus::Selected, BookingEvent::SearchStarted)
            .expect("selected -> searching");
        assert_eq!(again.to, BookingStatus::Searching);
    }

    #[test]
    fn confirmed_is_terminal() {
        for event in [
            BookingEvent::SearchStarted,
            BookingEvent::ResultsReceived,
            BookingEvent::SearchFailed,
            BookingEvent::FlightSelected,
            BookingEvent::BookingConfirmed,
        ] {
            let error = transition(BookingStatus::Confirmed, event)
                .expect_err("confirmed accepts no further events");
            assert_eq!(
                error,
                BookingTransitionError::InvalidTransition { state: BookingStatus::Confirmed, event }
            );
        }
    }

    #[test]
    fn skipping_states_is_rejected() {
        let error = transition(BookingStatus::Pending, BookingEvent::FlightSelected)
            .expect_err("nothing to select before results are shown");
        assert_eq!(
            error.to_string(),
            "cannot apply flight_selected while booking is pending"
        );
        assert!(transition(BookingStatus::ResultsShown, BookingEvent::BookingConfirmed).is_err());
    }

    #[test]
    fn selecting_a_shown_flight_records_it() {
        let mut context = context_with_results();
        let selected = select_flight(&mut context, " ai655-20260301 ").expect("known flight");

        assert_eq!(selected.flight_id, "AI655-20260301");
        assert_eq!(context.flight.booking_status, BookingStatus::Selected);
        assert_eq!(context.booking.selected_flight_id.as_deref(), Some("AI655-20260301"));

        select_flight(&mut context, "6E201-20260301").expect("re-selection is allowed");
        assert_eq!(context.booking.selected_flight_id.as_deref(), Some("6E201-20260301"));
    }

    #[test]
    fn unknown_flight_leaves_context_untouched() {
        let mut context = context_with_results();
        let before = context.clone();

        let error = select_flight(&mut context, "EK500-20260301").expect_err("not in results");
        assert_eq!(
            error,
            BookingTransitionError::UnknownFlight { flight_id: "EK500-20260301".to_string() }
        );
        assert_eq!(context, before);
    }

    #[test]
    fn confirmation_requires_a_selection_and_a_reference() {
        let mut context = context_with_results();
        assert!(confirm_booking(&mut context, "PNR123").is_err());

        select_flight(&mut context, "6E201-20260301").expect("known flight");
        assert_eq!(
            confirm_booking(&mut context, "  "),
            Err(BookingTransitionError::MissingReference)
        );

        let change = confirm_booking(&mut context, "PNR123").expect("selected -> confirmed");
        assert_eq!(change.to, BookingStatus::Confirmed);
        assert_eq!(context.booking.confirmation_reference.as_deref(), Some("PNR123"));
    }
}
