//! Flight-search turn orchestration.
//!
//! Each call merges its arguments into a staged copy of the trip context, resolves
//! airports, validates dates and passengers, short-circuits unchanged repeat requests and
//! finally calls the provider. What gets written back depends on how the turn ended; see
//! [`FlightSearchError::commits_slots`].

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::airports::CityToAirportResolver;
use crate::booking::{transition, BookingEvent};
use crate::dates::{check_ordering, check_window, validate_outbound, validate_return, DateSlot};
use crate::domain::flight::{
    BookingStatus, CabinClass, FlightSearchState, ResolvedAirport, SearchResult,
    SearchSignature, TripType,
};
use crate::domain::summary::{Budget, Summary};
use crate::domain::trip::{TripBooking, TripContext};
use crate::errors::{FlightSearchError, MissingField, TripSide};
use crate::merge::{merge_slots, AirportHint, ChangedGroups, SlotUpdate};
use crate::passengers::validate_passengers;
use crate::search::{label_results, FlightSearchProvider, FlightSearchRequest};
use crate::signature::signature_for;

/// Arguments of the `flight_search` tool. Every field is optional.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FlightSearchArgs {
    pub origin: Option<String>,
    pub origin_iata: Option<String>,
    pub origin_airport_name: Option<String>,
    pub origin_distance_km: Option<f64>,
    pub destination: Option<String>,
    pub destination_iata: Option<String>,
    pub destination_airport_name: Option<String>,
    pub destination_distance_km: Option<f64>,
    pub outbound_date: Option<String>,
    pub return_date: Option<String>,
    pub adults: Option<u32>,
    pub seniors: Option<u32>,
    pub children: Option<u32>,
    pub children_ages: Option<Vec<u32>>,
    pub seat_infants: Option<u32>,
    pub lap_infants: Option<u32>,
    pub cabin_class: Option<String>,
    pub trip_type: Option<String>,
    pub direct_flight_only: Option<bool>,
    pub preferred_airlines: Option<Vec<String>>,
}

impl FlightSearchArgs {
    /// Converts the raw arguments, validating any supplied date strings on the way.
    pub fn to_slot_update(&self, today: NaiveDate) -> Result<SlotUpdate, FlightSearchError> {
        let (outbound_date, return_date) =
            parse_dates(self.outbound_date.as_deref(), self.return_date.as_deref(), today)?;

        Ok(SlotUpdate {
            origin: self.origin.clone(),
            origin_hint: AirportHint {
                iata: self.origin_iata.clone(),
                name: self.origin_airport_name.clone(),
                distance_km: self.origin_distance_km,
            },
            destination: self.destination.clone(),
            destination_hint: AirportHint {
                iata: self.destination_iata.clone(),
                name: self.destination_airport_name.clone(),
                distance_km: self.destination_distance_km,
            },
            outbound_date,
            return_date,
            adults: self.adults,
            seniors: self.seniors,
            children: self.children,
            children_ages: self.children_ages.clone(),
            seat_infants: self.seat_infants,
            lap_infants: self.lap_infants,
            cabin_class: parse_loose("cabinClass", self.cabin_class.as_deref(), CabinClass::parse),
            trip_type: parse_loose("tripType", self.trip_type.as_deref(), TripType::parse),
            direct_only: self.direct_flight_only,
            preferred_airlines: self.preferred_airlines.clone(),
            ..SlotUpdate::default()
        })
    }
}

/// Arguments of the `update_summary` tool.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateSummaryArgs {
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub outbound_date: Option<String>,
    pub return_date: Option<String>,
    pub duration_days: Option<u32>,
    pub adults: Option<u32>,
    pub seniors: Option<u32>,
    pub children: Option<u32>,
    pub children_ages: Option<Vec<u32>>,
    pub seat_infants: Option<u32>,
    pub lap_infants: Option<u32>,
    pub budget: Option<Budget>,
    pub trip_types: Option<Vec<String>>,
    pub places_of_interest: Option<Vec<String>>,
    pub suggested_questions: Option<Vec<String>>,
}

impl UpdateSummaryArgs {
    pub fn to_slot_update(&self, today: NaiveDate) -> Result<SlotUpdate, FlightSearchError> {
        let (outbound_date, return_date) =
            parse_dates(self.outbound_date.as_deref(), self.return_date.as_deref(), today)?;

        Ok(SlotUpdate {
            origin: self.origin.clone(),
            destination: self.destination.clone(),
            outbound_date,
            return_date,
            duration_days: self.duration_days,
            adults: self.adults,
            seniors: self.seniors,
            children: self.children,
            children_ages: self.children_ages.clone(),
            seat_infants: self.seat_infants,
            lap_infants: self.lap_infants,
            budget: self.budget.clone(),
            trip_types: self.trip_types.clone(),
            places_of_interest: self.places_of_interest.clone(),
            suggested_questions: self.suggested_questions.clone(),
            ..SlotUpdate::default()
        })
    }
}

/// Payload of a search that reached the provider and came back with results.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchSummary {
    pub request: FlightSearchRequest,
    pub signature: SearchSignature,
    pub results: Vec<SearchResult>,
    pub deep_link: String,
    pub changes: ChangedGroups,
}

pub struct FlightSearchService<R, P> {
    resolver: R,
    provider: P,
}

impl<R, P> FlightSearchService<R, P>
where
    R: CityToAirportResolver,
    P: FlightSearchProvider,
{
    pub fn new(resolver: R, provider: P) -> Self {
        Self { resolver, provider }
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub async fn search(
        &self,
        context: &mut TripContext,
        args: &FlightSearchArgs,
        today: NaiveDate,
    ) -> Result<SearchSummary, FlightSearchError> {
        let result = self.run(context, args, today).await;
        if let Err(error) = &result {
            debug!(
                event_name = "flight_search.rejected",
                conversation_id = %context.conversation_id,
                error_kind = error.kind(),
                committed = error.commits_slots(),
                "flight search stopped before new results"
            );
        }
        result
    }

    async fn run(
        &self,
        context: &mut TripContext,
        args: &FlightSearchArgs,
        today: NaiveDate,
    ) -> Result<SearchSummary, FlightSearchError> {
        let update = args.to_slot_update(today)?;
        let merged = merge_slots(&context.summary, &context.flight, &update);
        let mut summary = merged.summary;
        let mut flight = merged.flight;

        self.resolve_side(TripSide::Origin, &mut summary, &mut flight, &update.origin_hint)?;
        self.resolve_side(
            TripSide::Destination,
            &mut summary,
            &mut flight,
            &update.destination_hint,
        )?;
        check_merged_dates(&summary, today)?;
        validate_passengers(&summary.passengers)?;

        let request = match build_request(&summary, &flight) {
            Ok(request) => request,
            Err(fields) => {
                commit(context, summary, flight);
                return Err(FlightSearchError::MissingRequiredField { fields });
            }
        };

        let signature = signature_for(&request);
        let results_on_screen =
            matches!(flight.booking_status, BookingStatus::ResultsShown | BookingStatus::Selected);
        if results_on_screen
            && flight.last_search_signature.as_ref() == Some(&signature)
            && !flight.search_results.is_empty()
        {
            commit(context, summary, flight);
            return Err(FlightSearchError::DuplicateRequest);
        }

        flight.booking_status =
            transition(flight.booking_status, BookingEvent::SearchStarted)?.to;
        info!(
            event_name = "flight_search.started",
            conversation_id = %context.conversation_id,
            provider = self.provider.name(),
            origin = %request.origin.iata,
            destination = %request.destination.iata,
            outbound_date = %request.outbound_date,
            "searching flights"
        );

        match self.provider.search(&request).await {
            Ok(response) => {
                flight.booking_status =
                    transition(flight.booking_status, BookingEvent::ResultsReceived)?.to;
                let results = label_results(response.results);
                flight.search_results = results.clone();
                flight.last_search_signature = Some(signature.clone());
                flight.deep_link = Some(response.deep_link.clone());

                let changes = ChangedGroups {
                    summary: summary != context.summary,
                    flight: flight != context.flight,
                };
                commit(context, summary, flight);
                context.booking = TripBooking::default();

                info!(
                    event_name = "flight_search.completed",
                    conversation_id = %context.conversation_id,
                    signature = %signature.0,
                    result_count = results.len(),
                    "flight search returned results"
                );
                Ok(SearchSummary {
                    request,
                    signature,
                    results,
                    deep_link: response.deep_link,
                    changes,
                })
            }
            Err(error) => {
                flight.booking_status =
                    transition(flight.booking_status, BookingEvent::SearchFailed)?.to;
                commit(context, summary, flight);
                warn!(
                    event_name = "flight_search.provider_failed",
                    conversation_id = %context.conversation_id,
                    provider = self.provider.name(),
                    error = %error,
                    "flight search provider failed"
                );
                Err(error.into())
            }
        }
    }

    /// Fills in the airport for one side unless it is already resolved and no new code
    /// hint arrived. A hinted code is used only when the resolver knows it.
    fn resolve_side(
        &self,
        side: TripSide,
        summary: &mut Summary,
        flight: &mut FlightSearchState,
        hint: &AirportHint,
    ) -> Result<(), FlightSearchError> {
        let (place, resolved) = match side {
            TripSide::Origin => (summary.origin.as_mut(), &mut flight.resolved_origin),
            TripSide::Destination => {
                (summary.destination.as_mut(), &mut flight.resolved_destination)
            }
        };
        let Some(place) = place else {
            return Ok(());
        };
        if resolved.is_some() && hint.is_empty() {
            return Ok(());
        }
        // Display details alone never move an already resolved side to another airport.
        if let (Some(existing), None) = (resolved.as_mut(), hint.iata.as_deref()) {
            if let Some(name) = &hint.name {
                existing.name = name.clone();
            }
            if hint.distance_km.is_some() {
                existing.distance_km = hint.distance_km;
            }
            return Ok(());
        }

        let hinted = hint.iata.as_deref().and_then(|code| self.resolver.lookup_code(code));
        let airport = match hinted {
            Some(airport) => airport,
            None => self
                .resolver
                .resolve(&place.city)
                .map_err(|source| FlightSearchError::UnsupportedLocation { side, source })?,
        };

        place.iata = Some(airport.iata.clone());
        *resolved = Some(ResolvedAirport {
            city: place.city.clone(),
            iata: airport.iata,
            name: hint.name.clone().unwrap_or(airport.name),
            distance_km: hint.distance_km,
        });
        Ok(())
    }
}

/// Merges an `update_summary` call. Never searches and never resolves airports.
pub fn update_summary(
    context: &mut TripContext,
    args: &UpdateSummaryArgs,
    today: NaiveDate,
) -> Result<ChangedGroups, FlightSearchError> {
    let update = args.to_slot_update(today)?;
    let merged = merge_slots(&context.summary, &context.flight, &update);
    check_merged_dates(&merged.summary, today)?;
    validate_passengers(&merged.summary.passengers)?;

    if merged.changes.any() {
        commit(context, merged.summary, merged.flight);
        debug!(
            event_name = "trip_summary.updated",
            conversation_id = %context.conversation_id,
            summary_changed = merged.changes.summary,
            flight_changed = merged.changes.flight,
            "trip summary updated"
        );
    }
    Ok(merged.changes)
}

/// Slots a search cannot run without, in prompt order.
pub fn missing_fields(summary: &Summary, flight: &FlightSearchState) -> Vec<MissingField> {
    let mut missing = Vec::new();
    if summary.origin.is_none() || flight.resolved_origin.is_none() {
        missing.push(MissingField::Origin);
    }
    if summary.destination.is_none() || flight.resolved_destination.is_none() {
        missing.push(MissingField::Destination);
    }
    if summary.outbound_date.is_none() {
        missing.push(MissingField::OutboundDate);
    }
    if flight.trip_type == TripType::Roundtrip && summary.return_date.is_none() {
        missing.push(MissingField::ReturnDate);
    }
    if summary.passengers.total() == 0 {
        missing.push(MissingField::Passengers);
    }
    missing
}

fn build_request(
    summary: &Summary,
    flight: &FlightSearchState,
) -> Result<FlightSearchRequest, Vec<MissingField>> {
    let missing = missing_fields(summary, flight);
    if !missing.is_empty() {
        return Err(missing);
    }
    let (Some(origin), Some(destination), Some(outbound_date)) =
        (flight.resolved_origin.clone(), flight.resolved_destination.clone(), summary.outbound_date)
    else {
        return Err(missing);
    };

    Ok(FlightSearchRequest {
        origin,
        destination,
        outbound_date,
        return_date: match flight.trip_type {
            TripType::Roundtrip => summary.return_date,
            TripType::Oneway => None,
        },
        trip_type: flight.trip_type,
        cabin_class: flight.cabin_class,
        direct_only: flight.direct_only,
        preferred_airlines: flight.preferred_airlines.clone(),
        passengers: summary.passengers.clone(),
    })
}

fn parse_dates(
    outbound: Option<&str>,
    return_date: Option<&str>,
    today: NaiveDate,
) -> Result<(Option<NaiveDate>, Option<NaiveDate>), FlightSearchError> {
    let outbound = outbound
        .filter(|value| !value.trim().is_empty())
        .map(|value| validate_outbound(value, today))
        .transpose()?;
    // Ordering is checked after the merge, against whichever outbound date wins.
    let return_date = return_date
        .filter(|value| !value.trim().is_empty())
        .map(|value| validate_return(value, None, today))
        .transpose()?;
    Ok((outbound, return_date))
}

fn check_merged_dates(summary: &Summary, today: NaiveDate) -> Result<(), FlightSearchError> {
    if let Some(outbound) = summary.outbound_date {
        check_window(DateSlot::Outbound, outbound, today)?;
    }
    if let Some(return_date) = summary.return_date {
        check_window(DateSlot::Return, return_date, today)?;
        if let Some(outbound) = summary.outbound_date {
            check_ordering(outbound, return_date)?;
        }
    }
    Ok(())
}

fn parse_loose<T>(field: &str, value: Option<&str>, parse: fn(&str) -> Option<T>) -> Option<T> {
    let value = value.filter(|value| !value.trim().is_empty())?;
    let parsed = parse(value);
    if parsed.is_none() {
        warn!(event_name = "flight_search.argument_ignored", field, value, "unrecognised value");
    }
    parsed
}

fn commit(context: &mut TripContext, summary: Summary, flight: FlightSearchState) {
    context.summary = summary;
    context.flight = flight;
    context.touch();
}
