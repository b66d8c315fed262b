//! Slot merge engine.
//!
//! Partial updates are folded into copies of the summary and flight sub-objects. A
//! field that is absent from the update never erases a known value.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::domain::flight::{CabinClass, FlightSearchState, TripType};
use crate::domain::summary::{Budget, Place, Summary};

/// Caller-supplied airport details for one side of the trip.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AirportHint {
    pub iata: Option<String>,
    pub name: Option<String>,
    pub distance_km: Option<f64>,
}

impl AirportHint {
    pub fn is_empty(&self) -> bool {
        self.iata.is_none() && self.name.is_none() && self.distance_km.is_none()
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SlotUpdate {
    pub origin: Option<String>,
    pub origin_hint: AirportHint,
    pub destination: Option<String>,
    pub destination_hint: AirportHint,
    pub outbound_date: Option<NaiveDate>,
    pub return_date: Option<NaiveDate>,
    pub duration_days: Option<u32>,
    pub adults: Option<u32>,
    pub seniors: Option<u32>,
    pub children: Option<u32>,
    pub children_ages: Option<Vec<u32>>,
    pub seat_infants: Option<u32>,
    pub lap_infants: Option<u32>,
    pub cabin_class: Option<CabinClass>,
    pub trip_type: Option<TripType>,
    pub direct_only: Option<bool>,
    pub preferred_airlines: Option<Vec<String>>,
    pub budget: Option<Budget>,
    pub trip_types: Option<Vec<String>>,
    pub places_of_interest: Option<Vec<String>>,
    pub suggested_questions: Option<Vec<String>>,
}

/// Which field groups a turn touched.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangedGroups {
    pub summary: bool,
    pub flight: bool,
}

impl ChangedGroups {
    pub fn any(&self) -> bool {
        self.summary || self.flight
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct MergeOutcome {
    pub summary: Summary,
    pub flight: FlightSearchState,
    pub changes: ChangedGroups,
}

pub fn merge_slots(
    previous_summary: &Summary,
    previous_flight: &FlightSearchState,
    update: &SlotUpdate,
) -> MergeOutcome {
    let mut summary = previous_summary.clone();
    let mut flight = previous_flight.clone();

    if let Some(city) = present_text(update.origin.as_deref()) {
        if !summary.origin.as_ref().is_some_and(|place| place.same_city(city)) {
            summary.origin = Some(Place::named(city));
            flight.resolved_origin = None;
        }
    }
    if let Some(city) = present_text(update.destination.as_deref()) {
        if !summary.destination.as_ref().is_some_and(|place| place.same_city(city)) {
            summary.destination = Some(Place::named(city));
            flight.resolved_destination = None;
        }
    }

    overwrite_optional(&mut summary.outbound_date, update.outbound_date);
    overwrite_optional(&mut summary.return_date, update.return_date);
    overwrite_optional(&mut summary.duration_days, update.duration_days);
    if let (Some(outbound), Some(days)) = (summary.outbound_date, summary.duration_days) {
        summary.return_date = Some(outbound + Duration::days(i64::from(days)));
    }

    merge_passengers(&mut summary, update);

    overwrite_optional(&mut summary.budget, update.budget.clone());
    if let Some(tags) = &update.trip_types {
        summary.trip_types = tags.clone();
    }
    if let Some(places) = &update.places_of_interest {
        summary.places_of_interest = places.clone();
    }
    if let Some(questions) = &update.suggested_questions {
        summary.suggested_questions = questions.clone();
    }

    match update.trip_type {
        Some(trip_type) => flight.trip_type = trip_type,
        None => {
            let return_changed = summary.return_date != previous_summary.return_date;
            if return_changed && summary.return_date.is_some() {
                flight.trip_type = TripType::Roundtrip;
            }
        }
    }
    overwrite(&mut flight.cabin_class, update.cabin_class);
    overwrite(&mut flight.direct_only, update.direct_only);
    if let Some(airlines) = &update.preferred_airlines {
        flight.preferred_airlines = normalize_airlines(airlines);
    }

    let changes = ChangedGroups {
        summary: &summary != previous_summary,
        flight: &flight != previous_flight,
    };

    MergeOutcome { summary, flight, changes }
}

fn merge_passengers(summary: &mut Summary, update: &SlotUpdate) {
    let passengers = &mut summary.passengers;
    overwrite(&mut passengers.adults, update.adults);
    overwrite(&mut passengers.seniors, update.seniors);
    overwrite(&mut passengers.seat_infants, update.seat_infants);
    overwrite(&mut passengers.lap_infants, update.lap_infants);
    overwrite(&mut passengers.children, update.children);

    match &update.children_ages {
        Some(ages) => passengers.children_ages = ages.clone(),
        // An explicit "no children" also drops the ages that described them.
        None if update.children == Some(0) => passengers.children_ages.clear(),
        None => {}
    }
}

fn overwrite<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}

fn overwrite_optional<T>(slot: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *slot = value;
    }
}

fn present_text(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|text| !text.is_empty())
}

/// Trimmed, upper-cased, de-duplicated airline codes in first-seen order.
pub fn normalize_airlines(airlines: &[String]) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::with_capacity(airlines.len());
    for airline in airlines {
        let code = airline.trim().to_ascii_uppercase();
        if !code.is_empty() && !normalized.contains(&code) {
            normalized.push(code);
        }
    }
    normalized
}
