use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TripType {
    #[default]
    Oneway,
    Roundtrip,
}

impl TripType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Oneway => "oneway",
            Self::Roundtrip => "roundtrip",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().replace(['-', '_', ' '], "").as_str() {
            "oneway" => Some(Self::Oneway),
            "roundtrip" | "return" => Some(Self::Roundtrip),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CabinClass {
    #[default]
    Economy,
    PremiumEconomy,
    Business,
    First,
}

impl CabinClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Economy => "economy",
            Self::PremiumEconomy => "premium_economy",
            Self::Business => "business",
            Self::First => "first",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
            "economy" => Some(Self::Economy),
            "premium_economy" => Some(Self::PremiumEconomy),
            "business" => Some(Self::Business),
            "first" => Some(Self::First),
            _ => None,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Economy => "Economy",
            Self::PremiumEconomy => "Premium Economy",
            Self::Business => "Business",
            Self::First => "First",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    #[default]
    Pending,
    Searching,
    ResultsShown,
    Selected,
    Confirmed,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Searching => "searching",
            Self::ResultsShown => "results_shown",
            Self::Selected => "selected",
            Self::Confirmed => "confirmed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "searching" => Some(Self::Searching),
            "results_shown" => Some(Self::ResultsShown),
            "selected" => Some(Self::Selected),
            "confirmed" => Some(Self::Confirmed),
            _ => None,
        }
    }
}

/// An airport that came out of a successful resolver lookup.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedAirport {
    pub city: String,
    pub iata: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SearchSignature(pub String);

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Airline {
    pub code: String,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlightEndpoint {
    pub airport: String,
    pub time: NaiveDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terminal: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    pub amount: Decimal,
    pub currency: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Baggage {
    pub cabin_kg: u32,
    pub checked_kg: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub flight_id: String,
    pub airline: Airline,
    pub departure: FlightEndpoint,
    pub arrival: FlightEndpoint,
    pub duration_minutes: u32,
    pub stops: u32,
    pub price: Money,
    pub baggage: Baggage,
    pub refundable: bool,
    #[serde(default)]
    pub rank_label: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FlightSearchState {
    pub trip_type: TripType,
    pub cabin_class: CabinClass,
    pub direct_only: bool,
    pub preferred_airlines: Vec<String>,
    pub resolved_origin: Option<ResolvedAirport>,
    pub resolved_destination: Option<ResolvedAirport>,
    pub last_search_signature: Option<SearchSignature>,
    pub search_results: Vec<SearchResult>,
    pub deep_link: Option<String>,
    pub booking_status: BookingStatus,
}
