pub mod labeling;
pub mod stub;

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use crate::domain::flight::{CabinClass, ResolvedAirport, SearchResult, TripType};
use crate::domain::summary::PassengerBreakdown;

pub use labeling::{label_results, rank_label, RECOMMENDED_COUNT};
pub use stub::{StubFlightProvider, StubProviderConfig};

/// A fully resolved and validated search, ready for a provider.
#[derive(Clone, Debug, PartialEq)]
pub struct FlightSearchRequest {
    pub origin: ResolvedAirport,
    pub destination: ResolvedAirport,
    pub outbound_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
    pub trip_type: TripType,
    pub cabin_class: CabinClass,
    pub direct_only: bool,
    pub preferred_airlines: Vec<String>,
    pub passengers: PassengerBreakdown,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ProviderResponse {
    pub results: Vec<SearchResult>,
    pub deep_link: String,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ProviderError {
    #[error("flight search provider unavailable: {0}")]
    Unavailable(String),
    #[error("flight search provider timed out after {after_secs}s")]
    Timeout { after_secs: u64 },
    #[error("flight search provider returned an invalid response: {0}")]
    InvalidResponse(String),
}

#[async_trait]
pub trait FlightSearchProvider: Send + Sync {
    fn name(&self) -> &'static str;
    async fn search(&self, request: &FlightSearchRequest) -> Result<ProviderResponse, ProviderError>;
}
