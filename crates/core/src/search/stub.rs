use async_trait::async_trait;
use chrono::Duration;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;

use crate::domain::flight::{
    Airline, Baggage, CabinClass, FlightEndpoint, Money, SearchResult, TripType,
};
use crate::search::{FlightSearchProvider, FlightSearchRequest, ProviderError, ProviderResponse};
use crate::signature::signature_for;

const CARRIERS: &[(&str, &str)] = &[
    ("AI", "Air India"),
    ("6E", "IndiGo"),
    ("EK", "Emirates"),
    ("QR", "Qatar Airways"),
    ("SQ", "Singapore Airlines"),
    ("EY", "Etihad Airways"),
    ("TG", "Thai Airways"),
    ("BA", "British Airways"),
    ("LH", "Lufthansa"),
];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StubProviderConfig {
    pub result_limit: usize,
    pub currency: String,
    pub deep_link_base_url: String,
}

impl Default for StubProviderConfig {
    fn default() -> Self {
        Self {
            result_limit: 5,
            currency: "INR".to_string(),
            deep_link_base_url: "https://flights.example.com/search".to_string(),
        }
    }
}

/// Stand-in for a real inventory integration.
///
/// Results are generated from a generator seeded with the request signature, so the
/// same request always yields the same flights.
#[derive(Clone, Debug, Default)]
pub struct StubFlightProvider {
    config: StubProviderConfig,
}

impl StubFlightProvider {
    pub fn new(config: StubProviderConfig) -> Self {
        Self { config }
    }

    fn generate(&self, request: &FlightSearchRequest) -> Vec<SearchResult> {
        let mut rng = StdRng::seed_from_u64(seed_for(request));
        let carriers = carriers_for(&request.preferred_airlines);
        let passenger_pct = passenger_fare_pct(request);

        (0..self.config.result_limit)
            .map(|index| {
                let (code, name) = &carriers[index % carriers.len()];
                let stops = if request.direct_only {
                    0
                } else {
                    match rng.gen_range(0..10) {
                        0..=5 => 0,
                        6..=8 => 1,
                        _ => 2,
                    }
                };

                let departure_time = request
                    .outbound_date
                    .and_hms_opt(rng.gen_range(0..24), 15 * rng.gen_range(0..4), 0)
                    .unwrap_or_default();
                let duration_minutes =
                    rng.gen_range(90..=540) + stops * rng.gen_range(60..=180);
                let arrival_time =
                    departure_time + Duration::minutes(i64::from(duration_minutes));

                let base_fare: i64 = rng.gen_range(3_500..=45_000);
                let amount = base_fare * cabin_fare_pct(request.cabin_class) / 100
                    * passenger_pct
                    / 100;

                SearchResult {
                    // Trailing digits are the result position, so ids never repeat.
                    flight_id: format!(
                        "{code}{}{:02}-{}",
                        rng.gen_range(1..=9),
                        index + 1,
                        request.outbound_date.format("%Y%m%d")
                    ),
                    airline: Airline { code: code.clone(), name: name.clone() },
                    departure: FlightEndpoint {
                        airport: request.origin.iata.clone(),
                        time: departure_time,
                        terminal: Some(format!("T{}", rng.gen_range(1..=3))),
                    },
                    arrival: FlightEndpoint {
                        airport: request.destination.iata.clone(),
                        time: arrival_time,
                        terminal: Some(format!("T{}", rng.gen_range(1..=3))),
                    },
                    duration_minutes,
                    stops,
                    price: Money {
                        amount: Decimal::from(amount),
                        currency: self.config.currency.clone(),
                    },
                    baggage: Baggage {
                        cabin_kg: 7,
                        checked_kg: checked_allowance_kg(request.cabin_class),
                    },
                    refundable: matches!(request.cabin_class, CabinClass::Business | CabinClass::First)
                        || rng.gen_bool(0.3),
                    rank_label: String::new(),
                }
            })
            .collect()
    }

    fn deep_link(&self, request: &FlightSearchRequest) -> String {
        let mut path = format!(
            "{}/{}-{}/{}",
            self.config.deep_link_base_url.trim_end_matches('/'),
            request.origin.iata,
            request.destination.iata,
            request.outbound_date
        );
        if let (TripType::Roundtrip, Some(return_date)) = (request.trip_type, request.return_date) {
            path.push_str(&format!("/{return_date}"));
        }

        let passengers = &request.passengers;
        format!(
            "{path}?adults={}&seniors={}&children={}&seatInfants={}&lapInfants={}&cabin={}&direct={}",
            passengers.adults,
            passengers.seniors,
            passengers.children,
            passengers.seat_infants,
            passengers.lap_infants,
            request.cabin_class.as_str(),
            request.direct_only
        )
    }
}

#[async_trait]
impl FlightSearchProvider for StubFlightProvider {
    fn name(&self) -> &'static str {
        "stub"
    }

    async fn search(&self, request: &FlightSearchRequest) -> Result<ProviderResponse, ProviderError> {
        Ok(ProviderResponse { results: self.generate(request), deep_link: self.deep_link(request) })
    }
}

fn seed_for(request: &FlightSearchRequest) -> u64 {
    let signature = signature_for(request);
    signature.0.get(..16).and_then(|prefix| u64::from_str_radix(prefix, 16).ok()).unwrap_or(0)
}

fn carriers_for(preferred: &[String]) -> Vec<(String, String)> {
    if preferred.is_empty() {
        return CARRIERS.iter().map(|(code, name)| (code.to_string(), name.to_string())).collect();
    }

    preferred
        .iter()
        .map(|code| {
            let name = CARRIERS
                .iter()
                .find(|(known, _)| known == code)
                .map(|(_, name)| name.to_string())
                .unwrap_or_else(|| code.clone());
            (code.clone(), name)
        })
        .collect()
}

fn cabin_fare_pct(cabin: CabinClass) -> i64 {
    match cabin {
        CabinClass::Economy => 100,
        CabinClass::PremiumEconomy => 160,
        CabinClass::Business => 320,
        CabinClass::First => 550,
    }
}

fn checked_allowance_kg(cabin: CabinClass) -> u32 {
    match cabin {
        CabinClass::Economy => 15,
        CabinClass::PremiumEconomy => 25,
        CabinClass::Business => 35,
        CabinClass::First => 40,
    }
}

/// Whole-group fare as a percentage of one adult fare.
fn passenger_fare_pct(request: &FlightSearchRequest) -> i64 {
    let passengers = &request.passengers;
    let full = i64::from(passengers.adults + passengers.seniors) * 100;
    let reduced = i64::from(passengers.children + passengers.seat_infants) * 75;
    let lap = i64::from(passengers.lap_infants) * 10;
    full + reduced + lap
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use chrono::NaiveDate;

    use super::{StubFlightProvider, StubProviderConfig};
    use crate::domain::flight::{CabinClass, ResolvedAirport, TripType};
    use crate::domain::summary::PassengerBreakdown;
    use crate::search::{FlightSearchProvider, FlightSearchRequest};

    fn airport(iata: &str) -> ResolvedAirport {
        ResolvedAirport {
            city: iata.to_string(),
            iata: iata.to_string(),
            name: format!("{iata} Airport"),
            distance_km: None,
        }
    }

    fn request() -> FlightSearchRequest {
        FlightSearchRequest {
            origin: airport("BOM"),
            destination: airport("DXB"),
            outbound_date: NaiveDate::from_ymd_opt(2026, 3, 1).expect("valid date"),
            return_date: NaiveDate::from_ymd_opt(2026, 3, 6),
            trip_type: TripType::Roundtrip,
            cabin_class: CabinClass::Economy,
            direct_only: false,
            preferred_airlines: Vec::new(),
            passengers: PassengerBreakdown::default(),
        }
    }

    #[tokio::test]
    async fn same_request_yields_same_results() {
        let provider = StubFlightProvider::default();
        let first = provider.search(&request()).await.expect("stub never fails");
        let second = provider.search(&request()).await.expect("stub never fails");

        assert_eq!(first, second);
        assert_eq!(first.results.len(), 5);
        assert!(first.results.iter().all(|result| result.departure.airport == "BOM"));
        assert!(first.results.iter().all(|result| result.arrival.time > result.departure.time));
    }

    #[tokio::test]
    async fn direct_only_and_preferred_airlines_are_honoured() {
        let provider = StubFlightProvider::new(StubProviderConfig {
            result_limit: 4,
            ..StubProviderConfig::default()
        });
        let mut request = request();
        request.direct_only = true;
        request.preferred_airlines = vec!["EK".to_string(), "ZZ".to_string()];

        let response = provider.search(&request).await.expect("stub never fails");

        assert_eq!(response.results.len(), 4);
        assert!(response.results.iter().all(|result| result.stops == 0));
        assert!(response
            .results
            .iter()
            .all(|result| ["EK", "ZZ"].contains(&result.airline.code.as_str())));
        assert!(response.results.iter().any(|result| result.airline.name == "Emirates"));
    }

    #[tokio::test]
    async fn flight_ids_stay_unique_for_a_single_carrier() {
        let provider = StubFlightProvider::new(StubProviderConfig {
            result_limit: 20,
            ..StubProviderConfig::default()
        });
        let mut request = request();
        request.preferred_airlines = vec!["EK".to_string()];

        let response = provider.search(&request).await.expect("stub never fails");
        let ids: HashSet<&str> =
            response.results.iter().map(|result| result.flight_id.as_str()).collect();

        assert_eq!(response.results.len(), 20);
        assert_eq!(ids.len(), 20);
        assert!(ids.iter().all(|id| id.starts_with("EK") && id.ends_with("-20260301")));
    }

    #[tokio::test]
    async fn deep_link_carries_route_dates_and_party() {
        let provider = StubFlightProvider::default();
        let response = provider.search(&request()).await.expect("stub never fails");

        assert_eq!(
            response.deep_link,
            "https://flights.example.com/search/BOM-DXB/2026-03-01/2026-03-06?adults=1&seniors=0\
             &children=0&seatInfants=0&lapInfants=0&cabin=economy&direct=false"
        );
    }

    #[tokio::test]
    async fn fares_use_configured_currency_and_cabin_allowance() {
        let provider = StubFlightProvider::default();
        let mut request = request();
        let economy = provider.search(&request).await.expect("stub never fails");
        assert!(economy.results.iter().all(|result| result.price.currency == "INR"));
        assert!(economy.results.iter().all(|result| result.baggage.checked_kg == 15));

        request.cabin_class = CabinClass::Business;
        let business = provider.search(&request).await.expect("stub never fails");
        assert!(business.results.iter().all(|result| result.baggage.checked_kg == 35));
        assert!(business.results.iter().all(|result| result.refundable));
    }
}
