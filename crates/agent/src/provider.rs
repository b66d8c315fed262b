use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;
use tripline_core::search::{
    FlightSearchProvider, FlightSearchRequest, ProviderError, ProviderResponse,
};

/// Bounds every provider call by a fixed deadline.
pub struct TimeoutProvider<P> {
    inner: P,
    timeout: Duration,
}

impl<P> TimeoutProvider<P> {
    pub fn new(inner: P, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }
}

#[async_trait]
impl<P> FlightSearchProvider for TimeoutProvider<P>
where
    P: FlightSearchProvider,
{
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    async fn search(&self, request: &FlightSearchRequest) -> Result<ProviderResponse, ProviderError> {
        match tokio::time::timeout(self.timeout, self.inner.search(request)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    event_name = "flight_search.provider_timeout",
                    provider = self.inner.name(),
                    timeout_ms = self.timeout.as_millis() as u64,
                    "flight search provider exceeded its deadline"
                );
                Err(ProviderError::Timeout { after_secs: self.timeout.as_secs() })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;
    use chrono::NaiveDate;
    use tripline_core::domain::flight::{CabinClass, ResolvedAirport, TripType};
    use tripline_core::domain::summary::PassengerBreakdown;
    use tripline_core::search::{
        FlightSearchProvider, FlightSearchRequest, ProviderError, ProviderResponse,
        StubFlightProvider,
    };

    use super::TimeoutProvider;

    struct SlowProvider;

    #[async_trait]
    impl FlightSearchProvider for SlowProvider {
        fn name(&self) -> &'static str {
            "slow"
        }

        async fn search(
            &self,
            _request: &FlightSearchRequest,
        ) -> Result<ProviderResponse, ProviderError> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(ProviderResponse { results: Vec::new(), deep_link: String::new() })
        }
    }

    fn airport(city: &str, iata: &str) -> ResolvedAirport {
        ResolvedAirport {
            city: city.to_string(),
            iata: iata.to_string(),
            name: format!("{city} International"),
            distance_km: None,
        }
    }

    fn request() -> FlightSearchRequest {
        FlightSearchRequest {
            origin: airport("Mumbai", "BOM"),
            destination: airport("Dubai", "DXB"),
            outbound_date: NaiveDate::from_ymd_opt(2026, 3, 1).expect("valid date"),
            return_date: None,
            trip_type: TripType::Oneway,
            cabin_class: CabinClass::Economy,
            direct_only: false,
            preferred_airlines: Vec::new(),
            passengers: PassengerBreakdown::default(),
        }
    }

    #[tokio::test]
    async fn slow_providers_turn_into_timeouts() {
        let provider = TimeoutProvider::new(SlowProvider, Duration::from_millis(20));

        let error = provider.search(&request()).await.expect_err("deadline exceeded");
        assert_eq!(error, ProviderError::Timeout { after_secs: 0 });
        assert_eq!(provider.name(), "slow");
    }

    #[tokio::test]
    async fn fast_providers_pass_through() {
        let provider = TimeoutProvider::new(StubFlightProvider::default(), Duration::from_secs(5));

        let response = provider.search(&request()).await.expect("stub answers immediately");
        assert!(!response.results.is_empty());
        assert!(response.deep_link.contains("BOM-DXB"));
    }
}
