use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::flight::{CabinClass, SearchSignature, TripType};
use crate::domain::summary::PassengerBreakdown;
use crate::search::FlightSearchRequest;

/// Fixed field order; serde emits struct fields in declaration order.
#[derive(Serialize)]
struct CanonicalRequest<'a> {
    origin: &'a str,
    destination: &'a str,
    outbound_date: NaiveDate,
    return_date: Option<NaiveDate>,
    trip_type: TripType,
    cabin_class: CabinClass,
    direct_only: bool,
    preferred_airlines: Vec<&'a str>,
    passengers: &'a PassengerBreakdown,
}

/// Canonical encoding of a resolved request, before hashing.
pub fn canonical_key(request: &FlightSearchRequest) -> String {
    let mut preferred_airlines =
        request.preferred_airlines.iter().map(String::as_str).collect::<Vec<_>>();
    preferred_airlines.sort_unstable();
    preferred_airlines.dedup();

    let canonical = CanonicalRequest {
        origin: &request.origin.iata,
        destination: &request.destination.iata,
        outbound_date: request.outbound_date,
        return_date: match request.trip_type {
            TripType::Roundtrip => request.return_date,
            TripType::Oneway => None,
        },
        trip_type: request.trip_type,
        cabin_class: request.cabin_class,
        direct_only: request.direct_only,
        preferred_airlines,
        passengers: &request.passengers,
    };

    // Plain structs of strings, dates, enums and integers always serialize.
    serde_json::to_string(&canonical).unwrap_or_default()
}

pub fn signature_for(request: &FlightSearchRequest) -> SearchSignature {
    let key = canonical_key(request);
    SearchSignature(blake3::hash(key.as_bytes()).to_hex().to_string())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{canonical_key, signature_for};
    use crate::domain::flight::{CabinClass, ResolvedAirport, TripType};
    use crate::domain::summary::PassengerBreakdown;
    use crate::search::FlightSearchRequest;

    fn airport(iata: &str) -> ResolvedAirport {
        ResolvedAirport {
            city: iata.to_string(),
            iata: iata.to_string(),
            name: format!("{iata} International"),
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
            preferred_airlines: vec!["EK".to_string(), "AI".to_string()],
            passengers: PassengerBreakdown::default(),
        }
    }

    #[test]
    fn identical_requests_share_a_signature() {
        assert_eq!(signature_for(&request()), signature_for(&request()));
        assert_eq!(signature_for(&request()).0.len(), 64);
    }

    #[test]
    fn airline_order_does_not_matter() {
        let mut reordered = request();
        reordered.preferred_airlines.reverse();
        assert_eq!(signature_for(&reordered), signature_for(&request()));
    }

    #[test]
    fn display_only_fields_do_not_matter() {
        let mut renamed = request();
        renamed.origin.name = "Another display name".to_string();
        renamed.origin.distance_km = Some(12.5);
        assert_eq!(signature_for(&renamed), signature_for(&request()));
    }

    #[test]
    fn return_date_is_ignored_for_one_way_trips() {
        let mut oneway = request();
        oneway.trip_type = TripType::Oneway;
        let mut other = oneway.clone();
        other.return_date = NaiveDate::from_ymd_opt(2026, 3, 9);

        assert_eq!(signature_for(&oneway), signature_for(&other));
        assert!(canonical_key(&oneway).contains("\"return_date\":null"));
    }

    #[test]
    fn every_search_field_changes_the_signature() {
        let base = signature_for(&request());
        let mut variants = Vec::new();

        let mut changed = request();
        changed.destination = airport("SIN");
        variants.push(changed);
        let mut changed = request();
        changed.outbound_date = NaiveDate::from_ymd_opt(2026, 3, 2).expect("valid date");
        variants.push(changed);
        let mut changed = request();
        changed.cabin_class = CabinClass::Business;
        variants.push(changed);
        let mut changed = request();
        changed.direct_only = true;
        variants.push(changed);
        let mut changed = request();
        changed.passengers.adults = 2;
        variants.push(changed);
        let mut changed = request();
        changed.preferred_airlines.push("QR".to_string());
        variants.push(changed);

        for variant in variants {
            assert_ne!(signature_for(&variant), base, "{variant:?}");
        }
    }
}
