//! City to airport resolution.
//!
//! Resolution is an exact, case-insensitive lookup. A miss fails closed: the caller is
//! asked for a nearby served city rather than receiving a guessed code.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::summary::normalize_city;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Airport {
    pub iata: String,
    pub name: String,
    pub city: String,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("no served airport for `{city}`; ask for a different nearby city that has a major airport")]
pub struct AirportNotFound {
    pub city: String,
}

pub trait CityToAirportResolver: Send + Sync {
    fn resolve(&self, city: &str) -> Result<Airport, AirportNotFound>;

    /// Reverse lookup used to verify a caller-supplied code before trusting it.
    fn lookup_code(&self, iata: &str) -> Option<Airport>;
}

struct AirportEntry {
    cities: &'static [&'static str],
    iata: &'static str,
    name: &'static str,
}

const AIRPORTS: &[AirportEntry] = &[
    AirportEntry {
        cities: &["mumbai", "bombay"],
        iata: "BOM",
        name: "Chhatrapati Shivaji Maharaj International Airport",
    },
    AirportEntry {
        cities: &["delhi", "new delhi"],
        iata: "DEL",
        name: "Indira Gandhi International Airport",
    },
    AirportEntry {
        cities: &["bangalore", "bengaluru"],
        iata: "BLR",
        name: "Kempegowda International Airport",
    },
    AirportEntry { cities: &["chennai", "madras"], iata: "MAA", name: "Chennai International Airport" },
    AirportEntry {
        cities: &["kolkata", "calcutta"],
        iata: "CCU",
        name: "Netaji Subhas Chandra Bose International Airport",
    },
    AirportEntry {
        cities: &["hyderabad"],
        iata: "HYD",
        name: "Rajiv Gandhi International Airport",
    },
    AirportEntry { cities: &["pune"], iata: "PNQ", name: "Pune International Airport" },
    AirportEntry {
        cities: &["ahmedabad"],
        iata: "AMD",
        name: "Sardar Vallabhbhai Patel International Airport",
    },
    AirportEntry { cities: &["goa"], iata: "GOI", name: "Dabolim Airport" },
    AirportEntry {
        cities: &["kochi", "cochin"],
        iata: "COK",
        name: "Cochin International Airport",
    },
    AirportEntry { cities: &["jaipur"], iata: "JAI", name: "Jaipur International Airport" },
    AirportEntry {
        cities: &["lucknow"],
        iata: "LKO",
        name: "Chaudhary Charan Singh International Airport",
    },
    AirportEntry { cities: &["dubai"], iata: "DXB", name: "Dubai International Airport" },
    AirportEntry { cities: &["abu dhabi"], iata: "AUH", name: "Zayed International Airport" },
    AirportEntry { cities: &["doha"], iata: "DOH", name: "Hamad International Airport" },
    AirportEntry { cities: &["singapore"], iata: "SIN", name: "Singapore Changi Airport" },
    AirportEntry { cities: &["bangkok"], iata: "BKK", name: "Suvarnabhumi Airport" },
    AirportEntry {
        cities: &["kuala lumpur"],
        iata: "KUL",
        name: "Kuala Lumpur International Airport",
    },
    AirportEntry {
        cities: &["bali", "denpasar"],
        iata: "DPS",
        name: "I Gusti Ngurah Rai International Airport",
    },
    AirportEntry { cities: &["hong kong"], iata: "HKG", name: "Hong Kong International Airport" },
    AirportEntry { cities: &["tokyo"], iata: "HND", name: "Tokyo Haneda Airport" },
    AirportEntry { cities: &["sydney"], iata: "SYD", name: "Sydney Kingsford Smith Airport" },
    AirportEntry { cities: &["london"], iata: "LHR", name: "London Heathrow Airport" },
    AirportEntry { cities: &["paris"], iata: "CDG", name: "Paris Charles de Gaulle Airport" },
    AirportEntry { cities: &["frankfurt"], iata: "FRA", name: "Frankfurt Airport" },
    AirportEntry { cities: &["amsterdam"], iata: "AMS", name: "Amsterdam Airport Schiphol" },
    AirportEntry { cities: &["istanbul"], iata: "IST", name: "Istanbul Airport" },
    AirportEntry {
        cities: &["new york", "new york city", "nyc"],
        iata: "JFK",
        name: "John F. Kennedy International Airport",
    },
    AirportEntry {
        cities: &["san francisco"],
        iata: "SFO",
        name: "San Francisco International Airport",
    },
    AirportEntry {
        cities: &["los angeles"],
        iata: "LAX",
        name: "Los Angeles International Airport",
    },
];

/// The built-in lookup table of major cities.
#[derive(Clone, Debug, Default)]
pub struct StaticAirportTable;

impl StaticAirportTable {
    /// `(city, iata)` pairs for every primary city name in the table.
    pub fn served_cities(&self) -> Vec<(String, String)> {
        AIRPORTS
            .iter()
            .filter_map(|entry| {
                entry.cities.first().map(|city| (title_case(city), entry.iata.to_string()))
            })
            .collect()
    }
}

impl CityToAirportResolver for StaticAirportTable {
    fn resolve(&self, city: &str) -> Result<Airport, AirportNotFound> {
        let wanted = normalize_city(city);
        AIRPORTS
            .iter()
            .find(|entry| entry.cities.iter().any(|known| *known == wanted))
            .map(to_airport)
            .ok_or_else(|| AirportNotFound { city: city.trim().to_string() })
    }

    fn lookup_code(&self, iata: &str) -> Option<Airport> {
        let wanted = iata.trim().to_ascii_uppercase();
        AIRPORTS.iter().find(|entry| entry.iata == wanted).map(to_airport)
    }
}

fn to_airport(entry: &AirportEntry) -> Airport {
    Airport {
        iata: entry.iata.to_string(),
        name: entry.name.to_string(),
        city: entry.cities.first().map(|city| title_case(city)).unwrap_or_default(),
    }
}

fn title_case(value: &str) -> String {
    value
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::{CityToAirportResolver, StaticAirportTable};

    #[test]
    fn mumbai_resolves_to_bom() {
        let airport = StaticAirportTable.resolve("Mumbai").expect("mumbai is served");
        assert_eq!(airport.iata, "BOM");
        assert_eq!(airport.city, "Mumbai");
        assert!(airport.name.contains("Chhatrapati Shivaji"));
    }

    #[test]
    fn lookup_is_case_and_whitespace_insensitive() {
        let airport = StaticAirportTable.resolve("  NEW   delhi ").expect("new delhi is served");
        assert_eq!(airport.iata, "DEL");

        let alias = StaticAirportTable.resolve("Bengaluru").expect("alias is served");
        assert_eq!(alias.iata, "BLR");
    }

    #[test]
    fn unknown_city_fails_closed_every_time() {
        for _ in 0..3 {
            let error = StaticAirportTable.resolve("Nellore").expect_err("nellore is not served");
            assert_eq!(error.city, "Nellore");
            assert!(error.to_string().contains("nearby city"));
        }
    }

    #[test]
    fn partial_names_do_not_match() {
        assert!(StaticAirportTable.resolve("Mum").is_err());
        assert!(StaticAirportTable.resolve("").is_err());
    }

    #[test]
    fn lookup_code_only_knows_table_codes() {
        assert_eq!(StaticAirportTable.lookup_code("sin").map(|a| a.city), Some("Singapore".into()));
        assert!(StaticAirportTable.lookup_code("XYZ").is_none());
    }

    #[test]
    fn served_cities_lists_one_entry_per_airport() {
        let cities = StaticAirportTable.served_cities();
        assert_eq!(cities.len(), 30);
        assert!(cities.iter().any(|(city, iata)| city == "New York" && iata == "JFK"));
    }
}
