use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A city slot as the traveller named it, with the IATA code once resolution succeeded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Place {
    pub city: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iata: Option<String>,
}

impl Place {
    pub fn named(city: impl Into<String>) -> Self {
        Self { city: city.into(), iata: None }
    }

    /// Whitespace- and case-insensitive comparison used to detect a changed city.
    pub fn same_city(&self, other: &str) -> bool {
        normalize_city(&self.city) == normalize_city(other)
    }
}

pub fn normalize_city(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    pub amount: Decimal,
    pub currency: String,
    #[serde(default)]
    pub per_person: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PassengerBreakdown {
    pub adults: u32,
    pub seniors: u32,
    pub children: u32,
    pub children_ages: Vec<u32>,
    pub seat_infants: u32,
    pub lap_infants: u32,
}

impl Default for PassengerBreakdown {
    fn default() -> Self {
        Self {
            adults: 1,
            seniors: 0,
            children: 0,
            children_ages: Vec::new(),
            seat_infants: 0,
            lap_infants: 0,
        }
    }
}

impl PassengerBreakdown {
    pub fn total(&self) -> u32 {
        self.adults + self.seniors + self.children + self.seat_infants + self.lap_infants
    }

    /// Adults and seniors together; every ratio rule is expressed against this count.
    pub fn supervising(&self) -> u32 {
        self.adults + self.seniors
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Summary {
    pub origin: Option<Place>,
    pub destination: Option<Place>,
    pub outbound_date: Option<NaiveDate>,
    pub return_date: Option<NaiveDate>,
    pub duration_days: Option<u32>,
    pub passengers: PassengerBreakdown,
    pub budget: Option<Budget>,
    pub trip_types: Vec<String>,
    pub places_of_interest: Vec<String>,
    pub suggested_questions: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::{PassengerBreakdown, Place};

    #[test]
    fn total_counts_every_category() {
        let passengers = PassengerBreakdown {
            adults: 2,
            seniors: 1,
            children: 2,
            children_ages: vec![4, 9],
            seat_infants: 1,
            lap_infants: 1,
        };

        assert_eq!(passengers.total(), 7);
        assert_eq!(passengers.supervising(), 3);
    }

    #[test]
    fn city_comparison_ignores_case_and_spacing() {
        let place = Place::named("New  Delhi");
        assert!(place.same_city(" new delhi "));
        assert!(!place.same_city("Delhi"));
    }
}
