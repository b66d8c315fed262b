use serde_json::json;
use tripline_core::airports::{CityToAirportResolver, StaticAirportTable};

use crate::commands::CommandResult;

/// Resolves one city, or lists every served city when none is given.
pub fn run(city: Option<&str>) -> CommandResult {
    let table = StaticAirportTable;

    let Some(city) = city else {
        let cities: Vec<_> = table
            .served_cities()
            .into_iter()
            .map(|(city, iata)| json!({ "city": city, "iata": iata }))
            .collect();
        return CommandResult::success_with(
            "airports",
            format!("{} served cities", cities.len()),
            Some(json!(cities)),
        );
    };

    match table.resolve(city) {
        Ok(airport) => CommandResult::success_with(
            "airports",
            format!("{} resolves to {} ({})", city.trim(), airport.iata, airport.name),
            Some(json!(airport)),
        ),
        Err(error) => CommandResult::failure("airports", "unsupported_location", error.to_string(), 1),
    }
}
