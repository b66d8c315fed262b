use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::flight::FlightSearchState;
use crate::domain::summary::Summary;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConversationId(pub String);

impl std::fmt::Display for ConversationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItineraryDay {
    pub day: u32,
    pub title: String,
    #[serde(default)]
    pub activities: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Itinerary {
    pub days: Vec<ItineraryDay>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TripBooking {
    pub selected_flight_id: Option<String>,
    pub confirmation_reference: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConversationState {
    pub turn_count: u32,
    pub last_tool: Option<String>,
}

/// Everything the assistant knows about one conversation's trip.
///
/// One document per conversation id. Created empty on the first turn and persisted by
/// the turn runtime after each mutating tool call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripContext {
    pub conversation_id: ConversationId,
    #[serde(default)]
    pub summary: Summary,
    #[serde(default)]
    pub flight: FlightSearchState,
    #[serde(default)]
    pub itinerary: Itinerary,
    #[serde(default)]
    pub booking: TripBooking,
    #[serde(default)]
    pub conversation: ConversationState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TripContext {
    pub fn new(conversation_id: ConversationId) -> Self {
        let now = Utc::now();
        Self {
            conversation_id,
            summary: Summary::default(),
            flight: FlightSearchState::default(),
            itinerary: Itinerary::default(),
            booking: TripBooking::default(),
            conversation: ConversationState::default(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
