pub mod flight;
pub mod summary;
pub mod trip;

pub use flight::{
    Airline, Baggage, BookingStatus, CabinClass, FlightEndpoint, FlightSearchState, Money,
    ResolvedAirport, SearchResult, SearchSignature, TripType,
};
pub use summary::{Budget, PassengerBreakdown, Place, Summary};
pub use trip::{ConversationId, ConversationState, Itinerary, ItineraryDay, TripBooking, TripContext};
