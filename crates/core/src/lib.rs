pub mod airports;
pub mod booking;
pub mod config;
pub mod dates;
pub mod domain;
pub mod errors;
pub mod flight_search;
pub mod merge;
pub mod passengers;
pub mod search;
pub mod signature;

pub use airports::{Airport, AirportNotFound, CityToAirportResolver, StaticAirportTable};
pub use booking::{
    confirm_booking, select_flight, BookingEvent, BookingTransitionError, StatusChange,
};
pub use dates::{today_utc, DateRejection, DateSlot, SearchWindow};
pub use domain::trip::{ConversationId, TripContext};
pub use errors::{
    ApplicationError, DomainError, FlightSearchError, InterfaceError, MissingField, TripSide,
};
pub use flight_search::{
    update_summary, FlightSearchArgs, FlightSearchService, SearchSummary, UpdateSummaryArgs,
};
pub use merge::{merge_slots, ChangedGroups, SlotUpdate};
pub use passengers::{validate_passengers, PassengerRule, PassengerRuleViolation};
pub use search::{
    FlightSearchProvider, FlightSearchRequest, ProviderError, ProviderResponse,
    StubFlightProvider, StubProviderConfig,
};
pub use signature::signature_for;
