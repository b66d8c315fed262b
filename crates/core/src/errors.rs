use serde::Serialize;
use thiserror::Error;

use crate::airports::AirportNotFound;
use crate::booking::BookingTransitionError;
use crate::dates::DateRejection;
use crate::passengers::PassengerRuleViolation;
use crate::search::ProviderError;

/// A slot that must be known before a search can run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingField {
    Origin,
    Destination,
    OutboundDate,
    ReturnDate,
    Passengers,
}

impl MissingField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Origin => "origin",
            Self::Destination => "destination",
            Self::OutboundDate => "outbound_date",
            Self::ReturnDate => "return_date",
            Self::Passengers => "passengers",
        }
    }

    pub fn prompt(&self) -> &'static str {
        match self {
            Self::Origin => "departure city",
            Self::Destination => "destination city",
            Self::OutboundDate => "departure date",
            Self::ReturnDate => "return date",
            Self::Passengers => "number of travellers",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TripSide {
    Origin,
    Destination,
}

impl TripSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Origin => "origin",
            Self::Destination => "destination",
        }
    }
}

/// Every way a flight-search turn can stop short of fresh results.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum FlightSearchError {
    #[error("still need the {} before searching", join_prompts(.fields))]
    MissingRequiredField { fields: Vec<MissingField> },
    #[error("{} city: {source}", .side.as_str())]
    UnsupportedLocation { side: TripSide, source: AirportNotFound },
    #[error(transparent)]
    InvalidDate(DateRejection),
    #[error(transparent)]
    InvalidDateOrdering(DateRejection),
    #[error(transparent)]
    PassengerRuleViolation(#[from] PassengerRuleViolation),
    #[error("these exact flights are already shown; change a detail to search again")]
    DuplicateRequest,
    #[error("flight search failed, please try again shortly: {source}")]
    ProviderFailure { source: ProviderError, retryable: bool },
    #[error(transparent)]
    BookingTransition(#[from] BookingTransitionError),
}

impl FlightSearchError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingRequiredField { .. } => "missing_required_field",
            Self::UnsupportedLocation { .. } => "unsupported_location",
            Self::InvalidDate(_) => "invalid_date",
            Self::InvalidDateOrdering(_) => "invalid_date_ordering",
            Self::PassengerRuleViolation(_) => "passenger_rule_violation",
            Self::DuplicateRequest => "duplicate_request",
            Self::ProviderFailure { .. } => "provider_failure",
            Self::BookingTransition(_) => "booking_transition",
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ProviderFailure { retryable: true, .. })
    }

    /// Whether the staged slots of a rejected turn are still written back.
    pub fn commits_slots(&self) -> bool {
        matches!(
            self,
            Self::MissingRequiredField { .. } | Self::DuplicateRequest | Self::ProviderFailure { .. }
        )
    }
}

impl From<DateRejection> for FlightSearchError {
    fn from(value: DateRejection) -> Self {
        if value.is_ordering() {
            Self::InvalidDateOrdering(value)
        } else {
            Self::InvalidDate(value)
        }
    }
}

impl From<ProviderError> for FlightSearchError {
    fn from(source: ProviderError) -> Self {
        Self::ProviderFailure { source, retryable: true }
    }
}

fn join_prompts(fields: &[MissingField]) -> String {
    fields.iter().map(MissingField::prompt).collect::<Vec<_>>().join(", ")
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum DomainError {
    #[error(transparent)]
    FlightSearch(#[from] FlightSearchError),
    #[error(transparent)]
    BookingTransition(#[from] BookingTransitionError),
    #[error("domain invariant violation: {0}")]
    InvariantViolation(String),
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("persistence failure: {0}")]
    Persistence(String),
    #[error("integration failure: {0}")]
    Integration(String),
    #[error("configuration failure: {0}")]
    Configuration(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InterfaceError {
    #[error("bad request: {message}")]
    BadRequest { message: String, correlation_id: String },
    #[error("service unavailable: {message}")]
    ServiceUnavailable { message: String, correlation_id: String },
    #[error("internal error: {message}")]
    Internal { message: String, correlation_id: String },
}

impl InterfaceError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::BadRequest { .. } => {
                "The request could not be processed. Check inputs and try again."
            }
            Self::ServiceUnavailable { .. } => {
                "The service is temporarily unavailable. Please retry shortly."
            }
            Self::Internal { .. } => "An unexpected internal error occurred.",
        }
    }
}

impl ApplicationError {
    pub fn into_interface(self, correlation_id: impl Into<String>) -> InterfaceError {
        let correlation_id = correlation_id.into();
        let mut mapped = InterfaceError::from(self);
        match &mut mapped {
            InterfaceError::BadRequest { correlation_id: id, .. }
            | InterfaceError::ServiceUnavailable { correlation_id: id, .. }
            | InterfaceError::Internal { correlation_id: id, .. } => *id = correlation_id,
        }
        mapped
    }
}

impl From<ApplicationError> for InterfaceError {
    fn from(value: ApplicationError) -> Self {
        match value {
            ApplicationError::Domain(DomainError::FlightSearch(error)) if error.is_retryable() => {
                Self::ServiceUnavailable {
                    message: error.to_string(),
                    correlation_id: "unassigned".to_owned(),
                }
            }
            ApplicationError::Domain(error) => Self::BadRequest {
                message: error.to_string(),
                correlation_id: "unassigned".to_owned(),
            },
            ApplicationError::Persistence(message) | ApplicationError::Integration(message) => {
                Self::ServiceUnavailable { message, correlation_id: "unassigned".to_owned() }
            }
            ApplicationError::Configuration(message) => {
                Self::Internal { message, correlation_id: "unassigned".to_owned() }
            }
        }
    }
}
