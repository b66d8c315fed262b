//! Tool boundary of the trip assistant.
//!
//! The model calls tools with already-extracted JSON arguments. This crate decodes those
//! arguments, runs them through `tripline-core` against the conversation's stored
//! context and renders the outcome as one status string.
//!
//! - `tools` - the `Tool` trait, registry and the trip tools
//! - `runtime` - per-conversation load, execute and persist
//! - `replies` - prose rendering of results and rejections
//! - `provider` - deadline decorator for flight search providers

pub mod provider;
pub mod replies;
pub mod runtime;
pub mod tools;

pub use provider::TimeoutProvider;
pub use runtime::{default_tools, AgentRuntime, TurnOutcome};
pub use tools::{
    ConfirmBookingTool, FlightSearchTool, ReplyStatus, SelectFlightTool, Tool, ToolRegistry,
    ToolReply, UpdateSummaryTool,
};
