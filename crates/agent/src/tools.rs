use std::collections::HashMap;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tripline_core::airports::CityToAirportResolver;
use tripline_core::booking::{confirm_booking, select_flight};
use tripline_core::domain::trip::TripContext;
use tripline_core::errors::FlightSearchError;
use tripline_core::flight_search::{
    update_summary, FlightSearchArgs, FlightSearchService, UpdateSummaryArgs,
};
use tripline_core::search::FlightSearchProvider;

use crate::replies;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyStatus {
    Ok,
    Rejected,
    Failed,
}

impl ReplyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Rejected => "rejected",
            Self::Failed => "failed",
        }
    }
}

/// What a tool hands back to the model: one status string plus its classification.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ToolReply {
    pub status: ReplyStatus,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<String>,
    pub retryable: bool,
}

impl ToolReply {
    pub fn ok(message: impl Into<String>) -> Self {
        Self { status: ReplyStatus::Ok, message: message.into(), error_kind: None, retryable: false }
    }

    pub fn from_error(error: &FlightSearchError) -> Self {
        let status = match error {
            FlightSearchError::ProviderFailure { .. } => ReplyStatus::Failed,
            _ => ReplyStatus::Rejected,
        };
        Self {
            status,
            message: replies::search_error(error),
            error_kind: Some(error.kind().to_string()),
            retryable: error.is_retryable(),
        }
    }
}

#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &'static str;

    /// Runs one call against the conversation's context.
    ///
    /// Domain rejections come back as a non-ok [`ToolReply`]. `Err` is reserved for
    /// input that does not decode as this tool's arguments.
    async fn execute(
        &self,
        context: &mut TripContext,
        input: Value,
        today: NaiveDate,
    ) -> Result<ToolReply>;
}

#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn register<T>(&mut self, tool: T)
    where
        T: Tool + 'static,
    {
        self.tools.insert(tool.name().to_string(), Box::new(tool));
    }

    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.get(name).map(|tool| tool.as_ref())
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tools.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

fn decode<T: DeserializeOwned>(tool: &str, input: Value) -> Result<T> {
    let input = if input.is_null() { Value::Object(Default::default()) } else { input };
    serde_json::from_value(input).with_context(|| format!("invalid arguments for `{tool}`"))
}

pub struct FlightSearchTool<R, P> {
    service: FlightSearchService<R, P>,
}

impl<R, P> FlightSearchTool<R, P> {
    pub fn new(service: FlightSearchService<R, P>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl<R, P> Tool for FlightSearchTool<R, P>
where
    R: CityToAirportResolver + 'static,
    P: FlightSearchProvider + 'static,
{
    fn name(&self) -> &'static str {
        "flight_search"
    }

    async fn execute(
        &self,
        context: &mut TripContext,
        input: Value,
        today: NaiveDate,
    ) -> Result<ToolReply> {
        let args: FlightSearchArgs = decode(self.name(), input)?;
        Ok(match self.service.search(context, &args, today).await {
            Ok(summary) => ToolReply::ok(replies::search_results(&summary)),
            Err(error) => ToolReply::from_error(&error),
        })
    }
}

#[derive(Default)]
pub struct UpdateSummaryTool;

#[async_trait]
impl Tool for UpdateSummaryTool {
    fn name(&self) -> &'static str {
        "update_summary"
    }

    async fn execute(
        &self,
        context: &mut TripContext,
        input: Value,
        today: NaiveDate,
    ) -> Result<ToolReply> {
        let args: UpdateSummaryArgs = decode(self.name(), input)?;
        Ok(match update_summary(context, &args, today) {
            Ok(changes) => ToolReply::ok(replies::summary_updated(changes, context)),
            Err(error) => ToolReply::from_error(&error),
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SelectFlightArgs {
    flight_id: String,
}

#[derive(Default)]
pub struct SelectFlightTool;

#[async_trait]
impl Tool for SelectFlightTool {
    fn name(&self) -> &'static str {
        "select_flight"
    }

    async fn execute(
        &self,
        context: &mut TripContext,
        input: Value,
        _today: NaiveDate,
    ) -> Result<ToolReply> {
        let args: SelectFlightArgs = decode(self.name(), input)?;
        Ok(match select_flight(context, &args.flight_id) {
            Ok(selected) => ToolReply::ok(replies::flight_selected(&selected)),
            Err(error) => ToolReply::from_error(&FlightSearchError::from(error)),
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfirmBookingArgs {
    reference: String,
}

#[derive(Default)]
pub struct ConfirmBookingTool;

#[async_trait]
impl Tool for ConfirmBookingTool {
    fn name(&self) -> &'static str {
        "confirm_booking"
    }

    async fn execute(
        &self,
        context: &mut TripContext,
        input: Value,
        _today: NaiveDate,
    ) -> Result<ToolReply> {
        let args: ConfirmBookingArgs = decode(self.name(), input)?;
        Ok(match confirm_booking(context, &args.reference) {
            Ok(_) => ToolReply::ok(replies::booking_confirmed(context)),
            Err(error) => ToolReply::from_error(&FlightSearchError::from(error)),
        })
    }
}
