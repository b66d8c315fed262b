use std::time::Duration;

use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};
use tripline_core::airports::StaticAirportTable;
use tripline_core::config::SearchConfig;
use tripline_core::dates::today_utc;
use tripline_core::domain::flight::BookingStatus;
use tripline_core::domain::trip::{ConversationId, TripContext};
use tripline_core::flight_search::FlightSearchService;
use tripline_core::search::StubFlightProvider;
use tripline_db::TripContextRepository;

use crate::provider::TimeoutProvider;
use crate::tools::{
    ConfirmBookingTool, FlightSearchTool, ReplyStatus, SelectFlightTool, ToolRegistry, ToolReply,
    UpdateSummaryTool,
};

#[derive(Clone, Debug, Serialize)]
pub struct TurnOutcome {
    pub conversation_id: ConversationId,
    pub correlation_id: String,
    pub tool: String,
    pub reply: ToolReply,
    pub persisted: bool,
    pub booking_status: BookingStatus,
}

/// The registered tools wired to the stub provider, bounded by `search.timeout_secs`.
pub fn default_tools(search: &SearchConfig) -> ToolRegistry {
    let provider = TimeoutProvider::new(
        StubFlightProvider::new(search.provider_config()),
        Duration::from_secs(search.timeout_secs),
    );

    let mut tools = ToolRegistry::default();
    tools.register(FlightSearchTool::new(FlightSearchService::new(StaticAirportTable, provider)));
    tools.register(UpdateSummaryTool);
    tools.register(SelectFlightTool);
    tools.register(ConfirmBookingTool);
    tools
}

/// Runs tool calls against stored conversations.
///
/// A turn loads the context (or starts an empty one), runs the tool and writes the
/// context back only when the tool changed it. Rejected calls leave storage untouched.
pub struct AgentRuntime {
    tools: ToolRegistry,
    store: Box<dyn TripContextRepository>,
}

impl AgentRuntime {
    pub fn new(tools: ToolRegistry, store: impl TripContextRepository + 'static) -> Self {
        Self { tools, store: Box::new(store) }
    }

    pub fn from_boxed(tools: ToolRegistry, store: Box<dyn TripContextRepository>) -> Self {
        Self { tools, store }
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub async fn handle_tool_call(
        &self,
        conversation_id: &ConversationId,
        tool: &str,
        input: Value,
    ) -> Result<TurnOutcome> {
        self.handle_tool_call_on(conversation_id, tool, input, today_utc()).await
    }

    pub async fn handle_tool_call_on(
        &self,
        conversation_id: &ConversationId,
        tool_name: &str,
        input: Value,
        today: NaiveDate,
    ) -> Result<TurnOutcome> {
        let correlation_id = uuid::Uuid::new_v4().to_string();
        let tool = self.tools.get(tool_name).ok_or_else(|| {
            anyhow!("unknown tool `{tool_name}`; available: {}", self.tools.names().join(", "))
        })?;

        let mut context = match self.store.find(conversation_id).await? {
            Some(context) => context,
            None => TripContext::new(conversation_id.clone()),
        };
        let before = context.clone();

        let reply = tool.execute(&mut context, input, today).await?;

        let persisted = trip_state_changed(&before, &context);
        if persisted {
            context.conversation.turn_count += 1;
            context.conversation.last_tool = Some(tool_name.to_string());
            self.store.save(&context).await?;
        }

        match reply.status {
            ReplyStatus::Ok => info!(
                event_name = "agent.turn.completed",
                correlation_id = %correlation_id,
                conversation_id = %conversation_id,
                tool = tool_name,
                persisted,
                booking_status = context.flight.booking_status.as_str(),
                "tool call completed"
            ),
            ReplyStatus::Rejected | ReplyStatus::Failed => warn!(
                event_name = "agent.turn.rejected",
                correlation_id = %correlation_id,
                conversation_id = %conversation_id,
                tool = tool_name,
                status = reply.status.as_str(),
                error_kind = reply.error_kind.as_deref().unwrap_or("unknown"),
                persisted,
                "tool call did not complete"
            ),
        }

        Ok(TurnOutcome {
            conversation_id: conversation_id.clone(),
            correlation_id,
            tool: tool_name.to_string(),
            reply,
            persisted,
            booking_status: context.flight.booking_status,
        })
    }

    pub async fn context(&self, conversation_id: &ConversationId) -> Result<Option<TripContext>> {
        Ok(self.store.find(conversation_id).await?)
    }

    pub async fn conversations(&self) -> Result<Vec<ConversationId>> {
        Ok(self.store.list_ids().await?)
    }

    pub async fn clear(&self, conversation_id: &ConversationId) -> Result<bool> {
        let removed = self.store.delete(conversation_id).await?;
        info!(
            event_name = "agent.conversation.cleared",
            conversation_id = %conversation_id,
            removed,
            "conversation context cleared"
        );
        Ok(removed)
    }
}

/// Compares what the tools own, ignoring timestamps and turn bookkeeping.
fn trip_state_changed(before: &TripContext, after: &TripContext) -> bool {
    before.summary != after.summary
        || before.flight != after.flight
        || before.itinerary != after.itinerary
        || before.booking != after.booking
}
