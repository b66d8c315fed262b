use serde_json::json;
use tripline_agent::{default_tools, AgentRuntime};
use tripline_core::config::AppConfig;
use tripline_core::domain::trip::ConversationId;

use crate::commands::{build_runtime, load_config, open_store, CommandResult};

pub fn show(conversation: &str) -> CommandResult {
    with_agent("show", |agent| async move {
        let id = ConversationId(conversation.to_string());
        Ok(match agent.context(&id).await? {
            Some(context) => CommandResult::success_with(
                "show",
                format!(
                    "conversation {id} ({} turns, booking {})",
                    context.conversation.turn_count,
                    context.flight.booking_status.as_str()
                ),
                serde_json::to_value(&context).ok(),
            ),
            None => CommandResult::failure(
                "show",
                "not_found",
                format!("no stored context for conversation {id}"),
                1,
            ),
        })
    })
}

pub fn list() -> CommandResult {
    with_agent("list", |agent| async move {
        let ids = agent.conversations().await?;
        let ids: Vec<String> = ids.into_iter().map(|id| id.0).collect();
        Ok(CommandResult::success_with(
            "list",
            format!("{} stored conversations", ids.len()),
            Some(json!(ids)),
        ))
    })
}

pub fn clear(conversation: &str) -> CommandResult {
    with_agent("clear", |agent| async move {
        let id = ConversationId(conversation.to_string());
        Ok(if agent.clear(&id).await? {
            CommandResult::success("clear", format!("cleared conversation {id}"))
        } else {
            CommandResult::success("clear", format!("conversation {id} had no stored context"))
        })
    })
}

fn with_agent<F, Fut>(command: &str, body: F) -> CommandResult
where
    F: FnOnce(AgentRuntime) -> Fut,
    Fut: std::future::Future<Output = anyhow::Result<CommandResult>>,
{
    let config: AppConfig = match load_config(command) {
        Ok(config) => config,
        Err(result) => return result,
    };
    let runtime = match build_runtime(command) {
        Ok(runtime) => runtime,
        Err(result) => return result,
    };

    let result = runtime.block_on(async {
        let store = open_store(&config.storage).await?;
        body(AgentRuntime::from_boxed(default_tools(&config.search), store)).await
    });

    result.unwrap_or_else(|error| CommandResult::failure(command, "storage", format!("{error:#}"), 4))
}
