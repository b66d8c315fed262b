use serde_json::Value;
use tripline_agent::{default_tools, AgentRuntime};
use tripline_core::domain::trip::ConversationId;

use crate::commands::{build_runtime, load_config, open_store, CommandResult};

/// Runs one tool call against a stored conversation and prints the turn outcome.
///
/// A rejected call is still a successful command; the reply status says how the tool
/// call ended.
pub fn run(conversation: &str, tool: &str, args: Option<&str>) -> CommandResult {
    let input = match args.map(serde_json::from_str::<Value>).transpose() {
        Ok(input) => input.unwrap_or(Value::Null),
        Err(error) => {
            return CommandResult::failure(
                "run",
                "invalid_arguments",
                format!("tool arguments must be a JSON object: {error}"),
                2,
            );
        }
    };

    let config = match load_config("run") {
        Ok(config) => config,
        Err(result) => return result,
    };
    let runtime = match build_runtime("run") {
        Ok(runtime) => runtime,
        Err(result) => return result,
    };

    let conversation_id = ConversationId(conversation.to_string());
    let result = runtime.block_on(async {
        let store = open_store(&config.storage).await.map_err(|error| ("storage", error, 4u8))?;
        let agent = AgentRuntime::from_boxed(default_tools(&config.search), store);
        agent
            .handle_tool_call(&conversation_id, tool, input)
            .await
            .map_err(|error| ("tool_call", error, 1u8))
    });

    match result {
        Ok(outcome) => {
            let message = outcome.reply.message.clone();
            CommandResult::success_with("run", message, serde_json::to_value(&outcome).ok())
        }
        Err((error_class, error, exit_code)) => {
            CommandResult::failure("run", error_class, format!("{error:#}"), exit_code)
        }
    }
}
