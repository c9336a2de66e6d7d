//! /open command - switch to a conversation from the sidebar

use super::CommandResult;
use parley_session::SessionState;

pub struct OpenCommand;

impl OpenCommand {
    /// Execute /open command
    /// - With a number: open that entry of the conversation list (1-based)
    /// - With `id:<id>`: open a conversation by its service id
    pub fn execute(args: &str, state: &SessionState) -> CommandResult {
        let count = state.conversations.len();

        if args.is_empty() {
            return CommandResult::Message(
                "Usage: /open <number> or /open id:<conversation id>. See /list.".to_string(),
            );
        }

        if let Some(id) = args.strip_prefix("id:") {
            let id = id.trim();
            if id.is_empty() {
                return CommandResult::Message("Missing conversation id after 'id:'.".to_string());
            }
            return CommandResult::Open(id.to_string());
        }

        if count == 0 {
            return CommandResult::Message(
                "No conversations to open. Try /refresh or start chatting.".to_string(),
            );
        }

        match args.parse::<usize>() {
            Ok(index) if (1..=count).contains(&index) => {
                CommandResult::Open(state.conversations[index - 1].id.clone())
            }
            Ok(index) => CommandResult::Message(format!(
                "Invalid number {}. Valid range: 1-{}",
                index, count
            )),
            Err(_) => CommandResult::Message(format!(
                "Invalid number '{}'. Use 1-{} or id:<conversation id>.",
                args, count
            )),
        }
    }
}
