//! /whoami command - show session info

use super::CommandResult;
use parley_session::SessionState;

pub struct SessionCommand;

impl SessionCommand {
    pub fn execute(state: &SessionState) -> CommandResult {
        let mut output = String::from("Session Info\n");
        output.push_str(&"-".repeat(40));
        output.push('\n');

        output.push_str(&format!("User:          {}\n", state.user_id));

        let conversation = match state.current_conversation.as_deref() {
            Some(id) => match state.conversation(id) {
                Some(summary) => format!("{} ({})", summary.title(), id),
                None => id.to_string(),
            },
            None => "new (not yet saved)".to_string(),
        };
        output.push_str(&format!("Conversation:  {}\n", conversation));

        let errors = state.messages.iter().filter(|m| m.is_error).count();
        output.push_str(&format!("Messages:      {} total", state.messages.len()));
        if errors > 0 {
            output.push_str(&format!(", {} failed", errors));
        }
        output.push('\n');
        output.push_str(&format!(
            "Known chats:   {}\n",
            state.conversations.len()
        ));

        if let Some(ref error) = state.error {
            output.push_str(&format!("Error:         {} (dismiss with /clear)\n", error));
        }

        CommandResult::Message(output)
    }
}
