//! Slash commands for interactive mode

mod open;
mod session;

pub use open::OpenCommand;
pub use session::SessionCommand;

use parley_session::SessionState;

/// Result of executing a slash command
#[derive(Debug, PartialEq, Eq)]
pub enum CommandResult {
    /// Leave the current conversation and start a fresh one
    NewConversation,
    /// Switch to the conversation with this id
    Open(String),
    /// Re-fetch the conversation list from the service
    Refresh,
    /// Print the conversation list
    List,
    /// Show a message to the user (not sent to the service)
    Message(String),
    /// Dismiss the current error
    ClearError,
    /// Exit the application
    Exit,
    /// Unknown command
    Unknown(String),
}

/// Parse and execute a slash command
pub fn execute_command(input: &str, state: &SessionState) -> Option<CommandResult> {
    let input = input.trim();

    let rest = input.strip_prefix('/')?;
    let parts: Vec<&str> = rest.splitn(2, ' ').collect();
    let command = parts[0].to_lowercase();
    let args = parts.get(1).map(|s| s.trim()).unwrap_or("");

    Some(match command.as_str() {
        "help" | "h" | "?" => CommandResult::Message(help_message()),

        "new" | "n" => CommandResult::NewConversation,

        "list" | "l" => CommandResult::List,

        "open" | "o" => OpenCommand::execute(args, state),

        "refresh" | "r" => CommandResult::Refresh,

        "whoami" | "w" => SessionCommand::execute(state),

        "clear" | "c" => CommandResult::ClearError,

        "quit" | "exit" | "q" => CommandResult::Exit,

        _ => CommandResult::Unknown(command),
    })
}

fn help_message() -> String {
    r#"Available commands:
  /help, /h, /?        Show this help message
  /new, /n             Start a new conversation
  /list, /l            List your conversations
  /open, /o <n|id:ID>  Open a conversation by list number or id
  /refresh, /r         Reload the conversation list
  /whoami, /w          Show user id and current conversation
  /clear, /c           Dismiss the current error
  /quit, /exit, /q     Exit parley

Anything else is sent as a message.

Examples:
  /open 2              Open the second conversation in /list
  /open id:42          Open conversation 42"#
        .to_string()
}
