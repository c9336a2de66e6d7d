//! Shared formatting helpers

use chrono::{DateTime, TimeZone};
use parley_api::{Message, Role};
use parley_session::SessionState;

/// Sidebar date: `Today`, `Yesterday`, `N days ago` within a week, else the date.
pub fn format_relative_date<Tz: TimeZone>(when: &DateTime<Tz>, now: &DateTime<Tz>) -> String {
    let days = (now.date_naive() - when.date_naive()).num_days();
    match days {
        ..=0 => "Today".to_string(),
        1 => "Yesterday".to_string(),
        2..=6 => format!("{} days ago", days),
        _ => when.date_naive().format("%Y-%m-%d").to_string(),
    }
}

/// Wall-clock `HH:MM`
pub fn format_time<Tz: TimeZone>(when: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    when.format("%H:%M").to_string()
}

/// One transcript line
pub fn format_message(message: &Message) -> String {
    match (message.role, message.is_error) {
        (Role::Assistant, true) => format!("assistant [error]> {}", message.content),
        (role, _) => format!("{}> {}", role.name(), message.content),
    }
}

/// Render the conversation sidebar, newest first as listed by the service.
pub fn format_conversation_list<Tz: TimeZone>(state: &SessionState, now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    if state.conversations.is_empty() {
        return "No conversations yet. Start a new chat to begin.".to_string();
    }

    let tz = now.timezone();
    let mut output = String::from("Conversations\n");
    output.push_str(&"-".repeat(40));
    output.push('\n');

    for (index, conversation) in state.conversations.iter().enumerate() {
        let updated = conversation.updated_at.with_timezone(&tz);
        let marker = if state.is_current(&conversation.id) { '*' } else { ' ' };
        output.push_str(&format!(
            "{}{:>3}. {}  ({})\n",
            marker,
            index + 1,
            conversation.title(),
            format_relative_date(&updated, now)
        ));
        output.push_str(&format!("       {}\n", conversation.preview()));
        output.push_str(&format!(
            "       {} messages, {}\n",
            conversation.message_count(),
            format_time(&updated)
        ));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use parley_api::ConversationSummary;

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn test_relative_dates() {
        let now = at(2024, 6, 10, 12);
        assert_eq!(format_relative_date(&at(2024, 6, 10, 1), &now), "Today");
        assert_eq!(format_relative_date(&at(2024, 6, 9, 23), &now), "Yesterday");
        assert_eq!(format_relative_date(&at(2024, 6, 7, 12), &now), "3 days ago");
        assert_eq!(format_relative_date(&at(2024, 5, 1, 12), &now), "2024-05-01");
        // Clock skew: a timestamp slightly in the future still reads as today
        assert_eq!(format_relative_date(&at(2024, 6, 11, 0), &now), "Today");
    }

    #[test]
    fn test_format_message_flags_errors() {
        let t = at(2024, 1, 1, 0);
        assert_eq!(format_message(&Message::user("1", "hi", t)), "user> hi");
        assert_eq!(
            format_message(&Message::assistant_error("2", "Sorry", t)),
            "assistant [error]> Sorry"
        );
    }

    #[test]
    fn test_conversation_list_marks_current() {
        let t = at(2024, 6, 10, 9);
        let mut state = SessionState::new("u");
        state.conversations = vec![
            ConversationSummary {
                id: "2".into(),
                messages: vec![Message::user("1", "What is Rust?", t)],
                updated_at: t,
                user_id: None,
                session_id: None,
                created_at: None,
            },
            ConversationSummary {
                id: "1".into(),
                messages: vec![],
                updated_at: at(2024, 6, 1, 9),
                user_id: None,
                session_id: None,
                created_at: None,
            },
        ];
        state.current_conversation = Some("2".into());

        let out = format_conversation_list(&state, &at(2024, 6, 10, 12));
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[2], "*  1. What is Rust?  (Today)");
        assert_eq!(lines[3], "       What is Rust?");
        assert_eq!(lines[4], "       1 messages, 09:00");
        assert_eq!(lines[5], "   2. New conversation  (2024-06-01)");
        assert_eq!(lines[6], "       No messages yet");
    }

    #[test]
    fn test_empty_conversation_list() {
        let out = format_conversation_list(&SessionState::new("u"), &at(2024, 1, 1, 0));
        assert!(out.starts_with("No conversations yet"));
    }
}
