//! Prompts and message assembly for the two request kinds.

use quicksense_chat::ChatMessage;
use quicksense_core::PageSnapshot;

/// Synthetic user message shown when a summary is requested.
pub const SUMMARIZE_REQUEST: &str = "Summarize this page";

pub const SUMMARY_SYSTEM_PROMPT: &str = "You are a helpful assistant that summarizes web content. \
Reply with a single JSON object and nothing else, shaped as \
{\"overview\": string, \"keyPoints\": [{\"title\": string, \"content\": string}]}. \
The overview is two or three sentences. Give between three and six key points.";

const QUESTION_SYSTEM_PROMPT: &str = "You are a helpful assistant answering questions about a web page. \
Base your answers on the page content below. If the content does not contain the answer, say so.";

/// Messages for a structured summary of `snapshot`.
pub fn summary_messages(snapshot: &PageSnapshot) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(SUMMARY_SYSTEM_PROMPT),
        ChatMessage::user(format!(
            "Please provide a concise summary of the following content:\n{}",
            snapshot.text
        )),
    ]
}

/// Messages for a free-form question: page context, then the whole transcript.
pub fn question_messages(snapshot: &PageSnapshot, history: &[ChatMessage]) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(history.len() + 1);
    messages.push(ChatMessage::system(format!(
        "{}\n\nPage content:\n{}",
        QUESTION_SYSTEM_PROMPT, snapshot.text
    )));
    messages.extend(history.iter().cloned());
    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use quicksense_chat::Role;

    #[test]
    fn test_summary_messages() {
        let messages = summary_messages(&PageSnapshot::new("Page body"));
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::System);
        assert!(messages[0].content.contains("keyPoints"));
        assert!(messages[1].content.ends_with("Page body"));
    }

    #[test]
    fn test_question_messages_include_history() {
        let history = vec![
            ChatMessage::user("q1"),
            ChatMessage::assistant("a1"),
            ChatMessage::user("q2"),
        ];
        let messages = question_messages(&PageSnapshot::new("Context here"), &history);
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0].role, Role::System);
        assert!(messages[0].content.contains("Context here"));
        assert_eq!(&messages[1..], &history[..]);
    }
}
