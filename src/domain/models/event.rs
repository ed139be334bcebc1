use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ChatMessage;

/// One element of a model's reply stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseEvent {
    id: String,
    author: String,
    is_final: bool,
    content: Option<ChatMessage>,
}

impl ResponseEvent {
    pub fn new(author: impl Into<String>, is_final: bool, content: Option<ChatMessage>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            author: author.into(),
            is_final,
            content,
        }
    }

    /// An intermediate event; more events follow for the same turn.
    pub fn partial(author: impl Into<String>, content: Option<ChatMessage>) -> Self {
        Self::new(author, false, content)
    }

    /// The terminal event of a turn.
    pub fn final_response(author: impl Into<String>, content: Option<ChatMessage>) -> Self {
        Self::new(author, true, content)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn is_final_response(&self) -> bool {
        self.is_final
    }

    pub fn content(&self) -> Option<&ChatMessage> {
        self.content.as_ref()
    }

    /// `content.parts[0].text`, when every link of that chain is present.
    pub fn first_text(&self) -> Option<&str> {
        self.content.as_ref().and_then(ChatMessage::first_text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_ids_are_unique() {
        let a = ResponseEvent::partial("text_qa", None);
        let b = ResponseEvent::partial("text_qa", None);
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_final_event_without_content_has_no_text() {
        let event = ResponseEvent::final_response("text_qa", None);
        assert!(event.is_final_response());
        assert_eq!(event.first_text(), None);
    }

    #[test]
    fn test_final_event_exposes_first_text() {
        let event = ResponseEvent::final_response("text_qa", Some(ChatMessage::model("Y")));
        assert_eq!(event.first_text(), Some("Y"));
        assert_eq!(event.author(), "text_qa");
    }
}
