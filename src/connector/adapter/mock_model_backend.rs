use async_trait::async_trait;
use futures_util::stream::{self, StreamExt};

use crate::application::{EventStream, ModelBackend};
use crate::domain::{AgentDefinition, ChatMessage, DomainError, ResponseEvent, NOT_IN_REFERENCE};

const REFERENCE_MARKER: &str = "Reference text:\n";
const QUESTION_MARKER: &str = "\n\nQuestion: ";
const QUESTION_PREFIXES: [&str; 4] = ["what is ", "what are ", "who is ", "where is "];

/// Offline stand-in for the hosted model.
///
/// Answers `What is X?` with `Y` when the reference contains `X is Y`, and
/// with the agent's not-found sentence otherwise. Always emits exactly one
/// final event.
pub struct MockModelBackend;

impl MockModelBackend {
    pub fn new() -> Self {
        Self
    }

    fn reply(prompt: &str) -> String {
        Self::lookup(prompt).unwrap_or_else(|| NOT_IN_REFERENCE.to_string())
    }

    fn lookup(prompt: &str) -> Option<String> {
        let body = prompt.strip_prefix(REFERENCE_MARKER)?;
        let split = body.rfind(QUESTION_MARKER)?;
        let reference = &body[..split];
        let question = &body[split + QUESTION_MARKER.len()..];

        let subject = Self::subject(question)?;
        let needle = format!("{} is ", subject.to_ascii_lowercase());
        // ASCII lowercasing keeps byte offsets aligned with `reference`.
        let haystack = reference.to_ascii_lowercase();
        let start = haystack.find(&needle)? + needle.len();

        let rest = &reference[start..];
        let end = rest.find(['.', '\n']).unwrap_or(rest.len());
        let answer = rest[..end].trim();
        (!answer.is_empty()).then(|| answer.to_string())
    }

    fn subject(question: &str) -> Option<&str> {
        let question = question.trim().trim_end_matches('?').trim();
        let lowered = question.to_ascii_lowercase();
        let subject = QUESTION_PREFIXES
            .iter()
            .find(|prefix| lowered.starts_with(*prefix))
            .map(|prefix| &question[prefix.len()..])
            .unwrap_or(question)
            .trim();
        (!subject.is_empty()).then_some(subject)
    }
}

impl Default for MockModelBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ModelBackend for MockModelBackend {
    async fn run(
        &self,
        agent: &AgentDefinition,
        message: &ChatMessage,
    ) -> Result<EventStream, DomainError> {
        let prompt = message.first_text().unwrap_or_default();
        let event = ResponseEvent::final_response(
            agent.name(),
            Some(ChatMessage::model(Self::reply(prompt))),
        );
        Ok(stream::iter(vec![Ok(event)]).boxed())
    }

    fn name(&self) -> &str {
        "mock-model"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::compose_prompt;

    #[test]
    fn test_reply_extracts_fact() {
        let prompt = compose_prompt("X is Y", "What is X?");
        assert_eq!(MockModelBackend::reply(&prompt), "Y");
    }

    #[test]
    fn test_reply_stops_at_sentence_end() {
        let prompt = compose_prompt(
            "Intro line.\nThe capital of France is Paris. Berlin is in Germany.",
            "what is the capital of France?",
        );
        assert_eq!(MockModelBackend::reply(&prompt), "Paris");
    }

    #[test]
    fn test_reply_falls_back_to_not_found() {
        let prompt = compose_prompt("X is Y", "What is Z?");
        assert_eq!(MockModelBackend::reply(&prompt), NOT_IN_REFERENCE);

        assert_eq!(MockModelBackend::reply("free text"), NOT_IN_REFERENCE);
    }

    #[tokio::test]
    async fn test_run_emits_single_final_event() {
        let backend = MockModelBackend::new();
        let message = ChatMessage::user(compose_prompt("X is Y", "What is X?"));

        let events: Vec<_> = backend
            .run(&AgentDefinition::text_qa(), &message)
            .await
            .unwrap()
            .collect()
            .await;

        assert_eq!(events.len(), 1);
        let event = events[0].as_ref().unwrap();
        assert!(event.is_final_response());
        assert_eq!(event.first_text(), Some("Y"));
    }
}
