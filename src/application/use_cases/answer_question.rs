use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::application::use_cases::AskAgentUseCase;
use crate::application::ReferenceSource;
use crate::domain::{Answer, AnswerStatus, DomainError, SessionKey};

/// A full turn: load the reference, compose the prompt, ask the agent.
pub struct AnswerQuestionUseCase {
    reference: Arc<dyn ReferenceSource>,
    ask: Arc<AskAgentUseCase>,
}

impl AnswerQuestionUseCase {
    pub fn new(reference: Arc<dyn ReferenceSource>, ask: Arc<AskAgentUseCase>) -> Self {
        Self { reference, ask }
    }

    pub async fn answer(
        &self,
        key: &SessionKey,
        question: &str,
        cancel: &CancellationToken,
    ) -> Result<Answer, DomainError> {
        if question.trim().is_empty() {
            return Err(DomainError::invalid_input("question must not be empty"));
        }

        let reference = self.reference.load().await;
        if let Some(reason) = reference.reason() {
            warn!("Reference text unavailable, answering without it: {}", reason);
        }
        debug!(
            "Asking with {} reference bytes (policy {})",
            reference.text().len(),
            self.reference.policy()
        );

        let answer = self
            .ask
            .ask_grounded(key, reference.text(), question, cancel)
            .await?;

        if answer.status() == AnswerStatus::Answered && reference.is_degraded() {
            return Ok(Answer::new(
                answer.into_text(),
                AnswerStatus::AnsweredWithoutReference,
            ));
        }

        Ok(answer)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::connector::{
        FileReferenceSource, InMemorySessionRepository, MockModelBackend, ScriptedModelBackend,
    };
    use crate::domain::{AgentDefinition, ChatMessage, ReferencePolicy, ResponseEvent};

    fn answer_use_case(
        reference: FileReferenceSource,
        backend: Arc<dyn crate::application::ModelBackend>,
    ) -> AnswerQuestionUseCase {
        let ask = AskAgentUseCase::new(
            backend,
            Arc::new(InMemorySessionRepository::new()),
            AgentDefinition::text_qa(),
        );
        AnswerQuestionUseCase::new(Arc::new(reference), Arc::new(ask))
    }

    #[tokio::test]
    async fn test_answers_from_reference() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "X is Y").unwrap();
        let reference = FileReferenceSource::new(file.path(), ReferencePolicy::PerRequest).await;

        let use_case = answer_use_case(reference, Arc::new(MockModelBackend::new()));
        let answer = use_case
            .answer(&SessionKey::default(), "What is X?", &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(answer.text(), "Y");
        assert_eq!(answer.status(), AnswerStatus::Answered);
    }

    #[tokio::test]
    async fn test_model_receives_composed_prompt() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "Rust is a language").unwrap();
        let reference = FileReferenceSource::new(file.path(), ReferencePolicy::PerRequest).await;
        let backend = Arc::new(ScriptedModelBackend::new(vec![ResponseEvent::final_response(
            "text_qa",
            Some(ChatMessage::model("a language")),
        )]));

        let use_case = answer_use_case(reference, backend.clone());
        use_case
            .answer(&SessionKey::default(), "What is Rust?", &CancellationToken::new())
            .await
            .unwrap();

        let received = backend.received().await;
        assert_eq!(received.len(), 1);
        assert_eq!(
            received[0].first_text(),
            Some("Reference text:\nRust is a language\n\nQuestion: What is Rust?")
        );
    }

    #[tokio::test]
    async fn test_missing_reference_marks_answer_degraded() {
        let dir = tempfile::tempdir().unwrap();
        let reference =
            FileReferenceSource::new(dir.path().join("missing.txt"), ReferencePolicy::PerRequest)
                .await;
        let backend = ScriptedModelBackend::new(vec![ResponseEvent::final_response(
            "text_qa",
            Some(ChatMessage::model("general answer")),
        )]);

        let use_case = answer_use_case(reference, Arc::new(backend));
        let answer = use_case
            .answer(&SessionKey::default(), "What is X?", &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(answer.text(), "general answer");
        assert_eq!(answer.status(), AnswerStatus::AnsweredWithoutReference);
    }

    #[tokio::test]
    async fn test_placeholder_status_survives_degraded_reference() {
        let dir = tempfile::tempdir().unwrap();
        let reference =
            FileReferenceSource::new(dir.path().join("missing.txt"), ReferencePolicy::PerRequest)
                .await;
        let backend = ScriptedModelBackend::new(vec![ResponseEvent::final_response("text_qa", None)]);

        let use_case = answer_use_case(reference, Arc::new(backend));
        let answer = use_case
            .answer(&SessionKey::default(), "q", &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(answer.status(), AnswerStatus::NoFinalContent);
    }

    #[tokio::test]
    async fn test_blank_question_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let reference =
            FileReferenceSource::new(dir.path().join("ref.txt"), ReferencePolicy::PerRequest).await;

        let use_case = answer_use_case(reference, Arc::new(MockModelBackend::new()));
        let err = use_case
            .answer(&SessionKey::default(), "   ", &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::InvalidInput(_)));
    }
}
