use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_util::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::application::use_cases::compose_prompt;
use crate::application::{ModelBackend, SessionRepository};
use crate::domain::{
    AgentDefinition, Answer, AnswerStatus, ChatMessage, DomainError, Session, SessionKey,
    TurnState,
};

/// Upper bound on how long one turn may wait for its session and the model.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Sends one message to the agent within a session and extracts the answer.
pub struct AskAgentUseCase {
    backend: Arc<dyn ModelBackend>,
    sessions: Arc<dyn SessionRepository>,
    agent: AgentDefinition,
    timeout: Duration,
}

impl AskAgentUseCase {
    pub fn new(
        backend: Arc<dyn ModelBackend>,
        sessions: Arc<dyn SessionRepository>,
        agent: AgentDefinition,
    ) -> Self {
        Self {
            backend,
            sessions,
            agent,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn agent(&self) -> &AgentDefinition {
        &self.agent
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Runs one turn with `message_text` sent to the model verbatim.
    ///
    /// The first final event decides the answer: its first text part, or the
    /// placeholder when it carries none. The rest of the stream is not read.
    /// A stream that ends without a final event also yields the placeholder.
    /// The timeout covers the wait for the session as well as the model, and
    /// `cancel` aborts either. Backend errors are returned as-is; nothing is
    /// retried.
    pub async fn ask(
        &self,
        key: &SessionKey,
        message_text: &str,
        cancel: &CancellationToken,
    ) -> Result<Answer, DomainError> {
        self.run_turn(key, message_text, || message_text.to_string(), cancel)
            .await
    }

    /// Runs one turn for `question` against `reference`.
    ///
    /// The prompt is composed while the session is held in `Composing`. Only
    /// the question goes into the session log, never the reference text.
    pub async fn ask_grounded(
        &self,
        key: &SessionKey,
        reference: &str,
        question: &str,
        cancel: &CancellationToken,
    ) -> Result<Answer, DomainError> {
        self.run_turn(key, question, || compose_prompt(reference, question), cancel)
            .await
    }

    async fn run_turn<F>(
        &self,
        key: &SessionKey,
        logged_text: &str,
        compose: F,
        cancel: &CancellationToken,
    ) -> Result<Answer, DomainError>
    where
        F: FnOnce() -> String,
    {
        let handle = self.sessions.ensure(key).await?;
        let start_time = Instant::now();
        let deadline = tokio::time::Instant::now() + self.timeout;

        // Held for the whole turn: turns on the same key never interleave.
        let mut session = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                warn!("Session {}: cancelled while waiting for the session", key);
                return Err(DomainError::Cancelled);
            }
            guard = tokio::time::timeout_at(deadline, handle.lock()) => match guard {
                Ok(guard) => guard,
                Err(_) => {
                    warn!(
                        "Session {}: timed out after {:?} waiting for the session",
                        key, self.timeout
                    );
                    return Err(DomainError::Timeout(self.timeout));
                }
            },
        };

        session.begin_turn(ChatMessage::user(logged_text));
        let message = ChatMessage::user(compose());
        session.set_state(TurnState::AwaitingModel);
        debug!(
            "Session {}: awaiting {} via {} after {:?} in queue",
            key,
            self.agent.model(),
            self.backend.name(),
            start_time.elapsed()
        );

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(DomainError::Cancelled),
            outcome = tokio::time::timeout_at(deadline, self.consume(&message, &mut session)) => {
                outcome.unwrap_or_else(|_| Err(DomainError::Timeout(self.timeout)))
            }
        };

        let state = match &result {
            Ok(_) => TurnState::Completed,
            Err(DomainError::Cancelled) => TurnState::Cancelled,
            Err(_) => TurnState::Failed,
        };
        session.set_state(state);

        match &result {
            Ok(answer) => info!(
                "Session {}: turn completed in {:?} ({})",
                key,
                start_time.elapsed(),
                answer.status()
            ),
            Err(e) => warn!("Session {}: turn ended as {:?}: {}", key, state, e),
        }

        result
    }

    async fn consume(
        &self,
        message: &ChatMessage,
        session: &mut Session,
    ) -> Result<Answer, DomainError> {
        let mut events = self.backend.run(&self.agent, message).await?;
        let mut consumed = 0usize;

        while let Some(event) = events.next().await {
            let event = event?;
            consumed += 1;

            let is_final = event.is_final_response();
            let text = event.first_text().map(str::to_string);
            session.record_event(event);

            if is_final {
                return Ok(match text {
                    Some(text) => Answer::new(text, AnswerStatus::Answered),
                    None => {
                        warn!("Final response carried no text; using placeholder");
                        Answer::placeholder()
                    }
                });
            }
        }

        warn!(
            "Response stream ended after {} events without a final response",
            consumed
        );
        Ok(Answer::placeholder())
    }
}
