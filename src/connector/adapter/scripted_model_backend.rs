use async_trait::async_trait;
use futures_util::stream::{self, StreamExt};
use tokio::sync::Mutex;

use crate::application::{EventStream, ModelBackend};
use crate::domain::{AgentDefinition, ChatMessage, DomainError, ResponseEvent};

/// Replays a fixed list of events for every call. Used to simulate model
/// replies in tests.
pub struct ScriptedModelBackend {
    events: Vec<ResponseEvent>,
    failure: Option<String>,
    never_finish: bool,
    received: Mutex<Vec<ChatMessage>>,
}

impl ScriptedModelBackend {
    pub fn new(events: Vec<ResponseEvent>) -> Self {
        Self {
            events,
            failure: None,
            never_finish: false,
            received: Mutex::new(Vec::new()),
        }
    }

    /// Every call fails with a model error carrying `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::new(Vec::new())
        }
    }

    /// After the scripted events the stream stays open forever.
    pub fn never_finish(mut self) -> Self {
        self.never_finish = true;
        self
    }

    /// Messages received so far, oldest first.
    pub async fn received(&self) -> Vec<ChatMessage> {
        self.received.lock().await.clone()
    }
}

#[async_trait]
impl ModelBackend for ScriptedModelBackend {
    async fn run(
        &self,
        _agent: &AgentDefinition,
        message: &ChatMessage,
    ) -> Result<EventStream, DomainError> {
        self.received.lock().await.push(message.clone());

        if let Some(failure) = &self.failure {
            return Err(DomainError::model(failure.clone()));
        }

        let scripted = stream::iter(self.events.clone().into_iter().map(Ok));
        if self.never_finish {
            Ok(scripted.chain(stream::pending()).boxed())
        } else {
            Ok(scripted.boxed())
        }
    }

    fn name(&self) -> &str {
        "scripted-model"
    }
}
