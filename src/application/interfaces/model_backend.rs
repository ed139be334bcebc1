use async_trait::async_trait;
use futures_util::stream::BoxStream;

use crate::domain::{AgentDefinition, ChatMessage, DomainError, ResponseEvent};

/// Events of one model reply, in delivery order.
pub type EventStream = BoxStream<'static, Result<ResponseEvent, DomainError>>;

/// Runs the agent against a hosted (or simulated) language model.
///
/// Implementors own transport and wire-format details. The returned stream
/// may be dropped before it is exhausted; callers stop reading at the first
/// final event.
#[async_trait]
pub trait ModelBackend: Send + Sync {
    async fn run(
        &self,
        agent: &AgentDefinition,
        message: &ChatMessage,
    ) -> Result<EventStream, DomainError>;

    fn name(&self) -> &str;
}
