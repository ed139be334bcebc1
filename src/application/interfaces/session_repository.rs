use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{DomainError, Session, SessionKey};

/// Shared handle to one session. Holding the lock serializes turns.
pub type SessionHandle = Arc<Mutex<Session>>;

#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Returns the session for `key`, creating it if absent. Idempotent.
    async fn ensure(&self, key: &SessionKey) -> Result<SessionHandle, DomainError>;

    async fn find(&self, key: &SessionKey) -> Result<Option<SessionHandle>, DomainError>;

    async fn count(&self) -> Result<usize, DomainError>;
}
