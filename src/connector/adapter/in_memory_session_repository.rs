//! In-memory session storage.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use crate::application::{SessionHandle, SessionRepository};
use crate::domain::{DomainError, Session, SessionKey};

/// Process-wide session table. Sessions live until the process exits.
pub struct InMemorySessionRepository {
    sessions: Arc<Mutex<HashMap<SessionKey, SessionHandle>>>,
}

impl InMemorySessionRepository {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl Default for InMemorySessionRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn ensure(&self, key: &SessionKey) -> Result<SessionHandle, DomainError> {
        let mut sessions = self.sessions.lock().await;
        let handle = sessions.entry(key.clone()).or_insert_with(|| {
            debug!("Created session {}", key);
            Arc::new(Mutex::new(Session::new(key.clone())))
        });
        Ok(Arc::clone(handle))
    }

    async fn find(&self, key: &SessionKey) -> Result<Option<SessionHandle>, DomainError> {
        let sessions = self.sessions.lock().await;
        Ok(sessions.get(key).cloned())
    }

    async fn count(&self) -> Result<usize, DomainError> {
        Ok(self.sessions.lock().await.len())
    }
}
