use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ChatMessage, ResponseEvent};

pub const DEFAULT_APP_NAME: &str = "text_qa_chatbot";
pub const DEFAULT_USER_ID: &str = "user123";
pub const DEFAULT_SESSION_ID: &str = "session123";

/// Most entries a session log keeps; older ones are dropped first.
pub const MAX_SESSION_ENTRIES: usize = 64;

/// Identifies one conversation: (application, user, session).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionKey {
    app_name: String,
    user_id: String,
    session_id: String,
}

impl SessionKey {
    pub fn new(
        app_name: impl Into<String>,
        user_id: impl Into<String>,
        session_id: impl Into<String>,
    ) -> Self {
        Self {
            app_name: app_name.into(),
            user_id: user_id.into(),
            session_id: session_id.into(),
        }
    }

    /// Same application and user, different conversation.
    pub fn with_session_id(&self, session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            ..self.clone()
        }
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }
}

impl Default for SessionKey {
    fn default() -> Self {
        Self::new(DEFAULT_APP_NAME, DEFAULT_USER_ID, DEFAULT_SESSION_ID)
    }
}

impl std::fmt::Display for SessionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.app_name, self.user_id, self.session_id)
    }
}

/// Progress of the current turn.
///
/// `Idle -> Composing -> AwaitingModel -> Completed`, or one of the terminal
/// `Failed` / `Cancelled` states when the model call does not finish normally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnState {
    Idle,
    Composing,
    AwaitingModel,
    Completed,
    Failed,
    Cancelled,
}

impl TurnState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TurnState::Completed | TurnState::Failed | TurnState::Cancelled
        )
    }
}

/// Entry in a session's log.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SessionEntry {
    UserMessage { message: ChatMessage },
    Event { event: ResponseEvent },
}

/// In-memory conversation state for one [`SessionKey`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    key: SessionKey,
    created_at: DateTime<Utc>,
    state: TurnState,
    completed_turns: u64,
    entries: Vec<SessionEntry>,
}

impl Session {
    pub fn new(key: SessionKey) -> Self {
        Self {
            key,
            created_at: Utc::now(),
            state: TurnState::Idle,
            completed_turns: 0,
            entries: Vec::new(),
        }
    }

    pub fn key(&self) -> &SessionKey {
        &self.key
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn state(&self) -> TurnState {
        self.state
    }

    pub fn completed_turns(&self) -> u64 {
        self.completed_turns
    }

    pub fn entries(&self) -> &[SessionEntry] {
        &self.entries
    }

    /// Starts a new turn in `Composing`. Any previous terminal state is
    /// discarded.
    pub fn begin_turn(&mut self, message: ChatMessage) {
        self.state = TurnState::Composing;
        self.push_entry(SessionEntry::UserMessage { message });
    }

    pub fn set_state(&mut self, state: TurnState) {
        if state == TurnState::Completed && self.state != TurnState::Completed {
            self.completed_turns += 1;
        }
        self.state = state;
    }

    pub fn record_event(&mut self, event: ResponseEvent) {
        self.push_entry(SessionEntry::Event { event });
    }

    fn push_entry(&mut self, entry: SessionEntry) {
        self.entries.push(entry);
        if self.entries.len() > MAX_SESSION_ENTRIES {
            let excess = self.entries.len() - MAX_SESSION_ENTRIES;
            self.entries.drain(..excess);
        }
    }
}
