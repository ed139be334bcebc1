pub mod application;
pub mod cli;
pub mod connector;
pub mod domain;

pub use cli::{Commands, OutputFormat, ReferencePolicyArg};

pub use application::{
    compose_prompt, AnswerQuestionUseCase, AskAgentUseCase, EventStream, ModelBackend,
    ReferenceSource, SessionHandle, SessionRepository, DEFAULT_TIMEOUT,
};

pub use connector::api::{Container, ContainerConfig, Router};
pub use connector::{
    read_reference, FileReferenceSource, GeminiBackend, GeminiEndpoint, InMemorySessionRepository,
    MockModelBackend, ScriptedModelBackend,
};

pub use domain::{
    AgentDefinition, Answer, AnswerStatus, ChatMessage, DomainError, Part, ReferenceLoad,
    ReferencePolicy, ReferenceText, ResponseEvent, Role, Session, SessionEntry, SessionKey,
    TurnState, MAX_SESSION_ENTRIES, NO_FINAL_RESPONSE, NOT_IN_REFERENCE,
};
