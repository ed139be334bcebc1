use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::{debug, info};

use crate::application::{
    AnswerQuestionUseCase, AskAgentUseCase, ModelBackend, ReferenceSource, SessionRepository,
    DEFAULT_TIMEOUT,
};
use crate::connector::adapter::{
    read_reference, FileReferenceSource, GeminiBackend, InMemorySessionRepository,
    MockModelBackend,
};
use crate::domain::{
    AgentDefinition, ReferenceLoad, ReferencePolicy, SessionKey, DEFAULT_MODEL,
    DEFAULT_REFERENCE_FILE,
};

pub struct ContainerConfig {
    pub reference_path: PathBuf,
    pub reference_policy: ReferencePolicy,
    /// Answer from the offline mock backend instead of Gemini.
    pub mock_model: bool,
    /// Model id; falls back to `GEMINI_MODEL`, then the agent default.
    pub model: Option<String>,
    pub timeout: Duration,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            reference_path: PathBuf::from(DEFAULT_REFERENCE_FILE),
            reference_policy: ReferencePolicy::default(),
            mock_model: false,
            model: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

pub struct Container {
    sessions: Arc<dyn SessionRepository>,
    backend: Arc<dyn ModelBackend>,
    reference: Arc<dyn ReferenceSource>,
    ask_use_case: Arc<AskAgentUseCase>,
    default_key: SessionKey,
    config: ContainerConfig,
}

impl Container {
    pub async fn new(config: ContainerConfig) -> Result<Self> {
        let backend: Arc<dyn ModelBackend> = if config.mock_model {
            debug!("Using mock model backend");
            Arc::new(MockModelBackend::new())
        } else {
            debug!("Using Gemini model backend");
            Arc::new(GeminiBackend::from_env())
        };

        Self::with_backend(config, backend).await
    }

    /// Builds the container around an already constructed backend.
    pub async fn with_backend(
        config: ContainerConfig,
        backend: Arc<dyn ModelBackend>,
    ) -> Result<Self> {
        let model = config
            .model
            .clone()
            .or_else(|| std::env::var("GEMINI_MODEL").ok())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let agent = AgentDefinition::text_qa().with_model(model);

        let sessions: Arc<dyn SessionRepository> = Arc::new(InMemorySessionRepository::new());
        let reference: Arc<dyn ReferenceSource> = Arc::new(
            FileReferenceSource::new(&config.reference_path, config.reference_policy).await,
        );

        // One logical conversation exists from startup onwards.
        let default_key = SessionKey::default();
        sessions.ensure(&default_key).await?;

        info!(
            "Agent {} on {} via {} (reference {:?}, policy {}, timeout {:?})",
            agent.name(),
            agent.model(),
            backend.name(),
            config.reference_path,
            config.reference_policy,
            config.timeout
        );

        let ask_use_case = Arc::new(
            AskAgentUseCase::new(backend.clone(), sessions.clone(), agent)
                .with_timeout(config.timeout),
        );

        Ok(Self {
            sessions,
            backend,
            reference,
            ask_use_case,
            default_key,
            config,
        })
    }

    pub fn answer_use_case(&self) -> AnswerQuestionUseCase {
        AnswerQuestionUseCase::new(self.reference.clone(), self.ask_use_case.clone())
    }

    pub fn ask_use_case(&self) -> Arc<AskAgentUseCase> {
        self.ask_use_case.clone()
    }

    pub fn sessions(&self) -> Arc<dyn SessionRepository> {
        self.sessions.clone()
    }

    pub fn default_session_key(&self) -> &SessionKey {
        &self.default_key
    }

    /// The default key, or the same app and user with `session_id`.
    pub fn session_key(&self, session_id: Option<&str>) -> SessionKey {
        match session_id.map(str::trim) {
            Some(id) if !id.is_empty() => self.default_key.with_session_id(id),
            _ => self.default_key.clone(),
        }
    }

    /// Reads the reference file directly, bypassing the caching policy.
    pub async fn check_reference(&self) -> ReferenceLoad {
        read_reference(&self.config.reference_path).await
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    pub fn reference_path(&self) -> &Path {
        &self.config.reference_path
    }

    pub fn reference_policy(&self) -> ReferencePolicy {
        self.config.reference_policy
    }
}
