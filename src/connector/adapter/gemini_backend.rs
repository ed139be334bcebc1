use std::time::Duration;

use async_trait::async_trait;
use futures_util::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::application::{EventStream, ModelBackend};
use crate::domain::{AgentDefinition, ChatMessage, DomainError, Part, ResponseEvent, Role};

pub const GENERATIVE_LANGUAGE_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_VERTEX_LOCATION: &str = "us-central1";

/// Which Google API serves the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeminiEndpoint {
    /// Generative Language API, authenticated with an API key.
    GenerativeLanguage,
    /// Vertex AI, authenticated with a bearer token.
    VertexAi { project: String, location: String },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    system_instruction: ApiContent<'a>,
    contents: Vec<ApiContent<'a>>,
}

#[derive(Serialize)]
struct ApiContent<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<ApiPart<'a>>,
}

#[derive(Serialize)]
struct ApiPart<'a> {
    text: &'a str,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// [`ModelBackend`] for Google Gemini models.
///
/// Configured from the environment:
///
/// | Variable                    | Default                    | Purpose                          |
/// |-----------------------------|----------------------------|----------------------------------|
/// | `GOOGLE_API_KEY`            | none                       | API key, or bearer token on Vertex |
/// | `GOOGLE_GENAI_USE_VERTEXAI` | `false`                    | Route calls to Vertex AI         |
/// | `GOOGLE_CLOUD_PROJECT`      | `""`                       | Vertex project                   |
/// | `GOOGLE_CLOUD_LOCATION`     | `us-central1`              | Vertex region                    |
/// | `GEMINI_BASE_URL`           | per endpoint               | Override the API host            |
///
/// A missing key is not an error at construction time; the first call fails.
/// Each reply becomes a single final [`ResponseEvent`].
pub struct GeminiBackend {
    client: reqwest::Client,
    api_key: Option<String>,
    endpoint: GeminiEndpoint,
    base_url: String,
}

impl GeminiBackend {
    pub fn new(
        api_key: Option<String>,
        endpoint: GeminiEndpoint,
        base_url: Option<String>,
    ) -> Self {
        let base_url = base_url
            .unwrap_or_else(|| match &endpoint {
                GeminiEndpoint::GenerativeLanguage => GENERATIVE_LANGUAGE_BASE_URL.to_string(),
                GeminiEndpoint::VertexAi { location, .. } => {
                    format!("https://{location}-aiplatform.googleapis.com")
                }
            })
            .trim_end_matches('/')
            .to_string();

        Self {
            client: reqwest::Client::builder()
                .connect_timeout(Duration::from_secs(10))
                .build()
                .unwrap_or_default(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            endpoint,
            base_url,
        }
    }

    pub fn from_env() -> Self {
        let api_key = std::env::var("GOOGLE_API_KEY").ok();
        if api_key.is_none() {
            warn!("GOOGLE_API_KEY is not set; model calls will fail");
        }

        let use_vertex = std::env::var("GOOGLE_GENAI_USE_VERTEXAI")
            .map(|v| parse_flag(&v))
            .unwrap_or(false);
        let endpoint = if use_vertex {
            GeminiEndpoint::VertexAi {
                project: std::env::var("GOOGLE_CLOUD_PROJECT").unwrap_or_default(),
                location: std::env::var("GOOGLE_CLOUD_LOCATION")
                    .unwrap_or_else(|_| DEFAULT_VERTEX_LOCATION.to_string()),
            }
        } else {
            GeminiEndpoint::GenerativeLanguage
        };

        Self::new(api_key, endpoint, std::env::var("GEMINI_BASE_URL").ok())
    }

    pub fn endpoint(&self) -> &GeminiEndpoint {
        &self.endpoint
    }

    fn url(&self, model: &str) -> String {
        match &self.endpoint {
            GeminiEndpoint::GenerativeLanguage => {
                format!("{}/v1beta/models/{model}:generateContent", self.base_url)
            }
            GeminiEndpoint::VertexAi { project, location } => format!(
                "{}/v1/projects/{project}/locations/{location}/publishers/google/models/{model}:generateContent",
                self.base_url
            ),
        }
    }

    fn authorize(&self, request: reqwest::RequestBuilder, key: &str) -> reqwest::RequestBuilder {
        match self.endpoint {
            GeminiEndpoint::GenerativeLanguage => request.header("x-goog-api-key", key),
            GeminiEndpoint::VertexAi { .. } => request.bearer_auth(key),
        }
    }

    /// Maps a reply to one final event carrying the first candidate's parts,
    /// or no content when it has none. Non-text parts keep their position as
    /// empty parts.
    fn to_event(agent: &AgentDefinition, response: GenerateContentResponse) -> ResponseEvent {
        let candidate = response.candidates.into_iter().next();
        if let Some(reason) = candidate.as_ref().and_then(|c| c.finish_reason.as_deref()) {
            debug!("GeminiBackend: finish reason {reason}");
        }

        let parts: Vec<Part> = candidate
            .and_then(|c| c.content)
            .map(|c| c.parts)
            .unwrap_or_default()
            .into_iter()
            .map(|p| p.text.map(Part::text).unwrap_or_else(Part::empty))
            .collect();

        let content = (!parts.is_empty()).then(|| ChatMessage::new(Role::Model, parts));
        ResponseEvent::final_response(agent.name(), content)
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[async_trait]
impl ModelBackend for GeminiBackend {
    async fn run(
        &self,
        agent: &AgentDefinition,
        message: &ChatMessage,
    ) -> Result<EventStream, DomainError> {
        let key = self
            .api_key
            .as_deref()
            .ok_or_else(|| DomainError::model("GeminiBackend: GOOGLE_API_KEY is not set"))?;

        let system_prompt = agent.system_prompt();
        let request = GenerateContentRequest {
            system_instruction: ApiContent {
                role: None,
                parts: vec![ApiPart {
                    text: &system_prompt,
                }],
            },
            contents: vec![ApiContent {
                role: Some(message.role().as_str()),
                parts: message
                    .parts()
                    .iter()
                    .filter_map(Part::as_text)
                    .map(|text| ApiPart { text })
                    .collect(),
            }],
        };

        let url = self.url(agent.model());
        debug!("GeminiBackend: POST {url}");

        let response = self
            .authorize(self.client.post(&url), key)
            .json(&request)
            .send()
            .await
            .map_err(|e| DomainError::model(format!("GeminiBackend: request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!("GeminiBackend: API returned {status}: {body}");
            let detail = serde_json::from_str::<ApiErrorBody>(&body)
                .map(|b| b.error.message)
                .unwrap_or_else(|_| status.to_string());
            return Err(DomainError::model(format!(
                "GeminiBackend: API returned {status}: {detail}"
            )));
        }

        let api_response: GenerateContentResponse = response.json().await.map_err(|e| {
            DomainError::model(format!("GeminiBackend: failed to parse response: {e}"))
        })?;

        let event = Self::to_event(agent, api_response);
        Ok(stream::iter(vec![Ok(event)]).boxed())
    }

    fn name(&self) -> &str {
        match self.endpoint {
            GeminiEndpoint::GenerativeLanguage => "gemini",
            GeminiEndpoint::VertexAi { .. } => "gemini-vertex",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generative_language_url() {
        let backend = GeminiBackend::new(Some("k".into()), GeminiEndpoint::GenerativeLanguage, None);
        assert_eq!(
            backend.url("gemini-2.0-flash"),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent"
        );
    }

    #[test]
    fn test_vertex_url_uses_region_host() {
        let backend = GeminiBackend::new(
            Some("token".into()),
            GeminiEndpoint::VertexAi {
                project: "proj".into(),
                location: "europe-west4".into(),
            },
            None,
        );
        assert_eq!(
            backend.url("gemini-2.0-flash"),
            "https://europe-west4-aiplatform.googleapis.com/v1/projects/proj/locations/europe-west4/publishers/google/models/gemini-2.0-flash:generateContent"
        );
        assert_eq!(backend.name(), "gemini-vertex");
        assert!(matches!(
            backend.endpoint(),
            GeminiEndpoint::VertexAi { project, location }
                if project == "proj" && location == "europe-west4"
        ));
    }

    #[test]
    fn test_base_url_override_trims_slash() {
        let backend = GeminiBackend::new(
            None,
            GeminiEndpoint::GenerativeLanguage,
            Some("http://localhost:9000/".into()),
        );
        assert_eq!(
            backend.url("m"),
            "http://localhost:9000/v1beta/models/m:generateContent"
        );
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("True"));
        assert!(parse_flag("1"));
        assert!(!parse_flag("False"));
        assert!(!parse_flag(""));
    }

    #[test]
    fn test_to_event_takes_first_candidate_text() {
        let json = r#"{
            "candidates": [
                {"content": {"role": "model", "parts": [{"text": "Y"}, {"text": "more"}]}, "finishReason": "STOP"},
                {"content": {"role": "model", "parts": [{"text": "other"}]}}
            ]
        }"#;
        let response: GenerateContentResponse = serde_json::from_str(json).unwrap();
        let event = GeminiBackend::to_event(&AgentDefinition::text_qa(), response);

        assert!(event.is_final_response());
        assert_eq!(event.first_text(), Some("Y"));
        assert_eq!(event.content().unwrap().parts().len(), 2);
    }

    #[test]
    fn test_to_event_keeps_non_text_first_part() {
        let json = r#"{
            "candidates": [
                {"content": {"role": "model", "parts": [
                    {"functionCall": {"name": "lookup", "args": {}}},
                    {"text": "later"}
                ]}}
            ]
        }"#;
        let response: GenerateContentResponse = serde_json::from_str(json).unwrap();
        let event = GeminiBackend::to_event(&AgentDefinition::text_qa(), response);

        assert_eq!(event.content().unwrap().parts().len(), 2);
        assert_eq!(event.first_text(), None);
    }

    #[test]
    fn test_to_event_without_candidates_has_no_content() {
        let json = r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#;
        let response: GenerateContentResponse = serde_json::from_str(json).unwrap();
        let event = GeminiBackend::to_event(&AgentDefinition::text_qa(), response);

        assert!(event.is_final_response());
        assert!(event.content().is_none());
    }

    #[test]
    fn test_request_serializes_camel_case() {
        let request = GenerateContentRequest {
            system_instruction: ApiContent {
                role: None,
                parts: vec![ApiPart { text: "sys" }],
            },
            contents: vec![ApiContent {
                role: Some("user"),
                parts: vec![ApiPart { text: "hi" }],
            }],
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["systemInstruction"]["parts"][0]["text"], "sys");
        assert!(value["systemInstruction"].get("role").is_none());
        assert_eq!(value["contents"][0]["role"], "user");
    }

    #[tokio::test]
    async fn test_missing_key_fails_at_first_call() {
        let backend = GeminiBackend::new(None, GeminiEndpoint::GenerativeLanguage, None);
        let result = backend
            .run(&AgentDefinition::text_qa(), &ChatMessage::user("q"))
            .await;

        match result {
            Err(e) => assert!(e.to_string().contains("GOOGLE_API_KEY")),
            Ok(_) => panic!("expected missing key error"),
        }
    }
}
