use serde::{Deserialize, Serialize};

/// Substituted when the model never yields final text for a turn.
pub const NO_FINAL_RESPONSE: &str = "Agent did not produce a final response.";

/// How an answer came about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerStatus {
    /// The model answered with the reference in its prompt.
    Answered,
    /// The model answered, but the reference was unavailable or empty.
    AnsweredWithoutReference,
    /// No final text arrived; the text is [`NO_FINAL_RESPONSE`].
    NoFinalContent,
}

impl AnswerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnswerStatus::Answered => "answered",
            AnswerStatus::AnsweredWithoutReference => "answered_without_reference",
            AnswerStatus::NoFinalContent => "no_final_content",
        }
    }
}

impl std::fmt::Display for AnswerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    text: String,
    status: AnswerStatus,
}

impl Answer {
    pub fn new(text: impl Into<String>, status: AnswerStatus) -> Self {
        Self {
            text: text.into(),
            status,
        }
    }

    pub fn placeholder() -> Self {
        Self::new(NO_FINAL_RESPONSE, AnswerStatus::NoFinalContent)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn status(&self) -> AnswerStatus {
        self.status
    }

    pub fn into_text(self) -> String {
        self.text
    }
}
