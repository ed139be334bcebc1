use serde::{Deserialize, Serialize};

pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Reply the agent is instructed to give when the reference lacks an answer.
pub const NOT_IN_REFERENCE: &str =
    "sorry I could not find that in the reference as my knowledge is limited.";

const DEFAULT_DESCRIPTION: &str = "Answers questions based only on the provided reference \
text answer should be short and concise.";

/// Static description of the question-answering agent sent with every call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentDefinition {
    name: String,
    model: String,
    description: String,
    instruction: String,
}

impl AgentDefinition {
    pub fn new(
        name: impl Into<String>,
        model: impl Into<String>,
        description: impl Into<String>,
        instruction: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
            description: description.into(),
            instruction: instruction.into(),
        }
    }

    /// The reference-grounded QA agent.
    pub fn text_qa() -> Self {
        Self::new(
            "text_qa",
            DEFAULT_MODEL,
            DEFAULT_DESCRIPTION,
            format!(
                "you are a regulatory and market access intelligence assistant expert. \
                 Do simple normal conversation like a chatbot. \
                 You are a helpful assistant. \
                 Use ONLY the reference text given. \
                 If the answer is not in the text, say '{NOT_IN_REFERENCE}' \
                 Always respond in clear, meaningful full sentences."
            ),
        )
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn instruction(&self) -> &str {
        &self.instruction
    }

    /// Description and instruction combined into one system prompt.
    pub fn system_prompt(&self) -> String {
        format!("{}\n\n{}", self.description, self.instruction)
    }
}

impl Default for AgentDefinition {
    fn default() -> Self {
        Self::text_qa()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_qa_defaults() {
        let agent = AgentDefinition::text_qa();
        assert_eq!(agent.name(), "text_qa");
        assert_eq!(agent.model(), "gemini-2.0-flash");
        assert!(agent.instruction().contains("Use ONLY the reference text given."));
        assert!(agent.instruction().contains(NOT_IN_REFERENCE));
    }

    #[test]
    fn test_with_model_overrides_model_only() {
        let agent = AgentDefinition::text_qa().with_model("gemini-1.5-pro");
        assert_eq!(agent.model(), "gemini-1.5-pro");
        assert_eq!(agent.name(), "text_qa");
    }

    #[test]
    fn test_system_prompt_contains_both_parts() {
        let agent = AgentDefinition::text_qa();
        let prompt = agent.system_prompt();
        assert!(prompt.starts_with(agent.description()));
        assert!(prompt.ends_with(agent.instruction()));
    }
}
