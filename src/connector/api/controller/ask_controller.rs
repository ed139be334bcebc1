use anyhow::Result;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::cli::OutputFormat;
use crate::domain::{Answer, AnswerStatus};

use super::super::Container;

#[derive(Serialize)]
struct AskOutput<'a> {
    response: &'a str,
    status: AnswerStatus,
}

pub struct AskController<'a> {
    container: &'a Container,
}

impl<'a> AskController<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    pub async fn ask(
        &self,
        question: String,
        session: Option<String>,
        format: OutputFormat,
        cancel: &CancellationToken,
    ) -> Result<String> {
        let key = self.container.session_key(session.as_deref());
        let use_case = self.container.answer_use_case();
        let answer = use_case.answer(&key, &question, cancel).await?;

        match format {
            OutputFormat::Text => Ok(self.format_text(&answer)),
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&AskOutput {
                response: answer.text(),
                status: answer.status(),
            })?),
        }
    }

    fn format_text(&self, answer: &Answer) -> String {
        match answer.status() {
            AnswerStatus::AnsweredWithoutReference => format!(
                "{}\n\n(reference text unavailable: {})",
                answer.text(),
                self.container.reference_path().display()
            ),
            _ => answer.text().to_string(),
        }
    }
}
