use anyhow::Result;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::connector::api::Container;
use crate::domain::{DomainError, ReferenceLoad};

pub const QUESTION_PROMPT: &str = "Type your question: ";

/// How the interactive loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatExit {
    /// `exit`, `quit`, end of input or Ctrl-C.
    Finished,
    /// The reference file could not be read at startup.
    ReferenceUnavailable,
}

fn is_exit_command(line: &str) -> bool {
    let line = line.trim();
    line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit")
}

/// Runs the question loop in the default session until the user leaves.
///
/// The reference file must be readable when the loop starts; afterwards each
/// turn loads it according to the container's reference policy.
pub async fn run_chat_loop<R, W>(
    container: &Container,
    input: R,
    output: &mut W,
    shutdown: &CancellationToken,
) -> Result<ChatExit>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    if let ReferenceLoad::Unavailable { reason, .. } = container.check_reference().await {
        output
            .write_all(format!("❌ Error: {reason}\n").as_bytes())
            .await?;
        output.flush().await?;
        return Ok(ChatExit::ReferenceUnavailable);
    }

    output
        .write_all("💬 AI Text QA Chatbot (type 'exit' to quit)\n\n".as_bytes())
        .await?;
    output
        .write_all("📄 Reference text loaded.\n\n".as_bytes())
        .await?;

    let key = container.default_session_key().clone();
    let use_case = container.answer_use_case();
    let mut lines = input.lines();

    loop {
        output.write_all(QUESTION_PROMPT.as_bytes()).await?;
        output.flush().await?;

        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = shutdown.cancelled() => None,
        };

        let Some(question) = line else {
            debug!("Input closed");
            break;
        };
        if is_exit_command(&question) {
            break;
        }
        if question.trim().is_empty() {
            continue;
        }

        match use_case.answer(&key, &question, shutdown).await {
            Ok(answer) => {
                output
                    .write_all(format!("Bot: {}\n\n", answer.text()).as_bytes())
                    .await?;
            }
            Err(DomainError::Cancelled) => break,
            Err(e) => {
                output
                    .write_all(format!("❌ Error: {e}\n\n").as_bytes())
                    .await?;
            }
        }
    }

    output.write_all("👋 Goodbye!\n".as_bytes()).await?;
    output.flush().await?;
    info!("Chat loop finished");
    Ok(ChatExit::Finished)
}
