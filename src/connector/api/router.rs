use anyhow::Result;
use tokio_util::sync::CancellationToken;

use crate::Commands;

use super::container::Container;
use super::controller::AskController;

pub struct Router<'a> {
    ask_controller: AskController<'a>,
    cancel: CancellationToken,
}

impl<'a> Router<'a> {
    pub fn new(container: &'a Container, cancel: CancellationToken) -> Self {
        Self {
            ask_controller: AskController::new(container),
            cancel,
        }
    }

    pub async fn route(&self, command: Commands) -> Result<String> {
        match command {
            Commands::Ask {
                question,
                session,
                format,
            } => {
                self.ask_controller
                    .ask(question, session, format, &self.cancel)
                    .await
            }
            Commands::Chat => unreachable!("Chat command is handled separately in main"),
            Commands::Serve { .. } => unreachable!("Serve command is handled separately in main"),
        }
    }
}
