use clap::{Subcommand, ValueEnum};

use crate::domain::ReferencePolicy;

#[derive(Subcommand)]
pub enum Commands {
    /// Interactive question loop on the terminal
    Chat,

    /// Ask a single question and print the answer
    Ask {
        question: String,

        /// Conversation to use instead of the default session
        #[arg(short, long)]
        session: Option<String>,

        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Serve the chat HTTP API
    Serve {
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        #[arg(short, long, default_value = "8000")]
        port: u16,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Command-line spelling of [`ReferencePolicy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReferencePolicyArg {
    /// Re-read the reference file for every question
    PerRequest,
    /// Read the reference file once at startup
    Startup,
}

impl From<ReferencePolicyArg> for ReferencePolicy {
    fn from(arg: ReferencePolicyArg) -> Self {
        match arg {
            ReferencePolicyArg::PerRequest => ReferencePolicy::PerRequest,
            ReferencePolicyArg::Startup => ReferencePolicy::Startup,
        }
    }
}
