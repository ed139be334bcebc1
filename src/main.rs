use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::BufReader;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use refchat::connector::http;
use refchat::connector::terminal::{run_chat_loop, ChatExit};
use refchat::{Commands, Container, ContainerConfig, ReferencePolicyArg, Router};

#[derive(Parser)]
#[command(name = "refchat")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Reference text the agent must answer from
    #[arg(short, long, global = true, default_value = "reason_final.txt")]
    reference: PathBuf,

    #[arg(long, global = true, value_enum, default_value = "per-request")]
    reference_policy: ReferencePolicyArg,

    /// Answer offline from the reference instead of calling Gemini
    #[arg(long, global = true)]
    mock_model: bool,

    /// Gemini model id (default: $GEMINI_MODEL or gemini-2.0-flash)
    #[arg(long, global = true)]
    model: Option<String>,

    /// Seconds to wait for the model before giving up
    #[arg(long, global = true, default_value = "60")]
    timeout_secs: u64,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over --verbose when set.
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = ContainerConfig {
        reference_path: cli.reference,
        reference_policy: cli.reference_policy.into(),
        mock_model: cli.mock_model,
        model: cli.model,
        timeout: Duration::from_secs(cli.timeout_secs),
    };
    let container = Arc::new(Container::new(config).await?);

    let shutdown = CancellationToken::new();
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Interrupt received, shutting down");
                shutdown.cancel();
            }
        });
    }

    match cli.command {
        Commands::Chat => {
            let input = BufReader::new(tokio::io::stdin());
            let mut output = tokio::io::stdout();
            let exit = run_chat_loop(&container, input, &mut output, &shutdown).await?;
            if exit == ChatExit::ReferenceUnavailable {
                std::process::exit(1);
            }
        }
        Commands::Serve { host, port } => {
            let addr: SocketAddr = format!("{host}:{port}")
                .parse()
                .with_context(|| format!("invalid listen address {host}:{port}"))?;
            http::serve(container, addr, shutdown).await?;
        }
        command => {
            let router = Router::new(&container, shutdown.clone());
            let output = router.route(command).await?;
            println!("{}", output);
        }
    }

    Ok(())
}

#[cfg(test)]
mod cli_tests {
    use super::*;

    #[test]
    fn defaults_match_reference_setup() {
        let cli = Cli::try_parse_from(["refchat", "chat"]).unwrap();
        assert_eq!(cli.reference, PathBuf::from("reason_final.txt"));
        assert_eq!(cli.reference_policy, ReferencePolicyArg::PerRequest);
        assert_eq!(cli.timeout_secs, 60);
        assert!(!cli.mock_model);
    }

    #[test]
    fn serve_defaults_to_port_8000() {
        let cli = Cli::try_parse_from(["refchat", "serve"]).unwrap();
        match cli.command {
            Commands::Serve { host, port } => {
                assert_eq!(host, "127.0.0.1");
                assert_eq!(port, 8000);
            }
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn ask_requires_question() {
        assert!(Cli::try_parse_from(["refchat", "ask"]).is_err());
        assert!(Cli::try_parse_from(["refchat", "--mock-model", "ask", "What is X?"]).is_ok());
    }
}
