use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use tokio::io::{
    AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader,
};

use prompt_dispatch::{
    validate_provider_config, Dispatcher, OptimizeMessage, OptimizeResponse, Provider, Settings,
};

mod logging;

use logging::init_logging;

#[derive(Parser)]
#[command(name = "prompt-optimizer")]
#[command(about = "Rewrite a draft prompt into a clearer, more structured one")]
#[command(version)]
struct Cli {
    /// Settings file (.json or .toml). Defaults to ~/.prompt-optimizer/config.json
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, short, global = true, env = "DEBUG", default_value = "false")]
    debug: bool,

    /// Log filter (overrides --debug)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rewrite one prompt and print the result
    Optimize {
        /// Provider to use instead of the one in settings
        #[arg(long, short)]
        provider: Option<String>,

        /// Prompt text; read from stdin when omitted
        text: Option<String>,
    },
    /// Serve JSON messages, one per line, on stdin/stdout
    Stdio,
    /// List providers and whether the current settings can use them
    Providers,
}

fn load_settings(path: Option<&PathBuf>) -> anyhow::Result<Settings> {
    match path {
        Some(path) => {
            let mut settings = Settings::load_from(path)?;
            settings.apply_env_overrides();
            Ok(settings)
        }
        None => Ok(Settings::load()?),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.debug, cli.log_level.as_deref());

    let settings = load_settings(cli.config.as_ref())?;
    log::debug!(
        "Selected provider in settings: {}",
        settings.provider.as_deref().unwrap_or("<none>")
    );

    let dispatcher = Dispatcher::new();

    match cli.command {
        Commands::Optimize { provider, text } => {
            optimize(&dispatcher, &settings, provider, text).await
        }
        Commands::Stdio => serve_stdio(&dispatcher, &settings).await,
        Commands::Providers => {
            list_providers(&settings);
            Ok(())
        }
    }
}

async fn optimize(
    dispatcher: &Dispatcher,
    settings: &Settings,
    provider: Option<String>,
    text: Option<String>,
) -> anyhow::Result<()> {
    let text = match text {
        Some(text) => text,
        None => {
            let mut buf = String::new();
            tokio::io::stdin().read_to_string(&mut buf).await?;
            buf
        }
    };

    let message = OptimizeMessage {
        provider,
        prompt_text: text,
    };

    match dispatcher.handle(message, settings).await {
        OptimizeResponse::Optimized { optimized_text } => {
            println!("{optimized_text}");
            Ok(())
        }
        OptimizeResponse::Failed { error } => {
            eprintln!("{} {}", "Optimization Error:".red(), error);
            std::process::exit(1);
        }
    }
}

async fn serve_stdio(dispatcher: &Dispatcher, settings: &Settings) -> anyhow::Result<()> {
    serve_lines(
        dispatcher,
        settings,
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
    )
    .await
}

/// Answer each non-blank JSON line on `input` with one JSON line on `output`.
async fn serve_lines<R, W>(
    dispatcher: &Dispatcher,
    settings: &Settings,
    input: R,
    mut output: W,
) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<OptimizeMessage>(&line) {
            Ok(message) => dispatcher.handle(message, settings).await,
            Err(e) => {
                log::warn!("Rejected inbound message: {}", e);
                OptimizeResponse::Failed {
                    error: format!("Invalid message: {e}"),
                }
            }
        };

        let mut out = serde_json::to_string(&response)?;
        out.push('\n');
        output.write_all(out.as_bytes()).await?;
        output.flush().await?;
    }

    Ok(())
}

fn list_providers(settings: &Settings) {
    let selected = settings
        .provider
        .as_deref()
        .and_then(|name| name.parse::<Provider>().ok());

    for provider in Provider::ALL {
        let marker = if Some(provider) == selected { "*" } else { " " };
        let status = match validate_provider_config(provider, &settings.providers) {
            Ok(()) => "ready".green(),
            Err(_) if provider.requires_api_key() => "no API key".yellow(),
            Err(_) => "no endpoint".yellow(),
        };
        println!(
            "{} {:<8} {:<12} {}",
            marker,
            provider.as_str(),
            provider.label(),
            status
        );
    }
}
