// RAG.io streaming client - command-line entry point

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use ragio_client::services::streaming::{CallbackEvent, ChannelCallbacks};
use ragio_client::storage::{ConfigService, FileTokenStore};
use ragio_client::utils::logging::init_logging;
use ragio_client::{
    ConfigOverrides, CredentialProvider, LogFormat, StaticToken, StreamRequest, StreamingService,
    TransportKind,
};

#[derive(Parser, Debug)]
#[command(name = "ragio-stream")]
#[command(about = "Stream chat responses from a RAG.io backend", long_about = None)]
struct Cli {
    /// Config file (defaults to ~/.ragio/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Backend base URL
    #[arg(long, global = true, env = "RAGIO_API_BASE")]
    api_base: Option<String>,

    /// Log level or filter directive
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Log format (pretty, json)
    #[arg(long, global = true)]
    log_format: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Send a message and stream the response to stdout
    Chat(ChatArgs),
    /// Manage the stored bearer token
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },
}

#[derive(Args, Debug)]
struct ChatArgs {
    /// Message to send
    message: String,

    /// Transport (sse, websocket)
    #[arg(long, default_value = "sse")]
    transport: TransportKind,

    #[arg(long)]
    conversation_id: Option<String>,

    /// Provider name understood by the backend
    #[arg(long)]
    provider: Option<String>,

    #[arg(long)]
    model: Option<String>,

    #[arg(long)]
    temperature: Option<f64>,

    /// Reasoning mode (standard, cot, deep)
    #[arg(long)]
    reasoning_mode: Option<String>,

    #[arg(long)]
    system_prompt: Option<String>,

    /// Bearer token; takes precedence over the stored one
    #[arg(long, env = "RAGIO_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// End the stream after this many seconds without data
    #[arg(long)]
    idle_timeout: Option<u64>,

    /// Print the last N buffered events to stderr when done
    #[arg(long, value_name = "N")]
    show_buffer: Option<usize>,
}

#[derive(Subcommand, Debug)]
enum TokenAction {
    /// Store a bearer token
    Set { value: String },
    /// Remove the stored bearer token
    Clear,
}

fn parse_log_format(value: &str) -> Result<LogFormat> {
    match value.to_lowercase().as_str() {
        "pretty" => Ok(LogFormat::Pretty),
        "json" => Ok(LogFormat::Json),
        other => anyhow::bail!("Unknown log format: {}", other),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_service = match &cli.config {
        Some(path) => ConfigService::open(path),
        None => ConfigService::new(),
    }
    .context("Failed to load configuration")?;

    let mut config = config_service.get_config_clone();
    config.apply_overrides(ConfigOverrides {
        api_base: cli.api_base.clone(),
        log_level: cli.log_level.clone(),
        log_format: cli.log_format.as_deref().map(parse_log_format).transpose()?,
        idle_timeout_secs: match &cli.command {
            Command::Chat(args) => args.idle_timeout,
            Command::Token { .. } => None,
        },
    });
    init_logging(&config.logging).context("Failed to initialize logging")?;
    tracing::debug!("Using config {}", config_service.path().display());

    match cli.command {
        Command::Token { action } => {
            let store = FileTokenStore::new()?;
            match action {
                TokenAction::Set { value } => {
                    store.set_token(&value)?;
                    tracing::info!("Token stored in {}", store.path().display());
                }
                TokenAction::Clear => {
                    store.clear_token()?;
                    tracing::info!("Token removed from {}", store.path().display());
                }
            }
            Ok(())
        }
        Command::Chat(args) => run_chat(config, args).await,
    }
}

async fn run_chat(config: ragio_client::ClientConfig, args: ChatArgs) -> Result<()> {
    let mut request = StreamRequest::new(args.message);
    if let Some(id) = args.conversation_id {
        request = request.with_conversation(id);
    }
    if let Some(provider) = args.provider {
        request = request.with_provider(provider);
    }
    if let Some(model) = args.model {
        request = request.with_model(model);
    }
    if let Some(temperature) = args.temperature {
        request = request.with_temperature(temperature);
    }
    if let Some(mode) = args.reasoning_mode {
        request = request.with_reasoning_mode(mode);
    }
    if let Some(prompt) = args.system_prompt {
        request = request.with_system_prompt(prompt);
    }
    request.validate()?;

    let credentials: Arc<dyn CredentialProvider> = match args.token {
        Some(token) => Arc::new(StaticToken::new(token)),
        None => Arc::new(FileTokenStore::new()?),
    };
    let service = StreamingService::new(&config, credentials)?;

    let (callbacks, mut events) = ChannelCallbacks::channel();
    let stream = {
        let service = service.clone();
        let transport = args.transport;
        tokio::spawn(async move {
            service
                .start_stream(transport, &request, Arc::new(callbacks))
                .await
        })
    };

    let mut failed = false;
    let mut stdout = std::io::stdout();
    loop {
        tokio::select! {
            event = events.recv() => match event {
                Some(CallbackEvent::Content(fragment)) => {
                    stdout.write_all(fragment.as_bytes())?;
                    stdout.flush()?;
                }
                Some(CallbackEvent::Complete(_)) => {
                    writeln!(stdout)?;
                }
                Some(CallbackEvent::Error(message)) => {
                    eprintln!("error: {}", message);
                    failed = true;
                }
                // All senders dropped: the stream task has finished.
                None => break,
            },
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted; closing stream");
                service.close();
                failed = true;
            }
        }
    }
    stream.await.context("Stream task panicked")?;

    if let Some(n) = args.show_buffer {
        for entry in service.recent_buffer(n) {
            eprintln!(
                "{} {} {}",
                entry.captured_at.to_rfc3339(),
                entry.event.event_type(),
                entry.event.data()
            );
        }
    }

    if failed {
        std::process::exit(1);
    }
    Ok(())
}
