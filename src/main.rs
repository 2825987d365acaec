//! Django Girls Offline CLI
//!
//! A terminal tutorial assistant backed by a locally hosted model.

use clap::{Args, Parser, Subcommand};
use django_girls_offline::{
    ChatClient, ChatSession, Mode, TerminalConsole, TutorConfig, TutorSession, Tutorial,
};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Django Girls Offline - learn Django with a local AI tutor
#[derive(Parser, Debug)]
#[command(name = "django-girls")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file (default: <config dir>/django-girls/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Model identifier on the inference server
    #[arg(long, global = true)]
    model: Option<String>,

    /// OpenAI-compatible base URL, e.g. http://localhost:5273/v1
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Verbose output: debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Skip the startup banner
    #[arg(long, global = true)]
    no_banner: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Guided tutorial (default)
    Tutor(TutorArgs),
    /// Plain streaming chat with the model
    Chat(ChatArgs),
}

#[derive(Args, Debug, Default)]
struct TutorArgs {
    /// How the model is asked to call tutorial actions
    #[arg(long, value_enum)]
    mode: Option<Mode>,
}

#[derive(Args, Debug)]
struct ChatArgs {
    /// Markdown file used as the system prompt
    #[arg(long)]
    system_prompt_file: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let runtime = tokio::runtime::Runtime::new()?;
    let result = runtime.block_on(run(cli));
    // A stdin read may still be parked on a blocking thread
    runtime.shutdown_background();
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let command = cli
        .command
        .unwrap_or_else(|| Command::Tutor(TutorArgs::default()));
    let mode = match &command {
        Command::Tutor(args) => args.mode,
        Command::Chat(_) => None,
    };

    let config = TutorConfig::load(cli.config.as_deref())?
        .with_env()
        .with_model(cli.model)
        .with_base_url(cli.base_url)
        .with_mode(mode);
    config.validate()?;
    info!("Using model {} at {}", config.model, config.base_url);

    let client = ChatClient::new(config.client_options())?;
    let mut console = TerminalConsole::stdio();
    if !cli.no_banner {
        console.print_banner()?;
    }

    match command {
        Command::Tutor(_) => {
            let mut session = TutorSession::new(client, console, Tutorial::new(), config.mode)
                .with_history_policy(config.history_limit, config.history_keep);
            let end = session.run().await?;
            info!("Tutorial session ended: {:?}", end);
        }
        Command::Chat(args) => {
            let system_prompt = match args.system_prompt_file {
                Some(path) => Some(tokio::fs::read_to_string(&path).await.map_err(|e| {
                    anyhow::anyhow!("Could not read system prompt {}: {}", path.display(), e)
                })?),
                None => None,
            };
            let mut session = ChatSession::new(client, console, system_prompt)
                .with_history_policy(config.history_limit, config.history_keep);
            session.run().await?;
        }
    }

    Ok(())
}

/// Log to stderr; stdout belongs to the conversation
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
