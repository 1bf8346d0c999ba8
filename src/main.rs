use std::io;
use std::path::PathBuf;
use std::sync::{Arc, PoisonError};

use clap::{Args, Parser, Subcommand};
use craving::config::{self, DEFAULT_API_URL};
use craving::conversation::{Conversation, PendingSubmission};
use craving::credentials::{FileStore, Provider, SharedCredentials, shared};
use craving::suggest::{SuggestError, SuggestionClient, SuggestionResponse, SuggestionSource};
use craving::view;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

type Credentials = SharedCredentials<FileStore>;
type Settled = (PendingSubmission, Result<SuggestionResponse, SuggestError>);

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("no credential file location; pass --credentials or set CRAVING_CREDENTIALS_PATH")]
    MissingCredentialsPath,
    #[error("API key must not be empty")]
    EmptyApiKey,
    #[error("{0}")]
    Suggest(#[from] SuggestError),
    #[error("failed reading input: {0}")]
    Io(#[from] io::Error),
}

#[derive(Parser, Debug)]
#[command(name = "craving", about = "Describe a craving, get food suggestions")]
struct Cli {
    #[arg(long, env = "CRAVING_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    #[arg(long, env = "CRAVING_CREDENTIALS_PATH")]
    credentials: Option<PathBuf>,

    #[command(flatten)]
    filters: FilterArgs,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Args, Debug)]
struct FilterArgs {
    /// Dietary preferences sent with every request (e.g. "vegetarian").
    #[arg(long, global = true)]
    preferences: Option<String>,

    /// Preferred cuisine sent with every request (e.g. "Italian").
    #[arg(long, global = true)]
    cuisine: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive chat (default).
    Chat,
    /// Submit one craving and print the reply.
    Ask {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// Manage the stored AI provider key.
    Settings(SettingsCommand),
    /// Check the suggestion service.
    Health,
    /// List Gemini models available to the service.
    Models,
}

#[derive(Args, Debug)]
struct SettingsCommand {
    #[command(subcommand)]
    command: SettingsSubcommand,
}

#[derive(Subcommand, Debug)]
enum SettingsSubcommand {
    Show,
    Set {
        #[arg(long)]
        provider: Provider,
        #[arg(long)]
        key: String,
    },
    Use {
        provider: Provider,
    },
    Clear,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), CliError> {
    let dotenv = dotenvy::dotenv();
    init_tracing();
    if let Err(e) = dotenv {
        if !e.not_found() {
            warn!(error = %e, ".env not loaded");
        }
    }

    let cli = Cli::parse();
    let path = cli
        .credentials
        .or_else(config::default_credentials_path)
        .ok_or(CliError::MissingCredentialsPath)?;
    debug!(path = %path.display(), "opening credential store");
    let credentials = shared(FileStore::open(path));
    let client = Arc::new(SuggestionClient::new(config::ClientConfig::new(&cli.api_url), credentials.clone())?);
    let conversation = Conversation::new().with_filters(cli.filters.preferences, cli.filters.cuisine);

    match cli.command.unwrap_or(Command::Chat) {
        Command::Chat => run_chat(&client, &credentials, conversation).await,
        Command::Ask { text } => run_ask(&client, conversation, &text.join(" ")).await,
        Command::Settings(settings) => run_settings(&credentials, settings.command),
        Command::Health => {
            print!("{}", view::render_health(&client.health().await?));
            Ok(())
        }
        Command::Models => {
            print!("{}", view::render_models(&client.gemini_models().await?));
            Ok(())
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

async fn run_ask(client: &SuggestionClient, mut conversation: Conversation, text: &str) -> Result<(), CliError> {
    if conversation.submit(text, client).await.is_none() {
        return Ok(());
    }
    for turn in conversation.turns() {
        println!("{}", view::render_turn(turn));
    }
    Ok(())
}

fn run_settings(credentials: &Credentials, command: SettingsSubcommand) -> Result<(), CliError> {
    let mut store = credentials.lock().unwrap_or_else(PoisonError::into_inner);
    match command {
        SettingsSubcommand::Show => {}
        SettingsSubcommand::Set { provider, key } => {
            let key = key.trim();
            if key.is_empty() {
                return Err(CliError::EmptyApiKey);
            }
            store.save(provider, key);
            println!("Saved {} key.", provider.display_name());
        }
        SettingsSubcommand::Use { provider } => {
            store.set_active_provider(provider);
            println!("Active provider: {}.", provider.display_name());
        }
        SettingsSubcommand::Clear => {
            store.clear();
            println!("Cleared stored keys.");
        }
    }
    print!("{}", view::render_settings(&*store));
    Ok(())
}

// =============================================================================
// CHAT LOOP
// =============================================================================

/// What the chat loop should do after a line of input.
#[derive(Debug, PartialEq, Eq)]
enum LineAction {
    Quit,
    Help,
    Reset,
    ShowSettings,
    Send(PendingSubmission),
    Busy,
    Ignore,
}

const HELP: &str = "Describe what you feel like eating.\n  /new       start a new chat\n  /settings  show provider key status\n  /quit      exit";

/// Reads stdin while requests run on spawned tasks. Results come back over
/// a channel and are settled into the conversation; a result for a chat
/// that was reset in the meantime is dropped by `settle`.
async fn run_chat(
    client: &Arc<SuggestionClient>,
    credentials: &Credentials,
    mut conversation: Conversation,
) -> Result<(), CliError> {
    println!("Connected to {}. Type /help for commands.", client.base_url());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let (tx, mut rx) = mpsc::unbounded_channel::<Settled>();
    let mut stdin_open = true;

    loop {
        if !stdin_open && !conversation.is_pending() {
            return Ok(());
        }
        tokio::select! {
            line = lines.next_line(), if stdin_open => {
                let Some(line) = line? else {
                    stdin_open = false;
                    continue;
                };
                match handle_line(&line, &mut conversation) {
                    LineAction::Quit => return Ok(()),
                    LineAction::Help => println!("{HELP}"),
                    LineAction::Reset => println!("Started a new chat."),
                    LineAction::ShowSettings => {
                        let store = credentials.lock().unwrap_or_else(PoisonError::into_inner);
                        print!("{}", view::render_settings(&*store));
                    }
                    LineAction::Send(pending) => {
                        println!("Thinking...");
                        spawn_request(Arc::clone(client), pending, tx.clone());
                    }
                    LineAction::Busy => println!("Still waiting on the previous request."),
                    LineAction::Ignore => {}
                }
            }
            Some((pending, result)) = rx.recv() => {
                if let Some(id) = conversation.settle(pending, result) {
                    if let Some(turn) = conversation.turn(id) {
                        println!("{}", view::render_turn(turn));
                    }
                }
            }
        }
    }
}

/// Apply one line of input to the conversation. Commands start with `/`;
/// anything else is a submission, rejected as `Busy` while one is pending.
fn handle_line(line: &str, conversation: &mut Conversation) -> LineAction {
    match line.trim() {
        "/quit" | "/exit" => LineAction::Quit,
        "/help" => LineAction::Help,
        "/new" => {
            conversation.reset();
            LineAction::Reset
        }
        "/settings" => LineAction::ShowSettings,
        "" => LineAction::Ignore,
        _ => {
            conversation.set_input(line);
            match conversation.begin(line) {
                Some(pending) => LineAction::Send(pending),
                None => LineAction::Busy,
            }
        }
    }
}

fn spawn_request(client: Arc<SuggestionClient>, pending: PendingSubmission, tx: mpsc::UnboundedSender<Settled>) {
    tokio::spawn(async move {
        let result = client.request_suggestions(pending.request()).await;
        if tx.send((pending, result)).is_err() {
            debug!("chat loop ended before the request settled");
        }
    });
}

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;
