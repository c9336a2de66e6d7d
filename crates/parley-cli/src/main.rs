//! parley - terminal client for the parley chat service

mod commands;
mod config;
mod utils;

use anyhow::bail;
use clap::Parser;
use parley_api::{ChatClient, Role};
use parley_session::{
    IgnoreReason, LoadOutcome, SendOutcome, Session, SessionConfig, SessionHandle,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

/// parley - chat from your terminal
#[derive(Parser, Debug)]
#[command(name = "parley")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Chat service base URL (default: config file, then PARLEY_API_URL)
    #[arg(long)]
    api_url: Option<String>,

    /// User id to chat as (default: config file, then a fresh id)
    #[arg(short, long)]
    user_id: Option<String>,

    /// Send a single message and print the reply
    #[arg(short = 'c', long)]
    command: Option<String>,

    /// Continue an existing conversation by id (with --command or interactive)
    #[arg(long)]
    conversation: Option<String>,

    /// List conversations for the user and exit
    #[arg(long)]
    list: bool,

    /// Check that the service is reachable and exit
    #[arg(long)]
    health: bool,

    /// Initialize config file
    #[arg(long)]
    init_config: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("parley=debug,parley_api=debug,parley_session=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    // Initialize config and exit
    if args.init_config {
        match config::Config::init() {
            Ok(path) => {
                println!("Config file created at: {}", path.display());
                println!("\nExample config:\n{}", config::example_config());
            }
            Err(e) => {
                eprintln!("Error creating config: {}", e);
                std::process::exit(1);
            }
        }
        return Ok(());
    }

    let cfg = config::Config::load();
    let client_config = cfg.client_config(args.api_url.as_deref());

    if args.health {
        let client = ChatClient::new(client_config)?;
        let status = client.health().await?;
        println!("{}: {}", client.base_url(), status.status);
        if !status.is_healthy() {
            std::process::exit(1);
        }
        return Ok(());
    }

    // CLI takes precedence over the config file
    let user_id = args
        .user_id
        .or(cfg.user_id.clone())
        .unwrap_or_else(config::generate_user_id);
    tracing::debug!("Chatting as {} via {}", user_id, client_config.base_url);

    let session = Session::connect(SessionConfig::new(user_id), client_config).await?;

    if args.list {
        let state = session.snapshot();
        println!("{}", utils::format_conversation_list(&state, &chrono::Local::now()));
        return Ok(());
    }

    if let Some(ref id) = args.conversation {
        open_conversation(&session.handle(), id).await?;
    }

    // Non-interactive mode
    if let Some(command) = args.command {
        return run_command(&session, &command).await;
    }

    spawn_event_log(&session);
    run_interactive(session.handle()).await
}

/// Mirror applied session events into the debug log
fn spawn_event_log(session: &Session) {
    let mut receiver = session.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = receiver.recv().await {
            tracing::debug!(event = event.name(), "session event");
        }
    });
}

async fn run_command(session: &Session, command: &str) -> anyhow::Result<()> {
    match session.send_message(command).await {
        SendOutcome::Sent { conversation_id } => {
            if let Some(reply) = session.messages().last() {
                println!("{}", reply.content);
            }
            if let Some(id) = conversation_id {
                eprintln!("[conversation {}]", id);
            }
            Ok(())
        }
        SendOutcome::Failed { detail } => bail!("{}", detail),
        SendOutcome::Ignored(IgnoreReason::Empty) => bail!("Nothing to send"),
        SendOutcome::Ignored(IgnoreReason::Busy) | SendOutcome::Discarded => {
            bail!("Message was not delivered")
        }
    }
}

async fn open_conversation(session: &SessionHandle, id: &str) -> anyhow::Result<()> {
    match session.load_conversation(id).await? {
        LoadOutcome::Loaded { found: true } | LoadOutcome::Unchanged => {
            let state = session.snapshot()?;
            let title = state
                .conversation(id)
                .map(|c| c.title())
                .unwrap_or_else(|| id.to_string());
            println!("Opened: {} ({} messages)", title, state.messages.len());
            for message in &state.messages {
                println!("{}", utils::format_message(message));
            }
        }
        LoadOutcome::Loaded { found: false } => {
            println!("Conversation {} not found; showing an empty transcript.", id);
        }
        LoadOutcome::Failed => {
            let state = session.snapshot()?;
            println!("Error: {}", state.error.unwrap_or_default());
        }
        LoadOutcome::Discarded => {}
    }
    Ok(())
}

async fn run_interactive(session: SessionHandle) -> anyhow::Result<()> {
    use std::io::{self, Write};

    // Show minimal startup info (only if TTY)
    if std::io::IsTerminal::is_terminal(&std::io::stderr()) {
        let state = session.snapshot()?;
        eprintln!(
            "parley as {} ({} conversations, /help for commands)",
            state.user_id,
            state.conversations.len()
        );
        eprintln!();
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("> ");
        io::stdout().flush()?;

        // EOF
        let Some(input) = lines.next_line().await? else {
            break;
        };

        let input = input.trim();
        if input.is_empty() {
            continue;
        }

        // Handle slash commands
        if let Some(result) = commands::execute_command(input, &session.snapshot()?) {
            match result {
                commands::CommandResult::NewConversation => {
                    session.start_new_conversation()?;
                    println!("Started a new conversation.");
                }
                commands::CommandResult::Open(id) => {
                    open_conversation(&session, &id).await?;
                }
                commands::CommandResult::Refresh => {
                    if session.refresh_conversations().await? {
                        println!(
                            "{}",
                            utils::format_conversation_list(
                                &session.snapshot()?,
                                &chrono::Local::now()
                            )
                        );
                    } else {
                        println!("Could not refresh conversations; showing the last known list.");
                    }
                }
                commands::CommandResult::List => {
                    println!(
                        "{}",
                        utils::format_conversation_list(&session.snapshot()?, &chrono::Local::now())
                    );
                }
                commands::CommandResult::ClearError => {
                    session.clear_error()?;
                    println!("Cleared error.");
                }
                commands::CommandResult::Exit => {
                    break;
                }
                commands::CommandResult::Message(msg) => {
                    println!("{}", msg);
                }
                commands::CommandResult::Unknown(cmd) => {
                    println!("Unknown command: /{}", cmd);
                    println!("Type /help for available commands.");
                }
            }
            println!();
            continue;
        }

        match session.send_message(input).await? {
            SendOutcome::Sent { .. } | SendOutcome::Failed { .. } => {
                let state = session.snapshot()?;
                if let Some(reply) = state
                    .messages
                    .last()
                    .filter(|m| m.role == Role::Assistant)
                {
                    println!("{}", utils::format_message(reply));
                }
            }
            SendOutcome::Discarded => {
                println!("[reply dropped: conversation changed]");
            }
            SendOutcome::Ignored(IgnoreReason::Busy) => {
                println!("[still waiting on the previous request]");
            }
            SendOutcome::Ignored(IgnoreReason::Empty) => {}
        }

        println!();
    }

    Ok(())
}
