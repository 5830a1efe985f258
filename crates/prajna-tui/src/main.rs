use std::fs::{self, OpenOptions};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::{fmt, EnvFilter};

use prajna_core::{
    run_until_idle, ChatBackend, ChatId, ChatSession, Config, HttpBackend, LandingSettings, Role, SidebarView, TranscriptItem,
};
use prajna_core::markup::{Citation, REFERENCES_LABEL};

mod app;
mod handler;
mod tui;
mod ui;

use app::{App, AppOptions};
use tui::EventHandler;

const TICK_RATE: Duration = Duration::from_millis(50);

/// Terminal cells are far coarser than pixels; these keep the landing page
/// feeling the same at that resolution.
const NAVBAR_THRESHOLD_ROWS: f32 = 2.0;
const REVEAL_POINT_ROWS: f32 = 4.0;
const GLOW_DIVISOR_CELLS: f32 = 8.0;
const DEFAULT_NARROW_COLUMNS: u16 = 90;

#[derive(Parser, Debug)]
#[command(name = "prajna", about = "Chat with the Prajna wisdom assistant from your terminal", version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
    /// Backend base URL (overrides PRAJNA_BACKEND_URL and the config file)
    #[arg(long, global = true)]
    backend_url: Option<String>,
    /// Skip the landing page and open the chat directly
    #[arg(long)]
    chat: bool,
    /// Where the interactive client writes its log
    #[arg(long)]
    log_file: Option<PathBuf>,
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Ask one question and print the answer
    Ask {
        question: String,
        /// Continue an existing conversation
        #[arg(long)]
        chat_id: Option<ChatId>,
    },
    /// List saved conversations
    Chats,
    /// Delete a conversation
    Delete {
        chat_id: ChatId,
        /// Don't ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Rename a conversation
    Rename { chat_id: ChatId, title: String },
    /// Show the config file, or update it with the given values
    Config {
        /// Backend base URL to store
        #[arg(long)]
        set_backend_url: Option<String>,
        /// Terminal width at or below which the sidebar overlays the chat
        #[arg(long)]
        narrow_width: Option<u16>,
        /// Start without the splash screen
        #[arg(long)]
        skip_splash: Option<bool>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let interactive = cli.command.is_none();
    init_logging(cli.verbose, interactive, cli.log_file.clone())?;
    debug!("Parsed CLI arguments: {:?}", cli);

    let config = Config::load().unwrap_or_else(|err| {
        tracing::warn!(error = %err, "ignoring unreadable config file");
        Config::new()
    });
    let backend_url = cli.backend_url.clone().unwrap_or_else(|| config.backend_url());
    let backend = HttpBackend::new(&backend_url);
    info!(%backend_url, "using backend");

    let narrow_width = config.narrow_width.unwrap_or(DEFAULT_NARROW_COLUMNS);

    match cli.command {
        None => run_tui(&config, backend, cli.chat, narrow_width).await,
        Some(Commands::Ask { question, chat_id }) => ask(&backend, narrow_width, &question, chat_id).await,
        Some(Commands::Chats) => list_chats(&backend, narrow_width).await,
        Some(Commands::Delete { chat_id, yes }) => {
            let deleted = delete_chat(&backend, narrow_width, chat_id.clone(), |id| yes || confirm_on_stdin(id)).await?;
            if deleted {
                println!("Deleted chat {}", chat_id);
            } else {
                println!("Delete cancelled");
            }
            Ok(())
        }
        Some(Commands::Config { set_backend_url, narrow_width, skip_splash }) => {
            // Re-read strictly so a malformed file is reported instead of overwritten
            let path = Config::get_config_path()?;
            edit_config(Config::load_from(&path)?, set_backend_url, narrow_width, skip_splash, &path)
        }
        Some(Commands::Rename { chat_id, title }) => rename_chat(&backend, narrow_width, chat_id, &title).await,
    }
}

/// The full-screen client owns the terminal, so its log goes to a file.
fn init_logging(verbose: u8, interactive: bool, log_file: Option<PathBuf>) -> Result<()> {
    let log_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    if !interactive {
        fmt::Subscriber::builder()
            .with_env_filter(env_filter)
            .with_writer(io::stderr)
            .with_target(false)
            .compact()
            .init();
        return Ok(());
    }

    let path = match log_file {
        Some(path) => path,
        None => dirs::cache_dir()
            .ok_or_else(|| anyhow!("Could not determine cache directory"))?
            .join("prajna")
            .join("prajna.log"),
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("opening log file {}", path.display()))?;

    fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .compact()
        .init();
    Ok(())
}

fn edit_config(
    mut config: Config,
    backend_url: Option<String>,
    narrow_width: Option<u16>,
    skip_splash: Option<bool>,
    path: &Path,
) -> Result<()> {
    let changed = backend_url.is_some() || narrow_width.is_some() || skip_splash.is_some();
    if let Some(url) = backend_url {
        config.backend_url = Some(url.trim_end_matches('/').to_string());
    }
    if let Some(width) = narrow_width {
        config.narrow_width = Some(width);
    }
    if let Some(skip) = skip_splash {
        config.skip_splash = Some(skip);
    }
    if changed {
        config.save_to(path)?;
        info!(path = %path.display(), "config saved");
    }

    println!("{}", path.display());
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

fn landing_settings(config: &Config) -> LandingSettings {
    let mut settings = LandingSettings {
        navbar_threshold: NAVBAR_THRESHOLD_ROWS,
        reveal_point: REVEAL_POINT_ROWS,
        glow_divisor: GLOW_DIVISOR_CELLS,
        ..LandingSettings::default()
    };
    config.apply_landing_overrides(&mut settings);
    settings
}

async fn run_tui(config: &Config, backend: HttpBackend, start_on_chat: bool, narrow_width: u16) -> Result<()> {
    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = EventHandler::new(TICK_RATE);

    let options = AppOptions {
        start_on_chat,
        skip_splash: config.skip_splash.unwrap_or(false),
        landing_settings: landing_settings(config),
        narrow_width,
    };
    let mut app = App::new(options, backend, events.sender());
    let size = terminal.size()?;
    app.start(size.width, size.height);

    let result = async {
        while !app.should_quit {
            terminal.draw(|frame| ui::render(&mut app, frame))?;
            match events.next().await {
                Some(event) => handler::handle_event(&mut app, event),
                None => break,
            }
        }
        Ok::<(), anyhow::Error>(())
    }
    .await;

    tui::restore()?;
    result
}

fn print_transcript_tail(session: &ChatSession) {
    let Some(TranscriptItem::Message(message)) = session.transcript().items().last() else {
        return;
    };
    if message.role != Role::Assistant {
        return;
    }
    println!("{}", message.content);
    if !message.sources.is_empty() {
        println!("\n{}", REFERENCES_LABEL);
        for source in &message.sources {
            let citation = Citation::parse(source);
            println!("  {} <{}>", citation.title, citation.href());
        }
    }
}

async fn ask(backend: &HttpBackend, narrow_width: u16, question: &str, chat_id: Option<ChatId>) -> Result<()> {
    let mut session = ChatSession::new(narrow_width);
    if let Some(id) = chat_id {
        let effects = session.load_chat(id.clone());
        run_until_idle(&mut session, backend, effects, |_| false).await;
        if session.active_chat_id() != Some(&id) {
            return Err(anyhow!("Chat {} could not be loaded", id));
        }
    }

    let effects = session.submit_message(question);
    if effects.is_empty() {
        return Err(anyhow!("Nothing to ask"));
    }
    run_until_idle(&mut session, backend, effects, |_| false).await;

    print_transcript_tail(&session);
    if let Some(id) = session.active_chat_id() {
        println!("\n[chat {}: {}]", id, session.title());
    }
    Ok(())
}

async fn list_chats(backend: &HttpBackend, narrow_width: u16) -> Result<()> {
    let mut session = ChatSession::new(narrow_width);
    let effects = session.refresh_sidebar();
    run_until_idle(&mut session, backend, effects, |_| false).await;

    match session.sidebar() {
        SidebarView::Loading => return Err(anyhow!("Could not load conversations from {}", backend.base_url())),
        SidebarView::Empty(message) => println!("{}", message),
        SidebarView::Entries(entries) => {
            for entry in entries {
                let updated = entry.chat.updated_at.as_deref().unwrap_or("");
                println!("{:>6}  {}  {}", entry.chat.id.to_string(), entry.chat.title, updated);
            }
        }
    }
    Ok(())
}

fn confirm_on_stdin(id: &ChatId) -> bool {
    print!("Are you sure you want to delete chat {}? [y/N] ", id);
    if io::stdout().flush().is_err() {
        return false;
    }
    let mut answer = String::new();
    match io::stdin().lock().read_line(&mut answer) {
        Ok(_) => matches!(answer.trim(), "y" | "Y" | "yes"),
        Err(_) => false,
    }
}

/// Returns whether the chat was deleted; `Ok(false)` means the confirmation was declined.
async fn delete_chat<B, F>(backend: &B, narrow_width: u16, id: ChatId, mut confirm: F) -> Result<bool>
where
    B: ChatBackend + ?Sized,
    F: FnMut(&ChatId) -> bool,
{
    let mut session = ChatSession::new(narrow_width);
    let mut confirmed = false;
    let effects = session.request_delete(id.clone());
    run_until_idle(&mut session, backend, effects, |id| {
        confirmed = confirm(id);
        confirmed
    })
    .await;

    if !confirmed {
        return Ok(false);
    }
    match session.sidebar() {
        // The list after a delete is the only confirmation the backend gives
        SidebarView::Loading => Err(anyhow!("Could not confirm that chat {} was deleted", id)),
        SidebarView::Entries(entries) if entries.iter().any(|e| e.chat.id == id) => {
            Err(anyhow!("Chat {} was not deleted", id))
        }
        _ => Ok(true),
    }
}

async fn rename_chat(backend: &HttpBackend, narrow_width: u16, id: ChatId, title: &str) -> Result<()> {
    let mut session = ChatSession::new(narrow_width);
    let effects = session.rename_chat(id.clone(), title);
    run_until_idle(&mut session, backend, effects, |_| false).await;

    let renamed = match session.sidebar() {
        SidebarView::Entries(entries) => entries.iter().find(|e| e.chat.id == id).map(|e| e.chat.title.clone()),
        _ => None,
    };
    match renamed {
        Some(title) => {
            println!("{}", title);
            Ok(())
        }
        None => Err(anyhow!("Chat {} not found", id)),
    }
}
