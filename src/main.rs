use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use arogya_core::{HttpReplyService, WidgetConfig};

mod app;
mod handler;
mod tui;
mod ui;

use app::App;
use tui::{EventHandler, Tui};

#[derive(Parser)]
#[command(name = "arogya")]
#[command(about = "Chat with the Arogya AI health and fitness coach", version)]
struct Cli {
    /// Base URL of the coaching server (messages go to <URL>/chat)
    #[arg(short, long)]
    server: Option<String>,

    /// Config file to use instead of the default location
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Where to write logs (the terminal is taken by the UI)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,

    /// Write the effective config (defaults plus overrides) to the config
    /// file and exit
    #[arg(long)]
    write_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.log_file.as_deref(), cli.verbose)?;

    let config = match &cli.config {
        Some(path) => WidgetConfig::load_from(path),
        None => WidgetConfig::load(),
    }
    .context("Failed to load config")?
    .with_overrides(cli.server);

    if cli.write_config {
        match &cli.config {
            Some(path) => config.save_to(path),
            None => config.save(),
        }
        .context("Failed to write config")?;
        info!("config written");
        return Ok(());
    }

    info!(endpoint = %config.chat_endpoint(), "starting chat client");

    let service = Arc::new(HttpReplyService::new(&config.chat_endpoint()));
    let mut app = App::new(config, service);

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let result = run(&mut terminal, &mut app).await;
    tui::restore()?;

    info!("chat client exited");
    result
}

async fn run(terminal: &mut Tui, app: &mut App) -> Result<()> {
    let replies = app
        .take_reply_events()
        .context("reply channel already taken")?;
    let mut events = EventHandler::new(replies);

    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event)?,
            None => break,
        }
    }

    Ok(())
}

fn init_logging(log_file: Option<&std::path::Path>, verbose: bool) -> Result<()> {
    let path = match log_file {
        Some(path) => path.to_path_buf(),
        None => WidgetConfig::config_dir()?.join("arogya.log"),
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    // RUST_LOG wins over --verbose
    let log_level = if verbose { "debug" } else { "info" };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("arogya={},arogya_core={}", log_level, log_level))
    });

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();

    Ok(())
}
