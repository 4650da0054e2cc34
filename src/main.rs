use std::fs::{self, File};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use askai_core::{ChatClient, Config, HttpRelayClient, FAILURE_TEXT};

mod app;
mod handler;
mod tui;
mod ui;

use app::App;

#[derive(Parser)]
#[command(name = "askai")]
#[command(author, version, about = "Chat with a hosted LLM through the askai relay", long_about = None)]
struct Cli {
    /// Relay address (overrides config and ASKAI_RELAY_URL)
    #[arg(long, global = true)]
    relay_url: Option<String>,

    /// Don't speak replies
    #[arg(long, global = true)]
    mute: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Send a single prompt and print the reply
    Ask {
        /// Your question
        prompt: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging();

    let mut config = Config::load().unwrap_or_else(|_| Config::new());
    if cli.mute {
        config.speech_enabled = Some(false);
    }
    let relay_url = cli.relay_url.unwrap_or_else(|| config.relay_url());

    match cli.command {
        Some(Commands::Ask { prompt }) => ask(&config, &relay_url, &prompt.join(" ")).await,
        None => run_tui(&config, relay_url).await,
    }
}

async fn ask(config: &Config, relay_url: &str, prompt: &str) -> Result<()> {
    let relay = HttpRelayClient::new(relay_url);
    let mut chat = ChatClient::new(Arc::new(relay), config.speech_output())
        .with_speech_enabled(config.speech_enabled())
        .with_preferred_voice(config.preferred_voice());

    match chat.send(prompt).await {
        Some(reply) if reply.text == FAILURE_TEXT => {
            eprintln!("{}", reply.text);
            eprintln!("Make sure the relay is running at {}", relay_url);
        }
        Some(reply) => println!("{}", reply.text),
        None => eprintln!("Nothing to send"),
    }
    Ok(())
}

async fn run_tui(config: &Config, relay_url: String) -> Result<()> {
    info!(relay = %relay_url, "Starting askai");

    let mut terminal = tui::init()?;
    let mut app = App::new(config, relay_url);
    let mut events = tui::EventHandler::new(tui::TICK_RATE);

    let result = async {
        loop {
            terminal.draw(|frame| ui::render(&mut app, frame))?;

            if let Some(event) = events.next().await {
                handler::handle_event(&mut app, event).await?;
            }

            if app.should_quit {
                break;
            }
        }
        Ok::<(), anyhow::Error>(())
    }
    .await;

    tui::restore()?;
    result
}

fn log_path() -> Option<PathBuf> {
    dirs::cache_dir().map(|dir| dir.join("askai").join("askai.log"))
}

/// Logs go to a file so they don't draw over the terminal UI
fn init_logging() {
    let Some(path) = log_path() else {
        return;
    };
    let file = path
        .parent()
        .map(fs::create_dir_all)
        .transpose()
        .and_then(|_| File::options().create(true).append(true).open(&path))
        .with_context(|| format!("Failed to open log file {}", path.display()));

    let file = match file {
        Ok(file) => file,
        Err(e) => {
            eprintln!("warning: {:#}", e);
            return;
        }
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "askai=info,askai_core=info,warn".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .init();
}
