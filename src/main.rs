//! PageTalks - voice commands for PDF page selection
//!
//! Type what you would say. Each line is replayed as a streaming transcript
//! and handled once the silence timer decides you have finished speaking.

use anyhow::{bail, Result};
use clap::{Parser, ValueEnum};
use pagetalks::capabilities::FileActions;
use pagetalks::config::Config;
use pagetalks::host::{ConsoleHost, Screen};
use pagetalks::recents::{JsonRecentsStore, RecentFiles};
use pagetalks::speech::ScriptedBridge;
use pagetalks::{DispatchResult, SessionController, StartOutcome};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum StartScreen {
    /// Document picker
    Home,
    /// Page grid of the most recent document
    Grid,
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Screen to start on
    #[arg(short, long, value_enum, default_value_t = StartScreen::Home)]
    context: StartScreen,

    /// Page count of every document opened
    #[arg(short, long, default_value_t = 10)]
    pages: u32,

    /// Silence timeout in milliseconds (overrides config)
    #[arg(long)]
    silence_ms: Option<u64>,

    /// Record a document as recently opened (repeatable)
    #[arg(long = "open", value_name = "PATH")]
    open: Vec<String>,

    /// Pause between streamed words in milliseconds
    #[arg(long, default_value_t = 120)]
    word_delay_ms: u64,

    /// Print results as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = Config::load()?;
    if let Some(ms) = args.silence_ms {
        config.silence_timeout_ms = ms;
        config.validate()?;
    }

    // Setup logging
    let level = if args.verbose {
        Level::DEBUG
    } else {
        config.log_level.parse().unwrap_or(Level::INFO)
    };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("📄 PageTalks v{} starting...", env!("CARGO_PKG_VERSION"));

    let store = JsonRecentsStore::new(config.recents_path());
    let recents = RecentFiles::load(Box::new(store), config.recents_capacity);
    let host = Arc::new(ConsoleHost::new(recents, args.pages));

    for path in &args.open {
        host.open_document(path);
    }
    prepare_screen(&host, args.context).await?;

    let bridge = Arc::new(ScriptedBridge::new(Duration::from_millis(args.word_delay_ms)));
    let mut controller = SessionController::from_config(bridge.clone(), host.dispatcher(), &config);

    info!("✅ PageTalks ready - type a command");
    info!("   Try: 'open file', 'pages one to three', 'odd pages', 'save as summary'");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        bridge.push(line);
        let (context, page_count) = host.context();
        controller.set_dispatcher(host.dispatcher());

        match controller.start(context, page_count).await {
            StartOutcome::Started => {}
            StartOutcome::Busy => continue,
            StartOutcome::Unavailable(reason) => {
                println!("{}", reason.guidance());
                continue;
            }
        }

        match controller.run_turn().await {
            Some(result) => print_result(&result, args.json)?,
            None => {
                if let Some(error) = controller.last_error() {
                    println!("Speech error: {}", error);
                }
            }
        }
    }

    Ok(())
}

/// Put the host on the requested screen before the first command
async fn prepare_screen(host: &Arc<ConsoleHost>, start: StartScreen) -> Result<()> {
    let showing_document = host.screen() != Screen::Home;
    match start {
        StartScreen::Home if showing_document => host.close_document().await,
        StartScreen::Grid if !showing_document => {
            let recent = host
                .recents()
                .read()
                .map_err(|e| anyhow::anyhow!("recent files unavailable: {}", e))?
                .entries()
                .first()
                .map(|entry| entry.path.clone());
            match recent {
                Some(path) => {
                    host.open_document(&path);
                    Ok(())
                }
                None => bail!("--context grid needs a document; pass --open PATH"),
            }
        }
        _ => Ok(()),
    }
}

fn print_result(result: &DispatchResult, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(result)?);
    } else if result.success {
        println!("✅ {}", result.feedback);
    } else {
        println!("❌ {}", result.feedback);
    }
    Ok(())
}
