//! Home Intent
//!
//! CLI entry point for validating components, previewing the Rhasspy
//! snapshot, synchronizing Rhasspy, and serving recognized intents.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use home_intent::bus::{BusMessage, ChannelBus, MessageBus};
use home_intent::components::install_bundled;
use home_intent::config::Settings;
use home_intent::rhasspy::RhasspyApi;
use home_intent::HomeIntent;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "home-intent")]
#[command(version)]
#[command(about = "Register voice components and keep Rhasspy in sync", long_about = None)]
struct Cli {
    /// Settings file (default: search upward for home_intent.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Rhasspy base URL, overriding the settings file
    #[arg(long, global = true)]
    url: Option<String>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register the bundled components and report validation results
    Check,

    /// Print the slots and sentences.ini that would be pushed
    Export {
        /// Print only sentences.ini
        #[arg(long)]
        sentences_only: bool,
    },

    /// Synchronize Rhasspy: profile, slots, sentences, training
    Sync,

    /// Synchronize, then dispatch Hermes intents read as JSON lines on stdin
    Listen,
}

/// One line of `listen` input or output
#[derive(Debug, Serialize, Deserialize)]
struct JsonLine {
    topic: String,
    #[serde(default)]
    payload: Value,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_tracing(cli.verbose);

    let mut settings = load_settings(cli.config.as_ref())?;
    if let Some(url) = cli.url {
        settings.rhasspy.url = url;
    }

    match cli.command {
        Commands::Check => cmd_check(settings),
        Commands::Export { sentences_only } => cmd_export(settings, sentences_only),
        Commands::Sync => cmd_sync(settings),
        Commands::Listen => cmd_listen(settings),
    }
}

fn setup_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("home_intent=debug,info")
        } else {
            EnvFilter::new("info")
        }
    });

    // stdout is reserved for `export` and `listen` output
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn load_settings(path: Option<&PathBuf>) -> Result<Settings> {
    match path {
        Some(path) => Settings::load(path)
            .with_context(|| format!("Failed to load settings from {}", path.display())),
        None => {
            let cwd = std::env::current_dir().context("Failed to read current directory")?;
            Settings::find_and_load(&cwd).context("Failed to load settings")
        }
    }
}

fn build(settings: Settings, bus: Arc<dyn MessageBus>) -> Result<HomeIntent<RhasspyApi>> {
    let service = RhasspyApi::new(&settings.rhasspy.url);
    let mut home_intent =
        HomeIntent::new(settings, service, bus).context("Failed to start Home Intent")?;
    install_bundled(&mut home_intent).context("Failed to register components")?;
    Ok(home_intent)
}

fn cmd_check(settings: Settings) -> Result<()> {
    let (bus, _published) = ChannelBus::new();
    let home_intent = build(settings, Arc::new(bus))?;
    let snapshot = home_intent.preview().context("Failed to aggregate slots")?;

    for component in home_intent.registry().components() {
        let intents = component.intents();
        println!(
            "{}: {} sentence(s), {} slot(s)",
            component.name(),
            intents.sentences().len(),
            intents.slots().len()
        );
    }
    println!(
        "{} intent(s) routable, {} active sentence section(s), {} slot(s)",
        home_intent.registry().dispatch().len(),
        snapshot.grammar.len(),
        snapshot.slots.len()
    );
    Ok(())
}

fn cmd_export(settings: Settings, sentences_only: bool) -> Result<()> {
    let (bus, _published) = ChannelBus::new();
    let home_intent = build(settings, Arc::new(bus))?;
    let snapshot = home_intent.preview().context("Failed to aggregate slots")?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if !sentences_only {
        let slots = serde_json::to_string_pretty(&snapshot.slots)?;
        writeln!(out, "# slots\n{slots}\n\n# sentences.ini")?;
    }
    writeln!(out, "{}", snapshot.grammar)?;
    Ok(())
}

fn cmd_sync(settings: Settings) -> Result<()> {
    let (bus, _published) = ChannelBus::new();
    let runtime = build(settings, Arc::new(bus))?
        .initialize()
        .context("Failed to synchronize Rhasspy")?;

    info!(
        training = ?runtime.training(),
        reinstalled = runtime.convergence().reinstalled,
        "sync complete"
    );
    Ok(())
}

fn cmd_listen(settings: Settings) -> Result<()> {
    let (bus, published) = ChannelBus::new();
    let bus: Arc<dyn MessageBus> = Arc::new(bus);
    let runtime = build(settings, Arc::clone(&bus))?
        .initialize()
        .context("Failed to synchronize Rhasspy")?;
    let listener = runtime.listener(bus);

    info!(intents = runtime.dispatch().len(), "listening for intents on stdin");
    let stdout = io::stdout();
    let mut out = stdout.lock();

    for line in io::stdin().lock().lines() {
        let line = line.context("Failed to read stdin")?;
        if line.trim().is_empty() {
            continue;
        }

        let incoming: JsonLine = match serde_json::from_str(&line) {
            Ok(incoming) => incoming,
            Err(e) => {
                warn!(error = %e, "skipping malformed input line");
                continue;
            }
        };
        let message = BusMessage::json(incoming.topic, &incoming.payload)?;
        listener.handle(&message)?;

        for message in published.try_iter() {
            let payload = message
                .payload_json()
                .unwrap_or_else(|| Value::from(message.payload.len()));
            let outgoing = JsonLine {
                topic: message.topic,
                payload,
            };
            writeln!(out, "{}", serde_json::to_string(&outgoing)?)?;
        }
        out.flush()?;
    }
    Ok(())
}
