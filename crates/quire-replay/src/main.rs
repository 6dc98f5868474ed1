//! quire-replay: run an editor script against a simulated screen.
//!
//! Usage:
//!   quire-replay session.ron
//!   quire-replay session.ron --config editor.ron --format json
//!   RUST_LOG=quire_editor=trace quire-replay session.ron

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use quire_editor::EditorConfig;
use quire_replay::{OutputFormat, Replay, ReplayScript, render_output};

/// Replay a Quire editing script and print the resulting document.
#[derive(Parser, Debug)]
#[command(name = "quire-replay")]
#[command(about = "Replay a Quire editor script against a simulated screen")]
struct Args {
    /// RON script: `(content: "...", steps: [...])`
    script: PathBuf,

    /// RON editor config (drag tuning, measurement stagger, focus retry)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// What to print when the script finishes
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Summary)]
    format: OutputFormat,

    /// Reject unknown block markers in the script's starting content
    #[arg(long)]
    strict: bool,
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => EditorConfig::load(path).with_context(|| format!("loading config {}", path.display()))?,
        None => EditorConfig::default(),
    };
    let script = ReplayScript::load(&args.script)?;
    tracing::info!("replaying {} steps from {}", script.steps.len(), args.script.display());

    let mut replay = Replay::new(config, &script.content, args.strict)?;
    replay.run(&script.steps)?;
    tracing::info!(
        "done after {} frames, revision {}",
        replay.frames(),
        replay.session().revision()
    );

    println!("{}", render_output(&replay, args.format)?);
    Ok(())
}
