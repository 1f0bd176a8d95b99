//! # Pad Overlay
//!
//! Runs the default controller overlay against a touch source and prints
//! the resulting controller states.
//!
//! Touches come from a JSON-lines replay script (`--replay`) or from a live
//! Linux multitouch touchscreen (auto-detected, or `--device`). States go to
//! the log, or to stdout as JSON lines with `--jsonl`.
//!
//! ```text
//! pad-overlay --config overlay.toml --replay touches.jsonl --jsonl
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use pad_overlay::config::Config;
use pad_overlay::overlay::Overlay;
use pad_overlay::state::{JsonLinesSink, LoggingSink, StateSink};
use pad_overlay::store::JsonFileStore;
use pad_overlay::touch::evdev_source::{MultitouchDecoder, Touchscreen};
use pad_overlay::touch::TouchEvent;

/// Command line arguments
#[derive(Debug, Parser)]
#[command(name = "pad-overlay", version, about = "Touch-driven virtual game controller overlay")]
struct Args {
    /// TOML configuration file (defaults when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Replay touch events from a JSON-lines file
    #[arg(short, long, conflicts_with = "device")]
    replay: Option<PathBuf>,

    /// Touchscreen device path (overrides the config)
    #[arg(short, long)]
    device: Option<String>,

    /// Write forwarded states to stdout as JSON lines
    #[arg(long)]
    jsonl: bool,

    /// Start in layout edit mode
    #[arg(long)]
    edit: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load(path).with_context(|| format!("loading {}", path.display()))?,
        None => Config::default(),
    };

    // Initialize logging
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(config.logging.level.parse()?),
        )
        .init();

    info!("Pad Overlay v{} starting...", env!("CARGO_PKG_VERSION"));

    let store = JsonFileStore::open(&config.store.path);
    let sink: Box<dyn StateSink> = if args.jsonl {
        Box::new(JsonLinesSink::new(io::stdout()))
    } else {
        Box::new(LoggingSink::new())
    };

    let mut overlay = Overlay::with_default_layout(&config, Box::new(store), sink)?;
    if args.edit {
        overlay.set_selection_listener(|info| {
            info!(
                "Selected {} (scale {}, opacity {}, enabled {})",
                info.id, info.scale, info.opacity, info.enabled
            );
        });
        overlay.set_edit_mode(true);
    }

    match &args.replay {
        Some(path) => replay(&mut overlay, path),
        None => run_touchscreen(&mut overlay, &config, args.device.as_deref()),
    }
}

/// Feeds every line of a JSON-lines script through the overlay.
fn replay(overlay: &mut Overlay, path: &Path) -> Result<()> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let mut processed = 0u64;

    for (number, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<TouchEvent>(&line) {
            Ok(event) => {
                let outcome = overlay.handle_touch(&event);
                debug!("Line {}: {:?}", number + 1, outcome);
                processed += 1;
            }
            Err(e) => warn!("Skipping line {}: {}", number + 1, e),
        }
    }

    info!("Replayed {} touch events", processed);
    Ok(())
}

/// Reads a live touchscreen until the device goes away.
fn run_touchscreen(overlay: &mut Overlay, config: &Config, device: Option<&str>) -> Result<()> {
    let decoder = MultitouchDecoder::for_screen(
        config.screen.width,
        config.screen.height,
        config.touchscreen.max_x,
        config.touchscreen.max_y,
    );

    let path = device.or_else(|| Some(config.touchscreen.device_path.as_str()).filter(|p| !p.is_empty()));
    let mut touchscreen = Touchscreen::open(path, decoder)?;
    info!(
        "Reading touches from {} ({})",
        touchscreen.device_path(),
        touchscreen.name().unwrap_or("unnamed")
    );
    info!("Press Ctrl+C to exit");

    loop {
        for event in touchscreen.fetch_touches()? {
            overlay.handle_touch(&event);
        }
    }
}
