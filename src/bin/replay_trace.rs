//! CLI: replay an agreement-protocol trace on the terminal.
//!
//! Plays the embedded sample by default, or the first (or `--name`d) trace from a JSON file or a
//! listing endpoint. Prints one line per phase, or every scene as JSON with `--json`.
//!
//! Usage: `replay_trace [OPTIONS]`
//! Example: replay_trace --file fixtures/sample_trace.json --phase-ms 200
//!
//! Exits 1 when the trace cannot be loaded or playback halts on a malformed action.
//!
//! Set RUST_LOG=agreement_replay=trace for TRACE-level span enter/exit and events.

use std::path::PathBuf;
use std::process;

use agreement_replay::config::{FRAME_MS_ENV, PHASE_MS_ENV, parse_millis};
use agreement_replay::projection::Scene;
use agreement_replay::{
  EmbeddedSource, FileSource, HttpSource, PlaybackConfig, PlaybackStatus, PlayerHandle,
  TraceCatalog, TraceSource,
};
use clap::Parser;
use futures::StreamExt;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

/// Replay a recorded agreement-protocol trace.
#[derive(Parser, Debug)]
#[command(name = "replay_trace")]
#[command(
  after_help = r#"Environment variables (overridden by the matching flags):
  REPLAY_PHASE_MS   Duration of one phase in milliseconds (default: 1000).
  REPLAY_FRAME_MS   Token redraw interval in milliseconds (default: 16).

Examples:
  replay_trace
  replay_trace --file fixtures/sample_trace.json --json
  replay_trace --url http://localhost:8080/traces --name run-7"#
)]
struct Args {
  /// JSON file holding a single trace or a listing of `{name, description, trace}` records.
  #[arg(long, value_name = "PATH", conflicts_with = "url")]
  file: Option<PathBuf>,

  /// Listing endpoint returning a JSON array of records.
  #[arg(long, value_name = "URL")]
  url: Option<String>,

  /// Trace to play from the listing. Default: the first one.
  #[arg(long, value_name = "NAME")]
  name: Option<String>,

  /// Duration of one phase in milliseconds.
  #[arg(long, value_name = "MS")]
  phase_ms: Option<String>,

  /// Token redraw interval in milliseconds.
  #[arg(long, value_name = "MS")]
  frame_ms: Option<String>,

  /// Print every published scene as one JSON line instead of a per-phase summary.
  #[arg(long)]
  json: bool,

  /// List the available traces and exit.
  #[arg(long)]
  list: bool,
}

#[tokio::main]
async fn main() {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .with_span_events(FmtSpan::ENTER | FmtSpan::EXIT)
    .with_writer(std::io::stderr)
    .init();

  let args = Args::parse();

  let config = match build_config(&args) {
    Ok(c) => c,
    Err(e) => {
      eprintln!("Error: {}", e);
      process::exit(1);
    }
  };
  info!(
    phase_ms = config.phase_duration.as_millis() as u64,
    frame_ms = config.frame_interval.as_millis() as u64,
    "playback options"
  );

  let source: Box<dyn TraceSource> = match (&args.file, &args.url) {
    (Some(path), _) => Box::new(FileSource::new(path.clone())),
    (None, Some(url)) => Box::new(HttpSource::new(url.clone())),
    (None, None) => Box::new(EmbeddedSource),
  };

  let catalog = match TraceCatalog::load(source.as_ref()).await {
    Ok(c) => c,
    Err(e) => {
      eprintln!("Error loading traces from {}: {}", source.describe(), e);
      process::exit(1);
    }
  };

  if args.list {
    for record in catalog.records() {
      println!(
        "{}\t{} nodes, {} rounds\t{}",
        record.name,
        record.trace.num_nodes(),
        record.trace.max_round(),
        record.description
      );
    }
    return;
  }

  let record = match catalog.select(args.name.as_deref()) {
    Ok(r) => r.clone(),
    Err(e) => {
      eprintln!("Error: {}", e);
      process::exit(1);
    }
  };
  info!(name = %record.name, "replaying trace");

  let player = PlayerHandle::spawn(config);
  let mut scenes = player.scenes();
  let json = args.json;
  let printer = tokio::spawn(async move {
    let mut last_cursor = None;
    while let Some(scene) = scenes.next().await {
      let Some(scene) = scene else { continue };
      if json {
        match serde_json::to_string(&scene) {
          Ok(line) => println!("{}", line),
          Err(e) => warn!(error = %e, "failed to serialize scene"),
        }
      } else if last_cursor != Some(scene.cursor) {
        last_cursor = Some(scene.cursor);
        println!("{}", summarize(&scene));
      }
    }
  });

  if player.load(record.trace).await.is_err() {
    eprintln!("Error: player exited before playback started");
    process::exit(1);
  }

  let status = tokio::select! {
    status = player.wait_until_done() => status,
    _ = tokio::signal::ctrl_c() => {
      info!("interrupted");
      let _ = player.stop().await;
      player.status()
    }
  };
  player.shutdown().await;
  let _ = printer.await;

  match status {
    PlaybackStatus::Finished | PlaybackStatus::Stopped => {
      println!("Playback {}.", status_label(&status));
    }
    PlaybackStatus::Halted { reason } => {
      eprintln!("Playback halted: {}", reason);
      process::exit(1);
    }
    other => {
      eprintln!("Playback ended unexpectedly: {:?}", other);
      process::exit(1);
    }
  }
}

/// Env vars first, then flags on top.
fn build_config(args: &Args) -> Result<PlaybackConfig, agreement_replay::ConfigError> {
  let mut config = PlaybackConfig::from_env()?;
  if let Some(ms) = &args.phase_ms {
    config = config.with_phase_duration(parse_millis(PHASE_MS_ENV, ms)?);
  }
  if let Some(ms) = &args.frame_ms {
    config = config.with_frame_interval(parse_millis(FRAME_MS_ENV, ms)?);
  }
  Ok(config)
}

fn status_label(status: &PlaybackStatus) -> &'static str {
  match status {
    PlaybackStatus::Idle => "idle",
    PlaybackStatus::Playing { .. } => "playing",
    PlaybackStatus::Finished => "finished",
    PlaybackStatus::Stopped => "stopped",
    PlaybackStatus::Halted { .. } => "halted",
  }
}

/// One line per phase: cursor, progress, live tokens, and each node's state.
fn summarize(scene: &Scene) -> String {
  let nodes: Vec<String> = scene
    .nodes
    .iter()
    .map(|n| {
      let mut s = format!("{}", n.id);
      if n.corrupt {
        s.push('*');
      }
      if let Some(out) = &n.output {
        s.push_str(&format!(" out={}", out));
      }
      if n.terminated {
        s.push_str(" done");
      }
      s
    })
    .collect();
  format!(
    "[{}/{}] {} | {} messages | {}",
    scene.progress,
    scene.total_phases,
    scene.cursor,
    scene.tokens.len(),
    nodes.join(", ")
  )
}
