//! Async player: drives a [PhaseScheduler] on the macro tick and animates each phase's tokens.
//!
//! One task owns the session (scheduler, layout, live tokens) and serializes every state change:
//! commands, macro ticks and redraw pings are handled one at a time from a single `select!`
//! loop. Scenes and status are published on watch channels. Stopping, loading another trace,
//! shutting down, or dropping the handle tears down the macro tick and every live token.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{Notify, mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, Interval, MissedTickBehavior, interval_at};
use tokio_stream::wrappers::WatchStream;
use tracing::{debug, info, warn};

use crate::animator::{MessageAnimator, TokenSpec, TokenView};
use crate::config::PlaybackConfig;
use crate::error::PlayerClosed;
use crate::layout::{Layout, compute_layout};
use crate::projection::{Scene, render};
use crate::scheduler::{MessageSpawn, PhaseScheduler, TickOutcome};
use crate::types::{PhaseCursor, Trace};

/// Lifecycle of the current playback.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PlaybackStatus {
  /// No trace loaded.
  Idle,
  Playing { cursor: PhaseCursor },
  /// Every phase of the trace was replayed.
  Finished,
  /// Stopped on request before the end of the trace.
  Stopped,
  /// A malformed action stopped playback; the last valid scene stays published.
  Halted { reason: String },
}

impl PlaybackStatus {
  /// True when no more phases will be played for the current trace.
  pub fn is_done(&self) -> bool {
    matches!(
      self,
      PlaybackStatus::Finished | PlaybackStatus::Stopped | PlaybackStatus::Halted { .. }
    )
  }
}

enum PlayerCommand {
  Load {
    trace: Arc<Trace>,
    ack: oneshot::Sender<()>,
  },
  Stop {
    ack: oneshot::Sender<()>,
  },
  Shutdown,
}

/// Client side of a running player.
#[derive(Debug)]
pub struct PlayerHandle {
  commands: mpsc::Sender<PlayerCommand>,
  scene: watch::Receiver<Option<Scene>>,
  status: watch::Receiver<PlaybackStatus>,
  task: JoinHandle<()>,
}

impl std::fmt::Debug for PlayerCommand {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      PlayerCommand::Load { .. } => f.write_str("Load"),
      PlayerCommand::Stop { .. } => f.write_str("Stop"),
      PlayerCommand::Shutdown => f.write_str("Shutdown"),
    }
  }
}

impl PlayerHandle {
  /// Spawns an idle player on the current tokio runtime.
  pub fn spawn(config: PlaybackConfig) -> Self {
    let (commands, rx) = mpsc::channel(8);
    let (scene_tx, scene) = watch::channel(None);
    let (status_tx, status) = watch::channel(PlaybackStatus::Idle);
    let player = Player {
      config,
      scene_tx,
      status_tx,
      redraw: Arc::new(Notify::new()),
      session: None,
    };
    let task = tokio::spawn(player.run(rx));
    Self {
      commands,
      scene,
      status,
      task,
    }
  }

  /// Replaces whatever is playing with `trace`, starting from an empty state. Returns once the
  /// reset is visible on the scene and status channels.
  pub async fn load(&self, trace: Trace) -> Result<(), PlayerClosed> {
    let (ack, done) = oneshot::channel();
    self
      .commands
      .send(PlayerCommand::Load {
        trace: Arc::new(trace),
        ack,
      })
      .await
      .map_err(|_| PlayerClosed)?;
    done.await.map_err(|_| PlayerClosed)
  }

  /// Cancels the macro tick and all tokens; the last scene stays published.
  pub async fn stop(&self) -> Result<(), PlayerClosed> {
    let (ack, done) = oneshot::channel();
    self
      .commands
      .send(PlayerCommand::Stop { ack })
      .await
      .map_err(|_| PlayerClosed)?;
    done.await.map_err(|_| PlayerClosed)
  }

  /// Tears the player down and waits for its task to exit.
  pub async fn shutdown(self) {
    let _ = self.commands.send(PlayerCommand::Shutdown).await;
    let _ = self.task.await;
  }

  /// Latest published scene.
  pub fn scene(&self) -> Option<Scene> {
    self.scene.borrow().clone()
  }

  pub fn status(&self) -> PlaybackStatus {
    self.status.borrow().clone()
  }

  /// Receiver notified on every scene publication.
  pub fn scene_updates(&self) -> watch::Receiver<Option<Scene>> {
    self.scene.clone()
  }

  /// Stream of scenes, starting with the current one.
  pub fn scenes(&self) -> WatchStream<Option<Scene>> {
    WatchStream::new(self.scene.clone())
  }

  pub fn status_updates(&self) -> watch::Receiver<PlaybackStatus> {
    self.status.clone()
  }

  /// Waits until the current playback is finished, stopped or halted.
  pub async fn wait_until_done(&self) -> PlaybackStatus {
    let mut status = self.status.clone();
    if let Ok(done) = status.wait_for(PlaybackStatus::is_done).await {
      return done.clone();
    }
    status.borrow().clone()
  }
}

/// Playback of one trace.
struct Session {
  scheduler: PhaseScheduler,
  layout: Layout,
  tokens: Vec<MessageAnimator>,
  macro_tick: Interval,
  active: bool,
}

impl Session {
  fn token_views(&self) -> Vec<TokenView> {
    self.tokens.iter().map(MessageAnimator::view).collect()
  }

  /// Stops the macro tick and drops every token, which aborts its redraw loop.
  fn halt(&mut self) {
    self.active = false;
    self.tokens.clear();
  }
}

struct Player {
  config: PlaybackConfig,
  scene_tx: watch::Sender<Option<Scene>>,
  status_tx: watch::Sender<PlaybackStatus>,
  redraw: Arc<Notify>,
  session: Option<Session>,
}

/// Resolves on the session's next macro tick; never resolves without an active session.
async fn next_macro_tick(session: &mut Option<Session>) -> Instant {
  match session {
    Some(s) if s.active => s.macro_tick.tick().await,
    _ => std::future::pending().await,
  }
}

impl Player {
  async fn run(mut self, mut commands: mpsc::Receiver<PlayerCommand>) {
    loop {
      let animating = self
        .session
        .as_ref()
        .is_some_and(|s| !s.tokens.is_empty());
      tokio::select! {
        cmd = commands.recv() => match cmd {
          Some(PlayerCommand::Load { trace, ack }) => {
            self.load(trace);
            let _ = ack.send(());
          }
          Some(PlayerCommand::Stop { ack }) => {
            self.stop();
            let _ = ack.send(());
          }
          Some(PlayerCommand::Shutdown) | None => break,
        },
        _ = next_macro_tick(&mut self.session) => self.on_macro_tick(),
        _ = self.redraw.notified(), if animating => self.publish_scene(),
      }
    }
    self.session = None;
    debug!("player shut down");
  }

  fn load(&mut self, trace: Arc<Trace>) {
    // Drop the previous session first so its tokens stop before anything new starts.
    self.session = None;
    let layout = compute_layout(trace.num_nodes(), &self.config.geometry);
    let period = self.config.phase_duration;
    let mut macro_tick = interval_at(Instant::now() + period, period);
    macro_tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
    info!(
      nodes = trace.num_nodes(),
      corrupt = trace.corrupt_nodes().len(),
      rounds = trace.max_round(),
      "trace loaded"
    );
    self.session = Some(Session {
      scheduler: PhaseScheduler::new(trace),
      layout,
      tokens: Vec::new(),
      macro_tick,
      active: true,
    });
    self.status_tx.send_replace(PlaybackStatus::Playing {
      cursor: PhaseCursor::INITIAL,
    });
    self.publish_scene();
  }

  fn stop(&mut self) {
    let Some(session) = self.session.as_mut() else {
      return;
    };
    if !session.active {
      return;
    }
    session.halt();
    info!(cursor = %session.scheduler.cursor(), "playback stopped on request");
    self.status_tx.send_replace(PlaybackStatus::Stopped);
  }

  fn on_macro_tick(&mut self) {
    let Some(session) = self.session.as_mut() else {
      return;
    };
    match session.scheduler.tick() {
      Ok(TickOutcome::Entered(step)) => {
        session.tokens.clear();
        for message in step.messages {
          if let Some(token) = spawn_token(&self.config, &session.layout, message, &self.redraw) {
            session.tokens.push(token);
          }
        }
        self
          .status_tx
          .send_replace(PlaybackStatus::Playing { cursor: step.cursor });
        self.publish_scene();
      }
      Ok(TickOutcome::Stopped) => {
        session.halt();
        info!(
          phases = session.scheduler.progress(),
          conflicts = session.scheduler.conflicts().len(),
          "playback finished"
        );
        self.publish_scene();
        self.status_tx.send_replace(PlaybackStatus::Finished);
      }
      Err(e) => {
        session.halt();
        warn!(error = %e, "playback halted");
        self
          .status_tx
          .send_replace(PlaybackStatus::Halted {
            reason: e.to_string(),
          });
      }
    }
  }

  fn publish_scene(&self) {
    let Some(session) = self.session.as_ref() else {
      return;
    };
    let scheduler = &session.scheduler;
    let scene = render(
      scheduler.trace(),
      &session.layout,
      scheduler.state(),
      &session.token_views(),
      scheduler.cursor(),
      scheduler.progress(),
    );
    self.scene_tx.send_replace(Some(scene));
  }
}

fn spawn_token(
  config: &PlaybackConfig,
  layout: &Layout,
  message: MessageSpawn,
  redraw: &Arc<Notify>,
) -> Option<MessageAnimator> {
  let origin = layout.placement(message.from)?.center;
  let dest = layout.placement(message.to)?.center;
  let spec = TokenSpec {
    key: message.key,
    from: message.from,
    to: message.to,
    payload: message.payload,
    origin,
    dest,
  };
  Some(MessageAnimator::spawn(
    spec,
    config.phase_duration,
    config.frame_interval,
    Arc::clone(redraw),
  ))
}
