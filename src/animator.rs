//! Message animator: glides one token from sender to receiver over a phase.
//!
//! Each token runs its own redraw loop on a fast interval, independent of the phase clock. The
//! token's clock starts at its first redraw, and every redraw publishes the interpolated position
//! and pings the shared redraw signal so the owner can re-project the scene. Dropping or
//! cancelling the token aborts its loop.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{Notify, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, instrument};

use crate::types::{NodeId, Payload, Point};

/// Position at `elapsed` into a traversal lasting `duration`. Clamped: never before `origin`,
/// exactly `dest` from `duration` on.
pub fn interpolate(origin: Point, dest: Point, elapsed: Duration, duration: Duration) -> Point {
  if duration.is_zero() {
    return dest;
  }
  origin.lerp(dest, elapsed.as_secs_f64() / duration.as_secs_f64())
}

/// What a token carries and where it travels.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenSpec {
  pub key: String,
  pub from: NodeId,
  pub to: NodeId,
  pub payload: Payload,
  pub origin: Point,
  pub dest: Point,
}

/// Read-only snapshot of a live token.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenView {
  pub key: String,
  pub from: NodeId,
  pub to: NodeId,
  pub payload: Payload,
  pub position: Point,
}

/// A live animated token. Owns its redraw task; the task ends when the token is dropped or
/// cancelled, or once the token has reached its destination.
#[derive(Debug)]
pub struct MessageAnimator {
  spec: TokenSpec,
  position: watch::Receiver<Point>,
  task: JoinHandle<()>,
}

impl MessageAnimator {
  /// Spawns the redraw loop for `spec` on the current tokio runtime.
  #[instrument(level = "trace", skip(spec, redraw), fields(key = %spec.key))]
  pub fn spawn(
    spec: TokenSpec,
    duration: Duration,
    frame_interval: Duration,
    redraw: Arc<Notify>,
  ) -> Self {
    let (tx, position) = watch::channel(spec.origin);
    let (origin, dest) = (spec.origin, spec.dest);
    debug!(from = spec.from, to = spec.to, "spawning token");
    let task = tokio::spawn(async move {
      let mut frames = tokio::time::interval(frame_interval);
      frames.set_missed_tick_behavior(MissedTickBehavior::Skip);
      let started: Instant = frames.tick().await;
      let mut now = started;
      loop {
        let elapsed = now.saturating_duration_since(started);
        tx.send_replace(interpolate(origin, dest, elapsed, duration));
        redraw.notify_one();
        if elapsed >= duration {
          break;
        }
        now = frames.tick().await;
      }
    });
    Self {
      spec,
      position,
      task,
    }
  }

  pub fn spec(&self) -> &TokenSpec {
    &self.spec
  }

  /// Last position published by the redraw loop.
  pub fn position(&self) -> Point {
    *self.position.borrow()
  }

  pub fn view(&self) -> TokenView {
    TokenView {
      key: self.spec.key.clone(),
      from: self.spec.from,
      to: self.spec.to,
      payload: self.spec.payload.clone(),
      position: self.position(),
    }
  }

  /// Stops the redraw loop. Cancelling twice is a no-op.
  pub fn cancel(&self) {
    self.task.abort();
  }

  /// True once the redraw loop has ended (arrived or cancelled).
  pub fn is_finished(&self) -> bool {
    self.task.is_finished()
  }
}

impl Drop for MessageAnimator {
  fn drop(&mut self) {
    self.task.abort();
  }
}
