//! Phase scheduler: the deterministic state machine that steps through a trace.
//!
//! Each [PhaseScheduler::tick] moves the cursor one `(round, phase)` forward, validates that
//! phase's action list, applies it in trace order to the [AccumulatedState], and returns the
//! messages to animate during the phase. Timing lives elsewhere (see [crate::player]); this type
//! is a pure transition function over owned state.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::error::ReplayError;
use crate::types::{AccumulatedState, Action, Applied, NodeId, Payload, Phase, PhaseCursor, Trace};

/// A message to animate for the duration of one phase.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageSpawn {
  /// `round:phase:seq`, unique within a trace.
  pub key: String,
  pub from: NodeId,
  pub to: NodeId,
  pub payload: Payload,
}

/// An `Output` that replaced a different earlier output of the same node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputConflict {
  pub round: u32,
  pub phase: Phase,
  pub node: NodeId,
  pub previous: Payload,
  pub current: Payload,
}

/// Result of entering one phase.
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseStep {
  pub cursor: PhaseCursor,
  /// Complete token set of this phase; replaces the previous phase's set.
  pub messages: Vec<MessageSpawn>,
}

/// Result of one tick.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
  Entered(PhaseStep),
  /// End of trace (or playback already over). No further phases will be entered.
  Stopped,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SchedulerStatus {
  /// Loaded, no tick yet.
  Ready,
  Running,
  /// The round map is exhausted.
  Stopped,
  /// A phase failed validation; nothing of that phase was applied.
  Halted(ReplayError),
}

/// Owns the cursor and the accumulated state of one trace replay.
#[derive(Debug, Clone)]
pub struct PhaseScheduler {
  trace: Arc<Trace>,
  cursor: PhaseCursor,
  state: AccumulatedState,
  status: SchedulerStatus,
  progress: u32,
  conflicts: Vec<OutputConflict>,
}

impl PhaseScheduler {
  pub fn new(trace: Arc<Trace>) -> Self {
    Self {
      trace,
      cursor: PhaseCursor::INITIAL,
      state: AccumulatedState::new(),
      status: SchedulerStatus::Ready,
      progress: 0,
      conflicts: Vec::new(),
    }
  }

  /// Switches to `trace`, discarding all state of the previous one.
  pub fn reset(&mut self, trace: Arc<Trace>) {
    *self = Self::new(trace);
  }

  pub fn trace(&self) -> &Trace {
    &self.trace
  }

  pub fn cursor(&self) -> PhaseCursor {
    self.cursor
  }

  pub fn state(&self) -> &AccumulatedState {
    &self.state
  }

  pub fn status(&self) -> &SchedulerStatus {
    &self.status
  }

  /// Phases entered so far.
  pub fn progress(&self) -> u32 {
    self.progress
  }

  pub fn conflicts(&self) -> &[OutputConflict] {
    &self.conflicts
  }

  /// True once playback stopped or halted.
  pub fn is_finished(&self) -> bool {
    matches!(
      self.status,
      SchedulerStatus::Stopped | SchedulerStatus::Halted(_)
    )
  }

  /// Advances to the next `(round, phase)` and applies its actions.
  ///
  /// On a structural defect the scheduler halts, returns the error, and leaves cursor and state
  /// at the last valid phase.
  #[instrument(level = "trace", skip(self), fields(cursor = %self.cursor))]
  pub fn tick(&mut self) -> Result<TickOutcome, ReplayError> {
    if self.is_finished() {
      return Ok(TickOutcome::Stopped);
    }
    let trace = Arc::clone(&self.trace);
    let Some(next) = self.cursor.advance(&trace) else {
      info!(rounds = trace.max_round(), "trace exhausted, playback stopped");
      self.status = SchedulerStatus::Stopped;
      return Ok(TickOutcome::Stopped);
    };

    let actions = trace.phase_actions(next.round, next.phase);
    if let Err(e) = validate_phase(&trace, next, actions) {
      warn!(error = %e, "malformed action, playback halted");
      self.status = SchedulerStatus::Halted(e.clone());
      return Err(e);
    }

    self.cursor = next;
    self.progress += 1;
    self.status = SchedulerStatus::Running;
    debug!(cursor = %next, actions = actions.len(), "entering phase");

    let mut messages = Vec::new();
    for action in actions {
      match self.state.apply(action) {
        Applied::Message => {
          if let Action::MessageSent { from, to, payload } = action {
            messages.push(MessageSpawn {
              key: format!("{}:{}:{}", next.round, next.phase, messages.len()),
              from: *from,
              to: *to,
              payload: payload.clone(),
            });
          }
        }
        Applied::OutputConflict { previous } => {
          if let Action::Output { node, output } = action {
            warn!(
              node = *node,
              previous = %previous,
              current = %output,
              "node output overwritten with a different value"
            );
            self.conflicts.push(OutputConflict {
              round: next.round,
              phase: next.phase,
              node: *node,
              previous,
              current: output.clone(),
            });
          }
        }
        Applied::StateReplaced | Applied::Terminated { .. } | Applied::OutputRecorded => {}
      }
    }

    Ok(TickOutcome::Entered(PhaseStep {
      cursor: next,
      messages,
    }))
  }
}

/// Checks every action of a phase before any of them is applied.
#[instrument(level = "trace", skip(trace, actions))]
pub(crate) fn validate_phase(
  trace: &Trace,
  cursor: PhaseCursor,
  actions: &[Action],
) -> Result<(), ReplayError> {
  for action in actions {
    if let Some(node) = action.node_ids().into_iter().find(|&n| !trace.contains_node(n)) {
      return Err(ReplayError::NodeOutOfRange {
        round: cursor.round,
        phase: cursor.phase,
        node,
        num_nodes: trace.num_nodes(),
      });
    }
    match action {
      Action::MessageSent { from, to, .. } if from == to => {
        return Err(ReplayError::SelfMessage {
          round: cursor.round,
          phase: cursor.phase,
          node: *from,
        });
      }
      _ => {}
    }
  }
  Ok(())
}
