//! Position of the replay within a trace.

use std::fmt;

use serde::Serialize;

use super::{Phase, Trace};

/// `(round, phase)` the scheduler last entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct PhaseCursor {
  pub round: u32,
  pub phase: Phase,
}

impl PhaseCursor {
  /// Synthetic pre-state `(0, after)`: the first advance enters round 1's `before`.
  pub const INITIAL: PhaseCursor = PhaseCursor {
    round: 0,
    phase: Phase::After,
  };

  pub const fn new(round: u32, phase: Phase) -> Self {
    Self { round, phase }
  }

  /// Next cursor in lexicographic order, or `None` when `trace` has no round `round + 1`.
  pub fn advance(self, trace: &Trace) -> Option<PhaseCursor> {
    match self.phase.next_in_round() {
      Some(phase) => Some(PhaseCursor::new(self.round, phase)),
      None => {
        let round = self.round + 1;
        trace
          .round(round)
          .map(|_| PhaseCursor::new(round, Phase::Before))
      }
    }
  }

  /// True for the synthetic pre-state.
  pub fn is_initial(self) -> bool {
    self == Self::INITIAL
  }
}

impl Default for PhaseCursor {
  fn default() -> Self {
    Self::INITIAL
  }
}

impl fmt::Display for PhaseCursor {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "round {} {}", self.round, self.phase)
  }
}
