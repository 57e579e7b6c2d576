//! Sub-step of a round at which a batch of actions is applied.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Sub-step of a round. Phases are strictly ordered `before -> during -> after`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
  Before,
  During,
  After,
}

impl Phase {
  /// All phases in replay order.
  pub const ALL: [Phase; 3] = [Phase::Before, Phase::During, Phase::After];

  /// Next phase within the same round; `None` after `After`.
  pub fn next_in_round(self) -> Option<Phase> {
    match self {
      Phase::Before => Some(Phase::During),
      Phase::During => Some(Phase::After),
      Phase::After => None,
    }
  }

  pub fn as_str(self) -> &'static str {
    match self {
      Phase::Before => "before",
      Phase::During => "during",
      Phase::After => "after",
    }
  }
}

impl fmt::Display for Phase {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}
