//! Action lists of one round, split by phase.

use serde::{Deserialize, Serialize};

use super::{Action, Phase};

/// Actions of one round. A phase absent from the wire is empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoundActions {
  #[serde(default)]
  pub before: Vec<Action>,
  #[serde(default)]
  pub during: Vec<Action>,
  #[serde(default)]
  pub after: Vec<Action>,
}

impl RoundActions {
  /// Ordered action list of `phase`.
  pub fn phase(&self, phase: Phase) -> &[Action] {
    match phase {
      Phase::Before => &self.before,
      Phase::During => &self.during,
      Phase::After => &self.after,
    }
  }

  pub fn is_empty(&self) -> bool {
    self.before.is_empty() && self.during.is_empty() && self.after.is_empty()
  }
}
