//! One recorded protocol event.

use serde::{Deserialize, Serialize};

use super::{NodeId, Payload};

/// One recorded event of a protocol run, tagged by `"action"` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
  /// A protocol message in flight between two nodes during the phase.
  MessageSent {
    from: NodeId,
    to: NodeId,
    #[serde(default)]
    payload: Payload,
  },
  /// Replaces the node's displayed state wholesale. `Null` means "no state yet".
  StateChanged {
    node: NodeId,
    #[serde(rename = "newState", default)]
    new_state: Payload,
  },
  /// The node finished protocol execution.
  Terminated { node: NodeId },
  /// The node's decided value.
  Output { node: NodeId, output: Payload },
}

impl Action {
  /// Every node id the action refers to (one for node events, two for messages).
  pub fn node_ids(&self) -> Vec<NodeId> {
    match self {
      Action::MessageSent { from, to, .. } => vec![*from, *to],
      Action::StateChanged { node, .. }
      | Action::Terminated { node }
      | Action::Output { node, .. } => vec![*node],
    }
  }

  /// Short tag, as written in the trace.
  pub fn kind(&self) -> &'static str {
    match self {
      Action::MessageSent { .. } => "message_sent",
      Action::StateChanged { .. } => "state_changed",
      Action::Terminated { .. } => "terminated",
      Action::Output { .. } => "output",
    }
  }
}
