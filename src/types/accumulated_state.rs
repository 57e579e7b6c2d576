//! Running summary of every action applied so far.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use super::{Action, NodeId, Payload};

/// Scheduler-owned state carried between ticks. Keys are only ever added or overwritten,
/// never removed, until the whole state is reset for a new trace.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccumulatedState {
  /// Last `StateChanged` per node. `Null` is an explicit "no state"; absence means never set.
  pub node_states: BTreeMap<NodeId, Payload>,
  pub terminated_nodes: BTreeSet<NodeId>,
  pub node_outputs: BTreeMap<NodeId, Payload>,
}

/// Effect of applying one action.
#[derive(Debug, Clone, PartialEq)]
pub enum Applied {
  /// Messages do not touch the accumulated state.
  Message,
  StateReplaced,
  Terminated { already: bool },
  OutputRecorded,
  /// The output overwrote a different earlier output for the same node.
  OutputConflict { previous: Payload },
}

impl AccumulatedState {
  pub fn new() -> Self {
    Self::default()
  }

  /// Applies one action. Node ids are assumed to have been validated by the caller.
  pub fn apply(&mut self, action: &Action) -> Applied {
    match action {
      Action::MessageSent { .. } => Applied::Message,
      Action::StateChanged { node, new_state } => {
        self.node_states.insert(*node, new_state.clone());
        Applied::StateReplaced
      }
      Action::Terminated { node } => Applied::Terminated {
        already: !self.terminated_nodes.insert(*node),
      },
      Action::Output { node, output } => match self.node_outputs.insert(*node, output.clone()) {
        Some(previous) if previous != *output => Applied::OutputConflict { previous },
        _ => Applied::OutputRecorded,
      },
    }
  }

  /// State of `node`: `None` if never set, `Some(Null)` if explicitly cleared.
  pub fn state_of(&self, node: NodeId) -> Option<&Payload> {
    self.node_states.get(&node)
  }

  pub fn output_of(&self, node: NodeId) -> Option<&Payload> {
    self.node_outputs.get(&node)
  }

  pub fn is_terminated(&self, node: NodeId) -> bool {
    self.terminated_nodes.contains(&node)
  }

  pub fn is_empty(&self) -> bool {
    self.node_states.is_empty() && self.terminated_nodes.is_empty() && self.node_outputs.is_empty()
  }
}
