//! A complete, finite, pre-recorded protocol run organized by round and phase.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::{Action, NodeId, Phase, RoundActions};
use crate::error::LoadError;

/// Trace as it appears on the wire, before validation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TraceWire {
  num_nodes: u32,
  #[serde(default)]
  corrupt_nodes: BTreeSet<NodeId>,
  #[serde(default)]
  actions: BTreeMap<u32, RoundActions>,
}

/// Validated, read-only trace.
///
/// Invariants: `num_nodes >= 1`, every corrupt node is in `1..=num_nodes`, and round keys are
/// exactly `1..=R` (possibly empty).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "TraceWire")]
pub struct Trace {
  num_nodes: u32,
  corrupt_nodes: BTreeSet<NodeId>,
  actions: BTreeMap<u32, RoundActions>,
}

impl TryFrom<TraceWire> for Trace {
  type Error = LoadError;

  fn try_from(wire: TraceWire) -> Result<Self, Self::Error> {
    Trace::new(wire.num_nodes, wire.corrupt_nodes, wire.actions)
  }
}

impl Trace {
  /// Builds a trace, rejecting any shape that violates the load-time invariants.
  #[instrument(level = "trace", skip(corrupt_nodes, actions))]
  pub fn new(
    num_nodes: u32,
    corrupt_nodes: impl IntoIterator<Item = NodeId>,
    actions: BTreeMap<u32, RoundActions>,
  ) -> Result<Self, LoadError> {
    if num_nodes < 1 {
      return Err(LoadError::InvalidNodeCount { num_nodes });
    }
    let corrupt_nodes: BTreeSet<NodeId> = corrupt_nodes.into_iter().collect();
    if let Some(&node) = corrupt_nodes
      .iter()
      .find(|&&n| n < 1 || n > num_nodes)
    {
      return Err(LoadError::CorruptNodeOutOfRange { node, num_nodes });
    }
    for (expected, &found) in (1u32..).zip(actions.keys()) {
      if found != expected {
        return Err(LoadError::NonContiguousRounds { expected, found });
      }
    }
    Ok(Self {
      num_nodes,
      corrupt_nodes,
      actions,
    })
  }

  /// Parses and validates a trace from JSON text.
  pub fn from_json(json: &str) -> Result<Self, LoadError> {
    let wire: TraceWire = serde_json::from_str(json)?;
    Trace::try_from(wire)
  }

  /// Validates an already-parsed JSON value.
  pub fn from_value(value: serde_json::Value) -> Result<Self, LoadError> {
    let wire: TraceWire = serde_json::from_value(value)?;
    Trace::try_from(wire)
  }

  /// Reads and validates a trace from a JSON file.
  pub fn from_path(path: &Path) -> Result<Self, LoadError> {
    let json = std::fs::read_to_string(path)?;
    Trace::from_json(&json)
  }

  pub fn num_nodes(&self) -> u32 {
    self.num_nodes
  }

  pub fn corrupt_nodes(&self) -> &BTreeSet<NodeId> {
    &self.corrupt_nodes
  }

  pub fn is_corrupt(&self, node: NodeId) -> bool {
    self.corrupt_nodes.contains(&node)
  }

  /// True when `node` is a valid id for this trace.
  pub fn contains_node(&self, node: NodeId) -> bool {
    (1..=self.num_nodes).contains(&node)
  }

  /// Highest round `R` (0 for a trace without rounds).
  pub fn max_round(&self) -> u32 {
    self.actions.keys().next_back().copied().unwrap_or(0)
  }

  /// Actions of round `round`, or `None` past the end of the trace.
  pub fn round(&self, round: u32) -> Option<&RoundActions> {
    self.actions.get(&round)
  }

  /// Ordered actions of `(round, phase)`; empty when the round does not exist.
  pub fn phase_actions(&self, round: u32, phase: Phase) -> &[Action] {
    self
      .actions
      .get(&round)
      .map(|r| r.phase(phase))
      .unwrap_or(&[])
  }

  /// Number of phases a full replay visits.
  pub fn total_phases(&self) -> u32 {
    self.max_round() * Phase::ALL.len() as u32
  }
}
