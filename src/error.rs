//! Error taxonomy for loading and replaying traces.
//!
//! Load-time errors stop playback before it starts; replay-time errors halt it at the offending
//! phase. Nothing is retried: a trace either replays deterministically or halts.

use thiserror::Error;

use crate::types::{NodeId, Phase};

/// Structural defects found while loading a trace.
#[derive(Debug, Error)]
pub enum LoadError {
  /// A trace needs at least one node.
  #[error("invalid node count: {num_nodes} (must be at least 1)")]
  InvalidNodeCount { num_nodes: u32 },

  /// A corrupt node id lies outside `1..=num_nodes`.
  #[error("corrupt node {node} is outside 1..={num_nodes}")]
  CorruptNodeOutOfRange { node: NodeId, num_nodes: u32 },

  /// Round keys must be exactly `1..=R`.
  #[error("round keys are not contiguous from 1: expected round {expected}, found {found}")]
  NonContiguousRounds { expected: u32, found: u32 },

  #[error("invalid trace JSON: {0}")]
  Json(#[from] serde_json::Error),

  #[error("failed to read trace: {0}")]
  Io(#[from] std::io::Error),
}

/// Structural defects found while replaying a phase.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReplayError {
  /// An action names a node outside `1..=num_nodes`.
  #[error("round {round} {phase}: node {node} is out of range 1..={num_nodes}")]
  NodeOutOfRange {
    round: u32,
    phase: Phase,
    node: NodeId,
    num_nodes: u32,
  },

  /// A message whose sender and receiver are the same node.
  #[error("round {round} {phase}: node {node} sends a message to itself")]
  SelfMessage {
    round: u32,
    phase: Phase,
    node: NodeId,
  },
}

/// Failures while obtaining traces from a source.
#[derive(Debug, Error)]
pub enum SourceError {
  #[error("trace listing request failed: {0}")]
  Http(#[from] reqwest::Error),

  #[error(transparent)]
  Load(#[from] LoadError),

  #[error("no trace named '{name}' in the catalog")]
  TraceNotFound { name: String },

  #[error("the trace catalog is empty")]
  EmptyCatalog,
}

/// Invalid playback configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("{var} must be a positive number of milliseconds, got '{value}'")]
  InvalidDuration { var: String, value: String },
}

/// The player task has exited and no longer accepts commands.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("player is no longer running")]
pub struct PlayerClosed;
