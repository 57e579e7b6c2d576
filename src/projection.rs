//! Render projection: accumulated state + layout + live tokens -> scene.
//!
//! Purely derived; nothing here owns state.

use serde::Serialize;
use tracing::instrument;

use crate::animator::TokenView;
use crate::layout::{Layout, RingGeometry};
use crate::types::{AccumulatedState, NodeId, Payload, PhaseCursor, Point, Trace};

/// Everything a presentation layer needs to draw one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
  pub cursor: PhaseCursor,
  /// Phases entered so far, out of `total_phases`.
  pub progress: u32,
  pub total_phases: u32,
  pub ring: RingGeometry,
  pub nodes: Vec<SceneNode>,
  pub tokens: Vec<SceneToken>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneNode {
  pub id: NodeId,
  pub label: String,
  pub position: Point,
  pub label_anchor: Point,
  pub corrupt: bool,
  /// `None` when no state was ever recorded; `Some(Null)` for an explicit null state.
  pub state: Option<Payload>,
  pub output: Option<Payload>,
  pub terminated: bool,
}

impl SceneNode {
  /// True once the node has an output.
  pub fn decided(&self) -> bool {
    self.output.is_some()
  }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneToken {
  pub key: String,
  pub from: NodeId,
  pub to: NodeId,
  pub payload: Payload,
  pub position: Point,
}

impl From<TokenView> for SceneToken {
  fn from(view: TokenView) -> Self {
    Self {
      key: view.key,
      from: view.from,
      to: view.to,
      payload: view.payload,
      position: view.position,
    }
  }
}

/// Scene for the current cursor and progress.
#[instrument(level = "trace", skip_all, fields(cursor = %cursor, tokens = tokens.len()))]
pub fn render(
  trace: &Trace,
  layout: &Layout,
  state: &AccumulatedState,
  tokens: &[TokenView],
  cursor: PhaseCursor,
  progress: u32,
) -> Scene {
  let nodes = layout
    .iter()
    .map(|(id, placement)| SceneNode {
      id,
      label: id.to_string(),
      position: placement.center,
      label_anchor: placement.label_anchor,
      corrupt: trace.is_corrupt(id),
      state: state.state_of(id).cloned(),
      output: state.output_of(id).cloned(),
      terminated: state.is_terminated(id),
    })
    .collect();
  Scene {
    cursor,
    progress,
    total_phases: trace.total_phases(),
    ring: *layout.geometry(),
    nodes,
    tokens: tokens.iter().cloned().map(SceneToken::from).collect(),
  }
}
