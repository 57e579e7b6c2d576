//! Ring layout: where each node and its label sit on screen.

use std::collections::BTreeMap;
use std::f64::consts::PI;

use serde::Serialize;
use tracing::instrument;

use crate::types::{NodeId, Point};

/// Fixed drawing constants of the ring.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RingGeometry {
  pub center: Point,
  pub radius: f64,
  /// Distance from the node circle to the label circle.
  pub label_buffer: f64,
  pub node_radius: f64,
  pub token_radius: f64,
}

impl Default for RingGeometry {
  fn default() -> Self {
    Self {
      center: Point::new(560.0, 510.0),
      radius: 350.0,
      label_buffer: 70.0,
      node_radius: 40.0,
      token_radius: 20.0,
    }
  }
}

/// Screen placement of one node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodePlacement {
  pub center: Point,
  pub label_anchor: Point,
}

/// Placement of every node `1..=num_nodes`. Computed once per trace and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
  geometry: RingGeometry,
  placements: BTreeMap<NodeId, NodePlacement>,
}

impl Layout {
  pub fn geometry(&self) -> &RingGeometry {
    &self.geometry
  }

  pub fn placement(&self, node: NodeId) -> Option<&NodePlacement> {
    self.placements.get(&node)
  }

  pub fn len(&self) -> usize {
    self.placements.len()
  }

  pub fn is_empty(&self) -> bool {
    self.placements.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = (NodeId, &NodePlacement)> {
    self.placements.iter().map(|(id, p)| (*id, p))
  }
}

/// Places node `i` at angle `i * 2π / num_nodes` on the ring, with its label on a wider circle
/// at the same angle.
#[instrument(level = "trace", skip(geometry))]
pub fn compute_layout(num_nodes: u32, geometry: &RingGeometry) -> Layout {
  let step = if num_nodes == 0 {
    0.0
  } else {
    2.0 * PI / f64::from(num_nodes)
  };
  let placements = (1..=num_nodes)
    .map(|i| {
      let angle = step * f64::from(i);
      let placement = NodePlacement {
        center: geometry.center.on_circle(geometry.radius, angle),
        label_anchor: geometry
          .center
          .on_circle(geometry.radius + geometry.label_buffer, angle),
      };
      (i, placement)
    })
    .collect();
  Layout {
    geometry: *geometry,
    placements,
  }
}
