//! Named trace as served by a listing endpoint.

use serde::{Deserialize, Serialize};

use super::Trace;

/// One entry of a ranked trace listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceRecord {
  pub name: String,
  #[serde(default)]
  pub description: String,
  pub trace: Trace,
}
