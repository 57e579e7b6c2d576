//! Recorded-execution types: the trace schema and the state accumulated while replaying it.
//!
//! A [Trace] is immutable once loaded; [AccumulatedState] is owned by the scheduler and only
//! ever grows.

mod accumulated_state;
mod action;
#[cfg(test)]
mod action_test;
mod cursor;
mod phase;
mod point;
mod round_actions;
mod trace;
mod trace_record;

pub use accumulated_state::{AccumulatedState, Applied};
pub use action::Action;
pub use cursor::PhaseCursor;
pub use phase::Phase;
pub use point::Point;
pub use round_actions::RoundActions;
pub use trace::Trace;
pub use trace_record::TraceRecord;

/// Identifier of a simulated participant, in `1..=num_nodes`.
pub type NodeId = u32;

/// Opaque protocol value (message payload, node state, decided output).
pub type Payload = serde_json::Value;
