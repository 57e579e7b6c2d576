//! # agreement-replay
//!
//! Replays a recorded execution trace of a distributed agreement protocol as a timed animation
//! over a ring of nodes.
//!
//! ## Architecture
//!
//! - [types]: trace schema (rounds, phases, actions) and the accumulated replay state.
//! - [layout]: ring positions for a node count, computed once per trace.
//! - [scheduler]: pure state machine stepping `(round, phase)` and applying each phase's actions.
//! - [animator]: per-message tokens gliding from sender to receiver on their own redraw clock.
//! - [projection]: scene derived from state, layout and live tokens.
//! - [player]: async driver owning the macro tick and the token set.
//! - [catalog]: trace sources (embedded sample, JSON file, HTTP listing).

pub mod animator;
#[cfg(test)]
mod animator_test;
pub mod catalog;
pub mod config;
pub mod error;
pub mod layout;
pub mod player;
pub mod projection;
pub mod scheduler;
pub mod types;

pub use catalog::{EmbeddedSource, FileSource, HttpSource, TraceCatalog, TraceSource};
pub use config::PlaybackConfig;
pub use error::{ConfigError, LoadError, PlayerClosed, ReplayError, SourceError};
pub use layout::{Layout, RingGeometry, compute_layout};
pub use player::{PlaybackStatus, PlayerHandle};
pub use projection::{Scene, render};
pub use scheduler::{PhaseScheduler, TickOutcome};
pub use types::{AccumulatedState, Action, Phase, PhaseCursor, Trace, TraceRecord};
