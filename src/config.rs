//! Playback configuration: clock cadences and ring geometry.

use std::time::Duration;

use crate::error::ConfigError;
use crate::layout::RingGeometry;

/// Default duration of one phase (one macro tick).
pub const DEFAULT_PHASE_DURATION: Duration = Duration::from_millis(1000);

/// Default redraw interval of a message token.
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Env var overriding the phase duration, in milliseconds.
pub const PHASE_MS_ENV: &str = "REPLAY_PHASE_MS";

/// Env var overriding the frame interval, in milliseconds.
pub const FRAME_MS_ENV: &str = "REPLAY_FRAME_MS";

/// Cadences and geometry for one player.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackConfig {
  /// Macro tick: time spent in each `(round, phase)`, and the travel time of a token.
  pub phase_duration: Duration,
  /// Animation tick of each token.
  pub frame_interval: Duration,
  pub geometry: RingGeometry,
}

impl Default for PlaybackConfig {
  fn default() -> Self {
    Self {
      phase_duration: DEFAULT_PHASE_DURATION,
      frame_interval: DEFAULT_FRAME_INTERVAL,
      geometry: RingGeometry::default(),
    }
  }
}

impl PlaybackConfig {
  /// Defaults overridden by `REPLAY_PHASE_MS` / `REPLAY_FRAME_MS` when set.
  pub fn from_env() -> Result<Self, ConfigError> {
    Self::from_lookup(|var| std::env::var(var).ok())
  }

  pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
    let mut config = Self::default();
    if let Some(value) = lookup(PHASE_MS_ENV) {
      config.phase_duration = parse_millis(PHASE_MS_ENV, &value)?;
    }
    if let Some(value) = lookup(FRAME_MS_ENV) {
      config.frame_interval = parse_millis(FRAME_MS_ENV, &value)?;
    }
    Ok(config)
  }

  pub fn with_phase_duration(mut self, phase_duration: Duration) -> Self {
    self.phase_duration = phase_duration;
    self
  }

  pub fn with_frame_interval(mut self, frame_interval: Duration) -> Self {
    self.frame_interval = frame_interval;
    self
  }
}

/// Parses a positive millisecond count.
pub fn parse_millis(var: &str, value: &str) -> Result<Duration, ConfigError> {
  match value.trim().parse::<u64>() {
    Ok(ms) if ms > 0 => Ok(Duration::from_millis(ms)),
    _ => Err(ConfigError::InvalidDuration {
      var: var.to_string(),
      value: value.to_string(),
    }),
  }
}
