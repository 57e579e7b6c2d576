//! 2D coordinate in scene space.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
  pub x: f64,
  pub y: f64,
}

impl Point {
  pub const fn new(x: f64, y: f64) -> Self {
    Self { x, y }
  }

  /// Point on the circle of `radius` around `self` at `angle` radians.
  pub fn on_circle(self, radius: f64, angle: f64) -> Point {
    Point {
      x: self.x + radius * angle.cos(),
      y: self.y + radius * angle.sin(),
    }
  }

  /// Linear interpolation toward `dest`. `progress` is clamped to `[0, 1]`, and a progress of
  /// one returns `dest` exactly.
  pub fn lerp(self, dest: Point, progress: f64) -> Point {
    if progress.is_nan() || progress <= 0.0 {
      return self;
    }
    if progress >= 1.0 {
      return dest;
    }
    Point {
      x: self.x + progress * (dest.x - self.x),
      y: self.y + progress * (dest.y - self.y),
    }
  }
}
