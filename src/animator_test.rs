//! Tests for `MessageAnimator` and `interpolate`.

use std::sync::Arc;
use std::time::Duration;

use proptest::prelude::*;
use serde_json::json;
use tokio::sync::Notify;

use crate::animator::{MessageAnimator, TokenSpec, interpolate};
use crate::types::Point;

const ORIGIN: Point = Point::new(0.0, 0.0);
const DEST: Point = Point::new(100.0, 0.0);

fn spec() -> TokenSpec {
  TokenSpec {
    key: "1:before:0".to_string(),
    from: 1,
    to: 2,
    payload: json!({ "value": true }),
    origin: ORIGIN,
    dest: DEST,
  }
}

fn ms(n: u64) -> Duration {
  Duration::from_millis(n)
}

#[test]
fn interpolate_start_middle_end() {
  let d = ms(1000);
  assert_eq!(interpolate(ORIGIN, DEST, ms(0), d), Point::new(0.0, 0.0));
  assert_eq!(interpolate(ORIGIN, DEST, ms(500), d), Point::new(50.0, 0.0));
  assert_eq!(interpolate(ORIGIN, DEST, ms(1000), d), Point::new(100.0, 0.0));
}

#[test]
fn interpolate_clamps_overshoot() {
  assert_eq!(interpolate(ORIGIN, DEST, ms(1500), ms(1000)), DEST);
  assert_eq!(interpolate(ORIGIN, DEST, ms(5), Duration::ZERO), DEST);
}

proptest! {
  #[test]
  fn interpolate_is_monotonic_and_bounded(a in 0u64..3000, b in 0u64..3000) {
    let (early, late) = if a <= b { (a, b) } else { (b, a) };
    let d = ms(1000);
    let p = interpolate(ORIGIN, DEST, ms(early), d);
    let q = interpolate(ORIGIN, DEST, ms(late), d);
    prop_assert!(p.x <= q.x);
    prop_assert!((0.0..=100.0).contains(&p.x));
    prop_assert!((0.0..=100.0).contains(&q.x));
  }
}

#[tokio::test(start_paused = true)]
async fn position_starts_at_origin() {
  let a = MessageAnimator::spawn(spec(), ms(1000), ms(16), Arc::new(Notify::new()));
  assert_eq!(a.position(), ORIGIN);
  assert_eq!(a.view().key, "1:before:0");
}

#[tokio::test(start_paused = true)]
async fn token_glides_monotonically_and_lands_on_dest() {
  let redraw = Arc::new(Notify::new());
  let a = MessageAnimator::spawn(spec(), ms(100), ms(10), Arc::clone(&redraw));
  let mut xs = Vec::new();
  for _ in 0..15 {
    tokio::time::sleep(ms(10)).await;
    xs.push(a.position().x);
  }
  assert!(xs.windows(2).all(|w| w[0] <= w[1]));
  assert!(xs.iter().any(|&x| x > 0.0 && x < 100.0));
  assert_eq!(a.position(), DEST);
  tokio::task::yield_now().await;
  assert!(a.is_finished());
}

#[tokio::test(start_paused = true)]
async fn redraws_ping_the_shared_signal() {
  let redraw = Arc::new(Notify::new());
  let _a = MessageAnimator::spawn(spec(), ms(100), ms(10), Arc::clone(&redraw));
  let pinged = tokio::time::timeout(ms(50), redraw.notified()).await;
  assert!(pinged.is_ok());
}

#[tokio::test(start_paused = true)]
async fn cancelled_token_stops_redrawing() {
  let redraw = Arc::new(Notify::new());
  let a = MessageAnimator::spawn(spec(), ms(1000), ms(10), Arc::clone(&redraw));
  tokio::time::sleep(ms(305)).await;
  a.cancel();
  a.cancel();
  tokio::task::yield_now().await;
  let frozen = a.position();
  assert!(frozen.x > 0.0 && frozen.x < 100.0);
  tokio::time::sleep(ms(2000)).await;
  assert_eq!(a.position(), frozen);
  assert!(a.is_finished());
}

#[tokio::test(start_paused = true)]
async fn dropped_token_never_redraws() {
  let redraw = Arc::new(Notify::new());
  let a = MessageAnimator::spawn(spec(), ms(100), ms(10), Arc::clone(&redraw));
  drop(a);
  let pinged = tokio::time::timeout(ms(500), redraw.notified()).await;
  assert!(pinged.is_err());
}
