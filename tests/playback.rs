//! Integration tests for the async player: macro tick, token animation, reload, halt and stop.
//!
//! Every test runs on paused tokio time, so the 100 ms phases below complete instantly.

use std::time::Duration;

use agreement_replay::catalog::sample_trace;
use agreement_replay::projection::Scene;
use agreement_replay::{Phase, PhaseCursor, PlaybackConfig, PlaybackStatus, PlayerHandle, Trace};
use serde_json::json;
use tokio_test::assert_ok;

const PHASE_MS: u64 = 100;

fn ms(n: u64) -> Duration {
  Duration::from_millis(n)
}

fn config() -> PlaybackConfig {
  PlaybackConfig::default()
    .with_phase_duration(ms(PHASE_MS))
    .with_frame_interval(ms(10))
}

fn scene(player: &PlayerHandle) -> Scene {
  player.scene().expect("a scene is published once a trace is loaded")
}

fn two_node_trace() -> Trace {
  Trace::from_json(
    r#"{
      "numNodes": 2,
      "corruptNodes": [],
      "actions": {
        "1": {
          "before": [{ "action": "message_sent", "from": 1, "to": 2, "payload": "hi" }],
          "during": [],
          "after": [{ "action": "output", "node": 2, "output": 7 }]
        }
      }
    }"#,
  )
  .unwrap()
}

#[tokio::test(start_paused = true)]
async fn idle_player_has_no_scene() {
  let player = PlayerHandle::spawn(config());
  assert_eq!(player.status(), PlaybackStatus::Idle);
  assert!(player.scene().is_none());
  assert_ok!(player.stop().await);
  assert_eq!(player.status(), PlaybackStatus::Idle);
  player.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn sample_plays_to_a_decided_final_scene() {
  let player = PlayerHandle::spawn(config());
  assert_ok!(player.load(sample_trace().unwrap()).await);
  assert_eq!(player.wait_until_done().await, PlaybackStatus::Finished);

  let s = scene(&player);
  assert_eq!(s.cursor, PhaseCursor::new(4, Phase::After));
  assert_eq!(s.progress, 12);
  assert_eq!(s.total_phases, 12);
  assert!(s.tokens.is_empty());
  for node in &s.nodes[..3] {
    assert!(node.terminated, "node {} should be terminated", node.id);
    assert_eq!(node.output, Some(json!(true)));
    assert!(!node.corrupt);
  }
  let corrupt = &s.nodes[3];
  assert!(corrupt.corrupt);
  assert!(!corrupt.terminated);
  assert!(!corrupt.decided());
  player.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn loaded_trace_starts_from_an_empty_scene() {
  let player = PlayerHandle::spawn(config());
  assert_ok!(player.load(sample_trace().unwrap()).await);
  assert_eq!(
    player.status(),
    PlaybackStatus::Playing {
      cursor: PhaseCursor::INITIAL
    }
  );
  let s = scene(&player);
  assert_eq!(s.cursor, PhaseCursor::INITIAL);
  assert_eq!(s.progress, 0);
  assert_eq!(s.nodes.len(), 4);
  assert!(s.nodes.iter().all(|n| n.state.is_none() && !n.terminated));
  assert!(s.tokens.is_empty());
  player.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn phase_tokens_glide_and_are_replaced_on_the_next_phase() {
  let player = PlayerHandle::spawn(config());
  assert_ok!(player.load(sample_trace().unwrap()).await);

  tokio::time::sleep(ms(PHASE_MS + 1)).await;
  let s = scene(&player);
  assert_eq!(s.cursor, PhaseCursor::new(1, Phase::Before));
  assert_eq!(s.tokens.len(), 3);
  assert!(s.tokens.iter().all(|t| t.from == 1));
  assert_eq!(s.nodes[3].state, Some(serde_json::Value::Null));

  tokio::time::sleep(ms(PHASE_MS / 2)).await;
  let s = scene(&player);
  let origin = s.nodes[0].position;
  for token in &s.tokens {
    let dest = s.nodes[(token.to - 1) as usize].position;
    assert_ne!(token.position, origin, "token {} has not moved", token.key);
    assert_ne!(token.position, dest, "token {} arrived early", token.key);
  }

  tokio::time::sleep(ms(PHASE_MS)).await;
  let s = scene(&player);
  assert_eq!(s.cursor, PhaseCursor::new(1, Phase::During));
  assert!(s.tokens.is_empty());
  player.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn loading_mid_playback_resets_everything() {
  let player = PlayerHandle::spawn(config());
  assert_ok!(player.load(sample_trace().unwrap()).await);
  tokio::time::sleep(ms(PHASE_MS * 3 + PHASE_MS / 2)).await;
  assert_eq!(scene(&player).cursor, PhaseCursor::new(1, Phase::After));

  assert_ok!(player.load(two_node_trace()).await);
  let s = scene(&player);
  assert_eq!(s.cursor, PhaseCursor::INITIAL);
  assert_eq!(s.nodes.len(), 2);
  assert!(s.nodes.iter().all(|n| n.state.is_none() && n.output.is_none()));
  assert!(s.tokens.is_empty());

  assert_eq!(player.wait_until_done().await, PlaybackStatus::Finished);
  let s = scene(&player);
  assert_eq!(s.progress, 3);
  assert_eq!(s.nodes[1].output, Some(json!(7)));
  player.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn malformed_phase_halts_and_keeps_the_last_valid_scene() {
  let trace = Trace::from_json(
    r#"{
      "numNodes": 3,
      "corruptNodes": [],
      "actions": {
        "1": {
          "before": [{ "action": "state_changed", "node": 1, "newState": "ok" }],
          "during": [
            { "action": "state_changed", "node": 2, "newState": "never" },
            { "action": "message_sent", "from": 3, "to": 3, "payload": null }
          ],
          "after": []
        }
      }
    }"#,
  )
  .unwrap();
  let player = PlayerHandle::spawn(config());
  assert_ok!(player.load(trace).await);

  let status = player.wait_until_done().await;
  let PlaybackStatus::Halted { reason } = &status else {
    panic!("expected a halt, got {status:?}");
  };
  assert!(reason.contains("itself"), "reason: {reason}");

  let s = scene(&player);
  assert_eq!(s.cursor, PhaseCursor::new(1, Phase::Before));
  assert_eq!(s.nodes[0].state, Some(json!("ok")));
  assert_eq!(s.nodes[1].state, None);

  tokio::time::sleep(ms(PHASE_MS * 5)).await;
  assert_eq!(scene(&player), s);
  player.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn stop_freezes_the_scene() {
  let player = PlayerHandle::spawn(config());
  assert_ok!(player.load(sample_trace().unwrap()).await);
  tokio::time::sleep(ms(PHASE_MS + PHASE_MS / 2)).await;

  assert_ok!(player.stop().await);
  assert_eq!(player.status(), PlaybackStatus::Stopped);
  let frozen = scene(&player);
  assert_eq!(frozen.cursor, PhaseCursor::new(1, Phase::Before));

  tokio::time::sleep(ms(PHASE_MS * 20)).await;
  assert_eq!(scene(&player), frozen);
  assert_eq!(player.status(), PlaybackStatus::Stopped);
  player.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn replays_of_the_same_trace_are_identical() {
  async fn final_scene() -> Scene {
    let player = PlayerHandle::spawn(config());
    player.load(sample_trace().unwrap()).await.unwrap();
    player.wait_until_done().await;
    let s = scene(&player);
    player.shutdown().await;
    s
  }
  assert_eq!(final_scene().await, final_scene().await);
}

#[tokio::test(start_paused = true)]
async fn scene_stream_reports_every_phase_in_order() {
  use futures::StreamExt;

  let player = PlayerHandle::spawn(config());
  let trace = two_node_trace();
  let mut scenes = player.scenes();
  assert_ok!(player.load(trace).await);
  let mut cursors: Vec<PhaseCursor> = Vec::new();
  {
    let done = player.wait_until_done();
    tokio::pin!(done);
    loop {
      tokio::select! {
        Some(Some(s)) = scenes.next() => {
          if cursors.last() != Some(&s.cursor) {
            cursors.push(s.cursor);
          }
        }
        _ = &mut done => break,
      }
    }
  }
  // The final scene may land together with the finished status.
  if let Some(s) = player.scene() {
    if cursors.last() != Some(&s.cursor) {
      cursors.push(s.cursor);
    }
  }
  assert_eq!(
    cursors.last().copied(),
    Some(PhaseCursor::new(1, Phase::After))
  );
  assert!(cursors.windows(2).all(|w| w[0] < w[1]));
  player.shutdown().await;
}
