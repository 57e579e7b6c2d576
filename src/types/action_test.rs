//! Tests for `Action`.

use serde_json::json;

use super::Action;

#[test]
fn parses_message_sent() {
  let a: Action = serde_json::from_value(json!({
    "action": "message_sent",
    "from": 1,
    "to": 3,
    "payload": { "signer": 1 }
  }))
  .unwrap();
  assert_eq!(
    a,
    Action::MessageSent {
      from: 1,
      to: 3,
      payload: json!({ "signer": 1 }),
    }
  );
  assert_eq!(a.kind(), "message_sent");
  assert_eq!(a.node_ids(), vec![1, 3]);
}

#[test]
fn parses_state_changed_with_null_state() {
  let a: Action = serde_json::from_value(json!({
    "action": "state_changed",
    "node": 4,
    "newState": null
  }))
  .unwrap();
  assert_eq!(
    a,
    Action::StateChanged {
      node: 4,
      new_state: serde_json::Value::Null,
    }
  );
}

#[test]
fn missing_new_state_is_null() {
  let a: Action = serde_json::from_value(json!({ "action": "state_changed", "node": 2 })).unwrap();
  match a {
    Action::StateChanged { node, new_state } => {
      assert_eq!(node, 2);
      assert!(new_state.is_null());
    }
    other => panic!("unexpected action: {other:?}"),
  }
}

#[test]
fn parses_terminated_and_output() {
  let t: Action = serde_json::from_value(json!({ "action": "terminated", "node": 1 })).unwrap();
  assert_eq!(t, Action::Terminated { node: 1 });
  let o: Action =
    serde_json::from_value(json!({ "action": "output", "node": 1, "output": true })).unwrap();
  assert_eq!(
    o,
    Action::Output {
      node: 1,
      output: json!(true),
    }
  );
  assert_eq!(o.node_ids(), vec![1]);
}

#[test]
fn unknown_tag_is_rejected() {
  let r: Result<Action, _> = serde_json::from_value(json!({ "action": "crashed", "node": 1 }));
  assert!(r.is_err());
}

#[test]
fn serializes_with_wire_field_names() {
  let a = Action::StateChanged {
    node: 2,
    new_state: json!({ "hasSent": false }),
  };
  let v = serde_json::to_value(&a).unwrap();
  assert_eq!(v["action"], "state_changed");
  assert_eq!(v["newState"]["hasSent"], false);
}
