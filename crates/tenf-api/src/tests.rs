//! Router tests driven through `tower::ServiceExt::oneshot`.

use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
use axum::{
  body::Body,
  http::{Request, StatusCode, header},
};
use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
use rand_core::OsRng;
use serde_json::{Value, json};
use tenf_core::{RaidLedger, memory::MemoryStore, store::BlobStore};
use tower::ServiceExt as _;

use crate::{AppState, AuthConfig, router};

fn make_state<S: BlobStore + 'static>(store: S) -> AppState<S> {
  let salt = SaltString::generate(&mut OsRng);
  let hash = Argon2::default()
    .hash_password(b"secret", &salt)
    .unwrap()
    .to_string();

  AppState::new(
    RaidLedger::new(store),
    AuthConfig { username: "mod".to_string(), password_hash: hash },
  )
}

fn auth_header() -> String { format!("Basic {}", B64.encode("mod:secret")) }

async fn call<S: BlobStore + 'static>(
  state: &AppState<S>,
  method: &str,
  uri: &str,
  authed: bool,
  body: Option<Value>,
) -> (StatusCode, Value) {
  let mut builder = Request::builder().method(method).uri(uri);
  if authed {
    builder = builder.header(header::AUTHORIZATION, auth_header());
  }
  let body = match body {
    Some(v) => {
      builder = builder.header(header::CONTENT_TYPE, "application/json");
      Body::from(v.to_string())
    }
    None => Body::empty(),
  };

  let resp = router(state.clone())
    .oneshot(builder.body(body).unwrap())
    .await
    .unwrap();
  let status = resp.status();
  let bytes = axum::body::to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
  // Extractor rejections answer in plain text; keep those as a string.
  let json = if bytes.is_empty() {
    Value::Null
  } else {
    serde_json::from_slice(&bytes)
      .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
  };
  (status, json)
}

// ─── A store that always fails ───────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
#[error("store offline")]
struct Offline;

struct DownStore;

impl BlobStore for DownStore {
  type Error = Offline;

  async fn get(&self, _: &str) -> Result<Option<Value>, Offline> { Err(Offline) }

  async fn put(&self, _: &str, _: Value) -> Result<(), Offline> { Err(Offline) }

  async fn keys(&self, _: &str) -> Result<Vec<String>, Offline> { Err(Offline) }
}

// ─── Auth ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn writes_require_credentials() {
  let state = make_state(MemoryStore::new());
  let body = json!({ "raiderId": "U1", "targetId": "U2" });

  let (status, _) = call(&state, "POST", "/raids/record", false, Some(body)).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
  assert!(state.ledger.member_stats("U1").await.unwrap().targets.is_empty());
}

#[tokio::test]
async fn reads_are_public() {
  let state = make_state(MemoryStore::new());
  let (status, body) = call(&state, "GET", "/raids/stats", false, None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body, json!({}));
}

// ─── Counters ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn record_and_read_member_stats() {
  let state = make_state(MemoryStore::new());
  let edge = json!({ "raiderId": "U1", "targetId": "U2", "month": "2024-03" });

  for _ in 0..3 {
    let (status, _) = call(&state, "POST", "/raids/record", true, Some(edge.clone())).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
  }

  let (status, body) =
    call(&state, "GET", "/raids/stats/U1?month=2024-03", false, None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["memberId"], "U1");
  assert_eq!(body["month"], "2024-03");
  assert_eq!(body["stats"]["done"], 3);
  assert_eq!(body["stats"]["targets"]["U2"], 3);
  assert_eq!(body["excessive"], true);

  let (_, months) = call(&state, "GET", "/raids/months", false, None).await;
  assert_eq!(months, json!(["2024-03"]));
}

#[tokio::test]
async fn remove_uncounted_raid_is_404() {
  let state = make_state(MemoryStore::new());
  let edge = json!({ "raiderId": "U1", "targetId": "U2" });
  let (status, body) = call(&state, "POST", "/raids/remove", true, Some(edge)).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert!(body["error"].is_string());
}

#[tokio::test]
async fn bad_month_is_400() {
  let state = make_state(MemoryStore::new());
  let (status, body) = call(&state, "GET", "/raids/stats?month=2024-13", false, None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].is_string());
}

#[tokio::test]
async fn bad_month_in_body_is_400() {
  let state = make_state(MemoryStore::new());
  for uri in ["/raids/record", "/raids/remove"] {
    let edge = json!({ "raiderId": "U1", "targetId": "U2", "month": "2024-13" });
    let (status, body) = call(&state, "POST", uri, true, Some(edge)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
    assert!(body["error"].as_str().unwrap().contains("2024-13"), "{uri}");
  }
  assert!(state.ledger.months().await.unwrap().is_empty());
}

#[tokio::test]
async fn explicit_month_in_body_is_used() {
  let state = make_state(MemoryStore::new());
  let edge = json!({ "raiderId": "U1", "targetId": "U2", "month": "2023-11" });
  let (status, _) = call(&state, "POST", "/raids/record", true, Some(edge)).await;
  assert_eq!(status, StatusCode::NO_CONTENT);

  let (_, body) = call(&state, "GET", "/raids/stats/U1?month=2023-11", false, None).await;
  assert_eq!(body["stats"]["done"], 1);
}

// ─── Pending queue ───────────────────────────────────────────────────────────

#[tokio::test]
async fn pending_validate_flow() {
  let state = make_state(MemoryStore::new());
  let claim = json!({ "messageId": "msg1", "raiderId": "U1", "targetId": "U2" });

  let (status, body) = call(&state, "POST", "/raids/pending", true, Some(claim.clone())).await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(body, json!({ "added": true }));

  let (status, body) = call(&state, "POST", "/raids/pending", true, Some(claim)).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body, json!({ "added": false }));

  let (_, queue) = call(&state, "GET", "/raids/pending", false, None).await;
  assert_eq!(queue.as_array().unwrap().len(), 1);
  assert_eq!(queue[0]["messageId"], "msg1");

  let (status, _) = call(&state, "POST", "/raids/pending/msg1/validate", true, None).await;
  assert_eq!(status, StatusCode::NO_CONTENT);
  let (status, _) = call(&state, "POST", "/raids/pending/msg1/validate", true, None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);

  let (_, body) = call(&state, "GET", "/raids/stats/U2", false, None).await;
  assert_eq!(body["stats"]["received"], 1);
}

#[tokio::test]
async fn pending_reject_flow() {
  let state = make_state(MemoryStore::new());
  let claim = json!({ "messageId": "msg2", "raiderId": "U1", "targetId": "U2" });
  call(&state, "POST", "/raids/pending", true, Some(claim)).await;

  let (status, _) = call(&state, "POST", "/raids/pending/msg2/reject", true, None).await;
  assert_eq!(status, StatusCode::NO_CONTENT);
  let (status, _) = call(&state, "POST", "/raids/pending/msg2/reject", true, None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);

  let (_, body) = call(&state, "GET", "/raids/stats/U1", false, None).await;
  assert_eq!(body["stats"]["done"], 0);
}

#[tokio::test]
async fn pending_requires_ids() {
  let state = make_state(MemoryStore::new());
  let claim = json!({ "messageId": "", "raiderId": "U1", "targetId": "U2" });
  let (status, _) = call(&state, "POST", "/raids/pending", true, Some(claim)).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ─── Unmatched log ───────────────────────────────────────────────────────────

#[tokio::test]
async fn unmatched_add_list_remove() {
  let state = make_state(MemoryStore::new());
  let entry = json!({
    "id": "x",
    "content": "raid vers ???",
    "reason": "regex_fail",
    "messageId": "msg7",
    "timestamp": "2024-03-02T18:00:00Z",
  });

  let (status, _) = call(&state, "POST", "/raids/unmatched", true, Some(entry.clone())).await;
  assert_eq!(status, StatusCode::CREATED);
  let (status, _) = call(&state, "POST", "/raids/unmatched", true, Some(entry)).await;
  assert_eq!(status, StatusCode::OK);

  let (_, log) = call(&state, "GET", "/raids/unmatched?month=2024-03", false, None).await;
  assert_eq!(log.as_array().unwrap().len(), 1);
  assert_eq!(log[0]["reason"], "regex_fail");

  let (status, _) =
    call(&state, "DELETE", "/raids/unmatched/msg7?month=2024-03", true, None).await;
  assert_eq!(status, StatusCode::NO_CONTENT);
  let (status, _) =
    call(&state, "DELETE", "/raids/unmatched/msg7?month=2024-03", true, None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unmatched_rejects_unknown_reason() {
  let state = make_state(MemoryStore::new());
  let entry = json!({ "id": "x", "content": "?", "reason": "bogus" });
  let (status, _) = call(&state, "POST", "/raids/unmatched", true, Some(entry)).await;
  assert!(status.is_client_error());
}

// ─── Storage failures ────────────────────────────────────────────────────────

#[tokio::test]
async fn reads_collapse_to_empty_when_store_is_down() {
  let state = make_state(DownStore);

  let (status, body) = call(&state, "GET", "/raids/stats", false, None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body, json!({}));

  let (status, body) = call(&state, "GET", "/raids/stats/U1", false, None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["stats"], json!({ "done": 0, "received": 0, "targets": {} }));

  let (_, body) = call(&state, "GET", "/raids/pending", false, None).await;
  assert_eq!(body, json!([]));
}

#[tokio::test]
async fn writes_fail_with_500_when_store_is_down() {
  let state = make_state(DownStore);
  let edge = json!({ "raiderId": "U1", "targetId": "U2" });
  let (status, body) = call(&state, "POST", "/raids/record", true, Some(edge)).await;
  assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
  assert!(body["error"].as_str().unwrap().contains("offline"));
}
