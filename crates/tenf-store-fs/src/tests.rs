//! Tests for `FileStore` in a scratch directory under the system temp dir.

use std::path::PathBuf;

use serde_json::json;
use tenf_core::{
  MonthKey, RaidLedger,
  memory::MemoryStore,
  store::{BlobStore, Mirrored},
};
use uuid::Uuid;

use crate::{Error, FileStore};

struct Scratch(PathBuf);

impl Drop for Scratch {
  fn drop(&mut self) { let _ = std::fs::remove_dir_all(&self.0); }
}

async fn store() -> (FileStore, Scratch) {
  let dir = std::env::temp_dir().join(format!("tenf-fs-{}", Uuid::new_v4().simple()));
  let store = FileStore::open(&dir).await.expect("scratch store");
  (store, Scratch(dir))
}

#[tokio::test]
async fn open_creates_directory() {
  let (s, _scratch) = store().await;
  assert!(s.dir().is_dir());
}

#[tokio::test]
async fn get_missing_returns_none() {
  let (s, _scratch) = store().await;
  assert!(s.get("raids-2024-03").await.unwrap().is_none());
}

#[tokio::test]
async fn put_writes_one_json_file_per_key() {
  let (s, _scratch) = store().await;
  s.put("raids-2024-03", json!({ "U1": { "done": 1 } })).await.unwrap();

  let raw = std::fs::read_to_string(s.dir().join("raids-2024-03.json")).unwrap();
  let parsed: serde_json::Value = serde_json::from_str(&raw).unwrap();
  assert_eq!(parsed, json!({ "U1": { "done": 1 } }));
  assert_eq!(s.get("raids-2024-03").await.unwrap(), Some(parsed));
}

#[tokio::test]
async fn put_leaves_no_temp_files() {
  let (s, _scratch) = store().await;
  s.put("raids-pending", json!([])).await.unwrap();
  s.put("raids-pending", json!([1])).await.unwrap();

  let names: Vec<_> = std::fs::read_dir(s.dir())
    .unwrap()
    .map(|e| e.unwrap().file_name().into_string().unwrap())
    .collect();
  assert_eq!(names, vec!["raids-pending.json"]);
}

#[tokio::test]
async fn rejects_path_like_keys() {
  let (s, _scratch) = store().await;
  for key in ["../escape", "a/b", "", "raids 2024"] {
    assert!(matches!(s.put(key, json!({})).await, Err(Error::InvalidKey(_))), "{key:?}");
    assert!(matches!(s.get(key).await, Err(Error::InvalidKey(_))), "{key:?}");
  }
}

#[tokio::test]
async fn corrupt_file_is_a_json_error() {
  let (s, _scratch) = store().await;
  std::fs::write(s.dir().join("raids-2024-03.json"), b"{ not json").unwrap();
  assert!(matches!(s.get("raids-2024-03").await, Err(Error::Json { .. })));
}

#[tokio::test]
async fn keys_filters_and_sorts() {
  let (s, _scratch) = store().await;
  for key in ["raids-2024-02", "raids-2024-01", "shop-items"] {
    s.put(key, json!({})).await.unwrap();
  }
  std::fs::write(s.dir().join("notes.txt"), b"ignored").unwrap();

  assert_eq!(s.keys("raids-").await.unwrap(), vec!["raids-2024-01", "raids-2024-02"]);
}

#[tokio::test]
async fn mirror_backs_up_memory_primary() {
  let (files, _scratch) = store().await;
  let ledger = RaidLedger::new(Mirrored::new(MemoryStore::new(), files.clone()));
  let month = MonthKey::new(2024, 3).unwrap();

  ledger.record_raid_in(month, "U1", "U2").await.unwrap();

  // A fresh ledger over the file copy alone sees the same counters.
  let from_disk = RaidLedger::new(files);
  assert_eq!(from_disk.member_stats_in(month, "U2").await.unwrap().received, 1);
}
