//! String-keyed persistence behind every progress and authoring write.
//!
//! The store is injected; `MemoryStore` is the process-local implementation
//! used by the service and by tests. Values are JSON-encoded by the helpers
//! below, except the plain-text initial reflection.

use std::{collections::HashMap, sync::RwLock};

use serde::{de::DeserializeOwned, Serialize};
use tracing::warn;

pub trait KeyValueStore: Send + Sync {
  fn get(&self, key: &str) -> Option<String>;
  fn set(&self, key: &str, value: String);
  fn remove(&self, key: &str);
  fn keys(&self) -> Vec<String>;
}

#[derive(Default)]
pub struct MemoryStore {
  entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }
}

// A poisoned lock still holds a usable map; recover it instead of panicking.
impl KeyValueStore for MemoryStore {
  fn get(&self, key: &str) -> Option<String> {
    let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
    entries.get(key).cloned()
  }

  fn set(&self, key: &str, value: String) {
    let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
    entries.insert(key.to_string(), value);
  }

  fn remove(&self, key: &str) {
    let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
    entries.remove(key);
  }

  fn keys(&self) -> Vec<String> {
    let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
    entries.keys().cloned().collect()
  }
}

/// Key names for one lecture's learner state.
pub struct LectureKeys;

impl LectureKeys {
  pub fn progress(lecture_id: &str) -> String { format!("lecture-progress-{lecture_id}") }
  pub fn readiness_draft(lecture_id: &str) -> String { format!("readiness-{lecture_id}") }
  pub fn watched(lecture_id: &str) -> String { format!("watched-{lecture_id}") }
  pub fn initial_reflection(lecture_id: &str) -> String { format!("reflection-{lecture_id}") }
  pub fn mastery_history(lecture_id: &str) -> String { format!("mastery-reflections-{lecture_id}") }

  /// Every key a full reset must erase.
  pub fn all(lecture_id: &str) -> [String; 5] {
    [
      Self::progress(lecture_id),
      Self::readiness_draft(lecture_id),
      Self::initial_reflection(lecture_id),
      Self::watched(lecture_id),
      Self::mastery_history(lecture_id),
    ]
  }
}

pub const LECTURE_DATA_PREFIX: &str = "lecture-data-";
pub const LECTURE_SOURCE_PREFIX: &str = "lecture-source-";

/// Read and decode `key`. Missing, unreadable or corrupt values yield the default.
pub fn load_json<T, S>(store: &S, key: &str) -> T
where
  T: DeserializeOwned + Default,
  S: KeyValueStore + ?Sized,
{
  load_json_opt(store, key).unwrap_or_default()
}

/// Like `load_json` but distinguishes "nothing usable stored" as `None`.
pub fn load_json_opt<T, S>(store: &S, key: &str) -> Option<T>
where
  T: DeserializeOwned,
  S: KeyValueStore + ?Sized,
{
  let raw = store.get(key)?;
  match serde_json::from_str::<T>(&raw) {
    Ok(v) => Some(v),
    Err(e) => {
      warn!(target: "progress", %key, error = %e, "Stored value is corrupt; falling back to default.");
      None
    }
  }
}

pub fn save_json<T, S>(store: &S, key: &str, value: &T) -> Result<(), serde_json::Error>
where
  T: Serialize + ?Sized,
  S: KeyValueStore + ?Sized,
{
  let raw = serde_json::to_string(value)?;
  store.set(key, raw);
  Ok(())
}
