//! Instructor-side lecture authoring: validate, normalize, persist, export.
//!
//! Saved lectures are stored as `LectureEntry` JSON plus an exported TOML
//! source blob the instructor can paste into the config bank.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::config::LectureEntry;
use crate::domain::{Lecture, LectureCategory};
use crate::error::{LecternError, Result};
use crate::store::{load_json_opt, save_json, KeyValueStore, LECTURE_DATA_PREFIX, LECTURE_SOURCE_PREFIX};

fn data_key(category: LectureCategory, id: &str) -> String {
  format!("{LECTURE_DATA_PREFIX}{}-{id}", category.as_str())
}

fn source_key(category: LectureCategory, id: &str) -> String {
  format!("{LECTURE_SOURCE_PREFIX}{}-{id}", category.as_str())
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthoredLecture {
  pub category: LectureCategory,
  pub lecture: Lecture,
  pub source: String,
}

/// Fill generated ids and make every concept node reference this lecture.
pub fn normalize(mut lecture: Lecture) -> Lecture {
  for q in &mut lecture.prompts.readiness {
    if q.id.trim().is_empty() {
      q.id = Uuid::new_v4().to_string();
    }
  }
  for p in &mut lecture.prompts.reflection {
    if p.id.trim().is_empty() {
      p.id = Uuid::new_v4().to_string();
    }
  }
  for c in &mut lecture.concepts {
    if !c.lectures.contains(&lecture.id) {
      c.lectures.push(lecture.id.clone());
    }
  }
  lecture
}

pub fn validate(lecture: &Lecture) -> Result<()> {
  if lecture.id.trim().is_empty() {
    return Err(LecternError::MissingField("id"));
  }
  if lecture.title.trim().is_empty() {
    return Err(LecternError::MissingField("title"));
  }
  if lecture.video_url.trim().is_empty() {
    return Err(LecternError::MissingField("videoUrl"));
  }
  Ok(())
}

/// Render an entry as a `[[lectures]]` TOML block.
pub fn export_source(entry: &LectureEntry) -> Result<String> {
  #[derive(Serialize)]
  struct Bank<'a> {
    lectures: Vec<&'a LectureEntry>,
  }
  let body = toml::to_string_pretty(&Bank { lectures: vec![entry] })?;
  Ok(format!("# {} / {}\n{}", entry.category.as_str(), entry.lecture.id, body))
}

pub struct Authoring<S: KeyValueStore + ?Sized> {
  store: Arc<S>,
}

impl<S: KeyValueStore + ?Sized> Clone for Authoring<S> {
  fn clone(&self) -> Self {
    Self { store: self.store.clone() }
  }
}

impl<S: KeyValueStore + ?Sized> Authoring<S> {
  pub fn new(store: Arc<S>) -> Self {
    Self { store }
  }

  #[instrument(level = "info", skip(self, lecture), fields(lecture = %lecture.id, category = category.as_str()))]
  pub fn save(&self, lecture: Lecture, category: LectureCategory) -> Result<AuthoredLecture> {
    validate(&lecture)?;
    let lecture = normalize(lecture);
    let entry = LectureEntry { category, lecture };
    let source = export_source(&entry)?;

    save_json(&*self.store, &data_key(category, &entry.lecture.id), &entry)?;
    self.store.set(&source_key(category, &entry.lecture.id), source.clone());
    info!(target: "authoring", id = %entry.lecture.id, category = category.as_str(), source_len = source.len(), "Lecture saved");

    Ok(AuthoredLecture { category, lecture: entry.lecture, source })
  }

  /// Every stored lecture record; unreadable ones are skipped.
  pub fn entries(&self) -> Vec<LectureEntry> {
    let mut keys: Vec<String> = self.store.keys().into_iter().filter(|k| k.starts_with(LECTURE_DATA_PREFIX)).collect();
    keys.sort();
    keys
      .iter()
      .filter_map(|k| {
        let entry = load_json_opt::<LectureEntry, _>(&*self.store, k);
        if entry.is_none() {
          warn!(target: "authoring", key = %k, "Skipping unreadable lecture record");
        }
        entry
      })
      .collect()
  }

  pub fn source(&self, category: LectureCategory, id: &str) -> Option<String> {
    self.store.get(&source_key(category, id))
  }
}
