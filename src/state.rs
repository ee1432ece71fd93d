//! Application state: lecture catalog, key/value store, progress tracker, authoring.
//!
//! This module owns:
//!   - the catalog (built-in seeds + TOML bank + authored lectures)
//!   - the process-local key/value store every learner write goes through
//!   - the evaluation prompt template (from TOML or defaults)

use std::{collections::HashMap, sync::Arc};
use tokio::sync::RwLock;
use tracing::{info, instrument};

use crate::authoring::Authoring;
use crate::config::{load_config_from_env, AppConfig, EvaluationPrompts};
use crate::content::Catalog;
use crate::domain::{Lecture, LectureCategory};
use crate::error::{LecternError, Result};
use crate::progress::ProgressTracker;
use crate::seeds::seed_lectures;
use crate::store::{KeyValueStore, MemoryStore};

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<RwLock<Catalog>>,
    pub tracker: ProgressTracker<dyn KeyValueStore>,
    pub authoring: Authoring<dyn KeyValueStore>,
    pub evaluation: EvaluationPrompts,
}

impl AppState {
    /// Build state from env: load config, fresh in-memory store.
    #[instrument(level = "info", skip_all)]
    pub fn new() -> Self {
        let cfg = load_config_from_env().unwrap_or_default();
        Self::with_store(Arc::new(MemoryStore::new()), cfg)
    }

    /// Seeds first, then the config bank, then authored lectures already in
    /// the store; later sources replace earlier ones with the same id.
    pub fn with_store(store: Arc<dyn KeyValueStore>, cfg: AppConfig) -> Self {
        let authoring = Authoring::new(store.clone());
        let mut catalog = Catalog::new(seed_lectures());

        let mut count_by_category: HashMap<&'static str, usize> = HashMap::new();
        for entry in cfg.lectures {
            *count_by_category.entry(entry.category.as_str()).or_default() += 1;
            catalog.insert(entry.lecture);
        }
        for entry in authoring.entries() {
            *count_by_category.entry(entry.category.as_str()).or_default() += 1;
            catalog.insert(entry.lecture);
        }
        for category in LectureCategory::ALL {
            if let Some(n) = count_by_category.get(category.as_str()) {
                info!(target: "lectern", category = category.as_str(), lectures = n, "Loaded lectures");
            }
        }
        info!(target: "lectern", total = catalog.len(), "Catalog ready");

        Self {
            catalog: Arc::new(RwLock::new(catalog)),
            tracker: ProgressTracker::new(store),
            authoring,
            evaluation: cfg.evaluation,
        }
    }

    /// Owned copy of a lecture, or `UnknownLecture`.
    pub async fn lecture(&self, id: &str) -> Result<Lecture> {
        let catalog = self.catalog.read().await;
        catalog
            .get(id)
            .cloned()
            .ok_or_else(|| LecternError::UnknownLecture(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LectureEntry;
    use crate::seeds::INTRO_LECTURE_ID;

    #[tokio::test]
    async fn catalog_merges_seeds_bank_and_authored() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let authored = Lecture {
            id: "aquinas".into(),
            title: "Aquinas".into(),
            video_url: "https://example.org/a".into(),
            ..Default::default()
        };
        Authoring::new(store.clone())
            .save(authored, LectureCategory::MedievalRenaissance)
            .unwrap();

        let cfg = AppConfig {
            lectures: vec![LectureEntry {
                category: LectureCategory::AthensToRome,
                lecture: Lecture { id: "plato".into(), title: "Plato".into(), ..Default::default() },
            }],
            ..Default::default()
        };
        let state = AppState::with_store(store, cfg);

        assert!(state.lecture(INTRO_LECTURE_ID).await.is_ok());
        assert_eq!(state.lecture("plato").await.unwrap().title, "Plato");
        assert_eq!(state.lecture("aquinas").await.unwrap().title, "Aquinas");
        assert!(matches!(state.lecture("nope").await, Err(LecternError::UnknownLecture(_))));
    }
}
