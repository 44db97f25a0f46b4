//! Food search: which medications interact with a food?
//!
//! Two stages, because the backend cannot join datasets in one query:
//! 1. interaction rows whose food contains the term → distinct medication ids
//! 2. catalog rows for those ids
//!
//! Stage 2 never starts before stage 1 completes, and a failure in either stage
//! fails the whole search. Results come back in backend order; use
//! [`sort_by_name`](crate::models::sort_by_name) when a stable order matters.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::debug;

use crate::cache::{CacheKey, RequestCache};
use crate::config::CoreConfig;
use crate::error::CoreResult;
use crate::models::{Medication, Role};
use crate::repository::Repository;

/// Resolves a free-text food term to the medications interacting with it.
pub struct FoodSearchEngine {
    repository: Arc<dyn Repository>,
    results: RequestCache<Vec<Medication>>,
}

impl FoodSearchEngine {
    pub fn new(repository: Arc<dyn Repository>, config: &CoreConfig) -> Self {
        Self {
            repository,
            results: RequestCache::from_config("food-search", config),
        }
    }

    /// Medications with a recorded interaction whose food item contains
    /// `food_term`, case-insensitively. A blank term returns nothing without
    /// querying the repository.
    pub async fn search(&self, role: Role, food_term: &str) -> CoreResult<Vec<Medication>> {
        let term = normalize_term(food_term);
        if term.is_empty() {
            return Ok(Vec::new());
        }

        let key = CacheKey::food_search(role, &term);
        self.results
            .get(key, || self.run_search(role, &term))
            .await
    }

    pub fn refresh(&self) {
        self.results.invalidate_all();
    }

    async fn run_search(&self, role: Role, term: &str) -> CoreResult<Vec<Medication>> {
        let raw_ids = self.repository.medication_ids_for_food(role, term).await?;
        let ids = distinct(raw_ids);
        debug!(%role, term, matches = ids.len(), "food search stage 1");

        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let medications = self.repository.medications_by_ids(role, &ids).await?;
        if medications.len() < ids.len() {
            debug!(
                %role,
                missing = ids.len() - medications.len(),
                "interaction rows reference medications missing from the catalog"
            );
        }
        Ok(medications)
    }
}

/// Trimmed, lower-cased search term.
fn normalize_term(term: &str) -> String {
    term.trim().to_lowercase()
}

/// Ids in first-seen order without repeats.
fn distinct(ids: Vec<i64>) -> Vec<i64> {
    let mut seen = HashSet::new();
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}
