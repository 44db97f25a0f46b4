//! Interaction resolver.
//!
//! Pipeline: Selection snapshot → per-medication fetch (cached, bounded
//! concurrency) → Aggregation → Resolution
//!
//! A failed medication never aborts the others; it is reported in
//! [`Resolution::failures`] and can be retried alone with
//! [`InteractionResolver::resolve_medication`].

mod aggregate;

pub use aggregate::*;

use std::collections::HashMap;
use std::sync::Arc;

use futures_util::stream::{self, StreamExt};
use tracing::{debug, warn};

use crate::cache::{CacheKey, RequestCache};
use crate::config::CoreConfig;
use crate::error::{CoreError, CoreResult};
use crate::models::{AggregatedResult, InteractionRecord, Medication, Role};
use crate::repository::Repository;
use crate::selection::SelectionSet;

/// Resolution of one selection for one role.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub role: Role,
    /// Revision of the selection snapshot this was computed for
    pub revision: u64,
    pub results: HashMap<i64, AggregatedResult>,
    pub failures: HashMap<i64, CoreError>,
}

/// Outcome for one selected medication.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EntryOutcome<'a> {
    Resolved(&'a AggregatedResult),
    Failed(&'a CoreError),
    /// The medication was not part of the resolved selection
    Missing,
}

/// A selected medication paired with its outcome.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedEntry<'a> {
    pub medication: &'a Medication,
    pub outcome: EntryOutcome<'a>,
}

impl Resolution {
    fn from_outcome(role: Role, revision: u64, outcome: SelectionOutcome) -> Self {
        Self {
            role,
            revision,
            results: outcome.results,
            failures: outcome.failures,
        }
    }

    /// True when every medication resolved.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn get(&self, medication_id: i64) -> Option<&AggregatedResult> {
        self.results.get(&medication_id)
    }

    /// Sum of genuine interactions across the selection.
    pub fn total_interactions(&self) -> usize {
        self.results.values().map(|r| r.interaction_count).sum()
    }

    /// Entries in the display order of `selection`.
    pub fn ordered_for<'a>(&'a self, selection: &'a SelectionSet) -> Vec<ResolvedEntry<'a>> {
        selection
            .medications
            .iter()
            .map(|medication| {
                let outcome = match (
                    self.results.get(&medication.id),
                    self.failures.get(&medication.id),
                ) {
                    (Some(result), _) => EntryOutcome::Resolved(result),
                    (None, Some(error)) => EntryOutcome::Failed(error),
                    (None, None) => EntryOutcome::Missing,
                };
                ResolvedEntry { medication, outcome }
            })
            .collect()
    }
}

/// Cached part of a resolution, independent of the selection revision.
#[derive(Debug, Clone, Default)]
struct SelectionOutcome {
    results: HashMap<i64, AggregatedResult>,
    failures: HashMap<i64, CoreError>,
}

impl SelectionOutcome {
    fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    fn all_failed(ids: &[i64], error: CoreError) -> Self {
        Self {
            results: HashMap::new(),
            failures: ids.iter().map(|id| (*id, error.clone())).collect(),
        }
    }
}

/// Resolves food interactions for a selection of medications.
pub struct InteractionResolver {
    repository: Arc<dyn Repository>,
    records: RequestCache<Vec<InteractionRecord>>,
    selections: RequestCache<SelectionOutcome>,
    max_in_flight: usize,
}

impl InteractionResolver {
    /// Create a new resolver.
    pub fn new(repository: Arc<dyn Repository>, config: &CoreConfig) -> Self {
        Self {
            repository,
            records: RequestCache::from_config("interactions", config),
            selections: RequestCache::from_config("selections", config),
            max_in_flight: config.max_concurrent_fetches().max(1),
        }
    }

    /// Resolve every medication of `selection` against the role's dataset.
    ///
    /// An empty selection resolves to an empty mapping without touching the
    /// repository.
    pub async fn resolve(&self, selection: &SelectionSet, role: Role) -> Resolution {
        if selection.is_empty() {
            return Resolution::from_outcome(role, selection.revision, SelectionOutcome::default());
        }

        let ids = selection.ids();
        debug!(%role, revision = selection.revision, count = ids.len(), "resolving selection");

        let key = CacheKey::selection(role, ids.iter().copied());
        let outcome = self
            .selections
            .get_retaining(key, || self.fetch_all(role, &ids), SelectionOutcome::is_complete)
            .await
            .unwrap_or_else(|error| SelectionOutcome::all_failed(&ids, error));

        Resolution::from_outcome(role, selection.revision, outcome)
    }

    /// Resolve a single medication, e.g. to retry one that failed.
    pub async fn resolve_medication(&self, medication_id: i64, role: Role) -> CoreResult<AggregatedResult> {
        let raw = self.fetch_records(role, medication_id).await?;
        Ok(aggregate(medication_id, role, &raw))
    }

    /// Drop every cached whole-selection resolution. Called whenever the
    /// selection changes.
    pub fn forget_selections(&self) {
        self.selections.invalidate_all();
    }

    /// Drop every cached result, raw records included. Needed after the
    /// datasets change underneath the resolver.
    pub fn refresh(&self) {
        self.records.invalidate_all();
        self.selections.invalidate_all();
    }

    async fn fetch_all(&self, role: Role, ids: &[i64]) -> CoreResult<SelectionOutcome> {
        let fetched: Vec<(i64, CoreResult<Vec<InteractionRecord>>)> = stream::iter(ids.iter().copied())
            .map(|id| async move { (id, self.fetch_records(role, id).await) })
            .buffer_unordered(self.max_in_flight)
            .collect()
            .await;

        let mut outcome = SelectionOutcome::default();
        for (id, result) in fetched {
            match result {
                Ok(raw) => {
                    outcome.results.insert(id, aggregate(id, role, &raw));
                }
                Err(error) => {
                    warn!(%role, medication_id = id, %error, "failed to fetch interactions");
                    outcome.failures.insert(id, error);
                }
            }
        }
        Ok(outcome)
    }

    async fn fetch_records(&self, role: Role, medication_id: i64) -> CoreResult<Vec<InteractionRecord>> {
        self.records
            .get(CacheKey::interactions(role, medication_id), || {
                self.repository
                    .interactions_for_medication(role, medication_id)
            })
            .await
    }
}
