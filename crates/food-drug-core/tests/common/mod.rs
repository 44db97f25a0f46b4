//! Shared fixtures for integration tests.
//!
//! `ScriptedRepository` wraps an in-memory dataset and records every call, so
//! tests can assert how often the backend was hit, inject failures per
//! medication and slow responses down.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use food_drug_core::error::{CoreError, CoreResult};
use food_drug_core::models::{
    GeneralInstructions, InteractionRecord, Medication, MedicationPage, Role,
};
use food_drug_core::repository::{InMemoryRepository, Repository};

#[derive(Default)]
pub struct CallCounts {
    pub pages: AtomicUsize,
    pub interactions: AtomicUsize,
    pub food_ids: AtomicUsize,
    pub by_ids: AtomicUsize,
    pub instructions: AtomicUsize,
}

impl CallCounts {
    pub fn total(&self) -> usize {
        self.pages.load(Ordering::SeqCst)
            + self.interactions.load(Ordering::SeqCst)
            + self.food_ids.load(Ordering::SeqCst)
            + self.by_ids.load(Ordering::SeqCst)
            + self.instructions.load(Ordering::SeqCst)
    }
}

pub struct ScriptedRepository {
    inner: InMemoryRepository,
    pub calls: CallCounts,
    failing: Mutex<HashSet<i64>>,
    fail_food_search: Mutex<bool>,
    fail_by_ids: Mutex<bool>,
    delay: Mutex<Option<Duration>>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl ScriptedRepository {
    pub fn new(inner: InMemoryRepository) -> Self {
        Self {
            inner,
            calls: CallCounts::default(),
            failing: Mutex::new(HashSet::new()),
            fail_food_search: Mutex::new(false),
            fail_by_ids: Mutex::new(false),
            delay: Mutex::new(None),
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn inner(&self) -> &InMemoryRepository {
        &self.inner
    }

    /// Interaction fetches for `medication_id` fail until `recover` is called.
    pub fn fail_medication(&self, medication_id: i64) {
        self.failing.lock().unwrap().insert(medication_id);
    }

    pub fn recover(&self, medication_id: i64) {
        self.failing.lock().unwrap().remove(&medication_id);
    }

    pub fn fail_food_search(&self, fail: bool) {
        *self.fail_food_search.lock().unwrap() = fail;
    }

    /// Catalog lookups by id fail while set.
    pub fn fail_by_ids(&self, fail: bool) {
        *self.fail_by_ids.lock().unwrap() = fail;
    }

    /// Every call sleeps for `delay` before answering.
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    pub fn interaction_calls(&self) -> usize {
        self.calls.interactions.load(Ordering::SeqCst)
    }

    /// Highest number of interaction fetches running at the same time.
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    async fn pause(&self) {
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl Repository for ScriptedRepository {
    async fn medication_page(
        &self,
        role: Role,
        offset: u64,
        limit: usize,
    ) -> CoreResult<MedicationPage> {
        self.calls.pages.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        self.inner.medication_page(role, offset, limit).await
    }

    async fn interactions_for_medication(
        &self,
        role: Role,
        medication_id: i64,
    ) -> CoreResult<Vec<InteractionRecord>> {
        self.calls.interactions.fetch_add(1, Ordering::SeqCst);
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(running, Ordering::SeqCst);
        self.pause().await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        let failing = self.failing.lock().unwrap().contains(&medication_id);
        if failing {
            return Err(CoreError::NetworkFailure(format!(
                "connection reset fetching {medication_id}"
            )));
        }
        self.inner.interactions_for_medication(role, medication_id).await
    }

    async fn medication_ids_for_food(&self, role: Role, term: &str) -> CoreResult<Vec<i64>> {
        self.calls.food_ids.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        let failing = *self.fail_food_search.lock().unwrap();
        if failing {
            return Err(CoreError::NetworkFailure("food search unavailable".into()));
        }
        self.inner.medication_ids_for_food(role, term).await
    }

    async fn medications_by_ids(&self, role: Role, ids: &[i64]) -> CoreResult<Vec<Medication>> {
        self.calls.by_ids.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        let failing = *self.fail_by_ids.lock().unwrap();
        if failing {
            return Err(CoreError::NetworkFailure("catalog lookup timed out".into()));
        }
        self.inner.medications_by_ids(role, ids).await
    }

    async fn general_instructions(
        &self,
        medication_id: i64,
    ) -> CoreResult<Option<GeneralInstructions>> {
        self.calls.instructions.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        self.inner.general_instructions(medication_id).await
    }
}

pub fn interaction(medication_id: i64, food: &str, severity: &str) -> InteractionRecord {
    let mut record = InteractionRecord::new(medication_id, food);
    record.severity = Some(severity.to_string());
    record
}

/// Clinician and patient datasets used across tests:
/// - 1 Warfarin: Grapefruit (High), Spinach (Moderate)
/// - 2 Metformin: only the NA sentinel
/// - 3 Alendronate: patient row carrying counselling tips
pub fn sample_repository() -> InMemoryRepository {
    let repo = InMemoryRepository::new();
    for role in Role::ALL {
        repo.insert_medication(role, Medication::new(1, "Warfarin")).unwrap();
        repo.insert_medication(role, Medication::new(2, "Metformin")).unwrap();
        repo.insert_medication(role, Medication::new(3, "Alendronate")).unwrap();
        repo.insert_interaction(role, interaction(1, "Grapefruit", "High")).unwrap();
        repo.insert_interaction(role, interaction(1, "Spinach", "Moderate")).unwrap();
        repo.insert_interaction(role, InteractionRecord::new(2, "NA")).unwrap();
    }

    let mut tips = InteractionRecord::new(3, "NA");
    tips.counselling_tips = Some("Take with a full glass of water".into());
    repo.insert_interaction(Role::Patient, tips).unwrap();
    repo.insert_interaction(Role::Clinician, InteractionRecord::new(3, "NA")).unwrap();

    repo
}
