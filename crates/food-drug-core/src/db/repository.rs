//! `Repository` implementation backed by the SQLite database.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::{Database, DbResult};
use crate::error::{CoreError, CoreResult};
use crate::models::{GeneralInstructions, InteractionRecord, Medication, MedicationPage, Role};
use crate::repository::Repository;

/// Runs each query on the blocking pool against a shared connection.
#[derive(Clone)]
pub struct SqliteRepository {
    db: Arc<Mutex<Database>>,
}

impl SqliteRepository {
    pub fn new(db: Arc<Mutex<Database>>) -> Self {
        Self { db }
    }

    async fn run<T, F>(&self, query: F) -> CoreResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Database) -> DbResult<T> + Send + 'static,
    {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || {
            let guard = db
                .lock()
                .map_err(|e| CoreError::Storage(format!("Lock poisoned: {e}")))?;
            query(&guard).map_err(CoreError::from)
        })
        .await
        .map_err(|e| CoreError::Storage(format!("query task failed: {e}")))?
    }
}

#[async_trait]
impl Repository for SqliteRepository {
    async fn medication_page(
        &self,
        role: Role,
        offset: u64,
        limit: usize,
    ) -> CoreResult<MedicationPage> {
        let items = self
            .run(move |db| db.medication_page(role, offset, limit))
            .await?;
        Ok(MedicationPage::new(items))
    }

    async fn interactions_for_medication(
        &self,
        role: Role,
        medication_id: i64,
    ) -> CoreResult<Vec<InteractionRecord>> {
        self.run(move |db| db.interactions_for_medication(role, medication_id))
            .await
    }

    async fn medication_ids_for_food(&self, role: Role, term: &str) -> CoreResult<Vec<i64>> {
        let term = term.to_string();
        self.run(move |db| db.medication_ids_for_food(role, &term))
            .await
    }

    async fn medications_by_ids(&self, role: Role, ids: &[i64]) -> CoreResult<Vec<Medication>> {
        let ids = ids.to_vec();
        self.run(move |db| db.medications_by_ids(role, &ids)).await
    }

    async fn general_instructions(
        &self,
        medication_id: i64,
    ) -> CoreResult<Option<GeneralInstructions>> {
        self.run(move |db| db.get_general_instructions(medication_id))
            .await
    }
}
