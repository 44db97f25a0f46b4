//! Cached lookup of general instructions per medication.

use std::sync::Arc;

use crate::cache::{CacheKey, RequestCache};
use crate::config::CoreConfig;
use crate::error::{CoreError, CoreResult};
use crate::models::GeneralInstructions;
use crate::repository::Repository;

pub struct InstructionsLookup {
    repository: Arc<dyn Repository>,
    entries: RequestCache<GeneralInstructions>,
}

impl InstructionsLookup {
    pub fn new(repository: Arc<dyn Repository>, config: &CoreConfig) -> Self {
        Self {
            repository,
            entries: RequestCache::from_config("instructions", config),
        }
    }

    /// Instructions for `medication_id`; `NotFound` when none are recorded.
    pub async fn instructions_for(&self, medication_id: i64) -> CoreResult<GeneralInstructions> {
        self.entries
            .get(CacheKey::instructions(medication_id), || async move {
                self.repository
                    .general_instructions(medication_id)
                    .await?
                    .ok_or_else(|| {
                        CoreError::NotFound(format!("instructions for medication {medication_id}"))
                    })
            })
            .await
    }

    pub fn refresh(&self) {
        self.entries.invalidate_all();
    }
}
