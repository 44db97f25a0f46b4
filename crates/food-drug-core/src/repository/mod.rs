//! Repository collaborator: the datasets the core reads from.
//!
//! Transport and authentication belong to whoever implements the trait; the
//! core only sees decoded entities. Components receive an
//! `Arc<dyn Repository>` explicitly rather than reaching for a global client.

mod memory;

pub use memory::*;

use async_trait::async_trait;

use crate::error::CoreResult;
use crate::models::{GeneralInstructions, InteractionRecord, Medication, MedicationPage, Role};

/// Point lookups and filtered queries over the medication datasets.
#[async_trait]
pub trait Repository: Send + Sync {
    /// Medications of the role's catalog ordered by case-insensitive name,
    /// `limit` rows starting at `offset`.
    async fn medication_page(
        &self,
        role: Role,
        offset: u64,
        limit: usize,
    ) -> CoreResult<MedicationPage>;

    /// Raw interaction rows for one medication, sentinel rows included.
    async fn interactions_for_medication(
        &self,
        role: Role,
        medication_id: i64,
    ) -> CoreResult<Vec<InteractionRecord>>;

    /// Medication ids of every interaction row whose food item contains
    /// `term`, case-insensitively. May contain duplicates.
    async fn medication_ids_for_food(&self, role: Role, term: &str) -> CoreResult<Vec<i64>>;

    /// Catalog rows for the given ids, in backend order. Unknown ids are
    /// simply absent.
    async fn medications_by_ids(&self, role: Role, ids: &[i64]) -> CoreResult<Vec<Medication>>;

    /// General instructions for a medication, if any exist.
    async fn general_instructions(
        &self,
        medication_id: i64,
    ) -> CoreResult<Option<GeneralInstructions>>;
}
