//! In-memory repository, loadable from a JSON dataset bundle.

use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::Repository;
use crate::error::{CoreError, CoreResult};
use crate::models::{GeneralInstructions, InteractionRecord, Medication, MedicationPage, Role};

/// Catalog and interaction rows for one role.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoleDataset {
    #[serde(default)]
    pub medications: Vec<Medication>,
    #[serde(default)]
    pub interactions: Vec<InteractionRecord>,
}

/// Offline dataset bundle.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatasetBundle {
    #[serde(default)]
    pub clinician: RoleDataset,
    #[serde(default)]
    pub patient: RoleDataset,
    #[serde(default)]
    pub instructions: Vec<GeneralInstructions>,
}

#[derive(Default)]
struct RoleTables {
    medications: BTreeMap<i64, Medication>,
    interactions: Vec<InteractionRecord>,
}

#[derive(Default)]
struct MemoryState {
    clinician: RoleTables,
    patient: RoleTables,
    instructions: HashMap<i64, GeneralInstructions>,
}

impl MemoryState {
    fn tables(&self, role: Role) -> &RoleTables {
        match role {
            Role::Clinician => &self.clinician,
            Role::Patient => &self.patient,
        }
    }

    fn tables_mut(&mut self, role: Role) -> &mut RoleTables {
        match role {
            Role::Clinician => &mut self.clinician,
            Role::Patient => &mut self.patient,
        }
    }
}

/// Repository over datasets held in memory.
#[derive(Default)]
pub struct InMemoryRepository {
    state: RwLock<MemoryState>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a repository from a bundle.
    pub fn from_bundle(bundle: DatasetBundle) -> CoreResult<Self> {
        let repo = Self::new();
        for (role, dataset) in [
            (Role::Clinician, bundle.clinician),
            (Role::Patient, bundle.patient),
        ] {
            for medication in dataset.medications {
                repo.insert_medication(role, medication)?;
            }
            for record in dataset.interactions {
                repo.insert_interaction(role, record)?;
            }
        }
        for instructions in bundle.instructions {
            repo.insert_instructions(instructions)?;
        }
        Ok(repo)
    }

    /// Parse a JSON bundle.
    pub fn from_json(json: &str) -> CoreResult<Self> {
        let bundle: DatasetBundle = serde_json::from_str(json)
            .map_err(|e| CoreError::InvalidInput(format!("dataset bundle: {e}")))?;
        Self::from_bundle(bundle)
    }

    /// Insert or replace a catalog medication.
    pub fn insert_medication(&self, role: Role, medication: Medication) -> CoreResult<()> {
        self.write()?
            .tables_mut(role)
            .medications
            .insert(medication.id, medication);
        Ok(())
    }

    /// Append an interaction row.
    pub fn insert_interaction(&self, role: Role, record: InteractionRecord) -> CoreResult<()> {
        self.write()?.tables_mut(role).interactions.push(record);
        Ok(())
    }

    /// Insert or replace general instructions.
    pub fn insert_instructions(&self, instructions: GeneralInstructions) -> CoreResult<()> {
        self.write()?
            .instructions
            .insert(instructions.medication_id, instructions);
        Ok(())
    }

    fn read(&self) -> CoreResult<RwLockReadGuard<'_, MemoryState>> {
        self.state
            .read()
            .map_err(|e| CoreError::Storage(format!("Lock poisoned: {e}")))
    }

    fn write(&self) -> CoreResult<RwLockWriteGuard<'_, MemoryState>> {
        self.state
            .write()
            .map_err(|e| CoreError::Storage(format!("Lock poisoned: {e}")))
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn medication_page(
        &self,
        role: Role,
        offset: u64,
        limit: usize,
    ) -> CoreResult<MedicationPage> {
        let state = self.read()?;
        let mut ordered: Vec<&Medication> = state.tables(role).medications.values().collect();
        ordered.sort_by_cached_key(|m| (m.sort_key(), m.id));

        let offset = usize::try_from(offset).unwrap_or(usize::MAX);
        let items: Vec<Medication> = ordered
            .into_iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect();
        Ok(MedicationPage::new(items))
    }

    async fn interactions_for_medication(
        &self,
        role: Role,
        medication_id: i64,
    ) -> CoreResult<Vec<InteractionRecord>> {
        let state = self.read()?;
        Ok(state
            .tables(role)
            .interactions
            .iter()
            .filter(|r| r.medication_id == medication_id)
            .cloned()
            .collect())
    }

    async fn medication_ids_for_food(&self, role: Role, term: &str) -> CoreResult<Vec<i64>> {
        let needle = term.to_lowercase();
        let state = self.read()?;
        Ok(state
            .tables(role)
            .interactions
            .iter()
            .filter(|r| r.food_item.to_lowercase().contains(&needle))
            .map(|r| r.medication_id)
            .collect())
    }

    async fn medications_by_ids(&self, role: Role, ids: &[i64]) -> CoreResult<Vec<Medication>> {
        let state = self.read()?;
        let medications = &state.tables(role).medications;
        let mut found: Vec<Medication> = ids
            .iter()
            .filter_map(|id| medications.get(id).cloned())
            .collect();
        found.sort_by_key(|m| m.id);
        found.dedup_by_key(|m| m.id);
        Ok(found)
    }

    async fn general_instructions(
        &self,
        medication_id: i64,
    ) -> CoreResult<Option<GeneralInstructions>> {
        Ok(self.read()?.instructions.get(&medication_id).cloned())
    }
}
