//! Selection store: the user's working set of medications.
//!
//! Every effective mutation bumps a revision number. Snapshots carry the
//! revision they were taken at, so a resolution computed for an older
//! selection can be recognised and discarded.

use std::sync::{Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::Medication;

/// Snapshot of the selection, in insertion order, unique by id.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SelectionSet {
    pub revision: u64,
    pub medications: Vec<Medication>,
}

impl SelectionSet {
    pub fn ids(&self) -> Vec<i64> {
        self.medications.iter().map(|m| m.id).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.medications.is_empty()
    }

    pub fn len(&self) -> usize {
        self.medications.len()
    }
}

#[derive(Default)]
struct SelectionState {
    medications: Vec<Medication>,
    revision: u64,
}

/// Thread-safe holder of the current selection.
#[derive(Default)]
pub struct SelectionStore {
    state: Mutex<SelectionState>,
}

impl SelectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a medication. Returns false (and changes nothing) if its id is
    /// already selected.
    pub fn add(&self, medication: Medication) -> bool {
        let mut state = self.lock();
        if state.medications.iter().any(|m| m.id == medication.id) {
            return false;
        }
        debug!(medication_id = medication.id, "selection add");
        state.medications.push(medication);
        state.revision += 1;
        true
    }

    /// Remove a medication by id. Returns false if it was not selected.
    pub fn remove(&self, id: i64) -> bool {
        let mut state = self.lock();
        let before = state.medications.len();
        state.medications.retain(|m| m.id != id);
        if state.medications.len() == before {
            return false;
        }
        debug!(medication_id = id, "selection remove");
        state.revision += 1;
        true
    }

    /// Empty the selection. Returns false if it was already empty.
    pub fn clear(&self) -> bool {
        let mut state = self.lock();
        if state.medications.is_empty() {
            return false;
        }
        debug!(count = state.medications.len(), "selection clear");
        state.medications.clear();
        state.revision += 1;
        true
    }

    /// Current selection snapshot.
    pub fn list(&self) -> SelectionSet {
        let state = self.lock();
        SelectionSet {
            revision: state.revision,
            medications: state.medications.clone(),
        }
    }

    pub fn contains(&self, id: i64) -> bool {
        self.lock().medications.iter().any(|m| m.id == id)
    }

    pub fn revision(&self) -> u64 {
        self.lock().revision
    }

    /// Whether a snapshot taken at `revision` still describes the selection.
    pub fn is_current(&self, revision: u64) -> bool {
        self.revision() == revision
    }

    // The state is consistent after every statement, so a poisoned lock is
    // still usable.
    fn lock(&self) -> MutexGuard<'_, SelectionState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}
