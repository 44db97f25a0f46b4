//! Medication catalog entities.

use serde::{Deserialize, Serialize};

/// A catalog medication. Identity is `id`; `name` is kept for display.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Medication {
    pub id: i64,
    pub name: String,
}

impl Medication {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    /// Case-insensitive sort key for catalog ordering.
    pub fn sort_key(&self) -> String {
        self.name.to_lowercase()
    }
}

/// Stable, case-insensitive ordering by name (ties keep their input order).
pub fn sort_by_name(medications: &mut [Medication]) {
    medications.sort_by_cached_key(Medication::sort_key);
}
