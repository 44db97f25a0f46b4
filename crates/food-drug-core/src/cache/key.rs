//! Deterministic cache keys.

use std::fmt;

use crate::models::Role;

/// `namespace:role:params`, stable for equal inputs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    /// Raw interaction rows of one medication.
    pub fn interactions(role: Role, medication_id: i64) -> Self {
        Self(format!("interactions:{role}:{medication_id}"))
    }

    /// Resolution of a whole selection. Order and duplicates of `ids` do not
    /// affect the key.
    pub fn selection(role: Role, ids: impl IntoIterator<Item = i64>) -> Self {
        let mut ids: Vec<i64> = ids.into_iter().collect();
        ids.sort_unstable();
        ids.dedup();
        let joined = ids
            .iter()
            .map(i64::to_string)
            .collect::<Vec<_>>()
            .join(",");
        Self(format!("selection:{role}:{joined}"))
    }

    /// One catalog page.
    pub fn catalog_page(role: Role, cursor: i64, page_size: usize) -> Self {
        Self(format!("catalog:{role}:{cursor}+{page_size}"))
    }

    /// Food search for an already normalized term.
    pub fn food_search(role: Role, term: &str) -> Self {
        Self(format!("food-search:{role}:{term}"))
    }

    /// General instructions of one medication.
    pub fn instructions(medication_id: i64) -> Self {
        Self(format!("instructions:{medication_id}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Leading segment, e.g. `selection`.
    pub fn namespace(&self) -> &str {
        self.0.split(':').next().unwrap_or_default()
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
