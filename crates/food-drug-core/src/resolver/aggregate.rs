//! Turning raw interaction rows into a per-medication aggregate.
//!
//! 1. Sentinel rows (`food_item == "NA"`) are dropped.
//! 2. For patients, if the first raw row carries counselling tips, one guidance
//!    record is appended. This happens even when genuine interactions exist,
//!    so patients see guidance both alongside interactions and on its own.
//! 3. `interaction_count` counts genuine records only.

use crate::models::{AggregatedResult, InteractionRecord, Role};

/// Aggregate the raw rows fetched for `medication_id`.
pub fn aggregate(medication_id: i64, role: Role, raw: &[InteractionRecord]) -> AggregatedResult {
    let mut interactions: Vec<InteractionRecord> = raw
        .iter()
        .filter(|r| !r.is_sentinel() && !r.is_guidance)
        .cloned()
        .collect();
    let interaction_count = interactions.len();

    if role == Role::Patient {
        if let Some(tips) = raw.first().and_then(InteractionRecord::counselling) {
            interactions.push(InteractionRecord::guidance(medication_id, tips));
        }
    }

    AggregatedResult {
        medication_id,
        interaction_count,
        interactions,
    }
}
