//! Interaction records and per-medication aggregates.

use serde::{Deserialize, Serialize};

use crate::references::{split_links, ReferenceSegment};

/// `food_item` value the datasets use for "no recorded interaction".
pub const SENTINEL_FOOD_ITEM: &str = "NA";

/// `food_item` of the synthesized counselling guidance record.
pub const GUIDANCE_FOOD_ITEM: &str = "No Food Drug Interaction Available";

/// A single food item's interaction with one medication.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InteractionRecord {
    pub medication_id: i64,
    pub food_item: String,
    #[serde(default)]
    pub severity: Option<String>,
    #[serde(default)]
    pub mechanism: Option<String>,
    #[serde(default)]
    pub management: Option<String>,
    /// Patient datasets only
    #[serde(default)]
    pub counselling_tips: Option<String>,
    #[serde(default)]
    pub reference: Option<String>,
    /// True for synthesized guidance, never set on dataset rows
    #[serde(default)]
    pub is_guidance: bool,
}

impl InteractionRecord {
    /// Create a record with only the required fields.
    pub fn new(medication_id: i64, food_item: impl Into<String>) -> Self {
        Self {
            medication_id,
            food_item: food_item.into(),
            severity: None,
            mechanism: None,
            management: None,
            counselling_tips: None,
            reference: None,
            is_guidance: false,
        }
    }

    /// Synthesized record carrying counselling text for patients.
    pub fn guidance(medication_id: i64, counselling_tips: impl Into<String>) -> Self {
        Self {
            counselling_tips: Some(counselling_tips.into()),
            is_guidance: true,
            ..Self::new(medication_id, GUIDANCE_FOOD_ITEM)
        }
    }

    /// Whether this row is the "no recorded interaction" marker.
    pub fn is_sentinel(&self) -> bool {
        self.food_item == SENTINEL_FOOD_ITEM
    }

    /// Non-empty counselling text, if any.
    pub fn counselling(&self) -> Option<&str> {
        self.counselling_tips.as_deref().filter(|t| !t.is_empty())
    }

    /// Reference text split into plain text and links.
    pub fn reference_segments(&self) -> Vec<ReferenceSegment> {
        self.reference.as_deref().map(split_links).unwrap_or_default()
    }
}

/// Interactions found for one medication of the selection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AggregatedResult {
    pub medication_id: i64,
    /// Number of genuine (non-guidance) interactions
    pub interaction_count: usize,
    /// Genuine interactions in dataset order, then at most one guidance record
    pub interactions: Vec<InteractionRecord>,
}

impl AggregatedResult {
    /// Genuine interactions only.
    pub fn genuine(&self) -> impl Iterator<Item = &InteractionRecord> {
        self.interactions.iter().filter(|r| !r.is_guidance)
    }

    /// The guidance record, if one was synthesized.
    pub fn guidance(&self) -> Option<&InteractionRecord> {
        self.interactions.iter().find(|r| r.is_guidance)
    }

    pub fn has_interactions(&self) -> bool {
        self.interaction_count > 0
    }
}
