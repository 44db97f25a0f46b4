//! General usage instructions per medication.

use serde::{Deserialize, Serialize};

use crate::references::{split_links, ReferenceSegment};

/// Directions of use shown alongside a medication.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GeneralInstructions {
    pub medication_id: i64,
    #[serde(default)]
    pub instructions: Option<String>,
    #[serde(default)]
    pub references: Option<String>,
    /// Path or URL of an illustrative image
    #[serde(default)]
    pub image_path: Option<String>,
}

impl GeneralInstructions {
    pub fn new(medication_id: i64) -> Self {
        Self {
            medication_id,
            instructions: None,
            references: None,
            image_path: None,
        }
    }

    pub fn reference_segments(&self) -> Vec<ReferenceSegment> {
        self.references.as_deref().map(split_links).unwrap_or_default()
    }
}
