//! Caller roles and the datasets they select.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Who is asking. Each role reads its own catalog and interaction tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Healthcare professional
    Clinician,
    /// Patient-facing view, includes counselling guidance
    Patient,
}

impl Role {
    pub const ALL: [Role; 2] = [Role::Clinician, Role::Patient];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Clinician => "clinician",
            Role::Patient => "patient",
        }
    }

    /// Medication catalog table for this role.
    pub fn catalog_table(&self) -> &'static str {
        match self {
            Role::Clinician => "drugs",
            Role::Patient => "patient_drugs",
        }
    }

    /// Interaction table for this role.
    pub fn interaction_table(&self) -> &'static str {
        match self {
            Role::Clinician => "interactions",
            Role::Patient => "patient_interactions",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "clinician" | "hcp" => Ok(Role::Clinician),
            "patient" => Ok(Role::Patient),
            other => Err(CoreError::InvalidInput(format!("unknown role: {other:?}"))),
        }
    }
}
