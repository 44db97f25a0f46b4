//! SQLite schema definition.

/// Complete database schema. Table names mirror `Role::catalog_table` and
/// `Role::interaction_table`.
pub const SCHEMA: &str = r#"
-- ============================================================================
-- Medication Catalogs
-- ============================================================================

CREATE TABLE IF NOT EXISTS drugs (
    drug_id INTEGER PRIMARY KEY,
    drug_name TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS patient_drugs (
    drug_id INTEGER PRIMARY KEY,
    drug_name TEXT NOT NULL
);

-- ============================================================================
-- Food-Drug Interactions
-- ============================================================================

-- food = 'NA' marks a medication with no recorded interaction
CREATE TABLE IF NOT EXISTS interactions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    drug_id INTEGER NOT NULL,
    food TEXT NOT NULL,
    severity TEXT,
    mechanism_of_action TEXT,
    management TEXT,
    counselling_tips TEXT,
    reference TEXT
);

CREATE TABLE IF NOT EXISTS patient_interactions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    drug_id INTEGER NOT NULL,
    food TEXT NOT NULL,
    severity TEXT,
    mechanism_of_action TEXT,
    management TEXT,
    counselling_tips TEXT,
    reference TEXT
);

CREATE INDEX IF NOT EXISTS idx_interactions_drug ON interactions(drug_id);
CREATE INDEX IF NOT EXISTS idx_patient_interactions_drug ON patient_interactions(drug_id);

-- ============================================================================
-- General Instructions
-- ============================================================================

CREATE TABLE IF NOT EXISTS general_instructions (
    drug_id INTEGER PRIMARY KEY,
    instructions TEXT,
    instruction_references TEXT,
    image_path TEXT
);
"#;
