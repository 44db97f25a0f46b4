//! General instructions database operations.

use rusqlite::{params, OptionalExtension};

use super::{Database, DbResult};
use crate::models::GeneralInstructions;

impl Database {
    /// Insert or update instructions for a medication.
    pub fn upsert_general_instructions(&self, instructions: &GeneralInstructions) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO general_instructions (
                drug_id, instructions, instruction_references, image_path
            ) VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(drug_id) DO UPDATE SET
                instructions = excluded.instructions,
                instruction_references = excluded.instruction_references,
                image_path = excluded.image_path
            "#,
            params![
                instructions.medication_id,
                instructions.instructions,
                instructions.references,
                instructions.image_path,
            ],
        )?;
        Ok(())
    }

    /// Get instructions for a medication.
    pub fn get_general_instructions(&self, medication_id: i64) -> DbResult<Option<GeneralInstructions>> {
        Ok(self
            .conn
            .query_row(
                r#"
                SELECT drug_id, instructions, instruction_references, image_path
                FROM general_instructions
                WHERE drug_id = ?
                "#,
                [medication_id],
                |row| {
                    Ok(GeneralInstructions {
                        medication_id: row.get(0)?,
                        instructions: row.get(1)?,
                        references: row.get(2)?,
                        image_path: row.get(3)?,
                    })
                },
            )
            .optional()?)
    }
}
