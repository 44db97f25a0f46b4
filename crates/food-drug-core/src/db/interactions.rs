//! Interaction database operations.

use rusqlite::{params, Row};

use super::{Database, DbError, DbResult};
use crate::models::{InteractionRecord, Role};

impl Database {
    /// Store an interaction row and return its row id.
    pub fn insert_interaction(&self, role: Role, record: &InteractionRecord) -> DbResult<i64> {
        if record.is_guidance {
            return Err(DbError::Constraint(
                "guidance records are synthesized and cannot be stored".into(),
            ));
        }

        let sql = format!(
            r#"
            INSERT INTO {} (
                drug_id, food, severity, mechanism_of_action,
                management, counselling_tips, reference
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            role.interaction_table()
        );
        self.conn.execute(
            &sql,
            params![
                record.medication_id,
                record.food_item,
                record.severity,
                record.mechanism,
                record.management,
                record.counselling_tips,
                record.reference,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// All rows for a medication in insertion order, sentinel rows included.
    pub fn interactions_for_medication(
        &self,
        role: Role,
        medication_id: i64,
    ) -> DbResult<Vec<InteractionRecord>> {
        let sql = format!(
            r#"
            SELECT drug_id, food, severity, mechanism_of_action,
                   management, counselling_tips, reference
            FROM {}
            WHERE drug_id = ?
            ORDER BY id
            "#,
            role.interaction_table()
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([medication_id], interaction_from_row)?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }

    /// Medication ids of rows whose food contains `term`, ignoring case
    /// (Unicode). The term is matched literally, `%` and `_` included.
    pub fn medication_ids_for_food(&self, role: Role, term: &str) -> DbResult<Vec<i64>> {
        let needle = term.to_lowercase();
        let sql = format!(
            r#"
            SELECT drug_id
            FROM {}
            WHERE instr(unicode_lower(food), ?1) > 0
            ORDER BY id
            "#,
            role.interaction_table()
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([needle], |row| row.get::<_, i64>(0))?;

        let mut ids = Vec::new();
        for row in rows {
            ids.push(row?);
        }
        Ok(ids)
    }
}

fn interaction_from_row(row: &Row<'_>) -> rusqlite::Result<InteractionRecord> {
    Ok(InteractionRecord {
        medication_id: row.get(0)?,
        food_item: row.get(1)?,
        severity: row.get(2)?,
        mechanism: row.get(3)?,
        management: row.get(4)?,
        counselling_tips: row.get(5)?,
        reference: row.get(6)?,
        is_guidance: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_db() -> Database {
        let db = Database::open_in_memory().unwrap();

        let mut grapefruit = InteractionRecord::new(1, "Grapefruit juice");
        grapefruit.severity = Some("High".into());
        db.insert_interaction(Role::Clinician, &grapefruit).unwrap();
        db.insert_interaction(Role::Clinician, &InteractionRecord::new(1, "NA"))
            .unwrap();
        db.insert_interaction(Role::Clinician, &InteractionRecord::new(2, "Green tea"))
            .unwrap();
        db.insert_interaction(Role::Clinician, &InteractionRecord::new(3, "100% cranberry"))
            .unwrap();

        db
    }

    #[test]
    fn test_rows_for_medication_keep_sentinels() {
        let db = setup_db();

        let rows = db.interactions_for_medication(Role::Clinician, 1).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].food_item, "Grapefruit juice");
        assert_eq!(rows[0].severity.as_deref(), Some("High"));
        assert!(rows[1].is_sentinel());

        assert!(db
            .interactions_for_medication(Role::Patient, 1)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_food_search_case_insensitive() {
        let db = setup_db();
        assert_eq!(db.medication_ids_for_food(Role::Clinician, "GRAPE").unwrap(), vec![1]);
        assert_eq!(db.medication_ids_for_food(Role::Clinician, "tea").unwrap(), vec![2]);
    }

    #[test]
    fn test_food_search_folds_non_ascii() {
        let db = setup_db();
        db.insert_interaction(Role::Clinician, &InteractionRecord::new(4, "Äpfel"))
            .unwrap();
        assert_eq!(db.medication_ids_for_food(Role::Clinician, "ÄPFEL").unwrap(), vec![4]);
        assert_eq!(db.medication_ids_for_food(Role::Clinician, "äpf").unwrap(), vec![4]);
    }

    #[test]
    fn test_food_search_matches_wildcards_literally() {
        let db = setup_db();
        assert_eq!(db.medication_ids_for_food(Role::Clinician, "100%").unwrap(), vec![3]);
        assert!(db
            .medication_ids_for_food(Role::Clinician, "_rape")
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_guidance_rejected() {
        let db = setup_db();
        let result = db.insert_interaction(Role::Patient, &InteractionRecord::guidance(1, "tip"));
        assert!(matches!(result, Err(DbError::Constraint(_))));
    }
}
