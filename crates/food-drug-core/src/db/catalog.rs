//! Catalog database operations.

use rusqlite::{params, params_from_iter, Row};

use super::{Database, DbError, DbResult};
use crate::models::{Medication, Role};

impl Database {
    /// Insert or update a catalog medication.
    pub fn upsert_medication(&self, role: Role, medication: &Medication) -> DbResult<()> {
        let sql = format!(
            r#"
            INSERT INTO {} (drug_id, drug_name) VALUES (?1, ?2)
            ON CONFLICT(drug_id) DO UPDATE SET drug_name = excluded.drug_name
            "#,
            role.catalog_table()
        );
        self.conn
            .execute(&sql, params![medication.id, medication.name])?;
        Ok(())
    }

    /// One page of the catalog, ordered by Unicode lower-cased name then id.
    pub fn medication_page(&self, role: Role, offset: u64, limit: usize) -> DbResult<Vec<Medication>> {
        let offset = i64::try_from(offset)
            .map_err(|_| DbError::Constraint(format!("offset out of range: {offset}")))?;
        let limit = i64::try_from(limit)
            .map_err(|_| DbError::Constraint(format!("limit out of range: {limit}")))?;

        let sql = format!(
            r#"
            SELECT drug_id, drug_name
            FROM {}
            ORDER BY drug_name COLLATE UNICODE_NOCASE, drug_id
            LIMIT ?1 OFFSET ?2
            "#,
            role.catalog_table()
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![limit, offset], medication_from_row)?;

        let mut items = Vec::new();
        for row in rows {
            items.push(row?);
        }
        Ok(items)
    }

    /// Catalog rows for the given ids, ordered by id. Unknown ids are skipped.
    pub fn medications_by_ids(&self, role: Role, ids: &[i64]) -> DbResult<Vec<Medication>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!(
            "SELECT drug_id, drug_name FROM {} WHERE drug_id IN ({placeholders}) ORDER BY drug_id",
            role.catalog_table()
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(ids.iter()), medication_from_row)?;

        let mut items = Vec::new();
        for row in rows {
            items.push(row?);
        }
        Ok(items)
    }
}

fn medication_from_row(row: &Row<'_>) -> rusqlite::Result<Medication> {
    Ok(Medication {
        id: row.get(0)?,
        name: row.get(1)?,
    })
}
