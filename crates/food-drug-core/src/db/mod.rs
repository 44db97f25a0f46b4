//! SQLite storage for the medication datasets.

mod schema;
mod catalog;
mod interactions;
mod instructions;
mod repository;

pub use schema::*;
#[allow(unused_imports)]
pub use catalog::*;
#[allow(unused_imports)]
pub use interactions::*;
#[allow(unused_imports)]
pub use instructions::*;
pub use repository::*;

use rusqlite::functions::FunctionFlags;
use rusqlite::Connection;
use std::path::Path;
use thiserror::Error;

use crate::error::CoreError;

/// Database errors.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Constraint violation: {0}")]
    Constraint(String),
}

pub type DbResult<T> = Result<T, DbError>;

impl From<DbError> for CoreError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::Constraint(msg) => CoreError::InvalidInput(msg),
            other => CoreError::Storage(other.to_string()),
        }
    }
}

/// Database connection wrapper.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open database at path, creating if needed.
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.initialize()?;
        Ok(db)
    }

    /// Create in-memory database (for testing).
    pub fn open_in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.initialize()?;
        Ok(db)
    }

    /// Register Unicode case folding, then initialize schema.
    fn initialize(&self) -> DbResult<()> {
        self.register_unicode_folding()?;
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// `unicode_lower(text)` and the `UNICODE_NOCASE` collation. SQLite's own
    /// `lower()`, `LIKE` and `NOCASE` only fold ASCII letters.
    fn register_unicode_folding(&self) -> DbResult<()> {
        self.conn.create_scalar_function(
            UNICODE_LOWER,
            1,
            FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
            |ctx| {
                let text: Option<String> = ctx.get(0)?;
                Ok(text.map(|t| t.to_lowercase()))
            },
        )?;
        self.conn
            .create_collation(UNICODE_NOCASE, |a: &str, b: &str| {
                a.to_lowercase().cmp(&b.to_lowercase())
            })?;
        Ok(())
    }

    /// Get raw connection (for advanced queries).
    pub fn conn(&self) -> &Connection {
        &self.conn
    }
}

/// SQL function lower-casing its text argument with Unicode rules.
const UNICODE_LOWER: &str = "unicode_lower";

/// Collation comparing Unicode lower-cased text.
const UNICODE_NOCASE: &str = "UNICODE_NOCASE";
