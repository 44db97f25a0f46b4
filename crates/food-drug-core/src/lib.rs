//! Food-Drug Core Library
//!
//! Medication selection and food-drug interaction lookup for clinicians and
//! patients, shared by the mobile front-ends through UniFFI.
//!
//! # Architecture
//!
//! ```text
//!   select / deselect ──► SelectionStore (revisioned)
//!                                 │ snapshot
//!                                 ▼
//!                       InteractionResolver ──► RequestCache ──► Repository
//!                                 │                                  │
//!                    Aggregation (sentinel filter,          SQLite / in-memory
//!                    patient guidance record)
//!                                 │
//!                                 ▼
//!                  Resolution (checked against current revision)
//!
//!   CatalogPager ─┐
//!   FoodSearchEngine ─┼──► RequestCache ──► Repository
//!   InstructionsLookup ─┘
//! ```
//!
//! # Modules
//!
//! - [`models`]: Domain types (Medication, InteractionRecord, CatalogPage, etc.)
//! - [`repository`]: The `Repository` trait and an in-memory implementation
//! - [`db`]: SQLite datasets and the `SqliteRepository`
//! - [`cache`]: Keyed request cache with in-flight deduplication
//! - [`selection`]: Selected medications with a change revision
//! - [`resolver`]: Per-selection interaction resolution and aggregation
//! - [`catalog`]: Paged catalog browsing
//! - [`search`]: Two-stage food search
//! - [`instructions`]: General instructions lookup
//! - [`references`]: Link extraction from reference text

pub mod cache;
pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod instructions;
pub mod models;
pub mod references;
pub mod repository;
pub mod resolver;
pub mod search;
pub mod selection;

// Re-export commonly used types
pub use catalog::CatalogPager;
pub use config::CoreConfig;
pub use db::{Database, SqliteRepository};
pub use error::{CoreError, CoreResult};
pub use instructions::InstructionsLookup;
pub use models::{
    AggregatedResult, CatalogPage, GeneralInstructions, InteractionRecord, Medication, Role,
    PAGE_SIZE,
};
pub use references::ReferenceSegment;
pub use repository::{InMemoryRepository, Repository};
pub use resolver::{InteractionResolver, Resolution};
pub use search::FoodSearchEngine;
pub use selection::{SelectionSet, SelectionStore};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::sync::{Arc, Mutex};
use std::time::Duration;

use resolver::EntryOutcome;
use tokio::runtime::Runtime;
use tracing::{debug, info};

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum FoodDrugError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Network failure: {0}")]
    NetworkFailure(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Selection changed while resolving (resolved revision {resolved}, current {current})")]
    StaleSelection { resolved: u64, current: u64 },

    #[error("Runtime error: {0}")]
    RuntimeError(String),
}

impl From<CoreError> for FoodDrugError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::NetworkFailure(msg) => FoodDrugError::NetworkFailure(msg),
            CoreError::NotFound(msg) => FoodDrugError::NotFound(msg),
            CoreError::InvalidInput(msg) => FoodDrugError::InvalidInput(msg),
            CoreError::Storage(msg) => FoodDrugError::DatabaseError(msg),
            CoreError::StaleSelection { resolved, current } => {
                FoodDrugError::StaleSelection { resolved, current }
            }
        }
    }
}

impl From<db::DbError> for FoodDrugError {
    fn from(e: db::DbError) -> Self {
        CoreError::from(e).into()
    }
}

impl From<std::io::Error> for FoodDrugError {
    fn from(e: std::io::Error) -> Self {
        FoodDrugError::RuntimeError(e.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for FoodDrugError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        FoodDrugError::DatabaseError(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open or create a database at the given path.
#[uniffi::export]
pub fn open_database(path: String) -> Result<Arc<FoodDrugCore>, FoodDrugError> {
    let db = Database::open(&path)?;
    info!(path = %path, "opened interaction database");
    FoodDrugCore::build(db, CoreConfig::default())
}

/// Open or create a database with explicit cache settings.
#[uniffi::export]
pub fn open_database_with_config(
    path: String,
    config: FfiCoreConfig,
) -> Result<Arc<FoodDrugCore>, FoodDrugError> {
    let config = CoreConfig::try_from(config)?;
    let db = Database::open(&path)?;
    info!(path = %path, ttl_secs = config.cache_ttl().as_secs(), "opened interaction database");
    FoodDrugCore::build(db, config)
}

/// Create an in-memory database (for testing).
#[uniffi::export]
pub fn open_database_in_memory() -> Result<Arc<FoodDrugCore>, FoodDrugError> {
    let db = Database::open_in_memory()?;
    FoodDrugCore::build(db, CoreConfig::default())
}

/// Split reference text into plain-text and link segments, in order.
#[uniffi::export]
pub fn split_reference_links(text: String) -> Vec<FfiReferenceSegment> {
    references::split_links(&text)
        .into_iter()
        .map(|s| s.into())
        .collect()
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe core for FFI. Async work runs on an owned runtime; every
/// exported method blocks the calling thread until it completes.
#[derive(uniffi::Object)]
pub struct FoodDrugCore {
    runtime: Runtime,
    db: Arc<Mutex<Database>>,
    selection: SelectionStore,
    resolver: InteractionResolver,
    catalog: CatalogPager,
    search: FoodSearchEngine,
    instructions: InstructionsLookup,
}

impl FoodDrugCore {
    fn build(db: Database, config: CoreConfig) -> Result<Arc<Self>, FoodDrugError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .thread_name("food-drug-core")
            .enable_all()
            .build()?;

        let db = Arc::new(Mutex::new(db));
        let repository: Arc<dyn Repository> = Arc::new(SqliteRepository::new(Arc::clone(&db)));

        Ok(Arc::new(Self {
            runtime,
            db,
            selection: SelectionStore::new(),
            resolver: InteractionResolver::new(Arc::clone(&repository), &config),
            catalog: CatalogPager::new(Arc::clone(&repository), &config),
            search: FoodSearchEngine::new(Arc::clone(&repository), &config),
            instructions: InstructionsLookup::new(repository, &config),
        }))
    }

    /// Cached responses no longer reflect the datasets after a write.
    fn refresh_caches(&self) {
        self.resolver.refresh();
        self.catalog.refresh();
        self.search.refresh();
        self.instructions.refresh();
    }
}

fn parse_role(role: &str) -> Result<Role, FoodDrugError> {
    Ok(role.parse::<Role>()?)
}

#[uniffi::export]
impl FoodDrugCore {
    // =========================================================================
    // Selection Operations
    // =========================================================================

    /// Add a medication to the selection. Returns false if already selected.
    pub fn select_medication(&self, medication: FfiMedication) -> bool {
        let changed = self.selection.add(medication.into());
        if changed {
            self.resolver.forget_selections();
        }
        changed
    }

    /// Remove a medication from the selection. Returns false if not selected.
    pub fn deselect_medication(&self, medication_id: i64) -> bool {
        let changed = self.selection.remove(medication_id);
        if changed {
            self.resolver.forget_selections();
        }
        changed
    }

    /// Empty the selection.
    pub fn clear_selection(&self) -> bool {
        let changed = self.selection.clear();
        if changed {
            self.resolver.forget_selections();
        }
        changed
    }

    /// Selected medications in insertion order.
    pub fn selected_medications(&self) -> Vec<FfiMedication> {
        self.selection
            .list()
            .medications
            .into_iter()
            .map(|m| m.into())
            .collect()
    }

    /// Current selection revision; bumps on every effective change.
    pub fn selection_revision(&self) -> u64 {
        self.selection.revision()
    }

    // =========================================================================
    // Interaction Operations
    // =========================================================================

    /// Resolve interactions for the whole selection, in selection order.
    ///
    /// Medications that failed to load carry an error message instead of a
    /// result. Fails with `StaleSelection` when the selection changed while
    /// resolving; the caller should resolve again.
    pub fn resolve_selection(&self, role: String) -> Result<Vec<FfiResolutionEntry>, FoodDrugError> {
        let role = parse_role(&role)?;
        let snapshot = self.selection.list();
        let resolution = self.runtime.block_on(self.resolver.resolve(&snapshot, role));

        let current = self.selection.revision();
        if resolution.revision != current {
            debug!(resolved = resolution.revision, current, "discarding stale resolution");
            return Err(FoodDrugError::StaleSelection {
                resolved: resolution.revision,
                current,
            });
        }

        Ok(resolution
            .ordered_for(&snapshot)
            .into_iter()
            .map(|entry| {
                let (result, error) = match entry.outcome {
                    EntryOutcome::Resolved(result) => (Some(result.clone().into()), None),
                    EntryOutcome::Failed(error) => (None, Some(error.to_string())),
                    EntryOutcome::Missing => (None, None),
                };
                FfiResolutionEntry {
                    medication: entry.medication.clone().into(),
                    result,
                    error,
                }
            })
            .collect())
    }

    /// Resolve a single medication, e.g. one that failed in `resolve_selection`.
    pub fn retry_medication(
        &self,
        medication_id: i64,
        role: String,
    ) -> Result<FfiAggregatedResult, FoodDrugError> {
        let role = parse_role(&role)?;
        let result = self
            .runtime
            .block_on(self.resolver.resolve_medication(medication_id, role))?;
        Ok(result.into())
    }

    // =========================================================================
    // Catalog Operations
    // =========================================================================

    /// Fetch the catalog page at `cursor` (0 for the first page).
    pub fn next_catalog_page(&self, role: String, cursor: i64) -> Result<FfiCatalogPage, FoodDrugError> {
        let role = parse_role(&role)?;
        let page = self.runtime.block_on(self.catalog.next_page(role, cursor))?;
        Ok(page.into())
    }

    /// Medications interacting with a food, sorted by name.
    pub fn search_food(&self, role: String, term: String) -> Result<Vec<FfiMedication>, FoodDrugError> {
        let role = parse_role(&role)?;
        let mut found = self.runtime.block_on(self.search.search(role, &term))?;
        models::sort_by_name(&mut found);
        Ok(found.into_iter().map(|m| m.into()).collect())
    }

    /// General instructions of a medication.
    pub fn general_instructions(
        &self,
        medication_id: i64,
    ) -> Result<FfiGeneralInstructions, FoodDrugError> {
        let found = self
            .runtime
            .block_on(self.instructions.instructions_for(medication_id))?;
        Ok(found.into())
    }

    // =========================================================================
    // Dataset Operations
    // =========================================================================

    /// Add or update a catalog medication.
    pub fn upsert_medication(&self, role: String, medication: FfiMedication) -> Result<(), FoodDrugError> {
        let role = parse_role(&role)?;
        {
            let db = self.db.lock()?;
            db.upsert_medication(role, &Medication::from(medication))?;
        }
        self.refresh_caches();
        Ok(())
    }

    /// Append an interaction row. Returns the row id.
    pub fn add_interaction(&self, role: String, record: FfiInteraction) -> Result<i64, FoodDrugError> {
        let role = parse_role(&role)?;
        let id = {
            let db = self.db.lock()?;
            db.insert_interaction(role, &InteractionRecord::from(record))?
        };
        self.refresh_caches();
        Ok(id)
    }

    /// Add or update general instructions.
    pub fn upsert_general_instructions(
        &self,
        instructions: FfiGeneralInstructions,
    ) -> Result<(), FoodDrugError> {
        {
            let db = self.db.lock()?;
            db.upsert_general_instructions(&GeneralInstructions::from(instructions))?;
        }
        self.refresh_caches();
        Ok(())
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe cache settings.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiCoreConfig {
    pub cache_ttl_secs: u64,
    pub max_concurrent_fetches: u32,
}

impl TryFrom<FfiCoreConfig> for CoreConfig {
    type Error = CoreError;

    fn try_from(config: FfiCoreConfig) -> Result<Self, Self::Error> {
        CoreConfig::new(
            Duration::from_secs(config.cache_ttl_secs),
            config.max_concurrent_fetches as usize,
        )
    }
}

/// FFI-safe medication.
#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct FfiMedication {
    pub id: i64,
    pub name: String,
}

impl From<Medication> for FfiMedication {
    fn from(medication: Medication) -> Self {
        Self {
            id: medication.id,
            name: medication.name,
        }
    }
}

impl From<FfiMedication> for Medication {
    fn from(medication: FfiMedication) -> Self {
        Medication::new(medication.id, medication.name)
    }
}

/// FFI-safe interaction record.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiInteraction {
    pub medication_id: i64,
    pub food_item: String,
    pub severity: Option<String>,
    pub mechanism: Option<String>,
    pub management: Option<String>,
    pub counselling_tips: Option<String>,
    pub reference: Option<String>,
    pub is_guidance: bool,
}

impl From<InteractionRecord> for FfiInteraction {
    fn from(record: InteractionRecord) -> Self {
        Self {
            medication_id: record.medication_id,
            food_item: record.food_item,
            severity: record.severity,
            mechanism: record.mechanism,
            management: record.management,
            counselling_tips: record.counselling_tips,
            reference: record.reference,
            is_guidance: record.is_guidance,
        }
    }
}

impl From<FfiInteraction> for InteractionRecord {
    fn from(record: FfiInteraction) -> Self {
        InteractionRecord {
            medication_id: record.medication_id,
            food_item: record.food_item,
            severity: record.severity,
            mechanism: record.mechanism,
            management: record.management,
            counselling_tips: record.counselling_tips,
            reference: record.reference,
            is_guidance: record.is_guidance,
        }
    }
}

/// FFI-safe per-medication aggregate.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiAggregatedResult {
    pub medication_id: i64,
    pub interaction_count: u32,
    pub interactions: Vec<FfiInteraction>,
}

impl From<AggregatedResult> for FfiAggregatedResult {
    fn from(result: AggregatedResult) -> Self {
        Self {
            medication_id: result.medication_id,
            interaction_count: result.interaction_count as u32,
            interactions: result.interactions.into_iter().map(|i| i.into()).collect(),
        }
    }
}

/// FFI-safe resolution entry. Exactly one of `result` and `error` is set.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiResolutionEntry {
    pub medication: FfiMedication,
    pub result: Option<FfiAggregatedResult>,
    pub error: Option<String>,
}

/// FFI-safe catalog page.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiCatalogPage {
    pub items: Vec<FfiMedication>,
    pub cursor: i64,
    pub next_cursor: i64,
    pub exhausted: bool,
}

impl From<CatalogPage> for FfiCatalogPage {
    fn from(page: CatalogPage) -> Self {
        Self {
            items: page.items.into_iter().map(|m| m.into()).collect(),
            cursor: page.cursor,
            next_cursor: page.next_cursor,
            exhausted: page.exhausted,
        }
    }
}

/// FFI-safe general instructions.
#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct FfiGeneralInstructions {
    pub medication_id: i64,
    pub instructions: Option<String>,
    pub references: Option<String>,
    pub image_path: Option<String>,
}

impl From<GeneralInstructions> for FfiGeneralInstructions {
    fn from(found: GeneralInstructions) -> Self {
        Self {
            medication_id: found.medication_id,
            instructions: found.instructions,
            references: found.references,
            image_path: found.image_path,
        }
    }
}

impl From<FfiGeneralInstructions> for GeneralInstructions {
    fn from(found: FfiGeneralInstructions) -> Self {
        GeneralInstructions {
            medication_id: found.medication_id,
            instructions: found.instructions,
            references: found.references,
            image_path: found.image_path,
        }
    }
}

/// FFI-safe reference segment.
#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct FfiReferenceSegment {
    pub text: String,
    pub is_link: bool,
}

impl From<ReferenceSegment> for FfiReferenceSegment {
    fn from(segment: ReferenceSegment) -> Self {
        match segment {
            ReferenceSegment::Text(text) => Self {
                text,
                is_link: false,
            },
            ReferenceSegment::Link(text) => Self {
                text,
                is_link: true,
            },
        }
    }
}
