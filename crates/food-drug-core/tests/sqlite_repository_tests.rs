//! SQLite-backed engines, on disk.

use std::sync::{Arc, Mutex};

use food_drug_core::catalog::CatalogPager;
use food_drug_core::config::CoreConfig;
use food_drug_core::db::{Database, SqliteRepository};
use food_drug_core::instructions::InstructionsLookup;
use food_drug_core::models::{GeneralInstructions, InteractionRecord, Medication, Role};
use food_drug_core::references::ReferenceSegment;
use food_drug_core::repository::{InMemoryRepository, Repository};
use food_drug_core::resolver::InteractionResolver;
use food_drug_core::search::FoodSearchEngine;
use food_drug_core::selection::SelectionStore;
use tempfile::TempDir;

fn seed(db: &Database) {
    for (id, name) in [(1, "Warfarin"), (2, "levothyroxine"), (3, "Ciprofloxacin")] {
        db.upsert_medication(Role::Patient, &Medication::new(id, name)).unwrap();
    }

    let mut dairy = InteractionRecord::new(3, "Dairy products");
    dairy.severity = Some("Moderate".into());
    dairy.counselling_tips = Some("Separate from milk by 2 hours".into());
    db.insert_interaction(Role::Patient, &dairy).unwrap();

    let mut coffee = InteractionRecord::new(2, "Coffee");
    coffee.reference = Some("See https://example.org/levo for details".into());
    db.insert_interaction(Role::Patient, &coffee).unwrap();

    db.insert_interaction(Role::Patient, &InteractionRecord::new(1, "NA"))
        .unwrap();

    let mut instructions = GeneralInstructions::new(2);
    instructions.instructions = Some("Take on an empty stomach".into());
    instructions.references = Some("Leaflet: https://example.org/levo-leaflet".into());
    db.upsert_general_instructions(&instructions).unwrap();
}

fn open_repository(dir: &TempDir) -> Arc<dyn Repository> {
    let db = Database::open(dir.path().join("interactions.db")).unwrap();
    Arc::new(SqliteRepository::new(Arc::new(Mutex::new(db))))
}

#[tokio::test]
async fn test_data_survives_reopen() {
    let dir = TempDir::new().unwrap();
    {
        let db = Database::open(dir.path().join("interactions.db")).unwrap();
        seed(&db);
    }

    let repository = open_repository(&dir);
    let pager = CatalogPager::new(repository, &CoreConfig::default());
    let page = pager.next_page(Role::Patient, 0).await.unwrap();

    let names: Vec<_> = page.items.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["Ciprofloxacin", "levothyroxine", "Warfarin"]);
    assert!(page.exhausted);
}

#[tokio::test]
async fn test_resolve_selection_against_sqlite() {
    let dir = TempDir::new().unwrap();
    seed(&Database::open(dir.path().join("interactions.db")).unwrap());
    let resolver = InteractionResolver::new(open_repository(&dir), &CoreConfig::default());

    let store = SelectionStore::new();
    store.add(Medication::new(1, "Warfarin"));
    store.add(Medication::new(3, "Ciprofloxacin"));

    let resolution = resolver.resolve(&store.list(), Role::Patient).await;
    assert!(resolution.is_complete());

    let warfarin = resolution.get(1).unwrap();
    assert_eq!(warfarin.interaction_count, 0);
    assert!(warfarin.interactions.is_empty());

    let cipro = resolution.get(3).unwrap();
    assert_eq!(cipro.interaction_count, 1);
    assert_eq!(cipro.interactions.len(), 2);
    assert_eq!(
        cipro.guidance().and_then(|g| g.counselling_tips.as_deref()),
        Some("Separate from milk by 2 hours")
    );
}

#[tokio::test]
async fn test_food_search_against_sqlite() {
    let dir = TempDir::new().unwrap();
    seed(&Database::open(dir.path().join("interactions.db")).unwrap());
    let engine = FoodSearchEngine::new(open_repository(&dir), &CoreConfig::default());

    let found = engine.search(Role::Patient, "DAIRY").await.unwrap();
    assert_eq!(found, vec![Medication::new(3, "Ciprofloxacin")]);

    // Wildcard characters are plain text
    assert!(engine.search(Role::Patient, "%").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_instructions_and_references() {
    let dir = TempDir::new().unwrap();
    seed(&Database::open(dir.path().join("interactions.db")).unwrap());
    let repository = open_repository(&dir);

    let lookup = InstructionsLookup::new(Arc::clone(&repository), &CoreConfig::default());
    let found = lookup.instructions_for(2).await.unwrap();
    assert_eq!(found.instructions.as_deref(), Some("Take on an empty stomach"));
    assert!(lookup.instructions_for(1).await.is_err());
    assert_eq!(
        found.reference_segments(),
        vec![
            ReferenceSegment::Text("Leaflet: ".into()),
            ReferenceSegment::Link("https://example.org/levo-leaflet".into()),
        ]
    );

    let rows = repository
        .interactions_for_medication(Role::Patient, 2)
        .await
        .unwrap();
    let links: Vec<_> = rows[0]
        .reference_segments()
        .into_iter()
        .filter_map(|segment| match segment {
            ReferenceSegment::Link(url) => Some(url),
            ReferenceSegment::Text(_) => None,
        })
        .collect();
    assert_eq!(links, vec!["https://example.org/levo".to_string()]);
}

#[tokio::test]
async fn test_non_ascii_matching_agrees_with_memory_backend() {
    let dir = TempDir::new().unwrap();
    let db = Database::open(dir.path().join("interactions.db")).unwrap();
    let memory = InMemoryRepository::new();

    for (id, name) in [(1, "Warfarin"), (2, "Éthambutol"), (3, "ésoméprazole"), (4, "Zinc")] {
        db.upsert_medication(Role::Clinician, &Medication::new(id, name)).unwrap();
        memory
            .insert_medication(Role::Clinician, Medication::new(id, name))
            .unwrap();
    }
    for (id, food) in [(1, "Äpfel"), (2, "Crème fraîche"), (4, "APFELSAFT")] {
        db.insert_interaction(Role::Clinician, &InteractionRecord::new(id, food))
            .unwrap();
        memory
            .insert_interaction(Role::Clinician, InteractionRecord::new(id, food))
            .unwrap();
    }
    let sqlite: Arc<dyn Repository> = Arc::new(SqliteRepository::new(Arc::new(Mutex::new(db))));
    let memory: Arc<dyn Repository> = Arc::new(memory);

    for term in ["ÄPFEL", "apfel", "CRÈME"] {
        let from_sqlite = FoodSearchEngine::new(Arc::clone(&sqlite), &CoreConfig::default())
            .search(Role::Clinician, term)
            .await
            .unwrap();
        let from_memory = FoodSearchEngine::new(Arc::clone(&memory), &CoreConfig::default())
            .search(Role::Clinician, term)
            .await
            .unwrap();
        assert_eq!(from_sqlite, from_memory, "term {term:?}");
    }

    let page = CatalogPager::new(Arc::clone(&sqlite), &CoreConfig::default())
        .next_page(Role::Clinician, 0)
        .await
        .unwrap();
    let expected = CatalogPager::new(memory, &CoreConfig::default())
        .next_page(Role::Clinician, 0)
        .await
        .unwrap();
    assert_eq!(page.items, expected.items);
    assert_eq!(page.items[3].name, "Éthambutol");
}
