use folio_core::db::open_db;
use folio_core::repo::slots::{PROJECTS_3D_KEY, PROJECTS_KEY};
use folio_core::{
    builtin_projects, ContentRepository, KeyValueStore, MemoryKvStore, ModelType,
    Project3DEntry, ProjectEntry, SeedSource, SqliteKvStore,
};

fn sample_projects() -> Vec<ProjectEntry> {
    vec![
        ProjectEntry {
            id: 1_700_000_000_001,
            title: "Weather Board".to_string(),
            description: "Dashboard of local forecasts".to_string(),
            tech: vec!["Vue".to_string(), "Express.js".to_string()],
            image: Some("data:image/jpeg;base64,/9j/4AAQ".to_string()),
            link: Some("https://example.com/weather".to_string()),
        },
        ProjectEntry {
            id: 1_700_000_000_000,
            title: "Notes".to_string(),
            description: "Markdown notes".to_string(),
            tech: Vec::new(),
            image: None,
            link: None,
        },
    ]
}

#[test]
fn saved_projects_load_back_identically() {
    let repo = ContentRepository::new(MemoryKvStore::new());
    let projects = sample_projects();

    repo.save_projects(&projects).unwrap();
    assert_eq!(repo.load_projects(), projects);
}

#[test]
fn saved_3d_projects_load_back_identically() {
    let repo = ContentRepository::new(MemoryKvStore::new());
    let projects = vec![Project3DEntry {
        id: 9,
        title: "Table & Chairs".to_string(),
        description: "Blender furniture set".to_string(),
        model_type: ModelType::Octahedron,
        color: "#8b4513".to_string(),
        link: None,
        image: Some("/images/table-chairs.jpg".to_string()),
        tools: vec!["Blender".to_string(), "UV Mapping".to_string()],
    }];

    repo.save_3d_projects(&projects).unwrap();
    assert_eq!(repo.load_3d_projects(), projects);
}

#[test]
fn blank_optional_fields_survive_a_save_load_cycle() {
    let repo = ContentRepository::new(MemoryKvStore::new());
    let mut projects = sample_projects();
    projects[1].image = Some(String::new());
    projects[1].link = Some(" ".to_string());

    repo.save_projects(&projects).unwrap();
    let loaded = repo.load_projects();
    assert_eq!(loaded, projects);
    assert_eq!(loaded[1].link_url(), None);
}

#[test]
fn null_model_type_renders_as_box_without_dropping_the_collection() {
    let repo = ContentRepository::new(MemoryKvStore::new());
    let stored = r##"[
        {"id":1,"title":"Globe","description":"Sphere","modelType":"sphere","color":"#112233"},
        {"id":2,"title":"Crate","description":"Legacy","modelType":null,"color":"#445566"}
    ]"##;
    repo.store().set(PROJECTS_3D_KEY, stored).unwrap();

    let loaded = repo.load_3d_projects();
    assert_eq!(loaded.len(), 2);
    assert_eq!(loaded[0].model_type, ModelType::Sphere);
    assert_eq!(loaded[1].model_type, ModelType::Box);
    assert_eq!(repo.store().get(PROJECTS_3D_KEY).as_deref(), Some(stored));
}

#[test]
fn first_load_seeds_two_projects_and_persists_them() {
    let repo = ContentRepository::new(MemoryKvStore::new());

    let first = repo.load_projects();
    assert_eq!(first, builtin_projects());
    assert!(repo.store().get(PROJECTS_KEY).is_some());

    let second = repo.load_projects();
    assert_eq!(second, first);
}

#[test]
fn seeded_value_is_visible_to_another_context() {
    let tab_a = MemoryKvStore::new();
    let tab_b = tab_a.open_context();
    let repo_a = ContentRepository::new(tab_a);
    let repo_b = ContentRepository::with_seeds(tab_b, SeedSource::JsonFile("/nonexistent".into()));

    let seeded = repo_a.load_projects();
    assert_eq!(repo_b.load_projects(), seeded);
}

#[test]
fn corrupt_slot_falls_back_to_seeds_and_is_repaired() {
    let repo = ContentRepository::new(MemoryKvStore::new());
    repo.store().set(PROJECTS_KEY, "{not json").unwrap();
    repo.store().set(PROJECTS_3D_KEY, r#"[{"id":"x"}]"#).unwrap();

    assert_eq!(repo.load_projects(), builtin_projects());
    assert!(repo.load_3d_projects().is_empty());

    let repaired: Vec<ProjectEntry> =
        serde_json::from_str(&repo.store().get(PROJECTS_KEY).unwrap()).unwrap();
    assert_eq!(repaired, builtin_projects());
}

#[test]
fn unavailable_storage_still_yields_defaults() {
    let store = MemoryKvStore::new();
    store.set_available(false);
    let repo = ContentRepository::new(store);

    assert_eq!(repo.load_projects(), builtin_projects());
    assert!(repo.save_projects(&sample_projects()).is_err());
}

#[test]
fn sqlite_store_persists_across_connections() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("folio.db");
    let projects = sample_projects();

    {
        let conn = open_db(&path).unwrap();
        let repo = ContentRepository::new(SqliteKvStore::try_new(&conn).unwrap());
        repo.save_projects(&projects).unwrap();
    }

    let conn = open_db(&path).unwrap();
    let repo = ContentRepository::new(SqliteKvStore::try_new(&conn).unwrap());
    assert_eq!(repo.load_projects(), projects);
}
