use folio_core::db::open_db;
use folio_core::{
    ChangeOrigin, ContentRepository, ContentSlot, DisplayMode, Editor, MemoryKvStore,
    ProfileImage, ProjectEntry, SlotWatcher, SqliteKvStore, DEFAULT_POLL_INTERVAL,
};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

fn fill_and_add<S: folio_core::KeyValueStore>(editor: &mut Editor<'_, S>, title: &str) -> i64 {
    let draft = editor.project_draft_mut();
    draft.title = title.to_string();
    draft.description = "Added from another tab".to_string();
    editor.add_project().unwrap().id
}

#[test]
fn entry_added_in_tab_a_shows_in_tab_b_within_one_poll() {
    let repo_a = ContentRepository::new(MemoryKvStore::new());
    let repo_b = ContentRepository::new(repo_a.store().open_context());
    let start = Instant::now();
    let mut view_b: SlotWatcher<Vec<ProjectEntry>> =
        SlotWatcher::mount(&repo_b, DEFAULT_POLL_INTERVAL, start);
    assert_eq!(view_b.value().len(), 2);

    let mut editor = Editor::open(&repo_a);
    let id = fill_and_add(&mut editor, "Cross tab");

    assert!(!view_b.tick(&repo_b, start + Duration::from_millis(10)));
    assert!(view_b.tick(&repo_b, start + DEFAULT_POLL_INTERVAL));
    assert!(view_b.value().iter().any(|entry| entry.id == id));
}

#[test]
fn external_signal_refreshes_before_the_poll_is_due() {
    let repo_a = ContentRepository::new(MemoryKvStore::new());
    let repo_b = ContentRepository::new(repo_a.store().open_context());
    let start = Instant::now();
    let mut view_b: SlotWatcher<DisplayMode> =
        SlotWatcher::mount(&repo_b, DEFAULT_POLL_INTERVAL, start);

    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    let _subscription = repo_b.subscribe(move |event| sink.borrow_mut().push(*event));

    repo_a.save_display_mode(DisplayMode::Dark).unwrap();
    assert_eq!(repo_b.pump(), 1);

    assert!(view_b.tick(&repo_b, start + Duration::from_millis(10)));
    assert_eq!(*view_b.value(), DisplayMode::Dark);
    let events = events.borrow();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].slot, ContentSlot::DisplayMode);
    assert_eq!(events[0].origin, ChangeOrigin::External);
}

#[test]
fn same_context_writer_and_view_share_the_bus() {
    let repo = ContentRepository::new(MemoryKvStore::new());
    let start = Instant::now();
    let mut about: SlotWatcher<Option<ProfileImage>> =
        SlotWatcher::mount(&repo, DEFAULT_POLL_INTERVAL, start);
    assert_eq!(about.value(), &None);

    let mut editor = Editor::open(&repo);
    editor
        .upload_image_bytes("me.webp", b"RIFF", folio_core::ImageTarget::Profile)
        .unwrap();

    assert_eq!(repo.pump(), 0);
    assert!(about.tick(&repo, start + Duration::from_millis(1)));
    assert!(about.value().is_some());
}

#[test]
fn unmounted_view_stops_listening() {
    let repo = ContentRepository::new(MemoryKvStore::new());
    let view: SlotWatcher<Vec<ProjectEntry>> =
        SlotWatcher::mount(&repo, DEFAULT_POLL_INTERVAL, Instant::now());
    assert_eq!(repo.subscriber_count(), 1);

    let last = view.unmount();
    assert_eq!(last.len(), 2);
    assert_eq!(repo.subscriber_count(), 0);
}

#[test]
fn sqlite_tabs_propagate_through_data_version() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("folio.db");
    let conn_a = open_db(&path).unwrap();
    let conn_b = open_db(&path).unwrap();
    let repo_a = ContentRepository::new(SqliteKvStore::try_new(&conn_a).unwrap());
    let repo_b = ContentRepository::new(SqliteKvStore::try_new(&conn_b).unwrap());

    let start = Instant::now();
    let mut view_b: SlotWatcher<Vec<ProjectEntry>> =
        SlotWatcher::mount(&repo_b, DEFAULT_POLL_INTERVAL, start);
    repo_b.pump();

    let mut editor = Editor::open(&repo_a);
    let id = fill_and_add(&mut editor, "From file-backed tab");

    assert!(repo_b.pump() >= 1);
    assert!(view_b.tick(&repo_b, start + Duration::from_millis(5)));
    assert!(view_b.value().iter().any(|entry| entry.id == id));
}
