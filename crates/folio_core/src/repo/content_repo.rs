//! Content repository over an injected key-value store.
//!
//! # Responsibility
//! - Provide one load/save pair per content slot.
//! - Seed the 2D and 3D collections on first load and write the seed back.
//! - Publish local saves and relay external store signals on a `ChangeBus`.
//!
//! # Invariants
//! - `load_*` never returns an error; corrupt JSON is logged and replaced.
//! - `save_*` publishes only after the store accepted the write.
//! - Seed write-back does not publish; every reader computes the same value.

use crate::model::entry::{DisplayMode, ProfileImage, Project3DEntry, ProjectEntry};
use crate::model::seed::SeedSource;
use crate::notify::bus::{ChangeBus, ChangeOrigin, ContentEvent};
use crate::notify::Subscription;
use crate::repo::slots::ContentSlot;
use crate::store::{KeyValueStore, StorageError, StoreResult};
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Typed accessors for every content slot.
pub struct ContentRepository<S: KeyValueStore> {
    store: S,
    seeds: SeedSource,
    bus: ChangeBus,
    _external: Subscription,
}

impl<S: KeyValueStore> ContentRepository<S> {
    /// Creates a repository seeded with the built-in projects.
    pub fn new(store: S) -> Self {
        Self::with_seeds(store, SeedSource::Builtin)
    }

    pub fn with_seeds(store: S, seeds: SeedSource) -> Self {
        let bus = ChangeBus::new();
        let relay = bus.clone();
        let external = store.subscribe_external(Box::new(move |key: &str| {
            if let Some(slot) = ContentSlot::from_key(key) {
                relay.publish(ContentEvent {
                    slot,
                    origin: ChangeOrigin::External,
                });
            }
        }));

        Self {
            store,
            seeds,
            bus,
            _external: external,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Subscribes to local saves and relayed external changes.
    pub fn subscribe(&self, handler: impl Fn(&ContentEvent) + 'static) -> Subscription {
        self.bus.subscribe(handler)
    }

    pub fn subscriber_count(&self) -> usize {
        self.bus.subscriber_count()
    }

    /// Delivers pending cross-context store signals onto the bus.
    pub fn pump(&self) -> usize {
        self.store.dispatch_external_changes()
    }

    pub fn load_projects(&self) -> Vec<ProjectEntry> {
        self.load_collection(ContentSlot::Projects, || self.seeds.projects())
    }

    pub fn save_projects(&self, projects: &[ProjectEntry]) -> StoreResult<()> {
        self.save_json(ContentSlot::Projects, projects)
    }

    pub fn load_3d_projects(&self) -> Vec<Project3DEntry> {
        self.load_collection(ContentSlot::Projects3D, Vec::new)
    }

    pub fn save_3d_projects(&self, projects: &[Project3DEntry]) -> StoreResult<()> {
        self.save_json(ContentSlot::Projects3D, projects)
    }

    /// Profile image is stored raw, not JSON-encoded.
    pub fn load_profile_image(&self) -> Option<ProfileImage> {
        self.store
            .get(ContentSlot::ProfileImage.key())
            .and_then(ProfileImage::new)
    }

    pub fn save_profile_image(&self, image: &ProfileImage) -> StoreResult<()> {
        self.write_raw(ContentSlot::ProfileImage, image.as_str())
    }

    /// Absent or unreadable preference reads as `Light` without write-back.
    pub fn load_display_mode(&self) -> DisplayMode {
        let slot = ContentSlot::DisplayMode;
        match self.store.get(slot.key()) {
            Some(raw) => match serde_json::from_str::<bool>(&raw) {
                Ok(dark) => DisplayMode::from_dark(dark),
                Err(err) => {
                    log_corrupt(slot, &err);
                    DisplayMode::Light
                }
            },
            None => DisplayMode::Light,
        }
    }

    pub fn save_display_mode(&self, mode: DisplayMode) -> StoreResult<()> {
        self.save_json(ContentSlot::DisplayMode, &mode.is_dark())
    }

    fn load_collection<T>(&self, slot: ContentSlot, defaults: impl FnOnce() -> Vec<T>) -> Vec<T>
    where
        T: Serialize + DeserializeOwned,
    {
        if let Some(raw) = self.store.get(slot.key()) {
            match serde_json::from_str::<Vec<T>>(&raw) {
                Ok(items) => return items,
                Err(err) => log_corrupt(slot, &err),
            }
        }

        let items = defaults();
        match encode(&items).and_then(|raw| self.store.set(slot.key(), &raw)) {
            Ok(()) => debug!(
                "event=slot_seed module=repo status=ok key={} count={}",
                slot.key(),
                items.len()
            ),
            Err(err) => warn!(
                "event=slot_seed module=repo status=error key={} error={}",
                slot.key(),
                err
            ),
        }
        items
    }

    fn save_json<T: Serialize + ?Sized>(&self, slot: ContentSlot, value: &T) -> StoreResult<()> {
        let raw = encode(value)?;
        self.write_raw(slot, &raw)
    }

    fn write_raw(&self, slot: ContentSlot, raw: &str) -> StoreResult<()> {
        if let Err(err) = self.store.set(slot.key(), raw) {
            warn!(
                "event=slot_save module=repo status=error key={} bytes={} error={}",
                slot.key(),
                raw.len(),
                err
            );
            return Err(err);
        }

        debug!(
            "event=slot_save module=repo status=ok key={} bytes={}",
            slot.key(),
            raw.len()
        );
        self.bus.publish(ContentEvent {
            slot,
            origin: ChangeOrigin::Local,
        });
        Ok(())
    }
}

fn encode<T: Serialize + ?Sized>(value: &T) -> StoreResult<String> {
    serde_json::to_string(value).map_err(|err| StorageError::Serialization(err.to_string()))
}

fn log_corrupt(slot: ContentSlot, err: &serde_json::Error) {
    warn!(
        "event=slot_decode module=repo status=fallback key={} error={}",
        slot.key(),
        err
    );
}

#[cfg(test)]
mod tests {
    use super::ContentRepository;
    use crate::model::entry::{DisplayMode, ProfileImage};
    use crate::notify::bus::ChangeOrigin;
    use crate::repo::slots::{ContentSlot, DISPLAY_MODE_KEY, PROJECTS_3D_KEY};
    use crate::store::memory::MemoryKvStore;
    use crate::store::KeyValueStore;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn empty_3d_collection_is_seeded_as_empty_array() {
        let repo = ContentRepository::new(MemoryKvStore::new());
        assert!(repo.load_3d_projects().is_empty());
        assert_eq!(repo.store().get(PROJECTS_3D_KEY).as_deref(), Some("[]"));
    }

    #[test]
    fn display_mode_defaults_to_light_without_write_back() {
        let repo = ContentRepository::new(MemoryKvStore::new());
        assert_eq!(repo.load_display_mode(), DisplayMode::Light);
        assert_eq!(repo.store().get(DISPLAY_MODE_KEY), None);

        repo.save_display_mode(DisplayMode::Dark).unwrap();
        assert_eq!(repo.store().get(DISPLAY_MODE_KEY).as_deref(), Some("true"));
        assert_eq!(repo.load_display_mode(), DisplayMode::Dark);
    }

    #[test]
    fn profile_image_is_stored_raw() {
        let repo = ContentRepository::new(MemoryKvStore::new());
        assert_eq!(repo.load_profile_image(), None);

        let image = ProfileImage::new("data:image/png;base64,iVBORw0KGgo=").unwrap();
        repo.save_profile_image(&image).unwrap();
        assert_eq!(
            repo.store().get(ContentSlot::ProfileImage.key()).as_deref(),
            Some("data:image/png;base64,iVBORw0KGgo=")
        );
        assert_eq!(repo.load_profile_image(), Some(image));
    }

    #[test]
    fn saves_publish_local_events_but_failed_saves_do_not() {
        let repo = ContentRepository::new(MemoryKvStore::new());
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        let _subscription = repo.subscribe(move |event| sink.borrow_mut().push(*event));

        repo.save_display_mode(DisplayMode::Dark).unwrap();
        repo.store().set_available(false);
        assert!(repo.save_display_mode(DisplayMode::Light).is_err());

        let events = events.borrow();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].slot, ContentSlot::DisplayMode);
        assert_eq!(events[0].origin, ChangeOrigin::Local);
    }
}
