//! Per-view slot watchers.
//!
//! A watcher is what a mounted content section holds: its current copy of
//! one slot plus the two refresh triggers (bus signal and poll deadline).

use super::Subscription;
use crate::model::entry::{DisplayMode, ProfileImage, Project3DEntry, ProjectEntry};
use crate::repo::content_repo::ContentRepository;
use crate::repo::slots::ContentSlot;
use crate::store::KeyValueStore;
use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Default re-read interval for mounted views.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// A value a view can watch: one slot and its typed loader.
pub trait SlotValue: Clone + PartialEq + 'static {
    const SLOT: ContentSlot;

    fn load<S: KeyValueStore>(repo: &ContentRepository<S>) -> Self;
}

impl SlotValue for Vec<ProjectEntry> {
    const SLOT: ContentSlot = ContentSlot::Projects;

    fn load<S: KeyValueStore>(repo: &ContentRepository<S>) -> Self {
        repo.load_projects()
    }
}

impl SlotValue for Vec<Project3DEntry> {
    const SLOT: ContentSlot = ContentSlot::Projects3D;

    fn load<S: KeyValueStore>(repo: &ContentRepository<S>) -> Self {
        repo.load_3d_projects()
    }
}

impl SlotValue for Option<ProfileImage> {
    const SLOT: ContentSlot = ContentSlot::ProfileImage;

    fn load<S: KeyValueStore>(repo: &ContentRepository<S>) -> Self {
        repo.load_profile_image()
    }
}

impl SlotValue for DisplayMode {
    const SLOT: ContentSlot = ContentSlot::DisplayMode;

    fn load<S: KeyValueStore>(repo: &ContentRepository<S>) -> Self {
        repo.load_display_mode()
    }
}

/// Mounted consumer of one content slot.
///
/// Dropping the watcher tears down its bus subscription; the poll is
/// deadline-driven, so nothing else outlives it.
pub struct SlotWatcher<T: SlotValue> {
    value: T,
    signalled: Rc<Cell<bool>>,
    poll_interval: Duration,
    last_read: Instant,
    subscription: Subscription,
}

impl<T: SlotValue> SlotWatcher<T> {
    /// Loads the slot once and starts listening.
    pub fn mount<S: KeyValueStore>(
        repo: &ContentRepository<S>,
        poll_interval: Duration,
        now: Instant,
    ) -> Self {
        let signalled = Rc::new(Cell::new(false));
        let flag = Rc::clone(&signalled);
        let subscription = repo.subscribe(move |event| {
            if event.slot == T::SLOT {
                flag.set(true);
            }
        });

        Self {
            value: T::load(repo),
            signalled,
            poll_interval,
            last_read: now,
            subscription,
        }
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn slot(&self) -> ContentSlot {
        T::SLOT
    }

    /// When the next poll re-read becomes due.
    pub fn next_poll_at(&self) -> Instant {
        self.last_read + self.poll_interval
    }

    /// Re-reads on signal or due poll; `true` only if the value changed.
    pub fn tick<S: KeyValueStore>(&mut self, repo: &ContentRepository<S>, now: Instant) -> bool {
        let signalled = self.signalled.replace(false);
        let poll_due = now.saturating_duration_since(self.last_read) >= self.poll_interval;
        if !signalled && !poll_due {
            return false;
        }

        self.last_read = now;
        let fresh = T::load(repo);
        if fresh == self.value {
            return false;
        }
        self.value = fresh;
        true
    }

    /// Stops listening and hands back the last value.
    pub fn unmount(self) -> T {
        self.subscription.unsubscribe();
        self.value
    }
}

#[cfg(test)]
mod tests {
    use super::{SlotWatcher, DEFAULT_POLL_INTERVAL};
    use crate::model::entry::DisplayMode;
    use crate::repo::content_repo::ContentRepository;
    use crate::repo::slots::DISPLAY_MODE_KEY;
    use crate::store::memory::MemoryKvStore;
    use crate::store::KeyValueStore;
    use std::time::{Duration, Instant};

    #[test]
    fn local_save_is_picked_up_on_next_tick() {
        let repo = ContentRepository::new(MemoryKvStore::new());
        let start = Instant::now();
        let mut watcher: SlotWatcher<DisplayMode> =
            SlotWatcher::mount(&repo, DEFAULT_POLL_INTERVAL, start);

        repo.save_display_mode(DisplayMode::Dark).unwrap();
        assert!(watcher.tick(&repo, start + Duration::from_millis(1)));
        assert_eq!(*watcher.value(), DisplayMode::Dark);
    }

    #[test]
    fn poll_catches_writes_that_bypass_the_repository() {
        let repo = ContentRepository::new(MemoryKvStore::new());
        let start = Instant::now();
        let mut watcher: SlotWatcher<DisplayMode> =
            SlotWatcher::mount(&repo, DEFAULT_POLL_INTERVAL, start);

        repo.store().set(DISPLAY_MODE_KEY, "true").unwrap();
        assert!(!watcher.tick(&repo, start + Duration::from_millis(500)));
        assert!(watcher.tick(&repo, start + DEFAULT_POLL_INTERVAL));
        assert_eq!(watcher.next_poll_at(), start + DEFAULT_POLL_INTERVAL * 2);
    }

    #[test]
    fn equal_reload_reports_no_change() {
        let repo = ContentRepository::new(MemoryKvStore::new());
        let start = Instant::now();
        let mut watcher: SlotWatcher<DisplayMode> =
            SlotWatcher::mount(&repo, DEFAULT_POLL_INTERVAL, start);

        repo.save_display_mode(DisplayMode::Light).unwrap();
        assert!(!watcher.tick(&repo, start + DEFAULT_POLL_INTERVAL));
    }

    #[test]
    fn unmount_releases_bus_subscription() {
        let repo = ContentRepository::new(MemoryKvStore::new());
        let watcher: SlotWatcher<DisplayMode> =
            SlotWatcher::mount(&repo, DEFAULT_POLL_INTERVAL, Instant::now());
        let dropped: SlotWatcher<DisplayMode> =
            SlotWatcher::mount(&repo, DEFAULT_POLL_INTERVAL, Instant::now());
        assert_eq!(repo.subscriber_count(), 2);

        assert_eq!(watcher.unmount(), DisplayMode::Light);
        drop(dropped);
        assert_eq!(repo.subscriber_count(), 0);
    }
}
