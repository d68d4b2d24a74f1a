//! Core content store for the folio portfolio site.
//!
//! The store is the single source of truth for portfolio content: the admin
//! editor writes through `ContentRepository`, and independently mounted views
//! observe those writes through `SlotWatcher`s.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod notify;
pub mod repo;
pub mod service;
pub mod store;
pub mod view;

pub use config::{ConfigError, FolioConfig};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::entry::{
    DisplayMode, EntryId, HexColor, ModelType, ProfileImage, Project3DEntry, ProjectEntry,
    ValidationError,
};
pub use model::id::IdGenerator;
pub use model::seed::{builtin_projects, SeedSource};
pub use notify::bus::{ChangeBus, ChangeOrigin, ContentEvent};
pub use notify::watcher::{SlotValue, SlotWatcher, DEFAULT_POLL_INTERVAL};
pub use notify::Subscription;
pub use repo::content_repo::ContentRepository;
pub use repo::slots::ContentSlot;
pub use service::editor::{
    split_tech, CollectionKind, ConfirmPrompt, DeleteOutcome, Editor, EditorError, EditorTab,
    ImageTarget, Project3DDraft, ProjectDraft,
};
pub use service::gate::{AdminGate, DEFAULT_ADMIN_PASSPHRASE};
pub use service::image::{data_uri_media_type, encode_image_data_uri};
pub use store::memory::MemoryKvStore;
pub use store::sqlite::SqliteKvStore;
pub use store::{KeyValueStore, StorageError, StoreResult};
pub use view::filter::{distinct_techs, ProjectFilter, TechFilter};
