//! Default content written on first-ever load.
//!
//! # Responsibility
//! - Provide the built-in 2D seed projects.
//! - Optionally read seed projects from a static JSON document.
//!
//! # Invariants
//! - Seeding never fails: a bad static file degrades to the built-in seeds.

use super::entry::ProjectEntry;
use log::warn;
use std::path::PathBuf;

/// Where the default 2D collection comes from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SeedSource {
    #[default]
    Builtin,
    /// Static JSON array of projects, read only when seeding.
    JsonFile(PathBuf),
}

impl SeedSource {
    /// Resolves the seed collection.
    pub fn projects(&self) -> Vec<ProjectEntry> {
        match self {
            Self::Builtin => builtin_projects(),
            Self::JsonFile(path) => {
                let parsed = std::fs::read_to_string(path)
                    .map_err(|err| err.to_string())
                    .and_then(|raw| {
                        serde_json::from_str::<Vec<ProjectEntry>>(&raw)
                            .map_err(|err| err.to_string())
                    });
                match parsed {
                    Ok(projects) => projects,
                    Err(err) => {
                        warn!(
                            "event=seed_load module=model status=fallback path={} error={}",
                            path.display(),
                            err
                        );
                        builtin_projects()
                    }
                }
            }
        }
    }
}

/// The two projects shown before the operator adds anything.
pub fn builtin_projects() -> Vec<ProjectEntry> {
    vec![
        ProjectEntry {
            id: 1,
            title: "Codo File".to_string(),
            description: "File sharing platform where developers store, tag and share \
                          snippets with their team."
                .to_string(),
            tech: vec!["React".to_string(), "Node.js".to_string()],
            image: None,
            link: None,
        },
        ProjectEntry {
            id: 2,
            title: "Clinic Booking".to_string(),
            description: "Appointment scheduling website for a small medical practice."
                .to_string(),
            tech: vec!["PHP".to_string()],
            image: None,
            link: None,
        },
    ]
}
