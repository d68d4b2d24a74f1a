//! Admin editor over the content repository.
//!
//! # Responsibility
//! - Hold the editor's tab selection, draft forms and working lists.
//! - Turn drafts into entries and persist full collections.
//!
//! # Invariants
//! - Working lists always equal the last state the store accepted.
//! - A draft is cleared only after its entry was persisted.
//! - Ids are unique across both collections for one editor session.

use super::image::encode_image_data_uri;
use crate::model::entry::{
    DisplayMode, EntryId, HexColor, ModelType, ProfileImage, Project3DEntry, ProjectEntry,
    ValidationError, DEFAULT_3D_COLOR,
};
use crate::model::id::IdGenerator;
use crate::repo::content_repo::ContentRepository;
use crate::store::{KeyValueStore, StorageError};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

/// Editor failures surfaced to the operator. None of them is fatal.
#[derive(Debug)]
pub enum EditorError {
    /// Passphrase did not match; see `AdminGate`.
    AccessDenied,
    Validation(ValidationError),
    Storage(StorageError),
    Io(std::io::Error),
}

impl Display for EditorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AccessDenied => write!(f, "wrong admin passphrase"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Storage(err) => write!(f, "change was not saved: {err}"),
            Self::Io(err) => write!(f, "failed to read file: {err}"),
        }
    }
}

impl Error for EditorError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::AccessDenied => None,
            Self::Validation(err) => Some(err),
            Self::Storage(err) => Some(err),
            Self::Io(err) => Some(err),
        }
    }
}

impl From<ValidationError> for EditorError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StorageError> for EditorError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

impl From<std::io::Error> for EditorError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

/// Editor tab selection; UI state only, never persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EditorTab {
    #[default]
    Projects,
    ThreeD,
    Profile,
}

/// Collections that support deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionKind {
    Projects,
    Projects3D,
}

/// Destination of an uploaded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageTarget {
    /// Persisted immediately as the profile image.
    Profile,
    /// Kept in the project draft until `add_project`.
    ProjectDraft,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    Cancelled,
    NotFound,
}

/// Blocking yes/no confirmation.
pub trait ConfirmPrompt {
    fn confirm(&mut self, message: &str) -> bool;
}

impl<F: FnMut(&str) -> bool> ConfirmPrompt for F {
    fn confirm(&mut self, message: &str) -> bool {
        self(message)
    }
}

/// Form state for a new 2D project.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectDraft {
    pub title: String,
    pub description: String,
    /// Comma-separated technology list, as typed.
    pub tech: String,
    pub image: Option<String>,
    pub link: String,
}

/// Form state for a new 3D project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project3DDraft {
    pub title: String,
    pub description: String,
    pub model_type: ModelType,
    pub color: String,
    pub link: String,
}

impl Default for Project3DDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            model_type: ModelType::Box,
            color: DEFAULT_3D_COLOR.to_string(),
            link: String::new(),
        }
    }
}

/// Splits a free-text technology field on commas.
pub fn split_tech(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// Admin editing session.
pub struct Editor<'repo, S: KeyValueStore> {
    repo: &'repo ContentRepository<S>,
    ids: IdGenerator,
    tab: EditorTab,
    projects: Vec<ProjectEntry>,
    projects_3d: Vec<Project3DEntry>,
    profile_image: Option<ProfileImage>,
    project_draft: ProjectDraft,
    project_3d_draft: Project3DDraft,
}

impl<'repo, S: KeyValueStore> Editor<'repo, S> {
    /// Loads every editable slot. Prefer `AdminGate::unlock` at UI surfaces.
    pub fn open(repo: &'repo ContentRepository<S>) -> Self {
        Self::with_ids(repo, IdGenerator::new())
    }

    pub fn with_ids(repo: &'repo ContentRepository<S>, mut ids: IdGenerator) -> Self {
        let projects = repo.load_projects();
        let projects_3d = repo.load_3d_projects();
        ids.observe(
            projects
                .iter()
                .map(|entry| entry.id)
                .chain(projects_3d.iter().map(|entry| entry.id)),
        );

        Self {
            repo,
            ids,
            tab: EditorTab::default(),
            projects,
            projects_3d,
            profile_image: repo.load_profile_image(),
            project_draft: ProjectDraft::default(),
            project_3d_draft: Project3DDraft::default(),
        }
    }

    pub fn tab(&self) -> EditorTab {
        self.tab
    }

    pub fn select_tab(&mut self, tab: EditorTab) {
        self.tab = tab;
    }

    pub fn projects(&self) -> &[ProjectEntry] {
        &self.projects
    }

    pub fn projects_3d(&self) -> &[Project3DEntry] {
        &self.projects_3d
    }

    pub fn profile_image(&self) -> Option<&ProfileImage> {
        self.profile_image.as_ref()
    }

    pub fn project_draft(&self) -> &ProjectDraft {
        &self.project_draft
    }

    pub fn project_draft_mut(&mut self) -> &mut ProjectDraft {
        &mut self.project_draft
    }

    pub fn project_3d_draft(&self) -> &Project3DDraft {
        &self.project_3d_draft
    }

    pub fn project_3d_draft_mut(&mut self) -> &mut Project3DDraft {
        &mut self.project_3d_draft
    }

    /// Validates the project draft, appends it and persists the full list.
    pub fn add_project(&mut self) -> Result<ProjectEntry, EditorError> {
        let draft = &self.project_draft;
        let mut entry = ProjectEntry {
            id: 0,
            title: draft.title.trim().to_string(),
            description: draft.description.trim().to_string(),
            tech: split_tech(&draft.tech),
            image: draft.image.clone().filter(|image| !image.is_empty()),
            link: non_empty(&draft.link),
        };
        entry.validate()?;
        entry.id = self.ids.next_id();

        let mut updated = self.projects.clone();
        updated.push(entry.clone());
        self.repo.save_projects(&updated)?;

        self.projects = updated;
        self.project_draft = ProjectDraft::default();
        info!(
            "event=entry_add module=editor status=ok collection=projects id={}",
            entry.id
        );
        Ok(entry)
    }

    /// Validates the 3D draft, appends it and persists the full list.
    pub fn add_project_3d(&mut self) -> Result<Project3DEntry, EditorError> {
        let draft = &self.project_3d_draft;
        let mut entry = Project3DEntry {
            id: 0,
            title: draft.title.trim().to_string(),
            description: draft.description.trim().to_string(),
            model_type: draft.model_type,
            color: draft.color.trim().to_string(),
            link: non_empty(&draft.link),
            image: None,
            tools: Vec::new(),
        };
        entry.validate()?;
        entry.color = HexColor::parse(&entry.color)?.as_str().to_string();
        entry.id = self.ids.next_id();

        let mut updated = self.projects_3d.clone();
        updated.push(entry.clone());
        self.repo.save_3d_projects(&updated)?;

        self.projects_3d = updated;
        self.project_3d_draft = Project3DDraft::default();
        info!(
            "event=entry_add module=editor status=ok collection=projects_3d id={}",
            entry.id
        );
        Ok(entry)
    }

    /// Removes one entry after operator confirmation.
    ///
    /// Unknown ids are a no-op and never prompt.
    pub fn delete_entry(
        &mut self,
        kind: CollectionKind,
        id: EntryId,
        prompt: &mut impl ConfirmPrompt,
    ) -> Result<DeleteOutcome, EditorError> {
        let outcome = match kind {
            CollectionKind::Projects => {
                let Some(position) = self.projects.iter().position(|entry| entry.id == id) else {
                    return Ok(DeleteOutcome::NotFound);
                };
                if !prompt.confirm("Are you sure you want to delete this project?") {
                    return Ok(DeleteOutcome::Cancelled);
                }
                let mut updated = self.projects.clone();
                updated.remove(position);
                self.repo.save_projects(&updated)?;
                self.projects = updated;
                DeleteOutcome::Deleted
            }
            CollectionKind::Projects3D => {
                let Some(position) = self.projects_3d.iter().position(|entry| entry.id == id)
                else {
                    return Ok(DeleteOutcome::NotFound);
                };
                if !prompt.confirm("Are you sure you want to delete this 3D project?") {
                    return Ok(DeleteOutcome::Cancelled);
                }
                let mut updated = self.projects_3d.clone();
                updated.remove(position);
                self.repo.save_3d_projects(&updated)?;
                self.projects_3d = updated;
                DeleteOutcome::Deleted
            }
        };

        info!(
            "event=entry_delete module=editor status=ok collection={:?} id={}",
            kind, id
        );
        Ok(outcome)
    }

    /// Reads an image file and routes its data URI to `target`.
    pub fn upload_image(
        &mut self,
        path: impl AsRef<Path>,
        target: ImageTarget,
    ) -> Result<String, EditorError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.upload_image_bytes(&file_name, &bytes, target)
    }

    /// Encodes already-read image bytes and routes the data URI to `target`.
    pub fn upload_image_bytes(
        &mut self,
        file_name: &str,
        bytes: &[u8],
        target: ImageTarget,
    ) -> Result<String, EditorError> {
        let data_uri = encode_image_data_uri(file_name, bytes)?;
        match target {
            ImageTarget::Profile => {
                let image = ProfileImage::new(data_uri.clone()).ok_or(EditorError::Validation(
                    ValidationError::EmptyFile,
                ))?;
                self.repo.save_profile_image(&image)?;
                self.profile_image = Some(image);
                info!(
                    "event=image_upload module=editor status=ok target=profile bytes={}",
                    bytes.len()
                );
            }
            ImageTarget::ProjectDraft => {
                self.project_draft.image = Some(data_uri.clone());
            }
        }
        Ok(data_uri)
    }

    /// Persists the site-wide display preference.
    pub fn set_display_mode(&mut self, mode: DisplayMode) -> Result<(), EditorError> {
        self.repo.save_display_mode(mode)?;
        Ok(())
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::{split_tech, EditorTab, Project3DDraft};
    use crate::model::entry::ModelType;

    #[test]
    fn split_tech_trims_and_drops_empty_tokens() {
        assert_eq!(
            split_tech(" React, Node.js ,, ,Three.js,"),
            vec!["React", "Node.js", "Three.js"]
        );
        assert!(split_tech("  ").is_empty());
    }

    #[test]
    fn drafts_and_tab_have_form_defaults() {
        let draft = Project3DDraft::default();
        assert_eq!(draft.model_type, ModelType::Box);
        assert_eq!(draft.color, "#697184");
        assert_eq!(EditorTab::default(), EditorTab::Projects);
    }
}
