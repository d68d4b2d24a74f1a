//! Collection entries and singleton slot values.
//!
//! # Responsibility
//! - Define `ProjectEntry` / `Project3DEntry` and their value types.
//! - Provide creation-time validation used by the editor.
//!
//! # Invariants
//! - `title` and `description` are non-empty for entries created by the editor.
//! - Unknown 3D model names always resolve to `ModelType::Box`.
//! - Stored values round-trip unchanged; blank optional strings are treated
//!   as absent only when read through the accessors.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

static HEX_COLOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#[0-9a-fA-F]{6}$").expect("valid hex color regex"));

/// Stable identifier of one collection entry.
///
/// Millisecond-derived but strictly increasing, see `model::id`.
pub type EntryId = i64;

/// Default swatch used by the 3D draft form.
pub const DEFAULT_3D_COLOR: &str = "#697184";

/// Operator-input validation failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    MissingTitle,
    MissingDescription,
    InvalidColor(String),
    NotAnImage { mime: String },
    EmptyFile,
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingTitle => write!(f, "please fill in the title"),
            Self::MissingDescription => write!(f, "please fill in the description"),
            Self::InvalidColor(value) => {
                write!(f, "color `{value}` is not a #RRGGBB hex value")
            }
            Self::NotAnImage { mime } => write!(f, "file type `{mime}` is not an image"),
            Self::EmptyFile => write!(f, "image file is empty"),
        }
    }
}

impl Error for ValidationError {}

/// One entry of the 2D project collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectEntry {
    pub id: EntryId,
    pub title: String,
    pub description: String,
    /// Technology tags; order is display order.
    #[serde(default)]
    pub tech: Vec<String>,
    /// Data URI or URL of the cover image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl ProjectEntry {
    /// Checks the fields the editor requires at creation time.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text(&self.title, &self.description)
    }

    /// Cover image, ignoring the blank strings older entries carry.
    pub fn image_source(&self) -> Option<&str> {
        non_blank(&self.image)
    }

    pub fn link_url(&self) -> Option<&str> {
        non_blank(&self.link)
    }
}

/// One entry of the 3D showcase collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project3DEntry {
    pub id: EntryId,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub model_type: ModelType,
    /// `#RRGGBB` hex, as produced by the color control.
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Tools used to build the model, in display order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<String>,
}

impl Project3DEntry {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text(&self.title, &self.description)?;
        HexColor::parse(&self.color).map(|_| ())
    }

    pub fn image_source(&self) -> Option<&str> {
        non_blank(&self.image)
    }

    pub fn link_url(&self) -> Option<&str> {
        non_blank(&self.link)
    }
}

/// Mesh used to render a 3D showcase entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelType {
    #[default]
    Box,
    Sphere,
    Torus,
    Octahedron,
}

impl ModelType {
    /// Every selectable model, in selection-control order.
    pub const ALL: [ModelType; 4] = [Self::Box, Self::Sphere, Self::Torus, Self::Octahedron];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Box => "box",
            Self::Sphere => "sphere",
            Self::Torus => "torus",
            Self::Octahedron => "octahedron",
        }
    }

    /// Capitalized label for selection controls.
    pub fn label(self) -> &'static str {
        match self {
            Self::Box => "Box",
            Self::Sphere => "Sphere",
            Self::Torus => "Torus",
            Self::Octahedron => "Octahedron",
        }
    }

    /// Strict parse; `None` for anything outside the enumeration.
    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|model| model.as_str() == normalized)
    }

    /// Render-time parse: unknown names fall back to `Box`.
    pub fn parse_lenient(value: &str) -> Self {
        Self::parse(value).unwrap_or_default()
    }
}

impl Display for ModelType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ModelType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Any non-string value (null, number, object) renders as the default mesh.
        let raw = serde_json::Value::deserialize(deserializer)?;
        Ok(raw.as_str().map(Self::parse_lenient).unwrap_or_default())
    }
}

/// Validated `#RRGGBB` color.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HexColor(String);

impl HexColor {
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        let trimmed = value.trim();
        if HEX_COLOR_RE.is_match(trimmed) {
            Ok(Self(trimmed.to_ascii_lowercase()))
        } else {
            Err(ValidationError::InvalidColor(value.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Singleton profile picture, usually a base64 data URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileImage(String);

impl ProfileImage {
    /// Wraps a stored value; empty input means "no image".
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            None
        } else {
            Some(Self(value))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

/// Site-wide light/dark preference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DisplayMode {
    #[default]
    Light,
    Dark,
}

impl DisplayMode {
    pub fn is_dark(self) -> bool {
        matches!(self, Self::Dark)
    }

    pub fn from_dark(dark: bool) -> Self {
        if dark {
            Self::Dark
        } else {
            Self::Light
        }
    }
}

fn require_text(title: &str, description: &str) -> Result<(), ValidationError> {
    if title.trim().is_empty() {
        return Err(ValidationError::MissingTitle);
    }
    if description.trim().is_empty() {
        return Err(ValidationError::MissingDescription);
    }
    Ok(())
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|text| !text.trim().is_empty())
}
