//! Durable slot names.

pub const PROJECTS_KEY: &str = "portfolioProjects";
pub const PROJECTS_3D_KEY: &str = "portfolio3DProjects";
pub const PROFILE_IMAGE_KEY: &str = "portfolioProfileImage";
pub const DISPLAY_MODE_KEY: &str = "darkMode";

/// Content slots known to the repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ContentSlot {
    Projects,
    Projects3D,
    ProfileImage,
    DisplayMode,
}

impl ContentSlot {
    pub const ALL: [ContentSlot; 4] = [
        Self::Projects,
        Self::Projects3D,
        Self::ProfileImage,
        Self::DisplayMode,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Self::Projects => PROJECTS_KEY,
            Self::Projects3D => PROJECTS_3D_KEY,
            Self::ProfileImage => PROFILE_IMAGE_KEY,
            Self::DisplayMode => DISPLAY_MODE_KEY,
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|slot| slot.key() == key)
    }
}
