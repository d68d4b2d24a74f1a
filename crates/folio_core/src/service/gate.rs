//! Passphrase prompt in front of the editor.
//!
//! This is cosmetic gating, NOT a security control: the passphrase ships
//! with the client and anyone able to read the binary or config can see it.
//! Nothing here authenticates or authorizes the operator. Real access
//! control would need server-side credential verification.

use super::editor::{Editor, EditorError};
use crate::repo::content_repo::ContentRepository;
use crate::store::KeyValueStore;
use log::{info, warn};

/// Built-in passphrase used when configuration does not override it.
pub const DEFAULT_ADMIN_PASSPHRASE: &str = "folio-admin";

/// Cosmetic passphrase check guarding the editor surface.
#[derive(Debug, Clone)]
pub struct AdminGate {
    passphrase: String,
}

impl AdminGate {
    pub fn new(passphrase: impl Into<String>) -> Self {
        Self {
            passphrase: passphrase.into(),
        }
    }

    pub fn check(&self, attempt: &str) -> bool {
        attempt == self.passphrase
    }

    /// Opens the editor when `attempt` matches.
    pub fn unlock<'repo, S: KeyValueStore>(
        &self,
        attempt: &str,
        repo: &'repo ContentRepository<S>,
    ) -> Result<Editor<'repo, S>, EditorError> {
        if !self.check(attempt) {
            warn!("event=admin_unlock module=gate status=denied");
            return Err(EditorError::AccessDenied);
        }
        info!("event=admin_unlock module=gate status=ok");
        Ok(Editor::open(repo))
    }
}

impl Default for AdminGate {
    fn default() -> Self {
        Self::new(DEFAULT_ADMIN_PASSPHRASE)
    }
}
