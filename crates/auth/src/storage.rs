//! Persistence for the identity credential.

use std::path::{Path, PathBuf};

use strato_files::FilesError;

use crate::{error::AuthError, types::OauthToken};

/// File name under the global strato directory.
pub const CREDENTIALS_FILE: &str = "credentials.json";

/// Stores at most one token per machine, fully replaced on every save.
///
/// No file locking: concurrent CLI invocations may race on this file. For a
/// single-user developer tool that is a documented limitation, not a bug we
/// guard against.
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    /// Store at the default location, `~/.strato/credentials.json`.
    pub fn new() -> Result<Self, AuthError> {
        let dir = strato_files::app_dir().map_err(AuthError::Storage)?;
        Ok(Self::at(&dir))
    }

    /// Store under an explicit directory.
    pub fn at(dir: &Path) -> Self {
        Self {
            path: dir.join(CREDENTIALS_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Persist `token`, creating parent directories as needed and fully
    /// overwriting any prior content.
    pub fn save(&self, token: &OauthToken) -> Result<(), AuthError> {
        strato_files::write_json(&self.path, token).map_err(AuthError::Storage)
    }

    /// Reload the persisted token.
    ///
    /// A missing file is [`AuthError::CredentialsNotFound`]; a file that no
    /// longer parses is [`AuthError::CredentialsInvalid`]. Both direct the
    /// user to `strato login` — no recovery is attempted.
    pub fn load(&self) -> Result<OauthToken, AuthError> {
        match strato_files::read_json(&self.path) {
            Ok(token) => Ok(token),
            Err(FilesError::NotFound(_)) => Err(AuthError::CredentialsNotFound),
            Err(FilesError::Malformed { .. }) => Err(AuthError::CredentialsInvalid),
            Err(e) => Err(AuthError::Storage(e)),
        }
    }

    /// Remove the credential. Missing file is fine.
    pub fn clear(&self) -> Result<(), AuthError> {
        strato_files::delete_file(&self.path).map_err(AuthError::Storage)
    }
}
