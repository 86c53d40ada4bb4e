//! JSON file persistence and well-known paths for the strato CLI.
//!
//! Every command that talks to the platform mirrors its results into local
//! JSON files so later invocations can answer from disk. This crate owns the
//! read/write helpers and the layout of the `.strato` directories (one global
//! under the home dir, one per project under the working dir).

use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use directories::BaseDirs;
use serde::{Serialize, de::DeserializeOwned};

/// Name of the hidden strato directory, both global and per-project.
pub const APP_DIR: &str = ".strato";

/// Global list of project directories set up on this machine.
pub const ACTIVE_PROJECTS_FILE: &str = "active_projects.json";

/// Per-project mirror of the remote project record.
pub const PROJECTS_FILE: &str = "projects.json";

/// Per-project mirror of the remote endpoint records.
pub const ENDPOINTS_FILE: &str = "endpoints.json";

#[derive(Debug, thiserror::Error)]
pub enum FilesError {
    /// The file does not exist. Distinguished from other I/O failures so
    /// callers can attach their own remedy (e.g. "run `strato login`").
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    #[error("could not determine the user home directory")]
    NoHomeDir,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("malformed JSON in {path}: {source}")]
    Malformed {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Global strato directory: `~/.strato`.
pub fn app_dir() -> Result<PathBuf, FilesError> {
    let base = BaseDirs::new().ok_or(FilesError::NoHomeDir)?;
    Ok(base.home_dir().join(APP_DIR))
}

/// Path of the global active-projects list: `~/.strato/active_projects.json`.
pub fn active_projects_path() -> Result<PathBuf, FilesError> {
    Ok(app_dir()?.join(ACTIVE_PROJECTS_FILE))
}

/// Per-project strato directory under the current working directory.
pub fn local_app_dir() -> Result<PathBuf, FilesError> {
    Ok(std::env::current_dir()?.join(APP_DIR))
}

/// Path of the local project mirror: `<cwd>/.strato/projects.json`.
pub fn local_projects_path() -> Result<PathBuf, FilesError> {
    Ok(local_app_dir()?.join(PROJECTS_FILE))
}

/// Path of the local endpoints mirror: `<cwd>/.strato/endpoints.json`.
pub fn local_endpoints_path() -> Result<PathBuf, FilesError> {
    Ok(local_app_dir()?.join(ENDPOINTS_FILE))
}

/// Read and deserialize a JSON file.
///
/// A missing file surfaces as [`FilesError::NotFound`]; a file that exists
/// but does not parse surfaces as [`FilesError::Malformed`].
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, FilesError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(FilesError::NotFound(path.to_path_buf()));
        },
        Err(e) => return Err(e.into()),
    };

    serde_json::from_slice(&bytes).map_err(|source| FilesError::Malformed {
        path: path.to_path_buf(),
        source,
    })
}

/// Serialize a value to JSON and write it to `path`, creating parent
/// directories as needed and fully replacing any prior content.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), FilesError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let bytes = serde_json::to_vec(value).map_err(|source| FilesError::Malformed {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, bytes)?;

    tracing::debug!(path = %path.display(), "wrote JSON file");
    Ok(())
}

/// Remove a file. A file that is already gone is not an error.
pub fn delete_file(path: &Path) -> Result<(), FilesError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Whether `path` exists and is a regular file.
pub fn exists(path: &Path) -> bool {
    path.is_file()
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    use super::*;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Sample {
        name: String,
        count: u32,
    }

    #[test]
    fn test_write_then_read_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("sample.json");

        let value = Sample {
            name: "hello".into(),
            count: 3,
        };
        write_json(&path, &value).unwrap();

        let loaded: Sample = read_json(&path).unwrap();
        assert_eq!(loaded, value);
    }

    #[test]
    fn test_write_fully_replaces_previous_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.json");

        write_json(&path, &vec!["a", "b", "c"]).unwrap();
        write_json(&path, &vec!["d"]).unwrap();

        let loaded: Vec<String> = read_json(&path).unwrap();
        assert_eq!(loaded, vec!["d".to_string()]);
    }

    #[test]
    fn test_read_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");

        let err = read_json::<Sample>(&path).unwrap_err();
        assert!(matches!(err, FilesError::NotFound(_)));
    }

    #[test]
    fn test_read_corrupt_file_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, b"{not json").unwrap();

        let err = read_json::<Sample>(&path).unwrap_err();
        assert!(matches!(err, FilesError::Malformed { .. }));
    }

    #[test]
    fn test_delete_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.json");

        write_json(&path, &1u32).unwrap();
        assert!(exists(&path));

        delete_file(&path).unwrap();
        assert!(!exists(&path));

        // Deleting again must not fail.
        delete_file(&path).unwrap();
    }
}
