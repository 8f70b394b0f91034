//! Local staging directory between download and upload.
//!
//! Files land at `<root>/<group as path>/<artifact>/<version>/<name>`. A
//! configured `artifacts_path` is kept after the run; otherwise the area is
//! a temporary directory removed when the [`StagingArea`] is closed or
//! dropped.

use crate::config::TransferSettings;
use crate::coordinate::ArtefactCoordinate;
use crate::error::{MirrorError, Result};
use camino::{Utf8Path, Utf8PathBuf};
use log::debug;
use std::fs;
use tempfile::TempDir;

/// File written and removed to check that a persistent root is writable.
const WRITE_CHECK: &str = ".artefact-mirror-write-check";

/// The staging directory for one run.
#[derive(Debug)]
pub struct StagingArea {
    root: Utf8PathBuf,
    transient: Option<TempDir>,
}

impl StagingArea {
    /// Prepare the staging area described by `settings`.
    ///
    /// # Errors
    ///
    /// Returns [`MirrorError::Staging`] when the directory cannot be created
    /// or written to.
    pub fn prepare(settings: &TransferSettings) -> Result<Self> {
        settings
            .artifacts_path
            .as_ref()
            .map_or_else(Self::transient, |path| Self::persistent(path.clone()))
    }

    /// Use `root` as a staging directory that outlives the run.
    ///
    /// # Errors
    ///
    /// Returns [`MirrorError::Staging`] when the directory cannot be created
    /// or written to.
    pub fn persistent(root: Utf8PathBuf) -> Result<Self> {
        fs::create_dir_all(&root).map_err(|e| MirrorError::Staging {
            path: root.clone(),
            reason: e.to_string(),
        })?;

        let marker = root.join(WRITE_CHECK);
        if let Err(e) = fs::write(&marker, b"") {
            return Err(MirrorError::Staging {
                path: root,
                reason: e.to_string(),
            });
        }
        if let Err(e) = fs::remove_file(&marker) {
            debug!("could not remove staging write check {marker}: {e}");
        }
        Ok(Self {
            root,
            transient: None,
        })
    }

    /// Create a temporary staging directory.
    ///
    /// # Errors
    ///
    /// Returns [`MirrorError::Staging`] when the directory cannot be created
    /// or its path is not valid UTF-8.
    pub fn transient() -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix("artefact-mirror-")
            .tempdir()
            .map_err(|e| MirrorError::Staging {
                path: Utf8PathBuf::from(std::env::temp_dir().to_string_lossy().into_owned()),
                reason: e.to_string(),
            })?;
        let root = Utf8PathBuf::try_from(dir.path().to_path_buf()).map_err(|e| {
            MirrorError::Staging {
                path: Utf8PathBuf::from(e.as_path().to_string_lossy().into_owned()),
                reason: "path is not valid UTF-8".to_owned(),
            }
        })?;
        Ok(Self {
            root,
            transient: Some(dir),
        })
    }

    /// Return the staging root.
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Return true when the directory is removed at the end of the run.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        self.transient.is_some()
    }

    /// Remove a transient staging directory now, reporting failures.
    ///
    /// Persistent directories are left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`MirrorError::Staging`] when the temporary directory cannot be
    /// removed.
    pub fn close(self) -> Result<()> {
        let Some(dir) = self.transient else {
            return Ok(());
        };
        dir.close().map_err(|e| MirrorError::Staging {
            path: self.root,
            reason: e.to_string(),
        })
    }
}

/// Join `root` with the coordinate's repository path and `name`.
#[must_use]
pub fn staged_path(root: &Utf8Path, coordinate: &ArtefactCoordinate, name: &str) -> Utf8PathBuf {
    root.join(coordinate.repository_path()).join(name)
}
