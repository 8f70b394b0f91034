//! Artefact coordinates and their repository layout.
//!
//! A coordinate maps to the same relative path on the source repository,
//! in the staging directory, and on the destination repository:
//! `<group as path>/<artifact>/<version>`.

use crate::config::scalar_string;
use serde::Deserialize;
use std::fmt;

/// The group/artifact/version triple identifying one artefact.
///
/// # Examples
///
/// ```
/// use artefact_mirror::coordinate::ArtefactCoordinate;
///
/// let coordinate = ArtefactCoordinate::new("com.example.tools", "foo", "1.0.0");
/// assert_eq!(coordinate.repository_path(), "com/example/tools/foo/1.0.0");
/// assert_eq!(coordinate.to_string(), "com.example.tools:foo:1.0.0");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
pub struct ArtefactCoordinate {
    #[serde(deserialize_with = "scalar_string")]
    group_id: String,
    #[serde(deserialize_with = "scalar_string")]
    artifact_id: String,
    #[serde(deserialize_with = "scalar_string")]
    version: String,
}

impl ArtefactCoordinate {
    /// Create a coordinate from its three components.
    #[must_use]
    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            version: version.into(),
        }
    }

    /// Return the dot-separated group identifier.
    #[must_use]
    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    /// Return the artefact identifier.
    #[must_use]
    pub fn artifact_id(&self) -> &str {
        &self.artifact_id
    }

    /// Return the version string.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Return the repository-relative directory for this coordinate.
    ///
    /// Dots in the group become path separators. No leading or trailing
    /// slash is included.
    #[must_use]
    pub fn repository_path(&self) -> String {
        format!(
            "{}/{}/{}",
            self.group_id.replace('.', "/"),
            self.artifact_id,
            self.version
        )
    }

    /// Return `<artifact>-<version>`, the stem shared by conventional file names.
    #[must_use]
    pub fn file_stem(&self) -> String {
        format!("{}-{}", self.artifact_id, self.version)
    }
}

impl fmt::Display for ArtefactCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group_id, self.artifact_id, self.version)
    }
}

/// Join a repository base URL and a relative path with exactly one `/`.
///
/// Leading and trailing slashes on the base are trimmed first, so
/// `https://repo/` and `https://repo` behave the same.
#[must_use]
pub fn join_url(base: &str, relative: &str) -> String {
    format!("{}/{}", base.trim_matches('/'), relative.trim_start_matches('/'))
}
