//! Outcome records for a mirror run.
//!
//! Reports are informational only. Failures have already been logged by the
//! time they land here; the binary uses the totals for its closing summary.

use crate::coordinate::ArtefactCoordinate;
use crate::discovery::Discovery;
use std::fmt;

/// What happened to one file in one direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    /// The file was written to staging.
    Downloaded,
    /// The destination answered the upload with `status`.
    Uploaded {
        /// HTTP status code of the destination's response.
        status: u16,
    },
    /// Debug mode was on for this direction.
    Skipped,
    /// The transfer failed after reaching the server, or locally.
    Failed {
        /// Description of the failure.
        reason: String,
    },
    /// No HTTP response arrived.
    Unreachable {
        /// Description of the failure.
        reason: String,
    },
}

impl FileOutcome {
    /// Return true for [`Failed`](Self::Failed) and [`Unreachable`](Self::Unreachable).
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. } | Self::Unreachable { .. })
    }
}

/// The outcome for one file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    /// File name relative to the artefact's version directory.
    pub name: String,
    /// What happened.
    pub outcome: FileOutcome,
}

impl FileReport {
    /// Pair a file name with its outcome.
    #[must_use]
    pub fn new(name: impl Into<String>, outcome: FileOutcome) -> Self {
        Self {
            name: name.into(),
            outcome,
        }
    }
}

/// Everything attempted for one artefact. Every artefact ends up here; there
/// is no aborted state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtefactReport {
    /// The artefact that was mirrored.
    pub coordinate: ArtefactCoordinate,
    /// The file names and where they came from.
    pub discovery: Discovery,
    /// One entry per discovered name, in order.
    pub downloads: Vec<FileReport>,
    /// One entry per discovered name, in order; empty when the source was
    /// unreachable.
    pub uploads: Vec<FileReport>,
    /// True when the upload phase was skipped because nothing could be
    /// fetched from the source.
    pub source_unreachable: bool,
}

impl ArtefactReport {
    /// Count failed downloads and uploads.
    #[must_use]
    pub fn failures(&self) -> usize {
        self.downloads
            .iter()
            .chain(&self.uploads)
            .filter(|file| file.outcome.is_failure())
            .count()
    }

    /// Return the names whose upload was attempted or logged.
    #[must_use]
    pub fn uploaded_names(&self) -> Vec<&str> {
        self.uploads.iter().map(|file| file.name.as_str()).collect()
    }
}

/// All artefact reports of a run, in configuration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Per-artefact reports.
    pub artefacts: Vec<ArtefactReport>,
}

impl RunReport {
    /// Count failed transfers across every artefact.
    #[must_use]
    pub fn failures(&self) -> usize {
        self.artefacts.iter().map(ArtefactReport::failures).sum()
    }

    fn count(
        &self,
        select: impl Fn(&ArtefactReport) -> &[FileReport],
        wanted: fn(&FileOutcome) -> bool,
    ) -> usize {
        self.artefacts
            .iter()
            .flat_map(|artefact| select(artefact).iter())
            .filter(|file| wanted(&file.outcome))
            .count()
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let downloaded = self.count(
            |artefact| artefact.downloads.as_slice(),
            |outcome| matches!(outcome, FileOutcome::Downloaded),
        );
        let uploaded = self.count(
            |artefact| artefact.uploads.as_slice(),
            |outcome| matches!(outcome, FileOutcome::Uploaded { .. }),
        );
        write!(
            f,
            "{} artefact(s) processed: {downloaded} file(s) downloaded, {uploaded} uploaded, \
             {} failed",
            self.artefacts.len(),
            self.failures()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::{DiscoverySource, FallbackReason};

    fn report(downloads: Vec<FileReport>, uploads: Vec<FileReport>) -> ArtefactReport {
        ArtefactReport {
            coordinate: ArtefactCoordinate::new("com.example", "foo", "1.0"),
            discovery: Discovery {
                names: vec!["foo-1.0.jar".to_owned(), "foo-1.0.aar".to_owned()],
                source: DiscoverySource::Fallback(FallbackReason::NoMatchingLinks),
            },
            downloads,
            uploads,
            source_unreachable: false,
        }
    }

    #[test]
    fn failures_count_both_directions() {
        let artefact = report(
            vec![
                FileReport::new("foo-1.0.jar", FileOutcome::Downloaded),
                FileReport::new(
                    "foo-1.0.aar",
                    FileOutcome::Failed {
                        reason: "failed to download file: 404 Not Found".to_owned(),
                    },
                ),
            ],
            vec![
                FileReport::new("foo-1.0.jar", FileOutcome::Uploaded { status: 201 }),
                FileReport::new(
                    "foo-1.0.aar",
                    FileOutcome::Failed {
                        reason: "failed to read staged file".to_owned(),
                    },
                ),
            ],
        );
        assert_eq!(artefact.failures(), 2);
        assert_eq!(artefact.uploaded_names(), ["foo-1.0.jar", "foo-1.0.aar"]);
    }

    #[test]
    fn summary_totals_outcomes() {
        let run = RunReport {
            artefacts: vec![report(
                vec![
                    FileReport::new("foo-1.0.jar", FileOutcome::Downloaded),
                    FileReport::new("foo-1.0.aar", FileOutcome::Skipped),
                ],
                vec![FileReport::new(
                    "foo-1.0.jar",
                    FileOutcome::Unreachable {
                        reason: "connection refused".to_owned(),
                    },
                )],
            )],
        };
        assert_eq!(
            run.to_string(),
            "1 artefact(s) processed: 1 file(s) downloaded, 0 uploaded, 1 failed"
        );
    }
}
