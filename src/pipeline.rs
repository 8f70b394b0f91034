//! Per-artefact mirror orchestration.
//!
//! Each artefact goes through the same two phases, with no retries:
//!
//! 1. discover its files on the source and download each one into staging;
//! 2. upload every discovered name from staging to the destination, including
//!    names whose download failed, so that the failure shows up again there.
//!
//! Failures are contained at the smallest scope. A failed file is logged and
//! the next file is attempted; every artefact is processed regardless of how
//! its predecessors fared.

use crate::auth::{AuthHeader, resolve_auth_header};
use crate::config::{Config, Endpoint, TransferSettings};
use crate::coordinate::{ArtefactCoordinate, join_url};
use crate::discovery::{Discovery, LinkDiscoverer};
use crate::error::Result;
use crate::report::{ArtefactReport, FileOutcome, FileReport, RunReport};
use crate::staging::staged_path;
use crate::transport::{FileTransporter, RepositoryClient, Transfer, TransferError};
use camino::Utf8Path;
use log::{debug, info, warn};

/// Mirrors artefacts from the download endpoint to the upload endpoint.
pub struct MirrorPipeline<'a> {
    client: &'a dyn RepositoryClient,
    settings: &'a TransferSettings,
    download: &'a Endpoint,
    upload: &'a Endpoint,
    staging_root: &'a Utf8Path,
}

impl<'a> MirrorPipeline<'a> {
    /// Create a pipeline for `config`, staging files under `staging_root`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when either endpoint is unusable. This
    /// happens before any request is made.
    pub fn new(
        config: &'a Config,
        client: &'a dyn RepositoryClient,
        staging_root: &'a Utf8Path,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            client,
            settings: &config.settings,
            download: &config.download,
            upload: &config.upload,
            staging_root,
        })
    }

    /// Mirror every coordinate in order.
    #[must_use]
    pub fn run(&self, coordinates: &[ArtefactCoordinate]) -> RunReport {
        RunReport {
            artefacts: coordinates
                .iter()
                .map(|coordinate| self.mirror(coordinate))
                .collect(),
        }
    }

    /// Mirror one artefact through both phases.
    #[must_use]
    pub fn mirror(&self, coordinate: &ArtefactCoordinate) -> ArtefactReport {
        let (discovery, downloads) = self.discover_and_download(coordinate);

        let source_unreachable = discovery.source_unreachable()
            && downloads
                .iter()
                .all(|file| matches!(file.outcome, FileOutcome::Unreachable { .. }));
        let uploads = if source_unreachable {
            warn!("Source unreachable for {coordinate}; skipping upload");
            Vec::new()
        } else {
            self.upload_all(coordinate, &downloads)
        };

        ArtefactReport {
            coordinate: coordinate.clone(),
            discovery,
            downloads,
            uploads,
            source_unreachable,
        }
    }

    fn discover_and_download(
        &self,
        coordinate: &ArtefactCoordinate,
    ) -> (Discovery, Vec<FileReport>) {
        let repository_path = format!("{}/", coordinate.repository_path());
        let base_url = join_url(&self.download.url, &repository_path);
        info!("Downloading artefact {coordinate} from {base_url}");

        let discovery = LinkDiscoverer::new(self.client, self.settings).discover(
            &base_url,
            endpoint_auth(self.download),
            coordinate,
        );

        let transporter = FileTransporter::new(self.client, self.settings);
        let downloads = discovery
            .names
            .iter()
            .map(|name| {
                let url = format!("{base_url}{name}");
                let destination = staged_path(self.staging_root, coordinate, name);
                let outcome = match transporter.download(
                    &url,
                    &destination,
                    endpoint_auth(self.download),
                ) {
                    Ok(Transfer::Skipped) => FileOutcome::Skipped,
                    Ok(_) => {
                        info!("Downloaded {name}");
                        FileOutcome::Downloaded
                    }
                    Err(err) => {
                        warn!("No {name} downloaded from {url}: {err}");
                        failure(&err)
                    }
                };
                FileReport::new(name.as_str(), outcome)
            })
            .collect();

        (discovery, downloads)
    }

    fn upload_all(
        &self,
        coordinate: &ArtefactCoordinate,
        downloads: &[FileReport],
    ) -> Vec<FileReport> {
        let base_url = join_url(&self.upload.url, &coordinate.repository_path());
        info!("Uploading artefact {coordinate} to {base_url}");

        let transporter = FileTransporter::new(self.client, self.settings);
        downloads
            .iter()
            .map(|download| {
                let name = download.name.as_str();
                let url = format!("{base_url}/{name}");
                let source = staged_path(self.staging_root, coordinate, name);
                if download.outcome.is_failure() {
                    debug!("Uploading {name} although its download failed");
                }

                let result = transporter.upload(&url, &source, endpoint_auth(self.upload));
                let outcome = match result {
                    Ok(Transfer::Uploaded(receipt)) => {
                        debug!("Response from {url}: {} {}", receipt.status, receipt.body);
                        if !receipt.is_success() {
                            warn!(
                                "{url} answered {} for {name}; the upload is counted as complete",
                                receipt.status
                            );
                        }
                        FileOutcome::Uploaded {
                            status: receipt.status,
                        }
                    }
                    Ok(_) => FileOutcome::Skipped,
                    Err(err) => {
                        warn!("Error uploading file {source} to {url}: {err}");
                        failure(&err)
                    }
                };
                FileReport::new(name, outcome)
            })
            .collect()
    }
}

/// Resolve the header for one request. Endpoints were validated in
/// [`MirrorPipeline::new`], so a malformed header cannot reach this point.
fn endpoint_auth(endpoint: &Endpoint) -> Option<AuthHeader> {
    resolve_auth_header(endpoint).ok().flatten()
}

fn failure(err: &TransferError) -> FileOutcome {
    let reason = err.to_string();
    if err.is_transport() {
        FileOutcome::Unreachable { reason }
    } else {
        FileOutcome::Failed { reason }
    }
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
