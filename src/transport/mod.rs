//! Single-file transfers between repositories and the staging directory.
//!
//! The HTTP work sits behind [`RepositoryClient`] so that the discovery and
//! pipeline layers can be exercised without a network. [`FileTransporter`]
//! adds the per-direction dry-run switches on top of a client.
//!
//! # Sub-modules
//!
//! - [`http`] - `ureq`-backed [`RepositoryClient`] implementation.
//! - `multipart` - `multipart/form-data` body construction for uploads.

pub mod http;
mod multipart;

use crate::auth::AuthHeader;
use crate::config::{TransferSettings, UploadMethod};
use camino::{Utf8Path, Utf8PathBuf};
use log::info;

/// Errors arising from a single listing fetch, download, or upload.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    /// The request could not be sent or the response could not be read.
    #[error("request to {url} failed: {reason}")]
    Http {
        /// The URL that was requested.
        url: String,
        /// A human-readable description of the failure.
        reason: String,
    },

    /// A download answered with something other than `200 OK`.
    #[error("failed to download file: {status}")]
    DownloadStatus {
        /// The URL that was requested.
        url: String,
        /// Status line, e.g. `404 Not Found`.
        status: String,
    },

    /// A listing page answered with a non-success status.
    #[error("listing unavailable: {status}")]
    ListingStatus {
        /// The URL that was requested.
        url: String,
        /// Status line, e.g. `403 Forbidden`.
        status: String,
    },

    /// A local file could not be read, written, or removed.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// The local path involved.
        path: Utf8PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },
}

impl TransferError {
    /// Return true when the failure happened before any HTTP response arrived.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Http { .. })
    }

    pub(crate) fn io(path: &Utf8Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_owned(),
            source,
        }
    }
}

/// What the destination said about an upload.
///
/// The status is informational: an upload counts as done once the request
/// completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReceipt {
    /// HTTP status code of the response.
    pub status: u16,
    /// Response body as text.
    pub body: String,
}

impl UploadReceipt {
    /// Return true when the destination answered with a 2xx status.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self.status, 200..=299)
    }
}

/// HTTP operations against a package repository.
///
/// Each call builds one request and attaches `auth` when present.
#[cfg_attr(test, mockall::automock)]
pub trait RepositoryClient {
    /// GET a directory listing page and return its body.
    ///
    /// # Errors
    ///
    /// Returns [`TransferError::Http`] on transport failure and
    /// [`TransferError::ListingStatus`] on a non-2xx response.
    fn fetch_listing(&self, url: &str, auth: Option<AuthHeader>) -> Result<String, TransferError>;

    /// GET `url` into `destination`, replacing any existing file.
    ///
    /// # Errors
    ///
    /// Returns [`TransferError::DownloadStatus`] for a status other than 200,
    /// in which case an empty file is left at `destination`.
    fn download(
        &self,
        url: &str,
        auth: Option<AuthHeader>,
        destination: &Utf8Path,
    ) -> Result<(), TransferError>;

    /// Send `source` to `url` as a multipart form field named `file`.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be read or the request does not
    /// complete. A non-2xx response is not an error.
    fn upload(
        &self,
        url: &str,
        auth: Option<AuthHeader>,
        source: &Utf8Path,
        method: UploadMethod,
    ) -> Result<UploadReceipt, TransferError>;
}

/// The result of a transfer that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transfer {
    /// The file was downloaded.
    Downloaded,
    /// The file was uploaded and the destination answered.
    Uploaded(UploadReceipt),
    /// Debug mode was on; nothing was sent or written.
    Skipped,
}

/// Downloads and uploads single files, honouring the debug switches.
pub struct FileTransporter<'a> {
    client: &'a dyn RepositoryClient,
    settings: &'a TransferSettings,
}

impl<'a> FileTransporter<'a> {
    /// Create a transporter over `client` using the run's settings.
    #[must_use]
    pub const fn new(client: &'a dyn RepositoryClient, settings: &'a TransferSettings) -> Self {
        Self { client, settings }
    }

    /// Download one file.
    ///
    /// With `debug_download` set the transfer is only logged.
    ///
    /// # Errors
    ///
    /// Propagates the client's [`TransferError`].
    pub fn download(
        &self,
        url: &str,
        destination: &Utf8Path,
        auth: Option<AuthHeader>,
    ) -> Result<Transfer, TransferError> {
        info!("Downloading file from {url} to {destination}");
        if self.settings.debug_download {
            return Ok(Transfer::Skipped);
        }
        self.client.download(url, auth, destination)?;
        Ok(Transfer::Downloaded)
    }

    /// Upload one file with the configured method.
    ///
    /// With `debug_upload` set the transfer is only logged.
    ///
    /// # Errors
    ///
    /// Propagates the client's [`TransferError`].
    pub fn upload(
        &self,
        url: &str,
        source: &Utf8Path,
        auth: Option<AuthHeader>,
    ) -> Result<Transfer, TransferError> {
        let method = self.settings.upload_method;
        info!("Uploading file from {source} to {url} ({method})");
        if self.settings.debug_upload {
            return Ok(Transfer::Skipped);
        }
        let receipt = self.client.upload(url, auth, source, method)?;
        Ok(Transfer::Uploaded(receipt))
    }
}
