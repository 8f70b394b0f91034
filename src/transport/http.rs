//! `ureq`-backed repository client.

use super::multipart::MultipartForm;
use super::{RepositoryClient, TransferError, UploadReceipt};
use crate::auth::AuthHeader;
use crate::config::UploadMethod;
use camino::Utf8Path;
use log::{debug, warn};
use std::fs;
use std::io;
use ureq::http::StatusCode;

/// Blocking HTTP client shared by every transfer in a run.
///
/// Status codes are inspected by the caller, so the agent is configured not
/// to turn 4xx/5xx responses into errors.
///
/// # Examples
///
/// ```
/// use artefact_mirror::transport::http::HttpClient;
///
/// let client = HttpClient::new();
/// // Pass `&client` wherever a `&dyn RepositoryClient` is expected.
/// # let _ = client;
/// ```
pub struct HttpClient {
    agent: ureq::Agent,
}

impl HttpClient {
    /// Create a client with a fresh connection pool.
    #[must_use]
    pub fn new() -> Self {
        let config = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build();
        Self {
            agent: ureq::Agent::new_with_config(config),
        }
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl RepositoryClient for HttpClient {
    fn fetch_listing(&self, url: &str, auth: Option<AuthHeader>) -> Result<String, TransferError> {
        debug!("GET {url}{}", describe_auth(auth.as_ref()));
        let response = with_auth(self.agent.get(url), auth.as_ref())
            .call()
            .map_err(|e| http_error(url, &e))?;
        let status = response.status();
        if !status.is_success() {
            return Err(TransferError::ListingStatus {
                url: url.to_owned(),
                status: status.to_string(),
            });
        }
        response
            .into_body()
            .read_to_string()
            .map_err(|e| http_error(url, &e))
    }

    fn download(
        &self,
        url: &str,
        auth: Option<AuthHeader>,
        destination: &Utf8Path,
    ) -> Result<(), TransferError> {
        remove_stale(destination)?;

        debug!("GET {url}{}", describe_auth(auth.as_ref()));
        let response = with_auth(self.agent.get(url), auth.as_ref())
            .call()
            .map_err(|e| http_error(url, &e))?;

        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent).map_err(|e| TransferError::io(parent, e))?;
        }
        // Created before the status check: a failed download leaves an empty file.
        let mut file =
            fs::File::create(destination).map_err(|e| TransferError::io(destination, e))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(TransferError::DownloadStatus {
                url: url.to_owned(),
                status: status.to_string(),
            });
        }

        io::copy(&mut response.into_body().as_reader(), &mut file)
            .map_err(|e| TransferError::io(destination, e))?;
        Ok(())
    }

    fn upload(
        &self,
        url: &str,
        auth: Option<AuthHeader>,
        source: &Utf8Path,
        method: UploadMethod,
    ) -> Result<UploadReceipt, TransferError> {
        let contents = fs::read(source).map_err(|e| TransferError::io(source, e))?;
        let file_name = source.file_name().unwrap_or("file");
        let form = MultipartForm::with_file("file", file_name, &contents);
        let content_type = form.content_type();

        debug!(
            "{method} {url} ({} bytes){}",
            contents.len(),
            describe_auth(auth.as_ref())
        );
        let request = match method {
            UploadMethod::Post => self.agent.post(url),
            UploadMethod::Put => self.agent.put(url),
        };
        let response = with_auth(request, auth.as_ref())
            .header("Content-Type", content_type.as_str())
            .send(form.body())
            .map_err(|e| http_error(url, &e))?;

        // The upload has completed; an unreadable body is logged and dropped.
        let status = response.status().as_u16();
        let body = response.into_body().read_to_vec().map_or_else(
            |err| {
                warn!("Could not read the response body from {url}: {err}");
                String::new()
            },
            |bytes| String::from_utf8_lossy(&bytes).into_owned(),
        );
        Ok(UploadReceipt { status, body })
    }
}

fn with_auth<B>(
    request: ureq::RequestBuilder<B>,
    auth: Option<&AuthHeader>,
) -> ureq::RequestBuilder<B> {
    let Some(header) = auth else {
        return request;
    };
    request.header(header.name(), header.value())
}

fn describe_auth(auth: Option<&AuthHeader>) -> String {
    auth.map(|header| format!(" with {} header", header.name()))
        .unwrap_or_default()
}

/// Remove a file left by an earlier run so no stale content survives.
fn remove_stale(path: &Utf8Path) -> Result<(), TransferError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(TransferError::io(path, e)),
    }
}

fn http_error(url: &str, err: &ureq::Error) -> TransferError {
    TransferError::Http {
        url: url.to_owned(),
        reason: err.to_string(),
    }
}
