//! Error types for configuring a mirror run.
//!
//! Everything in this module is fatal: a [`MirrorError`] is raised before
//! any network activity and stops the run. Per-file transfer failures live in
//! [`crate::transport::TransferError`] and never escalate this far.

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors that prevent a mirror run from starting.
#[derive(Debug, Error)]
pub enum MirrorError {
    /// The configuration file could not be read.
    #[error("failed to read configuration {path}")]
    ConfigRead {
        /// Path of the configuration file.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration document is not valid YAML for the expected schema.
    #[error("invalid configuration: {0}")]
    ConfigParse(#[from] serde_yaml::Error),

    /// An endpoint has no base URL.
    #[error("{endpoint} endpoint has no url")]
    MissingUrl {
        /// Which endpoint is affected (`download` or `upload`).
        endpoint: &'static str,
    },

    /// A raw `auth_header` value is not in `name:value` form.
    #[error("{endpoint} endpoint auth_header must be in \"name:value\" form")]
    MalformedAuthHeader {
        /// Which endpoint is affected (`download` or `upload`).
        endpoint: &'static str,
    },

    /// The staging directory could not be created or used.
    #[error("staging directory {path} is unusable: {reason}")]
    Staging {
        /// Path of the staging directory.
        path: Utf8PathBuf,
        /// Description of the failure.
        reason: String,
    },
}

/// Result type alias using [`MirrorError`].
pub type Result<T> = std::result::Result<T, MirrorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_auth_header_names_endpoint() {
        let err = MirrorError::MalformedAuthHeader { endpoint: "upload" };
        let msg = err.to_string();
        assert!(msg.contains("upload"));
        assert!(msg.contains("name:value"));
    }

    #[test]
    fn config_read_preserves_source() {
        let err = MirrorError::ConfigRead {
            path: Utf8PathBuf::from("mirror.yaml"),
            source: std::io::Error::other("permission denied"),
        };
        assert!(err.to_string().contains("mirror.yaml"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn missing_url_names_endpoint() {
        let err = MirrorError::MissingUrl {
            endpoint: "download",
        };
        assert_eq!(err.to_string(), "download endpoint has no url");
    }
}
