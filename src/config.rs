//! Mirror configuration loaded from YAML.
//!
//! The document has four top-level keys: `settings`, `download`, `upload`
//! and `artifacts`. Everything except the two endpoint URLs is optional;
//! blank strings are treated the same as missing values so that templated
//! configuration files can leave credentials empty.

use crate::auth::resolve_auth_header;
use crate::coordinate::ArtefactCoordinate;
use crate::error::{MirrorError, Result};
use camino::{Utf8Path, Utf8PathBuf};
use serde::de::{self, Deserializer, Visitor};
use serde::Deserialize;
use std::fmt;

/// A complete mirror run description.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Behaviour flags shared by every transfer.
    pub settings: TransferSettings,
    /// Source repository.
    pub download: Endpoint,
    /// Destination repository.
    pub upload: Endpoint,
    /// Artefacts to mirror, in order.
    pub artifacts: Vec<ArtefactCoordinate>,
}

impl Config {
    /// Read and parse a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`MirrorError::ConfigRead`] when the file cannot be read and
    /// [`MirrorError::ConfigParse`] when it is not a valid document.
    pub fn load(path: &Utf8Path) -> Result<Self> {
        let contents =
            std::fs::read_to_string(path).map_err(|source| MirrorError::ConfigRead {
                path: path.to_owned(),
                source,
            })?;
        Self::from_yaml(&contents)
    }

    /// Parse a configuration document.
    ///
    /// # Errors
    ///
    /// Returns [`MirrorError::ConfigParse`] when the YAML is malformed or a
    /// field has the wrong type.
    ///
    /// # Examples
    ///
    /// ```
    /// use artefact_mirror::config::{Config, UploadMethod};
    ///
    /// let config = Config::from_yaml(concat!(
    ///     "settings: { upload_method: PUT }\n",
    ///     "download: { url: 'https://source.example/maven' }\n",
    ///     "upload: { url: 'https://dest.example/maven', token: abc }\n",
    ///     "artifacts:\n",
    ///     "  - { group_id: com.example, artifact_id: foo, version: 1.0.0 }\n",
    /// ))
    /// .expect("valid configuration");
    ///
    /// assert_eq!(config.settings.upload_method, UploadMethod::Put);
    /// assert_eq!(config.artifacts.len(), 1);
    /// ```
    pub fn from_yaml(contents: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(contents)?)
    }

    /// Check that both endpoints are usable before any network activity.
    ///
    /// # Errors
    ///
    /// Returns [`MirrorError::MissingUrl`] for an endpoint without a URL and
    /// [`MirrorError::MalformedAuthHeader`] for an unusable raw header.
    pub fn validate(&self) -> Result<()> {
        for (name, endpoint) in [("download", &self.download), ("upload", &self.upload)] {
            if endpoint.url.trim_matches('/').is_empty() {
                return Err(MirrorError::MissingUrl { endpoint: name });
            }
            resolve_auth_header(endpoint)
                .map_err(|_| MirrorError::MalformedAuthHeader { endpoint: name })?;
        }
        Ok(())
    }
}

/// HTTP method used to publish files to the destination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum UploadMethod {
    /// `POST` (the default).
    #[default]
    #[serde(rename = "POST", alias = "post")]
    Post,
    /// `PUT`.
    #[serde(rename = "PUT", alias = "put")]
    Put,
}

impl UploadMethod {
    /// Return the method name as sent on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Post => "POST",
            Self::Put => "PUT",
        }
    }
}

impl fmt::Display for UploadMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Flags controlling a run. Loaded once and read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TransferSettings {
    /// Log downloads instead of performing them.
    pub debug_download: bool,
    /// Log uploads instead of performing them.
    pub debug_upload: bool,
    /// Method for uploads.
    pub upload_method: UploadMethod,
    /// Persistent staging directory. A transient directory is used when unset.
    #[serde(deserialize_with = "optional_path")]
    pub artifacts_path: Option<Utf8PathBuf>,
    /// Do not transfer `-sources.jar` files.
    pub skip_sources: bool,
    /// Do not transfer `-javadoc.jar` files.
    pub skip_javadocs: bool,
}

/// A repository base URL plus credentials.
///
/// Only the first present credential form is used, in the order
/// user/password, token, raw header.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Endpoint {
    /// Repository base URL.
    pub url: String,
    /// Basic-auth user name.
    #[serde(deserialize_with = "optional_string")]
    pub user: Option<String>,
    /// Basic-auth password.
    #[serde(deserialize_with = "optional_string")]
    pub password: Option<String>,
    /// Bearer token.
    #[serde(deserialize_with = "optional_string")]
    pub token: Option<String>,
    /// Raw header in `name:value` form.
    #[serde(deserialize_with = "optional_string")]
    pub auth_header: Option<String>,
}

impl Endpoint {
    /// Create an endpoint without credentials.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Attach basic-auth credentials.
    #[must_use]
    pub fn with_basic(mut self, user: impl Into<String>, password: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self.password = Some(password.into());
        self
    }

    /// Attach a bearer token.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Attach a raw `name:value` header.
    #[must_use]
    pub fn with_auth_header(mut self, header: impl Into<String>) -> Self {
        self.auth_header = Some(header.into());
        self
    }
}

impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |value: &Option<String>| value.as_ref().map(|_| "<redacted>");
        let header_name = self
            .auth_header
            .as_deref()
            .map(|raw| raw.split_once(':').map_or("<malformed>", |(name, _)| name));
        f.debug_struct("Endpoint")
            .field("url", &self.url)
            .field("user", &self.user)
            .field("password", &redact(&self.password))
            .field("token", &redact(&self.token))
            .field("auth_header", &header_name)
            .finish()
    }
}

fn optional_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}

fn optional_path<'de, D>(deserializer: D) -> std::result::Result<Option<Utf8PathBuf>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = optional_string(deserializer)?;
    Ok(value.map(|raw| {
        let trimmed = raw.trim_end_matches('/');
        if trimmed.is_empty() {
            Utf8PathBuf::from("/")
        } else {
            Utf8PathBuf::from(trimmed)
        }
    }))
}

/// Deserialise a YAML scalar into a string.
///
/// Unquoted integers such as `2` are rendered back to text. Unquoted
/// decimals such as `1.0` are rejected: a float cannot reproduce the digits
/// that were written, so the value has to be quoted.
pub(crate) fn scalar_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    struct ScalarVisitor;

    impl Visitor<'_> for ScalarVisitor {
        type Value = String;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a string or integer")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<String, E> {
            Ok(v.to_owned())
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<String, E> {
            Err(E::invalid_type(
                de::Unexpected::Float(v),
                &"a quoted string (write \"1.0\", not 1.0, to keep every digit)",
            ))
        }
    }

    deserializer.deserialize_any(ScalarVisitor)
}
