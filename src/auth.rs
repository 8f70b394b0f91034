//! Authentication header resolution for repository endpoints.

use crate::config::Endpoint;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use thiserror::Error;

/// Name of the standard header used for basic and bearer credentials.
pub const AUTHORIZATION: &str = "Authorization";

/// A resolved HTTP header carrying an endpoint's credentials.
///
/// Built once per request from an [`Endpoint`] and never mutated.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthHeader {
    name: String,
    value: String,
}

impl AuthHeader {
    /// Create a header from its name and value.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Return the header name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Return the header value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl std::fmt::Debug for AuthHeader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthHeader")
            .field("name", &self.name)
            .field("value", &"<redacted>")
            .finish()
    }
}

/// The raw `auth_header` string cannot be split into a name and value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("auth header must be in \"name:value\" form")]
pub struct MalformedHeader;

/// Derive the authentication header for an endpoint.
///
/// Credential forms are tried in a fixed order and the first present one
/// wins: user and password, then token, then the raw header string. The
/// raw string is split on its first `:` and used verbatim.
///
/// # Errors
///
/// Returns [`MalformedHeader`] when the raw header has no `:` or an empty
/// name.
///
/// # Examples
///
/// ```
/// use artefact_mirror::auth::resolve_auth_header;
/// use artefact_mirror::config::Endpoint;
///
/// let endpoint = Endpoint::new("https://repo.example").with_token("abc");
/// let header = resolve_auth_header(&endpoint)
///     .expect("well-formed credentials")
///     .expect("a token is configured");
/// assert_eq!(header.name(), "Authorization");
/// assert_eq!(header.value(), "Bearer abc");
/// ```
pub fn resolve_auth_header(endpoint: &Endpoint) -> Result<Option<AuthHeader>, MalformedHeader> {
    if let (Some(user), Some(password)) = (&endpoint.user, &endpoint.password) {
        let encoded = STANDARD.encode(format!("{user}:{password}"));
        return Ok(Some(AuthHeader::new(AUTHORIZATION, format!("Basic {encoded}"))));
    }
    if let Some(token) = &endpoint.token {
        return Ok(Some(AuthHeader::new(AUTHORIZATION, format!("Bearer {token}"))));
    }
    let Some(raw) = &endpoint.auth_header else {
        return Ok(None);
    };
    match raw.split_once(':') {
        Some((name, value)) if !name.is_empty() => Ok(Some(AuthHeader::new(name, value))),
        _ => Err(MalformedHeader),
    }
}
