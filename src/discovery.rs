//! File discovery for one artefact version directory.
//!
//! Repositories that serve an HTML index for
//! `<group>/<artifact>/<version>/` are scanned for hyperlinks; everything
//! else gets the conventional Maven file names for the coordinate.

use crate::auth::AuthHeader;
use crate::config::TransferSettings;
use crate::coordinate::ArtefactCoordinate;
use crate::transport::{RepositoryClient, TransferError};
use log::{debug, info, trace, warn};
use regex::Regex;
use std::sync::LazyLock;

const PACKAGING_MARKERS: [&str; 3] = [".jar", ".aar", ".pom"];
const SOURCES_SUFFIX: &str = "-sources.jar";
const JAVADOC_SUFFIX: &str = "-javadoc.jar";

/// Where the discovered file names came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscoverySource {
    /// Hyperlinks on the repository's listing page.
    Listing,
    /// The conventional name set, for the given reason.
    Fallback(FallbackReason),
}

/// Why the listing page could not be used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackReason {
    /// The page was fetched but held no matching links.
    NoMatchingLinks,
    /// The repository answered with a non-success status.
    ListingUnavailable(String),
    /// No HTTP response arrived at all.
    SourceUnreachable(String),
}

/// The file names to transfer for one artefact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discovery {
    /// Relative file names in discovery order.
    pub names: Vec<String>,
    /// How the names were obtained.
    pub source: DiscoverySource,
}

impl Discovery {
    /// Return true when the names are the conventional fallback set.
    #[must_use]
    pub const fn is_fallback(&self) -> bool {
        matches!(self.source, DiscoverySource::Fallback(_))
    }

    /// Return true when the listing request got no HTTP response.
    #[must_use]
    pub const fn source_unreachable(&self) -> bool {
        matches!(
            self.source,
            DiscoverySource::Fallback(FallbackReason::SourceUnreachable(_))
        )
    }
}

/// Resolves file names through a [`RepositoryClient`].
pub struct LinkDiscoverer<'a> {
    client: &'a dyn RepositoryClient,
    settings: &'a TransferSettings,
}

impl<'a> LinkDiscoverer<'a> {
    /// Create a discoverer over `client`.
    #[must_use]
    pub const fn new(client: &'a dyn RepositoryClient, settings: &'a TransferSettings) -> Self {
        Self { client, settings }
    }

    /// Fetch `listing_url` and derive the file names for `coordinate`.
    ///
    /// Listing failures are not errors: they select the fallback set.
    #[must_use]
    pub fn discover(
        &self,
        listing_url: &str,
        auth: Option<AuthHeader>,
        coordinate: &ArtefactCoordinate,
    ) -> Discovery {
        let reason = match self.client.fetch_listing(listing_url, auth) {
            Ok(html) => {
                debug!("Listing for {coordinate}:\n{html}");
                let names = extract_links(&html, self.settings);
                if !names.is_empty() {
                    info!(
                        "Extracted {} link(s) for {coordinate}: {}",
                        names.len(),
                        names.join(", ")
                    );
                    return Discovery {
                        names,
                        source: DiscoverySource::Listing,
                    };
                }
                FallbackReason::NoMatchingLinks
            }
            Err(TransferError::ListingStatus { status, .. }) => {
                FallbackReason::ListingUnavailable(status)
            }
            Err(err) => {
                warn!("Listing {listing_url} failed: {err}");
                FallbackReason::SourceUnreachable(err.to_string())
            }
        };
        info!("No listing links for {coordinate}; trying conventional file names");
        Discovery {
            names: fallback_names(coordinate, self.settings),
            source: DiscoverySource::Fallback(reason),
        }
    }
}

#[expect(clippy::expect_used, reason = "the pattern is a literal")]
fn href_pattern() -> &'static Regex {
    static HREF: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r#"href=["']([^"']+)["']"#).expect("href pattern compiles"));
    &HREF
}

/// Extract transferable file names from a listing page.
///
/// Every quoted `href` target is reduced to its last path segment and kept
/// when it names a `.jar`, `.aar` or `.pom` file. Sources and javadoc jars
/// are dropped when the matching skip flag is set. Duplicates are kept once.
///
/// # Examples
///
/// ```
/// use artefact_mirror::config::TransferSettings;
/// use artefact_mirror::discovery::extract_links;
///
/// let html = r#"<a href="foo-1.0.jar">jar</a> <a href='foo-1.0.pom'>pom</a>
///               <a href="readme.txt">readme</a>"#;
/// let names = extract_links(html, &TransferSettings::default());
/// assert_eq!(names, ["foo-1.0.jar", "foo-1.0.pom"]);
/// ```
#[must_use]
pub fn extract_links(html: &str, settings: &TransferSettings) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for capture in href_pattern().captures_iter(html) {
        let Some(target) = capture.get(1) else {
            continue;
        };
        let name = file_name_of(target.as_str());
        trace!("href {} -> {name:?}", target.as_str());
        if is_wanted(name, settings) && !names.iter().any(|known| known == name) {
            names.push(name.to_owned());
        }
    }
    names
}

/// Return the conventional file names for `coordinate`.
///
/// The order is jar, aar, pom, then sources and javadoc jars unless skipped.
#[must_use]
pub fn fallback_names(coordinate: &ArtefactCoordinate, settings: &TransferSettings) -> Vec<String> {
    let stem = coordinate.file_stem();
    let mut names: Vec<String> = PACKAGING_MARKERS
        .iter()
        .map(|extension| format!("{stem}{extension}"))
        .collect();
    if !settings.skip_sources {
        names.push(format!("{stem}{SOURCES_SUFFIX}"));
    }
    if !settings.skip_javadocs {
        names.push(format!("{stem}{JAVADOC_SUFFIX}"));
    }
    names
}

fn is_wanted(name: &str, settings: &TransferSettings) -> bool {
    if settings.skip_sources && name.contains(SOURCES_SUFFIX) {
        return false;
    }
    if settings.skip_javadocs && name.contains(JAVADOC_SUFFIX) {
        return false;
    }
    PACKAGING_MARKERS.iter().any(|marker| name.contains(marker))
}

/// Strip query, fragment and leading path segments from an href target.
fn file_name_of(target: &str) -> &str {
    let path = target
        .split(['?', '#'])
        .next()
        .unwrap_or(target);
    path.rsplit('/').next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MockRepositoryClient;
    use rstest::rstest;

    fn coordinate() -> ArtefactCoordinate {
        ArtefactCoordinate::new("com.example", "foo", "1.0")
    }

    fn skipping(skip_sources: bool, skip_javadocs: bool) -> TransferSettings {
        TransferSettings {
            skip_sources,
            skip_javadocs,
            ..TransferSettings::default()
        }
    }

    #[test]
    fn keeps_only_packaging_files() {
        let html = concat!(
            "<a href=\"foo-1.0.jar\">foo-1.0.jar</a>\n",
            "<a href=\"foo-1.0.pom\">foo-1.0.pom</a>\n",
            "<a href=\"readme.txt\">readme.txt</a>\n",
        );
        assert_eq!(
            extract_links(html, &TransferSettings::default()),
            ["foo-1.0.jar", "foo-1.0.pom"]
        );
    }

    #[test]
    fn reduces_absolute_and_nested_targets_to_file_names() {
        let html = concat!(
            "<a href=\"https://repo.example/com/example/foo/1.0/foo-1.0.aar\">aar</a>",
            "<a href=\"/com/example/foo/1.0/foo-1.0.pom?download=1\">pom</a>",
            "<a href=\"../\">parent</a>",
        );
        assert_eq!(
            extract_links(html, &TransferSettings::default()),
            ["foo-1.0.aar", "foo-1.0.pom"]
        );
    }

    #[test]
    fn duplicate_links_are_kept_once() {
        let html = "<a href=\"foo-1.0.jar\">a</a><a href='foo-1.0.jar'>b</a>";
        assert_eq!(
            extract_links(html, &TransferSettings::default()),
            ["foo-1.0.jar"]
        );
    }

    #[rstest]
    #[case::keep_all(false, false, &["foo-1.0.jar", "foo-1.0-sources.jar", "foo-1.0-javadoc.jar"])]
    #[case::skip_sources(true, false, &["foo-1.0.jar", "foo-1.0-javadoc.jar"])]
    #[case::skip_javadocs(false, true, &["foo-1.0.jar", "foo-1.0-sources.jar"])]
    #[case::skip_both(true, true, &["foo-1.0.jar"])]
    fn listing_honours_skip_flags(
        #[case] skip_sources: bool,
        #[case] skip_javadocs: bool,
        #[case] expected: &[&str],
    ) {
        let html = concat!(
            "<a href=\"foo-1.0.jar\"></a>",
            "<a href=\"foo-1.0-sources.jar\"></a>",
            "<a href=\"foo-1.0-javadoc.jar\"></a>",
        );
        assert_eq!(
            extract_links(html, &skipping(skip_sources, skip_javadocs)),
            expected
        );
    }

    #[rstest]
    #[case::full(false, false, &[
        "foo-1.0.jar", "foo-1.0.aar", "foo-1.0.pom", "foo-1.0-sources.jar", "foo-1.0-javadoc.jar",
    ])]
    #[case::triple(true, true, &["foo-1.0.jar", "foo-1.0.aar", "foo-1.0.pom"])]
    #[case::javadoc_only_skipped(false, true, &[
        "foo-1.0.jar", "foo-1.0.aar", "foo-1.0.pom", "foo-1.0-sources.jar",
    ])]
    fn fallback_set_follows_packaging_conventions(
        #[case] skip_sources: bool,
        #[case] skip_javadocs: bool,
        #[case] expected: &[&str],
    ) {
        assert_eq!(
            fallback_names(&coordinate(), &skipping(skip_sources, skip_javadocs)),
            expected
        );
    }

    #[test]
    fn listing_with_links_is_used() {
        let mut client = MockRepositoryClient::new();
        client
            .expect_fetch_listing()
            .times(1)
            .returning(|_, _| Ok("<a href=\"foo-1.0.pom\">pom</a>".to_owned()));
        let settings = TransferSettings::default();

        let discovery = LinkDiscoverer::new(&client, &settings).discover(
            "https://repo.example/com/example/foo/1.0/",
            None,
            &coordinate(),
        );

        assert_eq!(discovery.source, DiscoverySource::Listing);
        assert_eq!(discovery.names, ["foo-1.0.pom"]);
    }

    #[rstest]
    #[case::empty_page("")]
    #[case::unparsable("<<not html>>")]
    #[case::only_text_links("<a href=\"notes.txt\">notes</a>")]
    fn pages_without_links_fall_back(#[case] page: &str) {
        let mut client = MockRepositoryClient::new();
        let body = page.to_owned();
        client
            .expect_fetch_listing()
            .returning(move |_, _| Ok(body.clone()));
        let settings = skipping(true, true);

        let discovery = LinkDiscoverer::new(&client, &settings).discover(
            "https://repo.example/",
            None,
            &coordinate(),
        );

        assert_eq!(
            discovery.source,
            DiscoverySource::Fallback(FallbackReason::NoMatchingLinks)
        );
        assert_eq!(discovery.names, ["foo-1.0.jar", "foo-1.0.aar", "foo-1.0.pom"]);
    }

    #[test]
    fn listing_status_error_falls_back() {
        let mut client = MockRepositoryClient::new();
        client.expect_fetch_listing().returning(|url, _| {
            Err(TransferError::ListingStatus {
                url: url.to_owned(),
                status: "404 Not Found".to_owned(),
            })
        });
        let settings = TransferSettings::default();

        let discovery = LinkDiscoverer::new(&client, &settings).discover(
            "https://repo.example/",
            None,
            &coordinate(),
        );

        assert_eq!(
            discovery.source,
            DiscoverySource::Fallback(FallbackReason::ListingUnavailable(
                "404 Not Found".to_owned()
            ))
        );
        assert!(!discovery.source_unreachable());
        assert_eq!(discovery.names.len(), 5);
    }

    #[test]
    fn transport_error_marks_source_unreachable() {
        let mut client = MockRepositoryClient::new();
        client.expect_fetch_listing().returning(|url, _| {
            Err(TransferError::Http {
                url: url.to_owned(),
                reason: "connection refused".to_owned(),
            })
        });
        let settings = TransferSettings::default();

        let discovery = LinkDiscoverer::new(&client, &settings).discover(
            "https://repo.example/",
            None,
            &coordinate(),
        );

        assert!(discovery.is_fallback());
        assert!(discovery.source_unreachable());
    }

    #[test]
    fn listing_request_carries_auth_header() {
        let mut client = MockRepositoryClient::new();
        client
            .expect_fetch_listing()
            .withf(|url, auth| {
                url == "https://repo.example/com/example/foo/1.0/"
                    && auth.as_ref().map(AuthHeader::name) == Some("X-Api-Key")
            })
            .times(1)
            .returning(|_, _| Ok(String::new()));
        let settings = TransferSettings::default();

        let discovery = LinkDiscoverer::new(&client, &settings).discover(
            "https://repo.example/com/example/foo/1.0/",
            Some(AuthHeader::new("X-Api-Key", "secret")),
            &coordinate(),
        );

        assert_eq!(
            discovery.source,
            DiscoverySource::Fallback(FallbackReason::NoMatchingLinks)
        );
    }
}
