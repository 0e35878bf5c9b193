//! URL handling module for SiteScout
//!
//! This module provides crawl-identity normalization and the same-domain
//! containment rule that keeps a crawl on the seed's site.

mod normalize;

use crate::{UrlError, UrlResult};
use url::Url;

// Re-export main functions
pub use normalize::{normalize_parsed, normalize_url};

/// Extracts the lowercase host of a URL
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Same-domain containment rule for one crawl
///
/// A URL is inside the scope when its host equals the seed's host and its
/// explicit port (if any) equals the seed's. With `www_alias` enabled, a single
/// leading `www.` is ignored on both sides, so `www.example.com` and
/// `example.com` are one site. Subdomains are never included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainScope {
    host: String,
    port: Option<u16>,
    www_alias: bool,
}

impl DomainScope {
    /// Builds the scope for a seed URL
    ///
    /// # Examples
    ///
    /// ```
    /// use sitescout::url::DomainScope;
    /// use url::Url;
    ///
    /// let seed = Url::parse("https://example.com/").unwrap();
    /// let scope = DomainScope::for_seed(&seed, false).unwrap();
    /// assert!(scope.contains(&Url::parse("https://example.com/about").unwrap()));
    /// assert!(!scope.contains(&Url::parse("https://other.com/").unwrap()));
    /// ```
    pub fn for_seed(seed: &Url, www_alias: bool) -> UrlResult<Self> {
        let host = extract_domain(seed).ok_or(UrlError::MissingDomain)?;
        Ok(Self {
            host,
            port: seed.port(),
            www_alias,
        })
    }

    /// The seed host this scope was built from
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns true if the URL belongs to the seed's site
    pub fn contains(&self, url: &Url) -> bool {
        let Some(candidate) = extract_domain(url) else {
            return false;
        };

        if url.port() != self.port {
            return false;
        }

        if self.www_alias {
            strip_www(&candidate) == strip_www(&self.host)
        } else {
            candidate == self.host
        }
    }
}

fn strip_www(host: &str) -> &str {
    host.strip_prefix("www.").unwrap_or(host)
}
