use crate::UrlError;
use url::Url;

/// Tracking query parameters dropped during normalization
const TRACKING_PARAMS: &[&str] = &["fbclid", "gclid", "mc_eid"];

/// Normalizes a URL into the form used for crawl identity
///
/// Two links that normalize to the same string are the same page as far as the
/// visited set and the frontier are concerned.
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed (dot segments are resolved by the parser)
/// 2. Require an HTTP or HTTPS scheme and a host
/// 3. Lowercase the host (done by the parser for special schemes)
/// 4. Collapse repeated slashes in the path, keeping a trailing slash
/// 5. Remove the fragment
/// 6. Remove tracking query parameters (`utm_*`, `fbclid`, `gclid`, `mc_eid`)
/// 7. Sort remaining query parameters; drop an empty query string
///
/// # Examples
///
/// ```
/// use sitescout::url::normalize_url;
///
/// let url = normalize_url("https://EXAMPLE.com//about/?utm_source=x#team").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/about/");
/// ```
pub fn normalize_url(url_str: &str) -> Result<Url, UrlError> {
    let url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;
    normalize_parsed(url)
}

/// Normalizes an already parsed URL
pub fn normalize_parsed(mut url: Url) -> Result<Url, UrlError> {
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingDomain);
    }

    let normalized_path = normalize_path(url.path());
    url.set_path(&normalized_path);

    url.set_fragment(None);

    let query = url.query().map(filter_and_sort_query);
    match query {
        Some(query) if !query.is_empty() => url.set_query(Some(query.as_str())),
        _ => url.set_query(None),
    }

    Ok(url)
}

/// Collapses empty segments while preserving a trailing slash
fn normalize_path(path: &str) -> String {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    if segments.is_empty() {
        return "/".to_string();
    }

    let mut result = format!("/{}", segments.join("/"));
    if path.ends_with('/') {
        result.push('/');
    }
    result
}

/// Filters out tracking parameters and sorts the remaining ones
///
/// Works on the raw `&`-separated segments so that the query the server sees
/// keeps its original encoding (`?print` stays `?print`).
fn filter_and_sort_query(query: &str) -> String {
    let mut segments: Vec<&str> = query
        .split('&')
        .filter(|segment| !segment.is_empty())
        .filter(|segment| {
            let key = segment.split_once('=').map_or(*segment, |(key, _)| key);
            !is_tracking_param(key)
        })
        .collect();

    segments.sort_unstable();
    segments.join("&")
}

fn is_tracking_param(key: &str) -> bool {
    key.starts_with("utm_") || TRACKING_PARAMS.contains(&key)
}
