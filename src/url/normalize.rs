use crate::UrlError;
use url::Url;

/// Query parameters stripped during normalization so tracking variants of the
/// same page collapse to one frontier entry.
const TRACKING_PARAMS: &[&str] = &["fbclid", "gclid", "mc_eid", "ref"];

/// Normalizes a URL so that equivalent spellings collapse to one seed entry.
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed or non-HTTP(S)
/// 2. Lowercase the host (the scheme is lowercased by the parser)
/// 3. Drop any userinfo (the parser already drops default ports)
/// 4. Resolve dot segments and collapse duplicate slashes in the path
/// 5. Remove the trailing slash (except for the root path)
/// 6. Strip the fragment
/// 7. Drop tracking query parameters and sort the remainder by key
///
/// # Arguments
///
/// * `input` - The URL string to normalize
///
/// # Examples
///
/// ```
/// use silkworm::url::normalize_url;
///
/// let url = normalize_url("https://Example.COM/docs/").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/docs");
/// ```
pub fn normalize_url(input: &str) -> Result<Url, UrlError> {
    let mut url = Url::parse(input.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    let host = url
        .host_str()
        .ok_or(UrlError::MissingHost)?
        .to_lowercase();
    url.set_host(Some(&host))
        .map_err(|e| UrlError::Parse(e.to_string()))?;

    // Userinfo never distinguishes pages; default ports are already
    // dropped by the parser.
    let _ = url.set_username("");
    let _ = url.set_password(None);

    let path = canonical_path(url.path());
    url.set_path(&path);

    url.set_fragment(None);

    if url.query().is_some() {
        let mut params: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(key, _)| !is_tracking_param(key))
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        params.sort();

        if params.is_empty() {
            url.set_query(None);
        } else {
            let query = params
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect::<Vec<_>>()
                .join("&");
            url.set_query(Some(&query));
        }
    }

    Ok(url)
}

/// Resolves `.`/`..` segments, collapses duplicate slashes, and strips the
/// trailing slash (keeping the root path as `/`).
fn canonical_path(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    if segments.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", segments.join("/"))
    }
}

fn is_tracking_param(key: &str) -> bool {
    key.starts_with("utm_") || TRACKING_PARAMS.contains(&key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_host() {
        let url = normalize_url("https://EXAMPLE.COM/Page").unwrap();
        assert_eq!(url.as_str(), "https://example.com/Page");
    }

    #[test]
    fn strips_trailing_slash() {
        let url = normalize_url("https://example.com/docs/").unwrap();
        assert_eq!(url.as_str(), "https://example.com/docs");
    }

    #[test]
    fn keeps_root_slash() {
        let url = normalize_url("https://example.com/").unwrap();
        assert_eq!(url.as_str(), "https://example.com/");
    }

    #[test]
    fn empty_path_becomes_root() {
        let url = normalize_url("https://example.com").unwrap();
        assert_eq!(url.as_str(), "https://example.com/");
    }

    #[test]
    fn strips_fragment() {
        let url = normalize_url("https://example.com/page#intro").unwrap();
        assert_eq!(url.as_str(), "https://example.com/page");
    }

    #[test]
    fn drops_default_port() {
        let url = normalize_url("https://example.com:443/page").unwrap();
        assert_eq!(url.as_str(), "https://example.com/page");
    }

    #[test]
    fn keeps_custom_port() {
        let url = normalize_url("http://example.com:8080/page").unwrap();
        assert_eq!(url.as_str(), "http://example.com:8080/page");
    }

    #[test]
    fn resolves_dot_segments() {
        let url = normalize_url("https://example.com/a/../b/./c").unwrap();
        assert_eq!(url.as_str(), "https://example.com/b/c");
    }

    #[test]
    fn collapses_duplicate_slashes() {
        let url = normalize_url("https://example.com//a///b").unwrap();
        assert_eq!(url.as_str(), "https://example.com/a/b");
    }

    #[test]
    fn removes_tracking_params_and_sorts_rest() {
        let url =
            normalize_url("https://example.com/page?b=2&utm_source=mail&a=1&fbclid=x").unwrap();
        assert_eq!(url.as_str(), "https://example.com/page?a=1&b=2");
    }

    #[test]
    fn drops_empty_query() {
        let url = normalize_url("https://example.com/page?utm_campaign=spring").unwrap();
        assert_eq!(url.as_str(), "https://example.com/page");
    }

    #[test]
    fn rejects_non_http_scheme() {
        let result = normalize_url("ftp://example.com/file");
        assert!(matches!(result, Err(UrlError::InvalidScheme(_))));
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(normalize_url("not a url").is_err());
    }

    #[test]
    fn trims_surrounding_whitespace() {
        let url = normalize_url("  https://example.com/page  ").unwrap();
        assert_eq!(url.as_str(), "https://example.com/page");
    }

    #[test]
    fn equivalent_spellings_collapse() {
        let a = normalize_url("https://Example.com/docs/?b=2&a=1#top").unwrap();
        let b = normalize_url("https://example.com/docs?a=1&b=2").unwrap();
        assert_eq!(a, b);
    }
}
