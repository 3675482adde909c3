use url::Url;

/// Checks whether a URL points at a non-HTML asset that should never be
/// fetched, based on its path extension.
///
/// The comparison is case-insensitive and ignores query and fragment parts
/// (the `url` crate strips those from `path()` already).
///
/// # Examples
///
/// ```
/// use silkworm::url::is_excluded_asset;
/// use url::Url;
///
/// let excluded = vec!["png".to_string(), "zip".to_string()];
/// let logo = Url::parse("https://example.com/img/logo.PNG").unwrap();
/// let page = Url::parse("https://example.com/about").unwrap();
/// assert!(is_excluded_asset(&logo, &excluded));
/// assert!(!is_excluded_asset(&page, &excluded));
/// ```
pub fn is_excluded_asset(url: &Url, excluded_extensions: &[String]) -> bool {
    let path = url.path();
    let last_segment = path.rsplit('/').next().unwrap_or("");

    let Some((_, extension)) = last_segment.rsplit_once('.') else {
        return false;
    };

    if extension.is_empty() {
        return false;
    }

    let extension = extension.to_lowercase();
    excluded_extensions
        .iter()
        .any(|e| e.trim_start_matches('.').eq_ignore_ascii_case(&extension))
}
