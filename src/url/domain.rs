use url::Url;

/// Second-level labels that commonly sit under a country-code TLD, so that
/// `news.bbc.co.uk` reduces to `bbc.co.uk` rather than `co.uk`.
const COMPOUND_SUFFIXES: &[&str] = &["co", "com", "org", "net", "ac", "gov", "edu"];

/// Returns the lowercase host of a URL, if it has one.
pub fn host_of(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Reduces a host to its registrable domain.
///
/// This uses a small heuristic rather than the full public-suffix list:
/// the last two labels, or the last three when the second-to-last label is a
/// common compound suffix (`co.uk`, `com.au`, ...). IP addresses and
/// single-label hosts are returned unchanged.
///
/// # Examples
///
/// ```
/// use silkworm::url::registrable_domain;
///
/// assert_eq!(registrable_domain("blog.example.com"), "example.com");
/// assert_eq!(registrable_domain("news.bbc.co.uk"), "bbc.co.uk");
/// assert_eq!(registrable_domain("localhost"), "localhost");
/// ```
pub fn registrable_domain(host: &str) -> String {
    let host = host.to_lowercase();

    // IPv4 hosts have no label structure to reduce.
    if host.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return host;
    }

    let labels: Vec<&str> = host.split('.').collect();
    if labels.len() <= 2 {
        return host;
    }

    let take = if COMPOUND_SUFFIXES.contains(&labels[labels.len() - 2]) && labels.len() >= 3 {
        3
    } else {
        2
    };

    labels[labels.len() - take..].join(".")
}

/// Checks whether two URLs share a registrable domain.
pub fn same_site(a: &Url, b: &Url) -> bool {
    match (host_of(a), host_of(b)) {
        (Some(ha), Some(hb)) => registrable_domain(&ha) == registrable_domain(&hb),
        _ => false,
    }
}
