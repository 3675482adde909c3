use crate::SilkwormError;
use quick_xml::events::Event;
use quick_xml::Reader;
use reqwest::Client;

/// Fetches a sitemap and returns the URLs of its `<loc>` entries.
///
/// Both page sitemaps and sitemap index files use `<loc>`; entries that are
/// themselves sitemaps are simply returned alongside page URLs and filtered
/// out later by the extension filter.
pub async fn fetch_sitemap_urls(client: &Client, sitemap_url: &str) -> Result<Vec<String>, SilkwormError> {
    tracing::info!("Fetching sitemap: {}", sitemap_url);

    let response = client.get(sitemap_url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(SilkwormError::SourceUnavailable(format!(
            "sitemap {} returned HTTP {}",
            sitemap_url, status
        )));
    }

    let body = response.text().await?;
    let urls = parse_sitemap(&body)?;
    tracing::info!("Found {} URLs in sitemap", urls.len());
    Ok(urls)
}

/// Parses sitemap XML, collecting the text content of every `<loc>` element.
pub fn parse_sitemap(xml: &str) -> Result<Vec<String>, SilkwormError> {
    let mut reader = Reader::from_str(xml);
    let mut urls = Vec::new();
    let mut in_loc = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.local_name().as_ref() == b"loc" => {
                in_loc = true;
            }
            Ok(Event::End(e)) if e.local_name().as_ref() == b"loc" => {
                in_loc = false;
            }
            Ok(Event::Text(t)) if in_loc => {
                match t.unescape() {
                    Ok(text) => {
                        let trimmed = text.trim();
                        if !trimmed.is_empty() {
                            urls.push(trimmed.to_string());
                        }
                    }
                    Err(e) => {
                        return Err(SilkwormError::SourceUnavailable(format!(
                            "sitemap entity error: {}",
                            e
                        )));
                    }
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(SilkwormError::SourceUnavailable(format!(
                    "malformed sitemap XML: {}",
                    e
                )));
            }
        }
    }

    Ok(urls)
}
