//! Seed URL resolution
//!
//! Merges the three seed sources (start URL, sitemap, manual list) into
//! one deduplicated ordered sequence. Each source is independently
//! toggleable; a sitemap failure only aborts the run when no other source
//! produced seeds.

mod sitemap;

pub use sitemap::{fetch_sitemap_urls, parse_sitemap};

use crate::config::SourcesConfig;
use crate::url::normalize_url;
use crate::{ConfigError, SilkwormError};
use reqwest::Client;
use std::collections::HashSet;
use url::Url;

/// Resolves the enabled seed sources into a deduplicated URL sequence.
///
/// Order is start URL, then sitemap entries, then manual entries, with the
/// first occurrence of each normalized URL winning. Entries that fail
/// normalization are logged and skipped.
///
/// # Errors
///
/// * `ConfigError::NoSourcesEnabled` - no source is toggled on
/// * `SilkwormError::SourceUnavailable` - every enabled source came up empty
///   (including a failed sitemap with nothing else to fall back on)
pub async fn resolve_seeds(
    client: &Client,
    sources: &SourcesConfig,
) -> Result<Vec<Url>, SilkwormError> {
    if sources.enabled_count() == 0 {
        return Err(ConfigError::NoSourcesEnabled.into());
    }

    let mut seen: HashSet<String> = HashSet::new();
    let mut seeds: Vec<Url> = Vec::new();
    let push = |candidate: &str, seen: &mut HashSet<String>, seeds: &mut Vec<Url>| {
        match normalize_url(candidate) {
            Ok(url) => {
                if seen.insert(url.as_str().to_string()) {
                    seeds.push(url);
                }
            }
            Err(e) => {
                tracing::warn!("Skipping seed URL '{}': {}", candidate, e);
            }
        }
    };

    if sources.use_start_url {
        if let Some(start) = sources.start_url.as_deref() {
            push(start, &mut seen, &mut seeds);
        }
    }

    if sources.use_sitemap {
        let sitemap_url = sources.sitemap_url.as_deref().unwrap_or_default();
        match fetch_sitemap_urls(client, sitemap_url).await {
            Ok(urls) => {
                for url in &urls {
                    push(url, &mut seen, &mut seeds);
                }
            }
            Err(e) => {
                // Degrade to a warning when another source already produced
                // seeds; otherwise the whole run has nothing to do.
                if seeds.is_empty() && !sources.use_manual_urls {
                    return Err(e);
                }
                tracing::warn!("Sitemap source failed, continuing with other sources: {}", e);
            }
        }
    }

    if sources.use_manual_urls {
        for entry in &sources.manual_urls {
            // Entries may be comma-separated groups.
            for candidate in entry.split(',') {
                let candidate = candidate.trim();
                if !candidate.is_empty() {
                    push(candidate, &mut seen, &mut seeds);
                }
            }
        }
    }

    if seeds.is_empty() {
        return Err(SilkwormError::SourceUnavailable(
            "no seed URLs resolved from any enabled source".to_string(),
        ));
    }

    tracing::info!("Resolved {} seed URLs", seeds.len());
    Ok(seeds)
}
