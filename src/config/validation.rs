use crate::config::types::{
    CleanupConfig, Config, CrawlerConfig, EmbeddingConfig, IndexConfig, ProcessingConfig,
    SourcesConfig,
};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration.
///
/// Source toggles are checked structurally here (an enabled source must name
/// a URL); whether at least one source is enabled is checked by the crawl
/// path only, since the cleanup subcommand needs no seeds.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_sources(&config.sources)?;
    validate_crawler(&config.crawler)?;
    validate_processing(&config.processing)?;
    validate_embedding(&config.embedding)?;
    validate_index(&config.index)?;
    validate_cleanup(&config.cleanup)?;
    Ok(())
}

/// Fails with `NoSourcesEnabled` when no seed source is toggled on.
pub fn require_enabled_sources(sources: &SourcesConfig) -> Result<(), ConfigError> {
    if sources.enabled_count() == 0 {
        return Err(ConfigError::NoSourcesEnabled);
    }
    Ok(())
}

fn validate_sources(sources: &SourcesConfig) -> Result<(), ConfigError> {
    if sources.use_start_url {
        let start = sources.start_url.as_deref().unwrap_or("");
        if start.is_empty() {
            return Err(ConfigError::Validation(
                "use-start-url is enabled but start-url is not set".to_string(),
            ));
        }
        Url::parse(start)
            .map_err(|e| ConfigError::InvalidUrl(format!("start-url '{}': {}", start, e)))?;
    }

    if sources.use_sitemap {
        let sitemap = sources.sitemap_url.as_deref().unwrap_or("");
        if sitemap.is_empty() {
            return Err(ConfigError::Validation(
                "use-sitemap is enabled but sitemap-url is not set".to_string(),
            ));
        }
        Url::parse(sitemap)
            .map_err(|e| ConfigError::InvalidUrl(format!("sitemap-url '{}': {}", sitemap, e)))?;
    }

    if sources.use_manual_urls && sources.manual_urls.iter().all(|s| s.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "use-manual-urls is enabled but manual-urls is empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_crawler(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_pages == 0 {
        return Err(ConfigError::Validation(
            "max-pages must be >= 1".to_string(),
        ));
    }

    if config.request_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "request-timeout-secs must be >= 1".to_string(),
        ));
    }

    if config.fetch_retries == 0 {
        return Err(ConfigError::Validation(
            "fetch-retries must be >= 1".to_string(),
        ));
    }

    if config.failure_window == 0 {
        return Err(ConfigError::Validation(
            "failure-window must be >= 1".to_string(),
        ));
    }

    if !(config.failure_threshold > 0.0 && config.failure_threshold <= 1.0) {
        return Err(ConfigError::Validation(format!(
            "failure-threshold must be in (0, 1], got {}",
            config.failure_threshold
        )));
    }

    Ok(())
}

fn validate_processing(config: &ProcessingConfig) -> Result<(), ConfigError> {
    if config.chunk_size == 0 {
        return Err(ConfigError::Validation(
            "chunk-size must be >= 1".to_string(),
        ));
    }

    if config.chunk_overlap >= config.chunk_size {
        return Err(ConfigError::Validation(format!(
            "chunk-overlap ({}) must be smaller than chunk-size ({})",
            config.chunk_overlap, config.chunk_size
        )));
    }

    if config.min_text_length == 0 {
        return Err(ConfigError::Validation(
            "min-text-length must be >= 1".to_string(),
        ));
    }

    Ok(())
}

fn validate_embedding(config: &EmbeddingConfig) -> Result<(), ConfigError> {
    Url::parse(&config.endpoint).map_err(|e| {
        ConfigError::InvalidUrl(format!("embedding endpoint '{}': {}", config.endpoint, e))
    })?;

    if config.model.is_empty() {
        return Err(ConfigError::Validation(
            "embedding model cannot be empty".to_string(),
        ));
    }

    if config.dimension == 0 {
        return Err(ConfigError::Validation(
            "embedding dimension must be >= 1".to_string(),
        ));
    }

    if config.max_retries == 0 {
        return Err(ConfigError::Validation(
            "embedding max-retries must be >= 1".to_string(),
        ));
    }

    Ok(())
}

fn validate_index(config: &IndexConfig) -> Result<(), ConfigError> {
    Url::parse(&config.endpoint).map_err(|e| {
        ConfigError::InvalidUrl(format!("index endpoint '{}': {}", config.endpoint, e))
    })?;

    if config.upsert_batch_size == 0 {
        return Err(ConfigError::Validation(
            "upsert-batch-size must be >= 1".to_string(),
        ));
    }

    Ok(())
}

fn validate_cleanup(config: &CleanupConfig) -> Result<(), ConfigError> {
    if config.scan_batch_size == 0 {
        return Err(ConfigError::Validation(
            "scan-batch-size must be >= 1".to_string(),
        ));
    }

    if config.delete_batch_size == 0 {
        return Err(ConfigError::Validation(
            "delete-batch-size must be >= 1".to_string(),
        ));
    }

    if config.max_iterations == 0 {
        return Err(ConfigError::Validation(
            "max-iterations must be >= 1".to_string(),
        ));
    }

    if config.near_zero_epsilon <= 0.0 {
        return Err(ConfigError::Validation(format!(
            "near-zero-epsilon must be positive, got {}",
            config.near_zero_epsilon
        )));
    }

    Ok(())
}
