//! Configuration module for Silkworm
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files. API keys are never stored in the file; the config names the
//! environment variables that hold them.

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    CleanupConfig, Config, CrawlerConfig, EmbeddingConfig, IndexConfig, OutputConfig,
    ProcessingConfig, SourcesConfig,
};

// Re-export parser and validation functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::require_enabled_sources;
