//! URL handling module for Silkworm
//!
//! This module provides URL normalization, registrable-domain extraction,
//! and the excluded-extension filter used to keep non-HTML assets out of
//! the crawl frontier.

mod domain;
mod matcher;
mod normalize;

// Re-export main functions
pub use domain::{host_of, registrable_domain, same_site};
pub use matcher::is_excluded_asset;
pub use normalize::normalize_url;
