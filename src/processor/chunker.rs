use crate::config::ProcessingConfig;
use url::Url;

/// A bounded span of a page's extracted text, the unit of embedding.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentChunk {
    /// Normalized URL of the page this chunk came from
    pub source_url: String,

    /// Position of the chunk within the page's chunk sequence
    pub chunk_index: usize,

    /// Trimmed chunk text
    pub text: String,
}

impl ContentChunk {
    /// Length of the chunk text in characters.
    pub fn char_length(&self) -> usize {
        self.text.chars().count()
    }
}

/// Splits text into windows of at most `chunk_size` characters with
/// `overlap` characters carried between consecutive windows.
///
/// Window ends snap back to the last whitespace inside the window when one
/// exists, so words are not cut mid-way. The split is a pure function of the
/// input: re-running on identical text yields identical boundaries.
pub fn chunk_text(text: &str, chunk_size: usize, overlap: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() {
        return Vec::new();
    }
    if chars.len() <= chunk_size {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut start = 0usize;

    while start < chars.len() {
        let hard_end = (start + chunk_size).min(chars.len());

        let end = if hard_end < chars.len() {
            match (start..hard_end).rev().find(|&i| chars[i].is_whitespace()) {
                Some(ws) if ws > start => ws,
                _ => hard_end,
            }
        } else {
            hard_end
        };

        chunks.push(chars[start..end].iter().collect());

        if end == chars.len() {
            break;
        }
        // Step back by the overlap, but always move forward.
        start = end.saturating_sub(overlap).max(start + 1);
    }

    chunks
}

/// Chunks a page's extracted text and applies the minimum-length filter.
///
/// Chunk indices are assigned before filtering, so the surviving chunks of a
/// page keep stable positions (and therefore stable record ids) no matter
/// which of their siblings were dropped.
pub fn chunk_page(url: &Url, text: &str, config: &ProcessingConfig) -> Vec<ContentChunk> {
    chunk_text(text, config.chunk_size, config.chunk_overlap)
        .into_iter()
        .enumerate()
        .filter_map(|(chunk_index, raw)| {
            let trimmed = raw.trim();
            if trimmed.chars().count() < config.min_text_length {
                tracing::debug!(
                    "Dropping chunk {} of {} ({} chars, below minimum {})",
                    chunk_index,
                    url,
                    trimmed.chars().count(),
                    config.min_text_length
                );
                return None;
            }
            Some(ContentChunk {
                source_url: url.to_string(),
                chunk_index,
                text: trimmed.to_string(),
            })
        })
        .collect()
}
