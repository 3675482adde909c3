use crate::index::IndexEntry;

/// A single quality check applied to every scanned entry.
///
/// New checks plug in without touching the scan loop: implement the trait
/// and add the rule to the set handed to the scanner.
pub trait QualityRule: Send + Sync {
    /// Short name used in log lines.
    fn name(&self) -> &'static str;

    /// Returns true when the entry fails this check.
    fn is_defective(&self, entry: &IndexEntry) -> bool;
}

/// Flags vectors whose magnitude is effectively zero.
///
/// Uses the L1 norm (sum of absolute components); a vector the embedding
/// model actually produced is never this small.
pub struct NearZeroRule {
    pub epsilon: f32,
}

impl QualityRule for NearZeroRule {
    fn name(&self) -> &'static str {
        "near-zero-magnitude"
    }

    fn is_defective(&self, entry: &IndexEntry) -> bool {
        let magnitude: f32 = entry.values.iter().map(|v| v.abs()).sum();
        magnitude < self.epsilon
    }
}

/// Flags vectors whose stored dimensionality does not match the index.
pub struct DimensionRule {
    pub expected: usize,
}

impl QualityRule for DimensionRule {
    fn name(&self) -> &'static str {
        "wrong-dimension"
    }

    fn is_defective(&self, entry: &IndexEntry) -> bool {
        entry.values.len() != self.expected
    }
}

/// Flags entries whose text metadata is missing, empty, or too short.
pub struct ShortTextRule {
    pub min_length: usize,
}

impl QualityRule for ShortTextRule {
    fn name(&self) -> &'static str {
        "short-text"
    }

    fn is_defective(&self, entry: &IndexEntry) -> bool {
        let text = entry
            .metadata
            .as_ref()
            .and_then(|m| m.get("text"))
            .and_then(|t| t.as_str())
            .unwrap_or("");
        text.trim().chars().count() < self.min_length
    }
}

/// Flags entries whose required metadata fields are absent or wrongly typed.
pub struct MetadataShapeRule;

impl QualityRule for MetadataShapeRule {
    fn name(&self) -> &'static str {
        "malformed-metadata"
    }

    fn is_defective(&self, entry: &IndexEntry) -> bool {
        let Some(metadata) = entry.metadata.as_ref() else {
            return true;
        };

        let url_ok = metadata.get("url").map(|v| v.is_string()).unwrap_or(false);
        let text_ok = metadata.get("text").map(|v| v.is_string()).unwrap_or(false);
        let index_ok = metadata
            .get("chunk_index")
            .map(|v| v.is_u64() || v.is_f64())
            .unwrap_or(false);

        !(url_ok && text_ok && index_ok)
    }
}

/// The standard rule set the cleanup command runs with.
pub fn default_rules(
    expected_dimension: usize,
    near_zero_epsilon: f32,
    min_text_length: usize,
) -> Vec<Box<dyn QualityRule>> {
    vec![
        Box::new(DimensionRule {
            expected: expected_dimension,
        }),
        Box::new(NearZeroRule {
            epsilon: near_zero_epsilon,
        }),
        Box::new(ShortTextRule {
            min_length: min_text_length,
        }),
        Box::new(MetadataShapeRule),
    ]
}
