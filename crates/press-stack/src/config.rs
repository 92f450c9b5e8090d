//! Compiler configuration.

use serde::{Deserialize, Serialize};

/// Default asset URL base: the active theme's `assets/` directory.
pub const DEFAULT_ASSET_URL_BASE: &str = "<?php echo get_template_directory_uri(); ?>/assets/";

/// Tunables for a compile. Every field has a default, so a partial JSON
/// file deserializes cleanly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// Fixpoint cap for wrapper flattening during normalization.
    pub flatten_iterations: usize,
    /// Fixpoint cap for wrapper pruning inside the SEO pass.
    pub prune_iterations: usize,
    /// Maximum recursion depth of the field extractor.
    pub max_extraction_depth: usize,
    /// `id` given to a synthesized `<main>`.
    pub main_landmark_id: String,
    /// Prefix for rewritten local asset URLs.
    pub asset_url_base: String,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            flatten_iterations: 10,
            prune_iterations: 5,
            max_extraction_depth: 20,
            main_landmark_id: "main-content".to_string(),
            asset_url_base: DEFAULT_ASSET_URL_BASE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: CompilerConfig =
            serde_json::from_str(r#"{"max_extraction_depth": 8}"#).unwrap();
        assert_eq!(config.max_extraction_depth, 8);
        assert_eq!(config.flatten_iterations, 10);
        assert_eq!(config.main_landmark_id, "main-content");
    }
}
