//! OCR reconstruction options and engine configuration variants.

use serde::{Deserialize, Serialize};

/// Punctuation and space characters accepted by the token filter.
pub const DEFAULT_SYMBOLS: &str = ".,()[]{}:;-_/\"' ";

/// One OCR engine configuration tried per page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PsmConfig {
    /// Short descriptive name used in logs
    pub name: String,
    /// Engine mode (`--oem`)
    pub oem: u8,
    /// Page segmentation mode (`--psm`)
    pub psm: u8,
    /// Language override; `None` uses the options' language hint
    pub language: Option<String>,
    /// Extra engine variables (`-c key=value`)
    pub variables: Vec<(String, String)>,
}

impl PsmConfig {
    /// Create a config with interword spaces preserved.
    pub fn new(name: impl Into<String>, oem: u8, psm: u8) -> Self {
        Self {
            name: name.into(),
            oem,
            psm,
            language: None,
            variables: vec![("preserve_interword_spaces".to_string(), "1".to_string())],
        }
    }

    /// Override the recognition language.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Add an engine variable.
    pub fn with_variable(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.push((key.into(), value.into()));
        self
    }

    /// Language to use given the document-level hint.
    pub fn language_or<'a>(&'a self, hint: &'a str) -> &'a str {
        self.language.as_deref().unwrap_or(hint)
    }
}

/// The configuration variants voted over for every page.
///
/// Mixed-script table documents fail differently under each segmentation
/// mode, so several are tried and the richest result is kept.
pub fn default_psm_configs() -> Vec<PsmConfig> {
    vec![
        PsmConfig::new("table-whitelist", 3, 6).with_variable(
            "tessedit_char_whitelist",
            "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyzㄱ-ㅎㅏ-ㅣ가-힣.,()[]{}:;-_/\"' ",
        ),
        PsmConfig::new("full-auto", 3, 3),
        PsmConfig::new("single-column", 3, 4),
        PsmConfig::new("single-word", 3, 8),
        PsmConfig::new("sparse-osd", 3, 12),
        PsmConfig::new("single-line", 3, 7),
        PsmConfig::new("raw-line", 3, 13),
        PsmConfig::new("korean-only", 3, 6).with_language("kor"),
        PsmConfig::new("english-only", 3, 6).with_language("eng"),
        PsmConfig::new("lstm-block", 1, 6),
    ]
}

/// Options for the OCR block pipeline.
#[derive(Debug, Clone)]
pub struct OcrOptions {
    /// Tokens below this confidence (0-100) are discarded
    pub confidence_threshold: f32,

    /// Characters besides letters and digits that make a token acceptable
    pub allowed_symbols: String,

    /// Maximum vertical center distance for two blocks on one line (pixels)
    pub line_tolerance: f32,

    /// Maximum horizontal gap between adjacent blocks on one line (pixels)
    pub merge_gap: f32,

    /// Blocks considered per merge anchor, the anchor included
    pub merge_window: usize,

    /// Overlap ratio above which a block is a positional duplicate
    pub overlap_threshold: f32,

    /// Highest-confidence blocks kept before layout mapping
    pub max_input_blocks: usize,

    /// Regions emitted per page at most
    pub max_regions: usize,

    /// Fraction of source height searched for a title candidate
    pub title_zone: f32,

    /// Language hint passed to the OCR engine
    pub language_hint: String,

    /// Engine configurations voted over per page
    pub psm_configs: Vec<PsmConfig>,
}

impl OcrOptions {
    /// Create new options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the confidence threshold.
    pub fn with_confidence_threshold(mut self, threshold: f32) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    /// Set the line and gap tolerances used when merging.
    pub fn with_merge_tolerances(mut self, line_tolerance: f32, merge_gap: f32) -> Self {
        self.line_tolerance = line_tolerance;
        self.merge_gap = merge_gap;
        self
    }

    /// Set the merge window.
    pub fn with_merge_window(mut self, window: usize) -> Self {
        self.merge_window = window.max(1);
        self
    }

    /// Set the duplicate overlap threshold.
    pub fn with_overlap_threshold(mut self, threshold: f32) -> Self {
        self.overlap_threshold = threshold;
        self
    }

    /// Set the block and region caps.
    pub fn with_limits(mut self, max_input_blocks: usize, max_regions: usize) -> Self {
        self.max_input_blocks = max_input_blocks;
        self.max_regions = max_regions;
        self
    }

    /// Set the OCR language hint.
    pub fn with_language_hint(mut self, hint: impl Into<String>) -> Self {
        self.language_hint = hint.into();
        self
    }

    /// Replace the engine configurations.
    pub fn with_psm_configs(mut self, configs: Vec<PsmConfig>) -> Self {
        self.psm_configs = configs;
        self
    }
}

impl Default for OcrOptions {
    fn default() -> Self {
        Self {
            confidence_threshold: 5.0,
            allowed_symbols: DEFAULT_SYMBOLS.to_string(),
            line_tolerance: 15.0,
            merge_gap: 80.0,
            merge_window: 5,
            overlap_threshold: 0.85,
            max_input_blocks: 50,
            max_regions: 30,
            title_zone: 0.2,
            language_hint: "kor+eng".to_string(),
            psm_configs: default_psm_configs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ocr_options_builder() {
        let options = OcrOptions::new()
            .with_confidence_threshold(30.0)
            .with_merge_tolerances(10.0, 40.0)
            .with_merge_window(0)
            .with_limits(20, 10);

        assert_eq!(options.confidence_threshold, 30.0);
        assert_eq!(options.line_tolerance, 10.0);
        assert_eq!(options.merge_gap, 40.0);
        assert_eq!(options.merge_window, 1);
        assert_eq!(options.max_input_blocks, 20);
        assert_eq!(options.max_regions, 10);
    }

    #[test]
    fn test_default_options() {
        let options = OcrOptions::default();
        assert_eq!(options.overlap_threshold, 0.85);
        assert_eq!(options.psm_configs.len(), 10);
        assert_eq!(options.language_hint, "kor+eng");
    }

    #[test]
    fn test_psm_language_override() {
        let config = PsmConfig::new("k", 3, 6).with_language("kor");
        assert_eq!(config.language_or("kor+eng"), "kor");
        let config = PsmConfig::new("d", 3, 6);
        assert_eq!(config.language_or("kor+eng"), "kor+eng");
    }
}
