//! Deciding whether a document's native text layer is worth using.

use crate::convert::TextLayer;
use crate::model::ExtractionVerdict;

/// Samples the first pages of a text layer. Never invokes OCR.
#[derive(Debug, Clone)]
pub struct ExtractabilityClassifier {
    /// Pages sampled from the start of the document
    pub sample_pages: usize,
    /// Average trimmed characters per sampled page must exceed this
    pub min_avg_length: f64,
    /// A page is meaningful with more than this many meaningful words
    pub min_meaningful_words: usize,
    /// Fraction of meaningful pages must exceed this
    pub min_meaningful_ratio: f64,
}

impl ExtractabilityClassifier {
    /// Create a classifier with default thresholds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify a text layer. Pages that fail to read count as empty.
    pub fn classify(&self, layer: &dyn TextLayer) -> ExtractionVerdict {
        let sampled = layer.page_count().min(self.sample_pages);
        let texts: Vec<String> = (0..sampled)
            .map(|index| match layer.page_text(index) {
                Ok(text) => text,
                Err(e) => {
                    log::warn!("classifier: page {} unreadable: {}", index + 1, e);
                    String::new()
                }
            })
            .collect();
        self.classify_texts(&texts)
    }

    /// Classify already-extracted page texts. Only the first
    /// `sample_pages` entries are considered.
    pub fn classify_texts<S: AsRef<str>>(&self, pages: &[S]) -> ExtractionVerdict {
        let sampled = &pages[..pages.len().min(self.sample_pages)];
        if sampled.is_empty() {
            return ExtractionVerdict::default();
        }

        let mut total_length = 0usize;
        let mut meaningful_pages = 0usize;
        for text in sampled {
            let text = text.as_ref().trim();
            total_length += text.chars().count();
            let words = text.split_whitespace().filter(|w| is_meaningful(w)).count();
            if words > self.min_meaningful_words {
                meaningful_pages += 1;
            }
        }

        let count = sampled.len() as f64;
        let avg_text_length = total_length as f64 / count;
        let meaningful_page_ratio = meaningful_pages as f64 / count;
        let extractable =
            avg_text_length > self.min_avg_length && meaningful_page_ratio > self.min_meaningful_ratio;

        log::debug!(
            "classifier: {} pages, avg {:.0} chars, {:.0}% meaningful -> {}",
            sampled.len(),
            avg_text_length,
            meaningful_page_ratio * 100.0,
            if extractable { "native" } else { "ocr" }
        );

        ExtractionVerdict {
            extractable,
            avg_text_length,
            meaningful_page_ratio,
            sampled_pages: sampled.len(),
        }
    }
}

impl Default for ExtractabilityClassifier {
    fn default() -> Self {
        Self {
            sample_pages: 3,
            min_avg_length: 100.0,
            min_meaningful_words: 5,
            min_meaningful_ratio: 0.5,
        }
    }
}

/// Longer than one character and not purely numeric.
fn is_meaningful(word: &str) -> bool {
    word.chars().count() > 1 && !word.chars().all(|c| c.is_numeric())
}
