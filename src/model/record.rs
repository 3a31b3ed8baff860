//! Classification verdicts and conversion provenance records.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::PageError;

/// Whether a document's native text layer can be trusted.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ExtractionVerdict {
    /// Native text extraction is trustworthy
    pub extractable: bool,
    /// Mean extracted character count over the sampled pages
    pub avg_text_length: f64,
    /// Fraction of sampled pages with enough meaningful words
    pub meaningful_page_ratio: f64,
    /// Number of pages sampled
    pub sampled_pages: usize,
}

/// The reconstruction tier that produced the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversionMethod {
    /// Native text layer
    Native,
    /// OCR reconstruction
    Ocr,
    /// Whole-page images
    Image,
}

impl ConversionMethod {
    /// Stable lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ConversionMethod::Native => "native",
            ConversionMethod::Ocr => "ocr",
            ConversionMethod::Image => "image",
        }
    }
}

impl fmt::Display for ConversionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Provenance of one conversion attempt. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionRecord {
    /// Tier that succeeded, `None` when every tier failed
    pub method: Option<ConversionMethod>,
    /// Whether the conversion produced an output artifact
    pub success: bool,
    /// Identifier fields extracted from the document text
    pub extracted_fields: BTreeMap<String, String>,
    /// Wall time of the whole attempt in milliseconds
    pub processing_time_ms: u64,
    /// Source document
    pub source: PathBuf,
    /// Final output artifact, if any
    pub output: Option<PathBuf>,
    /// Pages in the document as seen by the successful tier
    pub pages_total: usize,
    /// Pages that produced content
    pub pages_converted: usize,
    /// Per-page failures of the successful tier
    pub page_errors: Vec<PageError>,
    /// Diagnostic of the last failing tier
    pub diagnostic: Option<String>,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

impl ConversionRecord {
    /// Record a successful conversion.
    #[allow(clippy::too_many_arguments)]
    pub fn succeeded(
        method: ConversionMethod,
        source: PathBuf,
        output: PathBuf,
        extracted_fields: BTreeMap<String, String>,
        pages_total: usize,
        pages_converted: usize,
        page_errors: Vec<PageError>,
        processing_time_ms: u64,
    ) -> Self {
        Self {
            method: Some(method),
            success: true,
            extracted_fields,
            processing_time_ms,
            source,
            output: Some(output),
            pages_total,
            pages_converted,
            page_errors,
            diagnostic: None,
            created_at: Utc::now(),
        }
    }

    /// Record a failed conversion.
    pub fn failed(source: PathBuf, diagnostic: String, processing_time_ms: u64) -> Self {
        Self {
            method: None,
            success: false,
            extracted_fields: BTreeMap::new(),
            processing_time_ms,
            source,
            output: None,
            pages_total: 0,
            pages_converted: 0,
            page_errors: Vec::new(),
            diagnostic: Some(diagnostic),
            created_at: Utc::now(),
        }
    }

    /// Fraction of pages that produced content.
    pub fn success_ratio(&self) -> f64 {
        if self.pages_total == 0 {
            0.0
        } else {
            self.pages_converted as f64 / self.pages_total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_record() {
        let record = ConversionRecord::failed(PathBuf::from("a.pdf"), "boom".into(), 12);
        assert!(!record.success);
        assert_eq!(record.method, None);
        assert_eq!(record.diagnostic.as_deref(), Some("boom"));
        assert_eq!(record.success_ratio(), 0.0);
    }

    #[test]
    fn test_success_ratio() {
        let record = ConversionRecord::succeeded(
            ConversionMethod::Ocr,
            PathBuf::from("a.pdf"),
            PathBuf::from("a.json"),
            BTreeMap::new(),
            4,
            3,
            vec![],
            100,
        );
        assert_eq!(record.success_ratio(), 0.75);
        assert_eq!(record.method.map(|m| m.as_str()), Some("ocr"));
    }

    #[test]
    fn test_method_serializes_lowercase() {
        let json = serde_json::to_string(&ConversionMethod::Native).unwrap();
        assert_eq!(json, "\"native\"");
    }
}
