//! # docrecon
//!
//! Reconstruct paginated documents into positioned, editable text layouts.
//!
//! A document is converted by the first tier that succeeds: the native text
//! layer, then OCR with layout reconstruction, then plain page images. Each
//! conversion produces one artifact and one [`ConversionRecord`].
//!
//! ## Quick Start
//!
//! ```no_run
//! use docrecon::{Docrecon, Quality};
//!
//! fn main() -> docrecon::Result<()> {
//!     let record = Docrecon::new()
//!         .with_quality(Quality::High)
//!         .with_record_log("conversions.jsonl")
//!         .convert("scan.pdf", "scan.json")?;
//!
//!     println!("{:?} -> {:?}", record.method, record.output);
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Tiered fallback**: native text, then OCR, then page images
//! - **Layout reconstruction**: token filtering, line merging, duplicate
//!   suppression and proportional placement on a destination canvas
//! - **Text normalization**: boilerplate stripping, deduplication and
//!   length limits for Korean administrative documents
//! - **Field extraction**: registration, business and document numbers,
//!   phone numbers and dates, with structured output naming
//! - **Batch processing**: Uses Rayon across independent documents

pub mod backend;
pub mod convert;
pub mod error;
pub mod model;
pub mod ocr;
pub mod text;

// Re-export commonly used types
pub use backend::{
    JsonFormat, JsonLayoutWriter, JsonLinesRecordStore, LopdfTextLayer, LopdfTextReader,
    PdftoppmRasterizer, TesseractCli,
};
pub use convert::{
    Conversion, ConvertOptions, DocumentWriter, OcrEngine, Orchestrator, Quality, Rasterizer,
    RecordStore, Stage, TextLayer, TextLayerReader,
};
pub use error::{Error, PageError, PageStage, Result};
pub use model::{
    Block, CanvasSize, ConversionMethod, ConversionRecord, ExtractionVerdict, ImageFormat,
    OutputPage, PositionedRegion, RasterPage, Rect, RegionRole, ScriptFlags, Token,
};
pub use ocr::{map_tokens, reconstruct_page, OcrOptions, PsmConfig, SuppressionState};
pub use text::{
    split_title_body, structured_name, ExtractabilityClassifier, FieldExtractor,
    NormalizeOptions, TextNormalizer,
};

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Normalize raw extracted text with the default options.
///
/// Returns an empty string when nothing usable is left.
///
/// # Example
///
/// ```
/// let text = docrecon::normalize_text("회의 일정은 다음 주 월요일로 변경되었습니다").unwrap();
/// assert_eq!(text, "회의 일정은 다음 주 월요일로 변경되었습니다.");
/// ```
pub fn normalize_text(raw: &str) -> Result<String> {
    let normalizer = TextNormalizer::new(NormalizeOptions::default())?;
    Ok(normalizer.normalize(raw))
}

/// Extract identifying fields from text with the built-in patterns.
///
/// # Example
///
/// ```
/// use docrecon::text::fields::DOCUMENT_NUMBER;
///
/// let fields = docrecon::extract_fields("문서번호: ADM-2024-17").unwrap();
/// assert_eq!(fields[DOCUMENT_NUMBER], "ADM-2024-17");
/// ```
pub fn extract_fields(text: &str) -> Result<BTreeMap<String, String>> {
    Ok(FieldExtractor::new()?.extract(text))
}

/// Decide whether a PDF's native text layer is worth using.
///
/// # Example
///
/// ```no_run
/// let verdict = docrecon::classify_file("document.pdf").unwrap();
/// println!("extractable: {}", verdict.extractable);
/// ```
pub fn classify_file<P: AsRef<Path>>(path: P) -> Result<ExtractionVerdict> {
    let layer = LopdfTextReader::new().open(path.as_ref())?;
    Ok(ExtractabilityClassifier::new().classify(layer.as_ref()))
}

/// Convert a document with the default external tools and options.
///
/// # Example
///
/// ```no_run
/// let record = docrecon::convert_file("scan.pdf", "scan.json").unwrap();
/// println!("{} of {} pages", record.pages_converted, record.pages_total);
/// ```
pub fn convert_file<P: AsRef<Path>, Q: AsRef<Path>>(source: P, output: Q) -> Result<ConversionRecord> {
    Docrecon::new().convert(source, output)
}

/// Builder API for configuring conversions.
///
/// # Example
///
/// ```no_run
/// use docrecon::{CanvasSize, Docrecon, Quality};
///
/// let orchestrator = Docrecon::new()
///     .with_quality(Quality::Low)
///     .with_destination(CanvasSize::new(960.0, 540.0))
///     .with_tesseract_binary("/opt/tesseract/bin/tesseract")
///     .sequential()
///     .build()?;
/// # Ok::<(), docrecon::Error>(())
/// ```
pub struct Docrecon {
    options: ConvertOptions,
    pdftoppm: Option<PathBuf>,
    tesseract: Option<PathBuf>,
    json_format: JsonFormat,
    record_log: Option<PathBuf>,
}

impl Docrecon {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            options: ConvertOptions::default(),
            pdftoppm: None,
            tesseract: None,
            json_format: JsonFormat::Pretty,
            record_log: None,
        }
    }

    /// Start from explicit options.
    pub fn with_options(mut self, options: ConvertOptions) -> Self {
        self.options = options;
        self
    }

    /// Set the quality preset.
    pub fn with_quality(mut self, quality: Quality) -> Self {
        self.options = self.options.with_quality(quality);
        self
    }

    /// Set the destination canvas.
    pub fn with_destination(mut self, destination: CanvasSize) -> Self {
        self.options = self.options.with_destination(destination);
        self
    }

    /// Set OCR options.
    pub fn with_ocr_options(mut self, ocr: OcrOptions) -> Self {
        self.options = self.options.with_ocr_options(ocr);
        self
    }

    /// Keep artifacts at the requested output path.
    pub fn without_renaming(mut self) -> Self {
        self.options = self.options.with_rename_by_fields(false);
        self
    }

    /// Disable parallel batch processing.
    pub fn sequential(mut self) -> Self {
        self.options = self.options.with_parallel(false);
        self
    }

    /// Use a specific `pdftoppm` binary.
    pub fn with_pdftoppm_binary(mut self, binary: impl Into<PathBuf>) -> Self {
        self.pdftoppm = Some(binary.into());
        self
    }

    /// Use a specific `tesseract` binary.
    pub fn with_tesseract_binary(mut self, binary: impl Into<PathBuf>) -> Self {
        self.tesseract = Some(binary.into());
        self
    }

    /// Write compact JSON artifacts.
    pub fn compact_json(mut self) -> Self {
        self.json_format = JsonFormat::Compact;
        self
    }

    /// Append conversion records to a JSON Lines log.
    pub fn with_record_log(mut self, path: impl Into<PathBuf>) -> Self {
        self.record_log = Some(path.into());
        self
    }

    /// Build the orchestrator.
    pub fn build(self) -> Result<Orchestrator> {
        let mut rasterizer = PdftoppmRasterizer::new();
        if let Some(binary) = self.pdftoppm {
            rasterizer = rasterizer.with_binary(binary);
        }
        let mut ocr = TesseractCli::new();
        if let Some(binary) = self.tesseract {
            ocr = ocr.with_binary(binary);
        }

        let mut orchestrator = Orchestrator::new(
            Arc::new(rasterizer),
            Arc::new(ocr),
            Arc::new(LopdfTextReader::new()),
            Arc::new(JsonLayoutWriter::new(self.json_format)),
            self.options,
        )?;
        if let Some(path) = self.record_log {
            orchestrator = orchestrator.with_record_store(Arc::new(JsonLinesRecordStore::new(path)));
        }
        Ok(orchestrator)
    }

    /// Convert one document.
    ///
    /// Returns the record on success, or the error that ended the last tier.
    pub fn convert<P: AsRef<Path>, Q: AsRef<Path>>(self, source: P, output: Q) -> Result<ConversionRecord> {
        let orchestrator = self.build()?;
        orchestrator
            .convert(source.as_ref(), output.as_ref())
            .into_result()
    }
}

impl Default for Docrecon {
    fn default() -> Self {
        Self::new()
    }
}
