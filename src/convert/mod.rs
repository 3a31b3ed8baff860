//! Document conversion: collaborator traits and the tiered orchestrator.
//!
//! The orchestrator never touches PDFs, images or OCR engines directly. It
//! drives five collaborators through the traits below, so any of them can
//! be swapped for a different tool or an in-memory fake.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! use docrecon::backend::{JsonLayoutWriter, LopdfTextReader, PdftoppmRasterizer, TesseractCli};
//! use docrecon::convert::{ConvertOptions, Orchestrator};
//!
//! fn main() -> docrecon::Result<()> {
//!     let orchestrator = Orchestrator::new(
//!         Arc::new(PdftoppmRasterizer::new()),
//!         Arc::new(TesseractCli::new()),
//!         Arc::new(LopdfTextReader::new()),
//!         Arc::new(JsonLayoutWriter::pretty()),
//!         ConvertOptions::default(),
//!     )?;
//!
//!     let conversion = orchestrator.convert(Path::new("scan.pdf"), Path::new("scan.json"));
//!     println!("{:?}", conversion.record.method);
//!     Ok(())
//! }
//! ```

mod options;
mod orchestrator;

pub use options::{ConvertOptions, Quality};
pub use orchestrator::{Conversion, Orchestrator, Stage};

use std::path::Path;

use crate::error::{Error, Result};
use crate::model::{CanvasSize, ConversionRecord, ImageFormat, OutputPage, RasterPage, Token};
use crate::ocr::PsmConfig;

/// Renders document pages to images.
pub trait Rasterizer: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// Render every page at `dpi`, one image per page in page order.
    ///
    /// Fails with [`Error::Render`] when the source is corrupt or
    /// password-protected.
    fn render(&self, path: &Path, dpi: u32, format: ImageFormat) -> Result<Vec<RasterPage>>;
}

/// Recognizes text on a page image.
pub trait OcrEngine: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// Recognize `image` with one engine configuration.
    fn recognize(&self, image: &RasterPage, language: &str, config: &PsmConfig)
        -> Result<Vec<Token>>;
}

/// An opened native text layer.
pub trait TextLayer {
    /// Number of pages.
    fn page_count(&self) -> usize;

    /// Text of the page at `index` (0-based).
    fn page_text(&self, index: usize) -> Result<String>;
}

/// Opens native text layers.
pub trait TextLayerReader: Send + Sync {
    /// Open the text layer of the document at `path`.
    fn open(&self, path: &Path) -> Result<Box<dyn TextLayer>>;
}

/// Serializes reconstructed pages into the target container.
pub trait DocumentWriter: Send + Sync {
    /// File extension of the produced artifact, without the dot.
    fn extension(&self) -> &str;

    /// Write `pages` laid out on `canvas` to `output`.
    fn write(&self, pages: &[OutputPage], canvas: CanvasSize, output: &Path) -> Result<()>;
}

/// Persists conversion records.
pub trait RecordStore: Send + Sync {
    /// Save a record and return its id.
    fn save_record(&self, record: &ConversionRecord) -> Result<u64>;
}

/// In-memory text layer, one string per page.
impl TextLayer for Vec<String> {
    fn page_count(&self) -> usize {
        self.len()
    }

    fn page_text(&self, index: usize) -> Result<String> {
        self.get(index)
            .cloned()
            .ok_or_else(|| Error::TextLayer(format!("page index {} out of range", index)))
    }
}
