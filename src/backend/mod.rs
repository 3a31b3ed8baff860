//! Concrete collaborators: lopdf text layer, external rasterizer and OCR
//! processes, JSON layout writer, JSON Lines record log.

mod json_writer;
mod lopdf_text;
mod pdftoppm;
mod record_store;
mod tesseract;

pub use json_writer::{to_layout_json, JsonFormat, JsonLayoutWriter};
pub use lopdf_text::{LopdfTextLayer, LopdfTextReader};
pub use pdftoppm::{image_size, PdftoppmRasterizer};
pub use record_store::JsonLinesRecordStore;
pub use tesseract::{parse_tsv, TesseractCli};
