//! Data model shared by every reconstruction stage.
//!
//! Tokens come from the OCR engine, blocks are produced and consumed by the
//! merge/suppress/layout stages, and positioned regions and output pages are
//! handed to the document writer. Each stage produces a new generation of
//! values rather than mutating its input.

mod geometry;
mod page;
mod record;
mod region;
mod token;

pub use geometry::Rect;
pub use page::{ImageFormat, OutputPage, RasterPage};
pub use record::{ConversionMethod, ConversionRecord, ExtractionVerdict};
pub use region::{CanvasSize, PositionedRegion, RegionRole};
pub use token::{Block, ScriptFlags, Token};
