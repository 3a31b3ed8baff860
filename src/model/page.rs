//! Page-level types exchanged with the rasterizer and the document writer.

use serde::{Deserialize, Serialize};

use super::{CanvasSize, PositionedRegion};

/// Encoding of a rasterized page image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// PNG
    #[default]
    Png,
    /// JPEG
    Jpeg,
}

impl ImageFormat {
    /// File extension without the leading dot.
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpg",
        }
    }
}

/// One rasterized page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RasterPage {
    /// Page number (1-indexed)
    pub number: u32,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Encoded image bytes
    #[serde(skip)]
    pub data: Vec<u8>,
    /// Image encoding
    pub format: ImageFormat,
}

impl RasterPage {
    /// Create a new raster page.
    pub fn new(number: u32, width: u32, height: u32, data: Vec<u8>, format: ImageFormat) -> Self {
        Self {
            number,
            width,
            height,
            data,
            format,
        }
    }

    /// Pixel size as a canvas.
    pub fn size(&self) -> CanvasSize {
        CanvasSize::new(self.width as f32, self.height as f32)
    }
}

/// A reconstructed output page handed to the document writer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum OutputPage {
    /// Native text: a title line followed by body lines.
    Text {
        /// Page number (1-indexed)
        number: u32,
        /// Title line
        title: String,
        /// Body lines
        body: Vec<String>,
    },
    /// OCR reconstruction: positioned text regions.
    Regions {
        /// Page number (1-indexed)
        number: u32,
        /// Regions in reading order
        regions: Vec<PositionedRegion>,
    },
    /// Whole-page image without text reconstruction.
    Image {
        /// The page image
        #[serde(flatten)]
        image: RasterPage,
    },
}

impl OutputPage {
    /// Page number (1-indexed).
    pub fn number(&self) -> u32 {
        match self {
            OutputPage::Text { number, .. } | OutputPage::Regions { number, .. } => *number,
            OutputPage::Image { image } => image.number,
        }
    }

    /// Whether the page carries any content.
    pub fn has_content(&self) -> bool {
        match self {
            OutputPage::Text { title, body, .. } => !title.is_empty() || !body.is_empty(),
            OutputPage::Regions { regions, .. } => !regions.is_empty(),
            OutputPage::Image { image } => !image.data.is_empty(),
        }
    }

    /// Plain text of the page, one line per title/body line or region.
    pub fn plain_text(&self) -> String {
        match self {
            OutputPage::Text { title, body, .. } => std::iter::once(title.as_str())
                .chain(body.iter().map(|s| s.as_str()))
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join("\n"),
            OutputPage::Regions { regions, .. } => regions
                .iter()
                .map(|r| r.text.as_str())
                .collect::<Vec<_>>()
                .join("\n"),
            OutputPage::Image { .. } => String::new(),
        }
    }
}
