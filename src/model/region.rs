//! Blocks mapped into destination-canvas coordinates.

use serde::{Deserialize, Serialize};

use super::Rect;

/// Width and height of a raster or canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasSize {
    /// Width
    pub width: f32,
    /// Height
    pub height: f32,
}

impl CanvasSize {
    /// Create a new canvas size.
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Default 10 x 7.5 inch slide, in points.
    pub fn slide() -> Self {
        Self::new(720.0, 540.0)
    }

    /// Whether both dimensions are positive.
    pub fn is_valid(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }
}

impl Default for CanvasSize {
    fn default() -> Self {
        Self::slide()
    }
}

/// Role of a region on the reconstructed page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegionRole {
    /// The page's title candidate
    Title,
    /// Any other text
    Body,
}

/// A block placed on the destination canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionedRegion {
    /// Text content
    pub text: String,
    /// Placement in destination canvas units
    #[serde(flatten)]
    pub rect: Rect,
    /// Title or body
    pub role: RegionRole,
    /// Font size in points
    pub font_size: u32,
    /// Whether the text is set bold
    pub bold: bool,
    /// Confidence of the source block (0-100)
    pub confidence: f32,
}

impl PositionedRegion {
    /// Whether the region lies fully inside `canvas`.
    pub fn fits_within(&self, canvas: CanvasSize) -> bool {
        self.rect.x >= 0.0
            && self.rect.y >= 0.0
            && self.rect.width > 0.0
            && self.rect.height > 0.0
            && self.rect.right() <= canvas.width
            && self.rect.bottom() <= canvas.height
    }
}
