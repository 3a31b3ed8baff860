//! Conversion options.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;
use crate::model::{CanvasSize, ImageFormat};
use crate::ocr::OcrOptions;
use crate::text::NormalizeOptions;

/// Rendering quality, selecting the DPI used by each raster tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Quality {
    /// Fast, coarse rendering
    Low,
    /// Balanced
    #[default]
    Medium,
    /// Slow, fine rendering
    High,
}

impl Quality {
    /// DPI for the OCR tier.
    pub fn ocr_dpi(&self) -> u32 {
        match self {
            Quality::Low => 600,
            Quality::Medium => 900,
            Quality::High => 1200,
        }
    }

    /// DPI for the image-only tier.
    pub fn image_dpi(&self) -> u32 {
        match self {
            Quality::Low => 150,
            Quality::Medium => 200,
            Quality::High => 300,
        }
    }
}

impl FromStr for Quality {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Ok(Quality::Low),
            "medium" => Ok(Quality::Medium),
            "high" => Ok(Quality::High),
            other => Err(Error::Other(format!("unknown quality: {}", other))),
        }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Quality::Low => "low",
            Quality::Medium => "medium",
            Quality::High => "high",
        };
        f.write_str(name)
    }
}

/// Options for document conversion.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Rendering quality
    pub quality: Quality,

    /// DPI of the single retry after a failed render
    pub fallback_dpi: u32,

    /// Destination canvas in points
    pub destination: CanvasSize,

    /// Encoding requested from the rasterizer
    pub image_format: ImageFormat,

    /// OCR block pipeline options
    pub ocr: OcrOptions,

    /// Native text normalization options
    pub normalize: NormalizeOptions,

    /// Rename the output after extracted identifier fields
    pub rename_by_fields: bool,

    /// Convert batch documents in parallel
    pub parallel: bool,
}

impl ConvertOptions {
    /// Create new conversion options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the rendering quality.
    pub fn with_quality(mut self, quality: Quality) -> Self {
        self.quality = quality;
        self
    }

    /// Set the retry DPI.
    pub fn with_fallback_dpi(mut self, dpi: u32) -> Self {
        self.fallback_dpi = dpi;
        self
    }

    /// Set the destination canvas.
    pub fn with_destination(mut self, destination: CanvasSize) -> Self {
        self.destination = destination;
        self
    }

    /// Set OCR options.
    pub fn with_ocr_options(mut self, ocr: OcrOptions) -> Self {
        self.ocr = ocr;
        self
    }

    /// Set normalization options.
    pub fn with_normalize_options(mut self, normalize: NormalizeOptions) -> Self {
        self.normalize = normalize;
        self
    }

    /// Enable or disable field-based renaming.
    pub fn with_rename_by_fields(mut self, enabled: bool) -> Self {
        self.rename_by_fields = enabled;
        self
    }

    /// Enable or disable parallel batch conversion.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            quality: Quality::default(),
            fallback_dpi: 200,
            destination: CanvasSize::slide(),
            image_format: ImageFormat::Png,
            ocr: OcrOptions::default(),
            normalize: NormalizeOptions::default(),
            rename_by_fields: true,
            parallel: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quality_dpi() {
        assert_eq!(Quality::Low.ocr_dpi(), 600);
        assert_eq!(Quality::High.ocr_dpi(), 1200);
        assert_eq!(Quality::Medium.image_dpi(), 200);
    }

    #[test]
    fn test_quality_from_str() {
        assert_eq!("HIGH".parse::<Quality>().unwrap(), Quality::High);
        assert!("ultra".parse::<Quality>().is_err());
        assert_eq!(Quality::Low.to_string(), "low");
    }

    #[test]
    fn test_convert_options_builder() {
        let options = ConvertOptions::new()
            .with_quality(Quality::Low)
            .with_fallback_dpi(150)
            .with_rename_by_fields(false)
            .with_parallel(false);

        assert_eq!(options.quality, Quality::Low);
        assert_eq!(options.fallback_dpi, 150);
        assert!(!options.rename_by_fields);
        assert!(!options.parallel);
        assert_eq!(options.destination, CanvasSize::slide());
    }
}
