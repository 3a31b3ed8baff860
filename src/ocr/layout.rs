//! Mapping blocks from source raster space onto the destination canvas.

use crate::error::Error;
use crate::model::{Block, CanvasSize, PositionedRegion, Rect, RegionRole};

/// Layout mapper configuration.
#[derive(Debug, Clone)]
pub struct LayoutConfig {
    /// Highest-confidence blocks kept before mapping
    pub max_input_blocks: usize,
    /// Regions emitted at most
    pub max_regions: usize,
    /// Fraction of source height searched for the title candidate
    pub title_zone: f32,
    /// Minimum region width as a fraction of canvas width
    pub min_width_ratio: f32,
    /// Minimum region height as a fraction of canvas height
    pub min_height_ratio: f32,
    /// Margin kept from the right and bottom canvas edges when clipping
    pub edge_margin_ratio: f32,
    /// Regions narrower than this fraction of canvas width are dropped
    pub legible_width_ratio: f32,
    /// Regions shorter than this fraction of canvas height are dropped
    pub legible_height_ratio: f32,
    /// Title font size
    pub title_font_size: u32,
    /// Body font size range
    pub body_font_range: (u32, u32),
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            max_input_blocks: 50,
            max_regions: 30,
            title_zone: 0.2,
            min_width_ratio: 0.10,
            min_height_ratio: 0.02,
            edge_margin_ratio: 0.01,
            legible_width_ratio: 0.05,
            legible_height_ratio: 0.01,
            title_font_size: 18,
            body_font_range: (12, 14),
        }
    }
}

/// Converts blocks into positioned regions on a destination canvas.
pub struct LayoutMapper {
    config: LayoutConfig,
}

impl LayoutMapper {
    /// Create a mapper with default configuration.
    pub fn new() -> Self {
        Self {
            config: LayoutConfig::default(),
        }
    }

    /// Create a mapper with custom configuration.
    pub fn with_config(config: LayoutConfig) -> Self {
        Self { config }
    }

    /// Map blocks into regions.
    ///
    /// Degenerate blocks and regions too small to read are dropped silently.
    /// Every emitted region lies inside `dest`.
    pub fn map(
        &self,
        blocks: &[Block],
        source: CanvasSize,
        dest: CanvasSize,
    ) -> Vec<PositionedRegion> {
        if !source.is_valid() || !dest.is_valid() {
            log::warn!(
                "LayoutMapper: invalid canvas (source {}x{}, dest {}x{})",
                source.width,
                source.height,
                dest.width,
                dest.height
            );
            return Vec::new();
        }

        let mut candidates: Vec<Block> = blocks
            .iter()
            .filter(|block| match check_geometry(block) {
                Ok(()) => true,
                Err(e) => {
                    log::debug!("LayoutMapper: dropping '{}': {}", block.text, e);
                    false
                }
            })
            .cloned()
            .collect();

        if candidates.len() > self.config.max_input_blocks {
            candidates.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
            candidates.truncate(self.config.max_input_blocks);
        }
        candidates.sort_by(Block::reading_order);

        let title = self.title_candidate(&candidates, source);

        let mut regions = Vec::new();
        for (index, block) in candidates.iter().enumerate() {
            if regions.len() >= self.config.max_regions {
                log::debug!(
                    "LayoutMapper: region limit {} reached",
                    self.config.max_regions
                );
                break;
            }
            let is_title = title == Some(index);
            if let Some(region) = self.place(block, is_title, source, dest) {
                regions.push(region);
            }
        }

        log::debug!(
            "LayoutMapper: {} blocks -> {} regions",
            blocks.len(),
            regions.len()
        );
        regions
    }

    /// Index of the largest block whose top edge is in the title zone.
    fn title_candidate(&self, blocks: &[Block], source: CanvasSize) -> Option<usize> {
        let zone = source.height * self.config.title_zone;
        let mut best: Option<(usize, f32)> = None;
        for (index, block) in blocks.iter().enumerate() {
            if block.bbox.y > zone {
                continue;
            }
            let area = block.bbox.area();
            if best.map_or(true, |(_, best_area)| area > best_area) {
                best = Some((index, area));
            }
        }
        best.map(|(index, _)| index)
    }

    fn place(
        &self,
        block: &Block,
        is_title: bool,
        source: CanvasSize,
        dest: CanvasSize,
    ) -> Option<PositionedRegion> {
        let cfg = &self.config;

        let x = (dest.width * block.bbox.x / source.width).clamp(0.0, dest.width);
        let y = (dest.height * block.bbox.y / source.height).clamp(0.0, dest.height);
        let mut width = (dest.width * block.bbox.width / source.width)
            .max(dest.width * cfg.min_width_ratio);
        let mut height = (dest.height * block.bbox.height / source.height)
            .max(dest.height * cfg.min_height_ratio);

        if x + width > dest.width {
            width = dest.width - x - dest.width * cfg.edge_margin_ratio;
        }
        if y + height > dest.height {
            height = dest.height - y - dest.height * cfg.edge_margin_ratio;
        }

        if width <= dest.width * cfg.legible_width_ratio
            || height <= dest.height * cfg.legible_height_ratio
        {
            log::debug!("LayoutMapper: '{}' too small after clipping", block.text);
            return None;
        }

        let (role, font_size, bold) = if is_title {
            (RegionRole::Title, cfg.title_font_size, true)
        } else {
            (RegionRole::Body, self.body_font_size(height), false)
        };

        Some(PositionedRegion {
            text: block.text.clone(),
            rect: Rect::new(x, y, width, height),
            role,
            font_size,
            bold,
            confidence: block.confidence,
        })
    }

    /// Body font size scaled from region height, clamped to the body range.
    fn body_font_size(&self, height: f32) -> u32 {
        let (min, max) = self.config.body_font_range;
        ((height * 0.5) as u32).clamp(min, max)
    }
}

impl Default for LayoutMapper {
    fn default() -> Self {
        Self::new()
    }
}

fn check_geometry(block: &Block) -> Result<(), Error> {
    let b = &block.bbox;
    if !(b.x.is_finite() && b.y.is_finite() && b.width.is_finite() && b.height.is_finite()) {
        return Err(Error::Layout("non-finite coordinates".into()));
    }
    if b.is_degenerate() {
        return Err(Error::Layout(format!(
            "zero-area box {}x{}",
            b.width, b.height
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ScriptFlags;

    fn block(text: &str, x: f32, y: f32, w: f32, h: f32, conf: f32) -> Block {
        Block::new(text, Rect::new(x, y, w, h), conf, ScriptFlags::default())
    }

    const SOURCE: CanvasSize = CanvasSize {
        width: 1000.0,
        height: 1000.0,
    };
    const DEST: CanvasSize = CanvasSize {
        width: 720.0,
        height: 540.0,
    };

    #[test]
    fn test_scales_to_destination() {
        let blocks = vec![block("본문", 500.0, 500.0, 300.0, 100.0, 90.0)];
        let regions = LayoutMapper::new().map(&blocks, SOURCE, DEST);
        assert_eq!(regions.len(), 1);
        let r = &regions[0].rect;
        assert_eq!(r.x, 360.0);
        assert_eq!(r.y, 270.0);
        assert_eq!(r.width, 216.0);
        assert_eq!(r.height, 54.0);
    }

    #[test]
    fn test_minimum_size_enforced() {
        let blocks = vec![block("a", 500.0, 500.0, 10.0, 5.0, 90.0)];
        let regions = LayoutMapper::new().map(&blocks, SOURCE, DEST);
        let r = &regions[0].rect;
        assert!((r.width - 72.0).abs() < 1e-3);
        assert!((r.height - 10.8).abs() < 1e-3);
    }

    #[test]
    fn test_title_candidate_is_largest_in_top_zone() {
        let blocks = vec![
            block("작은 제목", 100.0, 50.0, 100.0, 30.0, 90.0),
            block("큰 제목", 100.0, 120.0, 400.0, 60.0, 90.0),
            block("본문 큰 블록", 100.0, 600.0, 800.0, 200.0, 90.0),
        ];
        let regions = LayoutMapper::new().map(&blocks, SOURCE, DEST);
        let title: Vec<_> = regions
            .iter()
            .filter(|r| r.role == RegionRole::Title)
            .collect();
        assert_eq!(title.len(), 1);
        assert_eq!(title[0].text, "큰 제목");
        assert_eq!(title[0].font_size, 18);
        assert!(title[0].bold);
        for r in regions.iter().filter(|r| r.role == RegionRole::Body) {
            assert!((12..=14).contains(&r.font_size));
            assert!(!r.bold);
        }
    }

    #[test]
    fn test_no_title_outside_zone() {
        let blocks = vec![block("본문", 100.0, 400.0, 100.0, 30.0, 90.0)];
        let regions = LayoutMapper::new().map(&blocks, SOURCE, DEST);
        assert_eq!(regions[0].role, RegionRole::Body);
    }

    #[test]
    fn test_clips_to_destination() {
        let blocks = vec![
            block("right edge", 980.0, 100.0, 300.0, 50.0, 90.0),
            block("bottom edge", 100.0, 990.0, 300.0, 50.0, 90.0),
            block("corner", 900.0, 950.0, 90.0, 40.0, 90.0),
        ];
        let regions = LayoutMapper::new().map(&blocks, SOURCE, DEST);
        for r in &regions {
            assert!(r.fits_within(DEST), "{:?} escapes canvas", r.rect);
        }
    }

    #[test]
    fn test_drops_illegible_after_clipping() {
        // Starts 2% from the right edge, leaving ~1% width after the margin.
        let blocks = vec![block("sliver", 980.0, 100.0, 10.0, 50.0, 90.0)];
        assert!(LayoutMapper::new().map(&blocks, SOURCE, DEST).is_empty());
    }

    #[test]
    fn test_drops_degenerate_blocks() {
        let blocks = vec![
            block("zero", 10.0, 10.0, 0.0, 10.0, 90.0),
            block("nan", f32::NAN, 10.0, 10.0, 10.0, 90.0),
            block("ok", 10.0, 400.0, 100.0, 30.0, 90.0),
        ];
        let regions = LayoutMapper::new().map(&blocks, SOURCE, DEST);
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].text, "ok");
    }

    #[test]
    fn test_caps_input_by_confidence_and_output_count() {
        let blocks: Vec<Block> = (0..60)
            .map(|i| block(&format!("b{i}"), 10.0, i as f32 * 16.0, 100.0, 10.0, i as f32))
            .collect();
        let config = LayoutConfig::default();
        let regions = LayoutMapper::with_config(config).map(&blocks, SOURCE, DEST);
        assert_eq!(regions.len(), 30);
        // Only the 50 most confident blocks (b10..b59) are considered.
        assert!(regions.iter().all(|r| r.confidence >= 10.0));
    }

    #[test]
    fn test_invalid_canvas_yields_nothing() {
        let blocks = vec![block("x", 0.0, 0.0, 10.0, 10.0, 90.0)];
        let zero = CanvasSize::new(0.0, 100.0);
        assert!(LayoutMapper::new().map(&blocks, zero, DEST).is_empty());
    }
}
