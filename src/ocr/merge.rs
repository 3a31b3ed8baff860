//! Merging adjacent same-line blocks into line-level blocks.

use crate::model::Block;

/// Merges horizontally adjacent blocks that sit on the same visual line.
#[derive(Debug, Clone)]
pub struct BlockMerger {
    /// Maximum vertical center distance between anchor and candidate
    pub line_tolerance: f32,
    /// Maximum gap between the running right edge and the candidate's left edge
    pub merge_gap: f32,
    /// Blocks examined per anchor, the anchor included
    pub window: usize,
}

impl BlockMerger {
    /// Create a merger with explicit tolerances.
    pub fn new(line_tolerance: f32, merge_gap: f32, window: usize) -> Self {
        Self {
            line_tolerance,
            merge_gap,
            window: window.max(1),
        }
    }

    /// Merge blocks.
    ///
    /// Input order does not matter: blocks are sorted by top edge then left
    /// edge first. Each anchor scans forward over at most `window - 1`
    /// following blocks and stops at the first one that does not continue
    /// its line, which keeps a pass linear on pathological inputs. Passes
    /// repeat until one merges nothing, so the result is a fixed point.
    pub fn merge(&self, blocks: &[Block]) -> Vec<Block> {
        let mut current = blocks.to_vec();
        let mut passes = 0;
        loop {
            current.sort_by(Block::reading_order);
            let before = current.len();
            current = self.merge_pass(&current);
            passes += 1;
            if current.len() == before {
                break;
            }
        }

        log::debug!(
            "BlockMerger: {} -> {} blocks in {} passes",
            blocks.len(),
            current.len(),
            passes
        );
        current
    }

    /// One windowed scan over blocks already in reading order.
    fn merge_pass(&self, sorted: &[Block]) -> Vec<Block> {
        let mut merged = Vec::with_capacity(sorted.len());
        let mut i = 0;
        while i < sorted.len() {
            let anchor = &sorted[i];
            let mut line = anchor.clone();
            let mut j = i + 1;

            while j < sorted.len() && j < i + self.window {
                let next = &sorted[j];
                let same_line =
                    (next.bbox.center_y() - anchor.bbox.center_y()).abs() <= self.line_tolerance;
                let gap = next.bbox.x - line.bbox.right();
                if !same_line || gap.abs() > self.merge_gap {
                    break;
                }
                line = join(line, next);
                j += 1;
            }

            merged.push(line);
            i = j;
        }
        merged
    }
}

impl Default for BlockMerger {
    fn default() -> Self {
        Self::new(15.0, 80.0, 5)
    }
}

fn join(mut line: Block, next: &Block) -> Block {
    line.text.push(' ');
    line.text.push_str(&next.text);
    let right = line.bbox.right().max(next.bbox.right());
    line.bbox.x = line.bbox.x.min(next.bbox.x);
    line.bbox.y = line.bbox.y.min(next.bbox.y);
    line.bbox.width = right - line.bbox.x;
    // Line height is the tallest part, not the vertical union.
    line.bbox.height = line.bbox.height.max(next.bbox.height);
    // A merged line keeps the best confidence of its parts.
    line.confidence = line.confidence.max(next.confidence);
    line.script = line.script.merge(next.script);
    line
}
