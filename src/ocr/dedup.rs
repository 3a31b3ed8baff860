//! Duplicate suppression by text signature and bounding-box overlap.

use std::collections::HashSet;

use crate::model::{Block, Rect};

/// Accumulated duplicate-detection state for one document conversion.
///
/// Text signatures persist for the lifetime of the state so repeated
/// boilerplate on later pages is dropped too. Accepted boxes are page-local
/// and cleared by [`SuppressionState::begin_page`].
#[derive(Debug, Default)]
pub struct SuppressionState {
    signatures: HashSet<String>,
    accepted: Vec<Rect>,
}

impl SuppressionState {
    /// Create empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget the previous page's accepted boxes.
    pub fn begin_page(&mut self) {
        self.accepted.clear();
    }

    /// Number of distinct text signatures seen so far.
    pub fn signature_count(&self) -> usize {
        self.signatures.len()
    }

    fn is_duplicate(&self, signature: &str, bbox: &Rect, threshold: f32) -> Option<Duplicate> {
        if !signature.is_empty() && self.signatures.contains(signature) {
            return Some(Duplicate::Text);
        }
        self.accepted
            .iter()
            .map(|prev| bbox.overlap_ratio(prev))
            .find(|ratio| *ratio > threshold)
            .map(Duplicate::Position)
    }

    fn accept(&mut self, signature: String, bbox: Rect) {
        if !signature.is_empty() {
            self.signatures.insert(signature);
        }
        self.accepted.push(bbox);
    }
}

#[derive(Debug)]
enum Duplicate {
    Text,
    Position(f32),
}

/// Whitespace-stripped, case-folded text used as a duplicate key.
pub fn text_signature(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Drops blocks that repeat already-accepted text or mostly cover an
/// already-accepted block.
///
/// Blocks are processed top-to-bottom, left-to-right, so the earlier block
/// wins. Dropping a legitimate overlapping block is preferred over the same
/// text appearing twice on the reconstructed page.
#[derive(Debug, Clone)]
pub struct DuplicateSuppressor {
    /// Overlap ratio above which a block counts as a positional duplicate
    pub overlap_threshold: f32,
}

impl DuplicateSuppressor {
    /// Create a suppressor with the given overlap threshold.
    pub fn new(overlap_threshold: f32) -> Self {
        Self { overlap_threshold }
    }

    /// Suppress duplicates using fresh, single-page state.
    pub fn suppress(&self, blocks: &[Block]) -> Vec<Block> {
        let mut state = SuppressionState::new();
        self.suppress_with(blocks, &mut state)
    }

    /// Suppress duplicates against accumulated `state`, updating it.
    pub fn suppress_with(&self, blocks: &[Block], state: &mut SuppressionState) -> Vec<Block> {
        let mut sorted = blocks.to_vec();
        sorted.sort_by(Block::reading_order);

        let mut kept = Vec::with_capacity(sorted.len());
        for block in sorted {
            let signature = text_signature(&block.text);
            match state.is_duplicate(&signature, &block.bbox, self.overlap_threshold) {
                Some(Duplicate::Text) => {
                    log::debug!("DuplicateSuppressor: repeated text '{}'", block.text);
                }
                Some(Duplicate::Position(ratio)) => {
                    log::debug!(
                        "DuplicateSuppressor: '{}' overlaps an earlier block ({:.0}%)",
                        block.text,
                        ratio * 100.0
                    );
                }
                None => {
                    state.accept(signature, block.bbox);
                    kept.push(block);
                }
            }
        }

        log::debug!(
            "DuplicateSuppressor: kept {} of {} blocks",
            kept.len(),
            blocks.len()
        );
        kept
    }
}

impl Default for DuplicateSuppressor {
    fn default() -> Self {
        Self::new(0.85)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ScriptFlags;

    fn block(text: &str, x: f32, y: f32, w: f32, h: f32) -> Block {
        Block::new(text, Rect::new(x, y, w, h), 90.0, ScriptFlags::default())
    }

    #[test]
    fn test_signature_normalization() {
        assert_eq!(text_signature(" Hello  World "), "helloworld");
        assert_eq!(text_signature("안 내"), "안내");
    }

    #[test]
    fn test_drops_repeated_text() {
        let blocks = vec![
            block("공지 사항", 0.0, 0.0, 100.0, 20.0),
            block("공지사항", 0.0, 200.0, 100.0, 20.0),
            block("다른 내용", 0.0, 300.0, 100.0, 20.0),
        ];
        let kept = DuplicateSuppressor::default().suppress(&blocks);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].text, "공지 사항");
        assert_eq!(kept[1].text, "다른 내용");
    }

    #[test]
    fn test_drops_overlapping_box_earlier_wins() {
        let blocks = vec![
            block("later", 2.0, 11.0, 100.0, 20.0),
            block("first", 0.0, 10.0, 100.0, 20.0),
        ];
        let kept = DuplicateSuppressor::default().suppress(&blocks);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].text, "first");
    }

    #[test]
    fn test_keeps_moderate_overlap() {
        let blocks = vec![
            block("a", 0.0, 0.0, 100.0, 20.0),
            block("b", 50.0, 0.0, 100.0, 20.0),
        ];
        assert_eq!(DuplicateSuppressor::default().suppress(&blocks).len(), 2);
    }

    #[test]
    fn test_no_pair_exceeds_threshold() {
        let mut blocks = Vec::new();
        for i in 0..20 {
            let f = i as f32;
            blocks.push(block(&format!("t{i}"), f * 7.0, f * 3.0, 60.0, 30.0));
        }
        let suppressor = DuplicateSuppressor::default();
        let kept = suppressor.suppress(&blocks);
        for (i, a) in kept.iter().enumerate() {
            for b in kept.iter().skip(i + 1) {
                assert!(a.bbox.overlap_ratio(&b.bbox) <= suppressor.overlap_threshold);
            }
        }
    }

    #[test]
    fn test_state_carries_signatures_across_pages() {
        let suppressor = DuplicateSuppressor::default();
        let mut state = SuppressionState::new();

        let page1 = vec![block("기관 주소", 0.0, 500.0, 100.0, 20.0)];
        assert_eq!(suppressor.suppress_with(&page1, &mut state).len(), 1);

        state.begin_page();
        let page2 = vec![
            block("기관 주소", 0.0, 500.0, 100.0, 20.0),
            block("새 본문", 0.0, 500.0, 100.0, 20.0),
        ];
        let kept = suppressor.suppress_with(&page2, &mut state);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].text, "새 본문");
        assert_eq!(state.signature_count(), 2);
    }
}
