//! OCR block pipeline: tokens in, positioned regions out.
//!
//! The stages run strictly in sequence, each producing a new generation of
//! blocks:
//!
//! ```text
//! tokens -> filter -> merge -> suppress -> layout -> regions
//! ```

mod dedup;
mod filter;
mod layout;
mod merge;
mod options;

pub use dedup::{text_signature, DuplicateSuppressor, SuppressionState};
pub use filter::{count_accepted, filter_tokens};
pub use layout::{LayoutConfig, LayoutMapper};
pub use merge::BlockMerger;
pub use options::{default_psm_configs, OcrOptions, PsmConfig, DEFAULT_SYMBOLS};

use crate::error::{Error, Result};
use crate::model::{CanvasSize, PositionedRegion, Token};

/// Run the full block pipeline for one page.
///
/// `state` carries text signatures across the pages of one document; the
/// page-local box list is reset here.
pub fn reconstruct_page(
    tokens: &[Token],
    source: CanvasSize,
    dest: CanvasSize,
    options: &OcrOptions,
    state: &mut SuppressionState,
) -> Vec<PositionedRegion> {
    let blocks = filter_tokens(tokens, options.confidence_threshold, &options.allowed_symbols);
    if blocks.is_empty() {
        return Vec::new();
    }

    let merger = BlockMerger::new(options.line_tolerance, options.merge_gap, options.merge_window);
    let merged = merger.merge(&blocks);

    state.begin_page();
    let unique = DuplicateSuppressor::new(options.overlap_threshold).suppress_with(&merged, state);

    let mapper = LayoutMapper::with_config(LayoutConfig {
        max_input_blocks: options.max_input_blocks,
        max_regions: options.max_regions,
        title_zone: options.title_zone,
        ..LayoutConfig::default()
    });
    let regions = mapper.map(&unique, source, dest);
    log::debug!(
        "page pipeline: {} tokens -> {} regions, {} signatures tracked",
        tokens.len(),
        regions.len(),
        state.signature_count()
    );
    regions
}

/// Convenience wrapper around [`reconstruct_page`] with fresh state.
pub fn map_tokens(
    tokens: &[Token],
    source: CanvasSize,
    dest: CanvasSize,
    options: &OcrOptions,
) -> Vec<PositionedRegion> {
    let mut state = SuppressionState::new();
    reconstruct_page(tokens, source, dest, options, &mut state)
}

/// Try every engine configuration and keep the richest result.
///
/// The winner is the configuration whose output has the most tokens
/// surviving the token filter; ties go to the earlier configuration. A
/// configuration that errors is skipped. Fails only when every
/// configuration errors.
pub fn select_best_recognition<F>(
    page: u32,
    options: &OcrOptions,
    mut recognize: F,
) -> Result<Vec<Token>>
where
    F: FnMut(&PsmConfig) -> Result<Vec<Token>>,
{
    let mut best: Option<(usize, Vec<Token>)> = None;
    let mut last_error: Option<Error> = None;

    for config in &options.psm_configs {
        let tokens = match recognize(config) {
            Ok(tokens) => tokens,
            Err(e) => {
                log::debug!("page {}: config '{}' failed: {}", page, config.name, e);
                last_error = Some(e);
                continue;
            }
        };
        let accepted = count_accepted(&tokens, options.confidence_threshold, &options.allowed_symbols);
        log::debug!(
            "page {}: config '{}' -> {} accepted tokens",
            page,
            config.name,
            accepted
        );
        if best.as_ref().map_or(true, |(count, _)| accepted > *count) {
            best = Some((accepted, tokens));
        }
    }

    match (best, last_error) {
        (Some((count, tokens)), _) => {
            log::debug!("page {}: best configuration kept {} tokens", page, count);
            Ok(tokens)
        }
        (None, Some(e)) => Err(Error::Recognition {
            page,
            detail: e.to_string(),
        }),
        (None, None) => Err(Error::Recognition {
            page,
            detail: "no engine configurations".to_string(),
        }),
    }
}
