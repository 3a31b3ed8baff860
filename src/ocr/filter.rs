//! Token filtering: confidence gate plus character-class whitelist.

use crate::model::{Block, ScriptFlags, Token};

/// Turn OCR tokens into blocks, dropping unusable ones.
///
/// A token survives when its confidence is at least `threshold`, its trimmed
/// text is non-empty, and the text contains a letter, a digit, or one of
/// `symbols`. Scanned administrative documents mix Hangul, Latin, digits and
/// punctuation freely, so acceptance is whitelist-based.
pub fn filter_tokens(tokens: &[Token], threshold: f32, symbols: &str) -> Vec<Block> {
    let blocks: Vec<Block> = tokens
        .iter()
        .filter_map(|token| accept(token, threshold, symbols))
        .collect();

    log::debug!(
        "TokenFilter: kept {} of {} tokens (threshold {})",
        blocks.len(),
        tokens.len(),
        threshold
    );
    blocks
}

/// Count the tokens [`filter_tokens`] would keep without building blocks.
pub fn count_accepted(tokens: &[Token], threshold: f32, symbols: &str) -> usize {
    tokens
        .iter()
        .filter(|token| accept(token, threshold, symbols).is_some())
        .count()
}

fn accept(token: &Token, threshold: f32, symbols: &str) -> Option<Block> {
    // NaN confidence never passes
    if !(token.confidence >= threshold) {
        return None;
    }
    let text = token.text.trim();
    if text.is_empty() {
        return None;
    }
    let script = ScriptFlags::classify(text, symbols);
    if !script.any() {
        return None;
    }
    Some(Block::new(text, token.bbox, token.confidence, script))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocr::options::DEFAULT_SYMBOLS;

    #[test]
    fn test_drops_low_confidence() {
        let tokens = vec![
            Token::new("안내", 0.0, 0.0, 10.0, 10.0, 4.0),
            Token::new("문서", 0.0, 0.0, 10.0, 10.0, 5.0),
        ];
        let blocks = filter_tokens(&tokens, 5.0, DEFAULT_SYMBOLS);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].text, "문서");
    }

    #[test]
    fn test_drops_empty_and_trims() {
        let tokens = vec![
            Token::new("   ", 0.0, 0.0, 10.0, 10.0, 99.0),
            Token::new("", 0.0, 0.0, 10.0, 10.0, 99.0),
            Token::new("  제목 ", 0.0, 0.0, 10.0, 10.0, 99.0),
        ];
        let blocks = filter_tokens(&tokens, 5.0, DEFAULT_SYMBOLS);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].text, "제목");
        assert!(blocks[0].script.has_hangul);
    }

    #[test]
    fn test_whitelist_accepts_punctuation_only() {
        let tokens = vec![
            Token::new("(", 0.0, 0.0, 10.0, 10.0, 50.0),
            Token::new("※", 0.0, 0.0, 10.0, 10.0, 50.0),
        ];
        let blocks = filter_tokens(&tokens, 5.0, DEFAULT_SYMBOLS);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].text, "(");
        assert!(blocks[0].script.has_symbol);
    }

    #[test]
    fn test_all_filtered_yields_empty() {
        let tokens = vec![Token::new("x", 0.0, 0.0, 1.0, 1.0, f32::NAN)];
        assert!(filter_tokens(&tokens, 5.0, DEFAULT_SYMBOLS).is_empty());
        assert!(filter_tokens(&[], 5.0, DEFAULT_SYMBOLS).is_empty());
    }

    #[test]
    fn test_count_matches_filter() {
        let tokens = vec![
            Token::new("a", 0.0, 0.0, 1.0, 1.0, 90.0),
            Token::new("b", 0.0, 0.0, 1.0, 1.0, 1.0),
            Token::new("7", 0.0, 0.0, 1.0, 1.0, 90.0),
        ];
        assert_eq!(count_accepted(&tokens, 5.0, DEFAULT_SYMBOLS), 2);
    }
}
