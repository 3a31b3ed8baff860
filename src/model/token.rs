//! OCR tokens and the line-level blocks built from them.

use serde::{Deserialize, Serialize};

use super::Rect;

/// A single recognized text unit produced by the OCR engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    /// Recognized text
    pub text: String,
    /// Bounding box in source raster pixels
    #[serde(flatten)]
    pub bbox: Rect,
    /// Recognition confidence (0-100)
    pub confidence: f32,
}

impl Token {
    /// Create a new token.
    pub fn new(
        text: impl Into<String>,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        confidence: f32,
    ) -> Self {
        Self {
            text: text.into(),
            bbox: Rect::new(x, y, width, height),
            confidence,
        }
    }
}

/// Which character classes a block's text contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScriptFlags {
    /// Contains Hangul syllables or jamo
    pub has_hangul: bool,
    /// Contains any alphabetic character (Hangul included)
    pub has_letter: bool,
    /// Contains a decimal digit
    pub has_digit: bool,
    /// Contains an allowed punctuation or space character
    pub has_symbol: bool,
}

impl ScriptFlags {
    /// Classify the characters of `text` against `symbols`.
    pub fn classify(text: &str, symbols: &str) -> Self {
        let mut flags = Self::default();
        for c in text.chars() {
            flags.has_hangul |= is_hangul(c);
            flags.has_letter |= c.is_alphabetic();
            flags.has_digit |= c.is_numeric();
            flags.has_symbol |= symbols.contains(c);
        }
        flags
    }

    /// Whether any accepted class is present.
    pub fn any(&self) -> bool {
        self.has_hangul || self.has_letter || self.has_digit || self.has_symbol
    }

    /// Combine the flags of two blocks.
    pub fn merge(self, other: Self) -> Self {
        Self {
            has_hangul: self.has_hangul || other.has_hangul,
            has_letter: self.has_letter || other.has_letter,
            has_digit: self.has_digit || other.has_digit,
            has_symbol: self.has_symbol || other.has_symbol,
        }
    }
}

fn is_hangul(c: char) -> bool {
    matches!(c, '가'..='힣' | 'ㄱ'..='ㅎ' | 'ㅏ'..='ㅣ')
}

/// One or more tokens merged into a line-level text unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Text content
    pub text: String,
    /// Bounding box in source raster pixels
    #[serde(flatten)]
    pub bbox: Rect,
    /// Confidence (0-100)
    pub confidence: f32,
    /// Character classes present in the text
    pub script: ScriptFlags,
}

impl Block {
    /// Create a new block.
    pub fn new(text: impl Into<String>, bbox: Rect, confidence: f32, script: ScriptFlags) -> Self {
        Self {
            text: text.into(),
            bbox,
            confidence,
            script,
        }
    }

    /// Ordering key used by every stage: top edge, then left edge.
    pub fn reading_order(a: &Block, b: &Block) -> std::cmp::Ordering {
        a.bbox
            .y
            .total_cmp(&b.bbox.y)
            .then(a.bbox.x.total_cmp(&b.bbox.x))
    }
}
