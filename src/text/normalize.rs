//! Native text-layer cleanup: boilerplate removal, line and sentence
//! deduplication, bounded output.

use std::collections::HashSet;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

use super::rules::{
    KeywordSet, RuleSet, DOCUMENT_KEYWORDS, LINE_KEYWORDS, RESIDUE_KEYWORDS, SENTENCE_KEYWORDS,
};
use crate::error::{Error, Result};

/// Cleanup passes before the result is taken as stable.
const MAX_PASSES: usize = 16;

/// Options for the text normalizer.
#[derive(Debug, Clone)]
pub struct NormalizeOptions {
    /// Maximum output length in characters
    pub max_length: usize,

    /// Sentences kept at most
    pub max_sentences: usize,

    /// Sentences shorter than this (characters) are dropped
    pub min_sentence_chars: usize,

    /// Lines at or below this length (characters) are dropped
    pub min_line_chars: usize,

    /// Results shorter than this (characters) collapse to empty
    pub min_result_chars: usize,

    /// Footer residue hits that trigger the substantive-sentence fallback
    pub footer_hit_limit: usize,

    /// Sentences kept by the substantive-sentence fallback
    pub max_doc_sentences: usize,

    /// Lines kept when no sentence survives
    pub fallback_lines: usize,

    /// Apply Unicode NFC before anything else
    pub normalize_unicode: bool,
}

impl NormalizeOptions {
    /// Create new options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum output length.
    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length;
        self
    }

    /// Set the sentence cap.
    pub fn with_max_sentences(mut self, max_sentences: usize) -> Self {
        self.max_sentences = max_sentences;
        self
    }

    /// Enable or disable NFC normalization.
    pub fn with_unicode_normalization(mut self, enabled: bool) -> Self {
        self.normalize_unicode = enabled;
        self
    }
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            max_length: 600,
            max_sentences: 4,
            min_sentence_chars: 10,
            min_line_chars: 3,
            min_result_chars: 16,
            footer_hit_limit: 3,
            max_doc_sentences: 2,
            fallback_lines: 8,
            normalize_unicode: true,
        }
    }
}

/// Multi-pass cleaner for native text-layer output.
///
/// Each call owns its own seen-sets; a normalizer can be shared freely.
#[derive(Debug)]
pub struct TextNormalizer {
    options: NormalizeOptions,
    rules: RuleSet,
    control_chars: Regex,
    horizontal_space: Regex,
    key_strip: Regex,
    sentence_break: Regex,
    whitespace: Regex,
    dot_run: Regex,
    line_keywords: KeywordSet,
    sentence_keywords: KeywordSet,
    residue_keywords: KeywordSet,
    document_keywords: KeywordSet,
}

impl TextNormalizer {
    /// Create a normalizer with the built-in boilerplate rules.
    pub fn new(options: NormalizeOptions) -> Result<Self> {
        Self::with_rules(options, RuleSet::boilerplate()?)
    }

    /// Create a normalizer with a custom rule set.
    pub fn with_rules(options: NormalizeOptions, rules: RuleSet) -> Result<Self> {
        Ok(Self {
            options,
            rules,
            control_chars: compile(r"[\x00-\x08\x0B\x0C\x0E-\x1F\x7F]")?,
            horizontal_space: compile(r"[^\S\n]+")?,
            key_strip: compile(r"[\s\W\d_]+")?,
            sentence_break: compile(r"[.!?]\s+")?,
            whitespace: compile(r"\s+")?,
            dot_run: compile(r"\s*\.\s*\.\s*\.+")?,
            line_keywords: KeywordSet::new(LINE_KEYWORDS),
            sentence_keywords: KeywordSet::new(SENTENCE_KEYWORDS),
            residue_keywords: KeywordSet::new(RESIDUE_KEYWORDS),
            document_keywords: KeywordSet::new(DOCUMENT_KEYWORDS),
        })
    }

    /// Get the options.
    pub fn options(&self) -> &NormalizeOptions {
        &self.options
    }

    /// Normalize raw text. Returns an empty string when nothing usable is
    /// left; otherwise the result is at least `min_result_chars` long.
    ///
    /// Cleanup passes repeat until the text stops changing, so normalizing
    /// the result again returns it unchanged.
    pub fn normalize(&self, raw: &str) -> String {
        let mut current = self.clean_once(raw);
        for _ in 1..MAX_PASSES {
            if current.is_empty() {
                break;
            }
            let next = self.clean_once(&current);
            if next == current {
                break;
            }
            current = next;
        }
        current
    }

    fn clean_once(&self, raw: &str) -> String {
        let opts = &self.options;

        let text = if opts.normalize_unicode {
            raw.nfc().collect::<String>()
        } else {
            raw.to_string()
        };
        let text = self.control_chars.replace_all(&text, "");
        let text = self.horizontal_space.replace_all(&text, " ");
        let text = text.trim();
        if text.is_empty() {
            return String::new();
        }

        let stripped = self.rules.strip(text);

        let lines = self.unique_lines(&stripped);
        if lines.is_empty() {
            return String::new();
        }
        let sentences = self.unique_sentences(&lines.join(" "));

        let assembled = if sentences.is_empty() {
            lines
                .iter()
                .take(opts.fallback_lines)
                .cloned()
                .collect::<Vec<_>>()
                .join(" ")
        } else {
            terminate(sentences.join(". "))
        };

        let truncated = self.truncate(assembled);
        let cleaned = self.whitespace.replace_all(&truncated, " ");
        let cleaned = self.dot_run.replace_all(&cleaned, "...");
        let mut result = cleaned.trim().to_string();

        if !result.is_empty() && self.residue_keywords.hits(&result) >= opts.footer_hit_limit {
            let substantive: Vec<&String> = sentences
                .iter()
                .filter(|s| self.document_keywords.matches(s))
                .take(opts.max_doc_sentences)
                .collect();
            if substantive.is_empty() {
                log::debug!("TextNormalizer: footer residue with no substantive sentence");
                return String::new();
            }
            let joined = substantive
                .iter()
                .map(|s| s.as_str())
                .collect::<Vec<_>>()
                .join(". ");
            result = terminate(joined);
        }

        if result.chars().count() < opts.min_result_chars {
            return String::new();
        }
        result
    }

    /// Like [`normalize`](Self::normalize) but reports an empty result as
    /// [`Error::NormalizationEmpty`].
    pub fn try_normalize(&self, raw: &str) -> Result<String> {
        let result = self.normalize(raw);
        if result.is_empty() {
            Err(Error::NormalizationEmpty)
        } else {
            Ok(result)
        }
    }

    /// Lowercased text with whitespace, punctuation and digits removed.
    pub fn dedup_key(&self, text: &str) -> String {
        self.key_strip
            .replace_all(&text.to_lowercase(), "")
            .into_owned()
    }

    fn unique_lines(&self, text: &str) -> Vec<String> {
        let min = self.options.min_line_chars;
        let mut seen = HashSet::new();
        let mut lines = Vec::new();

        for line in text.lines().map(str::trim) {
            if line.chars().count() <= min {
                continue;
            }
            let key = self.dedup_key(line);
            if key.chars().count() <= min || seen.contains(&key) {
                continue;
            }
            if self.line_keywords.matches(line) {
                continue;
            }
            seen.insert(key);
            lines.push(line.to_string());
        }
        lines
    }

    fn unique_sentences(&self, text: &str) -> Vec<String> {
        let opts = &self.options;
        let mut seen = HashSet::new();
        let mut sentences = Vec::new();

        for sentence in self.sentence_break.split(text).map(str::trim) {
            if sentences.len() >= opts.max_sentences {
                break;
            }
            if sentence.chars().count() < opts.min_sentence_chars {
                continue;
            }
            let key = self.dedup_key(sentence);
            if key.chars().count() <= 5 || seen.contains(&key) {
                continue;
            }
            if self.sentence_keywords.matches(sentence) {
                continue;
            }
            seen.insert(key);
            sentences.push(sentence.to_string());
        }
        sentences
    }

    /// Cut to `max_length`, preferring the last terminator past the midpoint.
    fn truncate(&self, text: String) -> String {
        let max = self.options.max_length;
        if text.chars().count() <= max {
            return text;
        }

        let window: String = text.chars().take(max).collect();
        let last_terminator = window
            .char_indices()
            .enumerate()
            .filter(|(_, (_, c))| matches!(c, '.' | '!' | '?'))
            .last()
            .map(|(char_pos, (byte_pos, _))| (char_pos, byte_pos + 1));

        if let Some((char_pos, end)) = last_terminator {
            if char_pos as f64 > max as f64 * 0.5 {
                return window[..end].to_string();
            }
        }

        let cut: String = text.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut.trim_end())
    }
}

/// Split normalized text into a title sentence and body sentences.
///
/// Sentences of two characters or fewer are dropped.
pub fn split_title_body(text: &str) -> Option<(String, Vec<String>)> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let bytes = text.as_bytes();
    for (i, b) in bytes.iter().enumerate() {
        let is_break = matches!(b, b'.' | b'!' | b'?')
            && bytes.get(i + 1).map_or(false, |next| next.is_ascii_whitespace());
        if is_break {
            sentences.push(&text[start..=i]);
            start = i + 1;
        }
    }
    sentences.push(&text[start..]);

    let mut kept = sentences
        .into_iter()
        .map(str::trim)
        .filter(|s| s.chars().count() > 2)
        .map(str::to_string);
    let title = kept.next()?;
    Some((title, kept.collect()))
}

fn terminate(mut text: String) -> String {
    if !text.ends_with(['.', '!', '?']) {
        text.push('.');
    }
    text
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| Error::Pattern {
        pattern: pattern.to_string(),
        detail: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalizer() -> TextNormalizer {
        TextNormalizer::new(NormalizeOptions::default()).unwrap()
    }

    #[test]
    fn test_empty_and_whitespace() {
        let n = normalizer();
        assert_eq!(n.normalize(""), "");
        assert_eq!(n.normalize("   \n\t  "), "");
    }

    #[test]
    fn test_strips_control_characters() {
        let n = normalizer();
        let out = n.normalize("회의\x07 일정은 다음 주 월요일로 변경되었습니다");
        assert_eq!(out, "회의 일정은 다음 주 월요일로 변경되었습니다.");
    }

    #[test]
    fn test_removes_footer_phones() {
        let n = normalizer();
        let raw = "행사 참가 신청서를 제출하여 주시기 바랍니다. 051-512-8803 051-512-0367";
        let out = n.normalize(raw);
        assert!(!out.contains("051-512-8803"));
        assert!(!out.contains("051-512-0367"));
        assert!(out.contains("행사 참가 신청서를 제출하여 주시기 바랍니다"));
    }

    #[test]
    fn test_drops_keyword_lines() {
        let n = normalizer();
        let raw = "올해 사업 계획 검토 결과를 공유합니다\n담당자 홍길동 내선 1234\n";
        let out = n.normalize(raw);
        assert!(out.contains("사업 계획"));
        assert!(!out.contains("홍길동"));
    }

    #[test]
    fn test_deduplicates_lines() {
        let n = normalizer();
        let raw = "회의 결과를 알려드립니다\n회의 결과를 알려드립니다 2\n다음 회의는 금요일입니다";
        let out = n.normalize(raw);
        assert_eq!(out.matches("회의 결과를").count(), 1);
        assert!(out.contains("금요일"));
    }

    #[test]
    fn test_sentence_cap() {
        let n = normalizer();
        let raw = "첫 번째 중요한 문장입니다. 두 번째 중요한 문장입니다. 세 번째 중요한 문장입니다. \
                   네 번째 중요한 문장입니다. 다섯 번째 중요한 문장입니다.";
        let out = n.normalize(raw);
        assert!(out.contains("네 번째"));
        assert!(!out.contains("다섯 번째"));
    }

    #[test]
    fn test_short_result_is_empty() {
        let n = normalizer();
        assert_eq!(n.normalize("짧은 글"), "");
        assert_eq!(n.normalize("abc def"), "");
    }

    #[test]
    fn test_truncates_with_ellipsis() {
        let options = NormalizeOptions::default().with_max_length(40);
        let n = TextNormalizer::new(options).unwrap();
        let raw = "가나다라마바사아자차카타파하 가나다라마바사아자차카타파하 가나다라마바사아자차카타파하";
        let out = n.normalize(raw);
        assert!(out.ends_with("..."));
        assert!(out.chars().count() <= 40);
    }

    #[test]
    fn test_truncates_at_sentence_end() {
        let options = NormalizeOptions::default().with_max_length(36);
        let n = TextNormalizer::new(options).unwrap();
        let raw = "첫 번째 문장은 충분히 긴 문장입니다. 두 번째 문장도 역시 충분히 긴 문장입니다.";
        let out = n.normalize(raw);
        assert_eq!(out, "첫 번째 문장은 충분히 긴 문장입니다.");
    }

    #[test]
    fn test_footer_residue_keeps_substantive_sentences() {
        let n = normalizer();
        let raw = "행사 안내 자료를 송부하오니 확인 바랍니다. 학교 홍보 www.bnue 부산광역시 연제구 일대";
        let out = n.normalize(raw);
        assert_eq!(out, "행사 안내 자료를 송부하오니 확인 바랍니다.");
    }

    #[test]
    fn test_idempotent() {
        let n = normalizer();
        let raw = "공지 사항을 안내드립니다. 신청 기간은 다음 달 말까지입니다!\n\
                   공지 사항을 안내드립니다. 전화 051-512-8803";
        let once = n.normalize(raw);
        assert!(!once.is_empty());
        assert_eq!(n.normalize(&once), once);
    }

    #[test]
    fn test_try_normalize_reports_empty() {
        let n = normalizer();
        assert!(matches!(n.try_normalize("x"), Err(Error::NormalizationEmpty)));
    }

    #[test]
    fn test_split_title_body() {
        let (title, body) =
            split_title_body("회의 안내. 일정은 월요일입니다. 가. 장소는 본관입니다.").unwrap();
        assert_eq!(title, "회의 안내.");
        assert_eq!(body, vec!["일정은 월요일입니다.", "장소는 본관입니다."]);
        assert!(split_title_body("").is_none());
    }
}
