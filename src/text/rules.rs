//! Boilerplate rule tables and keyword sets.
//!
//! The source corpus is dominated by one recurring footer template, and OCR
//! or text-layer noise breaks it up unpredictably. Rules are therefore
//! layered: the whole footer first, then its sub-phrases, then individual
//! fields, then generic labelled contact fields and markers. Higher
//! priority runs first; equal priorities keep table order.

use regex::Regex;

use crate::error::{Error, Result};

/// One declarative removal rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleSpec {
    /// Regular expression removed wherever it matches
    pub pattern: &'static str,
    /// Higher runs earlier
    pub priority: u16,
}

const fn rule(pattern: &'static str, priority: u16) -> RuleSpec {
    RuleSpec { pattern, priority }
}

/// Footer and metadata removal rules.
pub const BOILERPLATE_RULES: &[RuleSpec] = &[
    // Whole footer template
    rule(
        r"MARSCONTEST.*?의학전문대학원입학추가시험.*?부산대.*?메이커발명융합연구소.*?박상규.*?선임연구원.*?\(010-3577-1389\).*?붙임.*?참여.*?강사.*?별첨하오니.*?각.*?1부.*?붙임.*?행사.*?영문.*?2025.*?30일.*?수.*?47503.*?부산광역시.*?연제구.*?금련로.*?24.*?거제동.*?부산대학교.*?www\.bnue\.ac\.kr.*?전화번호.*?051-512-8803.*?팩스번호.*?051-512-0367.*?전자",
        100,
    ),
    // Footer sub-phrases
    rule(r"MARSCONTEST.*?의학전문대학원입학추가시험", 90),
    rule(r"부산대.*?메이커발명융합연구소", 90),
    rule(r"박상규.*?선임연구원.*?\(010-3577-1389\)", 90),
    rule(r"붙임.*?참여.*?강사.*?별첨하오니.*?각.*?1부", 90),
    rule(r"붙임.*?행사.*?영문.*?2025.*?30일.*?수", 90),
    rule(r"47503.*?부산광역시.*?연제구.*?금련로.*?24", 90),
    rule(r"거제동.*?부산대학교", 90),
    rule(r"www\.bnue\.ac\.kr", 90),
    rule(r"전화번호.*?051-512-8803.*?팩스번호.*?051-512-0367", 90),
    rule(r"전자.*?메일.*?www\.bnue\.ac\.kr", 90),
    // Individual footer fields
    rule(r"051-512-8803", 80),
    rule(r"051-512-0367", 80),
    rule(r"010-3577-1389", 80),
    rule(r"부산광역시.*?연제구.*?금련로.*?24", 80),
    rule(r"메이커발명융합연구소", 80),
    rule(r"의학전문대학원입학추가시험", 80),
    rule(r"선임연구원.*?박상규", 80),
    rule(r"박상규.*?선임연구원", 80),
    // Labelled contact fields
    rule(r"전화\s*[:：]?\s*\d{2,3}-\d{3,4}-\d{4}", 70),
    rule(r"팩스\s*[:：]?\s*\d{2,3}-\d{3,4}-\d{4}", 70),
    rule(r"휴대폰\s*[:：]?\s*\d{3}-\d{4}-\d{4}", 70),
    rule(r"이메일\s*[:：]?\s*[\w.-]+@[\w.-]+\.[a-zA-Z]{2,}", 70),
    rule(r"홈페이지\s*[:：]?\s*www\.[\w.-]+", 70),
    rule(r"주소\s*[:：]?\s*\d{5}.*?[시도].*?[구군].*?[동읍면]", 70),
    rule(r"우편번호\s*[:：]?\s*\d{5}", 70),
    rule(r"담당자\s*[:：]?.*?\d{3}-\d{4}-\d{4}", 60),
    rule(r"연락처\s*[:：]?.*?\d{2,3}-\d{3,4}-\d{4}", 60),
    rule(r"문의\s*[:：]?.*?\d{2,3}-\d{3,4}-\d{4}", 60),
    // Institution names
    rule(r"[가-힣]+대학교.*?[가-힣]+연구소", 50),
    rule(r"[가-힣]+연구소.*?[가-힣]+대학교", 50),
    rule(r"[가-힣]+학과.*?[가-힣]+대학", 50),
    // Date stamps
    rule(r"\d{4}년\s*\d{1,2}월\s*\d{1,2}일", 40),
    rule(r"\d{4}\.\s*\d{1,2}\.\s*\d{1,2}", 40),
    rule(r"\d{4}-\d{1,2}-\d{1,2}", 40),
    // Page markers
    rule(r"페이지\s*\d+\s*/\s*\d+", 30),
    rule(r"\d+\s*/\s*\d+\s*페이지", 30),
    rule(r"- \d+ -", 30),
    rule(r"\[\s*\d+\s*\]", 30),
    // File metadata
    rule(r"작성자\s*[:：]?.*?수정일\s*[:：]?", 20),
    rule(r"생성일\s*[:：]?.*?수정일\s*[:：]?", 20),
    rule(r"파일명\s*[:：]?.*?\.pdf", 20),
    rule(r"문서번호\s*[:：]?.*?-\d+", 20),
];

/// Keywords that disqualify a whole line.
pub const LINE_KEYWORDS: &[&str] = &[
    "marscontest",
    "부산대",
    "메이커발명",
    "연구소",
    "박상규",
    "선임연구원",
    "전화번호",
    "팩스번호",
    "주소",
    "우편번호",
    "연락처",
    "담당자",
    "문의",
    "이메일",
    "홈페이지",
];

/// Keywords that disqualify a sentence.
pub const SENTENCE_KEYWORDS: &[&str] = &[
    "marscontest",
    "부산대",
    "메이커발명",
    "연구소",
    "박상규",
    "전화",
    "팩스",
    "주소",
    "연락",
    "담당",
    "문의",
];

/// Footer remnants counted in the final density check.
pub const RESIDUE_KEYWORDS: &[&str] = &[
    "marscontest",
    "부산대",
    "메이커발명",
    "연구소",
    "박상규",
    "051-512",
    "010-3577",
    "www.bnue",
    "부산광역시",
    "연제구",
];

/// Keywords marking substantive administrative content.
pub const DOCUMENT_KEYWORDS: &[&str] = &[
    "공지", "안내", "수신", "제목", "담당", "회의", "검토", "요청", "신청",
];

/// A case-insensitive keyword list.
#[derive(Debug, Clone, Copy)]
pub struct KeywordSet {
    keywords: &'static [&'static str],
}

impl KeywordSet {
    /// Wrap a keyword list. Keywords must already be lowercase.
    pub const fn new(keywords: &'static [&'static str]) -> Self {
        Self { keywords }
    }

    /// Whether `text` contains any keyword.
    pub fn matches(&self, text: &str) -> bool {
        let lower = text.to_lowercase();
        self.keywords.iter().any(|k| lower.contains(k))
    }

    /// Number of distinct keywords present in `text`.
    pub fn hits(&self, text: &str) -> usize {
        let lower = text.to_lowercase();
        self.keywords.iter().filter(|k| lower.contains(*k)).count()
    }
}

struct CompiledRule {
    regex: Regex,
    priority: u16,
}

/// A compiled, priority-ordered set of removal rules.
pub struct RuleSet {
    rules: Vec<CompiledRule>,
}

impl RuleSet {
    /// Compile rules, failing on the first invalid pattern.
    ///
    /// Patterns match case-insensitively and `.` crosses line breaks.
    pub fn compile(specs: &[RuleSpec]) -> Result<Self> {
        let mut rules = specs
            .iter()
            .map(|spec| {
                Regex::new(&format!("(?is){}", spec.pattern))
                    .map(|regex| CompiledRule {
                        regex,
                        priority: spec.priority,
                    })
                    .map_err(|e| Error::Pattern {
                        pattern: spec.pattern.to_string(),
                        detail: e.to_string(),
                    })
            })
            .collect::<Result<Vec<_>>>()?;
        // Stable: equal priorities keep table order.
        rules.sort_by(|a, b| b.priority.cmp(&a.priority));
        Ok(Self { rules })
    }

    /// The built-in boilerplate rules.
    pub fn boilerplate() -> Result<Self> {
        Self::compile(BOILERPLATE_RULES)
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the set has no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Remove every match of every rule, in priority order.
    pub fn strip(&self, text: &str) -> String {
        let Some(first) = self.first_match(text) else {
            return text.to_string();
        };
        let mut result = text.to_string();
        for rule in &self.rules[first..] {
            if rule.regex.is_match(&result) {
                result = rule.regex.replace_all(&result, "").into_owned();
            }
        }
        result
    }

    /// Index (in priority order) of the first rule matching `text`.
    pub fn first_match(&self, text: &str) -> Option<usize> {
        self.rules.iter().position(|r| r.regex.is_match(text))
    }
}

impl std::fmt::Debug for RuleSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleSet")
            .field("rules", &self.rules.len())
            .finish()
    }
}
