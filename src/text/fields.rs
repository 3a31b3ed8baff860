//! Structured identifier extraction from document text.

use std::collections::BTreeMap;

use regex::Regex;

use crate::error::{Error, Result};

/// Registration, filing, approval or management number.
pub const REGISTRATION_NUMBER: &str = "registration_number";
/// Business registration number.
pub const BUSINESS_NUMBER: &str = "business_number";
/// Document number.
pub const DOCUMENT_NUMBER: &str = "document_number";
/// KC certification or safety confirmation number.
pub const KC_NUMBER: &str = "kc_number";
/// Telephone number.
pub const PHONE_NUMBER: &str = "phone_number";
/// Issue or validity date.
pub const DATE: &str = "date";

/// An ordered pattern group for one field. Group 1 of the first matching
/// pattern is the value.
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    /// Field name
    pub field: &'static str,
    /// Patterns tried in order
    pub patterns: &'static [&'static str],
}

/// Built-in field rules.
pub const FIELD_RULES: &[FieldRule] = &[
    FieldRule {
        field: REGISTRATION_NUMBER,
        patterns: &[
            r"등록번호[:\s]*([A-Z0-9-]+)",
            r"신고번호[:\s]*([A-Z0-9-]+)",
            r"승인번호[:\s]*([A-Z0-9-]+)",
            r"관리번호[:\s]*([A-Z0-9-]+)",
        ],
    },
    FieldRule {
        field: BUSINESS_NUMBER,
        patterns: &[r"사업자등록번호[:\s]*([0-9-]+)", r"사업자번호[:\s]*([0-9-]+)"],
    },
    FieldRule {
        field: DOCUMENT_NUMBER,
        patterns: &[r"문서번호[:\s]*([A-Z0-9-]+)", r"문서\s*번호[:\s]*([A-Z0-9-]+)"],
    },
    FieldRule {
        field: KC_NUMBER,
        patterns: &[
            r"KC\s*인증\s*번호[:\s]*([A-Z0-9-]+)",
            r"KC[:\s]*([A-Z0-9-]+)",
            r"안전확인\s*번호[:\s]*([A-Z0-9-]+)",
        ],
    },
    FieldRule {
        field: PHONE_NUMBER,
        patterns: &[
            r"전화번호?[:\s]*([0-9-]+)",
            r"연락처[:\s]*([0-9-]+)",
            r"TEL[:\s]*([0-9-]+)",
        ],
    },
    FieldRule {
        field: DATE,
        patterns: &[
            r"발행일자?[:\s]*([0-9]{4}[.-][0-9]{1,2}[.-][0-9]{1,2})",
            r"유효기간[:\s]*([0-9]{4}[.-][0-9]{1,2}[.-][0-9]{1,2})",
        ],
    },
];

/// Applies field rules to text. Within a field the first matching pattern
/// wins and later patterns are not tried.
#[derive(Debug)]
pub struct FieldExtractor {
    groups: Vec<(&'static str, Vec<Regex>)>,
}

impl FieldExtractor {
    /// Compile the built-in rules.
    pub fn new() -> Result<Self> {
        Self::with_rules(FIELD_RULES)
    }

    /// Compile custom rules. Patterns match case-insensitively.
    pub fn with_rules(rules: &[FieldRule]) -> Result<Self> {
        let groups = rules
            .iter()
            .map(|rule| {
                let compiled = rule
                    .patterns
                    .iter()
                    .map(|p| {
                        Regex::new(&format!("(?i){p}")).map_err(|e| Error::Pattern {
                            pattern: p.to_string(),
                            detail: e.to_string(),
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok((rule.field, compiled))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { groups })
    }

    /// Extract every field found in `text`.
    pub fn extract(&self, text: &str) -> BTreeMap<String, String> {
        let mut fields = BTreeMap::new();
        for (field, patterns) in &self.groups {
            let value = patterns.iter().find_map(|re| {
                re.captures(text)
                    .and_then(|caps| caps.get(1))
                    .map(|m| m.as_str().trim().to_string())
            });
            if let Some(value) = value {
                log::debug!("FieldExtractor: {} = {}", field, value);
                fields.insert(field.to_string(), value);
            }
        }
        fields
    }
}

/// Add fields from `found` that `fields` does not have yet.
pub fn merge_missing(fields: &mut BTreeMap<String, String>, found: BTreeMap<String, String>) {
    for (key, value) in found {
        fields.entry(key).or_insert(value);
    }
}
