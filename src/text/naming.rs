//! Deterministic output names built from extracted fields.

use std::collections::BTreeMap;

use super::fields::{DATE, DOCUMENT_NUMBER, KC_NUMBER, REGISTRATION_NUMBER};

/// Build a structured file name such as `KC_AB-12_20240315.json`.
///
/// Identifier priority is KC number, then registration number, then
/// document number. Returns `None` when none of them was extracted. The
/// date field, with `.` and `-` removed, is appended when present.
pub fn structured_name(fields: &BTreeMap<String, String>, extension: &str) -> Option<String> {
    let (prefix, id) = [
        ("KC", KC_NUMBER),
        ("REG", REGISTRATION_NUMBER),
        ("DOC", DOCUMENT_NUMBER),
    ]
    .iter()
    .find_map(|(prefix, key)| {
        fields
            .get(*key)
            .map(|v| sanitize(v))
            .filter(|v| !v.is_empty())
            .map(|v| (*prefix, v))
    })?;

    let mut name = format!("{prefix}_{id}");
    if let Some(date) = fields.get(DATE) {
        let date: String = date.chars().filter(|c| !matches!(c, '.' | '-')).collect();
        let date = sanitize(&date);
        if !date.is_empty() {
            name.push('_');
            name.push_str(&date);
        }
    }

    let extension = extension.trim_start_matches('.');
    if extension.is_empty() {
        Some(name)
    } else {
        Some(format!("{name}.{extension}"))
    }
}

/// Keep characters that are safe in file names on every platform.
fn sanitize(value: &str) -> String {
    value
        .trim()
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.'))
        .collect()
}
