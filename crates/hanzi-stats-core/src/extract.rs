//! Hanzi character extraction.
//!
//! Text is normalized to NFC before scanning, so composed and decomposed
//! spellings of the same character collapse to one identity. A code point
//! counts as Hanzi iff it falls in the CJK Unified Ideographs range
//! (U+3400–U+9FFF) or the CJK Compatibility Ideographs range
//! (U+F900–U+FAFF). CJK Extension blocks outside these ranges are excluded
//! on purpose: the reference datasets only cover the ranges above, and the
//! categorization results must stay comparable with them.
//!
//! All functions here are pure. Empty or non-CJK input yields an empty set,
//! never an error.

use std::collections::BTreeSet;

use unicode_normalization::UnicodeNormalization;

use crate::models::FieldSpec;

/// True iff `c` is a Hanzi character under this crate's range rules.
pub fn is_hanzi(c: char) -> bool {
    matches!(c, '\u{3400}'..='\u{9FFF}' | '\u{F900}'..='\u{FAFF}')
}

/// Extract the distinct set of Hanzi characters in `text`.
///
/// Duplicates collapse to a single entry; order is irrelevant to callers
/// (the `BTreeSet` merely makes iteration deterministic).
pub fn extract(text: &str) -> BTreeSet<char> {
    text.nfc().filter(|c| is_hanzi(*c)).collect()
}

/// Count Hanzi occurrences in `text`, including duplicates.
pub fn count_hanzi(text: &str) -> usize {
    text.nfc().filter(|c| is_hanzi(*c)).count()
}

/// Extract Hanzi from a note's field list according to `spec`.
///
/// The sort field is the first field. An explicit index is 1-based; an
/// out-of-range index yields the empty set rather than an error.
pub fn extract_from_fields(fields: &[String], spec: FieldSpec) -> BTreeSet<char> {
    match spec {
        FieldSpec::AllFields => {
            let mut chars = BTreeSet::new();
            for field in fields {
                chars.extend(extract(field));
            }
            chars
        }
        FieldSpec::SortField => fields.first().map(|f| extract(f)).unwrap_or_default(),
        FieldSpec::FieldIndex(n) => n
            .checked_sub(1)
            .and_then(|i| fields.get(i))
            .map(|f| extract(f))
            .unwrap_or_default(),
    }
}
