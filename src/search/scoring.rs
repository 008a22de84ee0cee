//! Relevance constants and scoring policies.
//!
//! Field boosts weight where a term occurs; clause boosts weight how it
//! matched (exact > trailing-wildcard > fuzzy); the phrase boost is an
//! additive bonus when the whole multi-word query appears literally in a
//! prioritized field.

use crate::types::SearchRecord;

/// Weight for the `search_title` field (document title, or section heading
/// for section records).
pub(crate) const BOOST_SEARCH_TITLE: f32 = 14.0;
/// Weight for the `section_title` field. Empty on page records.
pub(crate) const BOOST_SECTION_TITLE: f32 = 16.0;
/// Baseline weight for body content.
pub(crate) const BOOST_CONTENT: f32 = 1.0;
/// Weight for flattened heading text.
pub(crate) const BOOST_HEADINGS: f32 = 6.0;

/// Clause weight for an exact vocabulary match.
pub(crate) const CLAUSE_EXACT: f32 = 8.0;
/// Clause weight for a trailing-wildcard (prefix) match.
pub(crate) const CLAUSE_PREFIX: f32 = 3.0;
/// Clause weight for a fuzzy (edit-distance) match.
pub(crate) const CLAUSE_FUZZY: f32 = 1.25;

const PHRASE_SECTION_TITLE: f32 = 6.0;
const PHRASE_TITLE: f32 = 4.0;
const PHRASE_HEADING: f32 = 3.0;
const PHRASE_CONTENT: f32 = 1.0;

/// Maximum edit distance for fuzzy-matching a query token, by token length.
///
/// Short tokens never fuzz: at 3 characters, a single edit reaches too much
/// of the vocabulary to rank meaningfully.
pub(crate) fn fuzzy_distance(token_chars: usize) -> Option<usize> {
    match token_chars {
        0..=3 => None,
        4..=6 => Some(1),
        _ => Some(2),
    }
}

/// Additive phrase bonus for a multi-token query.
///
/// `phrase` is the lowercased query tokens joined by single spaces. Fields are
/// checked in priority order and the first literal occurrence wins; bonuses
/// never stack.
pub(crate) fn phrase_boost(record: &SearchRecord, phrase: &str) -> f32 {
    let contains = |text: &str| text.to_lowercase().contains(phrase);

    if record
        .section_title
        .as_deref()
        .is_some_and(|title| contains(title))
    {
        PHRASE_SECTION_TITLE
    } else if contains(&record.title) {
        PHRASE_TITLE
    } else if record.headings.iter().any(|h| contains(&h.text)) {
        PHRASE_HEADING
    } else if contains(&record.content) {
        PHRASE_CONTENT
    } else {
        0.0
    }
}
