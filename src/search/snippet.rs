//! Snippet extraction, highlighting, and heading-anchor resolution.
//!
//! All matching runs over a case-folded, char-indexed view of the content so
//! windows and highlight boundaries land on UTF-8 character boundaries. No
//! regex machinery: pathological query input cannot break a plain char scan.

use crate::types::{Heading, RecordKind, SearchRecord};

/// Characters kept on each side of the match; the window is roughly twice this.
const SNIPPET_RADIUS: usize = 60;
const HIGHLIGHT_OPEN: &str = "<mark>";
const HIGHLIGHT_CLOSE: &str = "</mark>";
const ELLIPSIS: char = '…';

/// Case-folded view of a string with char-to-byte offset bookkeeping.
pub(crate) struct FoldedText {
    lower: Vec<char>,
    /// Byte offset of each char in the original, plus one entry for the end.
    byte_offsets: Vec<usize>,
}

impl FoldedText {
    pub(crate) fn new(text: &str) -> Self {
        let mut lower = Vec::new();
        let mut byte_offsets = Vec::new();
        for (offset, c) in text.char_indices() {
            byte_offsets.push(offset);
            lower.push(c.to_lowercase().next().unwrap_or(c));
        }
        byte_offsets.push(text.len());
        Self {
            lower,
            byte_offsets,
        }
    }

    pub(crate) fn char_len(&self) -> usize {
        self.lower.len()
    }

    /// First occurrence of lowercase `needle` at or after char position `from`.
    pub(crate) fn find(&self, needle: &str, from: usize) -> Option<usize> {
        let needle: Vec<char> = needle.chars().collect();
        if needle.is_empty() || from + needle.len() > self.lower.len() {
            return None;
        }
        (from..=self.lower.len() - needle.len())
            .find(|&i| self.lower[i..i + needle.len()] == needle[..])
    }

    /// Byte range in the original text for a char range.
    fn byte_range(&self, start: usize, end: usize) -> (usize, usize) {
        (self.byte_offsets[start], self.byte_offsets[end])
    }
}

/// An extracted snippet plus the char position its window centers on.
pub(crate) struct Snippet {
    pub(crate) text: String,
    /// Char position in content of the earliest matched term, if any.
    pub(crate) match_pos: Option<usize>,
}

/// Extract a highlighted ~120-char window around the earliest occurrence of
/// any highlight term. Falls back to the leading content when nothing matches;
/// empty content yields an empty snippet.
pub(crate) fn extract_snippet(content: &str, folded: &FoldedText, terms: &[String]) -> Snippet {
    if content.is_empty() {
        return Snippet {
            text: String::new(),
            match_pos: None,
        };
    }

    // Earliest occurrence wins; terms are ordered raw-query-first so the full
    // phrase takes priority over its tokens at the same position.
    let mut best: Option<usize> = None;
    for term in terms {
        if term.is_empty() {
            continue;
        }
        if let Some(pos) = folded.find(term, 0)
            && best.is_none_or(|b| pos < b)
        {
            best = Some(pos);
        }
    }

    let total = folded.char_len();
    let Some(pos) = best else {
        let end = total.min(2 * SNIPPET_RADIUS);
        let (b1, b2) = folded.byte_range(0, end);
        let mut text = content[b1..b2].to_string();
        if end < total {
            text.push(ELLIPSIS);
        }
        return Snippet {
            text,
            match_pos: None,
        };
    };

    let start = pos.saturating_sub(SNIPPET_RADIUS);
    let end = total.min(start + 2 * SNIPPET_RADIUS);
    Snippet {
        text: highlight_window(content, folded, terms, start, end),
        match_pos: Some(pos),
    }
}

/// Render the window with every term occurrence wrapped in highlight markers.
/// Overlapping occurrences keep the earliest-starting, longest match.
fn highlight_window(
    content: &str,
    folded: &FoldedText,
    terms: &[String],
    start: usize,
    end: usize,
) -> String {
    let mut ranges: Vec<(usize, usize)> = Vec::new();
    for term in terms {
        let term_len = term.chars().count();
        if term_len == 0 {
            continue;
        }
        let mut from = start;
        while let Some(pos) = folded.find(term, from) {
            if pos >= end {
                break;
            }
            ranges.push((pos, (pos + term_len).min(end)));
            from = pos + term_len;
        }
    }
    // Earliest start first; longer match preferred on ties.
    ranges.sort_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)));

    let total = folded.char_len();
    let mut out = String::new();
    if start > 0 {
        out.push(ELLIPSIS);
    }
    let mut cursor = start;
    for (range_start, range_end) in ranges {
        if range_start < cursor {
            continue;
        }
        let (b1, b2) = folded.byte_range(cursor, range_start);
        out.push_str(&content[b1..b2]);
        let (b1, b2) = folded.byte_range(range_start, range_end);
        out.push_str(HIGHLIGHT_OPEN);
        out.push_str(&content[b1..b2]);
        out.push_str(HIGHLIGHT_CLOSE);
        cursor = range_end;
    }
    let (b1, b2) = folded.byte_range(cursor, end);
    out.push_str(&content[b1..b2]);
    if end < total {
        out.push(ELLIPSIS);
    }
    out
}

/// Resolve the heading anchor a result should scroll to.
///
/// Section records link to their own heading. Page records pick the heading
/// nearest the snippet match: the latest heading occurring at or before the
/// match position, else the first heading occurring after it, else the
/// document's first heading, else no anchor.
pub(crate) fn resolve_anchor(
    record: &SearchRecord,
    folded: &FoldedText,
    match_pos: Option<usize>,
) -> String {
    if record.kind == RecordKind::Section {
        return record.section_id.clone().unwrap_or_default();
    }
    if record.headings.is_empty() {
        return String::new();
    }

    // Headings whose text occurs in the content, with first-occurrence positions.
    let mut found: Vec<(usize, &Heading)> = record
        .headings
        .iter()
        .filter_map(|h| folded.find(&h.text.to_lowercase(), 0).map(|pos| (pos, h)))
        .collect();
    found.sort_by_key(|(pos, _)| *pos);

    let pos = match_pos.unwrap_or(0);
    if let Some((_, heading)) = found.iter().rev().find(|(heading_pos, _)| *heading_pos <= pos) {
        return heading.id.clone();
    }
    // All found headings are past the match; the first is the nearest following.
    if let Some((_, heading)) = found.first() {
        return heading.id.clone();
    }
    record
        .headings
        .first()
        .map(|h| h.id.clone())
        .unwrap_or_default()
}
