//! Document extraction: one parsed document in, a page record plus its
//! section records out.
//!
//! Sectioning follows heading structure: each retained heading owns the text
//! up to the next heading of equal-or-shallower depth. Ids are owned by the
//! session so batch runs stay isolated and tests get reproducible numbering.

use crate::document::{Block, Document, blocks_text, inline_text};
use crate::error::ExtractError;
use crate::types::{Heading, RecordKind, SearchRecord};
use ahash::{AHashMap, AHashSet};
use xxhash_rust::xxh3::xxh3_64;

/// How record ids are generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdStrategy {
    /// Session-local monotonically increasing counter: `"<seq>-<path>"`.
    /// Unique across repeated extraction calls within one session, but not
    /// stable across runs.
    #[default]
    Sequential,
    /// xxh3 hash of the document path (plus heading id for sections),
    /// rendered as hex. Stable across runs for unchanged inputs.
    Stable,
}

/// Extraction configuration.
#[derive(Debug, Clone)]
pub struct ExtractConfig {
    /// URL prefix for extracted records, e.g. `/docs`.
    pub base_url: String,
    /// Inclusive heading depth range that produces section records.
    pub min_depth: u8,
    pub max_depth: u8,
    pub id_strategy: IdStrategy,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            base_url: "/docs".to_string(),
            min_depth: 2,
            max_depth: 4,
            id_strategy: IdStrategy::default(),
        }
    }
}

/// An extraction run over one batch of documents.
///
/// Owns the id sequence counter, so concurrent batch runs in one process each
/// construct their own session instead of sharing ambient state. Extraction
/// itself is otherwise stateless per document.
#[derive(Debug, Default)]
pub struct ExtractSession {
    config: ExtractConfig,
    next_seq: u64,
}

/// A heading located in the body, before slug assignment.
struct LocatedHeading {
    block_idx: usize,
    depth: u8,
    text: String,
}

impl ExtractSession {
    pub fn new(config: ExtractConfig) -> Self {
        Self {
            config,
            next_seq: 0,
        }
    }

    /// Extract every document in the batch, skipping the ones that fail.
    ///
    /// A malformed document must not poison the batch: its error is logged as
    /// a warning and its records are simply absent from the output.
    pub fn extract_all<'a, I>(&mut self, documents: I) -> Vec<SearchRecord>
    where
        I: IntoIterator<Item = &'a Document>,
    {
        let mut records = Vec::new();
        for document in documents {
            match self.extract(document) {
                Ok(extracted) => records.extend(extracted),
                Err(e) => {
                    tracing::warn!("Skipping document '{}': {}", document.path, e);
                }
            }
        }
        records
    }

    /// Extract one document into a page record followed by its section records,
    /// in document order.
    pub fn extract(&mut self, document: &Document) -> Result<Vec<SearchRecord>, ExtractError> {
        if document.path.trim().is_empty() {
            return Err(ExtractError::EmptyPath);
        }
        if document.title.trim().is_empty() {
            return Err(ExtractError::EmptyTitle {
                path: document.path.clone(),
            });
        }

        let url = self.url_for(&document.path);
        let located = locate_headings(document);
        let retained: Vec<(usize, Heading)> = {
            let mut slugger = Slugger::default();
            located
                .iter()
                .enumerate()
                .filter(|(_, h)| {
                    h.depth >= self.config.min_depth
                        && h.depth <= self.config.max_depth
                        && !h.text.is_empty()
                })
                .map(|(i, h)| {
                    (
                        i,
                        Heading {
                            text: h.text.clone(),
                            id: slugger.slug(&h.text),
                        },
                    )
                })
                .collect()
        };

        let page_headings: Vec<Heading> = retained.iter().map(|(_, h)| h.clone()).collect();
        let mut records = Vec::with_capacity(1 + retained.len());

        records.push(SearchRecord {
            id: self.record_id(&document.path, None),
            kind: RecordKind::Page,
            title: document.title.clone(),
            search_title: document.title.clone(),
            section_title: None,
            section_id: None,
            url: url.clone(),
            content: blocks_text(&document.body),
            headings: page_headings,
        });

        for (located_idx, heading) in retained {
            let start = located[located_idx].block_idx + 1;
            let end = section_end(&located, located_idx, document.body.len());
            records.push(SearchRecord {
                id: self.record_id(&document.path, Some(&heading.id)),
                kind: RecordKind::Section,
                title: document.title.clone(),
                search_title: heading.text.clone(),
                section_title: Some(heading.text.clone()),
                section_id: Some(heading.id.clone()),
                url: url.clone(),
                content: blocks_text(&document.body[start..end]),
                headings: Vec::new(),
            });
        }

        tracing::debug!(
            "Extracted {} records from '{}'",
            records.len(),
            document.path
        );
        Ok(records)
    }

    fn url_for(&self, path: &str) -> String {
        let stem = path
            .strip_suffix(".mdx")
            .or_else(|| path.strip_suffix(".md"))
            .unwrap_or(path);
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            stem.trim_start_matches('/')
        )
    }

    fn record_id(&mut self, path: &str, heading_id: Option<&str>) -> String {
        let suffix = heading_id.map_or(String::new(), |id| format!("#{}", id));
        match self.config.id_strategy {
            IdStrategy::Sequential => {
                let seq = self.next_seq;
                self.next_seq += 1;
                format!("{}-{}{}", seq, path, suffix)
            }
            IdStrategy::Stable => {
                let key = format!("{}{}", path, suffix);
                format!("{:016x}-{}{}", xxh3_64(key.as_bytes()), path, suffix)
            }
        }
    }
}

/// Find all headings in the body, regardless of depth. Non-retained headings
/// still terminate sections, so everything is collected here.
fn locate_headings(document: &Document) -> Vec<LocatedHeading> {
    document
        .body
        .iter()
        .enumerate()
        .filter_map(|(block_idx, block)| match block {
            Block::Heading { depth, children } => Some(LocatedHeading {
                block_idx,
                depth: *depth,
                text: inline_text(children),
            }),
            _ => None,
        })
        .collect()
}

/// End of the section owned by `located[idx]`: the block index of the next
/// heading (retained or not) with depth <= the owner's depth, else body end.
fn section_end(located: &[LocatedHeading], idx: usize, body_len: usize) -> usize {
    let depth = located[idx].depth;
    located[idx + 1..]
        .iter()
        .find(|h| h.depth <= depth)
        .map_or(body_len, |h| h.block_idx)
}

/// Deterministic slug assignment with collision disambiguation.
///
/// Repeated heading text gets `-1`, `-2`, ... suffixes in document order.
/// Every issued slug is tracked, not just per-base counts: a literal heading
/// like "Setup 1" occupies `setup-1` before the base "Setup" collides, so
/// suffix candidates bump until one is unoccupied.
#[derive(Default)]
struct Slugger {
    counts: AHashMap<String, usize>,
    issued: AHashSet<String>,
}

impl Slugger {
    fn slug(&mut self, text: &str) -> String {
        let base = slugify(text);
        let mut count = self.counts.get(&base).copied().unwrap_or(0);
        let mut candidate = if count == 0 {
            base.clone()
        } else {
            format!("{}-{}", base, count)
        };
        while !self.issued.insert(candidate.clone()) {
            count += 1;
            candidate = format!("{}-{}", base, count);
        }
        self.counts.insert(base, count + 1);
        candidate
    }
}

/// Lowercase, alphanumeric runs joined by single hyphens.
fn slugify(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_hyphen = false;
    for c in text.chars() {
        if c.is_alphanumeric() {
            if pending_hyphen && !out.is_empty() {
                out.push('-');
            }
            pending_hyphen = false;
            for lower in c.to_lowercase() {
                out.push(lower);
            }
        } else {
            pending_hyphen = true;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::check;
    use rstest::rstest;

    #[rstest]
    #[case("Type Helpers", "type-helpers")]
    #[case("What is ZQL?", "what-is-zql")]
    #[case("  --flags--  ", "flags")]
    #[case("CamelCase Words", "camelcase-words")]
    fn slugify_cases(#[case] input: &str, #[case] expected: &str) {
        check!(slugify(input) == expected);
    }

    #[test]
    fn slugger_disambiguates_collisions() {
        let mut slugger = Slugger::default();
        check!(slugger.slug("Setup") == "setup");
        check!(slugger.slug("Setup") == "setup-1");
        check!(slugger.slug("Setup") == "setup-2");
        check!(slugger.slug("Other") == "other");
    }

    #[test]
    fn slugger_skips_suffixes_occupied_by_literal_headings() {
        // "Setup 1" claims `setup-1` before the base collides, so the second
        // "Setup" must land on `setup-2`, not reuse `setup-1`.
        let mut slugger = Slugger::default();
        check!(slugger.slug("Setup") == "setup");
        check!(slugger.slug("Setup 1") == "setup-1");
        check!(slugger.slug("Setup") == "setup-2");
        check!(slugger.slug("Setup 1") == "setup-1-1");
    }

    #[rstest]
    #[case("zql.mdx", "/docs/zql")]
    #[case("guides/install.md", "/docs/guides/install")]
    #[case("/roadmap.mdx", "/docs/roadmap")]
    fn url_derivation(#[case] path: &str, #[case] expected: &str) {
        let session = ExtractSession::default();
        check!(session.url_for(path) == expected);
    }
}
