//! Weighted inverted index over extracted search records.
//!
//! Four fields are indexed with distinct weights: `search_title`,
//! `section_title` (empty on page records), `content` (baseline), and the
//! flattened heading text. All text is lowercased at insertion and the record
//! `id` is the reference key. Construction is a pure function of the input
//! batch; a rebuild on corpus change produces a brand-new index for callers
//! to swap in.

use crate::error::IndexError;
use crate::types::SearchRecord;
use ahash::{AHashMap, AHashSet};
use rapidfuzz::distance::levenshtein;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::scoring::{
    BOOST_CONTENT, BOOST_HEADINGS, BOOST_SEARCH_TITLE, BOOST_SECTION_TITLE, CLAUSE_EXACT,
    CLAUSE_FUZZY, CLAUSE_PREFIX, fuzzy_distance,
};
use super::tokenize::tokenize;

/// Which record field a posting came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) enum Field {
    SearchTitle,
    SectionTitle,
    Content,
    Headings,
}

impl Field {
    pub(crate) const COUNT: usize = 4;

    pub(crate) fn idx(self) -> usize {
        match self {
            Self::SearchTitle => 0,
            Self::SectionTitle => 1,
            Self::Content => 2,
            Self::Headings => 3,
        }
    }

    pub(crate) fn boost(self) -> f32 {
        match self {
            Self::SearchTitle => BOOST_SEARCH_TITLE,
            Self::SectionTitle => BOOST_SECTION_TITLE,
            Self::Content => BOOST_CONTENT,
            Self::Headings => BOOST_HEADINGS,
        }
    }
}

/// One term occurrence record: which document, which field, how often.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Posting {
    pub(crate) doc: usize,
    pub(crate) field: Field,
    pub(crate) count: u32,
}

/// The inverted index. Immutable after construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchIndex {
    /// Sorted term list; prefix clauses binary-search this.
    vocabulary: Vec<String>,
    /// Term -> postings, sorted by (doc, field) for deterministic scoring.
    postings: HashMap<String, Vec<Posting>>,
    /// Record ids by document position.
    ids: Vec<String>,
    /// Per-document token counts per field, for length normalization.
    field_lengths: Vec<[u32; Field::COUNT]>,
}

/// Build an index from a record batch.
///
/// Fails loudly on duplicate ids: that is an upstream extraction bug, not a
/// condition to recover from.
pub fn build_index(records: &[SearchRecord]) -> Result<SearchIndex, IndexError> {
    let start = std::time::Instant::now();
    let mut builder = IndexBuilder::default();
    for record in records {
        builder.add(record)?;
    }
    let index = builder.finalize();
    tracing::info!(
        "Built search index: {} unique terms, {} records in {:?}",
        index.term_count(),
        index.document_count(),
        start.elapsed()
    );
    Ok(index)
}

/// Accumulates term frequencies before the index is frozen.
#[derive(Default)]
struct IndexBuilder {
    seen: AHashSet<String>,
    ids: Vec<String>,
    /// (term, doc, field) -> occurrence count.
    term_counts: AHashMap<(String, usize, Field), u32>,
    field_lengths: Vec<[u32; Field::COUNT]>,
}

impl IndexBuilder {
    fn add(&mut self, record: &SearchRecord) -> Result<(), IndexError> {
        if !self.seen.insert(record.id.clone()) {
            return Err(IndexError::DuplicateId(record.id.clone()));
        }
        let doc = self.ids.len();
        self.ids.push(record.id.clone());
        self.field_lengths.push([0; Field::COUNT]);

        self.add_field(doc, Field::SearchTitle, &record.search_title);
        if let Some(section_title) = &record.section_title {
            self.add_field(doc, Field::SectionTitle, section_title);
        }
        self.add_field(doc, Field::Content, &record.content);
        let headings = record.headings_text();
        if !headings.is_empty() {
            self.add_field(doc, Field::Headings, &headings);
        }
        Ok(())
    }

    fn add_field(&mut self, doc: usize, field: Field, text: &str) {
        let tokens = tokenize(text);
        self.field_lengths[doc][field.idx()] += tokens.len() as u32;
        for token in tokens {
            *self.term_counts.entry((token, doc, field)).or_insert(0) += 1;
        }
    }

    fn finalize(self) -> SearchIndex {
        let mut postings: HashMap<String, Vec<Posting>> = HashMap::new();
        for ((term, doc, field), count) in self.term_counts {
            postings
                .entry(term)
                .or_default()
                .push(Posting { doc, field, count });
        }
        for list in postings.values_mut() {
            list.sort_by_key(|p| (p.doc, p.field.idx()));
        }

        let mut vocabulary: Vec<String> = postings.keys().cloned().collect();
        vocabulary.sort_unstable();

        SearchIndex {
            vocabulary,
            postings,
            ids: self.ids,
            field_lengths: self.field_lengths,
        }
    }
}

impl SearchIndex {
    /// Number of unique terms in the index.
    pub fn term_count(&self) -> usize {
        self.vocabulary.len()
    }

    /// Number of records in the index.
    pub fn document_count(&self) -> usize {
        self.ids.len()
    }

    pub(crate) fn id(&self, doc: usize) -> &str {
        &self.ids[doc]
    }

    /// Score one query token against every document.
    ///
    /// Each matching vocabulary term contributes under exactly one clause:
    /// exact (8) beats trailing-wildcard (3) beats fuzzy (1.25). The per-doc
    /// contribution is clause x field boost x length-normalized TF x IDF,
    /// a TF-IDF variant tuned to separate title hits from body mentions in
    /// small corpora.
    pub(crate) fn score_token(&self, token: &str, fuzzy: bool) -> AHashMap<usize, f32> {
        let total_docs = self.ids.len() as f32;
        let mut scores: AHashMap<usize, f32> = AHashMap::new();

        for (term, clause) in self.matching_terms(token, fuzzy) {
            let postings = &self.postings[term];
            let doc_freq = distinct_docs(postings) as f32;
            let idf = (1.0 + total_docs / doc_freq).ln();

            for posting in postings {
                let field_len = self.field_lengths[posting.doc][posting.field.idx()] as f32;
                let tf = (1.0 + (posting.count as f32).ln()) / (1.0 + field_len.ln());
                *scores.entry(posting.doc).or_insert(0.0) +=
                    clause * posting.field.boost() * tf * idf;
            }
        }
        scores
    }

    /// Vocabulary terms matching `token`, each with its clause boost.
    ///
    /// Returned sorted by term so floating-point accumulation order is
    /// deterministic across runs.
    fn matching_terms<'a>(&'a self, token: &'a str, fuzzy: bool) -> Vec<(&'a str, f32)> {
        let mut matched: AHashMap<&str, f32> = AHashMap::new();

        if self.postings.contains_key(token) {
            matched.insert(token, CLAUSE_EXACT);
        }

        // Trailing-wildcard clause: binary search into the sorted vocabulary,
        // then scan the contiguous prefix range.
        let start = self.vocabulary.partition_point(|t| t.as_str() < token);
        for term in &self.vocabulary[start..] {
            if !term.starts_with(token) {
                break;
            }
            matched.entry(term.as_str()).or_insert(CLAUSE_PREFIX);
        }

        if fuzzy
            && let Some(max_distance) = fuzzy_distance(token.chars().count())
        {
            for term in &self.vocabulary {
                if matched.contains_key(term.as_str()) {
                    continue;
                }
                let distance = levenshtein::distance(token.chars(), term.chars());
                if (1..=max_distance).contains(&distance) {
                    matched.insert(term.as_str(), CLAUSE_FUZZY);
                }
            }
        }

        let mut terms: Vec<(&str, f32)> = matched.into_iter().collect();
        terms.sort_unstable_by_key(|(term, _)| *term);
        terms
    }
}

/// Postings are sorted by doc, so distinct documents are run boundaries.
fn distinct_docs(postings: &[Posting]) -> usize {
    let mut count = 0;
    let mut last = usize::MAX;
    for posting in postings {
        if posting.doc != last {
            count += 1;
            last = posting.doc;
        }
    }
    count
}
