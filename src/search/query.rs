//! The query pipeline: tokenize, run the tiered relaxation plan, apply the
//! phrase boost, assemble snippets and anchors, dedupe, rank.
//!
//! The index and the record batch are passed explicitly into every call.
//! There is no ambient index state, so one process can serve several
//! independent indices (per-locale builds, previews) side by side.

use crate::types::{SearchRecord, SearchResult};
use ahash::{AHashMap, AHashSet};

use super::index::SearchIndex;
use super::scoring::phrase_boost;
use super::snippet::{FoldedText, extract_snippet, resolve_anchor};
use super::tokenize::{highlight_terms, tokenize};

/// Whether every token must match for a record to be a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Presence {
    Required,
    Optional,
}

/// One relaxation tier: a presence policy plus the fuzzy switch.
#[derive(Debug, Clone, Copy)]
pub(crate) struct TierConfig {
    pub(crate) presence: Presence,
    pub(crate) fuzzy: bool,
}

/// The relaxation ladder for a query with `token_count` tokens. Later tiers
/// run only when every earlier tier came back empty.
pub(crate) fn relaxation_plan(token_count: usize) -> Vec<TierConfig> {
    let presence = if token_count > 1 {
        Presence::Required
    } else {
        Presence::Optional
    };
    let mut plan = vec![
        TierConfig {
            presence,
            fuzzy: false,
        },
        TierConfig {
            presence,
            fuzzy: true,
        },
    ];
    if token_count > 1 {
        plan.push(TierConfig {
            presence: Presence::Optional,
            fuzzy: true,
        });
    }
    plan
}

/// Query the index and assemble ranked results.
///
/// Degrades gracefully on malformed input: an empty or punctuation-only query
/// returns an empty list, and hits whose id is missing from `documents` are
/// silently dropped.
pub fn search(index: &SearchIndex, documents: &[SearchRecord], query: &str) -> Vec<SearchResult> {
    let query = query.trim();
    if query.is_empty() {
        return Vec::new();
    }
    let tokens = tokenize(query);
    if tokens.is_empty() {
        return Vec::new();
    }

    let mut hits = Vec::new();
    for tier in relaxation_plan(tokens.len()) {
        hits = run_tier(index, &tokens, tier);
        if !hits.is_empty() {
            break;
        }
    }
    if hits.is_empty() {
        return Vec::new();
    }

    let by_id: AHashMap<&str, &SearchRecord> = documents
        .iter()
        .map(|record| (record.id.as_str(), record))
        .collect();
    let phrase = (tokens.len() > 1).then(|| tokens.join(" "));
    let terms = highlight_terms(query, &tokens);

    let mut seen: AHashSet<&str> = AHashSet::new();
    let mut results = Vec::with_capacity(hits.len());
    for (doc, relevance) in hits {
        let id = index.id(doc);
        // Index/document-list mismatches are dropped, not surfaced.
        let Some(&record) = by_id.get(id) else {
            tracing::debug!("Dropping hit '{}': not in the documents batch", id);
            continue;
        };
        if !seen.insert(id) {
            continue;
        }

        let boost = phrase
            .as_deref()
            .map_or(0.0, |phrase| phrase_boost(record, phrase));
        let folded = FoldedText::new(&record.content);
        let snippet = extract_snippet(&record.content, &folded, &terms);
        let snippet_id = resolve_anchor(record, &folded, snippet.match_pos);
        let composed_url = if snippet_id.is_empty() {
            record.url.clone()
        } else {
            format!("{}#{}", record.url, snippet_id)
        };

        results.push(SearchResult {
            record: record.clone(),
            snippet: snippet.text,
            snippet_id,
            composed_url,
            score: relevance + boost,
        });
    }

    // Stable sort: equal scores keep index-relevance order.
    results.sort_by(|a, b| b.score.total_cmp(&a.score));
    results
}

/// Run one tier: combine per-token scores, enforce the presence policy,
/// return (doc, relevance) sorted by relevance descending.
fn run_tier(index: &SearchIndex, tokens: &[String], tier: TierConfig) -> Vec<(usize, f32)> {
    let mut combined: AHashMap<usize, f32> = AHashMap::new();
    let mut tokens_hit: AHashMap<usize, usize> = AHashMap::new();

    for token in tokens {
        for (doc, score) in index.score_token(token, tier.fuzzy) {
            *combined.entry(doc).or_insert(0.0) += score;
            *tokens_hit.entry(doc).or_insert(0) += 1;
        }
    }

    let mut hits: Vec<(usize, f32)> = combined
        .into_iter()
        .filter(|(doc, _)| match tier.presence {
            Presence::Required => tokens_hit[doc] == tokens.len(),
            Presence::Optional => true,
        })
        .collect();
    hits.sort_by(|(doc_a, score_a), (doc_b, score_b)| {
        score_b.total_cmp(score_a).then(doc_a.cmp(doc_b))
    });
    hits
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::check;

    #[test]
    fn single_token_plan_has_no_optional_tier() {
        let plan = relaxation_plan(1);
        check!(plan.len() == 2);
        check!(plan[0].presence == Presence::Optional);
        check!(!plan[0].fuzzy);
        check!(plan[1].presence == Presence::Optional);
        check!(plan[1].fuzzy);
    }

    #[test]
    fn multi_token_plan_relaxes_presence_last() {
        let plan = relaxation_plan(3);
        check!(plan.len() == 3);
        check!(plan[0].presence == Presence::Required);
        check!(!plan[0].fuzzy);
        check!(plan[1].presence == Presence::Required);
        check!(plan[1].fuzzy);
        check!(plan[2].presence == Presence::Optional);
        check!(plan[2].fuzzy);
    }
}
