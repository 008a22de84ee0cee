mod common;

use assert2::check;
use common::{install_doc, zql_doc};
use docdex::{ExtractSession, Heading, RecordKind, SearchRecord, build_index, search};
use rstest::rstest;

fn corpus() -> Vec<SearchRecord> {
    common::init_tracing();
    let mut session = ExtractSession::default();
    session.extract_all(&[zql_doc(), install_doc()])
}

fn record(id: &str, title: &str, content: &str) -> SearchRecord {
    SearchRecord {
        id: id.to_string(),
        kind: RecordKind::Page,
        title: title.to_string(),
        search_title: title.to_string(),
        section_title: None,
        section_id: None,
        url: format!("/docs/{}", title.to_lowercase()),
        content: content.to_string(),
        headings: Vec::new(),
    }
}

// --- Scenario tests from the docs corpus ---

/// Test: querying "type helpers" ranks the Type Helpers section first and
/// composes its URL from the section anchor.
#[test]
fn type_helpers_query_hits_section_anchor() {
    let records = corpus();
    let index = build_index(&records).unwrap();

    let results = search(&index, &records, "type helpers");
    check!(!results.is_empty());
    check!(
        results[0].composed_url == "/docs/zql#type-helpers",
        "top hit should be the section: {:?}",
        results
            .iter()
            .map(|r| (&r.composed_url, r.score))
            .collect::<Vec<_>>()
    );
}

/// Test: "postgres://" tokenizes down to "postgres" and still finds the
/// install page through its code block text.
#[test]
fn connection_string_query_finds_install_page() {
    let records = corpus();
    let index = build_index(&records).unwrap();

    let results = search(&index, &records, "postgres://");
    check!(!results.is_empty());
    check!(results[0].composed_url.starts_with("/docs/install"));
}

/// Test: degenerate queries return empty without panicking.
#[rstest]
#[case("")]
#[case("   ")]
#[case("!?::(){}")]
#[case("...---...")]
fn degenerate_queries_return_empty(#[case] query: &str) {
    let records = corpus();
    let index = build_index(&records).unwrap();
    check!(search(&index, &records, query).is_empty());
}

// --- Tiered relaxation ---

/// Test: a token absent from the corpus but one edit away from a present term
/// finds nothing exactly, then matches once fuzzy relaxation kicks in.
#[test]
fn fuzzy_tier_rescues_near_miss_tokens() {
    let records = vec![record("0-a.mdx", "Replica", "the replica holds local state")];
    let index = build_index(&records).unwrap();

    // "replika" is 7 chars: fuzzy allows distance 2, and no exact/prefix term matches.
    let results = search(&index, &records, "replika");
    check!(!results.is_empty());
}

/// Test: short tokens never fuzz, so a 3-char near miss stays empty.
#[test]
fn short_tokens_are_never_fuzzed() {
    let records = vec![record("0-a.mdx", "ZQL", "the zql query language")];
    let index = build_index(&records).unwrap();
    check!(search(&index, &records, "zqk").is_empty());
}

/// Test: with multiple tokens, AND presence applies first; when one token
/// matches nothing at all, the optional tier still surfaces the other.
#[test]
fn optional_tier_relaxes_and_semantics() {
    let records = vec![record("0-a.mdx", "Replica", "the replica holds local state")];
    let index = build_index(&records).unwrap();

    let results = search(&index, &records, "replica xylophonist");
    check!(!results.is_empty(), "tier 3 should drop the unmatched token");
}

/// Test: single-token queries are scored, not required, and match directly.
#[test]
fn single_token_query_matches() {
    let records = corpus();
    let index = build_index(&records).unwrap();
    let results = search(&index, &records, "ordering");
    check!(!results.is_empty());
}

// --- Phrase boost and ranking ---

/// Test: with comparable base relevance, a literal phrase in a section title
/// outranks the same phrase buried in body content.
#[test]
fn phrase_in_section_title_outranks_body_mention() {
    let section = SearchRecord {
        id: "0-zql.mdx#type-helpers".to_string(),
        kind: RecordKind::Section,
        title: "ZQL".to_string(),
        search_title: "Type Helpers".to_string(),
        section_title: Some("Type Helpers".to_string()),
        section_id: Some("type-helpers".to_string()),
        url: "/docs/zql".to_string(),
        content: "name the row type a query produces".to_string(),
        headings: Vec::new(),
    };
    let body_only = record(
        "1-misc.mdx",
        "Misc",
        "there are type helpers mentioned in passing in this body text",
    );
    let records = vec![body_only, section];
    let index = build_index(&records).unwrap();

    let results = search(&index, &records, "type helpers");
    check!(results.len() == 2);
    check!(results[0].record.id == "0-zql.mdx#type-helpers");
    check!(results[0].score > results[1].score);
}

/// Test: every id appears at most once in the result list.
#[test]
fn results_are_deduplicated_by_id() {
    let records = corpus();
    let index = build_index(&records).unwrap();

    let results = search(&index, &records, "query");
    let mut ids: Vec<&str> = results.iter().map(|r| r.record.id.as_str()).collect();
    let total = ids.len();
    ids.sort_unstable();
    ids.dedup();
    check!(ids.len() == total);
}

/// Test: results come back sorted by score descending.
#[test]
fn results_are_sorted_by_score() {
    let records = corpus();
    let index = build_index(&records).unwrap();

    let results = search(&index, &records, "query language");
    for pair in results.windows(2) {
        check!(pair[0].score >= pair[1].score);
    }
}

// --- Snippets and anchors ---

/// Test: snippets highlight the matched term and the page anchor points at
/// the heading nearest the match.
#[test]
fn snippet_highlights_and_anchors_page_hits() {
    let records = vec![SearchRecord {
        id: "0-guide.mdx".to_string(),
        kind: RecordKind::Page,
        title: "Guide".to_string(),
        search_title: "Guide".to_string(),
        section_title: None,
        section_id: None,
        url: "/docs/guide".to_string(),
        content: "Intro words. Deployment covers rollouts. The replica set ships last."
            .to_string(),
        headings: vec![Heading {
            text: "Deployment".to_string(),
            id: "deployment".to_string(),
        }],
    }];
    let index = build_index(&records).unwrap();

    let results = search(&index, &records, "replica");
    check!(results.len() == 1);
    check!(results[0].snippet.contains("<mark>replica</mark>"));
    check!(results[0].snippet_id == "deployment");
    check!(results[0].composed_url == "/docs/guide#deployment");
}

/// Test: a page with no headings composes a bare URL and still snippets.
#[test]
fn page_without_headings_gets_bare_url() {
    let records = vec![record("0-plain.mdx", "Plain", "just some replica text")];
    let index = build_index(&records).unwrap();

    let results = search(&index, &records, "replica");
    check!(results.len() == 1);
    check!(results[0].snippet_id.is_empty());
    check!(results[0].composed_url == "/docs/plain");
}

// --- Failure modes ---

/// Test: hits whose id is missing from the documents batch are dropped
/// instead of erroring.
#[test]
fn index_document_mismatch_drops_hits() {
    let records = corpus();
    let index = build_index(&records).unwrap();

    let results = search(&index, &[], "query");
    check!(results.is_empty());
}

/// Test: a batch with duplicate ids fails index construction loudly.
#[test]
fn duplicate_record_ids_fail_index_build() {
    let records = vec![
        record("0-a.mdx", "A", "alpha"),
        record("0-a.mdx", "B", "beta"),
    ];
    check!(build_index(&records).is_err());
}
