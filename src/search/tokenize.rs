//! Text tokenization for indexing and querying.
//!
//! Both sides use the same rule: lowercase, split on non-alphanumeric
//! boundaries. `postgres://` tokenizes to `postgres`; punctuation-only input
//! yields no tokens. No stemming: documentation queries are exact-token with
//! prefix and fuzzy clauses layered on top at query time.

/// Tokenize text into lowercase word tokens.
pub(crate) fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Terms to highlight in snippets: the raw trimmed query first (so the full
/// phrase wins over its parts at the same position), then each token, deduped.
pub(crate) fn highlight_terms(trimmed_query: &str, tokens: &[String]) -> Vec<String> {
    let mut terms = vec![trimmed_query.to_lowercase()];
    for token in tokens {
        if !terms.contains(token) {
            terms.push(token.clone());
        }
    }
    terms
}
