//! Core record and result types shared by the extractor and the search engine.

use serde::{Deserialize, Serialize};

/// What scope of a document a record covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    /// The whole document.
    Page,
    /// The text between one heading and the next heading of equal-or-shallower depth.
    Section,
}

/// A heading within a record's scope: display text plus its slug identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heading {
    pub text: String,
    pub id: String,
}

/// One indexable unit of text: a whole page or one heading-delimited section.
///
/// Records are produced in a single wholesale batch by [`crate::extract::ExtractSession`]
/// and never mutated afterwards. The batch is expected to be serialized to JSON and
/// reloaded by a client runtime, so every field must round-trip losslessly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRecord {
    /// Unique within one index build; the index's reference key.
    pub id: String,
    pub kind: RecordKind,
    /// The owning document's display title (same for a page record and all its sections).
    pub title: String,
    /// The text actually weighted for title matching: the document title for page
    /// records, the section heading text for section records.
    pub search_title: String,
    /// Section heading text; present only on section records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section_title: Option<String>,
    /// Section heading slug; present only on section records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section_id: Option<String>,
    /// Canonical address of the owning document, without heading fragment.
    pub url: String,
    /// Flattened, whitespace-normalized plain text of the record's scope.
    pub content: String,
    /// Headings within the record's scope, in document order. Empty for sections.
    #[serde(default)]
    pub headings: Vec<Heading>,
}

impl SearchRecord {
    /// The headings field flattened for indexing.
    pub(crate) fn headings_text(&self) -> String {
        self.headings
            .iter()
            .map(|h| h.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// A ranked query hit. Derived at query time, never persisted.
///
/// `score` combines index relevance with the phrase boost and is only meaningful
/// for ordering results within a single query.
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub record: SearchRecord,
    /// Highlighted excerpt around the first match; empty when content is empty.
    pub snippet: String,
    /// Heading anchor to scroll to; possibly empty.
    pub snippet_id: String,
    /// `url` plus `#snippet_id` when an anchor was resolved.
    pub composed_url: String,
    pub score: f32,
}
