//! The parsed document-tree abstraction the extractor consumes.
//!
//! Markdown/MDX parsing happens upstream; this module only defines the
//! format-agnostic block/inline node tree that parsed documents arrive as,
//! plus the plain-text flattening rules shared by page and section records:
//! inline marks are stripped, link text and image alt text are inlined, and
//! code block and table text is kept literal so code tokens stay searchable.

use serde::{Deserialize, Serialize};

/// A single parsed document: docs-root-relative path, frontmatter title, body tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Path relative to the docs root, e.g. `zql.mdx` or `guides/install.mdx`.
    pub path: String,
    /// Display title from frontmatter metadata.
    pub title: String,
    pub body: Vec<Block>,
}

/// A block-level node.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Block {
    Paragraph {
        children: Vec<Inline>,
    },
    Heading {
        depth: u8,
        children: Vec<Inline>,
    },
    /// Fenced code block. `value` is indexed verbatim.
    CodeBlock {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        lang: Option<String>,
        value: String,
    },
    /// Rows of cells; each cell is inline content. Cell text is indexed verbatim.
    Table {
        rows: Vec<Vec<Vec<Inline>>>,
    },
    List {
        items: Vec<Vec<Block>>,
    },
    BlockQuote {
        children: Vec<Block>,
    },
}

/// An inline node. Formatting marks carry no text of their own and are
/// dropped during flattening.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Inline {
    Text { value: String },
    /// Inline code span; backticks are a markup concern, the value is plain text.
    Code { value: String },
    Emphasis { children: Vec<Inline> },
    Strong { children: Vec<Inline> },
    Link { children: Vec<Inline> },
    Image { alt: String },
    Break,
}

impl Block {
    /// Append this block's plain text to `out`, separated by single spaces.
    pub(crate) fn collect_text(&self, out: &mut Vec<String>) {
        match self {
            Self::Paragraph { children } | Self::Heading { children, .. } => {
                push_nonempty(out, inline_text(children));
            }
            Self::CodeBlock { value, .. } => push_nonempty(out, value.clone()),
            Self::Table { rows } => {
                for row in rows {
                    for cell in row {
                        push_nonempty(out, inline_text(cell));
                    }
                }
            }
            Self::List { items } => {
                for item in items {
                    for block in item {
                        block.collect_text(out);
                    }
                }
            }
            Self::BlockQuote { children } => {
                for block in children {
                    block.collect_text(out);
                }
            }
        }
    }
}

/// Flatten inline children to plain text, stripping formatting marks.
pub(crate) fn inline_text(children: &[Inline]) -> String {
    let mut out = String::new();
    collect_inline(children, &mut out);
    normalize_whitespace(&out)
}

fn collect_inline(children: &[Inline], out: &mut String) {
    for node in children {
        match node {
            Inline::Text { value } | Inline::Code { value } => out.push_str(value),
            Inline::Emphasis { children }
            | Inline::Strong { children }
            | Inline::Link { children } => collect_inline(children, out),
            Inline::Image { alt } => out.push_str(alt),
            Inline::Break => out.push(' '),
        }
    }
}

/// Flatten a run of blocks into one whitespace-normalized string.
pub(crate) fn blocks_text(blocks: &[Block]) -> String {
    let mut parts = Vec::new();
    for block in blocks {
        block.collect_text(&mut parts);
    }
    normalize_whitespace(&parts.join(" "))
}

/// Collapse whitespace runs (including newlines inside code blocks) to single spaces.
pub(crate) fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn push_nonempty(out: &mut Vec<String>, text: String) {
    if !text.is_empty() {
        out.push(text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::check;

    fn text(value: &str) -> Inline {
        Inline::Text {
            value: value.to_string(),
        }
    }

    #[test]
    fn inline_marks_are_stripped() {
        let children = vec![
            text("use "),
            Inline::Code {
                value: "z.query".to_string(),
            },
            text(" with "),
            Inline::Emphasis {
                children: vec![text("care")],
            },
        ];
        check!(inline_text(&children) == "use z.query with care");
    }

    #[test]
    fn link_text_and_image_alt_are_inlined() {
        let children = vec![
            Inline::Link {
                children: vec![text("the docs")],
            },
            Inline::Break,
            Inline::Image {
                alt: "architecture diagram".to_string(),
            },
        ];
        check!(inline_text(&children) == "the docs architecture diagram");
    }

    #[test]
    fn code_block_text_is_kept_literal() {
        let blocks = vec![
            Block::Paragraph {
                children: vec![text("Connect with:")],
            },
            Block::CodeBlock {
                lang: Some("bash".to_string()),
                value: "pg_dump postgres://user@host/db".to_string(),
            },
        ];
        check!(blocks_text(&blocks) == "Connect with: pg_dump postgres://user@host/db");
    }

    #[test]
    fn table_cells_are_flattened_in_order() {
        let blocks = vec![Block::Table {
            rows: vec![
                vec![vec![text("Name")], vec![text("Type")]],
                vec![vec![text("limit")], vec![text("number")]],
            ],
        }];
        check!(blocks_text(&blocks) == "Name Type limit number");
    }

    #[test]
    fn whitespace_is_normalized() {
        check!(normalize_whitespace("a\n\n  b\t c ") == "a b c");
        check!(normalize_whitespace("") == "");
    }
}
