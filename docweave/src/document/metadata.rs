//! Structural metadata extracted from a markdown body
//!
//! Every element carries a 1-based `line` number in the body (after the
//! frontmatter has been stripped). Elements of all kinds appear in their
//! owning sequences in document order.

use serde::Serialize;

/// A heading extracted from the body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Heading {
    /// Heading level (1 = h1 through 6 = h6)
    pub level: usize,

    /// Heading text with inline markup stripped
    pub text: String,

    /// URL-safe identifier derived from the text (lowercase, non-alphanumeric
    /// runs collapsed to a single hyphen)
    pub id: String,

    /// 1-based line number in the body
    pub line: usize,
}

/// Whether a link target points inside or outside the project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkKind {
    Internal,
    External,
}

/// An inline `[text](url)` link
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    /// Link label text
    pub text: String,

    /// Link target, resolved against the base path when link resolution
    /// is enabled and the target is internal
    pub url: String,

    /// Classification; `None` when link resolution is disabled
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<LinkKind>,

    /// 1-based line number in the body
    pub line: usize,
}

/// An inline `![alt](src "title")` image reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Image {
    /// Alternative text
    pub alt: String,

    /// Image source path or URL
    pub src: String,

    /// Optional hover title
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// 1-based line number in the body
    pub line: usize,
}

/// A fenced code block
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeBlock {
    /// First whitespace-delimited token of the fence info string, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    /// Raw fenced content, not re-indented
    pub code: String,

    /// 1-based line number of the opening fence
    pub line: usize,
}

/// A pipe-delimited table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Table {
    /// Cell strings of the header row
    pub headers: Vec<String>,

    /// Data rows; every row has the same column count as `headers`
    pub rows: Vec<Vec<String>>,

    /// 1-based line number of the header row
    pub line: usize,
}

/// Diagram flavor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagramKind {
    Mermaid,
    Plantuml,
    Sequence,
}

/// A diagram extracted from a fenced block
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagram {
    /// Diagram flavor
    #[serde(rename = "type")]
    pub kind: DiagramKind,

    /// Diagram source with the directive wrapper stripped
    pub content: String,

    /// 1-based line number of the enclosing fence
    pub line: usize,
}

/// Computed metadata for one parsed document
///
/// The five element sequences are ordered by `line`, consistent with the
/// order the elements occur in the source text.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMetadata {
    /// Whitespace-delimited token count of the body
    pub word_count: usize,

    /// Estimated reading time in minutes
    pub reading_time: usize,

    pub headings: Vec<Heading>,
    pub links: Vec<Link>,
    pub images: Vec<Image>,
    pub code_blocks: Vec<CodeBlock>,
    pub tables: Vec<Table>,
    pub diagrams: Vec<Diagram>,
}
