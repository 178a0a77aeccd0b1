//! Parse orchestrator
//!
//! Composes frontmatter extraction, structural scanning, statistics, link
//! resolution, and HTML rendering into a single `parse` operation. Per call
//! the orchestrator moves through
//! `Start -> FrontmatterExtracted -> {Scanned | SkippedScan} ->
//! {Rendered | SkippedRender} -> Assembled`, gated by [`ParseOptions`], and
//! always terminates in a [`ParseResult`]: no fault propagates past this
//! boundary to the caller.

use std::path::Path;

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::document::frontmatter::{self, Frontmatter};
use crate::document::links;
use crate::document::metadata::DocumentMetadata;
use crate::document::scanner::{ScanEvent, Scanner};
use crate::document::stats;
use crate::html_renderer::{self, DataLoader, FsDataLoader};

/// Options controlling which stages a parse runs
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Render the body to HTML; when false, `html` is empty
    pub include_html: bool,

    /// Run the structural scanner; when false the parse is content-only
    pub extract_metadata: bool,

    /// Extract diagrams and substitute diagram directives; when false they
    /// stay literal text
    pub process_diagrams: bool,

    /// Classify links and resolve internal ones against `base_path`
    pub resolve_links: bool,

    /// Root used to resolve relative internal links and images
    pub base_path: Option<String>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            include_html: true,
            extract_metadata: true,
            process_diagrams: true,
            resolve_links: true,
            base_path: None,
        }
    }
}

/// One fully parsed document
///
/// Owned by the caller once returned; the parser keeps no back-references.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedDocument {
    /// Decoded frontmatter (default when absent)
    pub frontmatter: Frontmatter,

    /// Body text with the frontmatter block stripped
    pub content: String,

    /// Rendered HTML, or empty when rendering was skipped
    pub html: String,

    /// Computed structural metadata
    pub metadata: DocumentMetadata,

    /// Original unmodified input
    pub raw: String,
}

/// Tagged outcome of one parse operation
///
/// Warnings may accompany success; callers must check for success before
/// accessing the document.
#[derive(Debug, Clone)]
pub enum ParseResult {
    Success {
        document: ParsedDocument,
        warnings: Vec<String>,
    },
    Failure {
        error: String,
        warnings: Vec<String>,
    },
}

impl ParseResult {
    pub fn is_success(&self) -> bool {
        matches!(self, ParseResult::Success { .. })
    }

    pub fn document(&self) -> Option<&ParsedDocument> {
        match self {
            ParseResult::Success { document, .. } => Some(document),
            ParseResult::Failure { .. } => None,
        }
    }

    pub fn into_document(self) -> Option<ParsedDocument> {
        match self {
            ParseResult::Success { document, .. } => Some(document),
            ParseResult::Failure { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ParseResult::Success { .. } => None,
            ParseResult::Failure { error, .. } => Some(error),
        }
    }

    pub fn warnings(&self) -> &[String] {
        match self {
            ParseResult::Success { warnings, .. } | ParseResult::Failure { warnings, .. } => {
                warnings
            }
        }
    }
}

impl Serialize for ParseResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ParseResult::Success { document, warnings } => {
                let mut state = serializer.serialize_struct("ParseResult", 3)?;
                state.serialize_field("success", &true)?;
                state.serialize_field("document", document)?;
                state.serialize_field("warnings", warnings)?;
                state.end()
            }
            ParseResult::Failure { error, warnings } => {
                let mut state = serializer.serialize_struct("ParseResult", 3)?;
                state.serialize_field("success", &false)?;
                state.serialize_field("error", error)?;
                state.serialize_field("warnings", warnings)?;
                state.end()
            }
        }
    }
}

/// Stateless parser holding configuration and the data-loading collaborator
///
/// Holds no mutable state across calls; a single instance may serve
/// concurrent invocations.
pub struct DocumentParser {
    options: ParseOptions,
    loader: Box<dyn DataLoader>,
}

impl DocumentParser {
    /// Create a parser with a filesystem loader rooted at the base path
    /// (or the current directory when no base path is set)
    pub fn new(options: ParseOptions) -> Self {
        let root = options.base_path.clone().unwrap_or_else(|| ".".to_string());
        Self {
            loader: Box::new(FsDataLoader::new(root)),
            options,
        }
    }

    /// Create a parser with an injected data loader
    pub fn with_loader(options: ParseOptions, loader: Box<dyn DataLoader>) -> Self {
        Self { options, loader }
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Parse raw markdown text into a [`ParseResult`]
    ///
    /// # Parameters
    /// * `raw` - Raw UTF-8 markdown document, optionally with a leading
    ///   frontmatter block
    ///
    /// # Returns
    /// * `ParseResult::Success` - Parsed document, possibly with warnings
    /// * `ParseResult::Failure` - Descriptive error; no document
    pub fn parse(&self, raw: &str) -> ParseResult {
        let mut warnings = Vec::new();

        // FrontmatterExtracted
        let extracted = frontmatter::extract(raw);
        warnings.extend(extracted.warnings);
        let content = extracted.body;

        // Scanned | SkippedScan
        let mut metadata = DocumentMetadata::default();
        if self.options.extract_metadata {
            let mut scanner = Scanner::new(&content, self.options.process_diagrams);
            for event in scanner.by_ref() {
                match event {
                    ScanEvent::Heading(h) => metadata.headings.push(h),
                    ScanEvent::Link(l) => metadata.links.push(l),
                    ScanEvent::Image(i) => metadata.images.push(i),
                    ScanEvent::CodeBlock(c) => metadata.code_blocks.push(c),
                    ScanEvent::Table(t) => metadata.tables.push(t),
                    ScanEvent::Diagram(d) => metadata.diagrams.push(d),
                    // The renderer rediscovers data directives during its
                    // substitution pass
                    ScanEvent::DataDirective { .. } => {}
                }
            }
            warnings.extend(scanner.into_warnings());

            if self.options.resolve_links {
                links::resolve_metadata(&mut metadata, self.options.base_path.as_deref());
            }
        }
        metadata.word_count = stats::word_count(&content);
        metadata.reading_time = stats::reading_time(metadata.word_count);

        // Rendered | SkippedRender
        let html = if self.options.include_html {
            html_renderer::render_html(
                &content,
                self.loader.as_ref(),
                self.options.process_diagrams,
                &mut warnings,
            )
        } else {
            String::new()
        };

        // Assembled
        ParseResult::Success {
            document: ParsedDocument {
                frontmatter: extracted.frontmatter,
                content,
                html,
                metadata,
                raw: raw.to_string(),
            },
            warnings,
        }
    }

    /// Read and parse a file; a read failure becomes a `Failure` result
    pub fn parse_file(&self, path: &Path) -> ParseResult {
        match std::fs::read_to_string(path) {
            Ok(text) => self.parse(&text),
            Err(e) => ParseResult::Failure {
                error: format!("failed to read {}: {}", path.display(), e),
                warnings: Vec::new(),
            },
        }
    }
}

/// Parse raw markdown text with the given options
pub fn parse(text: &str, options: &ParseOptions) -> ParseResult {
    DocumentParser::new(options.clone()).parse(text)
}
