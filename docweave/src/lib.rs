//! docweave - markdown document parsing, metadata extraction, and project
//! indexing
//!
//! Raw markdown text flows through frontmatter extraction, structural
//! scanning, statistics, link resolution, and HTML rendering into a single
//! [`ParsedDocument`]; the [`project::ProjectManager`] fans the parser out
//! over a file tree and answers index, search, and category queries.

#![deny(unsafe_code)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]

pub mod document;
pub mod html_renderer;
pub mod pipeline;
pub mod project;
pub mod project_config;

pub use document::{
    CodeBlock, Criticality, Diagram, DiagramKind, Difficulty, DocumentMetadata, Frontmatter,
    Heading, Image, Link, LinkKind, Status, Table,
};
pub use html_renderer::{DataLoadError, DataLoader, FsDataLoader};
pub use pipeline::{parse, DocumentParser, ParseOptions, ParseResult, ParsedDocument};
pub use project::{
    DocumentInfo, ParseSummary, ProjectFiles, ProjectIndex, ProjectManager,
};
pub use project_config::ProjectConfig;
