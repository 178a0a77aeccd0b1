//! Document model for the parsing stage
//!
//! This module groups everything that turns raw markdown text into
//! structured data: frontmatter extraction, structural scanning, statistics,
//! and link resolution.

// Submodules
pub mod directive;
pub mod frontmatter;
pub mod links;
pub mod metadata;
pub mod scanner;
pub mod stats;

// Re-export public types
pub use frontmatter::{Criticality, Difficulty, ExtractedFrontmatter, Frontmatter, Status};
pub use metadata::{
    CodeBlock, Diagram, DiagramKind, DocumentMetadata, Heading, Image, Link, LinkKind, Table,
};
pub use scanner::{ScanEvent, Scanner};
