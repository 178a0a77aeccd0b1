//! Project-wide document manager
//!
//! Runs the parse orchestrator over every markdown file in a project, with
//! per-file isolation: one corrupt file reduces the success count without
//! aborting the batch. The project index is a pure fold over per-document
//! metadata, recomputed on demand; the aggregation is commutative, so the
//! result is identical regardless of parse order.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use itertools::Itertools;
use serde::Serialize;
use walkdir::WalkDir;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::html_renderer::{DataLoader, FsDataLoader};
use crate::pipeline::{DocumentParser, ParseOptions, ParseResult, ParsedDocument};
use crate::project_config::{ProjectConfig, ProjectConfigError, PROJECT_FILE};
use thiserror::Error;

/// Filesystem collaborator listing and reading project files
pub trait ProjectFiles: Send + Sync {
    /// List markdown files under the project root, as relative paths
    fn list(&self) -> io::Result<Vec<PathBuf>>;

    /// Read one file's content by relative path
    fn read(&self, path: &Path) -> io::Result<String>;
}

/// Walkdir-backed file listing rooted at a project directory
pub struct FsProjectFiles {
    root: PathBuf,
}

impl FsProjectFiles {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ProjectFiles for FsProjectFiles {
    fn list(&self) -> io::Result<Vec<PathBuf>> {
        let mut paths = Vec::new();

        for entry in WalkDir::new(&self.root)
            .follow_links(false)
            .sort_by_file_name()
        {
            let entry = entry.map_err(io::Error::other)?;
            let path = entry.path();

            if !path.is_file() || path.extension().and_then(|s| s.to_str()) != Some("md") {
                continue;
            }

            paths.push(path.strip_prefix(&self.root).unwrap_or(path).to_path_buf());
        }

        Ok(paths)
    }

    fn read(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(self.root.join(path))
    }
}

/// Per-document entry in the project index
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentInfo {
    pub path: String,

    /// Frontmatter title, first heading, or file stem, in that order
    pub title: String,

    #[serde(rename = "type")]
    pub doc_type: String,

    pub tags: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,

    pub word_count: usize,

    pub reading_time: usize,
}

impl DocumentInfo {
    fn from_document(path: &Path, document: &ParsedDocument) -> Self {
        let fm = &document.frontmatter;

        let title = fm
            .title
            .clone()
            .or_else(|| document.metadata.headings.first().map(|h| h.text.clone()))
            .unwrap_or_else(|| {
                path.file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or("untitled")
                    .to_string()
            });

        let doc_type = fm
            .extra
            .get("type")
            .and_then(|v| v.as_str())
            .unwrap_or("document")
            .to_string();

        Self {
            path: path.display().to_string(),
            title,
            doc_type,
            tags: fm.tags.clone(),
            category: fm.category.clone(),
            author: fm.author.clone(),
            created_at: fm.created.clone(),
            updated_at: fm.updated.clone(),
            word_count: document.metadata.word_count,
            reading_time: document.metadata.reading_time,
        }
    }
}

/// Aggregated label counts over all indexed documents
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexStatistics {
    /// Total word count across all documents
    pub word_count: usize,

    /// Documents per category
    pub category_count: BTreeMap<String, usize>,

    /// Occurrences per tag
    pub tag_count: BTreeMap<String, usize>,

    /// Documents per author
    pub author_count: BTreeMap<String, usize>,
}

/// Recomputable summary over all parsed documents in a project
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectIndex {
    pub document_count: usize,
    pub total_words: usize,
    pub structure: Vec<DocumentInfo>,
    pub statistics: IndexStatistics,
}

/// Outcome of a full project parse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ParseSummary {
    /// Number of files parsed successfully
    pub success: usize,

    /// Number of files that failed to read or parse
    pub failed: usize,
}

/// Errors produced by project-level operations
#[derive(Error, Debug)]
pub enum ProjectError {
    #[error("failed to list project files: {0}")]
    List(#[source] io::Error),

    #[error("config error: {0}")]
    Config(#[from] ProjectConfigError),

    #[error("failed to serialize index: {0}")]
    Serialize(#[from] serde_json::Error),
}

struct IndexedDocument {
    path: PathBuf,
    document: ParsedDocument,
}

/// Manager running the parser over a project tree and answering queries
pub struct ProjectManager {
    root: PathBuf,
    files: Box<dyn ProjectFiles>,
    parser: DocumentParser,
    config: Option<ProjectConfig>,
    documents: Vec<IndexedDocument>,
    failures: Vec<(PathBuf, String)>,
}

impl ProjectManager {
    /// Create a manager over a project directory with default options
    ///
    /// Directive data paths resolve against the project root. An existing
    /// docweave.toml is picked up when present.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_options(root, ParseOptions::default())
    }

    /// Create a manager over a project directory with custom parse options
    pub fn with_options(root: impl Into<PathBuf>, options: ParseOptions) -> Self {
        let root = root.into();
        Self::with_collaborators(
            root.clone(),
            options,
            Box::new(FsProjectFiles::new(&root)),
            Box::new(FsDataLoader::new(&root)),
        )
    }

    /// Create a manager with injected filesystem and data collaborators
    pub fn with_collaborators(
        root: impl Into<PathBuf>,
        options: ParseOptions,
        files: Box<dyn ProjectFiles>,
        loader: Box<dyn DataLoader>,
    ) -> Self {
        let root = root.into();
        let config = ProjectConfig::load(root.join(PROJECT_FILE)).ok();
        Self {
            parser: DocumentParser::with_loader(options, loader),
            files,
            config,
            root,
            documents: Vec::new(),
            failures: Vec::new(),
        }
    }

    /// Write a fresh docweave.toml and adopt it as the active configuration
    pub fn initialize_project(
        &mut self,
        name: &str,
        author: &str,
    ) -> Result<ProjectConfig, ProjectError> {
        let config = ProjectConfig::new(name, author);
        config.save(self.root.join(PROJECT_FILE))?;
        self.config = Some(config.clone());
        Ok(config)
    }

    pub fn config(&self) -> Option<&ProjectConfig> {
        self.config.as_ref()
    }

    /// Parse every markdown file in the project
    ///
    /// Per-file isolation: a file that fails to read or decode is counted as
    /// failed and recorded, and the batch continues.
    ///
    /// # Returns
    /// * `Ok(ParseSummary)` - Counts of succeeded and failed files
    /// * `Err(ProjectError)` - Error listing the project files
    pub fn parse_all_files(&mut self) -> Result<ParseSummary, ProjectError> {
        let paths = self.files.list().map_err(ProjectError::List)?;

        #[cfg(feature = "parallel")]
        let results: Vec<(PathBuf, ParseResult)> = paths
            .par_iter()
            .map(|path| (path.clone(), self.parse_one(path)))
            .collect();

        #[cfg(not(feature = "parallel"))]
        let results: Vec<(PathBuf, ParseResult)> = paths
            .iter()
            .map(|path| (path.clone(), self.parse_one(path)))
            .collect();

        self.documents.clear();
        self.failures.clear();
        let mut summary = ParseSummary {
            success: 0,
            failed: 0,
        };

        for (path, result) in results {
            match result {
                ParseResult::Success { document, warnings } => {
                    for warning in warnings {
                        log::warn!("{}: {}", path.display(), warning);
                    }
                    summary.success += 1;
                    self.documents.push(IndexedDocument { path, document });
                }
                ParseResult::Failure { error, .. } => {
                    log::warn!("failed to parse {}: {}", path.display(), error);
                    summary.failed += 1;
                    self.failures.push((path, error));
                }
            }
        }

        Ok(summary)
    }

    fn parse_one(&self, path: &Path) -> ParseResult {
        match self.files.read(path) {
            Ok(text) => self.parser.parse(&text),
            Err(e) => ParseResult::Failure {
                error: format!("failed to read {}: {}", path.display(), e),
                warnings: Vec::new(),
            },
        }
    }

    /// Per-file errors from the last `parse_all_files` run
    pub fn failures(&self) -> &[(PathBuf, String)] {
        &self.failures
    }

    /// Successfully parsed documents from the last `parse_all_files` run
    pub fn documents(&self) -> impl Iterator<Item = (&Path, &ParsedDocument)> {
        self.documents
            .iter()
            .map(|d| (d.path.as_path(), &d.document))
    }

    /// Rebuild the project index from the parsed documents
    pub fn statistics(&self) -> ProjectIndex {
        let structure: Vec<DocumentInfo> = self
            .documents
            .iter()
            .map(|d| DocumentInfo::from_document(&d.path, &d.document))
            .sorted_by(|a, b| a.path.cmp(&b.path))
            .collect();

        let mut statistics = IndexStatistics::default();
        for info in &structure {
            statistics.word_count += info.word_count;
            if let Some(category) = &info.category {
                *statistics.category_count.entry(category.clone()).or_default() += 1;
            }
            if let Some(author) = &info.author {
                *statistics.author_count.entry(author.clone()).or_default() += 1;
            }
            for tag in &info.tags {
                *statistics.tag_count.entry(tag.clone()).or_default() += 1;
            }
        }

        ProjectIndex {
            document_count: structure.len(),
            total_words: statistics.word_count,
            structure,
            statistics,
        }
    }

    /// Search documents by title, description, and tags
    ///
    /// Case-insensitive term matching; title matches weigh more than tag
    /// matches, which weigh more than description matches. Ties break on
    /// ascending path.
    pub fn search_documents(&self, query: &str) -> Vec<DocumentInfo> {
        let terms: Vec<String> = query
            .to_lowercase()
            .split_whitespace()
            .map(str::to_string)
            .collect();
        if terms.is_empty() {
            return Vec::new();
        }

        self.documents
            .iter()
            .filter_map(|d| {
                let score = relevance(&d.document, &terms);
                (score > 0).then(|| (score, DocumentInfo::from_document(&d.path, &d.document)))
            })
            .sorted_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.path.cmp(&b.1.path)))
            .map(|(_, info)| info)
            .collect()
    }

    /// Documents whose category matches exactly
    pub fn documents_by_category(&self, category: &str) -> Vec<DocumentInfo> {
        self.documents
            .iter()
            .filter(|d| d.document.frontmatter.category.as_deref() == Some(category))
            .map(|d| DocumentInfo::from_document(&d.path, &d.document))
            .sorted_by(|a, b| a.path.cmp(&b.path))
            .collect()
    }

    /// Serialize the project index as pretty JSON for machine consumers
    pub fn export_index_json(&self) -> Result<String, ProjectError> {
        Ok(serde_json::to_string_pretty(&self.statistics())?)
    }
}

fn relevance(document: &ParsedDocument, terms: &[String]) -> usize {
    let fm = &document.frontmatter;
    let title = fm.title.as_deref().unwrap_or("").to_lowercase();
    let description = fm.description.as_deref().unwrap_or("").to_lowercase();
    let tags: Vec<String> = fm.tags.iter().map(|t| t.to_lowercase()).collect();

    let mut score = 0;
    for term in terms {
        if title.contains(term.as_str()) {
            score += 4;
        }
        if tags.iter().any(|t| t.contains(term.as_str())) {
            score += 2;
        }
        if description.contains(term.as_str()) {
            score += 1;
        }
    }
    score
}
