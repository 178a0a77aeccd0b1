//! HTML renderer adapter
//!
//! Substitutes the custom `@csv[...]`/`@json[...]` data directives and strips
//! the `@mermaid[...]`/`@plantuml[...]` wrappers inside diagram fences, then
//! delegates markdown-to-HTML conversion to `pulldown-cmark`.
//!
//! Data loading goes through the [`DataLoader`] collaborator so the adapter
//! owns only the substitution contract, not the file reads. A loader failure
//! leaves the directive as literal text and surfaces a warning; it never
//! fails the render.

use std::path::PathBuf;

use pulldown_cmark::{html, Options, Parser};
use thiserror::Error;

use crate::document::directive::{self, Directive, DirectiveKind};
use crate::document::scanner::{is_fence_close, parse_fence_open};

/// Errors produced by data loaders
#[derive(Error, Debug)]
pub enum DataLoadError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("JSON error in {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// External collaborator that loads data referenced by directives
pub trait DataLoader: Send + Sync {
    /// Load tabular data; the first row is the header row
    fn load_csv(&self, path: &str) -> Result<Vec<Vec<String>>, DataLoadError>;

    /// Load a JSON document
    fn load_json(&self, path: &str) -> Result<serde_json::Value, DataLoadError>;
}

/// Filesystem-backed loader resolving directive paths against a root
pub struct FsDataLoader {
    root: PathBuf,
}

impl FsDataLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl DataLoader for FsDataLoader {
    fn load_csv(&self, path: &str) -> Result<Vec<Vec<String>>, DataLoadError> {
        let full = self.root.join(path);
        let mut reader = csv::Reader::from_path(&full).map_err(|source| DataLoadError::Csv {
            path: path.to_string(),
            source,
        })?;

        let mut data = Vec::new();
        let headers = reader.headers().map_err(|source| DataLoadError::Csv {
            path: path.to_string(),
            source,
        })?;
        data.push(headers.iter().map(str::to_string).collect());

        for record in reader.records() {
            let record = record.map_err(|source| DataLoadError::Csv {
                path: path.to_string(),
                source,
            })?;
            data.push(record.iter().map(str::to_string).collect());
        }

        Ok(data)
    }

    fn load_json(&self, path: &str) -> Result<serde_json::Value, DataLoadError> {
        let full = self.root.join(path);
        let text = std::fs::read_to_string(&full).map_err(|source| DataLoadError::Io {
            path: path.to_string(),
            source,
        })?;

        serde_json::from_str(&text).map_err(|source| DataLoadError::Json {
            path: path.to_string(),
            source,
        })
    }
}

/// Render a markdown body to HTML, substituting custom directives first
pub fn render_html(
    body: &str,
    loader: &dyn DataLoader,
    process_diagrams: bool,
    warnings: &mut Vec<String>,
) -> String {
    let substituted = substitute_directives(body, loader, process_diagrams, warnings);

    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let parser = Parser::new_ext(&substituted, options);
    let mut output = String::with_capacity(substituted.len() * 2);
    html::push_html(&mut output, parser);
    output
}

struct FenceState {
    ch: char,
    len: usize,
    language: String,
    buffer: Vec<String>,
}

/// Walk the body with fence tracking, substituting data directives outside
/// fences and stripping diagram wrappers inside diagram fences
fn substitute_directives(
    body: &str,
    loader: &dyn DataLoader,
    process_diagrams: bool,
    warnings: &mut Vec<String>,
) -> String {
    let mut out: Vec<String> = Vec::new();
    let mut fence: Option<FenceState> = None;

    for raw_line in body.split('\n') {
        let line = raw_line.strip_suffix('\r').unwrap_or(raw_line);

        match fence.take() {
            Some(state) => {
                if is_fence_close(line, state.ch, state.len) {
                    flush_fence(&mut out, state, process_diagrams);
                    out.push(line.to_string());
                } else {
                    let mut state = state;
                    state.buffer.push(line.to_string());
                    fence = Some(state);
                }
            }
            None => {
                if let Some((ch, len, info)) = parse_fence_open(line) {
                    out.push(line.to_string());
                    fence = Some(FenceState {
                        ch,
                        len,
                        language: info.split_whitespace().next().unwrap_or("").to_string(),
                        buffer: Vec::new(),
                    });
                } else {
                    out.push(substitute_data_line(line, loader, warnings));
                }
            }
        }
    }

    if let Some(state) = fence {
        flush_fence(&mut out, state, process_diagrams);
    }

    out.join("\n")
}

/// Emit buffered fence content, stripping the diagram directive wrapper when
/// the fence is a diagram fence
fn flush_fence(out: &mut Vec<String>, state: FenceState, process_diagrams: bool) {
    if state.buffer.is_empty() {
        return;
    }

    if process_diagrams {
        let directive_kind = match state.language.as_str() {
            "mermaid" => Some(DirectiveKind::Mermaid),
            "plantuml" => Some(DirectiveKind::Plantuml),
            _ => None,
        };
        if let Some(kind) = directive_kind {
            let content = state.buffer.join("\n");
            if let Some(d) = directive::find_directive(&content, kind) {
                let mut replaced = String::with_capacity(content.len());
                replaced.push_str(&content[..d.start]);
                replaced.push_str(d.body.trim());
                replaced.push_str(&content[d.end..]);
                out.extend(replaced.split('\n').map(str::to_string));
                return;
            }
        }
    }

    out.extend(state.buffer);
}

/// Substitute `@csv`/`@json` directives on one line of non-fenced text
fn substitute_data_line(
    line: &str,
    loader: &dyn DataLoader,
    warnings: &mut Vec<String>,
) -> String {
    let directives: Vec<Directive> = directive::find_directives(line)
        .into_iter()
        .filter(|d| matches!(d.kind, DirectiveKind::Csv | DirectiveKind::Json))
        .collect();
    if directives.is_empty() {
        return line.to_string();
    }

    let mut out = String::with_capacity(line.len());
    let mut cursor = 0;
    for d in directives {
        out.push_str(&line[cursor..d.start]);
        match render_directive(&d, loader) {
            Ok(rendered) => out.push_str(&rendered),
            Err(e) => {
                log::warn!("failed to substitute @{}[{}]: {}", d.kind.name(), d.body, e);
                warnings.push(format!(
                    "failed to substitute @{}[{}]: {}",
                    d.kind.name(),
                    d.body,
                    e
                ));
                out.push_str(&line[d.start..d.end]);
            }
        }
        cursor = d.end;
    }
    out.push_str(&line[cursor..]);
    out
}

fn render_directive(d: &Directive, loader: &dyn DataLoader) -> Result<String, DataLoadError> {
    match d.kind {
        DirectiveKind::Csv => Ok(csv_table_html(&loader.load_csv(d.body.trim())?)),
        DirectiveKind::Json => Ok(json_block_html(&loader.load_json(d.body.trim())?)),
        // Diagram directives are only meaningful inside fences
        DirectiveKind::Mermaid | DirectiveKind::Plantuml => {
            Ok(format!("@{}[{}]", d.kind.name(), d.body))
        }
    }
}

/// Render loaded CSV rows as an HTML table; the first row is the header
fn csv_table_html(data: &[Vec<String>]) -> String {
    let Some((headers, rows)) = data.split_first() else {
        return String::new();
    };

    let mut out = String::from("<table>\n<thead>\n<tr>\n");
    for header in headers {
        out.push_str(&format!("<th>{}</th>\n", escape_html(header)));
    }
    out.push_str("</tr>\n</thead>\n<tbody>\n");

    for row in rows {
        out.push_str("<tr>\n");
        for cell in row {
            out.push_str(&format!("<td>{}</td>\n", escape_html(cell)));
        }
        out.push_str("</tr>\n");
    }

    out.push_str("</tbody>\n</table>");
    out
}

/// Render a JSON value as a pretty-printed code block
fn json_block_html(value: &serde_json::Value) -> String {
    let pretty = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
    format!(
        "<pre><code class=\"language-json\">{}</code></pre>",
        escape_html(&pretty)
    )
}

/// Escape HTML special characters
fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
