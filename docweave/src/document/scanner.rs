//! Line-based structural scanner
//!
//! Walks a markdown body line by line and produces structural events in
//! document order: headings, inline links and images, fenced code blocks,
//! pipe tables, diagrams, and standalone data directives. The scanner is a
//! lazy iterator; a fence state machine keeps fenced content from being
//! scanned for nested constructs.
//!
//! Scanning never fails on malformed input. Partial constructs are either
//! skipped or recorded best-effort, with warnings accumulated on the scanner.

use std::collections::VecDeque;
use std::sync::OnceLock;

use regex::Regex;

use crate::document::directive::{self, Directive, DirectiveKind};
use crate::document::metadata::{
    CodeBlock, Diagram, DiagramKind, Heading, Image, Link, Table,
};

/// One structural element discovered in the body
#[derive(Debug, Clone, PartialEq)]
pub enum ScanEvent {
    Heading(Heading),
    Link(Link),
    Image(Image),
    CodeBlock(CodeBlock),
    Table(Table),
    Diagram(Diagram),
    /// Standalone `@csv[...]`/`@json[...]` outside any fence; consumed by the
    /// HTML renderer, not part of document metadata
    DataDirective { directive: Directive, line: usize },
}

/// Lazy scanner over a markdown body
///
/// Line numbers in emitted events are 1-based positions in the scanned body.
pub struct Scanner<'a> {
    lines: Vec<&'a str>,
    pos: usize,
    pending: VecDeque<ScanEvent>,
    warnings: Vec<String>,
    process_diagrams: bool,
}

impl<'a> Scanner<'a> {
    pub fn new(body: &'a str, process_diagrams: bool) -> Self {
        Self {
            lines: body
                .split('\n')
                .map(|l| l.strip_suffix('\r').unwrap_or(l))
                .collect(),
            pos: 0,
            pending: VecDeque::new(),
            warnings: Vec::new(),
            process_diagrams,
        }
    }

    /// Warnings accumulated so far
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Consume the scanner, returning accumulated warnings
    pub fn into_warnings(self) -> Vec<String> {
        self.warnings
    }

    /// Consume lines starting at `self.pos` until at least one event is
    /// produced or the input is exhausted
    fn advance(&mut self) {
        let idx = self.pos;
        let line = self.lines[idx];

        if let Some((ch, len, info)) = parse_fence_open(line) {
            self.consume_fence(idx, ch, len, &info);
            return;
        }

        if let Some(heading) = parse_heading(line, idx + 1) {
            self.pos = idx + 1;
            self.pending.push_back(ScanEvent::Heading(heading));
            self.pending.extend(inline_events(line, idx + 1));
            return;
        }

        if is_pipe_row(line)
            && self
                .lines
                .get(idx + 1)
                .copied()
                .is_some_and(is_separator_row)
        {
            self.consume_table(idx);
            return;
        }

        self.pos = idx + 1;
        self.pending.extend(inline_events(line, idx + 1));
    }

    /// Consume a fenced block opened at `idx`
    ///
    /// An unterminated fence swallows the rest of the body as code.
    fn consume_fence(&mut self, idx: usize, ch: char, len: usize, info: &str) {
        let close = (idx + 1..self.lines.len()).find(|&j| is_fence_close(self.lines[j], ch, len));

        let (content_end, next_pos) = match close {
            Some(j) => (j, j + 1),
            None => {
                self.warnings
                    .push(format!("unterminated code fence opened on line {}", idx + 1));
                (self.lines.len(), self.lines.len())
            }
        };

        let line_no = idx + 1;
        let code = self.lines[idx + 1..content_end].join("\n");
        let language = info.split_whitespace().next().map(str::to_string);
        self.pos = next_pos;

        let diagram = if self.process_diagrams {
            diagram_from_fence(language.as_deref(), &code, line_no)
        } else {
            None
        };

        self.pending.push_back(ScanEvent::CodeBlock(CodeBlock {
            language,
            code,
            line: line_no,
        }));
        if let Some(diagram) = diagram {
            self.pending.push_back(ScanEvent::Diagram(diagram));
        }
    }

    /// Consume a pipe table whose header row is at `idx`
    fn consume_table(&mut self, idx: usize) {
        let header_line = self.lines[idx];
        let headers = split_cells(header_line);

        let mut rows = Vec::new();
        let mut row_events = Vec::new();
        let mut j = idx + 2;
        while j < self.lines.len() {
            let line = self.lines[j];
            if !is_pipe_row(line) || parse_fence_open(line).is_some() {
                break;
            }

            let mut cells = split_cells(line);
            if cells.len() != headers.len() {
                self.warnings.push(format!(
                    "table row on line {} has {} cells, expected {}",
                    j + 1,
                    cells.len(),
                    headers.len()
                ));
                cells.resize(headers.len(), String::new());
            }
            row_events.extend(inline_events(line, j + 1));
            rows.push(cells);
            j += 1;
        }

        self.pos = j;
        self.pending.push_back(ScanEvent::Table(Table {
            headers,
            rows,
            line: idx + 1,
        }));
        self.pending.extend(inline_events(header_line, idx + 1));
        self.pending.extend(row_events);
    }
}

impl Iterator for Scanner<'_> {
    type Item = ScanEvent;

    fn next(&mut self) -> Option<ScanEvent> {
        loop {
            if let Some(event) = self.pending.pop_front() {
                return Some(event);
            }
            if self.pos >= self.lines.len() {
                return None;
            }
            self.advance();
        }
    }
}

/// Derive a URL-safe identifier from heading text
///
/// Lowercase; runs of non-alphanumeric characters collapse to a single
/// hyphen; leading and trailing hyphens are trimmed. The same text always
/// yields the same id; duplicate headings produce duplicate ids.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_hyphen = false;

    for c in text.to_lowercase().chars() {
        if c.is_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        } else {
            pending_hyphen = true;
        }
    }

    slug
}

/// Parse a fence opener: three or more backticks or tildes, optionally
/// preceded by whitespace, followed by an info string
pub(crate) fn parse_fence_open(line: &str) -> Option<(char, usize, String)> {
    let trimmed = line.trim_start();
    let first = trimmed.chars().next()?;
    if first != '`' && first != '~' {
        return None;
    }

    let len = trimmed.chars().take_while(|&c| c == first).count();
    if len < 3 {
        return None;
    }

    let info = trimmed[len..].trim().to_string();
    // Backtick info strings cannot contain backticks (that would be an
    // inline code span, not a fence)
    if first == '`' && info.contains('`') {
        return None;
    }

    Some((first, len, info))
}

/// Check whether a line closes a fence: at least `open_len` of the matching
/// fence character and nothing else
pub(crate) fn is_fence_close(line: &str, ch: char, open_len: usize) -> bool {
    let trimmed = line.trim();
    trimmed.len() >= open_len && trimmed.chars().all(|c| c == ch)
}

fn parse_heading(line: &str, line_no: usize) -> Option<Heading> {
    let level = line.chars().take_while(|&c| c == '#').count();
    if level == 0 || level > 6 {
        return None;
    }

    let text = line[level..].strip_prefix(' ')?;
    let text = strip_inline_markup(text.trim());
    let id = slugify(&text);

    Some(Heading {
        level,
        text,
        id,
        line: line_no,
    })
}

/// Strip inline markdown markup from heading text: links collapse to their
/// labels, paired emphasis/code markers are removed
fn strip_inline_markup(text: &str) -> String {
    static LINK: OnceLock<Regex> = OnceLock::new();
    static EMPHASIS: OnceLock<Vec<Regex>> = OnceLock::new();

    let link = LINK.get_or_init(|| {
        Regex::new(r"!?\[([^\]]*)\]\([^)]*\)").expect("link pattern is valid")
    });
    let emphasis = EMPHASIS.get_or_init(|| {
        [
            r"\*\*([^*]+)\*\*",
            r"\*([^*]+)\*",
            r"__([^_]+)__",
            r"~~([^~]+)~~",
            r"`([^`]+)`",
        ]
        .iter()
        .map(|p| Regex::new(p).expect("emphasis pattern is valid"))
        .collect()
    });

    let mut out = link.replace_all(text, "$1").into_owned();
    for re in emphasis {
        out = re.replace_all(&out, "$1").into_owned();
    }
    out
}

fn is_pipe_row(line: &str) -> bool {
    line.contains('|') && !line.trim().is_empty()
}

/// A separator row consists only of hyphens, colons, pipes, and whitespace,
/// with at least one hyphen and one pipe
fn is_separator_row(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.contains('|')
        && trimmed.contains('-')
        && trimmed
            .chars()
            .all(|c| matches!(c, '-' | ':' | '|' | ' ' | '\t'))
}

/// Split a pipe row into trimmed cell strings, dropping boundary pipes
fn split_cells(line: &str) -> Vec<String> {
    let trimmed = line.trim();
    let mut cells: Vec<&str> = trimmed.split('|').collect();
    if trimmed.starts_with('|') && !cells.is_empty() {
        cells.remove(0);
    }
    if trimmed.ends_with('|') && !cells.is_empty() {
        cells.pop();
    }
    cells.into_iter().map(|c| c.trim().to_string()).collect()
}

fn inline_pattern() -> &'static Regex {
    static INLINE: OnceLock<Regex> = OnceLock::new();
    INLINE.get_or_init(|| {
        Regex::new(r"(!?)\[([^\]]*)\]\(([^)]*)\)").expect("inline pattern is valid")
    })
}

/// Extract inline links, images, and standalone data directives from one
/// line of non-code text
fn inline_events(line: &str, line_no: usize) -> Vec<ScanEvent> {
    let mut events = Vec::new();

    for cap in inline_pattern().captures_iter(line) {
        let label = cap.get(2).map_or("", |m| m.as_str()).to_string();
        let (target, title) = parse_target(cap.get(3).map_or("", |m| m.as_str()));

        if cap.get(1).is_some_and(|m| m.as_str() == "!") {
            events.push(ScanEvent::Image(Image {
                alt: label,
                src: target,
                title,
                line: line_no,
            }));
        } else {
            events.push(ScanEvent::Link(Link {
                text: label,
                url: target,
                kind: None,
                line: line_no,
            }));
        }
    }

    for d in directive::find_directives(line) {
        if matches!(d.kind, DirectiveKind::Csv | DirectiveKind::Json) {
            events.push(ScanEvent::DataDirective {
                directive: d,
                line: line_no,
            });
        }
    }

    events
}

/// Split a link/image target into the source and an optional quoted title
fn parse_target(raw: &str) -> (String, Option<String>) {
    let raw = raw.trim();
    if let Some(stripped) = raw.strip_suffix('"') {
        if let Some(open) = stripped.rfind('"') {
            let title = stripped[open + 1..].to_string();
            let src = raw[..open].trim_end().to_string();
            return (src, Some(title));
        }
    }
    (raw.to_string(), None)
}

/// Classify a fence as a diagram by its info string, extracting the content
/// from an embedded directive when one is present
fn diagram_from_fence(language: Option<&str>, code: &str, line: usize) -> Option<Diagram> {
    let kind = match language? {
        "mermaid" => DiagramKind::Mermaid,
        "plantuml" => DiagramKind::Plantuml,
        "sequence" => DiagramKind::Sequence,
        _ => return None,
    };

    let directive_kind = match kind {
        DiagramKind::Mermaid => Some(DirectiveKind::Mermaid),
        DiagramKind::Plantuml => Some(DirectiveKind::Plantuml),
        DiagramKind::Sequence => None,
    };

    let content = directive_kind
        .and_then(|k| directive::find_directive(code, k))
        .map(|d| d.body.trim().to_string())
        .unwrap_or_else(|| code.trim().to_string());

    Some(Diagram {
        kind,
        content,
        line,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(body: &str) -> (Vec<ScanEvent>, Vec<String>) {
        let mut scanner = Scanner::new(body, true);
        let events: Vec<ScanEvent> = scanner.by_ref().collect();
        (events, scanner.into_warnings())
    }

    #[test]
    fn test_heading_levels_and_ids() {
        let (events, warnings) = scan("# Hello\n\n### API & Tools!\n");

        assert!(warnings.is_empty());
        let headings: Vec<&Heading> = events
            .iter()
            .filter_map(|e| match e {
                ScanEvent::Heading(h) => Some(h),
                _ => None,
            })
            .collect();
        assert_eq!(headings.len(), 2);
        assert_eq!(headings[0].level, 1);
        assert_eq!(headings[0].text, "Hello");
        assert_eq!(headings[0].id, "hello");
        assert_eq!(headings[0].line, 1);
        assert_eq!(headings[1].level, 3);
        assert_eq!(headings[1].id, "api-tools");
        assert_eq!(headings[1].line, 3);
    }

    #[test]
    fn test_heading_requires_space_after_hashes() {
        let (events, _) = scan("#NoSpace\n");
        assert!(events.is_empty());
    }

    #[test]
    fn test_heading_markup_is_stripped() {
        let (events, _) = scan("## Using **bold** and `code`\n");
        match &events[0] {
            ScanEvent::Heading(h) => {
                assert_eq!(h.text, "Using bold and code");
                assert_eq!(h.id, "using-bold-and-code");
            }
            other => panic!("expected heading, got {other:?}"),
        }
    }

    #[test]
    fn test_slugify_is_deterministic() {
        assert_eq!(slugify("Hello"), "hello");
        assert_eq!(slugify("Hello"), slugify("Hello"));
        assert_eq!(slugify("  Spaced --- Out  "), "spaced-out");
        assert_eq!(slugify("C'est l'été"), "c-est-l-été");
    }

    #[test]
    fn test_fenced_code_block() {
        let (events, warnings) = scan("```js\ncode\n```\n");

        assert!(warnings.is_empty());
        assert_eq!(events.len(), 1);
        match &events[0] {
            ScanEvent::CodeBlock(block) => {
                assert_eq!(block.language.as_deref(), Some("js"));
                assert_eq!(block.code, "code");
                assert_eq!(block.line, 1);
            }
            other => panic!("expected code block, got {other:?}"),
        }
    }

    #[test]
    fn test_unlabeled_fence_has_no_language() {
        let (events, _) = scan("```\nplain\n```\n");
        match &events[0] {
            ScanEvent::CodeBlock(block) => assert_eq!(block.language, None),
            other => panic!("expected code block, got {other:?}"),
        }
    }

    #[test]
    fn test_fence_content_is_not_scanned() {
        let body = "```\n# not a heading\n[not](a-link)\n| not | a table |\n| --- | --- |\n```\n";
        let (events, _) = scan(body);

        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], ScanEvent::CodeBlock(_)));
    }

    #[test]
    fn test_unterminated_fence_swallows_rest_with_warning() {
        let (events, warnings) = scan("```rust\nfn f() {}\n\n# swallowed\n");

        assert_eq!(warnings.len(), 1);
        assert_eq!(events.len(), 1);
        match &events[0] {
            ScanEvent::CodeBlock(block) => {
                assert!(block.code.contains("# swallowed"));
            }
            other => panic!("expected code block, got {other:?}"),
        }
    }

    #[test]
    fn test_tilde_fence_closes_only_on_matching_char() {
        let (events, _) = scan("~~~\n```\nstill code\n~~~\n");
        assert_eq!(events.len(), 1);
        match &events[0] {
            ScanEvent::CodeBlock(block) => assert!(block.code.contains("```")),
            other => panic!("expected code block, got {other:?}"),
        }
    }

    #[test]
    fn test_inline_links_and_images() {
        let body = "See [a](http://x.com) and ![logo](img/logo.png \"The logo\")\n";
        let (events, _) = scan(body);

        assert_eq!(events.len(), 2);
        match &events[0] {
            ScanEvent::Link(link) => {
                assert_eq!(link.text, "a");
                assert_eq!(link.url, "http://x.com");
                assert_eq!(link.kind, None);
                assert_eq!(link.line, 1);
            }
            other => panic!("expected link, got {other:?}"),
        }
        match &events[1] {
            ScanEvent::Image(image) => {
                assert_eq!(image.alt, "logo");
                assert_eq!(image.src, "img/logo.png");
                assert_eq!(image.title.as_deref(), Some("The logo"));
            }
            other => panic!("expected image, got {other:?}"),
        }
    }

    #[test]
    fn test_one_event_per_link_occurrence() {
        let (events, _) = scan("[a](1) [a](1) [b](2)\n");
        let links = events
            .iter()
            .filter(|e| matches!(e, ScanEvent::Link(_)))
            .count();
        assert_eq!(links, 3);
    }

    #[test]
    fn test_table_scenario() {
        let (events, warnings) = scan("A|B\n-|-\n1|2\n");

        assert!(warnings.is_empty());
        assert_eq!(events.len(), 1);
        match &events[0] {
            ScanEvent::Table(table) => {
                assert_eq!(table.headers, vec!["A", "B"]);
                assert_eq!(table.rows, vec![vec!["1".to_string(), "2".to_string()]]);
                assert_eq!(table.line, 1);
            }
            other => panic!("expected table, got {other:?}"),
        }
    }

    #[test]
    fn test_table_with_boundary_pipes() {
        let body = "| Name | Value |\n| --- | ---: |\n| a | 1 |\n| b | 2 |\n";
        let (events, _) = scan(body);

        match &events[0] {
            ScanEvent::Table(table) => {
                assert_eq!(table.headers, vec!["Name", "Value"]);
                assert_eq!(table.rows.len(), 2);
                assert_eq!(table.rows[1], vec!["b".to_string(), "2".to_string()]);
            }
            other => panic!("expected table, got {other:?}"),
        }
    }

    #[test]
    fn test_ragged_table_row_is_padded_with_warning() {
        let (events, warnings) = scan("| A | B |\n| - | - |\n| only |\n| x | y | z |\n");

        assert_eq!(warnings.len(), 2);
        match &events[0] {
            ScanEvent::Table(table) => {
                assert_eq!(table.rows[0], vec!["only".to_string(), String::new()]);
                assert_eq!(table.rows[1], vec!["x".to_string(), "y".to_string()]);
            }
            other => panic!("expected table, got {other:?}"),
        }
    }

    #[test]
    fn test_links_inside_table_cells_are_recorded() {
        let body = "| Doc |\n| --- |\n| [guide](./guide.md) |\n";
        let (events, _) = scan(body);

        assert!(events.iter().any(|e| matches!(
            e,
            ScanEvent::Link(Link { url, line: 3, .. }) if url == "./guide.md"
        )));
    }

    #[test]
    fn test_mermaid_fence_with_directive() {
        let body = "```mermaid\n@mermaid[graph TD; A-->B]\n```\n";
        let (events, _) = scan(body);

        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], ScanEvent::CodeBlock(_)));
        match &events[1] {
            ScanEvent::Diagram(diagram) => {
                assert_eq!(diagram.kind, DiagramKind::Mermaid);
                assert_eq!(diagram.content, "graph TD; A-->B");
                assert_eq!(diagram.line, 1);
            }
            other => panic!("expected diagram, got {other:?}"),
        }
    }

    #[test]
    fn test_plantuml_fence_without_directive() {
        let body = "```plantuml\n@startuml\nA -> B\n@enduml\n```\n";
        let (events, _) = scan(body);

        match &events[1] {
            ScanEvent::Diagram(diagram) => {
                assert_eq!(diagram.kind, DiagramKind::Plantuml);
                assert_eq!(diagram.content, "@startuml\nA -> B\n@enduml");
            }
            other => panic!("expected diagram, got {other:?}"),
        }
    }

    #[test]
    fn test_sequence_fence_is_a_diagram() {
        let (events, _) = scan("```sequence\nAlice->Bob: hi\n```\n");
        assert!(events
            .iter()
            .any(|e| matches!(e, ScanEvent::Diagram(d) if d.kind == DiagramKind::Sequence)));
    }

    #[test]
    fn test_diagrams_suppressed_when_disabled() {
        let body = "```mermaid\n@mermaid[graph TD]\n```\n";
        let mut scanner = Scanner::new(body, false);
        let events: Vec<ScanEvent> = scanner.by_ref().collect();

        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], ScanEvent::CodeBlock(_)));
    }

    #[test]
    fn test_standalone_data_directive_outside_fence() {
        let (events, _) = scan("@csv[tables/data.csv]\n\n```\n@csv[ignored.csv]\n```\n");

        let directives: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                ScanEvent::DataDirective { directive, line } => Some((directive, *line)),
                _ => None,
            })
            .collect();
        assert_eq!(directives.len(), 1);
        assert_eq!(directives[0].0.body, "tables/data.csv");
        assert_eq!(directives[0].1, 1);
    }

    #[test]
    fn test_events_appear_in_document_order() {
        let body = concat!(
            "[early](a.md)\n",
            "\n",
            "# Middle\n",
            "\n",
            "```js\nx\n```\n",
            "\n",
            "| H |\n| - |\n| [late](b.md) |\n",
        );
        let (events, _) = scan(body);

        let lines: Vec<usize> = events
            .iter()
            .map(|e| match e {
                ScanEvent::Heading(h) => h.line,
                ScanEvent::Link(l) => l.line,
                ScanEvent::Image(i) => i.line,
                ScanEvent::CodeBlock(c) => c.line,
                ScanEvent::Table(t) => t.line,
                ScanEvent::Diagram(d) => d.line,
                ScanEvent::DataDirective { line, .. } => *line,
            })
            .collect();

        let mut sorted = lines.clone();
        sorted.sort_unstable();
        assert_eq!(lines, sorted);
    }

    #[test]
    fn test_empty_body_yields_nothing() {
        let (events, warnings) = scan("");
        assert!(events.is_empty());
        assert!(warnings.is_empty());
    }
}
