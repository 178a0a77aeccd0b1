//! Embedded `@name[...]` directive parsing
//!
//! Directives are custom markers substituted by the HTML renderer:
//! `@csv[path]`, `@json[path]`, `@mermaid[source]`, `@plantuml[source]`.
//! Brackets are non-nesting delimiters; the directive body is everything up
//! to the first closing bracket.

/// Directive family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectiveKind {
    Csv,
    Json,
    Mermaid,
    Plantuml,
}

impl DirectiveKind {
    /// The marker name as written in the document (without `@` or brackets)
    pub fn name(self) -> &'static str {
        match self {
            DirectiveKind::Csv => "csv",
            DirectiveKind::Json => "json",
            DirectiveKind::Mermaid => "mermaid",
            DirectiveKind::Plantuml => "plantuml",
        }
    }
}

/// A directive occurrence within a searched text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    /// Directive family
    pub kind: DirectiveKind,

    /// Content between the brackets, verbatim
    pub body: String,

    /// Byte offset of the `@` in the searched text
    pub start: usize,

    /// Byte offset just past the closing bracket
    pub end: usize,
}

const KINDS: [DirectiveKind; 4] = [
    DirectiveKind::Csv,
    DirectiveKind::Json,
    DirectiveKind::Mermaid,
    DirectiveKind::Plantuml,
];

/// Find every directive in `text`, in order of occurrence
///
/// A marker without a closing bracket is not a directive and is skipped.
pub fn find_directives(text: &str) -> Vec<Directive> {
    let mut found = Vec::new();
    let mut cursor = 0;

    while let Some(offset) = text[cursor..].find('@') {
        let at = cursor + offset;
        let rest = &text[at + 1..];

        let Some(kind) = KINDS.iter().copied().find(|k| {
            rest.starts_with(k.name()) && rest[k.name().len()..].starts_with('[')
        }) else {
            cursor = at + 1;
            continue;
        };

        let body_start = at + 1 + kind.name().len() + 1;
        let Some(close) = text[body_start..].find(']') else {
            cursor = at + 1;
            continue;
        };

        let body_end = body_start + close;
        found.push(Directive {
            kind,
            body: text[body_start..body_end].to_string(),
            start: at,
            end: body_end + 1,
        });
        cursor = body_end + 1;
    }

    found
}

/// Find the first directive of `kind` in `text`
pub fn find_directive(text: &str, kind: DirectiveKind) -> Option<Directive> {
    find_directives(text).into_iter().find(|d| d.kind == kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_csv_directive() {
        let found = find_directives("See @csv[data/table.csv] for details");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].kind, DirectiveKind::Csv);
        assert_eq!(found[0].body, "data/table.csv");
        assert_eq!(&"See @csv[data/table.csv] for details"[found[0].start..found[0].end], "@csv[data/table.csv]");
    }

    #[test]
    fn test_find_multiple_directives_in_order() {
        let found = find_directives("@json[a.json] then @csv[b.csv]");
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].kind, DirectiveKind::Json);
        assert_eq!(found[1].kind, DirectiveKind::Csv);
    }

    #[test]
    fn test_body_is_everything_up_to_first_closing_bracket() {
        let found = find_directives("@mermaid[graph TD; A-->B]");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].body, "graph TD; A-->B");
    }

    #[test]
    fn test_multiline_directive_body() {
        let text = "@plantuml[\n@startuml\nA -> B\n@enduml\n]";
        let d = find_directive(text, DirectiveKind::Plantuml).unwrap();
        assert_eq!(d.body, "\n@startuml\nA -> B\n@enduml\n");
    }

    #[test]
    fn test_unclosed_directive_is_skipped() {
        assert!(find_directives("@csv[never closed").is_empty());
    }

    #[test]
    fn test_unknown_marker_is_skipped() {
        assert!(find_directives("@table[x] and email@example.com").is_empty());
    }

    #[test]
    fn test_prefix_marker_requires_bracket() {
        // "@csvx[...]" must not match the csv directive
        assert!(find_directives("@csvx[a]").is_empty());
    }
}
