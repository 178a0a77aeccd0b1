//! Link classification and base-path resolution
//!
//! A URL is external when it carries a scheme prefix (`http://`, `mailto:`,
//! any `protocol:`-like prefix) or is protocol-relative (`//host/...`);
//! everything else is internal. Internal targets resolve against a supplied
//! base path with purely lexical `./` and `../` collapsing; nothing checks
//! that the resolved target exists.

use std::sync::OnceLock;

use regex::Regex;

use crate::document::metadata::{DocumentMetadata, LinkKind};

fn scheme_pattern() -> &'static Regex {
    static SCHEME: OnceLock<Regex> = OnceLock::new();
    SCHEME.get_or_init(|| {
        Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*:").expect("scheme pattern is valid")
    })
}

/// Classify a URL as internal or external
pub fn classify(url: &str) -> LinkKind {
    if url.starts_with("//") || scheme_pattern().is_match(url) {
        LinkKind::External
    } else {
        LinkKind::Internal
    }
}

/// Resolve an internal URL against a base path
///
/// Absolute (`/...`) and fragment-only (`#...`) targets pass through
/// unchanged, as do empty targets.
pub fn resolve(url: &str, base_path: &str) -> String {
    if url.is_empty() || url.starts_with('/') || url.starts_with('#') {
        return url.to_string();
    }

    normalize(&format!("{}/{}", base_path.trim_end_matches('/'), url))
}

/// Collapse `.` and `..` segments without touching the filesystem
fn normalize(path: &str) -> String {
    let absolute = path.starts_with('/');
    let mut segments: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if matches!(segments.last(), Some(&"..")) || segments.is_empty() {
                    segments.push("..");
                } else {
                    segments.pop();
                }
            }
            other => segments.push(other),
        }
    }

    let joined = segments.join("/");
    if absolute {
        format!("/{joined}")
    } else {
        joined
    }
}

/// Classify every link and resolve internal links and images in place
pub fn resolve_metadata(metadata: &mut DocumentMetadata, base_path: Option<&str>) {
    for link in &mut metadata.links {
        let kind = classify(&link.url);
        if kind == LinkKind::Internal {
            if let Some(base) = base_path {
                link.url = resolve(&link.url, base);
            }
        }
        link.kind = Some(kind);
    }

    for image in &mut metadata.images {
        if classify(&image.src) == LinkKind::Internal {
            if let Some(base) = base_path {
                image.src = resolve(&image.src, base);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::metadata::Link;

    #[test]
    fn test_classify_schemes_as_external() {
        assert_eq!(classify("http://example.com"), LinkKind::External);
        assert_eq!(classify("https://example.com/a/b"), LinkKind::External);
        assert_eq!(classify("mailto:team@example.com"), LinkKind::External);
        assert_eq!(classify("ftp+ssh://host"), LinkKind::External);
        assert_eq!(classify("//cdn.example.com/lib.js"), LinkKind::External);
    }

    #[test]
    fn test_classify_paths_as_internal() {
        assert_eq!(classify("./local.md"), LinkKind::Internal);
        assert_eq!(classify("../up/one.md"), LinkKind::Internal);
        assert_eq!(classify("docs/guide.md"), LinkKind::Internal);
        assert_eq!(classify("/absolute/path.md"), LinkKind::Internal);
        assert_eq!(classify("#section"), LinkKind::Internal);
    }

    #[test]
    fn test_resolve_collapses_dot_segments() {
        assert_eq!(resolve("./a.md", "/docs"), "/docs/a.md");
        assert_eq!(resolve("../a.md", "/docs/sub"), "/docs/a.md");
        assert_eq!(resolve("x/./y/../z.md", "/docs"), "/docs/x/z.md");
        assert_eq!(resolve("a.md", "docs"), "docs/a.md");
    }

    #[test]
    fn test_resolve_leaves_absolute_and_fragment_targets() {
        assert_eq!(resolve("/already/rooted.md", "/docs"), "/already/rooted.md");
        assert_eq!(resolve("#anchor", "/docs"), "#anchor");
    }

    #[test]
    fn test_resolve_metadata_classifies_and_resolves() {
        let mut metadata = DocumentMetadata {
            links: vec![
                Link {
                    text: "a".to_string(),
                    url: "http://x.com".to_string(),
                    kind: None,
                    line: 1,
                },
                Link {
                    text: "b".to_string(),
                    url: "./local.md".to_string(),
                    kind: None,
                    line: 1,
                },
            ],
            ..Default::default()
        };

        resolve_metadata(&mut metadata, Some("/root"));

        assert_eq!(metadata.links[0].kind, Some(LinkKind::External));
        assert_eq!(metadata.links[0].url, "http://x.com");
        assert_eq!(metadata.links[1].kind, Some(LinkKind::Internal));
        assert_eq!(metadata.links[1].url, "/root/local.md");
    }
}
