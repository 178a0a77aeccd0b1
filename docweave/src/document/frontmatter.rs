//! Frontmatter extraction and typed decoding
//!
//! Frontmatter is a metadata block at the start of a document, delimited by
//! lines consisting solely of three hyphens:
//!
//! ```markdown
//! ---
//! title: "My Document"
//! tags: ["rust", "parsing"]
//! ---
//!
//! Body starts here.
//! ```
//!
//! The block decodes as a YAML mapping. A recognized subset of keys maps to
//! typed fields; unrecognized keys are preserved in [`Frontmatter::extra`]
//! rather than dropped. Extraction never fails: a malformed block degrades
//! to whatever fields decoded successfully, with warnings.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::Serialize;
use serde_yaml::{Mapping, Value};

/// Document difficulty rating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

impl FromStr for Difficulty {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "beginner" => Ok(Difficulty::Beginner),
            "intermediate" => Ok(Difficulty::Intermediate),
            "advanced" => Ok(Difficulty::Advanced),
            "expert" => Ok(Difficulty::Expert),
            _ => Err(()),
        }
    }
}

/// Document lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Draft,
    Review,
    Published,
    Archived,
}

impl FromStr for Status {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "draft" => Ok(Status::Draft),
            "review" => Ok(Status::Review),
            "published" => Ok(Status::Published),
            "archived" => Ok(Status::Archived),
            _ => Err(()),
        }
    }
}

/// Document criticality rating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Criticality {
    Low,
    Medium,
    High,
    Critical,
}

impl FromStr for Criticality {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Ok(Criticality::Low),
            "medium" => Ok(Criticality::Medium),
            "high" => Ok(Criticality::High),
            "critical" => Ok(Criticality::Critical),
            _ => Err(()),
        }
    }
}

/// Typed frontmatter with an open extension map
///
/// Sequence fields preserve duplicates as written; the parser does not
/// deduplicate.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Frontmatter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,

    /// Creation timestamp, carried as an opaque string
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,

    /// Last-update timestamp, carried as an opaque string
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub criticality: Option<Criticality>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub used_by: Vec<String>,

    /// Unrecognized keys, preserved verbatim
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Frontmatter {
    /// Check whether any field is set
    pub fn is_empty(&self) -> bool {
        *self == Frontmatter::default()
    }

    /// Re-serialize the recognized fields plus extras as a YAML block body
    /// (without the `---` delimiters)
    pub fn to_yaml(&self) -> String {
        serde_yaml::to_string(self).unwrap_or_default()
    }
}

/// Result of splitting a raw document into frontmatter and body
#[derive(Debug)]
pub struct ExtractedFrontmatter {
    /// Decoded frontmatter; default when the block is absent
    pub frontmatter: Frontmatter,

    /// Raw text between the delimiters, when a complete block was found
    pub block: Option<String>,

    /// Body text with the frontmatter block stripped
    pub body: String,

    /// Non-fatal problems encountered while decoding the block
    pub warnings: Vec<String>,
}

/// Split a raw document into frontmatter and body
///
/// Never fails. Without an opening delimiter the whole input is the body.
/// With an opening delimiter but no closing one, the whole input is the body
/// and a warning is emitted. A block that does not fully decode degrades to
/// the fields that did, with warnings.
///
/// # Parameters
/// * `raw` - Raw document text, frontmatter block included
///
/// # Returns
/// * `ExtractedFrontmatter` - Decoded frontmatter, raw block, body, warnings
pub fn extract(raw: &str) -> ExtractedFrontmatter {
    let mut warnings = Vec::new();
    let lines: Vec<&str> = raw.split('\n').collect();

    let opens = lines
        .first()
        .is_some_and(|l| l.trim_end_matches('\r') == "---");
    if !opens {
        return ExtractedFrontmatter {
            frontmatter: Frontmatter::default(),
            block: None,
            body: raw.to_string(),
            warnings,
        };
    }

    let Some(close) = lines
        .iter()
        .skip(1)
        .position(|l| l.trim_end_matches('\r') == "---")
        .map(|i| i + 1)
    else {
        warnings.push("frontmatter block has no closing delimiter".to_string());
        return ExtractedFrontmatter {
            frontmatter: Frontmatter::default(),
            block: None,
            body: raw.to_string(),
            warnings,
        };
    };

    let block = lines[1..close].join("\n");
    let body = lines[close + 1..].join("\n");

    let mapping = decode_mapping(&block, &mut warnings);
    let frontmatter = from_mapping(mapping, &mut warnings);

    ExtractedFrontmatter {
        frontmatter,
        block: Some(block),
        body,
        warnings,
    }
}

/// Decode the block as a YAML mapping, falling back to per-line decoding
/// when the block as a whole is invalid
fn decode_mapping(block: &str, warnings: &mut Vec<String>) -> Mapping {
    match serde_yaml::from_str::<Value>(block) {
        Ok(Value::Mapping(mapping)) => mapping,
        Ok(Value::Null) => Mapping::new(),
        Ok(_) => {
            warnings.push("frontmatter block is not a key/value mapping".to_string());
            Mapping::new()
        }
        Err(e) => {
            log::warn!("frontmatter block is not valid YAML: {e}");
            warnings.push(format!("frontmatter block is not valid YAML: {e}"));
            decode_lines(block, warnings)
        }
    }
}

/// Best-effort per-line decoding: keep every `key: value` line that parses
fn decode_lines(block: &str, warnings: &mut Vec<String>) -> Mapping {
    let mut mapping = Mapping::new();

    for (i, line) in block.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let Some((key, value)) = trimmed.split_once(':') else {
            warnings.push(format!("skipped malformed frontmatter line {}", i + 2));
            continue;
        };

        let value = value.trim();
        let decoded = if value.is_empty() {
            Value::Null
        } else {
            match serde_yaml::from_str::<Value>(value) {
                Ok(v) => v,
                Err(_) => {
                    warnings.push(format!("skipped malformed frontmatter line {}", i + 2));
                    continue;
                }
            }
        };

        mapping.insert(Value::String(key.trim().to_string()), decoded);
    }

    mapping
}

/// Build the typed frontmatter from a decoded mapping
///
/// Each recognized key is taken individually so that one ill-typed field
/// degrades to a warning (value retained in `extra`) without discarding the
/// rest.
fn from_mapping(mut mapping: Mapping, warnings: &mut Vec<String>) -> Frontmatter {
    let mut misfits: Vec<(String, Value)> = Vec::new();

    let mut fm = Frontmatter {
        title: take_string(&mut mapping, "title", &mut misfits, warnings),
        description: take_string(&mut mapping, "description", &mut misfits, warnings),
        author: take_string(&mut mapping, "author", &mut misfits, warnings),
        category: take_string(&mut mapping, "category", &mut misfits, warnings),
        tags: take_string_list(&mut mapping, "tags", &mut misfits, warnings),
        difficulty: take_enum(&mut mapping, "difficulty", &mut misfits, warnings),
        created: take_string(&mut mapping, "created", &mut misfits, warnings),
        updated: take_string(&mut mapping, "updated", &mut misfits, warnings),
        version: take_string(&mut mapping, "version", &mut misfits, warnings),
        status: take_enum(&mut mapping, "status", &mut misfits, warnings),
        criticality: take_enum(&mut mapping, "criticality", &mut misfits, warnings),
        dependencies: take_string_list(&mut mapping, "dependencies", &mut misfits, warnings),
        used_by: take_string_list(&mut mapping, "usedBy", &mut misfits, warnings),
        extra: BTreeMap::new(),
    };

    for (key, value) in mapping {
        match key {
            Value::String(key) => {
                fm.extra.insert(key, value);
            }
            other => {
                warnings.push(format!("skipped frontmatter key with non-string name: {other:?}"));
            }
        }
    }
    fm.extra.extend(misfits);

    fm
}

fn take(mapping: &mut Mapping, key: &str) -> Option<Value> {
    mapping.remove(&Value::String(key.to_string()))
}

fn take_string(
    mapping: &mut Mapping,
    key: &str,
    misfits: &mut Vec<(String, Value)>,
    warnings: &mut Vec<String>,
) -> Option<String> {
    match take(mapping, key)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => None,
        other => {
            warnings.push(format!("frontmatter field `{key}` is not a scalar"));
            misfits.push((key.to_string(), other));
            None
        }
    }
}

fn take_string_list(
    mapping: &mut Mapping,
    key: &str,
    misfits: &mut Vec<(String, Value)>,
    warnings: &mut Vec<String>,
) -> Vec<String> {
    match take(mapping, key) {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Sequence(seq)) => seq
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                Value::Number(n) => Some(n.to_string()),
                Value::Bool(b) => Some(b.to_string()),
                _ => {
                    warnings.push(format!("skipped non-scalar entry in frontmatter `{key}`"));
                    None
                }
            })
            .collect(),
        Some(other) => {
            warnings.push(format!("frontmatter field `{key}` is not a list"));
            misfits.push((key.to_string(), other));
            Vec::new()
        }
    }
}

fn take_enum<T: FromStr>(
    mapping: &mut Mapping,
    key: &str,
    misfits: &mut Vec<(String, Value)>,
    warnings: &mut Vec<String>,
) -> Option<T> {
    let raw = take_string(mapping, key, misfits, warnings)?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warnings.push(format!("unrecognized frontmatter `{key}` value: {raw}"));
            misfits.push((key.to_string(), Value::String(raw)));
            None
        }
    }
}
