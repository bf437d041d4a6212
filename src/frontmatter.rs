use crate::models::ArticleRecord;
use serde_yaml::Value;

/// ParsedDocument
///
/// The two halves of a raw article source: the coerced metadata header and the
/// remaining free-form body text. This is the full output of the metadata parser;
/// resolving the slug (filename-derived) is the repository's job.
#[derive(Debug, Clone, Default)]
pub struct ParsedDocument {
    pub metadata: ArticleMetadata,
    pub body: String,
}

/// ArticleMetadata
///
/// The structured frontmatter fields, before a slug has been attached.
/// Every field is defaulted rather than optional: the leniency contract is that
/// malformed or absent metadata degrades silently to defaults so that one bad
/// document can never break a whole listing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArticleMetadata {
    pub title: String,
    pub description: String,
    pub author: String,
    pub date: String,
    pub tags: Vec<String>,
    pub difficulty: String,
    pub reading_time: String,
    pub contributors: Vec<String>,
}

impl ArticleMetadata {
    /// into_record
    ///
    /// Attaches the filename-derived slug, producing the record shape exposed
    /// by the listing and fetch endpoints.
    pub fn into_record(self, slug: impl Into<String>) -> ArticleRecord {
        ArticleRecord {
            slug: slug.into(),
            title: self.title,
            description: self.description,
            author: self.author,
            date: self.date,
            tags: self.tags,
            difficulty: self.difficulty,
            reading_time: self.reading_time,
            contributors: self.contributors,
        }
    }
}

/// parse_document
///
/// Splits a raw article source into its frontmatter block and body, and coerces
/// the frontmatter into the `ArticleMetadata` shape.
///
/// The frontmatter block is an optional leading `---`-delimited YAML mapping.
/// Documents without one (or with an unterminated delimiter) are treated as
/// all-body with default metadata. Malformed-but-present YAML likewise degrades
/// to defaults; this function never fails. Unknown keys are ignored.
pub fn parse_document(raw: &str) -> ParsedDocument {
    let (header, body) = split_frontmatter(raw);

    let metadata = match header {
        Some(header) => match serde_yaml::from_str::<Value>(&header) {
            Ok(Value::Mapping(map)) => normalize_metadata(&Value::Mapping(map)),
            // Scalar/sequence headers and YAML syntax errors both fall back to
            // defaults; the body half of the split is still honored.
            _ => ArticleMetadata::default(),
        },
        None => ArticleMetadata::default(),
    };

    ParsedDocument { metadata, body }
}

/// split_frontmatter
///
/// Separates the leading delimited metadata block from the body. The opening
/// delimiter must be the very first line; the closing one is the next line
/// consisting solely of `---`. If no closing delimiter exists, the whole
/// document is body.
fn split_frontmatter(raw: &str) -> (Option<String>, String) {
    let mut lines = raw.lines();

    match lines.next() {
        Some(first) if first.trim_end() == "---" => {}
        _ => return (None, raw.to_string()),
    }

    let mut header = String::new();
    let mut closed = false;
    for line in lines.by_ref() {
        if line.trim_end() == "---" {
            closed = true;
            break;
        }
        header.push_str(line);
        header.push('\n');
    }

    if !closed {
        // Unterminated block: treat the delimiter as ordinary body text.
        return (None, raw.to_string());
    }

    let body = lines.collect::<Vec<_>>().join("\n");
    (Some(header), body)
}

/// normalize_metadata
///
/// The explicit normalization function from the untyped YAML mapping to the
/// strongly typed metadata record. Field coercion rules:
///
/// - scalar fields (`title`, `description`, `author`, `date`, `difficulty`,
///   `readingTime`): strings pass through, numbers/bools are stringified
///   (authors routinely write `readingTime: 5` unquoted), anything else is `""`.
/// - `tags`: accepts either a comma-separated string (split and trim) or a
///   native list; any other shape yields an empty list.
/// - `contributors`: accepts a native list only, defaulting to empty.
fn normalize_metadata(map: &Value) -> ArticleMetadata {
    ArticleMetadata {
        title: string_field(map, "title"),
        description: string_field(map, "description"),
        author: string_field(map, "author"),
        date: string_field(map, "date"),
        tags: tags_field(map.get("tags")),
        difficulty: string_field(map, "difficulty"),
        reading_time: string_field(map, "readingTime"),
        contributors: list_field(map.get("contributors")),
    }
}

/// Coerces a scalar frontmatter value to a string, defaulting to `""`.
fn string_field(map: &Value, key: &str) -> String {
    match map.get(key) {
        Some(value) => scalar_to_string(value).unwrap_or_default(),
        None => String::new(),
    }
}

/// Scalar-to-string coercion shared by the field helpers. Non-scalar shapes
/// (mappings, sequences, null) yield `None`.
fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Coerces the `tags` field: comma-separated string or native list, both
/// normalized to a list of trimmed, non-empty strings with order preserved.
fn tags_field(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::String(s)) => s
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect(),
        Some(Value::Sequence(items)) => items
            .iter()
            .filter_map(scalar_to_string)
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect(),
        _ => Vec::new(),
    }
}

/// Coerces a list-only field (e.g. `contributors`): native lists pass through
/// with scalar items stringified; anything else is empty.
fn list_field(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Sequence(items)) => items
            .iter()
            .filter_map(scalar_to_string)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        _ => Vec::new(),
    }
}
