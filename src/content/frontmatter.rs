//! Front-matter extraction

use indexmap::IndexMap;
use serde_yaml::Value;

/// Untyped front-matter bag, in document key order
pub type Metadata = IndexMap<String, Value>;

/// Front-matter block of a document
///
/// Values stay untyped here; `Post::from_document` validates the keys it
/// consumes into typed fields. Unknown keys are kept so callers can inspect them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrontMatter {
    pub metadata: Metadata,
}

impl FrontMatter {
    /// Split a raw document into front-matter and body.
    ///
    /// Never fails. A document without a `---` block, with an unterminated
    /// block, or with a block that is not a YAML mapping yields empty
    /// metadata and the original text untouched.
    pub fn parse(content: &str) -> (Self, &str) {
        let Some((yaml, body)) = split_block(content) else {
            return (FrontMatter::default(), content);
        };

        if yaml.trim().is_empty() {
            return (FrontMatter::default(), body);
        }

        match serde_yaml::from_str::<Value>(yaml) {
            Ok(Value::Mapping(mapping)) => {
                let mut metadata = Metadata::with_capacity(mapping.len());
                for (key, value) in mapping {
                    match scalar_to_string(&key) {
                        Some(key) => {
                            metadata.insert(key, value);
                        }
                        None => tracing::debug!("Skipping non-scalar front-matter key {:?}", key),
                    }
                }
                (FrontMatter { metadata }, body)
            }
            // Comment-only block
            Ok(Value::Null) => (FrontMatter::default(), body),
            Ok(other) => {
                tracing::warn!(
                    "Front-matter is not a mapping ({}), treating as content",
                    value_kind(&other)
                );
                (FrontMatter::default(), content)
            }
            Err(e) => {
                tracing::warn!("Failed to parse YAML front-matter, treating as content: {}", e);
                (FrontMatter::default(), content)
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.metadata.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.metadata.get(key)
    }

    /// Scalar value rendered as a string; sequences, mappings and null give `None`
    pub fn get_str(&self, key: &str) -> Option<String> {
        self.get(key).and_then(scalar_to_string)
    }

    /// Sequence value with scalar items rendered as strings.
    ///
    /// Any non-sequence value yields an empty list; non-scalar items are dropped.
    pub fn get_str_list(&self, key: &str) -> Vec<String> {
        match self.get(key) {
            Some(Value::Sequence(items)) => items.iter().filter_map(scalar_to_string).collect(),
            Some(other) => {
                tracing::debug!(
                    "Front-matter key {} is a {}, expected a list",
                    key,
                    value_kind(other)
                );
                Vec::new()
            }
            None => Vec::new(),
        }
    }
}

/// Locate the `---` delimited block at the very start of the document.
///
/// Returns the block text and the body following the closing delimiter line.
fn split_block(content: &str) -> Option<(&str, &str)> {
    let mut lines = content.split_inclusive('\n');
    let first = lines.next()?;
    if first.trim_end() != "---" {
        return None;
    }

    let yaml_start = first.len();
    let mut offset = yaml_start;
    for line in lines {
        if line.trim_end() == "---" {
            return Some((&content[yaml_start..offset], &content[offset + line.len()..]));
        }
        offset += line.len();
    }

    None
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Tagged(tagged) => scalar_to_string(&tagged.value),
        Value::Null | Value::Sequence(_) | Value::Mapping(_) => None,
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}
