use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::Result;

/// Trait for document containers that accept insert-or-replace writes
#[async_trait::async_trait]
pub trait DocumentContainer: Send + Sync {
    /// Insert the item, or replace the existing item with the same id
    async fn upsert_item(&self, item: &Value) -> Result<()>;

    /// Container name for display purposes
    fn name(&self) -> &str;
}

/// Subset of the container resource returned by `GET dbs/{db}/colls/{coll}`
#[derive(Debug, Clone, Deserialize)]
pub struct ContainerProperties {
    pub id: String,
    #[serde(rename = "partitionKey", default)]
    pub partition_key: Option<PartitionKeyDefinition>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PartitionKeyDefinition {
    #[serde(default)]
    pub paths: Vec<String>,
}

impl PartitionKeyDefinition {
    /// Build the partition key header value for an item.
    ///
    /// Returns `None` for containers without a partition key. Paths the item
    /// does not carry are sent as `{}`, which the service treats as the
    /// undefined partition key.
    pub fn header_value(&self, item: &Value) -> Option<String> {
        if self.paths.is_empty() {
            return None;
        }

        let values: Vec<Value> = self
            .paths
            .iter()
            .map(|path| lookup_path(item, path).cloned().unwrap_or_else(|| json!({})))
            .collect();

        Some(escape_non_ascii(&Value::Array(values).to_string()))
    }
}

/// Resolve a partition key path such as `/tenant/id` or `/"odd name"` against an item
fn lookup_path<'a>(item: &'a Value, path: &str) -> Option<&'a Value> {
    path_segments(path)
        .iter()
        .try_fold(item, |current, segment| current.get(segment.as_str()))
}

/// Split a path into property names. Quoted segments may contain `/` and `\"`.
fn path_segments(path: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut chars = path.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '/' => continue,
            '"' => {
                let mut segment = String::new();
                while let Some(c) = chars.next() {
                    match c {
                        '\\' => {
                            if let Some(escaped) = chars.next() {
                                segment.push(escaped);
                            }
                        }
                        '"' => break,
                        _ => segment.push(c),
                    }
                }
                segments.push(segment);
            }
            _ => {
                let mut segment = String::from(ch);
                while let Some(&c) = chars.peek() {
                    if c == '/' {
                        break;
                    }
                    segment.push(c);
                    chars.next();
                }
                segments.push(segment);
            }
        }
    }

    segments
}

/// Header values must be visible ASCII, so encode everything else as JSON `\u` escapes
fn escape_non_ascii(json: &str) -> String {
    let mut escaped = String::with_capacity(json.len());
    for ch in json.chars() {
        if ch.is_ascii() {
            escaped.push(ch);
        } else {
            let mut units = [0u16; 2];
            for unit in ch.encode_utf16(&mut units) {
                escaped.push_str(&format!("\\u{:04x}", unit));
            }
        }
    }
    escaped
}
