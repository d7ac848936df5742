//! The unit of content sent to the LLM classifier: a text value, or a
//! base64-encoded image (spec.md §6, grounded on
//! `tdb/operators/semantic_filter.py`'s `_encode_item`).

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use crate::catalog::DataType;
use crate::engine_db::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Text(String),
    Image { mime: String, base64: String },
    /// Both sides of a join predicate, sent to the LLM in one call
    /// (grounded on `tdb/operators/semantic_join.py`'s `_find_matches`,
    /// which prompts with both encoded items at once).
    Pair(Box<Item>, Box<Item>),
}

impl Item {
    /// Encodes a scratch-table cell for the LLM, branching on the
    /// column's [`DataType`] and, for text columns, a `.jpeg` path
    /// heuristic matching the original source (SPEC_FULL.md §4.2): a
    /// `.jpeg`-suffixed text value is read off disk and sent as an
    /// inline image rather than as its path string.
    pub fn encode(value: &Value, data_type: DataType) -> Item {
        match (data_type, value) {
            (DataType::Image, Value::Blob(bytes)) => Item::Image {
                mime: "image/jpeg".to_string(),
                base64: BASE64.encode(bytes),
            },
            (_, Value::Text(s)) if s.to_ascii_lowercase().ends_with(".jpeg") => {
                match std::fs::read(s) {
                    Ok(bytes) => Item::Image {
                        mime: "image/jpeg".to_string(),
                        base64: BASE64.encode(bytes),
                    },
                    Err(e) => {
                        log::warn!("failed to read image at {s}: {e}, sending path as text");
                        Item::Text(s.clone())
                    }
                }
            }
            (_, other) => Item::Text(other.to_string()),
        }
    }

    pub fn pair(left: Item, right: Item) -> Item {
        Item::Pair(Box::new(left), Box::new(right))
    }

    /// Flattens to the leaf text/image items a provider needs to render
    /// as content blocks, in order.
    pub fn parts(&self) -> Vec<&Item> {
        match self {
            Item::Pair(l, r) => {
                let mut parts = l.parts();
                parts.extend(r.parts());
                parts
            }
            other => vec![other],
        }
    }
}
