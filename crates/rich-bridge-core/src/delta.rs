//! Structured rich-text documents and changes.
//!
//! A `Delta` is an ordered list of insert/retain/delete operations with
//! optional formatting attributes. A document is a delta made only of
//! inserts; a change is any delta. The serde shape is the engine's JSON
//! shape, e.g. `{"ops":[{"insert":"hi","attributes":{"bold":true}}]}`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Formatting attributes attached to an insert or retain.
pub type Attributes = Map<String, Value>;

/// Content of an insert operation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Insert {
    Text(String),
    /// A non-text leaf such as an image or formula, e.g. `{"image": "..."}`.
    Embed(Map<String, Value>),
}

impl Insert {
    /// Length in document units: characters for text, one for an embed.
    pub fn len(&self) -> usize {
        match self {
            Insert::Text(text) => text.chars().count(),
            Insert::Embed(_) => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Insert::Text(text) => Some(text),
            Insert::Embed(_) => None,
        }
    }
}

/// A single delta operation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Op {
    Insert {
        insert: Insert,
        #[serde(default, skip_serializing_if = "Map::is_empty")]
        attributes: Attributes,
    },
    Retain {
        retain: usize,
        #[serde(default, skip_serializing_if = "Map::is_empty")]
        attributes: Attributes,
    },
    Delete {
        delete: usize,
    },
}

impl Op {
    pub fn len(&self) -> usize {
        match self {
            Op::Insert { insert, .. } => insert.len(),
            Op::Retain { retain, .. } => *retain,
            Op::Delete { delete } => *delete,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn attributes(&self) -> Option<&Attributes> {
        match self {
            Op::Insert { attributes, .. } | Op::Retain { attributes, .. } => Some(attributes),
            Op::Delete { .. } => None,
        }
    }
}

/// An ordered list of operations.
///
/// Two deltas are equal when their op lists are equal.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Delta {
    pub ops: Vec<Op>,
}

impl Delta {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a delta from raw ops, merging adjacent compatible ops.
    pub fn from_ops(ops: impl IntoIterator<Item = Op>) -> Self {
        let mut delta = Self::new();
        for op in ops {
            delta.push(op);
        }
        delta
    }

    pub fn ops(&self) -> &[Op] {
        &self.ops
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Insert plain text.
    pub fn insert(self, text: impl Into<String>) -> Self {
        self.insert_with(text, Attributes::new())
    }

    /// Insert text carrying formatting attributes.
    pub fn insert_with(mut self, text: impl Into<String>, attributes: Attributes) -> Self {
        self.push(Op::Insert {
            insert: Insert::Text(text.into()),
            attributes,
        });
        self
    }

    /// Insert an embed such as `{"image": "https://..."}`.
    pub fn insert_embed(mut self, embed: Map<String, Value>, attributes: Attributes) -> Self {
        self.push(Op::Insert {
            insert: Insert::Embed(embed),
            attributes,
        });
        self
    }

    pub fn retain(mut self, length: usize) -> Self {
        self.push(Op::Retain {
            retain: length,
            attributes: Attributes::new(),
        });
        self
    }

    pub fn retain_with(mut self, length: usize, attributes: Attributes) -> Self {
        self.push(Op::Retain {
            retain: length,
            attributes,
        });
        self
    }

    pub fn delete(mut self, length: usize) -> Self {
        self.push(Op::Delete { delete: length });
        self
    }

    /// Append an op, merging it into the last op when both are the same kind
    /// with the same attributes. Zero-length ops are dropped.
    pub fn push(&mut self, op: Op) {
        if op.is_empty() {
            return;
        }
        if let Some(last) = self.ops.last_mut() {
            if merge_into(last, &op) {
                return;
            }
        }
        self.ops.push(op);
    }

    /// Total length of all ops.
    ///
    /// For a document this is the engine's `getLength()`.
    pub fn length(&self) -> usize {
        self.ops.iter().map(Op::len).sum()
    }

    /// Plain text of the inserts in this delta. Embeds are skipped.
    pub fn document_text(&self) -> String {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Op::Insert { insert, .. } => insert.as_text(),
                _ => None,
            })
            .collect()
    }

    /// True when every op is an insert.
    pub fn is_document(&self) -> bool {
        self.ops.iter().all(|op| matches!(op, Op::Insert { .. }))
    }
}

fn merge_into(last: &mut Op, op: &Op) -> bool {
    match (last, op) {
        (Op::Delete { delete }, Op::Delete { delete: more }) => {
            *delete += *more;
            true
        }
        (
            Op::Retain { retain, attributes },
            Op::Retain {
                retain: more,
                attributes: next,
            },
        ) if *attributes == *next => {
            *retain += *more;
            true
        }
        (
            Op::Insert {
                insert: Insert::Text(text),
                attributes,
            },
            Op::Insert {
                insert: Insert::Text(more),
                attributes: next,
            },
        ) if *attributes == *next => {
            text.push_str(more);
            true
        }
        _ => false,
    }
}

/// Build an attribute map from `(name, value)` pairs.
pub fn attributes<I, K>(pairs: I) -> Attributes
where
    I: IntoIterator<Item = (K, Value)>,
    K: Into<String>,
{
    pairs.into_iter().map(|(k, v)| (k.into(), v)).collect()
}
