//! Intra-document `$ref` resolution
//!
//! The single dereferencing algorithm used by example synthesis, parameter
//! handling and request drafting. Only local pointers (`#/...`) resolve;
//! anything else reads as "not found".

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::types::{RefOr, Schema};

/// Resolves JSON pointers against one document root
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    root: &'a Value,
}

impl<'a> Resolver<'a> {
    /// Create a resolver over a raw document
    pub fn new(root: &'a Value) -> Self {
        Self { root }
    }

    /// Walk `#/a/b/c` segment by segment from the root.
    ///
    /// Returns `None` when the pointer is not local, a segment is missing, or
    /// an intermediate node is not an object or array.
    pub fn resolve(&self, reference: &str) -> Option<&'a Value> {
        let pointer = reference.strip_prefix("#/")?;

        pointer
            .split('/')
            .map(decode_segment)
            .try_fold(self.root, |node, segment| match node {
                Value::Object(map) => map.get(&segment),
                Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
                _ => None,
            })
    }

    /// Resolve and read the target as `T`; a target of the wrong shape is
    /// treated the same as a missing one
    pub fn resolve_as<T: DeserializeOwned>(&self, reference: &str) -> Option<T> {
        let target = self.resolve(reference)?;
        T::deserialize(target).ok()
    }

    /// Resolve a schema reference; the target may itself be a reference
    pub fn resolve_schema(&self, reference: &str) -> Option<RefOr<Schema>> {
        self.resolve_as(reference)
    }

    /// Dereference one hop if `value` is a reference, otherwise borrow it.
    ///
    /// Returns `None` for unresolvable references and for targets that are
    /// themselves references.
    pub fn deref<T: DeserializeOwned + Clone>(&self, value: &RefOr<T>) -> Option<T> {
        match value {
            RefOr::Item(item) => Some(item.clone()),
            RefOr::Reference { reference } => match self.resolve_as::<RefOr<T>>(reference)? {
                RefOr::Item(item) => Some(item),
                RefOr::Reference { .. } => None,
            },
        }
    }
}

/// Decode a JSON pointer segment (`~1` is `/`, `~0` is `~`)
fn decode_segment(segment: &str) -> String {
    segment.replace("~1", "/").replace("~0", "~")
}
