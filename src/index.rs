//! Parser/indexer: schema bytes → flat pointer index.
//!
//! The raw document is walked once. At each node the children are visited in
//! a fixed order (`definitions`, then `properties`, then `items`) and indexed
//! before the node itself, so every node's descendants are already present
//! when it is inserted. The document root (`#`) is the entry point of the walk
//! and is never indexed.
use std::collections::BTreeMap;

use indexmap::{IndexMap, IndexSet};

use crate::error::{Result, SchemaError};
use crate::naming;
use crate::schema::{RawSchema, Schema};

pub const ROOT_POINTER: &str = "#";

/// Pointer → schema node. Immutable once built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Index {
    nodes: IndexMap<String, Schema>,
}

/// Parse raw schema bytes into an [`Index`].
pub fn parse(bytes: &[u8]) -> Result<Index> {
    let root: RawSchema = crate::path_de::from_slice_with_path(bytes)?;
    let mut index = Index::default();
    index.insert_tree(root, ROOT_POINTER.to_string());
    tracing::debug!(nodes = index.len(), "indexed schema document");
    Ok(index)
}

impl Index {
    pub fn get(&self, pointer: &str) -> Option<&Schema> {
        self.nodes.get(pointer)
    }

    /// Like [`Index::get`], but a missing pointer is an error.
    pub fn lookup(&self, pointer: &str) -> Result<&Schema> {
        self.get(pointer).ok_or_else(|| SchemaError::UnknownPointer {
            pointer: pointer.to_string(),
        })
    }

    pub fn contains(&self, pointer: &str) -> bool {
        self.nodes.contains_key(pointer)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes in insertion order (children before parents).
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Schema)> {
        self.nodes.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn pointers(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }

    /// Nodes sorted by `name`, ties broken by pointer. This is the traversal
    /// order of generation and does not depend on the document's key order.
    pub fn sorted_by_name(&self) -> Vec<&Schema> {
        let mut nodes: Vec<&Schema> = self.nodes.values().collect();
        nodes.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.pointer.cmp(&b.pointer)));
        nodes
    }

    /// Properties of `schema` in property-name order.
    pub fn properties<'a>(
        &'a self,
        schema: &'a Schema,
    ) -> impl Iterator<Item = (&'a str, &'a Schema)> + 'a {
        schema
            .properties
            .iter()
            .filter_map(move |(name, ptr)| self.get(ptr).map(|s| (name.as_str(), s)))
    }

    pub fn items(&self, schema: &Schema) -> Option<&Schema> {
        schema.items.as_deref().and_then(|ptr| self.get(ptr))
    }

    /// Depth-first, children first. Returns the pointer the node was (or, for
    /// the root, would have been) stored under.
    fn insert_tree(&mut self, raw: RawSchema, pointer: String) -> String {
        let kind = raw.effective_kind();
        let RawSchema {
            title,
            description,
            definitions,
            properties,
            items,
            reference,
            required,
            ..
        } = raw;

        let mut definition_ptrs = BTreeMap::new();
        for (name, child) in definitions {
            let child_ptr = format!("{pointer}/definitions/{}", naming::escape_segment(&name));
            definition_ptrs.insert(name, self.insert_tree(child, child_ptr));
        }
        let mut property_ptrs = BTreeMap::new();
        for (name, child) in properties {
            let child_ptr = format!("{pointer}/properties/{}", naming::escape_segment(&name));
            property_ptrs.insert(name, self.insert_tree(child, child_ptr));
        }
        let items_ptr = items.map(|child| self.insert_tree(*child, format!("{pointer}/items")));

        if pointer == ROOT_POINTER {
            return pointer;
        }

        let node = Schema {
            name: naming::name_from_pointer(&pointer),
            external_name: naming::external_name_from_pointer(&pointer),
            pointer: pointer.clone(),
            kind,
            title,
            description,
            definitions: definition_ptrs,
            properties: property_ptrs,
            items: items_ptr,
            reference: reference.filter(|target| !target.is_empty()),
            required: required.into_iter().collect::<IndexSet<_>>(),
        };
        tracing::trace!(pointer = %node.pointer, kind = %node.kind, "indexed node");
        self.nodes.insert(pointer.clone(), node);
        pointer
    }
}
