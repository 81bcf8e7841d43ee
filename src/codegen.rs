//! Backends: render the lowered [`Model`] as target-language source.
//!
//! A backend only ever sees the model. Each one follows the same three steps:
//! render the types and validations (`src`), scan the result for marker
//! identifiers to decide which imports it needs (`imports`), then wrap both
//! into a complete compilation unit (`package_src`).
pub mod go;
pub mod rust;

use std::collections::{HashMap, HashSet};

use crate::ir::{Field, FieldType, Model, TypeShape};

pub use go::GoBackend;
pub use rust::RustBackend;

pub trait Backend {
    /// Types, validation and helpers, without package clause or imports.
    fn src(&self, model: &Model) -> String;

    /// The minimal set of imports `src` needs.
    fn imports(&self, src: &str) -> Vec<&'static str>;

    /// A complete, self-contained unit.
    fn package_src(&self, model: &Model) -> String;
}

/// `(type name, wire name)` of every object field that closes a by-value cycle.
///
/// Arrays are not followed: a sequence already puts its elements behind a
/// pointer, so only object → object edges can make a type infinitely sized.
pub(crate) fn recursive_fields(model: &Model) -> HashSet<(String, String)> {
    let objects: HashMap<&str, &[Field]> = model
        .types
        .iter()
        .filter_map(|(_, shape)| match shape {
            TypeShape::Object { name, fields, .. } => Some((name.as_str(), fields.as_slice())),
            TypeShape::Array { .. } => None,
        })
        .collect();

    let mut out = HashSet::new();
    for (owner, fields) in &objects {
        for field in fields.iter() {
            if let FieldType::Named { name: target, .. } = &field.ty {
                if objects.contains_key(target.as_str()) && reaches(&objects, target, owner) {
                    out.insert((owner.to_string(), field.external_name.clone()));
                }
            }
        }
    }
    out
}

fn object_edges<'a>(objects: &HashMap<&'a str, &'a [Field]>, name: &str) -> Vec<&'a str> {
    let Some(fields) = objects.get(name).copied() else {
        return Vec::new();
    };
    fields
        .iter()
        .filter_map(|f| match &f.ty {
            FieldType::Named { name, .. } if objects.contains_key(name.as_str()) => {
                Some(name.as_str())
            }
            _ => None,
        })
        .collect()
}

fn reaches<'a>(objects: &HashMap<&'a str, &'a [Field]>, from: &'a str, to: &str) -> bool {
    let mut stack = vec![from];
    let mut seen = HashSet::new();
    while let Some(current) = stack.pop() {
        if current == to {
            return true;
        }
        if seen.insert(current) {
            stack.extend(object_edges(objects, current));
        }
    }
    false
}
