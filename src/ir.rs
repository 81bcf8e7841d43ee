// Strongly-typed IR for codegen. No serde_json::Value here.

use serde::Serialize;

use crate::schema::Kind;

/// Everything a backend needs, in generation order (sorted by name, then pointer).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Model {
    pub types: Vec<(String, TypeShape)>,
    pub validations: Vec<(String, ValidationRules)>,
}

impl Model {
    pub fn type_named(&self, name: &str) -> Option<&TypeShape> {
        self.types.iter().map(|(_, t)| t).find(|t| t.name() == name)
    }

    pub fn validation_for(&self, pointer: &str) -> Option<&ValidationRules> {
        self.validations
            .iter()
            .find(|(p, _)| p == pointer)
            .map(|(_, v)| v)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "shape", rename_all = "lowercase")]
pub enum TypeShape {
    Object {
        name: String,
        external_name: String,
        doc: Option<String>,
        fields: Vec<Field>, // property-name order
    },
    Array {
        name: String,
        external_name: String,
        doc: Option<String>,
        item: ItemType,
    },
}

impl TypeShape {
    pub fn name(&self) -> &str {
        match self {
            TypeShape::Object { name, .. } | TypeShape::Array { name, .. } => name,
        }
    }

    pub fn doc(&self) -> Option<&str> {
        match self {
            TypeShape::Object { doc, .. } | TypeShape::Array { doc, .. } => doc.as_deref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field {
    pub name: String,          // identifier, from the property's own pointer
    pub external_name: String, // wire name, the literal property key
    pub ty: FieldType,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum FieldType {
    /// Optional scalar (`boolean | number | integer | string`).
    Scalar { scalar: Kind },
    /// Optional reference to a generated type.
    Named { name: String, external_name: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ItemType {
    Scalar { scalar: Kind },
    Named { name: String },
    /// No `items`, or items that cannot carry a value.
    Any,
}

/// Checks for one complex node, in evaluation order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationRules {
    pub name: String,
    pub external_name: String,
    pub checks: Vec<Check>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "check", rename_all = "snake_case")]
pub enum Check {
    /// Fails with `message` when the field for `property` is absent.
    Required { property: String, message: String },
    /// Runs the nested validation of the field for wire name `external_name`
    /// when present; first failure wins.
    Nested { external_name: String },
    /// Validates every element of a sequence; first failure wins.
    Elements,
}

impl ValidationRules {
    pub fn required(&self) -> impl Iterator<Item = &Check> {
        self.checks.iter().filter(|c| matches!(c, Check::Required { .. }))
    }

    /// First message a value with every field absent would fail with.
    pub fn first_failure(&self) -> Option<&str> {
        self.checks.iter().find_map(|c| match c {
            Check::Required { message, .. } => Some(message.as_str()),
            _ => None,
        })
    }
}
