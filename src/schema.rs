// Schema model: the raw serde tree and the flattened, indexed node.

use std::collections::BTreeMap;
use std::fmt;

use indexmap::{IndexMap, IndexSet};
use serde::de::value::MapAccessDeserializer;
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

/// Discriminant of a schema node's shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    Null,
    Boolean,
    Object,
    Array,
    Number,
    Integer,
    String,
    /// Forced whenever a node carries `$ref`; never read from `type`.
    #[serde(skip_deserializing)]
    Reference,
    /// Neither `type` nor `$ref` was declared.
    #[serde(skip_deserializing)]
    Any,
}

impl Kind {
    /// Object and array nodes get their own generated type.
    pub fn is_complex(self) -> bool {
        matches!(self, Kind::Object | Kind::Array)
    }

    /// Kinds that are inlined as a scalar field on their parent.
    pub fn is_scalar(self) -> bool {
        matches!(self, Kind::Boolean | Kind::Number | Kind::Integer | Kind::String)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Kind::Null => "null",
            Kind::Boolean => "boolean",
            Kind::Object => "object",
            Kind::Array => "array",
            Kind::Number => "number",
            Kind::Integer => "integer",
            Kind::String => "string",
            Kind::Reference => "reference",
            Kind::Any => "any",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The document exactly as deserialized. Only the modeled keywords are read;
/// everything else in the document is ignored.
///
/// The derived field-by-field reader is kept as an inherent function
/// (`remote = "Self"`); the trait impl below only lets JSON objects reach it,
/// since the derived impl would also read an array positionally.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(remote = "Self")]
pub struct RawSchema {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<Kind>,
    #[serde(default)]
    pub definitions: IndexMap<String, RawSchema>,
    #[serde(default)]
    pub properties: IndexMap<String, RawSchema>,
    #[serde(default)]
    pub items: Option<Box<RawSchema>>,
    #[serde(default, rename = "$ref")]
    pub reference: Option<String>,
    #[serde(default)]
    pub required: Vec<String>,
}

impl<'de> Deserialize<'de> for RawSchema {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(SchemaObject)
    }
}

struct SchemaObject;

impl<'de> Visitor<'de> for SchemaObject {
    type Value = RawSchema;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a schema object")
    }

    fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<RawSchema, A::Error> {
        RawSchema::deserialize(MapAccessDeserializer::new(map))
    }
}

impl RawSchema {
    /// Reference takes precedence over any declared `type`.
    pub fn effective_kind(&self) -> Kind {
        match (&self.reference, self.kind) {
            (Some(target), _) if !target.is_empty() => Kind::Reference,
            (_, Some(kind)) => kind,
            (_, None) => Kind::Any,
        }
    }
}

/// One indexed schema fragment. Children and references are pointer keys
/// into the owning [`Index`](crate::index::Index), never owned sub-trees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Schema {
    pub pointer: String,
    pub name: String,
    pub external_name: String,
    pub kind: Kind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub definitions: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<String>,
    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(skip_serializing_if = "IndexSet::is_empty")]
    pub required: IndexSet<String>,
}

impl Schema {
    pub fn is_reference(&self) -> bool {
        self.kind == Kind::Reference
    }

    /// Pointer of the property `name`, whether or not it exists.
    pub fn property_pointer(&self, name: &str) -> String {
        format!("{}/properties/{}", self.pointer, crate::naming::escape_segment(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_overrides_declared_type() {
        let raw: RawSchema =
            serde_json::from_str(r##"{"type": "object", "$ref": "#/definitions/x"}"##).unwrap();
        assert_eq!(raw.effective_kind(), Kind::Reference);
    }

    #[test]
    fn empty_reference_keeps_declared_type() {
        let raw: RawSchema = serde_json::from_str(r#"{"type": "string", "$ref": ""}"#).unwrap();
        assert_eq!(raw.effective_kind(), Kind::String);
    }

    #[test]
    fn untyped_node_is_any() {
        let raw: RawSchema = serde_json::from_str(r#"{"title": "free form"}"#).unwrap();
        assert_eq!(raw.effective_kind(), Kind::Any);
        assert_eq!(raw.title.as_deref(), Some("free form"));
    }

    #[test]
    fn reference_is_not_a_declarable_type() {
        assert!(serde_json::from_str::<RawSchema>(r#"{"type": "reference"}"#).is_err());
        assert!(serde_json::from_str::<RawSchema>(r#"{"type": "tuple"}"#).is_err());
    }
}
