//! Errors surfaced by parsing, resolution, synthesis and generation.
//!
//! Every variant names the offending pointer so a single line is enough to
//! locate the problem in the source document. Nothing here is recoverable
//! inside the pipeline; errors go straight back to the caller.
use thiserror::Error;

pub type Result<T, E = SchemaError> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// The input is not a well-formed schema document.
    #[error("malformed schema at JSON path {path}: {message}")]
    MalformedInput { path: String, message: String },

    /// A `$ref` points at a location that is not in the index.
    #[error("unresolved reference in {pointer}: {target} does not exist in index")]
    UnresolvedReference { pointer: String, target: String },

    /// `required` names a property that `properties` never defines.
    #[error("inconsistent schema {pointer}: required property {property:?} is not defined")]
    InconsistentSchema { pointer: String, property: String },

    /// Following references looped back onto a schema already being expanded.
    #[error("reference cycle detected at {pointer}")]
    CycleDetected { pointer: String },

    /// Two generated types would share the same identifier.
    #[error("type name {name} generated by both {first} and {second}")]
    NameCollision {
        name: String,
        first: String,
        second: String,
    },

    /// A caller asked for a pointer the index does not contain.
    #[error("{pointer} does not exist in index")]
    UnknownPointer { pointer: String },
}

impl SchemaError {
    /// The pointer this error is about, if it is tied to one.
    pub fn pointer(&self) -> Option<&str> {
        match self {
            SchemaError::MalformedInput { .. } => None,
            SchemaError::UnresolvedReference { pointer, .. }
            | SchemaError::InconsistentSchema { pointer, .. }
            | SchemaError::CycleDetected { pointer }
            | SchemaError::UnknownPointer { pointer } => Some(pointer),
            SchemaError::NameCollision { second, .. } => Some(second),
        }
    }

    /// Stable snake_case tag, used by fixture manifests and tooling.
    pub fn code(&self) -> &'static str {
        match self {
            SchemaError::MalformedInput { .. } => "malformed_input",
            SchemaError::UnresolvedReference { .. } => "unresolved_reference",
            SchemaError::InconsistentSchema { .. } => "inconsistent_schema",
            SchemaError::CycleDetected { .. } => "cycle_detected",
            SchemaError::NameCollision { .. } => "name_collision",
            SchemaError::UnknownPointer { .. } => "unknown_pointer",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_pointer() {
        let err = SchemaError::InconsistentSchema {
            pointer: "#/definitions/user".into(),
            property: "email".into(),
        };
        assert_eq!(
            err.to_string(),
            "inconsistent schema #/definitions/user: required property \"email\" is not defined"
        );
        assert_eq!(err.pointer(), Some("#/definitions/user"));
        assert_eq!(err.code(), "inconsistent_schema");
    }

    #[test]
    fn malformed_input_has_no_pointer() {
        let err = SchemaError::MalformedInput {
            path: "definitions.user.type".into(),
            message: "unknown variant".into(),
        };
        assert_eq!(err.pointer(), None);
        assert_eq!(err.code(), "malformed_input");
    }
}
