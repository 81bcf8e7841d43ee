//! Lowering: pointer index → type shapes and validation rule sets.
//!
//! Every object or array node becomes one [`TypeShape`] and one
//! [`ValidationRules`]; everything else is inlined on its parent. Nodes are
//! visited sorted by name (ties by pointer), fields by property name.
use std::collections::HashMap;

use rayon::prelude::*;

use crate::error::{Result, SchemaError};
use crate::index::Index;
use crate::ir::{Check, Field, FieldType, ItemType, Model, TypeShape, ValidationRules};
use crate::resolve::resolve;
use crate::schema::{Kind, Schema};

/// Lower the whole index. Any error fails the batch; no partial model is returned.
pub fn generate(index: &Index) -> Result<Model> {
    let nodes = index.sorted_by_name();

    // nodes only read the index, so they can be lowered independently
    let lowered: Vec<Result<Option<(TypeShape, ValidationRules)>>> = nodes
        .par_iter()
        .map(|node| generate_node(node, index))
        .collect();

    let mut model = Model::default();
    let mut seen: HashMap<String, String> = HashMap::new();
    for (node, result) in nodes.iter().zip(lowered) {
        let Some((shape, rules)) = result? else { continue };
        if let Some(first) = seen.insert(shape.name().to_string(), node.pointer.clone()) {
            return Err(SchemaError::NameCollision {
                name: shape.name().to_string(),
                first,
                second: node.pointer.clone(),
            });
        }
        model.types.push((node.pointer.clone(), shape));
        model.validations.push((node.pointer.clone(), rules));
    }
    tracing::debug!(types = model.types.len(), "lowered index");
    Ok(model)
}

fn generate_node(node: &Schema, index: &Index) -> Result<Option<(TypeShape, ValidationRules)>> {
    let shape = generate_type(node, index)?;
    let rules = generate_validation(node, index)?;
    Ok(shape.zip(rules))
}

/// Type shape of `node`, or `None` for kinds that are inlined on their parent.
pub fn generate_type(node: &Schema, index: &Index) -> Result<Option<TypeShape>> {
    let doc = doc_of(node);
    match node.kind {
        Kind::Object => {
            let mut fields = Vec::with_capacity(node.properties.len());
            for (_, property) in index.properties(node) {
                if let Some(field) = lower_field(property, index)? {
                    fields.push(field);
                }
            }
            Ok(Some(TypeShape::Object {
                name: node.name.clone(),
                external_name: node.external_name.clone(),
                doc,
                fields,
            }))
        }
        Kind::Array => {
            let item = match index.items(node) {
                None => ItemType::Any,
                Some(items) => {
                    let resolved = resolve(items, index)?;
                    match items.kind {
                        Kind::Object | Kind::Array | Kind::Reference => ItemType::Named {
                            name: resolved.name.clone(),
                        },
                        Kind::Boolean | Kind::Number | Kind::Integer | Kind::String => {
                            ItemType::Scalar { scalar: items.kind }
                        }
                        Kind::Null | Kind::Any => ItemType::Any,
                    }
                }
            };
            Ok(Some(TypeShape::Array {
                name: node.name.clone(),
                external_name: node.external_name.clone(),
                doc,
                item,
            }))
        }
        Kind::Null
        | Kind::Boolean
        | Kind::Number
        | Kind::Integer
        | Kind::String
        | Kind::Reference
        | Kind::Any => Ok(None),
    }
}

/// One field of an object type; `None` when the property carries no value.
fn lower_field(property: &Schema, index: &Index) -> Result<Option<Field>> {
    let ty = match property.kind {
        Kind::Boolean | Kind::Number | Kind::Integer | Kind::String => FieldType::Scalar {
            scalar: property.kind,
        },
        Kind::Object | Kind::Array => FieldType::Named {
            name: property.name.clone(),
            external_name: property.external_name.clone(),
        },
        Kind::Reference => {
            let target = resolve(property, index)?;
            match target.kind {
                Kind::Null | Kind::Any => return Ok(None),
                _ => FieldType::Named {
                    name: target.name.clone(),
                    external_name: target.external_name.clone(),
                },
            }
        }
        Kind::Null | Kind::Any => return Ok(None),
    };
    Ok(Some(Field {
        name: property.name.clone(),
        external_name: property.external_name.clone(),
        ty,
    }))
}

/// Validation rule set of `node`, or `None` for kinds without a generated type.
///
/// Presence checks come first, in `required` order; nested validation calls
/// follow in property-name order.
pub fn generate_validation(node: &Schema, index: &Index) -> Result<Option<ValidationRules>> {
    let mut checks = Vec::new();
    match node.kind {
        Kind::Object => {
            for property in &node.required {
                let pointer = node.property_pointer(property);
                if !index.contains(&pointer) {
                    return Err(SchemaError::InconsistentSchema {
                        pointer: node.pointer.clone(),
                        property: property.clone(),
                    });
                }
                checks.push(Check::Required {
                    property: property.clone(),
                    message: format!("invalid {}: missing {}", node.external_name, property),
                });
            }
            for (_, property) in index.properties(node) {
                if resolve(property, index)?.kind.is_complex() {
                    checks.push(Check::Nested {
                        external_name: property.external_name.clone(),
                    });
                }
            }
        }
        Kind::Array => {
            if let Some(items) = index.items(node) {
                if resolve(items, index)?.kind.is_complex() {
                    checks.push(Check::Elements);
                }
            }
        }
        Kind::Null
        | Kind::Boolean
        | Kind::Number
        | Kind::Integer
        | Kind::String
        | Kind::Reference
        | Kind::Any => return Ok(None),
    }
    Ok(Some(ValidationRules {
        name: node.name.clone(),
        external_name: node.external_name.clone(),
        checks,
    }))
}

fn doc_of(node: &Schema) -> Option<String> {
    match (&node.title, &node.description) {
        (Some(title), Some(description)) => Some(format!("{title}\n\n{description}")),
        (Some(text), None) | (None, Some(text)) => Some(text.clone()),
        (None, None) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::index::parse;

    fn index_of(src: &str) -> Index {
        parse(src.as_bytes()).unwrap()
    }

    fn scalar(name: &str, external_name: &str, scalar: Kind) -> Field {
        Field {
            name: name.into(),
            external_name: external_name.into(),
            ty: FieldType::Scalar { scalar },
        }
    }

    fn named(name: &str, external_name: &str, ty: &str, ty_external: &str) -> Field {
        Field {
            name: name.into(),
            external_name: external_name.into(),
            ty: FieldType::Named {
                name: ty.into(),
                external_name: ty_external.into(),
            },
        }
    }

    #[test]
    fn movie_type_shape() {
        let index = index_of(fixtures::WITH_DEFINITIONS);
        let movie = index.get("#/definitions/movie").unwrap();
        let shape = generate_type(movie, &index).unwrap().unwrap();
        assert_eq!(shape, TypeShape::Object {
            name: "Movie".into(),
            external_name: "movie".into(),
            doc: None,
            fields: vec![
                named("Actor", "actor", "Actor", "actor"),
                named("Categories", "categories", "Categories", "categories"),
                scalar("ID", "id", Kind::String),
                scalar("Name", "name", Kind::String),
                scalar("Year", "year", Kind::Integer),
            ],
        });
    }

    #[test]
    fn referenced_field_takes_target_names() {
        let index = index_of(fixtures::WITH_DEFINITIONS);
        let categories = index.get("#/definitions/movie/properties/categories").unwrap();
        let field = lower_field(categories, &index).unwrap().unwrap();
        assert_eq!(field.ty, FieldType::Named {
            name: "Categories".into(),
            external_name: "categories".into(),
        });

        let src = r##"{"definitions": {
            "tags": {"type": "array", "items": {"type": "string"}},
            "post": {"type": "object", "properties": {"labels": {"$ref": "#/definitions/tags"}}}
        }}"##;
        let index = index_of(src);
        let labels = index.get("#/definitions/post/properties/labels").unwrap();
        let field = lower_field(labels, &index).unwrap().unwrap();
        assert_eq!(field, named("Labels", "labels", "Tags", "tags"));
    }

    #[test]
    fn array_type_shapes() {
        let index = index_of(fixtures::WITH_DEFINITIONS);
        let categories = index.get("#/definitions/categories").unwrap();
        let shape = generate_type(categories, &index).unwrap().unwrap();
        assert!(matches!(
            shape,
            TypeShape::Array { item: ItemType::Scalar { scalar: Kind::String }, .. }
        ));

        let index = index_of(fixtures::ARRAY_OF_OBJECTS);
        let movies = index.get("#/definitions/movies").unwrap();
        let shape = generate_type(movies, &index).unwrap().unwrap();
        assert!(matches!(shape, TypeShape::Array { ref item, .. }
            if *item == ItemType::Named { name: "Items".into() }));

        let index = index_of(fixtures::USER_ROLES);
        let roles = index.get("#/definitions/roles").unwrap();
        let shape = generate_type(roles, &index).unwrap().unwrap();
        assert!(matches!(shape, TypeShape::Array { ref item, .. }
            if *item == ItemType::Named { name: "Role".into() }));
    }

    #[test]
    fn primitive_types_fixture() {
        let index = index_of(fixtures::PRIMITIVE_TYPES);
        let produced = |kind: &str| {
            let node = index.get(&format!("#/definitions/{kind}")).unwrap();
            let field = lower_field(node, &index).unwrap();
            let shape = generate_type(node, &index).unwrap();
            (field.is_some(), shape.is_some())
        };
        assert_eq!(produced("null"), (false, false));
        assert_eq!(produced("boolean"), (true, false));
        assert_eq!(produced("object"), (true, true));
        assert_eq!(produced("array"), (true, true));
        assert_eq!(produced("number"), (true, false));
        assert_eq!(produced("integer"), (true, false));
        assert_eq!(produced("string"), (true, false));

        let model = generate(&index).unwrap();
        let names: Vec<&str> = model.types.iter().map(|(_, t)| t.name()).collect();
        assert_eq!(names, vec!["Array", "Object"]);
    }

    #[test]
    fn user_required_id_is_checked_first() {
        let index = index_of(fixtures::USER);
        let user = index.get("#/definitions/user").unwrap();
        let rules = generate_validation(user, &index).unwrap().unwrap();
        assert_eq!(rules.checks, vec![Check::Required {
            property: "id".into(),
            message: "invalid user: missing id".into(),
        }]);
        assert_eq!(rules.first_failure(), Some("invalid user: missing id"));
    }

    #[test]
    fn presence_checks_precede_nested_calls() {
        let index = index_of(fixtures::REQUIRED_VALIDATION);
        let movie = index.get("#/definitions/movie").unwrap();
        let rules = generate_validation(movie, &index).unwrap().unwrap();
        assert_eq!(rules.checks, vec![
            Check::Required {
                property: "id".into(),
                message: "invalid movie: missing id".into(),
            },
            Check::Required {
                property: "actors".into(),
                message: "invalid movie: missing actors".into(),
            },
            Check::Nested { external_name: "actors".into() },
        ]);

        let actor = index.get("#/definitions/actor").unwrap();
        let rules = generate_validation(actor, &index).unwrap().unwrap();
        assert_eq!(rules.first_failure(), Some("invalid actor: missing name"));
        assert_eq!(rules.required().count(), 2);
        assert_eq!(
            rules.checks.last(),
            Some(&Check::Nested { external_name: "location".into() })
        );
    }

    #[test]
    fn required_order_decides_first_failure() {
        let src = r#"{"definitions": {"pair": {"type": "object", "required": ["b", "a"],
            "properties": {"a": {"type": "string"}, "b": {"type": "string"}}}}}"#;
        let index = index_of(src);
        let pair = index.get("#/definitions/pair").unwrap();
        let rules = generate_validation(pair, &index).unwrap().unwrap();
        assert_eq!(rules.first_failure(), Some("invalid pair: missing b"));
        assert_eq!(rules.required().count(), 2);
    }

    #[test]
    fn array_rules() {
        let index = index_of(fixtures::USER_ROLES);
        let roles = index.get("#/definitions/roles").unwrap();
        let rules = generate_validation(roles, &index).unwrap().unwrap();
        assert_eq!(rules.checks, vec![Check::Elements]);

        let index = index_of(fixtures::WITH_DEFINITIONS);
        let categories = index.get("#/definitions/categories").unwrap();
        let rules = generate_validation(categories, &index).unwrap().unwrap();
        assert!(rules.checks.is_empty());
    }

    #[test]
    fn primitives_have_no_rule() {
        let index = index_of(fixtures::PRIMITIVE_TYPES);
        for kind in ["null", "boolean", "number", "integer", "string"] {
            let node = index.get(&format!("#/definitions/{kind}")).unwrap();
            assert_eq!(generate_validation(node, &index).unwrap(), None);
        }
    }

    #[test]
    fn inconsistent_required_fails_whole_batch() {
        let index = index_of(fixtures::INCONSISTENT_REQUIRED);
        assert_eq!(
            generate(&index),
            Err(SchemaError::InconsistentSchema {
                pointer: "#/definitions/user".into(),
                property: "email".into(),
            })
        );
    }

    #[test]
    fn unresolved_reference_fails_generation() {
        let index = index_of(fixtures::UNRESOLVED_REFERENCE);
        assert!(matches!(
            generate(&index),
            Err(SchemaError::UnresolvedReference { ref target, .. }) if target == "#/definitions/address"
        ));
    }

    #[test]
    fn model_order_is_by_name() {
        let index = index_of(fixtures::WITH_DEFINITIONS);
        let model = generate(&index).unwrap();
        let pointers: Vec<&str> = model.types.iter().map(|(p, _)| p.as_str()).collect();
        assert_eq!(pointers, vec![
            "#/definitions/movie/properties/actor",
            "#/definitions/categories",
            "#/definitions/movie",
        ]);
        let validation_pointers: Vec<&str> =
            model.validations.iter().map(|(p, _)| p.as_str()).collect();
        assert_eq!(pointers, validation_pointers);
    }

    #[test]
    fn generation_ignores_document_key_order() {
        let reordered = r##"{"definitions": {
            "categories": {"items": {"type": "string"}, "type": "array"},
            "movie": {"properties": {
                "categories": {"$ref": "#/definitions/categories"},
                "year": {"type": "integer"},
                "actor": {"properties": {"name": {"type": "string"}, "id": {"type": "string"}}, "type": "object"},
                "name": {"type": "string"},
                "id": {"type": "string"}
            }, "required": ["id", "name"], "type": "object"}
        }}"##;
        let a = generate(&index_of(fixtures::WITH_DEFINITIONS)).unwrap();
        let b = generate(&index_of(reordered)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn self_reference_still_generates() {
        let index = index_of(fixtures::SELF_REFERENCE);
        let model = generate(&index).unwrap();
        let node = model.type_named("Node").unwrap();
        assert_eq!(node.doc(), Some("Tree node"));
        let rules = model.validation_for("#/definitions/node").unwrap();
        assert_eq!(rules.checks.len(), 3);
    }

    #[test]
    fn colliding_type_names_fail() {
        let src = r#"{"definitions": {
            "a": {"type": "object", "properties": {"shared": {"type": "object"}}},
            "b": {"type": "object", "properties": {"shared": {"type": "array"}}}
        }}"#;
        assert_eq!(
            generate(&index_of(src)),
            Err(SchemaError::NameCollision {
                name: "Shared".into(),
                first: "#/definitions/a/properties/shared".into(),
                second: "#/definitions/b/properties/shared".into(),
            })
        );
    }
}
