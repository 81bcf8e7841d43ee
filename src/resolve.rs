use crate::error::{Result, SchemaError};
use crate::index::Index;
use crate::schema::Schema;

/// Follows one `$ref` hop. Non-reference nodes come back unchanged.
///
/// Resolution is deliberately single-level: a reference to a reference
/// yields the intermediate node, and cycles are not chased here.
pub fn resolve<'a>(node: &'a Schema, index: &'a Index) -> Result<&'a Schema> {
    if !node.is_reference() {
        return Ok(node);
    }
    let target = node.reference.as_deref().unwrap_or_default();
    index
        .get(target)
        .ok_or_else(|| SchemaError::UnresolvedReference {
            pointer: node.pointer.clone(),
            target: target.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::index::parse;
    use crate::schema::Kind;

    #[test]
    fn reference_resolves_to_target() {
        let index = parse(fixtures::WITH_DEFINITIONS.as_bytes()).unwrap();
        let field = index.get("#/definitions/movie/properties/categories").unwrap();
        let target = resolve(field, &index).unwrap();
        assert_eq!(target.pointer, "#/definitions/categories");
        assert_eq!(target.kind, Kind::Array);
        assert_eq!(target.name, "Categories");
        assert_eq!(target.external_name, "categories");
    }

    #[test]
    fn non_reference_is_returned_unchanged() {
        let index = parse(fixtures::WITH_DEFINITIONS.as_bytes()).unwrap();
        for (_, node) in index.iter().filter(|(_, n)| !n.is_reference()) {
            let resolved = resolve(node, &index).unwrap();
            assert!(std::ptr::eq(resolved, node));
            // idempotent
            assert!(std::ptr::eq(resolve(resolved, &index).unwrap(), resolved));
        }
    }

    #[test]
    fn missing_target_is_unresolved() {
        let index = parse(fixtures::UNRESOLVED_REFERENCE.as_bytes()).unwrap();
        let field = index.get("#/definitions/user/properties/address").unwrap();
        assert_eq!(
            resolve(field, &index),
            Err(SchemaError::UnresolvedReference {
                pointer: "#/definitions/user/properties/address".into(),
                target: "#/definitions/address".into(),
            })
        );
    }

    #[test]
    fn resolution_is_one_hop() {
        let src = r##"{"definitions": {
            "a": {"$ref": "#/definitions/b"},
            "b": {"$ref": "#/definitions/a"}
        }}"##;
        let index = parse(src.as_bytes()).unwrap();
        let a = index.get("#/definitions/a").unwrap();
        let b = resolve(a, &index).unwrap();
        assert_eq!(b.pointer, "#/definitions/b");
        assert_eq!(b.kind, Kind::Reference);
    }
}
