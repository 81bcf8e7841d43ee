//! Sample instances: one example value per schema node, for docs and fixtures.
use serde_json::{Map, Value, json};

use crate::error::{Result, SchemaError};
use crate::index::Index;
use crate::resolve::resolve;
use crate::schema::{Kind, Schema};

const SAMPLE_STRING: &str = "string";
const SAMPLE_INTEGER: i64 = 42;
#[allow(clippy::approx_constant)]
const SAMPLE_NUMBER: f64 = 3.14;

/// Synthesize one value conforming to `node`.
///
/// Fails with [`SchemaError::CycleDetected`] when expansion follows a `$ref`
/// back onto a schema that is already being expanded.
pub fn synthesize(node: &Schema, index: &Index) -> Result<Value> {
    let mut expanding = Vec::new();
    synthesize_inner(node, index, &mut expanding)
}

fn synthesize_inner<'a>(
    node: &'a Schema,
    index: &'a Index,
    expanding: &mut Vec<&'a str>,
) -> Result<Value> {
    match node.kind {
        Kind::Reference => {
            let target = resolve(node, index)?;
            if expanding.contains(&target.pointer.as_str()) {
                return Err(SchemaError::CycleDetected {
                    pointer: node.pointer.clone(),
                });
            }
            expanding.push(&target.pointer);
            let value = synthesize_inner(target, index, expanding);
            expanding.pop();
            value
        }
        Kind::Object => {
            let mut map = Map::new();
            for (name, property) in index.properties(node) {
                map.insert(name.to_string(), synthesize_inner(property, index, expanding)?);
            }
            Ok(Value::Object(map))
        }
        Kind::Array => match index.items(node) {
            Some(items) => Ok(Value::Array(vec![synthesize_inner(items, index, expanding)?])),
            None => Ok(Value::Array(Vec::new())),
        },
        Kind::String => Ok(json!(SAMPLE_STRING)),
        Kind::Integer => Ok(json!(SAMPLE_INTEGER)),
        Kind::Number => Ok(json!(SAMPLE_NUMBER)),
        Kind::Boolean => Ok(json!(true)),
        Kind::Null | Kind::Any => Ok(Value::Null),
    }
}
