//! Rust backend: serde structs with `Option` fields and `validate` methods.
use std::collections::{HashMap, HashSet};
use std::fmt::Write;

use super::{Backend, recursive_fields};
use crate::ir::{Check, Field, FieldType, ItemType, Model, TypeShape, ValidationRules};
use crate::naming::{rust_ident, snake_case};
use crate::schema::Kind;

const DERIVES: &str =
    "#[derive(Debug, Clone, Default, PartialEq, ::serde::Serialize, ::serde::Deserialize)]";

const SKIP_NONE: &str = "skip_serializing_if = \"::std::option::Option::is_none\"";

const VALIDATION_ERROR: &str = "\
/// Error returned by the generated `validate` methods.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError(::std::string::String);

impl ValidationError {
    pub fn new(message: impl ::std::convert::Into<::std::string::String>) -> Self {
        Self(message.into())
    }

    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl ::std::error::Error for ValidationError {}
";

#[derive(Debug, Clone, Default)]
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Backend for RustBackend {
    fn src(&self, model: &Model) -> String {
        let boxed = recursive_fields(model);
        let mut decls: Vec<String> = Vec::new();
        for (_, shape) in &model.types {
            decls.push(type_decl(shape, &boxed));
        }
        for (pointer, rules) in &model.validations {
            let Some((_, shape)) = model.types.iter().find(|(p, _)| p == pointer) else {
                continue;
            };
            decls.push(validate_impl(shape, rules));
        }
        if !model.validations.is_empty() {
            decls.push(VALIDATION_ERROR.to_string());
        }
        decls.join("\n")
    }

    // everything else is emitted as an absolute path, so schema type names
    // such as `Result` or `Option` cannot shadow it
    fn imports(&self, src: &str) -> Vec<&'static str> {
        if src.contains("fmt::") {
            vec!["std::fmt"]
        } else {
            Vec::new()
        }
    }

    fn package_src(&self, model: &Model) -> String {
        let src = self.src(model);
        let mut out = String::from("// Generated by json-schemac. Do not edit.\n\n");
        let imports = self.imports(&src);
        for import in &imports {
            let _ = writeln!(out, "use {import};");
        }
        if !imports.is_empty() {
            out.push('\n');
        }
        out.push_str(&src);
        out
    }
}

fn type_decl(shape: &TypeShape, boxed: &HashSet<(String, String)>) -> String {
    let mut out = String::new();
    if let Some(doc) = shape.doc() {
        for line in doc.lines() {
            if line.is_empty() {
                out.push_str("///\n");
            } else {
                let _ = writeln!(out, "/// {line}");
            }
        }
    }
    match shape {
        TypeShape::Object { name, fields, .. } => {
            let _ = writeln!(out, "{DERIVES}\npub struct {name} {{");
            for (field, ident) in fields.iter().zip(field_idents(fields)) {
                let unquoted = ident.strip_prefix("r#").unwrap_or(&ident);
                if unquoted == field.external_name {
                    let _ = writeln!(out, "    #[serde({SKIP_NONE})]");
                } else {
                    let _ = writeln!(
                        out,
                        "    #[serde(rename = {:?}, {SKIP_NONE})]",
                        field.external_name
                    );
                }
                let key = (name.clone(), field.external_name.clone());
                let _ = writeln!(
                    out,
                    "    pub {ident}: ::std::option::Option<{}>,",
                    field_type(field, boxed.contains(&key))
                );
            }
            out.push_str("}\n");
        }
        TypeShape::Array { name, item, .. } => {
            let _ = writeln!(
                out,
                "{DERIVES}\n#[serde(transparent)]\npub struct {name}(pub ::std::vec::Vec<{}>);",
                item_type(item)
            );
        }
    }
    out
}

fn validate_impl(shape: &TypeShape, rules: &ValidationRules) -> String {
    let idents: HashMap<&str, String> = match shape {
        TypeShape::Object { fields, .. } => fields
            .iter()
            .map(|f| f.external_name.as_str())
            .zip(field_idents(fields))
            .collect(),
        TypeShape::Array { .. } => HashMap::new(),
    };

    let mut body = String::new();
    for check in &rules.checks {
        match check {
            Check::Required { property, message, .. } => match idents.get(property.as_str()) {
                Some(ident) => {
                    let _ = write!(
                        body,
                        "        if self.{ident}.is_none() {{\n            return ::std::result::Result::Err(ValidationError::new({message:?}));\n        }}\n"
                    );
                }
                None => tracing::warn!(
                    type_name = %rules.name,
                    property = %property,
                    "required property has no field; presence check skipped"
                ),
            },
            Check::Nested { external_name, .. } => {
                if let Some(ident) = idents.get(external_name.as_str()) {
                    let _ = write!(
                        body,
                        "        if let ::std::option::Option::Some(value) = &self.{ident} {{\n            value.validate()?;\n        }}\n"
                    );
                }
            }
            Check::Elements => {
                body.push_str("        for item in &self.0 {\n            item.validate()?;\n        }\n");
            }
        }
    }

    format!(
        "impl {name} {{\n    pub fn validate(&self) -> ::std::result::Result<(), ValidationError> {{\n{body}        ::std::result::Result::Ok(())\n    }}\n}}\n",
        name = rules.name
    )
}

fn field_type(field: &Field, boxed: bool) -> String {
    match &field.ty {
        FieldType::Scalar { scalar } => scalar_type(*scalar).to_string(),
        FieldType::Named { name, .. } if boxed => format!("::std::boxed::Box<{name}>"),
        FieldType::Named { name, .. } => name.clone(),
    }
}

fn item_type(item: &ItemType) -> String {
    match item {
        ItemType::Scalar { scalar } => scalar_type(*scalar).to_string(),
        ItemType::Named { name } => name.clone(),
        ItemType::Any => "serde_json::Value".to_string(),
    }
}

fn scalar_type(kind: Kind) -> &'static str {
    match kind {
        Kind::String => "::std::string::String",
        Kind::Integer => "i64",
        Kind::Number => "f64",
        Kind::Boolean => "bool",
        Kind::Null | Kind::Object | Kind::Array | Kind::Reference | Kind::Any => {
            "serde_json::Value"
        }
    }
}

/// snake_case field identifiers, keyword-escaped and unique within the struct.
fn field_idents(fields: &[Field]) -> Vec<String> {
    let mut used: HashMap<String, usize> = HashMap::new();
    fields
        .iter()
        .map(|field| {
            let mut ident = snake_case(&field.external_name);
            let seen = used.entry(ident.clone()).or_insert(0);
            *seen += 1;
            if *seen > 1 {
                ident = format!("{ident}_{seen}");
            }
            rust_ident(&ident)
        })
        .collect()
}
