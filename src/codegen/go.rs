//! Go backend: pointer-field structs with `json` tags and `Validate() error`
//! methods, laid out the way gofmt would print them.
use std::collections::HashMap;
use std::fmt::Write;

use super::Backend;
use crate::ir::{Check, Field, FieldType, ItemType, Model, TypeShape, ValidationRules};
use crate::schema::Kind;

const HELPERS: &str = "\
func newString(s string) *string {
\treturn &s
}

func newInt(i int) *int {
\treturn &i
}

func newFloat(f float64) *float64 {
\treturn &f
}

func newBool(b bool) *bool {
\treturn &b
}
";

#[derive(Debug, Clone)]
pub struct GoBackend {
    package: String,
}

impl Default for GoBackend {
    fn default() -> Self {
        Self::new("main")
    }
}

impl GoBackend {
    pub fn new(package: impl Into<String>) -> Self {
        Self {
            package: package.into(),
        }
    }
}

impl Backend for GoBackend {
    fn src(&self, model: &Model) -> String {
        let mut decls: Vec<String> = Vec::new();
        for (_, shape) in &model.types {
            decls.push(type_decl(shape));
        }
        for (pointer, rules) in &model.validations {
            let Some((_, shape)) = model.types.iter().find(|(p, _)| p == pointer) else {
                continue;
            };
            decls.push(validate_func(shape, rules));
        }
        decls.push(HELPERS.to_string());
        decls.join("\n")
    }

    fn imports(&self, src: &str) -> Vec<&'static str> {
        let mut imports = Vec::new();
        if src.contains("errors.New(") {
            imports.push("errors");
        }
        if src.contains("fmt.") {
            imports.push("fmt");
        }
        imports.sort_unstable();
        imports
    }

    fn package_src(&self, model: &Model) -> String {
        let src = self.src(model);
        let mut out = format!("package {}\n\n", self.package);
        let imports = self.imports(&src);
        if !imports.is_empty() {
            out.push_str("import (\n");
            for import in imports {
                let _ = writeln!(out, "\t\"{import}\"");
            }
            out.push_str(")\n\n");
        }
        out.push_str(&src);
        out
    }
}

fn type_decl(shape: &TypeShape) -> String {
    let mut out = String::new();
    if let Some(doc) = shape.doc() {
        for line in doc.lines() {
            let _ = writeln!(out, "// {line}");
        }
    }
    match shape {
        TypeShape::Object { name, fields, .. } => {
            let idents = field_idents(fields);
            let rows: Vec<(String, String, String)> = fields
                .iter()
                .zip(&idents)
                .map(|(field, ident)| {
                    let tag = format!("`json:{}`", quote(&format!("{},omitempty", field.external_name)));
                    (ident.clone(), field_type(field), tag)
                })
                .collect();
            let name_width = rows.iter().map(|r| r.0.len()).max().unwrap_or(0);
            let type_width = rows.iter().map(|r| r.1.len()).max().unwrap_or(0);
            let _ = writeln!(out, "type {name} struct {{");
            for (ident, ty, tag) in rows {
                let _ = writeln!(out, "\t{ident:<name_width$} {ty:<type_width$} {tag}");
            }
            out.push_str("}\n");
        }
        TypeShape::Array { name, item, .. } => {
            let _ = writeln!(out, "type {name} []{}", item_type(item));
        }
    }
    out
}

fn validate_func(shape: &TypeShape, rules: &ValidationRules) -> String {
    let idents: HashMap<&str, String> = match shape {
        TypeShape::Object { fields, .. } => fields
            .iter()
            .map(|f| f.external_name.as_str())
            .zip(field_idents(fields))
            .collect(),
        TypeShape::Array { .. } => HashMap::new(),
    };

    // `err` is declared by the first call that needs it and reassigned after.
    let (body, _) = rules
        .checks
        .iter()
        .fold((String::new(), false), |(mut body, declared), check| match check {
            Check::Required { property, message, .. } => {
                match idents.get(property.as_str()) {
                    Some(ident) => {
                        let _ = write!(
                            body,
                            "\tif t.{ident} == nil {{\n\t\treturn errors.New({})\n\t}}\n",
                            quote(message)
                        );
                    }
                    None => tracing::warn!(
                        type_name = %rules.name,
                        property = %property,
                        "required property has no field; presence check skipped"
                    ),
                }
                (body, declared)
            }
            Check::Nested { external_name, .. } => {
                let Some(ident) = idents.get(external_name.as_str()) else {
                    return (body, declared);
                };
                let op = if declared { "=" } else { ":=" };
                let _ = write!(
                    body,
                    "\terr {op} t.{ident}.Validate()\n\tif err != nil {{\n\t\treturn err\n\t}}\n"
                );
                (body, true)
            }
            Check::Elements => {
                let op = if declared { "=" } else { ":=" };
                let _ = write!(
                    body,
                    "\tfor _, a := range *t {{\n\t\terr {op} a.Validate()\n\t\tif err != nil {{\n\t\t\treturn err\n\t\t}}\n\t}}\n"
                );
                (body, true)
            }
        });

    format!(
        "func (t *{name}) Validate() error {{\n\tif t == nil {{\n\t\treturn nil\n\t}}\n{body}\treturn nil\n}}\n",
        name = rules.name
    )
}

fn field_type(field: &Field) -> String {
    match &field.ty {
        FieldType::Scalar { scalar } => format!("*{}", scalar_type(*scalar)),
        FieldType::Named { name, .. } => format!("*{name}"),
    }
}

fn item_type(item: &ItemType) -> String {
    match item {
        ItemType::Scalar { scalar } => scalar_type(*scalar).to_string(),
        ItemType::Named { name } => name.clone(),
        ItemType::Any => "interface{}".to_string(),
    }
}

fn scalar_type(kind: Kind) -> &'static str {
    match kind {
        Kind::String => "string",
        Kind::Integer => "int",
        Kind::Number => "float64",
        Kind::Boolean => "bool",
        Kind::Null | Kind::Object | Kind::Array | Kind::Reference | Kind::Any => "interface{}",
    }
}

/// Exported Go identifiers for `fields`, unique within the struct.
fn field_idents(fields: &[Field]) -> Vec<String> {
    let mut used: HashMap<String, usize> = HashMap::new();
    fields
        .iter()
        .map(|field| {
            let mut ident: String = field
                .name
                .chars()
                .filter(|c| c.is_alphanumeric())
                .collect();
            if !ident.starts_with(|c: char| c.is_alphabetic()) {
                ident.insert(0, 'X');
            }
            let seen = used.entry(ident.clone()).or_insert(0);
            *seen += 1;
            if *seen > 1 {
                ident = format!("{ident}{seen}");
            }
            ident
        })
        .collect()
}

/// Go interpreted string literal.
fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
