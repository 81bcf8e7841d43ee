//! Identifier derivation from pointer segments.
//!
//! Later stages (type names, field names, ordering) all key off these
//! functions, so they must stay pure.
use once_cell::sync::Lazy;
use regex::Regex;

static STRIPPED: Lazy<Regex> = Lazy::new(|| Regex::new(r"[{}\-_]").expect("static regex"));

/// Identifier for the last segment of `pointer`.
pub fn name_from_pointer(pointer: &str) -> String {
    name_from_segment(&external_name_from_pointer(pointer))
}

/// The raw (unescaped) last segment of `pointer`, for wire names and tags.
pub fn external_name_from_pointer(pointer: &str) -> String {
    let last = pointer.rsplit('/').next().unwrap_or(pointer);
    unescape_segment(last)
}

pub fn name_from_segment(segment: &str) -> String {
    let cleaned = STRIPPED.replace_all(segment, "");
    match cleaned.to_ascii_lowercase().as_str() {
        "id" => "ID".to_string(),
        "url" => "URL".to_string(),
        "api" => "API".to_string(),
        _ => capitalize(&cleaned),
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
    }
}

/// RFC 6901 escaping of one reference token.
pub fn escape_segment(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}

pub fn unescape_segment(segment: &str) -> String {
    segment.replace("~1", "/").replace("~0", "~")
}

/// snake_case for a Rust field identifier. `ID` → `id`, `UserName` → `username`
/// (names are already collapsed by [`name_from_segment`], so the wire name is a
/// better source for word boundaries).
pub fn snake_case(external_name: &str) -> String {
    let mut out = String::with_capacity(external_name.len() + 4);
    let mut prev_lower = false;
    for c in external_name.chars() {
        if c.is_ascii_alphanumeric() {
            if c.is_ascii_uppercase() && prev_lower {
                out.push('_');
            }
            prev_lower = c.is_ascii_lowercase() || c.is_ascii_digit();
            out.push(c.to_ascii_lowercase());
        } else if !out.is_empty() && !out.ends_with('_') {
            out.push('_');
            prev_lower = false;
        }
    }
    let out = out.trim_end_matches('_').to_string();
    match out.chars().next() {
        None => "field".to_string(),
        Some(c) if c.is_ascii_digit() => format!("_{out}"),
        Some(_) => out,
    }
}

const RUST_KEYWORDS: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else", "enum",
    "extern", "false", "fn", "for", "gen", "if", "impl", "in", "let", "loop", "match", "mod",
    "move", "mut", "pub", "ref", "return", "static", "struct", "super", "trait", "true",
    "type", "unsafe", "use", "where", "while", "abstract", "become", "box", "do", "final",
    "macro", "override", "priv", "try", "typeof", "unsized", "virtual", "yield",
];

/// Escapes Rust keywords as raw identifiers (`type` → `r#type`).
pub fn rust_ident(ident: &str) -> String {
    match ident {
        // cannot be raw identifiers
        "self" | "Self" | "super" | "crate" => format!("{ident}_"),
        _ if RUST_KEYWORDS.contains(&ident) => format!("r#{ident}"),
        _ => ident.to_string(),
    }
}
