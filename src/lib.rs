//! Compile a JSON Schema document into a pointer index, sample instances, and
//! a typed model with required-field validation that backends render as Rust
//! or Go source.
//!
//! ```text
//! bytes ─ parse ─▶ Index ─┬─ resolve / synthesize
//!                         └─ generate ─▶ Model ─ Backend ─▶ source
//! ```
pub mod codegen;
pub mod error;
pub mod index;
pub mod instance;
pub mod ir;
pub mod lower;
pub mod naming;
pub mod path_de;
pub mod resolve;
pub mod schema;

#[cfg(test)]
mod fixtures;

pub use codegen::{Backend, GoBackend, RustBackend};
pub use error::{Result, SchemaError};
pub use index::{Index, ROOT_POINTER, parse};
pub use instance::synthesize;
pub use ir::{Check, Field, FieldType, ItemType, Model, TypeShape, ValidationRules};
pub use lower::{generate, generate_type, generate_validation};
pub use resolve::resolve;
pub use schema::{Kind, Schema};
