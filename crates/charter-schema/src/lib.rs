//! Resource schema model: declared types, properties and enums, plus
//! resolution of external property paths onto internal storage names.
//!
//! A [`SchemaSet`] is an immutable snapshot built either programmatically
//! through [`SchemaBuilder`] or from a JSON [`SchemaDoc`]. Query binding
//! resolves names against it; nothing here is mutated after construction.

mod builder;
mod config;
mod descriptor;
mod error;
mod resolver;
mod types;
mod value;

pub use builder::{SchemaBuilder, SchemaSet};
pub use config::{EnumDoc, PropertyDoc, ResourceDoc, SchemaDoc};
pub use descriptor::{pluralize, EnumDef, PropertyDef, ResourceDef};
pub use error::SchemaError;
pub use resolver::{resolve_path, PathSegment, ResolvedPath};
pub use types::{ScalarKind, TypeRef};
pub use value::{Entity, Value};
