use crate::error::SchemaError;

/// Built-in scalar value kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Bool,
    Int,
    Float,
    Decimal,
    String,
    Guid,
    DateTime,
}

impl ScalarKind {
    pub fn display(&self) -> &'static str {
        match self {
            ScalarKind::Bool => "bool",
            ScalarKind::Int => "int",
            ScalarKind::Float => "float",
            ScalarKind::Decimal => "decimal",
            ScalarKind::String => "string",
            ScalarKind::Guid => "guid",
            ScalarKind::DateTime => "datetime",
        }
    }

    /// Parses the textual form used in schema documents.
    pub fn parse(text: &str) -> Option<ScalarKind> {
        match text.to_ascii_lowercase().as_str() {
            "bool" | "boolean" => Some(ScalarKind::Bool),
            "int" | "integer" => Some(ScalarKind::Int),
            "float" | "double" => Some(ScalarKind::Float),
            "decimal" => Some(ScalarKind::Decimal),
            "string" => Some(ScalarKind::String),
            "guid" | "uuid" => Some(ScalarKind::Guid),
            "datetime" => Some(ScalarKind::DateTime),
            _ => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, ScalarKind::Int | ScalarKind::Float | ScalarKind::Decimal)
    }
}

/// A reference to a declared type, as carried by property definitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeRef {
    Scalar(ScalarKind),
    /// A declared enum, by name.
    Enum(String),
    /// A declared resource, by name.
    Resource(String),
    /// A homogeneous collection of the element type.
    Collection(Box<TypeRef>),
    /// A string-keyed dictionary with the given value type.
    Dictionary(Box<TypeRef>),
}

impl TypeRef {
    pub fn scalar(kind: ScalarKind) -> TypeRef {
        TypeRef::Scalar(kind)
    }

    pub fn collection_of(element: TypeRef) -> TypeRef {
        TypeRef::Collection(Box::new(element))
    }

    pub fn is_collection(&self) -> bool {
        matches!(self, TypeRef::Collection(_))
    }

    pub fn is_resource(&self) -> bool {
        matches!(self, TypeRef::Resource(_))
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self, TypeRef::Scalar(_))
    }

    pub fn scalar_kind(&self) -> Option<ScalarKind> {
        match self {
            TypeRef::Scalar(kind) => Some(*kind),
            _ => None,
        }
    }

    /// The element type of a collection, or an error for anything else.
    pub fn element_type(&self) -> Result<&TypeRef, SchemaError> {
        match self {
            TypeRef::Collection(element) => Ok(element),
            other => Err(SchemaError::NotACollection {
                ty: other.display(),
            }),
        }
    }

    /// Human-readable form, matching the notation accepted by schema documents.
    pub fn display(&self) -> String {
        match self {
            TypeRef::Scalar(kind) => kind.display().to_string(),
            TypeRef::Enum(name) => name.clone(),
            TypeRef::Resource(name) => name.clone(),
            TypeRef::Collection(element) => format!("[{}]", element.display()),
            TypeRef::Dictionary(value) => format!("{{{}}}", value.display()),
        }
    }
}
