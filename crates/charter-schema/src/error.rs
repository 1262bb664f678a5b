use thiserror::Error;

/// Errors raised while building a schema or resolving paths against one.
#[derive(Error, Debug, Clone)]
pub enum SchemaError {
    #[error("could not find property '{segment}' on type '{type_name}' while resolving path '{full_path}'")]
    UnknownProperty {
        type_name: String,
        segment: String,
        full_path: String,
    },

    #[error("property '{segment}' of type '{type_name}' cannot be navigated into while resolving path '{full_path}'")]
    InvalidPath {
        type_name: String,
        segment: String,
        full_path: String,
    },

    #[error("unknown type '{name}'")]
    UnknownType { name: String },

    #[error("unknown enum '{name}'")]
    UnknownEnum { name: String },

    #[error("duplicate type '{name}'")]
    DuplicateType { name: String },

    #[error("duplicate property '{property}' on type '{type_name}'")]
    DuplicateProperty {
        type_name: String,
        property: String,
    },

    #[error("type '{ty}' is not a collection")]
    NotACollection { ty: String },

    #[error("unknown base type '{base}' declared on '{type_name}'")]
    UnknownBase { type_name: String, base: String },

    #[error("inheritance cycle involving type '{type_name}'")]
    CyclicBase { type_name: String },

    #[error("invalid type reference '{text}'")]
    InvalidTypeText { text: String },
}

impl SchemaError {
    /// Stable error code for diagnostics output.
    pub fn code(&self) -> &'static str {
        match self {
            SchemaError::UnknownProperty { .. } => "E-SCHEMA-UNKNOWN-PROPERTY",
            SchemaError::InvalidPath { .. } => "E-SCHEMA-INVALID-PATH",
            SchemaError::UnknownType { .. } => "E-SCHEMA-UNKNOWN-TYPE",
            SchemaError::UnknownEnum { .. } => "E-SCHEMA-UNKNOWN-ENUM",
            SchemaError::DuplicateType { .. } => "E-SCHEMA-DUPLICATE-TYPE",
            SchemaError::DuplicateProperty { .. } => "E-SCHEMA-DUPLICATE-PROPERTY",
            SchemaError::NotACollection { .. } => "E-SCHEMA-NOT-A-COLLECTION",
            SchemaError::UnknownBase { .. } => "E-SCHEMA-UNKNOWN-BASE",
            SchemaError::CyclicBase { .. } => "E-SCHEMA-CYCLIC-BASE",
            SchemaError::InvalidTypeText { .. } => "E-SCHEMA-INVALID-TYPE-TEXT",
        }
    }
}
