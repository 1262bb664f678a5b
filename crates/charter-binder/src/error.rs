use charter_schema::SchemaError;
use charter_syntax::Span;
use thiserror::Error;

/// Errors raised while resolving and typing a query expression against a
/// schema. Binding stops at the first error.
#[derive(Error, Debug, Clone)]
pub enum BindError {
    #[error("{source}")]
    Schema {
        #[source]
        source: SchemaError,
        span: Span,
    },

    #[error("query construct '{kind}' is not supported here")]
    UnresolvedSyntax { kind: String, span: Span },

    #[error("expected {expected}, found {found}")]
    TypeMismatch {
        expected: String,
        found: String,
        span: Span,
    },

    #[error("operator '{op}' is not supported for {kind} operands")]
    ComparisonNotSupported {
        op: String,
        kind: String,
        span: Span,
    },

    #[error("null can only be compared with eq or ne")]
    NullComparison { span: Span },

    #[error("cannot navigate through collection property '{property}'; use any or all")]
    CollectionTraversal { property: String, span: Span },

    #[error("unknown method '{name}'")]
    UnknownMethod { name: String, span: Span },

    #[error("method '{name}' takes {expected} argument(s), found {found}")]
    MethodArity {
        name: String,
        expected: usize,
        found: usize,
        span: Span,
    },

    #[error("method '{name}' requires a lambda argument")]
    MissingLambda { name: String, span: Span },

    #[error("enum '{enum_name}' has no variant '{variant}'")]
    UnknownEnumVariant {
        enum_name: String,
        variant: String,
        span: Span,
    },

    #[error("invalid number '{text}'")]
    InvalidNumber { text: String, span: Span },

    #[error("filter must be a boolean expression, found {found}")]
    PredicateNotBoolean { found: String, span: Span },

    #[error("cannot order by a value of type {ty}")]
    NotSortable { ty: String, span: Span },
}

impl BindError {
    pub fn schema(source: SchemaError, span: Span) -> BindError {
        BindError::Schema { source, span }
    }

    pub fn span(&self) -> Span {
        match self {
            BindError::Schema { span, .. }
            | BindError::UnresolvedSyntax { span, .. }
            | BindError::TypeMismatch { span, .. }
            | BindError::ComparisonNotSupported { span, .. }
            | BindError::NullComparison { span }
            | BindError::CollectionTraversal { span, .. }
            | BindError::UnknownMethod { span, .. }
            | BindError::MethodArity { span, .. }
            | BindError::MissingLambda { span, .. }
            | BindError::UnknownEnumVariant { span, .. }
            | BindError::InvalidNumber { span, .. }
            | BindError::PredicateNotBoolean { span, .. }
            | BindError::NotSortable { span, .. } => *span,
        }
    }

    /// Stable error code for diagnostics output.
    pub fn code(&self) -> &'static str {
        match self {
            BindError::Schema { source, .. } => source.code(),
            BindError::UnresolvedSyntax { .. } => "E-BIND-UNRESOLVED-SYNTAX",
            BindError::TypeMismatch { .. } => "E-BIND-TYPE-MISMATCH",
            BindError::ComparisonNotSupported { .. } => "E-BIND-COMPARISON-NOT-SUPPORTED",
            BindError::NullComparison { .. } => "E-BIND-NULL-COMPARISON",
            BindError::CollectionTraversal { .. } => "E-BIND-COLLECTION-TRAVERSAL",
            BindError::UnknownMethod { .. } => "E-BIND-UNKNOWN-METHOD",
            BindError::MethodArity { .. } => "E-BIND-METHOD-ARITY",
            BindError::MissingLambda { .. } => "E-BIND-MISSING-LAMBDA",
            BindError::UnknownEnumVariant { .. } => "E-BIND-UNKNOWN-ENUM-VARIANT",
            BindError::InvalidNumber { .. } => "E-BIND-INVALID-NUMBER",
            BindError::PredicateNotBoolean { .. } => "E-BIND-PREDICATE-NOT-BOOLEAN",
            BindError::NotSortable { .. } => "E-BIND-NOT-SORTABLE",
        }
    }
}

/// Errors raised while evaluating a bound expression against an item.
/// These indicate data that does not match its declared type, not a bad
/// query; bad queries fail at bind time.
#[derive(Error, Debug, Clone)]
pub enum EvalError {
    #[error("expected a {expected} value, found {found}")]
    UnexpectedValue { expected: String, found: String },

    #[error("division by zero")]
    DivisionByZero,

    #[error("numeric overflow")]
    NumericOverflow,

    #[error("cannot read a property off a {kind} value")]
    PropertyOnValue { kind: String },

    #[error("'{what}' cannot be used as a plain value here")]
    NotAValue { what: String },

    #[error("enum '{enum_name}' has no variant '{value}'")]
    InvalidEnumValue { enum_name: String, value: String },

    #[error("no value bound for parameter '{name}'")]
    MissingParam { name: String },
}

impl EvalError {
    pub fn code(&self) -> &'static str {
        match self {
            EvalError::UnexpectedValue { .. } => "E-EVAL-UNEXPECTED-VALUE",
            EvalError::DivisionByZero => "E-EVAL-DIVISION-BY-ZERO",
            EvalError::NumericOverflow => "E-EVAL-NUMERIC-OVERFLOW",
            EvalError::PropertyOnValue { .. } => "E-EVAL-PROPERTY-ON-VALUE",
            EvalError::NotAValue { .. } => "E-EVAL-NOT-A-VALUE",
            EvalError::InvalidEnumValue { .. } => "E-EVAL-INVALID-ENUM-VALUE",
            EvalError::MissingParam { .. } => "E-EVAL-MISSING-PARAM",
        }
    }
}
