//! The umbrella error every stage of a query converges into.

use charter_binder::{BindError, EvalError};
use charter_parser::ParseError;
use charter_schema::SchemaError;
use thiserror::Error;

/// Anything that can stop a query between URL and result page. Stage
/// errors keep their own structure; this type only gathers them so the
/// pipeline reads as a chain of `?`.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Bind(#[from] BindError),

    #[error(transparent)]
    Eval(#[from] EvalError),

    /// A reserved `$`-parameter carried a value it cannot take.
    #[error("invalid value '{value}' for query parameter {name}")]
    InvalidParameter { name: String, value: String },

    /// A result page was asked to mutate itself.
    #[error("query results are read-only")]
    ReadOnlyResult,

    /// A page window that does not fit inside its own total.
    #[error("result window overruns the total: skip {skip} plus {count} items exceeds {total_count}")]
    InvalidWindow {
        skip: usize,
        count: usize,
        total_count: usize,
    },
}

impl QueryError {
    /// Stable diagnostic code for logs and machine-readable output.
    pub fn code(&self) -> &'static str {
        match self {
            QueryError::Parse(_) => "E-QUERY-PARSE",
            QueryError::Schema(err) => err.code(),
            QueryError::Bind(err) => err.code(),
            QueryError::Eval(err) => err.code(),
            QueryError::InvalidParameter { .. } => "E-QUERY-INVALID-PARAMETER",
            QueryError::ReadOnlyResult => "E-QUERY-READ-ONLY",
            QueryError::InvalidWindow { .. } => "E-QUERY-INVALID-WINDOW",
        }
    }
}
