//! Binding and evaluation of compiled query expressions.
//!
//! The binder turns a semantic query tree into a [`BoundExpr`]: property
//! names resolved to internal paths, literals parsed into typed values, and
//! every comparison tagged with its runtime rule. The evaluator then runs a
//! bound tree over items through the [`Entity`] trait, with lifted null
//! semantics throughout.
//!
//! [`Entity`]: charter_schema::Entity

mod binder;
mod bound;
mod error;
mod eval;

pub use binder::{bind_order_by, bind_predicate};
pub use bound::{
    ArithOp, BoundExpr, BoundOrdering, CompareKind, CompareOp, LogicalOp, MethodKind, NumericKind,
    ParamRef, QuantifierKind,
};
pub use error::{BindError, EvalError};
pub use eval::{compare_key_values, evaluate_key, evaluate_predicate, normalize_key};
