//! Charter AST - compiled query expression trees
//!
//! This crate defines the semantic AST produced by the tree compiler:
//! typed literal payloads, symbols with path continuations, binary and
//! unary operations, method calls, and lambdas. Nodes form a finite
//! acyclic tree; every child is exclusively owned by its parent.

mod datetime;
mod node;
mod operator;
mod printer;

pub use datetime::*;
pub use node::*;
pub use operator::*;
pub use printer::print;
