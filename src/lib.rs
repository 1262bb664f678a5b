//! Charter - a query compilation and paging engine
//!
//! This is the root workspace crate; the implementation lives in the
//! member crates. The re-exports cover the usual journey: parse query
//! text, bind it against a schema, execute over a collection, page the
//! results.

// Re-export main crates for convenience
pub use charter_ast as ast;
pub use charter_binder as binder;
pub use charter_parser as parser;
pub use charter_query as query;
pub use charter_schema as schema;
pub use charter_syntax as syntax;
