//! Charter Query - options, execution and paged results
//!
//! This crate ties the front half of the pipeline (parse, bind) to a
//! collection scan and wraps the outcome in a link-navigable page:
//! read the reserved `$`-options out of a URL, compile them against a
//! schema, run the plan, and page the survivors. [`run_query`] is the
//! whole journey in one call; [`compile_query`] and [`execute`] split
//! it for callers that reuse plans.

mod error;
mod executor;
mod options;
mod result;

pub use error::QueryError;
pub use executor::{compile_query, execute, run_query, QueryPlan};
pub use options::QueryOptions;
pub use result::{QueryResult, ResultEnvelope};
