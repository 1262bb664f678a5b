//! Charter syntax trees - the parse-tree contract between front-ends
//! and the query compiler
//!
//! A front-end (the bundled text parser, or any external producer) hands
//! the compiler a [`SyntaxNode`] tree: kind tag, leaf text, ordered
//! children, and a span back into the query string. Grammar and
//! precedence are entirely the front-end's concern; consumers only walk
//! the shape defined here.

mod kind;
mod node;
mod span;

pub use kind::*;
pub use node::*;
pub use span::*;
