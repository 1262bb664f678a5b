//! Binary operator tags

use serde::{Deserialize, Serialize};
use std::fmt;

/// Binary operators of the query language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOperator {
    // Logical
    And,
    Or,

    // Arithmetic
    Mul,
    Mod,
    Add,
    Div,
    Sub,

    // Comparison
    Gt,
    Lt,
    Ge,
    Le,
    Eq,
    Ne,

    // Navigation and type narrowing
    Dot,
    As,

    // Membership
    In,
}

impl BinaryOperator {
    /// The operator's word form in query text
    pub fn word(&self) -> &'static str {
        match self {
            BinaryOperator::And => "and",
            BinaryOperator::Or => "or",
            BinaryOperator::Mul => "mul",
            BinaryOperator::Mod => "mod",
            BinaryOperator::Add => "add",
            BinaryOperator::Div => "div",
            BinaryOperator::Sub => "sub",
            BinaryOperator::Gt => "gt",
            BinaryOperator::Lt => "lt",
            BinaryOperator::Ge => "ge",
            BinaryOperator::Le => "le",
            BinaryOperator::Eq => "eq",
            BinaryOperator::Ne => "ne",
            BinaryOperator::Dot => ".",
            BinaryOperator::As => "as",
            BinaryOperator::In => "in",
        }
    }

    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            BinaryOperator::Gt
                | BinaryOperator::Lt
                | BinaryOperator::Ge
                | BinaryOperator::Le
                | BinaryOperator::Eq
                | BinaryOperator::Ne
        )
    }

    pub fn is_arithmetic(&self) -> bool {
        matches!(
            self,
            BinaryOperator::Mul
                | BinaryOperator::Mod
                | BinaryOperator::Add
                | BinaryOperator::Div
                | BinaryOperator::Sub
        )
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.word())
    }
}

/// Direction of an `$orderby` clause
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}
