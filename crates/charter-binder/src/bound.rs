//! The bound expression tree: the fully resolved, executable form of a
//! query predicate or sort key. Every name has been mapped to an internal
//! property path, every literal parsed into a typed value, and every
//! comparison tagged with the kind that decides its runtime rule.

use charter_ast::SortDirection;
use charter_schema::{EnumDef, TypeRef, Value};

/// Which evaluation subject a property chain starts from.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamRef {
    /// The item the predicate currently applies to.
    This,
    /// A lambda parameter, addressed by name.
    Named(String),
}

/// Comparison operators surviving into the bound tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
}

impl CompareOp {
    pub fn word(&self) -> &'static str {
        match self {
            CompareOp::Eq => "eq",
            CompareOp::Ne => "ne",
            CompareOp::Gt => "gt",
            CompareOp::Ge => "ge",
            CompareOp::Lt => "lt",
            CompareOp::Le => "le",
        }
    }

    /// Equality and inequality; the only operators nullable and unordered
    /// kinds support.
    pub fn is_equality(&self) -> bool {
        matches!(self, CompareOp::Eq | CompareOp::Ne)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl ArithOp {
    pub fn word(&self) -> &'static str {
        match self {
            ArithOp::Add => "add",
            ArithOp::Sub => "sub",
            ArithOp::Mul => "mul",
            ArithOp::Div => "div",
            ArithOp::Mod => "mod",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
}

/// Numeric kind an arithmetic node computes in. Operands are promoted to
/// this kind before the operation runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericKind {
    Int,
    Float,
    Decimal,
}

/// The comparison rule selected once at bind time. Evaluation dispatches on
/// this tag instead of re-inspecting operand types per item.
#[derive(Debug, Clone, PartialEq)]
pub enum CompareKind {
    Bool,
    Int,
    Float,
    Decimal,
    String,
    Guid,
    DateTime,
    /// Compared by variant ordinal within the declaring enum.
    Enum(EnumDef),
    /// One side is the null literal; only presence is tested.
    Null,
}

impl CompareKind {
    pub fn display(&self) -> String {
        match self {
            CompareKind::Bool => "bool".to_string(),
            CompareKind::Int => "int".to_string(),
            CompareKind::Float => "float".to_string(),
            CompareKind::Decimal => "decimal".to_string(),
            CompareKind::String => "string".to_string(),
            CompareKind::Guid => "guid".to_string(),
            CompareKind::DateTime => "datetime".to_string(),
            CompareKind::Enum(def) => def.name.clone(),
            CompareKind::Null => "null".to_string(),
        }
    }
}

/// Built-in methods callable from query expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodKind {
    StartsWith,
    EndsWith,
    Contains,
    SubstringOf,
    ToLower,
    ToUpper,
    Trim,
    Length,
    IndexOf,
    Year,
    Month,
    Day,
    Hour,
    Minute,
    Second,
    Count,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantifierKind {
    Any,
    All,
}

/// A resolved, executable expression node.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundExpr {
    /// A literal, already parsed into its typed value.
    Constant(Value),
    /// An evaluation subject; meaningful as the base of a property chain.
    Param(ParamRef),
    /// One property hop, reading `internal_name` off the receiver.
    Property {
        receiver: Box<BoundExpr>,
        internal_name: String,
        ty: TypeRef,
    },
    /// Runtime narrowing: yields the receiver unchanged when its
    /// discriminator is assignable to the target type, null otherwise.
    Cast {
        expr: Box<BoundExpr>,
        target: String,
    },
    Compare {
        op: CompareOp,
        kind: CompareKind,
        left: Box<BoundExpr>,
        right: Box<BoundExpr>,
    },
    Arithmetic {
        op: ArithOp,
        kind: NumericKind,
        left: Box<BoundExpr>,
        right: Box<BoundExpr>,
    },
    Logical {
        op: LogicalOp,
        left: Box<BoundExpr>,
        right: Box<BoundExpr>,
    },
    Not(Box<BoundExpr>),
    /// Membership test against a literal array or a collection property.
    In {
        kind: CompareKind,
        needle: Box<BoundExpr>,
        haystack: Box<BoundExpr>,
    },
    /// A literal array; elements are constants of one kind.
    Array(Vec<Value>),
    Method {
        kind: MethodKind,
        receiver: Box<BoundExpr>,
        args: Vec<BoundExpr>,
    },
    /// Keyed lookup into a dictionary property.
    Index {
        receiver: Box<BoundExpr>,
        key: Box<BoundExpr>,
        ty: TypeRef,
    },
    /// `any` / `all` over a collection, with an optional item predicate.
    Quantifier {
        quantifier: QuantifierKind,
        source: Box<BoundExpr>,
        param: Option<String>,
        predicate: Option<Box<BoundExpr>>,
    },
}

impl BoundExpr {
    pub fn boxed(self) -> Box<BoundExpr> {
        Box::new(self)
    }
}

/// A bound sort key with its direction. Keys compare under the same kind
/// rules as predicates, with nulls ordered first ascending.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundOrdering {
    pub key: BoundExpr,
    pub kind: CompareKind,
    pub direction: SortDirection,
}
