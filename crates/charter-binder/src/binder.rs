//! Resolves a query syntax tree against a schema into a bound expression.
//!
//! Binding maps external property names onto internal paths, parses literals
//! into typed values using the kind expected at each site, and selects the
//! comparison rule for every operator once, so evaluation never re-inspects
//! operand types per item.

use charter_ast::{print, BinaryOperator, QueryNode, QueryNodeKind, SortDirection};
use charter_schema::{ResourceDef, ScalarKind, SchemaError, SchemaSet, TypeRef, Value};
use charter_syntax::Span;

use crate::bound::{
    ArithOp, BoundExpr, BoundOrdering, CompareKind, CompareOp, LogicalOp, MethodKind, NumericKind,
    ParamRef, QuantifierKind,
};
use crate::error::BindError;

/// Binds a filter expression. The result is guaranteed boolean.
pub fn bind_predicate(
    schema: &SchemaSet,
    root: &ResourceDef,
    node: &QueryNode,
) -> Result<BoundExpr, BindError> {
    let mut binder = Binder::new(schema, root);
    let typed = binder.bind(node)?;
    if !typed.ty.is_bool() {
        return Err(BindError::PredicateNotBoolean {
            found: typed.ty.display(),
            span: node.span,
        });
    }
    Ok(typed.expr)
}

/// Binds order-by clauses into sort keys. Keys must read as orderable
/// scalars or enums.
pub fn bind_order_by(
    schema: &SchemaSet,
    root: &ResourceDef,
    clauses: &[(QueryNode, SortDirection)],
) -> Result<Vec<BoundOrdering>, BindError> {
    let mut binder = Binder::new(schema, root);
    clauses
        .iter()
        .map(|(node, direction)| {
            let typed = binder.bind(node)?;
            let kind = binder.sort_kind(&typed.ty, node.span)?;
            Ok(BoundOrdering {
                key: typed.expr,
                kind,
                direction: *direction,
            })
        })
        .collect()
}

/// Static type of a bound subexpression.
#[derive(Debug, Clone, PartialEq)]
enum BoundType {
    Ty(TypeRef),
    /// The null literal; compatible with any nullable kind under eq/ne.
    Null,
}

impl BoundType {
    fn scalar(kind: ScalarKind) -> BoundType {
        BoundType::Ty(TypeRef::Scalar(kind))
    }

    fn scalar_kind(&self) -> Option<ScalarKind> {
        match self {
            BoundType::Ty(ty) => ty.scalar_kind(),
            BoundType::Null => None,
        }
    }

    fn is_bool(&self) -> bool {
        self.scalar_kind() == Some(ScalarKind::Bool)
    }

    fn display(&self) -> String {
        match self {
            BoundType::Ty(ty) => ty.display(),
            BoundType::Null => "null".to_string(),
        }
    }
}

/// A bound expression together with its static type.
#[derive(Debug)]
struct Typed {
    expr: BoundExpr,
    ty: BoundType,
}

impl Typed {
    fn new(expr: BoundExpr, ty: BoundType) -> Typed {
        Typed { expr, ty }
    }
}

struct Binder<'a> {
    schema: &'a SchemaSet,
    root: &'a ResourceDef,
    /// Lambda parameters in scope, innermost last.
    scope: Vec<(String, TypeRef)>,
}

impl<'a> Binder<'a> {
    fn new(schema: &'a SchemaSet, root: &'a ResourceDef) -> Binder<'a> {
        Binder {
            schema,
            root,
            scope: Vec::new(),
        }
    }

    fn bind(&mut self, node: &QueryNode) -> Result<Typed, BindError> {
        let span = node.span;
        match &node.kind {
            QueryNodeKind::Number(text) => self.bind_number(text, None, span),
            QueryNodeKind::Str(text) => Ok(Typed::new(
                BoundExpr::Constant(Value::String(text.clone())),
                BoundType::scalar(ScalarKind::String),
            )),
            QueryNodeKind::Guid(guid) => Ok(Typed::new(
                BoundExpr::Constant(Value::Guid(*guid)),
                BoundType::scalar(ScalarKind::Guid),
            )),
            QueryNodeKind::DateTime(value) => Ok(Typed::new(
                BoundExpr::Constant(Value::DateTime(value.clone())),
                BoundType::scalar(ScalarKind::DateTime),
            )),
            QueryNodeKind::Symbol { name, path } => {
                if path.is_empty() {
                    self.bind_symbol(name, span)
                } else {
                    self.bind(&desugar_path(None, name, span, path))
                }
            }
            QueryNodeKind::Binary { op, left, right } => {
                self.bind_binary(*op, left, right, span)
            }
            QueryNodeKind::Not(inner) => {
                let typed = self.bind(inner)?;
                if !typed.ty.is_bool() {
                    return Err(BindError::TypeMismatch {
                        expected: "bool".to_string(),
                        found: typed.ty.display(),
                        span: inner.span,
                    });
                }
                Ok(Typed::new(BoundExpr::Not(typed.expr.boxed()), typed.ty))
            }
            QueryNodeKind::MethodCall { name, args } => self.bind_method(None, name, args, span),
            QueryNodeKind::IndexerAccess { name, args } => {
                let receiver = self.bind_symbol(name, span)?;
                self.bind_index(receiver, name, args, span)
            }
            QueryNodeKind::TypeName(_) => Err(BindError::UnresolvedSyntax {
                kind: "type literal".to_string(),
                span,
            }),
            QueryNodeKind::Lambda(_) => Err(BindError::UnresolvedSyntax {
                kind: "lambda".to_string(),
                span,
            }),
            QueryNodeKind::Array(_) => Err(BindError::UnresolvedSyntax {
                kind: "array literal".to_string(),
                span,
            }),
            QueryNodeKind::Unhandled { kind } => Err(BindError::UnresolvedSyntax {
                kind: kind.describe().to_string(),
                span,
            }),
        }
    }

    fn bind_binary(
        &mut self,
        op: BinaryOperator,
        left: &QueryNode,
        right: &QueryNode,
        span: Span,
    ) -> Result<Typed, BindError> {
        match op {
            BinaryOperator::Dot => self.bind_dot(left, right, span),
            BinaryOperator::As => self.bind_cast(left, right, span),
            BinaryOperator::In => self.bind_in(left, right, span),
            BinaryOperator::And => self.bind_logical(LogicalOp::And, left, right, span),
            BinaryOperator::Or => self.bind_logical(LogicalOp::Or, left, right, span),
            BinaryOperator::Eq => self.bind_comparison(CompareOp::Eq, left, right, span),
            BinaryOperator::Ne => self.bind_comparison(CompareOp::Ne, left, right, span),
            BinaryOperator::Gt => self.bind_comparison(CompareOp::Gt, left, right, span),
            BinaryOperator::Ge => self.bind_comparison(CompareOp::Ge, left, right, span),
            BinaryOperator::Lt => self.bind_comparison(CompareOp::Lt, left, right, span),
            BinaryOperator::Le => self.bind_comparison(CompareOp::Le, left, right, span),
            BinaryOperator::Add => self.bind_arithmetic(ArithOp::Add, left, right, span),
            BinaryOperator::Sub => self.bind_arithmetic(ArithOp::Sub, left, right, span),
            BinaryOperator::Mul => self.bind_arithmetic(ArithOp::Mul, left, right, span),
            BinaryOperator::Div => self.bind_arithmetic(ArithOp::Div, left, right, span),
            BinaryOperator::Mod => self.bind_arithmetic(ArithOp::Mod, left, right, span),
        }
    }

    // === Symbols and property access ===

    fn bind_symbol(&mut self, name: &str, span: Span) -> Result<Typed, BindError> {
        match name {
            "true" => {
                return Ok(Typed::new(
                    BoundExpr::Constant(Value::Bool(true)),
                    BoundType::scalar(ScalarKind::Bool),
                ))
            }
            "false" => {
                return Ok(Typed::new(
                    BoundExpr::Constant(Value::Bool(false)),
                    BoundType::scalar(ScalarKind::Bool),
                ))
            }
            "null" => {
                return Ok(Typed::new(BoundExpr::Constant(Value::Null), BoundType::Null))
            }
            "this" => {
                return Ok(Typed::new(
                    BoundExpr::Param(ParamRef::This),
                    BoundType::Ty(TypeRef::Resource(self.root.name.clone())),
                ))
            }
            _ => {}
        }

        // Lambda parameters shadow outer ones and root properties.
        if let Some((pname, ty)) = self
            .scope
            .iter()
            .rev()
            .find(|(pname, _)| pname == name)
            .cloned()
        {
            return Ok(Typed::new(
                BoundExpr::Param(ParamRef::Named(pname)),
                BoundType::Ty(ty),
            ));
        }

        // Bare names resolve as properties of the queried type.
        let receiver = Typed::new(
            BoundExpr::Param(ParamRef::This),
            BoundType::Ty(TypeRef::Resource(self.root.name.clone())),
        );
        self.bind_property(receiver, None, name, span)
    }

    fn bind_property(
        &mut self,
        receiver: Typed,
        receiver_desc: Option<&str>,
        name: &str,
        span: Span,
    ) -> Result<Typed, BindError> {
        let owner = match &receiver.ty {
            BoundType::Ty(TypeRef::Resource(type_name)) => self
                .schema
                .resource(type_name)
                .map_err(|e| BindError::schema(e, span))?,
            BoundType::Ty(TypeRef::Collection(_)) => {
                return Err(BindError::CollectionTraversal {
                    property: name.to_string(),
                    span,
                })
            }
            other => {
                return Err(BindError::TypeMismatch {
                    expected: "a resource".to_string(),
                    found: other.display(),
                    span,
                })
            }
        };

        let property = self.schema.find_property(owner, name).ok_or_else(|| {
            let full_path = match receiver_desc {
                Some(desc) => format!("{desc}.{name}"),
                None => name.to_string(),
            };
            BindError::schema(
                SchemaError::UnknownProperty {
                    type_name: owner.name.clone(),
                    segment: name.to_string(),
                    full_path,
                },
                span,
            )
        })?;

        Ok(Typed::new(
            BoundExpr::Property {
                receiver: receiver.expr.boxed(),
                internal_name: property.internal_name.clone(),
                ty: property.ty.clone(),
            },
            BoundType::Ty(property.ty.clone()),
        ))
    }

    fn bind_dot(
        &mut self,
        left: &QueryNode,
        right: &QueryNode,
        span: Span,
    ) -> Result<Typed, BindError> {
        match &right.kind {
            QueryNodeKind::Symbol { name, path } => {
                if !path.is_empty() {
                    return self.bind(&desugar_path(Some(left), name, right.span, path));
                }
                let receiver = self.bind(left)?;
                let desc = print(left);
                self.bind_property(receiver, Some(&desc), name, right.span)
            }
            QueryNodeKind::MethodCall { name, args } => {
                self.bind_method(Some(left), name, args, span)
            }
            QueryNodeKind::IndexerAccess { name, args } => {
                let receiver = self.bind(left)?;
                let desc = print(left);
                let subject = self.bind_property(receiver, Some(&desc), name, right.span)?;
                self.bind_index(subject, name, args, span)
            }
            _ => Err(BindError::UnresolvedSyntax {
                kind: "expression after '.'".to_string(),
                span: right.span,
            }),
        }
    }

    fn bind_cast(
        &mut self,
        left: &QueryNode,
        right: &QueryNode,
        span: Span,
    ) -> Result<Typed, BindError> {
        let target_name = match &right.kind {
            QueryNodeKind::TypeName(name) => name,
            _ => {
                return Err(BindError::TypeMismatch {
                    expected: "a type literal".to_string(),
                    found: "an expression".to_string(),
                    span: right.span,
                })
            }
        };
        let target = self
            .schema
            .resource(target_name)
            .map_err(|e| BindError::schema(e, right.span))?;

        let subject = self.bind(left)?;
        match &subject.ty {
            BoundType::Ty(TypeRef::Resource(_)) => {}
            other => {
                return Err(BindError::TypeMismatch {
                    expected: "a resource".to_string(),
                    found: other.display(),
                    span: left.span,
                })
            }
        }

        Ok(Typed::new(
            BoundExpr::Cast {
                expr: subject.expr.boxed(),
                target: target.name.clone(),
            },
            BoundType::Ty(TypeRef::Resource(target.name.clone())),
        ))
    }

    // === Comparisons and arithmetic ===

    fn bind_comparison(
        &mut self,
        op: CompareOp,
        left: &QueryNode,
        right: &QueryNode,
        span: Span,
    ) -> Result<Typed, BindError> {
        // Literal operands are parsed against the kind of the other side,
        // so `Age gt 3` and `Price lt 10.5` land in the property's kind.
        let (left_typed, right_typed) = if is_literal(left) && !is_literal(right) {
            let r = self.bind(right)?;
            let l = self.bind_literal(left, Some(&r.ty))?;
            (l, r)
        } else if is_literal(right) && !is_literal(left) {
            let l = self.bind(left)?;
            let r = self.bind_literal(right, Some(&l.ty))?;
            (l, r)
        } else {
            (self.bind(left)?, self.bind(right)?)
        };

        let kind = self.comparison_kind(&left_typed.ty, &right_typed.ty, op, span)?;
        Ok(Typed::new(
            BoundExpr::Compare {
                op,
                kind,
                left: left_typed.expr.boxed(),
                right: right_typed.expr.boxed(),
            },
            BoundType::scalar(ScalarKind::Bool),
        ))
    }

    /// Decides the comparison rule for a pair of operand types, or rejects
    /// the pair. Ints promote to float or decimal; float and decimal never
    /// mix; unordered kinds only support equality.
    fn comparison_kind(
        &self,
        left: &BoundType,
        right: &BoundType,
        op: CompareOp,
        span: Span,
    ) -> Result<CompareKind, BindError> {
        if matches!(left, BoundType::Null) || matches!(right, BoundType::Null) {
            if !op.is_equality() {
                return Err(BindError::NullComparison { span });
            }
            return Ok(CompareKind::Null);
        }

        let mismatch = || BindError::TypeMismatch {
            expected: left.display(),
            found: right.display(),
            span,
        };

        if let (BoundType::Ty(TypeRef::Enum(l)), BoundType::Ty(TypeRef::Enum(r))) = (left, right) {
            if !l.eq_ignore_ascii_case(r) {
                return Err(mismatch());
            }
            let def = self
                .schema
                .enum_def(l)
                .map_err(|e| BindError::schema(e, span))?;
            return Ok(CompareKind::Enum(def.clone()));
        }

        let (lk, rk) = match (left.scalar_kind(), right.scalar_kind()) {
            (Some(l), Some(r)) => (l, r),
            _ => return Err(mismatch()),
        };

        use ScalarKind::*;
        let kind = match (lk, rk) {
            (Int, Int) => CompareKind::Int,
            (Int, Float) | (Float, Int) | (Float, Float) => CompareKind::Float,
            (Int, Decimal) | (Decimal, Int) | (Decimal, Decimal) => CompareKind::Decimal,
            (Float, Decimal) | (Decimal, Float) => return Err(mismatch()),
            (String, String) => CompareKind::String,
            (Bool, Bool) => CompareKind::Bool,
            (Guid, Guid) => CompareKind::Guid,
            (DateTime, DateTime) => CompareKind::DateTime,
            _ => return Err(mismatch()),
        };

        let ordered = !matches!(kind, CompareKind::Bool | CompareKind::Guid);
        if !ordered && !op.is_equality() {
            return Err(BindError::ComparisonNotSupported {
                op: op.word().to_string(),
                kind: kind.display(),
                span,
            });
        }
        Ok(kind)
    }

    fn bind_logical(
        &mut self,
        op: LogicalOp,
        left: &QueryNode,
        right: &QueryNode,
        _span: Span,
    ) -> Result<Typed, BindError> {
        let l = self.bind(left)?;
        if !l.ty.is_bool() {
            return Err(BindError::TypeMismatch {
                expected: "bool".to_string(),
                found: l.ty.display(),
                span: left.span,
            });
        }
        let r = self.bind(right)?;
        if !r.ty.is_bool() {
            return Err(BindError::TypeMismatch {
                expected: "bool".to_string(),
                found: r.ty.display(),
                span: right.span,
            });
        }
        Ok(Typed::new(
            BoundExpr::Logical {
                op,
                left: l.expr.boxed(),
                right: r.expr.boxed(),
            },
            BoundType::scalar(ScalarKind::Bool),
        ))
    }

    fn bind_arithmetic(
        &mut self,
        op: ArithOp,
        left: &QueryNode,
        right: &QueryNode,
        span: Span,
    ) -> Result<Typed, BindError> {
        let (left_typed, right_typed) = if is_literal(left) && !is_literal(right) {
            let r = self.bind(right)?;
            let l = self.bind_literal(left, Some(&r.ty))?;
            (l, r)
        } else if is_literal(right) && !is_literal(left) {
            let l = self.bind(left)?;
            let r = self.bind_literal(right, Some(&l.ty))?;
            (l, r)
        } else {
            (self.bind(left)?, self.bind(right)?)
        };

        let mismatch = |found: std::string::String, at: Span| BindError::TypeMismatch {
            expected: "a numeric value".to_string(),
            found,
            span: at,
        };
        let lk = left_typed
            .ty
            .scalar_kind()
            .filter(|k| k.is_numeric())
            .ok_or_else(|| mismatch(left_typed.ty.display(), left.span))?;
        let rk = right_typed
            .ty
            .scalar_kind()
            .filter(|k| k.is_numeric())
            .ok_or_else(|| mismatch(right_typed.ty.display(), right.span))?;

        use ScalarKind::*;
        let kind = match (lk, rk) {
            (Int, Int) => NumericKind::Int,
            (Int, Float) | (Float, Int) | (Float, Float) => NumericKind::Float,
            (Int, Decimal) | (Decimal, Int) | (Decimal, Decimal) => NumericKind::Decimal,
            (Float, Decimal) | (Decimal, Float) => {
                return Err(BindError::TypeMismatch {
                    expected: left_typed.ty.display(),
                    found: right_typed.ty.display(),
                    span,
                })
            }
            _ => return Err(mismatch(right_typed.ty.display(), span)),
        };
        let result_kind = match kind {
            NumericKind::Int => ScalarKind::Int,
            NumericKind::Float => ScalarKind::Float,
            NumericKind::Decimal => ScalarKind::Decimal,
        };

        Ok(Typed::new(
            BoundExpr::Arithmetic {
                op,
                kind,
                left: left_typed.expr.boxed(),
                right: right_typed.expr.boxed(),
            },
            BoundType::scalar(result_kind),
        ))
    }

    // === Membership ===

    fn bind_in(
        &mut self,
        left: &QueryNode,
        right: &QueryNode,
        span: Span,
    ) -> Result<Typed, BindError> {
        let needle = self.bind(left)?;

        let (haystack, element_ty) = match &right.kind {
            QueryNodeKind::Array(items) => {
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    let typed = self.bind_literal(item, Some(&needle.ty))?;
                    // Each element must be a literal comparable with the
                    // needle's kind.
                    self.comparison_kind(&needle.ty, &typed.ty, CompareOp::Eq, item.span)?;
                    match typed.expr {
                        BoundExpr::Constant(value) => values.push(value),
                        _ => {
                            return Err(BindError::TypeMismatch {
                                expected: "a literal".to_string(),
                                found: "an expression".to_string(),
                                span: item.span,
                            })
                        }
                    }
                }
                (BoundExpr::Array(values), needle.ty.clone())
            }
            _ => {
                let source = self.bind(right)?;
                match source.ty {
                    BoundType::Ty(TypeRef::Collection(element)) => {
                        (source.expr, BoundType::Ty(*element))
                    }
                    other => {
                        return Err(BindError::TypeMismatch {
                            expected: "an array or collection".to_string(),
                            found: other.display(),
                            span: right.span,
                        })
                    }
                }
            }
        };

        let kind = self.comparison_kind(&needle.ty, &element_ty, CompareOp::Eq, span)?;
        Ok(Typed::new(
            BoundExpr::In {
                kind,
                needle: needle.expr.boxed(),
                haystack: haystack.boxed(),
            },
            BoundType::scalar(ScalarKind::Bool),
        ))
    }

    // === Literals ===

    fn bind_literal(
        &mut self,
        node: &QueryNode,
        expected: Option<&BoundType>,
    ) -> Result<Typed, BindError> {
        match &node.kind {
            QueryNodeKind::Number(text) => self.bind_number(text, expected, node.span),
            QueryNodeKind::Str(text) => {
                if let Some(BoundType::Ty(TypeRef::Enum(enum_name))) = expected {
                    let def = self
                        .schema
                        .enum_def(enum_name)
                        .map_err(|e| BindError::schema(e, node.span))?;
                    let ordinal = def.ordinal(text).ok_or_else(|| {
                        BindError::UnknownEnumVariant {
                            enum_name: def.name.clone(),
                            variant: text.clone(),
                            span: node.span,
                        }
                    })?;
                    // Stored in declared casing so ordinal lookup at runtime
                    // is exact.
                    return Ok(Typed::new(
                        BoundExpr::Constant(Value::String(def.variants[ordinal].clone())),
                        BoundType::Ty(TypeRef::Enum(def.name.clone())),
                    ));
                }
                Ok(Typed::new(
                    BoundExpr::Constant(Value::String(text.clone())),
                    BoundType::scalar(ScalarKind::String),
                ))
            }
            _ => self.bind(node),
        }
    }

    /// Parses a numeric literal in the kind expected at its use site.
    /// Without an expectation, fractional text reads as float and whole
    /// text as int.
    fn bind_number(
        &self,
        text: &str,
        expected: Option<&BoundType>,
        span: Span,
    ) -> Result<Typed, BindError> {
        let invalid = || BindError::InvalidNumber {
            text: text.to_string(),
            span,
        };
        match expected.and_then(|t| t.scalar_kind()) {
            Some(ScalarKind::Int) => {
                // Fractional text against an int site stays a float literal;
                // the comparison then promotes to the float rule.
                if let Ok(value) = text.parse::<i64>() {
                    return Ok(Typed::new(
                        BoundExpr::Constant(Value::Int(value)),
                        BoundType::scalar(ScalarKind::Int),
                    ));
                }
                let value: f64 = text.parse().map_err(|_| invalid())?;
                Ok(Typed::new(
                    BoundExpr::Constant(Value::Float(value)),
                    BoundType::scalar(ScalarKind::Float),
                ))
            }
            Some(ScalarKind::Float) => {
                let value: f64 = text.parse().map_err(|_| invalid())?;
                Ok(Typed::new(
                    BoundExpr::Constant(Value::Float(value)),
                    BoundType::scalar(ScalarKind::Float),
                ))
            }
            Some(ScalarKind::Decimal) => {
                let value = text.parse().map_err(|_| invalid())?;
                Ok(Typed::new(
                    BoundExpr::Constant(Value::Decimal(value)),
                    BoundType::scalar(ScalarKind::Decimal),
                ))
            }
            _ => {
                if text.contains(['.', 'e', 'E']) {
                    let value: f64 = text.parse().map_err(|_| invalid())?;
                    Ok(Typed::new(
                        BoundExpr::Constant(Value::Float(value)),
                        BoundType::scalar(ScalarKind::Float),
                    ))
                } else {
                    let value: i64 = text.parse().map_err(|_| invalid())?;
                    Ok(Typed::new(
                        BoundExpr::Constant(Value::Int(value)),
                        BoundType::scalar(ScalarKind::Int),
                    ))
                }
            }
        }
    }

    // === Methods ===

    fn bind_method(
        &mut self,
        receiver: Option<&QueryNode>,
        name: &str,
        args: &[QueryNode],
        span: Span,
    ) -> Result<Typed, BindError> {
        let lowered = name.to_ascii_lowercase();
        match lowered.as_str() {
            "any" => self.bind_quantifier(QuantifierKind::Any, receiver, args, &lowered, span),
            "all" => self.bind_quantifier(QuantifierKind::All, receiver, args, &lowered, span),
            "count" => {
                let (subject_node, rest) = split_subject(receiver, args, &lowered, span)?;
                require_arity(&lowered, 0, rest.len(), span)?;
                let subject = self.bind(subject_node)?;
                if !matches!(subject.ty, BoundType::Ty(TypeRef::Collection(_))) {
                    return Err(BindError::TypeMismatch {
                        expected: "a collection".to_string(),
                        found: subject.ty.display(),
                        span: subject_node.span,
                    });
                }
                Ok(Typed::new(
                    BoundExpr::Method {
                        kind: MethodKind::Count,
                        receiver: subject.expr.boxed(),
                        args: Vec::new(),
                    },
                    BoundType::scalar(ScalarKind::Int),
                ))
            }
            "substringof" => {
                // OData argument order: substringof(needle, haystack).
                let (subject_node, needle_node) = match receiver {
                    Some(subject) => {
                        require_arity(&lowered, 1, args.len(), span)?;
                        (subject, &args[0])
                    }
                    None => {
                        require_arity(&lowered, 2, args.len(), span)?;
                        (&args[1], &args[0])
                    }
                };
                let subject = self.bind(subject_node)?;
                self.require_kind(&subject, ScalarKind::String, subject_node.span)?;
                let needle = self.bind_string_arg(needle_node)?;
                Ok(Typed::new(
                    BoundExpr::Method {
                        kind: MethodKind::SubstringOf,
                        receiver: subject.expr.boxed(),
                        args: vec![needle],
                    },
                    BoundType::scalar(ScalarKind::Bool),
                ))
            }
            _ => self.bind_simple_method(&lowered, receiver, args, span),
        }
    }

    fn bind_simple_method(
        &mut self,
        name: &str,
        receiver: Option<&QueryNode>,
        args: &[QueryNode],
        span: Span,
    ) -> Result<Typed, BindError> {
        use MethodKind::*;
        use ScalarKind::*;
        let (kind, subject_kind, arg_count, result) = match name {
            "startswith" => (StartsWith, String, 1, Bool),
            "endswith" => (EndsWith, String, 1, Bool),
            "contains" => (Contains, String, 1, Bool),
            "tolower" => (ToLower, String, 0, String),
            "toupper" => (ToUpper, String, 0, String),
            "trim" => (Trim, String, 0, String),
            "length" => (Length, String, 0, Int),
            "indexof" => (IndexOf, String, 1, Int),
            "year" => (Year, DateTime, 0, Int),
            "month" => (Month, DateTime, 0, Int),
            "day" => (Day, DateTime, 0, Int),
            "hour" => (Hour, DateTime, 0, Int),
            "minute" => (Minute, DateTime, 0, Int),
            "second" => (Second, DateTime, 0, Int),
            _ => {
                return Err(BindError::UnknownMethod {
                    name: name.to_string(),
                    span,
                })
            }
        };

        let (subject_node, rest) = split_subject(receiver, args, name, span)?;
        require_arity(name, arg_count, rest.len(), span)?;

        let subject = self.bind(subject_node)?;
        self.require_kind(&subject, subject_kind, subject_node.span)?;

        let mut bound_args = Vec::with_capacity(rest.len());
        for arg in rest {
            // String methods only take string arguments.
            bound_args.push(self.bind_string_arg(arg)?);
        }

        Ok(Typed::new(
            BoundExpr::Method {
                kind,
                receiver: subject.expr.boxed(),
                args: bound_args,
            },
            BoundType::scalar(result),
        ))
    }

    fn bind_string_arg(&mut self, node: &QueryNode) -> Result<BoundExpr, BindError> {
        let expected = BoundType::scalar(ScalarKind::String);
        let typed = self.bind_literal(node, Some(&expected))?;
        self.require_kind(&typed, ScalarKind::String, node.span)?;
        Ok(typed.expr)
    }

    fn require_kind(
        &self,
        typed: &Typed,
        kind: ScalarKind,
        span: Span,
    ) -> Result<(), BindError> {
        if typed.ty.scalar_kind() != Some(kind) {
            return Err(BindError::TypeMismatch {
                expected: kind.display().to_string(),
                found: typed.ty.display(),
                span,
            });
        }
        Ok(())
    }

    fn bind_quantifier(
        &mut self,
        quantifier: QuantifierKind,
        receiver: Option<&QueryNode>,
        args: &[QueryNode],
        name: &str,
        span: Span,
    ) -> Result<Typed, BindError> {
        let (source_node, rest) = split_subject(receiver, args, name, span)?;
        let source = self.bind(source_node)?;
        let element = match &source.ty {
            BoundType::Ty(TypeRef::Collection(element)) => (**element).clone(),
            other => {
                return Err(BindError::TypeMismatch {
                    expected: "a collection".to_string(),
                    found: other.display(),
                    span: source_node.span,
                })
            }
        };

        let lambda = match rest {
            [] => None,
            [node] => match &node.kind {
                QueryNodeKind::Lambda(children) => Some((node, children)),
                _ => {
                    return Err(BindError::MissingLambda {
                        name: name.to_string(),
                        span: node.span,
                    })
                }
            },
            _ => {
                return Err(BindError::MethodArity {
                    name: name.to_string(),
                    expected: 1,
                    found: rest.len(),
                    span,
                })
            }
        };

        let (param, predicate) = match lambda {
            None => {
                if quantifier == QuantifierKind::All {
                    return Err(BindError::MissingLambda {
                        name: name.to_string(),
                        span,
                    });
                }
                (None, None)
            }
            Some((node, children)) => {
                let (param_node, body) = match children.as_slice() {
                    [param, body] => (param, body),
                    _ => {
                        return Err(BindError::UnresolvedSyntax {
                            kind: "lambda".to_string(),
                            span: node.span,
                        })
                    }
                };
                let param_name = match &param_node.kind {
                    QueryNodeKind::Symbol { name, .. } => name.clone(),
                    _ => {
                        return Err(BindError::UnresolvedSyntax {
                            kind: "lambda parameter".to_string(),
                            span: param_node.span,
                        })
                    }
                };

                self.scope.push((param_name.clone(), element));
                let bound_body = self.bind(body);
                self.scope.pop();
                let bound_body = bound_body?;
                if !bound_body.ty.is_bool() {
                    return Err(BindError::PredicateNotBoolean {
                        found: bound_body.ty.display(),
                        span: body.span,
                    });
                }
                (Some(param_name), Some(bound_body.expr.boxed()))
            }
        };

        Ok(Typed::new(
            BoundExpr::Quantifier {
                quantifier,
                source: source.expr.boxed(),
                param,
                predicate,
            },
            BoundType::scalar(ScalarKind::Bool),
        ))
    }

    // === Indexers ===

    fn bind_index(
        &mut self,
        subject: Typed,
        name: &str,
        args: &[QueryNode],
        span: Span,
    ) -> Result<Typed, BindError> {
        if args.len() != 1 {
            return Err(BindError::MethodArity {
                name: name.to_string(),
                expected: 1,
                found: args.len(),
                span,
            });
        }
        let (key_kind, value_ty) = match &subject.ty {
            BoundType::Ty(TypeRef::Dictionary(value)) => (ScalarKind::String, (**value).clone()),
            BoundType::Ty(TypeRef::Collection(element)) => (ScalarKind::Int, (**element).clone()),
            other => {
                return Err(BindError::TypeMismatch {
                    expected: "a dictionary or collection".to_string(),
                    found: other.display(),
                    span,
                })
            }
        };

        let expected = BoundType::scalar(key_kind);
        let key = self.bind_literal(&args[0], Some(&expected))?;
        self.require_kind(&key, key_kind, args[0].span)?;

        Ok(Typed::new(
            BoundExpr::Index {
                receiver: subject.expr.boxed(),
                key: key.expr.boxed(),
                ty: value_ty.clone(),
            },
            BoundType::Ty(value_ty),
        ))
    }

    // === Ordering ===

    fn sort_kind(&self, ty: &BoundType, span: Span) -> Result<CompareKind, BindError> {
        match ty {
            BoundType::Ty(TypeRef::Enum(name)) => {
                let def = self
                    .schema
                    .enum_def(name)
                    .map_err(|e| BindError::schema(e, span))?;
                Ok(CompareKind::Enum(def.clone()))
            }
            BoundType::Ty(TypeRef::Scalar(kind)) => Ok(match kind {
                ScalarKind::Bool => CompareKind::Bool,
                ScalarKind::Int => CompareKind::Int,
                ScalarKind::Float => CompareKind::Float,
                ScalarKind::Decimal => CompareKind::Decimal,
                ScalarKind::String => CompareKind::String,
                ScalarKind::Guid => CompareKind::Guid,
                ScalarKind::DateTime => CompareKind::DateTime,
            }),
            other => Err(BindError::NotSortable {
                ty: other.display(),
                span,
            }),
        }
    }
}

fn is_literal(node: &QueryNode) -> bool {
    matches!(node.kind, QueryNodeKind::Number(_) | QueryNodeKind::Str(_))
}

/// Rewrites a path-carrying symbol into the left-nested dot chain it
/// abbreviates, optionally rooted at an explicit receiver. Front-ends may
/// hand the compiler identifier nodes with path continuations attached
/// instead of explicit member-access operators; both spellings bind alike.
fn desugar_path(
    receiver: Option<&QueryNode>,
    name: &str,
    name_span: Span,
    path: &[QueryNode],
) -> QueryNode {
    let base = QueryNode::new(
        QueryNodeKind::Symbol {
            name: name.to_string(),
            path: Vec::new(),
        },
        name_span,
    );
    let mut chain = match receiver {
        Some(left) => dot(left.clone(), base),
        None => base,
    };
    for member in path {
        chain = dot(chain, member.clone());
    }
    chain
}

fn dot(left: QueryNode, right: QueryNode) -> QueryNode {
    let span = left.span.merge(right.span);
    QueryNode::new(
        QueryNodeKind::Binary {
            op: BinaryOperator::Dot,
            left: Box::new(left),
            right: Box::new(right),
        },
        span,
    )
}

/// Instance calls carry the subject before the dot; free-function calls
/// carry it as the first argument.
fn split_subject<'n>(
    receiver: Option<&'n QueryNode>,
    args: &'n [QueryNode],
    name: &str,
    span: Span,
) -> Result<(&'n QueryNode, &'n [QueryNode]), BindError> {
    match receiver {
        Some(subject) => Ok((subject, args)),
        None => match args.split_first() {
            Some((subject, rest)) => Ok((subject, rest)),
            None => Err(BindError::MethodArity {
                name: name.to_string(),
                expected: 1,
                found: 0,
                span,
            }),
        },
    }
}

fn require_arity(name: &str, expected: usize, found: usize, span: Span) -> Result<(), BindError> {
    if found != expected {
        return Err(BindError::MethodArity {
            name: name.to_string(),
            expected,
            found,
            span,
        });
    }
    Ok(())
}
