//! In-memory evaluation of bound expressions against entities.
//!
//! Missing properties and explicit nulls flow through lifted semantics:
//! arithmetic and methods on null yield null, ordering comparisons against
//! null are false, and equality treats two nulls as equal. A predicate
//! that reads as null is simply false.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use charter_ast::DateTimeValue;
use charter_schema::{Entity, SchemaSet, Value};
use chrono::{Datelike, Timelike};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::bound::{
    ArithOp, BoundExpr, CompareKind, CompareOp, LogicalOp, MethodKind, NumericKind, ParamRef,
    QuantifierKind,
};
use crate::error::EvalError;

/// Evaluates a bound predicate against one item.
pub fn evaluate_predicate<E: Entity>(
    schema: &SchemaSet,
    expr: &BoundExpr,
    item: &E,
) -> Result<bool, EvalError> {
    Evaluator::new(schema, item).truth(expr)
}

/// Evaluates a bound sort key against one item.
pub fn evaluate_key<E: Entity>(
    schema: &SchemaSet,
    expr: &BoundExpr,
    item: &E,
) -> Result<Value, EvalError> {
    Evaluator::new(schema, item).value(expr)
}

/// Total order over key values of one kind, with nulls first. This is the
/// ascending order; callers flip it for descending keys.
pub fn compare_key_values(
    kind: &CompareKind,
    left: &Value,
    right: &Value,
) -> Result<Ordering, EvalError> {
    match (left.is_null(), right.is_null()) {
        (true, true) => Ok(Ordering::Equal),
        (true, false) => Ok(Ordering::Less),
        (false, true) => Ok(Ordering::Greater),
        (false, false) => ord_values(kind, left, right),
    }
}

/// Canonicalizes one sort key value for its comparison kind, folding loose
/// storage forms (guid and datetime strings, enum variant names) into typed
/// values up front. Over normalized keys [`compare_key_values`] cannot fail,
/// which lets callers order a whole batch inside a plain sort comparator.
pub fn normalize_key(kind: &CompareKind, value: Value) -> Result<Value, EvalError> {
    if value.is_null() {
        return Ok(Value::Null);
    }
    Ok(match kind {
        CompareKind::Null => value,
        CompareKind::Bool => Value::Bool(to_bool(&value)?),
        CompareKind::Int => Value::Int(to_int(&value)?),
        CompareKind::Float => Value::Float(to_float(&value)?),
        CompareKind::Decimal => Value::Decimal(to_decimal(&value)?),
        CompareKind::String => match value {
            Value::String(_) => value,
            other => {
                return Err(EvalError::UnexpectedValue {
                    expected: "string".to_string(),
                    found: other.kind_name().to_string(),
                })
            }
        },
        CompareKind::Guid => Value::Guid(to_guid(&value)?),
        CompareKind::DateTime => Value::DateTime(to_datetime(&value)?),
        CompareKind::Enum(def) => Value::Int(enum_ordinal(def, &value)? as i64),
    })
}

struct Evaluator<'a, E: Entity> {
    schema: &'a SchemaSet,
    root: &'a E,
    /// Lambda bindings in scope, innermost last.
    locals: Vec<(String, Value)>,
}

/// What a property chain is currently reading from. The root entity is
/// addressed through the [`Entity`] trait and never materialized whole.
enum Subject {
    Root,
    Val(Value),
}

impl<'a, E: Entity> Evaluator<'a, E> {
    fn new(schema: &'a SchemaSet, root: &'a E) -> Evaluator<'a, E> {
        Evaluator {
            schema,
            root,
            locals: Vec::new(),
        }
    }

    fn truth(&mut self, expr: &BoundExpr) -> Result<bool, EvalError> {
        match expr {
            BoundExpr::Logical { op, left, right } => match op {
                LogicalOp::And => Ok(self.truth(left)? && self.truth(right)?),
                LogicalOp::Or => Ok(self.truth(left)? || self.truth(right)?),
            },
            BoundExpr::Not(inner) => Ok(!self.truth(inner)?),
            BoundExpr::Compare {
                op,
                kind,
                left,
                right,
            } => {
                let left = self.value(left)?;
                let right = self.value(right)?;
                compare(kind, *op, &left, &right)
            }
            BoundExpr::In {
                kind,
                needle,
                haystack,
            } => {
                let needle = self.value(needle)?;
                let haystack = self.value(haystack)?;
                match haystack {
                    Value::Null => Ok(false),
                    Value::List(items) => {
                        for item in &items {
                            if compare(kind, CompareOp::Eq, &needle, item)? {
                                return Ok(true);
                            }
                        }
                        Ok(false)
                    }
                    other => Err(EvalError::UnexpectedValue {
                        expected: "a list".to_string(),
                        found: other.kind_name().to_string(),
                    }),
                }
            }
            BoundExpr::Quantifier {
                quantifier,
                source,
                param,
                predicate,
            } => self.quantify(*quantifier, source, param.as_deref(), predicate.as_deref()),
            other => match self.value(other)? {
                Value::Bool(b) => Ok(b),
                Value::Null => Ok(false),
                found => Err(EvalError::UnexpectedValue {
                    expected: "bool".to_string(),
                    found: found.kind_name().to_string(),
                }),
            },
        }
    }

    fn value(&mut self, expr: &BoundExpr) -> Result<Value, EvalError> {
        match expr {
            BoundExpr::Constant(value) => Ok(value.clone()),
            BoundExpr::Param(param) => match param {
                ParamRef::This => Err(EvalError::NotAValue {
                    what: "this".to_string(),
                }),
                ParamRef::Named(name) => self.local(name),
            },
            BoundExpr::Property {
                receiver,
                internal_name,
                ..
            } => match self.subject(receiver)? {
                Subject::Root => Ok(self.root.get(internal_name).unwrap_or(Value::Null)),
                Subject::Val(Value::Map(map)) => {
                    Ok(map.get(internal_name).cloned().unwrap_or(Value::Null))
                }
                Subject::Val(Value::Null) => Ok(Value::Null),
                Subject::Val(other) => Err(EvalError::PropertyOnValue {
                    kind: other.kind_name().to_string(),
                }),
            },
            BoundExpr::Cast { .. } => match self.subject(expr)? {
                // A surviving root cast only ever feeds a null test, so an
                // empty map stands in as its non-null marker.
                Subject::Root => Ok(Value::Map(BTreeMap::new())),
                Subject::Val(value) => Ok(value),
            },
            BoundExpr::Arithmetic {
                op,
                kind,
                left,
                right,
            } => {
                let left = self.value(left)?;
                let right = self.value(right)?;
                arithmetic(*op, *kind, left, right)
            }
            BoundExpr::Method {
                kind,
                receiver,
                args,
            } => {
                let receiver = self.value(receiver)?;
                let mut arg_values = Vec::with_capacity(args.len());
                for arg in args {
                    arg_values.push(self.value(arg)?);
                }
                method(*kind, receiver, &arg_values)
            }
            BoundExpr::Index { receiver, key, .. } => {
                let receiver = self.value(receiver)?;
                let key = self.value(key)?;
                match (receiver, key) {
                    (Value::Null, _) => Ok(Value::Null),
                    (Value::Map(map), Value::String(key)) => {
                        Ok(map.get(&key).cloned().unwrap_or(Value::Null))
                    }
                    (Value::List(items), Value::Int(index)) => Ok(usize::try_from(index)
                        .ok()
                        .and_then(|i| items.get(i).cloned())
                        .unwrap_or(Value::Null)),
                    (receiver, _) => Err(EvalError::PropertyOnValue {
                        kind: receiver.kind_name().to_string(),
                    }),
                }
            }
            BoundExpr::Array(values) => Ok(Value::List(values.clone())),
            BoundExpr::Compare { .. }
            | BoundExpr::Logical { .. }
            | BoundExpr::Not(_)
            | BoundExpr::In { .. }
            | BoundExpr::Quantifier { .. } => Ok(Value::Bool(self.truth(expr)?)),
        }
    }

    fn subject(&mut self, expr: &BoundExpr) -> Result<Subject, EvalError> {
        match expr {
            BoundExpr::Param(ParamRef::This) => Ok(Subject::Root),
            BoundExpr::Param(ParamRef::Named(name)) => Ok(Subject::Val(self.local(name)?)),
            BoundExpr::Cast { expr, target } => {
                let inner = self.subject(expr)?;
                let type_name: Option<String> = match &inner {
                    Subject::Root => self.root.type_name().map(|s| s.to_string()),
                    Subject::Val(Value::Map(map)) => match map.get("_type") {
                        Some(Value::String(name)) => Some(name.clone()),
                        _ => None,
                    },
                    Subject::Val(Value::Null) => return Ok(Subject::Val(Value::Null)),
                    Subject::Val(_) => None,
                };
                let passes = match (&type_name, self.schema.resource(target)) {
                    (Some(name), Ok(def)) => self.schema.is_assignable(def, name),
                    _ => false,
                };
                if passes {
                    Ok(inner)
                } else {
                    Ok(Subject::Val(Value::Null))
                }
            }
            other => Ok(Subject::Val(self.value(other)?)),
        }
    }

    fn local(&self, name: &str) -> Result<Value, EvalError> {
        self.locals
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.clone())
            .ok_or_else(|| EvalError::MissingParam {
                name: name.to_string(),
            })
    }

    fn quantify(
        &mut self,
        quantifier: QuantifierKind,
        source: &BoundExpr,
        param: Option<&str>,
        predicate: Option<&BoundExpr>,
    ) -> Result<bool, EvalError> {
        let items = match self.value(source)? {
            Value::Null => Vec::new(),
            Value::List(items) => items,
            other => {
                return Err(EvalError::UnexpectedValue {
                    expected: "a list".to_string(),
                    found: other.kind_name().to_string(),
                })
            }
        };

        let predicate = match predicate {
            Some(predicate) => predicate,
            None => {
                return Ok(match quantifier {
                    QuantifierKind::Any => !items.is_empty(),
                    QuantifierKind::All => true,
                })
            }
        };

        for item in items {
            let pushed = match param {
                Some(name) => {
                    self.locals.push((name.to_string(), item));
                    true
                }
                None => false,
            };
            let verdict = self.truth(predicate);
            if pushed {
                self.locals.pop();
            }
            match (quantifier, verdict?) {
                (QuantifierKind::Any, true) => return Ok(true),
                (QuantifierKind::All, false) => return Ok(false),
                _ => {}
            }
        }
        Ok(quantifier == QuantifierKind::All)
    }
}

// === Comparison ===

fn compare(
    kind: &CompareKind,
    op: CompareOp,
    left: &Value,
    right: &Value,
) -> Result<bool, EvalError> {
    if matches!(kind, CompareKind::Null) {
        let both_null = left.is_null() && right.is_null();
        return Ok(match op {
            CompareOp::Eq => both_null,
            CompareOp::Ne => !both_null,
            // Binding only admits eq and ne against null.
            _ => false,
        });
    }

    if left.is_null() || right.is_null() {
        return Ok(match op {
            CompareOp::Eq => left.is_null() && right.is_null(),
            CompareOp::Ne => left.is_null() != right.is_null(),
            _ => false,
        });
    }

    let ordering = ord_values(kind, left, right)?;
    Ok(match op {
        CompareOp::Eq => ordering == Ordering::Equal,
        CompareOp::Ne => ordering != Ordering::Equal,
        CompareOp::Gt => ordering == Ordering::Greater,
        CompareOp::Ge => ordering != Ordering::Less,
        CompareOp::Lt => ordering == Ordering::Less,
        CompareOp::Le => ordering != Ordering::Greater,
    })
}

/// Orders two non-null values under one comparison kind, coercing loose
/// storage forms (strings for guids, datetimes and decimals) on the way.
fn ord_values(kind: &CompareKind, left: &Value, right: &Value) -> Result<Ordering, EvalError> {
    match kind {
        CompareKind::Null => Ok(Ordering::Equal),
        CompareKind::Bool => Ok(to_bool(left)?.cmp(&to_bool(right)?)),
        CompareKind::Int => Ok(to_int(left)?.cmp(&to_int(right)?)),
        // total_cmp keeps sort keys deterministic even for NaN.
        CompareKind::Float => Ok(to_float(left)?.total_cmp(&to_float(right)?)),
        CompareKind::Decimal => Ok(to_decimal(left)?.cmp(&to_decimal(right)?)),
        CompareKind::String => match (left, right) {
            (Value::String(l), Value::String(r)) => Ok(l.cmp(r)),
            _ => Err(unexpected("string", left, right)),
        },
        CompareKind::Guid => Ok(to_guid(left)?.cmp(&to_guid(right)?)),
        CompareKind::DateTime => Ok(to_datetime(left)?.cmp(&to_datetime(right)?)),
        CompareKind::Enum(def) => {
            let l = enum_ordinal(def, left)?;
            let r = enum_ordinal(def, right)?;
            Ok(l.cmp(&r))
        }
    }
}

fn unexpected(expected: &str, left: &Value, right: &Value) -> EvalError {
    let found = if matches!(left, Value::String(_)) {
        right
    } else {
        left
    };
    EvalError::UnexpectedValue {
        expected: expected.to_string(),
        found: found.kind_name().to_string(),
    }
}

fn to_bool(value: &Value) -> Result<bool, EvalError> {
    match value {
        Value::Bool(b) => Ok(*b),
        other => Err(EvalError::UnexpectedValue {
            expected: "bool".to_string(),
            found: other.kind_name().to_string(),
        }),
    }
}

fn to_int(value: &Value) -> Result<i64, EvalError> {
    match value {
        Value::Int(i) => Ok(*i),
        Value::Float(f) if f.fract() == 0.0 && *f >= i64::MIN as f64 && *f <= i64::MAX as f64 => {
            Ok(*f as i64)
        }
        other => Err(EvalError::UnexpectedValue {
            expected: "int".to_string(),
            found: other.kind_name().to_string(),
        }),
    }
}

fn to_float(value: &Value) -> Result<f64, EvalError> {
    match value {
        Value::Float(f) => Ok(*f),
        Value::Int(i) => Ok(*i as f64),
        other => Err(EvalError::UnexpectedValue {
            expected: "float".to_string(),
            found: other.kind_name().to_string(),
        }),
    }
}

fn to_decimal(value: &Value) -> Result<Decimal, EvalError> {
    let fail = |v: &Value| EvalError::UnexpectedValue {
        expected: "decimal".to_string(),
        found: v.kind_name().to_string(),
    };
    match value {
        Value::Decimal(d) => Ok(*d),
        Value::Int(i) => Ok(Decimal::from(*i)),
        Value::Float(f) => Decimal::from_f64(*f).ok_or_else(|| fail(value)),
        Value::String(s) => s.parse().map_err(|_| fail(value)),
        other => Err(fail(other)),
    }
}

fn to_guid(value: &Value) -> Result<Uuid, EvalError> {
    let fail = |v: &Value| EvalError::UnexpectedValue {
        expected: "guid".to_string(),
        found: v.kind_name().to_string(),
    };
    match value {
        Value::Guid(g) => Ok(*g),
        Value::String(s) => Uuid::parse_str(s).map_err(|_| fail(value)),
        other => Err(fail(other)),
    }
}

fn to_datetime(value: &Value) -> Result<DateTimeValue, EvalError> {
    let fail = |v: &Value| EvalError::UnexpectedValue {
        expected: "datetime".to_string(),
        found: v.kind_name().to_string(),
    };
    match value {
        Value::DateTime(dt) => Ok(*dt),
        Value::String(s) => DateTimeValue::parse(s).map_err(|_| fail(value)),
        other => Err(fail(other)),
    }
}

fn enum_ordinal(def: &charter_schema::EnumDef, value: &Value) -> Result<usize, EvalError> {
    match value {
        Value::String(s) => def.ordinal(s).ok_or_else(|| EvalError::InvalidEnumValue {
            enum_name: def.name.clone(),
            value: s.clone(),
        }),
        Value::Int(i) => {
            let index = usize::try_from(*i).ok().filter(|i| *i < def.variants.len());
            index.ok_or_else(|| EvalError::InvalidEnumValue {
                enum_name: def.name.clone(),
                value: i.to_string(),
            })
        }
        other => Err(EvalError::UnexpectedValue {
            expected: def.name.clone(),
            found: other.kind_name().to_string(),
        }),
    }
}

// === Arithmetic ===

fn arithmetic(op: ArithOp, kind: NumericKind, left: Value, right: Value) -> Result<Value, EvalError> {
    if left.is_null() || right.is_null() {
        return Ok(Value::Null);
    }
    match kind {
        NumericKind::Int => {
            let l = to_int(&left)?;
            let r = to_int(&right)?;
            let result = match op {
                ArithOp::Add => l.checked_add(r),
                ArithOp::Sub => l.checked_sub(r),
                ArithOp::Mul => l.checked_mul(r),
                ArithOp::Div => {
                    if r == 0 {
                        return Err(EvalError::DivisionByZero);
                    }
                    l.checked_div(r)
                }
                ArithOp::Mod => {
                    if r == 0 {
                        return Err(EvalError::DivisionByZero);
                    }
                    l.checked_rem(r)
                }
            };
            result.map(Value::Int).ok_or(EvalError::NumericOverflow)
        }
        NumericKind::Float => {
            let l = to_float(&left)?;
            let r = to_float(&right)?;
            Ok(Value::Float(match op {
                ArithOp::Add => l + r,
                ArithOp::Sub => l - r,
                ArithOp::Mul => l * r,
                ArithOp::Div => l / r,
                ArithOp::Mod => l % r,
            }))
        }
        NumericKind::Decimal => {
            let l = to_decimal(&left)?;
            let r = to_decimal(&right)?;
            let result = match op {
                ArithOp::Add => l.checked_add(r),
                ArithOp::Sub => l.checked_sub(r),
                ArithOp::Mul => l.checked_mul(r),
                ArithOp::Div => {
                    if r.is_zero() {
                        return Err(EvalError::DivisionByZero);
                    }
                    l.checked_div(r)
                }
                ArithOp::Mod => {
                    if r.is_zero() {
                        return Err(EvalError::DivisionByZero);
                    }
                    l.checked_rem(r)
                }
            };
            result.map(Value::Decimal).ok_or(EvalError::NumericOverflow)
        }
    }
}

// === Methods ===

fn method(kind: MethodKind, receiver: Value, args: &[Value]) -> Result<Value, EvalError> {
    // Null receivers and arguments propagate.
    if receiver.is_null() || args.iter().any(Value::is_null) {
        return Ok(Value::Null);
    }

    let as_string = |v: &Value| -> Result<String, EvalError> {
        match v {
            Value::String(s) => Ok(s.clone()),
            other => Err(EvalError::UnexpectedValue {
                expected: "string".to_string(),
                found: other.kind_name().to_string(),
            }),
        }
    };

    match kind {
        MethodKind::StartsWith => {
            let subject = as_string(&receiver)?;
            let needle = as_string(&args[0])?;
            Ok(Value::Bool(subject.starts_with(&needle)))
        }
        MethodKind::EndsWith => {
            let subject = as_string(&receiver)?;
            let needle = as_string(&args[0])?;
            Ok(Value::Bool(subject.ends_with(&needle)))
        }
        MethodKind::Contains | MethodKind::SubstringOf => {
            let subject = as_string(&receiver)?;
            let needle = as_string(&args[0])?;
            Ok(Value::Bool(subject.contains(&needle)))
        }
        MethodKind::ToLower => Ok(Value::String(as_string(&receiver)?.to_lowercase())),
        MethodKind::ToUpper => Ok(Value::String(as_string(&receiver)?.to_uppercase())),
        MethodKind::Trim => Ok(Value::String(as_string(&receiver)?.trim().to_string())),
        MethodKind::Length => Ok(Value::Int(as_string(&receiver)?.chars().count() as i64)),
        MethodKind::IndexOf => {
            let subject = as_string(&receiver)?;
            let needle = as_string(&args[0])?;
            let index = subject
                .find(&needle)
                .map(|byte| subject[..byte].chars().count() as i64)
                .unwrap_or(-1);
            Ok(Value::Int(index))
        }
        MethodKind::Year
        | MethodKind::Month
        | MethodKind::Day
        | MethodKind::Hour
        | MethodKind::Minute
        | MethodKind::Second => {
            let dt = to_datetime(&receiver)?;
            let component = match (&dt, kind) {
                (DateTimeValue::Offset(d), MethodKind::Year) => d.year() as i64,
                (DateTimeValue::Offset(d), MethodKind::Month) => d.month() as i64,
                (DateTimeValue::Offset(d), MethodKind::Day) => d.day() as i64,
                (DateTimeValue::Offset(d), MethodKind::Hour) => d.hour() as i64,
                (DateTimeValue::Offset(d), MethodKind::Minute) => d.minute() as i64,
                (DateTimeValue::Offset(d), _) => d.second() as i64,
                (DateTimeValue::Unzoned(d), MethodKind::Year) => d.year() as i64,
                (DateTimeValue::Unzoned(d), MethodKind::Month) => d.month() as i64,
                (DateTimeValue::Unzoned(d), MethodKind::Day) => d.day() as i64,
                (DateTimeValue::Unzoned(d), MethodKind::Hour) => d.hour() as i64,
                (DateTimeValue::Unzoned(d), MethodKind::Minute) => d.minute() as i64,
                (DateTimeValue::Unzoned(d), _) => d.second() as i64,
            };
            Ok(Value::Int(component))
        }
        MethodKind::Count => match receiver {
            Value::List(items) => Ok(Value::Int(items.len() as i64)),
            other => Err(EvalError::UnexpectedValue {
                expected: "a list".to_string(),
                found: other.kind_name().to_string(),
            }),
        },
    }
}
