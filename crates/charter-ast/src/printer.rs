//! Canonical text printer for query ASTs
//!
//! Renders a compiled AST back to query text. Literals use their
//! canonical encodings (lowercase hyphenated guids, ISO-8601 datetimes),
//! so printing after decoding is a stable round trip. Binary operands
//! that are themselves operations are parenthesized rather than relying
//! on precedence.

use crate::{BinaryOperator, QueryNode, QueryNodeKind};

/// Render a query AST as canonical filter text
pub fn print(node: &QueryNode) -> String {
    let mut out = String::new();
    write_node(&mut out, node);
    out
}

/// Quote a string literal, doubling embedded quotes
fn quote_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for c in value.chars() {
        if c == '\'' {
            out.push_str("''");
        } else {
            out.push(c);
        }
    }
    out.push('\'');
    out
}

fn write_node(out: &mut String, node: &QueryNode) {
    match &node.kind {
        QueryNodeKind::Number(text) => out.push_str(text),
        QueryNodeKind::Str(value) => out.push_str(&quote_string(value)),
        QueryNodeKind::Guid(value) => {
            out.push_str("guid'");
            out.push_str(&value.to_string());
            out.push('\'');
        }
        QueryNodeKind::DateTime(value) => {
            out.push_str("datetime'");
            out.push_str(&value.canonical());
            out.push('\'');
        }
        QueryNodeKind::TypeName(name) => {
            out.push_str("t'");
            out.push_str(name);
            out.push('\'');
        }
        QueryNodeKind::Symbol { name, path } => {
            out.push_str(name);
            for segment in path {
                out.push('.');
                write_node(out, segment);
            }
        }
        QueryNodeKind::Binary { op, left, right } => match op {
            BinaryOperator::Dot => {
                write_dot_operand(out, left);
                out.push('.');
                write_dot_operand(out, right);
            }
            _ => {
                write_operand(out, left);
                out.push(' ');
                out.push_str(op.word());
                out.push(' ');
                write_operand(out, right);
            }
        },
        QueryNodeKind::Not(operand) => {
            out.push_str("not ");
            write_operand(out, operand);
        }
        QueryNodeKind::MethodCall { name, args } => {
            out.push_str(name);
            out.push('(');
            write_list(out, args);
            out.push(')');
        }
        QueryNodeKind::IndexerAccess { name, args } => {
            out.push_str(name);
            out.push('[');
            write_list(out, args);
            out.push(']');
        }
        QueryNodeKind::Lambda(children) => {
            for (i, child) in children.iter().enumerate() {
                if i > 0 {
                    out.push_str(": ");
                }
                write_node(out, child);
            }
        }
        QueryNodeKind::Array(items) => {
            out.push('[');
            write_list(out, items);
            out.push(']');
        }
        QueryNodeKind::Unhandled { kind } => {
            out.push('<');
            out.push_str(kind.describe());
            out.push('>');
        }
    }
}

fn write_operand(out: &mut String, node: &QueryNode) {
    let needs_parens = matches!(
        node.kind,
        QueryNodeKind::Binary { .. } | QueryNodeKind::Not(_) | QueryNodeKind::Lambda(_)
    );
    if needs_parens {
        out.push('(');
        write_node(out, node);
        out.push(')');
    } else {
        write_node(out, node);
    }
}

/// Links of a navigation chain print without parentheses between them;
/// any other operation inside a chain keeps its grouping.
fn write_dot_operand(out: &mut String, node: &QueryNode) {
    match &node.kind {
        QueryNodeKind::Binary {
            op: BinaryOperator::Dot,
            ..
        } => write_node(out, node),
        _ => write_operand(out, node),
    }
}

fn write_list(out: &mut String, nodes: &[QueryNode]) {
    for (i, node) in nodes.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        write_node(out, node);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use charter_syntax::Span;
    use uuid::Uuid;

    fn node(kind: QueryNodeKind) -> QueryNode {
        QueryNode::new(kind, Span::dummy())
    }

    #[test]
    fn prints_binary_with_parenthesized_operands() {
        let ast = node(QueryNodeKind::Binary {
            op: BinaryOperator::And,
            left: Box::new(node(QueryNodeKind::Binary {
                op: BinaryOperator::Eq,
                left: Box::new(node(QueryNodeKind::Symbol {
                    name: "Name".into(),
                    path: vec![],
                })),
                right: Box::new(node(QueryNodeKind::Str("Rex".into()))),
            })),
            right: Box::new(node(QueryNodeKind::Binary {
                op: BinaryOperator::Gt,
                left: Box::new(node(QueryNodeKind::Symbol {
                    name: "Age".into(),
                    path: vec![],
                })),
                right: Box::new(node(QueryNodeKind::Number("3".into()))),
            })),
        });
        assert_eq!(print(&ast), "(Name eq 'Rex') and (Age gt 3)");
    }

    #[test]
    fn prints_dot_access_tightly() {
        let ast = node(QueryNodeKind::Binary {
            op: BinaryOperator::Dot,
            left: Box::new(node(QueryNodeKind::Symbol {
                name: "Owner".into(),
                path: vec![],
            })),
            right: Box::new(node(QueryNodeKind::MethodCall {
                name: "tolower".into(),
                args: vec![],
            })),
        });
        assert_eq!(print(&ast), "Owner.tolower()");
    }

    #[test]
    fn escapes_embedded_quotes() {
        let ast = node(QueryNodeKind::Str("it's".into()));
        assert_eq!(print(&ast), "'it''s'");
    }

    #[test]
    fn guid_prints_lowercase_hyphenated() {
        let id = Uuid::parse_str("D17D3DFD-07D7-4CF6-BF99-2F44B1C7EC11").unwrap();
        let ast = node(QueryNodeKind::Guid(id));
        assert_eq!(
            print(&ast),
            "guid'd17d3dfd-07d7-4cf6-bf99-2f44b1c7ec11'"
        );
    }
}
