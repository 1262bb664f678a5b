//! Tree-to-AST compilation
//!
//! Walks a [`SyntaxNode`] tree (from the bundled parser or any external
//! front-end) and produces the semantic [`QueryNode`] AST. The walk is
//! purely structural: singleton wrapper nodes reduce to their child,
//! same-kind operator runs fold left-associatively, prefixed literals
//! decode eagerly, and unknown node kinds become `Unhandled` markers
//! without disturbing their siblings.

use charter_ast::{BinaryOperator, DateTimeValue, QueryNode, QueryNodeKind};
use charter_syntax::{SyntaxKind, SyntaxNode};
use uuid::Uuid;

use crate::ParseError;

/// Nesting limit; hostile input must not overflow the stack
const MAX_DEPTH: usize = 256;

/// Compile a syntax tree into a query AST
pub fn compile_tree(root: &SyntaxNode) -> Result<QueryNode, ParseError> {
    compile_node(root, 0)
}

/// Wrapper kinds that reduce to their child when they have exactly one.
/// The grammar emits these unconditionally around their operand.
fn is_reducible(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SyntaxKind::OrderByAsc
            | SyntaxKind::As
            | SyntaxKind::LambdaOp
            | SyntaxKind::And
            | SyntaxKind::Or
    )
}

/// The fixed kind-to-operator table for binary folding
fn binary_operator(kind: SyntaxKind) -> Option<BinaryOperator> {
    match kind {
        SyntaxKind::And => Some(BinaryOperator::And),
        SyntaxKind::Or => Some(BinaryOperator::Or),
        SyntaxKind::Mul => Some(BinaryOperator::Mul),
        SyntaxKind::Mod => Some(BinaryOperator::Mod),
        SyntaxKind::Add => Some(BinaryOperator::Add),
        SyntaxKind::Div => Some(BinaryOperator::Div),
        SyntaxKind::Sub => Some(BinaryOperator::Sub),
        SyntaxKind::Gt => Some(BinaryOperator::Gt),
        SyntaxKind::Lt => Some(BinaryOperator::Lt),
        SyntaxKind::Ge => Some(BinaryOperator::Ge),
        SyntaxKind::Le => Some(BinaryOperator::Le),
        SyntaxKind::Eq => Some(BinaryOperator::Eq),
        SyntaxKind::Ne => Some(BinaryOperator::Ne),
        SyntaxKind::Dot => Some(BinaryOperator::Dot),
        SyntaxKind::As => Some(BinaryOperator::As),
        SyntaxKind::In => Some(BinaryOperator::In),
        _ => None,
    }
}

fn compile_node(node: &SyntaxNode, depth: usize) -> Result<QueryNode, ParseError> {
    if depth > MAX_DEPTH {
        return Err(ParseError::TooDeep { span: node.span });
    }
    let span = node.span;

    if node.kind == SyntaxKind::Error {
        return Err(ParseError::InvalidSyntax { span });
    }

    // Singleton wrappers reduce to their sole child before anything else
    if is_reducible(node.kind) && node.child_count() == 1 {
        return compile_node(&node.children[0], depth + 1);
    }

    match node.kind {
        SyntaxKind::PrefixedString => compile_prefixed(node),

        SyntaxKind::Not => {
            if node.child_count() != 1 {
                return Err(malformed(node));
            }
            let operand = compile_node(&node.children[0], depth + 1)?;
            Ok(QueryNode::new(QueryNodeKind::Not(Box::new(operand)), span))
        }

        SyntaxKind::MethodCall => {
            let (name, args) = compile_named(node, depth)?;
            Ok(QueryNode::new(QueryNodeKind::MethodCall { name, args }, span))
        }

        SyntaxKind::IndexerAccess => {
            let (name, args) = compile_named(node, depth)?;
            Ok(QueryNode::new(
                QueryNodeKind::IndexerAccess { name, args },
                span,
            ))
        }

        SyntaxKind::Int | SyntaxKind::Float => Ok(QueryNode::new(
            QueryNodeKind::Number(node.text.clone()),
            span,
        )),

        SyntaxKind::Str => Ok(QueryNode::new(
            QueryNodeKind::Str(decode_string(&node.text)),
            span,
        )),

        SyntaxKind::Id => {
            let path = compile_children(&node.children, depth)?;
            Ok(QueryNode::new(
                QueryNodeKind::Symbol {
                    name: node.text.clone(),
                    path,
                },
                span,
            ))
        }

        SyntaxKind::Root => {
            if node.child_count() != 1 {
                return Err(malformed(node));
            }
            compile_node(&node.children[0], depth + 1)
        }

        SyntaxKind::LambdaOp => {
            let children = compile_children(&node.children, depth)?;
            Ok(QueryNode::new(QueryNodeKind::Lambda(children), span))
        }

        SyntaxKind::ArrayLiteral => {
            let items = compile_children(&node.children, depth)?;
            Ok(QueryNode::new(QueryNodeKind::Array(items), span))
        }

        kind => match binary_operator(kind) {
            Some(op) => compile_binary(node, op, depth),
            // Permissive fallback: mark the node, leave siblings alone.
            // Binding an Unhandled node is always an error downstream.
            None => Ok(QueryNode::new(QueryNodeKind::Unhandled { kind }, span)),
        },
    }
}

/// Left-associative fold of a flat operator run:
/// `[a, b, c]` becomes `op(op(a, b), c)`
fn compile_binary(
    node: &SyntaxNode,
    op: BinaryOperator,
    depth: usize,
) -> Result<QueryNode, ParseError> {
    let mut children = compile_children(&node.children, depth)?.into_iter();
    let first = match children.next() {
        Some(first) => first,
        None => return Err(malformed(node)),
    };
    Ok(children.fold(first, |left, right| {
        let span = left.span.merge(right.span);
        QueryNode::new(
            QueryNodeKind::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            },
            span,
        )
    }))
}

/// Shared shape of method calls and indexer accesses: the first child's
/// text names the member, the remaining children are the arguments
fn compile_named(node: &SyntaxNode, depth: usize) -> Result<(String, Vec<QueryNode>), ParseError> {
    let name = match node.first_child() {
        Some(first) => first.text.clone(),
        None => return Err(malformed(node)),
    };
    let args = compile_children(&node.children[1..], depth)?;
    Ok((name, args))
}

fn compile_children(children: &[SyntaxNode], depth: usize) -> Result<Vec<QueryNode>, ParseError> {
    children
        .iter()
        .map(|child| compile_node(child, depth + 1))
        .collect()
}

fn malformed(node: &SyntaxNode) -> ParseError {
    ParseError::MalformedNode {
        kind: node.kind.describe().to_string(),
        span: node.span,
    }
}

/// Decode `prefix'value'` literals. Unknown prefixes fall through to the
/// permissive default, like any other unrecognized syntax.
fn compile_prefixed(node: &SyntaxNode) -> Result<QueryNode, ParseError> {
    let span = node.span;
    let text = &node.text;
    let quote = match text.find('\'') {
        Some(i) => i,
        None => return Err(malformed(node)),
    };
    let prefix = &text[..quote];
    let value = decode_string(&text[quote..]);

    match prefix {
        "t" => Ok(QueryNode::new(QueryNodeKind::TypeName(value), span)),
        "guid" => {
            let parsed = Uuid::parse_str(&value).map_err(|_| ParseError::InvalidLiteral {
                kind: "guid".to_string(),
                text: value.clone(),
                span,
            })?;
            Ok(QueryNode::new(QueryNodeKind::Guid(parsed), span))
        }
        "datetime" => {
            let parsed =
                DateTimeValue::parse(&value).map_err(|_| ParseError::InvalidLiteral {
                    kind: "datetime".to_string(),
                    text: value.clone(),
                    span,
                })?;
            Ok(QueryNode::new(QueryNodeKind::DateTime(parsed), span))
        }
        _ => Ok(QueryNode::new(
            QueryNodeKind::Unhandled {
                kind: SyntaxKind::PrefixedString,
            },
            span,
        )),
    }
}

/// Strip surrounding quotes and unescape doubled quotes
fn decode_string(raw: &str) -> String {
    let inner = raw
        .strip_prefix('\'')
        .and_then(|s| s.strip_suffix('\''))
        .unwrap_or(raw);
    inner.replace("''", "'")
}
