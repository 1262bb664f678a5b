//! Charter Parser - query text to syntax trees to ASTs
//!
//! Two stages live here:
//! - `parser`: recursive descent over tokens, producing the
//!   [`SyntaxNode`](charter_syntax::SyntaxNode) trees the compiler
//!   expects (singleton wrappers, flat operator runs)
//! - `compiler`: the structural walk from syntax tree to
//!   [`QueryNode`](charter_ast::QueryNode) AST
//!
//! External front-ends can skip the first stage and feed
//! [`compile_tree`] directly.

mod compiler;
mod error;
mod parser;

pub use compiler::compile_tree;
pub use error::*;
pub use parser::*;

use charter_ast::{QueryNode, SortDirection};
use charter_lexer::tokenize;
use charter_syntax::SyntaxNode;

/// Parse a `$filter` expression into a compiled AST
pub fn parse_filter(source: &str) -> Result<QueryNode, ParseError> {
    let tree = parse_filter_tree(source)?;
    compile_tree(&tree)
}

/// Parse a `$filter` expression into its raw syntax tree
pub fn parse_filter_tree(source: &str) -> Result<SyntaxNode, ParseError> {
    let tokens = tokenize(source);
    let mut parser = Parser::new(source, tokens);
    parser.parse_query()
}

/// Parse a `$orderby` clause list into compiled ASTs with directions
pub fn parse_order_by(source: &str) -> Result<Vec<(QueryNode, SortDirection)>, ParseError> {
    let tokens = tokenize(source);
    let mut parser = Parser::new(source, tokens);
    let clauses = parser.parse_order_clauses()?;
    clauses
        .into_iter()
        .map(|clause| Ok((compile_tree(&clause.tree)?, clause.direction)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use charter_ast::{print, BinaryOperator, QueryNodeKind};

    // === Filter expressions ===

    #[test]
    fn test_parse_simple_comparison() {
        let ast = parse_filter("Age gt 3").unwrap();
        match ast.kind {
            QueryNodeKind::Binary { op, left, right } => {
                assert_eq!(op, BinaryOperator::Gt);
                assert!(matches!(left.kind, QueryNodeKind::Symbol { ref name, .. } if name == "Age"));
                assert_eq!(right.kind, QueryNodeKind::Number("3".into()));
            }
            other => panic!("expected comparison, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_and_of_comparisons() {
        let ast = parse_filter("Name eq 'Rex' and Age gt 3").unwrap();
        match ast.kind {
            QueryNodeKind::Binary { op, left, right } => {
                assert_eq!(op, BinaryOperator::And);
                match left.kind {
                    QueryNodeKind::Binary { op, left, right } => {
                        assert_eq!(op, BinaryOperator::Eq);
                        assert!(matches!(
                            left.kind,
                            QueryNodeKind::Symbol { ref name, .. } if name == "Name"
                        ));
                        assert_eq!(right.kind, QueryNodeKind::Str("Rex".into()));
                    }
                    other => panic!("expected eq, got {:?}", other),
                }
                match right.kind {
                    QueryNodeKind::Binary { op, .. } => assert_eq!(op, BinaryOperator::Gt),
                    other => panic!("expected gt, got {:?}", other),
                }
            }
            other => panic!("expected and, got {:?}", other),
        }
    }

    #[test]
    fn test_singleton_wrappers_disappear() {
        // A bare identifier passes through lambda, or, and, as wrappers
        let ast = parse_filter("Name").unwrap();
        assert_eq!(
            ast.kind,
            QueryNodeKind::Symbol {
                name: "Name".into(),
                path: vec![],
            }
        );
    }

    #[test]
    fn test_or_run_folds_left() {
        let ast = parse_filter("a or b or c").unwrap();
        assert_eq!(print(&ast), "(a or b) or c");
    }

    #[test]
    fn test_mixed_precedence() {
        let ast = parse_filter("Price add Tax mul 2 gt 100").unwrap();
        // mul binds tighter than add, both tighter than gt
        assert_eq!(print(&ast), "(Price add (Tax mul 2)) gt 100");
    }

    #[test]
    fn test_parentheses_group() {
        let ast = parse_filter("(Price add Tax) mul 2 gt 100").unwrap();
        assert_eq!(print(&ast), "((Price add Tax) mul 2) gt 100");
    }

    #[test]
    fn test_not_binds_whole_comparison() {
        let ast = parse_filter("not Name eq 'Rex' and Alive").unwrap();
        assert_eq!(print(&ast), "(not (Name eq 'Rex')) and Alive");
    }

    #[test]
    fn test_dot_chain_folds_left() {
        let ast = parse_filter("Owner.Address.City").unwrap();
        assert_eq!(print(&ast), "Owner.Address.City");
        match ast.kind {
            QueryNodeKind::Binary { op, left, .. } => {
                assert_eq!(op, BinaryOperator::Dot);
                assert!(matches!(
                    left.kind,
                    QueryNodeKind::Binary {
                        op: BinaryOperator::Dot,
                        ..
                    }
                ));
            }
            other => panic!("expected dot chain, got {:?}", other),
        }
    }

    #[test]
    fn test_method_call_with_receiver() {
        let ast = parse_filter("Name.tolower() eq 'rex'").unwrap();
        assert_eq!(print(&ast), "(Name.tolower()) eq 'rex'");
    }

    #[test]
    fn test_free_function_style_call() {
        let ast = parse_filter("startswith(Name, 'Re')").unwrap();
        match ast.kind {
            QueryNodeKind::MethodCall { name, args } => {
                assert_eq!(name, "startswith");
                assert_eq!(args.len(), 2);
            }
            other => panic!("expected method call, got {:?}", other),
        }
    }

    #[test]
    fn test_lambda_inside_call() {
        let ast = parse_filter("Pets.any(x: x.Age gt 2)").unwrap();
        match ast.kind {
            QueryNodeKind::Binary { op, right, .. } => {
                assert_eq!(op, BinaryOperator::Dot);
                match right.kind {
                    QueryNodeKind::MethodCall { name, args } => {
                        assert_eq!(name, "any");
                        assert_eq!(args.len(), 1);
                        match &args[0].kind {
                            QueryNodeKind::Lambda(children) => {
                                assert_eq!(children.len(), 2);
                                assert!(matches!(
                                    children[0].kind,
                                    QueryNodeKind::Symbol { ref name, .. } if name == "x"
                                ));
                            }
                            other => panic!("expected lambda argument, got {:?}", other),
                        }
                    }
                    other => panic!("expected any(), got {:?}", other),
                }
            }
            other => panic!("expected dotted call, got {:?}", other),
        }
    }

    #[test]
    fn test_in_with_array_literal() {
        let ast = parse_filter("Status in ['open', 'closed']").unwrap();
        assert_eq!(print(&ast), "Status in ['open', 'closed']");
    }

    #[test]
    fn test_as_type_narrowing() {
        let ast = parse_filter("(this as t'Dog').BarkVolume gt 5").unwrap();
        match ast.kind {
            QueryNodeKind::Binary { op, left, .. } => {
                assert_eq!(op, BinaryOperator::Gt);
                assert!(matches!(
                    left.kind,
                    QueryNodeKind::Binary {
                        op: BinaryOperator::Dot,
                        ..
                    }
                ));
            }
            other => panic!("expected comparison, got {:?}", other),
        }
    }

    #[test]
    fn test_indexer_access() {
        let ast = parse_filter("Attributes['color'] eq 'brown'").unwrap();
        match ast.kind {
            QueryNodeKind::Binary { left, .. } => match &left.kind {
                QueryNodeKind::IndexerAccess { name, args } => {
                    assert_eq!(name, "Attributes");
                    assert_eq!(args.len(), 1);
                }
                other => panic!("expected indexer, got {:?}", other),
            },
            other => panic!("expected comparison, got {:?}", other),
        }
    }

    #[test]
    fn test_prefixed_literals_in_filter() {
        let ast = parse_filter("Id eq guid'd17d3dfd-07d7-4cf6-bf99-2f44b1c7ec11'").unwrap();
        match ast.kind {
            QueryNodeKind::Binary { right, .. } => {
                assert!(matches!(right.kind, QueryNodeKind::Guid(_)));
            }
            other => panic!("expected comparison, got {:?}", other),
        }

        let ast = parse_filter("Born lt datetime'2020-06-01T00:00:00Z'").unwrap();
        match ast.kind {
            QueryNodeKind::Binary { right, .. } => {
                assert!(matches!(right.kind, QueryNodeKind::DateTime(_)));
            }
            other => panic!("expected comparison, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_guid_never_reaches_binding() {
        let err = parse_filter("Id eq guid'not-a-guid'").unwrap_err();
        assert!(matches!(err, ParseError::InvalidLiteral { .. }));
    }

    #[test]
    fn test_guid_round_trip_is_canonical() {
        // Uppercase input prints back lowercase, then survives reparsing
        let ast = parse_filter("guid'D17D3DFD-07D7-4CF6-BF99-2F44B1C7EC11'").unwrap();
        let printed = print(&ast);
        assert_eq!(printed, "guid'd17d3dfd-07d7-4cf6-bf99-2f44b1c7ec11'");
        let reparsed = parse_filter(&printed).unwrap();
        assert_eq!(print(&reparsed), printed);
    }

    #[test]
    fn test_datetime_round_trip_is_canonical() {
        for source in [
            "datetime'2023-01-15T10:30:00Z'",
            "datetime'2023-01-15T10:30:00+02:00'",
            "datetime'2023-01-15T10:30:00'",
        ] {
            let printed = print(&parse_filter(source).unwrap());
            let reprinted = print(&parse_filter(&printed).unwrap());
            assert_eq!(printed, reprinted, "source {}", source);
        }
    }

    // === Order-by clauses ===

    #[test]
    fn test_order_by_single_default_ascending() {
        let clauses = parse_order_by("Name").unwrap();
        assert_eq!(clauses.len(), 1);
        assert_eq!(clauses[0].1, SortDirection::Ascending);
        assert!(matches!(
            clauses[0].0.kind,
            QueryNodeKind::Symbol { ref name, .. } if name == "Name"
        ));
    }

    #[test]
    fn test_order_by_mixed_directions() {
        let clauses = parse_order_by("Age desc, Name asc, Id").unwrap();
        let directions: Vec<_> = clauses.iter().map(|c| c.1).collect();
        assert_eq!(
            directions,
            vec![
                SortDirection::Descending,
                SortDirection::Ascending,
                SortDirection::Ascending,
            ]
        );
    }

    #[test]
    fn test_order_by_expression_clause() {
        let clauses = parse_order_by("Price mul Quantity desc").unwrap();
        assert_eq!(clauses.len(), 1);
        assert_eq!(print(&clauses[0].0), "Price mul Quantity");
    }

    // === Error cases ===

    #[test]
    fn test_trailing_garbage_is_rejected() {
        let err = parse_filter("Age gt 3 3").unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedToken { .. }));
    }

    #[test]
    fn test_empty_filter_is_rejected() {
        let err = parse_filter("").unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedEof { .. }));
    }

    #[test]
    fn test_unclosed_paren_is_rejected() {
        let err = parse_filter("(Age gt 3").unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedToken { .. }));
    }

    #[test]
    fn test_lexer_garbage_reports_syntax_error_with_span() {
        let err = parse_filter("Name eq @").unwrap_err();
        assert!(matches!(err, ParseError::InvalidSyntax { .. }));
        assert!(err.span().start > 0);
    }

    #[test]
    fn test_missing_operand_is_rejected() {
        let err = parse_filter("Age gt").unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedEof { .. }));
    }
}
