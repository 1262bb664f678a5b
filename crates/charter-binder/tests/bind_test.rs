//! Integration tests for binding filters and sort keys against a schema.

use charter_ast::SortDirection;
use charter_binder::{
    bind_order_by, bind_predicate, BindError, BoundExpr, CompareKind, CompareOp, MethodKind,
    ParamRef, QuantifierKind,
};
use charter_parser::{parse_filter, parse_order_by};
use charter_schema::{
    EnumDef, PropertyDef, ResourceDef, ScalarKind, SchemaError, SchemaSet, TypeRef, Value,
};
use charter_syntax::{Span, SyntaxKind};

fn kennel() -> SchemaSet {
    SchemaSet::builder()
        .enum_type(EnumDef::new(
            "Temperament",
            vec!["Calm".to_string(), "Playful".to_string(), "Wild".to_string()],
        ))
        .resource(
            ResourceDef::new("Animal")
                .property(
                    PropertyDef::new("Name", TypeRef::Scalar(ScalarKind::String)).stored_as("name"),
                )
                .property(PropertyDef::new("Age", TypeRef::Scalar(ScalarKind::Int)).stored_as("age"))
                .property(
                    PropertyDef::new("BirthDate", TypeRef::Scalar(ScalarKind::DateTime))
                        .stored_as("birth_date"),
                )
                .property(PropertyDef::new("Id", TypeRef::Scalar(ScalarKind::Guid)).stored_as("id"))
                .property(
                    PropertyDef::new("Mood", TypeRef::Enum("Temperament".to_string()))
                        .stored_as("mood"),
                )
                .property(
                    PropertyDef::new(
                        "Nicknames",
                        TypeRef::collection_of(TypeRef::Scalar(ScalarKind::String)),
                    )
                    .stored_as("nicknames"),
                )
                .property(
                    PropertyDef::new("Owner", TypeRef::Resource("Person".to_string()))
                        .stored_as("owner"),
                ),
        )
        .resource(
            ResourceDef::new("Dog").extends("Animal").property(
                PropertyDef::new("BarkVolume", TypeRef::Scalar(ScalarKind::Int))
                    .stored_as("bark_volume"),
            ),
        )
        .resource(
            ResourceDef::new("Cat").extends("Animal").property(
                PropertyDef::new("Lives", TypeRef::Scalar(ScalarKind::Int)).stored_as("lives"),
            ),
        )
        .resource(
            ResourceDef::new("Person")
                .property(
                    PropertyDef::new("Name", TypeRef::Scalar(ScalarKind::String)).stored_as("name"),
                )
                .property(
                    PropertyDef::new(
                        "Pets",
                        TypeRef::collection_of(TypeRef::Resource("Animal".to_string())),
                    )
                    .stored_as("pets"),
                )
                .property(
                    PropertyDef::new(
                        "Attributes",
                        TypeRef::Dictionary(Box::new(TypeRef::Scalar(ScalarKind::String))),
                    )
                    .stored_as("attributes"),
                )
                .property(
                    PropertyDef::new("Salary", TypeRef::Scalar(ScalarKind::Decimal))
                        .stored_as("salary"),
                )
                .property(
                    PropertyDef::new("Weight", TypeRef::Scalar(ScalarKind::Float))
                        .stored_as("weight"),
                )
                .property(
                    PropertyDef::new("Active", TypeRef::Scalar(ScalarKind::Bool))
                        .stored_as("active"),
                ),
        )
        .build()
        .expect("fixture schema must build")
}

fn bind(root: &str, filter: &str) -> Result<BoundExpr, BindError> {
    let schema = kennel();
    let node = parse_filter(filter).expect("parse failed");
    let root = schema.resource(root).expect("unknown fixture root");
    bind_predicate(&schema, root, &node)
}

// === Property resolution ===

#[test]
fn simple_comparison_resolves_internal_name() {
    let bound = bind("Dog", "Name eq 'Rex'").expect("bind failed");
    match bound {
        BoundExpr::Compare {
            op: CompareOp::Eq,
            kind: CompareKind::String,
            left,
            right,
        } => {
            match *left {
                BoundExpr::Property {
                    ref internal_name,
                    ref receiver,
                    ..
                } => {
                    assert_eq!(internal_name, "name");
                    assert_eq!(**receiver, BoundExpr::Param(ParamRef::This));
                }
                other => panic!("Expected property, got {other:?}"),
            }
            assert_eq!(*right, BoundExpr::Constant(Value::String("Rex".to_string())));
        }
        other => panic!("Expected string comparison, got {other:?}"),
    }
}

#[test]
fn property_match_ignores_case() {
    assert!(bind("Dog", "name eq 'Rex'").is_ok());
    assert!(bind("Dog", "NAME eq 'Rex'").is_ok());
}

#[test]
fn unknown_property_reports_owner_type() {
    let result = bind("Dog", "Foo eq 1");
    match result {
        Err(BindError::Schema {
            source:
                SchemaError::UnknownProperty {
                    type_name, segment, ..
                },
            ..
        }) => {
            assert_eq!(type_name, "Dog");
            assert_eq!(segment, "Foo");
        }
        other => panic!("Expected unknown property, got {other:?}"),
    }
}

#[test]
fn descendant_property_resolves_from_base_type() {
    // BarkVolume is declared on Dog; a query rooted at Animal still sees it.
    let bound = bind("Animal", "BarkVolume gt 5");
    assert!(bound.is_ok(), "Failed to bind: {:?}", bound.err());
}

#[test]
fn dotted_path_navigates_resource_properties() {
    let bound = bind("Dog", "Owner.Name eq 'Nancy'").expect("bind failed");
    match bound {
        BoundExpr::Compare { left, .. } => match *left {
            BoundExpr::Property {
                ref internal_name,
                ref receiver,
                ..
            } => {
                assert_eq!(internal_name, "name");
                assert!(matches!(**receiver, BoundExpr::Property { .. }));
            }
            other => panic!("Expected property chain, got {other:?}"),
        },
        other => panic!("Expected comparison, got {other:?}"),
    }
}

#[test]
fn collection_hop_in_path_is_rejected() {
    let result = bind("Person", "Pets.Name eq 'Rex'");
    match result {
        Err(BindError::CollectionTraversal { property, .. }) => assert_eq!(property, "Name"),
        other => panic!("Expected collection traversal error, got {other:?}"),
    }
}

// === Literal typing ===

#[test]
fn int_literal_takes_kind_from_property() {
    let bound = bind("Dog", "Age gt 3").expect("bind failed");
    match bound {
        BoundExpr::Compare {
            kind: CompareKind::Int,
            right,
            ..
        } => assert_eq!(*right, BoundExpr::Constant(Value::Int(3))),
        other => panic!("Expected int comparison, got {other:?}"),
    }
}

#[test]
fn whole_literal_against_decimal_property_binds_as_decimal() {
    let bound = bind("Person", "Salary ge 100").expect("bind failed");
    match bound {
        BoundExpr::Compare {
            kind: CompareKind::Decimal,
            right,
            ..
        } => match *right {
            BoundExpr::Constant(Value::Decimal(d)) => assert_eq!(d.to_string(), "100"),
            other => panic!("Expected decimal constant, got {other:?}"),
        },
        other => panic!("Expected decimal comparison, got {other:?}"),
    }
}

#[test]
fn fractional_literal_promotes_int_comparison_to_float() {
    let bound = bind("Dog", "Age gt 3.5").expect("bind failed");
    assert!(matches!(
        bound,
        BoundExpr::Compare {
            kind: CompareKind::Float,
            ..
        }
    ));
}

#[test]
fn int_property_promotes_against_float_property() {
    let bound = bind("Person", "Weight gt 10").expect("bind failed");
    assert!(matches!(
        bound,
        BoundExpr::Compare {
            kind: CompareKind::Float,
            ..
        }
    ));
}

#[test]
fn float_and_decimal_never_mix() {
    let result = bind("Person", "Salary eq Weight");
    assert!(matches!(result, Err(BindError::TypeMismatch { .. })));
}

// === Enums ===

#[test]
fn enum_literal_binds_by_variant() {
    let bound = bind("Dog", "Mood eq 'playful'").expect("bind failed");
    match bound {
        BoundExpr::Compare {
            kind: CompareKind::Enum(def),
            right,
            ..
        } => {
            assert_eq!(def.name, "Temperament");
            // Constant carries the declared casing.
            assert_eq!(
                *right,
                BoundExpr::Constant(Value::String("Playful".to_string()))
            );
        }
        other => panic!("Expected enum comparison, got {other:?}"),
    }
}

#[test]
fn unknown_enum_variant_is_rejected() {
    let result = bind("Dog", "Mood eq 'Grumpy'");
    match result {
        Err(BindError::UnknownEnumVariant {
            enum_name, variant, ..
        }) => {
            assert_eq!(enum_name, "Temperament");
            assert_eq!(variant, "Grumpy");
        }
        other => panic!("Expected unknown variant, got {other:?}"),
    }
}

// === Operator support by kind ===

#[test]
fn guid_ordering_is_rejected() {
    let result = bind("Dog", "Id gt guid'f1b6523c-81a8-4a7e-a91b-2d5e49e3e5a9'");
    assert!(matches!(
        result,
        Err(BindError::ComparisonNotSupported { .. })
    ));
}

#[test]
fn bool_ordering_is_rejected() {
    let result = bind("Person", "Active ge true");
    assert!(matches!(
        result,
        Err(BindError::ComparisonNotSupported { .. })
    ));
}

#[test]
fn null_supports_equality_only() {
    assert!(bind("Dog", "Name eq null").is_ok());
    assert!(bind("Dog", "Name ne null").is_ok());
    let result = bind("Dog", "Age gt null");
    assert!(matches!(result, Err(BindError::NullComparison { .. })));
}

#[test]
fn predicate_must_be_boolean() {
    let result = bind("Dog", "Age add 1");
    assert!(matches!(
        result,
        Err(BindError::PredicateNotBoolean { .. })
    ));
}

// === Methods ===

#[test]
fn unknown_method_is_rejected() {
    let result = bind("Dog", "Name.frobnicate() eq 'x'");
    match result {
        Err(BindError::UnknownMethod { name, .. }) => assert_eq!(name, "frobnicate"),
        other => panic!("Expected unknown method, got {other:?}"),
    }
}

#[test]
fn method_arity_is_checked() {
    let result = bind("Dog", "startswith(Name)");
    assert!(matches!(result, Err(BindError::MethodArity { .. })));
}

#[test]
fn substringof_swaps_free_function_arguments() {
    let bound = bind("Dog", "substringof('ex', Name)").expect("bind failed");
    match bound {
        BoundExpr::Method {
            kind: MethodKind::SubstringOf,
            receiver,
            args,
        } => {
            assert!(matches!(*receiver, BoundExpr::Property { .. }));
            assert_eq!(args, vec![BoundExpr::Constant(Value::String("ex".to_string()))]);
        }
        other => panic!("Expected substringof call, got {other:?}"),
    }
}

#[test]
fn instance_and_free_function_forms_agree() {
    let dotted = bind("Dog", "Name.startswith('Re')").expect("bind failed");
    let free = bind("Dog", "startswith(Name, 'Re')").expect("bind failed");
    assert_eq!(dotted, free);
}

#[test]
fn datetime_component_method_binds() {
    let bound = bind("Dog", "year(BirthDate) eq 2019");
    assert!(bound.is_ok(), "Failed to bind: {:?}", bound.err());
}

// === Quantifiers and lambdas ===

#[test]
fn any_with_lambda_binds_parameter() {
    let bound = bind("Person", "Pets.any(p: p.Age gt 2)").expect("bind failed");
    match bound {
        BoundExpr::Quantifier {
            quantifier: QuantifierKind::Any,
            param,
            predicate,
            ..
        } => {
            assert_eq!(param.as_deref(), Some("p"));
            assert!(predicate.is_some());
        }
        other => panic!("Expected quantifier, got {other:?}"),
    }
}

#[test]
fn any_without_lambda_is_an_emptiness_test() {
    let bound = bind("Person", "Pets.any()").expect("bind failed");
    assert!(matches!(
        bound,
        BoundExpr::Quantifier {
            quantifier: QuantifierKind::Any,
            param: None,
            predicate: None,
            ..
        }
    ));
}

#[test]
fn all_requires_a_lambda() {
    let result = bind("Person", "Pets.all()");
    assert!(matches!(result, Err(BindError::MissingLambda { .. })));
}

#[test]
fn bare_names_inside_lambda_bind_against_the_root() {
    // Name refers to Person.Name even inside the pet lambda.
    let bound = bind("Person", "Pets.any(p: p.Name eq Name)");
    assert!(bound.is_ok(), "Failed to bind: {:?}", bound.err());
}

#[test]
fn quantifier_over_scalar_collection_binds() {
    let bound = bind("Animal", "Nicknames.any(n: n eq 'Rexie')");
    assert!(bound.is_ok(), "Failed to bind: {:?}", bound.err());
}

// === Casts ===

#[test]
fn cast_narrows_to_descendant_type() {
    let bound = bind("Animal", "(this as t'Dog').BarkVolume gt 5").expect("bind failed");
    match bound {
        BoundExpr::Compare { left, .. } => match *left {
            BoundExpr::Property { ref receiver, .. } => {
                assert!(matches!(**receiver, BoundExpr::Cast { ref target, .. } if target == "Dog"));
            }
            other => panic!("Expected property on cast, got {other:?}"),
        },
        other => panic!("Expected comparison, got {other:?}"),
    }
}

#[test]
fn cast_to_unknown_type_is_rejected() {
    let result = bind("Animal", "(this as t'Ferret').Name eq 'x'");
    assert!(matches!(
        result,
        Err(BindError::Schema {
            source: SchemaError::UnknownType { .. },
            ..
        })
    ));
}

// === Membership ===

#[test]
fn in_array_binds_literal_elements() {
    let bound = bind("Dog", "Age in [1, 3, 5]").expect("bind failed");
    match bound {
        BoundExpr::In {
            kind: CompareKind::Int,
            haystack,
            ..
        } => match *haystack {
            BoundExpr::Array(ref values) => {
                assert_eq!(values, &[Value::Int(1), Value::Int(3), Value::Int(5)]);
            }
            other => panic!("Expected array, got {other:?}"),
        },
        other => panic!("Expected membership test, got {other:?}"),
    }
}

#[test]
fn in_collection_property_binds() {
    let bound = bind("Animal", "'Rexie' in Nicknames");
    assert!(bound.is_ok(), "Failed to bind: {:?}", bound.err());
}

#[test]
fn in_with_mismatched_element_is_rejected() {
    let result = bind("Dog", "Age in [1, 'two']");
    assert!(matches!(result, Err(BindError::TypeMismatch { .. })));
}

// === Indexers ===

#[test]
fn dictionary_indexer_binds_with_string_key() {
    let bound = bind("Person", "Attributes['hair'] eq 'brown'");
    assert!(bound.is_ok(), "Failed to bind: {:?}", bound.err());
}

// === Unhandled syntax ===

#[test]
fn unhandled_marker_is_a_hard_bind_error() {
    use charter_ast::{QueryNode, QueryNodeKind};
    let schema = kennel();
    let root = schema.resource("Dog").expect("fixture root");
    let node = QueryNode {
        kind: QueryNodeKind::Unhandled {
            kind: SyntaxKind::OrderByAsc,
        },
        span: Span::dummy(),
    };
    let result = bind_predicate(&schema, root, &node);
    assert!(matches!(result, Err(BindError::UnresolvedSyntax { .. })));
}

#[test]
fn symbol_path_continuations_bind_like_explicit_dots() {
    use charter_ast::{BinaryOperator, QueryNode, QueryNodeKind};
    let schema = kennel();
    let root = schema.resource("Dog").expect("fixture root");

    // External front-ends may attach the path to the identifier instead
    // of spelling out member-access operators.
    let pathy = QueryNode {
        kind: QueryNodeKind::Binary {
            op: BinaryOperator::Eq,
            left: Box::new(QueryNode {
                kind: QueryNodeKind::Symbol {
                    name: "Owner".to_string(),
                    path: vec![QueryNode {
                        kind: QueryNodeKind::Symbol {
                            name: "Name".to_string(),
                            path: Vec::new(),
                        },
                        span: Span::dummy(),
                    }],
                },
                span: Span::dummy(),
            }),
            right: Box::new(QueryNode {
                kind: QueryNodeKind::Str("Nancy".to_string()),
                span: Span::dummy(),
            }),
        },
        span: Span::dummy(),
    };
    let from_path = bind_predicate(&schema, root, &pathy).expect("bind failed");

    let dotted = parse_filter("Owner.Name eq 'Nancy'").expect("parse failed");
    let from_dots = bind_predicate(&schema, root, &dotted).expect("bind failed");
    assert_eq!(from_path, from_dots);
}

// === Order-by ===

#[test]
fn order_by_keys_carry_kind_and_direction() {
    let schema = kennel();
    let root = schema.resource("Dog").expect("fixture root");
    let clauses = parse_order_by("Age desc, Name").expect("parse failed");
    let keys = bind_order_by(&schema, root, &clauses).expect("bind failed");

    assert_eq!(keys.len(), 2);
    assert_eq!(keys[0].kind, CompareKind::Int);
    assert_eq!(keys[0].direction, SortDirection::Descending);
    assert_eq!(keys[1].kind, CompareKind::String);
    assert_eq!(keys[1].direction, SortDirection::Ascending);
}

#[test]
fn order_by_resource_is_rejected() {
    let schema = kennel();
    let root = schema.resource("Dog").expect("fixture root");
    let clauses = parse_order_by("Owner").expect("parse failed");
    let result = bind_order_by(&schema, root, &clauses);
    assert!(matches!(result, Err(BindError::NotSortable { .. })));
}

#[test]
fn order_by_enum_sorts_by_ordinal_kind() {
    let schema = kennel();
    let root = schema.resource("Dog").expect("fixture root");
    let clauses = parse_order_by("Mood").expect("parse failed");
    let keys = bind_order_by(&schema, root, &clauses).expect("bind failed");
    assert!(matches!(keys[0].kind, CompareKind::Enum(_)));
}
