//! Whole-pipeline tests through the workspace facade: a schema document,
//! query URLs, result envelopes and the links between pages.

use charter::query::{run_query, QueryError, QueryResult};
use charter::schema::{SchemaDoc, SchemaSet};
use serde_json::json;

const KENNEL: &str = r#"{
    "enums": [
        { "name": "Temperament", "variants": ["Calm", "Playful", "Wild"] }
    ],
    "resources": [
        {
            "name": "Animal",
            "properties": [
                { "name": "Name", "type": "string", "internal": "name" },
                { "name": "Age", "type": "int", "internal": "age" },
                { "name": "Mood", "type": "Temperament", "internal": "mood" },
                { "name": "Owner", "type": "Person", "internal": "owner" }
            ]
        },
        {
            "name": "Dog",
            "base": "Animal",
            "properties": [
                { "name": "BarkVolume", "type": "int", "internal": "bark_volume" }
            ]
        },
        {
            "name": "Person",
            "properties": [
                { "name": "Name", "type": "string", "internal": "name" },
                { "name": "Pets", "type": "[Animal]", "internal": "pets" }
            ]
        }
    ]
}"#;

fn schema() -> SchemaSet {
    let doc: SchemaDoc = serde_json::from_str(KENNEL).expect("schema document must parse");
    doc.build().expect("schema document must build")
}

fn dogs() -> Vec<serde_json::Value> {
    vec![
        json!({"_type": "Dog", "name": "Rex", "age": 5, "mood": "Playful"}),
        json!({"_type": "Dog", "name": "Spot", "age": 2, "mood": "Calm"}),
        json!({"_type": "Dog", "name": "Bella", "age": 9, "mood": "Wild"}),
        json!({"_type": "Dog", "name": "Max", "age": 5, "mood": "Calm"}),
        json!({"_type": "Dog", "name": "Luna", "mood": "Playful"}),
        json!({"_type": "Dog", "name": "Toby", "age": 1, "mood": "Wild"}),
    ]
}

fn names(result: &QueryResult<serde_json::Value>) -> Vec<String> {
    result
        .items()
        .iter()
        .map(|item| item["name"].as_str().unwrap_or("?").to_string())
        .collect()
}

#[test]
fn conjunctive_filter_over_json_entities() {
    let schema = schema();
    let root = schema.resource("Dog").expect("Dog must exist");
    let result = run_query(
        &schema,
        root,
        "/dogs?$filter=Name eq 'Rex' and Age gt 3",
        &dogs(),
    )
    .expect("query failed");
    assert_eq!(names(&result), vec!["Rex"]);
    assert_eq!(result.total_count(), 1);
}

#[test]
fn pages_link_back_and_forward_through_the_same_query() {
    let schema = schema();
    let root = schema.resource("Dog").expect("Dog must exist");
    let dogs = dogs();
    let url = "/dogs?$filter=Age+gt+1&$orderby=Name&$top=2";

    let first = run_query(&schema, root, url, &dogs).expect("query failed");
    assert_eq!(names(&first), vec!["Bella", "Max"]);
    assert_eq!(first.total_count(), 4);
    assert_eq!(first.previous(), None);

    // The next link is itself a runnable query.
    let next_url = first.next().expect("a second page must exist");
    assert_eq!(next_url, "/dogs?$filter=Age+gt+1&$orderby=Name&$top=2&$skip=2");
    let second = run_query(&schema, root, &next_url, &dogs).expect("query failed");
    assert_eq!(names(&second), vec!["Rex", "Spot"]);
    assert_eq!(second.next(), None);

    // And so is the way back.
    let back_url = second.previous().expect("the first page must exist");
    let back = run_query(&schema, root, &back_url, &dogs).expect("query failed");
    assert_eq!(names(&back), vec!["Bella", "Max"]);
}

#[test]
fn envelope_renders_counts_items_and_links() {
    let schema = schema();
    let root = schema.resource("Dog").expect("Dog must exist");
    let result = run_query(&schema, root, "/dogs?$orderby=Name&$top=2&$skip=2", &dogs())
        .expect("query failed");
    let rendered = serde_json::to_value(result.envelope()).expect("envelope must serialize");
    assert_eq!(rendered["totalCount"], json!(6));
    assert_eq!(rendered["skip"], json!(2));
    assert_eq!(rendered["items"].as_array().map(Vec::len), Some(2));
    assert_eq!(rendered["previous"], json!("/dogs?$orderby=Name&$top=2&$skip=0"));
    assert_eq!(rendered["next"], json!("/dogs?$orderby=Name&$top=2&$skip=4"));
}

#[test]
fn unknown_property_rejects_the_whole_query() {
    let schema = schema();
    let root = schema.resource("Dog").expect("Dog must exist");
    let err = run_query(&schema, root, "/dogs?$filter=Foo eq 3", &dogs()).unwrap_err();
    assert!(matches!(err, QueryError::Bind(_)));
    assert_eq!(err.code(), "E-SCHEMA-UNKNOWN-PROPERTY");
}

#[test]
fn quantifiers_reach_through_nested_collections() {
    let schema = schema();
    let root = schema.resource("Person").expect("Person must exist");
    let people = vec![
        json!({"name": "Anna", "pets": [
            {"_type": "Dog", "name": "Bella", "age": 9}
        ]}),
        json!({"name": "Ben", "pets": [
            {"_type": "Dog", "name": "Spot", "age": 2}
        ]}),
        json!({"name": "Cleo"}),
    ];
    let result = run_query(
        &schema,
        root,
        "/people?$filter=Pets.any(p: p.Age gt 8)",
        &people,
    )
    .expect("query failed");
    assert_eq!(names(&result), vec!["Anna"]);
}

#[test]
fn type_narrowing_filters_a_mixed_collection() {
    let schema = schema();
    let root = schema.resource("Animal").expect("Animal must exist");
    let animals = vec![
        json!({"_type": "Dog", "name": "Rex", "bark_volume": 7}),
        json!({"_type": "Dog", "name": "Spot", "bark_volume": 2}),
        json!({"_type": "Animal", "name": "Whiskers"}),
    ];
    let result = run_query(
        &schema,
        root,
        "/animals?$filter=(this as t'Dog').BarkVolume gt 5",
        &animals,
    )
    .expect("query failed");
    assert_eq!(names(&result), vec!["Rex"]);
}
