use std::thread;

use gombare_core::{
    Aggregation, ConditionalIdParameter, IdentificationParameter, KeyBuilder, KeyError, KeyOptions,
    Node, ResolvedSchema,
};
use proptest::prelude::*;

fn resolve(json: &str) -> ResolvedSchema {
    IdentificationParameter::from_json_str(json).expect("schema parses").resolve().expect("schema resolves")
}

fn root_key(schema: &ResolvedSchema, doc: &str, options: KeyOptions) -> Result<String, KeyError> {
    let node = Node::from_json_str(doc).expect("document parses");
    let object = node.as_object().expect("object document");
    KeyBuilder::with_options(schema, options).build_key(schema.root(), object, object)
}

#[test]
fn numbers_are_canonicalized_in_keys() {
    let schema = resolve(r#"{"_use": ["a", "b", "c"]}"#);
    let key = root_key(&schema, r#"{"a": 3.0, "b": 3.5, "c": -2.0}"#, KeyOptions::default()).unwrap();
    assert_eq!(key, "3+3.500000+-2");
}

#[test]
fn absent_and_null_properties_differ() {
    let schema = resolve(r#"{"_use": ["p"]}"#);
    assert_eq!(root_key(&schema, "{}", KeyOptions::default()).unwrap(), "(p)");
    assert_eq!(root_key(&schema, r#"{"p": null}"#, KeyOptions::default()).unwrap(), "p");
}

#[test]
fn first_matching_branch_wins() {
    let schema = resolve(
        r#"{"when": [
            {"prop": "kind", "is": "a", "name": "first", "_use": ["x"]},
            {"prop": "kind", "is": "a", "name": "second", "_use": ["tags"]}
        ]}"#,
    );
    // the second branch would fail on the array, proving it is never evaluated
    let key = root_key(&schema, r#"{"kind": "a", "x": 1, "tags": [1]}"#, KeyOptions::default()).unwrap();
    assert_eq!(key, "first+1");
}

#[test]
fn increment_disambiguates_siblings_in_document_order() {
    let schema = resolve(r#"{"_use": ["v"], "incr": true}"#);
    let doc = Node::from_json_str(r#"{"list": [{"v": "X"}, {"v": "X"}, {"v": "X"}]}"#).unwrap();
    let container = doc.as_object().unwrap();
    let items = container["list"].as_array().unwrap();
    let keys = KeyBuilder::new(&schema).key_elements(schema.root(), container, items).unwrap();
    assert_eq!(keys, ["X#1", "X#2", "X#3"]);
}

#[test]
fn empty_use_is_fatal_only_outside_branches() {
    let plain = resolve(r#"{"at": "rows", "_use": ["a", "b"]}"#);
    let err = root_key(&plain, r#"{"a": "", "b": ""}"#, KeyOptions::default()).unwrap_err();
    assert_eq!(err, KeyError::EmptyKey { path: "rows".to_string(), rule: "_use" });
    assert_eq!(
        err.to_string(),
        "the '_use' configuration at path 'rows' did not allow us to build a non-empty ID key"
    );

    let conditional = resolve(r#"{"at": "rows", "when": [{"prop": "k", "is": "v", "_use": ["a", "b"]}]}"#);
    let key = root_key(&conditional, r#"{"k": "v", "a": "", "b": ""}"#, KeyOptions::default()).unwrap();
    assert_eq!(key, "");
}

#[test]
fn array_aggregation_is_sorted_by_default() {
    let schema = resolve(r#"{"look": [{"at": "items", "look": [{"_use": ["id"]}]}]}"#);
    let doc = r#"{"items": [{"id": "b"}, {"id": "a"}]}"#;
    assert_eq!(root_key(&schema, doc, KeyOptions::default()).unwrap(), "a|b");
}

#[test]
fn array_aggregation_can_keep_document_order() {
    let schema = resolve(r#"{"look": [{"at": "items", "look": [{"_use": ["id"]}]}]}"#);
    let doc = r#"{"items": [{"id": "b"}, {"id": "a"}]}"#;
    let options = KeyOptions::default().with_aggregation(Aggregation::Document);
    assert_eq!(root_key(&schema, doc, options).unwrap(), "b|a");
}

#[test]
fn schemas_assembled_in_code_behave_like_decoded_ones() {
    let rows = IdentificationParameter::default()
        .when(ConditionalIdParameter::new("kind", "x", "X", IdentificationParameter::using(["a"])))
        .looking(IdentificationParameter::using(["id"]).at("."))
        .incremented();
    let schema = IdentificationParameter::default().for_path("rows", rows).resolve().unwrap();
    let param = schema.lookup(["rows"]).unwrap();

    let doc = Node::from_json_str(
        r#"{"rows": [{"kind": "x", "a": "1"}, {"id": 7}, {"kind": "x", "a": "1"}]}"#,
    )
    .unwrap();
    let container = doc.as_object().unwrap();
    let items = container["rows"].as_array().unwrap();
    let keys = KeyBuilder::new(&schema).key_elements(param, container, items).unwrap();
    assert_eq!(keys, ["X+1#1", "7#1", "X+1#2"]);
}

#[test]
fn resolved_schema_is_shared_across_threads() {
    let schema = resolve(r#"{"_for": {"list": {"_use": ["id"], "incr": true}}}"#);
    let param = schema.lookup(["list"]).unwrap();
    let docs = [
        r#"{"list": [{"id": 1}, {"id": 1}]}"#,
        r#"{"list": [{"id": 2}, {"id": 3}, {"id": 2}]}"#,
    ];

    let results: Vec<Vec<String>> = thread::scope(|scope| {
        let handles: Vec<_> = docs
            .iter()
            .map(|doc| {
                let schema = &schema;
                scope.spawn(move || {
                    let node = Node::from_json_str(doc).unwrap();
                    let container = node.as_object().unwrap();
                    let items = container["list"].as_array().unwrap();
                    KeyBuilder::new(schema).key_elements(param, container, items).unwrap()
                })
            })
            .collect();
        handles.into_iter().map(|handle| handle.join().unwrap()).collect()
    });

    assert_eq!(results[0], ["1#1", "1#2"]);
    assert_eq!(results[1], ["2#1", "3#1", "2#2"]);
}

proptest! {
    #[test]
    fn keys_are_deterministic(ids in proptest::collection::vec("[a-z0-9]{1,6}", 0..6), n in -1000i64..1000) {
        let schema = resolve(r#"{"look": [{"at": ".", "_use": ["n"]}, {"at": "items", "_use": ["id"]}]}"#);
        let items: Vec<_> = ids.iter().map(|id| serde_json::json!({"id": id})).collect();
        let doc = serde_json::json!({"n": n, "items": items}).to_string();
        let first = root_key(&schema, &doc, KeyOptions::default()).unwrap();
        let second = root_key(&schema, &doc, KeyOptions::default()).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn sorted_keys_ignore_element_order(mut ids in proptest::collection::vec("[a-z]{1,4}", 1..6)) {
        let schema = resolve(r#"{"look": [{"at": "items", "_use": ["id"]}]}"#);
        let build = |ids: &[String]| {
            let items: Vec<_> = ids.iter().map(|id| serde_json::json!({"id": id})).collect();
            let doc = serde_json::json!({"items": items}).to_string();
            root_key(&schema, &doc, KeyOptions::default()).unwrap()
        };
        let forward = build(&ids);
        ids.reverse();
        prop_assert_eq!(forward, build(&ids));
    }
}
