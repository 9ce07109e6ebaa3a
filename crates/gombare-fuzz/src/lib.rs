//! Fuzzing harnesses for `gombare-core`.
//!
//! The helpers in this crate can be reused both from `cargo fuzz` targets and
//! from property-based smoke tests. Each public function accepts raw bytes,
//! drives schema decoding or key building, and swallows every recoverable
//! error: only panics count as findings.
//!
//! # Examples
//!
//! Run the schema harness on a JSON snippet:
//!
//! ```
//! gombare_fuzz::fuzz_schema(br#"{"_use":["id"]}"#);
//! ```
//!
//! Invoke the key harness on deterministic input:
//!
//! ```
//! gombare_fuzz::fuzz_keys(&[1, 2, 3, 4]);
//! ```
#![forbid(unsafe_code)]
#![warn(missing_docs)]

use arbitrary::Unstructured;
use gombare_core::{
    Aggregation, ConditionalIdParameter, IdentificationParameter, KeyBuilder, KeyOptions, Node,
    INDEX_PROP, TEXT_KEY,
};
use serde_json::{Map as JsonMap, Number as JsonNumber, Value as JsonValue};

const MAX_DEPTH: usize = 4;
const MAX_ARRAY_LEN: u8 = 5;
const MAX_OBJECT_LEN: u8 = 5;
const MAX_SCHEMA_DEPTH: usize = 3;
const MAX_CHILDREN: u8 = 3;

/// Property names shared by generated schemas and documents so that lookups
/// actually hit something.
const VOCABULARY: [&str; 7] = ["id", "kind", "items", "meta", ".", TEXT_KEY, INDEX_PROP];

/// Feeds arbitrary bytes through schema decoding and resolution.
///
/// ```
/// gombare_fuzz::fuzz_schema(b"not a schema");
/// ```
pub fn fuzz_schema(data: &[u8]) {
    if let Ok(text) = std::str::from_utf8(data) {
        if let Ok(param) = IdentificationParameter::from_json_str(text) {
            if let Ok(schema) = param.resolve() {
                let _ = schema.to_parameter(schema.root());
            }
        }
        let _ = IdentificationParameter::from_yaml_str(text);
    }
}

/// Builds keys for a random document under a random schema, in both
/// aggregation modes, and checks that keying is deterministic.
///
/// ```
/// gombare_fuzz::fuzz_keys(b"keys");
/// ```
pub fn fuzz_keys(data: &[u8]) {
    let mut unstructured = Unstructured::new(data);
    let Ok(param) = random_param(&mut unstructured, 0) else {
        return;
    };
    let Ok(value) = random_value(&mut unstructured, 0) else {
        return;
    };
    let Ok(schema) = param.resolve() else {
        return;
    };
    let Ok(document) = Node::from_json_value(value) else {
        return;
    };
    let Some(object) = document.as_object() else {
        return;
    };

    for aggregation in [Aggregation::Sorted, Aggregation::Document] {
        let options = KeyOptions::default().with_aggregation(aggregation);
        let first = KeyBuilder::with_options(&schema, options.clone()).build_key(schema.root(), object, object);
        let second = KeyBuilder::with_options(&schema, options).build_key(schema.root(), object, object);
        assert_eq!(first, second, "keys must be deterministic");
    }
}

fn random_param(
    unstructured: &mut Unstructured<'_>,
    depth: usize,
) -> Result<IdentificationParameter, arbitrary::Error> {
    let mut param = IdentificationParameter {
        at: random_word(unstructured)?.to_string(),
        incr: unstructured.arbitrary()?,
        ..IdentificationParameter::default()
    };
    if depth >= MAX_SCHEMA_DEPTH || unstructured.ratio(1, 2)? {
        for _ in 0..unstructured.int_in_range::<u8>(1..=MAX_CHILDREN)? {
            param.use_props.push(random_word(unstructured)?.to_string());
        }
        return Ok(param);
    }
    for _ in 0..unstructured.int_in_range::<u8>(0..=MAX_CHILDREN)? {
        param.look.push(random_param(unstructured, depth + 1)?);
    }
    if unstructured.arbitrary()? {
        let branch = random_param(unstructured, depth + 1)?;
        let prop = random_word(unstructured)?;
        let is = random_word(unstructured)?;
        param.when.push(ConditionalIdParameter::new(prop, is, random_word(unstructured)?, branch));
    }
    Ok(param)
}

fn random_value(unstructured: &mut Unstructured<'_>, depth: usize) -> Result<JsonValue, arbitrary::Error> {
    if depth >= MAX_DEPTH {
        return random_leaf(unstructured);
    }
    match unstructured.int_in_range::<u8>(0..=5)? {
        0..=2 => {
            let len = usize::from(unstructured.int_in_range::<u8>(0..=MAX_OBJECT_LEN)?);
            let mut map = JsonMap::new();
            for _ in 0..len {
                let key = random_word(unstructured)?.to_string();
                map.insert(key, random_value(unstructured, depth + 1)?);
            }
            Ok(JsonValue::Object(map))
        }
        3 => {
            let len = usize::from(unstructured.int_in_range::<u8>(0..=MAX_ARRAY_LEN)?);
            let mut items = Vec::with_capacity(len);
            for _ in 0..len {
                items.push(random_value(unstructured, depth + 1)?);
            }
            Ok(JsonValue::Array(items))
        }
        _ => random_leaf(unstructured),
    }
}

fn random_leaf(unstructured: &mut Unstructured<'_>) -> Result<JsonValue, arbitrary::Error> {
    match unstructured.int_in_range::<u8>(0..=3)? {
        0 => Ok(JsonValue::Null),
        1 => Ok(JsonValue::Bool(unstructured.arbitrary()?)),
        2 => {
            let numerator = f64::from(unstructured.arbitrary::<i32>()?);
            let denominator = f64::from(unstructured.int_in_range::<u16>(1..=8)?);
            JsonNumber::from_f64(numerator / denominator)
                .map(JsonValue::Number)
                .ok_or(arbitrary::Error::IncorrectFormat)
        }
        _ => Ok(JsonValue::String(random_word(unstructured)?.to_string())),
    }
}

fn random_word(unstructured: &mut Unstructured<'_>) -> Result<&'static str, arbitrary::Error> {
    unstructured.choose(&VOCABULARY).copied()
}
