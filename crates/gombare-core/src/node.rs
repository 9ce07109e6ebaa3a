use std::collections::BTreeMap;

use serde_json::Value as JsonValue;
use serde_yaml::Value as YamlValue;

use crate::{CanonicalizeError, Number};

/// A decoded document mapping with deterministic key ordering.
pub type Object = BTreeMap<String, Node>;

/// Represents the in-memory document model walked by the key builder.
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    /// JSON `null`.
    Null,
    /// JSON boolean.
    Bool(bool),
    /// JSON number represented as IEEE-754 double precision.
    Number(Number),
    /// JSON string.
    String(String),
    /// JSON array.
    Array(Vec<Node>),
    /// JSON object.
    Object(Object),
}

impl Node {
    /// Parses a JSON string into the document model.
    ///
    /// ```
    /// # use gombare_core::Node;
    /// let node = Node::from_json_str("{\"hello\":\"world\"}")?;
    /// assert!(matches!(node, Node::Object(_)));
    /// # Ok::<(), gombare_core::CanonicalizeError>(())
    /// ```
    pub fn from_json_str(input: &str) -> Result<Self, CanonicalizeError> {
        let value: JsonValue = serde_json::from_str(input)?;
        Self::from_json_value(value)
    }

    /// Parses a YAML string into the document model.
    ///
    /// ```
    /// # use gombare_core::Node;
    /// let node = Node::from_yaml_str("---\nanswer: 42\n")?;
    /// assert!(matches!(node, Node::Object(_)));
    /// # Ok::<(), gombare_core::CanonicalizeError>(())
    /// ```
    pub fn from_yaml_str(input: &str) -> Result<Self, CanonicalizeError> {
        let value: YamlValue = serde_yaml::from_str(input)?;
        Self::from_yaml_value(value)
    }

    /// Converts a serde JSON value into a [`Node`].
    pub fn from_json_value(value: JsonValue) -> Result<Self, CanonicalizeError> {
        match value {
            JsonValue::Null => Ok(Self::Null),
            JsonValue::Bool(v) => Ok(Self::Bool(v)),
            JsonValue::Number(num) => {
                let Some(as_f64) = num.as_f64() else {
                    return Err(CanonicalizeError::NumberOutOfRange { value: num.to_string() });
                };
                Ok(Self::Number(Number::new(as_f64)?))
            }
            JsonValue::String(s) => Ok(Self::String(s)),
            JsonValue::Array(values) => {
                let mut items = Vec::with_capacity(values.len());
                for value in values {
                    items.push(Self::from_json_value(value)?);
                }
                Ok(Self::Array(items))
            }
            JsonValue::Object(map) => {
                let mut object = Object::new();
                for (key, value) in map {
                    object.insert(key, Self::from_json_value(value)?);
                }
                Ok(Self::Object(object))
            }
        }
    }

    fn from_yaml_value(value: YamlValue) -> Result<Self, CanonicalizeError> {
        match value {
            YamlValue::Null => Ok(Self::Null),
            YamlValue::Bool(v) => Ok(Self::Bool(v)),
            YamlValue::Number(num) => {
                if let Some(f) = num.as_f64() {
                    return Ok(Self::Number(Number::new(f)?));
                }
                if let Some(i) = num.as_i64() {
                    return Ok(Self::Number(Number::new(i as f64)?));
                }
                if let Some(u) = num.as_u64() {
                    return Ok(Self::Number(Number::new(u as f64)?));
                }
                Err(CanonicalizeError::NumberOutOfRange { value: num.to_string() })
            }
            YamlValue::String(s) => Ok(Self::String(s)),
            YamlValue::Sequence(seq) => {
                let mut items = Vec::with_capacity(seq.len());
                for value in seq {
                    items.push(Self::from_yaml_value(value)?);
                }
                Ok(Self::Array(items))
            }
            YamlValue::Mapping(map) => {
                let mut object = Object::new();
                for (key, value) in map {
                    let key = match key {
                        YamlValue::String(s) => s,
                        other => {
                            return Err(CanonicalizeError::NonStringYamlKey {
                                found: format!("{other:?}"),
                            });
                        }
                    };
                    object.insert(key, Self::from_yaml_value(value)?);
                }
                Ok(Self::Object(object))
            }
            YamlValue::Tagged(tagged) => {
                Err(CanonicalizeError::UnsupportedYamlTag { tag: tagged.tag.to_string() })
            }
        }
    }

    /// Returns the mapping held by this node, if any.
    #[must_use]
    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Self::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Returns the elements held by this node, if it is an array.
    #[must_use]
    pub fn as_array(&self) -> Option<&[Node]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Navigates a sequence of object keys from this node.
    ///
    /// ```
    /// # use gombare_core::Node;
    /// let node = Node::from_json_str("{\"a\":{\"b\":[1]}}")?;
    /// assert!(node.pointer(["a", "b"]).and_then(Node::as_array).is_some());
    /// assert!(node.pointer(["a", "c"]).is_none());
    /// # Ok::<(), gombare_core::CanonicalizeError>(())
    /// ```
    #[must_use]
    pub fn pointer<'a, I>(&self, segments: I) -> Option<&Node>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut current = self;
        for segment in segments {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }

    /// Short description of the value shape, used in diagnostics.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Array(_) => "array",
            Self::Object(_) => "object",
        }
    }
}

impl TryFrom<JsonValue> for Node {
    type Error = CanonicalizeError;

    fn try_from(value: JsonValue) -> Result<Self, Self::Error> {
        Self::from_json_value(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::{
        collection::{btree_map, vec},
        prelude::*,
        string::string_regex,
    };

    fn arb_json_value() -> impl Strategy<Value = JsonValue> {
        let leaf = prop_oneof![
            Just(JsonValue::Null),
            any::<bool>().prop_map(JsonValue::Bool),
            (-1_000_000i64..1_000_000).prop_map(|i| JsonValue::Number(i.into())),
            string_regex("[a-zA-Z0-9]{0,8}").unwrap().prop_map(JsonValue::String),
        ];
        leaf.prop_recursive(4, 8, 4, move |inner| {
            prop_oneof![
                vec(inner.clone(), 0..4).prop_map(JsonValue::Array),
                btree_map(string_regex("[a-zA-Z0-9]{1,8}").unwrap(), inner, 0..4)
                    .prop_map(|map| JsonValue::Object(map.into_iter().collect())),
            ]
        })
    }

    #[test]
    fn empty_input_is_an_error() {
        let err = Node::from_json_str("   \n\t").unwrap_err();
        assert!(matches!(err, CanonicalizeError::Json(_)));
    }

    #[test]
    fn json_number_out_of_range_yields_error() {
        let err = Node::from_json_str("1e400").unwrap_err();
        match err {
            CanonicalizeError::NumberOutOfRange { .. } | CanonicalizeError::Json(_) => {}
            other => panic!("unexpected error variant: {other:?}"),
        }
    }

    #[test]
    fn yaml_non_string_key_errors() {
        let err = Node::from_yaml_str("? [1, 2]: 3").unwrap_err();
        let CanonicalizeError::NonStringYamlKey { .. } = err else {
            panic!("expected NonStringYamlKey error");
        };
    }

    #[test]
    fn yaml_and_json_agree_on_the_same_document() {
        let json = Node::from_json_str("{\"items\":[{\"id\":1},{\"id\":\"x\"}],\"flag\":true}").unwrap();
        let yaml = Node::from_yaml_str("items:\n  - id: 1\n  - id: x\nflag: true\n").unwrap();
        assert_eq!(json, yaml);
    }

    #[test]
    fn pointer_stops_at_non_objects() {
        let node = Node::from_json_str("{\"a\":[{\"b\":1}]}").unwrap();
        assert!(node.pointer(["a", "b"]).is_none());
        assert_eq!(node.pointer([]), Some(&node));
    }

    proptest! {
        #[test]
        fn parsed_and_converted_values_agree(value in arb_json_value()) {
            let converted = Node::from_json_value(value.clone()).unwrap();
            let parsed = Node::from_json_str(&value.to_string()).unwrap();
            prop_assert_eq!(converted, parsed);
        }
    }
}
