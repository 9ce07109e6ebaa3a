//! Schema-driven identity keys.
//!
//! A [`KeyBuilder`] walks a document node together with a resolved schema
//! node and applies the first rule that fits:
//!
//! 1. `when`: the first branch whose gate holds names the key
//!    (`<name>+<branch key>`);
//! 2. `_use`: the listed properties, joined with `+`;
//! 3. `look`: fragments of the inner objects, joined with `+`; arrays of
//!    objects contribute their element keys joined with `|`.
//!
//! With `incr` set, the key is then suffixed with its occurrence count in the
//! enclosing container.
//!
//! ```
//! use gombare_core::{IdentificationParameter, KeyBuilder, Node};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let schema = IdentificationParameter::from_json_str(
//!         r#"{"look": [{"at": "items", "look": [{"_use": ["id"]}]}]}"#,
//!     )?
//!     .resolve()?;
//!     let doc = Node::from_json_str(r#"{"items": [{"id": "b"}, {"id": "a"}]}"#)?;
//!     let object = doc.as_object().expect("object document");
//!
//!     let mut builder = KeyBuilder::new(&schema);
//!     assert_eq!(builder.build_key(schema.root(), object, object)?, "a|b");
//!     Ok(())
//! }
//! ```

use std::collections::HashSet;

use tracing::{debug, trace, warn};

use crate::extract::{extract_value, UnsupportedValue};
use crate::{Aggregation, IncrementCounter, KeyError, KeyOptions, Node, Object, ParamId, ResolvedSchema};

/// Separator between the fragments of one key.
pub const SEP_PLUS: &str = "+";
/// Separator between the keys of an array's elements.
pub const SEP_PIPE: &str = "|";
/// `at` value designating the current object itself.
pub const CURRENT_PATH: &str = ".";

/// Joins two fragments with `sep`, treating an empty side as absent.
///
/// ```
/// # use gombare_core::concat_separated;
/// assert_eq!(concat_separated("a", "+", "b"), "a+b");
/// assert_eq!(concat_separated("", "+", "b"), "b");
/// assert_eq!(concat_separated("a", "+", ""), "a");
/// ```
#[must_use]
pub fn concat_separated(first: &str, sep: &str, second: &str) -> String {
    match (first.is_empty(), second.is_empty()) {
        (true, _) => second.to_string(),
        (_, true) => first.to_string(),
        _ => format!("{first}{sep}{second}"),
    }
}

/// Builds identity keys for the nodes of one document.
///
/// The builder borrows the document for `'doc` and owns the increment
/// counters of every container it visits, so it should live as long as the
/// keys of one document are being produced.
#[derive(Debug)]
pub struct KeyBuilder<'s, 'doc> {
    schema: &'s ResolvedSchema,
    options: KeyOptions,
    counter: IncrementCounter<'doc>,
}

impl<'s, 'doc> KeyBuilder<'s, 'doc> {
    /// Creates a builder with default [`KeyOptions`].
    #[must_use]
    pub fn new(schema: &'s ResolvedSchema) -> Self {
        Self::with_options(schema, KeyOptions::default())
    }

    /// Creates a builder with explicit options.
    #[must_use]
    pub fn with_options(schema: &'s ResolvedSchema, options: KeyOptions) -> Self {
        Self { schema, options, counter: IncrementCounter::new() }
    }

    /// Builds the key of `current`, found inside `container`, according to `param`.
    ///
    /// `#index` resolves to `#1`; use [`KeyBuilder::build_key_at`] to supply
    /// the element's position.
    pub fn build_key(
        &mut self,
        param: ParamId,
        container: &'doc Object,
        current: &'doc Object,
    ) -> Result<String, KeyError> {
        self.build_key_at(param, container, current, 0)
    }

    /// Builds the key of the element at zero-based `position` of its array.
    ///
    /// The position only reaches `#index` at this level. Elements of arrays
    /// nested below `current` resolve `#index` to their own position within
    /// those arrays: a `look` into `items` using `#index` over
    /// `[{"items": [{}, {}]}, {"items": [{}]}]` yields `#1|#2` and `#1`.
    pub fn build_key_at(
        &mut self,
        param: ParamId,
        container: &'doc Object,
        current: &'doc Object,
        position: usize,
    ) -> Result<String, KeyError> {
        self.key_for(param, container, current, position)
    }

    /// Keys every element of an array held by `container`.
    ///
    /// Elements must be objects. Unless disabled in the options, two
    /// elements producing the same key is an error.
    ///
    /// ```
    /// # use gombare_core::{IdentificationParameter, KeyBuilder, Node};
    /// let schema = IdentificationParameter::from_json_str(r#"{"_use": ["id"], "incr": true}"#)?.resolve()?;
    /// let doc = Node::from_json_str(r#"{"list": [{"id": "X"}, {"id": "X"}]}"#)?;
    /// let container = doc.as_object().expect("object");
    /// let items = container["list"].as_array().expect("array");
    ///
    /// let keys = KeyBuilder::new(&schema).key_elements(schema.root(), container, items)?;
    /// assert_eq!(keys, ["X#1", "X#2"]);
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn key_elements(
        &mut self,
        param: ParamId,
        container: &'doc Object,
        elements: &'doc [Node],
    ) -> Result<Vec<String>, KeyError> {
        let schema = self.schema;
        let mut keys = Vec::with_capacity(elements.len());
        for (position, element) in elements.iter().enumerate() {
            let object = self.element_object(param, element)?;
            let key = self.key_for(param, container, object, position)?;
            trace!(position, key = %key, "built ID key");
            keys.push(key);
        }
        debug!(
            param = schema.full_path(param),
            elements = keys.len(),
            aggregation = %self.options.aggregation(),
            "keyed array elements"
        );

        let mut seen = HashSet::with_capacity(keys.len());
        for key in &keys {
            if seen.insert(key.as_str()) {
                continue;
            }
            if self.options.verify_unique() {
                return Err(KeyError::DuplicateKey {
                    path: schema.full_path(param).to_string(),
                    key: key.clone(),
                });
            }
            warn!(param = schema.full_path(param), key = %key, "ID key is not unique");
        }
        Ok(keys)
    }

    fn key_for(
        &mut self,
        id: ParamId,
        container: &'doc Object,
        current: &'doc Object,
        position: usize,
    ) -> Result<String, KeyError> {
        let key = self.raw_key(id, container, current, position)?;
        if self.schema.param(id).incr() && !key.is_empty() {
            return Ok(self.counter.next(container, &key));
        }
        Ok(key)
    }

    fn raw_key(
        &mut self,
        id: ParamId,
        container: &'doc Object,
        current: &'doc Object,
        position: usize,
    ) -> Result<String, KeyError> {
        let schema = self.schema;
        let param = schema.param(id);

        for &branch_id in param.when() {
            let branch = schema.param(branch_id);
            if branch.gate().is_some_and(|gate| gate.is_verified_by(Some(current))) {
                let inner = self.key_for(branch_id, container, current, position)?;
                return Ok(concat_separated(branch.name(), SEP_PLUS, &inner));
            }
        }

        if !param.use_props().is_empty() {
            let mut key = String::new();
            for prop in param.use_props() {
                let value = extract_value(current, prop, position).map_err(|err| self.unsupported(id, err))?;
                key = concat_separated(&key, SEP_PLUS, &value);
            }
            return self.non_empty(id, key, "_use");
        }

        let mut key = String::new();
        for &child_id in param.look() {
            let child = schema.param(child_id);
            let fragment = if child.at() == CURRENT_PATH {
                self.key_for(child_id, container, current, position)?
            } else {
                match current.get(child.at()) {
                    None => format!("({})", child.at()),
                    Some(Node::Null) => format!("{}empty ??", child.at()),
                    Some(Node::Object(inner)) => self.key_for(child_id, current, inner, position)?,
                    Some(Node::Array(items)) => self.aggregate(child_id, current, items)?,
                    Some(other) => {
                        return Err(KeyError::UnsupportedShape {
                            path: schema.full_path(id).to_string(),
                            at: child.at().to_string(),
                            found: other.kind(),
                        });
                    }
                }
            };
            key = concat_separated(&key, SEP_PLUS, &fragment);
        }
        self.non_empty(id, key, "look")
    }

    fn aggregate(&mut self, id: ParamId, container: &'doc Object, items: &'doc [Node]) -> Result<String, KeyError> {
        let conditional = self.schema.param(id).is_conditional();
        let mut fragments = Vec::with_capacity(items.len());
        for (position, item) in items.iter().enumerate() {
            let element = self.element_object(id, item)?;
            let key = self.key_for(id, container, element, position)?;
            if !key.is_empty() || !conditional {
                fragments.push(key);
            }
        }
        if self.options.aggregation() == Aggregation::Sorted {
            fragments.sort_unstable();
        }
        Ok(fragments.join(SEP_PIPE))
    }

    fn element_object(&self, id: ParamId, element: &'doc Node) -> Result<&'doc Object, KeyError> {
        element.as_object().ok_or_else(|| KeyError::UnsupportedShape {
            path: self.schema.full_path(id).to_string(),
            at: self.schema.param(id).at().to_string(),
            found: element.kind(),
        })
    }

    fn non_empty(&self, id: ParamId, key: String, rule: &'static str) -> Result<String, KeyError> {
        let param = self.schema.param(id);
        if key.is_empty() && !param.is_conditional() {
            return Err(KeyError::EmptyKey { path: self.schema.full_path(id).to_string(), rule });
        }
        Ok(key)
    }

    fn unsupported(&self, id: ParamId, err: UnsupportedValue) -> KeyError {
        KeyError::UnsupportedShape {
            path: self.schema.full_path(id).to_string(),
            at: err.prop,
            found: err.found,
        }
    }
}
