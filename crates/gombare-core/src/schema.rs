//! User-authored identification schema, as deserialized from configuration.
//!
//! A schema is a tree of [`IdentificationParameter`]s. It must be resolved
//! once with [`IdentificationParameter::resolve`] before keys can be built
//! from it; see [`ResolvedSchema`](crate::ResolvedSchema).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::SchemaError;

/// Describes how to identify the entities found at one place of a document.
///
/// ```
/// # use gombare_core::IdentificationParameter;
/// let param = IdentificationParameter::from_json_str(
///     r#"{"_for": {"items": {"_use": ["id"]}}}"#,
/// )?;
/// assert_eq!(param.for_paths["items"].use_props, ["id"]);
/// # Ok::<(), gombare_core::SchemaError>(())
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct IdentificationParameter {
    /// Path segment relative to the parent node; `.` targets the current object.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub at: String,
    /// Leaf properties concatenated into the key, in order.
    #[serde(rename = "_use", default, skip_serializing_if = "Vec::is_empty")]
    pub use_props: Vec<String>,
    /// Suffix repeated keys with an occurrence counter.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub incr: bool,
    /// Conditional branches, evaluated in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub when: Vec<ConditionalIdParameter>,
    /// Inner objects to descend into.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub look: Vec<IdentificationParameter>,
    /// Parameters registered for nested paths.
    #[serde(rename = "_for", default, skip_serializing_if = "BTreeMap::is_empty")]
    pub for_paths: BTreeMap<String, IdentificationParameter>,
    /// Label prefixed to the key when this node is a matching `when` branch.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
}

/// An [`IdentificationParameter`] that only applies when `prop` equals `is`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ConditionalIdParameter {
    /// Property tested on the current object.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub prop: String,
    /// Expected value, compared against the loosely stringified property.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub is: String,
    /// The parameter applied when the gate holds.
    #[serde(flatten)]
    pub param: IdentificationParameter,
}

impl IdentificationParameter {
    /// Decodes a schema from its JSON representation.
    pub fn from_json_str(input: &str) -> Result<Self, SchemaError> {
        Ok(serde_json::from_str(input)?)
    }

    /// Decodes a schema from its YAML representation.
    ///
    /// ```
    /// # use gombare_core::IdentificationParameter;
    /// let param = IdentificationParameter::from_yaml_str("look:\n  - at: meta\n    _use: [name]\n")?;
    /// assert_eq!(param.look[0].at, "meta");
    /// # Ok::<(), gombare_core::SchemaError>(())
    /// ```
    pub fn from_yaml_str(input: &str) -> Result<Self, SchemaError> {
        Ok(serde_yaml::from_str(input)?)
    }

    /// Creates a parameter keyed by the given properties.
    #[must_use]
    pub fn using<I, S>(props: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { use_props: props.into_iter().map(Into::into).collect(), ..Self::default() }
    }

    /// Sets the path segment this parameter applies to.
    #[must_use]
    pub fn at(mut self, at: impl Into<String>) -> Self {
        self.at = at.into();
        self
    }

    /// Enables occurrence suffixes for repeated keys.
    #[must_use]
    pub fn incremented(mut self) -> Self {
        self.incr = true;
        self
    }

    /// Appends a child parameter to descend into.
    #[must_use]
    pub fn looking(mut self, child: IdentificationParameter) -> Self {
        self.look.push(child);
        self
    }

    /// Appends a conditional branch.
    #[must_use]
    pub fn when(mut self, branch: ConditionalIdParameter) -> Self {
        self.when.push(branch);
        self
    }

    /// Registers a parameter for a nested path.
    #[must_use]
    pub fn for_path(mut self, path: impl Into<String>, param: IdentificationParameter) -> Self {
        self.for_paths.insert(path.into(), param);
        self
    }
}

impl ConditionalIdParameter {
    /// Creates a branch named `name` gated on `prop == is`.
    ///
    /// ```
    /// # use gombare_core::{ConditionalIdParameter, IdentificationParameter};
    /// let branch = ConditionalIdParameter::new("kind", "user", "U", IdentificationParameter::using(["login"]));
    /// assert_eq!(branch.param.name, "U");
    /// ```
    #[must_use]
    pub fn new(
        prop: impl Into<String>,
        is: impl Into<String>,
        name: impl Into<String>,
        param: IdentificationParameter,
    ) -> Self {
        Self { prop: prop.into(), is: is.into(), param: IdentificationParameter { name: name.into(), ..param } }
    }
}
