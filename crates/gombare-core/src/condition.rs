use std::borrow::Cow;

use crate::{Node, Object};

/// Rendering of null and absent properties in the loose form.
const NIL: &str = "<nil>";

/// The `prop == is` test guarding a `when` branch.
///
/// The comparison is intentionally looser than key extraction: values are
/// rendered in their default textual form rather than canonicalized.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Gate {
    prop: String,
    is: String,
}

impl Gate {
    /// Creates a gate testing `prop` against the expected text `is`.
    #[must_use]
    pub fn new(prop: impl Into<String>, is: impl Into<String>) -> Self {
        Self { prop: prop.into(), is: is.into() }
    }

    /// The tested property name.
    #[must_use]
    pub fn prop(&self) -> &str {
        &self.prop
    }

    /// The expected value.
    #[must_use]
    pub fn is(&self) -> &str {
        &self.is
    }

    /// Returns true when `object` holds the expected value under the tested property.
    ///
    /// ```
    /// # use gombare_core::{Gate, Node};
    /// let doc = Node::from_json_str(r#"{"kind": "user", "level": 3}"#)?;
    /// let object = doc.as_object();
    /// assert!(Gate::new("kind", "user").is_verified_by(object));
    /// assert!(Gate::new("level", "3").is_verified_by(object));
    /// assert!(!Gate::new("kind", "user").is_verified_by(None));
    /// # Ok::<(), gombare_core::CanonicalizeError>(())
    /// ```
    #[must_use]
    pub fn is_verified_by(&self, object: Option<&Object>) -> bool {
        let Some(object) = object else {
            return false;
        };
        loose_string(object.get(&self.prop)).is_some_and(|value| value == self.is)
    }
}

/// Default textual form of a property value; containers have none.
fn loose_string(value: Option<&Node>) -> Option<Cow<'_, str>> {
    match value {
        None | Some(Node::Null) => Some(Cow::Borrowed(NIL)),
        Some(Node::Bool(true)) => Some(Cow::Borrowed("true")),
        Some(Node::Bool(false)) => Some(Cow::Borrowed("false")),
        Some(Node::Number(n)) => Some(Cow::Owned(n.to_loose_string())),
        Some(Node::String(s)) => Some(Cow::Borrowed(s)),
        Some(Node::Array(_) | Node::Object(_)) => None,
    }
}
