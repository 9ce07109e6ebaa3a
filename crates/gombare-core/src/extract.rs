use crate::{Node, Object};

/// Key under which XML-derived mappings store the text of a tag with attributes.
pub const TEXT_KEY: &str = "#text";

/// Pseudo-property resolving to the element's 1-based position.
pub const INDEX_PROP: &str = "#index";

/// A leaf value whose shape cannot become a key fragment.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct UnsupportedValue {
    pub(crate) prop: String,
    pub(crate) found: &'static str,
}

/// Canonicalizes `object[prop]` into a key fragment.
///
/// Absent properties render as `(prop)`, present nulls as the bare name.
/// Mappings are read through their [`TEXT_KEY`] entry.
pub(crate) fn extract_value(object: &Object, prop: &str, position: usize) -> Result<String, UnsupportedValue> {
    if prop == INDEX_PROP {
        return Ok(format!("#{}", position + 1));
    }
    match object.get(prop) {
        None => Ok(format!("({prop})")),
        Some(Node::Null) => Ok(prop.to_string()),
        Some(Node::Number(n)) => Ok(n.to_key_fragment()),
        Some(Node::String(s)) => Ok(s.clone()),
        Some(Node::Bool(b)) => Ok(b.to_string()),
        Some(Node::Object(inner)) => extract_value(inner, TEXT_KEY, position),
        Some(other @ Node::Array(_)) => Err(UnsupportedValue { prop: prop.to_string(), found: other.kind() }),
    }
}
