use thiserror::Error;

/// Errors that can occur while canonicalizing external data into [`Node`](crate::Node).
#[derive(Debug, Error)]
pub enum CanonicalizeError {
    /// The provided JSON input was invalid.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// The provided YAML input was invalid.
    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    /// Encountered a number that cannot be represented as an IEEE-754 f64.
    #[error("number {value} cannot be represented as f64")]
    NumberOutOfRange {
        /// The textual representation of the offending number.
        value: String,
    },
    /// YAML maps may only contain string keys.
    #[error("unsupported YAML key type: {found}")]
    NonStringYamlKey {
        /// A description of the key that triggered the error.
        found: String,
    },
    /// YAML tags have no counterpart in the document model.
    #[error("unsupported YAML tag: {tag}")]
    UnsupportedYamlTag {
        /// The tag identifier encountered in the document.
        tag: String,
    },
    /// Attempted to construct a [`Number`](crate::Number) that is not finite.
    #[error("non-finite number encountered: {value}")]
    NotFinite {
        /// The offending numeric value.
        value: f64,
    },
}

/// Errors raised while loading or resolving an identification schema.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The schema was not valid JSON for the identification parameter shape.
    #[error("invalid JSON identification schema: {0}")]
    Json(#[from] serde_json::Error),
    /// The schema was not valid YAML for the identification parameter shape.
    #[error("invalid YAML identification schema: {0}")]
    Yaml(#[from] serde_yaml::Error),
    /// A schema node failed structural validation during resolution.
    #[error("invalid identification parameter at '{path}': {reason}")]
    Invalid {
        /// Full `>`-separated path of the offending node.
        path: String,
        /// Human readable description of the violated constraint.
        reason: String,
    },
}

/// Errors raised while building an identity key for a document node.
///
/// Every variant signals an authoring problem in the schema or an unexpected
/// document shape; none of them is transient.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyError {
    /// A non-conditional schema node produced no key material.
    #[error("the '{rule}' configuration at path '{path}' did not allow us to build a non-empty ID key")]
    EmptyKey {
        /// Full path of the schema node.
        path: String,
        /// Which rule ran dry (`_use` or `look`).
        rule: &'static str,
    },
    /// The document holds a value the active schema node cannot interpret.
    #[error("cannot handle the {found} at '{at}' (which is part of this id param: {path})")]
    UnsupportedShape {
        /// Full path of the schema node.
        path: String,
        /// Property or path segment that was read.
        at: String,
        /// Description of the offending value shape.
        found: &'static str,
    },
    /// Two siblings produced the same key while uniqueness is verified.
    #[error("the ID key '{key}' is not unique among the elements at path '{path}'")]
    DuplicateKey {
        /// Full path of the schema node used for the siblings.
        path: String,
        /// The colliding key.
        key: String,
    },
}
