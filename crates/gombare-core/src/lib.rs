//! Schema-driven identity keys for the elements of unordered document arrays.
//!
//! `gombare-core` names every object of an array after the properties a
//! user-authored identification schema points at, so that two versions of
//! the same array can be matched element by element instead of by position.
//! All public items include runnable examples.
//!
//! ```
//! use gombare_core::{IdentificationParameter, KeyBuilder, Node};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let schema = IdentificationParameter::from_json_str(
//!         r#"{"_for": {"users": {"_use": ["login"]}}}"#,
//!     )?
//!     .resolve()?;
//!     let doc = Node::from_json_str(r#"{"users": [{"login": "ann"}, {"login": "bob"}]}"#)?;
//!     let root = doc.as_object().expect("object document");
//!     let users = root["users"].as_array().expect("array");
//!
//!     let param = schema.lookup(["users"]).expect("registered");
//!     let keys = KeyBuilder::new(&schema).key_elements(param, root, users)?;
//!     assert_eq!(keys, ["ann", "bob"]);
//!     Ok(())
//! }
//! ```
#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod condition;
mod counter;
mod error;
mod extract;
pub mod key;
mod node;
mod number;
mod options;
mod resolve;
mod schema;

pub use condition::Gate;
pub use counter::IncrementCounter;
pub use error::{CanonicalizeError, KeyError, SchemaError};
pub use extract::{INDEX_PROP, TEXT_KEY};
pub use key::{concat_separated, KeyBuilder};
pub use node::{Node, Object};
pub use number::Number;
pub use options::{Aggregation, KeyOptions};
pub use resolve::{ParamId, ResolvedParam, ResolvedSchema};
pub use schema::{ConditionalIdParameter, IdentificationParameter};

/// Returns the semantic version of the `gombare-core` crate.
///
/// ```
/// assert!(!gombare_core::version().is_empty());
/// ```
#[must_use]
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
