//! Synthetic corpora for benchmarking `gombare-core`.
//!
//! Each [`Corpus`] pairs an identification schema with a generated document
//! holding one large array of objects, so benchmarks exercise resolution and
//! key building without fixture files.
//!
//! # Examples
//!
//! ```
//! let corpus = gombare_benches::available_corpora()
//!     .iter()
//!     .find(|c| c.name() == "flat-use")
//!     .expect("registered corpus");
//! let dataset = corpus.load()?;
//! assert_eq!(dataset.keys()?.len(), corpus.elements());
//! # Ok::<(), Box<dyn std::error::Error + Send + Sync>>(())
//! ```
#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::error::Error;

use gombare_core::{IdentificationParameter, KeyBuilder, KeyError, Node, ParamId, ResolvedSchema};
use serde_json::{json, Value};

/// Name of the array every corpus keys.
pub const ARRAY_PATH: &str = "records";

/// A named recipe for a benchmark dataset.
#[derive(Debug)]
pub struct Corpus {
    name: &'static str,
    schema: &'static str,
    elements: usize,
    record: fn(usize) -> Value,
}

static CORPORA: [Corpus; 3] = [
    Corpus {
        name: "flat-use",
        schema: r#"{"_for": {"records": {"_use": ["id", "kind"]}}}"#,
        elements: 2_000,
        record: flat_record,
    },
    Corpus {
        name: "conditional",
        schema: r#"{"_for": {"records": {
            "when": [
                {"prop": "kind", "is": "person", "name": "P", "_use": ["last", "first"]},
                {"prop": "kind", "is": "company", "name": "C", "_use": ["siren"]}
            ],
            "_use": ["id"]
        }}}"#,
        elements: 2_000,
        record: party_record,
    },
    Corpus {
        name: "nested-look",
        schema: r#"{"_for": {"records": {"incr": true, "look": [
            {"at": ".", "_use": ["ref"]},
            {"at": "meta", "_use": ["rev"]},
            {"at": "lines", "look": [{"at": ".", "_use": ["sku"]}, {"at": "taxes", "_use": ["rate"]}]}
        ]}}}"#,
        elements: 500,
        record: invoice_record,
    },
];

/// Returns every registered corpus.
#[must_use]
pub fn available_corpora() -> &'static [Corpus] {
    &CORPORA
}

impl Corpus {
    /// Display name used as benchmark identifier.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Number of array elements in the generated document.
    #[must_use]
    pub fn elements(&self) -> usize {
        self.elements
    }

    /// Raw JSON schema of the corpus.
    #[must_use]
    pub fn schema_json(&self) -> &'static str {
        self.schema
    }

    /// Resolves the schema and generates the document.
    pub fn load(&self) -> Result<Dataset, Box<dyn Error + Send + Sync>> {
        let schema = IdentificationParameter::from_json_str(self.schema)?.resolve()?;
        let records: Vec<Value> = (0..self.elements).map(self.record).collect();
        let document = Node::from_json_value(json!({ ARRAY_PATH: records }))?;
        let param = schema
            .lookup([ARRAY_PATH])
            .ok_or_else(|| format!("corpus {} does not register '{ARRAY_PATH}'", self.name))?;
        Ok(Dataset { schema, document, param })
    }
}

/// A resolved schema together with its generated document.
#[derive(Debug)]
pub struct Dataset {
    schema: ResolvedSchema,
    document: Node,
    param: ParamId,
}

impl Dataset {
    /// The resolved schema.
    #[must_use]
    pub fn schema(&self) -> &ResolvedSchema {
        &self.schema
    }

    /// Keys every element of the records array with a fresh builder.
    pub fn keys(&self) -> Result<Vec<String>, KeyError> {
        let unsupported = |found| KeyError::UnsupportedShape {
            path: self.schema.full_path(self.param).to_string(),
            at: ARRAY_PATH.to_string(),
            found,
        };
        let container = self.document.as_object().ok_or_else(|| unsupported(self.document.kind()))?;
        let records = match container.get(ARRAY_PATH) {
            Some(Node::Array(records)) => records,
            Some(other) => return Err(unsupported(other.kind())),
            None => return Err(unsupported("missing value")),
        };
        KeyBuilder::new(&self.schema).key_elements(self.param, container, records)
    }
}

fn flat_record(i: usize) -> Value {
    json!({ "id": i, "kind": if i % 2 == 0 { "even" } else { "odd" }, "payload": "x".repeat(16) })
}

fn party_record(i: usize) -> Value {
    match i % 3 {
        0 => json!({ "kind": "person", "first": format!("f{i}"), "last": format!("l{i}"), "id": i }),
        1 => json!({ "kind": "company", "siren": 100_000_000 + i, "id": i }),
        _ => json!({ "kind": "other", "id": i }),
    }
}

fn invoice_record(i: usize) -> Value {
    json!({
        "ref": format!("F-{}", i / 2),
        "meta": { "rev": (i / 2 % 7) as f64 + 0.5 },
        "lines": (0..4).map(|line| json!({
            "sku": format!("sku-{line}"),
            "taxes": [{ "rate": 20.0 }, { "rate": 5.5 }],
        })).collect::<Vec<_>>(),
    })
}
