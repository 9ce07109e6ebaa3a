use std::collections::BTreeMap;
use std::sync::OnceLock;

use tracing::debug;

use crate::{ConditionalIdParameter, Gate, IdentificationParameter, SchemaError};

/// Separator between the `at` segments of a parameter's full path.
const PATH_SEP: &str = ">";

/// Index of a parameter inside a [`ResolvedSchema`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParamId(usize);

/// One node of a resolved schema.
#[derive(Debug)]
pub struct ResolvedParam {
    at: String,
    use_props: Vec<String>,
    incr: bool,
    name: String,
    gate: Option<Gate>,
    when: Vec<ParamId>,
    look: Vec<ParamId>,
    for_paths: BTreeMap<String, ParamId>,
    parent: Option<ParamId>,
    conditional: bool,
    full_path: OnceLock<String>,
}

impl ResolvedParam {
    /// Path segment relative to the parent.
    #[must_use]
    pub fn at(&self) -> &str {
        &self.at
    }

    /// Properties concatenated into the key.
    #[must_use]
    pub fn use_props(&self) -> &[String] {
        &self.use_props
    }

    /// Whether repeated keys receive an occurrence suffix.
    #[must_use]
    pub fn incr(&self) -> bool {
        self.incr
    }

    /// Branch label.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The gate of a `when` branch; `None` for every other node.
    #[must_use]
    pub fn gate(&self) -> Option<&Gate> {
        self.gate.as_ref()
    }

    /// Conditional branches in declaration order.
    #[must_use]
    pub fn when(&self) -> &[ParamId] {
        &self.when
    }

    /// Children to descend into in declaration order.
    #[must_use]
    pub fn look(&self) -> &[ParamId] {
        &self.look
    }

    /// The parameter registered for a nested path.
    #[must_use]
    pub fn for_path(&self, path: &str) -> Option<ParamId> {
        self.for_paths.get(path).copied()
    }

    /// The enclosing parameter; `None` for the root.
    #[must_use]
    pub fn parent(&self) -> Option<ParamId> {
        self.parent
    }

    /// True when the node is reachable only through a `when` branch.
    #[must_use]
    pub fn is_conditional(&self) -> bool {
        self.conditional
    }
}

/// An identification schema whose nodes are linked to their parents and
/// annotated with their conditional flag.
///
/// The schema is immutable once built and can be shared between threads
/// that key distinct documents.
///
/// ```
/// # use gombare_core::IdentificationParameter;
/// let schema = IdentificationParameter::from_json_str(
///     r#"{"_for": {"items": {"when": [{"prop": "t", "is": "a", "_use": ["x"]}]}}}"#,
/// )?
/// .resolve()?;
/// let items = schema.lookup(["items"]).expect("registered");
/// let branch = schema.param(items).when()[0];
/// assert_eq!(schema.param(branch).at(), "items");
/// assert!(schema.param(branch).is_conditional());
/// assert_eq!(schema.full_path(branch), ">items>items");
/// # Ok::<(), gombare_core::SchemaError>(())
/// ```
#[derive(Debug)]
pub struct ResolvedSchema {
    params: Vec<ResolvedParam>,
    root: ParamId,
}

impl IdentificationParameter {
    /// Links and validates the schema tree, consuming the raw parameter.
    ///
    /// `_for` entries default their `at` to the registered path, `when`
    /// branches default it to their parent's `at`. Everything declared under
    /// a `when` branch is conditional.
    pub fn resolve(self) -> Result<ResolvedSchema, SchemaError> {
        let mut resolver = Resolver::default();
        let root = resolver.register(self, None, None, false)?;
        debug!(params = resolver.params.len(), "resolved identification schema");
        Ok(ResolvedSchema { params: resolver.params, root })
    }
}

impl ResolvedSchema {
    /// The top-level parameter.
    #[must_use]
    pub fn root(&self) -> ParamId {
        self.root
    }

    /// Returns the node behind `id`.
    ///
    /// # Panics
    ///
    /// Panics when `id` was produced by another schema.
    #[must_use]
    pub fn param(&self, id: ParamId) -> &ResolvedParam {
        &self.params[id.0]
    }

    /// Follows `_for` registrations from the root along `path`.
    #[must_use]
    pub fn lookup<'a, I>(&self, path: I) -> Option<ParamId>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut current = self.root;
        for segment in path {
            current = self.param(current).for_path(segment)?;
        }
        Some(current)
    }

    /// The `>`-joined `at` segments from the root to `id`, built once.
    #[must_use]
    pub fn full_path(&self, id: ParamId) -> &str {
        full_path(&self.params, id)
    }

    /// Rebuilds the raw parameter tree below `id`, defaults included.
    #[must_use]
    pub fn to_parameter(&self, id: ParamId) -> IdentificationParameter {
        let param = self.param(id);
        IdentificationParameter {
            at: param.at.clone(),
            use_props: param.use_props.clone(),
            incr: param.incr,
            when: param.when.iter().map(|&branch| self.to_conditional(branch)).collect(),
            look: param.look.iter().map(|&child| self.to_parameter(child)).collect(),
            for_paths: param
                .for_paths
                .iter()
                .map(|(path, &child)| (path.clone(), self.to_parameter(child)))
                .collect(),
            name: param.name.clone(),
        }
    }

    fn to_conditional(&self, id: ParamId) -> ConditionalIdParameter {
        let (prop, is) = self
            .param(id)
            .gate
            .as_ref()
            .map(|gate| (gate.prop().to_string(), gate.is().to_string()))
            .unwrap_or_default();
        ConditionalIdParameter { prop, is, param: self.to_parameter(id) }
    }
}

#[derive(Default)]
struct Resolver {
    params: Vec<ResolvedParam>,
}

impl Resolver {
    fn register(
        &mut self,
        param: IdentificationParameter,
        gate: Option<Gate>,
        parent: Option<ParamId>,
        conditional: bool,
    ) -> Result<ParamId, SchemaError> {
        let IdentificationParameter { at, use_props, incr, when, look, for_paths, name } = param;
        let id = ParamId(self.params.len());
        self.params.push(ResolvedParam {
            at,
            use_props,
            incr,
            name,
            gate,
            when: Vec::with_capacity(when.len()),
            look: Vec::with_capacity(look.len()),
            for_paths: BTreeMap::new(),
            parent,
            conditional,
            full_path: OnceLock::new(),
        });

        for (path, mut child) in for_paths {
            if child.at.is_empty() {
                child.at.clone_from(&path);
            }
            let child_id = self.register(child, None, Some(id), conditional)?;
            self.params[id.0].for_paths.insert(path, child_id);
        }

        for branch in when {
            let ConditionalIdParameter { prop, is, param: mut child } = branch;
            if child.at.is_empty() {
                child.at.clone_from(&self.params[id.0].at);
            }
            let child_id = self.register(child, Some(Gate::new(prop, is)), Some(id), true)?;
            self.params[id.0].when.push(child_id);
        }

        for child in look {
            let child_id = self.register(child, None, Some(id), conditional)?;
            self.params[id.0].look.push(child_id);
        }

        validate(&self.params, id)?;
        Ok(id)
    }
}

fn full_path(params: &[ResolvedParam], id: ParamId) -> &str {
    let param = &params[id.0];
    param.full_path.get_or_init(|| match param.parent {
        None => param.at.clone(),
        Some(parent) => format!("{}{PATH_SEP}{}", full_path(params, parent), param.at),
    })
}

/// Checks one node once its subtree is registered. Every shape the decoder
/// accepts is currently valid.
fn validate(_params: &[ResolvedParam], _id: ParamId) -> Result<(), SchemaError> {
    Ok(())
}
