//! Name resolution for template bodies: the per-render context, the
//! defs bound into it, and the read-only globals it falls back to.

use std::{collections::HashMap, fmt, rc::Rc};

use anyhow::Result;
use kstring::KString;
use serde_json::{Map, Value};

use crate::{buffer::Buffer,
            error::{RenderError, RenderErrorKind},
            trace};

/// A template function: a def, a block, or a template's `__main__`.
pub type Def = Rc<dyn Fn(&mut Scope, &[Value]) -> Result<Buffer>>;

/// The name of the entry point def of a template.
pub const MAIN: &str = "__main__";

pub fn new_def(f: impl Fn(&mut Scope, &[Value]) -> Result<Buffer> + 'static) -> Def {
    Rc::new(f)
}


/// Process-wide fallback for names missing from a context. Built
/// once, then only read.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Globals {
    vars: Map<String, Value>,
}

impl Globals {
    pub fn new(vars: Map<String, Value>) -> Self {
        Globals { vars }
    }

    pub fn empty() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn from_json_str(s: &str) -> Result<Self, RenderError> {
        let v: Value = serde_json::from_str(s)
            .map_err(RenderErrorKind::MalformedGlobals)?;
        match v {
            Value::Object(vars) => Ok(Globals { vars }),
            v => Err(RenderErrorKind::ContextNotAnObject(
                KString::from_string(v.to_string())).into()),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.vars.get(name)
    }
}


/// What `Scope::bind` does when a name is neither in the context nor
/// in the globals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NamePolicy {
    /// Resolve to the undefined value (`None`).
    #[default]
    Lenient,
    /// Fail with `NameNotFound`.
    Strict,
}


#[derive(Clone)]
pub struct Scope {
    vars: Map<String, Value>,
    defs: HashMap<KString, Def>,
    globals: Rc<Globals>,
    policy: NamePolicy,
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut defnames: Vec<&str> = self.defs.keys().map(|k| k.as_str()).collect();
        defnames.sort();
        f.debug_struct("Scope")
            .field("vars", &self.vars)
            .field("defs", &defnames)
            .field("policy", &self.policy)
            .finish()
    }
}

impl Scope {
    pub fn new(vars: Map<String, Value>, globals: Rc<Globals>) -> Self {
        Scope {
            vars,
            defs: HashMap::new(),
            globals,
            policy: NamePolicy::default(),
        }
    }

    /// Parse a context from JSON text; it has to be an object.
    pub fn from_json_str(s: &str, globals: Rc<Globals>) -> Result<Self, RenderError> {
        let v: Value = serde_json::from_str(s)
            .map_err(RenderErrorKind::MalformedContext)?;
        match v {
            Value::Object(vars) => Ok(Scope::new(vars, globals)),
            v => Err(RenderErrorKind::ContextNotAnObject(
                KString::from_string(v.to_string())).into()),
        }
    }

    pub fn with_policy(mut self, policy: NamePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> NamePolicy {
        self.policy
    }

    pub fn globals(&self) -> &Rc<Globals> {
        &self.globals
    }

    pub fn vars(&self) -> &Map<String, Value> {
        &self.vars
    }

    /// Look `name` up in the context, then in the globals. A miss
    /// gives `Ok(None)` under `NamePolicy::Lenient` and an error
    /// under `NamePolicy::Strict`.
    pub fn bind(&self, name: &str) -> Result<Option<&Value>, RenderError> {
        if let Some(v) = self.vars.get(name) {
            return Ok(Some(v));
        }
        if let Some(v) = self.globals.get(name) {
            return Ok(Some(v));
        }
        match self.policy {
            NamePolicy::Lenient => {
                trace!("unresolved name {name:?}, using undefined");
                Ok(None)
            }
            NamePolicy::Strict => Err(RenderError::name_not_found(name)),
        }
    }

    /// Like `bind`, but the undefined value is `null`.
    pub fn bind_or_null(&self, name: &str) -> Result<&Value, RenderError> {
        static NULL: Value = Value::Null;
        Ok(self.bind(name)?.unwrap_or(&NULL))
    }

    /// Set `name` unless the context already has it. Returns whether
    /// the value was stored.
    pub fn add(&mut self, name: &str, value: Value) -> bool {
        if self.vars.contains_key(name) {
            false
        } else {
            self.vars.insert(name.to_string(), value);
            true
        }
    }

    /// Bind a def under `name` unless one is bound already (a child
    /// template's block wins over its parent's). Returns whether `def`
    /// was stored.
    pub fn add_def(&mut self, name: &str, def: Def) -> bool {
        if self.defs.contains_key(name) {
            false
        } else {
            self.defs.insert(KString::from_ref(name), def);
            true
        }
    }

    pub fn def(&self, name: &str) -> Option<Def> {
        self.defs.get(name).cloned()
    }

    pub fn has_def(&self, name: &str) -> bool {
        self.defs.contains_key(name)
    }

    pub(crate) fn defs(&self) -> impl Iterator<Item = (&str, &Def)> {
        self.defs.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Invoke the def bound under `name`.
    pub fn call(&mut self, name: &str, args: &[Value]) -> Result<Buffer> {
        let def = self.def(name).ok_or_else(|| RenderError::def_not_found(name))?;
        def(self, args)
    }
}

/// Run `f` on each element of `list` with its index, in order; the
/// first error ends the iteration and is returned.
pub fn foreach<T, E>(
    list: impl IntoIterator<Item = T>,
    mut f: impl FnMut(T, usize) -> Result<(), E>
) -> Result<(), E> {
    for (i, item) in list.into_iter().enumerate() {
        f(item, i)?;
    }
    Ok(())
}
