//! Compiled templates and their bound, renderable form.

use std::rc::Rc;

use anyhow::Result;
use kstring::KString;
use serde_json::{Map, Value};

use crate::{buffer::Buffer,
            dom::DomHost,
            error::RenderError,
            markup::Markup,
            scope::{new_def, Def, Globals, NamePolicy, Scope, MAIN},
            trace};

#[derive(Clone)]
struct TemplateInner {
    id: KString,
    parent: Option<Template>,
    defs: Vec<(KString, Def)>,
    main: Option<Def>,
}

/// A compiled template: named defs (blocks), an entry point and
/// optionally a parent it extends. Cheap to clone.
#[derive(Clone)]
pub struct Template(Rc<TemplateInner>);

impl std::fmt::Debug for Template {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Template")
            .field("id", &self.0.id)
            .field("parent", &self.0.parent.as_ref().map(|p| p.id()))
            .field("defs", &self.0.defs.iter().map(|(n, _)| n.as_str()).collect::<Vec<_>>())
            .field("has_main", &self.0.main.is_some())
            .finish()
    }
}

impl Template {
    pub fn new(
        id: &str,
        main: impl Fn(&mut Scope, &[Value]) -> Result<Buffer> + 'static
    ) -> Self {
        Template(Rc::new(TemplateInner {
            id: KString::from_ref(id),
            parent: None,
            defs: Vec::new(),
            main: Some(new_def(main)),
        }))
    }

    /// A template without an entry point of its own; it renders
    /// through `parent`'s main, with its own defs taking precedence
    /// over the parent's.
    pub fn extending(id: &str, parent: &Template) -> Self {
        Template(Rc::new(TemplateInner {
            id: KString::from_ref(id),
            parent: Some(parent.clone()),
            defs: Vec::new(),
            main: None,
        }))
    }

    pub fn with_def(
        mut self,
        name: &str,
        def: impl Fn(&mut Scope, &[Value]) -> Result<Buffer> + 'static
    ) -> Self {
        Rc::make_mut(&mut self.0).defs.push((KString::from_ref(name), new_def(def)));
        self
    }

    pub fn id(&self) -> &str {
        self.0.id.as_str()
    }

    pub fn parent(&self) -> Option<&Template> {
        self.0.parent.as_ref()
    }

    fn bind_into(&self, scope: &mut Scope) {
        for (name, def) in &self.0.defs {
            if !scope.add_def(name, def.clone()) {
                trace!("{}: def {name:?} already bound, keeping it", self.id());
            }
        }
        if let Some(parent) = &self.0.parent {
            parent.bind_into(scope);
        }
        if let Some(main) = &self.0.main {
            scope.add_def(MAIN, main.clone());
        }
    }

    /// Bind the template's defs into `scope` (never replacing names
    /// already bound there).
    pub fn bind(&self, mut scope: Scope) -> BoundTemplate {
        self.bind_into(&mut scope);
        BoundTemplate {
            id: self.0.id.clone(),
            scope,
            host: None,
        }
    }

    /// Bind to a fresh scope over `vars` and render once.
    pub fn render(&self, vars: Map<String, Value>, globals: Rc<Globals>) -> Result<String> {
        self.bind(Scope::new(vars, globals)).render()
    }

    /// Render this template from within another template's body, in a
    /// new scope over `vars` that shares the caller's globals and
    /// name policy. The result is meant to be appended to the
    /// caller's buffer.
    pub fn include(&self, caller: &Scope, vars: Map<String, Value>) -> Result<Buffer> {
        let scope = Scope::new(vars, caller.globals().clone())
            .with_policy(caller.policy());
        self.bind(scope).render_buffer()
    }

    /// Bind this template into a copy of `caller` and keep the defs
    /// that binding added, as a namespace. Defs the caller already had
    /// (including ones of the same name) and the entry point are not
    /// exported.
    pub fn import_defs(&self, caller: &Scope) -> ImportedDefs {
        let mut scope = caller.clone();
        self.bind_into(&mut scope);
        let mut names: Vec<KString> = scope.defs()
            .filter(|(name, def)| {
                *name != MAIN
                    && !caller.def(name).map_or(false, |old| Rc::ptr_eq(&old, *def))
            })
            .map(|(name, _)| KString::from_ref(name))
            .collect();
        names.sort();
        trace!("imported {} defs from {:?}", names.len(), self.id());
        ImportedDefs {
            id: self.0.id.clone(),
            names,
            scope,
        }
    }
}


/// The defs of a template imported under an alias; see
/// `Template::import_defs`. Calls run in the scope the import was
/// bound into, so the defs see the caller's context as of the import.
pub struct ImportedDefs {
    id: KString,
    names: Vec<KString>,
    scope: Scope,
}

impl ImportedDefs {
    pub fn id(&self) -> &str {
        self.id.as_str()
    }

    /// The exported def names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(|n| n.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n.as_str() == name)
    }

    pub fn call(&mut self, name: &str, args: &[Value]) -> Result<Buffer> {
        if !self.contains(name) {
            return Err(RenderError::def_not_found(name).into());
        }
        self.scope.call(name, args)
    }
}


/// A template bound to a scope, ready to render (any number of
/// times).
pub struct BoundTemplate {
    id: KString,
    scope: Scope,
    pub(crate) host: Option<Rc<dyn DomHost>>,
}

impl BoundTemplate {
    pub fn id(&self) -> &str {
        self.id.as_str()
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn scope_mut(&mut self) -> &mut Scope {
        &mut self.scope
    }

    pub fn policy(mut self, policy: NamePolicy) -> Self {
        self.scope = self.scope.with_policy(policy);
        self
    }

    /// Run the entry point. Every call runs the template body again.
    pub fn render_buffer(&mut self) -> Result<Buffer> {
        let main = self.scope.def(MAIN).ok_or_else(|| RenderError::def_not_found(MAIN))?;
        trace!("rendering {:?}", self.id);
        main(&mut self.scope, &[])
    }

    pub fn render(&mut self) -> Result<String> {
        Ok(self.render_buffer()?.flatten())
    }

    /// Like `render`, but marked safe for embedding in other output.
    pub fn render_markup(&mut self) -> Result<Markup> {
        Ok(self.render_buffer()?.to_markup())
    }
}
