//! Explicit module registry: templates are defined under an
//! identifier together with the identifiers of the templates they
//! need, and looked up by identifier.

use std::collections::HashMap;

use anyhow::Result;
use kstring::KString;

use crate::{error::{RenderError, RenderErrorKind},
            template::Template,
            trace};

#[derive(Debug, Default)]
pub struct Registry {
    templates: HashMap<KString, Template>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve `dependencies` (in the given order), pass them to
    /// `factory` and store the template it returns under `id`.
    pub fn define_module<F>(
        &mut self,
        id: &str,
        dependencies: &[&str],
        factory: F
    ) -> Result<()>
    where F: FnOnce(&[Template]) -> Result<Template>
    {
        if self.templates.contains_key(id) {
            return Err(RenderError::from(
                RenderErrorKind::DuplicateTemplate(KString::from_ref(id))).into());
        }
        let deps = dependencies.iter()
            .map(|dep| self.load(dep))
            .collect::<Result<Vec<_>, RenderError>>()?;
        let template = factory(&deps)?;
        trace!("defined {id:?} (template {:?}) with dependencies {dependencies:?}",
               template.id());
        self.templates.insert(KString::from_ref(id), template);
        Ok(())
    }

    pub fn load(&self, id: &str) -> Result<Template, RenderError> {
        self.templates.get(id).cloned().ok_or_else(
            || RenderError::template_not_found(id))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.templates.contains_key(id)
    }

    /// All defined identifiers, sorted.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.templates.keys().map(|k| k.as_str()).collect();
        ids.sort();
        ids
    }
}
