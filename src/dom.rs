//! Inserting rendered templates into a document. There is no DOM in
//! this process; a host (e.g. a browser bridge or a test double) has
//! to be attached to a `BoundTemplate` first.

use std::rc::Rc;

use anyhow::Result;

use crate::{error::{RenderError, RenderErrorKind},
            template::BoundTemplate};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    AppendTo,
    PrependTo,
    InsertAfter,
    InsertBefore,
}

impl Placement {
    pub fn as_str(self) -> &'static str {
        match self {
            Placement::AppendTo => "append_to",
            Placement::PrependTo => "prepend_to",
            Placement::InsertAfter => "insert_after",
            Placement::InsertBefore => "insert_before",
        }
    }
}

pub trait DomHost {
    /// Parse `html` into a fragment and place it relative to the
    /// node(s) selected by `target`.
    fn insert(&self, html: &str, placement: Placement, target: &str) -> Result<()>;
}

impl BoundTemplate {
    pub fn with_host(mut self, host: Rc<dyn DomHost>) -> Self {
        self.host = Some(host);
        self
    }

    pub fn has_host(&self) -> bool {
        self.host.is_some()
    }

    /// Render and hand the result to the host. Fails before rendering
    /// when no host is attached.
    pub fn insert(&mut self, placement: Placement, target: &str) -> Result<()> {
        let host = self.host.clone().ok_or_else(
            || RenderError::from(RenderErrorKind::HostCapabilityMissing(placement.as_str())))?;
        let html = self.render()?;
        host.insert(&html, placement, target)
    }

    pub fn append_to(&mut self, target: &str) -> Result<()> {
        self.insert(Placement::AppendTo, target)
    }

    pub fn prepend_to(&mut self, target: &str) -> Result<()> {
        self.insert(Placement::PrependTo, target)
    }

    pub fn insert_after(&mut self, target: &str) -> Result<()> {
        self.insert(Placement::InsertAfter, target)
    }

    pub fn insert_before(&mut self, target: &str) -> Result<()> {
        self.insert(Placement::InsertBefore, target)
    }
}
