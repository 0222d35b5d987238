//! Runtime for compiled HTML templates: output buffers with HTML
//! escaping and attribute rendering, safe markup, context binding,
//! template inheritance and an explicit template registry.

pub mod warn;
pub mod error;
pub mod util;
pub mod config;
pub mod markup;
pub mod buffer;
pub mod scope;
pub mod template;
pub mod dom;
pub mod registry;
pub mod builtin;

pub use buffer::{render_attributes, AttrValue, Buffer};
pub use error::{RenderError, RenderErrorKind};
pub use markup::{escape, escape_str, Content, Markup};
pub use scope::{foreach, new_def, Def, Globals, NamePolicy, Scope, MAIN};
pub use template::{BoundTemplate, ImportedDefs, Template};
pub use dom::{DomHost, Placement};
pub use registry::Registry;
