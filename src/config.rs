//! Settings of a render run, from the environment:
//!
//! - `TKRENDER_STRICT`: unresolved names are errors (default off)
//! - `TKRENDER_GLOBALS`: path to a JSON object used as globals
//! - `TKRENDER_TRACE`: trace output on stderr (default off)

use std::{path::PathBuf, rc::Rc};

use anyhow::{Context, Result};

use crate::{scope::{Globals, NamePolicy},
            util::{getenv, getenv_bool, my_read_to_string}};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub strict: bool,
    pub globals_path: Option<PathBuf>,
    pub trace: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Config {
            strict: getenv_bool("TKRENDER_STRICT")?.unwrap_or(false),
            globals_path: getenv("TKRENDER_GLOBALS")?.map(PathBuf::from),
            trace: getenv_bool("TKRENDER_TRACE")?.unwrap_or(false),
        })
    }

    pub fn policy(&self) -> NamePolicy {
        if self.strict {
            NamePolicy::Strict
        } else {
            NamePolicy::Lenient
        }
    }

    /// Read the globals file if one is configured, else empty
    /// globals.
    pub fn load_globals(&self) -> Result<Rc<Globals>> {
        match &self.globals_path {
            None => Ok(Globals::empty()),
            Some(path) => {
                let s = my_read_to_string(path)?;
                let globals = Globals::from_json_str(&s)
                    .with_context(|| format!("globals file {path:?}"))?;
                Ok(Rc::new(globals))
            }
        }
    }
}
