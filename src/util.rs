//! Environment and file helpers.

use std::{env::VarError, fs::read_to_string, path::Path};

use anyhow::{anyhow, bail, Context, Result};

/// Get an env var as a String; decoding failures are reported as
/// errors, a missing variable as `None`.
pub fn getenv(name: &str) -> Result<Option<String>> {
    match std::env::var(name) {
        Ok(s) => Ok(Some(s)),
        Err(e) => match e {
            VarError::NotPresent => Ok(None),
            VarError::NotUnicode(_) => bail!("{name:?} env var is not unicode"),
        }
    }
}

pub fn getenv_or(name: &str, fallbackvalue: Option<&str>) -> Result<String> {
    match getenv(name)? {
        Some(s) => Ok(s),
        None => match fallbackvalue {
            Some(v) => Ok(v.to_string()),
            None => bail!("{name:?} env var is missing and \
                           no default provided"),
        }
    }
}

pub fn parse_bool(s: &str) -> Option<bool> {
    match s.trim() {
        "1" | "true" | "yes" | "on" => Some(true),
        "" | "0" | "false" | "no" | "off" => Some(false),
        _ => None
    }
}

/// An env var holding a boolean; `None` if not set.
pub fn getenv_bool(name: &str) -> Result<Option<bool>> {
    getenv(name)?
        .map(|s| parse_bool(&s).ok_or_else(
            || anyhow!("{name:?} env var must be a boolean, got {s:?}")))
        .transpose()
}

pub fn my_read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
    read_to_string(&path).with_context(
        || anyhow!("opening path for reading: {:?}", path.as_ref()))
}
