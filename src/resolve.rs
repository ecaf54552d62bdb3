//! Core resolution pipeline: merge all config layers into effective values.
//!
//! Operates on pre-loaded data (`ResolveInput`) with no file reads, making the
//! full pipeline testable with synthetic inputs. Steps:
//!
//! 1. Overlay process env vars on top of `.env` entries (raw layer)
//! 2. Abort on deprecated keys
//! 3. Record `.env` keys unknown to the schema
//! 4. Coerce each schema key from the raw layer, falling back to its default
//! 5. Apply aliases, caps, path resolution, and derived keys

use std::collections::HashMap;
use std::path::PathBuf;

use tracing::debug;

use crate::coerce::coerce;
use crate::env;
use crate::error::EnvfigError;
use crate::file;
use crate::parse::EnvFile;
use crate::schema::Schema;
use crate::unknown::{self, UnknownVar};
use crate::value::Value;

/// All pre-loaded data needed to resolve a config.
#[derive(Debug, Default)]
pub struct ResolveInput {
    /// The parsed `.env` file, if one exists.
    pub env_file: Option<EnvFile>,
    /// Raw environment variable pairs (pass `std::env::vars().collect()` or synthetic data).
    pub env_vars: Vec<(String, String)>,
    /// Directories for path-valued keys, priority-ascending.
    pub search_dirs: Vec<PathBuf>,
}

/// The outcome of resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved {
    pub values: HashMap<String, Value>,
    pub unknown: Vec<UnknownVar>,
}

/// Resolve effective values from pre-loaded inputs.
pub fn resolve(schema: &Schema, input: ResolveInput) -> Result<Resolved, EnvfigError> {
    let raw = env::overlay(input.env_file.as_ref(), input.env_vars);

    if let Some((old, replacement)) = schema
        .deprecated_keys()
        .iter()
        .find(|(old, _)| raw.contains_key(old))
    {
        return Err(EnvfigError::DeprecatedKey {
            key: old.clone(),
            replacement: replacement.clone(),
        });
    }

    let unknown = input
        .env_file
        .as_ref()
        .map(|f| unknown::find_unknown(f, schema))
        .unwrap_or_default();

    let mut values = HashMap::with_capacity(schema.len());
    for def in schema.keys() {
        let value = match raw.get(&def.name) {
            Some(text) => {
                debug!(key = %def.name, "override applied");
                coerce(&def.name, text, &def.default)?
            }
            None => def.default.clone(),
        };
        values.insert(def.name.clone(), value);
    }

    for (primary, alias) in schema.aliases() {
        let (Some(current), Some(text)) = (values.get(primary), raw.get(alias)) else {
            continue;
        };
        if current.is_empty() {
            let value = coerce(alias, text, current)?;
            debug!(key = %primary, alias = %alias, "value taken from alias");
            values.insert(primary.clone(), value);
        }
    }

    for (key, max) in schema.caps() {
        if let Some(Value::Int(v)) = values.get_mut(key)
            && *v > *max
        {
            debug!(key = %key, value = *v, max = *max, "value capped");
            *v = *max;
        }
    }

    for key in schema.resolved_paths() {
        let Some(Value::Str(relative)) = values.get(key) else {
            continue;
        };
        if let Some(found) = file::find_file(&input.search_dirs, relative) {
            debug!(key = %key, path = %found.display(), "path resolved");
            values.insert(key.clone(), Value::Str(found.to_string_lossy().into_owned()));
        }
    }

    for (key, derive) in schema.derived_keys() {
        if let Some(value) = derive(&values) {
            values.insert(key.clone(), value);
        }
    }

    Ok(Resolved { values, unknown })
}
