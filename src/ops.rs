//! Config operations: sample generation, key lookup, listing, and result types.
//!
//! Provides the logic behind `config list`, `config gen`, `config get` and
//! `config set`, and the `ConfigResult` enum that callers
//! use to display results.

use std::fmt;
use std::path::PathBuf;

use crate::error::EnvfigError;
use crate::file::read_optional;
use crate::parse::parse;
use crate::schema::Schema;
use crate::store::ConfigStore;
use crate::unknown::mask_if_sensitive;

/// Result of a config operation. Returned to the caller for display.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigResult {
    /// A generated `.env.sample` string.
    Template(String),
    /// Confirmation that a sample was written to a file.
    TemplateWritten { path: PathBuf },
    /// A key's current value and its doc comment.
    KeyValue {
        key: String,
        value: String,
        doc: Vec<String>,
    },
    /// Confirmation that a value was set and written to disk. Credentials
    /// are masked.
    ValueSet { key: String, value: String },
    /// All effective configuration key-value pairs.
    Listing { entries: Vec<(String, String)> },
}

impl fmt::Display for ConfigResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigResult::Template(t) => write!(f, "{t}"),
            ConfigResult::TemplateWritten { path } => {
                write!(f, "Sample written to {}", path.display())
            }
            ConfigResult::KeyValue { key, value, doc } => {
                for line in doc {
                    writeln!(f, "# {line}")?;
                }
                write!(f, "{key}={value}")
            }
            ConfigResult::ValueSet { key, value } => write!(f, "Set {key}={value}"),
            ConfigResult::Listing { entries } => {
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    write!(f, "{key}={value}")?;
                }
                Ok(())
            }
        }
    }
}

/// Generate a commented `.env.sample` from the schema's defaults and docs.
/// Blocks are separated by blank lines so each comment stays attached to
/// its key when the file is parsed back.
pub fn generate_sample(schema: &Schema) -> String {
    let blocks: Vec<String> = schema
        .keys()
        .map(|def| {
            let mut block: Vec<String> = def.doc.iter().map(|l| format!("# {l}")).collect();
            block.push(format!("{}={}", def.name, def.default.to_env_text()));
            block.join("\n")
        })
        .collect();
    let mut out = blocks.join("\n\n");
    out.push('\n');
    out
}

/// Look up a key with its documentation. Comments above the key in the
/// sample file take precedence over the schema doc. Credentials are masked.
pub fn get_value(store: &ConfigStore, key: &str) -> Result<ConfigResult, EnvfigError> {
    let value = store.get(key)?;
    let sample_doc = read_optional(store.sample_path())?.and_then(|content| {
        parse(&content).comments_for(key).map(|lines| {
            lines
                .iter()
                .map(|l| l.trim().trim_start_matches('#').trim().to_string())
                .collect::<Vec<_>>()
        })
    });
    let doc = sample_doc.unwrap_or_else(|| store.schema().doc(key).to_vec());

    Ok(ConfigResult::KeyValue {
        key: key.into(),
        value: mask_if_sensitive(key, &value.to_env_text()),
        doc,
    })
}

/// List all effective values in schema order. Credentials are masked.
pub fn list_values(store: &ConfigStore) -> ConfigResult {
    let entries = store
        .entries()
        .into_iter()
        .map(|(key, value)| {
            let display = mask_if_sensitive(&key, &value.to_env_text());
            (key, display)
        })
        .collect();
    ConfigResult::Listing { entries }
}
