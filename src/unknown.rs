//! Detection and reporting of `.env` keys the schema does not recognize.
//!
//! Unknown keys are usually typos or leftovers from older versions. They are
//! never fatal: each one produces a warning, with credential-looking values
//! masked so secrets do not end up in logs.

use crate::parse::EnvFile;
use crate::schema::Schema;

const SENSITIVE_MARKERS: &[&str] = &["token", "key", "secret", "password"];
const MASK_PLACEHOLDER: &str = "********";

/// A key found in `.env` that the schema does not declare.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVar {
    pub key: String,
    pub value: String,
    /// 1-indexed line number in the `.env` file.
    pub line: usize,
}

impl UnknownVar {
    /// The warning text for this variable, with the value masked if needed.
    pub fn warning(&self) -> String {
        format!(
            "Unknown environment variable: {}={} (line {})\n\
             This variable is not defined in the configuration schema and will be ignored.",
            self.key,
            mask_if_sensitive(&self.key, &self.value),
            self.line
        )
    }
}

/// Collect unknown keys from a parsed `.env` file, in file order.
///
/// Schema keys, alias names, deprecated names, and `_`-prefixed keys are not
/// reported.
pub fn find_unknown(file: &EnvFile, schema: &Schema) -> Vec<UnknownVar> {
    file.entries()
        .iter()
        .filter(|(key, _)| {
            !key.starts_with('_')
                && !schema.contains(key)
                && !schema.is_alias(key)
                && !schema.deprecated_keys().iter().any(|(old, _)| old == key)
        })
        .map(|(key, value)| UnknownVar {
            key: key.clone(),
            value: value.clone(),
            line: file.line_of(key).map(|i| i + 1).unwrap_or(0),
        })
        .collect()
}

/// Whether a key name looks like it holds a credential.
pub fn is_sensitive(key: &str) -> bool {
    let lower = key.to_lowercase();
    SENSITIVE_MARKERS.iter().any(|m| lower.contains(m))
}

/// Mask `value` if `key` looks like a credential: first and last four
/// characters for values longer than eight, a fixed placeholder otherwise.
pub fn mask_if_sensitive(key: &str, value: &str) -> String {
    if !is_sensitive(key) {
        return value.to_string();
    }
    let chars: Vec<char> = value.chars().collect();
    if chars.len() > 8 {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{head}...{tail}")
    } else {
        MASK_PLACEHOLDER.to_string()
    }
}
