//! Coerce raw env text into the type implied by a key's default.

use crate::error::EnvfigError;
use crate::literal::{Literal, parse_literal};
use crate::value::{Kind, Value};

const TRUE_WORDS: &[&str] = &["true", "1", "yes", "on"];
const FALSE_WORDS: &[&str] = &["false", "0", "no", "off"];

/// Coerce `raw` into the kind of `default`.
///
/// Booleans and integers are strict: unparseable text is an
/// [`InvalidValue`](EnvfigError::InvalidValue) error. Lists and strings are
/// permissive and never fail.
pub fn coerce(key: &str, raw: &str, default: &Value) -> Result<Value, EnvfigError> {
    parse_as(raw, default.kind()).map_err(|reason| EnvfigError::InvalidValue {
        key: key.into(),
        raw: raw.into(),
        reason: reason.into(),
    })
}

/// Best-effort re-parse of file text into the kind of `template`.
pub fn parse_like(raw: &str, template: &Value) -> Option<Value> {
    parse_as(raw, template.kind()).ok()
}

fn parse_as(raw: &str, kind: Kind) -> Result<Value, &'static str> {
    match kind {
        Kind::Bool => parse_bool(raw).map(Value::Bool),
        Kind::Int => raw
            .trim()
            .parse::<i64>()
            .map(Value::Int)
            .map_err(|_| "expected a base-10 integer"),
        Kind::List => Ok(Value::List(parse_list(raw))),
        Kind::Str => Ok(Value::Str(parse_str(raw))),
    }
}

fn parse_bool(raw: &str) -> Result<bool, &'static str> {
    let word = raw.trim().to_ascii_lowercase();
    if TRUE_WORDS.contains(&word.as_str()) {
        Ok(true)
    } else if FALSE_WORDS.contains(&word.as_str()) {
        Ok(false)
    } else {
        Err("expected true or false")
    }
}

fn parse_list(raw: &str) -> Vec<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }
    if let Ok(Literal::List(items)) = parse_literal(trimmed)
        && let Some(strings) = items.iter().map(scalar_text).collect::<Option<Vec<_>>>()
    {
        return strings;
    }
    if trimmed.contains(',') {
        return trimmed
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();
    }
    vec![trimmed.to_string()]
}

fn scalar_text(lit: &Literal) -> Option<String> {
    match lit {
        Literal::Str(s) => Some(s.clone()),
        Literal::Int(i) => Some(i.to_string()),
        Literal::Bool(b) => Some(b.to_string()),
        Literal::List(_) => None,
    }
}

// Only quoted strings are unwrapped: numbers and booleans already read the
// same as their string form.
fn parse_str(raw: &str) -> String {
    match parse_literal(raw) {
        Ok(Literal::Str(s)) => s,
        _ => raw.to_string(),
    }
}
