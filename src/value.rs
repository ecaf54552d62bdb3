//! Typed configuration values and their textual form in `.env` files.

use std::fmt;

use serde::Serialize;

use crate::literal;

/// The type of a configuration key, inferred from its default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Bool,
    Int,
    Str,
    List,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Kind::Bool => "bool",
            Kind::Int => "int",
            Kind::Str => "string",
            Kind::List => "list",
        };
        f.write_str(name)
    }
}

/// A configuration value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Str(String),
    List(Vec<String>),
}

impl Value {
    pub fn kind(&self) -> Kind {
        match self {
            Value::Bool(_) => Kind::Bool,
            Value::Int(_) => Kind::Int,
            Value::Str(_) => Kind::Str,
            Value::List(_) => Kind::List,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Empty strings, empty lists, `false` and `0`.
    pub fn is_empty(&self) -> bool {
        match self {
            Value::Bool(b) => !b,
            Value::Int(i) => *i == 0,
            Value::Str(s) => s.is_empty(),
            Value::List(items) => items.is_empty(),
        }
    }

    /// Render the value as it is written after `KEY=` in an env file.
    ///
    /// Strings are verbatim unless they would not survive a re-read (edge
    /// whitespace, line breaks, or text that is itself a quoted literal), in
    /// which case they are quoted. Lists use the bracketed literal form (`['.mp3', '.ogg']`)
    /// that the coercer reads back.
    pub fn to_env_text(&self) -> String {
        match self {
            Value::Bool(b) => b.to_string(),
            Value::Int(i) => i.to_string(),
            Value::Str(s) if needs_quoting(s) => literal::quote(s),
            Value::Str(s) => s.clone(),
            Value::List(items) => {
                let quoted: Vec<String> = items.iter().map(|s| literal::quote(s)).collect();
                format!("[{}]", quoted.join(", "))
            }
        }
    }
}

fn needs_quoting(s: &str) -> bool {
    s.trim() != s
        || s.contains(['\n', '\r'])
        || matches!(literal::parse_literal(s), Ok(literal::Literal::Str(_)))
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_env_text())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<Vec<String>> for Value {
    fn from(items: Vec<String>) -> Self {
        Value::List(items)
    }
}

impl From<&[&str]> for Value {
    fn from(items: &[&str]) -> Self {
        Value::List(items.iter().map(|s| s.to_string()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_renders_as_bracketed_literal() {
        let v = Value::from(&[".mp3", ".ogg"][..]);
        assert_eq!(v.to_env_text(), "['.mp3', '.ogg']");
    }

    #[test]
    fn empty_list_renders_brackets() {
        assert_eq!(Value::List(vec![]).to_env_text(), "[]");
    }

    #[test]
    fn string_renders_verbatim() {
        assert_eq!(Value::from("sqlite:///settings.db").to_env_text(), "sqlite:///settings.db");
    }

    #[test]
    fn edge_whitespace_is_quoted() {
        assert_eq!(Value::from("@bot ").to_env_text(), "'@bot '");
        assert_eq!(Value::from("'x'").to_env_text(), r"'\'x\''");
        assert_eq!(Value::from("").to_env_text(), "");
    }

    #[test]
    fn line_breaks_are_quoted() {
        assert_eq!(Value::from("x\nY=1").to_env_text(), r"'x\nY=1'");
        assert_eq!(Value::from("a\rb").to_env_text(), r"'a\rb'");
    }

    #[test]
    fn scalars_render_plainly() {
        assert_eq!(Value::from(true).to_env_text(), "true");
        assert_eq!(Value::from(25).to_env_text(), "25");
    }

    #[test]
    fn emptiness() {
        assert!(Value::from("").is_empty());
        assert!(Value::from(false).is_empty());
        assert!(!Value::from("id").is_empty());
    }

    #[test]
    fn serializes_untagged() {
        let json = serde_json::to_string(&Value::from(&["a"][..])).unwrap();
        assert_eq!(json, r#"["a"]"#);
        assert_eq!(serde_json::to_string(&Value::from(7)).unwrap(), "7");
    }
}
