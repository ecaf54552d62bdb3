//! Line-oriented model of a `KEY=VALUE` env file.
//!
//! The model keeps every original line so that a rewrite can replace or
//! append individual lines without touching the rest. Comment blocks are
//! attached to the key that immediately follows them; a blank line or a
//! malformed line ends a block.

use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
enum LineKind {
    Blank,
    Comment,
    Entry { key: String, value: String },
    Malformed,
}

fn classify(line: &str) -> LineKind {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return LineKind::Blank;
    }
    if trimmed.starts_with('#') {
        return LineKind::Comment;
    }
    match trimmed.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => LineKind::Entry {
            key: key.trim().to_string(),
            value: value.trim().to_string(),
        },
        _ => LineKind::Malformed,
    }
}

/// A parsed env file. Built fresh for each read; never cached across syncs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvFile {
    lines: Vec<String>,
    entries: Vec<(String, String)>,
    index: HashMap<String, usize>,
    comments: HashMap<String, Vec<String>>,
    /// The file's first line ends in `\r\n`; rendering keeps that ending.
    crlf: bool,
}

/// Parse env file text. Never fails: lines that are neither blank, comments,
/// nor `KEY=VALUE` are kept verbatim and otherwise ignored.
pub fn parse(text: &str) -> EnvFile {
    let mut file = EnvFile::default();
    let mut pending: Vec<String> = Vec::new();
    file.crlf = text
        .find('\n')
        .is_some_and(|end| text[..end].ends_with('\r'));

    for (i, line) in text.lines().enumerate() {
        file.lines.push(line.to_string());
        match classify(line) {
            LineKind::Blank | LineKind::Malformed => pending.clear(),
            LineKind::Comment => pending.push(line.to_string()),
            LineKind::Entry { key, value } => {
                if pending.is_empty() {
                    file.comments.remove(&key);
                } else {
                    file.comments.insert(key.clone(), std::mem::take(&mut pending));
                }
                // Last occurrence wins for both value and position
                match file.entries.iter_mut().find(|(k, _)| *k == key) {
                    Some(entry) => entry.1 = value,
                    None => file.entries.push((key.clone(), value)),
                }
                file.index.insert(key, i);
            }
        }
    }

    file
}

impl EnvFile {
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Key-value pairs in order of first appearance.
    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Zero-based index of the line holding `key`.
    pub fn line_of(&self, key: &str) -> Option<usize> {
        self.index.get(key).copied()
    }

    /// Raw comment lines (with their `#`) directly above `key`.
    pub fn comments_for(&self, key: &str) -> Option<&[String]> {
        self.comments.get(key).map(Vec::as_slice)
    }

    /// Replace the line holding `key` with `KEY=value`.
    /// Returns false if the key has no line.
    pub fn replace(&mut self, key: &str, value: &str) -> bool {
        let Some(i) = self.line_of(key) else {
            return false;
        };
        self.lines[i] = format!("{key}={value}");
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| k == key) {
            entry.1 = value.to_string();
        }
        true
    }

    /// Append `KEY=value` at the end, preceded by `comments` if any. When
    /// comments are given and the file does not already end in a blank line,
    /// a blank separator is inserted so the block attaches to this key only.
    pub fn append(&mut self, key: &str, value: &str, comments: &[String]) {
        if !comments.is_empty() {
            if self.lines.last().is_some_and(|l| !l.trim().is_empty()) {
                self.lines.push(String::new());
            }
            self.lines.extend(comments.iter().cloned());
            self.comments.insert(key.to_string(), comments.to_vec());
        }
        self.lines.push(format!("{key}={value}"));
        self.index.insert(key.to_string(), self.lines.len() - 1);
        self.entries.push((key.to_string(), value.to_string()));
    }

    /// Render back to text, always ending with a newline. CRLF files stay
    /// CRLF.
    pub fn render(&self) -> String {
        let newline = if self.crlf { "\r\n" } else { "\n" };
        let mut out = self.lines.join(newline);
        out.push_str(newline);
        out
    }
}
