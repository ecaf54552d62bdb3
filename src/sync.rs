//! Persist changed values into `.env` and `.env.sample`, in place.
//!
//! Each file is re-read and re-parsed on every sync so that external edits
//! made since startup are respected. Existing key lines are replaced where
//! they stand; missing keys are appended. Everything else (comments, blank
//! lines, unknown keys, ordering) is left untouched, and a file is only
//! written when at least one line changed.
//!
//! Comments are tied to keys by position: a comment block belongs to the key
//! line right below it. Reordering a file by hand can therefore move a
//! comment onto a different key.

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{error, info};

use crate::changes::ChangeSet;
use crate::coerce::parse_like;
use crate::error::EnvfigError;
use crate::file::{read_optional, write_file};
use crate::parse::parse;
use crate::schema::Schema;
use crate::unknown::mask_if_sensitive;
use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// The live `.env` file.
    Env,
    /// The documented `.env.sample` template.
    Sample,
}

/// One line changed by a sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Update {
    pub key: String,
    /// Previous text, `None` when the key was appended.
    pub old: Option<String>,
    pub new: String,
}

/// Result of applying a change set to file content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Applied {
    pub content: String,
    pub updates: Vec<Update>,
}

impl Applied {
    pub fn changed(&self) -> bool {
        !self.updates.is_empty()
    }
}

/// What happened to one file during a sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileOutcome {
    pub path: PathBuf,
    pub kind: FileKind,
    pub updates: Vec<Update>,
    pub written: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub files: Vec<FileOutcome>,
}

impl SyncReport {
    pub fn written(&self) -> usize {
        self.files.iter().filter(|f| f.written).count()
    }
}

impl fmt::Display for SyncReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.files.iter().all(|o| o.updates.is_empty()) {
            return write!(f, "Nothing to save");
        }
        let mut first = true;
        for outcome in &self.files {
            for update in &outcome.updates {
                if !first {
                    writeln!(f)?;
                }
                first = false;
                let new = mask_if_sensitive(&update.key, &update.new);
                match &update.old {
                    Some(old) => write!(
                        f,
                        "Updated {} in {}: {} -> {}",
                        update.key,
                        outcome.path.display(),
                        mask_if_sensitive(&update.key, old),
                        new
                    )?,
                    None => write!(
                        f,
                        "Added {}={} to {}",
                        update.key,
                        new,
                        outcome.path.display()
                    )?,
                }
            }
        }
        Ok(())
    }
}

/// Pure function: apply `changes` to env file content.
///
/// `content` is `None` when the file does not exist yet. For
/// [`FileKind::Sample`], appended keys get a comment block: the schema's doc
/// lines if it has any, otherwise a generic `# KEY configuration` line.
pub fn apply_changes(
    content: Option<&str>,
    changes: &ChangeSet,
    kind: FileKind,
    schema: &Schema,
) -> Applied {
    let mut file = parse(content.unwrap_or(""));
    let mut updates = Vec::new();

    for (key, value) in changes.iter() {
        let rendered = value.to_env_text();
        match file.get(key).map(str::to_string) {
            Some(existing) => {
                if !matches_existing(&existing, value, &rendered) {
                    file.replace(key, &rendered);
                    updates.push(Update {
                        key: key.to_string(),
                        old: Some(existing),
                        new: rendered,
                    });
                }
            }
            None => {
                let comments = match kind {
                    FileKind::Env => Vec::new(),
                    FileKind::Sample => sample_comments(schema, key),
                };
                file.append(key, &rendered, &comments);
                updates.push(Update {
                    key: key.to_string(),
                    old: None,
                    new: rendered,
                });
            }
        }
    }

    Applied {
        content: file.render(),
        updates,
    }
}

/// Compare file text against a value, re-parsing the text into the value's
/// type first and falling back to plain text comparison.
fn matches_existing(existing: &str, value: &Value, rendered: &str) -> bool {
    match parse_like(existing, value) {
        Some(parsed) => parsed == *value,
        None => existing == rendered,
    }
}

fn sample_comments(schema: &Schema, key: &str) -> Vec<String> {
    let doc = schema.doc(key);
    if doc.is_empty() {
        vec![format!("# {key} configuration")]
    } else {
        doc.iter().map(|line| format!("# {line}")).collect()
    }
}

/// I/O wrapper: read one file (missing = empty), apply changes, write back
/// only if something changed.
pub fn sync_file(
    path: &Path,
    changes: &ChangeSet,
    kind: FileKind,
    schema: &Schema,
) -> Result<FileOutcome, EnvfigError> {
    let content = read_optional(path)?;
    let applied = apply_changes(content.as_deref(), changes, kind, schema);

    if applied.changed() {
        write_file(path, &applied.content)?;
        for update in &applied.updates {
            let new = mask_if_sensitive(&update.key, &update.new);
            match &update.old {
                Some(old) => info!(
                    file = %path.display(),
                    key = %update.key,
                    from = %mask_if_sensitive(&update.key, old),
                    to = %new,
                    "updated"
                ),
                None => info!(file = %path.display(), key = %update.key, value = %new, "added"),
            }
        }
    }

    Ok(FileOutcome {
        path: path.to_path_buf(),
        kind,
        written: applied.changed(),
        updates: applied.updates,
    })
}

/// Synchronize both files. A failure on one file does not stop the attempt
/// on the other; all failures are returned together.
pub fn sync(
    env_path: &Path,
    sample_path: &Path,
    changes: &ChangeSet,
    schema: &Schema,
) -> Result<SyncReport, EnvfigError> {
    let mut report = SyncReport::default();
    let mut errors = Vec::new();

    for (path, kind) in [(env_path, FileKind::Env), (sample_path, FileKind::Sample)] {
        match sync_file(path, changes, kind, schema) {
            Ok(outcome) => report.files.push(outcome),
            Err(e) => {
                error!(file = %path.display(), error = %e, "failed to persist configuration");
                errors.push(e);
            }
        }
    }

    if errors.is_empty() {
        Ok(report)
    } else {
        Err(EnvfigError::SyncFailed(errors))
    }
}
