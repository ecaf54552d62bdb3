//! The runtime configuration store.
//!
//! A [`ConfigStore`] holds the effective value of every schema key, plus any
//! keys added at runtime. All mutation goes through [`ConfigStore::set`],
//! which records divergences from the compiled-in defaults in a
//! [`ChangeSet`]; [`ConfigStore::save`] writes that set back to disk.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{error, warn};

use crate::changes::ChangeSet;
use crate::coerce::coerce;
use crate::error::EnvfigError;
use crate::resolve::Resolved;
use crate::schema::Schema;
use crate::sync::{self, SyncReport};
use crate::unknown::UnknownVar;
use crate::value::{Kind, Value};

#[derive(Debug)]
pub struct ConfigStore {
    schema: Arc<Schema>,
    values: HashMap<String, Value>,
    /// Keys set at runtime that the schema does not declare, in insertion order.
    dynamic: Vec<String>,
    messages: HashMap<String, Value>,
    changes: ChangeSet,
    unknown: Vec<UnknownVar>,
    env_path: PathBuf,
    sample_path: PathBuf,
}

impl ConfigStore {
    /// Build a store from resolved values. Loading does not populate the
    /// change set: the loaded state is the baseline.
    pub fn new(
        schema: Arc<Schema>,
        resolved: Resolved,
        env_path: PathBuf,
        sample_path: PathBuf,
    ) -> Self {
        Self {
            schema,
            values: resolved.values,
            dynamic: Vec::new(),
            messages: HashMap::new(),
            changes: ChangeSet::new(),
            unknown: resolved.unknown,
            env_path,
            sample_path,
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn env_path(&self) -> &Path {
        &self.env_path
    }

    pub fn sample_path(&self) -> &Path {
        &self.sample_path
    }

    /// Current value of `key`: configuration first, then messages.
    pub fn get(&self, key: &str) -> Result<&Value, EnvfigError> {
        self.values
            .get(key)
            .or_else(|| self.messages.get(key))
            .ok_or_else(|| EnvfigError::UnknownKey(key.into()))
    }

    pub fn get_bool(&self, key: &str) -> Result<bool, EnvfigError> {
        let value = self.get(key)?;
        value.as_bool().ok_or_else(|| mismatch(key, Kind::Bool, value))
    }

    pub fn get_int(&self, key: &str) -> Result<i64, EnvfigError> {
        let value = self.get(key)?;
        value.as_int().ok_or_else(|| mismatch(key, Kind::Int, value))
    }

    pub fn get_str(&self, key: &str) -> Result<&str, EnvfigError> {
        let value = self.get(key)?;
        value.as_str().ok_or_else(|| mismatch(key, Kind::Str, value))
    }

    pub fn get_list(&self, key: &str) -> Result<&[String], EnvfigError> {
        let value = self.get(key)?;
        value.as_list().ok_or_else(|| mismatch(key, Kind::List, value))
    }

    /// Overwrite `key` in memory and track it for persistence.
    ///
    /// Schema keys must keep the kind of their default. A value that differs
    /// from the default, or any value for a key outside the schema, is
    /// recorded in the change set. Setting a key back to its default does not
    /// remove an existing entry; the entry takes the default so a value
    /// already written to disk is corrected on the next save. Untracked keys
    /// are never recorded.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) -> Result<(), EnvfigError> {
        let value = value.into();
        let default = self.schema.default_of(key);

        if let Some(default) = default
            && default.kind() != value.kind()
        {
            return Err(mismatch(key, default.kind(), &value));
        }

        let track = !self.schema.is_untracked(key)
            && (default.is_none_or(|default| *default != value) || self.changes.contains(key));
        if track {
            self.changes.insert(key, value.clone());
        }

        if default.is_none() && !self.values.contains_key(key) {
            self.dynamic.push(key.to_string());
        }
        self.values.insert(key.to_string(), value);
        Ok(())
    }

    /// Coerce `raw` against the key's default (plain string for keys outside
    /// the schema), then [`set`](Self::set) it.
    pub fn set_raw(&mut self, key: &str, raw: &str) -> Result<(), EnvfigError> {
        let value = match self.schema.default_of(key) {
            Some(default) => coerce(key, raw, default)?,
            None => Value::Str(raw.to_string()),
        };
        self.set(key, value)
    }

    /// Persist the change set to `.env` and `.env.sample`.
    ///
    /// An empty change set does nothing. On success the change set is
    /// cleared; on failure it is kept so the next save retries.
    pub fn save(&mut self) -> Result<SyncReport, EnvfigError> {
        if self.changes.is_empty() {
            return Ok(SyncReport::default());
        }
        match sync::sync(&self.env_path, &self.sample_path, &self.changes, &self.schema) {
            Ok(report) => {
                self.changes.clear();
                Ok(report)
            }
            Err(e) => {
                error!(error = %e, pending = self.changes.len(), "configuration not saved");
                Err(e)
            }
        }
    }

    /// Emit one warning per unknown `.env` variable, credentials masked.
    /// Returns the warning texts.
    pub fn warn_unknown_vars(&self) -> Vec<String> {
        self.unknown
            .iter()
            .map(|var| {
                let text = var.warning();
                warn!("{text}");
                text
            })
            .collect()
    }

    /// Replace the messages namespace.
    pub fn set_messages(&mut self, messages: HashMap<String, String>) {
        self.messages = messages
            .into_iter()
            .map(|(k, v)| (k, Value::Str(v)))
            .collect();
    }

    pub fn message(&self, key: &str) -> Option<&str> {
        self.messages.get(key).and_then(Value::as_str)
    }

    pub fn changes(&self) -> &ChangeSet {
        &self.changes
    }

    pub fn unknown_vars(&self) -> &[UnknownVar] {
        &self.unknown
    }

    /// Schema keys in declaration order, then derived keys, then keys added
    /// at runtime.
    pub fn entries(&self) -> Vec<(String, Value)> {
        let schema_keys = self.schema.keys().map(|def| def.name.as_str());
        let derived = self.schema.derived_keys().iter().map(|(k, _)| k.as_str());
        schema_keys
            .chain(derived)
            .chain(self.dynamic.iter().map(String::as_str))
            .filter_map(|k| self.values.get(k).map(|v| (k.to_string(), v.clone())))
            .collect()
    }
}

fn mismatch(key: &str, expected: Kind, found: &Value) -> EnvfigError {
    EnvfigError::TypeMismatch {
        key: key.into(),
        expected,
        found: found.kind(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test::test_schema;
    use crate::parse::parse;
    use crate::resolve::{ResolveInput, resolve};
    use std::fs;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir, schema: Schema) -> ConfigStore {
        let env_path = dir.path().join(".env");
        let env_file = fs::read_to_string(&env_path).ok().map(|c| parse(&c));
        let resolved = resolve(
            &schema,
            ResolveInput {
                env_file,
                ..ResolveInput::default()
            },
        )
        .unwrap();
        ConfigStore::new(
            Arc::new(schema),
            resolved,
            env_path,
            dir.path().join(".env.sample"),
        )
    }

    #[test]
    fn get_defaults() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir, test_schema());
        assert_eq!(store.get("PORT").unwrap(), &Value::Int(8080));
        assert_eq!(store.get_str("HOST").unwrap(), "localhost");
        assert!(!store.get_bool("DEBUG").unwrap());
        assert_eq!(store.get_list("EXTENSIONS").unwrap(), [".mp3", ".ogg"]);
    }

    #[test]
    fn get_unknown_key_errors() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir, test_schema());
        assert!(matches!(store.get("NOPE"), Err(EnvfigError::UnknownKey(_))));
    }

    #[test]
    fn typed_getter_mismatch() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir, test_schema());
        assert!(matches!(
            store.get_int("HOST"),
            Err(EnvfigError::TypeMismatch { expected: Kind::Int, found: Kind::Str, .. })
        ));
    }

    #[test]
    fn messages_namespace() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir, test_schema());
        store.set_messages(HashMap::from([("NOT_A_DJ".to_string(), "no".to_string())]));
        assert_eq!(store.get_str("NOT_A_DJ").unwrap(), "no");
        assert_eq!(store.message("NOT_A_DJ"), Some("no"));
        assert_eq!(store.message("PORT"), None);
    }

    #[test]
    fn set_tracks_non_default() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir, test_schema());
        store.set("PORT", 3000).unwrap();
        assert_eq!(store.get_int("PORT").unwrap(), 3000);
        assert_eq!(store.changes().get("PORT"), Some(&Value::Int(3000)));
    }

    #[test]
    fn set_default_value_not_tracked() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir, test_schema());
        store.set("PORT", 8080).unwrap();
        assert!(store.changes().is_empty());
    }

    #[test]
    fn set_back_to_default_keeps_entry() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir, test_schema());
        store.set("PORT", 3000).unwrap();
        store.set("PORT", 8080).unwrap();
        assert_eq!(store.get_int("PORT").unwrap(), 8080);
        assert_eq!(store.changes().get("PORT"), Some(&Value::Int(8080)));
    }

    #[test]
    fn set_rejects_wrong_kind() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir, test_schema());
        let err = store.set("PORT", "eighty").unwrap_err();
        assert!(matches!(err, EnvfigError::TypeMismatch { .. }));
        assert_eq!(store.get_int("PORT").unwrap(), 8080);
        assert!(store.changes().is_empty());
    }

    #[test]
    fn set_schema_foreign_key_always_tracked() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir, test_schema());
        store.set("EXTRA", "value").unwrap();
        assert_eq!(store.get_str("EXTRA").unwrap(), "value");
        assert!(store.changes().contains("EXTRA"));
        assert_eq!(store.entries().last().unwrap().0, "EXTRA");
    }

    #[test]
    fn untracked_keys_never_recorded() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir, test_schema());
        store.set("CACHE_PATH", "/abs/cache.txt").unwrap();
        store.set("INTERNAL", "x").unwrap();
        store.set("ADDRESS", "elsewhere:1").unwrap();
        assert!(store.changes().is_empty());
        assert_eq!(store.get_str("INTERNAL").unwrap(), "x");
    }

    #[test]
    fn set_raw_coerces() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir, test_schema());
        store.set_raw("DEBUG", "TRUE").unwrap();
        store.set_raw("EXTENSIONS", ".wav,.flac").unwrap();
        store.set_raw("NEW_KEY", "42").unwrap();
        assert!(store.get_bool("DEBUG").unwrap());
        assert_eq!(store.get_list("EXTENSIONS").unwrap(), [".wav", ".flac"]);
        assert_eq!(store.get_str("NEW_KEY").unwrap(), "42");
        assert!(store.set_raw("PORT", "eighty").is_err());
    }

    #[test]
    fn save_writes_and_clears() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir, test_schema());
        store.set("PORT", 3000).unwrap();

        let report = store.save().unwrap();
        assert_eq!(report.written(), 2);
        assert!(store.changes().is_empty());
        let env = fs::read_to_string(dir.path().join(".env")).unwrap();
        assert_eq!(env, "PORT=3000\n");
    }

    #[test]
    fn second_save_is_a_no_op() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir, test_schema());
        store.set("PORT", 3000).unwrap();
        store.save().unwrap();

        // Remove the files: a second save must not recreate them
        fs::remove_file(dir.path().join(".env")).unwrap();
        fs::remove_file(dir.path().join(".env.sample")).unwrap();

        let report = store.save().unwrap();
        assert_eq!(report.written(), 0);
        assert!(!dir.path().join(".env").exists());
    }

    #[test]
    fn failed_save_keeps_changes() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir, test_schema());
        fs::create_dir_all(dir.path().join(".env")).unwrap();
        store.set("PORT", 3000).unwrap();

        assert!(matches!(store.save(), Err(EnvfigError::SyncFailed(_))));
        assert!(store.changes().contains("PORT"));

        fs::remove_dir(dir.path().join(".env")).unwrap();
        store.save().unwrap();
        assert!(store.changes().is_empty());
        assert_eq!(fs::read_to_string(dir.path().join(".env")).unwrap(), "PORT=3000\n");
    }

    #[test]
    fn save_round_trips_through_load() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir, Schema::musicbot());
        store.set("MAX_SONG_PRELOAD", 10).unwrap();
        store.save().unwrap();

        let reloaded = store_in(&dir, Schema::musicbot());
        assert_eq!(reloaded.get_int("MAX_SONG_PRELOAD").unwrap(), 10);
    }

    #[test]
    fn line_breaks_in_values_stay_on_one_line() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir, Schema::musicbot());
        let prefix = "x\nVC_TIMOUT_DEFAULT=true\r";
        store.set("BOT_PREFIX", prefix).unwrap();
        store.save().unwrap();

        let env = fs::read_to_string(dir.path().join(".env")).unwrap();
        assert_eq!(env.lines().count(), 1, "{env:?}");
        let sample = fs::read_to_string(dir.path().join(".env.sample")).unwrap();
        assert!(!sample.contains("\nVC_TIMOUT_DEFAULT"), "{sample:?}");

        let reloaded = store_in(&dir, Schema::musicbot());
        assert_eq!(reloaded.get_str("BOT_PREFIX").unwrap(), prefix);
    }

    #[test]
    fn oversized_value_persists_but_loads_capped() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir, Schema::musicbot());
        store.set("MAX_SONG_PRELOAD", 999).unwrap();
        assert_eq!(store.get_int("MAX_SONG_PRELOAD").unwrap(), 999);
        store.save().unwrap();

        let reloaded = store_in(&dir, Schema::musicbot());
        assert_eq!(reloaded.get_int("MAX_SONG_PRELOAD").unwrap(), 25);
    }

    #[test]
    fn set_back_to_default_is_persisted() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(".env"), "PORT=3000\n").unwrap();
        let mut store = store_in(&dir, test_schema());
        assert_eq!(store.get_int("PORT").unwrap(), 3000);

        store.set("PORT", 4000).unwrap();
        store.set("PORT", 8080).unwrap();
        store.save().unwrap();

        let env = fs::read_to_string(dir.path().join(".env")).unwrap();
        assert_eq!(env, "PORT=8080\n");
    }

    #[test]
    fn warns_unknown_vars_masked() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(".env"),
            "PORT=1\nFOO_TYPO=bar\nMY_SECRET_TOKEN=abcdefgh12345678\n",
        )
        .unwrap();
        let store = store_in(&dir, test_schema());

        assert_eq!(store.unknown_vars().len(), 2);
        assert!(store.get("FOO_TYPO").is_err());

        let warnings = store.warn_unknown_vars();
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].contains("FOO_TYPO=bar"));
        assert!(warnings[1].contains("abcd...5678"));
        assert!(!warnings[1].contains("abcdefgh12345678"));
    }

    #[test]
    fn entries_follow_schema_order() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir, test_schema());
        let keys: Vec<String> = store.entries().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys.first().map(String::as_str), Some("HOST"));
        assert_eq!(keys.last().map(String::as_str), Some("ADDRESS"));
    }
}
