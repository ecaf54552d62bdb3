//! Thread-safe handle over a [`ConfigStore`].
//!
//! Reads share a read lock. `set` and `save` take the write lock, which makes
//! it the single exclusion point for change tracking and file rewrites: two
//! saves can never interleave their read-modify-write of `.env`.

use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard};

use crate::error::EnvfigError;
use crate::store::ConfigStore;
use crate::sync::SyncReport;
use crate::value::Value;

#[derive(Debug, Clone)]
pub struct SharedStore {
    inner: Arc<RwLock<ConfigStore>>,
}

impl SharedStore {
    pub fn new(store: ConfigStore) -> Self {
        Self {
            inner: Arc::new(RwLock::new(store)),
        }
    }

    /// Clone of the current value of `key`.
    pub fn get(&self, key: &str) -> Result<Value, EnvfigError> {
        self.inner.read().get(key).cloned()
    }

    pub fn get_bool(&self, key: &str) -> Result<bool, EnvfigError> {
        self.inner.read().get_bool(key)
    }

    pub fn get_int(&self, key: &str) -> Result<i64, EnvfigError> {
        self.inner.read().get_int(key)
    }

    pub fn get_str(&self, key: &str) -> Result<String, EnvfigError> {
        self.inner.read().get_str(key).map(String::from)
    }

    pub fn get_list(&self, key: &str) -> Result<Vec<String>, EnvfigError> {
        self.inner.read().get_list(key).map(<[String]>::to_vec)
    }

    pub fn set(&self, key: &str, value: impl Into<Value>) -> Result<(), EnvfigError> {
        self.inner.write().set(key, value)
    }

    pub fn set_raw(&self, key: &str, raw: &str) -> Result<(), EnvfigError> {
        self.inner.write().set_raw(key, raw)
    }

    pub fn save(&self) -> Result<SyncReport, EnvfigError> {
        self.inner.write().save()
    }

    /// Borrow the store for several reads under one lock.
    pub fn read(&self) -> RwLockReadGuard<'_, ConfigStore> {
        self.inner.read()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test::test_schema;
    use crate::resolve::{ResolveInput, resolve};
    use std::thread;
    use tempfile::TempDir;

    fn shared_in(dir: &TempDir) -> SharedStore {
        let schema = test_schema();
        let resolved = resolve(&schema, ResolveInput::default()).unwrap();
        SharedStore::new(ConfigStore::new(
            Arc::new(schema),
            resolved,
            dir.path().join(".env"),
            dir.path().join(".env.sample"),
        ))
    }

    #[test]
    fn clones_share_state() {
        let dir = TempDir::new().unwrap();
        let a = shared_in(&dir);
        let b = a.clone();
        a.set("PORT", 1234).unwrap();
        assert_eq!(b.get_int("PORT").unwrap(), 1234);
    }

    #[test]
    fn concurrent_sets_and_saves_leave_consistent_file() {
        let dir = TempDir::new().unwrap();
        let store = shared_in(&dir);

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                thread::spawn(move || {
                    store.set(&format!("KEY_{i}"), format!("v{i}")).unwrap();
                    store.save().unwrap();
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let env = std::fs::read_to_string(dir.path().join(".env")).unwrap();
        for i in 0..8 {
            assert_eq!(env.matches(&format!("KEY_{i}=v{i}\n")).count(), 1, "{env}");
        }
        assert!(store.read().changes().is_empty());
    }

    #[test]
    fn typed_reads() {
        let dir = TempDir::new().unwrap();
        let store = shared_in(&dir);
        assert_eq!(store.get_str("HOST").unwrap(), "localhost");
        assert_eq!(store.get_list("EXTENSIONS").unwrap(), vec![".mp3", ".ogg"]);
        assert!(!store.get_bool("DEBUG").unwrap());
        assert_eq!(store.get("PORT").unwrap(), Value::Int(8080));
    }
}
