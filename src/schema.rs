//! The compiled-in configuration schema: every recognized key, its default,
//! and its documentation, plus the handful of load-time rules (aliases,
//! deprecated names, numeric caps, untracked and derived keys).
//!
//! A [`Schema`] is built once at startup and shared behind an `Arc`. It never
//! grows at runtime; keys set on the store that are not in the schema live
//! only in the store.

use std::collections::HashMap;
use std::path::Path;

use crate::error::EnvfigError;
use crate::value::{Kind, Value};

/// Computes a derived key from the effective values. Returns `None` when its
/// inputs are missing.
pub type Derive = fn(&HashMap<String, Value>) -> Option<Value>;

#[derive(Debug, Clone, PartialEq)]
pub struct KeyDef {
    pub name: String,
    pub default: Value,
    /// Comment lines, without the leading `#`.
    pub doc: Vec<String>,
}

impl KeyDef {
    pub fn kind(&self) -> Kind {
        self.default.kind()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Schema {
    keys: Vec<KeyDef>,
    index: HashMap<String, usize>,
    aliases: Vec<(String, String)>,
    deprecated: Vec<(String, String)>,
    caps: Vec<(String, i64)>,
    untracked: Vec<String>,
    resolved_paths: Vec<String>,
    derived: Vec<(String, Derive)>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a key. Redeclaring a key replaces its default and doc.
    pub fn key(mut self, name: &str, default: impl Into<Value>, doc: &[&str]) -> Self {
        let def = KeyDef {
            name: name.into(),
            default: default.into(),
            doc: doc.iter().map(|s| s.to_string()).collect(),
        };
        match self.index.get(name) {
            Some(&i) => self.keys[i] = def,
            None => {
                self.index.insert(name.into(), self.keys.len());
                self.keys.push(def);
            }
        }
        self
    }

    /// `alias` is consulted when `primary` resolves to an empty value.
    pub fn alias(mut self, primary: &str, alias: &str) -> Self {
        self.aliases.push((primary.into(), alias.into()));
        self
    }

    /// Presence of `old` in the environment aborts loading.
    pub fn deprecated(mut self, old: &str, replacement: &str) -> Self {
        self.deprecated.push((old.into(), replacement.into()));
        self
    }

    /// Clamp an integer key to `max` at load time.
    pub fn cap(mut self, key: &str, max: i64) -> Self {
        self.caps.push((key.into(), max));
        self
    }

    /// Exempt a key from change tracking.
    pub fn untracked(mut self, key: &str) -> Self {
        self.untracked.push(key.into());
        self
    }

    /// Resolve a relative path value against the search directories at load.
    /// Resolved paths depend on the working directory, so they are untracked.
    pub fn resolved_path(mut self, key: &str) -> Self {
        self.resolved_paths.push(key.into());
        self.untracked(key)
    }

    /// Register a key computed from other keys after loading. Derived keys
    /// are untracked.
    pub fn derived(mut self, key: &str, derive: Derive) -> Self {
        self.derived.push((key.into(), derive));
        self.untracked(key)
    }

    pub fn get(&self, name: &str) -> Option<&KeyDef> {
        self.index.get(name).map(|&i| &self.keys[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn default_of(&self, name: &str) -> Option<&Value> {
        self.get(name).map(|def| &def.default)
    }

    pub fn doc(&self, name: &str) -> &[String] {
        self.get(name).map(|def| def.doc.as_slice()).unwrap_or(&[])
    }

    /// Keys in declaration order.
    pub fn keys(&self) -> impl Iterator<Item = &KeyDef> {
        self.keys.iter()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn aliases(&self) -> &[(String, String)] {
        &self.aliases
    }

    pub fn deprecated_keys(&self) -> &[(String, String)] {
        &self.deprecated
    }

    pub fn caps(&self) -> &[(String, i64)] {
        &self.caps
    }

    pub fn resolved_paths(&self) -> &[String] {
        &self.resolved_paths
    }

    pub fn derived_keys(&self) -> &[(String, Derive)] {
        &self.derived
    }

    pub fn is_untracked(&self, name: &str) -> bool {
        self.untracked.iter().any(|k| k == name)
    }

    pub fn is_alias(&self, name: &str) -> bool {
        self.aliases.iter().any(|(_, alias)| alias == name)
    }

    /// Replace doc comments from a `key -> comment` map. Multi-line comments
    /// are split on newlines. Keys not in the schema are ignored.
    pub fn with_docs(mut self, docs: HashMap<String, String>) -> Self {
        for (name, comment) in docs {
            if let Some(&i) = self.index.get(&name) {
                self.keys[i].doc = comment
                    .lines()
                    .map(str::trim)
                    .filter(|l| !l.is_empty())
                    .map(String::from)
                    .collect();
            }
        }
        self
    }

    /// Like [`with_docs`](Self::with_docs), reading the map from a JSON file.
    /// A missing file leaves the schema unchanged.
    pub fn with_docs_file(self, path: &Path) -> Result<Self, EnvfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(self),
            Err(e) => return Err(EnvfigError::io(path, e)),
        };
        let docs: HashMap<String, String> =
            serde_json::from_str(&content).map_err(|e| EnvfigError::CommentsParse {
                path: path.to_path_buf(),
                source: e,
            })?;
        Ok(self.with_docs(docs))
    }

    /// The music bot's configuration schema.
    pub fn musicbot() -> Self {
        Schema::new()
            .key("BOT_TOKEN", "YOUR_TOKEN_GOES_HERE", &[])
            .key("SPOTIFY_ID", "", &[])
            .key("SPOTIFY_SECRET", "", &[])
            .key("BOT_PREFIX", "d!", &["set to empty string to disable"])
            .key("ENABLE_SLASH_COMMANDS", false, &[])
            .key("MENTION_AS_PREFIX", true, &[])
            .key("VC_TIMEOUT", 600, &["seconds"])
            .key(
                "VC_TIMEOUT_DEFAULT",
                true,
                &[
                    "default template setting for VC timeout",
                    "true = yes, timeout; false = no timeout",
                ],
            )
            .key(
                "ALLOW_VC_TIMEOUT_EDIT",
                true,
                &["allow or disallow editing the vc_timeout guild setting"],
            )
            .key("MAX_SONG_PRELOAD", 25, &["maximum of 25"])
            .key("SEARCH_RESULTS", 5, &["how many results to display in d!search"])
            .key("MAX_HISTORY_LENGTH", 10, &[])
            .key("MAX_TRACKNAME_HISTORY_LENGTH", 15, &[])
            .key(
                "DATABASE_URL",
                "sqlite:///settings.db",
                &[
                    "If database is not one of sqlite, postgres or MySQL",
                    "you need to provide the url in SQL Alchemy-supported format.",
                    "Must be async-compatible",
                    "CHANGE ONLY IF YOU KNOW WHAT YOU'RE DOING",
                ],
            )
            .key("ENABLE_BUTTON_PLUGIN", true, &[])
            .key(
                "EMBED_COLOR",
                "0x4DD4D0",
                &["replace after '0x' with desired hex code ex. '#ff0188' >> \"0xff0188\""],
            )
            .key(
                "SUPPORTED_EXTENSIONS",
                &[".webm", ".mp4", ".mp3", ".avi", ".wav", ".m4v", ".ogg", ".mov"][..],
                &[],
            )
            .key("COOKIE_PATH", "config/cookies/cookies.txt", &[])
            .key("GLOBAL_DISABLE_AUTOJOIN_VC", false, &[])
            .key(
                "ANNOUNCE_DISCONNECT",
                true,
                &["whether to tell users the bot is disconnecting"],
            )
            .key("ENABLE_PLAYLISTS", true, &[])
            .key(
                "GUILD_WHITELIST",
                Vec::<String>::new(),
                &["if not empty, the bot will leave non-whitelisted guilds"],
            )
            .alias("SPOTIFY_ID", "SPOTIPY_CLIENT_ID")
            .alias("SPOTIFY_SECRET", "SPOTIPY_CLIENT_SECRET")
            .deprecated("VC_TIMOUT_DEFAULT", "VC_TIMEOUT_DEFAULT")
            // embeds are limited to 25 fields
            .cap("MAX_SONG_PRELOAD", 25)
            .resolved_path("COOKIE_PATH")
            .untracked("DATABASE")
            .untracked("DATABASE_LIBRARY")
            .untracked("DATABASE_LIBRARY_NAME")
            .derived("prefix", display_prefix)
    }
}

/// The prefix shown to users: the configured one, else `/` when slash
/// commands are on, else a mention.
fn display_prefix(values: &HashMap<String, Value>) -> Option<Value> {
    let prefix = values.get("BOT_PREFIX")?.as_str()?;
    if !prefix.is_empty() {
        return Some(Value::from(prefix));
    }
    let slash = values.get("ENABLE_SLASH_COMMANDS")?.as_bool()?;
    Some(Value::from(if slash { "/" } else { "@bot " }))
}
